//! 连续存储管理
//!
//! 两个状态：无活动文件（初始）与有活动文件。启动与每次轮转都进入
//! 有活动文件态。轮转触发条件是墙钟小时与上次轮转记录的小时不同，
//! 逐帧检查而不是定时器，因此轮转延迟不超过一个采样间隔（1 秒）。
//!
//! 活动文件句柄与握手记录由本模块独占；其他组件不写存储。

use std::fs::File;
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDateTime, Timelike};
use seismo_protocol::SampleFrame;
use tracing::{error, info, warn};

use crate::config::NodeConfig;
use crate::error::AcqError;
use crate::naming::{self, STORE_HANDSHAKE_FILE};

/// 单帧写入的重试上限
///
/// 原始行为是无限重试；这里设上限并在耗尽后上报错误，
/// 帧仍然不会被无声丢弃。
const WRITE_RETRY_LIMIT: usize = 8;

/// 一次追加的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppendOutcome {
    /// 帧已完整落盘并刷新
    Stored,
    /// 无活动文件（上次轮转失败），帧未进入存储
    NoActiveFile,
}

struct ActiveFile {
    file: File,
    path: PathBuf,
    name: String,
    /// 上次轮转时刻的小时，轮转判定的基准
    hour: u32,
}

/// 连续存储管理器
pub struct ContinuousStore {
    device_id: String,
    store_dir: PathBuf,
    temp_dir: PathBuf,
    active: Option<ActiveFile>,
}

impl ContinuousStore {
    pub fn new(config: &NodeConfig) -> Self {
        Self {
            device_id: config.device_id.clone(),
            store_dir: config.continuous_dir.clone(),
            temp_dir: config.temp_dir.clone(),
            active: None,
        }
    }

    /// 启动时创建首个采集文件；失败是致命启动错误，由调用方终止进程
    pub fn open_initial(&mut self) -> Result<(), AcqError> {
        self.rotate_at(Local::now().naive_local())
    }

    /// 立即轮转（`B2` 时间上报路径：时间交换后从新文件开始）
    pub fn rotate_now(&mut self) -> Result<(), AcqError> {
        self.rotate_at(Local::now().naive_local())
    }

    /// 追加一帧：先做轮转检查，再以重试纪律写入并刷新
    pub fn append(&mut self, frame: &SampleFrame) -> Result<AppendOutcome, AcqError> {
        self.append_at(frame, Local::now().naive_local())
    }

    /// 当前活动文件路径
    pub fn active_path(&self) -> Option<&Path> {
        self.active.as_ref().map(|a| a.path.as_path())
    }

    /// 当前活动文件名
    pub fn active_name(&self) -> Option<&str> {
        self.active.as_ref().map(|a| a.name.as_str())
    }

    /// 关闭活动文件（信号驱动的干净退出路径）
    pub fn close(&mut self) {
        if let Some(active) = self.active.take() {
            info!(file = %active.name, "Continuous store file closed cleanly");
        }
    }

    fn needs_rotation(&self, now: NaiveDateTime) -> bool {
        match &self.active {
            // 未初始化视为需要轮转
            None => true,
            Some(active) => active.hour != now.hour(),
        }
    }

    fn append_at(&mut self, frame: &SampleFrame, now: NaiveDateTime) -> Result<AppendOutcome, AcqError> {
        if self.needs_rotation(now) {
            info!("Hour boundary reached, rotating continuous store file");
            if let Err(e) = self.rotate_at(now) {
                // 采集循环继续跑，但在下次轮转成功前帧不进入存储
                error!(error = %e, "File rotation failed, frames will be dropped from storage");
            }
        }

        let Some(active) = &mut self.active else {
            return Ok(AppendOutcome::NoActiveFile);
        };

        write_all_retrying(&mut active.file, frame.as_bytes(), &active.path)?;
        Ok(AppendOutcome::Stored)
    }

    fn rotate_at(&mut self, now: NaiveDateTime) -> Result<(), AcqError> {
        // 关闭旧文件并留下其名字作为握手记录的第二行；
        // 首次启动时从既有握手文件恢复上一个名字
        let previous = match self.active.take() {
            Some(active) => {
                match active.file.metadata() {
                    Ok(meta) => {
                        let size_mb = meta.len() as f64 / (1024.0 * 1024.0);
                        info!(file = %active.name,
                              "Continuous store file completed and closed ({size_mb:.2} MB)");
                    }
                    Err(_) => info!(file = %active.name, "Continuous store file completed and closed"),
                }
                Some(active.name)
            }
            None => self.read_handshake_current(),
        };

        let name = naming::store_file_name(&self.device_id, now);
        let path = self.store_dir.join(&name);
        let file = File::create(&path).map_err(|e| {
            error!(file = %path.display(), error = %e,
                   "CRITICAL: cannot create continuous store file");
            AcqError::Io(e)
        })?;

        if let Err(e) = self.write_handshake(&name, previous.as_deref()) {
            // 握手记录只影响外部发现，不中断采集
            warn!(error = %e, "Cannot update continuous store handshake record");
        }

        info!(file = %name, "New continuous store file created");
        self.active = Some(ActiveFile {
            file,
            path,
            name,
            hour: now.hour(),
        });
        Ok(())
    }

    fn handshake_path(&self) -> PathBuf {
        self.temp_dir.join(STORE_HANDSHAKE_FILE)
    }

    /// 既有握手文件的第一行（当前文件名），重启后接续 previous 链
    fn read_handshake_current(&self) -> Option<String> {
        let file = File::open(self.handshake_path()).ok()?;
        let mut line = String::new();
        BufReader::new(file).read_line(&mut line).ok()?;
        let name = line.trim_end().to_string();
        (!name.is_empty()).then_some(name)
    }

    fn write_handshake(&self, current: &str, previous: Option<&str>) -> std::io::Result<()> {
        let mut file = File::create(self.handshake_path())?;
        writeln!(file, "{current}")?;
        if let Some(previous) = previous {
            writeln!(file, "{previous}")?;
        }
        file.flush()
    }
}

/// 重试纪律的帧写入：部分写由 `write_all` 重发，写后显式刷新；
/// 重试耗尽向上返回错误，帧不会被无声丢弃
pub(crate) fn write_all_retrying(
    file: &mut File,
    bytes: &[u8],
    path: &Path,
) -> Result<(), AcqError> {
    let mut attempt = 0;
    loop {
        attempt += 1;
        match file.write_all(bytes).and_then(|_| file.flush()) {
            Ok(()) => return Ok(()),
            Err(source) if attempt >= WRITE_RETRY_LIMIT => {
                return Err(AcqError::WriteRetriesExhausted {
                    path: path.to_path_buf(),
                    attempts: attempt,
                    source,
                });
            }
            Err(e) => {
                warn!(file = %path.display(), attempt, error = %e, "Frame write failed, retrying");
            }
        }
    }
}
