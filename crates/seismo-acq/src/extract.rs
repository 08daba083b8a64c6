//! 事件提取
//!
//! 离线消费者：在连续存储里按时间定位到事件秒，把有界的一段帧
//! 原样拷贝到独立文件。寻址把存储当作严格每秒一帧（结构性假设，
//! 不逐帧验证）；落点帧的尾部秒与请求不符时记录差异但照常提取
//! （与既有提取文件保持行为兼容，见 DESIGN.md）。

use std::fs::File;
use std::io::{BufReader, ErrorKind, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use seismo_protocol::{FRAME_LEN, SampleFrame};
use tracing::{info, warn};

use crate::config::NodeConfig;
use crate::error::AcqError;
use crate::naming::{self, EVENT_HANDSHAKE_FILE};
use crate::store::write_all_retrying;

/// 一次提取请求（纯瞬态，消费一次）
#[derive(Debug, Clone)]
pub struct ExtractionRequest {
    /// 连续存储文件：相对名在连续存储目录下解析
    pub store_file: PathBuf,
    /// 事件时刻，当日秒数（时*3600 + 分*60 + 秒）
    pub event_second: u32,
    /// 拷贝帧数
    pub duration: u32,
}

/// 提取结果
#[derive(Debug)]
pub struct ExtractionOutcome {
    pub output_path: PathBuf,
    pub frames_copied: u32,
    /// 落点帧的尾部秒是否与请求一致
    pub matched: bool,
}

/// 事件提取器
pub struct EventExtractor {
    device_id: String,
    continuous_dir: PathBuf,
    temp_dir: PathBuf,
    events_dir: PathBuf,
}

impl EventExtractor {
    pub fn new(config: &NodeConfig) -> Self {
        Self {
            device_id: config.device_id.clone(),
            continuous_dir: config.continuous_dir.clone(),
            temp_dir: config.temp_dir.clone(),
            events_dir: config.events_dir.clone(),
        }
    }

    /// 执行一次提取
    ///
    /// 输出文件包含恰好落在 `[event_second, event_second + duration)`
    /// 的帧；相同输入对未修改的存储重复执行产生字节一致的输出。
    pub fn extract(&self, request: &ExtractionRequest) -> Result<ExtractionOutcome, AcqError> {
        let store_path = self.resolve_store_path(&request.store_file);
        info!(store = %store_path.display(), "Opening continuous store");
        let mut reader = BufReader::new(File::open(&store_path)?);

        // 第一帧的尾部给出存储起点秒
        let first = match read_frame(&mut reader) {
            Ok(frame) => frame,
            Err(e) if e.kind() == ErrorKind::UnexpectedEof => {
                return Err(AcqError::EmptyStore { path: store_path });
            }
            Err(e) => return Err(e.into()),
        };
        let start_second = first.trailer_time()?.seconds_of_day();

        let elapsed = request
            .event_second
            .checked_sub(start_second)
            .ok_or(AcqError::EventBeforeStore {
                event: request.event_second,
                start: start_second,
            })?;

        // 按每秒一帧跳到事件帧；elapsed 为 0 时第一帧即落点
        let candidate = if elapsed == 0 {
            first
        } else {
            reader.seek(SeekFrom::Current((elapsed as i64 - 1) * FRAME_LEN as i64))?;
            read_frame(&mut reader).map_err(|e| at_eof(e, request.duration + elapsed))?
        };

        let found_second = candidate.trailer_time()?.seconds_of_day();
        let matched = found_second == request.event_second;
        if matched {
            info!(second = found_second, "Frame located at requested event time");
        } else {
            let trailer = candidate.trailer();
            warn!(
                expected = request.event_second,
                found = found_second,
                trailer = ?trailer,
                "Frame time does not match requested event, extracting anyway"
            );
        }

        // 输出文件名取落点帧的尾部时间
        let name = naming::event_file_name(
            &self.device_id,
            &candidate.trailer_time()?,
            request.duration,
        );
        let output_path = self.events_dir.join(&name);
        let mut output = File::create(&output_path)?;
        info!(file = %output_path.display(), "Extracted event file created");

        self.write_handshake(&output_path)?;

        let mut frames_copied = 0u32;
        if request.duration > 0 {
            write_all_retrying(&mut output, candidate.as_bytes(), &output_path)?;
            frames_copied += 1;
            while frames_copied < request.duration {
                let frame = read_frame(&mut reader)
                    .map_err(|e| at_eof(e, request.duration - frames_copied))?;
                write_all_retrying(&mut output, frame.as_bytes(), &output_path)?;
                frames_copied += 1;
            }
        }

        info!(frames = frames_copied, "Extraction finished");
        Ok(ExtractionOutcome {
            output_path,
            frames_copied,
            matched,
        })
    }

    fn resolve_store_path(&self, store_file: &Path) -> PathBuf {
        if store_file.is_absolute() {
            store_file.to_path_buf()
        } else {
            self.continuous_dir.join(store_file)
        }
    }

    /// 把输出文件路径写进事件握手文件，供下游消费者发现
    fn write_handshake(&self, output_path: &Path) -> Result<(), AcqError> {
        use std::io::Write;
        let handshake = self.temp_dir.join(EVENT_HANDSHAKE_FILE);
        let mut file = File::create(&handshake)?;
        writeln!(file, "{}", output_path.display())?;
        Ok(())
    }
}

/// 短读视为存储耗尽
fn at_eof(e: std::io::Error, wanted: u32) -> AcqError {
    if e.kind() == ErrorKind::UnexpectedEof {
        AcqError::StoreExhausted { wanted }
    } else {
        AcqError::Io(e)
    }
}

fn read_frame<R: Read>(reader: &mut R) -> std::io::Result<SampleFrame> {
    let mut bytes = Box::new([0u8; FRAME_LEN]);
    reader.read_exact(&mut bytes[..])?;
    Ok(SampleFrame::from(bytes))
}
