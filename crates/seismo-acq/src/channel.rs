//! 分发通道
//!
//! 把每帧原始字节尽力而为地送给本地实时消费者。通道是固定路径上的
//! 命名 FIFO；每帧单独以非阻塞写打开，不跨帧持有句柄。没有读端
//! （`ENXIO`）或读端中途断开（`EPIPE`）都只是丢掉这一帧的分发，
//! 永远不影响连续存储路径，也不给采集路径增加延迟。

use std::fs::OpenOptions;
use std::io::Write;
use std::os::unix::fs::OpenOptionsExt;
use std::path::{Path, PathBuf};

use nix::errno::Errno;
use nix::sys::stat::Mode;
use nix::unistd::mkfifo;
use seismo_protocol::SampleFrame;
use tracing::{debug, info, trace};

use crate::error::AcqError;

/// 分发通道的固定路径
pub const DEFAULT_CHANNEL_PATH: &str = "/tmp/seismo_frames";

/// 本地分发通道（仅生产者侧）
pub struct DistributionChannel {
    path: PathBuf,
}

impl DistributionChannel {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 启动时创建 FIFO；已存在不是错误
    pub fn ensure_exists(&self) -> Result<(), AcqError> {
        match mkfifo(&self.path, Mode::from_bits_truncate(0o666)) {
            Ok(()) => {
                info!(path = %self.path.display(), "Distribution channel created");
                Ok(())
            }
            Err(Errno::EEXIST) => {
                info!(path = %self.path.display(), "Distribution channel already present");
                Ok(())
            }
            Err(e) => Err(AcqError::Io(e.into())),
        }
    }

    /// 尽力而为地发布一帧；任何失败都被吞掉
    pub fn publish(&self, frame: &SampleFrame) {
        let mut writer = match OpenOptions::new()
            .write(true)
            .custom_flags(libc::O_NONBLOCK)
            .open(&self.path)
        {
            Ok(file) => file,
            Err(e) if e.raw_os_error() == Some(libc::ENXIO) => {
                // 没有读端在等，跳过这一帧的分发
                trace!("No channel reader attached, frame not distributed");
                return;
            }
            Err(e) => {
                debug!(path = %self.path.display(), error = %e, "Cannot open distribution channel");
                return;
            }
        };

        if let Err(e) = writer.write_all(frame.as_bytes()) {
            if e.raw_os_error() == Some(libc::EPIPE) {
                trace!("Channel reader disconnected mid-write");
            } else {
                debug!(error = %e, "Distribution channel write failed");
            }
        }
    }
}

// 固定路径是对外契约的一部分，Default 直接指向它
impl Default for DistributionChannel {
    fn default() -> Self {
        Self::new(DEFAULT_CHANNEL_PATH)
    }
}
