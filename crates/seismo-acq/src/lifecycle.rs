//! 生命周期控制
//!
//! 中断/终止信号只做一件事：置位进程级原子标志。采集循环在空闲
//! 轮询的顶端检查标志，所以停机延迟以一个轮询间隔为上界；进行中的
//! 帧传输或文件写入会先运行到完成。
//!
//! SIGPIPE 无需处理：Rust 运行时默认忽略它，分发通道的断管以
//! `EPIPE` 浮出并在通道层被吞掉。

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::info;

use crate::error::AcqError;

/// 进程级停机标志
#[derive(Clone, Default)]
pub struct ShutdownFlag(Arc<AtomicBool>);

impl ShutdownFlag {
    pub fn new() -> Self {
        Self::default()
    }

    /// 请求停机（信号处理器与测试调用）
    pub fn request(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_set(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    /// 注册 SIGINT/SIGTERM 处理器
    pub fn install_signal_handlers(&self) -> Result<(), AcqError> {
        let flag = self.clone();
        ctrlc::set_handler(move || {
            info!("Termination signal received, shutting down cleanly...");
            flag.request();
        })
        .map_err(|e| AcqError::Signal(e.to_string()))
    }
}
