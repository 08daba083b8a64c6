//! # Seismo 链路抽象层
//!
//! 采集核心只依赖三个硬件能力：同步字节交换、上升沿中断订阅、
//! 状态指示灯。真实收发器（SPI 外设与中断引脚）由平台后端提供，
//! 本层只定义能力接口，并附带一个纯软件 mock 后端（`mock` feature）。

use std::time::Duration;

use crossbeam_channel::Receiver;
use thiserror::Error;

#[cfg(feature = "mock")]
pub mod mock;

/// 链路层统一错误类型
#[derive(Error, Debug)]
pub enum LinkError {
    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Bus not started")]
    NotStarted,
    #[error("Bus error: {0}")]
    Bus(String),
}

/// 同步全双工字节交换
///
/// 每次调用发出一个字节并同时收回一个字节，调用返回即交换完成。
/// 链路没有流控，节奏控制交给 [`Pacing`]。
pub trait ByteBus {
    fn transfer(&mut self, byte: u8) -> Result<u8, LinkError>;
}

/// 上升沿中断事件（控制板拉高中断线表示有命令待处理）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IrqEvent;

/// 中断线订阅
///
/// 后端把每个上升沿投入一个有界队列；采集循环是唯一消费者，
/// 处理函数天然串行、运行到完成，无需额外屏蔽。
pub trait InterruptLine {
    fn subscribe(&mut self) -> Result<Receiver<IrqEvent>, LinkError>;
}

/// 状态指示灯（原型机上是一个 GPIO LED）
pub trait StatusIndicator {
    fn set(&mut self, on: bool);
    fn toggle(&mut self);
}

/// 字节间节拍
///
/// 链路无流控，交换双方约定一个固定的字节间延时；
/// 用 `spin_sleep` 保证微秒级延时的精度。
pub struct Pacing {
    delay: Duration,
    sleeper: spin_sleep::SpinSleeper,
}

impl Pacing {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            sleeper: spin_sleep::SpinSleeper::default(),
        }
    }

    /// 配置的字节间延时
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// 在两次 transfer 之间停顿一个节拍
    pub fn pause(&self) {
        if !self.delay.is_zero() {
            self.sleeper.sleep(self.delay);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[test]
    fn test_pacing_zero_is_free() {
        let pacing = Pacing::new(Duration::ZERO);
        let start = Instant::now();
        for _ in 0..1000 {
            pacing.pause();
        }
        // 零延时不应产生可感知的停顿
        assert!(start.elapsed() < Duration::from_millis(50));
    }

    #[test]
    fn test_pacing_sleeps_at_least_delay() {
        let pacing = Pacing::new(Duration::from_micros(200));
        let start = Instant::now();
        pacing.pause();
        assert!(start.elapsed() >= Duration::from_micros(200));
    }
}
