//! # Seismo 协议层
//!
//! 负责传感器控制板（dsPIC）与采集端之间的固定命令集与采样帧编码：
//! 2506 字节采样帧、6 字节时间尾部、时钟源代码与操作码常量。
//!
//! 本层只做字节级编解码，不触碰硬件，也不解释 payload 内容。

pub mod frame;
pub mod opcodes;
pub mod time;

pub use frame::{FRAME_LEN, PAYLOAD_LEN, SampleFrame, TRAILER_LEN};
pub use opcodes::*;
pub use time::{ClockSource, DeviceTime, TimeReportCode};

use thiserror::Error;

/// 协议解析错误类型
#[derive(Error, Debug)]
pub enum ProtocolError {
    #[error("Invalid frame length: expected {expected}, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    #[error("Time field {field} out of range: {value}")]
    TimeFieldOutOfRange { field: &'static str, value: u8 },

    #[error("Unknown clock source code: {code}")]
    UnknownClockSource { code: u8 },
}
