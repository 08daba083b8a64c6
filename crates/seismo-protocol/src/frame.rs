//! 采样帧模型
//!
//! 控制板在采样期间每秒产出一帧固定 2506 字节的记录：
//! 前 2500 字节是采样 payload（格式归控制板所有，本系统不解释），
//! 末 6 字节是捕获该帧时的墙钟时间尾部。

use crate::{DeviceTime, ProtocolError};

/// 采样帧总长度（字节）
pub const FRAME_LEN: usize = 2506;
/// payload 长度（字节 [0, 2499]，内容不透明）
pub const PAYLOAD_LEN: usize = 2500;
/// 时间尾部长度（字节 [2500, 2505]）
pub const TRAILER_LEN: usize = 6;

/// 一帧 2506 字节的采样记录
///
/// 不变式：尾部编码控制板捕获 payload 时的墙钟秒；
/// 良构流中相邻帧恰好相差一秒。
#[derive(Clone, PartialEq, Eq)]
pub struct SampleFrame {
    bytes: Box<[u8; FRAME_LEN]>,
}

impl SampleFrame {
    /// 从恰好 [`FRAME_LEN`] 字节的切片构造
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ProtocolError> {
        if bytes.len() != FRAME_LEN {
            return Err(ProtocolError::InvalidLength {
                expected: FRAME_LEN,
                actual: bytes.len(),
            });
        }
        let mut owned = Box::new([0u8; FRAME_LEN]);
        owned.copy_from_slice(bytes);
        Ok(Self { bytes: owned })
    }

    /// 由 payload 与时间尾部拼装（测试与回放工具使用）
    pub fn from_parts(payload: &[u8], time: &DeviceTime) -> Result<Self, ProtocolError> {
        if payload.len() != PAYLOAD_LEN {
            return Err(ProtocolError::InvalidLength {
                expected: PAYLOAD_LEN,
                actual: payload.len(),
            });
        }
        let mut owned = Box::new([0u8; FRAME_LEN]);
        owned[..PAYLOAD_LEN].copy_from_slice(payload);
        owned[PAYLOAD_LEN..].copy_from_slice(&time.to_trailer_bytes());
        Ok(Self { bytes: owned })
    }

    /// 完整 2506 字节（存储与分发路径写出的就是这段原始字节）
    pub fn as_bytes(&self) -> &[u8; FRAME_LEN] {
        &self.bytes
    }

    /// 不透明 payload（[0, 2499]）
    pub fn payload(&self) -> &[u8] {
        &self.bytes[..PAYLOAD_LEN]
    }

    /// 原始时间尾部（[2500, 2505]）
    pub fn trailer(&self) -> [u8; TRAILER_LEN] {
        let mut trailer = [0u8; TRAILER_LEN];
        trailer.copy_from_slice(&self.bytes[PAYLOAD_LEN..]);
        trailer
    }

    /// 解码时间尾部
    pub fn trailer_time(&self) -> Result<DeviceTime, ProtocolError> {
        DeviceTime::from_trailer_bytes(self.trailer())
    }
}

impl From<Box<[u8; FRAME_LEN]>> for SampleFrame {
    fn from(bytes: Box<[u8; FRAME_LEN]>) -> Self {
        Self { bytes }
    }
}

impl std::fmt::Debug for SampleFrame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // payload 不透明，调试输出只展示尾部
        f.debug_struct("SampleFrame")
            .field("trailer", &self.trailer())
            .finish_non_exhaustive()
    }
}
