//! 采集层错误类型定义

use std::path::PathBuf;

use seismo_link::LinkError;
use seismo_protocol::ProtocolError;
use thiserror::Error;

/// 采集层错误类型
#[derive(Error, Debug)]
pub enum AcqError {
    /// 链路错误
    #[error("Link error: {0}")]
    Link(#[from] LinkError),

    /// 协议编解码错误
    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// 文件 IO 错误
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// 配置文件读取失败
    #[error("Cannot read config file {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        source: std::io::Error,
    },

    /// 配置文件解析失败
    #[error("Cannot parse config file {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        source: serde_json::Error,
    },

    /// 配置字段非法
    #[error("Invalid configuration: {0}")]
    ConfigInvalid(String),

    /// 信号处理器注册失败
    #[error("Signal handler registration failed: {0}")]
    Signal(String),

    /// 帧写入重试耗尽（持续性磁盘故障）
    #[error("Frame write to {path} failed after {attempts} attempts: {source}")]
    WriteRetriesExhausted {
        path: PathBuf,
        attempts: usize,
        source: std::io::Error,
    },

    /// 连续存储文件为空，无法满足任何提取请求
    #[error("Continuous store {path} contains no frames")]
    EmptyStore { path: PathBuf },

    /// 请求的事件时刻早于存储起点
    #[error("Event second {event} precedes store start second {start}")]
    EventBeforeStore { event: u32, start: u32 },

    /// 存储在到达请求窗口前耗尽
    #[error("Continuous store exhausted: wanted {wanted} more frame(s)")]
    StoreExhausted { wanted: u32 },
}
