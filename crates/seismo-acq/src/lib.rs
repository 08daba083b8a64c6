//! # Seismo 采集核心
//!
//! 地震计节点的实时采集逻辑：中断驱动的命令分发、采样帧的连续
//! 存储与小时轮转、参考时钟仲裁、尽力而为的本地分发通道，以及
//! 配套的离线事件提取。
//!
//! 整体是单线程协作模型：主体是带超时的空闲等待循环，全部实际
//! 工作发生在中断事件的处理路径和它发起的同步调用里。活动文件
//! 句柄与轮转簿记只被这一个采集上下文触碰。

pub mod acquisition;
pub mod channel;
pub mod clock;
pub mod config;
pub mod error;
pub mod extract;
pub mod lifecycle;
pub mod naming;
pub mod store;

pub use acquisition::Acquisition;
pub use channel::{DEFAULT_CHANNEL_PATH, DistributionChannel};
pub use clock::{ArbiterState, ClockArbiter};
pub use config::NodeConfig;
pub use error::AcqError;
pub use extract::{EventExtractor, ExtractionOutcome, ExtractionRequest};
pub use lifecycle::ShutdownFlag;
pub use store::{AppendOutcome, ContinuousStore};
