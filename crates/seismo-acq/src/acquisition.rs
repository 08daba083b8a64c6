//! 命令分发与采集主循环
//!
//! 中断线的每个上升沿代表控制板有一条命令待处理。处理流程是一次
//! 固定的 3 字节查询交换（`A0`/应答/`F0`），随后按应答分支：
//!
//! - `B1`：批量传输——`A3` 起始，逐字节收 2506 字节（链路无流控，
//!   每字节间隔一个配置节拍），`F3` 收尾；组装出的帧先进连续存储，
//!   再投分发通道。
//! - `B2`：时间上报——`A5` 起始，收 1 字节时间源代码与 6 字节远端
//!   时间，`F5` 收尾；交给仲裁器记录后立即轮转存储文件，并命令
//!   控制板开始采样（`A1`/`01`/`F1`）。
//! - 其他应答：未识别的操作，不做任何事。
//!
//! 字节丢失在本层不检测也不重传，成帧完整性完全依赖双方遵守
//! 定界操作码。中断事件经单一有界队列进入唯一的消费循环，处理
//! 函数运行到完成后才取下一个事件，天然不可重入。

use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError};
use seismo_link::{ByteBus, IrqEvent, Pacing, StatusIndicator};
use seismo_protocol::{
    ARG_START_SAMPLING, ARG_STOP_SAMPLING, CMD_QUERY_OPERATION, CMD_READ_FRAME,
    CMD_READ_REMOTE_TIME, CMD_START_SAMPLING, CMD_STOP_SAMPLING, DUMMY, END_QUERY_OPERATION,
    END_READ_FRAME, END_READ_REMOTE_TIME, END_START_SAMPLING, END_STOP_SAMPLING, FRAME_LEN,
    OP_FRAME_READY, OP_TIME_REPORT, SampleFrame,
};
use tracing::{error, info, trace, warn};

use crate::channel::DistributionChannel;
use crate::clock::ClockArbiter;
use crate::error::AcqError;
use crate::lifecycle::ShutdownFlag;
use crate::store::ContinuousStore;

/// 空闲轮询间隔，也是停机延迟的上界
const IDLE_POLL: Duration = Duration::from_millis(50);

/// 采集上下文
///
/// 活动文件句柄、轮转簿记与仲裁状态都集中在这里，随上下文整体
/// 传进分发路径；没有进程级可变全局。
pub struct Acquisition<B: ByteBus> {
    bus: B,
    pacing: Pacing,
    store: ContinuousStore,
    channel: DistributionChannel,
    arbiter: ClockArbiter,
    indicator: Box<dyn StatusIndicator + Send>,
}

impl<B: ByteBus> Acquisition<B> {
    pub fn new(
        bus: B,
        pacing: Pacing,
        store: ContinuousStore,
        channel: DistributionChannel,
        arbiter: ClockArbiter,
        indicator: Box<dyn StatusIndicator + Send>,
    ) -> Self {
        Self {
            bus,
            pacing,
            store,
            channel,
            arbiter,
            indicator,
        }
    }

    pub fn store(&self) -> &ContinuousStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut ContinuousStore {
        &mut self.store
    }

    pub fn channel(&self) -> &DistributionChannel {
        &self.channel
    }

    pub fn arbiter(&self) -> &ClockArbiter {
        &self.arbiter
    }

    pub fn bus_mut(&mut self) -> &mut B {
        &mut self.bus
    }

    /// 执行配置好的时钟仲裁策略（启动时一次）
    pub fn engage_clock(&mut self) -> Result<(), AcqError> {
        self.arbiter.engage(&mut self.bus, &self.pacing)
    }

    /// 采集主循环
    ///
    /// 空闲时只在中断队列上带超时地等待；停机标志在每个轮询周期
    /// 的顶端检查。循环退出前关闭活动文件。
    pub fn run(&mut self, events: &Receiver<IrqEvent>, shutdown: &ShutdownFlag) {
        info!("Acquisition loop running");
        while !shutdown.is_set() {
            match events.recv_timeout(IDLE_POLL) {
                Ok(IrqEvent) => {
                    if let Err(e) = self.handle_interrupt() {
                        // 单次交换失败不终止采集
                        error!(error = %e, "Command exchange failed");
                    }
                }
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => {
                    warn!("Interrupt source disconnected, stopping acquisition");
                    break;
                }
            }
        }
        self.store.close();
        info!("Acquisition loop stopped");
    }

    /// 处理一个上升沿：查询操作并分发
    pub fn handle_interrupt(&mut self) -> Result<(), AcqError> {
        self.indicator.toggle();

        self.exchange(CMD_QUERY_OPERATION)?;
        let operation = self.exchange(DUMMY)?;
        self.exchange(END_QUERY_OPERATION)?;

        match operation {
            OP_FRAME_READY => self.transfer_frame(),
            OP_TIME_REPORT => self.handle_time_report(),
            other => {
                trace!("Unrecognized operation {other:#04X}, ignoring");
                Ok(())
            }
        }
    }

    /// 命令控制板开始采样
    pub fn start_sampling(&mut self) -> Result<(), AcqError> {
        info!("Starting sampling...");
        self.exchange(CMD_START_SAMPLING)?;
        self.exchange(ARG_START_SAMPLING)?;
        self.exchange(END_START_SAMPLING)?;
        Ok(())
    }

    /// 命令控制板停止采样（命令集的一部分，主循环不发出）
    pub fn stop_sampling(&mut self) -> Result<(), AcqError> {
        info!("Stopping sampling...");
        self.exchange(CMD_STOP_SAMPLING)?;
        self.exchange(ARG_STOP_SAMPLING)?;
        self.exchange(END_STOP_SAMPLING)?;
        Ok(())
    }

    /// `B1`：收一帧 2506 字节，先存储后分发
    fn transfer_frame(&mut self) -> Result<(), AcqError> {
        self.exchange(CMD_READ_FRAME)?;
        let mut bytes = vec![0u8; FRAME_LEN];
        for byte in bytes.iter_mut() {
            *byte = self.exchange(DUMMY)?;
        }
        self.exchange(END_READ_FRAME)?;

        let frame = SampleFrame::from_bytes(&bytes)?;
        // 存储在前、分发在后；两条路径互不影响对方的结果
        let stored = self.store.append(&frame);
        self.channel.publish(&frame);
        stored.map(|_| ())
    }

    /// `B2`：读时间上报，轮转存储文件，启动采样
    fn handle_time_report(&mut self) -> Result<(), AcqError> {
        self.exchange(CMD_READ_REMOTE_TIME)?;
        let code = self.exchange(DUMMY)?;
        let mut wire_time = [0u8; 6];
        for byte in wire_time.iter_mut() {
            *byte = self.exchange(DUMMY)?;
        }
        self.exchange(END_READ_REMOTE_TIME)?;

        self.arbiter.handle_report(code, wire_time);

        // 时间交换后从新文件开始；轮转失败已记 CRITICAL，采样照常启动
        if let Err(e) = self.store.rotate_now() {
            error!(error = %e, "Rotation after time report failed");
        }
        self.start_sampling()
    }

    /// 一次字节交换加一个节拍
    fn exchange(&mut self, byte: u8) -> Result<u8, AcqError> {
        let reply = self.bus.transfer(byte)?;
        self.pacing.pause();
        Ok(reply)
    }
}
