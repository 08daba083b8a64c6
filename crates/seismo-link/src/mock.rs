//! 纯软件 mock 后端
//!
//! `MockBus` 按脚本应答：事先排入应答字节，交换时依次弹出，
//! 队列耗尽后返回占位 0x00；同时记录发出的每个字节，
//! 供测试核对完整的操作码序列。

use crate::{ByteBus, InterruptLine, IrqEvent, LinkError, StatusIndicator};
use crossbeam_channel::{Receiver, Sender, bounded};
use std::collections::VecDeque;

/// 脚本化字节总线
#[derive(Default)]
pub struct MockBus {
    replies: VecDeque<u8>,
    sent: Vec<u8>,
}

impl MockBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// 排入一段应答字节（控制板视角的发送内容）
    pub fn queue_replies(&mut self, bytes: &[u8]) {
        self.replies.extend(bytes.iter().copied());
    }

    /// 迄今发出的全部字节
    pub fn sent(&self) -> &[u8] {
        &self.sent
    }

    /// 清空发送记录（分段核对交换序列时使用）
    pub fn clear_sent(&mut self) {
        self.sent.clear();
    }
}

impl ByteBus for MockBus {
    fn transfer(&mut self, byte: u8) -> Result<u8, LinkError> {
        self.sent.push(byte);
        Ok(self.replies.pop_front().unwrap_or(0x00))
    }
}

/// 可注入的中断线
///
/// 测试端持有 [`MockInterruptLine::trigger`] 的发送侧模拟上升沿。
pub struct MockInterruptLine {
    tx: Sender<IrqEvent>,
    rx: Receiver<IrqEvent>,
}

impl MockInterruptLine {
    /// 队列容量与真实后端一致：中断按 1 Hz 到达，积压即异常
    pub fn new() -> Self {
        let (tx, rx) = bounded(16);
        Self { tx, rx }
    }

    /// 模拟一次上升沿
    pub fn trigger(&self) {
        if self.tx.try_send(IrqEvent).is_err() {
            tracing::warn!("Interrupt queue full, rising edge dropped");
        }
    }

    /// 注入端句柄（跨线程触发时克隆）
    pub fn trigger_handle(&self) -> Sender<IrqEvent> {
        self.tx.clone()
    }
}

impl Default for MockInterruptLine {
    fn default() -> Self {
        Self::new()
    }
}

impl InterruptLine for MockInterruptLine {
    fn subscribe(&mut self) -> Result<Receiver<IrqEvent>, LinkError> {
        Ok(self.rx.clone())
    }
}

/// 记录开关状态的指示灯
#[derive(Default)]
pub struct MockIndicator {
    on: bool,
    toggles: u32,
}

impl MockIndicator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_on(&self) -> bool {
        self.on
    }

    pub fn toggle_count(&self) -> u32 {
        self.toggles
    }
}

impl StatusIndicator for MockIndicator {
    fn set(&mut self, on: bool) {
        self.on = on;
    }

    fn toggle(&mut self) {
        self.on = !self.on;
        self.toggles += 1;
    }
}
