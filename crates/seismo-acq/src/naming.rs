//! 产出文件命名
//!
//! 文件名由类型化字段结构化拼装，字段范围在解码时已经校验，
//! 不依赖定宽截断。

use chrono::NaiveDateTime;
use seismo_protocol::DeviceTime;

/// 连续存储握手文件名（两行：当前文件名、上一个文件名）
pub const STORE_HANDSHAKE_FILE: &str = "continuous_store_name.tmp";
/// 事件提取握手文件名（一行：输出文件路径）
pub const EVENT_HANDSHAKE_FILE: &str = "extracted_event_name.tmp";

/// 连续存储文件名：`<id>_<YYMMDD-HHMMSS>.dat`，时间戳取文件创建时刻
pub fn store_file_name(device_id: &str, created: NaiveDateTime) -> String {
    format!("{}_{}.dat", device_id, created.format("%y%m%d-%H%M%S"))
}

/// 事件文件名：`<id>_<YYYYMMDD>_<HHMMSS>_<NNN>.dat`，时间取事件帧尾部
pub fn event_file_name(device_id: &str, event: &DeviceTime, duration: u32) -> String {
    format!(
        "{}_{:04}{:02}{:02}_{:02}{:02}{:02}_{:03}.dat",
        device_id,
        event.full_year(),
        event.month,
        event.day,
        event.hour,
        event.minute,
        event.second,
        duration,
    )
}
