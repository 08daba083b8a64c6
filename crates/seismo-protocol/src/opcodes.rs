//! 命令集操作码定义
//!
//! 每条命令都是一次同步的请求/应答交换，以起始操作码开始、
//! 以结束操作码收尾；链路本身没有流控，帧完整性完全依赖双方
//! 遵守这些定界符。

// ============================================================================
// 操作查询（中断触发后的首次交换）
// ============================================================================

/// 查询控制板请求的操作
pub const CMD_QUERY_OPERATION: u8 = 0xA0;
/// 操作查询结束定界符
pub const END_QUERY_OPERATION: u8 = 0xF0;

/// 应答：有一帧采样数据待传输
pub const OP_FRAME_READY: u8 = 0xB1;
/// 应答：控制板要上报时间源与时钟读数
pub const OP_TIME_REPORT: u8 = 0xB2;

// ============================================================================
// 采样控制
// ============================================================================

/// 开始采样
pub const CMD_START_SAMPLING: u8 = 0xA1;
/// 开始采样的参数字节
pub const ARG_START_SAMPLING: u8 = 0x01;
/// 开始采样结束定界符
pub const END_START_SAMPLING: u8 = 0xF1;

/// 停止采样（命令集的一部分，主循环不会主动发出）
pub const CMD_STOP_SAMPLING: u8 = 0xA2;
/// 停止采样的参数字节
pub const ARG_STOP_SAMPLING: u8 = 0x02;
/// 停止采样结束定界符
pub const END_STOP_SAMPLING: u8 = 0xF2;

// ============================================================================
// 采样帧批量传输
// ============================================================================

/// 开始读取一帧 2506 字节采样数据
pub const CMD_READ_FRAME: u8 = 0xA3;
/// 采样帧读取结束定界符
pub const END_READ_FRAME: u8 = 0xF3;

// ============================================================================
// 时间交换
// ============================================================================

/// 向控制板推送本地时间（6 字节，线序）
pub const CMD_SEND_LOCAL_TIME: u8 = 0xA4;
/// 本地时间推送结束定界符
pub const END_SEND_LOCAL_TIME: u8 = 0xF4;

/// 读取控制板的时间源代码与时钟读数
pub const CMD_READ_REMOTE_TIME: u8 = 0xA5;
/// 远端时间读取结束定界符
pub const END_READ_REMOTE_TIME: u8 = 0xF5;

/// 请求切换参考时钟源（参数 = 0/1/2）
pub const CMD_SELECT_CLOCK_SOURCE: u8 = 0xA6;
/// 时钟源切换结束定界符
pub const END_SELECT_CLOCK_SOURCE: u8 = 0xF6;

// ============================================================================
// 其他
// ============================================================================

/// 读取应答时发送的占位字节
pub const DUMMY: u8 = 0x00;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opcode_values() {
        // 验证命令集与控制板固件约定的一致性
        assert_eq!(CMD_QUERY_OPERATION, 0xA0);
        assert_eq!(END_QUERY_OPERATION, 0xF0);
        assert_eq!(OP_FRAME_READY, 0xB1);
        assert_eq!(OP_TIME_REPORT, 0xB2);
        assert_eq!(CMD_START_SAMPLING, 0xA1);
        assert_eq!(CMD_STOP_SAMPLING, 0xA2);
        assert_eq!(CMD_READ_FRAME, 0xA3);
        assert_eq!(CMD_SEND_LOCAL_TIME, 0xA4);
        assert_eq!(CMD_READ_REMOTE_TIME, 0xA5);
        assert_eq!(CMD_SELECT_CLOCK_SOURCE, 0xA6);
    }

    #[test]
    fn test_begin_end_pairing() {
        // 每条命令的结束定界符 = 起始操作码的高半字节换成 0xF
        let pairs = [
            (CMD_QUERY_OPERATION, END_QUERY_OPERATION),
            (CMD_START_SAMPLING, END_START_SAMPLING),
            (CMD_STOP_SAMPLING, END_STOP_SAMPLING),
            (CMD_READ_FRAME, END_READ_FRAME),
            (CMD_SEND_LOCAL_TIME, END_SEND_LOCAL_TIME),
            (CMD_READ_REMOTE_TIME, END_READ_REMOTE_TIME),
            (CMD_SELECT_CLOCK_SOURCE, END_SELECT_CLOCK_SOURCE),
        ];
        for (cmd, end) in pairs {
            assert_eq!(end, 0xF0 | (cmd & 0x0F));
        }
    }
}
