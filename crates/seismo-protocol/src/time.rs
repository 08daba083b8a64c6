//! 时间编码与时钟源代码
//!
//! 同一组年月日时分秒字段在协议里有两种字节序：
//!
//! | 场景 | 字节序 |
//! |------|--------|
//! | 采样帧尾部（存储侧） | `[日, 月, 年, 时, 分, 秒]` |
//! | `A4` 本地时间推送 / `A5` 远端时间上报（线序） | `[年, 月, 日, 时, 分, 秒]` |
//!
//! 每个字段都是 0–99 的原始小整数，不是 BCD 也不是 ASCII。

use crate::ProtocolError;
use num_enum::TryFromPrimitive;

/// 参考时钟源代码（配置值与 `A6` 参数字节）
#[derive(Debug, Clone, Copy, PartialEq, Eq, TryFromPrimitive)]
#[repr(u8)]
pub enum ClockSource {
    /// 采集端本地时钟
    Local = 0,
    /// GPS
    Gps = 1,
    /// 外部 RTC
    Rtc = 2,
}

/// `A5` 上报中时间源字节的分类
///
/// 3/4/5 是控制板定义的三个错误代码，收到后只记警告，
/// 采样流程照常继续。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeReportCode {
    /// 控制板采用的时间源
    Source(ClockSource),
    /// GPS 帧校验失败
    GpsChecksumFailure,
    /// RTC 读取失败
    RtcUnavailable,
    /// GPS 无响应
    GpsNotResponding,
    /// 未定义的代码
    Unknown(u8),
}

impl TimeReportCode {
    /// 按控制板固件的取值表分类上报字节
    pub fn from_code(code: u8) -> Self {
        match code {
            0 | 1 | 2 => {
                // 取值已核对，转换不会失败
                match ClockSource::try_from(code) {
                    Ok(source) => TimeReportCode::Source(source),
                    Err(_) => TimeReportCode::Unknown(code),
                }
            }
            3 => TimeReportCode::GpsChecksumFailure,
            4 => TimeReportCode::RtcUnavailable,
            5 => TimeReportCode::GpsNotResponding,
            other => TimeReportCode::Unknown(other),
        }
    }

    /// 是否为控制板定义的错误代码之一
    pub fn is_error(&self) -> bool {
        matches!(
            self,
            TimeReportCode::GpsChecksumFailure
                | TimeReportCode::RtcUnavailable
                | TimeReportCode::GpsNotResponding
        )
    }
}

/// 协议时间（两位年 + 月日时分秒）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceTime {
    /// 年（0–99，相对 2000/1900 的偏移，见 [`DeviceTime::full_year`]）
    pub year: u8,
    pub month: u8,
    pub day: u8,
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
}

impl DeviceTime {
    /// 逐字段校验后构造
    pub fn new(
        year: u8,
        month: u8,
        day: u8,
        hour: u8,
        minute: u8,
        second: u8,
    ) -> Result<Self, ProtocolError> {
        let check = |field: &'static str, value: u8, min: u8, max: u8| {
            if value < min || value > max {
                Err(ProtocolError::TimeFieldOutOfRange { field, value })
            } else {
                Ok(())
            }
        };
        check("year", year, 0, 99)?;
        check("month", month, 1, 12)?;
        check("day", day, 1, 31)?;
        check("hour", hour, 0, 23)?;
        check("minute", minute, 0, 59)?;
        check("second", second, 0, 59)?;
        Ok(Self {
            year,
            month,
            day,
            hour,
            minute,
            second,
        })
    }

    /// 从采样帧尾部字节序解码：`[日, 月, 年, 时, 分, 秒]`
    pub fn from_trailer_bytes(bytes: [u8; 6]) -> Result<Self, ProtocolError> {
        Self::new(bytes[2], bytes[1], bytes[0], bytes[3], bytes[4], bytes[5])
    }

    /// 编码为采样帧尾部字节序
    pub fn to_trailer_bytes(&self) -> [u8; 6] {
        [
            self.day,
            self.month,
            self.year,
            self.hour,
            self.minute,
            self.second,
        ]
    }

    /// 从线序解码：`[年, 月, 日, 时, 分, 秒]`
    pub fn from_wire_bytes(bytes: [u8; 6]) -> Result<Self, ProtocolError> {
        Self::new(bytes[0], bytes[1], bytes[2], bytes[3], bytes[4], bytes[5])
    }

    /// 编码为线序（`A4` 推送 / `A5` 上报）
    pub fn to_wire_bytes(&self) -> [u8; 6] {
        [
            self.year,
            self.month,
            self.day,
            self.hour,
            self.minute,
            self.second,
        ]
    }

    /// 当日秒数（0–86399），事件提取的寻址单位
    pub fn seconds_of_day(&self) -> u32 {
        u32::from(self.hour) * 3600 + u32::from(self.minute) * 60 + u32::from(self.second)
    }

    /// 完整年份：两位年 < 70 按 20xx，否则按 19xx
    pub fn full_year(&self) -> u16 {
        if self.year < 70 {
            2000 + u16::from(self.year)
        } else {
            1900 + u16::from(self.year)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trailer_roundtrip() {
        // 尾部序：日 月 年 时 分 秒
        let t = DeviceTime::from_trailer_bytes([13, 9, 19, 17, 45, 0]).unwrap();
        assert_eq!(t.day, 13);
        assert_eq!(t.month, 9);
        assert_eq!(t.year, 19);
        assert_eq!(t.hour, 17);
        assert_eq!(t.minute, 45);
        assert_eq!(t.second, 0);
        assert_eq!(t.to_trailer_bytes(), [13, 9, 19, 17, 45, 0]);
    }

    #[test]
    fn test_wire_order_differs_from_trailer() {
        let t = DeviceTime::new(21, 3, 24, 10, 30, 59).unwrap();
        assert_eq!(t.to_wire_bytes(), [21, 3, 24, 10, 30, 59]);
        assert_eq!(t.to_trailer_bytes(), [24, 3, 21, 10, 30, 59]);
    }

    #[test]
    fn test_seconds_of_day() {
        let t = DeviceTime::new(21, 1, 1, 1, 0, 0).unwrap();
        assert_eq!(t.seconds_of_day(), 3600);
        let end = DeviceTime::new(21, 12, 31, 23, 59, 59).unwrap();
        assert_eq!(end.seconds_of_day(), 86_399);
    }

    #[test]
    fn test_full_year_pivot() {
        // < 70 → 20xx，>= 70 → 19xx
        assert_eq!(DeviceTime::new(21, 1, 1, 0, 0, 0).unwrap().full_year(), 2021);
        assert_eq!(DeviceTime::new(69, 1, 1, 0, 0, 0).unwrap().full_year(), 2069);
        assert_eq!(DeviceTime::new(70, 1, 1, 0, 0, 0).unwrap().full_year(), 1970);
        assert_eq!(DeviceTime::new(99, 1, 1, 0, 0, 0).unwrap().full_year(), 1999);
    }

    #[test]
    fn test_out_of_range_fields() {
        assert!(DeviceTime::new(21, 13, 1, 0, 0, 0).is_err());
        assert!(DeviceTime::new(21, 0, 1, 0, 0, 0).is_err());
        assert!(DeviceTime::new(21, 1, 32, 0, 0, 0).is_err());
        assert!(DeviceTime::new(21, 1, 1, 24, 0, 0).is_err());
        assert!(DeviceTime::new(21, 1, 1, 0, 60, 0).is_err());
        assert!(DeviceTime::new(21, 1, 1, 0, 0, 60).is_err());
    }

    #[test]
    fn test_time_report_codes() {
        assert_eq!(
            TimeReportCode::from_code(0),
            TimeReportCode::Source(ClockSource::Local)
        );
        assert_eq!(
            TimeReportCode::from_code(1),
            TimeReportCode::Source(ClockSource::Gps)
        );
        assert_eq!(
            TimeReportCode::from_code(2),
            TimeReportCode::Source(ClockSource::Rtc)
        );
        assert_eq!(TimeReportCode::from_code(3), TimeReportCode::GpsChecksumFailure);
        assert_eq!(TimeReportCode::from_code(4), TimeReportCode::RtcUnavailable);
        assert_eq!(TimeReportCode::from_code(5), TimeReportCode::GpsNotResponding);
        assert_eq!(TimeReportCode::from_code(9), TimeReportCode::Unknown(9));

        assert!(TimeReportCode::from_code(3).is_error());
        assert!(TimeReportCode::from_code(4).is_error());
        assert!(TimeReportCode::from_code(5).is_error());
        assert!(!TimeReportCode::from_code(0).is_error());
        assert!(!TimeReportCode::from_code(9).is_error());
    }

    #[test]
    fn test_clock_source_from_primitive() {
        assert_eq!(ClockSource::try_from(0u8).unwrap(), ClockSource::Local);
        assert_eq!(ClockSource::try_from(1u8).unwrap(), ClockSource::Gps);
        assert_eq!(ClockSource::try_from(2u8).unwrap(), ClockSource::Rtc);
        assert!(ClockSource::try_from(3u8).is_err());
    }
}
