//! 参考时钟仲裁
//!
//! 启动时按配置选定一个时间源策略，只执行一次：
//!
//! - **本地**：以 ~1 ms 粒度轮询墙钟，等到系统秒为偶数时把 6 字节
//!   本地时间帧推给控制板（`A4 … F4`），一次成功推送后即完成，
//!   不需要远端确认。等待上界不足 2 秒。
//! - **GPS / RTC**：发出 `A6`/<源代码>/`F6` 后立即返回；确认稍后
//!   经 `B2` 路径异步到达。
//!
//! 配置的源代码非法时记警告并回落到本地时钟。时间源错误代码
//! 3/4/5 只作为警告浮出，不阻塞采样——收到任何 `B2` 上报（含错误
//! 上报）都会解锁建文件与采样启动。

use std::time::Duration;

use chrono::{Datelike, Local, Timelike};
use seismo_link::{ByteBus, Pacing};
use seismo_protocol::{
    CMD_SELECT_CLOCK_SOURCE, CMD_SEND_LOCAL_TIME, ClockSource, DeviceTime,
    END_SELECT_CLOCK_SOURCE, END_SEND_LOCAL_TIME, TimeReportCode,
};
use tracing::{info, warn};

use crate::error::AcqError;

/// 秒对齐轮询粒度
const ALIGN_POLL: Duration = Duration::from_millis(1);

/// 仲裁器状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArbiterState {
    /// 尚未与控制板交换过时间
    Idle,
    /// 已推送本地时间（本地源不需要远端确认）
    LocalTimePushed,
    /// 已请求 GPS/RTC，等待 `B2` 异步上报
    AwaitingReport,
    /// 已收到 `B2` 上报
    Reported(TimeReportCode),
}

/// 参考时钟仲裁器
pub struct ClockArbiter {
    source: ClockSource,
    state: ArbiterState,
    sleeper: spin_sleep::SpinSleeper,
}

impl ClockArbiter {
    /// 从配置的源代码构造；非法代码回落到本地时钟
    pub fn from_code(code: u8) -> Self {
        let source = match ClockSource::try_from(code) {
            Ok(source) => source,
            Err(_) => {
                warn!(code, "Invalid reference clock source in configuration, falling back to local clock");
                ClockSource::Local
            }
        };
        Self {
            source,
            state: ArbiterState::Idle,
            sleeper: spin_sleep::SpinSleeper::default(),
        }
    }

    pub fn source(&self) -> ClockSource {
        self.source
    }

    pub fn state(&self) -> ArbiterState {
        self.state
    }

    /// 执行选定的策略（启动时调用一次）
    pub fn engage<B: ByteBus>(&mut self, bus: &mut B, pacing: &Pacing) -> Result<(), AcqError> {
        match self.source {
            ClockSource::Local => self.push_local_time(bus, pacing),
            ClockSource::Gps | ClockSource::Rtc => self.request_remote_source(bus, pacing),
        }
    }

    /// 处理 `B2` 路径送来的时间上报
    ///
    /// 无论上报内容如何（含错误代码），调用后仲裁即视为已确认，
    /// 采样流程继续。
    pub fn handle_report(&mut self, code_byte: u8, wire_time: [u8; 6]) -> TimeReportCode {
        let code = TimeReportCode::from_code(code_byte);

        match DeviceTime::from_wire_bytes(wire_time) {
            Ok(time) => {
                info!(
                    source = ?code,
                    "Controller clock: {:02}:{:02}:{:02} {:02}/{:02}/{:02}",
                    time.hour, time.minute, time.second, time.year, time.month, time.day,
                );
                if let Some(unix) = unix_timestamp(&time) {
                    info!(unix, "Controller Unix time");
                }
            }
            Err(e) => warn!(error = %e, "Time report carries an unparseable clock reading"),
        }

        match code {
            TimeReportCode::GpsChecksumFailure => {
                warn!("E3/GPS: frame checksum verification failed")
            }
            TimeReportCode::RtcUnavailable => warn!("E4/RTC: clock retrieval failed"),
            TimeReportCode::GpsNotResponding => warn!("E5/GPS: receiver not responding"),
            TimeReportCode::Unknown(c) => warn!(code = c, "Unknown time source code in report"),
            TimeReportCode::Source(_) => {}
        }

        self.state = ArbiterState::Reported(code);
        code
    }

    /// 等到偶数秒后推送一帧本地时间（线序：年-2000 月 日 时 分 秒）
    fn push_local_time<B: ByteBus>(&mut self, bus: &mut B, pacing: &Pacing) -> Result<(), AcqError> {
        info!("Waiting for an even second boundary to push local time...");
        loop {
            let now = Local::now().naive_local();
            if now.second() % 2 == 0 {
                let time = DeviceTime::new(
                    (now.year() % 100) as u8,
                    now.month() as u8,
                    now.day() as u8,
                    now.hour() as u8,
                    now.minute() as u8,
                    now.second() as u8,
                )?;

                bus.transfer(CMD_SEND_LOCAL_TIME)?;
                pacing.pause();
                for byte in time.to_wire_bytes() {
                    bus.transfer(byte)?;
                    pacing.pause();
                }
                bus.transfer(END_SEND_LOCAL_TIME)?;
                pacing.pause();

                info!(
                    "Local time pushed: {:02}:{:02}:{:02} {:02}/{:02}/{:02}",
                    time.hour, time.minute, time.second, time.year, time.month, time.day,
                );
                self.state = ArbiterState::LocalTimePushed;
                return Ok(());
            }
            self.sleeper.sleep(ALIGN_POLL);
        }
    }

    fn request_remote_source<B: ByteBus>(
        &mut self,
        bus: &mut B,
        pacing: &Pacing,
    ) -> Result<(), AcqError> {
        info!(source = ?self.source, "Requesting time from remote reference clock...");
        bus.transfer(CMD_SELECT_CLOCK_SOURCE)?;
        pacing.pause();
        bus.transfer(self.source as u8)?;
        pacing.pause();
        bus.transfer(END_SELECT_CLOCK_SOURCE)?;
        pacing.pause();
        self.state = ArbiterState::AwaitingReport;
        Ok(())
    }
}

/// 协议时间对应的 Unix 秒（日历字段组合非法时为 None）
fn unix_timestamp(time: &DeviceTime) -> Option<i64> {
    chrono::NaiveDate::from_ymd_opt(
        i32::from(time.full_year()),
        u32::from(time.month),
        u32::from(time.day),
    )?
    .and_hms_opt(
        u32::from(time.hour),
        u32::from(time.minute),
        u32::from(time.second),
    )
    .map(|dt| dt.and_utc().timestamp())
}
