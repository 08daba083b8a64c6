//! 采集守护进程主入口
//!
//! 启动顺序：日志 → 配置 → 链路起竿 → 时钟仲裁 → 信号处理 →
//! 初始采集文件 → 分发通道 → 采集循环。任何致命启动错误都在
//! 记录后以非零状态退出。

use std::path::PathBuf;
use std::process;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tracing::{error, info};

use seismo_acq::{
    Acquisition, ClockArbiter, ContinuousStore, DEFAULT_CHANNEL_PATH, DistributionChannel,
    NodeConfig, ShutdownFlag,
};
use seismo_link::{InterruptLine, Pacing};

/// 地震计节点连续采集守护进程
#[derive(Parser, Debug)]
#[command(name = "seismo-daemon", about = "Continuous acquisition daemon", long_about = None)]
struct Cli {
    /// 配置文件路径（缺省 $SEISMO_ROOT/config/device.json）
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// 链路字节间延时（微秒）
    #[arg(long, default_value_t = 10)]
    spi_delay_us: u64,

    /// 分发通道（命名 FIFO）路径
    #[arg(long, default_value = DEFAULT_CHANNEL_PATH)]
    channel: PathBuf,
}

fn main() {
    // 日志级别由 RUST_LOG 控制（如 RUST_LOG=debug）
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    info!("seismo-daemon starting up...");
    let cli = Cli::parse();

    let Some(config_path) = cli.config.clone().or_else(NodeConfig::default_path) else {
        error!("No --config given and SEISMO_ROOT is not set");
        process::exit(1);
    };
    let config = match NodeConfig::load(&config_path) {
        Ok(config) => config,
        Err(e) => {
            error!(file = %config_path.display(), error = %e, "Cannot load device configuration");
            process::exit(1);
        }
    };
    info!(
        device_id = %config.device_id,
        clock_source = config.clock_source,
        "Configuration loaded"
    );

    if let Err(e) = run(&cli, &config) {
        error!("seismo-daemon failed: {e:#}");
        process::exit(1);
    }
    info!("seismo-daemon finished");
}

fn run(cli: &Cli, config: &NodeConfig) -> anyhow::Result<()> {
    let (bus, mut irq, indicator) =
        backend::bring_up().context("cannot acquire the transceiver capability")?;
    let events = irq
        .subscribe()
        .context("cannot subscribe to the interrupt line")?;

    let mut acq = Acquisition::new(
        bus,
        Pacing::new(Duration::from_micros(cli.spi_delay_us)),
        ContinuousStore::new(config),
        DistributionChannel::new(cli.channel.clone()),
        ClockArbiter::from_code(config.clock_source),
        indicator,
    );

    // 本地源在此完成一次时间推送；GPS/RTC 只发请求，确认经 B2 异步到达
    acq.engage_clock().context("clock arbitration failed")?;

    let shutdown = ShutdownFlag::new();
    shutdown
        .install_signal_handlers()
        .context("cannot register signal handlers")?;

    acq.store_mut()
        .open_initial()
        .context("cannot create the initial continuous store file")?;
    acq.channel()
        .ensure_exists()
        .context("cannot create the distribution channel")?;

    acq.run(&events, &shutdown);
    Ok(())
}

#[cfg(feature = "mock")]
mod backend {
    use seismo_link::mock::{MockBus, MockIndicator, MockInterruptLine};
    use seismo_link::{LinkError, StatusIndicator};
    use tracing::info;

    pub fn bring_up()
    -> Result<(MockBus, MockInterruptLine, Box<dyn StatusIndicator + Send>), LinkError> {
        info!("Link backend: mock (no hardware attached)");
        let mut indicator = MockIndicator::new();
        indicator.set(true);
        Ok((MockBus::new(), MockInterruptLine::new(), Box::new(indicator)))
    }
}

#[cfg(not(feature = "mock"))]
compile_error!(
    "no link backend selected: build with `--features mock` or link a hardware backend crate"
);
