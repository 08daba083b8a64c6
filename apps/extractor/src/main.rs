//! 事件提取工具主入口
//!
//! 对连续存储文件执行一次有界提取：
//!
//! ```text
//! seismo-extract RSA01_210324-100000.dat 36030 60
//! ```

use std::path::PathBuf;
use std::process;

use clap::Parser;
use tracing::{error, info};

use seismo_acq::{EventExtractor, ExtractionRequest, NodeConfig};

/// 从连续存储中提取一段事件窗口
#[derive(Parser, Debug)]
#[command(name = "seismo-extract", about = "Extract an event window from the continuous store", long_about = None)]
struct Cli {
    /// 连续存储文件（相对名在配置的连续存储目录下解析）
    store_file: PathBuf,

    /// 事件时刻，当日秒数（时*3600 + 分*60 + 秒）
    event_second: u32,

    /// 提取帧数（每帧一秒）
    duration: u32,

    /// 配置文件路径（缺省 $SEISMO_ROOT/config/device.json）
    #[arg(short, long)]
    config: Option<PathBuf>,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

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

    let request = ExtractionRequest {
        store_file: cli.store_file,
        event_second: cli.event_second,
        duration: cli.duration,
    };

    match EventExtractor::new(&config).extract(&request) {
        Ok(outcome) => {
            info!(
                frames = outcome.frames_copied,
                matched = outcome.matched,
                "Extraction complete"
            );
            println!("{}", outcome.output_path.display());
        }
        Err(e) => {
            error!(error = %e, "Extraction failed");
            process::exit(1);
        }
    }
}
