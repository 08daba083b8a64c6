//! 采集 → 提取端到端测试
//!
//! 用 mock 总线喂出一段连续采样帧，验证连续存储落盘的内容
//! 可以被事件提取器按时间寻址并逐字节取回。

use std::path::Path;
use std::time::Duration;

use seismo_acq::{
    Acquisition, AppendOutcome, ClockArbiter, ContinuousStore, DistributionChannel,
    EventExtractor, ExtractionRequest, NodeConfig, ShutdownFlag,
};
use seismo_link::Pacing;
use seismo_link::mock::{MockBus, MockIndicator, MockInterruptLine};
use seismo_protocol::{DeviceTime, FRAME_LEN, OP_FRAME_READY, PAYLOAD_LEN, SampleFrame};

fn test_config(dir: &Path) -> NodeConfig {
    let json = format!(
        r#"{{
            "device_id": "RSA01",
            "continuous_dir": "{0}",
            "temp_dir": "{0}",
            "events_dir": "{0}",
            "clock_source": 0
        }}"#,
        dir.display()
    );
    serde_json::from_str(&json).unwrap()
}

fn frame(second: u8) -> SampleFrame {
    let time = DeviceTime::new(21, 3, 24, 10, 0, second).unwrap();
    let mut payload = [0u8; PAYLOAD_LEN];
    payload[0] = second;
    SampleFrame::from_parts(&payload, &time).unwrap()
}

#[test]
fn acquired_frames_can_be_extracted_by_time() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path());

    let mut acq = Acquisition::new(
        MockBus::new(),
        Pacing::new(Duration::ZERO),
        ContinuousStore::new(&config),
        DistributionChannel::new(dir.path().join("frames.fifo")),
        ClockArbiter::from_code(config.clock_source),
        Box::new(MockIndicator::new()),
    );

    // 控制板连续给出 5 帧（秒 0..4）
    for second in 0..5u8 {
        acq.bus_mut().queue_replies(&[OP_FRAME_READY]);
        acq.bus_mut().queue_replies(frame(second).as_bytes());
        acq.handle_interrupt().unwrap();
    }

    let store_path = acq.store().active_path().unwrap().to_path_buf();
    let len = std::fs::metadata(&store_path).unwrap().len();
    assert_eq!(len, (5 * FRAME_LEN) as u64);

    // 对落盘文件按时间提取秒 2 起的 2 帧
    let outcome = EventExtractor::new(&config)
        .extract(&ExtractionRequest {
            store_file: store_path,
            event_second: 10 * 3600 + 2,
            duration: 2,
        })
        .unwrap();

    assert!(outcome.matched);
    let extracted = std::fs::read(&outcome.output_path).unwrap();
    let mut expected = Vec::new();
    expected.extend_from_slice(frame(2).as_bytes());
    expected.extend_from_slice(frame(3).as_bytes());
    assert_eq!(extracted, expected);
}

#[test]
fn store_write_succeeds_with_absent_channel_reader() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path());

    let channel = DistributionChannel::new(dir.path().join("frames.fifo"));
    channel.ensure_exists().unwrap();

    let mut store = ContinuousStore::new(&config);
    let sample = frame(0);
    // FIFO 无读端：分发静默失败，存储结果不变
    assert_eq!(store.append(&sample).unwrap(), AppendOutcome::Stored);
    channel.publish(&sample);
    assert_eq!(store.append(&sample).unwrap(), AppendOutcome::Stored);
}

#[test]
fn shutdown_flag_stops_idle_loop_promptly() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path());

    let mut acq = Acquisition::new(
        MockBus::new(),
        Pacing::new(Duration::ZERO),
        ContinuousStore::new(&config),
        DistributionChannel::new(dir.path().join("frames.fifo")),
        ClockArbiter::from_code(config.clock_source),
        Box::new(MockIndicator::new()),
    );

    let mut line = MockInterruptLine::new();
    let events = {
        use seismo_link::InterruptLine;
        line.subscribe().unwrap()
    };

    let shutdown = ShutdownFlag::new();
    shutdown.request();

    // 标志已置位：循环立即退出，不等待任何中断
    let start = std::time::Instant::now();
    acq.run(&events, &shutdown);
    assert!(start.elapsed() < Duration::from_secs(1));
}
