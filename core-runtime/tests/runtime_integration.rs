//! Integration tests for logging setup and the event bus.

use async_trait::async_trait;
use bridge_traits::error::Result as SinkResult;
use bridge_traits::logging::{LogEntry, LogLevel, LoggerSink};
use bridge_traits::{AdAction, AdEvent, AdType};
use core_runtime::events::{BridgeEvent, EventBus, EventStream, LifecycleEvent, ReadinessReason};
use core_runtime::logging::{init_logging, LogFormat, LoggingConfig};
use core_runtime::Error;
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Default)]
struct CollectingSink {
    entries: Mutex<Vec<LogEntry>>,
}

#[async_trait]
impl LoggerSink for CollectingSink {
    async fn log(&self, entry: LogEntry) -> SinkResult<()> {
        self.entries.lock().unwrap().push(entry);
        Ok(())
    }

    fn min_level(&self) -> LogLevel {
        LogLevel::Debug
    }
}

// The global subscriber can only be installed once per process, so the whole
// init lifecycle lives in a single test.
#[tokio::test]
async fn test_init_logging_forwards_to_sink_once() {
    let sink = Arc::new(CollectingSink::default());
    let config = LoggingConfig::default()
        .with_format(LogFormat::Compact)
        .with_level(LogLevel::Debug)
        .with_logger_sink(sink.clone());

    init_logging(config.clone()).unwrap();

    tracing::info!(target: "core_bridge", external_token = "abc", "Bridge ready");

    // Sink delivery runs on a spawned task.
    for _ in 0..50 {
        if !sink.entries.lock().unwrap().is_empty() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    {
        let entries = sink.entries.lock().unwrap();
        let entry = entries
            .iter()
            .find(|e| e.message == "Bridge ready")
            .expect("entry forwarded");
        assert_eq!(entry.fields.get("external_token"), Some(&"[REDACTED]".to_string()));
    }

    assert!(matches!(init_logging(config), Err(Error::Config(_))));
}

#[tokio::test]
async fn test_stream_skips_non_matching_events() {
    let bus = EventBus::new(16);
    let mut ready = EventStream::new(bus.subscribe())
        .filter(|event| matches!(event, BridgeEvent::Lifecycle(LifecycleEvent::BridgeReady { .. })));

    bus.emit(BridgeEvent::Ad(AdEvent::new(
        AdAction::Request,
        AdType::RewardedVideo,
        "adbridge.default",
    )))
    .unwrap();
    bus.emit(BridgeEvent::Lifecycle(LifecycleEvent::BridgeReady {
        reason: ReadinessReason::AllProvidersReported,
        completed: 2,
        expected: 2,
    }))
    .unwrap();

    let event = ready.recv().await.unwrap();
    assert_eq!(event.description(), "Bridge ready");
}
