//! End-to-end pipeline tests
//!
//! Full write path: writer gate, splitter fan-out, async sink workers,
//! drain on shutdown.

use std::sync::Arc;

use async_trait::async_trait;

use scribe_config::Config;
use scribe_levels::predefined;
use scribe_message::LogMessage;
use scribe_pipeline::{Pipeline, Result, Stage, StageNode, SyncDecision};
use scribe_sinks::{ConsoleSink, MemorySink, NullSink, TextFormatter};

/// Sync pass-through used as fan-out point
struct Splitter;

#[async_trait]
impl Stage for Splitter {
    fn name(&self) -> &str {
        "splitter"
    }

    fn process_sync(&self, _msg: &LogMessage) -> Result<SyncDecision> {
        Ok(SyncDecision::FORWARD)
    }
}

// =============================================================================
// Splitter fan-out
// =============================================================================

#[tokio::test]
async fn test_splitter_delivers_to_both_sinks_exactly_once() {
    let pipeline = Pipeline::builder()
        .application("e2e")
        .default_level("Notice")
        .build();

    let left = Arc::new(MemorySink::new("left"));
    let right = Arc::new(MemorySink::new("right"));

    let root = StageNode::new(Splitter);
    root.add_next_stage(StageNode::from_arc(Arc::clone(&left) as Arc<dyn Stage>))
        .await
        .unwrap();
    root.add_next_stage(StageNode::from_arc(Arc::clone(&right) as Arc<dyn Stage>))
        .await
        .unwrap();
    pipeline.add_root(root).unwrap();
    pipeline.initialize().await.unwrap();

    let writer = pipeline.writer("App", &[]);
    writer.write(predefined::FAILURE, "failure msg");
    writer.write(predefined::ERROR, "error msg");
    writer.write(predefined::WARNING, "warning msg");
    writer.write(predefined::NOTICE, "notice msg");
    // Below the Notice threshold: must not reach either sink
    writer.write(predefined::DEBUG, "debug msg");

    pipeline.shutdown().await;

    let expected = vec!["failure msg", "error msg", "warning msg", "notice msg"];
    assert_eq!(left.texts(), expected);
    assert_eq!(right.texts(), expected);

    // Exactly once: no duplicates on either side
    assert_eq!(left.len(), 4);
    assert_eq!(right.len(), 4);

    // Both sides saw the same originals, not re-stamped copies
    let left_msgs = left.messages();
    let right_msgs = right.messages();
    for (l, r) in left_msgs.iter().zip(&right_msgs) {
        assert_eq!(l.timestamp, r.timestamp);
        assert_eq!(l.nanos, r.nanos);
        assert_eq!(l.level, r.level);
    }
}

#[tokio::test]
async fn test_captured_messages_carry_full_stamping() {
    let pipeline = Pipeline::builder()
        .application("e2e")
        .process_name("e2e-test")
        .default_level("All")
        .build();
    let sink = Arc::new(MemorySink::new("mem"));
    pipeline
        .add_root(StageNode::from_arc(Arc::clone(&sink) as Arc<dyn Stage>))
        .unwrap();
    pipeline.initialize().await.unwrap();

    let writer = pipeline.writer("Storage", &["io"]);
    writer.write(predefined::NOTICE, "volume mounted");
    pipeline.shutdown().await;

    let messages = sink.messages();
    assert_eq!(messages.len(), 1);
    let msg = &messages[0];
    assert_eq!(msg.writer, "Storage");
    assert_eq!(msg.level_name, "Notice");
    assert_eq!(msg.tags, vec!["io"]);
    assert_eq!(msg.application, "e2e");
    assert_eq!(msg.process_name, "e2e-test");
}

// =============================================================================
// Configuration-driven wiring
// =============================================================================

#[tokio::test]
async fn test_config_file_drives_gating_and_tunables() {
    let pipeline = Pipeline::builder().application("e2e").build();
    let sink = Arc::new(MemorySink::new("mem"));
    pipeline
        .add_root(StageNode::from_arc(Arc::clone(&sink) as Arc<dyn Stage>))
        .unwrap();

    let config = Config::from_toml(
        r#"
        [[writers]]
        name = "Db*"
        level = "Debug"

        [[writers]]
        level = "Error"
        default = true

        [stages.mem]
        queue_size = 64
        "#,
    )
    .unwrap();
    pipeline.apply_config(&config).unwrap();
    pipeline.initialize().await.unwrap();

    assert_eq!(pipeline.stage("mem").unwrap().options().queue_size, 64);

    let db = pipeline.writer("DbPool", &[]);
    let other = pipeline.writer("Net", &[]);
    db.write(predefined::DEBUG, "query plan");
    other.write(predefined::DEBUG, "hidden");
    other.write(predefined::ERROR, "socket closed");

    pipeline.shutdown().await;
    assert_eq!(sink.texts(), vec!["query plan", "socket closed"]);
}

// =============================================================================
// Other sinks
// =============================================================================

#[tokio::test]
async fn test_null_sink_drains_everything() {
    let pipeline = Pipeline::builder().default_level("All").build();
    let sink = Arc::new(NullSink::new("null"));
    pipeline
        .add_root(StageNode::from_arc(Arc::clone(&sink) as Arc<dyn Stage>))
        .unwrap();
    pipeline.initialize().await.unwrap();

    let writer = pipeline.writer("Bench", &[]);
    for i in 0..100 {
        writer.write(predefined::INFO, format!("m{i}"));
    }
    pipeline.shutdown().await;

    assert_eq!(sink.drained(), 100);
}

#[tokio::test]
async fn test_console_sink_runs_through() {
    let pipeline = Pipeline::builder()
        .application("e2e")
        .default_level("All")
        .build();
    let console = ConsoleSink::new("console")
        .with_formatter(TextFormatter::new().with_tags())
        .with_stderr_threshold(predefined::ERROR);
    pipeline.add_root(StageNode::new(console)).unwrap();
    pipeline.initialize().await.unwrap();

    let writer = pipeline.writer("Console", &["smoke"]);
    writer.write(predefined::ERROR, "to stderr");
    writer.write(predefined::INFO, "to stdout");

    // Drains both streams without errors
    pipeline.shutdown().await;
}

// =============================================================================
// Message pool behavior across the full path
// =============================================================================

#[tokio::test]
async fn test_pool_recovers_after_shutdown() {
    let pipeline = Pipeline::builder()
        .default_level("All")
        .pool_size(8)
        .build();
    let sink = Arc::new(MemorySink::new("mem"));
    pipeline
        .add_root(StageNode::from_arc(Arc::clone(&sink) as Arc<dyn Stage>))
        .unwrap();
    pipeline.initialize().await.unwrap();

    let writer = pipeline.writer("App", &[]);
    for i in 0..8 {
        writer.write(predefined::INFO, format!("m{i}"));
    }
    pipeline.shutdown().await;

    // The memory sink copies messages out, so every pooled object came back
    assert_eq!(pipeline.pool().available(), 8);
    assert_eq!(sink.len(), 8);
}
