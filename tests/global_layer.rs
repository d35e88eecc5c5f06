//! Runs in its own binary: the global default subscriber can only be set once.

use gelf_log_sink::layer::{GelfLayer, LayerConfig};
use gelf_log_sink::sink::MemorySink;
use gelf_log_sink::GelfSettings;
use serde_json::{json, Value};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;
use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::Registry;

#[tokio::test]
async fn global_layer_at_trace_forwards_each_event_once() {
    let sink = Arc::new(MemorySink::new());
    let settings = GelfSettings {
        host_name: "web-1".into(),
        facility: "orders".into(),
        ..Default::default()
    };
    let config = LayerConfig { channel_buffer: 64, min_level: Level::TRACE };
    let (layer, _handle) = GelfLayer::new(sink.clone(), settings, config);
    let total = Arc::clone(&layer.total_events);
    let enqueued = Arc::clone(&layer.enqueued_events);

    tracing::subscriber::set_global_default(Registry::default().with(layer))
        .expect("set global subscriber");

    tracing::info!("order placed");
    // A malformed line makes the parser emit its own debug event.
    let garbage = gelf_log_sink::Parts::parse(b"no delimiters");
    assert_eq!(garbage, gelf_log_sink::Parts::default());

    // The top-level parse above is a real event of its own; the events
    // emitted while building and encoding are not.
    assert_eq!(total.load(Ordering::Relaxed), 2);
    assert_eq!(enqueued.load(Ordering::Relaxed), 2);

    for _ in 0..100 {
        if sink.messages().len() == 2 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    let messages = sink.messages();
    assert_eq!(messages.len(), 2);
    let first: Value = serde_json::from_slice(&messages[0]).unwrap();
    assert_eq!(first["short_message"], json!("order placed"));
    assert_eq!(first["level"], json!(6));
    let second: Value = serde_json::from_slice(&messages[1]).unwrap();
    assert_eq!(second["short_message"], json!("log line matches no known format"));
    assert_eq!(second["level"], json!(7));
    assert_eq!(second["_fields"], json!("1"));
}
