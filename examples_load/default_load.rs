use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::time::Instant;
use tracing::error;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::Registry;

use gelf_log_sink::layer::{GelfLayer, LayerConfig};
use gelf_log_sink::sink::NoopSink;
use gelf_log_sink::GelfSettings;

#[tokio::main]
async fn main() {
    let settings = GelfSettings::from_env().expect("read GELF_* settings");
    let (layer, handle) = GelfLayer::new(Arc::new(NoopSink), settings, LayerConfig::default());
    let dropped = Arc::clone(&layer.dropped_events);
    tracing::subscriber::set_global_default(Registry::default().with(layer))
        .expect("set global subscriber");

    let n: u64 = 100_000;
    let start = Instant::now();

    for i in 0..n {
        error!(iteration = i, "default load test error");
    }

    let elapsed = start.elapsed();
    println!("default config: built {} messages in {:?} (~{:.0} msg/s), {} dropped",
        n,
        elapsed,
        n as f64 / elapsed.as_secs_f64(),
        dropped.load(Ordering::Relaxed),
    );

    // The global subscriber is never dropped, so the task won't finish.
    handle.abort();
}
