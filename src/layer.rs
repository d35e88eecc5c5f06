use crate::config::GelfSettings;
use crate::level::Severity;
use crate::message::Message;
use crate::parts::Parts;
use crate::sink::GelfSink;
use std::cell::Cell;
use std::collections::BTreeMap;
use std::sync::{Arc, atomic::{AtomicU64, Ordering}};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer};
use tracing_subscriber::registry::LookupSpan;

/// Stands in for `|` inside a message so the line keeps its field count.
const DELIMITER_REPLACEMENT: &str = "\u{a6}";

thread_local! {
    /// Set while this thread is inside [`GelfLayer::on_event`].
    static IN_EVENT: Cell<bool> = const { Cell::new(false) };
}

/// Marks the current thread as handling an event until dropped.
struct EventGuard;

impl EventGuard {
    /// `None` if the thread is already handling an event.
    fn enter() -> Option<EventGuard> {
        if IN_EVENT.with(|flag| flag.replace(true)) {
            None
        } else {
            Some(EventGuard)
        }
    }
}

impl Drop for EventGuard {
    fn drop(&mut self) {
        IN_EVENT.with(|flag| flag.set(false));
    }
}

/// Configuration of [`GelfLayer`].
///
/// **Fields**
/// - `channel_buffer`: maximum number of encoded messages waiting for the
///   sink before new ones are dropped. Raised to 16 if smaller.
/// - `min_level`: least severe `tracing` level that is forwarded.
#[derive(Clone, Debug)]
pub struct LayerConfig {
    pub channel_buffer: usize,
    pub min_level: Level,
}

impl Default for LayerConfig {
    fn default() -> Self {
        Self {
            channel_buffer: 1024,
            min_level: Level::INFO,
        }
    }
}

/// `tracing_subscriber` layer that turns events into GELF messages and
/// forwards them to a [`GelfSink`] via a bounded channel and background task.
///
/// Each event is rendered into the extended line format, built into a
/// [`Message`] and encoded on the calling thread. Only the transport
/// happens in the background. Nothing is batched or retried; when the
/// channel is full the message is dropped. Events emitted while the layer
/// handles another event on the same thread are ignored.
pub struct GelfLayer {
    sender: mpsc::Sender<Vec<u8>>,
    settings: GelfSettings,
    min_level: Level,
    next_id: AtomicU64,
    /// Total events seen by the layer (before filtering by level).
    pub total_events: Arc<AtomicU64>,
    /// Successfully enqueued into channel.
    pub enqueued_events: Arc<AtomicU64>,
    /// Dropped because the channel was full or closed.
    pub dropped_events: Arc<AtomicU64>,
    /// Dropped because the message could not be encoded.
    pub failed_events: Arc<AtomicU64>,
}

impl GelfLayer {
    /// Create a new layer and spawn a background task that pulls encoded
    /// messages from a bounded channel and sends them to `sink`.
    ///
    /// Minimal thresholds are enforced for `channel_buffer` (16) to avoid
    /// degenerate configs. Must be called within a Tokio runtime. The task
    /// ends, after a final `flush`, once the layer is dropped.
    pub fn new(
        sink: Arc<dyn GelfSink>,
        settings: GelfSettings,
        config: LayerConfig,
    ) -> (Self, JoinHandle<()>) {
        let buffer = config.channel_buffer.max(16);
        let (tx, mut rx) = mpsc::channel::<Vec<u8>>(buffer);

        let handle = tokio::spawn(async move {
            while let Some(message) = rx.recv().await {
                if let Err(e) = sink.send(&message).await {
                    eprintln!("error sending gelf message: {}", e);
                }
            }
            if let Err(e) = sink.flush().await {
                eprintln!("error flushing gelf sink: {}", e);
            }
        });

        (Self {
            sender: tx,
            settings,
            min_level: config.min_level,
            next_id: AtomicU64::new(0),
            total_events: Arc::new(AtomicU64::new(0)),
            enqueued_events: Arc::new(AtomicU64::new(0)),
            dropped_events: Arc::new(AtomicU64::new(0)),
            failed_events: Arc::new(AtomicU64::new(0)),
        }, handle)
    }
}

/// Render one event as an extended format line,
/// `id|module|shortpkg|shortfunc|level|message`.
///
/// The module is the crate part of `target`, the package the last segment
/// of the module path.
pub fn format_line(
    id: u64,
    target: &str,
    module_path: Option<&str>,
    function: &str,
    level: &Level,
    message: &str,
) -> String {
    let module = target.split("::").next().unwrap_or_default();
    let pkg = module_path
        .and_then(|path| path.rsplit("::").next())
        .unwrap_or(module);

    Parts {
        id: format!("{:03x}", id),
        module: module.to_string(),
        pkg: pkg.to_string(),
        func: function.to_string(),
        level: Severity::from(level).token().to_string(),
        message: message.replace('|', DELIMITER_REPLACEMENT),
    }
    .to_line()
}

impl<S> Layer<S> for GelfLayer
where
    S: Subscriber + for<'span> LookupSpan<'span>,
{
    fn on_event(&self, event: &Event, ctx: Context<'_, S>) {
        // Building and encoding emit their own events; those are not forwarded.
        let Some(_guard) = EventGuard::enter() else {
            return;
        };

        self.total_events.fetch_add(1, Ordering::Relaxed);
        let meta = event.metadata();
        if *meta.level() > self.min_level {
            return;
        }

        let mut fields = BTreeMap::new();
        let mut message = String::new();
        event.record(&mut FieldVisitor { fields: &mut fields, message: &mut message });

        let function = ctx.event_span(event).map(|span| span.name()).unwrap_or_default();
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let line = format_line(id, meta.target(), meta.module_path(), function, meta.level(), &message);

        let mut write = self.settings.log_write(
            meta.file().unwrap_or_default(),
            meta.line().unwrap_or_default(),
            line,
        );
        write.meta.extend(fields);

        let bytes = match Message::build(&write).to_bytes() {
            Ok(bytes) => bytes,
            Err(e) => {
                self.failed_events.fetch_add(1, Ordering::Relaxed);
                eprintln!("error encoding gelf message: {}", e);
                return;
            }
        };

        match self.sender.try_send(bytes) {
            Ok(()) => {
                self.enqueued_events.fetch_add(1, Ordering::Relaxed);
            }
            Err(_e) => {
                self.dropped_events.fetch_add(1, Ordering::Relaxed);
                eprintln!("gelf channel full, dropping message");
            }
        }
    }
}

/// Collects event fields as `_`-prefixed string metadata. The `message`
/// field becomes the log line text instead.
pub struct FieldVisitor<'a> {
    pub fields: &'a mut BTreeMap<String, String>,
    pub message: &'a mut String,
}

impl<'a> FieldVisitor<'a> {
    fn insert(&mut self, field: &Field, value: String) {
        if field.name() == "message" {
            *self.message = value;
        } else if field.name().starts_with('_') {
            self.fields.insert(field.name().to_string(), value);
        } else {
            self.fields.insert(format!("_{}", field.name()), value);
        }
    }
}

impl<'a> Visit for FieldVisitor<'a> {
    fn record_str(&mut self, field: &Field, value: &str) {
        self.insert(field, value.to_string());
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.insert(field, value.to_string());
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.insert(field, value.to_string());
    }

    fn record_f64(&mut self, field: &Field, value: f64) {
        self.insert(field, value.to_string());
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.insert(field, value.to_string());
    }

    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        self.insert(field, format!("{:?}", value));
    }
}
