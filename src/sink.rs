use async_trait::async_trait;
use std::error::Error;
use std::sync::Mutex;

/// Asynchronous destination for encoded GELF messages.
///
/// Implementations own the transport (UDP chunking, TCP framing, HTTP,
/// compression). The layer calls `send` from a background task and never
/// awaits it on the application thread.
#[async_trait]
pub trait GelfSink: Send + Sync {
    /// Send a single encoded message.
    ///
    /// **Parameters**
    /// - `message`: one JSON object as produced by
    ///   [`Message::encode_into`](crate::message::Message::encode_into).
    ///
    /// **Returns**
    /// - `Ok(())` if the backend accepted the message.
    /// - `Err(..)` if it did not. The layer reports the error and moves on;
    ///   it never retries.
    async fn send(&self, message: &[u8]) -> Result<(), Box<dyn Error + Send + Sync>>;

    /// Flush any buffered messages, if the backend implements buffering.
    ///
    /// Default implementation is a no-op.
    async fn flush(&self) -> Result<(), Box<dyn Error + Send + Sync>> {
        Ok(())
    }
}

/// A sink that simply drops all messages.
///
/// Useful for measuring the overhead of the layer itself without any
/// external I/O.
#[derive(Clone, Default)]
pub struct NoopSink;

#[async_trait]
impl GelfSink for NoopSink {
    async fn send(&self, _message: &[u8]) -> Result<(), Box<dyn Error + Send + Sync>> {
        Ok(())
    }
}

/// A sink that keeps every message in memory.
#[derive(Default)]
pub struct MemorySink {
    messages: Mutex<Vec<Vec<u8>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copies of everything sent so far, oldest first.
    pub fn messages(&self) -> Vec<Vec<u8>> {
        self.messages
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

#[async_trait]
impl GelfSink for MemorySink {
    async fn send(&self, message: &[u8]) -> Result<(), Box<dyn Error + Send + Sync>> {
        self.messages
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(message.to_vec());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn memory_sink_keeps_order() {
        let sink = MemorySink::new();
        sink.send(b"{\"a\":1}").await.unwrap();
        sink.send(b"{\"b\":2}").await.unwrap();
        sink.flush().await.unwrap();
        assert_eq!(sink.messages(), vec![b"{\"a\":1}".to_vec(), b"{\"b\":2}".to_vec()]);
    }

    #[tokio::test]
    async fn noop_sink_accepts_everything() {
        assert!(NoopSink.send(b"anything").await.is_ok());
    }
}
