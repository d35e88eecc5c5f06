//! Builds [GELF 1.1](https://go2docs.graylog.org/current/getting_in_log_data/gelf.html)
//! messages out of pipe-delimited log lines.
//!
//! A producer formats each log call as [`parts::LOG_FORMAT`], wraps it in a
//! [`LogWrite`] together with host and call-site context, and
//! [`Message::build`] turns that into a message whose extra fields
//! (`_app`, `_function`, `_line`, ...) sit next to the GELF schema fields in
//! one flat JSON object:
//!
//! ```
//! use gelf_log_sink::{LogWrite, Message};
//!
//! let write = LogWrite::new("web-1", "billing", "src/invoice.rs", 42, "0a1|billing|invoice|render|INFO|hello\nworld");
//! let message = Message::build(&write);
//! assert_eq!(message.short, "hello");
//! assert_eq!(message.level, 6);
//!
//! let bytes = message.to_bytes().unwrap();
//! let decoded = Message::from_slice(&bytes).unwrap();
//! assert_eq!(decoded.extra["_function"], "render");
//! ```
//!
//! Shipping the bytes is left to a [`sink::GelfSink`]. [`layer::GelfLayer`]
//! wires `tracing` events through the same path.

pub mod config;
pub mod env;
pub mod error;
pub mod layer;
pub mod level;
pub mod message;
pub mod parts;
pub mod record;
pub mod sink;

pub use config::GelfSettings;
pub use error::{CodecError, ConfigError, SeverityError};
pub use level::Severity;
pub use message::Message;
pub use parts::{LineFormat, Parts};
pub use record::LogWrite;
