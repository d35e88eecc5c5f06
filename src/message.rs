use crate::error::CodecError;
use crate::level::Severity;
use crate::parts::Parts;
use crate::record::LogWrite;
use chrono::Utc;
use serde::de::{self, Deserialize, Deserializer, MapAccess, Visitor};
use serde::ser::{self, Serialize, SerializeMap, Serializer};
use serde_json::value::RawValue;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// GELF schema version written into every message.
pub const GELF_VERSION: &str = "1.1";

/// Extensions stripped from the base file name to form `_file`.
pub const SOURCE_EXTENSIONS: &[&str] = &[".rs", ".go"];

/// One GELF message.
///
/// Fixed schema fields and the `extra` map end up as siblings in a single
/// flat JSON object; see [`Message::encode_into`].
#[derive(Debug, Clone, Default)]
pub struct Message {
    pub version: String,
    pub host: String,
    /// First line of the message, or all of it when single-line.
    pub short: String,
    /// Complete text when the message spans several lines, empty otherwise.
    pub full: String,
    /// Seconds since the unix epoch.
    pub time_unix: f64,
    pub level: i32,
    /// Deprecated by GELF, superseded by `_app`. Never set by [`Message::build`].
    pub facility: String,
    pub extra: BTreeMap<String, Value>,
    /// Pre-serialized JSON object whose entries are written out verbatim.
    pub raw_extra: Option<Box<RawValue>>,
}

impl Message {
    /// Build the message for one write request.
    ///
    /// Never fails. A payload that doesn't parse still produces a message,
    /// just with empty derived fields and level 0.
    pub fn build(write: &LogWrite) -> Message {
        let parts = Parts::parse(&write.payload);

        let (short, full) = match parts.message.find('\n') {
            Some(i) if i > 0 => (parts.message[..i].to_string(), parts.message.clone()),
            _ => (parts.message.clone(), String::new()),
        };

        let app = write.app_name.as_deref().unwrap_or(&write.facility);
        let env = write.environment.as_deref().unwrap_or_default();
        let version = write.version.as_deref().unwrap_or_default();

        let mut extra = BTreeMap::from([
            ("_app".to_string(), Value::from(app)),
            ("_env".to_string(), Value::from(env)),
            ("_filename".to_string(), Value::from(write.file.as_str())),
            ("_file".to_string(), Value::from(source_file_stem(&write.file))),
            ("_function".to_string(), Value::from(parts.func)),
            ("_id".to_string(), Value::from(parts.id)),
            ("_line".to_string(), Value::from(write.line)),
            ("_module".to_string(), Value::from(parts.module)),
            ("_pid".to_string(), Value::from(std::process::id())),
            ("_pkg".to_string(), Value::from(parts.pkg)),
            ("_version".to_string(), Value::from(version)),
        ]);

        for (key, value) in &write.meta {
            extra.insert(key.clone(), Value::from(value.as_str()));
        }

        Message {
            version: GELF_VERSION.to_string(),
            host: write.host_name.clone(),
            short,
            full,
            time_unix: unix_now(),
            level: Severity::from_token(&parts.level).as_i32(),
            facility: String::new(),
            extra,
            raw_extra: None,
        }
    }

    /// Severity of the message, if `level` is a valid syslog value.
    pub fn severity(&self) -> Option<Severity> {
        Severity::try_from(self.level).ok()
    }

    /// Append the message to `buf` as one flat JSON object.
    ///
    /// Entries of `raw_extra` win over `extra` entries with the same key.
    /// On error `buf` is left as it was.
    pub fn encode_into(&self, buf: &mut Vec<u8>) -> Result<(), CodecError> {
        let flat = Flat {
            message: self,
            raw: self.raw_entries()?,
        };

        let start = buf.len();
        if let Err(err) = serde_json::to_writer(&mut *buf, &flat) {
            buf.truncate(start);
            return Err(err.into());
        }

        tracing::trace!(bytes = buf.len() - start, "encoded gelf message");
        Ok(())
    }

    /// Encode the message into a fresh buffer.
    pub fn to_bytes(&self) -> Result<Vec<u8>, CodecError> {
        let mut buf = Vec::with_capacity(512);
        self.encode_into(&mut buf)?;
        Ok(buf)
    }

    /// Decode a received GELF JSON object.
    ///
    /// Keys starting with `_` go into `extra`; other unknown keys are
    /// dropped. The first fixed field with the wrong JSON type fails the
    /// whole decode.
    pub fn from_slice(data: &[u8]) -> Result<Message, CodecError> {
        match serde_json::from_slice::<Value>(data)? {
            Value::Object(map) => Message::from_map(map),
            _ => Err(CodecError::NotAnObject),
        }
    }

    fn from_map(map: Map<String, Value>) -> Result<Message, CodecError> {
        let mut message = Message::default();

        for (key, value) in map {
            if key.starts_with('_') {
                message.extra.insert(key, value);
                continue;
            }

            let ok = match key.as_str() {
                "version" => take_string(&mut message.version, value),
                "host" => take_string(&mut message.host, value),
                "short_message" => take_string(&mut message.short, value),
                "full_message" => take_string(&mut message.full, value),
                "facility" => take_string(&mut message.facility, value),
                "timestamp" => value.as_f64().map(|t| message.time_unix = t).is_some(),
                "level" => value.as_f64().map(|l| message.level = l as i32).is_some(),
                _ => true,
            };

            if !ok {
                return Err(CodecError::InvalidType { field: key });
            }
        }

        Ok(message)
    }

    fn raw_entries(&self) -> Result<Vec<(String, &RawValue)>, CodecError> {
        match &self.raw_extra {
            Some(raw) => serde_json::from_str::<RawEntries>(raw.get())
                .map(|entries| entries.0)
                .map_err(|_| CodecError::RawExtraNotObject),
            None => Ok(Vec::new()),
        }
    }
}

fn take_string(slot: &mut String, value: Value) -> bool {
    match value {
        Value::String(s) => {
            *slot = s;
            true
        }
        _ => false,
    }
}

fn unix_now() -> f64 {
    Utc::now().timestamp_micros() as f64 / 1_000_000.0
}

/// Base name of `path` with a known source extension removed.
pub fn source_file_stem(path: &str) -> String {
    let base = Path::new(path)
        .file_name()
        .map(|name| name.to_string_lossy())
        .unwrap_or_default();

    for ext in SOURCE_EXTENSIONS {
        if let Some(stem) = base.strip_suffix(ext) {
            return stem.to_string();
        }
    }
    base.into_owned()
}

/// Serialization view of a message with its raw extra entries split out.
struct Flat<'a> {
    message: &'a Message,
    raw: Vec<(String, &'a RawValue)>,
}

impl Serialize for Flat<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let m = self.message;
        let mut map = serializer.serialize_map(None)?;

        map.serialize_entry("version", &m.version)?;
        map.serialize_entry("host", &m.host)?;
        map.serialize_entry("short_message", &m.short)?;
        if !m.full.is_empty() {
            map.serialize_entry("full_message", &m.full)?;
        }
        map.serialize_entry("timestamp", &m.time_unix)?;
        if m.level != 0 {
            map.serialize_entry("level", &m.level)?;
        }
        if !m.facility.is_empty() {
            map.serialize_entry("facility", &m.facility)?;
        }

        for (key, value) in &m.extra {
            if self.raw.iter().any(|(raw_key, _)| raw_key == key) {
                continue;
            }
            map.serialize_entry(key, value)?;
        }
        for (key, value) in &self.raw {
            map.serialize_entry(key, value)?;
        }

        map.end()
    }
}

impl Serialize for Message {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let raw = self.raw_entries().map_err(ser::Error::custom)?;
        Flat { message: self, raw }.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Message {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match Value::deserialize(deserializer)? {
            Value::Object(map) => Message::from_map(map).map_err(de::Error::custom),
            _ => Err(de::Error::custom(CodecError::NotAnObject)),
        }
    }
}

impl FromStr for Message {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Message::from_slice(s.as_bytes())
    }
}

/// Entries of a JSON object in document order, values left unparsed.
struct RawEntries<'a>(Vec<(String, &'a RawValue)>);

impl<'de> Deserialize<'de> for RawEntries<'de> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct EntriesVisitor;

        impl<'de> Visitor<'de> for EntriesVisitor {
            type Value = RawEntries<'de>;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a json object")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut entries = Vec::new();
                while let Some((key, value)) = access.next_entry::<String, &'de RawValue>()? {
                    entries.push((key, value));
                }
                Ok(RawEntries(entries))
            }
        }

        deserializer.deserialize_map(EntriesVisitor)
    }
}
