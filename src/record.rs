use std::collections::BTreeMap;

/// A single write request handed over by a logging backend adapter.
///
/// `payload` holds the formatted log line (see [`crate::parts::LOG_FORMAT`]);
/// everything else is context the adapter knows about the call site and
/// the running process.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LogWrite {
    pub host_name: String,
    /// Usually the executable name. Used as `_app` unless `app_name` is set.
    pub facility: String,
    pub file: String,
    pub line: u32,
    pub payload: Vec<u8>,
    pub app_name: Option<String>,
    pub environment: Option<String>,
    /// Format version tag of the producing application, sent as `_version`.
    pub version: Option<String>,
    /// Additional fields to add to each message. Wins over derived fields.
    pub meta: BTreeMap<String, String>,
}

impl LogWrite {
    pub fn new(
        host_name: impl Into<String>,
        facility: impl Into<String>,
        file: impl Into<String>,
        line: u32,
        payload: impl Into<Vec<u8>>,
    ) -> Self {
        LogWrite {
            host_name: host_name.into(),
            facility: facility.into(),
            file: file.into(),
            line,
            payload: payload.into(),
            ..Default::default()
        }
    }

    pub fn with_app_name(mut self, app_name: impl Into<String>) -> Self {
        self.app_name = Some(app_name.into());
        self
    }

    pub fn with_environment(mut self, environment: impl Into<String>) -> Self {
        self.environment = Some(environment.into());
        self
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    pub fn with_meta(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.meta.insert(key.into(), value.into());
        self
    }
}
