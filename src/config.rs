use crate::env::{
    env_opt, env_or, parse_meta, GELF_ADDRESS_ENV, GELF_APP_NAME_ENV, GELF_ENV_ENV, GELF_HOST_ENV,
    GELF_META_ENV, GELF_VERSION_ENV,
};
use crate::error::ConfigError;
use crate::record::LogWrite;
use std::collections::BTreeMap;

pub const DEFAULT_ADDRESS: &str = "127.0.0.1:12201";

/// Per-process settings every [`LogWrite`] is seeded from.
///
/// **Fields**
/// - `address`: where the transport should ship messages. Not used here.
/// - `app_name`: overrides `_app`; defaults to `facility`.
/// - `env`: environment tag for `_env`.
/// - `meta`: additional fields added to each message.
/// - `version`: format version tag for `_version`.
/// - `host_name`: GELF `host`.
/// - `facility`: the executable name unless set explicitly.
#[derive(Clone, Debug, PartialEq)]
pub struct GelfSettings {
    pub address: String,
    pub app_name: Option<String>,
    pub env: Option<String>,
    pub meta: BTreeMap<String, String>,
    pub version: Option<String>,
    pub host_name: String,
    pub facility: String,
}

impl Default for GelfSettings {
    fn default() -> Self {
        Self {
            address: DEFAULT_ADDRESS.to_string(),
            app_name: None,
            env: None,
            meta: BTreeMap::new(),
            version: None,
            host_name: system_host_name(),
            facility: executable_name(),
        }
    }
}

impl GelfSettings {
    /// Build settings from the `GELF_*` environment variables on top of
    /// [`GelfSettings::default`].
    ///
    /// **Returns**
    /// - `Err(ConfigError::MalformedMeta)` if `GELF_META` has an entry
    ///   without `=`.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut settings = GelfSettings {
            address: env_or(GELF_ADDRESS_ENV, DEFAULT_ADDRESS),
            app_name: env_opt(GELF_APP_NAME_ENV),
            env: env_opt(GELF_ENV_ENV),
            version: env_opt(GELF_VERSION_ENV),
            ..Default::default()
        };

        if let Some(host) = env_opt(GELF_HOST_ENV) {
            settings.host_name = host;
        }
        if let Some(meta) = env_opt(GELF_META_ENV) {
            settings.meta = parse_meta(&meta)?;
        }

        Ok(settings)
    }

    /// Start a write request for one formatted log line.
    pub fn log_write(&self, file: impl Into<String>, line: u32, payload: impl Into<Vec<u8>>) -> LogWrite {
        LogWrite {
            host_name: self.host_name.clone(),
            facility: self.facility.clone(),
            file: file.into(),
            line,
            payload: payload.into(),
            app_name: self.app_name.clone(),
            environment: self.env.clone(),
            version: self.version.clone(),
            meta: self.meta.clone(),
        }
    }
}

fn system_host_name() -> String {
    hostname::get()
        .ok()
        .and_then(|name| name.into_string().ok())
        .unwrap_or_default()
}

fn executable_name() -> String {
    std::env::current_exe()
        .ok()
        .and_then(|path| path.file_stem().map(|stem| stem.to_string_lossy().into_owned()))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::Message;

    #[test]
    fn defaults() {
        let settings = GelfSettings::default();
        assert_eq!(settings.address, DEFAULT_ADDRESS);
        assert!(settings.app_name.is_none());
        assert!(settings.meta.is_empty());
        assert!(!settings.facility.is_empty());
    }

    #[test]
    fn log_write_carries_settings() {
        let settings = GelfSettings {
            app_name: Some("api".into()),
            env: Some("prod".into()),
            version: Some("3".into()),
            meta: BTreeMap::from([("_team".to_string(), "core".to_string())]),
            host_name: "web-1".into(),
            facility: "api-bin".into(),
            ..Default::default()
        };

        let write = settings.log_write("src/db.rs", 12, "1|m|p|query|ERRO|timeout");
        assert_eq!(write.host_name, "web-1");
        assert_eq!(write.facility, "api-bin");
        assert_eq!(write.file, "src/db.rs");
        assert_eq!(write.line, 12);
        assert_eq!(write.app_name.as_deref(), Some("api"));
        assert_eq!(write.meta["_team"], "core");

        let m = Message::build(&write);
        assert_eq!(m.host, "web-1");
        assert_eq!(m.level, 3);
        assert_eq!(m.extra["_team"], "core");
        assert_eq!(m.extra["_env"], "prod");
    }
}
