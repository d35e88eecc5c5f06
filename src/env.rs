//! Environment variable names used by this crate for convenient
//! configuration of writers from microservices.
//!
//! These are purely helpers; the message types remain decoupled from
//! environment access.

use crate::error::ConfigError;
use std::collections::BTreeMap;

/// Address of the GELF input, e.g. `127.0.0.1:12201`. Only carried along
/// for the transport; nothing in this crate connects to it.
pub const GELF_ADDRESS_ENV: &str = "GELF_ADDRESS";

/// Overrides the `_app` field, which otherwise is the facility.
pub const GELF_APP_NAME_ENV: &str = "GELF_APP_NAME";

/// Environment tag, sent as `_env`.
pub const GELF_ENV_ENV: &str = "GELF_ENV";

/// Format version tag, sent as `_version`.
pub const GELF_VERSION_ENV: &str = "GELF_VERSION";

/// Overrides the host name reported by the operating system.
pub const GELF_HOST_ENV: &str = "GELF_HOST";

/// Extra fields added to every message, as `key=value,key=value`.
pub const GELF_META_ENV: &str = "GELF_META";

/// Read an environment variable or fall back to a provided default.
pub fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Read an environment variable, treating unset and empty alike.
pub fn env_opt(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.is_empty())
}

/// Parse a `key=value,key=value` list. Blank entries are skipped.
pub fn parse_meta(list: &str) -> Result<BTreeMap<String, String>, ConfigError> {
    let mut meta = BTreeMap::new();

    for entry in list.split(',') {
        if entry.trim().is_empty() {
            continue;
        }
        let (key, value) = entry
            .split_once('=')
            .ok_or_else(|| ConfigError::MalformedMeta(entry.to_string()))?;
        let key = key.trim();
        if key.is_empty() {
            return Err(ConfigError::MalformedMeta(entry.to_string()));
        }
        meta.insert(key.to_string(), value.trim().to_string());
    }

    Ok(meta)
}
