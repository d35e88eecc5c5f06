/// Line format producers are expected to use so the extra data can be
/// split out again.
pub const LOG_FORMAT: &str = "%{id:03x}|%{module}|%{shortpkg}|%{shortfunc}|%{level:.4s}|%{message}";

/// Older four field format, still accepted while producers catch up.
pub const LEGACY_LOG_FORMAT: &str = "%{id:03x}|%{shortfunc}|%{level:.4s}|%{message}";

pub const DELIMITER: char = '|';

/// Layout of a formatted log line, resolved from its field count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineFormat {
    /// `id|module|shortpkg|shortfunc|level|message`
    Extended,
    /// `id|shortfunc|level|message`
    Legacy,
    Unknown,
}

impl LineFormat {
    pub fn detect(field_count: usize) -> Self {
        match field_count {
            6 => LineFormat::Extended,
            4 => LineFormat::Legacy,
            _ => LineFormat::Unknown,
        }
    }
}

/// Fields split out of one formatted log line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Parts {
    pub id: String,
    pub module: String,
    pub pkg: String,
    pub func: String,
    pub level: String,
    pub message: String,
}

impl Parts {
    /// Split a formatted log line into its parts.
    ///
    /// Never fails: a line that matches neither format yields
    /// `Parts::default()`, so a bad producer can't break the log pipeline.
    /// Invalid UTF-8 is replaced rather than rejected.
    pub fn parse(payload: &[u8]) -> Parts {
        let line = String::from_utf8_lossy(payload);
        let fields: Vec<&str> = line.split(DELIMITER).collect();

        match LineFormat::detect(fields.len()) {
            LineFormat::Extended => Parts {
                id: fields[0].to_string(),
                module: fields[1].to_string(),
                pkg: fields[2].to_string(),
                func: fields[3].to_string(),
                level: fields[4].to_string(),
                message: fields[5].trim().to_string(),
            },
            LineFormat::Legacy => Parts {
                id: fields[0].to_string(),
                func: fields[1].to_string(),
                level: fields[2].to_string(),
                message: fields[3].trim().to_string(),
                ..Default::default()
            },
            LineFormat::Unknown => {
                tracing::debug!(fields = fields.len(), "log line matches no known format");
                Parts::default()
            }
        }
    }

    /// Render the parts as an extended format line.
    pub fn to_line(&self) -> String {
        [
            self.id.as_str(),
            self.module.as_str(),
            self.pkg.as_str(),
            self.func.as_str(),
            self.level.as_str(),
            self.message.as_str(),
        ]
        .join("|")
    }
}
