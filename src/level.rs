use crate::error::SeverityError;

/// Syslog severities, as carried in the GELF `level` field.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    Emergency = 0,
    Alert = 1,
    Critical = 2,
    Error = 3,
    Warning = 4,
    Notice = 5,
    Info = 6,
    Debug = 7,
}

impl Severity {
    /// Map a 4-character level token from a log line to a severity.
    ///
    /// Unknown tokens fall back to `Emergency` (0). That is the zero value,
    /// not a validation error.
    pub fn from_token(token: &str) -> Severity {
        match token {
            "DEBU" => Severity::Debug,
            "INFO" => Severity::Info,
            "NOTI" => Severity::Notice,
            "WARN" => Severity::Warning,
            "ERRO" => Severity::Error,
            "CRIT" => Severity::Critical,
            _ => Severity::Emergency,
        }
    }

    /// The token a producer writes for this severity.
    pub fn token(self) -> &'static str {
        match self {
            Severity::Emergency => "EMER",
            Severity::Alert => "ALER",
            Severity::Critical => "CRIT",
            Severity::Error => "ERRO",
            Severity::Warning => "WARN",
            Severity::Notice => "NOTI",
            Severity::Info => "INFO",
            Severity::Debug => "DEBU",
        }
    }

    pub fn as_i32(self) -> i32 {
        self as i32
    }
}

impl TryFrom<i32> for Severity {
    type Error = SeverityError;

    fn try_from(value: i32) -> Result<Self, SeverityError> {
        let severity = match value {
            0 => Severity::Emergency,
            1 => Severity::Alert,
            2 => Severity::Critical,
            3 => Severity::Error,
            4 => Severity::Warning,
            5 => Severity::Notice,
            6 => Severity::Info,
            7 => Severity::Debug,
            _ => return Err(SeverityError::OutOfRange(value)),
        };

        Ok(severity)
    }
}

impl From<&tracing::Level> for Severity {
    fn from(level: &tracing::Level) -> Self {
        match *level {
            tracing::Level::ERROR => Severity::Error,
            tracing::Level::WARN => Severity::Warning,
            tracing::Level::INFO => Severity::Info,
            // syslog has nothing below debug
            _ => Severity::Debug,
        }
    }
}
