/// Error type returned when encoding or decoding a GELF message.
#[derive(thiserror::Error, Debug)]
pub enum CodecError {
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("gelf message is not a json object")]
    NotAnObject,

    #[error("invalid type for field {field}")]
    InvalidType { field: String },

    #[error("raw extra fields are not a json object")]
    RawExtraNotObject,
}

/// Error type returned when converting an integer into a severity.
#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum SeverityError {
    #[error("syslog severity out of range: {0}")]
    OutOfRange(i32),
}

/// Error type returned when reading writer settings from the environment.
#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("malformed meta entry {0:?}, expected key=value")]
    MalformedMeta(String),
}
