use std::fmt;

/// Error types for epmine operations
#[derive(Debug)]
pub enum EpmError {
    /// IO error (file operations, etc.)
    Io(std::io::Error),

    /// Configuration error
    Config(String),

    /// Dataset could not be located or loaded
    Dataset(String),

    /// Event log has an unusable shape (missing columns, bad header)
    LogFormat(String),

    /// An analysis step could not produce a result
    Analysis(String),

    /// Graph rendering failed
    Render(String),

    /// A dashboard process could not be started
    Launch(String),

    /// Dashboard server error
    Server(String),

    /// Regex compilation error
    Regex(regex::Error),

    /// TOML parsing error
    TomlParsing(toml::de::Error),

    /// JSON serialization error
    Json(serde_json::Error),

    /// CSV reading or writing error
    Csv(csv::Error),

    /// Invalid argument error
    InvalidArgument(String),
}

impl fmt::Display for EpmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EpmError::Io(err) => write!(f, "IO error: {err}"),
            EpmError::Config(msg) => write!(f, "Configuration error: {msg}"),
            EpmError::Dataset(msg) => write!(f, "Dataset error: {msg}"),
            EpmError::LogFormat(msg) => write!(f, "Event log format error: {msg}"),
            EpmError::Analysis(msg) => write!(f, "Analysis error: {msg}"),
            EpmError::Render(msg) => write!(f, "Render error: {msg}"),
            EpmError::Launch(msg) => write!(f, "Launch error: {msg}"),
            EpmError::Server(msg) => write!(f, "Server error: {msg}"),
            EpmError::Regex(err) => write!(f, "Regex error: {err}"),
            EpmError::TomlParsing(err) => write!(f, "TOML parsing error: {err}"),
            EpmError::Json(err) => write!(f, "JSON error: {err}"),
            EpmError::Csv(err) => write!(f, "CSV error: {err}"),
            EpmError::InvalidArgument(msg) => write!(f, "Invalid argument: {msg}"),
        }
    }
}

impl std::error::Error for EpmError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            EpmError::Io(err) => Some(err),
            EpmError::Regex(err) => Some(err),
            EpmError::TomlParsing(err) => Some(err),
            EpmError::Json(err) => Some(err),
            EpmError::Csv(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for EpmError {
    fn from(err: std::io::Error) -> Self {
        EpmError::Io(err)
    }
}

impl From<regex::Error> for EpmError {
    fn from(err: regex::Error) -> Self {
        EpmError::Regex(err)
    }
}

impl From<toml::de::Error> for EpmError {
    fn from(err: toml::de::Error) -> Self {
        EpmError::TomlParsing(err)
    }
}

impl From<serde_json::Error> for EpmError {
    fn from(err: serde_json::Error) -> Self {
        EpmError::Json(err)
    }
}

impl From<csv::Error> for EpmError {
    fn from(err: csv::Error) -> Self {
        EpmError::Csv(err)
    }
}

/// Type alias for Results using EpmError
pub type Result<T> = std::result::Result<T, EpmError>;
