use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    /// Bearer credential is missing or was rejected by the server.
    /// Halts the calendar-list cycle and is surfaced as a UI state.
    #[error("Authorization required")]
    AuthRequired,

    /// A fetch failed with an HTTP error. Localized to one calendar during
    /// a sync cycle; that calendar contributes zero events.
    #[error("Fetch failed (HTTP {status}): {message}")]
    FetchFailed { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Malformed payload field. Localized to a single event record.
    #[error("Parse error in {field}: {message}")]
    Parse { field: String, message: String },

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl AppError {
    pub fn fetch_failed(status: u16, message: impl Into<String>) -> Self {
        Self::FetchFailed {
            status,
            message: message.into(),
        }
    }

    pub fn parse(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Parse {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn storage<S: Into<String>>(msg: S) -> Self {
        Self::Storage(msg.into())
    }

    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::Config(msg.into())
    }

    pub fn is_auth(&self) -> bool {
        matches!(self, Self::AuthRequired)
    }

    /// Whether a retry could plausibly succeed. Auth and parse failures
    /// never count; timeouts, connection errors, 429 and 5xx do.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Network(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            Self::FetchFailed { status, .. } => *status == 429 || (500..=599).contains(status),
            _ => false,
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_is_not_transient() {
        assert!(!AppError::AuthRequired.is_transient());
        assert!(AppError::AuthRequired.is_auth());
    }

    #[test]
    fn test_server_errors_are_transient() {
        assert!(AppError::fetch_failed(503, "unavailable").is_transient());
        assert!(AppError::fetch_failed(429, "slow down").is_transient());
        assert!(!AppError::fetch_failed(404, "gone").is_transient());
        assert!(!AppError::fetch_failed(400, "bad request").is_transient());
    }

    #[test]
    fn test_parse_error_message() {
        let err = AppError::parse("start", "not a timestamp");
        assert_eq!(err.to_string(), "Parse error in start: not a timestamp");
        assert!(!err.is_transient());
    }
}
