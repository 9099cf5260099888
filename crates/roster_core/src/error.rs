use thiserror::Error;

/// Shown when a failure carries no server-provided message.
pub const GENERIC_ERROR_MESSAGE: &str = "Something went wrong while loading data. Please try again.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum QueryErrorKind {
    /// No response was received.
    #[error("network error")]
    Network,
    #[error("timeout")]
    Timeout,
    /// The server answered with a non-2xx status.
    #[error("server error {status}")]
    Server { status: u16 },
    /// The response body did not match the expected page shape.
    #[error("malformed response")]
    Decode,
}

/// A page fetch failure as seen by list consumers, after retries are exhausted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}{}", detail(.message))]
pub struct QueryError {
    pub kind: QueryErrorKind,
    pub message: Option<String>,
}

fn detail(message: &Option<String>) -> String {
    message
        .as_ref()
        .map(|message| format!(": {message}"))
        .unwrap_or_default()
}

impl QueryError {
    pub fn new(kind: QueryErrorKind, message: Option<String>) -> Self {
        Self { kind, message }
    }

    /// Server-provided message when there is one, otherwise a generic fallback.
    pub fn display_message(&self) -> &str {
        self.message
            .as_deref()
            .filter(|message| !message.trim().is_empty())
            .unwrap_or(GENERIC_ERROR_MESSAGE)
    }
}

/// Client-side input errors. These never reach the fetch engine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("unknown resource '{0}'")]
    UnknownResource(String),
    #[error("{resource} cannot be filtered by '{name}'")]
    UnknownFilter { resource: String, name: String },
    #[error("'{value}' is not a valid {resource} status")]
    InvalidStatus { resource: String, value: String },
    #[error("year must be a four digit number, got '{0}'")]
    InvalidYear(String),
    #[error("page size must be between 1 and {max}, got {value}")]
    InvalidPageSize { value: u32, max: u32 },
    #[error("expected name=value, got '{0}'")]
    MalformedFilter(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_error_is_a_std_error_with_detail() {
        let err = QueryError::new(
            QueryErrorKind::Server { status: 403 },
            Some("Access denied".into()),
        );
        let boxed: Box<dyn std::error::Error> = Box::new(err.clone());
        assert_eq!(boxed.to_string(), "server error 403: Access denied");
        assert_eq!(
            QueryError::new(QueryErrorKind::Timeout, None).to_string(),
            "timeout"
        );
        assert_eq!(err.display_message(), "Access denied");
    }
}
