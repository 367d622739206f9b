use thiserror::Error;

/// JSON-RPC error codes that signal a retry-recoverable condition
const TRANSIENT_RPC_CODES: &[i64] = &[
    -32005, // limit exceeded
    -32097, // request rate exceeded (some providers)
    429,
];

/// Message fragments providers use for throttling and overload
const TRANSIENT_MESSAGE_FRAGMENTS: &[&str] = &[
    "rate limit",
    "too many requests",
    "timeout",
    "timed out",
    "header not found",
    "temporarily unavailable",
    "service unavailable",
    "connection reset",
    "connection refused",
    "server is busy",
    "try again",
];

/// Transport-level failures, split by whether a retry can succeed
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("Transient transport fault: {0}")]
    Transient(String),

    #[error("Permanent transport fault: {0}")]
    Permanent(String),
}

impl TransportError {
    pub fn is_transient(&self) -> bool {
        matches!(self, TransportError::Transient(_))
    }

    pub fn message(&self) -> &str {
        match self {
            TransportError::Transient(msg) | TransportError::Permanent(msg) => msg,
        }
    }

    /// Classify a JSON-RPC error object
    pub fn from_rpc_error(code: i64, message: &str) -> Self {
        let text = format!("{}: {}", code, message);
        if TRANSIENT_RPC_CODES.contains(&code) || is_transient_message(message) {
            TransportError::Transient(text)
        } else {
            TransportError::Permanent(text)
        }
    }

    /// Classify a non-success HTTP status
    pub fn from_http_status(status: u16, body: &str) -> Self {
        let text = format!("HTTP {}: {}", status, body.trim());
        match status {
            408 | 425 | 429 | 500 | 502 | 503 | 504 => TransportError::Transient(text),
            _ if is_transient_message(body) => TransportError::Transient(text),
            _ => TransportError::Permanent(text),
        }
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() || err.is_connect() || err.is_request() || err.is_body() {
            TransportError::Transient(err.to_string())
        } else if let Some(status) = err.status() {
            TransportError::from_http_status(status.as_u16(), &err.to_string())
        } else {
            TransportError::Permanent(err.to_string())
        }
    }
}

fn is_transient_message(message: &str) -> bool {
    let lower = message.to_lowercase();
    TRANSIENT_MESSAGE_FRAGMENTS
        .iter()
        .any(|fragment| lower.contains(fragment))
}
