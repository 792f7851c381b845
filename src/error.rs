use miette::Diagnostic;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, GatewayError>;

/// Raised when a signed message cannot be trusted.
#[derive(Error, Diagnostic, Debug, Clone, PartialEq, Eq)]
pub enum SignatureError {
    #[error("signature field `{0}` is missing or empty, message treated as forged")]
    #[diagnostic(code(jspay::signature::missing))]
    Missing(String),
    #[error("signature verification failed")]
    #[diagnostic(
        code(jspay::signature::mismatch),
        help("check that the configured signing key matches the merchant key on the gateway")
    )]
    Mismatch,
}

#[derive(Error, Diagnostic, Debug)]
pub enum GatewayError {
    #[error("notification body is neither an XML document nor a URL-encoded form")]
    #[diagnostic(code(jspay::format))]
    Format,
    #[error("bad response from gateway (HTTP {status}): {body}")]
    #[diagnostic(code(jspay::transport))]
    Transport { status: u16, body: String },
    #[error("unexpected gateway content: {0}")]
    #[diagnostic(code(jspay::protocol))]
    Protocol(String),
    #[error(transparent)]
    #[diagnostic(transparent)]
    Signature(#[from] SignatureError),
    #[error("HTTP error: {0}")]
    #[diagnostic(code(jspay::http))]
    Http(#[from] reqwest::Error),
    #[error("invalid configuration: {0}")]
    #[diagnostic(code(jspay::config), help("required keys are mch_id, key and notify_url"))]
    Config(String),
    #[error("validation error: {0}")]
    #[diagnostic(code(jspay::validation))]
    Validation(String),
    #[error("IO error: {0}")]
    #[diagnostic(code(jspay::io))]
    Io(#[from] std::io::Error),
}

impl GatewayError {
    /// Whether a caller-side retry has a chance of succeeding.
    ///
    /// The client never retries on its own.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Transport { status, .. } => *status >= 500,
            Self::Http(e) => e.is_timeout() || e.is_connect(),
            _ => false,
        }
    }
}
