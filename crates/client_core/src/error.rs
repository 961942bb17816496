use thiserror::Error;

/// Failure surface of every remote gateway call.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The server rejected the request and supplied a human-readable reason.
    #[error("{message}")]
    Rejected { message: String },
    /// HTTP failure without an interpretable error body.
    #[error("request failed with status {status}")]
    Status { status: u16 },
    /// The request never produced an interpretable response.
    #[error(transparent)]
    Transport(#[from] reqwest::Error),
}

impl GatewayError {
    pub fn rejected(message: impl Into<String>) -> Self {
        GatewayError::Rejected {
            message: message.into(),
        }
    }

    /// Verbatim server-supplied message, when one exists. Callers fall back
    /// to their own generic text otherwise.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            GatewayError::Rejected { message } => Some(message),
            _ => None,
        }
    }
}
