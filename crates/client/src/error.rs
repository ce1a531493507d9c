//! Error taxonomy for the API client.
//!
//! Three failure classes reach the caller, per the error contract:
//! transport failures, non-2xx responses with a structured `detail`
//! message, and non-2xx responses with an unparseable body (a generic
//! message is substituted). All display as a single human-readable
//! string; none is fatal; callers retry the triggering action.

use agriwatch_core::error::CoreError;

/// Errors from the AgriWatch API client.
#[derive(Debug, thiserror::Error)]
pub enum ApiClientError {
    /// The HTTP request itself failed (network, DNS, TLS, timeout) or
    /// a success body failed to decode.
    #[error("HTTP request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The backend returned a non-2xx status code.
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// The backend's `detail` message, or a generic substitute when
        /// the body carried none.
        message: String,
    },

    /// The request failed client-side validation before being sent.
    #[error("Invalid request: {0}")]
    InvalidRequest(#[from] CoreError),
}

impl ApiClientError {
    /// The display string for the UI layer.
    pub fn display_message(&self) -> String {
        match self {
            Self::Api { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }

    /// HTTP status code, when the backend produced one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::Transport(e) => e.status().map(|s| s.as_u16()),
            Self::InvalidRequest(_) => None,
        }
    }
}
