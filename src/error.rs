use thiserror::Error;

/// Fallback shown when the server rejects a submission without a `detail`.
pub const GENERIC_FAILURE: &str = "Generation failed";

#[derive(Debug, Error)]
pub enum StudioError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Missing page element: #{0}")]
    MissingElement(String),

    #[error("A submission is already in flight")]
    Busy,

    #[error("Invalid form data: {0}")]
    InvalidForm(String),

    /// The request never produced a response.
    #[error("{0}")]
    Transport(String),

    /// The server answered with a non-2xx status.
    #[error("{detail}")]
    Protocol { status: u16, detail: String },

    /// The response body was not valid JSON.
    #[error("{0}")]
    Decode(String),

    #[error("Upstream model error: {0}")]
    Upstream(String),

    #[error("Model returned no image URL")]
    NoImage,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl StudioError {
    /// Builds a protocol error, preferring the server's detail over the generic message.
    pub fn protocol(status: u16, detail: Option<String>) -> Self {
        let detail = detail
            .filter(|d| !d.is_empty())
            .unwrap_or_else(|| GENERIC_FAILURE.to_string());
        StudioError::Protocol { status, detail }
    }

    /// Text rendered into the error label.
    pub fn user_message(&self) -> String {
        let message = self.to_string();
        if message.is_empty() {
            format!("{:?}", self)
        } else {
            message
        }
    }
}

impl From<reqwest::Error> for StudioError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            StudioError::Decode(err.to_string())
        } else {
            StudioError::Transport(err.to_string())
        }
    }
}

impl From<serde_json::Error> for StudioError {
    fn from(err: serde_json::Error) -> Self {
        StudioError::Decode(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, StudioError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn protocol_prefers_server_detail() {
        let err = StudioError::protocol(422, Some("bad input".into()));
        assert_eq!(err.user_message(), "bad input");
    }

    #[test]
    fn protocol_falls_back_to_generic_message() {
        assert_eq!(StudioError::protocol(500, None).user_message(), GENERIC_FAILURE);
        assert_eq!(
            StudioError::protocol(500, Some(String::new())).user_message(),
            GENERIC_FAILURE
        );
    }

    #[test]
    fn empty_transport_message_uses_debug_form() {
        let err = StudioError::Transport(String::new());
        assert_eq!(err.user_message(), "Transport(\"\")");
    }

    #[test]
    fn json_errors_are_decode_failures() {
        let err: StudioError = serde_json::from_str::<serde_json::Value>("<html>")
            .unwrap_err()
            .into();
        assert!(matches!(err, StudioError::Decode(_)));
    }
}
