//! Error types for Ponder

use thiserror::Error;

use crate::agent::Conversation;

/// Result type alias for Ponder operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in Ponder
#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Decision engine error: {0}")]
    Engine(String),

    /// Non-success HTTP status from the engine's API
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Malformed decision engine response: {0}")]
    MalformedResponse(String),

    #[error("Invalid conversation: {0}")]
    InvalidConversation(String),

    #[error("Action error: {0}")]
    Action(#[from] ActionError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The engine kept requesting actions past the round-trip cap.
    #[error("Run budget exceeded after {limit} round trips")]
    RunBudgetExceeded {
        limit: usize,
        conversation: Box<Conversation>,
    },

    /// The run stopped on a fatal engine error.
    #[error("Run aborted: {reason}")]
    RunAborted {
        reason: Box<Error>,
        conversation: Box<Conversation>,
    },

    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Partial transcript attached to a run-level failure, if any.
    pub fn partial_conversation(&self) -> Option<&Conversation> {
        match self {
            Error::RunBudgetExceeded { conversation, .. } => Some(conversation),
            Error::RunAborted { conversation, .. } => Some(conversation),
            _ => None,
        }
    }

    /// Consume the error and take its partial transcript, if any.
    pub fn into_partial_conversation(self) -> Option<Conversation> {
        match self {
            Error::RunBudgetExceeded { conversation, .. } => Some(*conversation),
            Error::RunAborted { conversation, .. } => Some(*conversation),
            _ => None,
        }
    }

    /// Whether a retry of the engine call could succeed.
    ///
    /// API errors are retried only for rate limiting and server failures.
    pub fn is_transient(&self) -> bool {
        match self {
            Error::Engine(_) | Error::Http(_) => true,
            Error::Api { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}

impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Error::Other(err.to_string())
    }
}

/// Validation errors raised by the action registry.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ActionError {
    #[error("Action '{0}' is already registered")]
    DuplicateName(String),

    #[error("Unknown action: {0}")]
    UnknownAction(String),

    #[error("Action '{action}' is missing required argument '{argument}'")]
    MissingRequiredArgument { action: String, argument: String },

    #[error("Action '{action}': argument '{argument}' {reason}")]
    TypeMismatch {
        action: String,
        argument: String,
        reason: String,
    },
}

impl ActionError {
    /// Stable machine-readable kind, used in failure results.
    pub fn kind(&self) -> &'static str {
        match self {
            ActionError::DuplicateName(_) => "duplicate_name",
            ActionError::UnknownAction(_) => "unknown_action",
            ActionError::MissingRequiredArgument { .. } => "missing_required_argument",
            ActionError::TypeMismatch { .. } => "type_mismatch",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_error_kinds() {
        assert_eq!(ActionError::UnknownAction("x".into()).kind(), "unknown_action");
        let err = ActionError::MissingRequiredArgument {
            action: "thinking_tool".into(),
            argument: "title".into(),
        };
        assert_eq!(err.kind(), "missing_required_argument");
        assert!(err.to_string().contains("'title'"));
    }

    #[test]
    fn test_only_rate_limit_and_server_errors_are_transient() {
        let api = |status| Error::Api { status, message: "x".into() };
        assert!(api(429).is_transient());
        assert!(api(500).is_transient());
        assert!(api(503).is_transient());
        assert!(!api(400).is_transient());
        assert!(!api(401).is_transient());
        assert!(!api(404).is_transient());
        assert!(!Error::MalformedResponse("x".into()).is_transient());
    }

    #[test]
    fn test_partial_conversation_only_on_run_errors() {
        let err = Error::RunBudgetExceeded {
            limit: 3,
            conversation: Box::new(Conversation::new()),
        };
        assert!(err.partial_conversation().is_some());
        assert!(Error::Config("bad".into()).partial_conversation().is_none());
    }
}
