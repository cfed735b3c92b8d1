//! Message types for agent communication

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ActionError;

/// Message role in a conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    System,
    User,
    Agent,
    ActionResult,
}

/// A message in the conversation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,

    /// The invocation this message answers (action results only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub invocation: Option<InvocationRecord>,
}

impl Message {
    /// Create a system message
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
            invocation: None,
        }
    }

    /// Create a user message
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            invocation: None,
        }
    }

    /// Create an agent (final answer) message
    pub fn agent(content: impl Into<String>) -> Self {
        Self {
            role: Role::Agent,
            content: content.into(),
            invocation: None,
        }
    }

    /// Create a successful action result message
    pub fn action_result(invocation: ActionInvocation, round: usize, result: impl Into<String>) -> Self {
        Self {
            role: Role::ActionResult,
            content: result.into(),
            invocation: Some(InvocationRecord {
                id: invocation.id,
                name: invocation.name,
                arguments: invocation.arguments,
                round,
                error: None,
            }),
        }
    }

    /// Create a failed action result message.
    ///
    /// The content is a JSON object `{"error": kind, "message": text}` so the
    /// engine can read what went wrong on its next turn.
    pub fn action_failure(invocation: ActionInvocation, round: usize, error: &ActionError) -> Self {
        let content = serde_json::json!({
            "error": error.kind(),
            "message": error.to_string(),
        })
        .to_string();

        Self {
            role: Role::ActionResult,
            content,
            invocation: Some(InvocationRecord {
                id: invocation.id,
                name: invocation.name,
                arguments: invocation.arguments,
                round,
                error: Some(error.kind().to_string()),
            }),
        }
    }

    #[inline]
    pub fn is_system(&self) -> bool {
        self.role == Role::System
    }

    /// Whether this is an action result that reports a failure.
    pub fn is_failure(&self) -> bool {
        self.invocation
            .as_ref()
            .map(|r| r.error.is_some())
            .unwrap_or(false)
    }
}

/// A request from the decision engine to run one action
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionInvocation {
    pub id: String,
    pub name: String,
    pub arguments: Value,
}

impl ActionInvocation {
    /// Create an invocation with a generated id.
    pub fn new(name: impl Into<String>, arguments: Value) -> Self {
        Self {
            id: format!("call_{}", uuid::Uuid::new_v4().simple()),
            name: name.into(),
            arguments,
        }
    }

    /// Create an invocation with an engine-assigned id.
    pub fn with_id(id: impl Into<String>, name: impl Into<String>, arguments: Value) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            arguments,
        }
    }
}

/// Invocation record attached to an action result message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvocationRecord {
    pub id: String,
    pub name: String,
    pub arguments: Value,

    /// Index of the round trip whose batch produced this invocation
    pub round: usize,

    /// Error kind when validation failed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
