//! Append-only conversation.

use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::Result;

use super::message::Message;

/// Ordered, append-only sequence of messages owned by one run.
///
/// At most one system message exists, and if present it is the first element.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Message>", into = "Vec<Message>")]
pub struct Conversation {
    messages: Vec<Message>,
}

impl Conversation {
    /// Create an empty conversation
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a conversation with a single user message
    pub fn from_user(content: impl Into<String>) -> Self {
        Self {
            messages: vec![Message::user(content)],
        }
    }

    /// Build a conversation from existing messages, checking the system-message rule.
    pub fn from_messages(messages: Vec<Message>) -> Result<Self> {
        let system_count = messages.iter().filter(|m| m.is_system()).count();
        if system_count > 1 {
            return Err(Error::InvalidConversation(format!(
                "expected at most one system message, found {system_count}"
            )));
        }
        if system_count == 1 && !messages[0].is_system() {
            return Err(Error::InvalidConversation(
                "system message must be the first message".to_string(),
            ));
        }
        Ok(Self { messages })
    }

    /// Append a message.
    ///
    /// A system message is only accepted into an empty conversation.
    pub fn push(&mut self, message: Message) -> Result<()> {
        if message.is_system() && !self.messages.is_empty() {
            return Err(Error::InvalidConversation(
                "system message can only open a conversation".to_string(),
            ));
        }
        self.messages.push(message);
        Ok(())
    }

    /// Prepend a system message unless one is already present.
    ///
    /// Returns `true` if a message was inserted.
    pub fn ensure_system(&mut self, instructions: &str) -> bool {
        if self.has_system() {
            return false;
        }
        self.messages.insert(0, Message::system(instructions));
        true
    }

    pub fn has_system(&self) -> bool {
        self.messages.first().map(Message::is_system).unwrap_or(false)
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Message> {
        self.messages.iter()
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

impl TryFrom<Vec<Message>> for Conversation {
    type Error = Error;

    fn try_from(messages: Vec<Message>) -> Result<Self> {
        Self::from_messages(messages)
    }
}

impl From<Conversation> for Vec<Message> {
    fn from(conversation: Conversation) -> Self {
        conversation.messages
    }
}

impl<'a> IntoIterator for &'a Conversation {
    type Item = &'a Message;
    type IntoIter = std::slice::Iter<'a, Message>;

    fn into_iter(self) -> Self::IntoIter {
        self.messages.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::message::Role;

    #[test]
    fn test_ensure_system_is_idempotent() {
        let mut conv = Conversation::from_user("hi");
        assert!(conv.ensure_system("be careful"));
        for _ in 0..5 {
            assert!(!conv.ensure_system("be careful"));
        }

        let systems = conv.iter().filter(|m| m.role == Role::System).count();
        assert_eq!(systems, 1);
        assert_eq!(conv.messages()[0].role, Role::System);
        assert_eq!(conv.len(), 2);
    }

    #[test]
    fn test_ensure_system_keeps_existing_prompt() {
        let mut conv =
            Conversation::from_messages(vec![Message::system("custom"), Message::user("hi")]).unwrap();
        conv.ensure_system("default");
        assert_eq!(conv.messages()[0].content, "custom");
        assert_eq!(conv.len(), 2);
    }

    #[test]
    fn test_from_messages_rejects_late_system() {
        let result = Conversation::from_messages(vec![Message::user("hi"), Message::system("late")]);
        assert!(matches!(result, Err(Error::InvalidConversation(_))));
    }

    #[test]
    fn test_from_messages_rejects_two_systems() {
        let result = Conversation::from_messages(vec![Message::system("a"), Message::system("b")]);
        assert!(matches!(result, Err(Error::InvalidConversation(_))));
    }

    #[test]
    fn test_push_rejects_system_after_first() {
        let mut conv = Conversation::from_user("hi");
        assert!(conv.push(Message::system("nope")).is_err());
        assert!(conv.push(Message::agent("ok")).is_ok());
        assert_eq!(conv.len(), 2);
    }

    #[test]
    fn test_deserialize_validates() {
        let json = r#"[{"role":"user","content":"a"},{"role":"system","content":"b"}]"#;
        assert!(serde_json::from_str::<Conversation>(json).is_err());

        let json = r#"[{"role":"system","content":"b"},{"role":"user","content":"a"}]"#;
        let conv: Conversation = serde_json::from_str(json).unwrap();
        assert_eq!(conv.len(), 2);
    }
}
