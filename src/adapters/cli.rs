//! CLI adapter — interactive and single-message command line interface.
//!
//! A [`Session`] keeps one conversation across user turns so follow-up
//! questions see earlier reasoning.

use std::io::{self, BufRead, Write};

use tracing::warn;

use crate::agent::{AgentLoop, Conversation, DecisionEngine, Message};
use crate::ui;
use crate::Result;

/// Multi-turn chat session over one agent loop.
pub struct Session<E: DecisionEngine> {
    agent: AgentLoop<E>,
    conversation: Conversation,
}

impl<E: DecisionEngine> Session<E> {
    /// Create a new session.
    pub fn new(agent: AgentLoop<E>) -> Self {
        Self {
            agent,
            conversation: Conversation::new(),
        }
    }

    /// Send one user message and return the messages the run added.
    ///
    /// On a run failure the partial transcript is kept so the chat can go on;
    /// failures without one leave the history untouched.
    pub async fn send(&mut self, input: &str) -> Result<Vec<Message>> {
        let mut conversation = self.conversation.clone();
        conversation.push(Message::user(input))?;

        // The first run prepends the system message
        let mut start = conversation.len();
        if !conversation.has_system() {
            start += 1;
        }

        match self.agent.run(conversation).await {
            Ok(conversation) => {
                let new = conversation.messages()[start..].to_vec();
                self.conversation = conversation;
                Ok(new)
            }
            Err(e) => {
                if let Some(partial) = e.partial_conversation() {
                    self.conversation = partial.clone();
                }
                Err(e)
            }
        }
    }

    /// Run interactive REPL loop.
    pub async fn run_interactive(&mut self) -> Result<()> {
        let stdin = io::stdin();
        let mut stdout = io::stdout();

        loop {
            print!("\n> ");
            stdout.flush()?;

            let mut line = String::new();
            if stdin.lock().read_line(&mut line)? == 0 {
                // EOF
                break;
            }

            let input = line.trim();
            if input.is_empty() {
                continue;
            }

            if matches!(input.to_lowercase().as_str(), "exit" | "quit" | "q") {
                println!("Goodbye! 👋");
                break;
            }

            match self.send(input).await {
                Ok(messages) => {
                    for message in &messages {
                        println!("\n{}", ui::render_message(message));
                    }
                }
                Err(e) => {
                    warn!("Run failed: {}", e);
                    ui::print_error(&e.to_string());
                }
            }
        }

        Ok(())
    }

    /// The conversation so far.
    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    /// Start over with an empty conversation.
    pub fn clear(&mut self) {
        self.conversation = Conversation::new();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::llm::FakeEngine;
    use crate::agent::{ActionInvocation, Decision, Role};
    use crate::error::Error;
    use crate::tools::{ActionRegistry, THINKING_ACTION};
    use serde_json::json;
    use std::sync::Arc;

    fn think() -> ActionInvocation {
        ActionInvocation::new(THINKING_ACTION, json!({"title": "t", "thought": "x"}))
    }

    #[tokio::test]
    async fn test_session_keeps_history() {
        let engine = FakeEngine::new(vec![
            Decision::Invoke(vec![think()]),
            Decision::answer("first"),
            Decision::answer("second"),
        ]);
        let registry = Arc::new(ActionRegistry::with_reasoning_actions());
        let mut session = Session::new(AgentLoop::new(engine, registry, 5));

        let added = session.send("one").await.unwrap();
        assert_eq!(added.len(), 2);
        assert_eq!(added[0].role, Role::ActionResult);
        assert_eq!(added[1].content, "first");

        let added = session.send("two").await.unwrap();
        assert_eq!(added.len(), 1);
        assert_eq!(added[0].content, "second");

        let roles: Vec<Role> = session.conversation().iter().map(|m| m.role).collect();
        assert_eq!(
            roles,
            vec![Role::System, Role::User, Role::ActionResult, Role::Agent, Role::User, Role::Agent]
        );
    }

    #[tokio::test]
    async fn test_session_keeps_partial_on_failure() {
        let engine = FakeEngine::with_results(vec![
            Ok(Decision::Invoke(vec![think()])),
            Err(Error::Engine("down".to_string())),
        ]);
        let registry = Arc::new(ActionRegistry::with_reasoning_actions());
        let mut session = Session::new(AgentLoop::new(engine, registry, 5));

        assert!(session.send("one").await.is_err());
        assert_eq!(session.conversation().len(), 3);

        session.clear();
        assert!(session.conversation().is_empty());
    }

    #[tokio::test]
    async fn test_session_history_survives_malformed_answer() {
        let engine = FakeEngine::new(vec![
            Decision::answer("first"),
            Decision::Answer(Message::system("bogus")),
        ]);
        let registry = Arc::new(ActionRegistry::with_reasoning_actions());
        let mut session = Session::new(AgentLoop::new(engine, registry, 5));

        session.send("one").await.unwrap();
        let err = session.send("two").await.unwrap_err();
        assert!(matches!(err, Error::RunAborted { .. }));

        let roles: Vec<Role> = session.conversation().iter().map(|m| m.role).collect();
        assert_eq!(roles, vec![Role::System, Role::User, Role::Agent, Role::User]);
    }
}
