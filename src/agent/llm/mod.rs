//! Decision engine abstraction layer.
//!
//! This module provides:
//! - [`DecisionEngine`] trait for swappable language-model backends
//! - [`ProviderRegistry`] for creating an engine from configuration
//! - [`OpenAiClient`], an OpenAI-compatible chat completions engine
//!
//! # Adding a New Provider
//!
//! 1. Create a new file (e.g., `anthropic.rs`)
//! 2. Implement `DecisionEngine`
//! 3. Add to `ProviderRegistry::create()`
//! 4. Add config fields in `config.rs`

mod types;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::error::Error;
use crate::tools::ActionDescriptor;
use crate::Result;

pub use types::*;

pub mod openai;

pub use openai::OpenAiClient;

use super::conversation::Conversation;
use super::message::{ActionInvocation, Message};

/// What the engine decided for one turn.
#[derive(Debug, Clone, PartialEq)]
pub enum Decision {
    /// Run these actions, in order.
    Invoke(Vec<ActionInvocation>),
    /// Final answer; ends the run.
    Answer(Message),
}

impl Decision {
    /// A final answer from plain text.
    pub fn answer(content: impl Into<String>) -> Self {
        Decision::Answer(Message::agent(content))
    }

    #[inline]
    pub fn has_invocations(&self) -> bool {
        matches!(self, Decision::Invoke(_))
    }
}

/// Token usage information.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Usage {
    pub prompt_tokens: usize,
    pub completion_tokens: usize,
    pub total_tokens: usize,
}

/// Decision engine trait — the language-model collaborator.
///
/// Implement this trait to add a new provider.
#[async_trait]
pub trait DecisionEngine: Send + Sync {
    /// Read the conversation and either request actions or answer.
    async fn decide(
        &self,
        conversation: &Conversation,
        catalog: &[ActionDescriptor],
    ) -> Result<Decision>;

    /// Model this engine talks to.
    fn model(&self) -> &str;
}

#[async_trait]
impl<E: DecisionEngine + ?Sized> DecisionEngine for Box<E> {
    async fn decide(
        &self,
        conversation: &Conversation,
        catalog: &[ActionDescriptor],
    ) -> Result<Decision> {
        (**self).decide(conversation, catalog).await
    }

    fn model(&self) -> &str {
        (**self).model()
    }
}

/// Provider registry — creates decision engines from configuration.
///
/// # Example
///
/// ```ignore
/// let engine = ProviderRegistry::create(&config)?;
/// let agent = AgentLoop::from_config(engine, registry, &config);
/// ```
pub struct ProviderRegistry;

impl ProviderRegistry {
    /// Create a decision engine from configuration.
    ///
    /// Supported providers:
    /// - `"openai"`: any OpenAI-compatible chat completions endpoint
    pub fn create(config: &Config) -> Result<Box<dyn DecisionEngine>> {
        match config.provider.as_str() {
            "openai" => {
                if config.api_key.is_empty() {
                    return Err(Error::Config(
                        "No API key set. Add api_key to the config or set OPENAI_API_KEY.".to_string(),
                    ));
                }
                let client = OpenAiClient::from_config(config);
                Ok(Box::new(client))
            }
            other => Err(Error::Config(format!("Unknown provider: {other}"))),
        }
    }

    /// List available provider names.
    pub fn available() -> &'static [&'static str] {
        &["openai"]
    }
}

/// Scripted decision engine for testing.
#[cfg(test)]
pub struct FakeEngine {
    script: std::sync::Mutex<std::collections::VecDeque<Result<Decision>>>,
    repeat: Option<Decision>,
    seen: std::sync::Mutex<Vec<usize>>,
}

#[cfg(test)]
impl FakeEngine {
    /// Play back these decisions in order.
    pub fn new(decisions: Vec<Decision>) -> Self {
        Self::with_results(decisions.into_iter().map(Ok).collect())
    }

    /// Play back decisions and errors in order.
    pub fn with_results(results: Vec<Result<Decision>>) -> Self {
        Self {
            script: std::sync::Mutex::new(results.into()),
            repeat: None,
            seen: std::sync::Mutex::new(Vec::new()),
        }
    }

    /// Return the same decision forever.
    pub fn always(decision: Decision) -> Self {
        Self {
            script: std::sync::Mutex::new(Default::default()),
            repeat: Some(decision),
            seen: std::sync::Mutex::new(Vec::new()),
        }
    }

    /// Conversation length observed at each call.
    pub fn seen_lengths(&self) -> Vec<usize> {
        self.seen.lock().unwrap().clone()
    }
}

#[cfg(test)]
#[async_trait]
impl DecisionEngine for FakeEngine {
    async fn decide(
        &self,
        conversation: &Conversation,
        _catalog: &[ActionDescriptor],
    ) -> Result<Decision> {
        self.seen.lock().unwrap().push(conversation.len());
        if let Some(ref decision) = self.repeat {
            return Ok(decision.clone());
        }
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(Error::Engine("No more fake decisions".to_string())))
    }

    fn model(&self) -> &str {
        "fake-model"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_fake_engine() {
        let engine = FakeEngine::new(vec![Decision::answer("Hello!"), Decision::answer("World!")]);
        let conv = Conversation::new();

        let first = engine.decide(&conv, &[]).await.unwrap();
        assert_eq!(first, Decision::answer("Hello!"));

        let second = engine.decide(&conv, &[]).await.unwrap();
        assert!(!second.has_invocations());

        assert!(engine.decide(&conv, &[]).await.is_err());
    }

    #[test]
    fn test_boxed_engine_delegates() {
        let engine: Box<dyn DecisionEngine> = Box::new(FakeEngine::new(vec![Decision::answer("ok")]));
        assert_eq!(engine.model(), "fake-model");

        let decision = tokio_test::block_on(engine.decide(&Conversation::new(), &[])).unwrap();
        assert_eq!(decision, Decision::answer("ok"));
    }

    #[test]
    fn test_create_requires_api_key() {
        let config = Config {
            api_key: String::new(),
            ..Config::default()
        };
        assert!(matches!(ProviderRegistry::create(&config), Err(Error::Config(_))));

        let config = Config {
            provider: "nope".to_string(),
            api_key: "k".to_string(),
            ..Config::default()
        };
        assert!(matches!(ProviderRegistry::create(&config), Err(Error::Config(_))));
    }
}
