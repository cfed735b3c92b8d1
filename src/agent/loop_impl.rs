//! Agent loop - drives one run from user message to final answer

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::Error;
use crate::tools::{ActionDescriptor, ActionRegistry};
use crate::Result;

use super::conversation::Conversation;
use super::llm::{Decision, DecisionEngine};
use super::message::{ActionInvocation, Message, Role};
use super::prompt;

/// The agent loop alternates engine decisions with action execution.
///
/// Init prepends the system message if missing, then Deciding and Executing
/// repeat until the engine answers. Executing rounds are capped.
pub struct AgentLoop<E: DecisionEngine> {
    engine: E,
    registry: Arc<ActionRegistry>,
    instructions: String,
    max_round_trips: usize,
    max_engine_retries: usize,
    retry_backoff: Duration,
}

impl<E: DecisionEngine> AgentLoop<E> {
    /// Create a new agent loop with the default instructions
    pub fn new(engine: E, registry: Arc<ActionRegistry>, max_round_trips: usize) -> Self {
        Self {
            engine,
            registry,
            instructions: prompt::default_instructions(),
            max_round_trips,
            max_engine_retries: 0,
            retry_backoff: Duration::ZERO,
        }
    }

    /// Create an agent loop with budgets and instructions from configuration
    pub fn from_config(engine: E, registry: Arc<ActionRegistry>, config: &Config) -> Self {
        Self::new(engine, registry, config.max_round_trips)
            .with_instructions(prompt::system_instructions(config))
            .with_retries(config.max_engine_retries, Duration::from_millis(config.retry_backoff_ms))
    }

    pub fn with_instructions(mut self, instructions: impl Into<String>) -> Self {
        self.instructions = instructions.into();
        self
    }

    /// Retry transient engine failures, doubling the delay each time
    pub fn with_retries(mut self, max_retries: usize, backoff: Duration) -> Self {
        self.max_engine_retries = max_retries;
        self.retry_backoff = backoff;
        self
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn registry(&self) -> &ActionRegistry {
        &self.registry
    }

    pub fn max_round_trips(&self) -> usize {
        self.max_round_trips
    }

    /// Run the loop until the engine answers.
    ///
    /// Run-level failures carry the partial conversation.
    pub async fn run(&self, mut conversation: Conversation) -> Result<Conversation> {
        if conversation.ensure_system(&self.instructions) {
            debug!("Injected system instructions");
        }

        info!(
            "Starting agent run with {} messages (model: {})",
            conversation.len(),
            self.engine.model()
        );

        let catalog = self.registry.catalog();
        let mut round_trips = 0;

        loop {
            let decision = match self.decide(&conversation, catalog).await {
                Ok(decision) => decision,
                Err(e) => {
                    warn!("Run aborted after {} round trips: {}", round_trips, e);
                    return Err(Error::RunAborted {
                        reason: Box::new(e),
                        conversation: Box::new(conversation),
                    });
                }
            };

            let invocations = match decision {
                Decision::Answer(message) if message.role != Role::Agent => {
                    warn!("Engine answered with role {:?}", message.role);
                    return Err(Error::RunAborted {
                        reason: Box::new(Error::MalformedResponse(format!(
                            "final answer must have the agent role, got {:?}",
                            message.role
                        ))),
                        conversation: Box::new(conversation),
                    });
                }
                Decision::Answer(message) => {
                    info!("Agent completed with response: {} chars", message.content.len());
                    conversation.push(message)?;
                    return Ok(conversation);
                }
                Decision::Invoke(invocations) => invocations,
            };

            if round_trips == self.max_round_trips {
                warn!("Round-trip budget of {} exhausted", self.max_round_trips);
                return Err(Error::RunBudgetExceeded {
                    limit: self.max_round_trips,
                    conversation: Box::new(conversation),
                });
            }

            debug!(
                "Round trip {}/{}: {} invocations",
                round_trips + 1,
                self.max_round_trips,
                invocations.len()
            );

            for invocation in invocations {
                let result = self.execute_action(invocation, round_trips);
                conversation.push(result)?;
            }
            round_trips += 1;
        }
    }

    /// Ask the engine for a decision, retrying transient failures.
    async fn decide(&self, conversation: &Conversation, catalog: &[ActionDescriptor]) -> Result<Decision> {
        let mut attempt = 0;
        let mut delay = self.retry_backoff;

        loop {
            match self.engine.decide(conversation, catalog).await {
                Ok(Decision::Invoke(invocations)) if invocations.is_empty() => {
                    return Err(Error::MalformedResponse(
                        "engine requested an empty batch of actions".to_string(),
                    ));
                }
                Ok(decision) => return Ok(decision),
                Err(e) if e.is_transient() && attempt < self.max_engine_retries => {
                    attempt += 1;
                    warn!(
                        "Engine call failed (attempt {}/{}): {}",
                        attempt,
                        self.max_engine_retries + 1,
                        e
                    );
                    if !delay.is_zero() {
                        tokio::time::sleep(delay).await;
                        delay = next_backoff(delay);
                    }
                }
                Err(e) => return Err(e),
            }
        }
    }

    fn execute_action(&self, invocation: ActionInvocation, round: usize) -> Message {
        debug!("Executing action: {} with args: {}", invocation.name, invocation.arguments);

        match self.registry.invoke(&invocation.name, &invocation.arguments) {
            Ok(result) => {
                debug!("Action {} succeeded: {}", invocation.name, result);
                Message::action_result(invocation, round, result)
            }
            Err(e) => {
                debug!("Action {} failed: {}", invocation.name, e);
                Message::action_failure(invocation, round, &e)
            }
        }
    }
}

fn next_backoff(delay: Duration) -> Duration {
    delay.saturating_mul(2)
}
