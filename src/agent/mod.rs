//! Agent module — core reasoning protocol.
//!
//! This module contains:
//! - Message and conversation types
//! - Decision engine trait and implementations
//! - Agent loop (the turn orchestrator)
//! - System instructions
//!
//! # Adding a New Decision Engine
//!
//! See [`llm::ProviderRegistry`] for instructions.

mod conversation;
mod loop_impl;
mod message;
pub mod prompt;

// Decision engines in submodule
pub mod llm;

// Re-exports for convenience
pub use conversation::Conversation;
pub use llm::{Decision, DecisionEngine, OpenAiClient, ProviderRegistry, Usage};
pub use loop_impl::AgentLoop;
pub use message::{ActionInvocation, InvocationRecord, Message, Role};
