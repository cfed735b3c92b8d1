//! Ponder - visible, structured reasoning for LLM agents
//!
//! This library exposes an agent's reasoning as two schema-typed actions
//! (`thinking_tool` and `analyze_tool`) and drives the turn-taking loop
//! between a decision engine and those actions.

pub mod agent;
pub mod tools;
pub mod adapters;
pub mod config;
pub mod error;
pub mod ui;

pub use error::{ActionError, Error, Result};
