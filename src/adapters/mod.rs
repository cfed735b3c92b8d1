//! Adapters module — front-end integrations.
//!
//! # Supported Front-ends
//!
//! - **CLI** — Interactive command line session

pub mod cli;

pub use cli::Session;
