//! LLM — Gemini completion client behind a provider-neutral trait.
//!
//! DESIGN
//! ======
//! The chat orchestrator talks to [`Complete`], never to Gemini directly:
//! a request is one fully-assembled prompt string and the reply is one
//! string, which is all the chat loop needs. [`GeminiClient`] is the only
//! production implementation; tests swap in mocks.

pub mod config;
pub mod gemini;
pub mod types;

pub use config::LlmConfig;
pub use gemini::GeminiClient;
pub use types::{Complete, CompletionError};
