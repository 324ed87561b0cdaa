//! Bungpui chat-client core.
//!
//! The library behind the Bungpui Hmar-language assistant: session
//! lifecycle, settings and conversation state resolved through a
//! remote-over-cache-over-defaults fallback chain, and the prompt/exchange
//! flow against the Gemini API. [`ChatClient`] is the handle an embedding
//! UI holds; the module tree stays public for callers that wire their own
//! backends behind the seam traits.

pub mod cache;
pub mod client;
pub mod llm;
pub mod services;
pub mod session;
pub mod state;
pub mod store;
pub mod types;

pub use cache::{FsCache, LocalCache};
pub use client::{BuildError, ChatClient};
pub use llm::{Complete, CompletionError, GeminiClient};
pub use services::chat::ChatError;
pub use session::{SessionManager, SignUpOutcome};
pub use state::ChatState;
pub use store::{AuthApi, AuthSession, RemoteStore, StoreError};
pub use types::{Message, Role, Settings, SettingsPatch};
