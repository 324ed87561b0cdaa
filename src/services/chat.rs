//! Chat service — prompt assembly and the send exchange.
//!
//! DESIGN
//! ======
//! `send` owns one full exchange: busy gate, prompt assembly from the live
//! settings and history, the model call, and the user/assistant append
//! pair. Prompt assembly is pure so the format is testable without a
//! model. The context lookback is a fixed constant, deliberately decoupled
//! from the `context_window` display setting.

use std::sync::atomic::Ordering;

use tracing::{info, warn};

use super::conversation;
use crate::state::ChatState;
use crate::types::{Message, Role, Settings};

/// How many trailing history messages enter the prompt.
pub(crate) const FIXED_CONTEXT_MESSAGES: usize = 6;

const USER_LABEL: &str = "User";
const ASSISTANT_LABEL: &str = "Bungpui";

pub(crate) const DEFAULT_BASE_INSTRUCTION: &str = "You are Bungpui, an AI designed to help collect and create data on the Hmar language.
Your primary role is to assist users with translations, language learning, and cultural information about Hmar.

Guidelines

- Respect cultural contexts
- Keep answers short, clear, and structured
- Provide pronunciation when helpful
- Explain grammar briefly and clearly
- Use markdown and code blocks for structured data
- Admit uncertainty; never claim fluency
- Don’t fabricate info about yourself, the project, or the creator

Project Context

Bungpui is part of the Hmar Language Development Project, started July 2024 by Donal Muolhoi.
Built using Gemini by Google AI, it aims to document resources for Hmar.

Status: Pre-alpha; still learning, not authoritative.";

/// Base instruction for every prompt, overridable via
/// `BUNGPUI_SYSTEM_PROMPT`.
#[must_use]
pub fn base_instruction_from_env() -> String {
    std::env::var("BUNGPUI_SYSTEM_PROMPT").unwrap_or_else(|_| DEFAULT_BASE_INSTRUCTION.to_string())
}

// =============================================================================
// ERROR
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    /// The upstream model call failed.
    #[error("LLM error: {0}")]
    Upstream(#[from] crate::llm::CompletionError),
}

impl ChatError {
    /// Stable text shown to the user in place of a reply.
    #[must_use]
    pub fn user_message(&self) -> &'static str {
        "Failed to send message. Please try again."
    }
}

// =============================================================================
// SEND
// =============================================================================

/// Run one exchange: the text goes to the model with the live settings and
/// history, and on success the user and assistant messages are appended in
/// that order. `Ok(None)` means nothing was sent — blank input, or a send
/// already in flight.
///
/// Only the emptiness check trims; the text itself travels as typed.
pub async fn send(state: &ChatState, text: &str) -> Result<Option<Message>, ChatError> {
    if text.trim().is_empty() {
        return Ok(None);
    }
    if state.busy.swap(true, Ordering::SeqCst) {
        info!("chat: send already in flight, dropping message");
        return Ok(None);
    }

    let result = exchange(state, text).await;
    state.busy.store(false, Ordering::SeqCst);
    result
}

async fn exchange(state: &ChatState, text: &str) -> Result<Option<Message>, ChatError> {
    // Constructed first so its timestamp precedes the assistant's.
    let user_message = Message::user(text.to_string());

    let settings = state.settings.read().await.clone();
    let history = state.conversation.read().await.clone();
    let prompt = build_prompt(&state.base_instruction, &settings, &history, text);

    info!(prompt_len = prompt.len(), history_len = history.len(), "chat: prompt sent");
    let reply = match state.llm.complete(&prompt).await {
        Ok(reply) => reply,
        Err(e) => {
            warn!(error = %e, "chat: upstream call failed, history untouched");
            return Err(e.into());
        }
    };

    let assistant_message = Message::assistant(reply);
    conversation::append(state, user_message).await;
    conversation::append(state, assistant_message.clone()).await;

    info!(reply_len = assistant_message.content.len(), "chat: reply appended");
    Ok(Some(assistant_message))
}

// =============================================================================
// PROMPT ASSEMBLY
// =============================================================================

/// Assemble the full prompt: base instruction, custom-instruction block,
/// context block, then the `User:` line.
///
/// The custom block is present whenever `user_instruction` is non-empty
/// (untrimmed — a whitespace instruction still counts); otherwise it
/// collapses to a lone newline. `preferred_language` never enters the
/// prompt; it is a display-side preference.
pub(crate) fn build_prompt(
    base_instruction: &str,
    settings: &Settings,
    history: &[Message],
    text: &str,
) -> String {
    let custom = if settings.user_instruction.is_empty() {
        "\n".to_string()
    } else {
        format!("\nCustom Instructions: {}\n", settings.user_instruction)
    };
    let context = context_block(history);
    format!("{base_instruction}{custom}{context}User: {text}")
}

/// Render the last [`FIXED_CONTEXT_MESSAGES`] history messages as labeled
/// lines joined by blank lines. Empty history yields no block at all.
fn context_block(history: &[Message]) -> String {
    if history.is_empty() {
        return String::new();
    }
    let start = history.len().saturating_sub(FIXED_CONTEXT_MESSAGES);
    let lines = history[start..]
        .iter()
        .map(|m| {
            let label = match m.role {
                Role::User => USER_LABEL,
                Role::Assistant => ASSISTANT_LABEL,
            };
            format!("{label}: {}", m.content)
        })
        .collect::<Vec<_>>()
        .join("\n\n");
    format!("\n\nPrevious conversation:\n{lines}\n\n")
}

#[cfg(test)]
#[path = "chat_test.rs"]
mod tests;
