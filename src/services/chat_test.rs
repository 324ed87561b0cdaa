use std::sync::Arc;
use std::sync::atomic::Ordering;

use super::*;
use crate::cache::HISTORY_KEY;
use crate::state::test_helpers::*;

async fn seed_history(state: &ChatState, contents: &[&str]) {
    let mut conversation = state.conversation.write().await;
    for (i, content) in contents.iter().enumerate() {
        let message = if i % 2 == 0 {
            Message::user((*content).to_string())
        } else {
            Message::assistant((*content).to_string())
        };
        conversation.push(message);
    }
}

// =============================================================================
// PROMPT SHAPE
// =============================================================================

#[tokio::test]
async fn fresh_send_uses_the_bare_prompt_shape() {
    let llm = Arc::new(MockLlm::replying(&["Kan ring takzet!"]));
    let state = test_state_with(Arc::new(MockStore::default()), llm.clone());
    sign_in_test_user(&state).await;

    let reply = send(&state, "Hello! Can you help me learn Hmar?")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(reply.role, Role::Assistant);
    assert_eq!(reply.content, "Kan ring takzet!");

    // Defaults + empty history collapse the middle to a single newline.
    assert_eq!(
        llm.last_prompt(),
        format!("{TEST_BASE_INSTRUCTION}\nUser: Hello! Can you help me learn Hmar?")
    );
}

#[test]
fn build_prompt_with_all_blocks() {
    let settings = Settings {
        user_instruction: "Be brief.".to_string(),
        ..Settings::default()
    };
    let history = vec![
        Message::user("A".to_string()),
        Message::assistant("B".to_string()),
    ];

    let prompt = build_prompt("BASE", &settings, &history, "C");
    assert_eq!(
        prompt,
        "BASE\nCustom Instructions: Be brief.\n\n\nPrevious conversation:\nUser: A\n\nBungpui: B\n\nUser: C"
    );
}

#[tokio::test]
async fn whitespace_instruction_still_gets_a_block() {
    let llm = Arc::new(MockLlm::default());
    let state = test_state_with(Arc::new(MockStore::default()), llm.clone());
    state.settings.write().await.user_instruction = "   ".to_string();

    send(&state, "Chibai!").await.unwrap();
    assert!(llm.last_prompt().contains("\nCustom Instructions:    \n"));
}

#[tokio::test]
async fn sent_text_is_not_trimmed() {
    let llm = Arc::new(MockLlm::default());
    let state = test_state_with(Arc::new(MockStore::default()), llm.clone());

    send(&state, "  Chibai!  ").await.unwrap();
    assert!(llm.last_prompt().ends_with("User:   Chibai!  "));

    let history = conversation::messages(&state).await;
    assert_eq!(history[0].content, "  Chibai!  ");
}

// =============================================================================
// CONTEXT LOOKBACK
// =============================================================================

#[tokio::test]
async fn context_carries_prior_history_with_labels() {
    let llm = Arc::new(MockLlm::default());
    let state = test_state_with(Arc::new(MockStore::default()), llm.clone());
    seed_history(&state, &["one", "two"]).await;

    send(&state, "three").await.unwrap();
    assert_eq!(
        llm.last_prompt(),
        format!(
            "{TEST_BASE_INSTRUCTION}\n\n\nPrevious conversation:\nUser: one\n\nBungpui: two\n\nUser: three"
        )
    );
}

#[tokio::test]
async fn context_keeps_only_the_last_six_messages() {
    let llm = Arc::new(MockLlm::default());
    let state = test_state_with(Arc::new(MockStore::default()), llm.clone());
    seed_history(&state, &["m1", "m2", "m3", "m4", "m5", "m6", "m7", "m8"]).await;

    send(&state, "m9").await.unwrap();
    let prompt = llm.last_prompt();
    assert!(!prompt.contains("m1"));
    assert!(!prompt.contains("m2"));
    assert!(prompt.contains(
        "Previous conversation:\nUser: m3\n\nBungpui: m4\n\nUser: m5\n\nBungpui: m6\n\nUser: m7\n\nBungpui: m8"
    ));
}

#[tokio::test]
async fn context_ignores_the_display_window_setting() {
    let llm = Arc::new(MockLlm::default());
    let state = test_state_with(Arc::new(MockStore::default()), llm.clone());
    state.settings.write().await.context_window = 1;
    seed_history(&state, &["m1", "m2", "m3", "m4", "m5", "m6", "m7", "m8"]).await;

    send(&state, "m9").await.unwrap();
    // Display preference never shrinks the model context.
    assert!(llm.last_prompt().contains("User: m3"));
}

// =============================================================================
// SEND FLOW
// =============================================================================

#[tokio::test]
async fn send_appends_user_then_assistant_and_syncs() {
    let store = Arc::new(MockStore::default());
    let state = test_state_with(store.clone(), Arc::new(MockLlm::replying(&["Ka lawm e."])));
    sign_in_test_user(&state).await;

    send(&state, "Chibai!").await.unwrap();

    let history = conversation::messages(&state).await;
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].role, Role::User);
    assert_eq!(history[0].content, "Chibai!");
    assert_eq!(history[1].role, Role::Assistant);
    assert_eq!(history[1].content, "Ka lawm e.");
    assert!(history[0].timestamp <= history[1].timestamp);

    let row = store.conversation_row.lock().unwrap().clone().unwrap();
    assert_eq!(row.len(), 2);
    assert!(state.cache.get(HISTORY_KEY).is_some());
}

#[tokio::test]
async fn blank_input_is_a_no_op() {
    let llm = Arc::new(MockLlm::default());
    let state = test_state_with(Arc::new(MockStore::default()), llm.clone());

    assert!(send(&state, "   ").await.unwrap().is_none());
    assert!(llm.prompts.lock().unwrap().is_empty());
    assert!(conversation::messages(&state).await.is_empty());
    assert!(!state.busy.load(Ordering::SeqCst));
}

#[tokio::test]
async fn in_flight_guard_drops_the_send() {
    let llm = Arc::new(MockLlm::default());
    let state = test_state_with(Arc::new(MockStore::default()), llm.clone());
    state.busy.store(true, Ordering::SeqCst);

    assert!(send(&state, "Chibai!").await.unwrap().is_none());
    assert!(llm.prompts.lock().unwrap().is_empty());
    // The in-flight send owns the flag; the dropped one leaves it alone.
    assert!(state.busy.load(Ordering::SeqCst));
}

#[tokio::test]
async fn upstream_failure_appends_nothing() {
    let store = Arc::new(MockStore::default());
    let llm = Arc::new(MockLlm::default());
    llm.fail.store(true, Ordering::SeqCst);
    let state = test_state_with(store.clone(), llm.clone());
    sign_in_test_user(&state).await;

    let err = send(&state, "Chibai!").await.unwrap_err();
    assert!(matches!(err, ChatError::Upstream(_)));
    assert_eq!(err.user_message(), "Failed to send message. Please try again.");

    assert!(conversation::messages(&state).await.is_empty());
    assert!(state.cache.get(HISTORY_KEY).is_none());
    assert!(store.conversation_row.lock().unwrap().is_none());
    assert!(!state.busy.load(Ordering::SeqCst));
}

// =============================================================================
// BASE INSTRUCTION
// =============================================================================

#[test]
fn base_instruction_env_override() {
    // Touches only BUNGPUI_SYSTEM_PROMPT; suite runs with --test-threads=1.
    unsafe { std::env::set_var("BUNGPUI_SYSTEM_PROMPT", "Custom base.") };
    assert_eq!(base_instruction_from_env(), "Custom base.");

    unsafe { std::env::remove_var("BUNGPUI_SYSTEM_PROMPT") };
    assert_eq!(base_instruction_from_env(), DEFAULT_BASE_INSTRUCTION);
    assert!(DEFAULT_BASE_INSTRUCTION.starts_with("You are Bungpui"));
}
