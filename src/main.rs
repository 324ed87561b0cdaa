//! Interactive terminal front end for the Bungpui client core.
//!
//! A line-oriented stand-in for the app UI: `/commands` drive auth and
//! settings, any other non-empty line is sent as a chat message. Absorbed
//! degradations (remote store down, malformed cache) surface only in logs,
//! exactly as they would behind the real UI.

use std::io::{self, Write};

use bungpui::types::{MAX_CONTEXT_WINDOW, MIN_CONTEXT_WINDOW};
use bungpui::{ChatClient, Role, Settings, SettingsPatch, SignUpOutcome};
use tokio::io::{AsyncBufReadExt, BufReader};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let client = ChatClient::from_env().expect("client configuration failed");

    println!("Bungpui (type /help for commands, /quit to exit)");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("> ");
        let _ = io::stdout().flush();
        let Ok(Some(line)) = lines.next_line().await else {
            break;
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line == "/quit" || line == "/exit" {
            break;
        }
        if let Some(command) = line.strip_prefix('/') {
            run_command(&client, command).await;
        } else {
            send(&client, line).await;
        }
    }
}

async fn send(client: &ChatClient, text: &str) {
    match client.send_message(text).await {
        Ok(Some(reply)) => println!("Bungpui: {}", reply.content),
        Ok(None) => {}
        Err(e) => println!("{}", e.user_message()),
    }
}

async fn run_command(client: &ChatClient, command: &str) {
    let (name, rest) = match command.split_once(' ') {
        Some((name, rest)) => (name, rest.trim()),
        None => (command, ""),
    };

    match name {
        "help" => print_help(),
        "signup" => sign_up(client, rest).await,
        "login" => sign_in(client, rest).await,
        "logout" => {
            client.sign_out().await;
            println!("signed out");
        }
        "settings" => print_settings(&client.settings().await),
        "lang" if !rest.is_empty() => {
            let patch = SettingsPatch {
                preferred_language: Some(rest.to_string()),
                ..SettingsPatch::default()
            };
            client.update_settings(&patch).await;
            println!("preferred language: {rest}");
        }
        "instruction" => {
            let patch = SettingsPatch {
                user_instruction: Some(rest.to_string()),
                ..SettingsPatch::default()
            };
            client.update_settings(&patch).await;
            if rest.is_empty() {
                println!("custom instructions cleared");
            } else {
                println!("custom instructions set");
            }
        }
        "window" => set_window(client, rest).await,
        "codeblocks" => set_codeblocks(client, rest).await,
        "reset" => {
            client.reset_settings().await;
            println!("settings reset to defaults");
        }
        "history" => print_history(client).await,
        "clear" => {
            client.clear_conversation().await;
            println!("conversation cleared");
        }
        _ => println!("unknown command: /{name} (try /help)"),
    }
}

fn print_help() {
    println!("Commands:");
    println!("  /signup <email> <password>   create an account");
    println!("  /login <email> <password>    sign in");
    println!("  /logout                      sign out and discard local data");
    println!("  /settings                    show current settings");
    println!("  /lang <language>             set preferred language");
    println!("  /instruction [text]          set (or clear) custom instructions");
    println!("  /window <1-10>               set how many exchanges are shown");
    println!("  /codeblocks on|off           toggle code block display");
    println!("  /reset                       restore default settings");
    println!("  /history                     show the visible conversation");
    println!("  /clear                       clear the conversation");
    println!("  /quit                        exit");
    println!("Anything else is sent to Bungpui.");
}

async fn sign_up(client: &ChatClient, rest: &str) {
    let Some((email, password)) = rest.split_once(' ') else {
        println!("usage: /signup <email> <password>");
        return;
    };
    match client.sign_up(email.trim(), password.trim()).await {
        Ok(SignUpOutcome::SignedIn(session)) => {
            println!("account created, signed in as {}", session.user_id);
        }
        Ok(SignUpOutcome::ConfirmationPending) => {
            println!("account created, check your email to confirm");
        }
        Err(e) => println!("sign-up failed: {e}"),
    }
}

async fn sign_in(client: &ChatClient, rest: &str) {
    let Some((email, password)) = rest.split_once(' ') else {
        println!("usage: /login <email> <password>");
        return;
    };
    match client.sign_in(email.trim(), password.trim()).await {
        Ok(()) => match client.user_id().await {
            Some(user_id) => println!("signed in as {user_id}"),
            None => println!("signed in"),
        },
        Err(e) => println!("sign-in failed: {e}"),
    }
}

async fn set_window(client: &ChatClient, rest: &str) {
    let window = rest
        .parse::<u8>()
        .ok()
        .filter(|n| (MIN_CONTEXT_WINDOW..=MAX_CONTEXT_WINDOW).contains(n));
    match window {
        Some(n) => {
            let patch = SettingsPatch {
                context_window: Some(n),
                ..SettingsPatch::default()
            };
            client.update_settings(&patch).await;
            println!("context window: {n}");
        }
        None => println!("usage: /window <{MIN_CONTEXT_WINDOW}-{MAX_CONTEXT_WINDOW}>"),
    }
}

async fn set_codeblocks(client: &ChatClient, rest: &str) {
    let show = match rest {
        "on" => true,
        "off" => false,
        _ => {
            println!("usage: /codeblocks on|off");
            return;
        }
    };
    let patch = SettingsPatch {
        show_codeblocks: Some(show),
        ..SettingsPatch::default()
    };
    client.update_settings(&patch).await;
    println!("code blocks: {rest}");
}

fn print_settings(settings: &Settings) {
    println!("preferred language: {}", settings.preferred_language);
    println!("show code blocks:   {}", settings.show_codeblocks);
    println!("context window:     {}", settings.context_window);
    if settings.user_instruction.is_empty() {
        println!("custom instructions: (none)");
    } else {
        println!("custom instructions: {}", settings.user_instruction);
    }
}

async fn print_history(client: &ChatClient) {
    let messages = client.visible_messages().await;
    if messages.is_empty() {
        println!("(no messages)");
        return;
    }
    for message in messages {
        let label = match message.role {
            Role::User => "You",
            Role::Assistant => "Bungpui",
        };
        println!("{label}: {}", message.content);
    }
}
