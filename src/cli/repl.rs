//! Interactive `mindful chat` session.
//!
//! Each input line is one submit. Lines starting with `/` are commands that
//! stand in for the settings panel, the crisis button, and the quick-starter
//! buttons. Scheduled actions (the crisis panel, the local crisis message)
//! are drained after each send by sleeping until their deadlines.

use std::io::{BufRead, Write};
use std::time::Instant;

use anyhow::{Context, Result};
use colored::Colorize;

use super::open_store;
use crate::chat::document::{EnvColorScheme, Modal};
use crate::chat::{ChatController, ChatOptions, SendOutcome};
use crate::client::{ChatBackend, HttpClient};
use crate::config::{self, MindfulConfig};
use crate::persistence::{FontSize, Theme};
use crate::render::{TerminalView, View};
use crate::storage::{KeyValueStore, MemoryStore};

/// Canned openers, sent with `/starter N`.
const STARTERS: &[&str] = &[
    "I'm feeling down today",
    "I've been dealing with a lot of anxiety",
    "I want to talk about my feelings",
    "I just need someone to listen",
];

/// Run the interactive chat session.
pub fn run_chat(cfg: &MindfulConfig, ephemeral: bool) -> Result<()> {
    let backend = HttpClient::from_config(&cfg.server);
    let options = ChatOptions::from_config(&cfg.chat);

    let view = TerminalView::new();
    view.welcome();

    if ephemeral {
        run_session(backend, MemoryStore::new(), view, options)
    } else {
        run_session(backend, open_store(cfg)?, view, options)
    }
}

fn run_session<B, S>(backend: B, store: S, view: TerminalView, options: ChatOptions) -> Result<()>
where
    B: ChatBackend,
    S: KeyValueStore,
{
    let mut chat = ChatController::new(backend, store, view, options, &EnvColorScheme);

    if !chat.input().is_empty() {
        println!(
            "  {} {}",
            "Draft restored:".dimmed(),
            chat.input().italic()
        );
        println!("  {}", "Press Enter to send it, or type something new.".dimmed());
    }

    let stdin = std::io::stdin();
    let mut lines = stdin.lock().lines();

    loop {
        print!("{} ", ">".bold().cyan());
        std::io::stdout().flush().context("failed to flush stdout")?;

        let Some(line) = lines.next() else {
            break;
        };
        let line = line.context("failed to read from stdin")?;

        if let Some(command) = line.trim().strip_prefix('/') {
            if !handle_command(&mut chat, command) {
                break;
            }
            continue;
        }

        if !line.trim().is_empty() {
            chat.set_input(&line);
        }
        if chat.send_message() == SendOutcome::Ignored {
            continue;
        }
        drain_scheduled(&mut chat);
    }

    Ok(())
}

/// Sleep until each pending action is due and run it.
fn drain_scheduled<B: ChatBackend, S: KeyValueStore, V: View>(
    chat: &mut ChatController<B, S, V>,
) {
    while let Some(deadline) = chat.next_deadline() {
        let now = Instant::now();
        if deadline > now {
            std::thread::sleep(deadline - now);
        }
        chat.fire_due(Instant::now());
    }
}

/// Handle a `/command`. Returns `false` to end the session.
fn handle_command<B: ChatBackend, S: KeyValueStore>(
    chat: &mut ChatController<B, S, TerminalView>,
    command: &str,
) -> bool {
    let mut parts = command.split_whitespace();
    let name = parts.next().unwrap_or("");
    let arg = parts.next().unwrap_or("");

    match name {
        "quit" | "exit" | "q" => return false,
        "help" => print_help(),
        "settings" => chat.show_modal(Modal::Settings),
        "crisis" => chat.show_modal(Modal::Crisis),
        "close" => {
            chat.hide_modal(Modal::Settings);
            chat.hide_modal(Modal::Crisis);
        }
        "theme" => match Theme::parse(arg) {
            Some(theme) => chat.set_theme(theme),
            None => usage("/theme auto|dark|light"),
        },
        "font" => match FontSize::parse(arg) {
            Some(size) => chat.set_font_size(size),
            None => usage("/font small|medium|large"),
        },
        "history" => match config::parse_bool(arg) {
            Some(save) => chat.set_save_history(save),
            None => usage("/history on|off"),
        },
        "scheme" => match arg {
            "dark" => chat.system_scheme_changed(true),
            "light" => chat.system_scheme_changed(false),
            _ => usage("/scheme dark|light"),
        },
        "draft" => {
            let rest = command.trim_start_matches("draft").trim();
            chat.set_input(rest);
            println!("  {}", "Draft saved.".dimmed());
        }
        "starters" => {
            for (i, starter) in STARTERS.iter().enumerate() {
                println!("  {} {}", format!("{}.", i + 1).dimmed(), starter);
            }
        }
        "starter" => match arg
            .parse::<usize>()
            .ok()
            .and_then(|n| n.checked_sub(1))
            .and_then(|i| STARTERS.get(i))
        {
            Some(text) => {
                if chat.send_quick(text) != SendOutcome::Ignored {
                    drain_scheduled(chat);
                }
            }
            None => usage(&format!("/starter 1-{}", STARTERS.len())),
        },
        _ => usage("/help"),
    }
    true
}

fn usage(text: &str) {
    println!("  {} {}", "usage:".yellow(), text);
}

fn print_help() {
    println!("{}", "Commands".bold().cyan());
    for (cmd, desc) in [
        ("/settings", "show the settings panel"),
        ("/crisis", "show crisis support resources"),
        ("/close", "close open panels"),
        ("/theme auto|dark|light", "change the theme"),
        ("/font small|medium|large", "change the font size"),
        ("/history on|off", "save conversations (off deletes saved data)"),
        ("/scheme dark|light", "tell the client the system colour scheme changed"),
        ("/draft TEXT", "save text as a draft without sending"),
        ("/starters, /starter N", "list or send a conversation starter"),
        ("/quit", "leave"),
    ] {
        println!("  {:<26} {}", cmd, desc.dimmed());
    }
}
