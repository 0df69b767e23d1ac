//! Terminal rendering of the chat transcript.

use std::io::Write;

use colored::Colorize;

use super::{Entry, Sender, View};
use crate::chat::document::{Document, Modal};
use crate::persistence::FontSize;

/// Prints transcript entries and panel changes to stdout.
#[derive(Debug, Default)]
pub struct TerminalView {
    dark: bool,
    wide: bool,
    shown: Option<(bool, bool)>,
}

impl TerminalView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Print the welcome placeholder shown before the first message.
    pub fn welcome(&self) {
        println!("{}", "Welcome to Mindful Chat".bold().cyan());
        println!(
            "  {}",
            "A safe space to talk. Type a message, or /help for commands.".dimmed()
        );
        println!();
    }

    fn accent(&self, text: &str) -> colored::ColoredString {
        if self.dark {
            text.bright_magenta()
        } else {
            text.magenta()
        }
    }
}

impl View for TerminalView {
    fn remove_welcome(&mut self) {}

    fn append(&mut self, entry: &Entry) {
        let avatar = match entry.message.sender {
            Sender::User => entry.avatar.bold().blue(),
            Sender::Ai => self.accent(entry.avatar).bold(),
        };
        let spacer = if self.wide { "\n" } else { "" };
        println!(
            "{spacer}[{}] {} {}",
            avatar,
            entry.message.text,
            entry.time_label.dimmed()
        );
        let _ = std::io::stdout().flush();
    }

    fn set_typing(&mut self, typing: bool) {
        if typing {
            print!("{}", "  ♥ is typing...\r".dimmed());
        } else {
            print!("{}\r", " ".repeat(24));
        }
        let _ = std::io::stdout().flush();
    }

    fn document_changed(&mut self, document: &Document) {
        self.dark = document.is_dark();
        self.wide = document.data_font_size == Some(FontSize::Large);

        let visible = (
            document.is_visible(Modal::Settings),
            document.is_visible(Modal::Crisis),
        );
        let previous = self.shown.replace(visible).unwrap_or((false, false));

        if visible.0 && !previous.0 {
            print_settings_panel(document);
        }
        if visible.1 && !previous.1 {
            print_crisis_panel();
        }
    }
}

fn print_settings_panel(document: &Document) {
    let s = &document.settings;
    println!();
    println!("{}", "Settings".bold().cyan());
    println!("  theme         {}  (/theme auto|dark|light)", s.theme);
    println!("  font size     {}  (/font small|medium|large)", s.font_size);
    println!(
        "  save history  {}  (/history on|off)",
        if s.save_history { "on" } else { "off" }
    );
    println!("  {}", "/close to dismiss".dimmed());
    println!();
}

fn print_crisis_panel() {
    println!();
    println!("{}", "Crisis Support Resources".bold().red());
    println!("  If you are in immediate danger, call your local emergency number.");
    println!("  US: call or text 988 (Suicide & Crisis Lifeline)");
    println!("  Text HOME to 741741 (Crisis Text Line)");
    println!("  International: https://findahelpline.com");
    println!("  {}", "/close to dismiss".dimmed());
    println!();
}
