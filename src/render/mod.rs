//! Transcript model and the view port it renders through.
//!
//! The [`Transcript`] is append-only: each rendered [`Message`] becomes an
//! [`Entry`] carrying the sender avatar and an `HH:MM` local time label.
//! The first render also removes the one-time welcome placeholder.
//!
//! A [`View`] is whatever displays the transcript. [`TerminalView`] prints
//! to stdout; tests use [`RecordingView`].

use chrono::{DateTime, Local};

use crate::chat::document::Document;

mod terminal;

pub use terminal::TerminalView;

/// Who wrote a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sender {
    User,
    Ai,
}

impl Sender {
    pub fn avatar(self) -> &'static str {
        match self {
            Self::User => "you",
            Self::Ai => "♥",
        }
    }
}

/// A chat message. Immutable once rendered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub text: String,
    pub sender: Sender,
    pub timestamp: DateTime<Local>,
}

impl Message {
    pub fn new(text: impl Into<String>, sender: Sender) -> Self {
        Self {
            text: text.into(),
            sender,
            timestamp: Local::now(),
        }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self::new(text, Sender::User)
    }

    pub fn ai(text: impl Into<String>) -> Self {
        Self::new(text, Sender::Ai)
    }
}

/// A rendered transcript entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub message: Message,
    pub avatar: &'static str,
    pub time_label: String,
}

impl Entry {
    fn from_message(message: Message) -> Self {
        Self {
            avatar: message.sender.avatar(),
            time_label: message.timestamp.format("%H:%M").to_string(),
            message,
        }
    }
}

/// Output surface for the chat controller.
pub trait View {
    /// The welcome placeholder should disappear.
    fn remove_welcome(&mut self);

    /// A new entry was appended to the transcript.
    fn append(&mut self, entry: &Entry);

    /// The typing indicator turned on or off.
    fn set_typing(&mut self, typing: bool);

    /// Theme, font size, or modal visibility changed.
    fn document_changed(&mut self, document: &Document);
}

/// Append-only list of rendered entries.
#[derive(Debug, Clone)]
pub struct Transcript {
    entries: Vec<Entry>,
    welcome_visible: bool,
}

impl Default for Transcript {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            welcome_visible: true,
        }
    }
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `message` and show it on `view`.
    pub fn render<V: View + ?Sized>(&mut self, message: Message, view: &mut V) -> &Entry {
        self.dismiss_welcome(view);
        let entry = Entry::from_message(message);
        view.append(&entry);
        self.entries.push(entry);
        &self.entries[self.entries.len() - 1]
    }

    /// Remove the welcome placeholder if it is still showing.
    pub fn dismiss_welcome<V: View + ?Sized>(&mut self, view: &mut V) {
        if self.welcome_visible {
            self.welcome_visible = false;
            view.remove_welcome();
        }
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn welcome_visible(&self) -> bool {
        self.welcome_visible
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A [`View`] that records every call, for tests and headless use.
#[derive(Debug, Clone, Default)]
pub struct RecordingView {
    pub welcome_removals: usize,
    pub appended: Vec<Entry>,
    pub typing_changes: Vec<bool>,
    pub documents: Vec<Document>,
}

impl View for RecordingView {
    fn remove_welcome(&mut self) {
        self.welcome_removals += 1;
    }

    fn append(&mut self, entry: &Entry) {
        self.appended.push(entry.clone());
    }

    fn set_typing(&mut self, typing: bool) {
        self.typing_changes.push(typing);
    }

    fn document_changed(&mut self, document: &Document) {
        self.documents.push(document.clone());
    }
}

impl<T: View + ?Sized> View for &mut T {
    fn remove_welcome(&mut self) {
        (**self).remove_welcome();
    }

    fn append(&mut self, entry: &Entry) {
        (**self).append(entry);
    }

    fn set_typing(&mut self, typing: bool) {
        (**self).set_typing(typing);
    }

    fn document_changed(&mut self, document: &Document) {
        (**self).document_changed(document);
    }
}
