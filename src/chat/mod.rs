//! The Mindful Chat conversation controller.
//!
//! [`ChatController`] owns the transcript, the send state, the presentation
//! [`Document`], and the [`Persistence`] service. A send moves through two
//! states:
//!
//! ```text
//!   Idle --submit--> Awaiting --resolve(Ok | Err)--> Idle
//! ```
//!
//! [`submit`](ChatController::submit) and [`resolve`](ChatController::resolve)
//! are the discrete transitions; [`send_message`](ChatController::send_message)
//! runs both around the backend call. A submit while awaiting does nothing,
//! so at most one request is ever in flight.

pub mod document;
pub mod schedule;

use std::time::{Duration, Instant};

use anyhow::Result;
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::client::{ChatBackend, ChatReply};
use crate::config::schema::{ChatConfig, FailurePolicy};
use crate::fallback;
use crate::logging::log_event;
use crate::persistence::{Exchange, FontSize, Persistence, SettingsUpdate, Theme};
use crate::render::{Message, Transcript, View};
use crate::safety::{self, CRISIS_RESPONSE};
use crate::storage::KeyValueStore;

use document::{ColorSchemeSource, Document, Modal};
use schedule::{Action, Scheduler};

/// Shown when the chat server cannot be reached under the `apologize` policy.
pub const APOLOGY: &str =
    "I'm sorry, I'm having trouble connecting right now. Please try again in a moment.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendState {
    Idle,
    /// A request is in flight; further sends are ignored.
    Awaiting,
}

/// What a send attempt did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    /// Empty input, or a send was already awaiting a reply.
    Ignored,
    /// The server replied.
    Replied,
    /// The server call failed and the failure policy was applied.
    Failed,
}

/// Controller tuning, usually built from `[chat]` config.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatOptions {
    pub failure_policy: FailurePolicy,
    pub local_crisis_check: bool,
    pub crisis_modal_delay: Duration,
    pub crisis_message_delay: Duration,
    pub replay_exchanges: usize,
}

impl Default for ChatOptions {
    fn default() -> Self {
        Self::from_config(&ChatConfig::default())
    }
}

impl ChatOptions {
    pub fn from_config(config: &ChatConfig) -> Self {
        Self {
            failure_policy: config.failure_policy,
            local_crisis_check: config.local_crisis_check,
            crisis_modal_delay: Duration::from_millis(config.crisis_modal_delay_ms),
            crisis_message_delay: Duration::from_millis(config.crisis_message_delay_ms),
            replay_exchanges: config.replay_exchanges,
        }
    }
}

pub struct ChatController<B, S, V> {
    backend: B,
    persistence: Persistence<S>,
    view: V,
    transcript: Transcript,
    document: Document,
    scheduler: Scheduler,
    state: SendState,
    input: String,
    options: ChatOptions,
    prefers_dark: bool,
    rng: StdRng,
}

impl<B: ChatBackend, S: KeyValueStore, V: View> ChatController<B, S, V> {
    /// Start a chat session.
    ///
    /// Applies the stored settings (persisting the defaults on first run),
    /// replays the most recent saved exchanges, and restores the draft.
    pub fn new(
        backend: B,
        store: S,
        view: V,
        options: ChatOptions,
        color_scheme: &dyn ColorSchemeSource,
    ) -> Self {
        let mut controller = Self {
            backend,
            persistence: Persistence::new(store),
            view,
            transcript: Transcript::new(),
            document: Document::default(),
            scheduler: Scheduler::new(),
            state: SendState::Idle,
            input: String::new(),
            options,
            prefers_dark: color_scheme.prefers_dark(),
            rng: StdRng::from_entropy(),
        };

        let settings = controller.persistence.load_settings();
        controller.apply_theme(settings.theme);
        controller.apply_font_size(settings.font_size);
        controller.persistence.set_save_history(settings.save_history);
        controller.document.settings.save_history = settings.save_history;

        controller.replay_history();

        if let Some(draft) = controller.persistence.load_draft() {
            controller.input = draft;
        }

        controller.view.document_changed(&controller.document);
        controller
    }

    /// Replace the random source used by the fallback responder.
    pub fn with_rng(mut self, rng: StdRng) -> Self {
        self.rng = rng;
        self
    }

    fn replay_history(&mut self) {
        let recent = self
            .persistence
            .recent_history(self.options.replay_exchanges);
        if recent.is_empty() {
            return;
        }

        self.transcript.dismiss_welcome(&mut self.view);
        for exchange in recent {
            let timestamp = exchange.timestamp.with_timezone(&chrono::Local);
            let user = Message {
                timestamp,
                ..Message::user(exchange.user_message)
            };
            let ai = Message {
                timestamp,
                ..Message::ai(exchange.ai_message)
            };
            self.transcript.render(user, &mut self.view);
            self.transcript.render(ai, &mut self.view);
        }
    }

    // -----------------------------------------------------------------------
    // Input and sending
    // -----------------------------------------------------------------------

    pub fn input(&self) -> &str {
        &self.input
    }

    /// Input changed: store it and save the draft.
    pub fn set_input(&mut self, text: &str) {
        self.input = text.to_string();
        self.persistence.save_draft(&self.input);
    }

    /// Send the current input and wait for the reply.
    pub fn send_message(&mut self) -> SendOutcome {
        let Some(text) = self.submit() else {
            return SendOutcome::Ignored;
        };
        let result = self.backend.send(&text);
        self.resolve(&text, result)
    }

    /// Send a canned starter message.
    pub fn send_quick(&mut self, text: &str) -> SendOutcome {
        self.input = text.to_string();
        self.send_message()
    }

    /// `Idle -> Awaiting`.
    ///
    /// Clears the input, renders the user message, and blocks further
    /// sends. Returns the trimmed text to send, or `None` when the input is
    /// blank or a reply is already awaited.
    pub fn submit(&mut self) -> Option<String> {
        if self.state == SendState::Awaiting {
            return None;
        }
        let text = self.input.trim().to_string();
        if text.is_empty() {
            return None;
        }

        self.input.clear();
        self.persistence.save_draft("");
        self.transcript.render(Message::user(&text), &mut self.view);
        log_event(&format!("send chars={}", text.chars().count()));

        if self.options.local_crisis_check && safety::detect_crisis(&text) {
            log_event("crisis keywords detected locally");
            let now = Instant::now();
            self.scheduler.schedule(
                now,
                self.options.crisis_modal_delay,
                Action::ShowModal(Modal::Crisis),
            );
            self.scheduler.schedule(
                now,
                self.options.crisis_message_delay,
                Action::RenderAi(CRISIS_RESPONSE.to_string()),
            );
        }

        self.state = SendState::Awaiting;
        self.document.send_enabled = false;
        self.view.set_typing(true);
        self.view.document_changed(&self.document);

        Some(text)
    }

    /// `Awaiting -> Idle` with the backend's result for `user_text`.
    pub fn resolve(&mut self, user_text: &str, result: Result<ChatReply>) -> SendOutcome {
        if self.state != SendState::Awaiting {
            return SendOutcome::Ignored;
        }

        self.state = SendState::Idle;
        self.document.send_enabled = true;
        self.view.set_typing(false);
        self.view.document_changed(&self.document);

        match result {
            Ok(reply) => {
                log_event("chat reply received");
                self.transcript
                    .render(Message::ai(&reply.message), &mut self.view);
                self.persistence
                    .append_exchange(Exchange::new(user_text, &reply.message));

                if reply.is_critical() {
                    log_event("server reported critical crisis level");
                    self.scheduler.schedule(
                        Instant::now(),
                        self.options.crisis_modal_delay,
                        Action::ShowModal(Modal::Crisis),
                    );
                }
                SendOutcome::Replied
            }
            Err(e) => {
                log_event(&format!(
                    "chat request failed policy={}: {e:#}",
                    self.options.failure_policy
                ));
                match self.options.failure_policy {
                    FailurePolicy::Apologize => {
                        self.transcript.render(Message::ai(APOLOGY), &mut self.view);
                    }
                    FailurePolicy::LocalFallback => {
                        let line = fallback::respond(user_text, &mut self.rng);
                        self.transcript.render(Message::ai(line), &mut self.view);
                        self.persistence
                            .append_exchange(Exchange::new(user_text, line));
                    }
                }
                SendOutcome::Failed
            }
        }
    }

    // -----------------------------------------------------------------------
    // Scheduled actions
    // -----------------------------------------------------------------------

    /// Run every scheduled action due at `now`. Returns how many ran.
    pub fn fire_due(&mut self, now: Instant) -> usize {
        let due = self.scheduler.take_due(now);
        let count = due.len();
        for action in due {
            match action {
                Action::ShowModal(modal) => self.show_modal(modal),
                Action::RenderAi(text) => {
                    self.transcript.render(Message::ai(text), &mut self.view);
                }
            }
        }
        count
    }

    /// When the next scheduled action is due, if any.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.scheduler.next_deadline()
    }

    // -----------------------------------------------------------------------
    // Modals and settings
    // -----------------------------------------------------------------------

    pub fn show_modal(&mut self, modal: Modal) {
        self.document.show(modal);
        self.view.document_changed(&self.document);
    }

    pub fn hide_modal(&mut self, modal: Modal) {
        self.document.hide(modal);
        self.view.document_changed(&self.document);
    }

    pub fn set_theme(&mut self, theme: Theme) {
        self.apply_theme(theme);
        log_event(&format!("theme set to {theme}"));
        self.view.document_changed(&self.document);
    }

    pub fn set_font_size(&mut self, size: FontSize) {
        self.apply_font_size(size);
        log_event(&format!("font size set to {size}"));
        self.view.document_changed(&self.document);
    }

    /// Turning history off erases saved history and draft immediately.
    pub fn set_save_history(&mut self, save: bool) {
        self.persistence.set_save_history(save);
        self.document.settings.save_history = save;
        if !save {
            log_event("history disabled; saved history and draft cleared");
        }
        self.view.document_changed(&self.document);
    }

    /// The system colour scheme changed. Only matters while the theme is
    /// `auto`.
    pub fn system_scheme_changed(&mut self, prefers_dark: bool) {
        self.prefers_dark = prefers_dark;
        if self.persistence.load_settings().theme == Theme::Auto {
            self.set_theme(Theme::Auto);
        }
    }

    fn apply_theme(&mut self, theme: Theme) {
        self.document.apply_theme(theme, self.prefers_dark);
        self.persistence
            .update_settings(SettingsUpdate::theme(theme));
    }

    fn apply_font_size(&mut self, size: FontSize) {
        self.document.apply_font_size(size);
        self.persistence
            .update_settings(SettingsUpdate::font_size(size));
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    pub fn state(&self) -> SendState {
        self.state
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn persistence(&self) -> &Persistence<S> {
        &self.persistence
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut V {
        &mut self.view
    }
}
