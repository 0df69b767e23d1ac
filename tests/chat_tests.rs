/// Conversation controller tests.
///
/// Drives `ChatController` end to end with an in-memory store, a scripted
/// backend, and a recording view. Scheduled actions are fired by passing
/// explicit instants to `fire_due`, so nothing here sleeps.
use std::collections::VecDeque;
use std::time::{Duration, Instant};

use anyhow::{Result, anyhow};
use rand::SeedableRng;
use rand::rngs::StdRng;

use mindful::chat::document::{FixedColorScheme, Modal};
use mindful::chat::{APOLOGY, ChatController, ChatOptions, SendOutcome, SendState};
use mindful::client::{ChatBackend, ChatReply};
use mindful::config::FailurePolicy;
use mindful::fallback::Category;
use mindful::persistence::{Exchange, FontSize, MAX_HISTORY, Persistence, Theme};
use mindful::render::{RecordingView, Sender};
use mindful::safety::{CRISIS_RESPONSE, CrisisLevel};
use mindful::storage::{DRAFT_KEY, HISTORY_KEY, KeyValueStore, MemoryStore, SETTINGS_KEY};

// ---------------------------------------------------------------------------
// Fakes
// ---------------------------------------------------------------------------

/// Backend that returns queued results and records what was sent.
#[derive(Default)]
struct ScriptedBackend {
    replies: VecDeque<Result<ChatReply>>,
    sent: Vec<String>,
}

impl ScriptedBackend {
    fn replying(replies: Vec<Result<ChatReply>>) -> Self {
        Self {
            replies: replies.into(),
            sent: Vec::new(),
        }
    }

    /// Echo-style backend for bulk sends.
    fn always_ok() -> Self {
        Self::default()
    }
}

impl ChatBackend for ScriptedBackend {
    fn send(&mut self, message: &str) -> Result<ChatReply> {
        self.sent.push(message.to_string());
        self.replies
            .pop_front()
            .unwrap_or_else(|| Ok(ChatReply::new(format!("re: {message}"))))
    }
}

type Controller = ChatController<ScriptedBackend, MemoryStore, RecordingView>;

fn controller_with(backend: ScriptedBackend, store: MemoryStore, options: ChatOptions) -> Controller {
    ChatController::new(
        backend,
        store,
        RecordingView::default(),
        options,
        &FixedColorScheme(false),
    )
    .with_rng(StdRng::seed_from_u64(1))
}

fn controller(backend: ScriptedBackend) -> Controller {
    controller_with(backend, MemoryStore::new(), ChatOptions::default())
}

fn texts(chat: &Controller) -> Vec<(Sender, String)> {
    chat.transcript()
        .entries()
        .iter()
        .map(|e| (e.message.sender, e.message.text.clone()))
        .collect()
}

fn later(delay_ms: u64) -> Instant {
    Instant::now() + Duration::from_millis(delay_ms)
}

// ---------------------------------------------------------------------------
// Startup and settings
// ---------------------------------------------------------------------------

#[test]
fn first_load_applies_and_persists_defaults() {
    let chat = controller(ScriptedBackend::always_ok());

    let doc = chat.document();
    assert_eq!(doc.settings.theme, Theme::Auto);
    assert_eq!(doc.settings.font_size, FontSize::Medium);
    assert!(doc.settings.save_history);
    assert_eq!(doc.data_theme, None);
    assert_eq!(doc.data_font_size, None);
    assert!(chat.transcript().welcome_visible());

    let raw: serde_json::Value =
        serde_json::from_str(&chat.persistence().store().get(SETTINGS_KEY).unwrap()).unwrap();
    assert_eq!(raw["theme"], "auto");
    assert_eq!(raw["fontSize"], "medium");
    assert_eq!(raw["saveHistory"], true);
}

#[test]
fn auto_theme_resolves_dark_from_system_preference() {
    let chat = ChatController::new(
        ScriptedBackend::always_ok(),
        MemoryStore::new(),
        RecordingView::default(),
        ChatOptions::default(),
        &FixedColorScheme(true),
    );
    assert_eq!(chat.document().data_theme, Some("dark"));
}

#[test]
fn system_scheme_change_only_affects_auto() {
    let mut chat = controller(ScriptedBackend::always_ok());
    chat.system_scheme_changed(true);
    assert!(chat.document().is_dark());
    chat.system_scheme_changed(false);
    assert!(!chat.document().is_dark());

    chat.set_theme(Theme::LightDefault);
    chat.system_scheme_changed(true);
    assert!(!chat.document().is_dark());
    assert_eq!(chat.persistence().load_settings().theme, Theme::LightDefault);
}

#[test]
fn font_size_sets_attribute_and_persists() {
    let mut chat = controller(ScriptedBackend::always_ok());
    chat.set_font_size(FontSize::Large);
    assert_eq!(chat.document().data_font_size, Some(FontSize::Large));
    assert_eq!(chat.persistence().load_settings().font_size, FontSize::Large);
    assert!(chat.view().documents.len() >= 2);
}

#[test]
fn stored_settings_are_restored() {
    let mut store = MemoryStore::new();
    store
        .set(
            SETTINGS_KEY,
            r#"{"theme":"dark","fontSize":"small","saveHistory":true}"#,
        )
        .unwrap();
    let chat = controller_with(ScriptedBackend::always_ok(), store, ChatOptions::default());
    assert_eq!(chat.document().data_theme, Some("dark"));
    assert_eq!(chat.document().data_font_size, Some(FontSize::Small));
}

#[test]
fn startup_replays_last_ten_exchanges() {
    let mut persistence = Persistence::new(MemoryStore::new());
    for i in 0..12 {
        persistence.append_exchange(Exchange::new(format!("u{i}"), format!("a{i}")));
    }
    let chat = controller_with(
        ScriptedBackend::always_ok(),
        persistence.into_inner(),
        ChatOptions::default(),
    );

    let entries = texts(&chat);
    assert_eq!(entries.len(), 20);
    assert_eq!(entries[0], (Sender::User, "u2".to_string()));
    assert_eq!(entries[1], (Sender::Ai, "a2".to_string()));
    assert_eq!(entries[19], (Sender::Ai, "a11".to_string()));
    assert!(!chat.transcript().welcome_visible());
    assert_eq!(chat.view().welcome_removals, 1);
}

#[test]
fn draft_is_restored_and_cleared_on_send() {
    let mut store = MemoryStore::new();
    store.set(DRAFT_KEY, "\"I keep thinking\"").unwrap();
    let mut chat = controller_with(ScriptedBackend::always_ok(), store, ChatOptions::default());
    assert_eq!(chat.input(), "I keep thinking");

    assert_eq!(chat.send_message(), SendOutcome::Replied);
    assert_eq!(chat.input(), "");
    assert_eq!(chat.persistence().store().get(DRAFT_KEY), None);
    assert_eq!(chat.backend().sent, vec!["I keep thinking".to_string()]);
}

#[test]
fn typing_saves_draft() {
    let mut chat = controller(ScriptedBackend::always_ok());
    chat.set_input("half a sentence");
    assert_eq!(
        chat.persistence().load_draft().as_deref(),
        Some("half a sentence")
    );
    chat.set_input("  ");
    assert_eq!(chat.persistence().load_draft(), None);
}

// ---------------------------------------------------------------------------
// Sending
// ---------------------------------------------------------------------------

#[test]
fn successful_send_renders_reply_and_saves_exchange() {
    let mut chat = controller(ScriptedBackend::replying(vec![Ok(ChatReply::new(
        "Thanks for telling me.",
    ))]));

    chat.set_input("  rough week  ");
    assert_eq!(chat.send_message(), SendOutcome::Replied);

    assert_eq!(
        texts(&chat),
        vec![
            (Sender::User, "rough week".to_string()),
            (Sender::Ai, "Thanks for telling me.".to_string()),
        ]
    );
    assert_eq!(chat.state(), SendState::Idle);
    assert!(chat.document().send_enabled);
    assert_eq!(chat.view().typing_changes, vec![true, false]);

    let history = chat.persistence().load_history();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].user_message, "rough week");
    assert_eq!(history[0].ai_message, "Thanks for telling me.");
}

#[test]
fn blank_input_is_ignored() {
    let mut chat = controller(ScriptedBackend::always_ok());
    chat.set_input("   ");
    assert_eq!(chat.send_message(), SendOutcome::Ignored);
    assert!(chat.backend().sent.is_empty());
    assert!(chat.transcript().is_empty());
}

#[test]
fn send_while_awaiting_is_a_noop() {
    let mut chat = controller(ScriptedBackend::always_ok());

    chat.set_input("first");
    let pending = chat.submit().expect("first submit goes through");
    assert_eq!(chat.state(), SendState::Awaiting);
    assert!(!chat.document().send_enabled);

    chat.set_input("second");
    assert_eq!(chat.send_message(), SendOutcome::Ignored);
    assert!(chat.submit().is_none());
    assert!(chat.backend().sent.is_empty());
    assert_eq!(chat.transcript().len(), 1);

    let outcome = chat.resolve(&pending, Ok(ChatReply::new("ok")));
    assert_eq!(outcome, SendOutcome::Replied);
    assert_eq!(chat.state(), SendState::Idle);

    // A stale resolve after the state machine is idle is dropped.
    assert_eq!(
        chat.resolve(&pending, Ok(ChatReply::new("late"))),
        SendOutcome::Ignored
    );
    assert_eq!(chat.transcript().len(), 2);
}

#[test]
fn failed_send_shows_apology_and_saves_nothing() {
    let mut chat = controller(ScriptedBackend::replying(vec![Err(anyhow!(
        "connection refused"
    ))]));

    chat.set_input("I feel down");
    assert_eq!(chat.send_message(), SendOutcome::Failed);

    assert_eq!(
        texts(&chat),
        vec![
            (Sender::User, "I feel down".to_string()),
            (Sender::Ai, APOLOGY.to_string()),
        ]
    );
    assert!(chat.persistence().load_history().is_empty());
    assert_eq!(chat.persistence().store().get(HISTORY_KEY), None);
    assert_eq!(chat.state(), SendState::Idle);
}

#[test]
fn local_fallback_policy_replies_from_category_and_saves() {
    let options = ChatOptions {
        failure_policy: FailurePolicy::LocalFallback,
        ..ChatOptions::default()
    };
    let mut chat = controller_with(
        ScriptedBackend::replying(vec![Err(anyhow!("HTTP 502"))]),
        MemoryStore::new(),
        options,
    );

    chat.set_input("I feel so anxious today");
    assert_eq!(chat.send_message(), SendOutcome::Failed);

    let reply = chat.transcript().entries()[1].message.text.clone();
    assert!(Category::Anxiety.pool().contains(&reply.as_str()));

    let history = chat.persistence().load_history();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].ai_message, reply);
}

#[test]
fn critical_reply_opens_crisis_modal_after_delay() {
    let reply = ChatReply::new("I'm here for you").with_crisis(CrisisLevel::Critical);
    let mut chat = controller(ScriptedBackend::replying(vec![Ok(reply)]));

    chat.set_input("it's been a hard night");
    assert_eq!(chat.send_message(), SendOutcome::Replied);
    assert_eq!(
        chat.transcript().entries()[1].message.text,
        "I'm here for you"
    );

    chat.fire_due(Instant::now());
    assert!(!chat.document().is_visible(Modal::Crisis));

    assert_eq!(chat.fire_due(later(1_100)), 1);
    assert!(chat.document().is_visible(Modal::Crisis));
    assert!(chat.document().scroll_locked);
}

#[test]
fn non_critical_crisis_level_does_not_open_modal() {
    let reply = ChatReply::new("I hear you").with_crisis(CrisisLevel::High);
    let mut chat = controller(ScriptedBackend::replying(vec![Ok(reply)]));

    chat.set_input("everything is heavy");
    chat.send_message();
    assert_eq!(chat.fire_due(later(10_000)), 0);
    assert!(!chat.document().is_visible(Modal::Crisis));
}

#[test]
fn local_crisis_keywords_schedule_modal_and_message() {
    let mut chat = controller(ScriptedBackend::replying(vec![Ok(ChatReply::new(
        "Please stay with me.",
    ))]));

    chat.set_input("Sometimes I WANT TO DIE");
    chat.send_message();
    assert_eq!(chat.transcript().len(), 2);

    assert_eq!(chat.fire_due(later(1_500)), 1);
    assert!(chat.document().is_visible(Modal::Crisis));
    assert_eq!(chat.transcript().len(), 2);

    assert_eq!(chat.fire_due(later(2_500)), 1);
    let last = chat.transcript().entries().last().unwrap();
    assert_eq!(last.message.sender, Sender::Ai);
    assert_eq!(last.message.text, CRISIS_RESPONSE);

    // The scheduled message is not part of the saved exchange.
    let history = chat.persistence().load_history();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].ai_message, "Please stay with me.");
}

#[test]
fn local_crisis_check_can_be_disabled() {
    let options = ChatOptions {
        local_crisis_check: false,
        ..ChatOptions::default()
    };
    let mut chat = controller_with(ScriptedBackend::always_ok(), MemoryStore::new(), options);

    chat.set_input("self harm");
    chat.send_message();
    assert!(chat.next_deadline().is_none());
}

#[test]
fn modals_open_and_close() {
    let mut chat = controller(ScriptedBackend::always_ok());
    chat.show_modal(Modal::Settings);
    assert!(chat.document().is_visible(Modal::Settings));
    assert!(chat.document().scroll_locked);

    chat.hide_modal(Modal::Settings);
    assert!(!chat.document().is_visible(Modal::Settings));
    assert!(!chat.document().scroll_locked);
}

#[test]
fn send_quick_sends_starter_text() {
    let mut chat = controller(ScriptedBackend::always_ok());
    assert_eq!(chat.send_quick("I need to talk"), SendOutcome::Replied);
    assert_eq!(chat.backend().sent, vec!["I need to talk".to_string()]);
}

// ---------------------------------------------------------------------------
// History gating
// ---------------------------------------------------------------------------

#[test]
fn history_never_exceeds_limit_through_controller() {
    let mut chat = controller(ScriptedBackend::always_ok());
    for i in 0..(MAX_HISTORY + 10) {
        chat.set_input(&format!("message {i}"));
        chat.send_message();
    }

    let history = chat.persistence().load_history();
    assert_eq!(history.len(), MAX_HISTORY);
    assert_eq!(history[0].user_message, "message 10");
    assert_eq!(
        history.last().unwrap().user_message,
        format!("message {}", MAX_HISTORY + 9)
    );
}

#[test]
fn disabling_history_erases_and_reenabling_starts_empty() {
    let mut chat = controller(ScriptedBackend::always_ok());
    chat.set_input("remember this");
    chat.send_message();
    chat.set_input("unsent draft");
    assert_eq!(chat.persistence().load_history().len(), 1);

    chat.set_save_history(false);
    assert_eq!(chat.persistence().store().get(HISTORY_KEY), None);
    assert_eq!(chat.persistence().store().get(DRAFT_KEY), None);
    assert!(!chat.document().settings.save_history);

    chat.set_input("not saved");
    chat.send_message();
    assert!(chat.persistence().load_history().is_empty());
    assert_eq!(chat.persistence().store().get(HISTORY_KEY), None);

    chat.set_save_history(true);
    assert!(chat.persistence().load_history().is_empty());

    chat.set_input("fresh start");
    chat.send_message();
    let history = chat.persistence().load_history();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].user_message, "fresh start");
}

#[test]
fn disabled_history_skips_replay_and_draft() {
    let mut store = MemoryStore::new();
    store.set(SETTINGS_KEY, r#"{"saveHistory":false}"#).unwrap();
    store
        .set(
            HISTORY_KEY,
            r#"[{"user":"old","ai":"reply","timestamp":"2024-01-01T00:00:00Z"}]"#,
        )
        .unwrap();
    store.set(DRAFT_KEY, "\"stale\"").unwrap();

    let chat = controller_with(ScriptedBackend::always_ok(), store, ChatOptions::default());
    assert!(chat.transcript().is_empty());
    assert_eq!(chat.input(), "");
    // Startup re-applies the stored flag, which clears leftovers.
    assert_eq!(chat.persistence().store().get(HISTORY_KEY), None);
}
