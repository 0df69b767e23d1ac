//! Deferred controller actions.
//!
//! The crisis panel and the local crisis message appear a moment after the
//! triggering message. They are queued here with a deadline and run by
//! [`ChatController::fire_due`](super::ChatController::fire_due).

use std::time::{Duration, Instant};

use super::document::Modal;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    ShowModal(Modal),
    /// Render an ai message (not saved to history).
    RenderAi(String),
}

#[derive(Debug, Clone)]
struct Scheduled {
    due: Instant,
    seq: u64,
    action: Action,
}

#[derive(Debug, Clone, Default)]
pub struct Scheduler {
    pending: Vec<Scheduled>,
    next_seq: u64,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue `action` to run `delay` after `now`.
    pub fn schedule(&mut self, now: Instant, delay: Duration, action: Action) {
        self.pending.push(Scheduled {
            due: now + delay,
            seq: self.next_seq,
            action,
        });
        self.next_seq += 1;
    }

    /// Remove and return every action due at `now`, earliest first. Actions
    /// with the same deadline keep scheduling order.
    pub fn take_due(&mut self, now: Instant) -> Vec<Action> {
        let (mut due, later): (Vec<_>, Vec<_>) =
            self.pending.drain(..).partition(|s| s.due <= now);
        self.pending = later;
        due.sort_by_key(|s| (s.due, s.seq));
        due.into_iter().map(|s| s.action).collect()
    }

    /// Deadline of the earliest pending action.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.pending.iter().map(|s| s.due).min()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
