//! Safety checks applied to chat traffic.

pub mod crisis;

pub use crisis::{CRISIS_RESPONSE, CrisisLevel, detect_crisis};
