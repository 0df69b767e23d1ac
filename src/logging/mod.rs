//! Best-effort event log.
//!
//! Appends `<rfc3339> <message>` lines to `~/.mindful/mindful.log` (or the
//! path from `[logging] path`). Logging must never affect the chat flow, so
//! every I/O error is swallowed. Until [`init`] is called the log is
//! disabled, which keeps library users and tests from writing into the
//! home directory.

use std::fs::{OpenOptions, create_dir_all};
use std::io::Write;
use std::path::PathBuf;
use std::sync::OnceLock;

use chrono::Utc;

use crate::config::schema::LoggingConfig;

static LOG_PATH: OnceLock<Option<PathBuf>> = OnceLock::new();

/// Configure the event log. Only the first call has any effect.
pub fn init(config: &LoggingConfig) {
    let path = if config.enabled {
        config
            .path
            .as_deref()
            .map(expand_home)
            .or_else(default_log_path)
    } else {
        None
    };
    let _ = LOG_PATH.set(path);
}

/// Append a single event line.
pub fn log_event(message: &str) {
    let Some(Some(path)) = LOG_PATH.get() else {
        return;
    };

    if let Some(parent) = path.parent()
        && create_dir_all(parent).is_err()
    {
        return;
    }

    let Ok(mut file) = OpenOptions::new().create(true).append(true).open(path) else {
        return;
    };

    let line = message.replace(['\r', '\n'], " ");
    let _ = writeln!(file, "{} {}", Utc::now().to_rfc3339(), line);
}

/// Default location: `~/.mindful/mindful.log`.
pub fn default_log_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".mindful").join("mindful.log"))
}

/// Expand a leading `~/` to the home directory.
pub(crate) fn expand_home(path: &str) -> PathBuf {
    match (path.strip_prefix("~/"), dirs::home_dir()) {
        (Some(rest), Some(home)) => home.join(rest),
        _ => PathBuf::from(path),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expand_home_leaves_absolute_paths() {
        assert_eq!(expand_home("/tmp/x.log"), PathBuf::from("/tmp/x.log"));
    }

    #[test]
    fn log_event_without_init_is_noop() {
        log_event("nothing should happen");
    }
}
