//! Debug hook event logging.
//!
//! When debug logging is enabled (`AUTONOMY_DEBUG` or `debug_logging` in the
//! project config), hooks append JSONL lines to `<home>/.tmp/hook-debug.jsonl`:
//! one `event` line with the raw input of every invocation, and one line per
//! decision the hook takes. This makes it possible to reconstruct why a
//! session was or was not continued.

use crate::config::Settings;
use crate::paths;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;

/// Session id used for lines not tied to a session.
pub const SYSTEM_SESSION: &str = "SYSTEM";

/// Append-only diagnostic sink.
///
/// Errors are silently ignored: logging must never break hook execution.
#[derive(Debug, Clone)]
pub struct DebugLog {
    hook: &'static str,
    path: Option<PathBuf>,
}

impl DebugLog {
    /// Create a log for a hook, enabled according to the settings.
    #[must_use]
    pub fn new(hook: &'static str, settings: &Settings) -> Self {
        let path = settings.debug.then(|| paths::debug_log_file(&settings.home));
        Self { hook, path }
    }

    /// A log that writes nothing.
    #[must_use]
    pub const fn disabled(hook: &'static str) -> Self {
        Self { hook, path: None }
    }

    /// Whether lines are being written.
    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.path.is_some()
    }

    /// Log a message for a session.
    pub fn log(&self, session_id: &str, message: impl AsRef<str>) {
        let Some(path) = &self.path else {
            return;
        };
        let entry = serde_json::json!({
            "timestamp": chrono::Utc::now().to_rfc3339(),
            "hook": self.hook,
            "session_id": session_id,
            "message": message.as_ref(),
        });
        append_line(path, &entry);
    }

    /// Log the raw input the hook received.
    ///
    /// Input that is not valid JSON is stored as a string.
    pub fn log_event(&self, raw_input: &str) {
        let Some(path) = &self.path else {
            return;
        };
        let input_value: serde_json::Value = serde_json::from_str(raw_input)
            .unwrap_or_else(|_| serde_json::Value::String(raw_input.to_string()));
        let session_id = input_value
            .get("session_id")
            .and_then(serde_json::Value::as_str)
            .unwrap_or(SYSTEM_SESSION)
            .to_string();

        let entry = serde_json::json!({
            "timestamp": chrono::Utc::now().to_rfc3339(),
            "hook": self.hook,
            "session_id": session_id,
            "event": input_value,
        });
        append_line(path, &entry);
    }
}

fn append_line(path: &std::path::Path, entry: &serde_json::Value) {
    if let Some(parent) = path.parent() {
        if std::fs::create_dir_all(parent).is_err() {
            return;
        }
    }

    let Ok(mut file) = OpenOptions::new().create(true).append(true).open(path) else {
        return;
    };

    let _ = writeln!(file, "{entry}");
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;
    use tempfile::TempDir;

    fn settings(home: &Path, debug: bool) -> Settings {
        Settings { home: home.to_path_buf(), debug, ..Default::default() }
    }

    fn read_log_lines(home: &Path) -> Vec<serde_json::Value> {
        let log_path = paths::debug_log_file(home);
        if !log_path.exists() {
            return vec![];
        }
        let content = std::fs::read_to_string(&log_path).unwrap();
        content
            .lines()
            .filter(|l| !l.is_empty())
            .map(|l| serde_json::from_str(l).unwrap())
            .collect()
    }

    #[test]
    fn test_log_when_enabled() {
        let dir = TempDir::new().unwrap();
        let log = DebugLog::new("stop", &settings(dir.path(), true));
        assert!(log.is_enabled());

        log.log("S1", "State is 'done', stopping continuation");

        let lines = read_log_lines(dir.path());
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0]["hook"], "stop");
        assert_eq!(lines[0]["session_id"], "S1");
        assert_eq!(lines[0]["message"], "State is 'done', stopping continuation");
    }

    #[test]
    fn test_log_when_disabled() {
        let dir = TempDir::new().unwrap();
        let log = DebugLog::new("stop", &settings(dir.path(), false));
        assert!(!log.is_enabled());

        log.log("S1", "ignored");
        log.log_event("{}");

        assert!(read_log_lines(dir.path()).is_empty());
        assert!(!paths::tmp_dir(dir.path()).exists());
    }

    #[test]
    fn test_disabled_constructor() {
        assert!(!DebugLog::disabled("stop").is_enabled());
    }

    #[test]
    fn test_log_event_extracts_session_id() {
        let dir = TempDir::new().unwrap();
        let log = DebugLog::new("user-prompt-submit", &settings(dir.path(), true));

        log.log_event(r#"{"session_id": "S9", "prompt": "/ultra-planner"}"#);

        let lines = read_log_lines(dir.path());
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0]["session_id"], "S9");
        assert_eq!(lines[0]["event"]["prompt"], "/ultra-planner");
    }

    #[test]
    fn test_log_event_invalid_json_input() {
        let dir = TempDir::new().unwrap();
        let log = DebugLog::new("stop", &settings(dir.path(), true));

        log.log_event("not valid json");

        let lines = read_log_lines(dir.path());
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0]["session_id"], SYSTEM_SESSION);
        assert_eq!(lines[0]["event"], "not valid json");
    }

    #[test]
    fn test_log_appends() {
        let dir = TempDir::new().unwrap();
        let log = DebugLog::new("stop", &settings(dir.path(), true));

        log.log("S1", "one");
        log.log("S1", "two");
        DebugLog::new("user-prompt-submit", &settings(dir.path(), true)).log("S2", "three");

        let lines = read_log_lines(dir.path());
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[2]["hook"], "user-prompt-submit");
    }

    #[test]
    fn test_log_entry_timestamp_is_rfc3339() {
        let dir = TempDir::new().unwrap();
        DebugLog::new("stop", &settings(dir.path(), true)).log("S1", "x");

        let lines = read_log_lines(dir.path());
        let ts = lines[0]["timestamp"].as_str().unwrap();
        assert!(chrono::DateTime::parse_from_rfc3339(ts).is_ok());
    }

    #[test]
    fn test_log_dir_creation_fails_silently() {
        let dir = TempDir::new().unwrap();
        // A file where the .tmp directory would go.
        std::fs::write(paths::tmp_dir(dir.path()), "blocking file").unwrap();

        DebugLog::new("stop", &settings(dir.path(), true)).log("S1", "x");

        assert!(paths::tmp_dir(dir.path()).is_file());
    }

    #[test]
    fn test_log_file_open_fails_silently() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(paths::debug_log_file(dir.path())).unwrap();

        DebugLog::new("stop", &settings(dir.path(), true)).log("S1", "x");
    }
}
