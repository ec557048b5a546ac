//! Path utilities for determining where hook state is stored.
//!
//! Everything lives under a single base directory (`AUTONOMY_HOME`, default
//! the current directory):
//!
//! ```text
//! <home>/.tmp/hook-debug.jsonl
//! <home>/.tmp/hooked-sessions/<session_id>.json
//! <home>/.tmp/hooked-sessions/by-issue/<issue_no>.json
//! <home>/.claude/autonomy-config.yaml
//! <home>/.claude/autonomy-templates/prompts/*.tera
//! ```

use std::path::{Path, PathBuf};

/// Scratch directory name under the base directory.
const TMP_DIR_NAME: &str = ".tmp";

/// Directory holding one record per session.
const SESSIONS_DIR_NAME: &str = "hooked-sessions";

/// Subdirectory of the sessions directory holding the issue index.
const BY_ISSUE_DIR_NAME: &str = "by-issue";

/// Prompt template overrides, relative to the base directory.
const TEMPLATES_DIR: &str = ".claude/autonomy-templates";

/// The debug log filename.
pub const DEBUG_LOG_FILENAME: &str = "hook-debug.jsonl";

/// Get the scratch directory (`<home>/.tmp`).
#[must_use]
pub fn tmp_dir(home: &Path) -> PathBuf {
    home.join(TMP_DIR_NAME)
}

/// Get the sessions directory (`<home>/.tmp/hooked-sessions`).
#[must_use]
pub fn sessions_dir(home: &Path) -> PathBuf {
    tmp_dir(home).join(SESSIONS_DIR_NAME)
}

/// Get the prompt template override directory (`<home>/.claude/autonomy-templates`).
#[must_use]
pub fn templates_dir(home: &Path) -> PathBuf {
    home.join(TEMPLATES_DIR)
}

/// Get the issue index directory (`<home>/.tmp/hooked-sessions/by-issue`).
#[must_use]
pub fn by_issue_dir(home: &Path) -> PathBuf {
    sessions_dir(home).join(BY_ISSUE_DIR_NAME)
}

/// Get the record path for a session id.
///
/// The id is used verbatim; callers validate it with [`is_valid_session_id`].
#[must_use]
pub fn session_file(sessions_dir: &Path, session_id: &str) -> PathBuf {
    sessions_dir.join(format!("{session_id}.json"))
}

/// Get the index path for an issue number.
#[must_use]
pub fn issue_file(sessions_dir: &Path, issue_no: u64) -> PathBuf {
    sessions_dir.join(BY_ISSUE_DIR_NAME).join(format!("{issue_no}.json"))
}

/// Get the debug log path (`<home>/.tmp/hook-debug.jsonl`).
#[must_use]
pub fn debug_log_file(home: &Path) -> PathBuf {
    tmp_dir(home).join(DEBUG_LOG_FILENAME)
}

/// Check that a session id can name a file inside the sessions directory.
///
/// Rejects empty ids, `.`/`..`, and anything containing a path separator or
/// NUL, so a hostile id can never escape the sessions directory.
#[must_use]
pub fn is_valid_session_id(session_id: &str) -> bool {
    !session_id.is_empty()
        && session_id != "."
        && session_id != ".."
        && !session_id.contains(['/', '\\', '\0'])
}
