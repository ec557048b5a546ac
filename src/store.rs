//! Session record storage.
//!
//! [`SessionStore`] is the seam between the hooks and wherever session state
//! lives. Production uses [`FileSessionStore`], one JSON file per session
//! under `.tmp/hooked-sessions/`; tests use [`MemorySessionStore`].

use crate::error::{Error, Result};
use crate::paths;
use crate::session::{IssueIndexEntry, SessionRecord};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

/// Trait for persistent session state.
///
/// Record operations take the session id as key; issue index operations take
/// the tracker issue number.
pub trait SessionStore {
    /// Load the record for a session, or `None` if the session was never armed.
    ///
    /// # Errors
    ///
    /// Returns an error if the id is invalid or the record cannot be read or parsed.
    fn get(&self, session_id: &str) -> Result<Option<SessionRecord>>;

    /// Write the record for a session, replacing any existing one.
    ///
    /// # Errors
    ///
    /// Returns an error if the id is invalid or the record cannot be written.
    fn put(&self, session_id: &str, record: &SessionRecord) -> Result<()>;

    /// Replace the record only if the stored one still equals `expected`
    /// (`None` meaning "no record").
    ///
    /// Returns `Ok(false)` without writing when the stored record differs.
    ///
    /// # Errors
    ///
    /// Returns an error if the id is invalid or storage fails.
    fn compare_and_swap(
        &self,
        session_id: &str,
        expected: Option<&SessionRecord>,
        new: &SessionRecord,
    ) -> Result<bool>;

    /// Look up which session last claimed an issue.
    ///
    /// # Errors
    ///
    /// Returns an error if the index entry cannot be read or parsed.
    fn get_issue(&self, issue_no: u64) -> Result<Option<IssueIndexEntry>>;

    /// Point an issue at a session, replacing any previous entry.
    ///
    /// # Errors
    ///
    /// Returns an error if the index entry cannot be written.
    fn put_issue(&self, issue_no: u64, entry: &IssueIndexEntry) -> Result<()>;
}

fn check_session_id(session_id: &str) -> Result<()> {
    if paths::is_valid_session_id(session_id) {
        Ok(())
    } else {
        Err(Error::InvalidSessionId(session_id.to_string()))
    }
}

/// File-backed store rooted at a sessions directory.
///
/// `put` is a plain overwrite. `compare_and_swap` re-reads the file, compares,
/// and replaces it through a temp file and rename, so readers never observe a
/// half-written record. There is no cross-process lock: two processes racing
/// through `compare_and_swap` for the same session can both succeed.
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    sessions_dir: PathBuf,
}

impl FileSessionStore {
    /// Create a store rooted at the given sessions directory.
    #[must_use]
    pub fn new(sessions_dir: impl Into<PathBuf>) -> Self {
        Self { sessions_dir: sessions_dir.into() }
    }

    /// The sessions directory.
    #[must_use]
    pub fn sessions_dir(&self) -> &Path {
        &self.sessions_dir
    }

    /// Path of the record file for a session.
    #[must_use]
    pub fn record_path(&self, session_id: &str) -> PathBuf {
        paths::session_file(&self.sessions_dir, session_id)
    }

    fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<Option<T>> {
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(path)?;
        Ok(Some(serde_json::from_str(&content)?))
    }

    fn write_json<T: serde::Serialize>(path: &Path, value: &T) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_string(value)?)?;
        Ok(())
    }

    fn write_json_atomic<T: serde::Serialize>(path: &Path, value: &T) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut tmp_name = path.as_os_str().to_owned();
        tmp_name.push(format!(".{}.tmp", std::process::id()));
        let tmp_path = PathBuf::from(tmp_name);

        fs::write(&tmp_path, serde_json::to_string(value)?)?;
        if let Err(e) = fs::rename(&tmp_path, path) {
            let _ = fs::remove_file(&tmp_path);
            return Err(e.into());
        }
        Ok(())
    }
}

impl SessionStore for FileSessionStore {
    fn get(&self, session_id: &str) -> Result<Option<SessionRecord>> {
        check_session_id(session_id)?;
        Self::read_json(&self.record_path(session_id))
    }

    fn put(&self, session_id: &str, record: &SessionRecord) -> Result<()> {
        check_session_id(session_id)?;
        Self::write_json(&self.record_path(session_id), record)
    }

    fn compare_and_swap(
        &self,
        session_id: &str,
        expected: Option<&SessionRecord>,
        new: &SessionRecord,
    ) -> Result<bool> {
        check_session_id(session_id)?;
        let path = self.record_path(session_id);
        let current: Option<SessionRecord> = Self::read_json(&path)?;
        if current.as_ref() != expected {
            return Ok(false);
        }
        Self::write_json_atomic(&path, new)?;
        Ok(true)
    }

    fn get_issue(&self, issue_no: u64) -> Result<Option<IssueIndexEntry>> {
        Self::read_json(&paths::issue_file(&self.sessions_dir, issue_no))
    }

    fn put_issue(&self, issue_no: u64, entry: &IssueIndexEntry) -> Result<()> {
        Self::write_json(&paths::issue_file(&self.sessions_dir, issue_no), entry)
    }
}

/// In-memory store. `compare_and_swap` is atomic under a mutex.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    records: Mutex<HashMap<String, SessionRecord>>,
    issues: Mutex<HashMap<u64, IssueIndexEntry>>,
}

impl MemorySessionStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored session records.
    pub fn len(&self) -> usize {
        self.records.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Whether no session records are stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl SessionStore for MemorySessionStore {
    fn get(&self, session_id: &str) -> Result<Option<SessionRecord>> {
        check_session_id(session_id)?;
        let records = self.records.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(records.get(session_id).cloned())
    }

    fn put(&self, session_id: &str, record: &SessionRecord) -> Result<()> {
        check_session_id(session_id)?;
        let mut records = self.records.lock().unwrap_or_else(PoisonError::into_inner);
        records.insert(session_id.to_string(), record.clone());
        Ok(())
    }

    fn compare_and_swap(
        &self,
        session_id: &str,
        expected: Option<&SessionRecord>,
        new: &SessionRecord,
    ) -> Result<bool> {
        check_session_id(session_id)?;
        let mut records = self.records.lock().unwrap_or_else(PoisonError::into_inner);
        if records.get(session_id) != expected {
            return Ok(false);
        }
        records.insert(session_id.to_string(), new.clone());
        Ok(true)
    }

    fn get_issue(&self, issue_no: u64) -> Result<Option<IssueIndexEntry>> {
        let issues = self.issues.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(issues.get(&issue_no).cloned())
    }

    fn put_issue(&self, issue_no: u64, entry: &IssueIndexEntry) -> Result<()> {
        let mut issues = self.issues.lock().unwrap_or_else(PoisonError::into_inner);
        issues.insert(issue_no, entry.clone());
        Ok(())
    }
}
