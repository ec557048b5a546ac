//! Testing utilities and mock implementations.
//!
//! These types are provided for use in tests. They may appear unused in
//! the library itself but are consumed by unit and integration tests.

#![allow(dead_code)]
#![allow(clippy::needless_pass_by_ref_mut)] // &mut self for ergonomics with RefCell

use crate::error::Result;
use crate::session::{IssueIndexEntry, SessionRecord};
use crate::store::SessionStore;
use crate::traits::{CommandOutput, CommandRunner};
use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

/// One expected command call.
#[derive(Debug)]
struct Expectation {
    program: String,
    args: Vec<String>,
    stdin: Option<String>,
    output: CommandOutput,
}

/// A mock command runner for testing.
///
/// Records expected commands and their outputs, then verifies they were called.
#[derive(Debug, Default)]
pub struct MockCommandRunner {
    expectations: RefCell<Vec<Expectation>>,
    call_index: RefCell<usize>,
}

impl MockCommandRunner {
    /// Create a new mock command runner.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an expected command, the stdin it should receive, and its output.
    pub fn expect(
        &mut self,
        program: &str,
        args: &[&str],
        stdin: Option<&str>,
        output: CommandOutput,
    ) {
        self.expectations.borrow_mut().push(Expectation {
            program: program.to_string(),
            args: args.iter().map(|s| (*s).to_string()).collect(),
            stdin: stdin.map(str::to_string),
            output,
        });
    }

    /// Verify all expected commands were called.
    ///
    /// # Panics
    ///
    /// Panics if not all expected commands were called.
    pub fn verify(&self) {
        let index = *self.call_index.borrow();
        let expected = self.expectations.borrow().len();
        assert_eq!(
            index, expected,
            "Expected {expected} command calls, but only {index} were made"
        );
    }
}

impl CommandRunner for MockCommandRunner {
    fn run(
        &self,
        program: &str,
        args: &[&str],
        stdin: Option<&str>,
        _timeout: Option<Duration>,
    ) -> Result<CommandOutput> {
        let mut index = self.call_index.borrow_mut();
        let expectations = self.expectations.borrow();

        assert!(
            *index < expectations.len(),
            "Unexpected command call: {program} {args:?} (no more expectations)"
        );

        let expected = &expectations[*index];
        let args_vec: Vec<String> = args.iter().map(|s| (*s).to_string()).collect();

        assert!(
            program == expected.program && args_vec == expected.args,
            "Command mismatch at index {}:\n  Expected: {} {:?}\n  Got: {} {:?}",
            *index,
            expected.program,
            expected.args,
            program,
            args
        );
        assert_eq!(stdin, expected.stdin.as_deref(), "stdin mismatch at index {}", *index);

        *index += 1;
        Ok(expected.output.clone())
    }
}

/// A command runner that always fails, for testing error paths.
#[derive(Debug, Default)]
pub struct FailingCommandRunner {
    error_message: String,
}

impl FailingCommandRunner {
    /// Create a new failing command runner with the specified error message.
    #[must_use]
    pub fn new(error_message: impl Into<String>) -> Self {
        Self { error_message: error_message.into() }
    }
}

impl CommandRunner for FailingCommandRunner {
    fn run(
        &self,
        _program: &str,
        _args: &[&str],
        _stdin: Option<&str>,
        _timeout: Option<Duration>,
    ) -> Result<CommandOutput> {
        Err(std::io::Error::other(self.error_message.clone()).into())
    }
}

/// A store that simulates another writer racing the first swap.
///
/// Just before the first `compare_and_swap`, the current record is replaced
/// by its `done` version, as if the agent had finished concurrently.
#[derive(Debug, Default)]
pub struct InterferingStore<S> {
    inner: S,
    interfered: AtomicBool,
}

impl<S: SessionStore> InterferingStore<S> {
    /// Wrap a store.
    pub const fn new(inner: S) -> Self {
        Self { inner, interfered: AtomicBool::new(false) }
    }

    /// Whether the simulated writer has run.
    pub fn has_interfered(&self) -> bool {
        self.interfered.load(Ordering::SeqCst)
    }
}

impl<S: SessionStore> SessionStore for InterferingStore<S> {
    fn get(&self, session_id: &str) -> Result<Option<SessionRecord>> {
        self.inner.get(session_id)
    }

    fn put(&self, session_id: &str, record: &SessionRecord) -> Result<()> {
        self.inner.put(session_id, record)
    }

    fn compare_and_swap(
        &self,
        session_id: &str,
        expected: Option<&SessionRecord>,
        new: &SessionRecord,
    ) -> Result<bool> {
        if !self.interfered.swap(true, Ordering::SeqCst) {
            if let Some(current) = self.inner.get(session_id)? {
                self.inner.put(session_id, &current.finished())?;
            }
        }
        self.inner.compare_and_swap(session_id, expected, new)
    }

    fn get_issue(&self, issue_no: u64) -> Result<Option<IssueIndexEntry>> {
        self.inner.get_issue(issue_no)
    }

    fn put_issue(&self, issue_no: u64, entry: &IssueIndexEntry) -> Result<()> {
        self.inner.put_issue(issue_no, entry)
    }
}

/// Write a JSONL transcript with the given lines into `dir`.
///
/// # Panics
///
/// Panics if the file cannot be written.
pub fn write_transcript(dir: &Path, lines: &[&str]) -> PathBuf {
    let path = dir.join("transcript.jsonl");
    let mut content = lines.join("\n");
    content.push('\n');
    std::fs::write(&path, content).expect("failed to write transcript");
    path
}
