//! Session records for hands-off continuation.
//!
//! One record exists per session id. It is written by the user-prompt-submit
//! hook when a workflow command arms the session, read and bumped by the stop
//! hook on every stop, and marked `done` by the resumed agent once it has
//! delivered. A secondary index maps tracker issue numbers back to the
//! session working on them.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A named multi-step task template that selects the continuation prompt.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Workflow {
    /// No workflow recorded.
    #[default]
    None,
    /// Produce a plan and post it on the tracker issue.
    UltraPlanner,
    /// Implement a tracker issue and open a PR.
    IssueToImpl,
    /// A value this version does not know, preserved verbatim.
    Other(String),
}

impl Workflow {
    /// The identifier used on disk and in commands.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::None => "",
            Self::UltraPlanner => "ultra-planner",
            Self::IssueToImpl => "issue-to-impl",
            Self::Other(name) => name,
        }
    }

    /// The slash command that arms this workflow, if it has one.
    #[must_use]
    pub const fn command(&self) -> Option<&'static str> {
        match self {
            Self::UltraPlanner => Some("/ultra-planner"),
            Self::IssueToImpl => Some("/issue-to-impl"),
            Self::None | Self::Other(_) => None,
        }
    }

    /// Whether this workflow has a continuation prompt.
    #[must_use]
    pub const fn is_recognized(&self) -> bool {
        matches!(self, Self::UltraPlanner | Self::IssueToImpl)
    }
}

impl From<String> for Workflow {
    fn from(value: String) -> Self {
        match value.as_str() {
            "" => Self::None,
            "ultra-planner" => Self::UltraPlanner,
            "issue-to-impl" => Self::IssueToImpl,
            _ => Self::Other(value),
        }
    }
}

impl From<Workflow> for String {
    fn from(value: Workflow) -> Self {
        match value {
            Workflow::Other(name) => name,
            other => other.as_str().to_string(),
        }
    }
}

impl fmt::Display for Workflow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle state of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionPhase {
    /// Armed by a workflow command, not yet continued.
    #[default]
    Initial,
    /// At least one continuation has been issued.
    Continuing,
    /// Deliverable produced. Sticky: no further continuations.
    Done,
}

/// Persisted state for one session.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SessionRecord {
    /// The workflow this session is running.
    #[serde(default)]
    pub workflow: Workflow,
    /// Lifecycle state.
    #[serde(default)]
    pub state: SessionPhase,
    /// Continuations issued so far.
    #[serde(default)]
    pub continuation_count: u32,
    /// Tracker issue this session targets.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issue_no: Option<u64>,
}

impl SessionRecord {
    /// A freshly armed record for a workflow.
    #[must_use]
    pub const fn armed(workflow: Workflow, issue_no: Option<u64>) -> Self {
        Self { workflow, state: SessionPhase::Initial, continuation_count: 0, issue_no }
    }

    /// Whether the session reached its sticky terminal state.
    #[must_use]
    pub fn is_done(&self) -> bool {
        self.state == SessionPhase::Done
    }

    /// Whether the continuation budget is used up.
    #[must_use]
    pub const fn budget_exhausted(&self, max_continuations: u32) -> bool {
        self.continuation_count >= max_continuations
    }

    /// The record after one more continuation.
    #[must_use]
    pub fn continued(&self) -> Self {
        Self {
            state: SessionPhase::Continuing,
            continuation_count: self.continuation_count.saturating_add(1),
            ..self.clone()
        }
    }

    /// The record marked done.
    #[must_use]
    pub fn finished(&self) -> Self {
        Self { state: SessionPhase::Done, ..self.clone() }
    }
}

/// Issue index entry: which session is working on an issue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueIndexEntry {
    /// The session most recently armed for the issue.
    pub session_id: String,
    /// The workflow that session runs.
    pub workflow: Workflow,
}
