//! Parsing of user instructions into workflow commands.
//!
//! A workflow is armed by an instruction that starts with its slash command.
//! The issue number comes from, in priority order:
//!
//! 1. a positional argument directly after `/issue-to-impl`, e.g. `/issue-to-impl 42`;
//! 2. a `--refine <n>` flag anywhere in the instruction.

use crate::session::Workflow;
use once_cell::sync::Lazy;
use regex::Regex;

/// Workflows in match order. The first whose command prefixes the instruction wins.
const WORKFLOWS: [Workflow; 2] = [Workflow::UltraPlanner, Workflow::IssueToImpl];

static ISSUE_POSITIONAL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^/issue-to-impl\s+(\d+)").expect("issue positional pattern is valid")
});

static REFINE_FLAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"--refine\s+(\d+)").expect("refine flag pattern is valid"));

/// A parsed user instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Instruction {
    /// The instruction arms a workflow.
    Workflow {
        /// The workflow to arm.
        workflow: Workflow,
        /// Tracker issue named in the arguments.
        issue_no: Option<u64>,
    },
    /// Anything else.
    Unrecognized,
}

impl Instruction {
    /// Parse an instruction.
    #[must_use]
    pub fn parse(prompt: &str) -> Self {
        let Some(workflow) = match_workflow(prompt) else {
            return Self::Unrecognized;
        };
        Self::Workflow { workflow, issue_no: extract_issue_no(prompt) }
    }
}

/// Find the workflow whose command prefixes the instruction.
#[must_use]
pub fn match_workflow(prompt: &str) -> Option<Workflow> {
    WORKFLOWS
        .into_iter()
        .find(|w| w.command().is_some_and(|command| prompt.starts_with(command)))
}

/// Extract the tracker issue number from an instruction.
///
/// Digits that overflow `u64` are treated as absent.
#[must_use]
pub fn extract_issue_no(prompt: &str) -> Option<u64> {
    [&*ISSUE_POSITIONAL, &*REFINE_FLAG]
        .into_iter()
        .find_map(|pattern| pattern.captures(prompt))
        .and_then(|caps| caps[1].parse().ok())
}
