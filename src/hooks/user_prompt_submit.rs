//! `UserPromptSubmit` hook for arming hands-off sessions.
//!
//! When the user submits a workflow command (`/ultra-planner`,
//! `/issue-to-impl`), the session record is reset to a fresh state so the
//! stop hook can continue it. Any other instruction leaves state untouched.

use crate::config::Settings;
use crate::error::Result;
use crate::hook_logging::{DebugLog, SYSTEM_SESSION};
use crate::hooks::{BlockDecision, HookInput};
use crate::instruction::Instruction;
use crate::paths;
use crate::session::{IssueIndexEntry, SessionRecord};
use crate::store::SessionStore;

/// What the hook did with an instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptOutcome {
    /// Hands-off mode is off.
    Disabled,
    /// Required input is missing; the instruction must be rejected.
    Invalid(BlockDecision),
    /// A workflow command (re-)armed the session.
    Armed {
        /// The session that was armed.
        session_id: String,
        /// The record written for it.
        record: SessionRecord,
    },
    /// Not a workflow command; nothing changed.
    Ignored,
}

/// Check the input for the fields this hook requires.
///
/// A missing session id takes precedence over a missing prompt.
fn validate(input: &HookInput) -> std::result::Result<(&str, &str), String> {
    let Some(session_id) = input.session_id() else {
        return Err("No session_id provided.".to_string());
    };
    if !paths::is_valid_session_id(session_id) {
        return Err(format!("Invalid session_id provided: {session_id:?}"));
    }
    let Some(prompt) = input.prompt() else {
        return Err("No prompt provided.".to_string());
    };
    Ok((session_id, prompt))
}

/// Run the user prompt submit hook.
///
/// # Errors
///
/// Returns an error if the session record or issue index cannot be written.
pub fn run_user_prompt_submit_hook(
    input: &HookInput,
    settings: &Settings,
    store: &dyn SessionStore,
    log: &DebugLog,
) -> Result<PromptOutcome> {
    if !settings.enabled {
        log.log(SYSTEM_SESSION, "Hands-off mode disabled, exiting hook");
        return Ok(PromptOutcome::Disabled);
    }

    let (session_id, prompt) = match validate(input) {
        Ok(fields) => fields,
        Err(reason) => {
            log.log(SYSTEM_SESSION, format!("Error in hook input: {reason}"));
            return Ok(PromptOutcome::Invalid(BlockDecision::new(reason)));
        }
    };

    let Instruction::Workflow { workflow, issue_no } = Instruction::parse(prompt) else {
        log.log(session_id, "No workflow matched, doing nothing.");
        return Ok(PromptOutcome::Ignored);
    };

    let record = SessionRecord::armed(workflow, issue_no);
    log.log(session_id, format!("Writing state: {record:?}"));
    store.put(session_id, &record)?;

    if let Some(issue_no) = issue_no {
        let entry =
            IssueIndexEntry { session_id: session_id.to_string(), workflow: record.workflow.clone() };
        log.log(session_id, format!("Writing issue index {issue_no}: {entry:?}"));
        store.put_issue(issue_no, &entry)?;
    }

    Ok(PromptOutcome::Armed { session_id: session_id.to_string(), record })
}
