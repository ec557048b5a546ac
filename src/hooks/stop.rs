//! Stop hook for continuing hands-off sessions.
//!
//! This hook runs when the agent attempts to stop. If the session was armed
//! by a workflow command, is not done, and still has continuation budget, the
//! stop is blocked and the agent is handed the workflow's resume prompt.
//!
//! Every failure path allows the stop: the hook never traps an agent in a
//! loop it cannot leave.

use crate::config::Settings;
use crate::error::Result;
use crate::hook_logging::{DebugLog, SYSTEM_SESSION};
use crate::hooks::{BlockDecision, HookInput};
use crate::paths;
use crate::prompts::{self, PromptContext};
use crate::store::SessionStore;
use crate::transcript;
use std::path::Path;

/// What the stop hook decided.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopOutcome {
    /// Hands-off mode is off.
    Disabled,
    /// The last transcript entry reports the account is out of credit.
    CreditExhausted,
    /// No session id, or no record for it.
    NoSession,
    /// The agent marked the session done.
    Done,
    /// The continuation budget is used up.
    BudgetExhausted,
    /// The record names a workflow this hook has no prompt for.
    UnknownWorkflow(String),
    /// Another writer changed the record between read and write.
    Conflict,
    /// Something went wrong; the stop is allowed.
    Failed(String),
    /// Block the stop and resume with the given prompt.
    Continue(BlockDecision),
}

impl StopOutcome {
    /// Whether the agent is allowed to stop.
    #[must_use]
    pub const fn allows_stop(&self) -> bool {
        !matches!(self, Self::Continue(_))
    }

    /// The decision to print, if the stop is blocked.
    #[must_use]
    pub const fn block_decision(&self) -> Option<&BlockDecision> {
        match self {
            Self::Continue(decision) => Some(decision),
            _ => None,
        }
    }
}

/// Decide whether the agent may stop, treating errors as "allow".
#[must_use]
pub fn decide_stop(
    input: &HookInput,
    settings: &Settings,
    store: &dyn SessionStore,
    log: &DebugLog,
) -> StopOutcome {
    match run_stop_hook(input, settings, store, log) {
        Ok(outcome) => outcome,
        Err(e) => {
            let session_id = input.session_id().unwrap_or(SYSTEM_SESSION);
            log.log(session_id, format!("Error in stop hook, allowing stop: {e}"));
            StopOutcome::Failed(e.to_string())
        }
    }
}

/// Run the stop hook.
///
/// # Errors
///
/// Returns an error if the session record cannot be read or written, or the
/// continuation prompt fails to render.
pub fn run_stop_hook(
    input: &HookInput,
    settings: &Settings,
    store: &dyn SessionStore,
    log: &DebugLog,
) -> Result<StopOutcome> {
    if !settings.enabled {
        log.log(SYSTEM_SESSION, "Hands-off mode disabled, exiting hook");
        return Ok(StopOutcome::Disabled);
    }

    if let Some(transcript_path) = input.transcript_path.as_deref().filter(|p| !p.is_empty()) {
        if credit_exhausted(Path::new(transcript_path), input, log) {
            return Ok(StopOutcome::CreditExhausted);
        }
    }

    let Some(session_id) = input.session_id().filter(|id| paths::is_valid_session_id(id)) else {
        log.log(SYSTEM_SESSION, "No usable session_id, allowing stop");
        return Ok(StopOutcome::NoSession);
    };

    let Some(record) = store.get(session_id)? else {
        log.log(session_id, "No session record, allowing stop");
        return Ok(StopOutcome::NoSession);
    };
    log.log(session_id, format!("Loaded state: {record:?}"));

    if record.is_done() {
        log.log(session_id, "State is 'done', stopping continuation");
        return Ok(StopOutcome::Done);
    }

    if record.budget_exhausted(settings.max_continuations) {
        log.log(
            session_id,
            format!(
                "Continuation budget exhausted ({}/{}), allowing stop",
                record.continuation_count, settings.max_continuations
            ),
        );
        return Ok(StopOutcome::BudgetExhausted);
    }

    let next = record.continued();
    if !store.compare_and_swap(session_id, Some(&record), &next)? {
        log.log(session_id, "Session record changed concurrently, allowing stop");
        return Ok(StopOutcome::Conflict);
    }

    let session_file = paths::session_file(&settings.sessions_dir(), session_id);
    let context = PromptContext {
        continuation_count: next.continuation_count,
        max_continuations: settings.max_continuations,
        session_id: session_id.to_string(),
        session_file: session_file.display().to_string(),
        issue_no: next.issue_no,
    };
    let Some(prompt) =
        prompts::render_continuation_prompt(&next.workflow, &context, &settings.templates_dir())?
    else {
        log.log(session_id, format!("Unknown workflow {:?}, allowing stop", next.workflow));
        return Ok(StopOutcome::UnknownWorkflow(next.workflow.to_string()));
    };

    log.log(
        session_id,
        format!(
            "Continuing {} ({}/{})",
            next.workflow, next.continuation_count, settings.max_continuations
        ),
    );
    Ok(StopOutcome::Continue(BlockDecision::new(prompt)))
}

/// Check the last transcript entry for a credit error.
///
/// An unreadable transcript is logged and treated as "no error".
fn credit_exhausted(path: &Path, input: &HookInput, log: &DebugLog) -> bool {
    let session_id = input.session_id().unwrap_or(SYSTEM_SESSION);
    match transcript::read_last_entry(path) {
        Ok(entry) if entry.is_credit_exhausted() => {
            log.log(session_id, "Last transcript entry is a credit error, allowing stop");
            true
        }
        Ok(_) => false,
        Err(e) => {
            log.log(session_id, format!("Could not inspect transcript {}: {e}", path.display()));
            false
        }
    }
}
