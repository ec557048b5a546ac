//! `PreToolUse` hook: delegate permission decisions to an external command.
//!
//! The configured permission command receives the raw tool-use event on
//! stdin and answers with a `PreToolUse` decision object on stdout. Anything
//! short of a well-formed answer defers to the human with "ask".

use crate::config::Settings;
use crate::error::{Error, Result};
use crate::hook_logging::{DebugLog, SYSTEM_SESSION};
use crate::hooks::PreToolUseOutput;
use crate::traits::CommandRunner;
use std::time::Duration;

/// How long the permission command may take before we give up and ask.
pub const PERMISSION_TIMEOUT: Duration = Duration::from_secs(30);

/// Run the pre-tool-use hook. Never fails: errors become "ask".
#[must_use]
pub fn run_pre_tool_use(
    raw_input: &str,
    settings: &Settings,
    runner: &dyn CommandRunner,
    log: &DebugLog,
) -> PreToolUseOutput {
    let Some(command) = settings.permission_command.as_deref() else {
        log.log(SYSTEM_SESSION, "No permission command configured, asking");
        return PreToolUseOutput::ask();
    };

    match query_permission_command(command, raw_input, runner) {
        Ok(output) => {
            log.log(
                SYSTEM_SESSION,
                format!("Permission decision: {}", output.hook_specific_output.permission_decision),
            );
            output
        }
        Err(e) => {
            log.log(SYSTEM_SESSION, format!("Permission command failed, asking: {e}"));
            PreToolUseOutput::ask()
        }
    }
}

fn query_permission_command(
    command: &str,
    raw_input: &str,
    runner: &dyn CommandRunner,
) -> Result<PreToolUseOutput> {
    let output = runner.run("sh", &["-c", command], Some(raw_input), Some(PERMISSION_TIMEOUT))?;
    if !output.success() {
        return Err(Error::CommandFailed {
            command: command.to_string(),
            exit_code: output.exit_code,
            stderr: output.stderr.trim().to_string(),
        });
    }

    let decision: PreToolUseOutput = serde_json::from_str(output.stdout.trim())?;
    if !decision.is_valid() {
        return Err(Error::Config(format!(
            "permission command returned an unknown decision {:?}",
            decision.hook_specific_output.permission_decision
        )));
    }
    Ok(decision)
}
