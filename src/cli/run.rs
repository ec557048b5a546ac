//! Command execution for the CLI.
//!
//! This module handles running CLI commands and producing output.

use crate::cli::{Command, SessionCommand};
use crate::command::RealCommandRunner;
use crate::config::Settings;
use crate::error::Error;
use crate::hook_logging::DebugLog;
use crate::hooks::{
    decide_stop, parse_hook_input, run_pre_tool_use, run_user_prompt_submit_hook,
    PreToolUseOutput, PromptOutcome, StopOutcome,
};
use crate::store::{FileSessionStore, SessionStore};
use serde::Serialize;
use std::process::ExitCode;

/// Output from running the CLI, with separate stdout and stderr messages.
#[derive(Debug)]
pub struct CliOutput {
    /// Exit code for the process.
    pub exit_code: ExitCode,
    /// Messages to print to stdout.
    pub stdout: Vec<String>,
    /// Messages to print to stderr.
    pub stderr: Vec<String>,
}

/// Run a CLI command with the given stdin input, resolving settings from
/// the environment.
pub fn run(command: Command, stdin: &str) -> CliOutput {
    if matches!(command, Command::Version) {
        return run_version();
    }

    match Settings::from_env() {
        Ok(settings) => run_with_settings(command, stdin, &settings),
        Err(e) => settings_error(&command, &e),
    }
}

/// Run a CLI command with already-resolved settings.
pub fn run_with_settings(command: Command, stdin: &str, settings: &Settings) -> CliOutput {
    if let Some(hook_type) = command.hook_type() {
        DebugLog::new(hook_type, settings).log_event(stdin);
    }

    match command {
        Command::Version => run_version(),
        Command::Stop => run_stop_cmd(stdin, settings),
        Command::UserPromptSubmit => run_user_prompt_submit_cmd(stdin, settings),
        Command::PreToolUse => run_pre_tool_use_cmd(stdin, settings),
        Command::Session(cmd) => run_session_cmd(cmd, settings),
    }
}

/// Settings could not be resolved: hooks take their no-action path.
fn settings_error(command: &Command, error: &Error) -> CliOutput {
    let message = format!("Warning: could not load autonomy settings: {error}");
    match command {
        Command::PreToolUse => {
            let mut output = json_line(&PreToolUseOutput::ask());
            output.stderr.push(message);
            output
        }
        Command::Stop | Command::UserPromptSubmit => warning_output(message),
        Command::Session(_) | Command::Version => error_output(message),
    }
}

// === Utility Commands ===

fn run_version() -> CliOutput {
    CliOutput {
        exit_code: ExitCode::SUCCESS,
        stdout: vec![],
        stderr: vec![format!("autonomy-hooks v{}", crate::VERSION)],
    }
}

// === Hook Commands ===

fn run_user_prompt_submit_cmd(stdin: &str, settings: &Settings) -> CliOutput {
    let log = DebugLog::new("user-prompt-submit", settings);
    if !settings.enabled {
        return silent_output();
    }

    let input = match parse_hook_input(stdin) {
        Ok(input) => input,
        Err(e) => return warning_output(format!("Error parsing hook input: {e}")),
    };

    let store = FileSessionStore::new(settings.sessions_dir());
    match run_user_prompt_submit_hook(&input, settings, &store, &log) {
        Ok(PromptOutcome::Invalid(decision)) => {
            let mut output = json_line(&decision);
            output.exit_code = ExitCode::from(1);
            output
        }
        Ok(PromptOutcome::Armed { .. } | PromptOutcome::Ignored | PromptOutcome::Disabled) => {
            silent_output()
        }
        Err(e) => error_output(format!("Error saving session state: {e}")),
    }
}

fn run_stop_cmd(stdin: &str, settings: &Settings) -> CliOutput {
    let log = DebugLog::new("stop", settings);
    if !settings.enabled {
        return silent_output();
    }

    let input = match parse_hook_input(stdin) {
        Ok(input) => input,
        Err(e) => return warning_output(format!("Error parsing hook input: {e}")),
    };

    let store = FileSessionStore::new(settings.sessions_dir());
    match decide_stop(&input, settings, &store, &log) {
        StopOutcome::Continue(decision) => json_line(&decision),
        StopOutcome::Failed(message) => warning_output(format!("Error in stop hook: {message}")),
        _ => silent_output(),
    }
}

fn run_pre_tool_use_cmd(stdin: &str, settings: &Settings) -> CliOutput {
    let log = DebugLog::new("pre-tool-use", settings);
    let runner = RealCommandRunner::new();
    let output = run_pre_tool_use(stdin, settings, &runner, &log);
    json_line(&output)
}

// === Session Commands ===

fn run_session_cmd(cmd: SessionCommand, settings: &Settings) -> CliOutput {
    let store = FileSessionStore::new(settings.sessions_dir());
    match cmd {
        SessionCommand::Show { id } => session_show(&store, &id),
        SessionCommand::Done { id } => session_done(&store, &id),
        SessionCommand::ByIssue { issue } => session_by_issue(&store, issue),
    }
}

fn session_show(store: &dyn SessionStore, id: &str) -> CliOutput {
    match store.get(id) {
        Ok(Some(record)) => json_output(&record),
        Ok(None) => error_output(format!("No session record for {id}")),
        Err(e) => error_output(format!("Error reading session {id}: {e}")),
    }
}

fn session_done(store: &dyn SessionStore, id: &str) -> CliOutput {
    let record = match store.get(id) {
        Ok(Some(record)) => record,
        Ok(None) => return error_output(format!("No session record for {id}")),
        Err(e) => return error_output(format!("Error reading session {id}: {e}")),
    };

    if record.is_done() {
        return success_output(format!("Session {id} is already done"));
    }

    match store.compare_and_swap(id, Some(&record), &record.finished()) {
        Ok(true) => success_output(format!("Session {id} marked done")),
        Ok(false) => error_output(format!("Session {id} changed while updating; try again")),
        Err(e) => error_output(format!("Error updating session {id}: {e}")),
    }
}

fn session_by_issue(store: &dyn SessionStore, issue: u64) -> CliOutput {
    match store.get_issue(issue) {
        Ok(Some(entry)) => json_output(&entry),
        Ok(None) => error_output(format!("No session recorded for issue #{issue}")),
        Err(e) => error_output(format!("Error reading issue index for #{issue}: {e}")),
    }
}

// === Helper Functions ===

/// Single-line JSON on stdout, the form Claude Code reads from hooks.
fn json_line<T: Serialize>(value: &T) -> CliOutput {
    match serde_json::to_string(value) {
        Ok(json) => CliOutput { exit_code: ExitCode::SUCCESS, stdout: vec![json], stderr: vec![] },
        Err(e) => error_output(e.to_string()),
    }
}

fn json_output<T: Serialize>(value: &T) -> CliOutput {
    match serde_json::to_string_pretty(value) {
        Ok(json) => CliOutput { exit_code: ExitCode::SUCCESS, stdout: vec![json], stderr: vec![] },
        Err(e) => error_output(e.to_string()),
    }
}

fn success_output(message: String) -> CliOutput {
    CliOutput { exit_code: ExitCode::SUCCESS, stdout: vec![message], stderr: vec![] }
}

fn silent_output() -> CliOutput {
    CliOutput { exit_code: ExitCode::SUCCESS, stdout: vec![], stderr: vec![] }
}

fn warning_output(message: String) -> CliOutput {
    CliOutput { exit_code: ExitCode::SUCCESS, stdout: vec![], stderr: vec![message] }
}

fn error_output(message: String) -> CliOutput {
    CliOutput { exit_code: ExitCode::from(1), stdout: vec![], stderr: vec![message] }
}
