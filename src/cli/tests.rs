//! Tests for the CLI module.

use super::*;
use crate::config::Settings;
use crate::paths;
use crate::session::{SessionPhase, SessionRecord, Workflow};
use crate::store::{FileSessionStore, SessionStore};
use clap::Parser;
use std::path::Path;
use std::process::ExitCode;
use tempfile::TempDir;

fn settings(home: &Path) -> Settings {
    Settings { enabled: true, home: home.to_path_buf(), ..Default::default() }
}

fn store(home: &Path) -> FileSessionStore {
    FileSessionStore::new(paths::sessions_dir(home))
}

#[test]
fn test_command_needs_stdin() {
    assert!(!Command::Version.needs_stdin());
    assert!(!Command::Session(SessionCommand::Show { id: "S1".to_string() }).needs_stdin());

    assert!(Command::Stop.needs_stdin());
    assert!(Command::PreToolUse.needs_stdin());
    assert!(Command::UserPromptSubmit.needs_stdin());
}

#[test]
fn test_command_hook_type() {
    assert_eq!(Command::Stop.hook_type(), Some("stop"));
    assert_eq!(Command::UserPromptSubmit.hook_type(), Some("user-prompt-submit"));
    assert_eq!(Command::PreToolUse.hook_type(), Some("pre-tool-use"));

    assert_eq!(Command::Version.hook_type(), None);
    assert_eq!(Command::Session(SessionCommand::ByIssue { issue: 1 }).hook_type(), None);
    assert!(!Command::Version.is_hook());
}

#[test]
fn test_parse_cli() {
    let cli = Cli::try_parse_from(["autonomy-hooks", "user-prompt-submit"]).unwrap();
    assert!(matches!(cli.command, Command::UserPromptSubmit));

    let cli = Cli::try_parse_from(["autonomy-hooks", "session", "by-issue", "42"]).unwrap();
    assert!(matches!(cli.command, Command::Session(SessionCommand::ByIssue { issue: 42 })));

    assert!(Cli::try_parse_from(["autonomy-hooks", "session", "by-issue", "abc"]).is_err());
}

#[test]
fn test_run_version() {
    let output = run(Command::Version, "");
    assert_eq!(output.exit_code, ExitCode::SUCCESS);
    assert!(output.stderr[0].contains("autonomy-hooks"));
}

#[test]
fn test_user_prompt_submit_arms_session() {
    let dir = TempDir::new().unwrap();

    let output = run_with_settings(
        Command::UserPromptSubmit,
        r#"{"session_id": "S1", "prompt": "/issue-to-impl 123"}"#,
        &settings(dir.path()),
    );

    assert_eq!(output.exit_code, ExitCode::SUCCESS);
    assert!(output.stdout.is_empty());
    let raw = std::fs::read_to_string(paths::session_file(&paths::sessions_dir(dir.path()), "S1"))
        .unwrap();
    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(
        value,
        serde_json::json!({
            "workflow": "issue-to-impl",
            "state": "initial",
            "continuation_count": 0,
            "issue_no": 123
        })
    );
    let index = std::fs::read_to_string(paths::issue_file(&paths::sessions_dir(dir.path()), 123))
        .unwrap();
    let index: serde_json::Value = serde_json::from_str(&index).unwrap();
    assert_eq!(index, serde_json::json!({"session_id": "S1", "workflow": "issue-to-impl"}));
}

#[test]
fn test_user_prompt_submit_validation_failure() {
    let dir = TempDir::new().unwrap();

    let output =
        run_with_settings(Command::UserPromptSubmit, r#"{"prompt": "hi"}"#, &settings(dir.path()));

    assert_eq!(output.exit_code, ExitCode::from(1));
    assert_eq!(output.stdout, vec![r#"{"decision":"block","reason":"No session_id provided."}"#]);
}

#[test]
fn test_user_prompt_submit_disabled_ignores_garbage() {
    let dir = TempDir::new().unwrap();
    let disabled = Settings { enabled: false, ..settings(dir.path()) };

    let output = run_with_settings(Command::UserPromptSubmit, "not json", &disabled);

    assert_eq!(output.exit_code, ExitCode::SUCCESS);
    assert!(output.stdout.is_empty());
    assert!(output.stderr.is_empty());
}

#[test]
fn test_user_prompt_submit_invalid_json() {
    let dir = TempDir::new().unwrap();
    let output = run_with_settings(Command::UserPromptSubmit, "not json", &settings(dir.path()));

    assert_eq!(output.exit_code, ExitCode::SUCCESS);
    assert!(output.stdout.is_empty());
    assert!(output.stderr[0].contains("Error parsing hook input"));
}

#[test]
fn test_user_prompt_submit_store_failure() {
    let dir = TempDir::new().unwrap();
    // A file where the sessions directory would go.
    std::fs::create_dir_all(paths::tmp_dir(dir.path())).unwrap();
    std::fs::write(paths::sessions_dir(dir.path()), "").unwrap();

    let output = run_with_settings(
        Command::UserPromptSubmit,
        r#"{"session_id": "S1", "prompt": "/ultra-planner"}"#,
        &settings(dir.path()),
    );

    assert_eq!(output.exit_code, ExitCode::from(1));
    assert!(output.stdout.is_empty());
    assert!(output.stderr[0].contains("Error saving session state"));
}

#[test]
#[serial_test::serial]
fn test_stop_continues_then_halts_when_done() {
    let dir = TempDir::new().unwrap();
    let settings = settings(dir.path());
    run_with_settings(
        Command::UserPromptSubmit,
        r#"{"session_id": "S1", "prompt": "/ultra-planner add caching"}"#,
        &settings,
    );

    let output = run_with_settings(Command::Stop, r#"{"session_id": "S1"}"#, &settings);
    assert_eq!(output.exit_code, ExitCode::SUCCESS);
    assert_eq!(output.stdout.len(), 1);
    let decision: serde_json::Value = serde_json::from_str(&output.stdout[0]).unwrap();
    assert_eq!(decision["decision"], "block");
    assert!(decision["reason"].as_str().unwrap().contains("1/10"));

    let done = run_with_settings(
        Command::Session(SessionCommand::Done { id: "S1".to_string() }),
        "",
        &settings,
    );
    assert_eq!(done.exit_code, ExitCode::SUCCESS);

    let output = run_with_settings(Command::Stop, r#"{"session_id": "S1"}"#, &settings);
    assert!(output.stdout.is_empty());
    assert_eq!(store(dir.path()).get("S1").unwrap().unwrap().continuation_count, 1);
}

#[test]
fn test_stop_unknown_session_is_silent() {
    let dir = TempDir::new().unwrap();
    let output = run_with_settings(Command::Stop, r#"{"session_id": "nope"}"#, &settings(dir.path()));

    assert_eq!(output.exit_code, ExitCode::SUCCESS);
    assert!(output.stdout.is_empty());
    assert!(output.stderr.is_empty());
}

#[test]
fn test_stop_corrupt_record_allows_stop() {
    let dir = TempDir::new().unwrap();
    let store = store(dir.path());
    std::fs::create_dir_all(store.sessions_dir()).unwrap();
    std::fs::write(store.record_path("S1"), "{corrupt").unwrap();

    let output = run_with_settings(Command::Stop, r#"{"session_id": "S1"}"#, &settings(dir.path()));

    assert_eq!(output.exit_code, ExitCode::SUCCESS);
    assert!(output.stdout.is_empty());
    assert!(output.stderr[0].contains("Error in stop hook"));
}

#[test]
fn test_stop_invalid_json_allows_stop() {
    let dir = TempDir::new().unwrap();
    let output = run_with_settings(Command::Stop, "{", &settings(dir.path()));

    assert_eq!(output.exit_code, ExitCode::SUCCESS);
    assert!(output.stdout.is_empty());
}

#[test]
fn test_pre_tool_use_without_command_asks() {
    let dir = TempDir::new().unwrap();
    let output =
        run_with_settings(Command::PreToolUse, r#"{"tool_name": "Bash"}"#, &settings(dir.path()));

    assert_eq!(output.exit_code, ExitCode::SUCCESS);
    assert_eq!(
        output.stdout,
        vec![r#"{"hookSpecificOutput":{"hookEventName":"PreToolUse","permissionDecision":"ask"}}"#]
    );
}

#[test]
fn test_pre_tool_use_relays_command_decision() {
    let dir = TempDir::new().unwrap();
    let settings = Settings {
        permission_command: Some(
            r#"cat > /dev/null; echo '{"hookSpecificOutput":{"hookEventName":"PreToolUse","permissionDecision":"deny"}}'"#
                .to_string(),
        ),
        ..settings(dir.path())
    };

    let output = run_with_settings(Command::PreToolUse, r#"{"tool_name": "Bash"}"#, &settings);

    let value: serde_json::Value = serde_json::from_str(&output.stdout[0]).unwrap();
    assert_eq!(value["hookSpecificOutput"]["permissionDecision"], "deny");
}

#[test]
fn test_session_show() {
    let dir = TempDir::new().unwrap();
    let record = SessionRecord::armed(Workflow::IssueToImpl, Some(5));
    store(dir.path()).put("S1", &record).unwrap();

    let output = run_with_settings(
        Command::Session(SessionCommand::Show { id: "S1".to_string() }),
        "",
        &settings(dir.path()),
    );

    assert_eq!(output.exit_code, ExitCode::SUCCESS);
    let shown: SessionRecord = serde_json::from_str(&output.stdout[0]).unwrap();
    assert_eq!(shown, record);
}

#[test]
fn test_session_show_missing() {
    let dir = TempDir::new().unwrap();
    let output = run_with_settings(
        Command::Session(SessionCommand::Show { id: "S1".to_string() }),
        "",
        &settings(dir.path()),
    );
    assert_eq!(output.exit_code, ExitCode::from(1));
}

#[test]
fn test_session_show_rejects_path_ids() {
    let dir = TempDir::new().unwrap();
    let output = run_with_settings(
        Command::Session(SessionCommand::Show { id: "../secrets".to_string() }),
        "",
        &settings(dir.path()),
    );
    assert_eq!(output.exit_code, ExitCode::from(1));
}

#[test]
fn test_session_done_is_idempotent() {
    let dir = TempDir::new().unwrap();
    let store = store(dir.path());
    let mut record = SessionRecord::armed(Workflow::UltraPlanner, None);
    record.continuation_count = 3;
    store.put("S1", &record).unwrap();
    let done = Command::Session(SessionCommand::Done { id: "S1".to_string() });

    let first = run_with_settings(done.clone(), "", &settings(dir.path()));
    let second = run_with_settings(done, "", &settings(dir.path()));

    assert_eq!(first.exit_code, ExitCode::SUCCESS);
    assert_eq!(second.exit_code, ExitCode::SUCCESS);
    assert!(second.stdout[0].contains("already done"));
    let stored = store.get("S1").unwrap().unwrap();
    assert_eq!(stored.state, SessionPhase::Done);
    assert_eq!(stored.continuation_count, 3);
}

#[test]
fn test_session_done_missing_record() {
    let dir = TempDir::new().unwrap();
    let output = run_with_settings(
        Command::Session(SessionCommand::Done { id: "S1".to_string() }),
        "",
        &settings(dir.path()),
    );
    assert_eq!(output.exit_code, ExitCode::from(1));
    assert!(!paths::session_file(&paths::sessions_dir(dir.path()), "S1").exists());
}

#[test]
fn test_session_by_issue() {
    let dir = TempDir::new().unwrap();
    let settings = settings(dir.path());
    run_with_settings(
        Command::UserPromptSubmit,
        r#"{"session_id": "S7", "prompt": "/ultra-planner --refine 88"}"#,
        &settings,
    );

    let output =
        run_with_settings(Command::Session(SessionCommand::ByIssue { issue: 88 }), "", &settings);
    assert_eq!(output.exit_code, ExitCode::SUCCESS);
    let value: serde_json::Value = serde_json::from_str(&output.stdout[0]).unwrap();
    assert_eq!(value["session_id"], "S7");
    assert_eq!(value["workflow"], "ultra-planner");

    let missing =
        run_with_settings(Command::Session(SessionCommand::ByIssue { issue: 89 }), "", &settings);
    assert_eq!(missing.exit_code, ExitCode::from(1));
}

#[test]
fn test_session_by_issue_corrupt_index() {
    let dir = TempDir::new().unwrap();
    let settings = settings(dir.path());
    let index_file = paths::issue_file(&settings.sessions_dir(), 88);
    std::fs::create_dir_all(index_file.parent().unwrap()).unwrap();
    std::fs::write(&index_file, "{not json").unwrap();

    let output =
        run_with_settings(Command::Session(SessionCommand::ByIssue { issue: 88 }), "", &settings);

    assert_eq!(output.exit_code, ExitCode::from(1));
    assert!(output.stdout.is_empty());
    assert!(output.stderr[0].contains("Error reading issue index for #88"), "{:?}", output.stderr);
}

#[test]
fn test_hook_events_are_logged_when_debugging() {
    let dir = TempDir::new().unwrap();
    let settings = Settings { debug: true, ..settings(dir.path()) };

    run_with_settings(Command::Stop, r#"{"session_id": "S1"}"#, &settings);

    let log = std::fs::read_to_string(paths::debug_log_file(dir.path())).unwrap();
    let first: serde_json::Value = serde_json::from_str(log.lines().next().unwrap()).unwrap();
    assert_eq!(first["hook"], "stop");
    assert_eq!(first["event"]["session_id"], "S1");
}
