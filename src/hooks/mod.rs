//! Hook implementations for Claude Code.

mod pre_tool_use;
mod stop;
mod user_prompt_submit;

pub use pre_tool_use::run_pre_tool_use;
pub use stop::{decide_stop, run_stop_hook, StopOutcome};
pub use user_prompt_submit::{run_user_prompt_submit_hook, PromptOutcome};

use crate::error::Result;
use serde::{Deserialize, Serialize};

/// Input provided to hooks by Claude Code.
///
/// Every field is optional at parse time; each hook validates what it needs.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct HookInput {
    /// The session the event belongs to.
    #[serde(default)]
    pub session_id: Option<String>,
    /// Path to the transcript file (stop events).
    #[serde(default)]
    pub transcript_path: Option<String>,
    /// The user's instruction (prompt-submit events).
    #[serde(default)]
    pub prompt: Option<String>,
}

impl HookInput {
    /// The session id, treating an empty string as absent.
    #[must_use]
    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref().filter(|s| !s.is_empty())
    }

    /// The prompt, treating an empty string as absent.
    #[must_use]
    pub fn prompt(&self) -> Option<&str> {
        self.prompt.as_deref().filter(|s| !s.is_empty())
    }
}

/// A decision that keeps the agent going (stop hook) or rejects the
/// instruction (prompt-submit hook). The host reads `reason` as the next
/// instruction or the error to show.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockDecision {
    /// Always `"block"`.
    pub decision: String,
    /// The resume prompt or the validation message.
    pub reason: String,
}

impl BlockDecision {
    /// Create a block decision.
    pub fn new(reason: impl Into<String>) -> Self {
        Self { decision: "block".to_string(), reason: reason.into() }
    }

    /// Serialize to the single-line JSON the host expects on stdout.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Output from a `PreToolUse` hook.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreToolUseOutput {
    /// Hook-specific output.
    #[serde(rename = "hookSpecificOutput")]
    pub hook_specific_output: HookSpecificOutput,
}

/// Hook-specific output for `PreToolUse`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HookSpecificOutput {
    /// The hook event name.
    #[serde(rename = "hookEventName")]
    pub hook_event_name: String,
    /// The permission decision.
    #[serde(rename = "permissionDecision")]
    pub permission_decision: String,
    /// Why the decision was taken.
    #[serde(
        rename = "permissionDecisionReason",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub permission_decision_reason: Option<String>,
}

/// Permission decisions the host understands.
const PERMISSION_DECISIONS: &[&str] = &["allow", "deny", "ask"];

impl PreToolUseOutput {
    /// Create an "ask" response: defer to the human.
    pub fn ask() -> Self {
        Self {
            hook_specific_output: HookSpecificOutput {
                hook_event_name: "PreToolUse".to_string(),
                permission_decision: "ask".to_string(),
                permission_decision_reason: None,
            },
        }
    }

    /// Whether this is a well-formed `PreToolUse` decision.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.hook_specific_output.hook_event_name == "PreToolUse"
            && PERMISSION_DECISIONS.contains(&self.hook_specific_output.permission_decision.as_str())
    }
}

/// Parse hook input from stdin.
///
/// # Errors
///
/// Returns an error if the input cannot be parsed as JSON.
pub fn parse_hook_input(input: &str) -> Result<HookInput> {
    if input.trim().is_empty() {
        return Ok(HookInput::default());
    }
    let parsed: HookInput = serde_json::from_str(input)?;
    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hook_input_empty() {
        let input = parse_hook_input("").unwrap();
        assert!(input.session_id.is_none());
        assert!(input.transcript_path.is_none());
    }

    #[test]
    fn test_parse_prompt_submit_input() {
        let input =
            parse_hook_input(r#"{"session_id": "S1", "prompt": "/issue-to-impl 123"}"#).unwrap();
        assert_eq!(input.session_id(), Some("S1"));
        assert_eq!(input.prompt(), Some("/issue-to-impl 123"));
    }

    #[test]
    fn test_parse_stop_input_ignores_extra_fields() {
        let input = parse_hook_input(
            r#"{"session_id": "S1", "transcript_path": "/tmp/t.jsonl", "hook_event_name": "Stop", "stop_hook_active": false}"#,
        )
        .unwrap();
        assert_eq!(input.session_id(), Some("S1"));
        assert_eq!(input.transcript_path.as_deref(), Some("/tmp/t.jsonl"));
    }

    #[test]
    fn test_empty_strings_are_absent() {
        let input = parse_hook_input(r#"{"session_id": "", "prompt": ""}"#).unwrap();
        assert!(input.session_id().is_none());
        assert!(input.prompt().is_none());
    }

    #[test]
    fn test_parse_hook_input_invalid_json() {
        assert!(parse_hook_input("{not json").is_err());
    }

    #[test]
    fn test_block_decision_json() {
        let json = BlockDecision::new("keep going").to_json().unwrap();
        assert_eq!(json, r#"{"decision":"block","reason":"keep going"}"#);
    }

    #[test]
    fn test_pre_tool_use_ask() {
        let output = PreToolUseOutput::ask();
        let json = serde_json::to_string(&output).unwrap();
        assert_eq!(
            json,
            r#"{"hookSpecificOutput":{"hookEventName":"PreToolUse","permissionDecision":"ask"}}"#
        );
        assert!(output.is_valid());
    }

    #[test]
    fn test_pre_tool_use_validity() {
        let parsed: PreToolUseOutput = serde_json::from_str(
            r#"{"hookSpecificOutput": {"hookEventName": "PreToolUse", "permissionDecision": "allow", "permissionDecisionReason": "read-only"}}"#,
        )
        .unwrap();
        assert!(parsed.is_valid());

        let bogus: PreToolUseOutput = serde_json::from_str(
            r#"{"hookSpecificOutput": {"hookEventName": "PreToolUse", "permissionDecision": "maybe"}}"#,
        )
        .unwrap();
        assert!(!bogus.is_valid());
    }
}
