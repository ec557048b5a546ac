//! Continuation prompt registry.
//!
//! Maps each workflow to the template that renders its continuation prompt.

use crate::error::Result;
use crate::session::Workflow;
use crate::templates;
use serde::Serialize;
use std::path::Path;
use tera::Context;

/// Everything a continuation prompt may refer to.
#[derive(Debug, Clone, Serialize)]
pub struct PromptContext {
    /// Continuation number being issued (after increment).
    pub continuation_count: u32,
    /// The continuation budget.
    pub max_continuations: u32,
    /// The session being continued.
    pub session_id: String,
    /// Path of the session record, for the agent to mark it done. Unquoted;
    /// templates pass it through `shell_quote`.
    pub session_file: String,
    /// Tracker issue the session targets, if known.
    pub issue_no: Option<u64>,
}

/// Template name for a workflow's continuation prompt.
#[must_use]
pub const fn template_for(workflow: &Workflow) -> Option<&'static str> {
    match workflow {
        Workflow::UltraPlanner => Some("prompts/ultra_planner.tera"),
        Workflow::IssueToImpl => Some("prompts/issue_to_impl.tera"),
        Workflow::None | Workflow::Other(_) => None,
    }
}

/// Render the continuation prompt for a workflow, preferring templates found
/// in `templates_dir` over the built-in ones.
///
/// Returns `Ok(None)` for workflows without a prompt.
///
/// # Errors
///
/// Returns an error if the template fails to render.
pub fn render_continuation_prompt(
    workflow: &Workflow,
    context: &PromptContext,
    templates_dir: &Path,
) -> Result<Option<String>> {
    let Some(name) = template_for(workflow) else {
        return Ok(None);
    };
    let ctx = Context::from_serialize(context)
        .map_err(|e| crate::error::Error::Template(e.to_string()))?;
    let rendered = templates::render(templates_dir, name, &ctx)?;
    Ok(Some(rendered.trim().to_string()))
}
