//! Template loading and rendering using Tera.
//!
//! Continuation prompts are kept in template files, embedded into the binary
//! as fallbacks for when a templates directory doesn't exist.
//!
//! Templates that splice values into shell commands use the `shell_quote`
//! filter.

use crate::error::{Error, Result};
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::path::Path;
use std::sync::RwLock;
use tera::{Context, Tera, Value};

/// Embedded default templates for fallback when files don't exist.
static EMBEDDED_TEMPLATES: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    let mut m = HashMap::new();

    m.insert(
        "prompts/ultra_planner.tera",
        include_str!("../templates/prompts/ultra_planner.tera"),
    );
    m.insert(
        "prompts/issue_to_impl.tera",
        include_str!("../templates/prompts/issue_to_impl.tera"),
    );

    m
});

/// Global template engine with caching.
static TERA: Lazy<RwLock<Option<Tera>>> = Lazy::new(|| RwLock::new(None));

/// Quote a string as a single POSIX shell word.
#[must_use]
pub fn shell_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', r"'\''"))
}

fn shell_quote_filter(value: &Value, _args: &HashMap<String, Value>) -> tera::Result<Value> {
    let raw = value
        .as_str()
        .ok_or_else(|| tera::Error::msg("shell_quote expects a string"))?;
    Ok(Value::String(shell_quote(raw)))
}

/// Initialize the template engine with templates from the specified directory.
///
/// If the directory doesn't exist, templates will be loaded from embedded defaults.
/// Files in the directory override embedded templates of the same name.
///
/// # Errors
///
/// Returns an error if the templates directory exists but contains invalid
/// templates, or an embedded template fails to parse.
pub fn init_templates(dir: &Path) -> Result<()> {
    let mut tera = Tera::default();

    if dir.exists() {
        let glob_pattern = format!("{}/**/*.tera", dir.display());
        tera = Tera::new(&glob_pattern).map_err(|e| {
            Error::Template(format!("Failed to load templates from {}: {e}", dir.display()))
        })?;
    }

    tera.register_filter("shell_quote", shell_quote_filter);

    for (name, content) in EMBEDDED_TEMPLATES.iter() {
        if tera.get_template(name).is_err() {
            tera.add_raw_template(name, content)
                .map_err(|e| Error::Template(format!("Embedded template {name}: {e}")))?;
        }
    }

    *TERA.write().map_err(|e| Error::Template(e.to_string()))? = Some(tera);

    Ok(())
}

/// Render a template with the given context.
///
/// Templates are lazy-loaded from `templates_dir` on first use.
///
/// # Errors
///
/// Returns an error if the template doesn't exist or rendering fails.
pub fn render(templates_dir: &Path, name: &str, context: &Context) -> Result<String> {
    let needs_init = TERA.read().map_err(|e| Error::Template(e.to_string()))?.is_none();

    if needs_init {
        init_templates(templates_dir)?;
    }

    let guard = TERA.read().map_err(|e| Error::Template(e.to_string()))?;
    let tera = guard.as_ref().ok_or_else(|| Error::Template("Templates not initialized".into()))?;
    let rendered = tera
        .render(name, context)
        .map_err(|e| Error::Template(format!("Failed to render template {name}: {e}")))?;
    drop(guard);

    Ok(rendered)
}

/// Reset the template cache, forcing re-initialization on next use.
///
/// # Errors
///
/// Returns an error if the write lock cannot be acquired.
pub fn reset_cache() -> Result<()> {
    *TERA.write().map_err(|e| Error::Template(e.to_string()))? = None;
    Ok(())
}

/// Get the list of all embedded template names.
#[must_use]
pub fn embedded_template_names() -> Vec<&'static str> {
    EMBEDDED_TEMPLATES.keys().copied().collect()
}

/// Verify all embedded templates can be rendered with sample data.
///
/// # Errors
///
/// Returns an error if any template fails to render.
pub fn verify_all_templates() -> Result<()> {
    reset_cache()?;
    let builtin_only = Path::new("/nonexistent");
    init_templates(builtin_only)?;

    let ctx = sample_context();
    for name in embedded_template_names() {
        render(builtin_only, name, &ctx)
            .map_err(|e| Error::Template(format!("Template {name} failed to render: {e}")))?;
    }

    Ok(())
}

/// A context with every variable the prompt templates use.
fn sample_context() -> Context {
    let mut ctx = Context::new();
    ctx.insert("continuation_count", &3_u32);
    ctx.insert("max_continuations", &10_u32);
    ctx.insert("session_id", "0b6c1f2e-sample");
    ctx.insert("session_file", ".tmp/hooked-sessions/0b6c1f2e-sample.json");
    ctx.insert("issue_no", &42_u64);
    ctx
}
