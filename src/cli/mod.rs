//! Command-line interface for autonomy-hooks.
//!
//! The hook subcommands are what Claude Code invokes; the `session`
//! subcommands let an operator (or the agent itself) inspect and finish
//! hands-off sessions.

mod run;
mod session;

#[cfg(test)]
mod tests;

pub use run::{run, run_with_settings, CliOutput};
pub use session::SessionCommand;

use clap::{Parser, Subcommand};

/// Hands-off continuation hooks for Claude Code.
///
/// With `AUTONOMY_MODE` on, `/ultra-planner` and `/issue-to-impl` sessions
/// are resumed automatically each time the agent stops, up to
/// `AUTONOMY_MAX_CONTINUATIONS` times or until the session is marked done.
#[derive(Parser, Debug)]
#[command(name = "autonomy-hooks")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Top-level commands.
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Inspect and finish hands-off sessions.
    #[command(subcommand)]
    Session(SessionCommand),

    /// Show version information.
    Version,

    // === Hook Commands (receive JSON from stdin) ===
    /// Run the stop hook (stdin: JSON hook input).
    ///
    /// Not intended for direct use.
    #[command(hide = true)]
    Stop,

    /// Run the user prompt submit hook (stdin: JSON hook input).
    ///
    /// Not intended for direct use.
    #[command(name = "user-prompt-submit", hide = true)]
    UserPromptSubmit,

    /// Run the pre-tool-use hook (stdin: JSON hook input).
    ///
    /// Not intended for direct use.
    #[command(name = "pre-tool-use", hide = true)]
    PreToolUse,
}

impl Command {
    /// Returns true if this command requires stdin input.
    #[must_use]
    pub const fn needs_stdin(&self) -> bool {
        self.is_hook()
    }

    /// Returns true if this is a hook command (invoked by Claude Code).
    #[must_use]
    pub const fn is_hook(&self) -> bool {
        matches!(self, Self::Stop | Self::PreToolUse | Self::UserPromptSubmit)
    }

    /// Returns the hook type name for logging, or None for non-hook commands.
    #[must_use]
    pub const fn hook_type(&self) -> Option<&'static str> {
        match self {
            Self::Stop => Some("stop"),
            Self::UserPromptSubmit => Some("user-prompt-submit"),
            Self::PreToolUse => Some("pre-tool-use"),
            Self::Session(_) | Self::Version => None,
        }
    }
}
