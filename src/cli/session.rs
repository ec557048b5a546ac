//! Session CLI subcommands.

use clap::Subcommand;

/// Session management commands.
///
/// Records live under `<AUTONOMY_HOME>/.tmp/hooked-sessions/`. Marking a
/// session done is how a finished workflow stops being resumed:
///
/// ```bash
/// autonomy-hooks session done <session-id>
/// ```
#[derive(Subcommand, Debug, Clone)]
pub enum SessionCommand {
    /// Print a session record as JSON.
    Show {
        /// Session ID
        id: String,
    },

    /// Mark a session done so it is no longer continued.
    ///
    /// Safe to run more than once.
    Done {
        /// Session ID
        id: String,
    },

    /// Find the session most recently armed for a tracker issue.
    #[command(name = "by-issue")]
    ByIssue {
        /// Issue number
        issue: u64,
    },
}
