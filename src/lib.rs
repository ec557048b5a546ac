//! # `autonomy_hooks`
//!
//! Claude Code hooks that keep a hands-off workflow session going: a
//! prompt-submit hook arms a session when the user starts a workflow, and a
//! stop hook resumes the agent with a workflow-specific prompt until the
//! session is done or its continuation budget runs out.

#[cfg(feature = "cli")]
pub mod cli;
pub mod command;
pub mod config;
pub mod error;
pub mod hook_logging;
pub mod hooks;
pub mod instruction;
pub mod paths;
pub mod prompts;
pub mod session;
pub mod store;
pub mod templates;
pub mod testing;
pub mod traits;
pub mod transcript;

pub use command::RealCommandRunner;
pub use error::{Error, Result};
pub use traits::{CommandOutput, CommandRunner};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
