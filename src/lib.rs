// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Per-user home synchronization for shared workstations.
//!
//! Synchome figures out who is logged in at the console, checks that they may
//! sync, generates a personalized Unison profile for every configured target
//! from shared and target-specific templates, and then runs Unison once per
//! target. Every failure maps to a stable exit code through [`ExitOutcome`].
//!
//! # See Also
//!
//! 1. [`Orchestrator`]
//! 2. [`Settings`]
//! 3. [Unison](https://github.com/bcpierce00/unison)

pub mod config;
pub mod error;
pub mod orchestrate;
pub mod path;
pub mod policy;
pub mod profile;
pub mod sync;
pub mod template;
pub mod user;

pub use config::{Settings, SyncTarget};
pub use error::{Error, ErrorKind, ExitOutcome};
pub use orchestrate::Orchestrator;
pub use sync::{SyncInvoker, SyncTool, ToolRun, Unison};
pub use user::{ConsoleUser, DevConsole, UserIdentity};
