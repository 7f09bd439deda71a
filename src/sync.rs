// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Sync tool invocation.
//!
//! Synchome never transfers files itself. For each target it prepares a fresh
//! profile, then hands the target name to the external sync tool, and reports
//! whatever the tool says.
//!
//! # Exit Codes
//!
//! The sync tool's own exit codes carry meaning for operators, e.g., Unison
//! uses 1 for skipped files, 2 for non-fatal transfer failures, and 3 for
//! fatal errors or interruption. A failing tool's code is passed through
//! untouched. A tool killed by a signal has no code of its own and is
//! reported as [`INTERRUPTED_EXIT_CODE`].

use crate::{
    config::{Settings, SyncTarget},
    profile::{GeneratedProfile, ProfileWriter},
};

use std::{
    ffi::OsStr,
    path::{Path, PathBuf},
    process::Command,
};
use tracing::{debug, info, instrument};

/// Exit code reported when sync tool terminates without one.
pub const INTERRUPTED_EXIT_CODE: i32 = 3;

/// Completed sync tool process.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct ToolRun {
    /// Exit code, if process exited normally.
    pub code: Option<i32>,

    /// Standard output followed by standard error.
    pub output: String,
}

impl ToolRun {
    /// Check if process exited successfully.
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

/// Layer of indirection for sync tool invocation.
pub trait SyncTool {
    /// Path of sync tool binary.
    fn program(&self) -> &Path;

    /// Run sync tool for target, blocking until it completes.
    ///
    /// # Errors
    ///
    /// Return I/O error if the tool cannot be started at all.
    fn run(&self, target: &SyncTarget, extra_args: &[String]) -> std::io::Result<ToolRun>;
}

impl<T> SyncTool for &T
where
    T: SyncTool + ?Sized,
{
    fn program(&self) -> &Path {
        (**self).program()
    }

    fn run(&self, target: &SyncTarget, extra_args: &[String]) -> std::io::Result<ToolRun> {
        (**self).run(target, extra_args)
    }
}

/// Unison sync tool run as subprocess.
#[derive(Debug, Clone)]
pub struct Unison {
    program: PathBuf,
}

impl Unison {
    /// Construct new Unison runner.
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl SyncTool for Unison {
    fn program(&self) -> &Path {
        self.program.as_path()
    }

    fn run(&self, target: &SyncTarget, extra_args: &[String]) -> std::io::Result<ToolRun> {
        syscall_non_interactive(
            &self.program,
            std::iter::once(target.as_str()).chain(extra_args.iter().map(String::as_str)),
        )
    }
}

/// Outcome of successful sync of one target.
#[derive(Debug)]
pub struct SyncReport {
    /// Target that was synced.
    pub target: SyncTarget,

    /// Profile generated for the sync.
    pub profile: GeneratedProfile,

    /// Output of sync tool.
    pub output: String,
}

/// Run sync tool against configured targets.
#[derive(Debug)]
pub struct SyncInvoker<'a, T>
where
    T: SyncTool,
{
    settings: &'a Settings,
    tool: &'a T,
}

impl<'a, T> SyncInvoker<'a, T>
where
    T: SyncTool,
{
    /// Construct new sync invoker.
    pub fn new(settings: &'a Settings, tool: &'a T) -> Self {
        Self { settings, tool }
    }

    /// Sync target named `target` for user.
    ///
    /// Target name is validated before any file is touched.
    ///
    /// # Errors
    ///
    /// - Return [`SyncError::InvalidTarget`] if target is not configured.
    /// - Return [`SyncError::Profile`] if profile cannot be generated.
    /// - Return [`SyncError::Spawn`] if sync tool cannot be started.
    /// - Return [`SyncError::Failure`] if sync tool exits unsuccessfully.
    #[instrument(skip(self), level = "debug")]
    pub fn run_sync(&self, username: &str, target: &str) -> Result<SyncReport> {
        let target = self
            .settings
            .sync
            .target(target)
            .ok_or_else(|| SyncError::InvalidTarget(target.to_string()))?;

        let profile = ProfileWriter::new(self.settings).generate(username, target)?;

        let extra_args = &self.settings.sync.extra_args;
        let command = render_command(self.tool.program(), target, extra_args);
        info!("run {command}");
        let run = self
            .tool
            .run(target, extra_args)
            .map_err(|source| SyncError::Spawn {
                source,
                program: self.tool.program().to_path_buf(),
            })?;

        if !run.success() {
            return Err(SyncError::Failure {
                code: run.code.unwrap_or(INTERRUPTED_EXIT_CODE),
                command,
                output: run.output,
            });
        }

        debug!("{}", run.output);
        Ok(SyncReport {
            target: target.clone(),
            profile,
            output: run.output,
        })
    }
}

fn render_command(program: &Path, target: &SyncTarget, extra_args: &[String]) -> String {
    let mut command = format!("{} {target}", program.display());
    for arg in extra_args {
        command.push(' ');
        command.push_str(arg);
    }

    command
}

fn syscall_non_interactive(
    cmd: impl AsRef<OsStr>,
    args: impl IntoIterator<Item = impl AsRef<OsStr>>,
) -> std::io::Result<ToolRun> {
    let output = Command::new(cmd.as_ref()).args(args).output()?;
    let mut message = String::from_utf8_lossy(output.stdout.as_slice()).into_owned();
    message.push_str(String::from_utf8_lossy(output.stderr.as_slice()).as_ref());

    // INVARIANT: Chomp trailing newlines.
    let message = message.trim_end_matches(['\r', '\n']).to_string();

    Ok(ToolRun {
        code: output.status.code(),
        output: message,
    })
}

/// Sync invocation error types.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    /// Target is not one of the configured targets.
    #[error("not a valid sync target: {0}")]
    InvalidTarget(String),

    /// Profile cannot be generated.
    #[error(transparent)]
    Profile(#[from] crate::profile::ProfileError),

    /// Sync tool cannot be started.
    #[error("failed to run sync tool {:?}", program.display())]
    Spawn {
        #[source]
        source: std::io::Error,
        program: PathBuf,
    },

    /// Sync tool exits unsuccessfully.
    #[error("sync tool `{command}` returned error {code}:\n{output}")]
    Failure {
        code: i32,
        command: String,
        output: String,
    },
}

/// Friendly result alias :3
pub type Result<T, E = SyncError> = std::result::Result<T, E>;
