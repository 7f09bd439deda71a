// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Error taxonomy and exit codes.
//!
//! Every way a run can end maps to one stable exit code, so whatever monitors
//! synchome can tell failures apart without parsing messages.
//!
//! | Code | Meaning                                             |
//! |------|-----------------------------------------------------|
//! | 0    | success                                             |
//! | 1-3  | passed through from sync tool                       |
//! | 11   | could not determine console user                    |
//! | 12   | user not allowed to sync                            |
//! | 13   | sync destination missing                            |
//! | 14   | invalid sync target name                            |
//! | 15   | template or profile file not found                  |
//! | 16   | insufficient file permissions                       |
//! | 99   | unclassified error                                  |

use crate::{
    config::ConfigError,
    profile::ProfileError,
    sync::SyncError,
    template::TemplateError,
    user::LookupError,
};

use std::{
    error::Error as StdError,
    fmt::{Display, Formatter, Result as FmtResult},
    io::ErrorKind as IoErrorKind,
    path::PathBuf,
};

/// All possible reasons for a run to fail.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Console is not owned by a logged-in user.
    #[error("could not determine running user, got: {name:?} ({uid})")]
    UnknownRunningUser { name: String, uid: u32 },

    /// Console owner cannot be looked up at all.
    #[error(transparent)]
    ConsoleUser(#[from] LookupError),

    /// Console user is refused by eligibility policy.
    #[error("sync should not run for user: {name} ({uid})")]
    UserSyncNotAllowed { name: String, uid: u32 },

    /// Sync destination directory does not exist.
    #[error("target sync directory does not exist: {:?}", path.display())]
    MissingSyncTarget { path: PathBuf },

    /// Syncing a target fails.
    #[error(transparent)]
    Sync(#[from] SyncError),

    /// Settings cannot be loaded.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl Error {
    /// Classify error into most specific kind.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::UnknownRunningUser { .. } | Self::ConsoleUser(_) => {
                ErrorKind::UnknownRunningUser
            }
            Self::UserSyncNotAllowed { .. } => ErrorKind::UserSyncNotAllowed,
            Self::MissingSyncTarget { .. } => ErrorKind::MissingSyncTarget,
            Self::Sync(error) => sync_kind(error),
            Self::Config(_) => ErrorKind::Unclassified,
        }
    }

    /// Process exit code for error.
    pub fn exit_code(&self) -> i32 {
        self.kind().exit_code()
    }
}

fn sync_kind(error: &SyncError) -> ErrorKind {
    match error {
        SyncError::InvalidTarget(_) => ErrorKind::InvalidSyncTarget,
        SyncError::Failure { code, .. } => ErrorKind::SyncFailure(*code),
        SyncError::Spawn { .. } => ErrorKind::Unclassified,
        SyncError::Profile(error) => match error {
            ProfileError::Template(TemplateError::NotFound { .. })
            | ProfileError::ConfigurationNotFound { .. } => ErrorKind::ConfigurationNotFound,
            ProfileError::Template(TemplateError::Unreadable { source, .. })
                if source.kind() == IoErrorKind::PermissionDenied =>
            {
                ErrorKind::InsufficientFilePermissions
            }
            ProfileError::InsufficientFilePermissions { .. } => {
                ErrorKind::InsufficientFilePermissions
            }
            ProfileError::Template(TemplateError::Unreadable { .. }) | ProfileError::Io { .. } => {
                ErrorKind::Unclassified
            }
        },
    }
}

/// Stable classification of run failures.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum ErrorKind {
    UnknownRunningUser,
    UserSyncNotAllowed,
    MissingSyncTarget,
    InvalidSyncTarget,
    ConfigurationNotFound,
    InsufficientFilePermissions,
    SyncFailure(i32),
    Unclassified,
}

impl ErrorKind {
    /// Process exit code for kind.
    pub fn exit_code(self) -> i32 {
        match self {
            Self::UnknownRunningUser => 11,
            Self::UserSyncNotAllowed => 12,
            Self::MissingSyncTarget => 13,
            Self::InvalidSyncTarget => 14,
            Self::ConfigurationNotFound => 15,
            Self::InsufficientFilePermissions => 16,
            Self::SyncFailure(code) => code,
            Self::Unclassified => 99,
        }
    }
}

/// Terminal result of a run.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct ExitOutcome {
    /// Process exit code.
    pub code: i32,

    /// Human readable summary.
    pub message: String,
}

impl ExitOutcome {
    /// Outcome of run that synced every target.
    pub fn success() -> Self {
        Self {
            code: 0,
            message: "sync completed for all targets".into(),
        }
    }

    /// Check if outcome is success.
    pub fn is_success(&self) -> bool {
        self.code == 0
    }

    /// Write failure message to `out`.
    ///
    /// Nothing is written for a successful outcome. Log filtering never
    /// applies here, so a failed run always explains itself.
    ///
    /// # Errors
    ///
    /// - Return [`std::io::Error`] if `out` cannot be written.
    pub fn write_to(&self, mut out: impl std::io::Write) -> std::io::Result<()> {
        if self.is_success() {
            return Ok(());
        }

        writeln!(out, "{}", self.message)
    }
}

impl From<&Error> for ExitOutcome {
    fn from(error: &Error) -> Self {
        // INVARIANT: Append every underlying cause so I/O reasons are not lost.
        let mut message = error.to_string();
        let mut source = error.source();
        while let Some(cause) = source {
            let cause_message = cause.to_string();
            if !message.ends_with(&cause_message) {
                message.push_str(": ");
                message.push_str(&cause_message);
            }
            source = cause.source();
        }

        Self {
            code: error.exit_code(),
            message,
        }
    }
}

impl Display for ExitOutcome {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        write!(fmt, "{} (exit code {})", self.message, self.code)
    }
}

/// Friendly result alias :3
pub type Result<T, E = Error> = std::result::Result<T, E>;
