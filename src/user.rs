// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Console user resolution.
//!
//! Synchome always acts on behalf of whoever owns the active console session,
//! not whoever happened to start the process. The console device is owned by
//! the logged-in user, so its ownership tells us who that is.

use nix::{
    errno::Errno,
    sys::stat::lstat,
    unistd::{Uid, User},
};
use std::path::{Path, PathBuf};
use tracing::{debug, instrument};

/// Identity of the user that synchome runs for.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct UserIdentity {
    /// Login name.
    pub name: String,

    /// Numeric user id.
    pub uid: u32,

    /// Numeric group id.
    pub gid: u32,
}

impl UserIdentity {
    /// Construct new user identity.
    pub fn new(name: impl Into<String>, uid: u32, gid: u32) -> Self {
        Self {
            name: name.into(),
            uid,
            gid,
        }
    }
}

/// Layer of indirection for console user lookup.
pub trait ConsoleUser {
    /// Determine user owning active console session.
    fn current_user(&self) -> Result<UserIdentity>;
}

/// Console user lookup through ownership of console device.
#[derive(Debug, Clone)]
pub struct DevConsole {
    device: PathBuf,
}

impl DevConsole {
    /// Construct new lookup on given console device.
    pub fn new(device: impl Into<PathBuf>) -> Self {
        Self {
            device: device.into(),
        }
    }

    /// Console device being inspected.
    pub fn device(&self) -> &Path {
        self.device.as_path()
    }
}

impl Default for DevConsole {
    fn default() -> Self {
        Self::new("/dev/console")
    }
}

impl ConsoleUser for DevConsole {
    /// Resolve owner of console device through password database.
    ///
    /// The group id reported is that of the console device, not the user's
    /// primary group.
    ///
    /// # Errors
    ///
    /// - Return [`LookupError::Stat`] if console device cannot be inspected.
    /// - Return [`LookupError::Passwd`] if password database lookup fails.
    /// - Return [`LookupError::NoSuchUser`] if owner has no password entry.
    #[instrument(skip(self), level = "debug")]
    fn current_user(&self) -> Result<UserIdentity> {
        let stat = lstat(self.device()).map_err(|source| LookupError::Stat {
            source,
            device: self.device.clone(),
        })?;
        debug!(
            "console device {:?} owned by {}:{}",
            self.device().display(),
            stat.st_uid,
            stat.st_gid
        );

        let user = User::from_uid(Uid::from_raw(stat.st_uid))
            .map_err(|source| LookupError::Passwd {
                source,
                uid: stat.st_uid,
            })?
            .ok_or(LookupError::NoSuchUser { uid: stat.st_uid })?;

        Ok(UserIdentity::new(user.name, stat.st_uid, stat.st_gid))
    }
}

/// Console user lookup error types.
#[derive(Debug, thiserror::Error)]
pub enum LookupError {
    /// Console device cannot be inspected.
    #[error("failed to inspect console device at {:?}", device.display())]
    Stat {
        #[source]
        source: Errno,
        device: PathBuf,
    },

    /// Password database lookup fails.
    #[error("failed to look up user id {uid}")]
    Passwd {
        #[source]
        source: Errno,
        uid: u32,
    },

    /// Console owner has no entry in the password database.
    #[error("no user with id {uid}")]
    NoSuchUser { uid: u32 },
}

/// Friendly result alias :3
pub type Result<T, E = LookupError> = std::result::Result<T, E>;
