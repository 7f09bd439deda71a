// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Sync orchestration.
//!
//! A run moves through a fixed sequence of stages:
//!
//! 1. Resolve the console user.
//! 2. Check that the user is eligible for sync.
//! 3. Check that the user's sync destination exists.
//! 4. Sync every configured target in order.
//!
//! The first failure ends the run. Targets after a failing target are never
//! attempted, and nothing is retried. Operators re-run the whole tool.

use crate::{
    config::Settings,
    error::{Error, Result},
    path::sync_destination,
    policy::{is_eligible, is_unknown_user},
    sync::{SyncInvoker, SyncReport, SyncTool, Unison},
    user::{ConsoleUser, DevConsole, UserIdentity},
};

use std::path::PathBuf;
use tracing::{debug, info, instrument};

/// Drive a full sync run for the console user.
#[derive(Debug)]
pub struct Orchestrator<U = DevConsole, T = Unison>
where
    U: ConsoleUser,
    T: SyncTool,
{
    settings: Settings,
    console: U,
    tool: T,
}

impl Orchestrator {
    /// Construct orchestrator for the real console and sync tool.
    pub fn from_settings(settings: Settings) -> Self {
        let tool = Unison::new(settings.sync.program.clone());
        Self::new(settings, DevConsole::default(), tool)
    }
}

impl<U, T> Orchestrator<U, T>
where
    U: ConsoleUser,
    T: SyncTool,
{
    /// Construct new orchestrator.
    pub fn new(settings: Settings, console: U, tool: T) -> Self {
        Self {
            settings,
            console,
            tool,
        }
    }

    /// Settings the orchestrator runs with.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Sync every configured target for the console user.
    ///
    /// Returns one report per target, in execution order.
    ///
    /// # Errors
    ///
    /// - Return [`Error::UnknownRunningUser`] or [`Error::ConsoleUser`] if
    ///   the console user cannot be determined.
    /// - Return [`Error::UserSyncNotAllowed`] if the user is not eligible.
    /// - Return [`Error::MissingSyncTarget`] if the sync destination is
    ///   missing.
    /// - Return [`Error::Sync`] for the first target that fails.
    #[instrument(skip(self), level = "debug")]
    pub fn run(&self) -> Result<Vec<SyncReport>> {
        let user = self.resolve_user()?;
        self.validate_eligibility(&user)?;
        self.validate_destination(&user)?;

        let invoker = SyncInvoker::new(&self.settings, &self.tool);
        let mut reports = Vec::with_capacity(self.settings.sync.targets.len());
        for target in &self.settings.sync.targets {
            info!("running sync for {target}");
            let report = invoker.run_sync(&user.name, target.as_str())?;
            reports.push(report);
        }

        info!("sync completed for {} targets", reports.len());
        Ok(reports)
    }

    fn resolve_user(&self) -> Result<UserIdentity> {
        let user = self.console.current_user()?;
        if is_unknown_user(&self.settings.policy, &user.name) {
            return Err(Error::UnknownRunningUser {
                name: user.name,
                uid: user.uid,
            });
        }

        debug!("console user {} ({}:{})", user.name, user.uid, user.gid);
        Ok(user)
    }

    fn validate_eligibility(&self, user: &UserIdentity) -> Result<()> {
        if !is_eligible(&self.settings.policy, user.uid, &user.name) {
            return Err(Error::UserSyncNotAllowed {
                name: user.name.clone(),
                uid: user.uid,
            });
        }

        Ok(())
    }

    fn validate_destination(&self, user: &UserIdentity) -> Result<PathBuf> {
        let path = sync_destination(&self.settings, &user.name);
        if !path.is_dir() {
            return Err(Error::MissingSyncTarget { path });
        }

        debug!("sync destination {:?}", path.display());
        Ok(path)
    }
}
