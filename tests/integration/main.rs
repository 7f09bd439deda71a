// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

mod scenarios;

use anyhow::Result;
use std::{
    cell::RefCell,
    collections::HashMap,
    fs::{create_dir_all, write},
    path::{Path, PathBuf},
};
use synchome::{
    user::LookupError, ConsoleUser, Orchestrator, Settings, SyncTarget, SyncTool, ToolRun,
    UserIdentity,
};

/// Scratch workstation laid out under a root directory.
pub(crate) struct Workstation {
    root: PathBuf,
    settings: Settings,
}

impl Workstation {
    pub(crate) fn new(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        let mut settings = Settings::default();
        settings.paths.users_root = root.join("Users");
        settings.paths.destination_root = root.join("Volumes");
        settings.paths.template_root = root.join("Library/TT/Config/Unison");

        // INVARIANT: Every configured target starts with a readable template.
        create_dir_all(settings.paths.template_root.join("Targets"))?;
        write(
            settings.paths.template_root.join("Common.prfconfig"),
            "root = /Users/{USER}\nroot = ssh://files.local//Volumes/{USER}\n",
        )?;
        for target in &settings.sync.targets {
            write(
                settings
                    .paths
                    .template_root
                    .join(format!("Targets/{target}.prfconfig")),
                format!("path = {target}\n"),
            )?;
        }

        Ok(Self { root, settings })
    }

    pub(crate) fn with_destination(self, username: &str) -> Result<Self> {
        create_dir_all(self.root.join("Volumes").join(username))?;
        Ok(self)
    }

    pub(crate) fn without_target_template(self, target: &str) -> Result<Self> {
        std::fs::remove_file(
            self.settings
                .paths
                .template_root
                .join(format!("Targets/{target}.prfconfig")),
        )?;
        Ok(self)
    }

    pub(crate) fn profile_dir(&self, username: &str) -> PathBuf {
        synchome::path::user_config_root(&self.settings, username)
    }

    pub(crate) fn settings(&self) -> &Settings {
        &self.settings
    }

    pub(crate) fn orchestrator<'a>(
        &self,
        user: UserIdentity,
        tool: &'a FakeUnison,
    ) -> Orchestrator<ScriptedConsole, &'a FakeUnison> {
        Orchestrator::new(self.settings.clone(), ScriptedConsole(Some(user)), tool)
    }
}

/// Console owned by a fixed user, or by nobody resolvable.
pub(crate) struct ScriptedConsole(pub(crate) Option<UserIdentity>);

impl ConsoleUser for ScriptedConsole {
    fn current_user(&self) -> synchome::user::Result<UserIdentity> {
        self.0.clone().ok_or(LookupError::NoSuchUser { uid: 4242 })
    }
}

/// Sync tool that records every call, and exits with scripted codes.
#[derive(Default)]
pub(crate) struct FakeUnison {
    codes: HashMap<String, i32>,
    calls: RefCell<Vec<(String, Vec<String>)>>,
}

impl FakeUnison {
    pub(crate) fn exit_with(mut self, target: &str, code: i32) -> Self {
        self.codes.insert(target.to_string(), code);
        self
    }

    pub(crate) fn synced_targets(&self) -> Vec<String> {
        self.calls
            .borrow()
            .iter()
            .map(|(target, _)| target.clone())
            .collect()
    }

    pub(crate) fn calls(&self) -> Vec<(String, Vec<String>)> {
        self.calls.borrow().clone()
    }
}

impl SyncTool for FakeUnison {
    fn program(&self) -> &Path {
        Path::new("/usr/local/bin/unison")
    }

    fn run(&self, target: &SyncTarget, extra_args: &[String]) -> std::io::Result<ToolRun> {
        self.calls
            .borrow_mut()
            .push((target.to_string(), extra_args.to_vec()));
        let code = self.codes.get(target.as_str()).copied().unwrap_or(0);
        let output = match code {
            0 => format!("Synchronization complete for {target}"),
            _ => format!("Synchronization incomplete for {target}"),
        };

        Ok(ToolRun {
            code: Some(code),
            output,
        })
    }
}
