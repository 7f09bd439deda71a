// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Path resolution utilities.
//!
//! Determine where templates are read from, and where per-user files live.
//! Each function builds its path from [`Settings`] plus the username it is
//! given, without checking whether the path actually exists.
//!
//! # Layout
//!
//! With default settings, user "alice", and target "Dokument":
//!
//! - Shared template: `/Library/TT/Config/Unison/Common.prfconfig`
//! - Target template: `/Library/TT/Config/Unison/Targets/Dokument.prfconfig`
//! - Profile directory: `/Users/alice/Library/Application Support/Unison`
//! - Profile: `/Users/alice/Library/Application Support/Unison/Dokument.prf`
//! - Sync destination: `/Volumes/alice`

use crate::config::{Settings, SyncTarget};

use std::path::PathBuf;

/// Determine absolute path to user's profile directory.
pub fn user_config_root(settings: &Settings, username: &str) -> PathBuf {
    settings
        .paths
        .users_root
        .join(username)
        .join(&settings.paths.user_config_dir)
}

/// Determine absolute path to generated profile of `target` for user.
pub fn profile_path(settings: &Settings, username: &str, target: &SyncTarget) -> PathBuf {
    user_config_root(settings, username).join(format!(
        "{}.{}",
        target, settings.sync.profile_extension
    ))
}

/// Determine absolute path to template shared by all targets.
pub fn shared_template(settings: &Settings) -> PathBuf {
    settings.paths.template_root.join(format!(
        "{}.{}",
        settings.templates.shared_name, settings.templates.extension
    ))
}

/// Determine absolute path to template specific to `target`.
pub fn target_template(settings: &Settings, target: &SyncTarget) -> PathBuf {
    settings
        .paths
        .template_root
        .join(&settings.templates.targets_dir)
        .join(format!("{}.{}", target, settings.templates.extension))
}

/// Determine absolute path to the directory user's files sync into.
///
/// Only the conventional location is checked. The destination declared
/// inside a generated profile is never parsed.
pub fn sync_destination(settings: &Settings, username: &str) -> PathBuf {
    settings.paths.destination_root.join(username)
}
