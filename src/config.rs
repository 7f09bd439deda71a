// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Configuration layout.
//!
//! Specify the layout of the settings that drive a synchome run, i.e., where
//! templates live, where generated profiles go, which targets to sync, and
//! which users are allowed to sync at all.
//!
//! # Defaults
//!
//! Every field has a built-in default that matches the standard workstation
//! deployment. A settings file only needs to list the fields it wants to
//! change. Path fields go through shell expansion after parsing, so
//! `$HOME/templates` or `~/templates` are valid values.
//!
//! ```toml
//! [paths]
//! users_root = "/Users"
//! user_config_dir = "Library/Application Support/Unison"
//! destination_root = "/Volumes"
//! template_root = "/Library/TT/Config/Unison"
//!
//! [templates]
//! targets_dir = "Targets"
//! shared_name = "Common"
//! extension = "prfconfig"
//!
//! [sync]
//! program = "/usr/local/bin/unison"
//! extra_args = ["-silent"]
//! profile_extension = "prf"
//! targets = ["Dokument", "Skrivbord", "Bibliotek"]
//!
//! [policy]
//! lowest_allowed_uid = 510
//! prohibited_users = ["root", "admin"]
//! unknown_user_names = ["loginwindow"]
//! ```

use serde::{Deserialize, Serialize};
use std::{
    collections::HashSet,
    fmt::{Display, Error as FmtError, Formatter, Result as FmtResult},
    fs::read_to_string,
    path::{Path, PathBuf},
    str::FromStr,
};
use tracing::{debug, instrument};

/// Complete settings for a synchome run.
///
/// Settings are immutable once loaded. The orchestrator receives them at
/// construction, so tests can point every path at a scratch directory.
#[derive(Default, Debug, PartialEq, Eq, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    /// Filesystem roots used to build per-user paths.
    pub paths: PathSettings,

    /// Template naming conventions.
    pub templates: TemplateSettings,

    /// Sync tool invocation and target listing.
    pub sync: SyncSettings,

    /// User eligibility policy.
    pub policy: PolicySettings,
}

impl Settings {
    /// Load settings from file at `path`.
    ///
    /// # Errors
    ///
    /// - Return [`ConfigError::Read`] if the file cannot be read.
    /// - Return [`ConfigError::Deserialize`] if the file is not valid TOML.
    /// - Return [`ConfigError::ShellExpansion`] if a path cannot be expanded.
    /// - Return [`ConfigError::InvalidTarget`] or
    ///   [`ConfigError::DuplicateTarget`] for a bad target listing.
    #[instrument(skip(path), level = "debug")]
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        debug!("load settings from {:?}", path.as_ref().display());
        let data = read_to_string(path.as_ref()).map_err(|source| ConfigError::Read {
            source,
            path: path.as_ref().to_path_buf(),
        })?;

        data.parse()
    }
}

impl FromStr for Settings {
    type Err = ConfigError;

    fn from_str(data: &str) -> Result<Self, Self::Err> {
        let mut settings: Settings = toml::de::from_str(data).map_err(ConfigError::Deserialize)?;

        // INVARIANT: Perform shell expansion on every path field.
        settings.paths.users_root = expand_path(&settings.paths.users_root)?;
        settings.paths.user_config_dir = expand_path(&settings.paths.user_config_dir)?;
        settings.paths.destination_root = expand_path(&settings.paths.destination_root)?;
        settings.paths.template_root = expand_path(&settings.paths.template_root)?;
        settings.sync.program = expand_path(&settings.sync.program)?;

        // INVARIANT: Targets double as file names, so they must be unique and
        // contain no path separators.
        let mut seen = HashSet::new();
        for target in &settings.sync.targets {
            let name = target.as_str();
            if name.is_empty() || name.contains(['/', '\\']) || name == "." || name == ".." {
                return Err(ConfigError::InvalidTarget(name.to_string()));
            }

            if !seen.insert(name) {
                return Err(ConfigError::DuplicateTarget(name.to_string()));
            }
        }

        Ok(settings)
    }
}

impl Display for Settings {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        fmt.write_str(
            toml::ser::to_string_pretty(self)
                .map_err(ConfigError::Serialize)?
                .as_str(),
        )
    }
}

/// Filesystem roots.
#[derive(Debug, PartialEq, Eq, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PathSettings {
    /// Directory containing every user's home directory.
    pub users_root: PathBuf,

    /// Location of the sync tool's profile directory relative to a user's
    /// home directory.
    pub user_config_dir: PathBuf,

    /// Directory containing every user's sync destination.
    pub destination_root: PathBuf,

    /// Directory holding the shared template and the per-target templates.
    pub template_root: PathBuf,
}

impl Default for PathSettings {
    fn default() -> Self {
        Self {
            users_root: PathBuf::from("/Users"),
            user_config_dir: PathBuf::from("Library/Application Support/Unison"),
            destination_root: PathBuf::from("/Volumes"),
            template_root: PathBuf::from("/Library/TT/Config/Unison"),
        }
    }
}

/// Template naming conventions.
#[derive(Debug, PartialEq, Eq, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TemplateSettings {
    /// Subdirectory of the template root holding per-target templates.
    pub targets_dir: String,

    /// File stem of the template shared by every target.
    pub shared_name: String,

    /// File extension of every template.
    pub extension: String,
}

impl Default for TemplateSettings {
    fn default() -> Self {
        Self {
            targets_dir: "Targets".into(),
            shared_name: "Common".into(),
            extension: "prfconfig".into(),
        }
    }
}

/// Sync tool invocation.
#[derive(Debug, PartialEq, Eq, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SyncSettings {
    /// Absolute path to sync tool binary.
    pub program: PathBuf,

    /// Arguments passed after the target name on every invocation.
    pub extra_args: Vec<String>,

    /// File extension of generated profiles.
    pub profile_extension: String,

    /// Targets to sync, in execution order.
    pub targets: Vec<SyncTarget>,
}

impl SyncSettings {
    /// Look up configured target by name.
    pub fn target(&self, name: &str) -> Option<&SyncTarget> {
        self.targets.iter().find(|target| target.as_str() == name)
    }
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            program: PathBuf::from("/usr/local/bin/unison"),
            extra_args: vec!["-silent".into()],
            profile_extension: "prf".into(),
            targets: vec![
                SyncTarget::new("Dokument"),
                SyncTarget::new("Skrivbord"),
                SyncTarget::new("Bibliotek"),
            ],
        }
    }
}

/// User eligibility policy.
#[derive(Debug, PartialEq, Eq, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PolicySettings {
    /// Lowest user id that sync may run for.
    pub lowest_allowed_uid: u32,

    /// Users that never sync regardless of their id.
    pub prohibited_users: Vec<String>,

    /// Console owners that mean nobody has logged in yet.
    pub unknown_user_names: Vec<String>,
}

impl Default for PolicySettings {
    fn default() -> Self {
        Self {
            lowest_allowed_uid: 510,
            prohibited_users: vec!["root".into(), "admin".into()],
            unknown_user_names: vec!["loginwindow".into()],
        }
    }
}

/// Named synchronization unit.
///
/// Each target owns one template under the template root and one generated
/// profile in the user's profile directory, both named after the target.
#[derive(Debug, PartialEq, Eq, Hash, Clone, Deserialize, Serialize)]
#[serde(transparent)]
pub struct SyncTarget(String);

impl SyncTarget {
    /// Construct new sync target.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Treat sync target as string slice.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl Display for SyncTarget {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        fmt.write_str(self.as_str())
    }
}

fn expand_path(path: &Path) -> Result<PathBuf> {
    Ok(PathBuf::from(
        shellexpand::full(path.to_string_lossy().as_ref())
            .map_err(ConfigError::ShellExpansion)?
            .into_owned(),
    ))
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Settings file cannot be read.
    #[error("failed to read settings file at {:?}", path.display())]
    Read {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },

    /// Failed to deserialize configuration.
    #[error(transparent)]
    Deserialize(#[from] toml::de::Error),

    /// Failed to serialize configuration.
    #[error(transparent)]
    Serialize(#[from] toml::ser::Error),

    /// Failed to perform shell expansion on configuration.
    #[error(transparent)]
    ShellExpansion(#[from] shellexpand::LookupError<std::env::VarError>),

    /// Target name cannot be used as a file name.
    #[error("invalid sync target name in settings: {0:?}")]
    InvalidTarget(String),

    /// Target listed more than once.
    #[error("sync target listed more than once in settings: {0}")]
    DuplicateTarget(String),
}

impl From<ConfigError> for FmtError {
    fn from(_: ConfigError) -> Self {
        FmtError
    }
}

/// Friendly result alias :3
type Result<T, E = ConfigError> = std::result::Result<T, E>;
