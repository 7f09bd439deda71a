// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Sync profile lifecycle.
//!
//! The sync tool reads one __profile__ per target from the user's profile
//! directory. Synchome regenerates the profile from templates before every
//! sync, so the templates are the single source of truth.
//!
//! # Purge Before Write
//!
//! Before a profile is written, every file carrying the profile extension in
//! the profile directory whose name does not belong to a configured target is
//! deleted. Profiles for targets that are no longer configured never
//! accumulate this way, while the profiles of configured targets survive
//! until they are regenerated in place.
//!
//! Failing to delete a stale profile does not stop generation. Each failure
//! is logged and handed back to the caller as a [`PurgeWarning`].

use crate::{
    config::{Settings, SyncTarget},
    path::{profile_path, shared_template, target_template, user_config_root},
    template::{merge, MergedConfig},
};

use glob::{glob, Pattern};
use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    fs::{remove_file, DirBuilder, File},
    io::{BufWriter, ErrorKind, Write},
    os::unix::fs::DirBuilderExt,
    path::{Path, PathBuf},
};
use tracing::{debug, info, instrument, warn};

/// Permission mode of a newly created profile directory.
pub const PROFILE_DIR_MODE: u32 = 0o755;

/// Result of generating a profile.
#[derive(Debug)]
pub struct GeneratedProfile {
    /// Path of written profile.
    pub path: PathBuf,

    /// Number of lines written to profile.
    pub lines: usize,

    /// Stale profiles that could not be deleted.
    pub warnings: Vec<PurgeWarning>,
}

/// Stale profile that could not be deleted.
#[derive(Debug)]
pub struct PurgeWarning {
    /// Path of stale profile.
    pub path: PathBuf,

    /// Reason deletion failed.
    pub source: std::io::Error,
}

impl Display for PurgeWarning {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        write!(
            fmt,
            "failed to remove stale profile {:?}: {}",
            self.path.display(),
            self.source
        )
    }
}

/// Generate sync profiles for a user.
#[derive(Debug, Clone, Copy)]
pub struct ProfileWriter<'a> {
    settings: &'a Settings,
}

impl<'a> ProfileWriter<'a> {
    /// Construct new profile writer.
    pub fn new(settings: &'a Settings) -> Self {
        Self { settings }
    }

    /// Generate profile of `target` for user.
    ///
    /// Creates the profile directory when missing, purges stale profiles,
    /// merges templates, then truncates and writes the target's profile.
    ///
    /// # Errors
    ///
    /// - Return [`ProfileError::Template`] if templates cannot be merged.
    /// - Return [`ProfileError::ConfigurationNotFound`] if the profile or its
    ///   directory cannot be found or created.
    /// - Return [`ProfileError::InsufficientFilePermissions`] if the profile
    ///   or its directory cannot be modified.
    /// - Return [`ProfileError::Io`] for any other I/O failure.
    #[instrument(skip(self), level = "debug")]
    pub fn generate(&self, username: &str, target: &SyncTarget) -> Result<GeneratedProfile> {
        let root = user_config_root(self.settings, username);
        self.ensure_root(&root, target)?;
        let warnings = self.purge_stale(&root);

        let merged = merge(
            shared_template(self.settings),
            target_template(self.settings, target),
            target,
            username,
        )?;

        let path = profile_path(self.settings, username, target);
        write_profile(&path, &merged).map_err(|source| classify(source, target, &path))?;
        info!("wrote profile {:?}", path.display());

        Ok(GeneratedProfile {
            path,
            lines: merged.len(),
            warnings,
        })
    }

    /// Delete every stale profile in profile directory `root`.
    ///
    /// A profile is stale when its name does not belong to any configured
    /// target. Only regular files directly inside `root` with the profile
    /// extension are touched. Failures are logged and returned, never raised.
    pub fn purge_stale(&self, root: impl AsRef<Path>) -> Vec<PurgeWarning> {
        let mut warnings = Vec::new();
        let pattern = format!(
            "{}/*.{}",
            Pattern::escape(root.as_ref().to_string_lossy().as_ref()),
            Pattern::escape(&self.settings.sync.profile_extension)
        );

        let entries = match glob(&pattern) {
            Ok(entries) => entries,
            Err(error) => {
                warn!("cannot list stale profiles in {:?}: {error}", root.as_ref().display());
                warnings.push(PurgeWarning {
                    path: root.as_ref().to_path_buf(),
                    source: std::io::Error::other(error),
                });
                return warnings;
            }
        };

        for entry in entries {
            let path = match entry {
                Ok(path) => path,
                Err(error) => {
                    let warning = PurgeWarning {
                        path: error.path().to_path_buf(),
                        source: error.into(),
                    };
                    warn!("{warning}");
                    warnings.push(warning);
                    continue;
                }
            };

            if !path.is_file() || self.is_configured(&path) {
                continue;
            }

            debug!("remove stale profile {:?}", path.display());
            if let Err(source) = remove_file(&path) {
                let warning = PurgeWarning { path, source };
                warn!("{warning}");
                warnings.push(warning);
            }
        }

        warnings
    }

    fn is_configured(&self, path: &Path) -> bool {
        let extension = self.settings.sync.profile_extension.as_str();
        path.file_name()
            .and_then(|name| name.to_str())
            .and_then(|name| name.strip_suffix(extension))
            .and_then(|name| name.strip_suffix('.'))
            .is_some_and(|stem| self.settings.sync.target(stem).is_some())
    }

    fn ensure_root(&self, root: &Path, target: &SyncTarget) -> Result<()> {
        if root.is_dir() {
            return Ok(());
        }

        info!("create profile directory {:?}", root.display());
        match DirBuilder::new()
            .recursive(true)
            .mode(PROFILE_DIR_MODE)
            .create(root)
        {
            Ok(()) => Ok(()),
            // INVARIANT: Losing a creation race to another process is fine.
            Err(error) if error.kind() == ErrorKind::AlreadyExists && root.is_dir() => Ok(()),
            Err(error) => Err(classify(error, target, root)),
        }
    }
}

fn write_profile(path: &Path, merged: &MergedConfig) -> std::io::Result<()> {
    // INVARIANT: Writer is dropped, closing the file, on every return path.
    let mut writer = BufWriter::new(File::create(path)?);
    for line in merged.lines() {
        writer.write_all(line.as_bytes())?;
    }

    writer.flush()
}

fn classify(source: std::io::Error, target: &SyncTarget, path: &Path) -> ProfileError {
    match source.kind() {
        ErrorKind::NotFound => ProfileError::ConfigurationNotFound {
            source,
            target: target.clone(),
            path: path.to_path_buf(),
        },
        ErrorKind::PermissionDenied => ProfileError::InsufficientFilePermissions {
            source,
            target: target.clone(),
            path: path.to_path_buf(),
        },
        _ => ProfileError::Io {
            source,
            path: path.to_path_buf(),
        },
    }
}

/// Profile generation error types.
#[derive(Debug, thiserror::Error)]
pub enum ProfileError {
    /// Templates cannot be merged.
    #[error(transparent)]
    Template(#[from] crate::template::TemplateError),

    /// Profile or its directory cannot be found.
    #[error("could not find configuration file for target {target}: {:?}", path.display())]
    ConfigurationNotFound {
        #[source]
        source: std::io::Error,
        target: SyncTarget,
        path: PathBuf,
    },

    /// Profile or its directory cannot be modified.
    #[error("not allowed to modify file for target {target}: {:?}", path.display())]
    InsufficientFilePermissions {
        #[source]
        source: std::io::Error,
        target: SyncTarget,
        path: PathBuf,
    },

    /// Any other I/O failure while writing profile.
    #[error("failed to write profile at {:?}", path.display())]
    Io {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },
}

/// Friendly result alias :3
pub type Result<T, E = ProfileError> = std::result::Result<T, E>;
