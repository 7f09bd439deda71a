// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Profile template merging.
//!
//! Every generated profile is built from two templates: a __shared__ template
//! that applies to all targets, and a __target__ template specific to one
//! target. The shared template always comes first. The sync tool lets the
//! last occurrence of a key win, so a target template can override anything
//! the shared template sets.
//!
//! Templates may mention the placeholder `{USER}` anywhere on a line. Each
//! occurrence is replaced with the name of the user the profile is generated
//! for.

use crate::config::SyncTarget;

use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    fs::read_to_string,
    io::ErrorKind,
    path::{Path, PathBuf},
};
use tracing::{debug, instrument};

/// Token replaced by username in templates.
pub const USER_PLACEHOLDER: &str = "{USER}";

/// Personalized profile content.
///
/// Lines keep their original terminators, so `\r\n` survives untouched. A
/// template whose last line is unterminated gets a `\n` there, keeping it
/// apart from the first line of the next template.
#[derive(Default, Debug, PartialEq, Eq, Clone)]
pub struct MergedConfig {
    lines: Vec<String>,
}

impl MergedConfig {
    /// Merged lines in output order.
    pub fn lines(&self) -> &[String] {
        self.lines.as_slice()
    }

    /// Number of merged lines.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Check if no template contributed any line.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

impl Display for MergedConfig {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        for line in &self.lines {
            fmt.write_str(line)?;
        }

        Ok(())
    }
}

/// Merge shared and target template into personalized profile content.
///
/// Both templates are read in full before anything is returned, so callers
/// never see a partially merged result.
///
/// # Errors
///
/// - Return [`TemplateError::NotFound`] if either template does not exist.
/// - Return [`TemplateError::Unreadable`] if either template cannot be read.
#[instrument(skip(shared, specific, target), level = "debug")]
pub fn merge(
    shared: impl AsRef<Path>,
    specific: impl AsRef<Path>,
    target: &SyncTarget,
    username: &str,
) -> Result<MergedConfig> {
    let shared = read_template(shared.as_ref(), target)?;
    let specific = read_template(specific.as_ref(), target)?;

    let lines = shared
        .split_inclusive('\n')
        .chain(specific.split_inclusive('\n'))
        .map(|line| personalize(line, username))
        .map(|mut line| {
            if !line.ends_with('\n') {
                line.push('\n');
            }
            line
        })
        .collect::<Vec<_>>();
    debug!("merged {} lines for target {target}", lines.len());

    Ok(MergedConfig { lines })
}

fn read_template(path: &Path, target: &SyncTarget) -> Result<String> {
    debug!("read template {:?}", path.display());
    read_to_string(path).map_err(|source| match source.kind() {
        ErrorKind::NotFound => TemplateError::NotFound {
            target: target.clone(),
            path: path.to_path_buf(),
        },
        _ => TemplateError::Unreadable {
            source,
            target: target.clone(),
            path: path.to_path_buf(),
        },
    })
}

fn personalize(line: &str, username: &str) -> String {
    if line.contains(USER_PLACEHOLDER) {
        line.replace(USER_PLACEHOLDER, username)
    } else {
        line.to_string()
    }
}

/// Template merging error types.
#[derive(Debug, thiserror::Error)]
pub enum TemplateError {
    /// Template file does not exist.
    #[error("could not find template for target {target}: {:?}", path.display())]
    NotFound { target: SyncTarget, path: PathBuf },

    /// Template file exists but cannot be read.
    #[error("failed to read template for target {target}: {:?}", path.display())]
    Unreadable {
        #[source]
        source: std::io::Error,
        target: SyncTarget,
        path: PathBuf,
    },
}

impl TemplateError {
    /// Template path that failed.
    pub fn path(&self) -> &Path {
        match self {
            Self::NotFound { path, .. } | Self::Unreadable { path, .. } => path.as_path(),
        }
    }

    /// Target whose template failed.
    pub fn target(&self) -> &SyncTarget {
        match self {
            Self::NotFound { target, .. } | Self::Unreadable { target, .. } => target,
        }
    }
}

/// Friendly result alias :3
pub type Result<T, E = TemplateError> = std::result::Result<T, E>;
