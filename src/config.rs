// SPDX-FileCopyrightText: 2026 The tabsmith authors
// SPDX-License-Identifier: LicenseRef-Tabsmith-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of tabsmith and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Settings file (TOML). Every key is optional.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::clean::TitleCleaner;
use crate::store::{profile, WriteDurability};

/// Directory created next to the container when `[backup] dir` is not set.
pub const DEFAULT_BACKUP_DIR: &str = "tabsmith-backups";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read settings at {path:?}: {source}")]
    Io { path: PathBuf, source: io::Error },
    #[error("invalid settings at {path:?}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub durability: WriteDurability,
    /// Decode freshly encoded bytes and compare them with the document before overwriting.
    pub verify_before_write: bool,
    pub title_patterns: Vec<String>,
    /// Firefox profiles directory; the platform default when unset.
    pub profiles_root: Option<PathBuf>,
    pub backup: BackupSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            durability: WriteDurability::default(),
            verify_before_write: true,
            title_patterns: Vec::new(),
            profiles_root: None,
            backup: BackupSettings::default(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BackupSettings {
    pub enabled: bool,
    pub dir: Option<PathBuf>,
}

impl BackupSettings {
    /// Backup root for a container at `container`. Relative dirs resolve against the
    /// container's directory.
    pub fn root_for(&self, container: &Path) -> PathBuf {
        let base = container
            .parent()
            .filter(|parent| !parent.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        match &self.dir {
            Some(dir) if dir.is_absolute() => dir.clone(),
            Some(dir) => base.join(dir),
            None => base.join(DEFAULT_BACKUP_DIR),
        }
    }
}

impl Settings {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    pub fn title_cleaner(&self) -> TitleCleaner {
        TitleCleaner::new(&self.title_patterns)
    }

    pub fn profiles_root(&self) -> Option<PathBuf> {
        self.profiles_root.clone().or_else(profile::profiles_root)
    }
}
