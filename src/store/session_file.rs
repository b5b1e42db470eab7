// SPDX-FileCopyrightText: 2026 The tabsmith authors
// SPDX-License-Identifier: LicenseRef-Tabsmith-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of tabsmith and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use time::macros::format_description;
use time::{Date, OffsetDateTime};

use crate::format::mozlz4::{self, FormatError};
use crate::model::SessionDocument;

const BACKUP_PREFIX: &str = "Sessionstore-Backup";
const UNTOUCHED_DIR: &str = "untouched-backups";
const DECODED_DIR: &str = "decoded JSON";

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("io error at {path:?}: {source}")]
    Io { path: PathBuf, source: io::Error },
    #[error("invalid session container at {path:?}: {source}")]
    Format { path: PathBuf, source: FormatError },
    #[error("invalid session json at {path:?}: {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("encoded session does not decode to the in-memory document, refusing to write {path:?}")]
    VerificationFailed { path: PathBuf },
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum WriteDurability {
    /// Fast, best-effort persistence.
    ///
    /// - Writes a temp file and renames atomically into place.
    /// - Does not perform per-file fsync/sync.
    #[default]
    BestEffort,

    /// Slower, best-effort durability.
    ///
    /// Attempts to flush written file contents and rename operations to stable storage where
    /// possible. Exact guarantees are platform/filesystem-dependent.
    Durable,
}

/// Directory created by [`SessionFile::backup`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BackupReport {
    pub dir: PathBuf,
    pub untouched: PathBuf,
    pub copy: PathBuf,
    pub decoded: PathBuf,
}

/// A session container on disk.
///
/// Reads decode the whole container; writes encode the whole document and replace the file
/// atomically, so a failed save never leaves a partial container behind.
#[derive(Debug, Clone)]
pub struct SessionFile {
    path: PathBuf,
    durability: WriteDurability,
    verify: bool,
}

impl SessionFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            durability: WriteDurability::default(),
            verify: true,
        }
    }

    pub fn with_durability(mut self, durability: WriteDurability) -> Self {
        self.durability = durability;
        self
    }

    /// Whether [`SessionFile::save`] decodes the encoded bytes and compares them with the
    /// document before replacing the file.
    pub fn with_verification(mut self, verify: bool) -> Self {
        self.verify = verify;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn durability(&self) -> WriteDurability {
        self.durability
    }

    pub fn read(&self) -> Result<Vec<u8>, StoreError> {
        fs::read(&self.path).map_err(|source| StoreError::Io {
            path: self.path.clone(),
            source,
        })
    }

    pub fn load(&self) -> Result<SessionDocument, StoreError> {
        let bytes = self.read()?;
        let document = mozlz4::decode_document(&bytes).map_err(|source| StoreError::Format {
            path: self.path.clone(),
            source,
        })?;
        log::info!(
            "loaded session container (path={:?}, windows={}, tabs={})",
            self.path,
            document.windows().len(),
            document.tab_count()
        );
        Ok(document)
    }

    pub fn save(&self, document: &SessionDocument) -> Result<(), StoreError> {
        let format_err = |source| StoreError::Format {
            path: self.path.clone(),
            source,
        };
        let value = document.to_value();
        let bytes = mozlz4::encode(&value).map_err(format_err)?;
        if self.verify {
            let decoded = mozlz4::decode(&bytes).map_err(format_err)?;
            if decoded != value {
                return Err(StoreError::VerificationFailed {
                    path: self.path.clone(),
                });
            }
        }

        write_atomic(&self.path, &bytes, self.durability)?;
        log::info!(
            "saved session container (path={:?}, bytes={}, verified={})",
            self.path,
            bytes.len(),
            self.verify
        );
        Ok(())
    }

    /// Writes the decoded document as JSON to `out`.
    pub fn export_json(
        &self,
        document: &SessionDocument,
        out: &Path,
        pretty: bool,
    ) -> Result<(), StoreError> {
        let value = document.to_value();
        let json = if pretty {
            serde_json::to_vec_pretty(&value)
        } else {
            serde_json::to_vec(&value)
        }
        .map_err(|source| StoreError::Json {
            path: out.to_path_buf(),
            source,
        })?;
        write_atomic(out, &json, self.durability)
    }

    /// Reads a decoded session document from a JSON file.
    pub fn import_json(path: &Path) -> Result<SessionDocument, StoreError> {
        let json_err = |source| StoreError::Json {
            path: path.to_path_buf(),
            source,
        };
        let bytes = fs::read(path).map_err(|source| StoreError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let value: Value = serde_json::from_slice(&bytes).map_err(json_err)?;
        SessionDocument::from_value(value).map_err(json_err)
    }

    /// Copies the container as it is on disk into a new dated directory under `root`, together
    /// with an untouched copy and its decoded JSON.
    pub fn backup(&self, root: &Path) -> Result<BackupReport, StoreError> {
        let today = OffsetDateTime::now_local()
            .unwrap_or_else(|_| OffsetDateTime::now_utc())
            .date();
        self.backup_dated(root, today)
    }

    pub(crate) fn backup_dated(&self, root: &Path, date: Date) -> Result<BackupReport, StoreError> {
        let snapshot = Snapshot::read(&self.path)?;
        let dir = create_backup_dir(root, date)?;
        let report = snapshot.write_into(&dir, self.durability)?;

        log::info!("backed up session container (path={:?}, dir={:?})", self.path, report.dir);
        Ok(report)
    }
}

/// A container read and decoded from disk, ready to be copied into a backup directory.
pub(crate) struct Snapshot {
    path: PathBuf,
    bytes: Vec<u8>,
    value: Value,
}

impl Snapshot {
    /// Fails without touching anything when the container does not decode.
    pub(crate) fn read(path: &Path) -> Result<Self, StoreError> {
        let bytes = fs::read(path).map_err(|source| StoreError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let value = mozlz4::decode(&bytes).map_err(|source| StoreError::Format {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self {
            path: path.to_path_buf(),
            bytes,
            value,
        })
    }

    pub(crate) fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Writes the container, its untouched copy and its decoded JSON into a backup directory
    /// made by [`create_backup_dir`].
    pub(crate) fn write_into(
        &self,
        dir: &Path,
        durability: WriteDurability,
    ) -> Result<BackupReport, StoreError> {
        let file_name = self
            .path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "session.jsonlz4".to_owned());
        let stem = file_name
            .strip_suffix(".jsonlz4")
            .unwrap_or(file_name.as_str())
            .to_owned();

        let report = BackupReport {
            untouched: dir
                .join(UNTOUCHED_DIR)
                .join(format!("{stem}-untouched.jsonlz4")),
            copy: dir.join(&file_name),
            decoded: dir.join(DECODED_DIR).join(format!("{stem}.json")),
            dir: dir.to_path_buf(),
        };

        write_atomic(&report.untouched, &self.bytes, durability)?;
        write_atomic(&report.copy, &self.bytes, durability)?;
        let json = serde_json::to_vec_pretty(&self.value).map_err(|source| StoreError::Json {
            path: report.decoded.clone(),
            source,
        })?;
        write_atomic(&report.decoded, &json, durability)?;
        Ok(report)
    }
}

/// Creates `<root>/Sessionstore-Backup YYYY-MM-DD[-N]` with its sub-directories.
pub(crate) fn create_backup_dir(root: &Path, date: Date) -> Result<PathBuf, StoreError> {
    let io_err = |path: &Path| {
        let path = path.to_path_buf();
        move |source| StoreError::Io { path, source }
    };

    let stamp = date
        .format(format_description!("[year]-[month]-[day]"))
        .map_err(|err| StoreError::Io {
            path: root.to_path_buf(),
            source: io::Error::other(err),
        })?;
    let base = format!("{BACKUP_PREFIX} {stamp}");

    fs::create_dir_all(root).map_err(io_err(root))?;
    let mut dir = root.join(&base);
    let mut counter = 0;
    loop {
        match fs::create_dir(&dir) {
            Ok(()) => break,
            Err(err) if err.kind() == io::ErrorKind::AlreadyExists => {
                counter += 1;
                dir = root.join(format!("{base}-{counter}"));
            }
            Err(source) => return Err(StoreError::Io { path: dir, source }),
        }
    }

    for sub in [UNTOUCHED_DIR, DECODED_DIR] {
        let path = dir.join(sub);
        fs::create_dir(&path).map_err(io_err(&path))?;
    }
    Ok(dir)
}

fn rename_overwrite(from: &Path, to: &Path) -> io::Result<()> {
    #[cfg(windows)]
    {
        match fs::rename(from, to) {
            Ok(()) => Ok(()),
            Err(err)
                if matches!(
                    err.kind(),
                    io::ErrorKind::AlreadyExists | io::ErrorKind::PermissionDenied
                ) =>
            {
                let _ = fs::remove_file(to);
                fs::rename(from, to)
            }
            Err(err) => Err(err),
        }
    }

    #[cfg(not(windows))]
    {
        fs::rename(from, to)
    }
}

/// A freshly created temp file.
pub(crate) trait TmpFile: Write {
    fn sync(&mut self) -> io::Result<()>;
}

impl TmpFile for fs::File {
    fn sync(&mut self) -> io::Result<()> {
        self.sync_all()
    }
}

/// Writes and optionally syncs the temp file. Any failure removes it.
pub(crate) fn fill_tmp<F: TmpFile>(
    mut file: F,
    tmp_path: &Path,
    contents: &[u8],
    durability: WriteDurability,
) -> Result<(), StoreError> {
    let result = file.write_all(contents).and_then(|()| match durability {
        WriteDurability::Durable => file.sync(),
        WriteDurability::BestEffort => Ok(()),
    });
    drop(file);

    if let Err(source) = result {
        let _ = fs::remove_file(tmp_path);
        return Err(StoreError::Io {
            path: tmp_path.to_path_buf(),
            source,
        });
    }
    Ok(())
}

/// Writes `contents` next to `path` and renames it into place.
pub(crate) fn write_atomic(
    path: &Path,
    contents: &[u8],
    durability: WriteDurability,
) -> Result<(), StoreError> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let Some(file_name) = path.file_name() else {
        return Err(StoreError::Io {
            path: path.to_path_buf(),
            source: io::Error::other("path has no file name"),
        });
    };

    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    let tmp_path = parent.join(format!(
        ".tabsmith.tmp.{}.{}",
        file_name.to_string_lossy(),
        nanos
    ));

    let file = fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&tmp_path)
        .map_err(|source| StoreError::Io {
            path: tmp_path.clone(),
            source,
        })?;
    fill_tmp(file, &tmp_path, contents, durability)?;

    if let Err(source) = rename_overwrite(&tmp_path, path) {
        let _ = fs::remove_file(&tmp_path);
        return Err(StoreError::Io {
            path: path.to_path_buf(),
            source,
        });
    }

    if durability == WriteDurability::Durable {
        #[cfg(unix)]
        {
            let dir = fs::File::open(parent).map_err(|source| StoreError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
            dir.sync_all().map_err(|source| StoreError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
    }

    Ok(())
}
