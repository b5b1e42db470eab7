// SPDX-FileCopyrightText: 2026 The tabsmith authors
// SPDX-License-Identifier: LicenseRef-Tabsmith-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of tabsmith and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Firefox profile directories: discovery, importing their session containers into a backup
//! directory, and restoring an edited container back into a profile.

use std::fmt;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::OnceLock;
use std::time::SystemTime;

use regex::Regex;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use time::{OffsetDateTime, PrimitiveDateTime, UtcOffset};

use super::session_file::{
    create_backup_dir, write_atomic, BackupReport, Snapshot, StoreError, WriteDurability,
};

/// Written into an import directory: `<profile name>|<dd.mm.yyyy hh:mm>`.
pub const PROFILE_RECORD: &str = "profile.txt";
/// Copies of profile containers replaced by [`restore`], next to the restored container.
pub const ORIGINAL_BACKUP_DIR: &str = "original_backup";
pub const REPLACE_LOG: &str = "replace_log.txt";

const SESSION_BACKUPS_DIR: &str = "sessionstore-backups";
/// `browser.startup.page` value that restores the previous session.
const STARTUP_RESTORES_SESSION: i64 = 3;

const RECORD_TIME: &[BorrowedFormatItem<'static>] =
    format_description!("[day].[month].[year] [hour]:[minute]");
const BACKUP_STAMP: &[BorrowedFormatItem<'static>] =
    format_description!("[year][month][day]_[hour][minute][second]");

#[derive(Debug, thiserror::Error)]
pub enum ProfileError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("no firefox profile directory is known for this platform")]
    NoProfilesRoot,
    #[error("profile not found (profile={name})")]
    NotFound { name: String },
    #[error("profile has no session containers (profile={name})")]
    NoSessions { name: String },
    #[error("unknown restore target (target={value}); expected sessionstore, recovery or previous")]
    UnknownTarget { value: String },
    #[error("invalid profile record at {path:?}")]
    BadRecord { path: PathBuf },
    #[error("existing container is newer than the imported session (path={path:?}, modified={modified}, imported={imported})")]
    TargetNewer {
        path: PathBuf,
        modified: String,
        imported: String,
    },
    #[error("profile does not restore the previous session on startup (profile={profile:?}, startup={startup})")]
    StartupPage {
        profile: PathBuf,
        startup: StartupPage,
    },
}

/// Which profile container a restore replaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RestoreTarget {
    /// `sessionstore.jsonlz4`, read when the browser starts.
    Sessionstore,
    /// `sessionstore-backups/recovery.jsonlz4`
    Recovery,
    /// `sessionstore-backups/previous.jsonlz4`
    Previous,
}

impl RestoreTarget {
    pub const ALL: [RestoreTarget; 3] = [Self::Sessionstore, Self::Recovery, Self::Previous];

    pub const fn name(self) -> &'static str {
        match self {
            Self::Sessionstore => "sessionstore",
            Self::Recovery => "recovery",
            Self::Previous => "previous",
        }
    }

    /// Location of the container inside a profile directory.
    pub fn relative_path(self) -> PathBuf {
        let file = format!("{}.jsonlz4", self.name());
        match self {
            Self::Sessionstore => PathBuf::from(file),
            Self::Recovery | Self::Previous => Path::new(SESSION_BACKUPS_DIR).join(file),
        }
    }
}

impl fmt::Display for RestoreTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for RestoreTarget {
    type Err = ProfileError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|target| target.name().eq_ignore_ascii_case(value.trim()))
            .ok_or_else(|| ProfileError::UnknownTarget {
                value: value.to_owned(),
            })
    }
}

/// One session container present in a profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSlot {
    pub target: RestoreTarget,
    pub path: PathBuf,
    pub size: u64,
    pub modified: Option<PrimitiveDateTime>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profile {
    pub name: String,
    pub dir: PathBuf,
    pub slots: Vec<SessionSlot>,
}

impl Profile {
    /// Reads which session containers exist in `dir`.
    pub fn open(dir: &Path) -> Result<Self, ProfileError> {
        let meta = fs::metadata(dir).map_err(|source| StoreError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
        if !meta.is_dir() {
            return Err(StoreError::Io {
                path: dir.to_path_buf(),
                source: io::Error::other("not a directory"),
            }
            .into());
        }

        let mut slots = Vec::new();
        for target in RestoreTarget::ALL {
            let path = dir.join(target.relative_path());
            let Ok(meta) = fs::metadata(&path) else {
                continue;
            };
            if !meta.is_file() {
                continue;
            }
            slots.push(SessionSlot {
                target,
                size: meta.len(),
                modified: meta.modified().ok().map(local_datetime),
                path,
            });
        }

        Ok(Self {
            name: file_name(dir),
            dir: dir.to_path_buf(),
            slots,
        })
    }

    pub fn slot(&self, target: RestoreTarget) -> Option<&SessionSlot> {
        self.slots.iter().find(|slot| slot.target == target)
    }

    /// Whether the profile holds a container the browser restores from.
    pub fn has_session(&self) -> bool {
        self.slot(RestoreTarget::Sessionstore).is_some()
            || self.slot(RestoreTarget::Previous).is_some()
    }

    fn looks_like_profile(&self) -> bool {
        !self.slots.is_empty()
            || self.dir.join("prefs.js").is_file()
            || self.dir.join("user.js").is_file()
    }
}

/// The platform's Firefox profiles directory.
pub fn profiles_root() -> Option<PathBuf> {
    if cfg!(windows) {
        return dirs::data_dir().map(|dir| dir.join("Mozilla").join("Firefox").join("Profiles"));
    }
    if cfg!(target_os = "macos") {
        return dirs::data_dir().map(|dir| dir.join("Firefox").join("Profiles"));
    }
    dirs::home_dir().map(|home| linux_profiles_root(&home))
}

/// Flatpak first, then snap, then the standard location.
pub fn linux_profiles_root(home: &Path) -> PathBuf {
    let flatpak = home.join(".var/app/org.mozilla.firefox/.mozilla/firefox");
    let snap = home.join("snap/firefox/common/.mozilla/firefox");
    [flatpak, snap]
        .into_iter()
        .find(|dir| dir.is_dir())
        .unwrap_or_else(|| home.join(".mozilla/firefox"))
}

/// Profiles directly under `root`, sorted by name. A missing root has no profiles.
///
/// Sub-directories without session containers and without `prefs.js`/`user.js` are not
/// profiles (crash reports, pending pings) and are left out.
pub fn discover(root: &Path) -> Result<Vec<Profile>, ProfileError> {
    let entries = match fs::read_dir(root) {
        Ok(entries) => entries,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(source) => {
            return Err(StoreError::Io {
                path: root.to_path_buf(),
                source,
            }
            .into())
        }
    };

    let mut profiles = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| StoreError::Io {
            path: root.to_path_buf(),
            source,
        })?;
        let path = entry.path();
        if !path.is_dir() {
            continue;
        }
        let profile = Profile::open(&path)?;
        if profile.looks_like_profile() {
            profiles.push(profile);
        } else {
            log::debug!("skipping non-profile directory (path={path:?})");
        }
    }
    profiles.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(profiles)
}

/// The profile named `name` under `root`. An exact directory name wins over a partial one
/// (`abcd1234` finds `abcd1234.default-release`).
pub fn find(root: &Path, name: &str) -> Result<Profile, ProfileError> {
    let mut profiles = discover(root)?;
    let exact = profiles.iter().position(|profile| profile.name == name);
    let partial = || profiles.iter().position(|profile| profile.name.contains(name));
    match exact.or_else(partial) {
        Some(position) => Ok(profiles.swap_remove(position)),
        None => Err(ProfileError::NotFound {
            name: name.to_owned(),
        }),
    }
}

/// Which profile an import directory came from, and when it was taken.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportRecord {
    pub profile: String,
    /// `None` when the stored time does not parse; age checks are skipped then.
    pub imported_at: Option<PrimitiveDateTime>,
}

impl ImportRecord {
    /// Reads `profile.txt` from `dir`. `Ok(None)` when there is none.
    pub fn read(dir: &Path) -> Result<Option<Self>, ProfileError> {
        let path = dir.join(PROFILE_RECORD);
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(source) => return Err(StoreError::Io { path, source }.into()),
        };
        let Some((profile, stamp)) = content.trim().split_once('|') else {
            return Err(ProfileError::BadRecord { path });
        };
        let imported_at = PrimitiveDateTime::parse(stamp.trim(), RECORD_TIME)
            .map_err(|err| log::warn!("cannot parse import time (path={path:?}): {err}"))
            .ok();
        Ok(Some(Self {
            profile: profile.trim().to_owned(),
            imported_at,
        }))
    }

    pub fn write(&self, dir: &Path, durability: WriteDurability) -> Result<PathBuf, ProfileError> {
        let path = dir.join(PROFILE_RECORD);
        let stamp = self
            .imported_at
            .map(|at| format_time(at, RECORD_TIME))
            .unwrap_or_default();
        write_atomic(&path, format!("{}|{stamp}", self.profile).as_bytes(), durability)?;
        Ok(path)
    }
}

/// Result of [`import`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportReport {
    pub dir: PathBuf,
    pub files: Vec<(RestoreTarget, BackupReport)>,
    pub record: PathBuf,
}

/// Copies every session container of `profile` into one new dated backup directory under
/// `root` and records where they came from.
///
/// All containers are decoded before anything is written; one corrupt container fails the
/// import and leaves `root` untouched.
pub fn import(
    profile: &Profile,
    root: &Path,
    durability: WriteDurability,
) -> Result<ImportReport, ProfileError> {
    import_at(profile, root, durability, local_now())
}

pub(crate) fn import_at(
    profile: &Profile,
    root: &Path,
    durability: WriteDurability,
    now: PrimitiveDateTime,
) -> Result<ImportReport, ProfileError> {
    if profile.slots.is_empty() {
        return Err(ProfileError::NoSessions {
            name: profile.name.clone(),
        });
    }
    let snapshots = profile
        .slots
        .iter()
        .map(|slot| Ok((slot.target, Snapshot::read(&slot.path)?)))
        .collect::<Result<Vec<_>, StoreError>>()?;

    let dir = create_backup_dir(root, now.date())?;
    let mut files = Vec::with_capacity(snapshots.len());
    for (target, snapshot) in &snapshots {
        files.push((*target, snapshot.write_into(&dir, durability)?));
    }
    let record = ImportRecord {
        profile: profile.name.clone(),
        imported_at: Some(now),
    }
    .write(&dir, durability)?;

    log::info!(
        "imported profile sessions (profile={}, dir={dir:?}, files={})",
        profile.name,
        files.len()
    );
    Ok(ImportReport { dir, files, record })
}

/// What a profile's prefs say about `browser.startup.page`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartupPage {
    /// `3`: the previous session is restored.
    RestoresSession,
    Other(i64),
    Unset,
    /// Neither `user.js` nor `prefs.js` exists.
    NoPrefs,
}

impl fmt::Display for StartupPage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RestoresSession => write!(f, "browser.startup.page={STARTUP_RESTORES_SESSION}"),
            Self::Other(value) => write!(f, "browser.startup.page={value}"),
            Self::Unset => f.write_str("browser.startup.page unset"),
            Self::NoPrefs => f.write_str("no user.js or prefs.js"),
        }
    }
}

fn startup_page_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"user_pref\("browser\.startup\.page",\s*(\d+)\);"#)
            .expect("valid startup page regex")
    })
}

/// Reads `browser.startup.page` from `user.js` when it exists, otherwise from `prefs.js`.
pub fn startup_page(profile_dir: &Path) -> Result<StartupPage, ProfileError> {
    let Some(path) = ["user.js", "prefs.js"]
        .into_iter()
        .map(|name| profile_dir.join(name))
        .find(|path| path.is_file())
    else {
        return Ok(StartupPage::NoPrefs);
    };
    let content = fs::read_to_string(&path).map_err(|source| StoreError::Io {
        path: path.clone(),
        source,
    })?;

    let value = startup_page_re()
        .captures(&content)
        .and_then(|captures| captures[1].parse::<i64>().ok());
    Ok(match value {
        Some(STARTUP_RESTORES_SESSION) => StartupPage::RestoresSession,
        Some(value) => StartupPage::Other(value),
        None => StartupPage::Unset,
    })
}

#[derive(Debug, Clone, Default)]
pub struct RestoreOptions {
    /// When the restored session was imported. A profile container modified later than this
    /// blocks the restore unless `force` is set.
    pub imported_at: Option<PrimitiveDateTime>,
    /// Proceed past the age and startup-page checks.
    pub force: bool,
    pub durability: WriteDurability,
    /// Holds `original_backup/` and `replace_log.txt`. Defaults to the container's directory.
    pub work_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestoreReport {
    pub target: RestoreTarget,
    pub target_path: PathBuf,
    /// Copy of the container that was replaced, when one existed.
    pub replaced_backup: Option<PathBuf>,
    pub log: PathBuf,
    /// Checked for [`RestoreTarget::Sessionstore`] only.
    pub startup: Option<StartupPage>,
}

/// Replaces one session container of the profile at `profile_dir` with `container`.
///
/// The container must decode. Before anything is written, the profile container is checked
/// for being newer than `imported_at`, and for `sessionstore` the profile must restore the
/// previous session on startup. The replaced container is copied into `original_backup/`
/// and the replacement is appended to `replace_log.txt`.
pub fn restore(
    container: &Path,
    profile_dir: &Path,
    target: RestoreTarget,
    options: &RestoreOptions,
) -> Result<RestoreReport, ProfileError> {
    restore_at(container, profile_dir, target, options, local_now())
}

pub(crate) fn restore_at(
    container: &Path,
    profile_dir: &Path,
    target: RestoreTarget,
    options: &RestoreOptions,
    now: PrimitiveDateTime,
) -> Result<RestoreReport, ProfileError> {
    let snapshot = Snapshot::read(container)?;
    let profile = Profile::open(profile_dir)?;
    let target_path = profile.dir.join(target.relative_path());

    if let (Some(imported), Some(slot)) = (options.imported_at, profile.slot(target)) {
        if let Some(modified) = slot.modified.filter(|modified| *modified > imported) {
            let modified = format_time(modified, RECORD_TIME);
            let imported = format_time(imported, RECORD_TIME);
            if !options.force {
                return Err(ProfileError::TargetNewer {
                    path: target_path,
                    modified,
                    imported,
                });
            }
            log::warn!(
                "replacing a newer container (path={target_path:?}, modified={modified}, imported={imported})"
            );
        }
    }

    let startup = match target {
        RestoreTarget::Sessionstore => Some(startup_page(&profile.dir)?),
        RestoreTarget::Recovery | RestoreTarget::Previous => None,
    };
    if let Some(startup) = startup.filter(|page| *page != StartupPage::RestoresSession) {
        if !options.force {
            return Err(ProfileError::StartupPage {
                profile: profile.dir.clone(),
                startup,
            });
        }
        log::warn!("profile does not restore sessions on startup ({startup})");
    }

    let work_dir = match &options.work_dir {
        Some(dir) => dir.clone(),
        None => parent_dir(container),
    };
    let replaced_backup = match profile.slot(target) {
        Some(slot) => Some(backup_replaced(slot, &work_dir, now)?),
        None => None,
    };

    if let Some(parent) = target_path.parent() {
        fs::create_dir_all(parent).map_err(|source| StoreError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    write_atomic(&target_path, snapshot.bytes(), options.durability)?;

    let log = work_dir.join(REPLACE_LOG);
    append_log(&log, target, &profile.dir, now)?;

    log::info!(
        "restored session container (source={container:?}, target={target_path:?}, profile={})",
        profile.name
    );
    Ok(RestoreReport {
        target,
        target_path,
        replaced_backup,
        log,
        startup,
    })
}

fn backup_replaced(
    slot: &SessionSlot,
    work_dir: &Path,
    now: PrimitiveDateTime,
) -> Result<PathBuf, StoreError> {
    let dir = work_dir.join(ORIGINAL_BACKUP_DIR);
    fs::create_dir_all(&dir).map_err(|source| StoreError::Io {
        path: dir.clone(),
        source,
    })?;
    let backup = dir.join(format!(
        "{}_{}.jsonlz4",
        slot.target.name(),
        format_time(now, BACKUP_STAMP)
    ));
    fs::copy(&slot.path, &backup).map_err(|source| StoreError::Io {
        path: backup.clone(),
        source,
    })?;
    Ok(backup)
}

fn append_log(
    log: &Path,
    target: RestoreTarget,
    profile_dir: &Path,
    now: PrimitiveDateTime,
) -> Result<(), StoreError> {
    let io_err = |source| StoreError::Io {
        path: log.to_path_buf(),
        source,
    };
    let mut file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(log)
        .map_err(io_err)?;
    writeln!(
        file,
        "{} - Session replaced as {target} in: {}",
        format_time(now, RECORD_TIME),
        profile_dir.display()
    )
    .map_err(io_err)
}

fn local_now() -> PrimitiveDateTime {
    let now = OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc());
    PrimitiveDateTime::new(now.date(), now.time())
}

fn local_datetime(at: SystemTime) -> PrimitiveDateTime {
    let offset = UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC);
    let at = OffsetDateTime::from(at).to_offset(offset);
    PrimitiveDateTime::new(at.date(), at.time())
}

/// Formats with a static description; these never fail for a valid date-time.
fn format_time(at: PrimitiveDateTime, format: &[BorrowedFormatItem<'_>]) -> String {
    at.format(format).unwrap_or_default()
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn parent_dir(path: &Path) -> PathBuf {
    path.parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."))
}
