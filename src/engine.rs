// SPDX-FileCopyrightText: 2026 The tabsmith authors
// SPDX-License-Identifier: LicenseRef-Tabsmith-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of tabsmith and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! The engine boundary a UI drives: load a container, read projections, edit, save.
//!
//! The engine owns at most one loaded session. Loading another container replaces it, and
//! handles issued for the previous load stop resolving.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::clean::TitleCleaner;
use crate::config::Settings;
use crate::model::TabHandle;
use crate::ops::{ApplyResult, Edit, EditError, EditRejected, GroupTarget, Reconciler, SyncReport};
use crate::query::{extract, EnrichedTab, ExtrasBundle, GroupInfo, GroupMap};
use crate::store::{BackupReport, SessionFile, StoreError};

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("no session loaded")]
    NotLoaded,
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Edit(#[from] EditError),
}

/// Projections handed out after a load.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadOutcome {
    pub tabs: Vec<EnrichedTab>,
    pub groups: GroupMap,
    pub group_infos: Vec<GroupInfo>,
    /// Live tabs left out of `tabs` for structural defects.
    pub skipped: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SaveOutcome {
    pub path: PathBuf,
    pub sync: SyncReport,
    pub backup: Option<BackupReport>,
}

#[derive(Debug)]
struct Loaded {
    file: SessionFile,
    reconciler: Reconciler,
}

#[derive(Debug, Default)]
pub struct SessionEngine {
    settings: Settings,
    loaded: Option<Loaded>,
}

impl SessionEngine {
    pub fn new(settings: Settings) -> Self {
        Self {
            settings,
            loaded: None,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded.is_some()
    }

    pub fn load(&mut self, path: &Path) -> Result<LoadOutcome, EngineError> {
        let file = self.session_file(path);
        let document = file.load()?;
        let reconciler = Reconciler::new(document);
        let outcome = LoadOutcome {
            tabs: reconciler.tabs().to_vec(),
            groups: reconciler.groups().clone(),
            group_infos: reconciler.group_infos().to_vec(),
            skipped: reconciler.skipped().len(),
        };
        self.loaded = Some(Loaded { file, reconciler });
        Ok(outcome)
    }

    pub fn reconciler(&self) -> Result<&Reconciler, EngineError> {
        self.loaded
            .as_ref()
            .map(|loaded| &loaded.reconciler)
            .ok_or(EngineError::NotLoaded)
    }

    fn reconciler_mut(&mut self) -> Result<&mut Reconciler, EngineError> {
        self.loaded
            .as_mut()
            .map(|loaded| &mut loaded.reconciler)
            .ok_or(EngineError::NotLoaded)
    }

    pub fn extras(&self) -> Result<ExtrasBundle, EngineError> {
        Ok(extract(self.reconciler()?.document()))
    }

    /// Moves `tab` into the group called `group_name`, or out of any group for `Ungrouped`.
    ///
    /// `window_hint` is a window position; without one the group is looked up in the tab's own
    /// window first.
    pub fn move_to_group(
        &mut self,
        tab: TabHandle,
        group_name: &str,
        window_hint: Option<usize>,
    ) -> Result<ApplyResult, EngineError> {
        let reconciler = self.reconciler_mut()?;
        let window = window_hint
            .map(|position| {
                reconciler
                    .document()
                    .window_id_at(position)
                    .ok_or(EditRejected::UnknownWindowPosition { position })
            })
            .transpose()
            .map_err(EditError::from)?;

        let edit = Edit::MoveToGroup {
            tab,
            target: GroupTarget::by_name(group_name, window),
        };
        Ok(reconciler.apply(edit)?)
    }

    pub fn apply(&mut self, edits: &[Edit]) -> Result<ApplyResult, EngineError> {
        Ok(self.reconciler_mut()?.apply_all(edits)?)
    }

    pub fn clean_titles(&mut self, cleaner: &TitleCleaner) -> Result<ApplyResult, EngineError> {
        Ok(self.reconciler_mut()?.clean_titles(cleaner)?)
    }

    /// Syncs the flat view into the document and writes it to `target`, or back to the loaded
    /// container. With backups enabled an existing target is backed up first.
    pub fn sync_and_save(&mut self, target: Option<&Path>) -> Result<SaveOutcome, EngineError> {
        let loaded = self.loaded.as_mut().ok_or(EngineError::NotLoaded)?;
        let path = target.unwrap_or(loaded.file.path()).to_path_buf();
        let file = SessionFile::new(&path)
            .with_durability(self.settings.durability)
            .with_verification(self.settings.verify_before_write);

        let backup = if self.settings.backup.enabled && path.exists() {
            Some(file.backup(&self.settings.backup.root_for(&path))?)
        } else {
            None
        };

        let sync = loaded.reconciler.sync();
        file.save(loaded.reconciler.document())?;
        Ok(SaveOutcome { path, sync, backup })
    }

    pub fn export_json(&self, out: &Path, pretty: bool) -> Result<(), EngineError> {
        let loaded = self.loaded.as_ref().ok_or(EngineError::NotLoaded)?;
        loaded
            .file
            .export_json(loaded.reconciler.document(), out, pretty)?;
        Ok(())
    }

    fn session_file(&self, path: &Path) -> SessionFile {
        SessionFile::new(path)
            .with_durability(self.settings.durability)
            .with_verification(self.settings.verify_before_write)
    }
}
