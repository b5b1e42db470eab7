// SPDX-FileCopyrightText: 2026 The tabsmith authors
// SPDX-License-Identifier: LicenseRef-Tabsmith-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of tabsmith and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Structural edits over a loaded session.
//!
//! Every edit is planned against the current state without mutating it, then committed. Batches
//! run on a working copy that replaces the live state only when every edit in the batch
//! committed, so a rejected edit leaves both the flat view and the document untouched. Edits are
//! applied with optimistic concurrency (revision checks) and report a coarse delta.

use std::collections::{BTreeSet, HashMap};
use std::fmt;

use crate::clean::TitleCleaner;
use crate::model::{
    GroupDef, GroupKey, SessionDocument, StructuralDefect, TabHandle, Window, WindowId,
};
use crate::query::enriched::{
    project, EnrichedTab, GroupInfo, GroupMap, Projection, SkippedTab, TabStatus, UNGROUPED,
};

mod sync;

pub use sync::SyncReport;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Edit {
    /// Regroup a tab; moves it to another window when the target group lives there.
    MoveToGroup { tab: TabHandle, target: GroupTarget },
    UpdateTab { tab: TabHandle, patch: TabPatch },
    UpdateGroup { group: GroupKey, patch: GroupPatch },
    SetStatus { tab: TabHandle, status: TabStatus },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GroupTarget {
    /// Clear the tab's group, optionally moving it to `window`.
    Ungrouped { window: Option<WindowId> },
    /// A group by display name. Without a window hint the tab's own window is searched first,
    /// then every other window in order.
    Named {
        name: String,
        window: Option<WindowId>,
    },
    Key(GroupKey),
}

impl GroupTarget {
    /// Maps the `Ungrouped` label to [`GroupTarget::Ungrouped`], anything else to a named target.
    pub fn by_name(name: &str, window: Option<WindowId>) -> Self {
        if name == UNGROUPED {
            Self::Ungrouped { window }
        } else {
            Self::Named {
                name: name.to_owned(),
                window,
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TabPatch {
    pub title: Option<String>,
    pub url: Option<String>,
}

impl TabPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.url.is_none()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupPatch {
    pub name: Option<String>,
    pub color: Option<String>,
    pub collapsed: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplyResult {
    pub rev: u64,
    pub applied: usize,
    pub delta: Delta,
}

/// Coarse description of what an applied batch touched.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Delta {
    /// Tabs that changed window.
    pub moved: Vec<TabHandle>,
    /// Tabs whose group, fields or status changed in place.
    pub updated: Vec<TabHandle>,
    pub groups: Vec<GroupKey>,
    /// Whether the flat view was rebuilt; positions of previously read tabs may have changed.
    pub reprojected: bool,
}

#[derive(Debug, Default)]
struct DeltaBuilder {
    moved: BTreeSet<TabHandle>,
    updated: BTreeSet<TabHandle>,
    groups: BTreeSet<GroupKey>,
    reprojected: bool,
}

impl DeltaBuilder {
    fn record_moved(&mut self, tab: TabHandle) {
        self.updated.remove(&tab);
        self.moved.insert(tab);
    }

    fn record_updated(&mut self, tab: TabHandle) {
        if self.moved.contains(&tab) {
            return;
        }
        self.updated.insert(tab);
    }

    fn record_group(&mut self, key: GroupKey) {
        self.groups.insert(key);
    }

    fn finish(self) -> Delta {
        Delta {
            moved: self.moved.into_iter().collect(),
            updated: self.updated.into_iter().collect(),
            groups: self.groups.into_iter().collect(),
            reprojected: self.reprojected,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditRejected {
    GroupNotInWindow { group: String, window: WindowId },
    UnknownGroup { group: String },
    UnknownWindow { window: WindowId },
    UnknownWindowPosition { position: usize },
}

impl fmt::Display for EditRejected {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::GroupNotInWindow { group, window } => {
                write!(f, "group not found in window (group={group:?}, window_id={window})")
            }
            Self::UnknownGroup { group } => write!(f, "group not found (group={group:?})"),
            Self::UnknownWindow { window } => write!(f, "window not found (window_id={window})"),
            Self::UnknownWindowPosition { position } => {
                write!(f, "no window at position (position={position})")
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditError {
    Rejected(EditRejected),
    Structural(StructuralDefect),
    StaleHandle { tab: TabHandle, generation: u32 },
    Conflict { base_rev: u64, current_rev: u64 },
}

impl fmt::Display for EditError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rejected(rejected) => write!(f, "edit rejected: {rejected}"),
            Self::Structural(defect) => write!(f, "edit aborted: {defect}"),
            Self::StaleHandle { tab, generation } => write!(
                f,
                "tab handle from another load (tab={tab}, current_generation={generation})"
            ),
            Self::Conflict {
                base_rev,
                current_rev,
            } => write!(
                f,
                "stale base_rev (base_rev={base_rev}, current_rev={current_rev})"
            ),
        }
    }
}

impl std::error::Error for EditError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Structural(defect) => Some(defect),
            _ => None,
        }
    }
}

impl From<EditRejected> for EditError {
    fn from(rejected: EditRejected) -> Self {
        Self::Rejected(rejected)
    }
}

impl From<StructuralDefect> for EditError {
    fn from(defect: StructuralDefect) -> Self {
        Self::Structural(defect)
    }
}

/// Owns a session document together with its flat projection and keeps both consistent.
#[derive(Debug, Clone)]
pub struct Reconciler {
    document: SessionDocument,
    tabs: Vec<EnrichedTab>,
    index: HashMap<TabHandle, usize>,
    groups: GroupMap,
    group_infos: Vec<GroupInfo>,
    skipped: Vec<SkippedTab>,
    rev: u64,
}

impl Reconciler {
    pub fn new(document: SessionDocument) -> Self {
        let projection = project(&document);
        let mut reconciler = Self {
            document,
            tabs: Vec::new(),
            index: HashMap::new(),
            groups: GroupMap::new(),
            group_infos: Vec::new(),
            skipped: Vec::new(),
            rev: 0,
        };
        reconciler.install(projection);
        reconciler
    }

    pub fn document(&self) -> &SessionDocument {
        &self.document
    }

    pub fn into_document(self) -> SessionDocument {
        self.document
    }

    /// The flat view, windows outer and tabs inner.
    pub fn tabs(&self) -> &[EnrichedTab] {
        &self.tabs
    }

    pub fn tab(&self, handle: TabHandle) -> Option<&EnrichedTab> {
        self.index.get(&handle).map(|position| &self.tabs[*position])
    }

    pub fn groups(&self) -> &GroupMap {
        &self.groups
    }

    pub fn group_infos(&self) -> &[GroupInfo] {
        &self.group_infos
    }

    /// Live tabs left out of the flat view. They stay in the document untouched.
    pub fn skipped(&self) -> &[SkippedTab] {
        &self.skipped
    }

    pub fn rev(&self) -> u64 {
        self.rev
    }

    /// Current position of the window holding `handle`.
    pub fn window_index_of(&self, handle: TabHandle) -> Option<usize> {
        let tab = self.tab(handle)?;
        self.document.window_position(tab.window_id)
    }

    pub fn apply(&mut self, edit: Edit) -> Result<ApplyResult, EditError> {
        self.apply_at(self.rev, std::slice::from_ref(&edit))
    }

    pub fn apply_all(&mut self, edits: &[Edit]) -> Result<ApplyResult, EditError> {
        self.apply_at(self.rev, edits)
    }

    /// Applies `edits` as one all-or-nothing batch on top of `base_rev`.
    pub fn apply_at(&mut self, base_rev: u64, edits: &[Edit]) -> Result<ApplyResult, EditError> {
        let result = self.apply_batch(base_rev, edits);
        match &result {
            Ok(applied) if applied.applied > 0 => log::info!(
                "applied {} edit(s) (rev={}, moved={}, updated={}, groups={})",
                applied.applied,
                applied.rev,
                applied.delta.moved.len(),
                applied.delta.updated.len(),
                applied.delta.groups.len()
            ),
            Ok(_) => {}
            Err(err) => log::warn!("edit batch rejected, session unchanged: {err}"),
        }
        result
    }

    fn apply_batch(&mut self, base_rev: u64, edits: &[Edit]) -> Result<ApplyResult, EditError> {
        let current_rev = self.rev;
        if base_rev != current_rev {
            return Err(EditError::Conflict {
                base_rev,
                current_rev,
            });
        }

        if edits.is_empty() {
            return Ok(ApplyResult {
                rev: current_rev,
                applied: 0,
                delta: Delta::default(),
            });
        }

        let mut delta = DeltaBuilder::default();
        if let [edit] = edits {
            let plan = self.plan(edit)?;
            self.commit(plan, &mut delta);
        } else {
            let mut working = self.clone();
            for edit in edits {
                let plan = working.plan(edit)?;
                working.commit(plan, &mut delta);
            }
            *self = working;
        }
        self.rev += 1;

        Ok(ApplyResult {
            rev: self.rev,
            applied: edits.len(),
            delta: delta.finish(),
        })
    }

    /// Cleans every live tab title, always starting from the title as first loaded.
    pub fn clean_titles(&mut self, cleaner: &TitleCleaner) -> Result<ApplyResult, EditError> {
        let edits = self
            .tabs
            .iter()
            .filter_map(|tab| {
                let cleaned = cleaner.clean(tab.original_title());
                (cleaned != tab.title).then(|| Edit::UpdateTab {
                    tab: tab.raw_tab,
                    patch: TabPatch {
                        title: Some(cleaned),
                        url: None,
                    },
                })
            })
            .collect::<Vec<_>>();
        self.apply_all(&edits)
    }

    fn install(&mut self, projection: Projection) {
        let Projection {
            tabs,
            groups,
            group_infos,
            skipped,
        } = projection;
        self.index = tabs
            .iter()
            .enumerate()
            .map(|(position, tab)| (tab.raw_tab, position))
            .collect();
        self.tabs = tabs;
        self.groups = groups;
        self.group_infos = group_infos;
        self.skipped = skipped;
    }

    /// Rebuilds the flat view from the document, carrying over state that lives only in the
    /// flat view (status, original title).
    fn reproject(&mut self) {
        let mut projection = project(&self.document);
        for tab in &mut projection.tabs {
            if let Some(previous) = self.tab(tab.raw_tab) {
                tab.status = previous.status;
                tab.original_title = previous.original_title.clone();
            }
        }
        self.install(projection);
    }
}

// Edit planning and commit implementation.
include!("ops_impl.rs");

#[cfg(test)]
mod tests;
