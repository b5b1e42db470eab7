// SPDX-FileCopyrightText: 2026 The tabsmith authors
// SPDX-License-Identifier: LicenseRef-Tabsmith-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of tabsmith and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::model::json::str_field;
use crate::model::{
    GroupId, GroupKey, SessionDocument, StructuralDefect, TabHandle, TabNode, WindowId,
};

use super::url_key::{domain, url_hash};

/// Group name of tabs without a (resolvable) group.
pub const UNGROUPED: &str = "Ungrouped";
/// Title of tabs whose active entry has none.
pub const WITHOUT_TITLE: &str = "Without Title";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TabStatus {
    #[default]
    Active,
    /// Soft-deleted: kept in the flat view, omitted from the document at sync.
    Delete,
}

/// Flat, denormalized view of one live tab.
///
/// `raw_tab` points at the tab node in the document arena. `window_index` is the window's
/// position when this tab was projected; resolve `window_id` for the current position.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnrichedTab {
    pub title: String,
    pub url: String,
    pub uuid: String,
    pub url_hash: Option<String>,
    pub domain: Option<String>,
    pub favicon: String,
    pub group_id: Option<GroupId>,
    pub group_name: String,
    pub window_id: WindowId,
    pub window_index: usize,
    pub pinned: bool,
    pub hidden: bool,
    pub last_accessed: i64,
    pub status: TabStatus,
    pub raw_tab: TabHandle,
    #[serde(skip)]
    pub(crate) original_title: String,
}

impl EnrichedTab {
    pub fn group_key(&self) -> Option<GroupKey> {
        self.group_id
            .clone()
            .map(|group| GroupKey::new(self.window_id, group))
    }

    /// The title as first loaded, before any edit.
    pub fn original_title(&self) -> &str {
        &self.original_title
    }

    pub fn is_deleted(&self) -> bool {
        self.status == TabStatus::Delete
    }

    pub(crate) fn set_url(&mut self, url: &str) {
        self.url = url.to_owned();
        self.url_hash = url_hash(url);
        self.domain = (!url.is_empty()).then(|| domain(url));
    }
}

/// Window-scoped group names.
pub type GroupMap = BTreeMap<GroupKey, String>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupInfo {
    pub key: GroupKey,
    pub window_index: usize,
    pub name: String,
    pub color: String,
    pub collapsed: bool,
}

/// A live tab left out of the flat view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedTab {
    pub window_index: usize,
    pub position: usize,
    pub handle: TabHandle,
    pub defect: StructuralDefect,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Projection {
    pub tabs: Vec<EnrichedTab>,
    pub groups: GroupMap,
    pub group_infos: Vec<GroupInfo>,
    pub skipped: Vec<SkippedTab>,
}

/// Projects every navigable live tab, windows outer and tabs inner, in document order.
///
/// Tabs without a usable active entry are logged and skipped.
pub fn project(document: &SessionDocument) -> Projection {
    let mut projection = Projection::default();

    for (window_index, window) in document.windows().iter().enumerate() {
        let window_id = window.id();
        let mut names = HashMap::<&GroupId, String>::new();
        for group in window.groups() {
            let Some(id) = group.id() else {
                log::warn!("group definition without a usable id (window={window_index})");
                continue;
            };
            if names.contains_key(id) {
                continue;
            }
            let name = group.display_name();
            let key = GroupKey::new(window_id, id.clone());
            projection.groups.insert(key.clone(), name.clone());
            projection.group_infos.push(GroupInfo {
                key,
                window_index,
                name: name.clone(),
                color: group.color().to_owned(),
                collapsed: group.collapsed(),
            });
            names.insert(id, name);
        }

        for (position, handle) in window.tabs().iter().copied().enumerate() {
            let projected = document
                .tab(handle)
                .ok_or(StructuralDefect::UnknownTab { tab: handle })
                .and_then(|node| enrich(node, handle, window_id, window_index, &names));
            match projected {
                Ok(tab) => projection.tabs.push(tab),
                Err(defect) => {
                    log::warn!(
                        "skipping tab (window={window_index}, position={position}): {defect}"
                    );
                    projection.skipped.push(SkippedTab {
                        window_index,
                        position,
                        handle,
                        defect,
                    });
                }
            }
        }
    }

    projection
}

fn enrich(
    node: &TabNode,
    handle: TabHandle,
    window_id: WindowId,
    window_index: usize,
    names: &HashMap<&GroupId, String>,
) -> Result<EnrichedTab, StructuralDefect> {
    let entry = node.active_entry()?;
    let title = str_field(entry, "title").unwrap_or(WITHOUT_TITLE).to_owned();
    let url = str_field(entry, "url").unwrap_or_default().to_owned();
    let uuid = str_field(entry, "docshellUUID")
        .unwrap_or_default()
        .replace(['{', '}'], "");

    let group_id = node.group_id();
    let group_name = match &group_id {
        Some(id) => names.get(id).cloned().unwrap_or_else(|| {
            log::warn!(
                "tab references a group missing from its window (window={window_index}, group={id})"
            );
            UNGROUPED.to_owned()
        }),
        None => UNGROUPED.to_owned(),
    };

    Ok(EnrichedTab {
        url_hash: url_hash(&url),
        domain: (!url.is_empty()).then(|| domain(&url)),
        original_title: title.clone(),
        title,
        url,
        uuid,
        favicon: node.image().to_owned(),
        group_id,
        group_name,
        window_id,
        window_index,
        pinned: node.pinned(),
        hidden: node.hidden(),
        last_accessed: node.last_accessed(),
        status: TabStatus::Active,
        raw_tab: handle,
    })
}
