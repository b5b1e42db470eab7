// SPDX-FileCopyrightText: 2026 The tabsmith authors
// SPDX-License-Identifier: LicenseRef-Tabsmith-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of tabsmith and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::collections::{HashMap, HashSet};

use serde::Serialize;

use crate::model::json::str_field;
use crate::model::{GroupId, TabHandle, Window, WindowId};
use crate::query::enriched::{UNGROUPED, WITHOUT_TITLE};

use super::Reconciler;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    pub windows: usize,
    /// Flat tabs written back.
    pub tabs: usize,
    /// Soft-deleted tabs dropped from the document.
    pub omitted: usize,
    /// Tabs missing from the flat view, kept at their positions.
    pub retained_unprojected: usize,
    pub renamed_groups: usize,
}

impl Reconciler {
    /// Writes the flat view back into the nested document.
    ///
    /// Each window's tab list is rebuilt from its non-deleted flat tabs in flat order. Tabs the
    /// projection skipped stay where they were. Titles and urls land in the active navigation
    /// entry, group ids in `groupId` (removed for ungrouped tabs), and renamed groups in every
    /// window's definition sharing the id. Running it twice without edits in between changes
    /// nothing the second time.
    pub fn sync(&mut self) -> SyncReport {
        let mut report = SyncReport {
            windows: self.document.windows().len(),
            ..SyncReport::default()
        };

        self.sync_membership(&mut report);
        self.sync_fields(&mut report);
        self.sync_group_names(&mut report);

        self.reproject();
        self.rev += 1;
        log::info!(
            "synced flat view into document (rev={}, tabs={}, omitted={}, retained={}, renamed_groups={})",
            self.rev,
            report.tabs,
            report.omitted,
            report.retained_unprojected,
            report.renamed_groups
        );
        report
    }

    fn sync_membership(&mut self, report: &mut SyncReport) {
        let mut by_window = HashMap::<WindowId, Vec<TabHandle>>::new();
        let mut placed = HashSet::new();
        let mut omitted = HashSet::new();
        for tab in &self.tabs {
            if tab.is_deleted() {
                omitted.insert(tab.raw_tab);
                continue;
            }
            if self.document.window(tab.window_id).is_none() {
                log::warn!(
                    "flat tab refers to a missing window, leaving it in place (tab={}, window_id={})",
                    tab.raw_tab,
                    tab.window_id
                );
                continue;
            }
            by_window.entry(tab.window_id).or_default().push(tab.raw_tab);
            placed.insert(tab.raw_tab);
        }

        let window_ids = self
            .document
            .windows()
            .iter()
            .map(Window::id)
            .collect::<Vec<_>>();
        for window_id in window_ids {
            let Some(window) = self.document.window_mut(window_id) else {
                continue;
            };
            let mut rebuilt = by_window.remove(&window_id).unwrap_or_default();
            let retained = window
                .tabs()
                .iter()
                .copied()
                .enumerate()
                .filter(|(_, handle)| !placed.contains(handle) && !omitted.contains(handle))
                .collect::<Vec<_>>();
            for (position, handle) in retained {
                rebuilt.insert(position.min(rebuilt.len()), handle);
                report.retained_unprojected += 1;
            }
            *window.tabs_mut() = rebuilt;
            window.clamp_selected();
        }

        report.omitted = omitted.len();
    }

    fn sync_fields(&mut self, report: &mut SyncReport) {
        for tab in self.tabs.iter().filter(|tab| !tab.is_deleted()) {
            let Some(node) = self.document.tab_mut(tab.raw_tab) else {
                continue;
            };

            let (title_changed, url_changed) = match node.active_entry() {
                Ok(entry) => (
                    str_field(entry, "title").unwrap_or(WITHOUT_TITLE) != tab.title,
                    str_field(entry, "url").unwrap_or_default() != tab.url,
                ),
                Err(defect) => {
                    log::warn!("cannot write back tab fields (tab={}): {defect}", tab.raw_tab);
                    continue;
                }
            };
            if title_changed || url_changed {
                let title = title_changed.then_some(tab.title.as_str());
                let url = url_changed.then_some(tab.url.as_str());
                if let Err(defect) = node.set_active_title_url(title, url) {
                    log::warn!("cannot write back tab fields (tab={}): {defect}", tab.raw_tab);
                }
            }

            node.set_group_id(tab.group_id.as_ref());
            report.tabs += 1;
        }
    }

    fn sync_group_names(&mut self, report: &mut SyncReport) {
        let mut renames = HashMap::<GroupId, String>::new();
        for tab in self.tabs.iter().filter(|tab| !tab.is_deleted()) {
            let Some(id) = &tab.group_id else {
                continue;
            };
            if tab.group_name == UNGROUPED {
                continue;
            }
            let Some(def) = self
                .document
                .window(tab.window_id)
                .and_then(|window| window.group(id))
            else {
                continue;
            };
            if def.display_name() != tab.group_name {
                renames.insert(id.clone(), tab.group_name.clone());
            }
        }
        if renames.is_empty() {
            return;
        }

        let window_ids = self
            .document
            .windows()
            .iter()
            .map(Window::id)
            .collect::<Vec<_>>();
        for window_id in window_ids {
            let Some(window) = self.document.window_mut(window_id) else {
                continue;
            };
            for def in window.groups_mut() {
                let Some(name) = def.id().and_then(|id| renames.get(id)).cloned() else {
                    continue;
                };
                if def.display_name() != name {
                    def.set_name(&name);
                    report.renamed_groups += 1;
                }
            }
        }
    }
}
