// SPDX-FileCopyrightText: 2026 The tabsmith authors
// SPDX-License-Identifier: LicenseRef-Tabsmith-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of tabsmith and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

// Edit planning/commit helpers used by `Reconciler::apply_at`.
// Keeps `ops::mod` focused on public edit types and orchestration.

/// A validated edit. Committing a plan performs no further checks and cannot fail.
#[derive(Debug)]
enum Plan {
    Noop,
    Regroup {
        tab: TabHandle,
        group: Option<GroupKey>,
    },
    Relocate {
        tab: TabHandle,
        from: WindowId,
        from_position: usize,
        to: WindowId,
        group: Option<GroupKey>,
    },
    UpdateTab {
        tab: TabHandle,
        patch: TabPatch,
    },
    UpdateGroup {
        key: GroupKey,
        patch: GroupPatch,
    },
    SetStatus {
        tab: TabHandle,
        status: TabStatus,
    },
}

impl Reconciler {
    fn plan(&self, edit: &Edit) -> Result<Plan, EditError> {
        match edit {
            Edit::MoveToGroup { tab, target } => self.plan_move(*tab, target),
            Edit::UpdateTab { tab, patch } => {
                self.flat(*tab)?;
                if patch.is_empty() {
                    return Ok(Plan::Noop);
                }
                let node = self
                    .document
                    .tab(*tab)
                    .ok_or(StructuralDefect::UnknownTab { tab: *tab })?;
                node.active_entry()?;
                Ok(Plan::UpdateTab {
                    tab: *tab,
                    patch: patch.clone(),
                })
            }
            Edit::UpdateGroup { group, patch } => {
                if !self.require_window(group.window)?.has_group(&group.group) {
                    return Err(EditRejected::UnknownGroup {
                        group: group.to_string(),
                    }
                    .into());
                }
                Ok(Plan::UpdateGroup {
                    key: group.clone(),
                    patch: patch.clone(),
                })
            }
            Edit::SetStatus { tab, status } => {
                self.flat(*tab)?;
                Ok(Plan::SetStatus {
                    tab: *tab,
                    status: *status,
                })
            }
        }
    }

    fn plan_move(&self, handle: TabHandle, target: &GroupTarget) -> Result<Plan, EditError> {
        self.flat(handle)?;
        let Some((from, from_position)) = self.document.tab_location(handle) else {
            return Err(StructuralDefect::DetachedTab { tab: handle }.into());
        };

        let (to, group) = match target {
            GroupTarget::Ungrouped { window } => {
                let to = window.unwrap_or(from);
                self.require_window(to)?;
                (to, None)
            }
            GroupTarget::Named {
                name,
                window: Some(window),
            } => {
                let group = self
                    .require_window(*window)?
                    .group_named(name)
                    .and_then(GroupDef::id)
                    .cloned()
                    .ok_or_else(|| EditRejected::GroupNotInWindow {
                        group: name.clone(),
                        window: *window,
                    })?;
                (*window, Some(group))
            }
            GroupTarget::Named { name, window: None } => {
                let others = self
                    .document
                    .windows()
                    .iter()
                    .map(Window::id)
                    .filter(|id| *id != from);
                std::iter::once(from)
                    .chain(others)
                    .find_map(|id| {
                        let group = self.document.window(id)?.group_named(name)?.id()?;
                        Some((id, Some(group.clone())))
                    })
                    .ok_or_else(|| EditRejected::UnknownGroup {
                        group: name.clone(),
                    })?
            }
            GroupTarget::Key(key) => {
                if !self.require_window(key.window)?.has_group(&key.group) {
                    return Err(EditRejected::GroupNotInWindow {
                        group: key.group.to_string(),
                        window: key.window,
                    }
                    .into());
                }
                (key.window, Some(key.group.clone()))
            }
        };

        let group = group.map(|group| GroupKey::new(to, group));
        if to == from {
            Ok(Plan::Regroup { tab: handle, group })
        } else {
            Ok(Plan::Relocate {
                tab: handle,
                from,
                from_position,
                to,
                group,
            })
        }
    }

    fn commit(&mut self, plan: Plan, delta: &mut DeltaBuilder) {
        match plan {
            Plan::Noop => {}
            Plan::Regroup { tab, group } => {
                if let Some(node) = self.document.tab_mut(tab) {
                    node.set_group_id(group.as_ref().map(|key| &key.group));
                }
                let name = self.group_name(group.as_ref());
                if let Some(flat) = self.flat_mut(tab) {
                    flat.group_id = group.map(|key| key.group);
                    flat.group_name = name;
                }
                delta.record_updated(tab);
            }
            Plan::Relocate {
                tab,
                from,
                from_position,
                to,
                group,
            } => {
                if let Some(window) = self.document.window_mut(from) {
                    window.tabs_mut().remove(from_position);
                    if let Some(selected) = window.clamp_selected() {
                        log::debug!("clamped selected tab (window_id={from}, selected={selected})");
                    }
                }
                if let Some(window) = self.document.window_mut(to) {
                    window.tabs_mut().push(tab);
                }
                if let Some(node) = self.document.tab_mut(tab) {
                    node.set_group_id(group.as_ref().map(|key| &key.group));
                }
                log::debug!("moved tab across windows (tab={tab}, from={from}, to={to})");

                self.reproject();
                delta.record_moved(tab);
                delta.reprojected = true;
            }
            Plan::UpdateTab { tab, patch } => {
                if let Some(node) = self.document.tab_mut(tab) {
                    if let Err(defect) =
                        node.set_active_title_url(patch.title.as_deref(), patch.url.as_deref())
                    {
                        log::error!("tab changed between plan and commit (tab={tab}): {defect}");
                    }
                }
                if let Some(flat) = self.flat_mut(tab) {
                    if let Some(title) = patch.title {
                        flat.title = title;
                    }
                    if let Some(url) = patch.url {
                        flat.set_url(&url);
                    }
                }
                delta.record_updated(tab);
            }
            Plan::UpdateGroup { key, patch } => {
                let windows = self
                    .document
                    .windows()
                    .iter()
                    .filter(|window| window.has_group(&key.group))
                    .map(Window::id)
                    .collect::<Vec<_>>();

                for window_id in &windows {
                    let Some(window) = self.document.window_mut(*window_id) else {
                        continue;
                    };
                    let defs = window
                        .groups_mut()
                        .iter_mut()
                        .filter(|def| def.id() == Some(&key.group));
                    for def in defs {
                        if let Some(name) = &patch.name {
                            def.set_name(name);
                        }
                        if let Some(color) = &patch.color {
                            def.set_color(color);
                        }
                        if let Some(collapsed) = patch.collapsed {
                            def.set_collapsed(collapsed);
                        }
                    }
                    delta.record_group(GroupKey::new(*window_id, key.group.clone()));
                }

                self.reproject();
                delta.reprojected = true;
                if patch.name.is_some() {
                    self.tabs
                        .iter()
                        .filter(|tab| {
                            tab.group_id.as_ref() == Some(&key.group)
                                && windows.contains(&tab.window_id)
                        })
                        .for_each(|tab| delta.record_updated(tab.raw_tab));
                }
            }
            Plan::SetStatus { tab, status } => {
                if let Some(flat) = self.flat_mut(tab) {
                    flat.status = status;
                }
                delta.record_updated(tab);
            }
        }
    }

    fn flat(&self, handle: TabHandle) -> Result<&EnrichedTab, EditError> {
        let generation = self.document.generation();
        if handle.generation() != generation {
            return Err(EditError::StaleHandle {
                tab: handle,
                generation,
            });
        }
        self.tab(handle)
            .ok_or_else(|| StructuralDefect::UnknownTab { tab: handle }.into())
    }

    fn flat_mut(&mut self, handle: TabHandle) -> Option<&mut EnrichedTab> {
        let position = *self.index.get(&handle)?;
        self.tabs.get_mut(position)
    }

    fn require_window(&self, id: WindowId) -> Result<&Window, EditRejected> {
        self.document
            .window(id)
            .ok_or(EditRejected::UnknownWindow { window: id })
    }

    fn group_name(&self, key: Option<&GroupKey>) -> String {
        key.and_then(|key| self.groups.get(key))
            .cloned()
            .unwrap_or_else(|| UNGROUPED.to_owned())
    }
}
