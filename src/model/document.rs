// SPDX-FileCopyrightText: 2026 The tabsmith authors
// SPDX-License-Identifier: LicenseRef-Tabsmith-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of tabsmith and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};

use serde_json::{Map, Value};

use super::group::GroupDef;
use super::ids::{TabHandle, WindowId};
use super::json::array_field;
use super::tab::TabNode;
use super::window::{Window, GROUPS_KEY, TABS_KEY};

const WINDOWS_KEY: &str = "windows";

static NEXT_GENERATION: AtomicU32 = AtomicU32::new(1);

type RawObject = Map<String, Value>;

/// The decoded session graph.
///
/// Tabs live in an append-only arena and windows refer to them by [`TabHandle`]. Windows are
/// identified by a generated [`WindowId`]; their array position is looked up, never stored.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionDocument {
    generation: u32,
    windows: Vec<Window>,
    positions: HashMap<WindowId, usize>,
    next_window_id: u64,
    arena: Vec<TabNode>,
    raw: RawObject,
}

impl SessionDocument {
    /// Builds the graph from decoded JSON.
    ///
    /// The top level and `windows` must have the expected container types. Everything below is
    /// read per entity: a window whose `tabs` or `groups` is not an array keeps the value as
    /// loaded, and elements that are not objects are kept in place and never projected.
    pub fn from_value(value: Value) -> Result<Self, serde_json::Error> {
        let mut raw: RawObject = serde_json::from_value(value)?;
        let raw_windows: Vec<RawObject> = match raw.get_mut(WINDOWS_KEY) {
            Some(windows) => serde_json::from_value(windows.take())?,
            None => Vec::new(),
        };

        let mut document = Self {
            generation: NEXT_GENERATION.fetch_add(1, Ordering::Relaxed),
            windows: Vec::with_capacity(raw_windows.len()),
            positions: HashMap::new(),
            next_window_id: 0,
            arena: Vec::new(),
            raw,
        };

        for (position, mut raw_window) in raw_windows.into_iter().enumerate() {
            let raw_tabs = take_array(&mut raw_window, TABS_KEY, position);
            let groups = take_array(&mut raw_window, GROUPS_KEY, position);

            let tabs = raw_tabs
                .into_iter()
                .map(|tab| document.alloc_tab(TabNode::from_value(tab)))
                .collect();
            let groups = groups.into_iter().map(GroupDef::from_value).collect();
            let id = document.alloc_window_id();
            document
                .windows
                .push(Window::new(id, tabs, groups, raw_window));
        }
        document.reindex();

        Ok(document)
    }

    /// Rebuilds the nested JSON document.
    pub fn to_value(&self) -> Value {
        let mut out = self.raw.clone();
        if out.contains_key(WINDOWS_KEY) || !self.windows.is_empty() {
            let windows = self
                .windows
                .iter()
                .map(|window| {
                    let tabs = window
                        .tabs()
                        .iter()
                        .filter_map(|handle| self.tab(*handle))
                        .map(TabNode::to_value)
                        .collect();
                    window.to_value(tabs)
                })
                .collect();
            out.insert(WINDOWS_KEY.to_owned(), Value::Array(windows));
        }
        Value::Object(out)
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }

    pub fn windows(&self) -> &[Window] {
        &self.windows
    }

    pub fn window(&self, id: WindowId) -> Option<&Window> {
        self.window_position(id).map(|position| &self.windows[position])
    }

    pub(crate) fn window_mut(&mut self, id: WindowId) -> Option<&mut Window> {
        let position = self.window_position(id)?;
        self.windows.get_mut(position)
    }

    pub fn window_position(&self, id: WindowId) -> Option<usize> {
        self.positions.get(&id).copied()
    }

    pub fn window_id_at(&self, position: usize) -> Option<WindowId> {
        self.windows.get(position).map(Window::id)
    }

    /// Appends an empty window with a fresh id.
    #[cfg(test)]
    pub(crate) fn push_window(&mut self) -> WindowId {
        let id = self.alloc_window_id();
        let mut raw = RawObject::new();
        raw.insert(TABS_KEY.to_owned(), Value::Array(Vec::new()));
        self.windows.push(Window::new(id, Vec::new(), Vec::new(), raw));
        self.reindex();
        id
    }

    /// Removes an empty window. Windows that still own tabs are never removed.
    #[cfg(test)]
    pub(crate) fn remove_empty_window(&mut self, id: WindowId) -> bool {
        let Some(position) = self.window_position(id) else {
            return false;
        };
        if !self.windows[position].tabs().is_empty() {
            return false;
        }
        self.windows.remove(position);
        self.reindex();
        true
    }

    pub fn tab(&self, handle: TabHandle) -> Option<&TabNode> {
        if handle.generation() != self.generation {
            return None;
        }
        self.arena.get(handle.slot())
    }

    pub(crate) fn tab_mut(&mut self, handle: TabHandle) -> Option<&mut TabNode> {
        if handle.generation() != self.generation {
            return None;
        }
        self.arena.get_mut(handle.slot())
    }

    /// The window currently holding `handle` and the tab's position in it.
    pub fn tab_location(&self, handle: TabHandle) -> Option<(WindowId, usize)> {
        self.windows.iter().find_map(|window| {
            window
                .tabs()
                .iter()
                .position(|candidate| *candidate == handle)
                .map(|position| (window.id(), position))
        })
    }

    pub fn tab_count(&self) -> usize {
        self.windows.iter().map(|window| window.tabs().len()).sum()
    }

    pub fn closed_windows(&self) -> &[Value] {
        array_field(&self.raw, "_closedWindows")
    }

    pub fn saved_groups(&self) -> &[Value] {
        array_field(&self.raw, "savedGroups")
    }

    fn alloc_tab(&mut self, node: TabNode) -> TabHandle {
        let handle = TabHandle::new(self.generation, self.arena.len());
        self.arena.push(node);
        handle
    }

    fn alloc_window_id(&mut self) -> WindowId {
        let id = WindowId::from_raw(self.next_window_id);
        self.next_window_id += 1;
        id
    }

    fn reindex(&mut self) {
        self.positions = self
            .windows
            .iter()
            .enumerate()
            .map(|(position, window)| (window.id(), position))
            .collect();
    }
}

/// Takes the array under `key`, leaving an empty array as placeholder. Any other value stays.
fn take_array(raw_window: &mut RawObject, key: &str, window: usize) -> Vec<Value> {
    match raw_window.get_mut(key) {
        Some(Value::Array(items)) => std::mem::take(items),
        Some(_) => {
            log::warn!("window {key} is not an array, keeping it as loaded (window={window})");
            Vec::new()
        }
        None => Vec::new(),
    }
}
