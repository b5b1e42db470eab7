// SPDX-FileCopyrightText: 2026 The tabsmith authors
// SPDX-License-Identifier: LicenseRef-Tabsmith-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of tabsmith and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use serde_json::{Map, Value};

use super::group::GroupDef;
use super::ids::{GroupId, TabHandle, WindowId};
use super::json::{array_field, i64_field};

pub(crate) const TABS_KEY: &str = "tabs";
pub(crate) const GROUPS_KEY: &str = "groups";

/// A live browser window.
///
/// `tabs` and `groups` are owned by the engine; every other key (closed tabs, closed groups,
/// geometry, `selected`, ...) stays in `raw` in its original order.
#[derive(Debug, Clone, PartialEq)]
pub struct Window {
    id: WindowId,
    tabs: Vec<TabHandle>,
    groups: Vec<GroupDef>,
    raw: Map<String, Value>,
}

impl Window {
    /// `raw` must already have its `tabs` and `groups` arrays replaced by empty placeholders; the
    /// tabs themselves live in the document arena. A `tabs` or `groups` value that is not an array
    /// stays in `raw` and is written back as loaded unless the window gains entries.
    pub(crate) fn new(
        id: WindowId,
        tabs: Vec<TabHandle>,
        groups: Vec<GroupDef>,
        raw: Map<String, Value>,
    ) -> Self {
        Self {
            id,
            tabs,
            groups,
            raw,
        }
    }

    pub fn id(&self) -> WindowId {
        self.id
    }

    pub fn tabs(&self) -> &[TabHandle] {
        &self.tabs
    }

    pub(crate) fn tabs_mut(&mut self) -> &mut Vec<TabHandle> {
        &mut self.tabs
    }

    pub fn groups(&self) -> &[GroupDef] {
        &self.groups
    }

    pub(crate) fn groups_mut(&mut self) -> &mut [GroupDef] {
        &mut self.groups
    }

    pub fn group(&self, id: &GroupId) -> Option<&GroupDef> {
        self.groups.iter().find(|group| group.id() == Some(id))
    }

    pub fn has_group(&self, id: &GroupId) -> bool {
        self.group(id).is_some()
    }

    /// First group whose display name equals `name`.
    pub fn group_named(&self, name: &str) -> Option<&GroupDef> {
        self.groups
            .iter()
            .find(|group| group.id().is_some() && group.display_name() == name)
    }

    pub fn raw(&self) -> &Map<String, Value> {
        &self.raw
    }

    /// 1-based selected tab index, when stored.
    pub fn selected(&self) -> Option<i64> {
        i64_field(&self.raw, "selected")
    }

    pub(crate) fn set_selected(&mut self, selected: i64) {
        self.raw.insert("selected".to_owned(), Value::from(selected));
    }

    /// Clamps `selected` into the current tab count. Returns the new value when it changed.
    pub(crate) fn clamp_selected(&mut self) -> Option<i64> {
        let selected = self.selected()?;
        let len = self.tabs.len() as i64;
        if selected > len {
            let clamped = len.max(1);
            self.set_selected(clamped);
            return Some(clamped);
        }
        None
    }

    pub fn closed_tabs(&self) -> &[Value] {
        array_field(&self.raw, "_closedTabs")
    }

    pub fn closed_groups(&self) -> &[Value] {
        array_field(&self.raw, "closedGroups")
    }

    pub(crate) fn to_value(&self, tabs: Vec<Value>) -> Value {
        let mut out = self.raw.clone();
        if !tabs.is_empty() || is_array(&out, TABS_KEY) {
            out.insert(TABS_KEY.to_owned(), Value::Array(tabs));
        }
        if !self.groups.is_empty() || is_array(&out, GROUPS_KEY) {
            let groups = self.groups.iter().map(GroupDef::to_value).collect();
            out.insert(GROUPS_KEY.to_owned(), Value::Array(groups));
        }
        Value::Object(out)
    }
}

fn is_array(map: &Map<String, Value>, key: &str) -> bool {
    map.get(key).is_some_and(Value::is_array)
}
