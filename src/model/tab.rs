// SPDX-FileCopyrightText: 2026 The tabsmith authors
// SPDX-License-Identifier: LicenseRef-Tabsmith-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of tabsmith and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use serde_json::{Map, Value};

use super::defect::StructuralDefect;
use super::ids::GroupId;
use super::json::{array_field, bool_field, i64_field, str_field};

const GROUP_ID_KEY: &str = "groupId";

/// One live tab as stored in a window's `tabs` array.
///
/// The node keeps the full original value so fields the engine does not understand survive a
/// load/save cycle untouched. A value that is not an object is kept as is and never projected.
#[derive(Debug, Clone, PartialEq)]
pub struct TabNode {
    raw: Value,
}

impl TabNode {
    pub fn from_value(raw: Value) -> Self {
        Self { raw }
    }

    pub fn raw(&self) -> &Value {
        &self.raw
    }

    pub fn to_value(&self) -> Value {
        self.raw.clone()
    }

    fn object(&self) -> Option<&Map<String, Value>> {
        self.raw.as_object()
    }

    pub fn entries(&self) -> &[Value] {
        self.object()
            .map(|raw| array_field(raw, "entries"))
            .unwrap_or(&[])
    }

    /// The stored 1-based active entry index. Absent means the first entry.
    pub fn index(&self) -> i64 {
        self.object()
            .and_then(|raw| i64_field(raw, "index"))
            .unwrap_or(1)
    }

    /// Zero-based position of the active entry.
    pub fn active_entry_position(&self) -> Result<usize, StructuralDefect> {
        if self.object().is_none() {
            return Err(StructuralDefect::TabNotObject);
        }
        let len = self.entries().len();
        if len == 0 {
            return Err(StructuralDefect::NoEntries);
        }
        let index = self.index();
        if index < 1 || index as u64 > len as u64 {
            return Err(StructuralDefect::ActiveIndexOutOfRange { index, len });
        }
        Ok((index - 1) as usize)
    }

    pub fn active_entry(&self) -> Result<&Map<String, Value>, StructuralDefect> {
        let position = self.active_entry_position()?;
        self.entries()[position]
            .as_object()
            .ok_or(StructuralDefect::EntryNotObject { position })
    }

    fn active_entry_mut(&mut self) -> Result<&mut Map<String, Value>, StructuralDefect> {
        let position = self.active_entry_position()?;
        self.raw
            .get_mut("entries")
            .and_then(Value::as_array_mut)
            .and_then(|entries| entries.get_mut(position))
            .and_then(Value::as_object_mut)
            .ok_or(StructuralDefect::EntryNotObject { position })
    }

    /// Writes `title`/`url` into the active entry, touching only fields whose value changes.
    pub fn set_active_title_url(
        &mut self,
        title: Option<&str>,
        url: Option<&str>,
    ) -> Result<(), StructuralDefect> {
        let entry = self.active_entry_mut()?;
        if let Some(title) = title {
            if str_field(entry, "title") != Some(title) {
                entry.insert("title".to_owned(), Value::String(title.to_owned()));
            }
        }
        if let Some(url) = url {
            if str_field(entry, "url") != Some(url) {
                entry.insert("url".to_owned(), Value::String(url.to_owned()));
            }
        }
        Ok(())
    }

    pub fn raw_group_id(&self) -> Option<&Value> {
        self.object().and_then(|raw| raw.get(GROUP_ID_KEY))
    }

    pub fn group_id(&self) -> Option<GroupId> {
        self.raw_group_id().and_then(GroupId::from_json)
    }

    /// Sets or clears `groupId`. Clearing removes the key rather than writing `null`.
    pub fn set_group_id(&mut self, group: Option<&GroupId>) {
        let unchanged = self.group_id().as_ref() == group;
        let Some(raw) = self.raw.as_object_mut() else {
            return;
        };
        match group {
            Some(group) if !unchanged => {
                raw.insert(GROUP_ID_KEY.to_owned(), group.to_json());
            }
            Some(_) => {}
            None => {
                raw.shift_remove(GROUP_ID_KEY);
            }
        }
    }

    pub fn pinned(&self) -> bool {
        self.object().is_some_and(|raw| bool_field(raw, "pinned"))
    }

    pub fn hidden(&self) -> bool {
        self.object().is_some_and(|raw| bool_field(raw, "hidden"))
    }

    pub fn last_accessed(&self) -> i64 {
        self.object()
            .and_then(|raw| i64_field(raw, "lastAccessed"))
            .unwrap_or(0)
    }

    pub fn image(&self) -> &str {
        self.object()
            .and_then(|raw| str_field(raw, "image"))
            .unwrap_or("")
    }
}
