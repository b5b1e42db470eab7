// SPDX-FileCopyrightText: 2026 The tabsmith authors
// SPDX-License-Identifier: LicenseRef-Tabsmith-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of tabsmith and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use serde_json::Value;

use super::ids::GroupId;
use super::json::{bool_field, str_field};

/// A group definition from a window's `groups` list.
///
/// A definition that is not an object has no id and is written back unchanged.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupDef {
    id: Option<GroupId>,
    raw: Value,
}

impl GroupDef {
    pub fn from_value(raw: Value) -> Self {
        let id = raw.get("id").and_then(GroupId::from_json);
        Self { id, raw }
    }

    pub fn raw(&self) -> &Value {
        &self.raw
    }

    pub fn to_value(&self) -> Value {
        self.raw.clone()
    }

    fn field(&self, key: &str) -> Option<&str> {
        self.raw.as_object().and_then(|raw| str_field(raw, key))
    }

    fn set(&mut self, key: &str, value: Value) {
        if let Some(raw) = self.raw.as_object_mut() {
            raw.insert(key.to_owned(), value);
        }
    }

    /// `None` when the stored id is missing or not a usable group id.
    pub fn id(&self) -> Option<&GroupId> {
        self.id.as_ref()
    }

    pub fn name(&self) -> Option<&str> {
        self.field("name")
    }

    /// The stored name, or `Group <id>` for unnamed groups.
    pub fn display_name(&self) -> String {
        match (self.name(), &self.id) {
            (Some(name), _) => name.to_owned(),
            (None, Some(id)) => format!("Group {id}"),
            (None, None) => "Group".to_owned(),
        }
    }

    pub fn color(&self) -> &str {
        self.field("color").unwrap_or("")
    }

    pub fn collapsed(&self) -> bool {
        self.raw
            .as_object()
            .is_some_and(|raw| bool_field(raw, "collapsed"))
    }

    pub fn set_name(&mut self, name: &str) {
        self.set("name", Value::String(name.to_owned()));
    }

    pub fn set_color(&mut self, color: &str) {
        self.set("color", Value::String(color.to_owned()));
    }

    pub fn set_collapsed(&mut self, collapsed: bool) {
        self.set("collapsed", Value::Bool(collapsed));
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::GroupDef;
    use crate::model::GroupId;

    fn def(value: serde_json::Value) -> GroupDef {
        GroupDef::from_value(value)
    }

    #[test]
    fn unnamed_groups_display_their_id() {
        assert_eq!(def(json!({"id": 3})).display_name(), "Group 3");
        assert_eq!(def(json!({"id": 3, "name": "Work"})).display_name(), "Work");
    }

    #[test]
    fn unusable_ids_are_none() {
        assert_eq!(def(json!({"id": null, "name": "x"})).id(), None);
        assert_eq!(def(json!({"id": "g1"})).id(), Some(&GroupId::Text("g1".to_owned())));
    }

    #[test]
    fn non_object_definitions_are_kept_verbatim() {
        let mut group = def(json!("stray"));
        assert_eq!(group.id(), None);
        group.set_name("ignored");
        assert_eq!(group.display_name(), "Group");
        assert_eq!(group.to_value(), json!("stray"));
    }

    #[test]
    fn setters_keep_unknown_fields() {
        let mut group = def(json!({"id": 1, "name": "a", "color": "blue", "extra": [1]}));
        group.set_name("b");
        group.set_color("red");
        group.set_collapsed(true);
        assert_eq!(
            group.to_value(),
            json!({"id": 1, "name": "b", "color": "red", "extra": [1], "collapsed": true})
        );
    }
}
