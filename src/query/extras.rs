// SPDX-FileCopyrightText: 2026 The tabsmith authors
// SPDX-License-Identifier: LicenseRef-Tabsmith-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of tabsmith and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Read-only views of closed tabs, closed groups, closed windows and saved groups.
//!
//! The browser stores these in four slightly different shapes (navigation entries at the top
//! level or nested under `state`); every tab is normalized into one [`ExtractedTab`].

use std::collections::HashMap;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::model::json::{array_field, bool_field, i64_field, object_field, str_field};
use crate::model::{GroupId, SessionDocument};

use super::enriched::{UNGROUPED, WITHOUT_TITLE};
use super::url_key::{domain, url_hash};

type RawObject = Map<String, Value>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractedTabKind {
    ClosedTab,
    ClosedTabInGroup,
    ClosedWindowTab,
    ClosedWindowClosedTab,
    ClosedWindowClosedGroupTab,
    SavedGroupTab,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HistoryEntry {
    pub title: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtractedTab {
    pub kind: ExtractedTabKind,
    pub title: String,
    pub url: String,
    pub domain: String,
    pub url_hash: Option<String>,
    pub history: Vec<HistoryEntry>,
    pub image: String,
    pub last_accessed: i64,
    pub group_id: Option<GroupId>,
    pub group_name: Option<String>,
    pub window_index: Option<usize>,
    pub closed_at: Option<i64>,
    pub source_window_id: Option<String>,
    pub pinned: bool,
    pub hidden: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClosedGroup {
    pub window_index: Option<usize>,
    pub id: Option<GroupId>,
    pub name: String,
    pub color: String,
    pub closed_at: i64,
    pub tabs: Vec<ExtractedTab>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupSummary {
    pub id: GroupId,
    pub name: String,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClosedWindow {
    pub closed_at: i64,
    pub tabs: Vec<ExtractedTab>,
    pub groups: Vec<GroupSummary>,
    pub closed_tabs: Vec<ExtractedTab>,
    pub closed_groups: Vec<ClosedGroup>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SavedGroup {
    pub id: Option<GroupId>,
    pub name: String,
    pub color: String,
    pub collapsed: bool,
    pub tabs: Vec<ExtractedTab>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExtrasBundle {
    pub closed_tabs: Vec<ExtractedTab>,
    pub closed_groups: Vec<ClosedGroup>,
    pub closed_windows: Vec<ClosedWindow>,
    pub saved_groups: Vec<SavedGroup>,
    /// Tabs dropped for lacking usable navigation entries.
    pub skipped: usize,
}

impl ExtrasBundle {
    /// Every extracted tab across all four categories.
    pub fn all_tabs(&self) -> impl Iterator<Item = &ExtractedTab> + '_ {
        let closed_group_tabs = self.closed_groups.iter().flat_map(|group| &group.tabs);
        let closed_window_tabs = self.closed_windows.iter().flat_map(|window| {
            window
                .tabs
                .iter()
                .chain(&window.closed_tabs)
                .chain(window.closed_groups.iter().flat_map(|group| &group.tabs))
        });
        let saved_tabs = self.saved_groups.iter().flat_map(|group| &group.tabs);

        self.closed_tabs
            .iter()
            .chain(closed_group_tabs)
            .chain(closed_window_tabs)
            .chain(saved_tabs)
    }
}

/// Extracts all closed and saved entities. Never fails; unusable tabs are logged and counted.
pub fn extract(document: &SessionDocument) -> ExtrasBundle {
    let mut extractor = Extractor::default();
    let mut bundle = ExtrasBundle::default();

    for (window_index, window) in document.windows().iter().enumerate() {
        let context = TabContext {
            window_index: Some(window_index),
            closed_at: Some(0),
            ..TabContext::default()
        };
        bundle.closed_tabs.extend(
            window
                .closed_tabs()
                .iter()
                .filter_map(|raw| extractor.tab(raw, ExtractedTabKind::ClosedTab, &context)),
        );
        bundle.closed_groups.extend(window.closed_groups().iter().filter_map(|raw| {
            extractor.closed_group(raw, ExtractedTabKind::ClosedTabInGroup, Some(window_index), 0)
        }));
    }

    bundle.closed_windows = document
        .closed_windows()
        .iter()
        .filter_map(|raw| extractor.closed_window(raw))
        .collect();
    bundle.saved_groups = document
        .saved_groups()
        .iter()
        .filter_map(|raw| extractor.saved_group(raw))
        .collect();

    bundle.skipped = extractor.skipped;
    bundle
}

#[derive(Debug, Clone, Default)]
struct TabContext<'a> {
    window_index: Option<usize>,
    /// Inherited close time; the tab's own `closedAt` wins. `None` for kinds without one.
    closed_at: Option<i64>,
    group_name: GroupName<'a>,
    default_group: Option<&'a GroupId>,
    with_source_window: bool,
}

#[derive(Debug, Clone, Copy, Default)]
enum GroupName<'a> {
    #[default]
    Absent,
    Fixed(&'a str),
    /// Resolve the tab's own group id in a closed window's group list.
    Lookup(&'a HashMap<GroupId, String>),
}

/// One tab in any of the stored shapes: `outer` is the list element, `state` its nested
/// `state` object when present.
struct TabShape<'a> {
    outer: &'a RawObject,
    state: Option<&'a RawObject>,
    kind: ExtractedTabKind,
}

impl<'a> TabShape<'a> {
    fn new(outer: &'a RawObject, kind: ExtractedTabKind) -> Self {
        Self {
            outer,
            state: object_field(outer, "state"),
            kind,
        }
    }

    /// The object holding navigation entries: top level for live tabs of a closed window,
    /// `state` for everything else, falling back to the other location.
    fn history_source(&self) -> &'a RawObject {
        let nested = self.state.filter(|state| state.contains_key("entries"));
        match (self.kind, nested) {
            (ExtractedTabKind::ClosedWindowTab, _) if self.outer.contains_key("entries") => {
                self.outer
            }
            (_, Some(state)) => state,
            _ => self.outer,
        }
    }

    /// Saved group tabs keep their own metadata at the top level; other kinds prefer `state`.
    fn meta<T>(&self, read: impl Fn(&'a RawObject) -> Option<T>) -> Option<T> {
        let (first, second) = match (self.kind, self.state) {
            (ExtractedTabKind::SavedGroupTab, state) => (Some(self.outer), state),
            (_, Some(state)) => (Some(state), Some(self.outer)),
            (_, None) => (Some(self.outer), None),
        };
        first.and_then(&read).or_else(|| second.and_then(&read))
    }

    /// Flags are stored on the list element, with `state` as fallback.
    fn flag(&self, key: &str) -> bool {
        bool_field(self.outer, key) || self.state.is_some_and(|state| bool_field(state, key))
    }
}

#[derive(Debug, Default)]
struct Extractor {
    skipped: usize,
}

impl Extractor {
    fn tab(
        &mut self,
        raw: &Value,
        kind: ExtractedTabKind,
        context: &TabContext<'_>,
    ) -> Option<ExtractedTab> {
        let Some(outer) = raw.as_object() else {
            log::warn!("skipping {kind:?}: not an object");
            self.skipped += 1;
            return None;
        };
        let shape = TabShape::new(outer, kind);
        let source = shape.history_source();

        let entries = array_field(source, "entries");
        let Some(last) = entries.last() else {
            log::warn!("skipping {kind:?}: tab has no navigation entries");
            self.skipped += 1;
            return None;
        };
        let active = i64_field(source, "index")
            .and_then(|index| usize::try_from(index).ok())
            .filter(|index| (1..=entries.len()).contains(index))
            .map_or(last, |index| &entries[index - 1]);
        let Some(active) = active.as_object() else {
            log::warn!("skipping {kind:?}: active navigation entry is not an object");
            self.skipped += 1;
            return None;
        };

        let history = entries
            .iter()
            .filter_map(Value::as_object)
            .map(|entry| HistoryEntry {
                title: str_field(entry, "title").unwrap_or_default().to_owned(),
                url: str_field(entry, "url").unwrap_or_default().to_owned(),
            })
            .collect();

        let url = str_field(active, "url").unwrap_or_default().to_owned();
        let group_id = shape
            .meta(|map| map.get("groupId").and_then(GroupId::from_json))
            .or_else(|| context.default_group.cloned());
        let group_name = match context.group_name {
            GroupName::Absent => None,
            GroupName::Fixed(name) => Some(name.to_owned()),
            GroupName::Lookup(names) => Some(
                group_id
                    .as_ref()
                    .and_then(|id| names.get(id))
                    .map_or_else(|| UNGROUPED.to_owned(), Clone::clone),
            ),
        };

        Some(ExtractedTab {
            kind,
            title: str_field(active, "title")
                .unwrap_or(WITHOUT_TITLE)
                .to_owned(),
            domain: domain(&url),
            url_hash: url_hash(&url),
            url,
            history,
            image: shape
                .meta(|map| str_field(map, "image").map(str::to_owned))
                .unwrap_or_default(),
            last_accessed: shape
                .meta(|map| i64_field(map, "lastAccessed"))
                .unwrap_or(0),
            group_id,
            group_name,
            window_index: context.window_index,
            closed_at: context
                .closed_at
                .map(|inherited| i64_field(outer, "closedAt").unwrap_or(inherited)),
            source_window_id: context.with_source_window.then(|| {
                outer
                    .get("sourceWindowId")
                    .map(|value| match value {
                        Value::String(text) => text.clone(),
                        other => other.to_string(),
                    })
                    .unwrap_or_default()
            }),
            pinned: shape.flag("pinned"),
            hidden: shape.flag("hidden"),
        })
    }

    fn closed_group(
        &mut self,
        raw: &Value,
        kind: ExtractedTabKind,
        window_index: Option<usize>,
        inherited_closed_at: i64,
    ) -> Option<ClosedGroup> {
        let Some(group) = raw.as_object() else {
            log::warn!("skipping closed group: not an object");
            return None;
        };
        let id = group.get("id").and_then(GroupId::from_json);
        let name = group_name(group, "Group", id.as_ref());
        let closed_at = i64_field(group, "closedAt").unwrap_or(inherited_closed_at);

        let context = TabContext {
            window_index,
            closed_at: Some(closed_at),
            group_name: GroupName::Fixed(&name),
            ..TabContext::default()
        };
        let tabs = array_field(group, "tabs")
            .iter()
            .filter_map(|tab| self.tab(tab, kind, &context))
            .collect();

        Some(ClosedGroup {
            window_index,
            color: str_field(group, "color").unwrap_or_default().to_owned(),
            id,
            name,
            closed_at,
            tabs,
        })
    }

    fn closed_window(&mut self, raw: &Value) -> Option<ClosedWindow> {
        let Some(window) = raw.as_object() else {
            log::warn!("skipping closed window: not an object");
            return None;
        };
        let closed_at = i64_field(window, "closedAt").unwrap_or(0);

        let mut groups = Vec::new();
        let mut names = HashMap::new();
        for group in array_field(window, "groups").iter().filter_map(Value::as_object) {
            let Some(id) = group.get("id").and_then(GroupId::from_json) else {
                continue;
            };
            if names.contains_key(&id) {
                continue;
            }
            let name = group_name(group, "Group", Some(&id));
            names.insert(id.clone(), name.clone());
            groups.push(GroupSummary {
                id,
                name,
                color: str_field(group, "color").unwrap_or_default().to_owned(),
            });
        }

        let tabs_context = TabContext {
            closed_at: Some(closed_at),
            group_name: GroupName::Lookup(&names),
            ..TabContext::default()
        };
        let tabs = array_field(window, "tabs")
            .iter()
            .filter_map(|tab| self.tab(tab, ExtractedTabKind::ClosedWindowTab, &tabs_context))
            .collect();

        let closed_tabs_context = TabContext {
            with_source_window: true,
            ..tabs_context.clone()
        };
        let closed_tabs = array_field(window, "_closedTabs")
            .iter()
            .filter_map(|tab| {
                self.tab(
                    tab,
                    ExtractedTabKind::ClosedWindowClosedTab,
                    &closed_tabs_context,
                )
            })
            .collect();

        let closed_groups = array_field(window, "closedGroups")
            .iter()
            .filter_map(|group| {
                self.closed_group(
                    group,
                    ExtractedTabKind::ClosedWindowClosedGroupTab,
                    None,
                    closed_at,
                )
            })
            .collect();

        Some(ClosedWindow {
            closed_at,
            tabs,
            groups,
            closed_tabs,
            closed_groups,
        })
    }

    fn saved_group(&mut self, raw: &Value) -> Option<SavedGroup> {
        let Some(group) = raw.as_object() else {
            log::warn!("skipping saved group: not an object");
            return None;
        };
        let id = group.get("id").and_then(GroupId::from_json);
        let name = group_name(group, "Saved Group", id.as_ref());

        let context = TabContext {
            group_name: GroupName::Fixed(&name),
            default_group: id.as_ref(),
            ..TabContext::default()
        };
        let tabs = array_field(group, "tabs")
            .iter()
            .filter_map(|tab| self.tab(tab, ExtractedTabKind::SavedGroupTab, &context))
            .collect();

        Some(SavedGroup {
            color: str_field(group, "color").unwrap_or_default().to_owned(),
            collapsed: bool_field(group, "collapsed"),
            id,
            name,
            tabs,
        })
    }
}

fn group_name(group: &RawObject, prefix: &str, id: Option<&GroupId>) -> String {
    match (str_field(group, "name"), id) {
        (Some(name), _) => name.to_owned(),
        (None, Some(id)) => format!("{prefix} {id}"),
        (None, None) => prefix.to_owned(),
    }
}
