// SPDX-FileCopyrightText: 2026 The tabsmith authors
// SPDX-License-Identifier: LicenseRef-Tabsmith-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of tabsmith and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

#![allow(dead_code)]

// Shared deterministic benchmark fixtures (no RNG).

use serde_json::{json, Value};

use tabsmith::format::mozlz4;
use tabsmith::model::SessionDocument;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Case {
    Small,
    Medium,
    LargeDeepHistory,
}

impl Case {
    pub const ALL: [Case; 3] = [Case::Small, Case::Medium, Case::LargeDeepHistory];

    pub const fn id(self) -> &'static str {
        match self {
            Self::Small => "small",
            Self::Medium => "medium",
            Self::LargeDeepHistory => "large_deep_history",
        }
    }

    pub const fn params(self) -> SessionParams {
        match self {
            Self::Small => SessionParams::new(2, 20, 3, 2),
            Self::Medium => SessionParams::new(4, 150, 8, 4),
            Self::LargeDeepHistory => SessionParams::new(8, 400, 12, 16),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct SessionParams {
    pub windows: usize,
    pub tabs_per_window: usize,
    pub groups_per_window: usize,
    pub entries_per_tab: usize,
}

impl SessionParams {
    pub const fn new(
        windows: usize,
        tabs_per_window: usize,
        groups_per_window: usize,
        entries_per_tab: usize,
    ) -> Self {
        Self {
            windows,
            tabs_per_window,
            groups_per_window,
            entries_per_tab,
        }
    }
}

fn tab(window: usize, idx: usize, params: SessionParams) -> Value {
    let entries = (0..params.entries_per_tab)
        .map(|entry| {
            json!({
                "url": format!("https://site{:03}.test/w{window}/t{idx:05}/e{entry}", idx % 97),
                "title": format!("Page {idx} of window {window} - Site {}", idx % 97),
                "docshellUUID": format!("{{{window:04}-{idx:06}-{entry:02}}}"),
                "ID": idx * 100 + entry,
            })
        })
        .collect::<Vec<_>>();

    let mut tab = json!({
        "entries": entries,
        "lastAccessed": 1_700_000_000_000_i64 + (window * 10_000 + idx) as i64,
        "hidden": false,
        "attributes": {},
        "index": params.entries_per_tab,
        "userContextId": 0,
    });
    if params.groups_per_window > 0 && idx % 3 != 0 {
        tab["groupId"] = json!(format!("g{window}-{}", idx % params.groups_per_window));
    }
    if idx == 0 {
        tab["pinned"] = json!(true);
    }
    tab
}

/// One `windows` entry: tabs, group definitions and a few closed tabs.
fn window(window: usize, params: SessionParams) -> Value {
    let tabs = (0..params.tabs_per_window)
        .map(|idx| tab(window, idx, params))
        .collect::<Vec<_>>();
    let groups = (0..params.groups_per_window)
        .map(|group| {
            json!({
                "id": format!("g{window}-{group}"),
                "name": format!("Group {group}"),
                "color": (["blue", "red", "green", "yellow"][group % 4]),
                "collapsed": group % 2 == 1,
            })
        })
        .collect::<Vec<_>>();
    let closed = (0..params.tabs_per_window / 10)
        .map(|idx| {
            json!({
                "state": tab(window, 10_000 + idx, params),
                "closedAt": 1_700_000_500_000_i64 + idx as i64,
                "title": format!("Closed {idx}"),
            })
        })
        .collect::<Vec<_>>();

    json!({
        "tabs": tabs,
        "selected": 1,
        "groups": groups,
        "_closedTabs": closed,
        "closedGroups": [],
        "width": 1280,
        "height": 800,
    })
}

pub fn session(case: Case) -> Value {
    let params = case.params();
    let windows = (0..params.windows)
        .map(|idx| window(idx, params))
        .collect::<Vec<_>>();
    json!({
        "version": ["sessionrestore", 1],
        "windows": windows,
        "_closedWindows": [window(99, SessionParams::new(1, 10, 1, 2))],
        "savedGroups": [],
        "session": {"lastUpdate": 1_700_000_000_000_i64},
    })
}

pub fn document(case: Case) -> SessionDocument {
    SessionDocument::from_value(session(case)).expect("bench session")
}

pub fn container(case: Case) -> Vec<u8> {
    mozlz4::encode(&session(case)).expect("encode bench session")
}
