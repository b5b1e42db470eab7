// SPDX-FileCopyrightText: 2026 The tabsmith authors
// SPDX-License-Identifier: LicenseRef-Tabsmith-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of tabsmith and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use pretty_assertions::assert_eq;
use serde_json::{json, Value};

use crate::clean::TitleCleaner;
use crate::model::fixtures;
use crate::model::{GroupId, GroupKey, TabHandle, WindowId};
use crate::query::enriched::{TabStatus, UNGROUPED};

use super::{Edit, EditError, EditRejected, GroupPatch, GroupTarget, Reconciler, TabPatch};

fn reconciler(value: Value) -> Reconciler {
    Reconciler::new(fixtures::document(value))
}

fn handle(reconciler: &Reconciler, title: &str) -> TabHandle {
    reconciler
        .tabs()
        .iter()
        .find(|tab| tab.title == title)
        .map(|tab| tab.raw_tab)
        .expect("tab with title")
}

fn window(reconciler: &Reconciler, position: usize) -> WindowId {
    reconciler
        .document()
        .window_id_at(position)
        .expect("window at position")
}

fn raw_tab(reconciler: &Reconciler, handle: TabHandle) -> Value {
    reconciler
        .document()
        .tab(handle)
        .expect("tab node")
        .to_value()
}

fn move_to(tab: TabHandle, name: &str, window: Option<WindowId>) -> Edit {
    Edit::MoveToGroup {
        tab,
        target: GroupTarget::by_name(name, window),
    }
}

/// Every grouped flat tab resolves to a group defined in its current window.
fn assert_group_ids_resolve(reconciler: &Reconciler, tabs: &[TabHandle]) {
    for handle in tabs {
        let tab = reconciler.tab(*handle).expect("flat tab");
        let Some(group) = &tab.group_id else {
            continue;
        };
        let window = reconciler
            .document()
            .window(tab.window_id)
            .expect("tab window");
        assert!(
            window.has_group(group),
            "group {group} missing from window {}",
            tab.window_id
        );
    }
}

#[test]
fn same_window_move_writes_both_views() {
    let mut reconciler = reconciler(fixtures::cross_window_session());
    let tab = handle(&reconciler, "B");

    let result = reconciler.apply(move_to(tab, "Work", None)).expect("apply");

    assert_eq!(result.rev, 1);
    assert_eq!(result.delta.updated, vec![tab]);
    assert!(result.delta.moved.is_empty());
    assert!(!result.delta.reprojected);

    let flat = reconciler.tab(tab).expect("flat tab");
    assert_eq!(flat.group_id, Some(GroupId::Int(1)));
    assert_eq!(flat.group_name, "Work");
    assert_eq!(raw_tab(&reconciler, tab)["groupId"], json!(1));
    assert_eq!(reconciler.document().windows()[0].tabs().len(), 2);
}

#[test]
fn moving_to_ungrouped_removes_the_group_field() {
    let mut reconciler = reconciler(fixtures::cross_window_session());
    let tab = handle(&reconciler, "A");

    reconciler
        .apply(move_to(tab, UNGROUPED, None))
        .expect("apply");

    let flat = reconciler.tab(tab).expect("flat tab");
    assert_eq!(flat.group_id, None);
    assert_eq!(flat.group_name, UNGROUPED);
    assert!(raw_tab(&reconciler, tab).get("groupId").is_none());
}

#[test]
fn cross_window_move_to_missing_group_is_rejected_without_loss() {
    let mut reconciler = reconciler(fixtures::cross_window_session());
    let tab = handle(&reconciler, "A");
    let target = window(&reconciler, 1);
    let before_document = reconciler.document().to_value();
    let before_tabs = reconciler.tabs().to_vec();
    let before_source = reconciler.document().windows()[0].tabs().to_vec();

    let err = reconciler
        .apply(move_to(tab, "Work", Some(target)))
        .unwrap_err();

    assert_eq!(
        err,
        EditError::Rejected(EditRejected::GroupNotInWindow {
            group: "Work".to_owned(),
            window: target,
        })
    );
    assert_eq!(reconciler.document().windows()[0].tabs(), before_source.as_slice());
    assert_eq!(reconciler.document().to_value(), before_document);
    assert_eq!(reconciler.tabs(), before_tabs.as_slice());
    assert_eq!(reconciler.tab(tab).expect("flat tab").group_name, "Work");
    assert_eq!(reconciler.rev(), 0);
}

#[test]
fn cross_window_move_appends_and_clamps_selection() {
    let mut reconciler = reconciler(fixtures::two_window_session());
    let tab = handle(&reconciler, "Example");
    let destination = window(&reconciler, 1);

    let result = reconciler
        .apply(move_to(tab, "Reading", None))
        .expect("apply");

    assert_eq!(result.delta.moved, vec![tab]);
    assert!(result.delta.reprojected);

    let windows = reconciler.document().windows();
    assert_eq!(windows[0].tabs().len(), 2);
    assert_eq!(windows[0].selected(), Some(2));
    assert_eq!(windows[1].tabs().last(), Some(&tab));
    assert_eq!(windows[1].selected(), Some(1));

    let flat = reconciler.tab(tab).expect("flat tab");
    assert_eq!(flat.window_id, destination);
    assert_eq!(flat.window_index, 1);
    assert_eq!(flat.group_id, Some(GroupId::Text("g2".to_owned())));
    assert_eq!(flat.group_name, "Reading");
    assert_eq!(reconciler.window_index_of(tab), Some(1));
    assert_eq!(raw_tab(&reconciler, tab)["groupId"], json!("g2"));
    assert_group_ids_resolve(&reconciler, &[tab]);

    // Flat order follows the nested order after the move.
    let titles = reconciler
        .tabs()
        .iter()
        .map(|tab| tab.title.as_str())
        .collect::<Vec<_>>();
    assert_eq!(
        titles,
        vec!["serde - Rust", "News", "Rust", "Without Title", "Example"]
    );
}

#[test]
fn cross_window_move_to_ungrouped_in_a_hinted_window() {
    let mut reconciler = reconciler(fixtures::cross_window_session());
    let tab = handle(&reconciler, "A");
    let destination = window(&reconciler, 1);

    reconciler
        .apply(move_to(tab, UNGROUPED, Some(destination)))
        .expect("apply");

    let flat = reconciler.tab(tab).expect("flat tab");
    assert_eq!(flat.window_index, 1);
    assert_eq!(flat.group_id, None);
    assert!(raw_tab(&reconciler, tab).get("groupId").is_none());
    assert_eq!(reconciler.document().windows()[0].selected(), Some(1));
}

#[test]
fn unknown_names_and_windows_are_rejected() {
    let mut reconciler = reconciler(fixtures::cross_window_session());
    let tab = handle(&reconciler, "A");

    assert_eq!(
        reconciler.apply(move_to(tab, "Nope", None)).unwrap_err(),
        EditError::Rejected(EditRejected::UnknownGroup {
            group: "Nope".to_owned()
        })
    );

    let missing = WindowId::from_raw(99);
    assert_eq!(
        reconciler
            .apply(Edit::MoveToGroup {
                tab,
                target: GroupTarget::Key(GroupKey::new(missing, GroupId::Int(1))),
            })
            .unwrap_err(),
        EditError::Rejected(EditRejected::UnknownWindow { window: missing })
    );
    assert_eq!(reconciler.rev(), 0);
}

#[test]
fn group_keys_are_checked_against_their_own_window() {
    let mut reconciler = reconciler(fixtures::cross_window_session());
    let tab = handle(&reconciler, "C");
    let second = window(&reconciler, 1);

    let err = reconciler
        .apply(Edit::MoveToGroup {
            tab,
            target: GroupTarget::Key(GroupKey::new(second, GroupId::Int(1))),
        })
        .unwrap_err();

    assert_eq!(
        err,
        EditError::Rejected(EditRejected::GroupNotInWindow {
            group: "1".to_owned(),
            window: second,
        })
    );
}

#[test]
fn handles_from_another_load_are_stale() {
    let first = reconciler(fixtures::cross_window_session());
    let mut second = reconciler(fixtures::cross_window_session());
    let foreign = handle(&first, "A");

    let err = second.apply(move_to(foreign, "Work", None)).unwrap_err();
    assert!(matches!(err, EditError::StaleHandle { tab, .. } if tab == foreign));
}

#[test]
fn batches_are_all_or_nothing() {
    let mut reconciler = reconciler(fixtures::cross_window_session());
    let a = handle(&reconciler, "A");
    let b = handle(&reconciler, "B");
    let second = window(&reconciler, 1);
    let before = reconciler.document().to_value();

    let err = reconciler
        .apply_all(&[move_to(b, "Work", None), move_to(a, "Work", Some(second))])
        .unwrap_err();

    assert!(matches!(err, EditError::Rejected(_)));
    assert_eq!(reconciler.tab(b).expect("flat tab").group_id, None);
    assert_eq!(reconciler.document().to_value(), before);
    assert_eq!(reconciler.rev(), 0);
}

#[test]
fn batches_bump_the_revision_once() {
    let mut reconciler = reconciler(fixtures::cross_window_session());
    let a = handle(&reconciler, "A");
    let b = handle(&reconciler, "B");

    let result = reconciler
        .apply_all(&[
            move_to(b, "Work", None),
            Edit::SetStatus {
                tab: a,
                status: TabStatus::Delete,
            },
        ])
        .expect("apply");

    assert_eq!(result.rev, 1);
    assert_eq!(result.applied, 2);
    assert_eq!(result.delta.updated.len(), 2);
}

#[test]
fn stale_base_revision_conflicts() {
    let mut reconciler = reconciler(fixtures::cross_window_session());
    let b = handle(&reconciler, "B");

    let err = reconciler
        .apply_at(5, &[move_to(b, "Work", None)])
        .unwrap_err();
    assert_eq!(
        err,
        EditError::Conflict {
            base_rev: 5,
            current_rev: 0
        }
    );
}

#[test]
fn empty_batches_do_not_bump_the_revision() {
    let mut reconciler = reconciler(fixtures::cross_window_session());
    let result = reconciler.apply_all(&[]).expect("apply");
    assert_eq!(result.rev, 0);
    assert_eq!(result.applied, 0);
}

#[test]
fn tab_updates_write_through_to_the_active_entry() {
    let mut reconciler = reconciler(fixtures::two_window_session());
    let tab = handle(&reconciler, "serde - Rust");

    reconciler
        .apply(Edit::UpdateTab {
            tab,
            patch: TabPatch {
                title: Some("serde".to_owned()),
                url: Some("https://www.serde.rs/".to_owned()),
            },
        })
        .expect("apply");

    let flat = reconciler.tab(tab).expect("flat tab");
    assert_eq!(flat.title, "serde");
    assert_eq!(flat.domain.as_deref(), Some("serde.rs"));
    assert_eq!(flat.url_hash, crate::query::url_key::url_hash("https://www.serde.rs/"));
    assert_eq!(flat.original_title(), "serde - Rust");

    let raw = raw_tab(&reconciler, tab);
    assert_eq!(
        raw["entries"],
        json!([
            {"url": "https://old.test/a", "title": "Old"},
            {"url": "https://www.serde.rs/", "title": "serde"}
        ])
    );
}

#[test]
fn empty_tab_patches_change_nothing() {
    let mut reconciler = reconciler(fixtures::two_window_session());
    let tab = handle(&reconciler, "News");
    let before = reconciler.document().to_value();

    let result = reconciler
        .apply(Edit::UpdateTab {
            tab,
            patch: TabPatch::default(),
        })
        .expect("apply");

    assert!(result.delta.updated.is_empty());
    assert_eq!(reconciler.document().to_value(), before);
}

#[test]
fn group_updates_rename_definitions_and_flat_tabs() {
    let mut reconciler = reconciler(fixtures::two_window_session());
    let first = window(&reconciler, 0);
    let key = GroupKey::new(first, GroupId::Int(1));

    let result = reconciler
        .apply(Edit::UpdateGroup {
            group: key.clone(),
            patch: GroupPatch {
                name: Some("Job".to_owned()),
                color: Some("red".to_owned()),
                collapsed: Some(true),
            },
        })
        .expect("apply");

    assert_eq!(result.delta.groups, vec![key.clone()]);
    assert_eq!(result.delta.updated, vec![handle(&reconciler, "Example")]);
    assert_eq!(reconciler.groups().get(&key), Some(&"Job".to_owned()));
    assert_eq!(reconciler.tab(handle(&reconciler, "Example")).expect("tab").group_name, "Job");

    let def = reconciler.document().windows()[0]
        .group(&GroupId::Int(1))
        .expect("group def")
        .to_value();
    assert_eq!(
        def,
        json!({"id": 1, "name": "Job", "color": "red", "collapsed": true})
    );
}

#[test]
fn group_updates_reach_every_window_sharing_the_id() {
    let mut reconciler = reconciler(json!({
        "windows": [
            {
                "tabs": [{"entries": [{"url": "https://a.test/"}], "groupId": 7}],
                "groups": [{"id": 7, "name": "Shared"}]
            },
            {
                "tabs": [{"entries": [{"url": "https://b.test/"}], "groupId": 7}],
                "groups": [{"id": 7, "name": "Shared"}]
            }
        ]
    }));
    let key = GroupKey::new(window(&reconciler, 0), GroupId::Int(7));

    let result = reconciler
        .apply(Edit::UpdateGroup {
            group: key,
            patch: GroupPatch {
                name: Some("Both".to_owned()),
                ..GroupPatch::default()
            },
        })
        .expect("apply");

    assert_eq!(result.delta.groups.len(), 2);
    assert!(reconciler.tabs().iter().all(|tab| tab.group_name == "Both"));
}

#[test]
fn group_updates_for_unknown_groups_are_rejected() {
    let mut reconciler = reconciler(fixtures::two_window_session());
    let second = window(&reconciler, 1);

    let err = reconciler
        .apply(Edit::UpdateGroup {
            group: GroupKey::new(second, GroupId::Int(1)),
            patch: GroupPatch::default(),
        })
        .unwrap_err();
    assert!(matches!(
        err,
        EditError::Rejected(EditRejected::UnknownGroup { .. })
    ));
}

#[test]
fn status_survives_reprojection() {
    let mut reconciler = reconciler(fixtures::two_window_session());
    let news = handle(&reconciler, "News");
    let example = handle(&reconciler, "Example");

    reconciler
        .apply(Edit::SetStatus {
            tab: news,
            status: TabStatus::Delete,
        })
        .expect("delete");
    reconciler
        .apply(move_to(example, "Reading", None))
        .expect("move");

    assert!(reconciler.tab(news).expect("flat tab").is_deleted());
}

#[test]
fn sync_of_an_unedited_session_is_lossless() {
    let value = fixtures::two_window_session();
    let mut reconciler = reconciler(value.clone());

    let report = reconciler.sync();

    assert_eq!(report.windows, 2);
    assert_eq!(report.tabs, 5);
    assert_eq!(report.omitted, 0);
    assert_eq!(reconciler.document().to_value(), value);
}

#[test]
fn sync_is_idempotent() {
    let mut reconciler = reconciler(fixtures::two_window_session());
    let example = handle(&reconciler, "Example");
    reconciler
        .apply(move_to(example, "Reading", None))
        .expect("move");

    reconciler.sync();
    let first = serde_json::to_vec(&reconciler.document().to_value()).expect("json");
    reconciler.sync();
    let second = serde_json::to_vec(&reconciler.document().to_value()).expect("json");

    assert_eq!(first, second);
}

#[test]
fn sync_omits_deleted_tabs() {
    let mut reconciler = reconciler(fixtures::two_window_session());
    let news = handle(&reconciler, "News");
    reconciler
        .apply(Edit::SetStatus {
            tab: news,
            status: TabStatus::Delete,
        })
        .expect("delete");

    let report = reconciler.sync();

    assert_eq!(report.omitted, 1);
    let first = &reconciler.document().windows()[0];
    assert_eq!(first.tabs().len(), 2);
    assert!(!first.tabs().contains(&news));
    assert_eq!(first.selected(), Some(2));
    assert!(reconciler.tab(news).is_none());
}

#[test]
fn sync_keeps_unprojected_tabs_in_place() {
    let value = fixtures::malformed_session();
    let mut reconciler = reconciler(value.clone());
    assert_eq!(reconciler.skipped().len(), 3);

    let report = reconciler.sync();

    assert_eq!(report.retained_unprojected, 3);
    assert_eq!(reconciler.document().to_value(), value);
}

#[test]
fn sync_writes_flat_fields_and_group_names_back() {
    let mut reconciler = reconciler(fixtures::two_window_session());
    let example = handle(&reconciler, "Example");
    let position = reconciler.index[&example];
    reconciler.tabs[position].title = "Renamed tab".to_owned();
    reconciler.tabs[position].group_name = "Renamed group".to_owned();

    let report = reconciler.sync();

    assert_eq!(report.renamed_groups, 1);
    let raw = raw_tab(&reconciler, example);
    assert_eq!(raw["entries"][0]["title"], json!("Renamed tab"));
    assert_eq!(
        reconciler.document().windows()[0]
            .group(&GroupId::Int(1))
            .and_then(|def| def.name()),
        Some("Renamed group")
    );
    assert_eq!(
        reconciler.tab(example).expect("flat tab").group_name,
        "Renamed group"
    );
}

#[test]
fn clean_titles_always_starts_from_the_loaded_title() {
    let mut reconciler = reconciler(fixtures::two_window_session());
    let serde = handle(&reconciler, "serde - Rust");

    reconciler
        .clean_titles(&TitleCleaner::new([" - Rust"]))
        .expect("clean");
    assert_eq!(reconciler.tab(serde).expect("tab").title, "serde");

    reconciler
        .clean_titles(&TitleCleaner::new(["serde"]))
        .expect("clean");
    assert_eq!(reconciler.tab(serde).expect("tab").title, "- Rust");
    assert_eq!(
        raw_tab(&reconciler, serde)["entries"][1]["title"],
        json!("- Rust")
    );
}
