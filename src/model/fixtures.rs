// SPDX-FileCopyrightText: 2026 The tabsmith authors
// SPDX-License-Identifier: LicenseRef-Tabsmith-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of tabsmith and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use serde_json::{json, Value};

use super::document::SessionDocument;

/// Two live windows sharing no groups.
///
/// Window 0: `Work` (id 1), tabs `Example` (group 1), `serde` (pinned, second entry active),
/// `News` (dangling group 5, hidden); `selected` is 3.
/// Window 1: `Reading` (id "g2"), tabs `Rust` (group "g2"), a blank tab; `selected` is 1.
pub(crate) fn two_window_session() -> Value {
    json!({
        "version": ["sessionrestore", 1],
        "windows": [
            {
                "tabs": [
                    {
                        "entries": [
                            {
                                "url": "https://www.example.com/",
                                "title": "Example",
                                "docshellUUID": "{aaaa-0001}"
                            }
                        ],
                        "lastAccessed": 1000,
                        "hidden": false,
                        "index": 1,
                        "groupId": 1,
                        "image": "https://www.example.com/favicon.ico"
                    },
                    {
                        "entries": [
                            {"url": "https://old.test/a", "title": "Old"},
                            {"url": "https://docs.rs/serde", "title": "serde - Rust"}
                        ],
                        "lastAccessed": 2000,
                        "pinned": true,
                        "index": 2
                    },
                    {
                        "entries": [{"url": "https://news.test:8443/item", "title": "News"}],
                        "lastAccessed": 3000,
                        "hidden": true,
                        "index": 1,
                        "groupId": 5
                    }
                ],
                "selected": 3,
                "groups": [
                    {"id": 1, "name": "Work", "color": "blue", "collapsed": false}
                ],
                "_closedTabs": [
                    {
                        "state": {
                            "entries": [{"url": "https://closed.test/", "title": "Closed"}],
                            "index": 1,
                            "lastAccessed": 4000
                        },
                        "closedAt": 5000,
                        "title": "Closed",
                        "image": "https://closed.test/icon.png"
                    }
                ],
                "closedGroups": [
                    {
                        "id": "cg1",
                        "name": "Old Work",
                        "color": "red",
                        "closedAt": 6000,
                        "tabs": [
                            {
                                "state": {
                                    "entries": [{"url": "https://cg.test/one", "title": "One"}],
                                    "index": 1
                                }
                            },
                            {
                                "state": {
                                    "entries": [{"url": "https://cg.test/two", "title": "Two"}],
                                    "index": 1
                                },
                                "closedAt": 6500
                            }
                        ]
                    }
                ],
                "width": 1280,
                "height": 800
            },
            {
                "tabs": [
                    {
                        "entries": [{"url": "https://rust-lang.org/", "title": "Rust"}],
                        "lastAccessed": 1500,
                        "index": 1,
                        "groupId": "g2"
                    },
                    {
                        "entries": [{"url": "about:blank"}],
                        "index": 1
                    }
                ],
                "groups": [
                    {"id": "g2", "name": "Reading", "color": "green", "collapsed": true}
                ],
                "selected": 1
            }
        ],
        "_closedWindows": [
            {
                "tabs": [
                    {
                        "entries": [{"url": "https://cw.test/", "title": "Closed Window"}],
                        "index": 1,
                        "groupId": 9,
                        "pinned": true
                    },
                    {"entries": [], "index": 1}
                ],
                "groups": [{"id": 9, "name": "Archived", "color": "grey"}],
                "closedAt": 7000,
                "_closedTabs": [
                    {
                        "state": {
                            "entries": [{"url": "https://cwc.test/", "title": "Inner"}],
                            "index": 1,
                            "groupId": 9
                        },
                        "sourceWindowId": "window7"
                    }
                ],
                "closedGroups": [
                    {
                        "id": 10,
                        "tabs": [
                            {
                                "state": {
                                    "entries": [{"url": "https://deep.test/", "title": "Deep"}],
                                    "index": 1
                                }
                            }
                        ]
                    }
                ]
            }
        ],
        "savedGroups": [
            {
                "id": "s1",
                "name": "Later",
                "color": "purple",
                "collapsed": true,
                "tabs": [
                    {
                        "state": {
                            "entries": [
                                {"url": "https://saved.test/a", "title": "Saved A"},
                                {"url": "https://saved.test/b", "title": "Saved B"}
                            ],
                            "index": 1
                        },
                        "lastAccessed": 9000
                    }
                ]
            }
        ],
        "session": {"lastUpdate": 1700000000000_i64}
    })
}

/// Window 0 owns group `Work` (id 1) with one member tab; window 1 has no groups.
pub(crate) fn cross_window_session() -> Value {
    json!({
        "windows": [
            {
                "tabs": [
                    {"entries": [{"url": "https://a.test/", "title": "A"}], "index": 1, "groupId": 1},
                    {"entries": [{"url": "https://b.test/", "title": "B"}], "index": 1}
                ],
                "groups": [{"id": 1, "name": "Work", "color": "blue"}],
                "selected": 2
            },
            {
                "tabs": [
                    {"entries": [{"url": "https://c.test/", "title": "C"}], "index": 1}
                ],
                "selected": 1
            }
        ]
    })
}

/// A tab with no entries and a tab with an out-of-range index between two good tabs.
pub(crate) fn malformed_session() -> Value {
    json!({
        "windows": [
            {
                "tabs": [
                    {"entries": [{"url": "https://ok.test/1", "title": "One"}], "index": 1},
                    {"entries": [], "index": 1},
                    {"entries": [{"url": "https://bad.test/", "title": "Bad"}], "index": 4},
                    null,
                    {"entries": [{"url": "https://ok.test/2", "title": "Two"}], "index": 1}
                ],
                "selected": 4
            }
        ]
    })
}

pub(crate) fn document(value: Value) -> SessionDocument {
    SessionDocument::from_value(value).expect("fixture document")
}
