// SPDX-FileCopyrightText: 2026 The tabsmith authors
// SPDX-License-Identifier: LicenseRef-Tabsmith-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of tabsmith and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Read-only queries over session documents.
//!
//! Queries provide derived views (the flat tab list, closed and saved entities) that power the
//! CLI and any embedding UI.

pub mod enriched;
pub mod extras;
pub mod url_key;

pub use enriched::{
    project, EnrichedTab, GroupInfo, GroupMap, Projection, SkippedTab, TabStatus, UNGROUPED,
    WITHOUT_TITLE,
};
pub use extras::{extract, ExtractedTab, ExtractedTabKind, ExtrasBundle};
