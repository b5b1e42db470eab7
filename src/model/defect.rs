// SPDX-FileCopyrightText: 2026 The tabsmith authors
// SPDX-License-Identifier: LicenseRef-Tabsmith-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of tabsmith and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use super::ids::{TabHandle, WindowId};

/// A per-entity defect in the session graph.
///
/// Defects found while projecting are logged and the entity is skipped. Defects found while
/// planning an edit abort that edit.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StructuralDefect {
    #[error("tab is not an object")]
    TabNotObject,
    #[error("tab has no navigation entries")]
    NoEntries,
    #[error("active entry index out of range (index={index}, entries={len})")]
    ActiveIndexOutOfRange { index: i64, len: usize },
    #[error("navigation entry is not an object (position={position})")]
    EntryNotObject { position: usize },
    #[error("unknown window (window_id={window})")]
    UnknownWindow { window: WindowId },
    #[error("tab is not attached to any window (tab={tab})")]
    DetachedTab { tab: TabHandle },
    #[error("unknown tab (tab={tab})")]
    UnknownTab { tab: TabHandle },
}
