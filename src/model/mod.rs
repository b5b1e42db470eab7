// SPDX-FileCopyrightText: 2026 The tabsmith authors
// SPDX-License-Identifier: LicenseRef-Tabsmith-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of tabsmith and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Core session graph types.
//!
//! A session contains live windows (each with tabs and window-scoped group definitions) plus
//! side lists of closed windows and saved groups kept as raw JSON.

mod defect;
pub mod document;
#[cfg(test)]
pub(crate) mod fixtures;
pub mod group;
pub mod ids;
pub(crate) mod json;
pub mod tab;
pub mod window;

pub use defect::StructuralDefect;
pub use document::SessionDocument;
pub use group::GroupDef;
pub use ids::{GroupId, GroupKey, Id, TabHandle, WindowId, WindowIdTag};
pub use tab::TabNode;
pub use window::Window;
