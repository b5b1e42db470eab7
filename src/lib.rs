// SPDX-FileCopyrightText: 2026 The tabsmith authors
// SPDX-License-Identifier: LicenseRef-Tabsmith-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of tabsmith and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! tabsmith: inspect and edit Firefox session containers.
//!
//! A container (`recovery.jsonlz4`, `previous.jsonlz4`, ...) decodes into a nested
//! [`model::SessionDocument`]. [`query`] derives a flat tab list and read-only views of
//! closed and saved entities, [`ops::Reconciler`] applies edits to both representations at
//! once, and [`store`] writes the result back without losing unknown fields.

pub mod clean;
pub mod config;
pub mod engine;
pub mod format;
pub mod model;
pub mod ops;
pub mod query;
pub mod store;

pub use engine::{EngineError, LoadOutcome, SaveOutcome, SessionEngine};
