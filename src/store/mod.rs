// SPDX-FileCopyrightText: 2026 The tabsmith authors
// SPDX-License-Identifier: LicenseRef-Tabsmith-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of tabsmith and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Persistence for session containers on disk.
//!
//! The store module reads and writes mozLz4 session containers, exports and imports their
//! decoded JSON, and creates dated backup directories before a container is overwritten.
//! [`profile`] finds Firefox profiles and moves containers between them and backups.

pub mod profile;
pub mod session_file;

pub use profile::{Profile, ProfileError, RestoreOptions, RestoreTarget};
pub use session_file::{BackupReport, SessionFile, StoreError, WriteDurability};
