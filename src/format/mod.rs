// SPDX-FileCopyrightText: 2026 The tabsmith authors
// SPDX-License-Identifier: LicenseRef-Tabsmith-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of tabsmith and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Session container formats.
//!
//! Currently this module handles the browser's magic-prefixed, block-compressed JSON container.

pub mod mozlz4;

pub use mozlz4::FormatError;
