// SPDX-FileCopyrightText: 2026 The tabsmith authors
// SPDX-License-Identifier: LicenseRef-Tabsmith-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of tabsmith and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Derived URL keys: the display domain and the short cache hash.

use sha2::{Digest, Sha256};
use url::Url;

pub const URL_HASH_LEN: usize = 12;

/// Short sha256 digest of the lower-cased URL with trailing slashes removed.
///
/// A lookup key for caches and scraped data, not an identity: collisions are possible.
/// `None` for an empty URL.
pub fn url_hash(url: &str) -> Option<String> {
    if url.is_empty() {
        return None;
    }
    let normalized = url.to_lowercase();
    let normalized = normalized.trim_end_matches('/');

    let mut hasher = Sha256::new();
    hasher.update(normalized.as_bytes());
    let mut hex = format!("{:x}", hasher.finalize());
    hex.truncate(URL_HASH_LEN);
    Some(hex)
}

/// Host of `url` without port and without a leading `www.`. Empty when the URL has no host.
pub fn domain(url: &str) -> String {
    let Ok(parsed) = Url::parse(url) else {
        return String::new();
    };
    let host = parsed.host_str().unwrap_or_default();
    host.strip_prefix("www.").unwrap_or(host).to_owned()
}
