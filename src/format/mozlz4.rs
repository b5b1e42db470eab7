// SPDX-FileCopyrightText: 2026 The tabsmith authors
// SPDX-License-Identifier: LicenseRef-Tabsmith-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of tabsmith and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! The `jsonlz4` session container.
//!
//! Layout: 8 magic bytes, a little-endian `u32` with the decompressed length, then one lz4 block
//! holding UTF-8 JSON. Encoding is not byte-reproducible, but decoding an encoded value yields an
//! equal value.

use serde_json::Value;

use crate::model::SessionDocument;

pub const MAGIC: &[u8; 8] = b"mozLz40\0";

const SIZE_PREFIX_LEN: usize = 4;
// Upper bound of the lz4 block format's compression ratio.
const MAX_RATIO: usize = 255;

#[derive(Debug, thiserror::Error)]
pub enum FormatError {
    #[error("not a session container: bad magic (found={found:02x?})")]
    BadMagic { found: Vec<u8> },
    #[error("corrupt compression: payload truncated (len={len})")]
    Truncated { len: usize },
    #[error("corrupt compression: {0}")]
    DecompressionFailed(String),
    #[error("corrupt structure: {0}")]
    MalformedJson(#[source] serde_json::Error),
    #[error("failed to serialize session JSON: {0}")]
    Encode(#[source] serde_json::Error),
}

/// Decodes a container into its JSON value.
///
/// The magic is checked before any decompression is attempted.
pub fn decode(bytes: &[u8]) -> Result<Value, FormatError> {
    let payload = strip_magic(bytes)?;
    let json = decompress(payload)?;
    serde_json::from_slice(&json).map_err(FormatError::MalformedJson)
}

/// Decodes a container straight into a [`SessionDocument`].
pub fn decode_document(bytes: &[u8]) -> Result<SessionDocument, FormatError> {
    SessionDocument::from_value(decode(bytes)?).map_err(FormatError::MalformedJson)
}

pub fn encode(value: &Value) -> Result<Vec<u8>, FormatError> {
    let json = serde_json::to_vec(value).map_err(FormatError::Encode)?;
    let block = lz4_flex::block::compress_prepend_size(&json);

    let mut out = Vec::with_capacity(MAGIC.len() + block.len());
    out.extend_from_slice(MAGIC);
    out.extend_from_slice(&block);
    Ok(out)
}

pub fn encode_document(document: &SessionDocument) -> Result<Vec<u8>, FormatError> {
    encode(&document.to_value())
}

fn strip_magic(bytes: &[u8]) -> Result<&[u8], FormatError> {
    match bytes.strip_prefix(MAGIC.as_slice()) {
        Some(payload) => Ok(payload),
        None => Err(FormatError::BadMagic {
            found: bytes.iter().take(MAGIC.len()).copied().collect(),
        }),
    }
}

fn decompress(payload: &[u8]) -> Result<Vec<u8>, FormatError> {
    if payload.len() < SIZE_PREFIX_LEN {
        return Err(FormatError::Truncated { len: payload.len() });
    }
    let (prefix, block) = payload.split_at(SIZE_PREFIX_LEN);

    let declared = prefix
        .iter()
        .rev()
        .fold(0usize, |acc, byte| (acc << 8) | usize::from(*byte));
    if declared > block.len().saturating_mul(MAX_RATIO).saturating_add(16) {
        return Err(FormatError::DecompressionFailed(format!(
            "declared size {declared} exceeds what {} compressed bytes can hold",
            block.len()
        )));
    }

    lz4_flex::block::decompress_size_prepended(payload)
        .map_err(|err| FormatError::DecompressionFailed(err.to_string()))
}
