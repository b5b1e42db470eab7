// SPDX-FileCopyrightText: 2026 The tabsmith authors
// SPDX-License-Identifier: LicenseRef-Tabsmith-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of tabsmith and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Lenient field accessors over raw session JSON. Missing or mistyped optional fields read as
//! their default instead of failing the whole load.

use serde_json::{Map, Value};

pub(crate) fn str_field<'a>(map: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    map.get(key).and_then(Value::as_str)
}

pub(crate) fn i64_field(map: &Map<String, Value>, key: &str) -> Option<i64> {
    map.get(key).and_then(|value| {
        value
            .as_i64()
            .or_else(|| value.as_f64().filter(|f| f.is_finite()).map(|f| f as i64))
    })
}

pub(crate) fn bool_field(map: &Map<String, Value>, key: &str) -> bool {
    map.get(key).and_then(Value::as_bool).unwrap_or(false)
}

pub(crate) fn array_field<'a>(map: &'a Map<String, Value>, key: &str) -> &'a [Value] {
    map.get(key)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

pub(crate) fn object_field<'a>(
    map: &'a Map<String, Value>,
    key: &str,
) -> Option<&'a Map<String, Value>> {
    map.get(key).and_then(Value::as_object)
}
