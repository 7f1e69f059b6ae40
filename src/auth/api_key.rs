// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! API keys and the configured allow-lists.

use std::collections::HashSet;
use std::fmt;

/// Characters of a key kept visible by [`mask_key`].
const VISIBLE_PREFIX: usize = 4;

/// A key that passed authentication.
///
/// Inserted into request extensions by the auth middleware. `Debug` and
/// `Display` print the masked form.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn masked(&self) -> String {
        mask_key(&self.0)
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ApiKey").field(&self.masked()).finish()
    }
}

impl fmt::Display for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.masked())
    }
}

/// Render a key for logs: the first few characters followed by `****`.
pub fn mask_key(key: &str) -> String {
    let prefix: String = key.chars().take(VISIBLE_PREFIX).collect();
    if prefix.chars().count() == key.chars().count() {
        "****".to_string()
    } else {
        format!("{prefix}****")
    }
}

/// Accepted keys, plus the subset allowed to call admin routes.
#[derive(Debug, Default, Clone)]
pub struct ApiKeySet {
    keys: HashSet<String>,
    admin_keys: HashSet<String>,
}

impl ApiKeySet {
    /// Build the allow-lists. Admin keys not present in `keys` can never
    /// authenticate and are ignored with a warning.
    pub fn new(keys: impl IntoIterator<Item = String>, admin_keys: impl IntoIterator<Item = String>) -> Self {
        let keys: HashSet<String> = keys.into_iter().collect();
        let admin_keys = admin_keys
            .into_iter()
            .filter(|key| {
                let known = keys.contains(key);
                if !known {
                    tracing::warn!(key = %mask_key(key), "Admin key is not in API_KEYS, ignoring");
                }
                known
            })
            .collect();
        Self { keys, admin_keys }
    }

    pub fn is_valid(&self, key: &str) -> bool {
        self.keys.contains(key)
    }

    pub fn is_admin(&self, key: &ApiKey) -> bool {
        self.admin_keys.contains(key.as_str())
    }
}
