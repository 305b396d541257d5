// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Printer share listing with a per-session cache.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use tracing::{debug, info, instrument, warn};

use uprint_core::error::Result;
use uprint_core::types::{AccessToken, PrinterShare};

use crate::client::{Collection, GraphClient};

/// Cache key holding the serialized share list.
pub const SHARES_CACHE_KEY: &str = "printerSharesJson";

const SHARES_PATH: &str = "print/shares?$select=id,displayName,model,status,defaults,capabilities";

/// String key/value store that lives as long as the process.
#[derive(Debug, Default)]
pub struct SessionStore {
    entries: Mutex<HashMap<String, String>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    pub fn set(&self, key: impl Into<String>, value: impl Into<String>) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.into(), value.into());
    }

    pub fn remove(&self, key: &str) -> Option<String> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key)
    }
}

/// Printer shares visible to the token's user.
///
/// A cached list short-circuits the Graph call.  An unreadable cache entry is
/// dropped and the list refetched.
#[instrument(skip(client, token, store))]
pub async fn list_shares(
    client: &GraphClient,
    token: &AccessToken,
    store: &SessionStore,
) -> Result<Vec<PrinterShare>> {
    if let Some(cached) = store.get(SHARES_CACHE_KEY) {
        match serde_json::from_str::<Vec<PrinterShare>>(&cached) {
            Ok(shares) => {
                debug!(count = shares.len(), "printer shares served from session cache");
                return Ok(shares);
            }
            Err(e) => {
                warn!(error = %e, "discarding unreadable share cache");
                store.remove(SHARES_CACHE_KEY);
            }
        }
    }

    let page: Collection<PrinterShare> = client.get_json(token, SHARES_PATH).await?;
    store.set(SHARES_CACHE_KEY, serde_json::to_string(&page.value)?);
    info!(count = page.value.len(), "printer shares loaded");
    Ok(page.value)
}
