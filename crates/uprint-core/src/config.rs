// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Application configuration.
//
// Settings are persisted as pretty JSON in the data directory.  A handful of
// deployment-specific values (tenant, client credentials, client state) can
// be overridden through `UPRINT_*` environment variables so that secrets do
// not have to live in the config file.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{Result, UprintError};
use crate::types::ColorMode;

/// File name of the persisted configuration inside the data directory.
pub const CONFIG_FILE: &str = "config.json";

/// How document bytes reach Universal Print.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum UploadMode {
    /// `createUploadSession`, then a single `PUT` with `Content-Range`.
    UploadSession,
    /// `uploadData` with a `Range` header.
    UploadData,
}

/// Persistent application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AppConfig {
    /// Graph API root, including the version segment.
    pub graph_base_url: String,
    /// OAuth authority host used for client-credential tokens.
    pub authority_host: String,
    /// Home tenant of the application registration.
    pub tenant_id: String,
    /// Application (client) id.
    pub client_id: String,
    /// Client secret for the client-credentials grant.
    pub client_secret: String,
    /// Shared secret echoed back in every webhook notification.
    pub client_state: String,
    /// Public URL Graph delivers task notifications to.
    pub notification_url: String,
    /// Subscription lifetime in minutes (Graph caps print subscriptions at 4230).
    pub subscription_lifetime_minutes: i64,
    /// Registration status checks before giving up.
    pub registration_poll_attempts: u32,
    /// Poll interval used when the service does not suggest one.
    pub default_poll_interval_secs: u64,
    /// Upload flavour for print submission.
    pub upload_mode: UploadMode,
    /// Colour mode the webhook forces onto intercepted jobs.
    pub webhook_color_mode: ColorMode,
    /// Bind address for the webhook listener.
    pub webhook_bind: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            graph_base_url: "https://graph.microsoft.com/v1.0".into(),
            authority_host: "https://login.microsoftonline.com".into(),
            tenant_id: String::new(),
            client_id: String::new(),
            client_secret: String::new(),
            client_state: String::new(),
            notification_url: String::new(),
            subscription_lifetime_minutes: 4230,
            registration_poll_attempts: 15,
            default_poll_interval_secs: 1,
            upload_mode: UploadMode::UploadSession,
            webhook_color_mode: ColorMode::Grayscale,
            webhook_bind: "0.0.0.0:3978".into(),
        }
    }
}

impl AppConfig {
    /// Load `config.json` from `data_dir`, falling back to defaults when the
    /// file does not exist.  A file that exists but cannot be parsed is an
    /// error rather than a silent reset.
    pub fn load(data_dir: &Path) -> Result<Self> {
        let path = data_dir.join(CONFIG_FILE);
        match std::fs::read_to_string(&path) {
            Ok(data) => {
                let config = serde_json::from_str(&data)?;
                debug!(path = %path.display(), "configuration loaded");
                Ok(config)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no configuration file, using defaults");
                Ok(Self::default())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Write the configuration to `data_dir/config.json`.
    pub fn save(&self, data_dir: &Path) -> Result<()> {
        std::fs::create_dir_all(data_dir)?;
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(data_dir.join(CONFIG_FILE), json)?;
        Ok(())
    }

    /// Apply `UPRINT_*` overrides from the given lookup (normally
    /// `std::env::var`).
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let fields: [(&str, &mut String); 7] = [
            ("UPRINT_GRAPH_BASE_URL", &mut self.graph_base_url),
            ("UPRINT_TENANT_ID", &mut self.tenant_id),
            ("UPRINT_CLIENT_ID", &mut self.client_id),
            ("UPRINT_CLIENT_SECRET", &mut self.client_secret),
            ("UPRINT_CLIENT_STATE", &mut self.client_state),
            ("UPRINT_NOTIFICATION_URL", &mut self.notification_url),
            ("UPRINT_WEBHOOK_BIND", &mut self.webhook_bind),
        ];
        for (key, slot) in fields {
            if let Some(value) = lookup(key) {
                debug!(key, "configuration override from environment");
                *slot = value;
            }
        }
        if let Some(value) = lookup("UPRINT_POLL_ATTEMPTS") {
            match value.parse() {
                Ok(n) => self.registration_poll_attempts = n,
                Err(_) => warn!(value = %value, "ignoring non-numeric UPRINT_POLL_ATTEMPTS"),
            }
        }
    }

    /// Fail early when a value needed by the server-to-server flows is blank.
    pub fn require(&self, field: &'static str) -> Result<&str> {
        let value = match field {
            "tenantId" => &self.tenant_id,
            "clientId" => &self.client_id,
            "clientSecret" => &self.client_secret,
            "clientState" => &self.client_state,
            "notificationUrl" => &self.notification_url,
            other => return Err(UprintError::Config(format!("unknown setting '{other}'"))),
        };
        if value.trim().is_empty() {
            Err(UprintError::Config(format!("'{field}' is not configured")))
        } else {
            Ok(value)
        }
    }

    pub fn default_poll_interval(&self) -> Duration {
        Duration::from_secs(self.default_poll_interval_secs)
    }
}
