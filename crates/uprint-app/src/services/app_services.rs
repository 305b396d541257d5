// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Central service layer — loads configuration, builds the Graph client, and
// chooses a token source.
//
// Precedence for settings: config.json, then `UPRINT_*` variables, then
// command-line flags.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::info;
use uprint_core::AppConfig;
use uprint_core::error::Result;
use uprint_core::types::AccessToken;
use uprint_graph::{ClientCredentials, GraphClient, SessionStore, StaticToken, TokenProvider};

use super::data_dir;
use crate::cli::GlobalArgs;

pub struct AppServices {
    pub config: AppConfig,
    pub data_dir: PathBuf,
    pub client: GraphClient,
    pub shares: SessionStore,
    access_token: Option<AccessToken>,
}

impl AppServices {
    pub fn init(global: &GlobalArgs) -> Result<Self> {
        let dir = data_dir::data_dir(global.data_dir.as_deref())?;
        let config = effective_config(
            AppConfig::load(&dir)?,
            |key| std::env::var(key).ok(),
            global,
        );
        let client = GraphClient::from_config(&config)?;
        info!(path = %dir.display(), graph = %config.graph_base_url, "services initialised");
        Ok(Self {
            config,
            data_dir: dir,
            client,
            shares: SessionStore::new(),
            access_token: global.token.clone().map(AccessToken::new),
        })
    }

    /// A pre-acquired token when one was given, else client credentials.
    pub fn tokens(&self) -> Result<Arc<dyn TokenProvider>> {
        match &self.access_token {
            Some(token) => Ok(Arc::new(StaticToken::new(token.clone()))),
            None => Ok(Arc::new(ClientCredentials::from_config(
                &self.config,
                self.client.transport(),
            )?)),
        }
    }

    /// Token for the home tenant.
    pub async fn token(&self) -> Result<AccessToken> {
        self.tokens()?.token_for_tenant(None).await
    }

    pub fn devices_dir(&self) -> Result<PathBuf> {
        data_dir::data_subdir(&self.data_dir, "devices")
    }

    #[cfg(test)]
    pub(crate) fn for_tests(client: GraphClient, data_dir: PathBuf, token: &str) -> Self {
        Self {
            config: AppConfig::default(),
            data_dir,
            client,
            shares: SessionStore::new(),
            access_token: Some(AccessToken::new(token)),
        }
    }
}

fn effective_config(
    mut config: AppConfig,
    env: impl Fn(&str) -> Option<String>,
    global: &GlobalArgs,
) -> AppConfig {
    config.apply_overrides(env);
    if let Some(url) = &global.graph_base_url {
        config.graph_base_url = url.clone();
    }
    config
}

/// Configuration as JSON with the client secret masked.
pub fn redacted_config_json(config: &AppConfig) -> Result<String> {
    let mut shown = config.clone();
    if !shown.client_secret.is_empty() {
        shown.client_secret = "********".into();
    }
    Ok(serde_json::to_string_pretty(&shown)?)
}
