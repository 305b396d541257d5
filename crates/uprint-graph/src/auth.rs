// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Bearer token acquisition.
//
// Tokens are fetched on demand and handed back to the caller, who passes them
// to each Graph call.  Nothing here caches a token between calls.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{info, instrument, warn};

use uprint_core::config::AppConfig;
use uprint_core::error::{Result, UprintError};
use uprint_core::types::AccessToken;

use crate::transport::{GraphRequest, GraphTransport, Method};

/// Scope requested for application permissions on Graph.
pub const GRAPH_DEFAULT_SCOPE: &str = "https://graph.microsoft.com/.default";

/// Source of bearer tokens for Graph.
#[async_trait]
pub trait TokenProvider: Send + Sync {
    /// Token valid in `tenant_id`, or in the provider's home tenant when
    /// `None`.
    async fn token_for_tenant(&self, tenant_id: Option<&str>) -> Result<AccessToken>;
}

/// A token obtained elsewhere (interactive sign-in, `az account
/// get-access-token`), returned for every tenant.
#[derive(Debug, Clone)]
pub struct StaticToken(AccessToken);

impl StaticToken {
    pub fn new(token: AccessToken) -> Self {
        Self(token)
    }
}

#[async_trait]
impl TokenProvider for StaticToken {
    async fn token_for_tenant(&self, _tenant_id: Option<&str>) -> Result<AccessToken> {
        Ok(self.0.clone())
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    #[serde(default)]
    error_description: Option<String>,
}

/// OAuth2 client-credentials grant against the Microsoft identity platform.
pub struct ClientCredentials {
    transport: Arc<dyn GraphTransport>,
    authority_host: String,
    home_tenant: String,
    client_id: String,
    client_secret: String,
}

impl ClientCredentials {
    pub fn new(
        transport: Arc<dyn GraphTransport>,
        authority_host: impl Into<String>,
        home_tenant: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Self {
        Self {
            transport,
            authority_host: authority_host.into().trim_end_matches('/').to_owned(),
            home_tenant: home_tenant.into(),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
        }
    }

    /// Build from configuration; tenant, client id and secret must be set.
    pub fn from_config(config: &AppConfig, transport: Arc<dyn GraphTransport>) -> Result<Self> {
        Ok(Self::new(
            transport,
            config.authority_host.clone(),
            config.require("tenantId")?,
            config.require("clientId")?,
            config.require("clientSecret")?,
        ))
    }

    fn token_url(&self, tenant: &str) -> String {
        format!("{}/{tenant}/oauth2/v2.0/token", self.authority_host)
    }
}

#[async_trait]
impl TokenProvider for ClientCredentials {
    #[instrument(skip(self), fields(client_id = %self.client_id))]
    async fn token_for_tenant(&self, tenant_id: Option<&str>) -> Result<AccessToken> {
        let tenant = tenant_id
            .filter(|t| !t.is_empty())
            .unwrap_or(&self.home_tenant);

        let form = vec![
            ("grant_type".to_owned(), "client_credentials".to_owned()),
            ("client_id".to_owned(), self.client_id.clone()),
            ("client_secret".to_owned(), self.client_secret.clone()),
            ("scope".to_owned(), GRAPH_DEFAULT_SCOPE.to_owned()),
        ];
        let request = GraphRequest::new(Method::Post, self.token_url(tenant)).form(form);

        let response = self
            .transport
            .send(request)
            .await
            .map_err(|e| UprintError::Auth(format!("token endpoint unreachable: {e}")))?;

        let parsed: Option<TokenResponse> = response.json().ok();
        if !response.is_success() {
            let detail = parsed
                .and_then(|t| t.error_description)
                .unwrap_or_else(|| response.reason.clone());
            warn!(tenant, status = response.status, "token request rejected");
            return Err(UprintError::Auth(format!("{} {detail}", response.status)));
        }

        let token = parsed
            .and_then(|t| t.access_token)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| UprintError::Auth("token response missing access_token".into()))?;
        info!(tenant, "access token acquired");
        Ok(AccessToken::new(token))
    }
}
