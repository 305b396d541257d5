// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Graph client bound to one API root.
//
// Thin on purpose: it resolves relative paths against the base URL, attaches
// the bearer token, and turns error statuses into `UprintError::Http`.  The
// Universal Print operations themselves live in the sibling modules.

use std::sync::Arc;

use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use uprint_core::config::AppConfig;
use uprint_core::error::Result;
use uprint_core::types::AccessToken;

use crate::transport::{GraphRequest, GraphResponse, GraphTransport, Method, ReqwestTransport};

/// Graph's collection envelope, `{"value": [...]}`.
#[derive(Debug, Deserialize)]
pub(crate) struct Collection<T> {
    #[serde(default = "Vec::new")]
    pub value: Vec<T>,
}

#[derive(Clone)]
pub struct GraphClient {
    transport: Arc<dyn GraphTransport>,
    base_url: String,
}

impl GraphClient {
    pub fn new(transport: Arc<dyn GraphTransport>, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_owned();
        Self {
            transport,
            base_url,
        }
    }

    /// Client over reqwest against the configured Graph root.
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let transport = Arc::new(ReqwestTransport::new()?);
        Ok(Self::new(transport, config.graph_base_url.clone()))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn transport(&self) -> Arc<dyn GraphTransport> {
        Arc::clone(&self.transport)
    }

    /// Absolute URL for `path`.  Absolute inputs pass through unchanged.
    pub fn url(&self, path: &str) -> String {
        if path.starts_with("https://") || path.starts_with("http://") {
            path.to_owned()
        } else {
            format!("{}/{}", self.base_url, path.trim_start_matches('/'))
        }
    }

    /// Request builder for `path` with the bearer token attached.
    pub fn request(&self, token: &AccessToken, method: Method, path: &str) -> GraphRequest {
        GraphRequest::new(method, self.url(path)).header("Authorization", token.bearer())
    }

    /// Send without status checking.
    pub async fn send(&self, request: GraphRequest) -> Result<GraphResponse> {
        let method = request.method;
        let response = self.transport.send(request).await?;
        if response.is_success() {
            debug!(method = method.as_str(), status = response.status, "graph call");
        } else {
            warn!(
                method = method.as_str(),
                status = response.status,
                reason = %response.reason,
                "graph call failed"
            );
        }
        Ok(response)
    }

    /// Send and fail on any non-2xx status.
    pub async fn execute(&self, request: GraphRequest) -> Result<GraphResponse> {
        self.send(request).await?.error_for_status()
    }

    pub async fn get_json<T: DeserializeOwned>(&self, token: &AccessToken, path: &str) -> Result<T> {
        self.execute(self.request(token, Method::Get, path))
            .await?
            .json()
    }

    pub async fn post_json<T: DeserializeOwned>(
        &self,
        token: &AccessToken,
        path: &str,
        body: serde_json::Value,
    ) -> Result<T> {
        self.execute(self.request(token, Method::Post, path).json(body))
            .await?
            .json()
    }

    /// PATCH `body`; the response body, if any, is discarded.
    pub async fn patch(
        &self,
        token: &AccessToken,
        path: &str,
        body: serde_json::Value,
    ) -> Result<GraphResponse> {
        self.execute(self.request(token, Method::Patch, path).json(body))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::RecordingTransport;
    use crate::transport::GraphResponse;
    use serde_json::json;
    use uprint_core::UprintError;

    #[test]
    fn relative_paths_join_base_url() {
        let client = GraphClient::new(
            Arc::new(RecordingTransport::new()),
            "https://graph.microsoft.com/v1.0/",
        );
        assert_eq!(
            client.url("/print/shares"),
            "https://graph.microsoft.com/v1.0/print/shares"
        );
        assert_eq!(client.url("https://upload.example/x"), "https://upload.example/x");
    }

    #[tokio::test]
    async fn bearer_token_is_attached() {
        let transport = Arc::new(RecordingTransport::with_responses([
            GraphResponse::new(200, "OK").with_json(json!({"id": "P1"}))
        ]));
        let client = GraphClient::new(transport.clone(), "https://graph.test/v1.0");
        let _: serde_json::Value = client
            .get_json(&AccessToken::new("t0k"), "print/printers/P1")
            .await
            .unwrap();
        let sent = transport.requests();
        assert_eq!(sent[0].header_value("authorization"), Some("Bearer t0k"));
    }

    #[tokio::test]
    async fn error_status_surfaces_as_http_error() {
        let transport = Arc::new(RecordingTransport::with_responses([GraphResponse::new(
            401,
            "Unauthorized",
        )]));
        let client = GraphClient::new(transport, "https://graph.test/v1.0");
        let err = client
            .get_json::<serde_json::Value>(&AccessToken::new("t"), "print/shares")
            .await
            .unwrap_err();
        assert!(matches!(err, UprintError::Http { status: 401, .. }));
    }
}
