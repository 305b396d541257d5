// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// HTTP transport seam.
//
// `GraphRequest` / `GraphResponse` are plain data so that a request can be
// recorded and a response scripted.  `ReqwestTransport` is the production
// implementation; `testing::RecordingTransport` is the fake.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};

use uprint_core::error::{Result, UprintError};

/// HTTP methods used against Graph and the upload endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Patch,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
        }
    }
}

/// Request payload.
#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    Empty,
    Json(serde_json::Value),
    Bytes {
        content_type: String,
        data: Vec<u8>,
    },
    /// `application/x-www-form-urlencoded` pairs (token endpoint).
    Form(Vec<(String, String)>),
}

/// One outbound HTTP request.
#[derive(Debug, Clone)]
pub struct GraphRequest {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Body,
}

impl GraphRequest {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: Vec::new(),
            body: Body::Empty,
        }
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn json(mut self, value: serde_json::Value) -> Self {
        self.body = Body::Json(value);
        self
    }

    pub fn bytes(mut self, content_type: impl Into<String>, data: Vec<u8>) -> Self {
        self.body = Body::Bytes {
            content_type: content_type.into(),
            data,
        };
        self
    }

    pub fn form(mut self, pairs: Vec<(String, String)>) -> Self {
        self.body = Body::Form(pairs);
        self
    }

    /// Case-insensitive header lookup.
    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// One HTTP response, fully buffered.
#[derive(Debug, Clone)]
pub struct GraphResponse {
    pub status: u16,
    /// Reason phrase, e.g. `Created`.
    pub reason: String,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl GraphResponse {
    pub fn new(status: u16, reason: impl Into<String>) -> Self {
        Self {
            status,
            reason: reason.into(),
            headers: Vec::new(),
            body: Vec::new(),
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn with_json(mut self, value: serde_json::Value) -> Self {
        self.body = value.to_string().into_bytes();
        self.headers
            .push(("Content-Type".into(), "application/json".into()));
        self
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Decode the body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(serde_json::from_slice(&self.body)?)
    }

    /// Turn a non-2xx response into `UprintError::Http`.
    ///
    /// The status text is Graph's `error.message` when the body carries one,
    /// otherwise the reason phrase.
    pub fn error_for_status(self) -> Result<Self> {
        if self.is_success() {
            return Ok(self);
        }
        let message = serde_json::from_slice::<serde_json::Value>(&self.body)
            .ok()
            .and_then(|v| {
                v.pointer("/error/message")
                    .and_then(|m| m.as_str())
                    .map(str::to_owned)
            });
        Err(UprintError::http(
            self.status,
            message.unwrap_or_else(|| self.reason.clone()),
        ))
    }
}

/// Sends a request and buffers the response.
///
/// Implementations report connection-level failures as
/// `UprintError::Transport`; HTTP error statuses are returned as responses.
#[async_trait]
pub trait GraphTransport: Send + Sync {
    async fn send(&self, request: GraphRequest) -> Result<GraphResponse>;
}

// ---------------------------------------------------------------------------
// reqwest
// ---------------------------------------------------------------------------

/// Production transport on a shared `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    http: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new() -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("uprint/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| UprintError::Transport(format!("HTTP client setup: {e}")))?;
        Ok(Self { http })
    }
}

#[async_trait]
impl GraphTransport for ReqwestTransport {
    #[instrument(skip_all, fields(method = request.method.as_str(), url = %request.url))]
    async fn send(&self, request: GraphRequest) -> Result<GraphResponse> {
        let method = match request.method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Patch => reqwest::Method::PATCH,
        };
        let mut builder = self.http.request(method, &request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        builder = match request.body {
            Body::Empty => builder,
            Body::Json(value) => builder.json(&value),
            Body::Bytes { content_type, data } => builder
                .header(reqwest::header::CONTENT_TYPE, content_type)
                .body(data),
            Body::Form(pairs) => builder.form(&pairs),
        };

        let response = builder
            .send()
            .await
            .map_err(|e| UprintError::Transport(e.to_string()))?;

        let status = response.status();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_owned(), v.to_owned()))
            })
            .collect();
        let body = response
            .bytes()
            .await
            .map_err(|e| UprintError::Transport(format!("reading response body: {e}")))?
            .to_vec();

        debug!(status = status.as_u16(), len = body.len(), "response received");
        Ok(GraphResponse {
            status: status.as_u16(),
            reason: status.canonical_reason().unwrap_or_default().to_owned(),
            headers,
            body,
        })
    }
}
