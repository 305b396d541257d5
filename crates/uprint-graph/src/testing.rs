// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Scripted transport for tests.

use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;

use uprint_core::error::{Result, UprintError};

use crate::transport::{GraphRequest, GraphResponse, GraphTransport};

/// Replays queued responses in order and records every request it saw.
///
/// Running out of responses is a `Transport` error, so an unexpected extra
/// call fails the test instead of hanging.
#[derive(Default)]
pub struct RecordingTransport {
    responses: Mutex<VecDeque<GraphResponse>>,
    requests: Mutex<Vec<GraphRequest>>,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_responses(responses: impl IntoIterator<Item = GraphResponse>) -> Self {
        let transport = Self::new();
        for response in responses {
            transport.push(response);
        }
        transport
    }

    pub fn push(&self, response: GraphResponse) {
        self.responses
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(response);
    }

    /// Snapshot of the requests sent so far.
    pub fn requests(&self) -> Vec<GraphRequest> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

#[async_trait]
impl GraphTransport for RecordingTransport {
    async fn send(&self, request: GraphRequest) -> Result<GraphResponse> {
        let label = format!("{} {}", request.method.as_str(), request.url);
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(request);
        self.responses
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front()
            .ok_or_else(|| UprintError::Transport(format!("no scripted response for {label}")))
    }
}
