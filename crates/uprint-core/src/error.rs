// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for uprint.

use thiserror::Error;

/// Top-level error type for all uprint operations.
#[derive(Debug, Error)]
pub enum UprintError {
    // -- Graph transport --
    #[error("authentication failed: {0}")]
    Auth(String),

    #[error("Graph request failed: {0}")]
    Transport(String),

    /// Non-success HTTP status; `status_text` is the reason phrase (or the
    /// Graph error message when the body carried one).
    #[error("Graph returned {status} {status_text}")]
    Http { status: u16, status_text: String },

    #[error("response is missing the {0} header")]
    MissingHeader(&'static str),

    // -- Printer registration --
    #[error("printer registration failed: {description}")]
    OperationFailed { description: String },

    #[error("printer registration still running after {attempts} status checks")]
    OperationTimedOut { attempts: u32 },

    // -- Documents --
    #[error("unsupported document type: {0}")]
    UnsupportedDocument(String),

    #[error("document '{0}' is empty")]
    EmptyDocument(String),

    #[error("no printer selected")]
    NoPrinterSelected,

    #[error("no printer share with id '{0}'")]
    UnknownPrinter(String),

    #[error("no document selected")]
    NoDocumentSelected,

    /// Start answered 2xx but left the job in a state other than processing
    /// or completed.
    #[error("print job was not started (state: {state})")]
    JobNotStarted { state: String },

    // -- Webhook --
    #[error("invalid client state")]
    InvalidClientState,

    #[error("unexpected resource path '{path}': {reason}")]
    ResourcePath { path: String, reason: String },

    // -- Security --
    #[error("certificate request generation failed: {0}")]
    Certificate(String),

    // -- Configuration / persistence --
    #[error("configuration error: {0}")]
    Config(String),

    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl UprintError {
    /// Build an `Http` error from a status code and its reason phrase.
    pub fn http(status: u16, status_text: impl Into<String>) -> Self {
        Self::Http {
            status,
            status_text: status_text.into(),
        }
    }
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, UprintError>;
