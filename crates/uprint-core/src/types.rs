// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for the Graph `/print` resource tree.
//
// Field names follow Graph's camelCase JSON.  Unknown fields are ignored so
// that both the v1.0 and beta endpoints deserialize into the same types.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Result, UprintError};

/// OAuth bearer token for Graph calls.
///
/// Passed explicitly to every request; nothing in uprint caches it.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Value for the `Authorization` header.
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.0)
    }
}

impl std::fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("AccessToken(<redacted>)")
    }
}

/// Page orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Orientation {
    Portrait,
    Landscape,
    ReversePortrait,
    ReverseLandscape,
}

impl std::str::FromStr for Orientation {
    type Err = UprintError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "portrait" => Ok(Self::Portrait),
            "landscape" => Ok(Self::Landscape),
            "reverseportrait" | "reverse-portrait" => Ok(Self::ReversePortrait),
            "reverselandscape" | "reverse-landscape" => Ok(Self::ReverseLandscape),
            other => Err(UprintError::Config(format!("unknown orientation '{other}'"))),
        }
    }
}

/// Colour mode requested for a job or document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ColorMode {
    BlackAndWhite,
    Grayscale,
    Color,
    Auto,
}

impl std::str::FromStr for ColorMode {
    type Err = UprintError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "blackandwhite" | "black-and-white" | "bw" => Ok(Self::BlackAndWhite),
            "grayscale" | "greyscale" => Ok(Self::Grayscale),
            "color" | "colour" => Ok(Self::Color),
            "auto" => Ok(Self::Auto),
            other => Err(UprintError::Config(format!("unknown colour mode '{other}'"))),
        }
    }
}

/// Inclusive integer range, as used by `copiesPerJob` capabilities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntegerRange {
    pub start: u32,
    pub end: u32,
}

impl IntegerRange {
    /// Clamp `value` into the range.
    pub fn clamp(&self, value: u32) -> u32 {
        value.clamp(self.start.min(self.end), self.end.max(self.start))
    }
}

/// Printer-reported processing state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PrinterProcessingState {
    Idle,
    Processing,
    Stopped,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrinterStatus {
    pub state: PrinterProcessingState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Default job settings advertised by a printer or share.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrinterDefaults {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub copies_per_job: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub orientation: Option<Orientation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color_mode: Option<ColorMode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media_size: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duplex_mode: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quality: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dpi: Option<u32>,
}

/// Capabilities advertised by a printer or share.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrinterCapabilities {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub copies_per_job: Option<IntegerRange>,
    #[serde(default)]
    pub orientations: Vec<Orientation>,
    #[serde(default)]
    pub color_modes: Vec<ColorMode>,
    #[serde(default)]
    pub content_types: Vec<String>,
}

/// A printer exposed to end users for submitting jobs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrinterShare {
    pub id: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<PrinterStatus>,
    #[serde(default)]
    pub defaults: PrinterDefaults,
    #[serde(default)]
    pub capabilities: PrinterCapabilities,
}

/// A registered printer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Printer {
    pub id: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manufacturer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_shared: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<PrinterStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub defaults: Option<PrinterDefaults>,
}

/// Copies / orientation / colour settings for a job or one of its documents.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrintConfiguration {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub copies: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub orientation: Option<Orientation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color_mode: Option<ColorMode>,
}

/// One file attached to a print job.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrintDocument {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub configuration: Option<PrintConfiguration>,
}

/// Lifecycle states of a print job as reported by Universal Print.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum JobProcessingState {
    Pending,
    PendingHeld,
    Processing,
    Paused,
    Stopped,
    Completed,
    Canceled,
    Aborted,
    #[serde(other)]
    Unknown,
}

impl JobProcessingState {
    /// Whether a start request leaving the job in this state counts as a
    /// successful submission.
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Processing | Self::Completed)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrintJobStatus {
    #[serde(default, alias = "processingState", skip_serializing_if = "Option::is_none")]
    pub state: Option<JobProcessingState>,
    #[serde(
        default,
        alias = "processingStateDescription",
        skip_serializing_if = "Option::is_none"
    )]
    pub description: Option<String>,
    #[serde(default, alias = "acquiredByPrinter", skip_serializing_if = "Option::is_none")]
    pub is_acquired_by_printer: Option<bool>,
}

/// A submission to print a document.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrintJob {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_date_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub documents: Vec<PrintDocument>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<PrintJobStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub configuration: Option<PrintConfiguration>,
}

/// Transient handle for a byte upload.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadSession {
    pub upload_url: String,
    #[serde(default, alias = "expectedRanges")]
    pub next_expected_ranges: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiration_date_time: Option<DateTime<Utc>>,
}

/// State of an asynchronous print operation (printer creation).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum OperationState {
    NotStarted,
    Running,
    Succeeded,
    Failed,
    #[serde(other)]
    Unknown,
}

impl OperationState {
    /// Only `Succeeded` and `Failed` end polling.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationStatus {
    pub state: OperationState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Pollable handle returned for a printer creation request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrintOperation {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_date_time: Option<DateTime<Utc>>,
    pub status: OperationStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub printer: Option<Printer>,
    /// Device certificate issued on success.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub certificate: Option<String>,
    /// Headers echoed into the body by some Graph SDK paths (`Retry-After`).
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub response_headers: HashMap<String, serde_json::Value>,
}

impl PrintOperation {
    /// `Retry-After` seconds carried inside the body, if any.
    ///
    /// Accepts a bare number, a numeric string, or an array whose first
    /// element is one of those.
    pub fn body_retry_after_secs(&self) -> Option<u64> {
        let value = self
            .response_headers
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case("retry-after"))
            .map(|(_, v)| v)?;
        let first = match value {
            serde_json::Value::Array(items) => items.first()?,
            other => other,
        };
        match first {
            serde_json::Value::Number(n) => n.as_u64(),
            serde_json::Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }
}

/// Additional data attached to a change notification.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_url: Option<String>,
}

/// One inbound webhook event.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeNotification {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subscription_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub change_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tenant_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_state: Option<String>,
    #[serde(default)]
    pub resource: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_data: Option<ResourceData>,
}

/// A webhook delivery batch.  Graph names the array `value`; the samples
/// model it as `items`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NotificationBatch {
    #[serde(default, alias = "value")]
    pub items: Vec<ChangeNotification>,
}

/// Application identity attached to a task definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppIdentity {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_id: Option<String>,
    pub display_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskDefinition {
    pub id: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<AppIdentity>,
}

/// Printer lifecycle events a task trigger can hook.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PrintEvent {
    JobStarted,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskTrigger {
    pub id: String,
    pub event: PrintEvent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TaskProcessingState {
    Pending,
    Processing,
    Completed,
    Aborted,
    #[serde(other)]
    Unknown,
}

/// Status written back to a print task by the app that handled it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrintTaskStatus {
    pub state: TaskProcessingState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// A Graph change-notification subscription.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subscription {
    pub id: String,
    #[serde(default)]
    pub resource: String,
    #[serde(default)]
    pub change_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notification_url: Option<String>,
    pub expiration_date_time: DateTime<Utc>,
}

/// Document formats Universal Print accepts from this toolkit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DocumentFormat {
    Pdf,
    /// OpenXPS (also accepted under the legacy `.xps` extension).
    Oxps,
}

impl DocumentFormat {
    /// MIME type sent as the document `contentType`.
    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Pdf => "application/pdf",
            Self::Oxps => "application/oxps",
        }
    }

    /// Infer the format from a file extension.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "pdf" => Some(Self::Pdf),
            "oxps" | "xps" => Some(Self::Oxps),
            _ => None,
        }
    }

    /// Infer the format from a MIME type.
    pub fn from_mime(mime: &str) -> Option<Self> {
        match mime.trim().to_ascii_lowercase().as_str() {
            "application/pdf" => Some(Self::Pdf),
            "application/oxps" | "application/vnd.ms-xpsdocument" => Some(Self::Oxps),
            _ => None,
        }
    }
}

/// A validated document ready for submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub name: String,
    pub format: DocumentFormat,
    pub bytes: Vec<u8>,
}

impl Document {
    /// Validate a user-chosen file.
    ///
    /// The format comes from `content_type` when it is a recognised MIME type,
    /// otherwise from the file extension.  Unsupported and empty files are
    /// rejected here, before anything touches the network.
    pub fn new(name: impl Into<String>, content_type: Option<&str>, bytes: Vec<u8>) -> Result<Self> {
        let name = name.into();
        let from_name = std::path::Path::new(&name)
            .extension()
            .and_then(|e| e.to_str())
            .and_then(DocumentFormat::from_extension);
        let format = content_type
            .and_then(DocumentFormat::from_mime)
            .or(from_name)
            .ok_or_else(|| {
                UprintError::UnsupportedDocument(
                    content_type.map(str::to_owned).unwrap_or_else(|| name.clone()),
                )
            })?;

        if bytes.is_empty() {
            return Err(UprintError::EmptyDocument(name));
        }

        Ok(Self {
            name,
            format,
            bytes,
        })
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}
