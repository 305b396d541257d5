// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Printer registration.
//
// Creating a printer is asynchronous: Graph answers with an
// `Operation-Location` header, and the operation is polled until it reports
// `succeeded` or `failed`.  The wait between polls is whatever the service
// asks for; the number of polls is bounded.

use std::time::Duration;

use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use uprint_core::config::AppConfig;
use uprint_core::error::{Result, UprintError};
use uprint_core::resource::operation_id_from_location;
use uprint_core::types::{AccessToken, OperationState, PrintOperation, Printer};
use uprint_security::DeviceCsr;

use crate::client::GraphClient;
use crate::transport::{GraphResponse, Method};

/// Body of `POST /print/printers`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PrinterRegistration {
    pub display_name: String,
    pub manufacturer: String,
    pub model: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub physical_device_id: Option<String>,
    pub has_physical_device: bool,
    pub certificate_signing_request: CsrPayload,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CsrPayload {
    pub content: String,
    pub transport_key: String,
}

impl From<&DeviceCsr> for CsrPayload {
    fn from(csr: &DeviceCsr) -> Self {
        Self {
            content: csr.content.clone(),
            transport_key: csr.transport_key.clone(),
        }
    }
}

/// Result of a successful registration.
#[derive(Debug, Clone)]
pub struct RegisteredPrinter {
    /// Present when the operation resource embeds the printer.
    pub printer: Option<Printer>,
    /// Device certificate issued for the CSR.
    pub certificate: Option<String>,
}

/// Bounds on the status loop.
#[derive(Debug, Clone, Copy)]
pub struct PollPolicy {
    /// Status checks before giving up.
    pub max_attempts: u32,
    /// Wait used when the service does not send `Retry-After`.
    pub default_interval: Duration,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 15,
            default_interval: Duration::from_secs(1),
        }
    }
}

impl From<&AppConfig> for PollPolicy {
    fn from(config: &AppConfig) -> Self {
        Self {
            max_attempts: config.registration_poll_attempts,
            default_interval: config.default_poll_interval(),
        }
    }
}

/// Start printer creation and return the operation id to poll.
#[instrument(skip(client, token, registration), fields(name = %registration.display_name))]
pub async fn register_printer(
    client: &GraphClient,
    token: &AccessToken,
    registration: &PrinterRegistration,
) -> Result<String> {
    let body = serde_json::to_value(registration)?;
    let response = client
        .execute(client.request(token, Method::Post, "print/printers").json(body))
        .await?;
    let location = response
        .header("Operation-Location")
        .ok_or(UprintError::MissingHeader("Operation-Location"))?;
    let operation_id = operation_id_from_location(location)?;
    info!(operation_id = %operation_id, "printer creation accepted");
    Ok(operation_id)
}

/// Seconds from the `Retry-After` header, then from the body's echoed
/// `responseHeaders`.
fn retry_after(response: &GraphResponse, operation: &PrintOperation) -> Option<Duration> {
    response
        .header("Retry-After")
        .and_then(|v| v.trim().parse::<u64>().ok())
        .or_else(|| operation.body_retry_after_secs())
        .map(Duration::from_secs)
}

/// Poll `print/operations/{id}` until it is terminal or the budget runs out.
///
/// No status call is made after a terminal observation, and there is no
/// sleep after the last permitted poll.
#[instrument(skip(client, token, policy), fields(max_attempts = policy.max_attempts))]
pub async fn poll_operation(
    client: &GraphClient,
    token: &AccessToken,
    operation_id: &str,
    policy: PollPolicy,
) -> Result<RegisteredPrinter> {
    let path = format!("print/operations/{operation_id}");

    for attempt in 1..=policy.max_attempts {
        let response = client
            .execute(client.request(token, Method::Get, &path))
            .await?;
        let operation: PrintOperation = response.json()?;

        match operation.status.state {
            OperationState::Succeeded => {
                info!(attempt, "printer registration succeeded");
                if operation.printer.is_none() {
                    warn!("succeeded operation did not include the printer");
                }
                return Ok(RegisteredPrinter {
                    printer: operation.printer,
                    certificate: operation.certificate,
                });
            }
            OperationState::Failed => {
                let description = operation
                    .status
                    .description
                    .unwrap_or_else(|| "no description".to_owned());
                warn!(attempt, description = %description, "printer registration failed");
                return Err(UprintError::OperationFailed { description });
            }
            state => debug!(attempt, ?state, "operation still in progress"),
        }

        if attempt == policy.max_attempts {
            break;
        }
        let delay = retry_after(&response, &operation).unwrap_or(policy.default_interval);
        debug!(delay_secs = delay.as_secs(), "waiting before next status check");
        tokio::time::sleep(delay).await;
    }

    warn!(attempts = policy.max_attempts, "printer registration did not finish in time");
    Err(UprintError::OperationTimedOut {
        attempts: policy.max_attempts,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::RecordingTransport;
    use crate::transport::Body;
    use serde_json::json;
    use std::sync::Arc;

    const OP: &str = "67348dfe-b1bb-4e1a-9a17-ca0da73cef64";

    fn client(transport: &Arc<RecordingTransport>) -> GraphClient {
        GraphClient::new(transport.clone(), "https://graph.test/v1.0")
    }

    fn running() -> GraphResponse {
        GraphResponse::new(200, "OK")
            .with_header("Retry-After", "5")
            .with_json(json!({"id": OP, "status": {"state": "running"}}))
    }

    fn registration() -> PrinterRegistration {
        PrinterRegistration {
            display_name: "Lobby".into(),
            manufacturer: "Contoso".into(),
            model: "LaserJet 9".into(),
            physical_device_id: None,
            has_physical_device: false,
            certificate_signing_request: CsrPayload {
                content: "CSR".into(),
                transport_key: "KEY".into(),
            },
        }
    }

    #[tokio::test]
    async fn registration_reads_operation_location() {
        let transport = Arc::new(RecordingTransport::with_responses([GraphResponse::new(
            202, "Accepted",
        )
        .with_header(
            "Operation-Location",
            format!("https://graph.test/v1.0/print/operations/{OP}"),
        )]));
        let id = register_printer(&client(&transport), &AccessToken::new("t"), &registration())
            .await
            .unwrap();
        assert_eq!(id, OP);

        let sent = &transport.requests()[0];
        assert!(sent.url.ends_with("/print/printers"));
        match &sent.body {
            Body::Json(body) => {
                assert_eq!(body["certificateSigningRequest"]["transportKey"], "KEY");
                assert_eq!(body["hasPhysicalDevice"], false);
                assert!(body.get("physicalDeviceId").is_none());
            }
            other => panic!("expected JSON body, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn missing_operation_location_is_an_error() {
        let transport = Arc::new(RecordingTransport::with_responses([GraphResponse::new(
            202, "Accepted",
        )]));
        let err = register_printer(&client(&transport), &AccessToken::new("t"), &registration())
            .await
            .unwrap_err();
        assert!(matches!(err, UprintError::MissingHeader("Operation-Location")));
    }

    #[tokio::test(start_paused = true)]
    async fn success_after_running_honours_retry_after() {
        let transport = Arc::new(RecordingTransport::with_responses([
            running(),
            GraphResponse::new(200, "OK").with_json(json!({
                "id": OP,
                "status": {"state": "succeeded"},
                "printer": {"id": "PR1", "displayName": "Lobby"},
                "certificate": "MIIC"
            })),
        ]));
        let start = tokio::time::Instant::now();
        let registered = poll_operation(
            &client(&transport),
            &AccessToken::new("t"),
            OP,
            PollPolicy::default(),
        )
        .await
        .unwrap();

        assert_eq!(registered.printer.map(|p| p.id).as_deref(), Some("PR1"));
        assert_eq!(registered.certificate.as_deref(), Some("MIIC"));
        assert_eq!(transport.request_count(), 2);
        assert_eq!(start.elapsed(), Duration::from_secs(5));
    }

    #[tokio::test(start_paused = true)]
    async fn failed_is_terminal_and_not_retried() {
        let transport = Arc::new(RecordingTransport::with_responses([GraphResponse::new(
            200, "OK",
        )
        .with_json(json!({
            "id": OP,
            "status": {"state": "failed", "description": "CSR rejected"}
        }))]));
        let err = poll_operation(
            &client(&transport),
            &AccessToken::new("t"),
            OP,
            PollPolicy::default(),
        )
        .await
        .unwrap_err();
        match err {
            UprintError::OperationFailed { description } => assert_eq!(description, "CSR rejected"),
            other => panic!("unexpected: {other:?}"),
        }
        assert_eq!(transport.request_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn times_out_after_exactly_fifteen_polls() {
        let transport = Arc::new(RecordingTransport::with_responses(
            std::iter::repeat_with(running).take(20),
        ));
        let start = tokio::time::Instant::now();
        let err = poll_operation(
            &client(&transport),
            &AccessToken::new("t"),
            OP,
            PollPolicy::default(),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, UprintError::OperationTimedOut { attempts: 15 }));
        assert_eq!(transport.request_count(), 15);
        // Fourteen waits between fifteen polls; none after the last.
        assert_eq!(start.elapsed(), Duration::from_secs(14 * 5));
    }

    #[tokio::test(start_paused = true)]
    async fn body_retry_after_and_default_interval_fallbacks() {
        let transport = Arc::new(RecordingTransport::with_responses([
            GraphResponse::new(200, "OK").with_json(json!({
                "id": OP,
                "status": {"state": "notStarted"},
                "responseHeaders": {"Retry-After": ["3"]}
            })),
            GraphResponse::new(200, "OK").with_json(json!({"id": OP, "status": {"state": "running"}})),
            GraphResponse::new(200, "OK").with_json(json!({"id": OP, "status": {"state": "succeeded"}})),
        ]));
        let start = tokio::time::Instant::now();
        let policy = PollPolicy {
            max_attempts: 15,
            default_interval: Duration::from_secs(2),
        };
        poll_operation(&client(&transport), &AccessToken::new("t"), OP, policy)
            .await
            .unwrap();
        assert_eq!(start.elapsed(), Duration::from_secs(3 + 2));
    }
}
