// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Print job submission: create job, upload the document, start the job.
//
// Each stage runs only after the previous one succeeded.  None of them is
// idempotent, so nothing is retried; the caller sees exactly where the
// pipeline stopped.
//
//   1. POST  print/shares/{share}/jobs
//   2. POST  .../documents/{doc}/createUploadSession, then PUT {uploadUrl}
//      or
//      POST  .../documents/{doc}/uploadData
//   3. POST  .../jobs/{job}/start          (only after the upload returned 201)

use serde_json::json;
use tracing::{error, info, instrument, warn};

use uprint_core::config::UploadMode;
use uprint_core::dialog::{DialogAction, PrintDialogState, PrintingState, SelectedConfig, reduce};
use uprint_core::error::{Result, UprintError};
use uprint_core::human_errors::humanize_error;
use uprint_core::types::{
    AccessToken, Document, JobProcessingState, PrintConfiguration, PrintJob, PrintJobStatus,
    UploadSession,
};
use uprint_security::short_fingerprint;

use crate::client::GraphClient;
use crate::transport::{GraphRequest, Method};

/// Status the upload endpoint answers with once every byte has arrived.
const UPLOAD_COMPLETE: u16 = 201;

/// Where submission ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionOutcome {
    /// Start was requested.  Check `succeeded()` before reporting success.
    Started {
        job_id: String,
        http_status: u16,
        job_status: Option<JobProcessingState>,
    },
    /// The upload did not answer 201; the job was left unstarted.
    UploadIncomplete { job_id: String, status: u16 },
}

impl SubmissionOutcome {
    /// 2xx start response whose reported state, if any, is processing or
    /// completed.
    pub fn succeeded(&self) -> bool {
        match self {
            Self::Started {
                http_status,
                job_status,
                ..
            } => {
                (200..300).contains(http_status)
                    && job_status.is_none_or(|s| s.is_accepted())
            }
            Self::UploadIncomplete { .. } => false,
        }
    }

    pub fn job_id(&self) -> &str {
        match self {
            Self::Started { job_id, .. } | Self::UploadIncomplete { job_id, .. } => job_id,
        }
    }

    /// The started job's id, or the error explaining why it did not start.
    pub fn into_result(self) -> Result<String> {
        match self {
            Self::UploadIncomplete { status, .. } => {
                Err(UprintError::http(status, "document upload did not complete"))
            }
            Self::Started { http_status, .. } if !(200..300).contains(&http_status) => {
                Err(UprintError::http(http_status, "job start was rejected"))
            }
            Self::Started {
                job_status: Some(state),
                ..
            } if !state.is_accepted() => Err(UprintError::JobNotStarted {
                state: format!("{state:?}").to_lowercase(),
            }),
            Self::Started { job_id, .. } => Ok(job_id),
        }
    }
}

/// `Content-Range` for a single-shot upload of `size` bytes.
pub fn content_range(size: u64) -> String {
    format!("bytes 0-{}/{size}", size.saturating_sub(1))
}

/// `Range` for `uploadData` of `size` bytes.
pub fn upload_range(size: u64) -> String {
    format!("bytes=0-{}", size.saturating_sub(1))
}

fn job_body(document: &Document, configuration: &PrintConfiguration) -> serde_json::Value {
    json!({
        "configuration": configuration,
        "documents": [{
            "displayName": document.name,
            "contentType": document.format.mime_type(),
            "size": document.size(),
            "documentConfiguration": configuration,
        }],
    })
}

/// Run the three-stage pipeline against `share_id`.
#[instrument(
    skip(client, token, document, configuration),
    fields(document = %document.name, size = document.size())
)]
pub async fn submit_print_job(
    client: &GraphClient,
    token: &AccessToken,
    share_id: &str,
    document: &Document,
    configuration: &PrintConfiguration,
    mode: UploadMode,
) -> Result<SubmissionOutcome> {
    if document.bytes.is_empty() {
        return Err(UprintError::EmptyDocument(document.name.clone()));
    }
    let size = document.size();
    info!(
        fingerprint = %short_fingerprint(&document.bytes),
        mime = document.format.mime_type(),
        "submitting print job"
    );

    // -- Stage 1: create job --
    let jobs_path = format!("print/shares/{share_id}/jobs");
    let job: PrintJob = client
        .post_json(token, &jobs_path, job_body(document, configuration))
        .await?;
    let document_id = job
        .documents
        .first()
        .map(|d| d.id.clone())
        .ok_or_else(|| {
            UprintError::Transport(format!("job {} was created without a document", job.id))
        })?;
    let job_path = format!("{jobs_path}/{}", job.id);
    let document_path = format!("{job_path}/documents/{document_id}");
    info!(job_id = %job.id, document_id = %document_id, "print job created");

    // -- Stage 2: upload --
    let upload_status = match mode {
        UploadMode::UploadSession => {
            let session: UploadSession = client
                .post_json(
                    token,
                    &format!("{document_path}/createUploadSession"),
                    json!({
                        "properties": {
                            "documentName": document.name,
                            "contentType": document.format.mime_type(),
                            "size": size,
                        }
                    }),
                )
                .await?;
            // The upload URL is pre-authorized; no bearer token.
            let put = GraphRequest::new(Method::Put, session.upload_url)
                .header("Content-Range", content_range(size))
                .bytes("application/octet-stream", document.bytes.clone());
            client.send(put).await?.status
        }
        UploadMode::UploadData => {
            let post = client
                .request(token, Method::Post, &format!("{document_path}/uploadData"))
                .header("Range", upload_range(size))
                .bytes(document.format.mime_type(), document.bytes.clone());
            client.send(post).await?.status
        }
    };

    if upload_status != UPLOAD_COMPLETE {
        warn!(job_id = %job.id, status = upload_status, "upload incomplete; job not started");
        return Ok(SubmissionOutcome::UploadIncomplete {
            job_id: job.id,
            status: upload_status,
        });
    }

    // -- Stage 3: start --
    let response = client
        .send(client.request(token, Method::Post, &format!("{job_path}/start")))
        .await?;
    let job_status = if response.is_success() && !response.body.is_empty() {
        match response.json::<PrintJobStatus>() {
            Ok(status) => status.state,
            Err(e) => {
                warn!(job_id = %job.id, error = %e, "unreadable start response body");
                None
            }
        }
    } else {
        None
    };

    let outcome = SubmissionOutcome::Started {
        job_id: job.id,
        http_status: response.status,
        job_status,
    };
    if outcome.succeeded() {
        info!(job_id = outcome.job_id(), state = ?job_status, "print job started");
    } else {
        error!(
            job_id = outcome.job_id(),
            status = response.status,
            state = ?job_status,
            "print job did not start"
        );
    }
    Ok(outcome)
}

/// Submit the dialog's selection and return the started job's id.
///
/// A missing printer or document is an error raised before any call.
pub async fn submit_selected(
    client: &GraphClient,
    token: &AccessToken,
    selected: &SelectedConfig,
    mode: UploadMode,
) -> Result<String> {
    let share_id = selected
        .printer
        .as_deref()
        .ok_or(UprintError::NoPrinterSelected)?;
    let document = selected
        .document
        .as_ref()
        .ok_or(UprintError::NoDocumentSelected)?;
    let configuration = selected.document_configuration();
    submit_print_job(client, token, share_id, document, &configuration, mode)
        .await?
        .into_result()
}

/// Submit what the dialog has selected and return the dialog's next state.
///
/// A dialog that is not ready to submit gets an error and no network call.
pub async fn submit_dialog(
    client: &GraphClient,
    token: &AccessToken,
    state: PrintDialogState,
    mode: UploadMode,
) -> PrintDialogState {
    if !state.ready_to_submit() {
        let message = match (&state.selected.printer, &state.selected.document) {
            (None, _) => humanize_error(&UprintError::NoPrinterSelected).message,
            (_, None) => humanize_error(&UprintError::NoDocumentSelected).message,
            _ => return state,
        };
        return reduce(state, DialogAction::UpdateError(message));
    }

    let state = reduce(state, DialogAction::ChangeState(PrintingState::Submitting));
    match submit_selected(client, token, &state.selected, mode).await {
        Ok(_) => reduce(state, DialogAction::ChangeState(PrintingState::Success)),
        Err(e) => {
            let human = humanize_error(&e);
            let state = reduce(
                state,
                DialogAction::UpdateError(format!("{} {}", human.message, human.suggestion)),
            );
            reduce(state, DialogAction::ChangeState(PrintingState::Failure))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::RecordingTransport;
    use crate::transport::{Body, GraphResponse};
    use std::sync::Arc;
    use uprint_core::dialog::SelectedFile;
    use uprint_core::types::{ColorMode, Orientation, PrinterDefaults, PrinterShare};

    fn created_job() -> GraphResponse {
        GraphResponse::new(201, "Created").with_json(json!({
            "id": "J1",
            "documents": [{"id": "D1", "contentType": "application/oxps"}],
            "status": {"state": "paused"}
        }))
    }

    fn client(transport: &Arc<RecordingTransport>) -> GraphClient {
        GraphClient::new(transport.clone(), "https://graph.test/v1.0")
    }

    fn document(bytes: usize) -> Document {
        Document::new("report.oxps", None, vec![7u8; bytes]).unwrap()
    }

    #[test]
    fn ranges_cover_whole_document() {
        assert_eq!(content_range(1), "bytes 0-0/1");
        assert_eq!(content_range(1024), "bytes 0-1023/1024");
        assert_eq!(upload_range(1024), "bytes=0-1023");
    }

    #[test]
    fn success_requires_accepted_state() {
        let started = |http_status, job_status| SubmissionOutcome::Started {
            job_id: "J".into(),
            http_status,
            job_status,
        };
        assert!(started(200, Some(JobProcessingState::Processing)).succeeded());
        assert!(started(200, Some(JobProcessingState::Completed)).succeeded());
        assert!(started(204, None).succeeded());
        assert!(!started(200, Some(JobProcessingState::Aborted)).succeeded());
        assert!(!started(400, Some(JobProcessingState::Processing)).succeeded());
        assert!(
            !SubmissionOutcome::UploadIncomplete {
                job_id: "J".into(),
                status: 200
            }
            .succeeded()
        );
    }

    #[test]
    fn failed_outcomes_carry_typed_errors() {
        let incomplete = SubmissionOutcome::UploadIncomplete {
            job_id: "J".into(),
            status: 202,
        };
        assert!(matches!(
            incomplete.into_result(),
            Err(UprintError::Http { status: 202, .. })
        ));

        let refused = SubmissionOutcome::Started {
            job_id: "J".into(),
            http_status: 409,
            job_status: None,
        };
        assert!(matches!(
            refused.into_result(),
            Err(UprintError::Http { status: 409, .. })
        ));

        let aborted = SubmissionOutcome::Started {
            job_id: "J".into(),
            http_status: 200,
            job_status: Some(JobProcessingState::Aborted),
        };
        match aborted.into_result() {
            Err(UprintError::JobNotStarted { state }) => assert_eq!(state, "aborted"),
            other => panic!("expected JobNotStarted, got {other:?}"),
        }

        let started = SubmissionOutcome::Started {
            job_id: "J".into(),
            http_status: 200,
            job_status: Some(JobProcessingState::Processing),
        };
        assert_eq!(started.into_result().unwrap(), "J");
    }

    #[tokio::test]
    async fn unreadable_start_body_counts_as_no_state() {
        let mut start = GraphResponse::new(200, "OK");
        start.body = b"<html>gateway</html>".to_vec();
        let transport = Arc::new(RecordingTransport::with_responses([
            created_job(),
            GraphResponse::new(201, "Created"),
            start,
        ]));
        let outcome = submit_print_job(
            &client(&transport),
            &AccessToken::new("t"),
            "P1",
            &document(4),
            &PrintConfiguration::default(),
            UploadMode::UploadData,
        )
        .await
        .unwrap();
        assert_eq!(
            outcome,
            SubmissionOutcome::Started {
                job_id: "J1".into(),
                http_status: 200,
                job_status: None,
            }
        );
    }

    #[tokio::test]
    async fn upload_session_flow_puts_without_token() {
        let transport = Arc::new(RecordingTransport::with_responses([
            created_job(),
            GraphResponse::new(200, "OK")
                .with_json(json!({"uploadUrl": "https://upload.test/session/abc"})),
            GraphResponse::new(201, "Created"),
            GraphResponse::new(200, "OK").with_json(json!({"state": "processing"})),
        ]));
        let outcome = submit_print_job(
            &client(&transport),
            &AccessToken::new("t"),
            "P1",
            &document(10),
            &PrintConfiguration::default(),
            UploadMode::UploadSession,
        )
        .await
        .unwrap();
        assert!(outcome.succeeded());

        let sent = transport.requests();
        assert_eq!(sent.len(), 4);
        assert!(sent[1].url.ends_with("/jobs/J1/documents/D1/createUploadSession"));
        assert_eq!(sent[2].method, Method::Put);
        assert_eq!(sent[2].url, "https://upload.test/session/abc");
        assert_eq!(sent[2].header_value("Content-Range"), Some("bytes 0-9/10"));
        assert!(sent[2].header_value("Authorization").is_none());
        assert!(sent[3].url.ends_with("/print/shares/P1/jobs/J1/start"));
    }

    #[tokio::test]
    async fn non_201_upload_never_starts_job() {
        let transport = Arc::new(RecordingTransport::with_responses([
            created_job(),
            GraphResponse::new(200, "OK").with_json(json!({"uploadUrl": "https://upload.test/s"})),
            GraphResponse::new(202, "Accepted"),
        ]));
        let outcome = submit_print_job(
            &client(&transport),
            &AccessToken::new("t"),
            "P1",
            &document(4),
            &PrintConfiguration::default(),
            UploadMode::UploadSession,
        )
        .await
        .unwrap();
        assert_eq!(
            outcome,
            SubmissionOutcome::UploadIncomplete {
                job_id: "J1".into(),
                status: 202
            }
        );
        assert_eq!(transport.request_count(), 3);
    }

    #[tokio::test]
    async fn create_job_failure_aborts_pipeline() {
        let transport = Arc::new(RecordingTransport::with_responses([GraphResponse::new(
            403, "Forbidden",
        )]));
        let err = submit_print_job(
            &client(&transport),
            &AccessToken::new("t"),
            "P1",
            &document(4),
            &PrintConfiguration::default(),
            UploadMode::UploadData,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, UprintError::Http { status: 403, .. }));
        assert_eq!(transport.request_count(), 1);
    }

    fn share_p1() -> PrinterShare {
        PrinterShare {
            id: "P1".into(),
            display_name: "Front Desk".into(),
            model: None,
            status: None,
            defaults: PrinterDefaults {
                copies_per_job: Some(1),
                orientation: Some(Orientation::Portrait),
                color_mode: Some(ColorMode::Auto),
                ..PrinterDefaults::default()
            },
            capabilities: Default::default(),
        }
    }

    fn dialog_with_file(name: &str, content_type: &str, bytes: Vec<u8>) -> PrintDialogState {
        let state = reduce(
            PrintDialogState::default(),
            DialogAction::SharesLoaded(vec![share_p1()]),
        );
        reduce(
            state,
            DialogAction::SelectFile(SelectedFile {
                name: name.into(),
                content_type: Some(content_type.into()),
                bytes,
            }),
        )
    }

    #[tokio::test]
    async fn share_p1_end_to_end_via_upload_data() {
        let bytes = vec![0x50u8; 2048];
        let transport = Arc::new(RecordingTransport::with_responses([
            created_job(),
            GraphResponse::new(201, "Created"),
            GraphResponse::new(200, "OK").with_json(json!({"processingState": "completed"})),
        ]));
        let state = dialog_with_file("doc.oxps", "application/oxps", bytes);

        let next = submit_dialog(
            &client(&transport),
            &AccessToken::new("t"),
            state,
            UploadMode::UploadData,
        )
        .await;
        assert_eq!(next.printing_state, PrintingState::Success);

        let sent = transport.requests();
        assert!(sent[0].url.ends_with("/print/shares/P1/jobs"));
        match &sent[0].body {
            Body::Json(body) => {
                assert_eq!(body["documents"][0]["documentConfiguration"]["copies"], 1);
                assert_eq!(body["documents"][0]["contentType"], "application/oxps");
                assert_eq!(body["documents"][0]["size"], 2048);
            }
            other => panic!("expected JSON body, got {other:?}"),
        }
        assert!(sent[1].url.ends_with("/documents/D1/uploadData"));
        assert_eq!(sent[1].header_value("Range"), Some("bytes=0-2047"));
        assert!(sent[2].url.ends_with("/jobs/J1/start"));
    }

    #[tokio::test]
    async fn share_p1_rejected_start_is_failure() {
        let transport = Arc::new(RecordingTransport::with_responses([
            created_job(),
            GraphResponse::new(201, "Created"),
            GraphResponse::new(200, "OK").with_json(json!({"state": "aborted"})),
        ]));
        let state = dialog_with_file("doc.oxps", "application/oxps", vec![1, 2, 3]);
        let next = submit_dialog(
            &client(&transport),
            &AccessToken::new("t"),
            state,
            UploadMode::UploadData,
        )
        .await;
        assert_eq!(next.printing_state, PrintingState::Failure);
        assert!(next.error.is_some());
    }

    #[tokio::test]
    async fn unsupported_file_makes_no_network_call() {
        let transport = Arc::new(RecordingTransport::new());
        let state = dialog_with_file("notes.txt", "text/plain", vec![1]);
        let next = submit_dialog(
            &client(&transport),
            &AccessToken::new("t"),
            state,
            UploadMode::UploadSession,
        )
        .await;
        assert_eq!(next.printing_state, PrintingState::Configuration);
        assert!(next.error.is_some());
        assert_eq!(transport.request_count(), 0);
    }
}
