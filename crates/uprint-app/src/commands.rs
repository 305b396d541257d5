// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Subcommand handlers.

use std::path::Path;
use std::sync::Arc;

use tracing::{info, warn};

use uprint_core::dialog::{DialogAction, PrintDialogState, SelectedFile, reduce};
use uprint_core::error::{Result, UprintError};
use uprint_core::types::{ColorMode, Document, Orientation};
use uprint_graph::registration::{self, CsrPayload, PollPolicy, PrinterRegistration};
use uprint_graph::submission::submit_selected;
use uprint_graph::{printers, shares, tasks};
use uprint_security::{CsrSubject, DeviceCsr};
use uprint_webhook::WebhookState;

use crate::cli::{Cli, Commands, UploadModeArg};
use crate::services::app_services::{AppServices, redacted_config_json};

pub async fn run(cli: Cli) -> Result<()> {
    let services = AppServices::init(&cli.global)?;

    match cli.command {
        Commands::Shares => list_shares(&services).await,
        Commands::Print {
            share_id,
            file,
            copies,
            orientation,
            color_mode,
            upload_mode,
        } => {
            let choices = PrintChoices {
                copies,
                orientation,
                color_mode,
                upload_mode,
            };
            print_file(&services, &share_id, &file, choices).await
        }
        Commands::Register {
            name,
            manufacturer,
            model,
            device_id,
        } => register(&services, name, manufacturer, model, device_id).await,
        Commands::Printer { printer_id } => {
            let token = services.token().await?;
            let printer = printers::get_printer(&services.client, &token, &printer_id).await?;
            println!("{}", serde_json::to_string_pretty(&printer)?);
            Ok(())
        }
        Commands::UpdatePrinter {
            printer_id,
            ipp_file,
        } => {
            let ipp = std::fs::read(&ipp_file)?;
            let token = services.token().await?;
            printers::update_printer_attributes(&services.client, &token, &printer_id, &ipp)
                .await?;
            println!("Updated printer {printer_id} ({} bytes of IPP attributes).", ipp.len());
            Ok(())
        }
        Commands::TaskDefinition { name, app_name } => {
            let token = services.token().await?;
            let definition =
                tasks::create_task_definition(&services.client, &token, &name, &app_name).await?;
            println!("{}", definition.id);
            Ok(())
        }
        Commands::Subscribe {
            task_definition_id,
            notification_url,
        } => {
            let notification_url = match notification_url {
                Some(url) => url,
                None => services.config.require("notificationUrl")?.to_owned(),
            };
            let client_state = services.config.require("clientState")?;
            let token = services.token().await?;
            let subscription = tasks::create_subscription(
                &services.client,
                &token,
                &task_definition_id,
                &notification_url,
                client_state,
                services.config.subscription_lifetime_minutes,
            )
            .await?;
            println!(
                "{} (expires {})",
                subscription.id, subscription.expiration_date_time
            );
            Ok(())
        }
        Commands::Renew { subscription_id } => {
            let token = services.token().await?;
            let subscription = tasks::renew_subscription(
                &services.client,
                &token,
                &subscription_id,
                services.config.subscription_lifetime_minutes,
            )
            .await?;
            println!("expires {}", subscription.expiration_date_time);
            Ok(())
        }
        Commands::Trigger {
            task_definition_id,
            printer_id,
        } => {
            let token = services.token().await?;
            let trigger = tasks::create_task_trigger(
                &services.client,
                &token,
                &task_definition_id,
                &printer_id,
            )
            .await?;
            println!("{}", trigger.id);
            Ok(())
        }
        Commands::Serve { bind } => serve(&services, bind).await,
        Commands::Config { save } => show_config(&services, save),
    }
}

async fn list_shares(services: &AppServices) -> Result<()> {
    let token = services.token().await?;
    let mut found = shares::list_shares(&services.client, &token, &services.shares).await?;
    found.sort_by(|a, b| a.display_name.cmp(&b.display_name));
    for share in found {
        let state = share
            .status
            .map(|s| format!("{:?}", s.state).to_lowercase())
            .unwrap_or_else(|| "-".into());
        println!("{}\t{}\t{state}", share.id, share.display_name);
    }
    Ok(())
}

struct PrintChoices {
    copies: Option<u32>,
    orientation: Option<Orientation>,
    color_mode: Option<ColorMode>,
    upload_mode: Option<UploadModeArg>,
}

/// Drive the print dialog non-interactively: load shares, pick one, attach
/// the file, apply choices, submit.
async fn print_file(
    services: &AppServices,
    share_id: &str,
    file: &Path,
    choices: PrintChoices,
) -> Result<()> {
    let token = services.token().await?;
    let found = shares::list_shares(&services.client, &token, &services.shares).await?;
    let state = reduce(PrintDialogState::default(), DialogAction::SharesLoaded(found));
    let mut state = reduce(state, DialogAction::ChangePrinter(share_id.to_owned()));
    if state.selected.printer.as_deref() != Some(share_id) {
        return Err(UprintError::UnknownPrinter(share_id.to_owned()));
    }

    let name = file
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| file.display().to_string());
    let document = Document::new(name, None, std::fs::read(file)?)?;
    state = reduce(
        state,
        DialogAction::SelectFile(SelectedFile {
            content_type: Some(document.format.mime_type().to_owned()),
            name: document.name,
            bytes: document.bytes,
        }),
    );
    if let Some(copies) = choices.copies {
        state = reduce(state, DialogAction::ChangeCopies(copies));
    }
    if let Some(orientation) = choices.orientation {
        state = reduce(state, DialogAction::ChangeOrientation(orientation));
    }
    if let Some(color_mode) = choices.color_mode {
        state = reduce(state, DialogAction::ChangeColorMode(color_mode));
    }

    let mode = choices
        .upload_mode
        .map(Into::into)
        .unwrap_or(services.config.upload_mode);
    let job_id = submit_selected(&services.client, &token, &state.selected, mode).await?;
    println!("Print job {job_id} started on {share_id}.");
    Ok(())
}

async fn register(
    services: &AppServices,
    name: String,
    manufacturer: String,
    model: String,
    device_id: Option<String>,
) -> Result<()> {
    let csr = DeviceCsr::generate(&CsrSubject::default())?;
    let request = PrinterRegistration {
        display_name: name,
        manufacturer,
        model,
        has_physical_device: device_id.is_some(),
        physical_device_id: device_id,
        certificate_signing_request: CsrPayload::from(&csr),
    };

    let token = services.token().await?;
    let operation_id = registration::register_printer(&services.client, &token, &request).await?;

    // The key is only ever generated here; keep it before polling can fail.
    let devices = services.devices_dir()?;
    let pending_key = devices.join(format!("{operation_id}.key.pem"));
    std::fs::write(&pending_key, &csr.private_key_pem)?;

    let registered = registration::poll_operation(
        &services.client,
        &token,
        &operation_id,
        PollPolicy::from(&services.config),
    )
    .await?;

    let stem = match &registered.printer {
        Some(printer) => {
            std::fs::rename(&pending_key, devices.join(format!("{}.key.pem", printer.id)))?;
            printer.id.clone()
        }
        None => {
            warn!(operation_id = %operation_id, "printer id not returned; credentials kept under the operation id");
            operation_id
        }
    };
    if let Some(certificate) = &registered.certificate {
        std::fs::write(devices.join(format!("{stem}.cert")), certificate)?;
    }
    info!(name = %stem, dir = %devices.display(), "device credentials saved");
    println!("{stem}");
    Ok(())
}

fn show_config(services: &AppServices, save: bool) -> Result<()> {
    if save {
        services.config.save(&services.data_dir)?;
        info!(dir = %services.data_dir.display(), "configuration saved");
    }
    println!("{}", redacted_config_json(&services.config)?);
    Ok(())
}

async fn serve(services: &AppServices, bind: Option<String>) -> Result<()> {
    let client_state = services.config.require("clientState")?.to_owned();
    let state = Arc::new(WebhookState {
        client: services.client.clone(),
        tokens: services.tokens()?,
        client_state,
        color_mode: services.config.webhook_color_mode,
    });
    let bind = bind.unwrap_or_else(|| services.config.webhook_bind.clone());
    uprint_webhook::serve(state, &bind).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use uprint_core::human_errors::humanize_error;
    use uprint_graph::GraphClient;
    use uprint_graph::testing::RecordingTransport;
    use uprint_graph::transport::{GraphResponse, Method};

    fn services(transport: &Arc<RecordingTransport>, dir: &Path) -> AppServices {
        AppServices::for_tests(
            GraphClient::new(transport.clone(), "https://graph.test/v1.0"),
            dir.to_path_buf(),
            "user-token",
        )
    }

    fn shares_response() -> GraphResponse {
        GraphResponse::new(200, "OK").with_json(json!({"value": [
            {"id": "P2", "displayName": "Basement"},
            {"id": "P1", "displayName": "Front Desk", "defaults": {"copiesPerJob": 1}}
        ]}))
    }

    fn choices() -> PrintChoices {
        PrintChoices {
            copies: Some(2),
            orientation: None,
            color_mode: Some(ColorMode::Grayscale),
            upload_mode: Some(UploadModeArg::Data),
        }
    }

    #[tokio::test]
    async fn print_file_walks_dialog_to_started_job() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("memo.pdf");
        std::fs::write(&file, b"%PDF-1.7 memo").unwrap();

        let transport = Arc::new(RecordingTransport::with_responses([
            shares_response(),
            GraphResponse::new(201, "Created").with_json(json!({
                "id": "J1",
                "documents": [{"id": "D1"}]
            })),
            GraphResponse::new(201, "Created"),
            GraphResponse::new(200, "OK").with_json(json!({"state": "processing"})),
        ]));
        let services = services(&transport, dir.path());

        print_file(&services, "P1", &file, choices()).await.unwrap();

        let sent = transport.requests();
        assert_eq!(sent.len(), 4);
        assert_eq!(sent[0].method, Method::Get);
        assert!(sent[1].url.ends_with("/print/shares/P1/jobs"));
        assert!(sent[2].url.ends_with("/documents/D1/uploadData"));
        assert!(sent[3].url.ends_with("/jobs/J1/start"));
        assert_eq!(sent[1].header_value("Authorization"), Some("Bearer user-token"));
    }

    #[tokio::test]
    async fn unknown_share_never_prints_elsewhere() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("memo.pdf");
        std::fs::write(&file, b"%PDF-1.7 memo").unwrap();

        let transport = Arc::new(RecordingTransport::with_responses([shares_response()]));
        let services = services(&transport, dir.path());

        let err = print_file(&services, "TYPO", &file, choices()).await.unwrap_err();
        assert!(matches!(err, UprintError::UnknownPrinter(ref id) if id == "TYPO"));
        assert_eq!(transport.request_count(), 1);
    }

    #[tokio::test]
    async fn unsupported_file_is_refused_before_job_creation() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("notes.txt");
        std::fs::write(&file, b"plain text").unwrap();

        let transport = Arc::new(RecordingTransport::with_responses([shares_response()]));
        let services = services(&transport, dir.path());

        let err = print_file(&services, "P1", &file, choices()).await.unwrap_err();
        assert!(matches!(err, UprintError::UnsupportedDocument(_)));
        assert_eq!(
            humanize_error(&err).severity,
            uprint_core::human_errors::Severity::ActionRequired
        );
        assert_eq!(transport.request_count(), 1);
    }

    #[tokio::test]
    async fn rejected_start_reports_job_state() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("memo.pdf");
        std::fs::write(&file, b"%PDF-1.7 memo").unwrap();

        let transport = Arc::new(RecordingTransport::with_responses([
            shares_response(),
            GraphResponse::new(201, "Created").with_json(json!({
                "id": "J1",
                "documents": [{"id": "D1"}]
            })),
            GraphResponse::new(201, "Created"),
            GraphResponse::new(200, "OK").with_json(json!({"state": "aborted"})),
        ]));
        let services = services(&transport, dir.path());

        let err = print_file(&services, "P1", &file, choices()).await.unwrap_err();
        assert!(matches!(err, UprintError::JobNotStarted { ref state } if state == "aborted"));
    }

    #[tokio::test]
    async fn share_load_failure_stops_printing() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("memo.pdf");
        std::fs::write(&file, b"%PDF").unwrap();

        let transport = Arc::new(RecordingTransport::with_responses([GraphResponse::new(
            401,
            "Unauthorized",
        )]));
        let services = services(&transport, dir.path());

        let err = print_file(&services, "P1", &file, choices()).await.unwrap_err();
        assert!(matches!(err, UprintError::Http { status: 401, .. }));
        assert_eq!(transport.request_count(), 1);
    }

    fn accepted_registration() -> GraphResponse {
        GraphResponse::new(202, "Accepted").with_header(
            "Operation-Location",
            "https://graph.test/v1.0/print/operations/OP1",
        )
    }

    #[tokio::test]
    async fn register_saves_device_key_and_certificate() {
        let dir = tempfile::tempdir().unwrap();
        let transport = Arc::new(RecordingTransport::with_responses([
            accepted_registration(),
            GraphResponse::new(200, "OK").with_json(json!({
                "id": "OP1",
                "status": {"state": "succeeded"},
                "printer": {"id": "PR1", "displayName": "Lobby"},
                "certificate": "MIIC"
            })),
        ]));
        let services = services(&transport, dir.path());

        register(&services, "Lobby".into(), "uprint".into(), "virtual".into(), None)
            .await
            .unwrap();

        let devices = dir.path().join("devices");
        let key = std::fs::read_to_string(devices.join("PR1.key.pem")).unwrap();
        assert!(key.contains("PRIVATE KEY"));
        assert_eq!(std::fs::read_to_string(devices.join("PR1.cert")).unwrap(), "MIIC");
        assert!(!devices.join("OP1.key.pem").exists());
    }

    #[tokio::test]
    async fn register_without_printer_keeps_credentials_under_operation_id() {
        let dir = tempfile::tempdir().unwrap();
        let transport = Arc::new(RecordingTransport::with_responses([
            accepted_registration(),
            GraphResponse::new(200, "OK").with_json(json!({
                "id": "OP1",
                "status": {"state": "succeeded"},
                "certificate": "MIIC"
            })),
        ]));
        let services = services(&transport, dir.path());

        register(&services, "Lobby".into(), "uprint".into(), "virtual".into(), None)
            .await
            .unwrap();

        let devices = dir.path().join("devices");
        let key = std::fs::read_to_string(devices.join("OP1.key.pem")).unwrap();
        assert!(key.contains("PRIVATE KEY"));
        assert_eq!(std::fs::read_to_string(devices.join("OP1.cert")).unwrap(), "MIIC");
    }

    #[tokio::test]
    async fn failed_registration_still_keeps_generated_key() {
        let dir = tempfile::tempdir().unwrap();
        let transport = Arc::new(RecordingTransport::with_responses([
            accepted_registration(),
            GraphResponse::new(200, "OK").with_json(json!({
                "id": "OP1",
                "status": {"state": "failed", "description": "bad CSR"}
            })),
        ]));
        let services = services(&transport, dir.path());

        let err = register(&services, "Lobby".into(), "uprint".into(), "virtual".into(), None)
            .await
            .unwrap_err();
        assert!(matches!(err, UprintError::OperationFailed { .. }));
        assert!(dir.path().join("devices/OP1.key.pem").exists());
    }

    #[test]
    fn config_save_writes_loadable_file() {
        let dir = tempfile::tempdir().unwrap();
        let transport = Arc::new(RecordingTransport::new());
        let mut services = services(&transport, dir.path());
        services.config.tenant_id = "contoso".into();

        show_config(&services, true).unwrap();

        let loaded = uprint_core::AppConfig::load(dir.path()).unwrap();
        assert_eq!(loaded.tenant_id, "contoso");
        assert_eq!(transport.request_count(), 0);
    }

    #[test]
    fn config_without_save_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let transport = Arc::new(RecordingTransport::new());
        show_config(&services(&transport, dir.path()), false).unwrap();
        assert!(!dir.path().join(uprint_core::config::CONFIG_FILE).exists());
    }
}
