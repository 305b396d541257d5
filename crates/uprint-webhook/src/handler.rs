// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Notification handling, independent of the HTTP framework.
//
// Order of checks for a delivery:
//
//   1. decode the batch and take its first notification
//   2. client state (constant time), before any token or Graph call
//   3. resource and parentUrl parsing
//   4. token for the notification's tenant
//   5. GET job, PATCH job configuration, PATCH task to completed
//
// A failure in 1-3 is the sender's fault (400).  A failure in 4-5 is ours
// (500); earlier Graph calls are not undone.

use std::sync::Arc;

use tracing::{error, info, instrument, warn};

use uprint_core::error::{Result, UprintError};
use uprint_core::resource::{JobResource, TaskResource};
use uprint_core::types::{ChangeNotification, ColorMode, NotificationBatch, PrintConfiguration};
use uprint_graph::{GraphClient, TokenProvider, tasks};
use uprint_security::client_state_matches;

/// Shared, read-only state for the endpoint.
pub struct WebhookState {
    pub client: GraphClient,
    pub tokens: Arc<dyn TokenProvider>,
    /// Secret the subscription was created with.
    pub client_state: String,
    /// Colour mode forced onto intercepted jobs.
    pub color_mode: ColorMode,
}

/// What the endpoint should answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandlerOutcome {
    /// Subscription validation; echo the token as text/plain.
    Validation(String),
    /// Delivery processed (or nothing to do).
    Accepted,
    /// Sender error; the message is returned as the body.
    Rejected(&'static str),
    /// Processing failed on our side.
    Failed,
}

/// Validation handshake: the token is echoed and the body ignored.
pub fn handle_validation(token: String) -> HandlerOutcome {
    info!("subscription validation request");
    HandlerOutcome::Validation(token)
}

/// Process one delivery body.
#[instrument(skip_all, fields(len = body.len()))]
pub async fn handle_notifications(state: &WebhookState, body: &[u8]) -> HandlerOutcome {
    let batch: NotificationBatch = match serde_json::from_slice(body) {
        Ok(batch) => batch,
        Err(e) => {
            warn!(error = %e, "undecodable notification body");
            return HandlerOutcome::Rejected("Invalid notification payload");
        }
    };
    let Some(notification) = batch.items.into_iter().next() else {
        info!("empty notification batch");
        return HandlerOutcome::Accepted;
    };

    if !client_state_matches(&state.client_state, notification.client_state.as_deref()) {
        warn!(
            subscription_id = ?notification.subscription_id,
            "{}",
            UprintError::InvalidClientState
        );
        return HandlerOutcome::Rejected("Invalid client state");
    }

    let (task, job) = match parse_target(&notification) {
        Ok(target) => target,
        Err(e) => {
            warn!(error = %e, "notification does not name a print task");
            return HandlerOutcome::Rejected("Invalid resource");
        }
    };

    match process_task(state, notification.tenant_id.as_deref(), &task, &job).await {
        Ok(()) => {
            info!(
                task_id = %task.task_id,
                job_id = %job.job_id,
                "print task handled"
            );
            HandlerOutcome::Accepted
        }
        Err(e) => {
            error!(error = %e, task_id = %task.task_id, "print task handling failed");
            HandlerOutcome::Failed
        }
    }
}

fn parse_target(notification: &ChangeNotification) -> Result<(TaskResource, JobResource)> {
    let task: TaskResource = notification.resource.parse()?;
    let parent_url = notification
        .resource_data
        .as_ref()
        .and_then(|d| d.parent_url.as_deref())
        .ok_or_else(|| UprintError::ResourcePath {
            path: notification.resource.clone(),
            reason: "resourceData.parentUrl is missing".into(),
        })?;
    let job: JobResource = parent_url.parse()?;
    Ok((task, job))
}

async fn process_task(
    state: &WebhookState,
    tenant_id: Option<&str>,
    task: &TaskResource,
    job: &JobResource,
) -> Result<()> {
    let token = state.tokens.token_for_tenant(tenant_id).await?;
    let client = &state.client;

    let print_job = tasks::get_print_job(client, &token, &job.printer_id, &job.job_id).await?;
    let configuration = PrintConfiguration {
        color_mode: Some(state.color_mode),
        ..print_job.configuration.unwrap_or_default()
    };
    tasks::update_print_job_configuration(
        client,
        &token,
        &job.printer_id,
        &job.job_id,
        &configuration,
    )
    .await?;
    tasks::complete_print_task(client, &token, &task.task_definition_id, &task.task_id).await
}
