// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Print task plumbing: task definitions, triggers, change-notification
// subscriptions, and the job/task calls the webhook makes.

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use serde_json::json;
use tracing::{info, instrument};

use uprint_core::error::Result;
use uprint_core::types::{
    AccessToken, PrintConfiguration, PrintJob, PrintTaskStatus, Subscription, TaskDefinition,
    TaskProcessingState, TaskTrigger,
};

use crate::client::GraphClient;

/// Graph's upper bound on print-task subscription lifetime.
pub const MAX_SUBSCRIPTION_MINUTES: i64 = 4230;

#[instrument(skip(client, token))]
pub async fn create_task_definition(
    client: &GraphClient,
    token: &AccessToken,
    display_name: &str,
    app_display_name: &str,
) -> Result<TaskDefinition> {
    let definition: TaskDefinition = client
        .post_json(
            token,
            "print/taskDefinitions",
            json!({
                "displayName": display_name,
                "createdBy": {"displayName": app_display_name},
            }),
        )
        .await?;
    info!(task_definition_id = %definition.id, "task definition created");
    Ok(definition)
}

fn expiration(now: DateTime<Utc>, lifetime_minutes: i64) -> DateTime<Utc> {
    now + ChronoDuration::minutes(lifetime_minutes.clamp(1, MAX_SUBSCRIPTION_MINUTES))
}

fn subscription_body(
    task_definition_id: &str,
    notification_url: &str,
    client_state: &str,
    expires: DateTime<Utc>,
) -> serde_json::Value {
    json!({
        "changeType": "created",
        "notificationUrl": notification_url,
        "resource": format!("/print/taskDefinitions/{task_definition_id}/tasks"),
        "expirationDateTime": expires,
        "clientState": client_state,
    })
}

/// Subscribe `notification_url` to new tasks of a task definition.
#[instrument(skip(client, token, client_state))]
pub async fn create_subscription(
    client: &GraphClient,
    token: &AccessToken,
    task_definition_id: &str,
    notification_url: &str,
    client_state: &str,
    lifetime_minutes: i64,
) -> Result<Subscription> {
    let body = subscription_body(
        task_definition_id,
        notification_url,
        client_state,
        expiration(Utc::now(), lifetime_minutes),
    );
    let subscription: Subscription = client.post_json(token, "subscriptions", body).await?;
    info!(
        subscription_id = %subscription.id,
        expires = %subscription.expiration_date_time,
        "subscription created"
    );
    Ok(subscription)
}

/// Push a subscription's expiry out by `lifetime_minutes` from now.
#[instrument(skip(client, token))]
pub async fn renew_subscription(
    client: &GraphClient,
    token: &AccessToken,
    subscription_id: &str,
    lifetime_minutes: i64,
) -> Result<Subscription> {
    let expires = expiration(Utc::now(), lifetime_minutes);
    let response = client
        .patch(
            token,
            &format!("subscriptions/{subscription_id}"),
            json!({"expirationDateTime": expires}),
        )
        .await?;
    let subscription: Subscription = response.json()?;
    info!(expires = %subscription.expiration_date_time, "subscription renewed");
    Ok(subscription)
}

/// Fire the task definition when a job starts on `printer_id`.
#[instrument(skip(client, token))]
pub async fn create_task_trigger(
    client: &GraphClient,
    token: &AccessToken,
    task_definition_id: &str,
    printer_id: &str,
) -> Result<TaskTrigger> {
    let definition = client.url(&format!("print/taskDefinitions/{task_definition_id}"));
    let trigger: TaskTrigger = client
        .post_json(
            token,
            &format!("print/printers/{printer_id}/taskTriggers"),
            json!({
                "event": "jobStarted",
                "definition@odata.bind": definition,
            }),
        )
        .await?;
    info!(trigger_id = %trigger.id, "task trigger created");
    Ok(trigger)
}

#[instrument(skip(client, token))]
pub async fn get_print_job(
    client: &GraphClient,
    token: &AccessToken,
    printer_id: &str,
    job_id: &str,
) -> Result<PrintJob> {
    client
        .get_json(token, &format!("print/printers/{printer_id}/jobs/{job_id}"))
        .await
}

#[instrument(skip(client, token, configuration))]
pub async fn update_print_job_configuration(
    client: &GraphClient,
    token: &AccessToken,
    printer_id: &str,
    job_id: &str,
    configuration: &PrintConfiguration,
) -> Result<()> {
    client
        .patch(
            token,
            &format!("print/printers/{printer_id}/jobs/{job_id}"),
            json!({"configuration": configuration}),
        )
        .await?;
    Ok(())
}

/// Mark a task completed so the paused job proceeds.
#[instrument(skip(client, token))]
pub async fn complete_print_task(
    client: &GraphClient,
    token: &AccessToken,
    task_definition_id: &str,
    task_id: &str,
) -> Result<()> {
    let status = PrintTaskStatus {
        state: TaskProcessingState::Completed,
        description: Some("Task completed".into()),
    };
    client
        .patch(
            token,
            &format!("print/taskDefinitions/{task_definition_id}/tasks/{task_id}"),
            json!({"status": status}),
        )
        .await?;
    info!("print task completed");
    Ok(())
}
