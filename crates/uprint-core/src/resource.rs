// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Structured parsing of the resource strings carried by print-task
// notifications.
//
// Two shapes arrive on every delivery:
//
//   resource               print/taskDefinitions/{taskDefinitionId}/tasks/{taskId}
//   resourceData.parentUrl https://graph.microsoft.com/v1.0/print/printers/{printerId}/jobs/{jobId}
//
// Each is matched segment by segment against its template.  Anything that
// does not fit fails with `UprintError::ResourcePath`.

use std::str::FromStr;

use url::Url;
use uuid::Uuid;

use crate::error::{Result, UprintError};

/// Identifies the print task a notification was raised for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskResource {
    pub task_definition_id: String,
    pub task_id: String,
}

/// Identifies the print job that caused the task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobResource {
    pub printer_id: String,
    pub job_id: String,
}

fn path_error(path: &str, reason: impl Into<String>) -> UprintError {
    UprintError::ResourcePath {
        path: path.to_owned(),
        reason: reason.into(),
    }
}

/// Split a relative or absolute path into its non-empty segments.
fn segments(path: &str) -> Vec<&str> {
    path.split('/').filter(|s| !s.is_empty()).collect()
}

/// Require `value` to be a GUID and return it in canonical lowercase form.
fn guid(path: &str, what: &str, value: &str) -> Result<String> {
    Uuid::parse_str(value)
        .map(|u| u.to_string())
        .map_err(|_| path_error(path, format!("{what} '{value}' is not a GUID")))
}

fn expect_literal(path: &str, actual: Option<&&str>, literal: &str) -> Result<()> {
    match actual {
        Some(seg) if seg.eq_ignore_ascii_case(literal) => Ok(()),
        Some(seg) => Err(path_error(path, format!("expected '{literal}', found '{seg}'"))),
        None => Err(path_error(path, format!("missing '{literal}' segment"))),
    }
}

impl FromStr for TaskResource {
    type Err = UprintError;

    fn from_str(resource: &str) -> Result<Self> {
        let segs = segments(resource);
        if segs.len() != 5 {
            return Err(path_error(
                resource,
                "expected print/taskDefinitions/{id}/tasks/{id}",
            ));
        }
        expect_literal(resource, segs.first(), "print")?;
        expect_literal(resource, segs.get(1), "taskDefinitions")?;
        expect_literal(resource, segs.get(3), "tasks")?;

        Ok(Self {
            task_definition_id: guid(resource, "task definition id", segs[2])?,
            task_id: guid(resource, "task id", segs[4])?,
        })
    }
}

impl FromStr for JobResource {
    type Err = UprintError;

    fn from_str(parent_url: &str) -> Result<Self> {
        let owned_path;
        let path = if parent_url.contains("://") {
            let url = Url::parse(parent_url)
                .map_err(|e| path_error(parent_url, format!("invalid URL: {e}")))?;
            owned_path = url.path().to_owned();
            owned_path.as_str()
        } else {
            parent_url
        };

        let segs = segments(path);
        // Skip an API version prefix such as `v1.0` or `beta`.
        let start = segs
            .iter()
            .position(|s| s.eq_ignore_ascii_case("print"))
            .ok_or_else(|| path_error(parent_url, "missing 'print' segment"))?;
        let rest = &segs[start..];
        if rest.len() != 5 {
            return Err(path_error(
                parent_url,
                "expected print/printers/{id}/jobs/{id}",
            ));
        }
        expect_literal(parent_url, rest.get(1), "printers")?;
        expect_literal(parent_url, rest.get(3), "jobs")?;

        let job_id = rest[4];
        if job_id.is_empty() {
            return Err(path_error(parent_url, "empty job id"));
        }

        Ok(Self {
            printer_id: guid(parent_url, "printer id", rest[2])?,
            job_id: job_id.to_owned(),
        })
    }
}

/// Extract the operation id from an `Operation-Location` header value.
///
/// The id is the trailing path segment, e.g.
/// `https://graph.microsoft.com/v1.0/print/operations/{id}`.
pub fn operation_id_from_location(location: &str) -> Result<String> {
    let trimmed = location.trim().trim_end_matches('/');
    let id = trimmed.rsplit('/').next().unwrap_or_default();
    if id.is_empty() {
        return Err(path_error(location, "no operation id in Operation-Location"));
    }
    Ok(id.to_owned())
}
