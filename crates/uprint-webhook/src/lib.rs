// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// uprint webhook — receives print-task notifications from Graph, forces the
// configured colour mode onto the job that raised the task, and completes
// the task so the job can continue.

pub mod handler;
pub mod router;

pub use handler::{HandlerOutcome, WebhookState, handle_notifications};
pub use router::{build_router, serve};
