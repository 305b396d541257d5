// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// uprint Graph — the Universal Print calls uprint makes against Microsoft
// Graph.  Every call takes the bearer token as an explicit argument and goes
// through a `GraphTransport`, so the whole crate runs against a recording
// fake in tests.

pub mod auth;
pub mod client;
pub mod printers;
pub mod registration;
pub mod shares;
pub mod submission;
pub mod tasks;
pub mod transport;

#[cfg(any(test, feature = "test-util"))]
pub mod testing;

pub use auth::{ClientCredentials, StaticToken, TokenProvider};
pub use client::GraphClient;
pub use registration::{PollPolicy, PrinterRegistration, RegisteredPrinter};
pub use shares::SessionStore;
pub use submission::SubmissionOutcome;
pub use transport::{GraphRequest, GraphResponse, GraphTransport, Method, ReqwestTransport};
