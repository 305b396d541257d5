// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// uprint — Core Graph print types, error definitions, configuration, and the
// print dialog state machine shared across all crates.

pub mod config;
pub mod dialog;
pub mod error;
pub mod human_errors;
pub mod resource;
pub mod types;

pub use config::AppConfig;
pub use error::UprintError;
pub use types::*;
