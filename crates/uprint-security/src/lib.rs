// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// uprint-security — identity and verification primitives.
//
// Printer registration needs a fresh key pair and PKCS#10 request; the webhook
// needs a constant-time comparison of the shared client state; submission logs
// fingerprint documents instead of naming their content.

pub mod client_state;
pub mod csr;
pub mod integrity;

pub use client_state::client_state_matches;
pub use csr::{CsrSubject, DeviceCsr};
pub use integrity::{hash_bytes, short_fingerprint};
