// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Webhook client-state verification.

use subtle::ConstantTimeEq;

/// Whether the `clientState` presented by a notification equals the secret
/// the subscription was created with.
///
/// The comparison runs in constant time over the bytes.  A blank configured
/// secret never matches, nor does a missing presented value.
pub fn client_state_matches(expected: &str, presented: Option<&str>) -> bool {
    let Some(presented) = presented else {
        return false;
    };
    if expected.is_empty() {
        return false;
    }
    expected.as_bytes().ct_eq(presented.as_bytes()).into()
}
