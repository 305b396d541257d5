// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Registered printer lookup and IPP attribute updates.

use tracing::{info, instrument};

use uprint_core::error::{Result, UprintError};
use uprint_core::types::{AccessToken, Printer};

use crate::client::GraphClient;
use crate::transport::Method;

pub const IPP_CONTENT_TYPE: &str = "application/ipp";

#[instrument(skip(client, token))]
pub async fn get_printer(client: &GraphClient, token: &AccessToken, printer_id: &str) -> Result<Printer> {
    client
        .get_json(token, &format!("print/printers/{printer_id}"))
        .await
}

/// Push an encoded IPP attribute set to the printer.
///
/// The bytes are sent as-is; uprint does not parse IPP.
#[instrument(skip(client, token, ipp), fields(len = ipp.len()))]
pub async fn update_printer_attributes(
    client: &GraphClient,
    token: &AccessToken,
    printer_id: &str,
    ipp: &[u8],
) -> Result<()> {
    if ipp.is_empty() {
        return Err(UprintError::EmptyDocument("IPP attribute payload".into()));
    }
    let request = client
        .request(token, Method::Patch, &format!("print/printers/{printer_id}"))
        .bytes(IPP_CONTENT_TYPE, ipp.to_vec());
    client.execute(request).await?;
    info!("printer attributes updated");
    Ok(())
}
