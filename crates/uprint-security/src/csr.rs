// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Certificate signing requests for printer registration.
//
// Universal Print issues a device certificate for every registered printer.
// The registration body carries a PKCS#10 request and the device's public key,
// both as bare base64: PEM armour lines and line breaks removed.
//
// # Key type
//
// The key pair is ECDSA P-256, generated with `rcgen`.  The private key never
// leaves this process unless the caller persists `private_key_pem`.

use rcgen::{CertificateParams, DistinguishedName, DnType, KeyPair};
use tracing::{debug, instrument};
use uprint_core::error::{Result, UprintError};

/// Subject fields placed in the request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsrSubject {
    pub common_name: String,
    pub organization: String,
    pub locality: String,
    pub state: String,
    pub country: String,
}

impl Default for CsrSubject {
    fn default() -> Self {
        Self {
            common_name: "Microsoft".into(),
            organization: "Microsoft Corp".into(),
            locality: "Redmond".into(),
            state: "Washington".into(),
            country: "US".into(),
        }
    }
}

/// A freshly generated key pair and the request signed with it.
pub struct DeviceCsr {
    /// PKCS#10 request, PEM body only.
    pub content: String,
    /// SubjectPublicKeyInfo, PEM body only.
    pub transport_key: String,
    /// PKCS#8 private key, full PEM, for the caller to keep.
    pub private_key_pem: String,
}

impl std::fmt::Debug for DeviceCsr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeviceCsr")
            .field("content_len", &self.content.len())
            .field("transport_key_len", &self.transport_key.len())
            .finish_non_exhaustive()
    }
}

fn cert_err(stage: &str, e: rcgen::Error) -> UprintError {
    UprintError::Certificate(format!("{stage}: {e}"))
}

impl DeviceCsr {
    /// Generate a key pair and a signed request for `subject`.
    #[instrument(skip_all, fields(cn = %subject.common_name))]
    pub fn generate(subject: &CsrSubject) -> Result<Self> {
        let key = KeyPair::generate().map_err(|e| cert_err("key generation failed", e))?;

        let mut params =
            CertificateParams::new(Vec::<String>::new()).map_err(|e| cert_err("invalid params", e))?;
        let mut name = DistinguishedName::new();
        name.push(DnType::CommonName, subject.common_name.as_str());
        name.push(DnType::OrganizationName, subject.organization.as_str());
        name.push(DnType::LocalityName, subject.locality.as_str());
        name.push(DnType::StateOrProvinceName, subject.state.as_str());
        name.push(DnType::CountryName, subject.country.as_str());
        params.distinguished_name = name;

        let request = params
            .serialize_request(&key)
            .map_err(|e| cert_err("request signing failed", e))?;
        let request_pem = request.pem().map_err(|e| cert_err("request encoding failed", e))?;

        let csr = Self {
            content: pem_body(&request_pem),
            transport_key: pem_body(&key.public_key_pem()),
            private_key_pem: key.serialize_pem(),
        };
        debug!(
            csr_len = csr.content.len(),
            key_len = csr.transport_key.len(),
            "certificate signing request generated"
        );
        Ok(csr)
    }
}

/// Strip `-----BEGIN/END ...-----` lines and all whitespace from a PEM block.
pub fn pem_body(pem: &str) -> String {
    pem.lines()
        .map(str::trim)
        .filter(|line| !line.starts_with("-----"))
        .collect()
}
