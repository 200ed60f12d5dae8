// Copyright 2023-2025 Contributors to the Veraison project.
// SPDX-License-Identifier: Apache-2.0

use super::errors::Error;
use super::ITrustAnchorStore;
use openssl::x509::X509;

/// The store where the trusted root certificates are stashed.  Once loaded
/// the store is only ever read, so a single instance can be shared between
/// concurrent verifications.
#[derive(Debug, Clone, Default)]
pub struct MemoTrustAnchorStore {
    p: Vec<X509>,
}

impl MemoTrustAnchorStore {
    /// Returns a new empty TrustAnchorStore
    pub fn new() -> Self {
        Self {
            p: Default::default(),
        }
    }

    /// Returns a TrustAnchorStore holding the given certificates
    pub fn from_certificates<I: IntoIterator<Item = X509>>(certs: I) -> Self {
        let mut s = Self::new();

        for c in certs {
            s.add(c);
        }

        s
    }

    /// Add to an existing (and possibly empty) TrustAnchorStore the
    /// certificates found in the given PEM bundle.  Returns the number of
    /// certificates read from the bundle.
    pub fn load_pem(&mut self, pem: &[u8]) -> Result<usize, Error> {
        let certs = X509::stack_from_pem(pem).map_err(|e| Error::Syntax(e.to_string()))?;

        if certs.is_empty() {
            return Err(Error::Sema("no certificates found in PEM bundle".to_string()));
        }

        let n = certs.len();

        for c in certs {
            self.add(c);
        }

        Ok(n)
    }

    /// Add a single DER-encoded certificate to the TrustAnchorStore
    pub fn load_der(&mut self, der: &[u8]) -> Result<(), Error> {
        let c = X509::from_der(der).map_err(|e| Error::Syntax(e.to_string()))?;

        self.add(c);

        Ok(())
    }

    /// Add a certificate, unless a bit-identical one is already present
    pub fn add(&mut self, cert: X509) {
        let der = cert.to_der().ok();

        let dup = der.is_some() && self.p.iter().any(|c| c.to_der().ok() == der);

        if !dup {
            self.p.push(cert);
        }
    }

    pub fn len(&self) -> usize {
        self.p.len()
    }

    pub fn is_empty(&self) -> bool {
        self.p.is_empty()
    }
}

impl ITrustAnchorStore for MemoTrustAnchorStore {
    fn trust_anchors(&self) -> &[X509] {
        &self.p
    }
}
