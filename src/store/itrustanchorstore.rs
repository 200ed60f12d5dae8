// Copyright 2023 Contributors to the Veraison project.
// SPDX-License-Identifier: Apache-2.0

use openssl::x509::X509;

/// Interface to the store where the trusted root certificates are stashed.
pub trait ITrustAnchorStore {
    /// All the root certificates a candidate chain may terminate in
    fn trust_anchors(&self) -> &[X509];
}
