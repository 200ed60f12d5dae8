// Copyright 2023-2025 Contributors to the Veraison project.
// SPDX-License-Identifier: Apache-2.0

use super::errors::Error;
use super::memo_trustanchorstore::MemoTrustAnchorStore;
use std::sync::OnceLock;

/// Root certificates the SafetyNet signing certificates chain up to.
/// Statements issued before the move to GTS Root R1 chain up to GlobalSign
/// Root CA - R2.
const DEFAULT_ROOTS_PEM: [&[u8]; 3] = [
    include_bytes!("../../certs/gts-root-r1.pem"),
    include_bytes!("../../certs/globalsign-root-ca.pem"),
    include_bytes!("../../certs/globalsign-root-r2.pem"),
];

static DEFAULT_ROOTS: OnceLock<Result<MemoTrustAnchorStore, Error>> = OnceLock::new();

/// The built-in trust anchors.  The bundle is parsed on first use and then
/// shared, read-only, for the rest of the process lifetime.
pub fn default_roots() -> Result<&'static MemoTrustAnchorStore, Error> {
    DEFAULT_ROOTS
        .get_or_init(|| {
            let mut s = MemoTrustAnchorStore::new();

            for pem in DEFAULT_ROOTS_PEM {
                s.load_pem(pem)?;
            }

            tracing::debug!(roots = s.len(), "loaded built-in trust anchors");

            Ok(s)
        })
        .as_ref()
        .map_err(Clone::clone)
}
