// Copyright 2023 Contributors to the Veraison project.
// SPDX-License-Identifier: Apache-2.0

use crate::store;

/// Reasons a SafetyNet statement is rejected.  None of them is retryable.
#[derive(thiserror::Error, PartialEq, Eq)]
pub enum Error {
    /// The `x5c` chain does not resolve to a trusted root
    #[error("{0}")]
    Signature(String),
    /// The signing certificate was not issued to the expected subject
    #[error("Certificate subject error: {0}")]
    CertificateSubject(String),
    #[error("Nonce mismatch")]
    NonceMismatch,
    #[error("Timestamp error: {0}")]
    Timestamp(String),
    /// A claim was requested before successful verification
    #[error("Statement not verified")]
    NotVerified,
    /// Malformed JWS, disallowed algorithm or bad JWS signature
    #[error("Decoding error: {0}")]
    Decoding(String),
    #[error("Trust anchor error: {0}")]
    Store(#[from] store::Error),
}

impl std::fmt::Debug for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Signature(e)
            | Error::CertificateSubject(e)
            | Error::Timestamp(e)
            | Error::Decoding(e) => {
                write!(f, "{}", e)
            }
            Error::Store(e) => write!(f, "{:?}", e),
            Error::NonceMismatch | Error::NotVerified => write!(f, "{}", self),
        }
    }
}
