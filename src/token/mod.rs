// Copyright 2023 Contributors to the Veraison project.
// SPDX-License-Identifier: Apache-2.0

//! The token module provides a [`Statement`] object to encapsulate the
//! verification of a SafetyNet attestation statement, and the
//! [`VerifiedStatement`] it turns into once verification succeeds.
//!
//! # Example
//!
//! The following example assumes that `jws` contains the compact JWS
//! returned by the SafetyNet attestation API for the request made with
//! `nonce`.
//!
//! ```no_run
//! use safetynet::token::{Statement, VerifyOptions};
//!
//! # let jws = String::new();
//! # let nonce = "R2Rra24fVm5xa2Mg";
//! let mut s = Statement::new(jws);
//!
//! // resolve the x5c chain against the built-in roots, verify the JWS
//! // signature, then check signer identity, nonce and timestamp
//! s.verify(nonce, &VerifyOptions::default())
//!     .expect("verifying SafetyNet statement");
//!
//! // claims can only be read after verification
//! let cts = s.cts_profile_match().unwrap();
//! let integrity = s.basic_integrity().unwrap();
//! ```

pub use self::claims::Claims;
pub use self::errors::Error;
pub use self::statement::{
    verify, Statement, VerifiedStatement, VerifyOptions, DEFAULT_LEEWAY, EXPECTED_SUBJECT,
};
pub use self::x5c::{resolve, subject_line};

mod base64;
mod claims;
mod errors;
mod statement;
mod x5c;

#[cfg(test)]
mod testutil;
