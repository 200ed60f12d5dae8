// Copyright 2023 Contributors to the Veraison project.
// SPDX-License-Identifier: Apache-2.0

//! Android SafetyNet attestation statement verification.
//!
//! This crate verifies the compact JWS produced by the SafetyNet attestation
//! API and exposes its claims only once the statement has been proven
//! authentic and fresh.
//!
//! The API allows:
//! * Resolving the `x5c` certificate chain carried in the JWS header against
//!   a set of trusted roots (a built-in bundle is provided)
//! * Verifying the JWS signature with the resolved leaf key
//! * Checking the signer identity, the nonce and the timestamp of the claims
//!
//! Deciding whether a device is trustworthy based on the verified claims is
//! left to the caller.

pub mod store;
pub mod token;
