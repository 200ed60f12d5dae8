// Copyright 2023 Contributors to the Veraison project.
// SPDX-License-Identifier: Apache-2.0

use serde::{Deserialize, Serialize};

/// The SafetyNet attestation claims-set, i.e., the JWS payload.  See
/// https://developer.android.com/privacy-and-security/safetynet/attestation
#[derive(Clone, Deserialize, Serialize, Debug, PartialEq)]
pub struct Claims {
    /// The nonce supplied by the relying party when requesting attestation
    pub nonce: String,

    /// Milliseconds since the UNIX epoch at which the statement was
    /// produced.  Both integral and fractional values are accepted.
    #[serde(rename = "timestampMs")]
    pub timestamp_ms: f64,

    /// Package name of the calling app
    #[serde(rename = "apkPackageName", default, skip_serializing_if = "Option::is_none")]
    pub apk_package_name: Option<String>,

    /// Base64 encoded SHA-256 digests of the calling app's signing
    /// certificates
    #[serde(rename = "apkCertificateDigestSha256", default)]
    pub apk_certificate_digest_sha256: Vec<String>,

    /// Stricter verdict: the device matches a compatibility-tested profile
    #[serde(rename = "ctsProfileMatch")]
    pub cts_profile_match: bool,

    /// Lenient verdict: the device has not been tampered with
    #[serde(rename = "basicIntegrity")]
    pub basic_integrity: bool,

    /// Set by the attestation service when it could not evaluate the device
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// Comma-separated hints on how to recover from a negative verdict
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub advice: Option<String>,
}

impl Claims {
    /// Split the `advice` claim into its tokens.  `None` if no advice was
    /// given.  Trailing empty tokens are dropped, so `""` yields no tokens.
    pub fn advice_tokens(&self) -> Option<Vec<String>> {
        self.advice.as_ref().map(|a| {
            let mut tokens: Vec<String> = a.split(',').map(str::to_string).collect();

            while tokens.last().is_some_and(String::is_empty) {
                tokens.pop();
            }

            tokens
        })
    }
}
