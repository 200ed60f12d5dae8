// Copyright 2023-2025 Contributors to the Veraison project.
// SPDX-License-Identifier: Apache-2.0

use super::base64;
use super::claims::Claims;
use super::errors::Error;
use super::x5c;
use crate::store::{self, ITrustAnchorStore};
use chrono::{DateTime, Utc};
use jsonwebtoken::{decode_header, Algorithm, DecodingKey, Validation};
use openssl::memcmp;
use openssl::nid::Nid;
use openssl::x509::{X509Ref, X509};
use std::time::Duration;
use tracing::{debug, trace};

/// The subject common name of the certificate the attestation service signs
/// statements with
pub const EXPECTED_SUBJECT: &str = "attest.android.com";

/// Default tolerance around the check time for the `timestampMs` claim
pub const DEFAULT_LEEWAY: Duration = Duration::from_secs(60);

const ALLOWED_ALGS: [Algorithm; 2] = [Algorithm::ES256, Algorithm::RS256];

/// Knobs for [verify()] and [Statement::verify()]
#[derive(Clone, Copy)]
pub struct VerifyOptions<'a> {
    /// Symmetric tolerance applied to the `timestampMs` claim
    pub leeway: Duration,
    /// Trust anchors; the built-in bundle is used if not set
    pub trusted_roots: Option<&'a dyn ITrustAnchorStore>,
    /// The instant certificate validity and freshness are evaluated at;
    /// "now" if not set
    pub check_time: Option<DateTime<Utc>>,
}

impl Default for VerifyOptions<'_> {
    fn default() -> Self {
        Self {
            leeway: DEFAULT_LEEWAY,
            trusted_roots: None,
            check_time: None,
        }
    }
}

impl<'a> VerifyOptions<'a> {
    /// The defaults: [DEFAULT_LEEWAY], the built-in roots, and "now"
    pub fn new() -> Self {
        Default::default()
    }

    /// Set the tolerance applied on either side of the check time
    pub fn with_leeway(self, leeway: Duration) -> Self {
        Self { leeway, ..self }
    }

    /// Verify against `roots` instead of the built-in bundle
    pub fn with_trusted_roots(self, roots: &'a dyn ITrustAnchorStore) -> Self {
        Self {
            trusted_roots: Some(roots),
            ..self
        }
    }

    /// Evaluate certificate validity and the statement timestamp at `t`
    pub fn with_check_time(self, t: DateTime<Utc>) -> Self {
        Self {
            check_time: Some(t),
            ..self
        }
    }
}

/// The outcome of a successful verification: the claims-set together with
/// the certificate chain that vouched for it.  It can only be obtained
/// through [verify()] (or [Statement]), so holding one means the claims are
/// authentic and fresh.
#[derive(Clone, Debug)]
pub struct VerifiedStatement {
    claims: Claims,
    chain: Vec<X509>,
}

impl VerifiedStatement {
    pub fn claims(&self) -> &Claims {
        &self.claims
    }

    pub fn into_claims(self) -> Claims {
        self.claims
    }

    pub fn cts_profile_match(&self) -> bool {
        self.claims.cts_profile_match
    }

    pub fn basic_integrity(&self) -> bool {
        self.claims.basic_integrity
    }

    pub fn apk_package_name(&self) -> Option<&str> {
        self.claims.apk_package_name.as_deref()
    }

    pub fn apk_certificate_digest_sha256(&self) -> &[String] {
        &self.claims.apk_certificate_digest_sha256
    }

    pub fn error(&self) -> Option<&str> {
        self.claims.error.as_deref()
    }

    /// The advice tokens, in the order the service listed them
    pub fn advice(&self) -> Option<Vec<String>> {
        self.claims.advice_tokens()
    }

    pub fn nonce(&self) -> &str {
        &self.claims.nonce
    }

    pub fn timestamp_ms(&self) -> f64 {
        self.claims.timestamp_ms
    }

    /// The validated chain, leaf first, ending in a trusted root
    pub fn certificate_chain(&self) -> &[X509] {
        &self.chain
    }
}

/// Cryptographically verify the SafetyNet JWS `jws` and check that it was
/// issued for `nonce` within the configured time window.
///
/// The steps are, in order: decode the header (only `ES256` and `RS256` are
/// accepted), resolve the `x5c` chain against the trust anchors, verify the
/// JWS with the leaf key, then check the leaf subject, the nonce and the
/// timestamp.  The first failure is returned.
pub fn verify(
    jws: &str,
    nonce: &str,
    options: &VerifyOptions,
) -> Result<VerifiedStatement, Error> {
    let check_time = options.check_time.unwrap_or_else(Utc::now);

    let (alg, candidate) = decode_statement_header(jws)?;

    debug!(?alg, certificates = candidate.len(), "decoded statement header");

    let roots: &dyn ITrustAnchorStore = match options.trusted_roots {
        Some(r) => r,
        None => store::default_roots()?,
    };

    let chain = x5c::resolve(&candidate, roots.trust_anchors(), check_time)?;

    let leaf = chain.first().ok_or_else(|| {
        Error::Signature("Certificate verification failed: empty chain.".to_string())
    })?;

    trace!(depth = chain.len(), leaf = %x5c::subject_line(leaf), "certificate chain resolved");

    let claims = decode_claims(jws, alg, leaf)?;

    check_subject(leaf)?;
    check_nonce(&claims, nonce)?;
    check_timestamp(&claims, options.leeway, check_time)?;

    debug!("statement verified");

    Ok(VerifiedStatement { claims, chain })
}

fn decode_statement_header(jws: &str) -> Result<(Algorithm, Vec<X509>), Error> {
    let header = decode_header(jws).map_err(|e| Error::Decoding(format!("JWS header: {e}")))?;

    if !ALLOWED_ALGS.contains(&header.alg) {
        return Err(Error::Decoding(format!(
            "algorithm {:?} not allowed",
            header.alg
        )));
    }

    let x5c = header
        .x5c
        .ok_or_else(|| Error::Decoding("missing x5c header parameter".to_string()))?;

    if x5c.is_empty() {
        return Err(Error::Decoding("empty x5c header parameter".to_string()));
    }

    let certs = x5c
        .iter()
        .map(|entry| {
            let der = base64::decode_str(entry)?;
            X509::from_der(&der).map_err(|e| Error::Decoding(format!("x5c certificate: {e}")))
        })
        .collect::<Result<Vec<X509>, Error>>()?;

    Ok((header.alg, certs))
}

fn decode_claims(jws: &str, alg: Algorithm, leaf: &X509Ref) -> Result<Claims, Error> {
    let pem = leaf
        .public_key()
        .and_then(|k| k.public_key_to_pem())
        .map_err(|e| Error::Decoding(format!("signing key: {e}")))?;

    let key = match alg {
        Algorithm::ES256 => DecodingKey::from_ec_pem(&pem),
        _ => DecodingKey::from_rsa_pem(&pem),
    }
    .map_err(|e| Error::Decoding(format!("signing key: {e}")))?;

    // freshness is judged on timestampMs, not on the registered JWT claims
    let mut validation = Validation::new(alg);
    validation.validate_exp = false;
    validation.validate_aud = false;
    validation.required_spec_claims.clear();

    let data = jsonwebtoken::decode::<Claims>(jws, &key, &validation)
        .map_err(|e| Error::Decoding(format!("JWS: {e}")))?;

    Ok(data.claims)
}

fn check_subject(leaf: &X509Ref) -> Result<(), Error> {
    let cn = leaf
        .subject_name()
        .entries_by_nid(Nid::COMMONNAME)
        .next()
        .and_then(|e| e.data().as_utf8().ok())
        .map(|s| s.to_string());

    match cn.as_deref() {
        Some(EXPECTED_SUBJECT) => Ok(()),
        Some(other) => Err(Error::CertificateSubject(format!(
            "expected CN={EXPECTED_SUBJECT}, got CN={other}"
        ))),
        None => Err(Error::CertificateSubject(
            "signing certificate has no common name".to_string(),
        )),
    }
}

fn check_nonce(claims: &Claims, nonce: &str) -> Result<(), Error> {
    let expected = nonce.as_bytes();
    let got = claims.nonce.as_bytes();

    // memcmp::eq requires equal lengths; the length itself is not secret
    if expected.len() != got.len() || !memcmp::eq(expected, got) {
        return Err(Error::NonceMismatch);
    }

    Ok(())
}

fn check_timestamp(
    claims: &Claims,
    leeway: Duration,
    check_time: DateTime<Utc>,
) -> Result<(), Error> {
    // the check time is taken at millisecond resolution, the claim as sent
    let now = check_time.timestamp_millis() as f64;
    let leeway_ms = leeway.as_secs_f64() * 1000.0;
    let ts = claims.timestamp_ms;

    if !(now - leeway_ms..=now + leeway_ms).contains(&ts) {
        return Err(Error::Timestamp(format!(
            "not within {}s leeway",
            leeway.as_secs()
        )));
    }

    Ok(())
}

/// A SafetyNet statement that starts out unverified.  Claims can only be
/// read after [Statement::verify()] has succeeded; until then every accessor
/// returns [Error::NotVerified].
#[derive(Clone, Debug)]
pub struct Statement {
    jws: String,
    verified: Option<VerifiedStatement>,
}

impl Statement {
    /// Wrap the JWS returned by the attestation API.  Nothing is parsed yet.
    pub fn new<S: Into<String>>(jws: S) -> Self {
        Self {
            jws: jws.into(),
            verified: None,
        }
    }

    /// Run [verify()] on the wrapped JWS.  On success the claims become
    /// readable and `self` is returned for chaining; on failure the
    /// statement is left as it was.
    pub fn verify(&mut self, nonce: &str, options: &VerifyOptions) -> Result<&mut Self, Error> {
        let v = verify(&self.jws, nonce, options)?;

        self.verified = Some(v);

        Ok(self)
    }

    pub fn is_verified(&self) -> bool {
        self.verified.is_some()
    }

    pub fn verified(&self) -> Result<&VerifiedStatement, Error> {
        self.verified.as_ref().ok_or(Error::NotVerified)
    }

    pub fn into_verified(self) -> Result<VerifiedStatement, Error> {
        self.verified.ok_or(Error::NotVerified)
    }

    pub fn cts_profile_match(&self) -> Result<bool, Error> {
        Ok(self.verified()?.cts_profile_match())
    }

    pub fn basic_integrity(&self) -> Result<bool, Error> {
        Ok(self.verified()?.basic_integrity())
    }

    pub fn apk_package_name(&self) -> Result<Option<&str>, Error> {
        Ok(self.verified()?.apk_package_name())
    }

    pub fn apk_certificate_digest_sha256(&self) -> Result<&[String], Error> {
        Ok(self.verified()?.apk_certificate_digest_sha256())
    }

    pub fn error(&self) -> Result<Option<&str>, Error> {
        Ok(self.verified()?.error())
    }

    pub fn advice(&self) -> Result<Option<Vec<String>>, Error> {
        Ok(self.verified()?.advice())
    }

    pub fn certificate_chain(&self) -> Result<&[X509], Error> {
        Ok(self.verified()?.certificate_chain())
    }
}
