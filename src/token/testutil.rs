// Copyright 2023-2025 Contributors to the Veraison project.
// SPDX-License-Identifier: Apache-2.0

//! Throw-away PKI and JWS fixtures for the unit tests.

use base64::{engine::general_purpose, Engine as _};
use chrono::Utc;
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use openssl::asn1::Asn1Time;
use openssl::bn::BigNum;
use openssl::ec::{EcGroup, EcKey};
use openssl::hash::MessageDigest;
use openssl::nid::Nid;
use openssl::pkey::{PKey, Private};
use openssl::rsa::Rsa;
use openssl::x509::extension::{BasicConstraints, KeyUsage};
use openssl::x509::{X509Builder, X509Name, X509NameBuilder, X509};
use serde_json::json;

pub const TEST_NONCE: &str = "R2Rra24fVm5xa2Mg";
pub const TEST_PACKAGE: &str = "com.package.name.of.requesting.app";
// base64(sha256("test"))
pub const TEST_DIGEST: &str = "n4bQgYhMfWWaL+qgxVrQFaO/TxsrC4Is0V1sFbDwCgg=";

pub fn rsa_key() -> PKey<Private> {
    PKey::from_rsa(Rsa::generate(2048).unwrap()).unwrap()
}

pub fn ec_key() -> PKey<Private> {
    let group = EcGroup::from_curve_name(Nid::X9_62_PRIME256V1).unwrap();
    PKey::from_ec_key(EcKey::generate(&group).unwrap()).unwrap()
}

/// What goes into a test certificate
pub struct CertSpec<'a> {
    pub subject: &'a [(&'a str, &'a str)],
    pub serial: u32,
    pub ca: bool,
    pub not_before: i64,
    pub not_after: i64,
}

impl<'a> CertSpec<'a> {
    /// A CA certificate valid from an hour ago to an hour from now
    pub fn ca(subject: &'a [(&'a str, &'a str)], serial: u32) -> Self {
        let now = Utc::now().timestamp();

        Self {
            subject,
            serial,
            ca: true,
            not_before: now - 3600,
            not_after: now + 3600,
        }
    }

    /// An end-entity certificate valid from an hour ago to an hour from now
    pub fn leaf(subject: &'a [(&'a str, &'a str)], serial: u32) -> Self {
        Self {
            ca: false,
            ..Self::ca(subject, serial)
        }
    }

    pub fn validity(self, not_before: i64, not_after: i64) -> Self {
        Self {
            not_before,
            not_after,
            ..self
        }
    }
}

fn build_name(entries: &[(&str, &str)]) -> X509Name {
    let mut b = X509NameBuilder::new().unwrap();

    for (k, v) in entries {
        b.append_entry_by_text(k, v).unwrap();
    }

    b.build()
}

/// Issue a certificate for `key`.  Self-signed when `issuer` is `None`.
pub fn issue_cert(
    spec: &CertSpec,
    key: &PKey<Private>,
    issuer: Option<(&X509, &PKey<Private>)>,
) -> X509 {
    let mut b = X509Builder::new().unwrap();

    b.set_version(2).unwrap();

    let serial = BigNum::from_u32(spec.serial)
        .unwrap()
        .to_asn1_integer()
        .unwrap();
    b.set_serial_number(&serial).unwrap();

    let subject = build_name(spec.subject);
    b.set_subject_name(&subject).unwrap();

    match issuer {
        Some((c, _)) => b.set_issuer_name(c.subject_name()).unwrap(),
        None => b.set_issuer_name(&subject).unwrap(),
    }

    b.set_pubkey(key).unwrap();
    b.set_not_before(&Asn1Time::from_unix(spec.not_before as _).unwrap())
        .unwrap();
    b.set_not_after(&Asn1Time::from_unix(spec.not_after as _).unwrap())
        .unwrap();

    if spec.ca {
        b.append_extension(BasicConstraints::new().critical().ca().build().unwrap())
            .unwrap();
        b.append_extension(
            KeyUsage::new()
                .critical()
                .key_cert_sign()
                .crl_sign()
                .build()
                .unwrap(),
        )
        .unwrap();
    } else {
        b.append_extension(BasicConstraints::new().critical().build().unwrap())
            .unwrap();
        b.append_extension(
            KeyUsage::new()
                .critical()
                .digital_signature()
                .non_repudiation()
                .build()
                .unwrap(),
        )
        .unwrap();
    }

    let signer = issuer.map(|(_, k)| k).unwrap_or(key);
    b.sign(signer, MessageDigest::sha256()).unwrap();

    b.build()
}

/// A root CA and a SafetyNet-like signing certificate issued by it
pub struct Pki {
    pub root: X509,
    pub root_key: PKey<Private>,
    pub leaf: X509,
    pub leaf_key: PKey<Private>,
}

impl Pki {
    /// RSA root, RSA leaf with the given common name
    pub fn new(leaf_cn: &str) -> Self {
        Self::with_leaf_key(leaf_cn, rsa_key())
    }

    pub fn with_leaf_key(leaf_cn: &str, leaf_key: PKey<Private>) -> Self {
        let root_key = rsa_key();
        let root = issue_cert(
            &CertSpec::ca(&[("DC", "test"), ("CN", "Fake Google Root CA")], 1),
            &root_key,
            None,
        );

        let leaf = issue_cert(
            &CertSpec::leaf(&[("CN", leaf_cn)], 2),
            &leaf_key,
            Some((&root, &root_key)),
        );

        Self {
            root,
            root_key,
            leaf,
            leaf_key,
        }
    }
}

/// A well-formed claims-set carrying the given nonce and timestamp
pub fn payload(nonce: &str, timestamp_ms: i64) -> serde_json::Value {
    json!({
        "timestampMs": timestamp_ms,
        "nonce": nonce,
        "apkPackageName": TEST_PACKAGE,
        "apkCertificateDigestSha256": [TEST_DIGEST],
        "ctsProfileMatch": true,
        "basicIntegrity": true,
    })
}

/// Sign `claims` as a compact JWS carrying `x5c` in its header
pub fn sign_envelope(
    claims: &serde_json::Value,
    alg: Algorithm,
    key: &PKey<Private>,
    x5c: &[&X509],
) -> String {
    let mut header = Header::new(alg);
    header.x5c = Some(
        x5c.iter()
            .map(|c| general_purpose::STANDARD.encode(c.to_der().unwrap()))
            .collect(),
    );

    let ek = match alg {
        Algorithm::RS256 => {
            EncodingKey::from_rsa_pem(&key.rsa().unwrap().private_key_to_pem().unwrap())
        }
        Algorithm::ES256 => EncodingKey::from_ec_pem(&key.private_key_to_pem_pkcs8().unwrap()),
        a => panic!("no test signer for {a:?}"),
    }
    .unwrap();

    jsonwebtoken::encode(&header, claims, &ek).unwrap()
}

/// Assemble a compact JWS from raw parts without signing anything
pub fn raw_envelope(header: &serde_json::Value, claims: &serde_json::Value, sig: &[u8]) -> String {
    let enc = |b: &[u8]| general_purpose::URL_SAFE_NO_PAD.encode(b);

    format!(
        "{}.{}.{}",
        enc(header.to_string().as_bytes()),
        enc(claims.to_string().as_bytes()),
        enc(sig)
    )
}
