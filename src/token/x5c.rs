// Copyright 2023-2025 Contributors to the Veraison project.
// SPDX-License-Identifier: Apache-2.0

use super::errors::Error;
use chrono::{DateTime, Utc};
use openssl::error::ErrorStack;
use openssl::stack::Stack;
use openssl::x509::store::X509StoreBuilder;
use openssl::x509::verify::X509VerifyParam;
use openssl::x509::{X509NameRef, X509Ref, X509StoreContext, X509};

/// Establish whether the candidate chain (leaf first, as found in the `x5c`
/// header) chains up to one of the trusted roots at `check_time`.
///
/// On success the chain that OpenSSL actually used is returned, leaf first
/// and terminating in a trusted root.  Certificates in the candidate chain
/// that were not needed are dropped.
///
/// On failure the error message has the shape
/// `Certificate verification failed: <reason>. Certificate subject: <subject>.`
/// where the second sentence is present only if OpenSSL could tell which
/// certificate it stopped at.
pub fn resolve(
    candidate: &[X509],
    trusted_roots: &[X509],
    check_time: DateTime<Utc>,
) -> Result<Vec<X509>, Error> {
    let (leaf, intermediates) = candidate
        .split_first()
        .ok_or_else(|| failure("empty certificate chain", None))?;

    let mut builder = X509StoreBuilder::new().map_err(internal)?;

    for root in trusted_roots {
        builder.add_cert(root.clone()).map_err(internal)?;
    }

    let mut param = X509VerifyParam::new().map_err(internal)?;
    param.set_time(check_time.timestamp() as _);
    builder.set_param(&param).map_err(internal)?;

    let store = builder.build();

    let mut chain = Stack::new().map_err(internal)?;

    for c in intermediates {
        chain.push(c.clone()).map_err(internal)?;
    }

    let mut context = X509StoreContext::new().map_err(internal)?;

    context
        .init(&store, leaf, &chain, |ctx| {
            if ctx.verify_cert()? {
                let validated: Vec<X509> = ctx
                    .chain()
                    .map(|s| s.iter().map(|c| c.to_owned()).collect())
                    .unwrap_or_default();

                return Ok(Ok(validated));
            }

            let subject = ctx.current_cert().map(subject_line);

            Ok(Err(failure(ctx.error().error_string(), subject.as_deref())))
        })
        .map_err(internal)?
}

/// Render a certificate subject the way OpenSSL's one-line format does,
/// e.g., `/DC=org/DC=fake/CN=Fake`
pub fn subject_line(cert: &X509Ref) -> String {
    name_line(cert.subject_name())
}

fn name_line(name: &X509NameRef) -> String {
    name.entries()
        .map(|e| {
            let key = e
                .object()
                .nid()
                .short_name()
                .map(str::to_string)
                .unwrap_or_else(|_| e.object().to_string());

            let value = e
                .data()
                .as_utf8()
                .map(|v| v.to_string())
                .unwrap_or_default();

            format!("/{key}={value}")
        })
        .collect()
}

fn failure(reason: &str, subject: Option<&str>) -> Error {
    let mut msg = format!("Certificate verification failed: {reason}.");

    if let Some(s) = subject {
        msg.push_str(&format!(" Certificate subject: {s}."));
    }

    Error::Signature(msg)
}

fn internal(e: ErrorStack) -> Error {
    failure(&e.to_string(), None)
}
