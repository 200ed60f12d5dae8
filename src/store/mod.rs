// Copyright 2023 Contributors to the Veraison project.
// SPDX-License-Identifier: Apache-2.0

//! Trust anchors used to resolve the certificate chain embedded in a
//! SafetyNet statement.

pub use self::bundle::default_roots;
pub use self::errors::Error;
pub use self::itrustanchorstore::ITrustAnchorStore;
pub use self::memo_trustanchorstore::MemoTrustAnchorStore;

mod bundle;
mod errors;
mod itrustanchorstore;
mod memo_trustanchorstore;
