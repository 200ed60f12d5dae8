// SPDX-License-Identifier: Apache-2.0

use base64::{self, engine::general_purpose, Engine as _};

use super::errors::Error;

/// decodes bytes from a (padded, standard alphabet) base64-encoded string,
/// which is how `x5c` header entries are carried (RFC 7515, §4.1.6)
pub fn decode_str(v: &str) -> Result<Vec<u8>, Error> {
    general_purpose::STANDARD
        .decode(v)
        .map_err(|e| Error::Decoding(format!("x5c entry: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_padded_ok() {
        assert_eq!(decode_str("dGVzdA==").unwrap(), b"test");
    }

    #[test]
    fn decode_url_safe_alphabet_fails() {
        // '-' and '_' belong to the URL-safe alphabet only
        assert!(matches!(decode_str("-_-_"), Err(Error::Decoding(_))));
    }
}
