use std::fmt;

use sha1::{Digest, Sha1};

/// The length of a hex encoded SHA1 digest (160 bits, 40 hex characters).
pub const DIGEST_LEN: usize = 40;

/// The length of the digest prefix sent to the range API (5 hex characters).
pub const PREFIX_LEN: usize = 5;

/// The length of the digest suffix returned by the range API.
pub const SUFFIX_LEN: usize = DIGEST_LEN - PREFIX_LEN;

/// Hex lookup table for digest encoding.
pub const HEX_CHARS: &[u8; 16] = b"0123456789ABCDEF";

/// Computes the raw SHA1 digest of `secret`.
#[inline]
pub fn sha1_bytes(secret: impl AsRef<[u8]>) -> [u8; 20] {
    let mut hasher = Sha1::new();
    hasher.update(secret.as_ref());
    hasher.finalize().into()
}

/// An uppercase hex encoded SHA1 digest.
///
/// Stored inline as 40 ASCII bytes, so computing one never allocates.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Sha1Hex([u8; DIGEST_LEN]);

impl Sha1Hex {
    /// Hashes `secret` and encodes the result as uppercase hex.
    pub fn digest(secret: impl AsRef<[u8]>) -> Self {
        let hash = sha1_bytes(secret);
        let mut hex = [0u8; DIGEST_LEN];
        for (i, byte) in hash.iter().enumerate() {
            hex[i * 2] = HEX_CHARS[(byte >> 4) as usize];
            hex[i * 2 + 1] = HEX_CHARS[(byte & 0x0f) as usize];
        }
        Self(hex)
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        // SAFETY: every byte was taken from HEX_CHARS, which is ASCII.
        unsafe { std::str::from_utf8_unchecked(&self.0) }
    }

    /// The first [`PREFIX_LEN`] characters, the only part disclosed to the server.
    #[inline]
    pub fn prefix(&self) -> &str {
        &self.as_str()[..PREFIX_LEN]
    }

    #[inline]
    pub fn suffix(&self) -> &str {
        &self.as_str()[PREFIX_LEN..]
    }
}

impl AsRef<str> for Sha1Hex {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for Sha1Hex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Debug for Sha1Hex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Sha1Hex").field(&self.as_str()).finish()
    }
}
