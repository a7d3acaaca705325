//! SHA-256 digests as carried inside load images.

use sha2::{Digest, Sha256};

/// A raw 32-byte SHA-256 digest.
///
/// Loads embed the digest in binary form; it is only rendered as hex for
/// display and error messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Sha256Digest([u8; Sha256Digest::LEN]);

impl Sha256Digest {
    /// Digest length in bytes.
    pub const LEN: usize = 32;

    /// Wrap raw digest bytes.
    pub const fn new(bytes: [u8; Self::LEN]) -> Self {
        Self(bytes)
    }

    /// Compute the SHA-256 digest of `data`.
    pub fn compute(data: &[u8]) -> Self {
        Self(Sha256::digest(data).into())
    }

    /// Borrow the raw digest bytes.
    pub fn as_bytes(&self) -> &[u8; Self::LEN] {
        &self.0
    }

    /// Lowercase hex rendering.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl std::fmt::Display for Sha256Digest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl AsRef<[u8]> for Sha256Digest {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}
