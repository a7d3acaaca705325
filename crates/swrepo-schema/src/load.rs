//! Binary load image layout.
//!
//! ```text
//! offset 0..4    part number (raw bytes)
//! offset 4..36   SHA-256 digest of the payload
//! offset 36..end payload
//! ```
//!
//! There is no version tag and no trailer; the digest covers the payload only.

use crate::hash::Sha256Digest;
use crate::types::PartNumber;

/// Size of the fixed header preceding the payload.
pub const HEADER_LEN: usize = PartNumber::RAW_LEN + Sha256Digest::LEN;

/// Errors raised while decoding or verifying a load image.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum LoadError {
    /// The input cannot even hold the fixed header.
    #[error("Load too short: {len} bytes, need at least {min}")]
    TooShort {
        /// Number of bytes supplied.
        len: usize,
        /// Minimum length of a load image.
        min: usize,
    },

    /// The embedded digest does not match the payload.
    #[error("Checksum mismatch for {part_number}: embedded {expected}, computed {actual}")]
    ChecksumMismatch {
        /// Part number read from the header.
        part_number: PartNumber,
        /// Digest embedded in the header.
        expected: Sha256Digest,
        /// Digest computed over the payload.
        actual: Sha256Digest,
    },
}

/// A borrowed view over a load image.
///
/// [`LoadImage::parse`] only splits the header; [`LoadImage::verify`] checks
/// the digest. Use [`LoadImage::validate`] to do both.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadImage<'a> {
    part_number: [u8; PartNumber::RAW_LEN],
    digest: Sha256Digest,
    payload: &'a [u8],
}

impl<'a> LoadImage<'a> {
    /// Split `bytes` into part number, embedded digest and payload.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::TooShort`] if `bytes` is shorter than [`HEADER_LEN`].
    pub fn parse(bytes: &'a [u8]) -> Result<Self, LoadError> {
        if bytes.len() < HEADER_LEN {
            return Err(LoadError::TooShort {
                len: bytes.len(),
                min: HEADER_LEN,
            });
        }

        let (pn, rest) = bytes.split_at(PartNumber::RAW_LEN);
        let (digest, payload) = rest.split_at(Sha256Digest::LEN);

        let mut part_number = [0u8; PartNumber::RAW_LEN];
        part_number.copy_from_slice(pn);
        let mut raw_digest = [0u8; Sha256Digest::LEN];
        raw_digest.copy_from_slice(digest);

        Ok(Self {
            part_number,
            digest: Sha256Digest::new(raw_digest),
            payload,
        })
    }

    /// Parse and verify in one step.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::TooShort`] or [`LoadError::ChecksumMismatch`].
    pub fn validate(bytes: &'a [u8]) -> Result<Self, LoadError> {
        let image = Self::parse(bytes)?;
        image.verify()?;
        Ok(image)
    }

    /// Recompute the payload digest and compare it with the embedded one.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::ChecksumMismatch`] if they differ.
    pub fn verify(&self) -> Result<(), LoadError> {
        let actual = Sha256Digest::compute(self.payload);
        if actual != self.digest {
            return Err(LoadError::ChecksumMismatch {
                part_number: self.part_number(),
                expected: self.digest,
                actual,
            });
        }
        Ok(())
    }

    /// Part number rendered from the first four bytes.
    pub fn part_number(&self) -> PartNumber {
        PartNumber::from_bytes(self.part_number)
    }

    /// Digest embedded in the header.
    pub fn digest(&self) -> &Sha256Digest {
        &self.digest
    }

    /// Bytes following the header.
    pub fn payload(&self) -> &'a [u8] {
        self.payload
    }

    /// Build a well-formed load image for `payload`.
    pub fn encode(part_number: &PartNumber, payload: &[u8]) -> Vec<u8> {
        let mut out = Vec::with_capacity(HEADER_LEN + payload.len());
        out.extend_from_slice(&part_number.to_bytes());
        out.extend_from_slice(Sha256Digest::compute(payload).as_bytes());
        out.extend_from_slice(payload);
        out
    }
}
