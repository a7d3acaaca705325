//! Identifier newtypes.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Errors produced when parsing a [`PartNumber`] from text.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PartNumberError {
    /// The string is not exactly eight characters long.
    #[error("Invalid part number length: expected 8 hex chars, got {0}")]
    InvalidLength(usize),

    /// The string contains a character outside `[0-9A-Fa-f]`.
    #[error("Invalid part number '{0}': contains non-hex characters")]
    NotHex(String),
}

/// A load part number: four raw bytes rendered as eight uppercase hex
/// characters (e.g. `00000001`).
///
/// The value is always normalized to uppercase, so two part numbers compare
/// equal regardless of the case they were typed in.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PartNumber(String);

impl PartNumber {
    /// Number of raw bytes a part number occupies in a load image.
    pub const RAW_LEN: usize = 4;

    /// Part number reserved for the consolidated compatibility manifest.
    pub const COMPATIBILITY: &'static str = "00000000";

    /// Render four raw bytes as a part number.
    pub fn from_bytes(bytes: [u8; Self::RAW_LEN]) -> Self {
        Self(hex::encode_upper(bytes))
    }

    /// Parse and normalize a textual part number.
    ///
    /// # Errors
    ///
    /// Returns [`PartNumberError`] unless `s` is exactly eight hex digits.
    pub fn new(s: &str) -> Result<Self, PartNumberError> {
        if s.len() != Self::RAW_LEN * 2 {
            return Err(PartNumberError::InvalidLength(s.len()));
        }
        if !s.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(PartNumberError::NotHex(s.to_string()));
        }
        Ok(Self(s.to_ascii_uppercase()))
    }

    /// The reserved part number of the consolidated compatibility manifest.
    pub fn compatibility() -> Self {
        Self(Self::COMPATIBILITY.to_string())
    }

    /// Decode back into the four raw bytes stored in a load header.
    pub fn to_bytes(&self) -> [u8; Self::RAW_LEN] {
        // Construction guarantees eight hex digits.
        u32::from_str_radix(&self.0, 16)
            .unwrap_or_default()
            .to_be_bytes()
    }

    /// Return the normalized string as a slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for PartNumber {
    type Err = PartNumberError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for PartNumber {
    type Error = PartNumberError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(&s)
    }
}

impl From<PartNumber> for String {
    fn from(pn: PartNumber) -> Self {
        pn.0
    }
}

impl std::fmt::Display for PartNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for PartNumber {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for PartNumber {
    fn eq(&self, other: &str) -> bool {
        self.0.eq_ignore_ascii_case(other)
    }
}

impl PartialEq<&str> for PartNumber {
    fn eq(&self, other: &&str) -> bool {
        self.0.eq_ignore_ascii_case(other)
    }
}
