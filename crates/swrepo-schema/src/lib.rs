//! Shared types and wire formats for swrepo.
//!
//! - [`PartNumber`]: the 8-hex-character identifier of a load or module.
//! - [`LoadImage`]: the fixed binary layout of a software load
//!   (`PN | SHA-256(payload) | payload`).
//! - [`xml`]: a small owned XML element tree used for compatibility manifests.
//! - [`compatibility`]: element names and a typed read-only view of a
//!   compatibility manifest.

pub mod compatibility;
pub mod hash;
pub mod load;
pub mod types;
pub mod xml;

// Re-exports
pub use compatibility::{Compatibility, LruRef};
pub use hash::Sha256Digest;
pub use load::{LoadError, LoadImage};
pub use types::{PartNumber, PartNumberError};
pub use xml::{Document, Element, Node, XmlError};
