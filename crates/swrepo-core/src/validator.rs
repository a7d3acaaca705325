//! Classification and validation of incoming files.
//!
//! Anything that parses as an XML document is treated as a compatibility
//! manifest fragment and is not checksummed. Everything else must be a valid
//! load image.

use crate::error::Result;
use swrepo_schema::{Document, LoadImage};

/// Outcome of classifying a file's bytes.
#[derive(Debug)]
pub enum Imported<'a> {
    /// A compatibility manifest fragment.
    Manifest(Document),
    /// A load image whose checksum has been verified.
    Load(LoadImage<'a>),
}

/// Route `bytes` to the manifest or load path.
///
/// # Errors
///
/// Returns [`crate::RepoError::Load`] when the bytes are not XML and fail load
/// validation (`TooShort` / `ChecksumMismatch`).
pub fn classify(bytes: &[u8]) -> Result<Imported<'_>> {
    if let Ok(doc) = Document::parse(bytes) {
        return Ok(Imported::Manifest(doc));
    }
    let image = LoadImage::validate(bytes)?;
    Ok(Imported::Load(image))
}

/// Validate bytes that must be a load image (no XML routing).
///
/// # Errors
///
/// Returns [`crate::RepoError::Load`] on a short or corrupted image.
pub fn validate_load(bytes: &[u8]) -> Result<LoadImage<'_>> {
    Ok(LoadImage::validate(bytes)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RepoError;
    use swrepo_schema::{LoadError, PartNumber};

    #[test]
    fn xml_is_routed_to_manifest() {
        let xml = br#"<COMPATIBILITY><SOFTWARE PN="00000001"/></COMPATIBILITY>"#;
        assert!(matches!(classify(xml), Ok(Imported::Manifest(_))));
    }

    #[test]
    fn valid_load_is_routed_to_load() {
        let pn = PartNumber::new("00000007").unwrap();
        let bytes = LoadImage::encode(&pn, b"firmware");
        match classify(&bytes).unwrap() {
            Imported::Load(image) => assert_eq!(image.part_number(), pn),
            Imported::Manifest(_) => panic!("load classified as manifest"),
        }
    }

    #[test]
    fn broken_xml_falls_through_to_load_validation() {
        let err = classify(b"<COMPATIBILITY>").unwrap_err();
        assert!(matches!(
            err,
            RepoError::Load(LoadError::TooShort { len: 15, .. })
        ));
    }
}
