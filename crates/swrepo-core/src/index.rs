//! In-memory part number → file path index.

use crate::config::RepoConfig;
use crate::error::{RepoError, Result};
use crate::io;
use crate::validator::{self, Imported};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use swrepo_schema::{Document, PartNumber};
use walkdir::WalkDir;

/// Maps part numbers to the files that hold them.
///
/// The reserved part number maps to the consolidated manifest; it is
/// resolvable through [`RepositoryIndex::lookup`] but never listed and never
/// removable.
#[derive(Debug, Clone)]
pub struct RepositoryIndex {
    entries: BTreeMap<PartNumber, PathBuf>,
    reserved: PartNumber,
}

impl RepositoryIndex {
    /// Empty index with `reserved` as the manifest part number.
    pub fn new(reserved: PartNumber) -> Self {
        Self {
            entries: BTreeMap::new(),
            reserved,
        }
    }

    /// Build an index from the files already in `config.root`.
    ///
    /// Only regular files directly inside the root are considered; dot-files
    /// are skipped. The consolidated manifest is indexed under the reserved
    /// part number if it parses, loads are indexed by the part number in their
    /// header if their checksum verifies, and everything else is left out.
    ///
    /// # Errors
    ///
    /// Returns [`RepoError::Io`] only if the root itself cannot be listed.
    pub fn scan(config: &RepoConfig) -> Result<Self> {
        let mut index = Self::new(config.reserved_pn.clone());
        let manifest_name = config.manifest_file.as_str();

        let walker = WalkDir::new(&config.root)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name();

        for entry in walker {
            let entry = entry.map_err(|e| {
                let path = e.path().unwrap_or(config.root.as_path()).to_path_buf();
                RepoError::io(path, e.into())
            })?;
            if !entry.file_type().is_file() {
                continue;
            }
            let name = entry.file_name().to_string_lossy();
            if name.starts_with('.') {
                continue;
            }

            let path = entry.path();
            if name == manifest_name {
                index.scan_manifest(path);
            } else {
                index.scan_load(path);
            }
        }

        tracing::debug!(
            "Indexed {} load(s) from {}",
            index.len(),
            config.root.display()
        );
        Ok(index)
    }

    fn scan_manifest(&mut self, path: &Path) {
        match io::read(path).map(|bytes| Document::parse(&bytes)) {
            Ok(Ok(_)) => self.add(self.reserved.clone(), path.to_path_buf()),
            Ok(Err(e)) => tracing::warn!("Ignoring unreadable manifest {}: {e}", path.display()),
            Err(e) => tracing::warn!("{e}"),
        }
    }

    fn scan_load(&mut self, path: &Path) {
        let bytes = match io::read(path) {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::debug!("Skipping {e}");
                return;
            }
        };
        match validator::classify(&bytes) {
            Ok(Imported::Load(image)) => {
                let pn = image.part_number();
                if pn == self.reserved {
                    tracing::debug!(
                        "Skipping {}: load uses the reserved part number",
                        path.display()
                    );
                    return;
                }
                if let Some(previous) = self.entries.get(&pn) {
                    tracing::debug!(
                        "{pn}: {} supersedes {}",
                        path.display(),
                        previous.display()
                    );
                }
                self.add(pn, path.to_path_buf());
            }
            Ok(Imported::Manifest(_)) => {
                tracing::debug!("Skipping stray manifest fragment {}", path.display());
            }
            Err(e) => tracing::debug!("Skipping {}: {e}", path.display()),
        }
    }

    /// Register `path` under `pn`, replacing any previous mapping.
    ///
    /// The previously mapped file is not touched.
    pub fn add(&mut self, pn: PartNumber, path: PathBuf) {
        self.entries.insert(pn, path);
    }

    /// Drop the mapping for `pn` and return the path it pointed to.
    ///
    /// # Errors
    ///
    /// [`RepoError::Protected`] for the reserved part number,
    /// [`RepoError::NotFound`] if `pn` is not indexed.
    pub fn remove(&mut self, pn: &PartNumber) -> Result<PathBuf> {
        self.check_removable(pn)?;
        self.entries
            .remove(pn)
            .ok_or_else(|| RepoError::NotFound(pn.clone()))
    }

    /// Check that `pn` could be removed, without removing it.
    ///
    /// # Errors
    ///
    /// Same as [`RepositoryIndex::remove`].
    pub fn check_removable(&self, pn: &PartNumber) -> Result<()> {
        if *pn == self.reserved {
            return Err(RepoError::Protected(pn.clone()));
        }
        if !self.entries.contains_key(pn) {
            return Err(RepoError::NotFound(pn.clone()));
        }
        Ok(())
    }

    /// Indexed part numbers in ascending order, reserved entry excluded.
    pub fn list(&self) -> Vec<PartNumber> {
        self.entries
            .keys()
            .filter(|pn| **pn != self.reserved)
            .cloned()
            .collect()
    }

    /// Path stored for `pn`.
    ///
    /// # Errors
    ///
    /// [`RepoError::NotFound`] if `pn` is not indexed.
    pub fn lookup(&self, pn: &PartNumber) -> Result<PathBuf> {
        self.entries
            .get(pn)
            .cloned()
            .ok_or_else(|| RepoError::NotFound(pn.clone()))
    }

    /// Whether `pn` is indexed (the reserved entry included).
    pub fn contains(&self, pn: &PartNumber) -> bool {
        self.entries.contains_key(pn)
    }

    /// Number of listed loads (reserved entry excluded).
    pub fn len(&self) -> usize {
        self.entries.len() - usize::from(self.entries.contains_key(&self.reserved))
    }

    /// Whether no loads are listed.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use swrepo_schema::LoadImage;
    use tempfile::tempdir;

    fn pn(s: &str) -> PartNumber {
        PartNumber::new(s).unwrap()
    }

    #[test]
    fn remove_reserved_is_protected() {
        let mut index = RepositoryIndex::new(PartNumber::compatibility());
        index.add(PartNumber::compatibility(), PathBuf::from("/r/compatibility.xml"));

        let err = index.remove(&pn("00000000")).unwrap_err();
        assert!(matches!(err, RepoError::Protected(_)));
        assert!(index.contains(&pn("00000000")));
    }

    #[test]
    fn remove_unknown_is_not_found() {
        let mut index = RepositoryIndex::new(PartNumber::compatibility());
        let err = index.remove(&pn("DEADBEEF")).unwrap_err();
        assert!(matches!(err, RepoError::NotFound(p) if p.as_str() == "DEADBEEF"));
    }

    #[test]
    fn list_is_sorted_and_excludes_reserved() {
        let mut index = RepositoryIndex::new(PartNumber::compatibility());
        index.add(pn("00000003"), PathBuf::from("/r/3"));
        index.add(PartNumber::compatibility(), PathBuf::from("/r/compatibility.xml"));
        index.add(pn("00000001"), PathBuf::from("/r/1"));

        assert_eq!(index.list(), vec![pn("00000001"), pn("00000003")]);
        assert_eq!(index.len(), 2);
    }

    #[test]
    fn re_adding_replaces_the_mapping() {
        let mut index = RepositoryIndex::new(PartNumber::compatibility());
        index.add(pn("00000001"), PathBuf::from("/r/old.bin"));
        index.add(pn("00000001"), PathBuf::from("/r/00000001.bin"));

        assert_eq!(
            index.lookup(&pn("00000001")).unwrap(),
            PathBuf::from("/r/00000001.bin")
        );
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn scan_indexes_only_valid_files() {
        let dir = tempdir().unwrap();
        let root = dir.path();

        std::fs::write(
            root.join("00000001.bin"),
            LoadImage::encode(&pn("00000001"), b"one"),
        )
        .unwrap();
        let mut corrupt = LoadImage::encode(&pn("00000002"), b"two");
        corrupt[10] ^= 0xff;
        std::fs::write(root.join("00000002.bin"), corrupt).unwrap();
        std::fs::write(root.join("short.bin"), b"tiny").unwrap();
        std::fs::write(
            root.join("compatibility.xml"),
            b"<COMPATIBILITY><SOFTWARE PN=\"00000001\"/></COMPATIBILITY>",
        )
        .unwrap();
        std::fs::write(root.join("fragment.xml"), b"<COMPATIBILITY/>").unwrap();
        std::fs::write(
            root.join(".swrepo-tmp"),
            LoadImage::encode(&pn("00000009"), b"tmp"),
        )
        .unwrap();
        std::fs::create_dir(root.join("out")).unwrap();

        let index = RepositoryIndex::scan(&RepoConfig::new(root)).unwrap();

        assert_eq!(index.list(), vec![pn("00000001")]);
        assert_eq!(
            index.lookup(&PartNumber::compatibility()).unwrap(),
            root.join("compatibility.xml")
        );
    }

    #[test]
    fn scan_keys_loads_by_header_not_file_name() {
        let dir = tempdir().unwrap();
        std::fs::write(
            dir.path().join("renamed.img"),
            LoadImage::encode(&pn("0000ABCD"), b"payload"),
        )
        .unwrap();

        let index = RepositoryIndex::scan(&RepoConfig::new(dir.path())).unwrap();
        assert_eq!(
            index.lookup(&pn("0000abcd")).unwrap(),
            dir.path().join("renamed.img")
        );
    }
}
