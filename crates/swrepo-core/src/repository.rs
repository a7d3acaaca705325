//! The repository: an index over a directory of loads plus the consolidated
//! compatibility manifest.

use crate::config::RepoConfig;
use crate::error::{RepoError, Result};
use crate::index::RepositoryIndex;
use crate::io;
use crate::manifest::{self, MergeOutcome};
use crate::validator::{self, Imported};
use parking_lot::Mutex;
use std::path::{Path, PathBuf};
use swrepo_schema::{Compatibility, Document, LoadImage, PartNumber};

/// A software load repository rooted at [`RepoConfig::root`].
///
/// Mutating operations take `&mut self`, so a single owner serializes
/// imports and removals. Filtered manifest publication only needs `&self`
/// and is serialized internally.
#[derive(Debug)]
pub struct Repository {
    config: RepoConfig,
    index: RepositoryIndex,
    publish_lock: Mutex<()>,
}

impl Repository {
    /// Open the repository described by `config`, creating the root
    /// directory if needed and indexing the files already in it.
    ///
    /// # Errors
    ///
    /// [`RepoError::Io`] if the root cannot be created or listed.
    pub fn open(config: RepoConfig) -> Result<Self> {
        io::ensure_dir(&config.root)?;
        let index = RepositoryIndex::scan(&config)?;
        Ok(Self {
            config,
            index,
            publish_lock: Mutex::new(()),
        })
    }

    /// Configuration this repository was opened with.
    pub fn config(&self) -> &RepoConfig {
        &self.config
    }

    /// Import the file at `path`.
    ///
    /// XML is merged into the consolidated manifest and the reserved part
    /// number is returned. The first manifest is stored byte for byte. Anything else must be a valid load; it is copied
    /// to `<root>/<PN>.bin` and its part number returned. Re-importing a
    /// part number points the index at the new copy.
    ///
    /// # Errors
    ///
    /// - [`RepoError::Load`] if the file is neither XML nor a valid load.
    /// - [`RepoError::MalformedManifest`] if a manifest cannot be merged
    ///   into an existing one.
    /// - [`RepoError::Protected`] if a load claims the reserved part number.
    /// - [`RepoError::Io`] on filesystem failures.
    ///
    /// Nothing is published when an error is returned.
    pub fn import(&mut self, path: &Path) -> Result<PartNumber> {
        let bytes = io::read(path)?;
        match validator::classify(&bytes)? {
            Imported::Manifest(incoming) => self.import_manifest(path, &bytes, &incoming),
            Imported::Load(image) => self.import_load(path, &bytes, &image),
        }
    }

    fn import_manifest(
        &mut self,
        source: &Path,
        raw: &[u8],
        incoming: &Document,
    ) -> Result<PartNumber> {
        let dest = self.config.manifest_path();

        match manifest::load(&dest)? {
            Some(current) => {
                let (merged, outcome) = manifest::merge(&current, incoming)?;
                manifest::store(&dest, &merged)?;
                log_merge(source, &outcome);
            }
            None => {
                // First manifest is taken verbatim.
                io::write_atomic(&dest, raw)?;
                tracing::info!(
                    "Stored manifest {} ({} SOFTWARE entries)",
                    source.display(),
                    Compatibility::collect(incoming).len()
                );
            }
        }

        let reserved = self.config.reserved_pn.clone();
        self.index.add(reserved.clone(), dest);
        Ok(reserved)
    }

    fn import_load(
        &mut self,
        source: &Path,
        raw: &[u8],
        image: &LoadImage<'_>,
    ) -> Result<PartNumber> {
        let pn = image.part_number();
        if pn == self.config.reserved_pn {
            return Err(RepoError::Protected(pn));
        }

        let dest = self.config.load_path(&pn);
        io::publish(&dest, raw, |tmp| {
            let copy = io::read(tmp)?;
            validator::validate_load(&copy)?;
            Ok(())
        })?;

        if let Ok(previous) = self.index.lookup(&pn) {
            if previous != dest {
                tracing::debug!("{pn}: {} is no longer indexed", previous.display());
            }
        }
        tracing::info!(
            "Imported {pn} from {} ({} byte payload)",
            source.display(),
            image.payload().len()
        );
        self.index.add(pn.clone(), dest);
        Ok(pn)
    }

    /// Delete the stored file for `pn` and drop it from the index.
    ///
    /// Returns the path that was removed. A file that has already vanished
    /// from disk is not an error.
    ///
    /// # Errors
    ///
    /// [`RepoError::Protected`] for the reserved part number,
    /// [`RepoError::NotFound`] for an unknown one, [`RepoError::Io`] if the
    /// file exists but cannot be deleted.
    pub fn remove(&mut self, pn: &PartNumber) -> Result<PathBuf> {
        self.index.check_removable(pn)?;
        let path = self.index.lookup(pn)?;

        match std::fs::remove_file(&path) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!("{pn}: {} was already gone", path.display());
            }
            Err(e) => return Err(RepoError::io(&path, e)),
        }

        tracing::info!("Removed {pn}");
        self.index.remove(pn)
    }

    /// Indexed part numbers in ascending order, manifest excluded.
    pub fn list(&self) -> Vec<PartNumber> {
        self.index.list()
    }

    /// Stored path of `pn`. The reserved part number resolves to the
    /// consolidated manifest once one has been imported.
    ///
    /// # Errors
    ///
    /// [`RepoError::NotFound`] if `pn` is not indexed.
    pub fn path(&self, pn: &PartNumber) -> Result<PathBuf> {
        self.index.lookup(pn)
    }

    /// Number of indexed loads, manifest excluded.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Whether no loads are indexed.
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Whether a consolidated manifest has been imported.
    pub fn has_manifest(&self) -> bool {
        self.index.contains(&self.config.reserved_pn)
    }

    /// The consolidated manifest, if one exists.
    ///
    /// # Errors
    ///
    /// [`RepoError::Io`] or [`RepoError::MalformedManifest`] if the file
    /// exists but cannot be read or parsed.
    pub fn manifest(&self) -> Result<Option<Document>> {
        manifest::load(&self.config.manifest_path())
    }

    /// Typed view of the consolidated manifest's entries (empty if there is
    /// no manifest).
    ///
    /// # Errors
    ///
    /// Same as [`Repository::manifest`].
    pub fn compatibility(&self) -> Result<Vec<Compatibility>> {
        Ok(self
            .manifest()?
            .map(|doc| Compatibility::collect(&doc))
            .unwrap_or_default())
    }

    /// Publish the consolidated manifest restricted to `pns` at the
    /// configured filtered output path and return that path.
    ///
    /// # Errors
    ///
    /// Same as [`Repository::write_filtered_manifest`].
    pub fn filtered_manifest_path<S: AsRef<str>>(&self, pns: &[S]) -> Result<PathBuf> {
        let dest = self.config.filtered_output.clone();
        self.write_filtered_manifest(pns, &dest)?;
        Ok(dest)
    }

    /// Publish the consolidated manifest restricted to `pns` at `dest`.
    ///
    /// The file is replaced atomically and concurrent calls are serialized,
    /// so readers of `dest` never see a partial document. `dest` may not be
    /// the consolidated manifest or a stored load.
    ///
    /// # Errors
    ///
    /// - [`RepoError::StoredPath`] if `dest` is a file the repository owns.
    /// - [`RepoError::NotFound`] with the reserved part number if no
    ///   manifest has been imported.
    /// - [`RepoError::EmptySelection`] if `pns` is empty.
    /// - [`RepoError::MalformedManifest`] if the manifest cannot be filtered.
    /// - [`RepoError::Io`] if `dest` cannot be written.
    pub fn write_filtered_manifest<S: AsRef<str>>(&self, pns: &[S], dest: &Path) -> Result<()> {
        self.check_output(dest)?;
        let consolidated = self
            .manifest()?
            .ok_or_else(|| RepoError::NotFound(self.config.reserved_pn.clone()))?;
        let filtered = manifest::filter(&consolidated, pns)?;
        let bytes = filtered.to_bytes()?;

        let _guard = self.publish_lock.lock();
        io::write_atomic(dest, &bytes)?;
        tracing::debug!(
            "Published filtered manifest ({} of {} requested) to {}",
            Compatibility::collect(&filtered).len(),
            pns.len(),
            dest.display()
        );
        Ok(())
    }

    fn check_output(&self, dest: &Path) -> Result<()> {
        let mut owned = vec![self.config.manifest_path()];
        for pn in self.index.list() {
            owned.extend(self.index.lookup(&pn).ok());
        }
        if owned.iter().any(|stored| same_file(stored, dest)) {
            return Err(RepoError::StoredPath(dest.to_path_buf()));
        }
        Ok(())
    }
}

/// Whether `a` and `b` name the same file. Paths that do not exist yet are
/// compared as written.
fn same_file(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}

fn log_merge(source: &Path, outcome: &MergeOutcome) {
    tracing::info!(
        "Merged manifest {}: {} added, {} replaced",
        source.display(),
        outcome.added.len(),
        outcome.replaced.len()
    );
    for pn in &outcome.replaced {
        tracing::debug!("  replaced SOFTWARE {pn}");
    }
}
