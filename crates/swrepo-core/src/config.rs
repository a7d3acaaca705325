//! Repository configuration.
//!
//! Values are layered: built-in defaults derived from `SWREPO_HOME`, then an
//! optional TOML file, then explicit overrides from the caller.
//!
//! ```toml
//! root = "/var/lib/swrepo/images"
//! manifest_file = "compatibility.xml"
//! reserved_pn = "00000000"
//! filtered_output = "/run/swrepo/compatibility.xml"
//! ```

use crate::error::{RepoError, Result};
use crate::paths;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use swrepo_schema::PartNumber;

/// Where a repository lives and what its reserved names are.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoConfig {
    /// Directory holding loads and the consolidated manifest.
    pub root: PathBuf,
    /// File name of the consolidated manifest inside `root`.
    pub manifest_file: String,
    /// Part number under which the consolidated manifest is indexed.
    pub reserved_pn: PartNumber,
    /// Well-known path filtered manifests are published to.
    pub filtered_output: PathBuf,
}

/// On-disk shape of the config file; every key is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    root: Option<PathBuf>,
    manifest_file: Option<String>,
    reserved_pn: Option<PartNumber>,
    filtered_output: Option<PathBuf>,
}

impl RepoConfig {
    /// Configuration rooted at `root` with default names.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self {
            filtered_output: paths::filtered_output_path(&root),
            root,
            manifest_file: paths::MANIFEST_FILE.to_string(),
            reserved_pn: PartNumber::compatibility(),
        }
    }

    /// Defaults derived from the environment.
    ///
    /// `root` is `$SWREPO_HOME/images` (falling back to `~/.swrepo/images`);
    /// `SWREPO_FILTERED_OUTPUT` overrides the filtered output path.
    ///
    /// # Errors
    ///
    /// Returns [`RepoError::Config`] if no home directory can be determined
    /// or the filtered output would overwrite the consolidated manifest.
    pub fn from_env() -> Result<Self> {
        let home = paths::try_swrepo_home().ok_or_else(|| {
            RepoError::Config(format!(
                "could not determine home directory; set {}",
                paths::HOME_ENV
            ))
        })?;

        let mut config = Self::new(paths::images_path(&home));
        if let Ok(out) = std::env::var(paths::FILTERED_OUTPUT_ENV) {
            config.filtered_output = PathBuf::from(out);
        }
        config.checked()
    }

    /// Overlay the keys present in the TOML file at `path`.
    ///
    /// Relative paths in the file are resolved against the file's directory.
    ///
    /// # Errors
    ///
    /// Returns [`RepoError::Io`] if the file cannot be read and
    /// [`RepoError::Config`] if it is not valid or points the filtered output
    /// at the consolidated manifest.
    pub fn merge_file(self, path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| RepoError::io(path, e))?;
        let file: ConfigFile = toml::from_str(&content)
            .map_err(|e| RepoError::Config(format!("{}: {e}", path.display())))?;

        let base = path.parent().unwrap_or_else(|| Path::new("."));
        let mut config = self;
        if let Some(root) = file.root {
            config = config.with_root(base.join(root));
        }
        if let Some(name) = file.manifest_file {
            config.manifest_file = name;
        }
        if let Some(pn) = file.reserved_pn {
            config.reserved_pn = pn;
        }
        if let Some(out) = file.filtered_output {
            config.filtered_output = base.join(out);
        }

        tracing::debug!("Loaded config from {}", path.display());
        config.checked()
    }

    fn checked(self) -> Result<Self> {
        if self.filtered_output == self.manifest_path() {
            return Err(RepoError::Config(format!(
                "filtered_output {} is the consolidated manifest",
                self.filtered_output.display()
            )));
        }
        Ok(self)
    }

    /// Move the repository to `root`.
    ///
    /// A filtered output path that was still the default for the old root
    /// follows the move.
    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        if self.filtered_output == paths::filtered_output_path(&self.root) {
            self.filtered_output = paths::filtered_output_path(&root);
        }
        self.root = root;
        self
    }

    /// Full path of the consolidated manifest.
    pub fn manifest_path(&self) -> PathBuf {
        self.root.join(&self.manifest_file)
    }

    /// Full path a load with `pn` is stored at.
    pub fn load_path(&self, pn: &PartNumber) -> PathBuf {
        paths::load_path(&self.root, pn)
    }
}
