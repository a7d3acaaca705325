use dirs::home_dir;
use std::path::{Path, PathBuf};
use swrepo_schema::PartNumber;

/// Environment variable overriding the swrepo home directory.
pub const HOME_ENV: &str = "SWREPO_HOME";

/// Environment variable overriding where filtered manifests are published.
pub const FILTERED_OUTPUT_ENV: &str = "SWREPO_FILTERED_OUTPUT";

/// Default file name of the consolidated compatibility manifest.
pub const MANIFEST_FILE: &str = "compatibility.xml";

/// Extension given to stored load images.
pub const LOAD_EXTENSION: &str = "bin";

/// Returns the swrepo home directory, or None if the user's home cannot be resolved.
pub fn try_swrepo_home() -> Option<PathBuf> {
    if let Ok(val) = std::env::var(HOME_ENV) {
        return Some(PathBuf::from(val));
    }
    home_dir().map(|h| h.join(".swrepo"))
}

/// Load store: `<home>/images`
pub fn images_path(home: &Path) -> PathBuf {
    home.join("images")
}

/// Default filtered manifest output: `<root>/out/compatibility.xml`
///
/// The scan of `root` is not recursive, so published copies are never
/// mistaken for the consolidated manifest.
pub fn filtered_output_path(root: &Path) -> PathBuf {
    root.join("out").join(MANIFEST_FILE)
}

/// Storage path of a load: `<root>/<PN>.bin`
pub fn load_path(root: &Path, pn: &PartNumber) -> PathBuf {
    root.join(format!("{pn}.{LOAD_EXTENSION}"))
}
