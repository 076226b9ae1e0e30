use std::path::Path;
use std::sync::OnceLock;

use log::debug;

use super::loader::{load_file, DataLoadError};
use super::model::Dataset;

// One-shot process-wide dataset cell. Loaded on first access, immutable
// for the rest of the process lifetime; concurrent sessions may share the
// reference freely because nothing ever mutates it.
static DATASET: OnceLock<Dataset> = OnceLock::new();

/// Load-on-first-access handle to the process-wide dataset.
///
/// The first call loads `path` and seals the cell; later calls return the
/// same `&'static Dataset` without touching the filesystem, regardless of
/// the path they pass. A load failure leaves the cell unset so startup
/// can be retried.
pub fn dataset(path: &Path) -> Result<&'static Dataset, DataLoadError> {
    if let Some(ds) = DATASET.get() {
        debug!("dataset already initialized, ignoring {}", path.display());
        return Ok(ds);
    }
    let loaded = load_file(path)?;
    Ok(DATASET.get_or_init(|| loaded))
}
