//! Package inventories fed to the detector.
//!
//! An input is either a manifest file listing packages explicitly, or a
//! project directory whose lockfile names the installed packages.

pub mod cargo;
pub mod manifest;
pub mod npm;

use std::path::Path;

use anyhow::{bail, Result};
use tracing::debug;

use crate::models::Package;

pub trait PackageSource {
    /// Whether this source understands `path`.
    fn detect(&self, path: &Path) -> bool;
    fn load(&self, path: &Path) -> Result<Vec<Package>>;
}

/// Load packages from a manifest file or a project directory.
///
/// Directories are tried against each lockfile source in turn; the first
/// source that recognises the directory wins.
pub fn load(input: &Path) -> Result<Vec<Package>> {
    if input.is_file() {
        return manifest::ManifestSource.load(input);
    }

    let sources: [&dyn PackageSource; 2] = [&npm::NpmLockSource, &cargo::CargoLockSource];
    for source in sources {
        if source.detect(input) {
            let packages = source.load(input)?;
            debug!(input = %input.display(), packages = packages.len(), "inventory loaded");
            return Ok(packages);
        }
    }

    bail!(
        "{} is neither a package manifest nor a directory with package-lock.json or Cargo.lock",
        input.display()
    )
}
