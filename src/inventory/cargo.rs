use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::models::Package;

#[derive(Debug, Deserialize)]
struct CargoLock {
    #[serde(default)]
    package: Vec<CargoLockPackage>,
}

#[derive(Debug, Deserialize)]
struct CargoLockPackage {
    name: String,
    version: String,
    /// Packages without a `source` field are local workspace members.
    source: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CargoManifest {
    package: Option<CargoManifestPackage>,
}

#[derive(Debug, Deserialize)]
struct CargoManifestPackage {
    license: Option<String>,
}

/// Third-party crates pinned by `Cargo.lock`, with sources vendored under
/// `vendor/` (the layout `cargo vendor` produces).
pub struct CargoLockSource;

impl super::PackageSource for CargoLockSource {
    fn detect(&self, path: &Path) -> bool {
        path.join("Cargo.lock").is_file()
    }

    fn load(&self, path: &Path) -> Result<Vec<Package>> {
        let lock_path = path.join("Cargo.lock");
        let content = std::fs::read_to_string(&lock_path)
            .with_context(|| format!("Failed to read {}", lock_path.display()))?;
        let lock: CargoLock = toml::from_str(&content)
            .with_context(|| format!("Invalid TOML in {}", lock_path.display()))?;

        let vendor = path.join("vendor");
        let packages = lock
            .package
            .into_iter()
            // Skip local workspace members (they have no `source`)
            .filter(|p| p.source.is_some())
            .map(|p| {
                let mut package = Package::new(p.name.clone(), p.version.clone());
                if let Some(root) = vendored_root(&vendor, &p.name, &p.version) {
                    package.license = read_license_from_cargo_toml(&root.join("Cargo.toml"));
                    package.path = Some(root);
                }
                package
            })
            .collect();

        Ok(packages)
    }
}

/// `cargo vendor` uses `name` and falls back to `name-version` when several
/// versions of a crate are vendored.
fn vendored_root(vendor: &Path, name: &str, version: &str) -> Option<PathBuf> {
    [vendor.join(format!("{}-{}", name, version)), vendor.join(name)]
        .into_iter()
        .find(|dir| dir.is_dir())
}

fn read_license_from_cargo_toml(path: &Path) -> Option<String> {
    let content = std::fs::read_to_string(path).ok()?;
    let manifest: CargoManifest = toml::from_str(&content).ok()?;
    manifest.package?.license
}
