use std::path::Path;

use anyhow::{Context, Result};
use serde_json::Value;

use crate::models::Package;

/// Installed npm packages listed by `package-lock.json` (v2/v3 `packages` map).
pub struct NpmLockSource;

impl super::PackageSource for NpmLockSource {
    fn detect(&self, path: &Path) -> bool {
        path.join("package-lock.json").is_file()
    }

    fn load(&self, path: &Path) -> Result<Vec<Package>> {
        let lock_path = path.join("package-lock.json");
        let content = std::fs::read_to_string(&lock_path)
            .with_context(|| format!("Failed to read {}", lock_path.display()))?;
        let json: Value = serde_json::from_str(&content)
            .with_context(|| format!("Invalid JSON in {}", lock_path.display()))?;

        let mut packages = Vec::new();
        let Some(entries) = json.get("packages").and_then(|v| v.as_object()) else {
            return Ok(packages);
        };

        for (pkg_path, info) in entries {
            // Root project entry
            if pkg_path.is_empty() {
                continue;
            }

            let version = info
                .get("version")
                .and_then(|v| v.as_str())
                .unwrap_or("*")
                .to_string();

            // "node_modules/a/node_modules/@scope/b" → "@scope/b"
            let name = pkg_path
                .rsplit_once("node_modules/")
                .map_or(pkg_path.as_str(), |(_, name)| name)
                .to_string();

            let root = path.join(pkg_path);
            let license = info
                .get("license")
                .and_then(|v| v.as_str())
                .map(str::to_string)
                .or_else(|| read_license_from_package_json(&root.join("package.json")));

            let mut package = Package::new(name, version).with_path(root);
            package.license = license;
            packages.push(package);
        }

        Ok(packages)
    }
}

fn read_license_from_package_json(path: &Path) -> Option<String> {
    let content = std::fs::read_to_string(path).ok()?;
    let json: Value = serde_json::from_str(&content).ok()?;
    json.get("license").and_then(|v| v.as_str()).map(str::to_string)
}
