use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::Deserialize;

use crate::models::Package;

#[derive(Debug, Deserialize)]
struct ManifestEntry {
    name: String,
    version: String,
    license: Option<String>,
    path: Option<PathBuf>,
}

/// `{ "packages": [...] }` in JSON, `[[package]]` tables in TOML.
#[derive(Debug, Deserialize)]
struct ManifestDocument {
    #[serde(alias = "package", default)]
    packages: Vec<ManifestEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum JsonManifest {
    List(Vec<ManifestEntry>),
    Document(ManifestDocument),
}

/// Explicit package list in JSON or TOML.
pub struct ManifestSource;

impl super::PackageSource for ManifestSource {
    fn detect(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn load(&self, path: &Path) -> Result<Vec<Package>> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read manifest {}", path.display()))?;

        let entries = match path.extension().and_then(|e| e.to_str()) {
            Some("json") => match serde_json::from_str::<JsonManifest>(&content)
                .with_context(|| format!("Invalid JSON manifest {}", path.display()))?
            {
                JsonManifest::List(entries) => entries,
                JsonManifest::Document(doc) => doc.packages,
            },
            Some("toml") => {
                toml::from_str::<ManifestDocument>(&content)
                    .with_context(|| format!("Invalid TOML manifest {}", path.display()))?
                    .packages
            }
            _ => bail!(
                "Unsupported manifest {}: expected a .json or .toml file",
                path.display()
            ),
        };

        let base = path.parent().unwrap_or_else(|| Path::new("."));
        Ok(entries
            .into_iter()
            .map(|entry| {
                let mut package = Package::new(entry.name, entry.version);
                package.license = entry.license;
                package.path = entry.path.map(|p| if p.is_relative() { base.join(p) } else { p });
                package
            })
            .collect())
    }
}
