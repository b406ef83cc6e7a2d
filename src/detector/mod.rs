//! Per-package license detection from independent signals.
//!
//! 1. Declared expression resolved against the [`LicenseStore`].
//! 2. Candidate license files fingerprinted with [`patterns::FINGERPRINTS`].
//! 3. Copyright statements extracted from the same files.
//!
//! The signals are consolidated by SPDX id (highest confidence wins), then a
//! primary license, obligations, a risk tier and issues are derived.

pub mod files;
pub mod patterns;

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use indexmap::map::Entry;
use indexmap::{IndexMap, IndexSet};
use serde::Deserialize;
use tracing::debug;

use crate::error::{IntelError, Result};
use crate::license::{obligation_details, BuiltinLicenseStore, LicenseStore};
use crate::models::{
    AnalysisMetadata, DetectionMethod, Issue, IssueSeverity, IssueType, License, LicenseAnalysis,
    LicenseCategory, LicenseFile, Obligation, Package, RiskLevel,
};
use crate::risk::{category_weight, license_risk_level, severity_weight};

pub use files::{FileProvider, FsFileProvider};

/// Confidence of an exact declared-expression match.
const DECLARED_EXACT_CONFIDENCE: f64 = 1.0;
/// Confidence of the first resolvable token of a compound expression.
const DECLARED_TOKEN_CONFIDENCE: f64 = 0.8;

/// Which detection strategies run.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DetectionOptions {
    pub scan_license_files: bool,
    pub extract_copyrights: bool,
}

impl Default for DetectionOptions {
    fn default() -> Self {
        Self {
            scan_license_files: true,
            extract_copyrights: true,
        }
    }
}

pub struct LicenseDetector {
    store: Arc<dyn LicenseStore>,
    files: Arc<dyn FileProvider>,
}

impl LicenseDetector {
    pub fn new(store: Arc<dyn LicenseStore>, files: Arc<dyn FileProvider>) -> Self {
        Self { store, files }
    }

    /// Detector over the built-in SPDX table and the local filesystem.
    pub fn with_defaults() -> Self {
        Self::new(Arc::new(BuiltinLicenseStore::new()), Arc::new(FsFileProvider))
    }

    pub fn store(&self) -> &dyn LicenseStore {
        self.store.as_ref()
    }

    /// Detect the licenses of one package.
    ///
    /// Absent files are not errors. Unexpected read faults are returned as
    /// [`IntelError::DetectionFailed`] tagged with the package id.
    pub fn detect(&self, package: &Package, options: &DetectionOptions) -> Result<LicenseAnalysis> {
        let started = Instant::now();
        let analyzed_at = Utc::now();

        let declared = package
            .license
            .as_deref()
            .and_then(|expr| self.resolve_declared(expr));

        let texts = match &package.path {
            Some(root) if options.scan_license_files || options.extract_copyrights => self
                .read_candidates(root)
                .map_err(|e| IntelError::detection_failed(package.id(), e))?,
            _ => Vec::new(),
        };

        let (license_files, file_licenses) = if options.scan_license_files {
            self.fingerprint_files(&texts)
        } else {
            (Vec::new(), Vec::new())
        };

        let copyright_statements = if options.extract_copyrights {
            extract_copyrights(&texts)
        } else {
            Vec::new()
        };

        let licenses = consolidate(declared.iter().cloned().chain(file_licenses));
        let primary_license = select_primary(&licenses, declared.as_ref());
        let obligations = collect_obligations(&licenses);
        let risk_level = risk_level(&licenses, &obligations);
        let issues = detect_issues(package, &licenses, declared.is_some());
        let detection_method = detection_method(declared.is_some(), !license_files.is_empty());

        debug!(
            package = %package.id(),
            licenses = licenses.len(),
            method = %detection_method,
            risk = %risk_level,
            "license detection finished"
        );

        Ok(LicenseAnalysis {
            package: package.clone(),
            licenses,
            primary_license,
            detection_method,
            license_files,
            copyright_statements,
            obligations,
            risk_level,
            issues,
            metadata: AnalysisMetadata {
                analyzed_at,
                scan_duration_ms: started.elapsed().as_millis() as u64,
            },
        })
    }

    /// Exact lookup first; otherwise the first resolvable atom of the
    /// expression once parentheses are stripped and `AND`/`OR` are split out.
    fn resolve_declared(&self, expression: &str) -> Option<License> {
        let expression = expression.trim();
        if expression.is_empty() {
            return None;
        }

        if let Some(license) = self.store.lookup(expression) {
            return Some(license.with_confidence(DECLARED_EXACT_CONFIDENCE));
        }

        expression_atoms(expression)
            .iter()
            .find_map(|atom| self.store.lookup(atom))
            .map(|license| license.with_confidence(DECLARED_TOKEN_CONFIDENCE))
    }

    /// Read every existing candidate file, in search order.
    fn read_candidates(&self, root: &Path) -> std::io::Result<Vec<(String, String)>> {
        let mut texts = Vec::new();
        for name in patterns::LICENSE_FILE_CANDIDATES {
            if !self.files.exists(root, name) {
                continue;
            }
            if let Some(text) = self.files.read_utf8(root, name)? {
                texts.push((root.join(name).to_string_lossy().into_owned(), text));
            }
        }
        Ok(texts)
    }

    fn fingerprint_files(&self, texts: &[(String, String)]) -> (Vec<LicenseFile>, Vec<License>) {
        let mut files = Vec::new();
        let mut licenses = Vec::new();

        for (path, text) in texts {
            let Some(fp) = patterns::fingerprint(text) else {
                continue;
            };
            // A fingerprint the store cannot resolve is a negative signal.
            let Some(license) = self.store.lookup(fp.spdx_id) else {
                continue;
            };
            files.push(LicenseFile {
                path: path.clone(),
                license: fp.spdx_id.to_string(),
                confidence: fp.confidence,
            });
            licenses.push(license.with_confidence(fp.confidence));
        }

        (files, licenses)
    }
}

/// Split a declared expression into atomic license ids.
///
/// `/` is read as `OR` (some ecosystems use it as shorthand) and `WITH`
/// exception ids are dropped so only the base license is looked up.
fn expression_atoms(expression: &str) -> Vec<String> {
    let normalized = expression.replace(['(', ')', '/'], " ");
    let mut atoms = Vec::new();
    let mut tokens = normalized.split_whitespace();
    while let Some(token) = tokens.next() {
        if token.eq_ignore_ascii_case("WITH") {
            tokens.next();
        } else if !token.eq_ignore_ascii_case("AND") && !token.eq_ignore_ascii_case("OR") {
            atoms.push(token.to_string());
        }
    }
    atoms
}

fn extract_copyrights(texts: &[(String, String)]) -> Vec<String> {
    let mut seen: IndexSet<String> = IndexSet::new();
    for (_, text) in texts {
        for m in patterns::COPYRIGHT_STATEMENT.find_iter(text) {
            seen.insert(m.as_str().trim().to_string());
        }
    }
    seen.into_iter().collect()
}

/// Merge by SPDX id, keeping the higher confidence. First-seen position is kept.
fn consolidate(candidates: impl IntoIterator<Item = License>) -> Vec<License> {
    let mut merged: IndexMap<String, License> = IndexMap::new();
    for license in candidates {
        match merged.entry(license.spdx_id.clone()) {
            Entry::Occupied(mut slot) => {
                if license.confidence > slot.get().confidence {
                    slot.insert(license);
                }
            }
            Entry::Vacant(slot) => {
                slot.insert(license);
            }
        }
    }
    merged.into_values().collect()
}

/// Highest confidence; the earliest license wins ties.
fn most_confident<'a>(licenses: impl Iterator<Item = &'a License>) -> Option<&'a License> {
    licenses.fold(None, |best, license| match best {
        Some(b) if b.confidence >= license.confidence => Some(b),
        _ => Some(license),
    })
}

fn select_primary(licenses: &[License], declared: Option<&License>) -> Option<License> {
    if let Some(declared) = declared {
        if let Some(found) = licenses.iter().find(|l| l.spdx_id == declared.spdx_id) {
            return Some(found.clone());
        }
    }

    most_confident(
        licenses
            .iter()
            .filter(|l| l.category == LicenseCategory::Permissive),
    )
    .or_else(|| most_confident(licenses.iter()))
    .cloned()
}

fn collect_obligations(licenses: &[License]) -> Vec<Obligation> {
    let mut by_type = IndexMap::new();
    for license in licenses {
        for kind in &license.obligations {
            by_type
                .entry(*kind)
                .or_insert_with(|| obligation_details(*kind));
        }
    }
    by_type.into_values().collect()
}

fn risk_score(licenses: &[License], obligations: &[Obligation]) -> u32 {
    let license_weight: u32 = licenses.iter().map(|l| category_weight(l.category)).sum();
    let obligation_weight: u32 = obligations.iter().map(|o| severity_weight(o.severity)).sum();
    license_weight + obligation_weight
}

fn risk_level(licenses: &[License], obligations: &[Obligation]) -> RiskLevel {
    license_risk_level(risk_score(licenses, obligations))
}

fn detect_issues(package: &Package, licenses: &[License], declared_resolved: bool) -> Vec<Issue> {
    let mut issues = Vec::new();

    if licenses.is_empty() {
        issues.push(Issue {
            kind: IssueType::MissingLicense,
            severity: IssueSeverity::Error,
            message: format!("No license could be detected for {}", package.id()),
            license: None,
        });
    }

    if licenses.len() > 1 {
        let has_proprietary = licenses
            .iter()
            .any(|l| l.category == LicenseCategory::Proprietary);
        let copyleft_count = licenses
            .iter()
            .filter(|l| l.category == LicenseCategory::Copyleft)
            .count();
        if has_proprietary || copyleft_count > 1 {
            let ids: Vec<&str> = licenses.iter().map(|l| l.spdx_id.as_str()).collect();
            issues.push(Issue {
                kind: IssueType::ConflictingLicenses,
                severity: IssueSeverity::Critical,
                message: format!("Conflicting licenses detected: {}", ids.join(", ")),
                license: None,
            });
        }
    }

    for license in licenses.iter().filter(|l| l.is_deprecated()) {
        issues.push(Issue {
            kind: IssueType::DeprecatedLicense,
            severity: IssueSeverity::Warning,
            message: format!("License {} uses a deprecated SPDX identifier", license.spdx_id),
            license: Some(license.spdx_id.clone()),
        });
    }

    if let Some(expression) = package.license.as_deref() {
        if !declared_resolved && !expression.trim().is_empty() {
            issues.push(Issue {
                kind: IssueType::UnrecognizedLicense,
                severity: IssueSeverity::Warning,
                message: format!("Declared license '{}' is not recognized", expression),
                license: Some(expression.to_string()),
            });
        }
    }

    issues
}

fn detection_method(declared: bool, file_backed: bool) -> DetectionMethod {
    match (declared, file_backed) {
        (true, true) => DetectionMethod::Declared,
        (false, true) => DetectionMethod::FileAnalysis,
        (true, false) => DetectionMethod::Heuristic,
        (false, false) => DetectionMethod::Manual,
    }
}
