//! Orchestration over many packages: batched detection, compatibility
//! delegation, legal risk, policy validation and compliance documents.
//!
//! - [`legal`]: pure project-level risk assembly.

pub mod legal;

use std::sync::Arc;

use futures::future::join_all;
use tracing::{debug, info, warn};

use crate::compatibility::{
    CompatibilityAnalysis, CompatibilityEngine, CompatibilityOptions, CompatibilityReport,
    MatrixCompatibilityEngine,
};
use crate::detector::{DetectionOptions, LicenseDetector};
use crate::error::Result;
use crate::models::{License, LicenseAnalysis, Package};
use crate::policy::{self, LicensePolicy, PolicyValidation};
use crate::report::{self, DocumentOptions};

pub use legal::{assess_legal_risk, LegalRiskReport, ProjectInfo};

/// Packages detected concurrently per batch.
pub const BATCH_SIZE: usize = 10;

/// Settled outcome of one detection in a batch.
#[derive(Debug)]
enum DetectionOutcome {
    Success(LicenseAnalysis),
    Failure { package: String, error: String },
}

pub struct LicenseIntelligenceService {
    detector: Arc<LicenseDetector>,
    compatibility: Arc<dyn CompatibilityEngine>,
}

impl LicenseIntelligenceService {
    pub fn new(detector: Arc<LicenseDetector>, compatibility: Arc<dyn CompatibilityEngine>) -> Self {
        Self {
            detector,
            compatibility,
        }
    }

    /// Built-in license store, local filesystem, category-matrix compatibility.
    pub fn with_defaults() -> Self {
        Self::new(
            Arc::new(LicenseDetector::with_defaults()),
            Arc::new(MatrixCompatibilityEngine),
        )
    }

    pub fn detector(&self) -> &LicenseDetector {
        &self.detector
    }

    /// Detect every package. Failed detections are logged and dropped, so the
    /// result may be shorter than `packages`.
    pub async fn analyze(
        &self,
        packages: &[Package],
        options: &DetectionOptions,
    ) -> Vec<LicenseAnalysis> {
        self.analyze_with_progress(packages, options, |_| {}).await
    }

    /// Like [`analyze`](Self::analyze), calling `on_batch` with the number of
    /// packages settled after each batch.
    pub async fn analyze_with_progress<F>(
        &self,
        packages: &[Package],
        options: &DetectionOptions,
        mut on_batch: F,
    ) -> Vec<LicenseAnalysis>
    where
        F: FnMut(usize),
    {
        let mut analyses = Vec::with_capacity(packages.len());
        let mut failed = 0usize;

        for (index, batch) in packages.chunks(BATCH_SIZE).enumerate() {
            let tasks: Vec<_> = batch
                .iter()
                .map(|package| {
                    let detector = Arc::clone(&self.detector);
                    let package = package.clone();
                    let options = options.clone();
                    tokio::task::spawn_blocking(move || detector.detect(&package, &options))
                })
                .collect();

            // The whole batch settles before the next one starts.
            let outcomes: Vec<DetectionOutcome> = join_all(tasks)
                .await
                .into_iter()
                .zip(batch)
                .map(|(joined, package)| match joined {
                    Ok(Ok(analysis)) => DetectionOutcome::Success(analysis),
                    Ok(Err(e)) => DetectionOutcome::Failure {
                        package: package.id(),
                        error: e.to_string(),
                    },
                    Err(e) => DetectionOutcome::Failure {
                        package: package.id(),
                        error: format!("detection task aborted: {}", e),
                    },
                })
                .collect();

            let mut batch_failed = 0usize;
            for outcome in outcomes {
                match outcome {
                    DetectionOutcome::Success(analysis) => analyses.push(analysis),
                    DetectionOutcome::Failure { package, error } => {
                        warn!(package = %package, error = %error, "license detection failed");
                        batch_failed += 1;
                    }
                }
            }
            failed += batch_failed;

            debug!(
                batch = index,
                succeeded = batch.len() - batch_failed,
                failed = batch_failed,
                "detection batch settled"
            );
            on_batch(batch.len());
        }

        if failed > 0 {
            info!(
                analyzed = analyses.len(),
                failed,
                total = packages.len(),
                "license analysis finished with failures"
            );
        }

        analyses
    }

    pub fn check_compatibility(&self, a: &License, b: &License) -> Result<CompatibilityAnalysis> {
        self.compatibility.check_pair(a, b)
    }

    pub async fn generate_compatibility_report(
        &self,
        packages: &[Package],
        detection: &DetectionOptions,
        options: &CompatibilityOptions,
    ) -> Result<CompatibilityReport> {
        let analyses = self.analyze(packages, detection).await;
        self.compatibility.report(packages, &analyses, options)
    }

    /// Compatibility report for analyses that already exist.
    pub fn compatibility_report_for(
        &self,
        packages: &[Package],
        analyses: &[LicenseAnalysis],
        options: &CompatibilityOptions,
    ) -> Result<CompatibilityReport> {
        self.compatibility.report(packages, analyses, options)
    }

    pub async fn generate_legal_risk_report(
        &self,
        project: &ProjectInfo,
        packages: &[Package],
        detection: &DetectionOptions,
        options: &CompatibilityOptions,
    ) -> Result<LegalRiskReport> {
        let analyses = self.analyze(packages, detection).await;
        self.legal_risk_report_for(project, packages, &analyses, options)
    }

    /// Legal risk report for analyses that already exist.
    pub fn legal_risk_report_for(
        &self,
        project: &ProjectInfo,
        packages: &[Package],
        analyses: &[LicenseAnalysis],
        options: &CompatibilityOptions,
    ) -> Result<LegalRiskReport> {
        let compatibility = self.compatibility.report(packages, analyses, options)?;
        Ok(assess_legal_risk(project, analyses, &compatibility))
    }

    pub async fn validate_policy(
        &self,
        packages: &[Package],
        policy: &LicensePolicy,
        detection: &DetectionOptions,
    ) -> PolicyValidation {
        let analyses = self.analyze(packages, detection).await;
        policy::evaluate(&analyses, policy)
    }

    pub async fn generate_compliance_document(
        &self,
        packages: &[Package],
        detection: &DetectionOptions,
        options: &DocumentOptions,
    ) -> Result<String> {
        let analyses = self.analyze(packages, detection).await;
        report::render(&analyses, options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::path::{Path, PathBuf};

    use crate::detector::tests::{MemoryFiles, APACHE_TEXT, GPL3_TEXT, MIT_TEXT};
    use crate::detector::FileProvider;
    use crate::error::IntelError;
    use crate::license::{BuiltinLicenseStore, LicenseStore};
    use crate::models::LicenseCategory;
    use crate::policy::{CategoryRule, PolicyAction, RiskTolerance};
    use crate::report::DocumentFormat;

    fn service(files: MemoryFiles) -> LicenseIntelligenceService {
        let detector = LicenseDetector::new(Arc::new(BuiltinLicenseStore::new()), Arc::new(files));
        LicenseIntelligenceService::new(Arc::new(detector), Arc::new(MatrixCompatibilityEngine))
    }

    fn packages(n: usize) -> Vec<Package> {
        (0..n)
            .map(|i| {
                Package::new(format!("pkg-{}", i), "1.0.0")
                    .with_license("MIT")
                    .with_path(format!("/pkg/{}", i))
            })
            .collect()
    }

    /// Panics when asked about one package root.
    struct PanickingFiles {
        root: PathBuf,
    }

    impl FileProvider for PanickingFiles {
        fn exists(&self, root: &Path, _filename: &str) -> bool {
            if root == self.root {
                panic!("file provider crashed on {}", root.display());
            }
            false
        }

        fn read_utf8(&self, _root: &Path, _filename: &str) -> io::Result<Option<String>> {
            Ok(None)
        }
    }

    struct FailingEngine;

    impl CompatibilityEngine for FailingEngine {
        fn check_pair(&self, _: &License, _: &License) -> Result<CompatibilityAnalysis> {
            Err(IntelError::Compatibility("engine offline".to_string()))
        }

        fn report(
            &self,
            _: &[Package],
            _: &[LicenseAnalysis],
            _: &CompatibilityOptions,
        ) -> Result<CompatibilityReport> {
            Err(IntelError::Compatibility("engine offline".to_string()))
        }
    }

    #[tokio::test]
    async fn test_one_failure_yields_n_minus_one() {
        let files = MemoryFiles {
            fail_root: Some(PathBuf::from("/pkg/13")),
            ..Default::default()
        };
        let svc = service(files);
        let input = packages(25);

        let mut settled = Vec::new();
        let analyses = svc
            .analyze_with_progress(&input, &DetectionOptions::default(), |n| settled.push(n))
            .await;

        assert_eq!(analyses.len(), 24);
        assert!(!analyses.iter().any(|a| a.package.name == "pkg-13"));
        assert_eq!(settled, vec![10, 10, 5]);
        // Input order is preserved across batches.
        assert_eq!(analyses[0].package.name, "pkg-0");
        assert_eq!(analyses[23].package.name, "pkg-24");
    }

    #[tokio::test]
    async fn test_panicked_detection_counts_as_failure() {
        let files = PanickingFiles {
            root: PathBuf::from("/pkg/4"),
        };
        let detector = LicenseDetector::new(Arc::new(BuiltinLicenseStore::new()), Arc::new(files));
        let svc =
            LicenseIntelligenceService::new(Arc::new(detector), Arc::new(MatrixCompatibilityEngine));

        let analyses = svc.analyze(&packages(12), &DetectionOptions::default()).await;

        assert_eq!(analyses.len(), 11);
        assert!(!analyses.iter().any(|a| a.package.name == "pkg-4"));
        assert_eq!(analyses[10].package.name, "pkg-11");
    }

    #[tokio::test]
    async fn test_all_failures_return_empty() {
        let files = MemoryFiles {
            fail_root: Some(PathBuf::from("/pkg/0")),
            ..Default::default()
        };
        let analyses = service(files)
            .analyze(&packages(1), &DetectionOptions::default())
            .await;
        assert!(analyses.is_empty());
    }

    #[tokio::test]
    async fn test_declared_and_file_signals_merge() {
        let files = MemoryFiles::default().with("/pkg/0", "LICENSE", APACHE_TEXT);
        let analyses = service(files)
            .analyze(&packages(1), &DetectionOptions::default())
            .await;
        let ids: Vec<&str> = analyses[0].licenses.iter().map(|l| l.spdx_id.as_str()).collect();
        assert_eq!(ids, vec!["MIT", "Apache-2.0"]);
    }

    #[tokio::test]
    async fn test_compatibility_faults_propagate() {
        let svc = LicenseIntelligenceService::new(
            Arc::new(LicenseDetector::with_defaults()),
            Arc::new(FailingEngine),
        );
        let err = svc
            .generate_legal_risk_report(
                &ProjectInfo {
                    name: "demo".to_string(),
                    version: None,
                },
                &packages(2),
                &DetectionOptions::default(),
                &CompatibilityOptions::default(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, IntelError::Compatibility(_)));

        let mit = BuiltinLicenseStore::new().lookup("MIT").unwrap();
        assert!(svc.check_compatibility(&mit, &mit).is_err());
    }

    #[tokio::test]
    async fn test_validate_policy_is_idempotent() {
        let files = MemoryFiles::default()
            .with("/pkg/0", "LICENSE", MIT_TEXT)
            .with("/pkg/1", "LICENSE", GPL3_TEXT);
        let svc = service(files);
        let policy = LicensePolicy {
            name: "no-copyleft".to_string(),
            prohibited_licenses: Default::default(),
            review_required_licenses: Default::default(),
            allowed_licenses: Default::default(),
            category_rules: vec![CategoryRule {
                category: LicenseCategory::Copyleft,
                action: PolicyAction::Prohibit,
            }],
            risk_tolerance: RiskTolerance {
                maximum_risk_level: crate::models::RiskLevel::VeryHigh,
            },
        };

        let first = svc
            .validate_policy(&packages(2), &policy, &DetectionOptions::default())
            .await;
        let second = svc
            .validate_policy(&packages(2), &policy, &DetectionOptions::default())
            .await;
        assert!(!first.compliant);
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_compatibility_report_over_detected_licenses() {
        let files = MemoryFiles::default().with("/pkg/1", "LICENSE", GPL3_TEXT);
        let mut input = packages(2);
        input[0].license = Some("GPL-2.0-only".to_string());
        let report = service(files)
            .generate_compatibility_report(
                &input,
                &DetectionOptions::default(),
                &CompatibilityOptions::default(),
            )
            .await
            .unwrap();
        // GPL-2.0 (pkg-0) against GPL-3.0 found in pkg-1's files.
        assert_eq!(report.conflicts.len(), 1);
        assert_eq!(report.summary.total_packages, 2);
    }

    #[tokio::test]
    async fn test_compliance_document() {
        let svc = service(MemoryFiles::default());
        let options = DocumentOptions {
            format: DocumentFormat::Markdown,
            ..Default::default()
        };
        let doc = svc
            .generate_compliance_document(&packages(2), &DetectionOptions::default(), &options)
            .await
            .unwrap();
        assert!(doc.contains("## MIT"));
        assert!(doc.contains("pkg-1"));
    }
}
