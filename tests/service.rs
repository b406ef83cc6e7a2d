use std::fs;
use std::path::Path;

use license_intel::compatibility::{CompatibilityOptions, CompatibilityVerdict};
use license_intel::detector::DetectionOptions;
use license_intel::inventory;
use license_intel::models::{DetectionMethod, IssueType, RiskLevel};
use license_intel::report::{DocumentFormat, DocumentOptions};
use license_intel::service::{LicenseIntelligenceService, ProjectInfo};

const MIT: &str = "MIT License\n\nCopyright (c) 2019 Sindre Sorhus\n\n\
    Permission is hereby granted, free of charge, to any person obtaining a copy";
const GPL2: &str = "GNU GENERAL PUBLIC LICENSE\nVersion 2, June 1991";
const GPL3: &str = "GNU GENERAL PUBLIC LICENSE\nVersion 3, 29 June 2007";

fn install(root: &Path, name: &str, license_file: &str) {
    let dir = root.join("node_modules").join(name);
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join("LICENSE"), license_file).unwrap();
}

fn npm_project() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("package-lock.json"),
        r#"{
            "lockfileVersion": 3,
            "packages": {
                "": {"name": "app"},
                "node_modules/chalk": {"version": "5.3.0", "license": "MIT"},
                "node_modules/gpl-two": {"version": "1.0.0"},
                "node_modules/gpl-three": {"version": "2.0.0"},
                "node_modules/mystery": {"version": "0.0.1"}
            }
        }"#,
    )
    .unwrap();
    install(dir.path(), "chalk", MIT);
    install(dir.path(), "gpl-two", GPL2);
    install(dir.path(), "gpl-three", GPL3);
    fs::create_dir_all(dir.path().join("node_modules/mystery")).unwrap();
    dir
}

#[tokio::test]
async fn npm_project_end_to_end() {
    let dir = npm_project();
    let packages = inventory::load(dir.path()).unwrap();
    assert_eq!(packages.len(), 4);

    let service = LicenseIntelligenceService::with_defaults();
    let analyses = service.analyze(&packages, &DetectionOptions::default()).await;
    assert_eq!(analyses.len(), 4);

    let chalk = analyses.iter().find(|a| a.package.name == "chalk").unwrap();
    assert_eq!(chalk.primary_license_id(), Some("MIT"));
    assert_eq!(chalk.detection_method, DetectionMethod::Declared);
    assert_eq!(chalk.copyright_statements, vec!["Copyright (c) 2019 Sindre Sorhus"]);

    let gpl = analyses.iter().find(|a| a.package.name == "gpl-three").unwrap();
    assert_eq!(gpl.detection_method, DetectionMethod::FileAnalysis);

    let mystery = analyses.iter().find(|a| a.package.name == "mystery").unwrap();
    assert!(mystery.licenses.is_empty());
    assert_eq!(mystery.issues[0].kind, IssueType::MissingLicense);

    let report = service
        .legal_risk_report_for(
            &ProjectInfo {
                name: "app".to_string(),
                version: Some("1.0.0".to_string()),
            },
            &packages,
            &analyses,
            &CompatibilityOptions::default(),
        )
        .unwrap();
    assert_eq!(report.compatibility, CompatibilityVerdict::Incompatible);
    assert_eq!(report.total_packages, 4);
    assert!(report.legal_review.required);
    assert!(report.overall_risk >= RiskLevel::Medium);
}

#[tokio::test]
async fn compliance_document_from_manifest() {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir_all(dir.path().join("vendor/left-pad")).unwrap();
    fs::write(dir.path().join("vendor/left-pad/LICENSE"), MIT).unwrap();
    let manifest = dir.path().join("packages.toml");
    fs::write(
        &manifest,
        r#"
[[package]]
name = "left-pad"
version = "1.3.0"
path = "vendor/left-pad"

[[package]]
name = "serde"
version = "1.0.150"
license = "MIT OR Apache-2.0"
"#,
    )
    .unwrap();

    let packages = inventory::load(&manifest).unwrap();
    let service = LicenseIntelligenceService::with_defaults();
    let options = DocumentOptions {
        format: DocumentFormat::Text,
        ..Default::default()
    };
    let doc = service
        .generate_compliance_document(&packages, &DetectionOptions::default(), &options)
        .await
        .unwrap();

    assert!(doc.contains("left-pad@1.3.0"));
    assert!(doc.contains("serde@1.0.150"));
    assert!(doc.contains("Copyright (c) 2019 Sindre Sorhus"));
    assert_eq!(doc.matches("Generated: ").count(), 1);
}
