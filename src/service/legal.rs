//! Project-level legal risk assembly over finished analyses.

use chrono::{DateTime, Utc};
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

use crate::compatibility::{CompatibilityReport, CompatibilityVerdict};
use crate::models::{License, LicenseAnalysis, LicenseCategory, ObligationType, RiskLevel};
use crate::risk::{level_weight, project_risk_level};

const CONFLICT_FACTOR_WEIGHT: u32 = 20;
const COPYLEFT_FACTOR_WEIGHT: u32 = 10;
const UNLICENSED_FACTOR_WEIGHT: u32 = 15;
const HOURS_PER_REVIEW_SCOPE: u32 = 4;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectInfo {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskCategory {
    LicenseCompatibility,
    Compliance,
    Governance,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Impact {
    Low,
    Medium,
    High,
    Critical,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskFactor {
    pub category: RiskCategory,
    pub description: String,
    pub impact: Impact,
    pub weight: u32,
    pub affected_packages: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JurisdictionRisk {
    pub jurisdiction: String,
    pub risk_level: RiskLevel,
    pub description: String,
    pub licenses: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatentRisk {
    pub risk_level: RiskLevel,
    pub description: String,
    pub licenses: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequirementKind {
    Documentation,
    SourceDisclosure,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComplianceRequirement {
    pub kind: RequirementKind,
    pub obligation: ObligationType,
    pub description: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewUrgency {
    Low,
    Medium,
    High,
    Urgent,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegalReview {
    pub required: bool,
    pub urgency: ReviewUrgency,
    pub scope: Vec<String>,
    pub estimated_hours: u32,
}

impl LegalReview {
    fn not_required() -> Self {
        Self {
            required: false,
            urgency: ReviewUrgency::Low,
            scope: Vec::new(),
            estimated_hours: 0,
        }
    }

    /// Mark review required, raising (never lowering) urgency.
    fn escalate(&mut self, urgency: ReviewUrgency, scope: &str) {
        self.required = true;
        self.urgency = self.urgency.max(urgency);
        if !self.scope.iter().any(|s| s == scope) {
            self.scope.push(scope.to_string());
        }
        self.estimated_hours = HOURS_PER_REVIEW_SCOPE * self.scope.len() as u32;
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegalRiskReport {
    pub project: ProjectInfo,
    pub generated_at: DateTime<Utc>,
    pub total_packages: usize,
    pub overall_risk: RiskLevel,
    /// 0–100.
    pub risk_score: u32,
    pub compatibility: CompatibilityVerdict,
    pub risk_factors: Vec<RiskFactor>,
    pub jurisdiction_risks: Vec<JurisdictionRisk>,
    pub patent_risks: Vec<PatentRisk>,
    pub compliance_requirements: Vec<ComplianceRequirement>,
    pub legal_review: LegalReview,
}

/// Mean per-analysis weight plus the compatibility risk, rounded and clamped.
/// An empty analysis list contributes a mean of zero.
fn project_score(analyses: &[LicenseAnalysis], compatibility: &CompatibilityReport) -> u32 {
    let mean = if analyses.is_empty() {
        0.0
    } else {
        analyses.iter().map(|a| level_weight(a.risk_level)).sum::<f64>() / analyses.len() as f64
    };
    (mean + compatibility.summary.risk_score).round().clamp(0.0, 100.0) as u32
}

fn package_names<'a>(analyses: impl Iterator<Item = &'a LicenseAnalysis>) -> Vec<String> {
    analyses.map(|a| a.package.id()).collect()
}

fn risk_factors(analyses: &[LicenseAnalysis], compatibility: &CompatibilityReport) -> Vec<RiskFactor> {
    let mut factors = Vec::new();

    let conflicts = &compatibility.conflicts;
    if !conflicts.is_empty() {
        let affected: IndexSet<String> = conflicts
            .iter()
            .flat_map(|c| [c.package_a.clone(), c.package_b.clone()])
            .collect();
        factors.push(RiskFactor {
            category: RiskCategory::LicenseCompatibility,
            description: format!("{} license compatibility conflict(s)", conflicts.len()),
            impact: Impact::Critical,
            weight: CONFLICT_FACTOR_WEIGHT * conflicts.len() as u32,
            affected_packages: affected.into_iter().collect(),
        });
    }

    let copyleft: Vec<&LicenseAnalysis> = analyses
        .iter()
        .filter(|a| a.has_category(LicenseCategory::Copyleft))
        .collect();
    if !copyleft.is_empty() {
        factors.push(RiskFactor {
            category: RiskCategory::Compliance,
            description: format!("{} package(s) under copyleft licenses", copyleft.len()),
            impact: Impact::High,
            weight: COPYLEFT_FACTOR_WEIGHT * copyleft.len() as u32,
            affected_packages: package_names(copyleft.into_iter()),
        });
    }

    let unlicensed: Vec<&LicenseAnalysis> =
        analyses.iter().filter(|a| a.licenses.is_empty()).collect();
    if !unlicensed.is_empty() {
        factors.push(RiskFactor {
            category: RiskCategory::Governance,
            description: format!("{} package(s) without a detectable license", unlicensed.len()),
            impact: Impact::High,
            weight: UNLICENSED_FACTOR_WEIGHT * unlicensed.len() as u32,
            affected_packages: package_names(unlicensed.into_iter()),
        });
    }

    factors
}

fn licenses_where(analyses: &[LicenseAnalysis], pred: impl Fn(&License) -> bool) -> Vec<String> {
    analyses
        .iter()
        .flat_map(|a| a.licenses.iter())
        .filter(|&l| pred(l))
        .map(|l| l.spdx_id.clone())
        .collect::<IndexSet<_>>()
        .into_iter()
        .collect()
}

fn jurisdiction_risks(analyses: &[LicenseAnalysis]) -> Vec<JurisdictionRisk> {
    let agpl = licenses_where(analyses, |l| l.spdx_id.contains("AGPL"));
    if agpl.is_empty() {
        return Vec::new();
    }
    vec![JurisdictionRisk {
        jurisdiction: "Global".to_string(),
        risk_level: RiskLevel::High,
        description: "Network copyleft: source must be offered to users interacting with the \
                      software over a network"
            .to_string(),
        licenses: agpl,
    }]
}

fn patent_risks(analyses: &[LicenseAnalysis]) -> Vec<PatentRisk> {
    let granting = licenses_where(analyses, |l| l.has_obligation(ObligationType::PatentGrant));
    if granting.is_empty() {
        return Vec::new();
    }
    vec![PatentRisk {
        risk_level: RiskLevel::Medium,
        description: "Patent grants terminate on patent litigation against contributors"
            .to_string(),
        licenses: granting,
    }]
}

fn compliance_requirements(analyses: &[LicenseAnalysis]) -> Vec<ComplianceRequirement> {
    let mut requirements = Vec::new();

    if analyses
        .iter()
        .any(|a| a.has_obligation(ObligationType::Attribution))
    {
        requirements.push(ComplianceRequirement {
            kind: RequirementKind::Documentation,
            obligation: ObligationType::Attribution,
            description: "Ship third-party attribution notices with every distribution"
                .to_string(),
        });
    }

    if analyses
        .iter()
        .any(|a| a.has_obligation(ObligationType::DiscloseSource))
    {
        requirements.push(ComplianceRequirement {
            kind: RequirementKind::SourceDisclosure,
            obligation: ObligationType::DiscloseSource,
            description: "Establish a procedure for providing corresponding source code"
                .to_string(),
        });
    }

    requirements
}

fn legal_review(overall_risk: RiskLevel, factors: &[RiskFactor]) -> LegalReview {
    let mut review = LegalReview::not_required();

    if overall_risk == RiskLevel::Critical || factors.iter().any(|f| f.impact == Impact::Critical) {
        review.escalate(ReviewUrgency::Urgent, "Critical risk mitigation");
    }
    if factors
        .iter()
        .any(|f| f.category == RiskCategory::LicenseCompatibility)
    {
        review.escalate(ReviewUrgency::High, "License compatibility analysis");
    }
    if matches!(overall_risk, RiskLevel::High | RiskLevel::VeryHigh) {
        review.escalate(ReviewUrgency::Medium, "General license compliance review");
    }

    review
}

/// Assemble the project legal risk report. Pure over its inputs apart from
/// the `generated_at` timestamp.
pub fn assess_legal_risk(
    project: &ProjectInfo,
    analyses: &[LicenseAnalysis],
    compatibility: &CompatibilityReport,
) -> LegalRiskReport {
    let risk_score = project_score(analyses, compatibility);
    let overall_risk = project_risk_level(risk_score);
    let risk_factors = risk_factors(analyses, compatibility);
    let legal_review = legal_review(overall_risk, &risk_factors);

    LegalRiskReport {
        project: project.clone(),
        generated_at: Utc::now(),
        total_packages: analyses.len(),
        overall_risk,
        risk_score,
        compatibility: compatibility.overall_compatibility,
        jurisdiction_risks: jurisdiction_risks(analyses),
        patent_risks: patent_risks(analyses),
        compliance_requirements: compliance_requirements(analyses),
        risk_factors,
        legal_review,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compatibility::{CompatibilityEngine, CompatibilityOptions, MatrixCompatibilityEngine};
    use crate::detector::{DetectionOptions, LicenseDetector};
    use crate::models::Package;

    fn analyze(packages: &[Package]) -> Vec<LicenseAnalysis> {
        let detector = LicenseDetector::with_defaults();
        packages
            .iter()
            .map(|p| detector.detect(p, &DetectionOptions::default()).unwrap())
            .collect()
    }

    fn assess(packages: &[Package]) -> LegalRiskReport {
        let analyses = analyze(packages);
        let compat = MatrixCompatibilityEngine
            .report(packages, &analyses, &CompatibilityOptions::default())
            .unwrap();
        assess_legal_risk(
            &ProjectInfo {
                name: "demo".to_string(),
                version: None,
            },
            &analyses,
            &compat,
        )
    }

    #[test]
    fn test_permissive_project_needs_no_review() {
        let report = assess(&[
            Package::new("a", "1.0.0").with_license("MIT"),
            Package::new("b", "1.0.0").with_license("ISC"),
        ]);
        // Both LOW (weight 10) → mean 10, no compatibility risk.
        assert_eq!(report.risk_score, 10);
        assert_eq!(report.overall_risk, RiskLevel::Low);
        assert!(report.risk_factors.is_empty());
        assert!(!report.legal_review.required);
        assert_eq!(report.legal_review.estimated_hours, 0);
        assert_eq!(report.compliance_requirements.len(), 1);
        assert_eq!(
            report.compliance_requirements[0].kind,
            RequirementKind::Documentation
        );
        assert!(report.patent_risks.is_empty());
    }

    #[test]
    fn test_agpl_packages_add_one_global_jurisdiction_risk() {
        let report = assess(&[
            Package::new("a", "1.0.0").with_license("AGPL-3.0-only"),
            Package::new("b", "1.0.0").with_license("AGPL-3.0-or-later"),
        ]);
        assert_eq!(report.jurisdiction_risks.len(), 1);
        assert_eq!(report.jurisdiction_risks[0].jurisdiction, "Global");
        assert_eq!(report.jurisdiction_risks[0].risk_level, RiskLevel::High);
        assert_eq!(report.patent_risks.len(), 1);
        assert_eq!(report.patent_risks[0].risk_level, RiskLevel::Medium);
    }

    #[test]
    fn test_conflicts_escalate_review_to_urgent() {
        let report = assess(&[
            Package::new("a", "1.0.0").with_license("GPL-2.0-only"),
            Package::new("b", "1.0.0").with_license("GPL-3.0-only"),
            Package::new("c", "1.0.0"),
        ]);
        let categories: Vec<RiskCategory> = report.risk_factors.iter().map(|f| f.category).collect();
        assert_eq!(
            categories,
            vec![
                RiskCategory::LicenseCompatibility,
                RiskCategory::Compliance,
                RiskCategory::Governance
            ]
        );
        assert_eq!(report.risk_factors[0].weight, 20);
        assert_eq!(report.risk_factors[1].weight, 20);
        assert_eq!(report.risk_factors[2].weight, 15);

        // (80 + 80 + 0) / 3 + 20 = 73.33 → 73
        assert_eq!(report.risk_score, 73);
        assert_eq!(report.overall_risk, RiskLevel::VeryHigh);

        let review = &report.legal_review;
        assert!(review.required);
        assert_eq!(review.urgency, ReviewUrgency::Urgent);
        assert_eq!(
            review.scope,
            vec![
                "Critical risk mitigation",
                "License compatibility analysis",
                "General license compliance review"
            ]
        );
        assert_eq!(review.estimated_hours, 12);

        let kinds: Vec<RequirementKind> =
            report.compliance_requirements.iter().map(|r| r.kind).collect();
        assert_eq!(
            kinds,
            vec![RequirementKind::Documentation, RequirementKind::SourceDisclosure]
        );
    }

    #[test]
    fn test_critical_project_without_critical_factor_is_urgent() {
        // GPL-3.0-only alone is CRITICAL → weight 80, no conflicts.
        let report = assess(&[Package::new("a", "1.0.0").with_license("GPL-3.0-only")]);
        assert_eq!(report.risk_score, 80);
        assert_eq!(report.overall_risk, RiskLevel::Critical);
        let factors: Vec<(RiskCategory, Impact)> =
            report.risk_factors.iter().map(|f| (f.category, f.impact)).collect();
        assert_eq!(factors, vec![(RiskCategory::Compliance, Impact::High)]);

        let review = &report.legal_review;
        assert!(review.required);
        assert_eq!(review.urgency, ReviewUrgency::Urgent);
        assert_eq!(review.scope, vec!["Critical risk mitigation"]);
        assert_eq!(review.estimated_hours, 4);
    }

    #[test]
    fn test_high_risk_only_needs_medium_review() {
        // LGPL-2.1-only alone is HIGH (3 + 1 + 5 + 5 = 14) → weight 40.
        let report = assess(&[Package::new("a", "1.0.0").with_license("LGPL-2.1-only")]);
        assert_eq!(report.risk_score, 40);
        assert_eq!(report.overall_risk, RiskLevel::High);
        assert_eq!(report.legal_review.urgency, ReviewUrgency::Medium);
        assert_eq!(report.legal_review.scope, vec!["General license compliance review"]);
        assert_eq!(report.legal_review.estimated_hours, 4);
    }

    #[test]
    fn test_empty_analyses_score_zero() {
        let report = assess(&[]);
        assert_eq!(report.risk_score, 0);
        assert_eq!(report.overall_risk, RiskLevel::VeryLow);
        assert_eq!(report.total_packages, 0);
    }

    #[test]
    fn test_score_is_clamped() {
        let analyses = analyze(&[Package::new("a", "1.0.0").with_license("AGPL-3.0-only")]);
        let mut compat = MatrixCompatibilityEngine
            .report(&[], &analyses, &CompatibilityOptions::default())
            .unwrap();
        compat.summary.risk_score = 100.0;
        let report = assess_legal_risk(
            &ProjectInfo {
                name: "demo".to_string(),
                version: None,
            },
            &analyses,
            &compat,
        );
        assert_eq!(report.risk_score, 100);
        assert_eq!(report.overall_risk, RiskLevel::Critical);
    }
}
