use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::models::{LicenseAnalysis, LicenseCategory, RiskLevel};

/// What a category rule does with a matching license.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PolicyAction {
    Allow,
    Review,
    Prohibit,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryRule {
    pub category: LicenseCategory,
    pub action: PolicyAction,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskTolerance {
    pub maximum_risk_level: RiskLevel,
}

/// Caller-supplied license policy. No default policy exists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LicensePolicy {
    pub name: String,
    #[serde(default)]
    pub prohibited_licenses: HashSet<String>,
    #[serde(default)]
    pub review_required_licenses: HashSet<String>,
    #[serde(default)]
    pub allowed_licenses: HashSet<String>,
    #[serde(default)]
    pub category_rules: Vec<CategoryRule>,
    pub risk_tolerance: RiskTolerance,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViolationSeverity {
    Warning,
    Error,
    Critical,
}

impl std::fmt::Display for ViolationSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ViolationSeverity::Warning => write!(f, "warning"),
            ViolationSeverity::Error => write!(f, "error"),
            ViolationSeverity::Critical => write!(f, "critical"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationRule {
    ProhibitedLicense,
    ReviewRequired,
    ProhibitedCategory,
    RiskToleranceExceeded,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Violation {
    pub package: String,
    pub version: String,
    pub license: String,
    pub rule: ViolationRule,
    pub severity: ViolationSeverity,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicyValidation {
    pub policy: String,
    pub compliant: bool,
    pub violations: Vec<Violation>,
}

impl LicensePolicy {
    fn prohibits_category(&self, category: LicenseCategory) -> bool {
        self.category_rules
            .iter()
            .any(|r| r.category == category && r.action == PolicyAction::Prohibit)
    }
}

/// Evaluate every (analysis, license) pair against the policy.
///
/// Rules run in a fixed order and all of them may fire for the same pair.
pub fn evaluate(analyses: &[LicenseAnalysis], policy: &LicensePolicy) -> PolicyValidation {
    let mut violations = Vec::new();

    for analysis in analyses {
        let package = &analysis.package;
        for license in &analysis.licenses {
            let id = license.spdx_id.as_str();
            let mut push = |rule, severity, message: String| {
                violations.push(Violation {
                    package: package.name.clone(),
                    version: package.version.clone(),
                    license: id.to_string(),
                    rule,
                    severity,
                    message,
                });
            };

            if policy.prohibited_licenses.contains(id) {
                push(
                    ViolationRule::ProhibitedLicense,
                    ViolationSeverity::Critical,
                    format!("License '{}' is prohibited by policy '{}'", id, policy.name),
                );
            }

            if policy.review_required_licenses.contains(id) && !policy.allowed_licenses.contains(id)
            {
                push(
                    ViolationRule::ReviewRequired,
                    ViolationSeverity::Warning,
                    format!("License '{}' requires legal review", id),
                );
            }

            if policy.prohibits_category(license.category) {
                push(
                    ViolationRule::ProhibitedCategory,
                    ViolationSeverity::Error,
                    format!("{} licenses are prohibited ({})", license.category, id),
                );
            }

            if analysis.risk_level == RiskLevel::Critical
                && policy.risk_tolerance.maximum_risk_level != RiskLevel::Critical
            {
                push(
                    ViolationRule::RiskToleranceExceeded,
                    ViolationSeverity::Critical,
                    format!(
                        "Risk level {} exceeds tolerance {}",
                        analysis.risk_level, policy.risk_tolerance.maximum_risk_level
                    ),
                );
            }
        }
    }

    PolicyValidation {
        policy: policy.name.clone(),
        compliant: violations.is_empty(),
        violations,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detector::{DetectionOptions, LicenseDetector};
    use crate::models::Package;

    fn analyze(name: &str, license: &str) -> LicenseAnalysis {
        LicenseDetector::with_defaults()
            .detect(
                &Package::new(name, "1.0.0").with_license(license),
                &DetectionOptions::default(),
            )
            .unwrap()
    }

    fn policy() -> LicensePolicy {
        LicensePolicy {
            name: "corporate".to_string(),
            prohibited_licenses: ["AGPL-3.0-only".to_string()].into_iter().collect(),
            review_required_licenses: ["LGPL-2.1-only".to_string(), "MPL-2.0".to_string()]
                .into_iter()
                .collect(),
            allowed_licenses: ["MPL-2.0".to_string()].into_iter().collect(),
            category_rules: vec![CategoryRule {
                category: LicenseCategory::Proprietary,
                action: PolicyAction::Prohibit,
            }],
            risk_tolerance: RiskTolerance {
                maximum_risk_level: RiskLevel::High,
            },
        }
    }

    #[test]
    fn test_clean_project_is_compliant() {
        let result = evaluate(&[analyze("a", "MIT"), analyze("b", "MPL-2.0")], &policy());
        assert!(result.compliant);
        assert!(result.violations.is_empty());
    }

    #[test]
    fn test_rules_fire_independently_in_order() {
        // AGPL alone scores critical, so both the prohibited and the
        // tolerance rule fire for the same pair.
        let result = evaluate(&[analyze("a", "AGPL-3.0-only")], &policy());
        assert!(!result.compliant);
        let rules: Vec<ViolationRule> = result.violations.iter().map(|v| v.rule).collect();
        assert_eq!(
            rules,
            vec![
                ViolationRule::ProhibitedLicense,
                ViolationRule::RiskToleranceExceeded
            ]
        );
        assert!(result
            .violations
            .iter()
            .all(|v| v.severity == ViolationSeverity::Critical));
    }

    #[test]
    fn test_review_required_unless_allowed() {
        let result = evaluate(&[analyze("a", "LGPL-2.1-only")], &policy());
        assert_eq!(result.violations.len(), 1);
        assert_eq!(result.violations[0].rule, ViolationRule::ReviewRequired);
        assert_eq!(result.violations[0].severity, ViolationSeverity::Warning);
    }

    #[test]
    fn test_category_rule_prohibit() {
        let result = evaluate(&[analyze("a", "LicenseRef-Proprietary")], &policy());
        assert_eq!(result.violations.len(), 1);
        assert_eq!(result.violations[0].rule, ViolationRule::ProhibitedCategory);
        assert_eq!(result.violations[0].severity, ViolationSeverity::Error);
    }

    #[test]
    fn test_critical_tolerance_suppresses_risk_rule() {
        let mut p = policy();
        p.prohibited_licenses.clear();
        p.risk_tolerance.maximum_risk_level = RiskLevel::Critical;
        let result = evaluate(&[analyze("a", "AGPL-3.0-only")], &p);
        assert!(result.compliant);
    }

    #[test]
    fn test_evaluation_is_idempotent() {
        let analyses = vec![
            analyze("a", "AGPL-3.0-only"),
            analyze("b", "LGPL-2.1-only"),
            analyze("c", "LicenseRef-Proprietary"),
        ];
        let p = policy();
        assert_eq!(evaluate(&analyses, &p), evaluate(&analyses, &p));
    }

    #[test]
    fn test_policy_from_toml() {
        let p: LicensePolicy = toml::from_str(
            r#"
name = "strict"
prohibited_licenses = ["GPL-3.0-only"]
category_rules = [{ category = "weak_copyleft", action = "review" }]
risk_tolerance = { maximum_risk_level = "VERY_HIGH" }
"#,
        )
        .unwrap();
        assert!(p.prohibited_licenses.contains("GPL-3.0-only"));
        assert!(p.allowed_licenses.is_empty());
        assert_eq!(p.category_rules[0].action, PolicyAction::Review);
        assert_eq!(p.risk_tolerance.maximum_risk_level, RiskLevel::VeryHigh);
    }
}
