//! Weight tables and score → [`RiskLevel`] breakpoints.
//!
//! Two scales share the same shape: the per-license scale sums category and
//! obligation weights, the project scale works on a 0–100 normalized score.
//! Lower bounds are inclusive.

use crate::models::{LicenseCategory, ObligationSeverity, RiskLevel};

/// Per-license breakpoints, highest first.
const LICENSE_BREAKPOINTS: [(u32, RiskLevel); 5] = [
    (20, RiskLevel::Critical),
    (15, RiskLevel::VeryHigh),
    (10, RiskLevel::High),
    (5, RiskLevel::Medium),
    (2, RiskLevel::Low),
];

/// Project breakpoints on the 0–100 scale, highest first.
const PROJECT_BREAKPOINTS: [(u32, RiskLevel); 5] = [
    (80, RiskLevel::Critical),
    (60, RiskLevel::VeryHigh),
    (40, RiskLevel::High),
    (20, RiskLevel::Medium),
    (10, RiskLevel::Low),
];

pub fn category_weight(category: LicenseCategory) -> u32 {
    match category {
        LicenseCategory::PublicDomain => 0,
        LicenseCategory::Permissive => 1,
        LicenseCategory::WeakCopyleft => 3,
        LicenseCategory::Copyleft => 5,
        LicenseCategory::Custom => 7,
        LicenseCategory::Unknown => 8,
        LicenseCategory::Proprietary => 10,
    }
}

pub fn severity_weight(severity: ObligationSeverity) -> u32 {
    match severity {
        ObligationSeverity::Low => 1,
        ObligationSeverity::Medium => 2,
        ObligationSeverity::High => 5,
        ObligationSeverity::Critical => 10,
    }
}

fn level_for(score: u32, table: &[(u32, RiskLevel)]) -> RiskLevel {
    table
        .iter()
        .find(|(floor, _)| score >= *floor)
        .map(|(_, level)| *level)
        .unwrap_or(RiskLevel::VeryLow)
}

/// Map a summed per-license weight to a risk tier.
pub fn license_risk_level(score: u32) -> RiskLevel {
    level_for(score, &LICENSE_BREAKPOINTS)
}

/// Map a normalized 0–100 project score to a risk tier.
pub fn project_risk_level(score: u32) -> RiskLevel {
    level_for(score, &PROJECT_BREAKPOINTS)
}

/// Weight an analysis contributes to the project mean: the lower bound of the
/// matching project-level tier.
pub fn level_weight(level: RiskLevel) -> f64 {
    match level {
        RiskLevel::VeryLow => 0.0,
        RiskLevel::Low => 10.0,
        RiskLevel::Medium => 20.0,
        RiskLevel::High => 40.0,
        RiskLevel::VeryHigh => 60.0,
        RiskLevel::Critical => 80.0,
    }
}
