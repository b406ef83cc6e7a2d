//! License compatibility contract and a category-matrix reference engine.
//!
//! The intelligence service never scores compatibility itself; it hands the
//! packages and their analyses to a [`CompatibilityEngine`].

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::models::{License, LicenseAnalysis, LicenseCategory, Package};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompatibilityVerdict {
    Compatible,
    Conditional,
    Unknown,
    Incompatible,
}

impl std::fmt::Display for CompatibilityVerdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CompatibilityVerdict::Compatible => write!(f, "compatible"),
            CompatibilityVerdict::Conditional => write!(f, "conditional"),
            CompatibilityVerdict::Unknown => write!(f, "unknown"),
            CompatibilityVerdict::Incompatible => write!(f, "incompatible"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompatibilityAnalysis {
    pub license_a: String,
    pub license_b: String,
    pub verdict: CompatibilityVerdict,
    pub reason: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CompatibilityOptions {
    /// The combined work is offered as a network service (AGPL exposure).
    pub network_service: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompatibilityConflict {
    pub package_a: String,
    pub license_a: String,
    pub package_b: String,
    pub license_b: String,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompatibilitySummary {
    pub total_packages: usize,
    pub total_licenses: usize,
    pub conflicts: usize,
    pub conditional_pairs: usize,
    /// 0–100.
    pub risk_score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompatibilityReport {
    pub conflicts: Vec<CompatibilityConflict>,
    pub overall_compatibility: CompatibilityVerdict,
    pub summary: CompatibilitySummary,
}

pub trait CompatibilityEngine: Send + Sync {
    fn check_pair(&self, a: &License, b: &License) -> Result<CompatibilityAnalysis>;

    fn report(
        &self,
        packages: &[Package],
        analyses: &[LicenseAnalysis],
        options: &CompatibilityOptions,
    ) -> Result<CompatibilityReport>;
}

const CONFLICT_WEIGHT: f64 = 20.0;
const CONDITIONAL_WEIGHT: f64 = 5.0;

/// Decides compatibility from license categories alone.
#[derive(Debug, Default, Clone, Copy)]
pub struct MatrixCompatibilityEngine;

impl MatrixCompatibilityEngine {
    fn verdict(a: &License, b: &License) -> (CompatibilityVerdict, String) {
        use LicenseCategory::*;

        if a.spdx_id == b.spdx_id {
            return (CompatibilityVerdict::Compatible, "Same license".to_string());
        }

        match (a.category, b.category) {
            (PublicDomain, _) | (_, PublicDomain) | (Permissive, _) | (_, Permissive) => (
                CompatibilityVerdict::Compatible,
                "Permissive terms combine with any license; keep attribution notices".to_string(),
            ),
            (Copyleft, Copyleft) => (
                CompatibilityVerdict::Incompatible,
                format!(
                    "{} and {} each require the combined work to carry their own terms",
                    a.spdx_id, b.spdx_id
                ),
            ),
            (Copyleft, Proprietary) | (Proprietary, Copyleft) => (
                CompatibilityVerdict::Incompatible,
                "Copyleft code cannot be combined with proprietary code".to_string(),
            ),
            (Proprietary, _) | (_, Proprietary) => (
                CompatibilityVerdict::Incompatible,
                "Proprietary terms forbid redistribution alongside reciprocal licenses".to_string(),
            ),
            (Unknown, _) | (_, Unknown) | (Custom, _) | (_, Custom) => (
                CompatibilityVerdict::Unknown,
                "License terms are not classified; manual review required".to_string(),
            ),
            (Copyleft, WeakCopyleft) | (WeakCopyleft, Copyleft) => (
                CompatibilityVerdict::Conditional,
                "Weak-copyleft code may be used in copyleft works; the result inherits the copyleft license"
                    .to_string(),
            ),
            _ => (
                CompatibilityVerdict::Conditional,
                "Modifications to the weak-copyleft components must be disclosed".to_string(),
            ),
        }
    }

    fn is_network_copyleft(license: &License) -> bool {
        license.spdx_id.contains("AGPL")
    }
}

impl CompatibilityEngine for MatrixCompatibilityEngine {
    fn check_pair(&self, a: &License, b: &License) -> Result<CompatibilityAnalysis> {
        let (verdict, reason) = Self::verdict(a, b);
        Ok(CompatibilityAnalysis {
            license_a: a.spdx_id.clone(),
            license_b: b.spdx_id.clone(),
            verdict,
            reason,
        })
    }

    fn report(
        &self,
        packages: &[Package],
        analyses: &[LicenseAnalysis],
        options: &CompatibilityOptions,
    ) -> Result<CompatibilityReport> {
        let mut conflicts = Vec::new();
        let mut seen_pairs: IndexSet<(String, String)> = IndexSet::new();
        let mut conditional_pairs = 0;
        let mut any_unknown = false;

        for (i, left) in analyses.iter().enumerate() {
            for right in &analyses[i + 1..] {
                for a in &left.licenses {
                    for b in &right.licenses {
                        let key = if a.spdx_id <= b.spdx_id {
                            (a.spdx_id.clone(), b.spdx_id.clone())
                        } else {
                            (b.spdx_id.clone(), a.spdx_id.clone())
                        };
                        if a.spdx_id == b.spdx_id || !seen_pairs.insert(key) {
                            continue;
                        }

                        let (mut verdict, mut reason) = Self::verdict(a, b);
                        if options.network_service
                            && verdict != CompatibilityVerdict::Incompatible
                            && (Self::is_network_copyleft(a) || Self::is_network_copyleft(b))
                            && matches!(
                                (a.category, b.category),
                                (_, LicenseCategory::Unknown | LicenseCategory::Custom)
                                    | (LicenseCategory::Unknown | LicenseCategory::Custom, _)
                            )
                        {
                            verdict = CompatibilityVerdict::Incompatible;
                            reason = "AGPL code in a network service requires disclosing the \
                                      source of the entire service"
                                .to_string();
                        }

                        match verdict {
                            CompatibilityVerdict::Incompatible => {
                                conflicts.push(CompatibilityConflict {
                                    package_a: left.package.id(),
                                    license_a: a.spdx_id.clone(),
                                    package_b: right.package.id(),
                                    license_b: b.spdx_id.clone(),
                                    reason,
                                });
                            }
                            CompatibilityVerdict::Conditional => conditional_pairs += 1,
                            CompatibilityVerdict::Unknown => any_unknown = true,
                            CompatibilityVerdict::Compatible => {}
                        }
                    }
                }
            }
        }

        let overall_compatibility = if !conflicts.is_empty() {
            CompatibilityVerdict::Incompatible
        } else if conditional_pairs > 0 {
            CompatibilityVerdict::Conditional
        } else if any_unknown {
            CompatibilityVerdict::Unknown
        } else {
            CompatibilityVerdict::Compatible
        };

        let total_licenses = analyses
            .iter()
            .flat_map(|a| a.licenses.iter().map(|l| l.spdx_id.as_str()))
            .collect::<IndexSet<_>>()
            .len();

        let risk_score = (conflicts.len() as f64 * CONFLICT_WEIGHT
            + conditional_pairs as f64 * CONDITIONAL_WEIGHT)
            .min(100.0);

        Ok(CompatibilityReport {
            summary: CompatibilitySummary {
                total_packages: packages.len(),
                total_licenses,
                conflicts: conflicts.len(),
                conditional_pairs,
                risk_score,
            },
            conflicts,
            overall_compatibility,
        })
    }
}
