use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A package whose license is to be determined. Immutable input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Package {
    pub name: String,
    pub version: String,
    /// Declared license expression (e.g. from a manifest), if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license: Option<String>,
    /// Package root on disk, searched for license files.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

impl Package {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            license: None,
            path: None,
        }
    }

    pub fn with_license(mut self, expression: impl Into<String>) -> Self {
        self.license = Some(expression.into());
        self
    }

    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// `name@version`, used to tag errors and log lines.
    pub fn id(&self) -> String {
        format!("{}@{}", self.name, self.version)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LicenseCategory {
    Permissive,
    WeakCopyleft,
    Copyleft,
    Proprietary,
    Custom,
    Unknown,
    PublicDomain,
}

impl std::fmt::Display for LicenseCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LicenseCategory::Permissive => write!(f, "Permissive"),
            LicenseCategory::WeakCopyleft => write!(f, "Weak Copyleft"),
            LicenseCategory::Copyleft => write!(f, "Copyleft"),
            LicenseCategory::Proprietary => write!(f, "Proprietary"),
            LicenseCategory::Custom => write!(f, "Custom"),
            LicenseCategory::Unknown => write!(f, "Unknown"),
            LicenseCategory::PublicDomain => write!(f, "Public Domain"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObligationType {
    Attribution,
    Copyleft,
    DiscloseSource,
    SameLicense,
    PatentGrant,
    NoCommercialUse,
    ShareAlike,
    NoticePreservation,
}

impl std::fmt::Display for ObligationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ObligationType::Attribution => write!(f, "attribution"),
            ObligationType::Copyleft => write!(f, "copyleft"),
            ObligationType::DiscloseSource => write!(f, "disclose_source"),
            ObligationType::SameLicense => write!(f, "same_license"),
            ObligationType::PatentGrant => write!(f, "patent_grant"),
            ObligationType::NoCommercialUse => write!(f, "no_commercial_use"),
            ObligationType::ShareAlike => write!(f, "share_alike"),
            ObligationType::NoticePreservation => write!(f, "notice_preservation"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObligationSeverity {
    Low,
    Medium,
    High,
    Critical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObligationScope {
    Distribution,
    Modifications,
    DerivativeWorks,
    Patents,
    Usage,
}

/// An obligation resolved against the static detail table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Obligation {
    #[serde(rename = "type")]
    pub kind: ObligationType,
    pub description: String,
    pub severity: ObligationSeverity,
    pub scope: ObligationScope,
}

/// A license record, as held by a [`LicenseStore`](crate::license::LicenseStore).
///
/// Detections clone the canonical record and override `confidence`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct License {
    pub spdx_id: String,
    pub name: String,
    pub category: LicenseCategory,
    pub obligations: Vec<ObligationType>,
    pub confidence: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deprecated_ids: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl License {
    pub fn with_confidence(&self, confidence: f64) -> Self {
        License {
            confidence,
            ..self.clone()
        }
    }

    pub fn has_obligation(&self, kind: ObligationType) -> bool {
        self.obligations.contains(&kind)
    }

    pub fn is_deprecated(&self) -> bool {
        self.deprecated_ids
            .as_ref()
            .is_some_and(|ids| !ids.is_empty())
    }
}

/// Ordinal risk tier. Always derived from a weighted score, never assigned directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskLevel {
    VeryLow,
    Low,
    Medium,
    High,
    VeryHigh,
    Critical,
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RiskLevel::VeryLow => write!(f, "VERY_LOW"),
            RiskLevel::Low => write!(f, "LOW"),
            RiskLevel::Medium => write!(f, "MEDIUM"),
            RiskLevel::High => write!(f, "HIGH"),
            RiskLevel::VeryHigh => write!(f, "VERY_HIGH"),
            RiskLevel::Critical => write!(f, "CRITICAL"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetectionMethod {
    Declared,
    FileAnalysis,
    Heuristic,
    Manual,
}

impl std::fmt::Display for DetectionMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DetectionMethod::Declared => write!(f, "declared"),
            DetectionMethod::FileAnalysis => write!(f, "file_analysis"),
            DetectionMethod::Heuristic => write!(f, "heuristic"),
            DetectionMethod::Manual => write!(f, "manual"),
        }
    }
}

/// A candidate license file that fingerprinted to a known license.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LicenseFile {
    pub path: String,
    pub license: String,
    pub confidence: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueType {
    MissingLicense,
    ConflictingLicenses,
    DeprecatedLicense,
    UnrecognizedLicense,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueSeverity {
    Info,
    Warning,
    Error,
    Critical,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    #[serde(rename = "type")]
    pub kind: IssueType,
    pub severity: IssueSeverity,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisMetadata {
    pub analyzed_at: DateTime<Utc>,
    pub scan_duration_ms: u64,
}

/// Per-package detection result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LicenseAnalysis {
    pub package: Package,
    /// Unique by `spdx_id`, in consolidation order.
    pub licenses: Vec<License>,
    pub primary_license: Option<License>,
    pub detection_method: DetectionMethod,
    pub license_files: Vec<LicenseFile>,
    pub copyright_statements: Vec<String>,
    /// Unique by type, first-seen wins.
    pub obligations: Vec<Obligation>,
    pub risk_level: RiskLevel,
    pub issues: Vec<Issue>,
    pub metadata: AnalysisMetadata,
}

impl LicenseAnalysis {
    pub fn has_category(&self, category: LicenseCategory) -> bool {
        self.licenses.iter().any(|l| l.category == category)
    }

    pub fn has_obligation(&self, kind: ObligationType) -> bool {
        self.obligations.iter().any(|o| o.kind == kind)
    }

    pub fn primary_license_id(&self) -> Option<&str> {
        self.primary_license.as_ref().map(|l| l.spdx_id.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_risk_level_total_order() {
        assert!(RiskLevel::VeryLow < RiskLevel::Low);
        assert!(RiskLevel::Low < RiskLevel::Medium);
        assert!(RiskLevel::Medium < RiskLevel::High);
        assert!(RiskLevel::High < RiskLevel::VeryHigh);
        assert!(RiskLevel::VeryHigh < RiskLevel::Critical);
    }

    #[test]
    fn test_serialized_tokens() {
        assert_eq!(
            serde_json::to_string(&LicenseCategory::WeakCopyleft).unwrap(),
            "\"weak_copyleft\""
        );
        assert_eq!(
            serde_json::to_string(&RiskLevel::VeryHigh).unwrap(),
            "\"VERY_HIGH\""
        );
        assert_eq!(
            serde_json::to_string(&DetectionMethod::FileAnalysis).unwrap(),
            "\"file_analysis\""
        );
        assert_eq!(
            serde_json::to_string(&IssueType::MissingLicense).unwrap(),
            "\"missing_license\""
        );
    }

    #[test]
    fn test_package_id() {
        let pkg = Package::new("left-pad", "1.3.0").with_license("MIT");
        assert_eq!(pkg.id(), "left-pad@1.3.0");
        assert_eq!(pkg.license.as_deref(), Some("MIT"));
    }
}
