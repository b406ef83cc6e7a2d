//! Compliance documents and terminal output.
//!
//! - [`text`], [`markdown`], [`html`], [`json`]: compliance documents, one
//!   pure renderer per [`DocumentFormat`].
//! - [`terminal`]: colored summary box and tables for interactive runs.
//!
//! Every document carries exactly one generation timestamp; rendering the
//! same analyses with the same options twice differs only in that line.

pub mod html;
pub mod json;
pub mod markdown;
pub mod terminal;
pub mod text;

use std::collections::BTreeMap;
use std::str::FromStr;

use chrono::{SecondsFormat, Utc};
use serde::Deserialize;

use crate::error::{IntelError, Result};
use crate::models::{License, LicenseAnalysis};

/// Group heading for packages without a primary license.
pub const UNLICENSED_GROUP: &str = "Unlicensed";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub enum DocumentFormat {
    Text,
    Html,
    Markdown,
    Json,
}

impl FromStr for DocumentFormat {
    type Err = IntelError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "text" => Ok(DocumentFormat::Text),
            "html" => Ok(DocumentFormat::Html),
            "markdown" => Ok(DocumentFormat::Markdown),
            "json" => Ok(DocumentFormat::Json),
            other => Err(IntelError::UnsupportedFormat(other.to_string())),
        }
    }
}

impl TryFrom<String> for DocumentFormat {
    type Error = IntelError;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

impl std::fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DocumentFormat::Text => write!(f, "text"),
            DocumentFormat::Html => write!(f, "html"),
            DocumentFormat::Markdown => write!(f, "markdown"),
            DocumentFormat::Json => write!(f, "json"),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DocumentOptions {
    pub format: DocumentFormat,
    pub group_by_license: bool,
    pub include_license_text: bool,
    pub include_copyright: bool,
    pub header: Option<String>,
    pub footer: Option<String>,
    pub title: String,
}

impl Default for DocumentOptions {
    fn default() -> Self {
        Self {
            format: DocumentFormat::Markdown,
            group_by_license: true,
            include_license_text: false,
            include_copyright: true,
            header: None,
            footer: None,
            title: "Third-Party License Notices".to_string(),
        }
    }
}

/// Packages sharing one primary license.
pub struct LicenseGroup<'a> {
    pub heading: String,
    pub license: Option<&'a License>,
    pub analyses: Vec<&'a LicenseAnalysis>,
}

/// Render a compliance document in the format named by `options`.
pub fn render(analyses: &[LicenseAnalysis], options: &DocumentOptions) -> Result<String> {
    let generated_at = Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true);
    match options.format {
        DocumentFormat::Text => Ok(text::render(analyses, options, &generated_at)),
        DocumentFormat::Html => Ok(html::render(analyses, options, &generated_at)),
        DocumentFormat::Markdown => Ok(markdown::render(analyses, options, &generated_at)),
        DocumentFormat::Json => json::render(analyses, options, &generated_at),
    }
}

/// Groups sorted by primary license id, with the unlicensed group last.
/// Packages keep their input order inside a group.
pub fn group_by_primary(analyses: &[LicenseAnalysis]) -> Vec<LicenseGroup<'_>> {
    let mut licensed: BTreeMap<&str, LicenseGroup<'_>> = BTreeMap::new();
    let mut unlicensed = Vec::new();

    for analysis in analyses {
        match &analysis.primary_license {
            Some(license) => licensed
                .entry(license.spdx_id.as_str())
                .or_insert_with(|| LicenseGroup {
                    heading: license.spdx_id.clone(),
                    license: Some(license),
                    analyses: Vec::new(),
                })
                .analyses
                .push(analysis),
            None => unlicensed.push(analysis),
        }
    }

    let mut groups: Vec<LicenseGroup<'_>> = licensed.into_values().collect();
    if !unlicensed.is_empty() {
        groups.push(LicenseGroup {
            heading: UNLICENSED_GROUP.to_string(),
            license: None,
            analyses: unlicensed,
        });
    }
    groups
}

/// Comma-separated license ids of one analysis, or `none`.
pub(crate) fn license_list(analysis: &LicenseAnalysis) -> String {
    if analysis.licenses.is_empty() {
        return "none".to_string();
    }
    analysis
        .licenses
        .iter()
        .map(|l| l.spdx_id.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Full text when known, otherwise the reference URL.
pub(crate) fn license_body(license: &License) -> Option<&str> {
    license.full_text.as_deref().or(license.url.as_deref())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::detector::{DetectionOptions, LicenseDetector};
    use crate::models::Package;

    pub(crate) fn sample() -> Vec<LicenseAnalysis> {
        let detector = LicenseDetector::with_defaults();
        let opts = DetectionOptions::default();
        [
            Package::new("zlib-rs", "0.2.0").with_license("MIT"),
            Package::new("serde", "1.0.0").with_license("Apache-2.0"),
            Package::new("mystery", "0.0.1"),
            Package::new("anyhow", "1.0.80").with_license("MIT"),
        ]
        .iter()
        .map(|p| detector.detect(p, &opts).unwrap())
        .collect()
    }

    /// Drop the timestamp line so two renders can be compared.
    pub(crate) fn without_timestamp(doc: &str) -> String {
        doc.lines()
            .filter(|l| !l.contains("Generated") && !l.contains("generated_at"))
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn test_unsupported_format() {
        let err = "pdf".parse::<DocumentFormat>().unwrap_err();
        assert!(matches!(err, IntelError::UnsupportedFormat(ref f) if f == "pdf"));
        assert_eq!("html".parse::<DocumentFormat>().unwrap(), DocumentFormat::Html);
    }

    #[test]
    fn test_groups_sorted_with_unlicensed_last() {
        let analyses = sample();
        let groups = group_by_primary(&analyses);
        let headings: Vec<&str> = groups.iter().map(|g| g.heading.as_str()).collect();
        assert_eq!(headings, vec!["Apache-2.0", "MIT", "Unlicensed"]);
        let mit: Vec<&str> = groups[1]
            .analyses
            .iter()
            .map(|a| a.package.name.as_str())
            .collect();
        assert_eq!(mit, vec!["zlib-rs", "anyhow"]);
    }

    #[test]
    fn test_every_format_renders_deterministically() {
        let analyses = sample();
        for format in [
            DocumentFormat::Text,
            DocumentFormat::Html,
            DocumentFormat::Markdown,
            DocumentFormat::Json,
        ] {
            for group_by_license in [true, false] {
                let options = DocumentOptions {
                    format,
                    group_by_license,
                    include_license_text: true,
                    ..Default::default()
                };
                let first = render(&analyses, &options).unwrap();
                let second = render(&analyses, &options).unwrap();
                assert_eq!(without_timestamp(&first), without_timestamp(&second));
                let stamps = first
                    .lines()
                    .filter(|l| l.contains("Generated") || l.contains("generated_at"))
                    .count();
                assert_eq!(stamps, 1, "{format} grouped={group_by_license}");
            }
        }
    }

    #[test]
    fn test_options_from_toml() {
        let opts: DocumentOptions = toml::from_str("format = \"html\"\ntitle = \"Notices\"").unwrap();
        assert_eq!(opts.format, DocumentFormat::Html);
        assert!(opts.group_by_license);
        assert!(toml::from_str::<DocumentOptions>("format = \"pdf\"").is_err());
    }
}
