//! JSON notices document.

use serde::Serialize;

use crate::error::Result;
use crate::models::{LicenseAnalysis, LicenseCategory};

use super::{group_by_primary, license_body, DocumentOptions, UNLICENSED_GROUP};

#[derive(Serialize)]
struct JsonDocument<'a> {
    title: &'a str,
    generated_at: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    header: Option<&'a str>,
    total_packages: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    groups: Option<Vec<JsonGroup<'a>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    packages: Option<Vec<JsonPackage<'a>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    footer: Option<&'a str>,
}

#[derive(Serialize)]
struct JsonGroup<'a> {
    license: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    category: Option<LicenseCategory>,
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<&'a str>,
    packages: Vec<JsonPackage<'a>>,
}

#[derive(Serialize)]
struct JsonPackage<'a> {
    name: &'a str,
    version: &'a str,
    licenses: Vec<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    copyright: Option<&'a [String]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    license_texts: Option<Vec<JsonLicenseText<'a>>>,
}

#[derive(Serialize)]
struct JsonLicenseText<'a> {
    license: &'a str,
    text: &'a str,
}

fn package(analysis: &LicenseAnalysis, include_copyright: bool, with_texts: bool) -> JsonPackage<'_> {
    JsonPackage {
        name: &analysis.package.name,
        version: &analysis.package.version,
        licenses: analysis.licenses.iter().map(|l| l.spdx_id.as_str()).collect(),
        copyright: include_copyright.then_some(analysis.copyright_statements.as_slice()),
        license_texts: with_texts.then(|| {
            analysis
                .licenses
                .iter()
                .filter_map(|l| {
                    license_body(l).map(|text| JsonLicenseText {
                        license: &l.spdx_id,
                        text,
                    })
                })
                .collect()
        }),
    }
}

pub fn render(
    analyses: &[LicenseAnalysis],
    options: &DocumentOptions,
    generated_at: &str,
) -> Result<String> {
    let (groups, packages) = if options.group_by_license {
        let groups = group_by_primary(analyses)
            .into_iter()
            .map(|group| JsonGroup {
                license: group
                    .license
                    .map_or(UNLICENSED_GROUP, |l| l.spdx_id.as_str()),
                name: group.license.map(|l| l.name.as_str()),
                category: group.license.map(|l| l.category),
                text: group
                    .license
                    .filter(|_| options.include_license_text)
                    .and_then(license_body),
                packages: group
                    .analyses
                    .iter()
                    .map(|&a| package(a, options.include_copyright, false))
                    .collect(),
            })
            .collect();
        (Some(groups), None)
    } else {
        let packages = analyses
            .iter()
            .map(|a| package(a, options.include_copyright, options.include_license_text))
            .collect();
        (None, Some(packages))
    };

    let doc = JsonDocument {
        title: &options.title,
        generated_at,
        header: options.header.as_deref(),
        total_packages: analyses.len(),
        groups,
        packages,
        footer: options.footer.as_deref(),
    };
    Ok(serde_json::to_string_pretty(&doc)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::tests::sample;

    #[test]
    fn test_grouped_json() {
        let doc = render(&sample(), &DocumentOptions::default(), "2024-01-01T00:00:00Z").unwrap();
        let v: serde_json::Value = serde_json::from_str(&doc).unwrap();
        assert_eq!(v["generated_at"], "2024-01-01T00:00:00Z");
        assert_eq!(v["total_packages"], 4);
        let groups = v["groups"].as_array().unwrap();
        assert_eq!(groups[0]["license"], "Apache-2.0");
        assert_eq!(groups[1]["packages"].as_array().unwrap().len(), 2);
        assert_eq!(groups[2]["license"], "Unlicensed");
        assert!(v.get("packages").is_none());
    }

    #[test]
    fn test_flat_json_with_texts() {
        let options = DocumentOptions {
            group_by_license: false,
            include_license_text: true,
            include_copyright: false,
            ..Default::default()
        };
        let doc = render(&sample(), &options, "2024-01-01T00:00:00Z").unwrap();
        let v: serde_json::Value = serde_json::from_str(&doc).unwrap();
        let first = &v["packages"][0];
        assert_eq!(first["name"], "zlib-rs");
        assert_eq!(first["license_texts"][0]["text"], "https://spdx.org/licenses/MIT.html");
        assert!(first.get("copyright").is_none());
    }
}
