//! Markdown notices: one section per license, or one table row per package.

use indexmap::IndexSet;

use crate::models::LicenseAnalysis;

use super::{group_by_primary, license_body, license_list, DocumentOptions};

pub fn render(analyses: &[LicenseAnalysis], options: &DocumentOptions, generated_at: &str) -> String {
    let mut md = String::with_capacity(4096);

    md.push_str(&format!("# {}\n\n", options.title));
    md.push_str(&format!("_Generated: {}_\n\n", generated_at));

    if let Some(header) = &options.header {
        md.push_str(header);
        md.push_str("\n\n");
    }

    md.push_str(&format!("**Packages:** {}\n\n", analyses.len()));

    if options.group_by_license {
        for group in group_by_primary(analyses) {
            md.push_str(&format!("## {}\n\n", group.heading));
            if let Some(license) = group.license {
                md.push_str(&format!("{} · {}\n\n", license.name, license.category));
            }
            for analysis in &group.analyses {
                md.push_str(&format!("- `{}`\n", analysis.package.id()));
                if options.include_copyright {
                    for statement in &analysis.copyright_statements {
                        md.push_str(&format!("  - {}\n", statement));
                    }
                }
            }
            md.push('\n');
            if options.include_license_text {
                if let Some(body) = group.license.and_then(license_body) {
                    md.push_str("```text\n");
                    md.push_str(body);
                    md.push_str("\n```\n\n");
                }
            }
        }
    } else {
        md.push_str("| Package | Version | Licenses | Risk |\n|---|---|---|---|\n");
        for analysis in analyses {
            md.push_str(&format!(
                "| {} | {} | {} | {} |\n",
                escape_cell(&analysis.package.name),
                escape_cell(&analysis.package.version),
                license_list(analysis),
                analysis.risk_level
            ));
        }
        md.push('\n');

        if options.include_copyright {
            let with_notices = analyses
                .iter()
                .filter(|a| !a.copyright_statements.is_empty());
            for analysis in with_notices {
                md.push_str(&format!("### {}\n\n", analysis.package.id()));
                for statement in &analysis.copyright_statements {
                    md.push_str(&format!("- {}\n", statement));
                }
                md.push('\n');
            }
        }

        if options.include_license_text {
            md.push_str("## License Texts\n\n");
            let mut seen = IndexSet::new();
            for license in analyses.iter().flat_map(|a| a.licenses.iter()) {
                if !seen.insert(license.spdx_id.as_str()) {
                    continue;
                }
                if let Some(body) = license_body(license) {
                    md.push_str(&format!("### {}\n\n```text\n{}\n```\n\n", license.spdx_id, body));
                }
            }
        }
    }

    if let Some(footer) = &options.footer {
        md.push_str("---\n\n");
        md.push_str(footer);
        md.push('\n');
    }

    md
}

fn escape_cell(s: &str) -> String {
    s.replace('|', "\\|")
}
