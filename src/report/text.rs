//! Plain-text notices file.

use crate::models::LicenseAnalysis;

use super::{group_by_primary, license_body, license_list, DocumentOptions};

const RULE: &str = "================================================================";
const THIN_RULE: &str = "----------------------------------------------------------------";

pub fn render(analyses: &[LicenseAnalysis], options: &DocumentOptions, generated_at: &str) -> String {
    let mut out = String::with_capacity(4096);

    out.push_str(&options.title);
    out.push('\n');
    out.push_str(RULE);
    out.push('\n');
    out.push_str(&format!("Generated: {}\n", generated_at));
    out.push_str(&format!("Packages: {}\n\n", analyses.len()));

    if let Some(header) = &options.header {
        out.push_str(header);
        out.push_str("\n\n");
    }

    if options.group_by_license {
        for group in group_by_primary(analyses) {
            out.push_str(&group.heading);
            out.push('\n');
            out.push_str(THIN_RULE);
            out.push('\n');
            if let Some(license) = group.license {
                out.push_str(&format!("{} ({})\n", license.name, license.category));
            }
            for analysis in &group.analyses {
                out.push_str(&format!("  * {}\n", analysis.package.id()));
                if options.include_copyright {
                    for statement in &analysis.copyright_statements {
                        out.push_str(&format!("      {}\n", statement));
                    }
                }
            }
            if options.include_license_text {
                if let Some(body) = group.license.and_then(license_body) {
                    out.push('\n');
                    out.push_str(body);
                    out.push('\n');
                }
            }
            out.push('\n');
        }
    } else {
        for analysis in analyses {
            out.push_str(&format!(
                "{}  [{}]\n",
                analysis.package.id(),
                license_list(analysis)
            ));
            if options.include_copyright {
                for statement in &analysis.copyright_statements {
                    out.push_str(&format!("    {}\n", statement));
                }
            }
            if options.include_license_text {
                for license in &analysis.licenses {
                    if let Some(body) = license_body(license) {
                        out.push_str(&format!("    {}: {}\n", license.spdx_id, body));
                    }
                }
            }
        }
        out.push('\n');
    }

    if let Some(footer) = &options.footer {
        out.push_str(footer);
        out.push('\n');
    }

    out
}
