//! Standalone HTML notices page. All interpolated text is escaped.

use indexmap::IndexSet;

use crate::models::LicenseAnalysis;

use super::{group_by_primary, license_body, license_list, DocumentOptions};

pub fn render(analyses: &[LicenseAnalysis], options: &DocumentOptions, generated_at: &str) -> String {
    let title = escape(&options.title);
    let mut html = String::with_capacity(8192);

    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n");
    html.push_str(&format!("<title>{}</title>\n", title));
    html.push_str(
        "<style>body{font-family:sans-serif;max-width:60em;margin:auto}\
         pre{white-space:pre-wrap;background:#f6f8fa;padding:1em}\
         table{border-collapse:collapse}td,th{border:1px solid #ccc;padding:.3em .6em}</style>\n",
    );
    html.push_str("</head>\n<body>\n");
    html.push_str(&format!("<h1>{}</h1>\n", title));
    html.push_str(&format!(
        "<p class=\"generated\">Generated: {}</p>\n",
        escape(generated_at)
    ));

    if let Some(header) = &options.header {
        html.push_str(&format!("<div class=\"header\">{}</div>\n", escape(header)));
    }

    if options.group_by_license {
        for group in group_by_primary(analyses) {
            html.push_str("<section>\n");
            html.push_str(&format!("<h2>{}</h2>\n", escape(&group.heading)));
            if let Some(license) = group.license {
                html.push_str(&format!(
                    "<p>{} ({})</p>\n",
                    escape(&license.name),
                    license.category
                ));
            }
            html.push_str("<ul>\n");
            for analysis in &group.analyses {
                html.push_str(&format!("<li><code>{}</code>", escape(&analysis.package.id())));
                if options.include_copyright && !analysis.copyright_statements.is_empty() {
                    html.push_str("<ul>");
                    for statement in &analysis.copyright_statements {
                        html.push_str(&format!("<li>{}</li>", escape(statement)));
                    }
                    html.push_str("</ul>");
                }
                html.push_str("</li>\n");
            }
            html.push_str("</ul>\n");
            if options.include_license_text {
                if let Some(body) = group.license.and_then(license_body) {
                    html.push_str(&format!("<pre>{}</pre>\n", escape(body)));
                }
            }
            html.push_str("</section>\n");
        }
    } else {
        html.push_str("<table>\n<tr><th>Package</th><th>Version</th><th>Licenses</th>");
        if options.include_copyright {
            html.push_str("<th>Copyright</th>");
        }
        html.push_str("</tr>\n");
        for analysis in analyses {
            html.push_str(&format!(
                "<tr><td>{}</td><td>{}</td><td>{}</td>",
                escape(&analysis.package.name),
                escape(&analysis.package.version),
                escape(&license_list(analysis))
            ));
            if options.include_copyright {
                html.push_str(&format!(
                    "<td>{}</td>",
                    escape(&analysis.copyright_statements.join("; "))
                ));
            }
            html.push_str("</tr>\n");
        }
        html.push_str("</table>\n");

        if options.include_license_text {
            let mut seen = IndexSet::new();
            for license in analyses.iter().flat_map(|a| a.licenses.iter()) {
                if !seen.insert(license.spdx_id.as_str()) {
                    continue;
                }
                if let Some(body) = license_body(license) {
                    html.push_str(&format!(
                        "<h3>{}</h3>\n<pre>{}</pre>\n",
                        escape(&license.spdx_id),
                        escape(body)
                    ));
                }
            }
        }
    }

    if let Some(footer) = &options.footer {
        html.push_str(&format!("<footer>{}</footer>\n", escape(footer)));
    }

    html.push_str("</body>\n</html>\n");
    html
}

pub(crate) fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
