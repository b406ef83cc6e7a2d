use std::collections::HashMap;
use std::path::Path;

use anyhow::Result;
use colored::*;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use crate::models::{LicenseAnalysis, RiskLevel};
use crate::policy::{PolicyValidation, ViolationSeverity};
use crate::service::LegalRiskReport;

/// Coarse bands used for the summary box.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Band {
    Low,
    Medium,
    High,
}

fn band(level: RiskLevel) -> Band {
    match level {
        RiskLevel::VeryLow | RiskLevel::Low => Band::Low,
        RiskLevel::Medium => Band::Medium,
        RiskLevel::High | RiskLevel::VeryHigh | RiskLevel::Critical => Band::High,
    }
}

fn level_color(level: RiskLevel) -> Color {
    match level {
        RiskLevel::VeryLow | RiskLevel::Low => Color::Green,
        RiskLevel::Medium => Color::Yellow,
        RiskLevel::High | RiskLevel::VeryHigh => Color::Red,
        RiskLevel::Critical => Color::Magenta,
    }
}

fn banner(input: &Path) {
    println!(
        "\n {} v{}",
        "license-intel".bold(),
        env!("CARGO_PKG_VERSION")
    );
    println!(" Input: {}\n", input.display());
}

/// Render per-package analyses as a summary box plus tables.
pub fn render_analyses(
    analyses: &[LicenseAnalysis],
    input: &Path,
    verbose: bool,
    quiet: bool,
) -> Result<()> {
    let total = analyses.len();
    let low_count = analyses.iter().filter(|a| band(a.risk_level) == Band::Low).count();
    let medium_count = analyses.iter().filter(|a| band(a.risk_level) == Band::Medium).count();
    let high_count = analyses.iter().filter(|a| band(a.risk_level) == Band::High).count();

    if quiet {
        println!(
            "Total: {}  Low: {}  Medium: {}  High: {}",
            total,
            low_count.to_string().green(),
            medium_count.to_string().yellow(),
            high_count.to_string().red(),
        );
        return Ok(());
    }

    banner(input);

    println!(" ┌────────────────────────────────────────────────────┐");
    println!(" │  {:<48} │", "SUMMARY".bold());
    println!(" │  {:<48} │", format!("Packages analyzed : {}", total));
    println!(
        " │  {:<48} │",
        format!(
            "{}  Low risk        : {:>4}  {}",
            "✓".green(),
            low_count,
            summarize_licenses(analyses, Band::Low)
        )
    );
    println!(
        " │  {:<48} │",
        format!(
            "{}  Medium risk     : {:>4}  {}",
            "⚠".yellow(),
            medium_count,
            summarize_licenses(analyses, Band::Medium)
        )
    );
    println!(
        " │  {:<48} │",
        format!(
            "{}  High risk       : {:>4}  {}",
            "✗".red(),
            high_count,
            summarize_licenses(analyses, Band::High)
        )
    );
    println!(" └────────────────────────────────────────────────────┘\n");

    if high_count > 0 {
        println!(" {} Packages requiring attention:\n", "[HIGH]".red().bold());
        render_table(analyses, Band::High);
        println!();
    }

    if medium_count > 0 {
        println!(" {} Packages to review:\n", "[MEDIUM]".yellow().bold());
        render_table(analyses, Band::Medium);
        println!();
    }

    if verbose && low_count > 0 {
        println!(" {} Low-risk packages:\n", "[LOW]".green().bold());
        render_table(analyses, Band::Low);
        println!();
    }

    let issues: Vec<_> = analyses
        .iter()
        .flat_map(|a| a.issues.iter().map(move |i| (a, i)))
        .collect();
    if !issues.is_empty() {
        println!(" {} Detection issues:", "[ISSUES]".bold());
        for (analysis, issue) in issues {
            println!("   {} {}: {}", "•".dimmed(), analysis.package.id(), issue.message);
        }
        println!();
    }

    Ok(())
}

fn render_table(analyses: &[LicenseAnalysis], filter: Band) {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("Name").add_attribute(Attribute::Bold),
            Cell::new("Version").add_attribute(Attribute::Bold),
            Cell::new("Primary").add_attribute(Attribute::Bold),
            Cell::new("Licenses").add_attribute(Attribute::Bold),
            Cell::new("Method").add_attribute(Attribute::Bold),
            Cell::new("Risk").add_attribute(Attribute::Bold),
        ]);

    for analysis in analyses.iter().filter(|a| band(a.risk_level) == filter) {
        table.add_row(vec![
            Cell::new(&analysis.package.name),
            Cell::new(&analysis.package.version),
            Cell::new(analysis.primary_license_id().unwrap_or("unknown")),
            Cell::new(super::license_list(analysis)),
            Cell::new(analysis.detection_method.to_string()),
            Cell::new(analysis.risk_level.to_string())
                .fg(level_color(analysis.risk_level))
                .set_alignment(CellAlignment::Center),
        ]);
    }

    println!("{}", table);
}

/// Top three primary licenses in a band, most frequent first.
fn summarize_licenses(analyses: &[LicenseAnalysis], filter: Band) -> String {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for analysis in analyses.iter().filter(|a| band(a.risk_level) == filter) {
        let lic = analysis.primary_license_id().unwrap_or("unknown");
        *counts.entry(lic).or_insert(0) += 1;
    }

    let mut pairs: Vec<(&str, usize)> = counts.into_iter().collect();
    pairs.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(b.0)));

    let summary: Vec<String> = pairs
        .iter()
        .take(3)
        .map(|(lic, cnt)| format!("{} ({})", lic, cnt))
        .collect();

    if summary.is_empty() {
        String::new()
    } else {
        format!("[{}]", summary.join(", "))
    }
}

pub fn render_legal_risk(report: &LegalRiskReport, input: &Path, quiet: bool) -> Result<()> {
    let overall = report
        .overall_risk
        .to_string()
        .color(colored_for(report.overall_risk))
        .bold();

    if quiet {
        println!("Risk: {}  Score: {}/100", overall, report.risk_score);
        return Ok(());
    }

    banner(input);

    let project = match &report.project.version {
        Some(v) => format!("{} v{}", report.project.name, v),
        None => report.project.name.clone(),
    };

    println!(" ┌────────────────────────────────────────────────────┐");
    println!(" │  {:<48} │", "LEGAL RISK".bold());
    println!(" │  {:<48} │", format!("Project           : {}", project));
    println!(" │  {:<48} │", format!("Packages          : {}", report.total_packages));
    println!(" │  {:<48} │", format!("Risk score        : {}/100", report.risk_score));
    println!(" │  {:<48} │", format!("Overall risk      : {}", report.overall_risk));
    println!(" │  {:<48} │", format!("Compatibility     : {}", report.compatibility));
    println!(" └────────────────────────────────────────────────────┘\n");

    if !report.risk_factors.is_empty() {
        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic)
            .set_header(vec![
                Cell::new("Factor").add_attribute(Attribute::Bold),
                Cell::new("Impact").add_attribute(Attribute::Bold),
                Cell::new("Weight").add_attribute(Attribute::Bold),
                Cell::new("Packages").add_attribute(Attribute::Bold),
            ]);
        for factor in &report.risk_factors {
            table.add_row(vec![
                Cell::new(&factor.description),
                Cell::new(format!("{:?}", factor.impact).to_lowercase()),
                Cell::new(factor.weight).set_alignment(CellAlignment::Right),
                Cell::new(factor.affected_packages.join(", ")),
            ]);
        }
        println!(" {} Risk factors:\n", "[RISK]".red().bold());
        println!("{}\n", table);
    }

    for risk in &report.jurisdiction_risks {
        println!(
            " {} {} ({}): {} [{}]",
            "[JURISDICTION]".yellow().bold(),
            risk.jurisdiction,
            risk.risk_level,
            risk.description,
            risk.licenses.join(", ")
        );
    }
    for risk in &report.patent_risks {
        println!(
            " {} {}: {} [{}]",
            "[PATENT]".yellow().bold(),
            risk.risk_level,
            risk.description,
            risk.licenses.join(", ")
        );
    }
    for requirement in &report.compliance_requirements {
        println!(" {} {}", "[REQUIRED]".cyan().bold(), requirement.description);
    }

    let review = &report.legal_review;
    if review.required {
        println!(
            "\n {} Legal review required ({:?} urgency, ~{}h): {}\n",
            "[REVIEW]".red().bold(),
            review.urgency,
            review.estimated_hours,
            review.scope.join("; ")
        );
    } else {
        println!("\n {} No legal review required\n", "[OK]".green().bold());
    }

    Ok(())
}

pub fn render_policy(validation: &PolicyValidation, input: &Path, quiet: bool) -> Result<()> {
    if quiet {
        println!(
            "Policy: {}  Violations: {}",
            validation.policy,
            validation.violations.len()
        );
        return Ok(());
    }

    banner(input);

    if validation.compliant {
        println!(
            " {} Compliant with policy '{}'\n",
            "✓".green().bold(),
            validation.policy
        );
        return Ok(());
    }

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("Package").add_attribute(Attribute::Bold),
            Cell::new("License").add_attribute(Attribute::Bold),
            Cell::new("Severity").add_attribute(Attribute::Bold),
            Cell::new("Message").add_attribute(Attribute::Bold),
        ]);
    for v in &validation.violations {
        let color = match v.severity {
            ViolationSeverity::Warning => Color::Yellow,
            ViolationSeverity::Error => Color::Red,
            ViolationSeverity::Critical => Color::Magenta,
        };
        table.add_row(vec![
            Cell::new(format!("{}@{}", v.package, v.version)),
            Cell::new(&v.license),
            Cell::new(v.severity.to_string()).fg(color),
            Cell::new(&v.message),
        ]);
    }

    println!(
        " {} {} violation(s) of policy '{}':\n",
        "[POLICY]".red().bold(),
        validation.violations.len(),
        validation.policy
    );
    println!("{}\n", table);
    Ok(())
}

fn colored_for(level: RiskLevel) -> colored::Color {
    match band(level) {
        Band::Low => colored::Color::Green,
        Band::Medium => colored::Color::Yellow,
        Band::High => colored::Color::Red,
    }
}
