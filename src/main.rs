//! `license-intel`: detect package licenses, score legal risk, validate policy
//! and render compliance documents.
//!
//! # Flow
//! 1. Parse CLI arguments ([`cli`]).
//! 2. Load config ([`config::load_config`]) and apply CLI overrides.
//! 3. Load the package inventory ([`inventory::load`]).
//! 4. Detect licenses in batches ([`LicenseIntelligenceService`]).
//! 5. Render the requested report.
//! 6. Exit `0`, or `1` on policy violations / CRITICAL project risk.

mod cli;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;
use tracing_subscriber::EnvFilter;

use license_intel::compatibility::CompatibilityOptions;
use license_intel::config::{load_config, Config};
use license_intel::inventory;
use license_intel::models::RiskLevel;
use license_intel::policy;
use license_intel::report::{self, terminal, DocumentFormat};
use license_intel::service::{LicenseIntelligenceService, ProjectInfo};

use cli::{Cli, ReportKind};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let input = cli
        .input
        .canonicalize()
        .unwrap_or_else(|_| cli.input.clone());
    let project_dir = if input.is_file() {
        input.parent().map(Path::to_path_buf).unwrap_or_else(|| PathBuf::from("."))
    } else {
        input.clone()
    };

    let mut config = load_config(&project_dir, cli.config.as_deref())?;
    apply_overrides(&mut config, &cli)?;

    let packages = inventory::load(&input)?;
    if packages.is_empty() {
        eprintln!("No packages found in {}", input.display());
        std::process::exit(1);
    }
    if !cli.quiet {
        eprintln!("  {} {} packages", "→".cyan(), packages.len());
    }

    let service = LicenseIntelligenceService::with_defaults();

    let pb = if !cli.quiet {
        let pb = ProgressBar::new(packages.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template(
                    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}",
                )?
                .progress_chars("#>-"),
        );
        Some(pb)
    } else {
        None
    };

    let analyses = service
        .analyze_with_progress(&packages, &config.detection, |settled| {
            if let Some(pb) = &pb {
                pb.inc(settled as u64);
            }
        })
        .await;

    if let Some(pb) = pb {
        pb.finish_with_message("Done");
    }
    info!(analyzed = analyses.len(), total = packages.len(), "analysis complete");

    // JSON is the file format for structured reports.
    let as_json = cli.output.is_some() || config.document.format == DocumentFormat::Json;

    let failed = match cli.report {
        ReportKind::Terminal => {
            terminal::render_analyses(&analyses, &input, cli.verbose, cli.quiet)?;
            false
        }
        ReportKind::Json => {
            emit(&serde_json::to_string_pretty(&analyses)?, cli.output.as_deref())?;
            false
        }
        ReportKind::Document => {
            let document = report::render(&analyses, &config.document)?;
            emit(&document, cli.output.as_deref())?;
            false
        }
        ReportKind::Risk => {
            let project = ProjectInfo {
                name: cli
                    .project_name
                    .clone()
                    .unwrap_or_else(|| project_name(&project_dir)),
                version: None,
            };
            let report = service.legal_risk_report_for(
                &project,
                &packages,
                &analyses,
                &config.compatibility,
            )?;
            if as_json {
                emit(&serde_json::to_string_pretty(&report)?, cli.output.as_deref())?;
            } else {
                terminal::render_legal_risk(&report, &input, cli.quiet)?;
            }
            report.overall_risk == RiskLevel::Critical
        }
        ReportKind::Policy => {
            let policy = config
                .policy
                .as_ref()
                .context("Policy validation needs a [policy] section in the config file")?;
            let validation = policy::evaluate(&analyses, policy);
            if as_json {
                emit(&serde_json::to_string_pretty(&validation)?, cli.output.as_deref())?;
            } else {
                terminal::render_policy(&validation, &input, cli.quiet)?;
            }
            !validation.compliant
        }
    };

    if failed {
        std::process::exit(1);
    }

    Ok(())
}

/// `RUST_LOG` wins; otherwise `-v` turns on debug logs for this crate.
fn init_tracing(verbose: bool) {
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if verbose {
        EnvFilter::new("license_intel=debug")
    } else {
        EnvFilter::new("license_intel=warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_line_number(true)
        .with_writer(std::io::stderr)
        .init();
}

fn apply_overrides(config: &mut Config, cli: &Cli) -> Result<()> {
    let document = &mut config.document;
    if let Some(format) = &cli.format {
        document.format = format.parse()?;
    }
    if cli.flat {
        document.group_by_license = false;
    }
    if cli.license_text {
        document.include_license_text = true;
    }
    if cli.no_copyright {
        document.include_copyright = false;
    }
    if cli.header.is_some() {
        document.header = cli.header.clone();
    }
    if cli.footer.is_some() {
        document.footer = cli.footer.clone();
    }
    if cli.network_service {
        config.compatibility = CompatibilityOptions {
            network_service: true,
        };
    }
    Ok(())
}

fn project_name(dir: &Path) -> String {
    dir.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "project".to_string())
}

fn emit(content: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, content)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            eprintln!("  {} Report written to {}", "✓".green(), path.display());
        }
        None => println!("{}", content),
    }
    Ok(())
}
