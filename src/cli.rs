use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    name = "license-intel",
    about = "Detect package licenses, score legal risk, and render compliance documents",
    version
)]
pub struct Cli {
    /// Package manifest (.json / .toml) or a directory with package-lock.json or Cargo.lock
    #[arg(default_value = ".")]
    pub input: PathBuf,

    /// Config file [default: ./.license-intel/config.toml, fallback ~/.config/license-intel/config.toml]
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Report to produce
    #[arg(long, default_value = "terminal", value_name = "KIND")]
    pub report: ReportKind,

    /// Output format for document, risk and policy reports (text, html, markdown, json)
    #[arg(long, value_name = "FORMAT")]
    pub format: Option<String>,

    /// List packages one by one instead of grouping them by license
    #[arg(long)]
    pub flat: bool,

    /// Embed license texts (or their URLs) in the document
    #[arg(long)]
    pub license_text: bool,

    /// Leave copyright statements out of the document
    #[arg(long)]
    pub no_copyright: bool,

    /// Custom document header
    #[arg(long, value_name = "TEXT")]
    pub header: Option<String>,

    /// Custom document footer
    #[arg(long, value_name = "TEXT")]
    pub footer: Option<String>,

    /// Write the report to a file instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Project name used in the legal risk report [default: input directory name]
    #[arg(long, value_name = "NAME")]
    pub project_name: Option<String>,

    /// Treat the project as a network service (AGPL exposure)
    #[arg(long)]
    pub network_service: bool,

    /// Show all packages and debug logs
    #[arg(short, long)]
    pub verbose: bool,

    /// Only print summary line
    #[arg(short, long)]
    pub quiet: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ReportKind {
    /// Per-package risk summary
    Terminal,
    /// Raw analyses as JSON
    Json,
    /// Project legal risk report
    Risk,
    /// Compliance notices document
    Document,
    /// Validate against the configured policy
    Policy,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cli = Cli::parse_from(["license-intel"]);
        assert_eq!(cli.input, PathBuf::from("."));
        assert_eq!(cli.report, ReportKind::Terminal);
        assert!(cli.format.is_none());
    }

    #[test]
    fn test_document_flags() {
        let cli = Cli::parse_from([
            "license-intel",
            "packages.toml",
            "--report",
            "document",
            "--format",
            "html",
            "--flat",
            "--license-text",
            "--no-copyright",
            "-o",
            "NOTICES.html",
        ]);
        assert_eq!(cli.report, ReportKind::Document);
        assert_eq!(cli.format.as_deref(), Some("html"));
        assert!(cli.flat && cli.license_text && cli.no_copyright);
        assert_eq!(cli.output, Some(PathBuf::from("NOTICES.html")));
    }
}
