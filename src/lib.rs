//! License detection and legal risk intelligence.
//!
//! - [`detector`]: per-package detection from declared expressions,
//!   license files and copyright statements.
//! - [`service`]: batched detection across many packages, legal risk,
//!   policy validation and compliance documents.
//! - [`compatibility`]: pairwise and project compatibility engine.
//! - [`policy`]: ordered policy rules over finished analyses.
//! - [`report`]: compliance documents and terminal output.
//! - [`inventory`]: package lists from manifests and lockfiles.

pub mod compatibility;
pub mod config;
pub mod detector;
pub mod error;
pub mod inventory;
pub mod license;
pub mod models;
pub mod policy;
pub mod report;
pub mod risk;
pub mod service;

pub use compatibility::{CompatibilityEngine, MatrixCompatibilityEngine};
pub use detector::{DetectionOptions, LicenseDetector};
pub use error::{IntelError, Result};
pub use license::{BuiltinLicenseStore, LicenseStore};
pub use models::{License, LicenseAnalysis, Package, RiskLevel};
pub use service::LicenseIntelligenceService;
