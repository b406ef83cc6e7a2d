//! License metadata: the SPDX store and the obligation detail table.
//!
//! - [`store`]: [`LicenseStore`] lookup contract and the built-in SPDX table.
//! - [`obligations`]: maps each [`ObligationType`](crate::models::ObligationType)
//!   to its description, severity and scope.

pub mod obligations;
pub mod store;

pub use obligations::obligation_details;
pub use store::{BuiltinLicenseStore, LicenseStore};
