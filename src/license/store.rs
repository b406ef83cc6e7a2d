use indexmap::IndexMap;

use crate::models::{License, LicenseCategory, ObligationType};

use ObligationType::*;

/// Read-only SPDX id → [`License`] lookup. A miss is a valid negative signal,
/// not an error.
pub trait LicenseStore: Send + Sync {
    fn lookup(&self, spdx_id: &str) -> Option<License>;
}

const PERMISSIVE_NOTICE: &[ObligationType] = &[Attribution, NoticePreservation];
const PERMISSIVE_PATENT: &[ObligationType] = &[Attribution, NoticePreservation, PatentGrant];
const WEAK_COPYLEFT: &[ObligationType] = &[Attribution, DiscloseSource, SameLicense];
const WEAK_COPYLEFT_PATENT: &[ObligationType] =
    &[Attribution, DiscloseSource, SameLicense, PatentGrant];
const FILE_COPYLEFT: &[ObligationType] = &[Attribution, DiscloseSource, PatentGrant];
const GPL_V2: &[ObligationType] = &[Attribution, Copyleft, DiscloseSource, SameLicense];
const GPL_V3: &[ObligationType] =
    &[Attribution, Copyleft, DiscloseSource, SameLicense, PatentGrant];

/// `(spdx id, name, category, obligations, deprecated)`
type Entry = (
    &'static str,
    &'static str,
    LicenseCategory,
    &'static [ObligationType],
    bool,
);

const BUILTIN_LICENSES: &[Entry] = &[
    // Permissive
    ("MIT", "MIT License", LicenseCategory::Permissive, PERMISSIVE_NOTICE, false),
    ("MIT-0", "MIT No Attribution", LicenseCategory::Permissive, &[], false),
    ("Apache-2.0", "Apache License 2.0", LicenseCategory::Permissive, PERMISSIVE_PATENT, false),
    ("BSD-2-Clause", "BSD 2-Clause \"Simplified\" License", LicenseCategory::Permissive, PERMISSIVE_NOTICE, false),
    ("BSD-3-Clause", "BSD 3-Clause \"New\" or \"Revised\" License", LicenseCategory::Permissive, PERMISSIVE_NOTICE, false),
    ("ISC", "ISC License", LicenseCategory::Permissive, PERMISSIVE_NOTICE, false),
    ("0BSD", "BSD Zero Clause License", LicenseCategory::Permissive, &[], false),
    ("Zlib", "zlib License", LicenseCategory::Permissive, &[NoticePreservation], false),
    // Public domain equivalents
    ("Unlicense", "The Unlicense", LicenseCategory::PublicDomain, &[], false),
    ("CC0-1.0", "Creative Commons Zero v1.0 Universal", LicenseCategory::PublicDomain, &[], false),
    // Weak copyleft
    ("LGPL-2.1-only", "GNU Lesser General Public License v2.1 only", LicenseCategory::WeakCopyleft, WEAK_COPYLEFT, false),
    ("LGPL-3.0-only", "GNU Lesser General Public License v3.0 only", LicenseCategory::WeakCopyleft, WEAK_COPYLEFT_PATENT, false),
    ("MPL-2.0", "Mozilla Public License 2.0", LicenseCategory::WeakCopyleft, FILE_COPYLEFT, false),
    ("EPL-2.0", "Eclipse Public License 2.0", LicenseCategory::WeakCopyleft, FILE_COPYLEFT, false),
    // Copyleft
    ("CC-BY-SA-4.0", "Creative Commons Attribution Share Alike 4.0 International", LicenseCategory::Copyleft, &[Attribution, ShareAlike], false),
    ("GPL-2.0-only", "GNU General Public License v2.0 only", LicenseCategory::Copyleft, GPL_V2, false),
    ("GPL-2.0-or-later", "GNU General Public License v2.0 or later", LicenseCategory::Copyleft, GPL_V2, false),
    ("GPL-3.0-only", "GNU General Public License v3.0 only", LicenseCategory::Copyleft, GPL_V3, false),
    ("GPL-3.0-or-later", "GNU General Public License v3.0 or later", LicenseCategory::Copyleft, GPL_V3, false),
    ("AGPL-3.0-only", "GNU Affero General Public License v3.0 only", LicenseCategory::Copyleft, GPL_V3, false),
    ("AGPL-3.0-or-later", "GNU Affero General Public License v3.0 or later", LicenseCategory::Copyleft, GPL_V3, false),
    // Restricted
    ("CC-BY-NC-4.0", "Creative Commons Attribution Non Commercial 4.0 International", LicenseCategory::Custom, &[Attribution, NoCommercialUse], false),
    ("LicenseRef-Proprietary", "Proprietary License", LicenseCategory::Proprietary, &[], false),
    // Deprecated SPDX identifiers
    ("GPL-2.0", "GNU General Public License v2.0", LicenseCategory::Copyleft, GPL_V2, true),
    ("GPL-3.0", "GNU General Public License v3.0", LicenseCategory::Copyleft, GPL_V3, true),
    ("LGPL-2.1", "GNU Lesser General Public License v2.1", LicenseCategory::WeakCopyleft, WEAK_COPYLEFT, true),
    ("LGPL-3.0", "GNU Lesser General Public License v3.0", LicenseCategory::WeakCopyleft, WEAK_COPYLEFT_PATENT, true),
    ("AGPL-3.0", "GNU Affero General Public License v3.0", LicenseCategory::Copyleft, GPL_V3, true),
];

/// In-memory store seeded with common SPDX licenses.
#[derive(Debug, Clone)]
pub struct BuiltinLicenseStore {
    licenses: IndexMap<String, License>,
}

impl BuiltinLicenseStore {
    pub fn new() -> Self {
        let licenses = BUILTIN_LICENSES
            .iter()
            .map(|(id, name, category, obligations, deprecated)| {
                let license = License {
                    spdx_id: id.to_string(),
                    name: name.to_string(),
                    category: *category,
                    obligations: obligations.to_vec(),
                    confidence: 1.0,
                    deprecated_ids: deprecated.then(|| vec![id.to_string()]),
                    full_text: None,
                    url: Some(format!("https://spdx.org/licenses/{}.html", id)),
                };
                (id.to_string(), license)
            })
            .collect();
        Self { licenses }
    }

    /// Register or replace a record (custom licenses, attached full texts).
    pub fn with_license(mut self, license: License) -> Self {
        self.licenses.insert(license.spdx_id.clone(), license);
        self
    }

    pub fn len(&self) -> usize {
        self.licenses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.licenses.is_empty()
    }
}

impl Default for BuiltinLicenseStore {
    fn default() -> Self {
        Self::new()
    }
}

impl LicenseStore for BuiltinLicenseStore {
    fn lookup(&self, spdx_id: &str) -> Option<License> {
        self.licenses.get(spdx_id.trim()).cloned()
    }
}
