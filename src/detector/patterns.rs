//! Process-wide detection tables: candidate filenames, license text
//! fingerprints and the copyright statement pattern. Compiled once, never mutated.

use std::sync::LazyLock;

use regex::Regex;

/// Checked in order under each package root.
pub const LICENSE_FILE_CANDIDATES: &[&str] = &[
    "LICENSE",
    "LICENSE.txt",
    "LICENSE.md",
    "LICENCE",
    "LICENCE.txt",
    "LICENCE.md",
    "COPYING",
    "COPYING.txt",
    "COPYING.md",
    "COPYRIGHT",
    "COPYRIGHT.txt",
    "NOTICE",
    "NOTICE.txt",
    "NOTICE.md",
];

/// A license text signature with the confidence a match carries.
#[derive(Debug)]
pub struct Fingerprint {
    pub spdx_id: &'static str,
    pub pattern: Regex,
    pub confidence: f64,
}

// Order matters: the first matching fingerprint wins for a file, so the more
// specific texts (BSD-3 before BSD-2) come first.
const FINGERPRINT_SOURCES: &[(&str, &str, f64)] = &[
    ("MIT", r"(?i)permission\s+is\s+hereby\s+granted,\s+free\s+of\s+charge", 0.9),
    ("Apache-2.0", r"(?i)apache\s+license,?\s+version\s+2\.0", 0.9),
    ("GPL-3.0-only", r"(?i)gnu\s+general\s+public\s+license\s+version\s+3", 0.9),
    ("GPL-2.0-only", r"(?i)gnu\s+general\s+public\s+license\s+version\s+2", 0.9),
    ("LGPL-3.0-only", r"(?i)gnu\s+lesser\s+general\s+public\s+license\s+version\s+3", 0.85),
    ("LGPL-2.1-only", r"(?i)gnu\s+lesser\s+general\s+public\s+license\s+version\s+2\.1", 0.85),
    ("MPL-2.0", r"(?i)mozilla\s+public\s+license,?\s+(?:version\s+|v\.?\s*)2\.0", 0.9),
    (
        "BSD-3-Clause",
        r"(?is)redistribution\s+and\s+use\s+in\s+source\s+and\s+binary\s+forms.*neither\s+the\s+name",
        0.85,
    ),
    ("BSD-2-Clause", r"(?i)redistribution\s+and\s+use\s+in\s+source\s+and\s+binary\s+forms", 0.8),
    (
        "ISC",
        r"(?i)permission\s+to\s+use,\s+copy,\s+modify,\s+and/or\s+distribute\s+this\s+software",
        0.85,
    ),
    ("CC0-1.0", r"(?i)cc0\s+1\.0\s+universal", 0.9),
    (
        "Unlicense",
        r"(?i)this\s+is\s+free\s+and\s+unencumbered\s+software\s+released\s+into\s+the\s+public\s+domain",
        0.9,
    ),
];

pub static FINGERPRINTS: LazyLock<Vec<Fingerprint>> = LazyLock::new(|| {
    FINGERPRINT_SOURCES
        .iter()
        .map(|(spdx_id, pattern, confidence)| Fingerprint {
            spdx_id: *spdx_id,
            pattern: Regex::new(pattern).expect("fingerprint patterns are static and valid"),
            confidence: *confidence,
        })
        .collect()
});

/// `Copyright` followed by a `(c)`/`©` marker and/or a year or year range, then
/// the holder up to end of line.
pub static COPYRIGHT_STATEMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?:Copyright|COPYRIGHT)\s+(?:(?:\([cC]\)|©)\s*(?:\d{4}(?:\s*-\s*\d{4})?,?\s*)?|\d{4}(?:\s*-\s*\d{4})?,?\s+)[^\r\n]+",
    )
    .expect("copyright pattern is static and valid")
});

/// First fingerprint matching `text`, if any.
pub fn fingerprint(text: &str) -> Option<&'static Fingerprint> {
    FINGERPRINTS.iter().find(|f| f.pattern.is_match(text))
}
