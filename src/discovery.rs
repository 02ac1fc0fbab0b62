//! Page discovery and label derivation.
//!
//! Top-level, navigable pages share a directory with sub-page fragments; the
//! naming convention tells them apart. A file is audit-eligible iff it ends
//! in `.html` and starts with exactly one decimal digit followed by
//! whitespace ("1 Homepage.html" yes, "4A prison_oversight_page.html" no).
//! The digit prefix fixes audit order and never appears in the derived label.

use std::fs;
use std::path::Path;

use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};
use serde::Serialize;

use crate::checks::{self, CountCheck};
use crate::error::AuditError;

/// Characters percent-encoded inside a URL path segment
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// One discovered, audit-eligible page
#[derive(Debug, Clone, Serialize)]
pub struct PageDescriptor {
    /// Display label, derived once at discovery time; also names the screenshot
    pub label: String,

    /// Root-relative percent-encoded path; always starts with `/`
    pub url_path: String,

    /// Stable page identifier used to key page-specific checks
    pub slug: String,

    /// Page-specific checks attached at discovery time
    #[serde(skip)]
    pub extra_checks: &'static [CountCheck],
}

/// Derive a display label from a bare page filename.
///
/// Strips the `.html` extension, strips a leading digit-run ordering prefix
/// followed by whitespace, replaces underscores with spaces, and capitalizes
/// the first letter of each word. Applied exactly once per filename.
pub fn label_from_filename(filename: &str) -> String {
    let stem = filename.strip_suffix(".html").unwrap_or(filename);

    let digits = stem.chars().take_while(|c| c.is_ascii_digit()).count();
    let rest = &stem[digits..];
    let stem = if digits > 0 && rest.starts_with(char::is_whitespace) {
        rest.trim_start()
    } else {
        stem
    };

    stem.replace('_', " ")
        .split_whitespace()
        .map(capitalize)
        .collect::<Vec<_>>()
        .join(" ")
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Stable identifier for a page, derived from its label
pub fn slug_for(label: &str) -> String {
    label.to_lowercase().replace(char::is_whitespace, "-")
}

/// Eligibility: `.html` extension and a single decimal digit followed by
/// whitespace. The digit-then-letter convention ("4A ...") marks sub-pages
/// and is intentionally excluded.
pub fn is_eligible(filename: &str) -> bool {
    if !filename.ends_with(".html") {
        return false;
    }
    let mut chars = filename.chars();
    matches!(
        (chars.next(), chars.next()),
        (Some(first), Some(second)) if first.is_ascii_digit() && second.is_whitespace()
    )
}

/// Scan `dir` for eligible page files and build descriptors.
///
/// Descriptors are sorted by the leading ordering digit (tie-broken by
/// filename) rather than trusting platform directory-listing order. An empty
/// result is not an error at this layer; an unlistable directory is fatal.
pub fn discover_pages(dir: &Path) -> Result<Vec<PageDescriptor>, AuditError> {
    let entries = fs::read_dir(dir).map_err(|source| AuditError::Discovery {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut names: Vec<String> = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| AuditError::Discovery {
            path: dir.to_path_buf(),
            source,
        })?;
        let name = entry.file_name().to_string_lossy().into_owned();
        if is_eligible(&name) {
            names.push(name);
        }
    }

    names.sort_by_key(|name| {
        let digit = name.chars().next().and_then(|c| c.to_digit(10)).unwrap_or(0);
        (digit, name.clone())
    });

    Ok(names.iter().map(|name| descriptor_for(name)).collect())
}

/// Build the descriptor for one eligible filename
pub fn descriptor_for(filename: &str) -> PageDescriptor {
    let label = label_from_filename(filename);
    let slug = slug_for(&label);
    let extra_checks = checks::extra_checks_for(&slug);
    let url_path = format!("/{}", utf8_percent_encode(filename, PATH_SEGMENT));
    PageDescriptor {
        label,
        url_path,
        slug,
        extra_checks,
    }
}
