//! Translation result validation.
//!
//! Checks what a translator handed back against what it was asked for:
//! keys must come back, and placeholders, URLs and markup must survive
//! translation unchanged. Findings are advisory; nothing here fails a run.

use crate::catalog::Catalog;
use regex::Regex;
use std::collections::BTreeSet;
use std::sync::OnceLock;

/// Validation report containing errors and warnings about a translation.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ValidationReport {
    /// Requested entries the translator did not return
    pub errors: Vec<String>,

    /// Non-critical findings (unexpected keys, placeholder drift)
    pub warnings: Vec<String>,
}

impl ValidationReport {
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// Check if the report is clean (no errors or warnings)
    pub fn is_clean(&self) -> bool {
        !self.has_errors() && !self.has_warnings()
    }
}

// Regex patterns for extraction (cached for performance)
static PLACEHOLDER_REGEX: OnceLock<Regex> = OnceLock::new();
static URL_REGEX: OnceLock<Regex> = OnceLock::new();
static TAG_REGEX: OnceLock<Regex> = OnceLock::new();

fn placeholder_regex() -> &'static Regex {
    // {{name}}, {name}, {0}, %s, %d, %1$s
    PLACEHOLDER_REGEX.get_or_init(|| {
        Regex::new(r"\{\{\s*[\w.]+\s*\}\}|\{[\w.]+\}|%(?:\d+\$)?[sdif@]")
            .expect("placeholder regex is valid")
    })
}

fn url_regex() -> &'static Regex {
    URL_REGEX.get_or_init(|| Regex::new(r"https?://[^\s<>]+").expect("url regex is valid"))
}

fn tag_regex() -> &'static Regex {
    TAG_REGEX.get_or_init(|| Regex::new(r"</?[a-zA-Z][a-zA-Z0-9]*").expect("tag regex is valid"))
}

fn extract(regex: &Regex, text: &str) -> BTreeSet<String> {
    regex
        .find_iter(text)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Compare one source string with its translation.
fn check_text(location: &str, source: &str, translated: &str, report: &mut ValidationReport) {
    let checks: [(&str, &Regex); 3] = [
        ("Placeholder", placeholder_regex()),
        ("URL", url_regex()),
        ("Markup", tag_regex()),
    ];

    for (label, regex) in checks {
        let expected = extract(regex, source);
        let actual = extract(regex, translated);
        if expected != actual {
            report.warnings.push(format!(
                "{} mismatch at {}: source has {:?}, translation has {:?}",
                label, location, expected, actual
            ));
        }
    }
}

/// Validate a translator's `result` against the `request` it was given.
pub fn check_result(request: &Catalog, result: &Catalog) -> ValidationReport {
    let mut report = ValidationReport::default();

    for (category, entries) in request {
        for (key, value) in entries {
            let location = format!("{}.{}", category, key);
            match result.slot(category, key) {
                None => report
                    .errors
                    .push(format!("Translation missing for {}", location)),
                Some(translated) => {
                    if let (Some(source), Some(translated)) = (value, translated) {
                        check_text(&location, source, translated, &mut report);
                    }
                }
            }
        }
    }

    for (category, entries) in result {
        for key in entries.keys() {
            if request.slot(category, key).is_none() {
                report
                    .warnings
                    .push(format!("Unexpected key {}.{} in translation", category, key));
            }
        }
    }

    report
}
