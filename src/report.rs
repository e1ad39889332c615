//! Console presentation of run results.

use std::fmt;

/// Final state of one target language
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
    Unchanged,
    Updated,
    /// Carries the detail shown to the user
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageReport {
    pub language: String,
    pub status: Status,
}

/// Outcome of every language of a run, in plan order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub reports: Vec<LanguageReport>,
}

fn green(text: &str) -> String {
    format!("\x1b[32m{}\x1b[0m", text)
}

fn red(text: &str) -> String {
    format!("\x1b[31m{}\x1b[0m", text)
}

impl fmt::Display for LanguageReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.status {
            Status::Unchanged => write!(f, "{} unchanged", self.language),
            Status::Updated => write!(f, "{} {}", self.language, green("UPDATED")),
            Status::Failed(detail) => write!(f, "{} {}\n{}", self.language, red("ERROR"), detail),
        }
    }
}

impl RunSummary {
    fn count(&self, predicate: impl Fn(&Status) -> bool) -> usize {
        self.reports.iter().filter(|r| predicate(&r.status)).count()
    }

    pub fn updated(&self) -> usize {
        self.count(|s| *s == Status::Updated)
    }

    pub fn unchanged(&self) -> usize {
        self.count(|s| *s == Status::Unchanged)
    }

    pub fn failed(&self) -> usize {
        self.count(|s| matches!(s, Status::Failed(_)))
    }

    pub fn has_failures(&self) -> bool {
        self.failed() > 0
    }

    /// One-line tally, e.g. `3 languages: 1 updated, 1 unchanged, 1 failed`
    pub fn tally(&self) -> String {
        format!(
            "{} languages: {} updated, {} unchanged, {} failed",
            self.reports.len(),
            self.updated(),
            self.unchanged(),
            self.failed()
        )
    }
}
