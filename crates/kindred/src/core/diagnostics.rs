//! Structured diagnostics collector
//!
//! The organizer records the decisions it makes (filtered records, fallback
//! paths taken, tiers collapsed) into a caller-owned [`Diagnostics`] value so
//! an editor can show them next to the tree. Every entry is also emitted as
//! a `tracing` event.

use serde::Serialize;
use tracing::{debug, info, warn};

use super::PersonId;

/// Severity of a diagnostic entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticLevel {
    Debug,
    Info,
    Warn,
}

/// One recorded decision or anomaly
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnostic {
    pub level: DiagnosticLevel,
    /// Stable machine-readable code, e.g. `gender_conflict_fallback`
    pub code: &'static str,
    pub message: String,
    pub person_ids: Vec<PersonId>,
}

/// Collector passed into organizer entry points
#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn debug(&mut self, code: &'static str, message: impl Into<String>) {
        self.push(DiagnosticLevel::Debug, code, message.into(), Vec::new());
    }

    pub fn info(&mut self, code: &'static str, message: impl Into<String>) {
        self.push(DiagnosticLevel::Info, code, message.into(), Vec::new());
    }

    pub fn warn(
        &mut self,
        code: &'static str,
        message: impl Into<String>,
        person_ids: Vec<PersonId>,
    ) {
        self.push(DiagnosticLevel::Warn, code, message.into(), person_ids);
    }

    fn push(
        &mut self,
        level: DiagnosticLevel,
        code: &'static str,
        message: String,
        person_ids: Vec<PersonId>,
    ) {
        match level {
            DiagnosticLevel::Debug => debug!(code, ?person_ids, "{}", message),
            DiagnosticLevel::Info => info!(code, ?person_ids, "{}", message),
            DiagnosticLevel::Warn => warn!(code, ?person_ids, "{}", message),
        }
        self.entries.push(Diagnostic {
            level,
            code,
            message,
            person_ids,
        });
    }

    pub fn entries(&self) -> &[Diagnostic] {
        &self.entries
    }

    /// Returns true if any entry carries the given code
    pub fn has_code(&self, code: &str) -> bool {
        self.entries.iter().any(|d| d.code == code)
    }

    /// Entries at or above the given level
    pub fn at_least(&self, level: DiagnosticLevel) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter().filter(move |d| d.level >= level)
    }

    /// Drain all entries, leaving the collector empty
    pub fn take(&mut self) -> Vec<Diagnostic> {
        std::mem::take(&mut self.entries)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_records_entries_in_order() {
        let mut diagnostics = Diagnostics::new();
        diagnostics.debug("first", "one");
        diagnostics.warn("second", "two", vec![PersonId(3)]);

        let codes: Vec<_> = diagnostics.entries().iter().map(|d| d.code).collect();
        assert_eq!(codes, vec!["first", "second"]);
        assert_eq!(diagnostics.entries()[1].person_ids, vec![PersonId(3)]);
        assert!(diagnostics.has_code("second"));
        assert!(!diagnostics.has_code("third"));
    }

    #[test]
    fn test_level_filter() {
        let mut diagnostics = Diagnostics::new();
        diagnostics.debug("a", "debug");
        diagnostics.info("b", "info");
        diagnostics.warn("c", "warn", Vec::new());

        assert_eq!(diagnostics.at_least(DiagnosticLevel::Info).count(), 2);
        assert_eq!(diagnostics.at_least(DiagnosticLevel::Warn).count(), 1);
    }

    #[test]
    fn test_take_drains() {
        let mut diagnostics = Diagnostics::new();
        diagnostics.info("a", "x");
        let taken = diagnostics.take();
        assert_eq!(taken.len(), 1);
        assert!(diagnostics.is_empty());
    }
}
