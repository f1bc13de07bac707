//! Reports of data left out while loading or aggregating

use serde::Serialize;
use std::cmp::Ordering;
use std::fmt;

/// Severity level of a diagnostic
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

/// What went wrong
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum DiagnosticKind {
    /// File name has no dataset key; the table is kept but not selectable
    Parse,
    /// File could not be loaded and was skipped
    Load,
    /// Expected column missing; values treated as missing
    Schema,
    /// Alternate column name used
    Fallback,
    /// Two datasets share a column label
    Collision,
}

impl DiagnosticKind {
    pub fn as_str(&self) -> &str {
        match self {
            DiagnosticKind::Parse => "parse",
            DiagnosticKind::Load => "load",
            DiagnosticKind::Schema => "schema",
            DiagnosticKind::Fallback => "fallback",
            DiagnosticKind::Collision => "collision",
        }
    }
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One omission or notable decision, tied to a file name or label
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    /// File name or column label concerned
    pub subject: String,
    pub message: String,
    pub severity: Severity,
}

impl Diagnostic {
    pub fn new(
        kind: DiagnosticKind,
        subject: impl Into<String>,
        message: impl Into<String>,
        severity: Severity,
    ) -> Self {
        Self {
            kind,
            subject: subject.into(),
            message: message.into(),
            severity,
        }
    }

    pub fn parse(subject: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(DiagnosticKind::Parse, subject, message, Severity::Warning)
    }

    pub fn load(subject: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(DiagnosticKind::Load, subject, message, Severity::Error)
    }

    pub fn schema(subject: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(DiagnosticKind::Schema, subject, message, Severity::Warning)
    }

    pub fn fallback(subject: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(DiagnosticKind::Fallback, subject, message, Severity::Info)
    }

    pub fn collision(subject: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(DiagnosticKind::Collision, subject, message, Severity::Warning)
    }
}

impl PartialOrd for Diagnostic {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Diagnostic {
    fn cmp(&self, other: &Self) -> Ordering {
        self.subject
            .cmp(&other.subject)
            .then_with(|| self.kind.cmp(&other.kind))
            .then_with(|| self.message.cmp(&other.message))
            .then_with(|| self.severity.cmp(&other.severity))
    }
}

/// Count diagnostics of a given severity
pub fn count_severity(diagnostics: &[Diagnostic], severity: Severity) -> usize {
    diagnostics.iter().filter(|d| d.severity == severity).count()
}
