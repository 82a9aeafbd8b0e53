/// Severity used when the lint report does not provide one
pub const DEFAULT_SEVERITY: &str = "info";

/// A single Android Lint finding
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LintIssue {
    /// Lint rule identifier (empty if absent)
    pub id: String,
    /// Human-readable description (empty if absent)
    pub message: String,
    /// Severity label as reported by lint (e.g. "Warning", "Error")
    pub severity: String,
    /// Primary source location
    pub location: Location,
}

/// Source location of a lint finding
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Location {
    /// Absolute or workspace-relative path (may be empty)
    pub file: String,
    /// Line number, `None` if unknown
    pub line: Option<u32>,
    /// Column number, `None` if unknown
    pub column: Option<u32>,
}

impl LintIssue {
    /// Message rendered for Checkstyle: `"{id}: {message}"`
    pub fn display_message(&self) -> String {
        format!("{}: {}", self.id, self.message)
    }

    /// Severity, falling back to [`DEFAULT_SEVERITY`] when empty
    pub fn severity_or_default(&self) -> &str {
        if self.severity.is_empty() {
            DEFAULT_SEVERITY
        } else {
            &self.severity
        }
    }
}
