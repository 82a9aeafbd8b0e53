use crate::config::ReportConfig;
use crate::types::LintIssue;
use quick_xml::escape::escape;
use std::collections::HashMap;
use tracing::{debug, trace};

const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="utf8"?>"#;
const CHECKSTYLE_VERSION: &str = "8.0";
/// Gradle dependency cache; findings there are never actionable
const GRADLE_CACHES: &str = ".gradle/caches";
const INDENT: &str = "  ";

/// Checkstyle document grouped by file, in order of first appearance
#[derive(Debug, Default, PartialEq, Eq)]
pub struct CheckstyleReport {
    pub files: Vec<CheckstyleFile>,
    /// Issues dropped because their path was empty or filtered
    pub skipped: usize,
}

#[derive(Debug, PartialEq, Eq)]
pub struct CheckstyleFile {
    /// Repository-relative path
    pub name: String,
    pub errors: Vec<CheckstyleError>,
}

#[derive(Debug, PartialEq, Eq)]
pub struct CheckstyleError {
    pub line: u32,
    pub column: u32,
    pub severity: String,
    pub message: String,
}

impl CheckstyleReport {
    /// Group issues by normalized path, skipping noise
    pub fn from_issues(issues: &[LintIssue], config: &ReportConfig) -> Self {
        let mut report = Self::default();
        let mut index_by_path: HashMap<String, usize> = HashMap::new();
        let prefix = config.path_prefix();

        for issue in issues {
            let Some(path) = normalize_path(&issue.location.file, &prefix) else {
                trace!("Skipping issue '{}' at '{}'", issue.id, issue.location.file);
                report.skipped += 1;
                continue;
            };

            let index = *index_by_path.entry(path.clone()).or_insert_with(|| {
                report.files.push(CheckstyleFile {
                    name: path,
                    errors: Vec::new(),
                });
                report.files.len() - 1
            });

            report.files[index].errors.push(CheckstyleError {
                line: issue.location.line.unwrap_or(0),
                column: issue.location.column.unwrap_or(0),
                severity: issue.severity_or_default().to_string(),
                message: issue.display_message(),
            });
        }

        debug!(
            "Grouped {} issues into {} files ({} skipped)",
            issues.len(),
            report.files.len(),
            report.skipped
        );
        report
    }

    /// Number of `<error>` entries in the report
    pub fn error_count(&self) -> usize {
        self.files.iter().map(|f| f.errors.len()).sum()
    }

    /// Render as Checkstyle XML
    pub fn to_xml(&self) -> String {
        let mut output = String::from(XML_DECLARATION);
        if self.files.is_empty() {
            output.push_str(&format!(
                r#"<checkstyle version="{}"/>"#,
                CHECKSTYLE_VERSION
            ));
            return output;
        }

        output.push_str(&format!(
            "\n<checkstyle version=\"{}\">\n",
            CHECKSTYLE_VERSION
        ));
        for file in &self.files {
            output.push_str(&format!(
                "{}<file name=\"{}\">\n",
                INDENT,
                escape_attr(&file.name)
            ));
            for error in &file.errors {
                output.push_str(&format!(
                    "{}{}<error line=\"{}\" column=\"{}\" severity=\"{}\" message=\"{}\"/>\n",
                    INDENT,
                    INDENT,
                    error.line,
                    error.column,
                    escape_attr(&error.severity),
                    escape_attr(&error.message)
                ));
            }
            output.push_str(&format!("{}</file>\n", INDENT));
        }
        output.push_str("</checkstyle>");
        output
    }
}

/// Convert lint issues to Checkstyle XML
pub fn build(issues: &[LintIssue], config: &ReportConfig) -> String {
    CheckstyleReport::from_issues(issues, config).to_xml()
}

/// Escape an attribute value, keeping whitespace that readers would normalize away
fn escape_attr(value: &str) -> String {
    escape(value)
        .replace('\n', "&#10;")
        .replace('\r', "&#13;")
        .replace('\t', "&#9;")
}

/// Strip the `{workspace}/{repo}/` prefix once from the start of a path
///
/// Returns `None` for empty paths and Gradle cache entries.
fn normalize_path(file: &str, prefix: &str) -> Option<String> {
    if file.trim().is_empty() || file.contains(GRADLE_CACHES) {
        return None;
    }

    let path = file.strip_prefix(prefix).unwrap_or(file).trim();
    if path.is_empty() {
        None
    } else {
        Some(path.to_string())
    }
}
