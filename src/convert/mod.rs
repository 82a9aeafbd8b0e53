pub mod checkstyle;
pub mod parser;

pub use checkstyle::{CheckstyleReport, build};
pub use parser::{ParseError, parse};

use crate::config::ReportConfig;
use crate::fs::FileSystem;
use anyhow::Context;
use std::path::Path;
use tracing::debug;

/// Result of converting one lint report
#[derive(Debug)]
pub struct Conversion {
    /// Checkstyle XML text
    pub xml: String,
    /// Issues found in the lint report
    pub issues: usize,
    /// Issues written to the Checkstyle report
    pub reported: usize,
    /// Issues dropped by path filtering
    pub skipped: usize,
}

/// Convert lint XML text to Checkstyle XML
pub fn convert(xml: &str, config: &ReportConfig) -> Result<Conversion, ParseError> {
    let issues = parse(xml)?;
    let report = CheckstyleReport::from_issues(&issues, config);
    Ok(Conversion {
        xml: report.to_xml(),
        issues: issues.len(),
        reported: report.error_count(),
        skipped: report.skipped,
    })
}

/// Read a lint report through `fs` and convert it
pub async fn convert_file(
    fs: &dyn FileSystem,
    input: &Path,
    config: &ReportConfig,
) -> anyhow::Result<Conversion> {
    debug!("Reading lint report {}", input.display());
    let xml = fs
        .read_to_string(input)
        .await
        .with_context(|| format!("Failed to read lint report {}", input.display()))?;
    let conversion =
        convert(&xml, config).with_context(|| format!("Failed to parse {}", input.display()))?;
    Ok(conversion)
}
