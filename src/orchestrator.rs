use crate::config::{ReportConfig, RunConfig};
use crate::convert;
use crate::fs::FileSystem;
use crate::reviewdog::{Reviewdog, ReviewdogOptions};
use anyhow::Context;
use std::path::Path;
use tracing::{debug, info};

/// Convert the lint report and post it through reviewdog
///
/// Steps, each aborting the run on failure:
/// - Converts the Android Lint report to Checkstyle and writes it to the output file
/// - Checks that reviewdog is installed
/// - Runs reviewdog on the written report
pub async fn run_action(
    config: &RunConfig,
    fs: &dyn FileSystem,
    reviewdog: &dyn Reviewdog,
) -> anyhow::Result<()> {
    info!("Running android-lint-action");

    convert_to_file(fs, &config.lint_xml_file, &config.output_file, &config.report).await?;

    reviewdog.ensure_installed().await?;

    let options = ReviewdogOptions {
        name: config.name.clone(),
        reporter: config.reporter.clone(),
        level: config.level.clone(),
        flags: config.reviewdog_flags.clone(),
        github_token: config.github_token.clone(),
    };
    debug!(
        "Reviewdog options: name={}, reporter={}, level={}, flags={:?}",
        options.name, options.reporter, options.level, options.flags
    );
    reviewdog.run(&config.output_file, &options).await?;

    info!("Finished android-lint-action");
    Ok(())
}

/// Convert `input` and write the Checkstyle report to `output`
///
/// Nothing is written if the lint report cannot be read or parsed.
pub async fn convert_to_file(
    fs: &dyn FileSystem,
    input: &Path,
    output: &Path,
    report: &ReportConfig,
) -> anyhow::Result<()> {
    info!("Converting {} to Checkstyle format...", input.display());
    let conversion = convert::convert_file(fs, input, report).await?;
    info!(
        "Found {} issues, {} reported, {} skipped",
        conversion.issues, conversion.reported, conversion.skipped
    );

    fs.write(output, &conversion.xml)
        .await
        .with_context(|| format!("Failed to write Checkstyle report {}", output.display()))?;
    info!("Conversion completed");
    debug!("Checkstyle report written to {}", output.display());
    Ok(())
}
