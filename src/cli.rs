use crate::config::{self, ReportConfig, RunConfig};
use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

// Display order for the token option (placed at top of help text)
const TOKEN_DISPLAY_ORDER: usize = 0;
// Display order for log level option (placed at end of help text)
const LOG_LEVEL_DISPLAY_ORDER: usize = 100;

/// CLI arguments
#[derive(Parser)]
#[command(
    name = "lint-reviewdog",
    version,
    about = "Post Android Lint findings as review comments via reviewdog",
    long_about = None
)]
pub struct Cli {
    /// Log level (see https://docs.rs/tracing-subscriber/latest/tracing_subscriber/filter/struct.EnvFilter.html)
    /// [env: LINT_REVIEWDOG_LOG=] [default: info]
    #[arg(
        long,
        env = "LINT_REVIEWDOG_LOG",
        default_value = "info",
        global = true,
        hide_default_value = true,
        hide_env = true,
        display_order = LOG_LEVEL_DISPLAY_ORDER,
        verbatim_doc_comment
    )]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand)]
pub enum Commands {
    /// Convert the lint report and post it with reviewdog
    Run(RunArgs),
    /// Convert the lint report to Checkstyle XML only
    Convert(ConvertArgs),
}

/// Location of the lint report and path normalization inputs
#[derive(Args, Debug, Clone)]
pub struct ReportArgs {
    /// Android Lint XML report, relative to the workspace unless absolute
    #[arg(long, env = "INPUT_LINT_XML_FILE")]
    pub lint_xml_file: String,

    /// Workspace root stripped from reported paths
    #[arg(long, env = "RUNNER_WORKSPACE", default_value = "")]
    pub workspace: String,

    /// Repository as owner/name; the name follows the workspace in reported paths
    #[arg(long, env = "GITHUB_REPOSITORY", default_value = "")]
    pub repository: String,
}

impl ReportArgs {
    pub fn report_config(&self) -> ReportConfig {
        ReportConfig::from_repository(self.workspace.trim(), self.repository.trim())
    }

    pub fn input_path(&self) -> PathBuf {
        config::resolve_input_path(self.workspace.trim(), self.lint_xml_file.trim())
    }
}

/// Arguments for the run command
#[derive(Parser, Debug)]
pub struct RunArgs {
    /// GitHub token passed to reviewdog
    #[arg(long, env = "INPUT_GITHUB_TOKEN", display_order = TOKEN_DISPLAY_ORDER)]
    pub github_token: Option<String>,

    #[command(flatten)]
    pub report: ReportArgs,

    /// Reviewdog reporter [default: github-pr-check]
    #[arg(long, env = "INPUT_REPORTER")]
    pub reporter: Option<String>,

    /// Minimum severity reported by reviewdog [default: warning]
    #[arg(long, env = "INPUT_LEVEL")]
    pub level: Option<String>,

    /// Extra reviewdog flags, separated by spaces
    #[arg(long, env = "INPUT_REVIEWDOG_FLAGS", allow_hyphen_values = true)]
    pub reviewdog_flags: Option<String>,

    /// Name shown on review comments
    #[arg(long, default_value = config::DEFAULT_NAME)]
    pub name: String,

    /// Where to write the Checkstyle report [default: <temp dir>/output_checkstyle.xml]
    #[arg(long)]
    pub output: Option<PathBuf>,
}

impl RunArgs {
    /// Apply defaults and validate required inputs
    pub fn into_config(self) -> anyhow::Result<RunConfig> {
        let github_token = config::non_empty(self.github_token.as_deref())
            .context("Input required and not supplied: github_token")?
            .to_string();
        if self.report.lint_xml_file.trim().is_empty() {
            anyhow::bail!("Input required and not supplied: lint_xml_file");
        }

        Ok(RunConfig {
            github_token,
            lint_xml_file: self.report.input_path(),
            output_file: self.output.unwrap_or_else(config::default_output_file),
            name: self.name,
            reporter: config::non_empty(self.reporter.as_deref())
                .unwrap_or(config::DEFAULT_REPORTER)
                .to_string(),
            level: config::non_empty(self.level.as_deref())
                .unwrap_or(config::DEFAULT_LEVEL)
                .to_string(),
            reviewdog_flags: config::split_flags(self.reviewdog_flags.as_deref()),
            report: self.report.report_config(),
        })
    }
}

/// Arguments for the convert command
#[derive(Parser, Debug)]
pub struct ConvertArgs {
    #[command(flatten)]
    pub report: ReportArgs,

    /// Output file path (stdout if omitted)
    #[arg(long)]
    pub output: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("lint-reviewdog").chain(args.iter().copied()))
            .unwrap()
    }

    fn run_args(args: &[&str]) -> RunArgs {
        match parse(args).command {
            Commands::Run(args) => args,
            Commands::Convert(_) => panic!("expected run"),
        }
    }

    #[test]
    fn test_run_defaults() {
        let config = run_args(&[
            "run",
            "--github-token",
            "gh-token",
            "--lint-xml-file",
            "app/build/reports/lint-results.xml",
            "--workspace",
            "/home/runner/work/app",
            "--repository",
            "acme/app",
            "--reporter",
            "",
            "--level",
            "",
        ])
        .into_config()
        .unwrap();

        assert_eq!(config.github_token, "gh-token");
        assert_eq!(
            config.lint_xml_file,
            PathBuf::from("/home/runner/work/app/app/build/reports/lint-results.xml")
        );
        assert_eq!(config.reporter, "github-pr-check");
        assert_eq!(config.level, "warning");
        assert_eq!(config.name, "Android Lint");
        assert!(config.reviewdog_flags.is_empty());
        assert_eq!(config.report, ReportConfig::new("/home/runner/work/app", "app"));
        assert!(config.output_file.ends_with("output_checkstyle.xml"));
    }

    #[test]
    fn test_run_overrides() {
        let config = run_args(&[
            "run",
            "--github-token",
            "t",
            "--lint-xml-file",
            "/abs/lint.xml",
            "--reporter",
            "github-pr-review",
            "--level",
            "error",
            "--reviewdog-flags",
            "-fail-on-error -filter-mode=nofilter",
            "--output",
            "/tmp/out.xml",
        ])
        .into_config()
        .unwrap();

        assert_eq!(config.lint_xml_file, PathBuf::from("/abs/lint.xml"));
        assert_eq!(config.reporter, "github-pr-review");
        assert_eq!(config.level, "error");
        assert_eq!(
            config.reviewdog_flags,
            vec!["-fail-on-error", "-filter-mode=nofilter"]
        );
        assert_eq!(config.output_file, PathBuf::from("/tmp/out.xml"));
    }

    #[test]
    fn test_run_requires_token() {
        let err = run_args(&["run", "--github-token", "", "--lint-xml-file", "lint.xml"])
            .into_config()
            .unwrap_err();
        assert!(err.to_string().contains("github_token"));
    }

    #[test]
    fn test_run_requires_lint_file() {
        let err = run_args(&["run", "--github-token", "t", "--lint-xml-file", " "])
            .into_config()
            .unwrap_err();
        assert!(err.to_string().contains("lint_xml_file"));
    }

    #[test]
    fn test_convert_args() {
        let cli = parse(&[
            "convert",
            "--lint-xml-file",
            "lint.xml",
            "--repository",
            "repo",
            "--workspace",
            "",
            "--log-level",
            "debug",
        ]);
        assert_eq!(cli.log_level, "debug");
        let Commands::Convert(args) = cli.command else {
            panic!("expected convert");
        };
        assert_eq!(args.report.report_config(), ReportConfig::new("", "repo"));
        assert_eq!(args.report.input_path(), PathBuf::from("lint.xml"));
        assert!(args.output.is_none());
    }
}
