use async_trait::async_trait;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, info};

const REVIEWDOG_BIN: &str = "reviewdog";
/// Environment variable reviewdog reads the GitHub token from
const TOKEN_ENV: &str = "REVIEWDOG_GITHUB_API_TOKEN";
const INPUT_FORMAT: &str = "checkstyle";

/// Settings for a single reviewdog invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewdogOptions {
    /// Tool name shown in review comments
    pub name: String,
    /// Reporter mode (e.g. github-pr-check, github-pr-review, local)
    pub reporter: String,
    /// Minimum severity reported
    pub level: String,
    /// Extra flags appended verbatim
    pub flags: Vec<String>,
    pub github_token: String,
}

impl ReviewdogOptions {
    /// Command line arguments, without the program name
    pub fn args(&self) -> Vec<String> {
        let mut args = vec![
            format!("-f={}", INPUT_FORMAT),
            format!("-name={}", self.name),
            format!("-reporter={}", self.reporter),
            format!("-level={}", self.level),
        ];
        args.extend(self.flags.iter().cloned());
        args
    }
}

#[derive(Debug)]
pub enum ReviewdogError {
    /// reviewdog is not on PATH
    NotInstalled,
    /// The Checkstyle report could not be opened for stdin
    ReadReport {
        path: PathBuf,
        source: std::io::Error,
    },
    /// The process could not be started or awaited
    Spawn(std::io::Error),
    /// reviewdog ran and failed; `None` if killed by a signal
    NonZeroExit(Option<i32>),
}

impl std::fmt::Display for ReviewdogError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReviewdogError::NotInstalled => write!(
                f,
                "Reviewdog is not installed. Please install it before running this action.\n\
                 We recommend using 'reviewdog/action-setup' GitHub Action.\n\
                 See README.md for installation instructions."
            ),
            ReviewdogError::ReadReport { path, source } => write!(
                f,
                "Failed to open Checkstyle report {}: {}",
                path.display(),
                source
            ),
            ReviewdogError::Spawn(e) => write!(f, "Failed to execute reviewdog: {}", e),
            ReviewdogError::NonZeroExit(Some(code)) => write!(
                f,
                "reviewdog exited with non-zero code: {}. Please inspect reviewdog logs above",
                code
            ),
            ReviewdogError::NonZeroExit(None) => write!(
                f,
                "reviewdog was terminated by a signal. Please inspect reviewdog logs above"
            ),
        }
    }
}

impl std::error::Error for ReviewdogError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ReviewdogError::ReadReport { source, .. } => Some(source),
            ReviewdogError::Spawn(e) => Some(e),
            _ => None,
        }
    }
}

/// Posts a Checkstyle report as review comments
#[async_trait]
pub trait Reviewdog: Send + Sync {
    /// Fail with [`ReviewdogError::NotInstalled`] if the tool is unavailable
    async fn ensure_installed(&self) -> Result<(), ReviewdogError>;

    /// Feed `checkstyle_file` to reviewdog and wait for it to finish
    async fn run(
        &self,
        checkstyle_file: &Path,
        options: &ReviewdogOptions,
    ) -> Result<(), ReviewdogError>;
}

/// Runs the `reviewdog` executable found on PATH
pub struct ReviewdogCli {
    search_path: Option<OsString>,
}

impl ReviewdogCli {
    pub fn new() -> Self {
        Self {
            search_path: std::env::var_os("PATH"),
        }
    }

    /// Use an explicit search path instead of the process PATH
    pub fn with_search_path(search_path: impl Into<OsString>) -> Self {
        Self {
            search_path: Some(search_path.into()),
        }
    }

    fn locate(&self) -> Option<PathBuf> {
        find_executable(REVIEWDOG_BIN, self.search_path.as_deref()?)
    }
}

impl Default for ReviewdogCli {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Reviewdog for ReviewdogCli {
    async fn ensure_installed(&self) -> Result<(), ReviewdogError> {
        let path = self.locate().ok_or(ReviewdogError::NotInstalled)?;
        info!("Reviewdog is installed");
        debug!("Using reviewdog at {}", path.display());
        Ok(())
    }

    async fn run(
        &self,
        checkstyle_file: &Path,
        options: &ReviewdogOptions,
    ) -> Result<(), ReviewdogError> {
        let program = self.locate().ok_or(ReviewdogError::NotInstalled)?;
        let args = options.args();
        info!("Running reviewdog with args: {}", args.join(" "));

        let input = tokio::fs::File::open(checkstyle_file)
            .await
            .map_err(|source| ReviewdogError::ReadReport {
                path: checkstyle_file.to_path_buf(),
                source,
            })?
            .into_std()
            .await;
        let status = Command::new(program)
            .args(&args)
            .env(TOKEN_ENV, &options.github_token)
            .stdin(Stdio::from(input))
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .await
            .map_err(ReviewdogError::Spawn)?;

        if status.success() {
            debug!("reviewdog finished: {}", status);
            Ok(())
        } else {
            Err(ReviewdogError::NonZeroExit(status.code()))
        }
    }
}

/// Find `name` in a PATH-style list of directories
pub fn find_executable(name: &str, search_path: &std::ffi::OsStr) -> Option<PathBuf> {
    std::env::split_paths(search_path)
        .flat_map(|dir| candidates(&dir, name))
        .find(|candidate| is_executable(candidate))
}

#[cfg(windows)]
fn candidates(dir: &Path, name: &str) -> Vec<PathBuf> {
    vec![dir.join(format!("{}.exe", name)), dir.join(name)]
}

#[cfg(not(windows))]
fn candidates(dir: &Path, name: &str) -> Vec<PathBuf> {
    vec![dir.join(name)]
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    std::fs::metadata(path)
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options(flags: &[&str]) -> ReviewdogOptions {
        ReviewdogOptions {
            name: "Android Lint".into(),
            reporter: "github-pr-check".into(),
            level: "warning".into(),
            flags: flags.iter().map(|f| f.to_string()).collect(),
            github_token: "gh-token".into(),
        }
    }

    #[test]
    fn test_args() {
        assert_eq!(
            options(&[]).args(),
            vec![
                "-f=checkstyle",
                "-name=Android Lint",
                "-reporter=github-pr-check",
                "-level=warning"
            ]
        );
    }

    #[test]
    fn test_args_with_flags() {
        let args = options(&["-fail-on-error", "-filter-mode=nofilter"]).args();
        assert_eq!(args.len(), 6);
        assert_eq!(args[4], "-fail-on-error");
        assert_eq!(args[5], "-filter-mode=nofilter");
    }

    #[test]
    fn test_error_messages() {
        assert!(
            ReviewdogError::NotInstalled
                .to_string()
                .contains("reviewdog/action-setup")
        );
        assert_eq!(
            ReviewdogError::NonZeroExit(Some(2)).to_string(),
            "reviewdog exited with non-zero code: 2. Please inspect reviewdog logs above"
        );
    }

    #[tokio::test]
    async fn test_not_installed_on_empty_path() {
        let dir = tempfile::tempdir().unwrap();
        let cli = ReviewdogCli::with_search_path(dir.path().as_os_str());
        assert!(matches!(
            cli.ensure_installed().await,
            Err(ReviewdogError::NotInstalled)
        ));
        assert!(matches!(
            cli.run(Path::new("missing.xml"), &options(&[])).await,
            Err(ReviewdogError::NotInstalled)
        ));
    }

    #[cfg(unix)]
    mod unix {
        use super::*;
        use std::os::unix::fs::PermissionsExt;

        /// Install a fake `reviewdog` shell script into `dir`
        fn fake_reviewdog(dir: &Path, script: &str) {
            let path = dir.join(REVIEWDOG_BIN);
            std::fs::write(&path, format!("#!/bin/sh\n{}\n", script)).unwrap();
            std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        }

        #[test]
        fn test_find_executable_skips_non_executable() {
            let dir = tempfile::tempdir().unwrap();
            std::fs::write(dir.path().join(REVIEWDOG_BIN), "").unwrap();
            assert_eq!(find_executable(REVIEWDOG_BIN, dir.path().as_os_str()), None);
        }

        #[tokio::test]
        async fn test_run_pipes_report_and_env() {
            let bin = tempfile::tempdir().unwrap();
            let work = tempfile::tempdir().unwrap();
            let captured = work.path().join("captured.txt");
            fake_reviewdog(
                bin.path(),
                &format!(
                    "{{ echo \"$@\"; echo \"$REVIEWDOG_GITHUB_API_TOKEN\"; cat; }} > '{}'",
                    captured.display()
                ),
            );
            let report = work.path().join("checkstyle.xml");
            std::fs::write(&report, "<checkstyle version=\"8.0\"/>").unwrap();

            let cli = ReviewdogCli::with_search_path(bin.path().as_os_str());
            cli.ensure_installed().await.unwrap();
            cli.run(&report, &options(&["-fail-on-error"])).await.unwrap();

            let output = std::fs::read_to_string(&captured).unwrap();
            let lines: Vec<_> = output.lines().collect();
            assert_eq!(
                lines[0],
                "-f=checkstyle -name=Android Lint -reporter=github-pr-check -level=warning -fail-on-error"
            );
            assert_eq!(lines[1], "gh-token");
            assert_eq!(lines[2], "<checkstyle version=\"8.0\"/>");
        }

        #[tokio::test]
        async fn test_run_missing_report() {
            let bin = tempfile::tempdir().unwrap();
            fake_reviewdog(bin.path(), "exit 0");
            let work = tempfile::tempdir().unwrap();
            let report = work.path().join("missing.xml");

            let cli = ReviewdogCli::with_search_path(bin.path().as_os_str());
            let err = cli.run(&report, &options(&[])).await.unwrap_err();
            match &err {
                ReviewdogError::ReadReport { path, source } => {
                    assert_eq!(path, &report);
                    assert_eq!(source.kind(), std::io::ErrorKind::NotFound);
                }
                other => panic!("expected ReadReport, got {:?}", other),
            }
            assert!(err.to_string().starts_with("Failed to open Checkstyle report"));
        }

        #[tokio::test]
        async fn test_run_non_zero_exit() {
            let bin = tempfile::tempdir().unwrap();
            fake_reviewdog(bin.path(), "cat > /dev/null; exit 3");
            let work = tempfile::tempdir().unwrap();
            let report = work.path().join("checkstyle.xml");
            std::fs::write(&report, "").unwrap();

            let cli = ReviewdogCli::with_search_path(bin.path().as_os_str());
            let err = cli.run(&report, &options(&[])).await.unwrap_err();
            assert!(matches!(err, ReviewdogError::NonZeroExit(Some(3))));
        }
    }
}
