use std::path::{Path, PathBuf};

/// Default reviewdog reporter
pub const DEFAULT_REPORTER: &str = "github-pr-check";
/// Default reviewdog severity threshold
pub const DEFAULT_LEVEL: &str = "warning";
/// Tool name shown in review comments
pub const DEFAULT_NAME: &str = "Android Lint";
/// File name of the Checkstyle report written to the temp directory
const DEFAULT_OUTPUT_FILE: &str = "output_checkstyle.xml";

/// Path normalization settings for the Checkstyle builder
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportConfig {
    /// Absolute workspace root to strip from reported paths
    pub workspace_path: String,
    /// Repository directory name under the workspace root
    pub repo_name: String,
}

impl ReportConfig {
    pub fn new(workspace_path: impl Into<String>, repo_name: impl Into<String>) -> Self {
        Self {
            workspace_path: workspace_path.into(),
            repo_name: repo_name.into(),
        }
    }

    /// Build from a workspace path and a `owner/repo` repository slug
    ///
    /// A slug without `/` is taken as the repository name itself.
    pub fn from_repository(workspace_path: &str, repository: &str) -> Self {
        let repo_name = match repository.split_once('/') {
            Some((_, name)) => name,
            None => repository,
        };
        Self::new(workspace_path, repo_name)
    }

    /// Prefix removed from reported file paths
    pub fn path_prefix(&self) -> String {
        format!("{}/{}/", self.workspace_path, self.repo_name)
    }
}

/// Resolved inputs for a full action run
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Token handed to reviewdog
    pub github_token: String,
    /// Android Lint XML report
    pub lint_xml_file: PathBuf,
    /// Where the Checkstyle report is written
    pub output_file: PathBuf,
    pub name: String,
    pub reporter: String,
    pub level: String,
    /// Extra reviewdog flags, already split
    pub reviewdog_flags: Vec<String>,
    pub report: ReportConfig,
}

/// Treat empty strings as unset, as CI platforms pass blank optional inputs
pub fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Resolve a lint report path against the workspace root
///
/// Absolute paths and an empty workspace leave the path unchanged.
pub fn resolve_input_path(workspace_path: &str, lint_xml_file: &str) -> PathBuf {
    let path = Path::new(lint_xml_file);
    if path.is_absolute() || workspace_path.is_empty() {
        path.to_path_buf()
    } else {
        Path::new(workspace_path).join(path)
    }
}

/// Default location of the generated Checkstyle report
pub fn default_output_file() -> PathBuf {
    std::env::temp_dir().join(DEFAULT_OUTPUT_FILE)
}

/// Split a free-form flag string into reviewdog arguments
pub fn split_flags(flags: Option<&str>) -> Vec<String> {
    flags
        .map(|f| f.split_whitespace().map(str::to_string).collect())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_repository_owner_slug() {
        let config = ReportConfig::from_repository("/home/runner/work", "acme/app");
        assert_eq!(config, ReportConfig::new("/home/runner/work", "app"));
    }

    #[test]
    fn test_from_repository_bare_name() {
        let config = ReportConfig::from_repository("/workspace", "repo");
        assert_eq!(config.repo_name, "repo");
    }

    #[test]
    fn test_from_repository_empty() {
        let config = ReportConfig::from_repository("", "");
        assert_eq!(config.path_prefix(), "//");
    }

    #[test]
    fn test_path_prefix() {
        let config = ReportConfig::new("/workspace", "repo");
        assert_eq!(config.path_prefix(), "/workspace/repo/");
    }

    #[test]
    fn test_non_empty() {
        assert_eq!(non_empty(None), None);
        assert_eq!(non_empty(Some("")), None);
        assert_eq!(non_empty(Some("  ")), None);
        assert_eq!(non_empty(Some("local")), Some("local"));
    }

    #[test]
    fn test_resolve_input_path_relative() {
        assert_eq!(
            resolve_input_path("/workspace", "app/build/lint.xml"),
            PathBuf::from("/workspace/app/build/lint.xml")
        );
    }

    #[test]
    fn test_resolve_input_path_absolute() {
        assert_eq!(
            resolve_input_path("/workspace", "/tmp/lint.xml"),
            PathBuf::from("/tmp/lint.xml")
        );
    }

    #[test]
    fn test_resolve_input_path_no_workspace() {
        assert_eq!(resolve_input_path("", "lint.xml"), PathBuf::from("lint.xml"));
    }

    #[test]
    fn test_split_flags() {
        assert_eq!(
            split_flags(Some(" -fail-on-error  -filter-mode=nofilter ")),
            vec!["-fail-on-error", "-filter-mode=nofilter"]
        );
        assert!(split_flags(Some("   ")).is_empty());
        assert!(split_flags(None).is_empty());
    }

    #[test]
    fn test_default_output_file() {
        assert!(default_output_file().ends_with("output_checkstyle.xml"));
    }
}
