use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A GitHub repository tracked on the ZenHub board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Repository {
    /// Display name, also used in output file names
    pub name: String,
    /// GitHub's numeric repository id
    pub gh_id: i64,
}

impl Repository {
    pub fn new(name: impl Into<String>, gh_id: i64) -> Self {
        Self {
            name: name.into(),
            gh_id,
        }
    }
}

impl fmt::Display for Repository {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.gh_id)
    }
}

/// Parses the `NAME=GH_ID` form accepted by `--repo`.
impl FromStr for Repository {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (name, id) = s
            .rsplit_once('=')
            .ok_or_else(|| format!("expected NAME=GH_ID, got '{s}'"))?;

        let name = name.trim();
        if name.is_empty() {
            return Err(format!("repository name is empty in '{s}'"));
        }

        let gh_id = id
            .trim()
            .parse::<i64>()
            .map_err(|e| format!("invalid GitHub id '{id}': {e}"))?;

        Ok(Self::new(name, gh_id))
    }
}

/// A ZenHub pipeline (board column). Shared by every repository in the workspace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pipeline {
    pub id: String,
    pub name: String,
}

/// An issue as returned by the pipeline search, reduced to what the export needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    pub id: String,
    /// Label names in the order ZenHub returned them; may be empty
    pub labels: Vec<String>,
}

/// Everything paged in for one pipeline of one repository.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineIssues {
    pub pipeline: Pipeline,
    /// Issues accumulated across all batches
    pub issues: Vec<Issue>,
    /// Total reported by the server on the latest page. May exceed `issues.len()` when
    /// pagination stopped at the batch cap.
    pub issues_count: usize,
    /// True when the batch cap was hit while the server still reported more pages
    pub truncated: bool,
}

impl PipelineIssues {
    pub fn new(pipeline: Pipeline) -> Self {
        Self {
            pipeline,
            issues: Vec::new(),
            issues_count: 0,
            truncated: false,
        }
    }
}

/// A workspace returned by workspace discovery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Workspace {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub repositories: Vec<WorkspaceRepository>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkspaceRepository {
    pub id: String,
    pub gh_id: i64,
    pub name: String,
}

/// Workspaces that contain a given GitHub repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RepositoryWorkspaces {
    /// ZenHub's id for the repository
    pub repository_id: String,
    pub workspaces: Vec<Workspace>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_repository_argument() {
        let repo: Repository = "AMO-Tools-Suite=75637129".parse().unwrap();
        assert_eq!(repo, Repository::new("AMO-Tools-Suite", 75_637_129));
    }

    #[test]
    fn test_parse_repository_name_with_equals() {
        let repo: Repository = "a=b=12".parse().unwrap();
        assert_eq!(repo, Repository::new("a=b", 12));
    }

    #[test]
    fn test_parse_repository_rejects_malformed() {
        assert!("MEASUR".parse::<Repository>().is_err());
        assert!("=12".parse::<Repository>().is_err());
        assert!("MEASUR=abc".parse::<Repository>().is_err());
    }

    #[test]
    fn test_repository_display() {
        assert_eq!(Repository::new("VERIFI", 252_534_096).to_string(), "VERIFI (252534096)");
    }
}
