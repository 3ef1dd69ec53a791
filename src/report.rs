use serde::Serialize;

use crate::providers::zenhub::{Issue, LabelCounts, LabelMatrix, PipelineIssues, Repository};

/// Final state of one pipeline for one repository; this is what `raw_<repo>.json` holds.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineReport {
    pub id: String,
    pub name: String,
    pub issues: Vec<Issue>,
    /// Server-reported total, independent of `issues.len()`
    pub issues_count: usize,
    pub truncated: bool,
    pub issues_map: LabelCounts,
}

impl From<PipelineIssues> for PipelineReport {
    fn from(collected: PipelineIssues) -> Self {
        let issues_map = LabelCounts::tabulate(&collected.issues);

        Self {
            id: collected.pipeline.id,
            name: collected.pipeline.name,
            issues: collected.issues,
            issues_count: collected.issues_count,
            truncated: collected.truncated,
            issues_map,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RepositoryReport {
    pub repository: Repository,
    pub pipelines: Vec<PipelineReport>,
    pub matrix: LabelMatrix,
}

impl RepositoryReport {
    pub fn raw_file_name(&self) -> String {
        format!("raw_{}.json", self.repository.name)
    }

    pub fn csv_file_name(&self) -> String {
        format!("data_{}.csv", self.repository.name)
    }

    pub fn truncated_pipelines(&self) -> impl Iterator<Item = &PipelineReport> {
        self.pipelines.iter().filter(|p| p.truncated)
    }
}
