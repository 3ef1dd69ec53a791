use std::collections::BTreeSet;

use serde::Serialize;

use super::label_counts::NO_LABEL;
use crate::report::PipelineReport;

/// Leading columns present in every matrix, ahead of the sorted label columns.
pub const FIXED_COLUMNS: [&str; 3] = ["Pipeline", "Total", NO_LABEL];

/// Dense pipeline × label table for one repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LabelMatrix {
    /// Label universe, sorted ascending; excludes the fixed columns
    pub labels: Vec<String>,
    pub rows: Vec<MatrixRow>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatrixRow {
    pub pipeline: String,
    pub total: usize,
    pub none: usize,
    /// One count per entry of [`LabelMatrix::labels`]
    pub label_counts: Vec<usize>,
}

impl LabelMatrix {
    /// Header row: the fixed columns followed by the label universe.
    pub fn columns(&self) -> Vec<&str> {
        FIXED_COLUMNS
            .iter()
            .copied()
            .chain(self.labels.iter().map(String::as_str))
            .collect()
    }
}

impl MatrixRow {
    /// Cell values in [`LabelMatrix::columns`] order.
    pub fn cells(&self) -> Vec<String> {
        [self.pipeline.clone(), self.total.to_string(), self.none.to_string()]
            .into_iter()
            .chain(self.label_counts.iter().map(ToString::to_string))
            .collect()
    }
}

/// Project every pipeline onto the union of labels seen in any of them.
///
/// Pure: the same pipelines always produce the same matrix. Labels missing from a
/// pipeline count as zero.
pub fn build_matrix(pipelines: &[PipelineReport]) -> LabelMatrix {
    let universe: BTreeSet<&str> = pipelines
        .iter()
        .flat_map(|p| p.issues_map.labels())
        .collect();

    let labels: Vec<String> = universe.into_iter().map(str::to_string).collect();

    let rows = pipelines
        .iter()
        .map(|p| MatrixRow {
            pipeline: p.name.clone(),
            total: p.issues_count,
            none: p.issues_map.none_count(),
            label_counts: labels.iter().map(|label| p.issues_map.get(label)).collect(),
        })
        .collect();

    LabelMatrix { labels, rows }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::zenhub::{Issue, Pipeline, PipelineIssues};

    fn report(name: &str, total: usize, issues: &[&[&str]]) -> PipelineReport {
        PipelineReport::from(PipelineIssues {
            pipeline: Pipeline { id: name.to_lowercase(), name: name.to_string() },
            issues: issues
                .iter()
                .enumerate()
                .map(|(i, labels)| Issue {
                    id: format!("{name}-{i}"),
                    labels: labels.iter().map(ToString::to_string).collect(),
                })
                .collect(),
            issues_count: total,
            truncated: false,
        })
    }

    #[test]
    fn test_single_pipeline_row() {
        let pipelines = [report("A", 3, &[&[], &["Bug"], &["Bug", "UI"]])];

        let matrix = build_matrix(&pipelines);

        assert_eq!(matrix.columns(), ["Pipeline", "Total", "None", "Bug", "UI"]);
        assert_eq!(matrix.rows[0].cells(), ["A", "3", "1", "2", "1"]);
    }

    #[test]
    fn test_missing_labels_are_zero() {
        let pipelines = [report("A", 1, &[&["Bug"]]), report("B", 1, &[&["UI"]])];

        let matrix = build_matrix(&pipelines);

        assert_eq!(matrix.labels, ["Bug", "UI"]);
        assert_eq!(matrix.rows[0].label_counts, [1, 0]);
        assert_eq!(matrix.rows[1].label_counts, [0, 1]);
    }

    #[test]
    fn test_labels_sorted_regardless_of_first_seen_order() {
        let pipelines = [report("A", 2, &[&["zeta"], &["Alpha", "beta"]])];

        let matrix = build_matrix(&pipelines);

        assert_eq!(matrix.columns(), ["Pipeline", "Total", "None", "Alpha", "beta", "zeta"]);
    }

    #[test]
    fn test_label_named_none_keeps_its_own_column() {
        let pipelines = [report("A", 2, &[&["None"], &[]])];

        let matrix = build_matrix(&pipelines);

        // fixed third column counts unlabelled issues only
        assert_eq!(matrix.columns(), ["Pipeline", "Total", "None", "None"]);
        assert_eq!(matrix.rows[0].none, 1);
        assert_eq!(matrix.rows[0].cells(), ["A", "2", "1", "1"]);
    }

    #[test]
    fn test_total_keeps_server_count() {
        let pipelines = [report("A", 250, &[&["Bug"]])];

        let matrix = build_matrix(&pipelines);

        assert_eq!(matrix.rows[0].total, 250);
    }

    #[test]
    fn test_rebuild_is_identical() {
        let pipelines = [
            report("A", 4, &[&["UI", "Bug"], &[]]),
            report("B", 1, &[&["Docs"]]),
        ];

        assert_eq!(build_matrix(&pipelines), build_matrix(&pipelines));
    }

    #[test]
    fn test_no_pipelines() {
        let matrix = build_matrix(&[]);
        assert_eq!(matrix.columns(), FIXED_COLUMNS);
        assert!(matrix.rows.is_empty());
    }
}
