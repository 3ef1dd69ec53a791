use std::fmt::Write;

use comfy_table::Cell;

use crate::providers::zenhub::{Pipeline, RepositoryWorkspaces, FIXED_COLUMNS};
use crate::report::RepositoryReport;

use super::exports::{ExportOutcome, WriteOutcome};
use super::styling::{paint, Tone};
use super::tables::{count_cell, create_cyan_header, create_table, fetched_cell};

/// Prints the label matrix of one repository to stderr, with the fetched issue count
/// next to the server total so truncated pipelines stand out.
pub fn print_repository_summary(report: &RepositoryReport, outcome: &ExportOutcome) {
    eprintln!("{}", render_repository_summary(report, outcome));
}

fn add_section_header(output: &mut String, emoji: &str, title: &str) {
    let _ = writeln!(
        output,
        "{} {}",
        paint(Tone::Heading, emoji),
        paint(Tone::Heading, title).underlined()
    );
}

fn outcome_label(outcome: WriteOutcome) -> console::StyledObject<String> {
    match outcome {
        WriteOutcome::Written => paint(Tone::Done, "written"),
        WriteOutcome::Abandoned => paint(Tone::Failed, "not written"),
    }
}

fn render_repository_summary(report: &RepositoryReport, outcome: &ExportOutcome) -> String {
    let mut output = String::new();

    add_section_header(&mut output, "📊", &format!("Labels for {}", report.repository.name));

    let mut header: Vec<&str> = vec![FIXED_COLUMNS[0], FIXED_COLUMNS[1], "Fetched"];
    header.extend(report.matrix.columns().into_iter().skip(2));

    let mut table = create_table();
    table.set_header(create_cyan_header(&header[..]));

    for (row, pipeline) in report.matrix.rows.iter().zip(&report.pipelines) {
        let mut cells = vec![
            Cell::new(&row.pipeline),
            Cell::new(row.total),
            fetched_cell(pipeline.issues.len(), row.total),
            count_cell(row.none),
        ];
        cells.extend(row.label_counts.iter().map(|&count| count_cell(count)));
        table.add_row(cells);
    }

    let _ = writeln!(output, "{table}");

    let truncated: Vec<&str> = report
        .truncated_pipelines()
        .map(|p| p.name.as_str())
        .collect();
    if !truncated.is_empty() {
        let _ = writeln!(
            output,
            "  {} {}",
            paint(Tone::Pending, "Batch limit reached for:"),
            truncated.join(", ")
        );
    }

    let _ = writeln!(
        output,
        "  {} {} {}\n  {} {} {}",
        paint(Tone::Muted, "Raw dump:"),
        paint(Tone::Path, report.raw_file_name()),
        outcome_label(outcome.raw),
        paint(Tone::Muted, "CSV:"),
        paint(Tone::Path, report.csv_file_name()),
        outcome_label(outcome.csv),
    );

    output
}

/// Table of a workspace's pipelines, in board order.
pub fn render_pipelines(workspace_id: &str, pipelines: &[Pipeline]) -> String {
    let mut output = String::new();
    add_section_header(&mut output, "🗂️", &format!("Pipelines in workspace {workspace_id}"));

    let mut table = create_table();
    table.set_header(create_cyan_header(&["#", "Name", "ID"]));
    for (i, pipeline) in pipelines.iter().enumerate() {
        table.add_row(vec![
            Cell::new(i + 1),
            Cell::new(&pipeline.name),
            Cell::new(&pipeline.id),
        ]);
    }

    let _ = writeln!(output, "{table}");
    output
}

/// Table of the workspaces each repository belongs to.
pub fn render_workspaces(found: &[RepositoryWorkspaces]) -> String {
    let mut output = String::new();
    add_section_header(&mut output, "🧭", "Workspaces");

    let mut table = create_table();
    table.set_header(create_cyan_header(&[
        "Repository ID",
        "Workspace",
        "Workspace ID",
        "Repositories",
    ]));

    for repo in found {
        for workspace in &repo.workspaces {
            let repositories = workspace
                .repositories
                .iter()
                .map(|r| format!("{} ({})", r.name, r.gh_id))
                .collect::<Vec<_>>()
                .join("\n");

            table.add_row(vec![
                Cell::new(&repo.repository_id),
                Cell::new(&workspace.name),
                Cell::new(&workspace.id),
                Cell::new(repositories),
            ]);
        }
    }

    let _ = writeln!(output, "{table}");
    output
}
