use anyhow::{Context, Result};
use log::{error, info};
use std::io::Write;
use std::path::{Path, PathBuf};

use super::retry::{retry_with_delay, RetryPolicy};
use crate::providers::zenhub::LabelMatrix;
use crate::report::{PipelineReport, RepositoryReport};

const CSV_DELIMITER: char = ',';
const CSV_NEWLINE: &str = "\r\n";

/// Destination for export files.
#[allow(async_fn_in_trait)]
pub trait ArtifactSink {
    async fn write(&self, path: &Path, contents: &str) -> std::io::Result<()>;
}

/// Writes artifacts to the local filesystem.
pub struct FsSink;

impl ArtifactSink for FsSink {
    async fn write(&self, path: &Path, contents: &str) -> std::io::Result<()> {
        tokio::fs::write(path, contents).await
    }
}

/// Whether an artifact made it to its sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    Written,
    /// Every attempt failed; the file may be missing or stale
    Abandoned,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExportOutcome {
    pub raw: WriteOutcome,
    pub csv: WriteOutcome,
}

impl ExportOutcome {
    pub fn is_complete(&self) -> bool {
        self.raw == WriteOutcome::Written && self.csv == WriteOutcome::Written
    }
}

/// Writes the raw JSON dump and the CSV matrix of each repository report.
pub struct Exporter<S = FsSink> {
    sink: S,
    output_dir: PathBuf,
    policy: RetryPolicy,
    pretty: bool,
}

impl Exporter<FsSink> {
    pub fn to_filesystem(output_dir: impl Into<PathBuf>, policy: RetryPolicy, pretty: bool) -> Self {
        Self::new(FsSink, output_dir, policy, pretty)
    }

    /// Create the output directory if it does not exist yet.
    pub async fn prepare(&self) -> Result<()> {
        tokio::fs::create_dir_all(&self.output_dir)
            .await
            .with_context(|| {
                format!("Failed to create output directory: {}", self.output_dir.display())
            })
    }
}

impl<S: ArtifactSink> Exporter<S> {
    pub fn new(sink: S, output_dir: impl Into<PathBuf>, policy: RetryPolicy, pretty: bool) -> Self {
        Self {
            sink,
            output_dir: output_dir.into(),
            policy,
            pretty,
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Write both artifacts for `report`.
    ///
    /// A file that cannot be written after every retry is logged and skipped; the other
    /// artifact is still attempted.
    ///
    /// # Errors
    ///
    /// Only rendering failures are returned; write failures are reported in the outcome.
    pub async fn export(&self, report: &RepositoryReport) -> Result<ExportOutcome> {
        let raw = render_raw_json(&report.pipelines, self.pretty)?;
        let raw = self.write_artifact(&report.raw_file_name(), &raw).await;

        let mut csv = Vec::new();
        render_csv(&report.matrix, &mut csv)?;
        let csv = String::from_utf8(csv).context("CSV output is not valid UTF-8")?;
        let csv = self.write_artifact(&report.csv_file_name(), &csv).await;

        Ok(ExportOutcome { raw, csv })
    }

    /// Write one file, retrying per the policy. Never fails.
    pub async fn write_artifact(&self, file_name: &str, contents: &str) -> WriteOutcome {
        let path = self.output_dir.join(file_name);
        let what = format!("Writing {}", path.display());

        match retry_with_delay(&self.policy, &what, || self.sink.write(&path, contents)).await {
            Ok(()) => {
                info!("Wrote {}", path.display());
                WriteOutcome::Written
            }
            Err(e) => {
                error!(
                    "Could not write {} after {} attempts ({e}). Continuing...",
                    path.display(),
                    self.policy.max_attempts
                );
                WriteOutcome::Abandoned
            }
        }
    }
}

/// Serialize the accumulated pipeline state for auditing.
pub fn render_raw_json(pipelines: &[PipelineReport], pretty: bool) -> Result<String> {
    let json = if pretty {
        serde_json::to_string_pretty(pipelines)?
    } else {
        serde_json::to_string(pipelines)?
    };
    Ok(json)
}

/// Write the label matrix as CSV: header row first, CRLF between rows, no trailing newline.
pub fn render_csv(matrix: &LabelMatrix, output: &mut dyn Write) -> Result<()> {
    write_csv_record(output, matrix.columns())?;

    for row in &matrix.rows {
        write!(output, "{CSV_NEWLINE}")?;
        write_csv_record(output, row.cells())?;
    }

    Ok(())
}

fn write_csv_record<I, F>(output: &mut dyn Write, fields: I) -> Result<()>
where
    I: IntoIterator<Item = F>,
    F: AsRef<str>,
{
    for (i, field) in fields.into_iter().enumerate() {
        if i > 0 {
            write!(output, "{CSV_DELIMITER}")?;
        }
        write!(output, "{}", escape_csv_field(field.as_ref()))?;
    }
    Ok(())
}

fn escape_csv_field(field: &str) -> std::borrow::Cow<'_, str> {
    let needs_quotes = field.contains([CSV_DELIMITER, '"', '\r', '\n'])
        || field.starts_with(' ')
        || field.ends_with(' ');

    if needs_quotes {
        format!("\"{}\"", field.replace('"', "\"\"")).into()
    } else {
        field.into()
    }
}
