mod exports;
mod progress;
mod retry;
mod styling;
mod summary;
mod tables;

pub use exports::{ArtifactSink, ExportOutcome, Exporter};
pub use progress::PhaseProgress;
pub use retry::RetryPolicy;
use styling::{paint, Tone};
pub use summary::{print_repository_summary, render_pipelines, render_workspaces};

/// Prints the `BoardLens` banner to stderr.
pub fn print_banner() {
    eprintln!(
        r"
{} {}
  {}
",
        paint(Tone::Banner, "🏷️ BoardLens"),
        paint(Tone::Muted, env!("CARGO_PKG_VERSION")),
        paint(Tone::Muted, "ZenHub label export")
    );
}
