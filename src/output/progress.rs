use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

use super::styling::{paint, Tone};

/// Spinner for the three phases of exporting one repository
pub struct PhaseProgress {
    pb: ProgressBar,
}

impl PhaseProgress {
    pub fn start_fetching(repository: &str, max_batches: usize) -> Self {
        eprintln!(
            "{}  {}",
            paint(Tone::Heading, "⚙️"),
            paint(Tone::Heading, repository).underlined()
        );
        let pb = create_spinner(
            paint(
                Tone::Pending,
                format!("Phase 1/3: Fetching issues (up to {max_batches} batches)"),
            )
            .to_string(),
        );
        Self { pb }
    }

    pub fn finish_fetching_start_counting(self, issue_count: usize) -> Self {
        self.pb.finish_with_message(
            paint(Tone::Done, format!("Phase 1/3: Fetched {issue_count} issues ✓")).to_string(),
        );
        let pb = create_spinner(paint(Tone::Pending, "Phase 2/3: Counting labels").to_string());
        Self { pb }
    }

    pub fn finish_counting_start_writing(self, label_count: usize) -> Self {
        self.pb.finish_with_message(
            paint(Tone::Done, format!("Phase 2/3: Counted {label_count} labels ✓")).to_string(),
        );
        let pb = create_spinner(paint(Tone::Pending, "Phase 3/3: Writing exports").to_string());
        Self { pb }
    }

    pub fn finish_writing(self, complete: bool) {
        if complete {
            self.pb.finish_with_message(
                paint(Tone::Done, "Phase 3/3: Exports written ✓").to_string(),
            );
        } else {
            self.pb.finish_with_message(
                paint(Tone::Failed, "Phase 3/3: Some exports could not be written ✗").to_string(),
            );
        }
    }

    /// Stop the spinner without a success mark, e.g. when the phase failed.
    pub fn abandon(self) {
        self.pb.abandon();
    }
}

fn create_spinner(message: String) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_draw_target(ProgressDrawTarget::stderr());
    if let Ok(style) = ProgressStyle::default_spinner().template("  {msg} {spinner}") {
        pb.set_style(style);
    }
    pb.set_message(message);
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}
