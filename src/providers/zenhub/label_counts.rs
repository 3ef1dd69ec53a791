use indexmap::IndexMap;
use serde::ser::{Serialize, SerializeMap, Serializer};

use super::types::Issue;

/// Synthetic label counting issues that carry no labels at all.
pub const NO_LABEL: &str = "None";

/// Issue count per label for one pipeline.
///
/// Unlabelled issues are counted apart from real labels, so a label that happens to be
/// named `None` never feeds the unlabelled count. Real labels keep first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabelCounts {
    unlabelled: usize,
    labels: IndexMap<String, usize>,
}

impl LabelCounts {
    /// Count label occurrences across `issues`.
    ///
    /// An issue with N labels bumps N counters; an issue with none bumps only the
    /// unlabelled count.
    pub fn tabulate(issues: &[Issue]) -> Self {
        let mut counts = Self::default();
        for issue in issues {
            counts.record(issue);
        }
        counts
    }

    fn record(&mut self, issue: &Issue) {
        if issue.labels.is_empty() {
            self.unlabelled += 1;
            return;
        }

        for label in &issue.labels {
            *self.labels.entry(label.clone()).or_insert(0) += 1;
        }
    }

    /// Count for the real label `label`, zero when never seen.
    pub fn get(&self, label: &str) -> usize {
        self.labels.get(label).copied().unwrap_or(0)
    }

    /// Issues carrying no label at all.
    pub fn none_count(&self) -> usize {
        self.unlabelled
    }

    /// Real label names in first-seen order.
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.labels.keys().map(String::as_str)
    }
}

/// Serializes as one object: `NO_LABEL` first, then real labels in first-seen order.
///
/// A real label literally named `None` cannot share the object with the unlabelled
/// count, so it is left out here. The issue list and the CSV matrix still carry it.
impl Serialize for LabelCounts {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let real = self.labels.iter().filter(|(label, _)| label.as_str() != NO_LABEL);

        let mut map = serializer.serialize_map(Some(1 + real.clone().count()))?;
        map.serialize_entry(NO_LABEL, &self.unlabelled)?;
        for (label, count) in real {
            map.serialize_entry(label, count)?;
        }
        map.end()
    }
}

/// Distinct label names across several pipelines, in the order they were first seen.
pub fn first_seen_labels<'a>(counts: impl IntoIterator<Item = &'a LabelCounts>) -> Vec<String> {
    let mut seen = indexmap::IndexSet::new();
    for pipeline_counts in counts {
        for label in pipeline_counts.labels() {
            seen.insert(label.to_string());
        }
    }
    seen.into_iter().collect()
}
