//! Batched, multi-cursor pagination over pipeline issue searches.
//!
//! Every round sends one request, but it does not query every pipeline: it carries a
//! sub-query only for the pipelines that still have pages to fetch. A pipeline whose
//! last page came back is dropped from all later rounds, so a round never re-fetches a
//! finished pipeline's first page and the request shrinks as pipelines finish.
//!
//! Each pipeline walks its own small state machine. The loop ends when no pipeline has
//! more pages or when the round cap is reached, whichever comes first.

use log::{debug, info, warn};

use crate::error::Result;

use super::types::{Issue, Pipeline, PipelineIssues};

/// One sub-query of a batch: which pipeline, and where to resume it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub pipeline_id: String,
    /// `None` requests the first page
    pub after: Option<String>,
}

/// One page of a pipeline's issue search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuePage {
    /// Total matching issues in the pipeline, as reported by the server
    pub total_count: usize,
    pub issues: Vec<Issue>,
    pub has_next_page: bool,
    pub end_cursor: Option<String>,
}

/// Source of issue pages. Implemented by the ZenHub client and by scripted fakes in tests.
#[allow(async_fn_in_trait)]
pub trait IssueSource {
    /// Run one batch. Must return exactly one page per request, in request order.
    async fn search_issues_batch(
        &self,
        repository_gh_id: i64,
        requests: &[PageRequest],
    ) -> Result<Vec<IssuePage>>;
}

/// Pagination progress of a single pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageState {
    /// Nothing requested yet
    Fetching,
    /// The server reported more pages, resume after this cursor
    HasMore(String),
    /// Last page seen
    Exhausted,
}

impl PageState {
    fn is_pending(&self) -> bool {
        !matches!(self, Self::Exhausted)
    }

    fn cursor(&self) -> Option<String> {
        match self {
            Self::HasMore(cursor) => Some(cursor.clone()),
            Self::Fetching | Self::Exhausted => None,
        }
    }

    fn after_page(page: &IssuePage) -> Self {
        match (&page.end_cursor, page.has_next_page) {
            (Some(cursor), true) => Self::HasMore(cursor.clone()),
            // hasNextPage without a cursor cannot be resumed
            _ => Self::Exhausted,
        }
    }
}

/// True while at least one pipeline still has pages to fetch.
pub fn has_pending(states: &[PageState]) -> bool {
    states.iter().any(PageState::is_pending)
}

/// Page through every pipeline's issues for one repository.
///
/// Runs at most `max_batches` rounds. Pipelines still holding a cursor when the cap is
/// hit are marked `truncated`; their `issues_count` keeps the server total, which is then
/// larger than the number of issues collected.
///
/// # Errors
///
/// Any failed round aborts the whole collection.
pub async fn collect_pipeline_issues<S: IssueSource>(
    source: &S,
    pipelines: &[Pipeline],
    repository_gh_id: i64,
    max_batches: usize,
) -> Result<Vec<PipelineIssues>> {
    let mut collected: Vec<PipelineIssues> =
        pipelines.iter().cloned().map(PipelineIssues::new).collect();
    let mut states = vec![PageState::Fetching; pipelines.len()];

    for batch in 0..max_batches {
        if !has_pending(&states) {
            break;
        }

        info!("Batch # {}...", batch + 1);

        let pending: Vec<usize> = (0..states.len())
            .filter(|&i| states[i].is_pending())
            .collect();

        let requests: Vec<PageRequest> = pending
            .iter()
            .map(|&i| PageRequest {
                pipeline_id: collected[i].pipeline.id.clone(),
                after: states[i].cursor(),
            })
            .collect();

        let pages = source
            .search_issues_batch(repository_gh_id, &requests)
            .await?;

        for (&i, page) in pending.iter().zip(pages) {
            debug!(
                "Pipeline '{}' returned {} issues (total {}, more: {})",
                collected[i].pipeline.name,
                page.issues.len(),
                page.total_count,
                page.has_next_page
            );

            states[i] = PageState::after_page(&page);

            let pipeline = &mut collected[i];
            pipeline.issues_count = page.total_count;
            pipeline.issues.extend(page.issues);
        }
    }

    for (pipeline, state) in collected.iter_mut().zip(&states) {
        if state.is_pending() {
            pipeline.truncated = true;
            warn!(
                "Pipeline '{}' stopped after {max_batches} batches with {} of {} issues",
                pipeline.pipeline.name,
                pipeline.issues.len(),
                pipeline.issues_count
            );
        }
    }

    Ok(collected)
}
