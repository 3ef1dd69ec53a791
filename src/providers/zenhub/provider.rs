use log::{info, warn};

use crate::auth::Token;
use crate::error::Result;
use crate::output::{print_repository_summary, ArtifactSink, ExportOutcome, Exporter, PhaseProgress};
use crate::report::{PipelineReport, RepositoryReport};

use super::client::ZenHubClient;
use super::label_counts::first_seen_labels;
use super::label_matrix::build_matrix;
use super::pagination::{collect_pipeline_issues, IssueSource};
use super::types::{Pipeline, Repository, RepositoryWorkspaces};

/// ZenHub label export provider.
///
/// Lists the workspace pipelines once, then for each repository pages in its issues,
/// counts labels per pipeline and hands the resulting report to an [`Exporter`].
pub struct ZenHubProvider {
    pub client: ZenHubClient,
    pub workspace_id: String,
    pub max_batches: usize,
}

impl ZenHubProvider {
    /// Creates a provider for one workspace.
    ///
    /// # Errors
    ///
    /// Returns an error if the endpoint URL is invalid or the HTTP client cannot be built.
    pub fn new(
        endpoint: &str,
        token: Token,
        workspace_id: String,
        page_size: usize,
        max_batches: usize,
    ) -> Result<Self> {
        let client = ZenHubClient::new(endpoint, token, page_size)?;

        Ok(Self {
            client,
            workspace_id,
            max_batches,
        })
    }

    pub async fn fetch_pipelines(&self) -> Result<Vec<Pipeline>> {
        info!("Retrieving list of pipelines...");
        let pipelines = self.client.fetch_pipelines(&self.workspace_id).await?;
        info!(
            "Workspace {} has {} pipelines",
            self.workspace_id,
            pipelines.len()
        );
        Ok(pipelines)
    }

    pub async fn discover_workspaces(
        &self,
        repositories: &[Repository],
    ) -> Result<Vec<RepositoryWorkspaces>> {
        let github_ids: Vec<i64> = repositories.iter().map(|r| r.gh_id).collect();
        self.client.fetch_workspaces_by_repo(&github_ids).await
    }

    /// Export every repository in order.
    ///
    /// Pipelines are listed once and shared; each repository starts from empty
    /// accumulators. A failed fetch aborts the run, a failed write does not.
    pub async fn export_repositories<S: ArtifactSink>(
        &self,
        repositories: &[Repository],
        exporter: &Exporter<S>,
    ) -> anyhow::Result<Vec<(Repository, ExportOutcome)>> {
        let pipelines = self.fetch_pipelines().await?;
        if pipelines.is_empty() {
            warn!("Workspace {} has no pipelines", self.workspace_id);
        }

        export_repositories(&self.client, &pipelines, repositories, self.max_batches, exporter)
            .await
    }
}

/// Page in, count and tabulate one repository's issues.
pub async fn build_repository_report<I: IssueSource>(
    source: &I,
    pipelines: &[Pipeline],
    repository: &Repository,
    max_batches: usize,
) -> Result<RepositoryReport> {
    let collected =
        collect_pipeline_issues(source, pipelines, repository.gh_id, max_batches).await?;

    let pipelines: Vec<PipelineReport> = collected.into_iter().map(PipelineReport::from).collect();

    for pipeline in &pipelines {
        info!(
            "{}: Retrieved {} issues in total",
            pipeline.name, pipeline.issues_count
        );
    }

    let matrix = build_matrix(&pipelines);

    Ok(RepositoryReport {
        repository: repository.clone(),
        pipelines,
        matrix,
    })
}

pub async fn export_repositories<I: IssueSource, S: ArtifactSink>(
    source: &I,
    pipelines: &[Pipeline],
    repositories: &[Repository],
    max_batches: usize,
    exporter: &Exporter<S>,
) -> anyhow::Result<Vec<(Repository, ExportOutcome)>> {
    let mut outcomes = Vec::with_capacity(repositories.len());

    for repository in repositories {
        info!("Retrieving info for {repository}...");

        let progress = PhaseProgress::start_fetching(&repository.name, max_batches);
        let report = match build_repository_report(source, pipelines, repository, max_batches).await
        {
            Ok(report) => report,
            Err(e) => {
                progress.abandon();
                return Err(anyhow::Error::new(e)
                    .context(format!("Failed to fetch issues for {}", repository.name)));
            }
        };

        let fetched: usize = report.pipelines.iter().map(|p| p.issues.len()).sum();
        let progress = progress.finish_fetching_start_counting(fetched);

        let label_count = first_seen_labels(report.pipelines.iter().map(|p| &p.issues_map)).len();
        let progress = progress.finish_counting_start_writing(label_count);

        let outcome = exporter.export(&report).await?;
        progress.finish_writing(outcome.is_complete());

        print_repository_summary(&report, &outcome);
        outcomes.push((repository.clone(), outcome));
    }

    Ok(outcomes)
}
