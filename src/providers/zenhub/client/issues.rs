use graphql_client::{GraphQLQuery, QueryBody};

use super::core::ZenHubClient;
use crate::error::Result;
use crate::providers::zenhub::pagination::{IssuePage, IssueSource, PageRequest};
use crate::providers::zenhub::types::Issue;

/// Issue search scoped to one pipeline and a set of GitHub repositories
#[derive(GraphQLQuery)]
#[graphql(
    schema_path = "graphql/zenhub_schema.graphql",
    query_path = "graphql/issues_by_pipeline.graphql",
    response_derives = "Debug,PartialEq,Clone"
)]
pub struct SearchIssuesByPipeline;

/// Only plain issues; pull requests are excluded
const DISPLAY_TYPE_ISSUES: &str = "issues";

impl From<search_issues_by_pipeline::ResponseData> for IssuePage {
    fn from(data: search_issues_by_pipeline::ResponseData) -> Self {
        let search = data.search_issues_by_pipeline;

        Self {
            total_count: usize::try_from(search.total_count).unwrap_or_default(),
            issues: search
                .nodes
                .into_iter()
                .map(|node| Issue {
                    id: node.id,
                    labels: node.labels.nodes.into_iter().map(|l| l.name).collect(),
                })
                .collect(),
            has_next_page: search.page_info.has_next_page,
            end_cursor: search.page_info.end_cursor,
        }
    }
}

impl ZenHubClient {
    pub(super) fn search_issues_body(
        &self,
        repository_gh_id: i64,
        request: &PageRequest,
    ) -> QueryBody<search_issues_by_pipeline::Variables> {
        #[allow(clippy::cast_possible_wrap)]
        let variables = search_issues_by_pipeline::Variables {
            pipeline_id: request.pipeline_id.clone(),
            filters: search_issues_by_pipeline::IssueSearchFiltersInput {
                repository_gh_ids: Some(vec![repository_gh_id]),
                display_type: Some(DISPLAY_TYPE_ISSUES.to_string()),
            },
            after: request.after.clone(),
            first: self.page_size as i64,
        };

        SearchIssuesByPipeline::build_query(variables)
    }
}

impl IssueSource for ZenHubClient {
    async fn search_issues_batch(
        &self,
        repository_gh_id: i64,
        requests: &[PageRequest],
    ) -> Result<Vec<IssuePage>> {
        let bodies: Vec<_> = requests
            .iter()
            .map(|request| self.search_issues_body(repository_gh_id, request))
            .collect();

        let data: Vec<search_issues_by_pipeline::ResponseData> =
            self.execute_graphql_batch(&bodies).await?;

        Ok(data.into_iter().map(IssuePage::from).collect())
    }
}
