use graphql_client::GraphQLQuery;

use super::core::ZenHubClient;
use crate::error::{BoardLensError, Result};
use crate::providers::zenhub::types::Pipeline;

#[derive(GraphQLQuery)]
#[graphql(
    schema_path = "graphql/zenhub_schema.graphql",
    query_path = "graphql/pipelines_by_workspace.graphql",
    response_derives = "Debug,PartialEq,Clone"
)]
pub struct PipelinesByWorkspace;

impl ZenHubClient {
    /// Fetch the pipelines (board columns) of a workspace, in board order.
    ///
    /// ZenHub returns at most 50 pipelines; a workspace with more is truncated and a
    /// warning is logged.
    ///
    /// # Errors
    /// Returns an error if:
    /// * The request or GraphQL query fails
    /// * The workspace does not exist or is not visible to the token
    pub async fn fetch_pipelines(&self, workspace_id: &str) -> Result<Vec<Pipeline>> {
        let request_body = PipelinesByWorkspace::build_query(pipelines_by_workspace::Variables {
            workspace_id: workspace_id.to_string(),
        });

        let data: pipelines_by_workspace::ResponseData =
            self.execute_graphql_request(&request_body).await?;

        let workspace = data
            .workspace
            .ok_or_else(|| BoardLensError::WorkspaceNotFound(workspace_id.to_string()))?;

        let connection = workspace.pipelines_connection;
        if usize::try_from(connection.total_count).unwrap_or_default() > connection.nodes.len() {
            log::warn!(
                "Workspace '{}' has {} pipelines, only the first {} are exported",
                workspace.name,
                connection.total_count,
                connection.nodes.len()
            );
        }

        Ok(connection
            .nodes
            .into_iter()
            .map(|node| Pipeline {
                id: node.id,
                name: node.name,
            })
            .collect())
    }
}
