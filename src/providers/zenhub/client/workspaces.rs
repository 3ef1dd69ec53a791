use graphql_client::GraphQLQuery;

use super::core::ZenHubClient;
use crate::error::Result;
use crate::providers::zenhub::types::{RepositoryWorkspaces, Workspace, WorkspaceRepository};

/// Looks up the workspaces a set of GitHub repositories belong to
#[derive(GraphQLQuery)]
#[graphql(
    schema_path = "graphql/zenhub_schema.graphql",
    query_path = "graphql/workspaces_by_repo.graphql",
    response_derives = "Debug,PartialEq,Clone"
)]
pub struct WorkspacesByRepo;

impl ZenHubClient {
    /// Resolve the ZenHub workspaces containing each of the given GitHub repositories.
    ///
    /// Used to find the workspace id to configure; the export itself never calls this.
    pub async fn fetch_workspaces_by_repo(
        &self,
        github_ids: &[i64],
    ) -> Result<Vec<RepositoryWorkspaces>> {
        let request_body = WorkspacesByRepo::build_query(workspaces_by_repo::Variables {
            github_ids: github_ids.to_vec(),
        });

        let data: workspaces_by_repo::ResponseData =
            self.execute_graphql_request(&request_body).await?;

        Ok(data
            .repositories_by_gh_id
            .into_iter()
            .map(|repo| RepositoryWorkspaces {
                repository_id: repo.id,
                workspaces: repo
                    .workspaces_connection
                    .nodes
                    .into_iter()
                    .map(|ws| Workspace {
                        id: ws.id,
                        name: ws.name,
                        description: ws.description,
                        repositories: ws
                            .repositories_connection
                            .nodes
                            .into_iter()
                            .map(|r| WorkspaceRepository {
                                id: r.id,
                                gh_id: r.gh_id,
                                name: r.name,
                            })
                            .collect(),
                    })
                    .collect(),
            })
            .collect())
    }
}
