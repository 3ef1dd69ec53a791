mod core;
mod issues;
mod pipelines;
mod workspaces;

pub use self::core::ZenHubClient;

#[cfg(test)]
mod tests {
    use mockito::Matcher;
    use serde_json::json;

    use super::*;
    use crate::auth::Token;
    use crate::error::BoardLensError;
    use crate::providers::zenhub::pagination::{IssueSource, PageRequest};
    use crate::providers::zenhub::types::{Issue, Pipeline};

    fn client_for(server: &mockito::ServerGuard) -> ZenHubClient {
        ZenHubClient::new(
            &format!("{}/public/graphql", server.url()),
            Token::from("test-token"),
            100,
        )
        .unwrap()
    }

    fn issues_page(total: usize, ids: &[(&str, Vec<&str>)], next: Option<&str>) -> serde_json::Value {
        json!({
            "data": {
                "searchIssuesByPipeline": {
                    "totalCount": total,
                    "nodes": ids.iter().map(|(id, labels)| json!({
                        "id": id,
                        "labels": { "nodes": labels.iter().map(|l| json!({ "name": l })).collect::<Vec<_>>() }
                    })).collect::<Vec<_>>(),
                    "pageInfo": { "hasNextPage": next.is_some(), "endCursor": next }
                }
            }
        })
    }

    #[tokio::test]
    async fn test_fetch_pipelines() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/public/graphql")
            .match_header("authorization", "Bearer test-token")
            .match_body(Matcher::PartialJson(json!({
                "operationName": "PipelinesByWorkspace",
                "variables": { "workspaceId": "ws-1" }
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!({
                    "data": {
                        "workspace": {
                            "name": "Board",
                            "pipelinesConnection": {
                                "nodes": [
                                    { "name": "New Issues", "id": "p1" },
                                    { "name": "Done", "id": "p2" }
                                ],
                                "totalCount": 2
                            }
                        }
                    }
                })
                .to_string(),
            )
            .create_async()
            .await;

        let pipelines = client_for(&server).fetch_pipelines("ws-1").await.unwrap();

        mock.assert_async().await;
        assert_eq!(
            pipelines,
            vec![
                Pipeline { id: "p1".into(), name: "New Issues".into() },
                Pipeline { id: "p2".into(), name: "Done".into() },
            ]
        );
    }

    #[tokio::test]
    async fn test_fetch_pipelines_unknown_workspace() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/public/graphql")
            .with_status(200)
            .with_body(json!({ "data": { "workspace": null } }).to_string())
            .create_async()
            .await;

        let err = client_for(&server).fetch_pipelines("missing").await.unwrap_err();
        assert!(matches!(err, BoardLensError::WorkspaceNotFound(id) if id == "missing"));
    }

    #[test]
    fn test_search_issues_body_first_page() {
        let client = ZenHubClient::new(
            "https://api.zenhub.com/public/graphql",
            Token::from("test-token"),
            25,
        )
        .unwrap();

        let body = client.search_issues_body(
            75_637_129,
            &PageRequest { pipeline_id: "p1".into(), after: None },
        );

        assert_eq!(body.operation_name, "SearchIssuesByPipeline");
        assert!(body.query.contains("searchIssuesByPipeline(pipelineId: $pipelineID"));

        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value["variables"]["pipelineID"], "p1");
        assert_eq!(value["variables"]["first"], 25);
        assert_eq!(
            value["variables"]["filters"],
            json!({ "repositoryGhIds": [75_637_129], "displayType": "issues" })
        );
        assert!(value["variables"]["after"].is_null());
    }

    #[tokio::test]
    async fn test_search_issues_batch_sends_one_request() {
        let mut server = mockito::Server::new_async().await;
        let body = json!([
            issues_page(3, &[("i1", vec![]), ("i2", vec!["Bug", "UI"])], Some("cursor-a2")),
            issues_page(0, &[], None),
        ]);
        let mock = server
            .mock("POST", "/public/graphql")
            .match_header("authorization", "Bearer test-token")
            .match_body(Matcher::AllOf(vec![
                Matcher::Regex(r#"^\["#.to_string()),
                Matcher::Regex(r#""pipelineID":"p1""#.to_string()),
                Matcher::Regex(r#""after":"cursor-a1""#.to_string()),
                Matcher::Regex(r#""repositoryGhIds":\[80439269\]"#.to_string()),
                Matcher::Regex(r#""displayType":"issues""#.to_string()),
                Matcher::Regex(r#""first":100"#.to_string()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(body.to_string())
            .expect(1)
            .create_async()
            .await;

        let requests = vec![
            PageRequest { pipeline_id: "p1".into(), after: Some("cursor-a1".into()) },
            PageRequest { pipeline_id: "p2".into(), after: None },
        ];
        let pages = client_for(&server)
            .search_issues_batch(80_439_269, &requests)
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(pages.len(), 2);
        assert_eq!(pages[0].total_count, 3);
        assert!(pages[0].has_next_page);
        assert_eq!(pages[0].end_cursor.as_deref(), Some("cursor-a2"));
        assert_eq!(
            pages[0].issues[1],
            Issue { id: "i2".into(), labels: vec!["Bug".into(), "UI".into()] }
        );
        assert!(pages[0].issues[0].labels.is_empty());
        assert!(!pages[1].has_next_page);
        assert!(pages[1].issues.is_empty());
    }

    #[tokio::test]
    async fn test_search_issues_batch_size_mismatch() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/public/graphql")
            .with_status(200)
            .with_body(json!([issues_page(0, &[], None)]).to_string())
            .create_async()
            .await;

        let requests = vec![
            PageRequest { pipeline_id: "p1".into(), after: None },
            PageRequest { pipeline_id: "p2".into(), after: None },
        ];
        let err = client_for(&server)
            .search_issues_batch(1, &requests)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            BoardLensError::BatchSizeMismatch { expected: 2, actual: 1 }
        ));
    }

    #[tokio::test]
    async fn test_graphql_errors_fail_the_batch() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/public/graphql")
            .with_status(200)
            .with_body(
                json!([
                    issues_page(0, &[], None),
                    { "data": null, "errors": [{ "message": "Pipeline not found" }] }
                ])
                .to_string(),
            )
            .create_async()
            .await;

        let requests = vec![
            PageRequest { pipeline_id: "p1".into(), after: None },
            PageRequest { pipeline_id: "bad".into(), after: None },
        ];
        let err = client_for(&server)
            .search_issues_batch(1, &requests)
            .await
            .unwrap_err();

        match err {
            BoardLensError::GraphQLError { errors, .. } => {
                assert_eq!(errors, "Pipeline not found");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_http_error_is_not_retried() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/public/graphql")
            .with_status(502)
            .with_body("bad gateway")
            .expect(1)
            .create_async()
            .await;

        let err = client_for(&server).fetch_pipelines("ws-1").await.unwrap_err();

        mock.assert_async().await;
        match err {
            BoardLensError::ApiError { status, message } => {
                assert_eq!(status, 502);
                assert_eq!(message, "bad gateway");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_fetch_workspaces_by_repo() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/public/graphql")
            .match_body(Matcher::PartialJson(json!({
                "operationName": "WorkspacesByRepo",
                "variables": { "githubIds": [80439269, 75637129] }
            })))
            .with_status(200)
            .with_body(
                json!({
                    "data": {
                        "repositoriesByGhId": [{
                            "id": "zr-1",
                            "workspacesConnection": {
                                "nodes": [{
                                    "id": "ws-1",
                                    "name": "AMO",
                                    "description": null,
                                    "repositoriesConnection": {
                                        "nodes": [{ "id": "zr-1", "ghId": 80439269, "name": "MEASUR" }]
                                    }
                                }]
                            }
                        }]
                    }
                })
                .to_string(),
            )
            .create_async()
            .await;

        let found = client_for(&server)
            .fetch_workspaces_by_repo(&[80_439_269, 75_637_129])
            .await
            .unwrap();

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].repository_id, "zr-1");
        assert_eq!(found[0].workspaces[0].id, "ws-1");
        assert_eq!(found[0].workspaces[0].repositories[0].gh_id, 80_439_269);
    }
}
