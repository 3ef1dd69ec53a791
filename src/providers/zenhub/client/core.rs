use graphql_client::Response as GraphQLResponse;
use log::debug;
use reqwest::Client;
use url::Url;

use crate::auth::Token;
use crate::error::{BoardLensError, Result};

/// Authenticated client for ZenHub's public GraphQL endpoint.
///
/// Requests are not retried; any failure surfaces to the caller.
pub struct ZenHubClient {
    pub client: Client,
    pub graphql_url: Url,
    pub token: Token,
    pub page_size: usize,
}

impl ZenHubClient {
    pub fn new(endpoint: &str, token: Token, page_size: usize) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("BoardLens/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| BoardLensError::Config(format!("Failed to create HTTP client: {e}")))?;

        let graphql_url = Url::parse(endpoint)
            .map_err(|e| BoardLensError::Config(format!("Invalid GraphQL URL: {e}")))?;

        Ok(Self {
            client,
            graphql_url,
            token,
            page_size,
        })
    }

    pub fn auth_request(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        request.bearer_auth(self.token.as_str())
    }

    async fn post(&self, body: &impl serde::Serialize) -> Result<reqwest::Response> {
        let request = self.auth_request(self.client.post(self.graphql_url.clone()).json(body));
        let response = request.send().await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read error response".to_string());
            return Err(BoardLensError::ApiError {
                status: status.as_u16(),
                message: error_text,
            });
        }

        Ok(response)
    }

    /// Execute a single GraphQL request and return its data after checking for errors
    pub(super) async fn execute_graphql_request<T>(
        &self,
        request_body: &impl serde::Serialize,
    ) -> Result<T>
    where
        T: serde::de::DeserializeOwned,
    {
        let response_body: GraphQLResponse<T> = self.post(request_body).await?.json().await?;
        unwrap_response(response_body)
    }

    /// Execute several GraphQL requests in one HTTP round trip.
    ///
    /// The body is a JSON array of queries and the server answers with an array of
    /// responses in the same order. A GraphQL error in any entry fails the whole batch.
    pub(super) async fn execute_graphql_batch<B, T>(&self, request_bodies: &[B]) -> Result<Vec<T>>
    where
        B: serde::Serialize,
        T: serde::de::DeserializeOwned,
    {
        debug!("Sending batch of {} GraphQL queries", request_bodies.len());

        let responses: Vec<GraphQLResponse<T>> =
            self.post(&request_bodies).await?.json().await?;

        if responses.len() != request_bodies.len() {
            return Err(BoardLensError::BatchSizeMismatch {
                expected: request_bodies.len(),
                actual: responses.len(),
            });
        }

        responses.into_iter().map(unwrap_response).collect()
    }
}

fn unwrap_response<T>(response_body: GraphQLResponse<T>) -> Result<T> {
    if let Some(errors) = response_body.errors.filter(|errors| !errors.is_empty()) {
        return Err(BoardLensError::GraphQLError {
            query_type: std::any::type_name::<T>().to_string(),
            errors: errors
                .iter()
                .map(|e| e.message.as_str())
                .collect::<Vec<_>>()
                .join(", "),
        });
    }

    response_body.data.ok_or(BoardLensError::NoResponseData)
}
