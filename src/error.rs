use thiserror::Error;

#[derive(Error, Debug)]
pub enum BoardLensError {
    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error(
        "Could not find a ZenHub API key. Please create a GraphQL Personal API Key for ZenHub \
         (https://app.zenhub.com/settings/tokens) and then set it as an environment variable \
         called \"zenhub_token\"."
    )]
    MissingToken,

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("ZenHub API error (status {status}): {message}")]
    ApiError { status: u16, message: String },

    #[error("GraphQL errors in {query_type}: {errors}")]
    GraphQLError { query_type: String, errors: String },

    #[error("GraphQL response contained no data")]
    NoResponseData,

    #[error("Batch response had {actual} entries, expected {expected}")]
    BatchSizeMismatch { expected: usize, actual: usize },

    #[error("Workspace '{0}' not found")]
    WorkspaceNotFound(String),
}

pub type Result<T> = std::result::Result<T, BoardLensError>;
