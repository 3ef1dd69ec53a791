mod client;
mod label_counts;
pub(crate) mod label_matrix;
mod pagination;
mod provider;
pub(crate) mod types;


pub use label_counts::LabelCounts;
pub use label_matrix::{LabelMatrix, FIXED_COLUMNS};
pub use provider::ZenHubProvider;
pub use types::{Issue, Pipeline, PipelineIssues, Repository, RepositoryWorkspaces};
