use std::fmt;

use crate::error::{BoardLensError, Result};

/// Name of the environment variable holding the ZenHub API key.
pub const TOKEN_ENV_VAR: &str = "zenhub_token";

/// Bearer token for the ZenHub GraphQL API.
#[derive(Clone, PartialEq, Eq)]
pub struct Token(String);

impl Token {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Picks the first non-empty candidate, in priority order.
    ///
    /// Fails with [`BoardLensError::MissingToken`] when none is set, so callers can abort
    /// before any request is issued.
    pub fn resolve<'a>(candidates: impl IntoIterator<Item = Option<&'a str>>) -> Result<Self> {
        candidates
            .into_iter()
            .flatten()
            .map(str::trim)
            .find(|t| !t.is_empty())
            .map(Token::from)
            .ok_or(BoardLensError::MissingToken)
    }
}

impl From<&str> for Token {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Token(****)")
    }
}
