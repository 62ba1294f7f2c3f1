use thiserror::Error;

/// Top-level error type returned by searchnorm operations.
#[derive(Debug, Error)]
pub enum QueryError {
    /// A negated value (`!x`) whose remainder is not a JSON literal.
    #[error("malformed negation for field `{field}`: {value:?} is not valid JSON after `!`")]
    MalformedNegation {
        field: String,
        value: String,
        #[source]
        source: serde_json::Error,
    },

    /// A partial-match pattern that the regex engine refused to compile.
    #[error("invalid pattern `{pattern}`: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// Invalid input supplied to a parsing helper.
    #[error("invalid request: {message}")]
    InvalidRequest { message: String },
}

impl QueryError {
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest {
            message: message.into(),
        }
    }
}

/// Convenience alias for results produced by this crate.
pub type QueryResult<T> = Result<T, QueryError>;
