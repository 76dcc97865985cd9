use std::io;

/// Boxed error returned by a [`Transport`](crate::Transport) implementation.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("range query {digest:?}: digest too short or not hex")]
    InvalidInput { digest: String },

    #[error("range query {prefix}: {source}")]
    Transport {
        prefix: String,
        #[source]
        source: BoxError,
    },

    #[error("range query {prefix}: GET returned HTTP {status}")]
    UnexpectedStatus { prefix: String, status: u16 },

    #[error("range query {prefix}: {source}")]
    MalformedResponse {
        prefix: String,
        #[source]
        source: ParseError,
    },
}

impl Error {
    /// Whether the same query could succeed if issued again.
    ///
    /// Transport failures, rate limiting (429), server errors (5xx) and
    /// failures reading the response body are transient. Bad input and
    /// malformed response lines are not.
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Transport { .. } => true,
            Error::UnexpectedStatus { status, .. } => *status == 429 || *status >= 500,
            Error::MalformedResponse { source: ParseError::Io(_), .. } => true,
            Error::InvalidInput { .. } | Error::MalformedResponse { .. } => false,
        }
    }
}

/// Failure while parsing a range response body.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("bad response line {line:?}")]
    MalformedLine { line: String },

    #[error("reading response body: {0}")]
    Io(#[from] io::Error),
}
