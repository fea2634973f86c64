use pitlane_types::{EnvelopeError, SIGN_IN_ROUTE};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error(transparent)]
    HeaderError(#[from] reqwest::header::InvalidHeaderValue),

    #[error(transparent)]
    ReqwestError(#[from] reqwest::Error),

    #[error("Sign in required, redirect to {}", SIGN_IN_ROUTE)]
    SignInRequired,

    #[error("Unauthorized")]
    Unauthorized,

    #[error("{0}")]
    Api(String),

    #[error("Request failed with status {0}")]
    Status(u16),

    #[error("Response did not contain a data payload")]
    MissingData,

    #[error(transparent)]
    SerdeQsError(#[from] serde_qs::Error),

    #[error(transparent)]
    SerdeJsonError(#[from] serde_json::Error),

    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(#[from] chrono::ParseError),

    #[error("{0} is not available on a {1} list")]
    InvalidTrigger(&'static str, &'static str),

    #[error("Page numbers start at 1, got {0}")]
    InvalidPage(u32),

    #[error("Item {0} is not tracked")]
    UnknownItem(String),
}

impl ClientError {
    /// Whether the view should send the user to the sign-in page
    pub fn requires_sign_in(&self) -> bool {
        matches!(self, ClientError::SignInRequired | ClientError::Unauthorized)
    }
}

impl From<EnvelopeError> for ClientError {
    fn from(err: EnvelopeError) -> ClientError {
        match err {
            EnvelopeError::Rejected(message) => ClientError::Api(message),
            EnvelopeError::MissingData => ClientError::MissingData,
        }
    }
}
