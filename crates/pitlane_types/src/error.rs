use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EnvelopeError {
    #[error("{0}")]
    Rejected(String),

    #[error("Response did not contain a data payload")]
    MissingData,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TypeError {
    #[error("Invalid role: {0}")]
    InvalidRole(String),

    #[error("Invalid notification kind: {0}")]
    InvalidNotificationKind(String),
}
