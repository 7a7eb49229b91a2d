use thiserror::Error;

pub type Result<T> = std::result::Result<T, SessionError>;

/// Categorized failure raised by a [`DatabaseClient`](crate::DatabaseClient)
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClientError {
    #[error("Unable to connect to {address}: {message}")]
    Unreachable { address: String, message: String },

    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("TLS error: {0}")]
    Tls(String),

    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("Client is closed")]
    Closed,

    /// A failure inside the client library itself rather than on the wire
    #[error("Client library error: {0}")]
    Internal(String),
}

impl ClientError {
    /// Whether the error describes a reachable-server problem the user can act on
    pub fn is_transport(&self) -> bool {
        !matches!(self, ClientError::Internal(_))
    }
}

/// Closed set of error categories surfaced by the session layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Transport,
    Validation,
    Internal,
}

#[derive(Error, Debug)]
pub enum SessionError {
    #[error(transparent)]
    Transport(#[from] ClientError),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl SessionError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SessionError::Transport(e) if e.is_transport() => ErrorKind::Transport,
            SessionError::Transport(_) => ErrorKind::Internal,
            SessionError::Validation(_) => ErrorKind::Validation,
            SessionError::Internal(_) => ErrorKind::Internal,
        }
    }
}

impl From<graphdesk_core::Error> for SessionError {
    fn from(e: graphdesk_core::Error) -> Self {
        match e {
            graphdesk_core::Error::InvalidProfile(msg) => SessionError::Validation(msg),
            graphdesk_core::Error::NoDatabaseSelected => {
                SessionError::Validation("no database selected".to_string())
            }
            other => SessionError::Internal(anyhow::Error::new(other)),
        }
    }
}
