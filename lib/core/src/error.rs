use crate::graph::EdgeId;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// An edge id reported again with endpoints that disagree with what is known
    #[error("Conflicting edge {id}: {reason}")]
    ConflictingElement { id: EdgeId, reason: String },

    #[error("Invalid profile: {0}")]
    InvalidProfile(String),

    #[error("No database selected")]
    NoDatabaseSelected,
}

impl Error {
    pub(crate) fn conflict(id: EdgeId, reason: impl Into<String>) -> Self {
        Error::ConflictingElement {
            id,
            reason: reason.into(),
        }
    }

    /// Short machine-readable code, stable across releases
    pub fn code(&self) -> &'static str {
        match self {
            Error::ConflictingElement { .. } => "CONFLICTING_ELEMENT",
            Error::InvalidProfile(_) => "INVALID_PROFILE",
            Error::NoDatabaseSelected => "NO_DATABASE_SELECTED",
        }
    }
}
