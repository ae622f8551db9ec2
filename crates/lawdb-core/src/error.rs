use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// Rejected before any retrieval work; a client error.
    #[error("Invalid query: {0}")]
    Validation(String),

    #[error("Search engine is not initialized")]
    NotReady,

    /// The previously published snapshot keeps serving.
    #[error("Index rebuild failed: {0}")]
    Rebuild(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Operation failed: {0}")]
    Operation(String),
}

impl Error {
    /// HTTP-style status a service boundary should map this error to.
    pub fn status_code(&self) -> u16 {
        match self {
            Error::Validation(_) => 400,
            Error::NotFound(_) => 404,
            Error::NotReady => 503,
            Error::Rebuild(_) | Error::InvalidConfig(_) | Error::Operation(_) => 500,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
