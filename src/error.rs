//! Error types shared by the engine, the profile store and the catalog

/// Errors raised by the profile store
#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    #[error("profile not found: {0}")]
    NotFound(String),
    #[error("profile already exists: {0}")]
    Conflict(String),
    #[error("store lock poisoned")]
    Poisoned,
    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Errors raised by a single catalog page request
#[derive(thiserror::Error, Debug)]
pub enum CatalogError {
    #[error("catalog returned status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("catalog request timed out")]
    Timeout,
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

/// Errors surfaced by engine operations
#[derive(thiserror::Error, Debug)]
pub enum EngineError {
    #[error("user not found: {0}")]
    NotFound(String),
    #[error("user already exists: {0}")]
    Conflict(String),
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error(transparent)]
    Storage(StoreError),
}

impl From<StoreError> for EngineError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::NotFound(name) => EngineError::NotFound(name),
            StoreError::Conflict(name) => EngineError::Conflict(name),
            other => EngineError::Storage(other),
        }
    }
}
