use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("validation error: {0}")]
    Validation(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("database error: {0}")]
    Db(String),
    #[error("model error: {0}")]
    Model(#[from] models::errors::ModelError),
}

impl ServiceError {
    pub fn not_found(entity: &str) -> Self {
        Self::NotFound(format!("{} not found", entity))
    }

    pub fn duplicate(entity: &str, field: &str) -> Self {
        Self::Validation(format!("{} with this {} already exists", entity, field))
    }

    pub fn version_conflict(expected: i32, found: i32) -> Self {
        Self::Conflict(format!("stale version: payload has {}, row has {}", expected, found))
    }

    pub fn db(e: sea_orm::DbErr) -> Self {
        Self::Db(e.to_string())
    }
}
