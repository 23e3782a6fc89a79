use crate::types::DbId;

/// Domain-level failure shared by every layer above the database.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Shorthand for a `Conflict` raised when a row still has dependents.
    pub fn has_children(entity: &str, id: DbId, child: &str, count: i64) -> Self {
        CoreError::Conflict(format!(
            "{entity} {id} cannot be deleted: {count} {child} record(s) still reference it"
        ))
    }
}

impl From<String> for CoreError {
    fn from(msg: String) -> Self {
        CoreError::Validation(msg)
    }
}
