//! Storage error model.

use thiserror::Error;

pub type StoreResult<T> = Result<T, StoreError>;

/// Repository-level error.
///
/// SQLx errors are mapped as follows:
///
/// | SQLx Error | PostgreSQL Error Code | StoreError | Scenario |
/// |------------|----------------------|------------|----------|
/// | Database (unique violation) | `23505` | `Conflict` | Duplicate email / plan code |
/// | Database (foreign key violation) | `23503` | `Conflict` | Referenced row missing |
/// | RowNotFound | N/A | `NotFound` | Fetch of a missing row |
/// | anything else | Any | `Database` | Connection/protocol failures |
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("row not found")]
    NotFound,

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("decode error: {0}")]
    Decode(String),

    #[error("database error: {0}")]
    Database(sqlx::Error),
}

impl StoreError {
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::RowNotFound => Self::NotFound,
            sqlx::Error::Database(db) => match db.code().as_deref() {
                Some("23505") => Self::Conflict(format!("unique violation: {}", db.message())),
                Some("23503") => Self::Conflict(format!("foreign key violation: {}", db.message())),
                _ => Self::Database(err),
            },
            _ => Self::Database(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_not_found_maps_to_not_found() {
        let err = StoreError::from(sqlx::Error::RowNotFound);
        assert!(matches!(err, StoreError::NotFound));
    }

    #[test]
    fn pool_errors_stay_database_errors() {
        let err = StoreError::from(sqlx::Error::PoolClosed);
        assert!(matches!(err, StoreError::Database(_)));
    }
}
