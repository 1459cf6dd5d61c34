use sea_orm::SqlErr;

/// Application error type returned by services and repositories
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    // Resource errors
    #[error("{0} not found")]
    NotFound(String),

    #[error("{0} already exists")]
    Conflict(String),

    #[error("{0} is still referenced")]
    Referenced(String),

    // Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    // Database errors
    #[error("Database error: {0}")]
    Database(String),

    // Internal errors
    #[error("Internal server error")]
    Internal(String),

    // Queue errors
    #[error("Queue error: {0}")]
    Queue(String),
}

impl AppError {
    /// Errors the caller can fix by changing the request
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            AppError::NotFound(_)
                | AppError::Conflict(_)
                | AppError::Referenced(_)
                | AppError::Validation(_)
        )
    }
}

// Convenient conversions from common error types

impl From<sea_orm::DbErr> for AppError {
    fn from(err: sea_orm::DbErr) -> Self {
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(msg)) => return AppError::Conflict(msg),
            Some(SqlErr::ForeignKeyConstraintViolation(msg)) => {
                return AppError::Referenced(msg)
            }
            _ => {}
        }

        match err {
            sea_orm::DbErr::RecordNotFound(_) => AppError::NotFound("Resource".to_string()),
            sea_orm::DbErr::RecordNotInserted => {
                AppError::Conflict("Record already exists".to_string())
            }
            sea_orm::DbErr::RecordNotUpdated => AppError::NotFound("Resource".to_string()),
            _ => AppError::Database(err.to_string()),
        }
    }
}

impl From<redis::RedisError> for AppError {
    fn from(err: redis::RedisError) -> Self {
        AppError::Queue(err.to_string())
    }
}

/// Result type alias for services and repositories
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(
            AppError::NotFound("Project".to_string()).to_string(),
            "Project not found"
        );
        assert_eq!(
            AppError::Conflict("Application".to_string()).to_string(),
            "Application already exists"
        );
        assert_eq!(
            AppError::Validation("Invalid project status".to_string()).to_string(),
            "Validation error: Invalid project status"
        );
    }

    #[test]
    fn test_client_errors() {
        assert!(AppError::NotFound("User".to_string()).is_client_error());
        assert!(AppError::Validation("x".to_string()).is_client_error());
        assert!(!AppError::Database("x".to_string()).is_client_error());
        assert!(!AppError::Queue("x".to_string()).is_client_error());
    }

    #[test]
    fn test_record_not_inserted_is_conflict() {
        let err: AppError = sea_orm::DbErr::RecordNotInserted.into();
        assert!(matches!(err, AppError::Conflict(_)));
    }
}
