use crate::errors::AppError;

// Result type returned by request handlers
pub type Result<T> = std::result::Result<T, AppError>;
