mod app_error;

pub use app_error::{AppError, FieldMessage};

pub type Result<T> = std::result::Result<T, AppError>;
