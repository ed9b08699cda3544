//! Result type alias for the loader

use super::errors::LoaderError;

/// Result type alias for loader operations
///
/// # Examples
///
/// ```
/// use patient_loader::domain::result::Result;
/// use patient_loader::domain::errors::LoaderError;
///
/// fn failing_function() -> Result<()> {
///     Err(LoaderError::Other("nothing to do".to_string()))
/// }
/// ```
pub type Result<T> = std::result::Result<T, LoaderError>;
