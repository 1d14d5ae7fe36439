//! Result type alias for Canopy
//!
//! This module provides a convenient Result type alias that uses CanopyError
//! as the error type.

use super::errors::CanopyError;

/// Result type alias for Canopy operations
///
/// This is a convenience type alias that uses `CanopyError` as the error type.
/// Use this throughout the codebase for fallible operations.
///
/// # Examples
///
/// ```
/// use canopy::domain::result::Result;
/// use canopy::domain::errors::CanopyError;
///
/// fn example_function() -> Result<String> {
///     Ok("success".to_string())
/// }
///
/// fn failing_function() -> Result<()> {
///     Err(CanopyError::Validation("Invalid input".to_string()))
/// }
/// ```
pub type Result<T> = std::result::Result<T, CanopyError>;
