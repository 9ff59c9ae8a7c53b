//! Convenience result type alias for ModHub.

use crate::error::HubError;

/// A specialized `Result` type for ModHub operations.
///
/// This is defined as a convenience so that every crate does not need to
/// write `Result<T, HubError>` explicitly.
pub type HubResult<T> = Result<T, HubError>;
