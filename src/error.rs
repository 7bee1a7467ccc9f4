//! Error types for form state operations

use thiserror::Error;

/// Errors raised by the form state store when a change payload breaks
/// the form's key-set invariant.
///
/// Per-field validation failures are not errors in this sense; they are
/// ordinary `Option<String>` entries in the errors mapping.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FormError {
	/// The change payload carried a key the form was not initialized with.
	#[error("unexpected field '{0}' in change payload")]
	UnexpectedField(String),
	/// The change payload dropped a key the form was initialized with.
	#[error("missing field '{0}' in change payload")]
	MissingField(String),
}

pub type FormResult<T> = Result<T, FormError>;
