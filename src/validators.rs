//! Reusable field validators
//!
//! Ready-made validators for the common checks fields hand to the
//! registry. Each validator can be used directly against a value or
//! converted into the registry's validator closure with
//! `into_validator()`. The required check is not here; it is built into
//! the validation engine.

use std::rc::Rc;
use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use crate::registry::Validator;

// Pragmatic email shape: local part without whitespace or '@', a
// domain of valid labels, and at least one dot.
static EMAIL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(
		r"^[^@\s]+@[a-zA-Z0-9]([a-zA-Z0-9\-]*[a-zA-Z0-9])?(\.[a-zA-Z0-9]([a-zA-Z0-9\-]*[a-zA-Z0-9])?)+$",
	)
	.expect("EMAIL_REGEX: invalid regex pattern")
});

fn as_text(value: &Value) -> Option<&str> {
	match value {
		Value::String(s) => Some(s),
		_ => None,
	}
}

/// Validates that a string value has at least `min` characters.
///
/// Missing, `null`, and empty values pass; absence is the required
/// check's concern. Lengths are character counts, not byte counts, so
/// multi-byte input (CJK, emoji) is measured correctly.
///
/// # Examples
///
/// ```
/// use formstate::validators::MinLengthValidator;
/// use serde_json::json;
///
/// let validator = MinLengthValidator::new(3);
/// assert_eq!(validator.validate(&json!("abc")), None);
/// assert!(validator.validate(&json!("ab")).is_some());
/// assert_eq!(validator.validate(&json!("")), None);
/// ```
#[derive(Debug, Clone)]
pub struct MinLengthValidator {
	min: usize,
	message: Option<String>,
}

impl MinLengthValidator {
	pub fn new(min: usize) -> Self {
		Self { min, message: None }
	}

	/// Sets a custom error message returned on validation failure.
	pub fn with_message(mut self, message: impl Into<String>) -> Self {
		self.message = Some(message.into());
		self
	}

	pub fn validate(&self, value: &Value) -> Option<String> {
		let text = as_text(value)?;
		if text.is_empty() {
			return None;
		}
		let count = text.chars().count();
		if count >= self.min {
			return None;
		}
		Some(self.message.clone().unwrap_or_else(|| {
			format!(
				"Ensure this value has at least {} characters (it has {})",
				self.min, count
			)
		}))
	}

	pub fn into_validator(self) -> Validator {
		Rc::new(move |value, _| self.validate(value))
	}
}

/// Validates that a string value has at most `max` characters.
///
/// # Examples
///
/// ```
/// use formstate::validators::MaxLengthValidator;
/// use serde_json::json;
///
/// let validator = MaxLengthValidator::new(5);
/// assert_eq!(validator.validate(&json!("12345")), None);
/// assert!(validator.validate(&json!("123456")).is_some());
/// ```
#[derive(Debug, Clone)]
pub struct MaxLengthValidator {
	max: usize,
	message: Option<String>,
}

impl MaxLengthValidator {
	pub fn new(max: usize) -> Self {
		Self { max, message: None }
	}

	/// Sets a custom error message returned on validation failure.
	pub fn with_message(mut self, message: impl Into<String>) -> Self {
		self.message = Some(message.into());
		self
	}

	pub fn validate(&self, value: &Value) -> Option<String> {
		let text = as_text(value)?;
		let count = text.chars().count();
		if count <= self.max {
			return None;
		}
		Some(self.message.clone().unwrap_or_else(|| {
			format!(
				"Ensure this value has at most {} characters (it has {})",
				self.max, count
			)
		}))
	}

	pub fn into_validator(self) -> Validator {
		Rc::new(move |value, _| self.validate(value))
	}
}

/// Validates a string value against a regex pattern.
///
/// # Examples
///
/// ```
/// use formstate::validators::PatternValidator;
/// use regex::Regex;
/// use serde_json::json;
///
/// let validator = PatternValidator::new(Regex::new("^[A-Z]{3}$").unwrap());
/// assert_eq!(validator.validate(&json!("ABC")), None);
/// assert!(validator.validate(&json!("abc")).is_some());
/// ```
#[derive(Debug, Clone)]
pub struct PatternValidator {
	pattern: Regex,
	message: Option<String>,
}

impl PatternValidator {
	pub fn new(pattern: Regex) -> Self {
		Self {
			pattern,
			message: None,
		}
	}

	/// Sets a custom error message returned on validation failure.
	pub fn with_message(mut self, message: impl Into<String>) -> Self {
		self.message = Some(message.into());
		self
	}

	pub fn validate(&self, value: &Value) -> Option<String> {
		let text = as_text(value)?;
		if text.is_empty() || self.pattern.is_match(text) {
			return None;
		}
		Some(
			self.message
				.clone()
				.unwrap_or_else(|| "Enter a valid value".to_string()),
		)
	}

	pub fn into_validator(self) -> Validator {
		Rc::new(move |value, _| self.validate(value))
	}
}

/// Validates that a string value looks like an email address.
///
/// # Examples
///
/// ```
/// use formstate::validators::EmailValidator;
/// use serde_json::json;
///
/// let validator = EmailValidator::new();
/// assert_eq!(validator.validate(&json!("a@example.com")), None);
/// assert!(validator.validate(&json!("not-an-email")).is_some());
/// ```
#[derive(Debug, Clone, Default)]
pub struct EmailValidator {
	message: Option<String>,
}

impl EmailValidator {
	pub fn new() -> Self {
		Self::default()
	}

	/// Sets a custom error message returned on validation failure.
	pub fn with_message(mut self, message: impl Into<String>) -> Self {
		self.message = Some(message.into());
		self
	}

	pub fn validate(&self, value: &Value) -> Option<String> {
		let text = as_text(value)?;
		if text.is_empty() || EMAIL_REGEX.is_match(text) {
			return None;
		}
		Some(
			self.message
				.clone()
				.unwrap_or_else(|| "Enter a valid email address".to_string()),
		)
	}

	pub fn into_validator(self) -> Validator {
		Rc::new(move |value, _| self.validate(value))
	}
}
