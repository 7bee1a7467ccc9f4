//! Validation engine
//!
//! Computes a fresh errors mapping from the current values and the
//! field registry. Validators run sequentially in registration order;
//! a custom validator takes precedence over the built-in required
//! check for its field.

use std::collections::HashMap;

use serde_json::Value;

use crate::registry::FieldRegistry;

/// Error message produced by the built-in required check.
pub const REQUIRED_MESSAGE: &str = "This field is required.";

/// Whether a value counts as "empty" for the required check.
///
/// Follows host-language truthiness: missing, `null`, the empty string,
/// `false`, and numeric zero are all empty. Arrays and objects are
/// never empty in this sense, even when they have no elements.
fn is_empty_value(value: Option<&Value>) -> bool {
	match value {
		None | Some(Value::Null) => true,
		Some(Value::String(s)) => s.is_empty(),
		Some(Value::Bool(b)) => !b,
		Some(Value::Number(n)) => n.as_f64() == Some(0.0),
		Some(Value::Array(_)) | Some(Value::Object(_)) => false,
	}
}

/// Compute a full replacement errors mapping covering exactly the
/// registered fields.
///
/// For each registered field: a custom validator's return value is
/// taken as the error (empty string and `None` both mean valid);
/// otherwise a required field with an empty value yields
/// [`REQUIRED_MESSAGE`]; otherwise the field has no error.
///
/// # Examples
///
/// ```
/// use std::collections::HashMap;
/// use formstate::{engine, FieldHandle, FieldRegistry, REQUIRED_MESSAGE};
/// use serde_json::json;
///
/// let registry = FieldRegistry::new();
/// let _guard = registry.register("name".to_string(), FieldHandle::new(()), true, None);
///
/// let mut values = HashMap::new();
/// values.insert("name".to_string(), json!(""));
///
/// let errors = engine::validate(&values, &registry);
/// assert_eq!(errors["name"].as_deref(), Some(REQUIRED_MESSAGE));
/// ```
pub fn validate(
	values: &HashMap<String, Value>,
	registry: &FieldRegistry,
) -> HashMap<String, Option<String>> {
	let fields = registry.fields();
	tracing::trace!(fields = fields.len(), "running validation");

	let mut errors = HashMap::with_capacity(fields.len());
	for field in fields {
		let value = values.get(&field.name);
		let error = match &field.validator {
			Some(validator) => {
				let value = value.cloned().unwrap_or(Value::Null);
				validator(&value, &field).filter(|message| !message.is_empty())
			}
			None if field.required && is_empty_value(value) => Some(REQUIRED_MESSAGE.to_string()),
			None => None,
		};
		errors.insert(field.name, error);
	}
	errors
}

/// `true` iff no entry in the mapping carries a non-empty error string.
///
/// # Examples
///
/// ```
/// use std::collections::HashMap;
/// use formstate::engine;
///
/// let mut errors: HashMap<String, Option<String>> = HashMap::new();
/// errors.insert("name".to_string(), None);
/// assert!(engine::is_valid(&errors));
///
/// errors.insert("email".to_string(), Some("Enter a valid email".to_string()));
/// assert!(!engine::is_valid(&errors));
/// ```
pub fn is_valid(errors: &HashMap<String, Option<String>>) -> bool {
	errors
		.values()
		.all(|error| error.as_deref().is_none_or(str::is_empty))
}
