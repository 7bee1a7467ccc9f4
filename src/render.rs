//! Field rendering capability
//!
//! A [`FieldRenderer`] composes one field's UI from its input element,
//! label, error message, and required flag. It is purely a layout
//! concern: the store never inspects the rendered output, and any host
//! framework can supply its own renderer.

use serde_json::Value;

use crate::registry::RegisteredField;
use crate::store::FormState;

/// Everything a renderer needs to lay out one field.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldRenderProps {
	/// Pre-built input element markup, inserted verbatim
	pub input: String,
	pub label: Option<String>,
	pub error: Option<String>,
	pub required: bool,
}

/// Layout capability for a single field.
pub trait FieldRenderer {
	/// Render the field to markup.
	fn render(&self, props: &FieldRenderProps) -> String;
}

/// Built-in renderer producing a label/input/error block.
///
/// Label and error text are HTML-escaped; the input element is the
/// caller's markup and is inserted as-is.
///
/// # Examples
///
/// ```
/// use formstate::{DefaultFieldRenderer, FieldRenderProps, FieldRenderer};
///
/// let renderer = DefaultFieldRenderer;
/// let html = renderer.render(&FieldRenderProps {
/// 	input: "<input type=\"text\" name=\"email\" />".to_string(),
/// 	label: Some("Email".to_string()),
/// 	error: Some("Enter a valid email".to_string()),
/// 	required: true,
/// });
///
/// assert!(html.contains("Email"));
/// assert!(html.contains("field--required"));
/// assert!(html.contains("Enter a valid email"));
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultFieldRenderer;

impl FieldRenderer for DefaultFieldRenderer {
	fn render(&self, props: &FieldRenderProps) -> String {
		let mut classes = vec!["field"];
		if props.required {
			classes.push("field--required");
		}
		if props.error.is_some() {
			classes.push("field--error");
		}

		let mut html = format!("<div class=\"{}\">\n", classes.join(" "));
		if let Some(label) = &props.label {
			html.push_str(&format!(
				"\t<label>{}{}</label>\n",
				html_escape::encode_text(label),
				if props.required { " *" } else { "" }
			));
		}
		html.push('\t');
		html.push_str(&props.input);
		html.push('\n');
		if let Some(error) = &props.error {
			html.push_str(&format!(
				"\t<p class=\"field-error\">{}</p>\n",
				html_escape::encode_text(error)
			));
		}
		html.push_str("</div>\n");
		html
	}
}

/// One registered field bound to a snapshot of the form state.
///
/// Field components use this to read their own slice of the state
/// (value, error, required flag) and to drive a renderer.
#[derive(Debug, Clone)]
pub struct BoundField {
	name: String,
	value: Option<Value>,
	error: Option<String>,
	required: bool,
}

impl BoundField {
	pub(crate) fn new(field: &RegisteredField, state: &FormState) -> Self {
		Self {
			name: field.name.clone(),
			value: state.value.get(&field.name).cloned(),
			error: state
				.errors
				.get(&field.name)
				.cloned()
				.flatten()
				.filter(|message| !message.is_empty()),
			required: field.required,
		}
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	pub fn value(&self) -> Option<&Value> {
		self.value.as_ref()
	}

	pub fn error(&self) -> Option<&str> {
		self.error.as_deref()
	}

	pub fn has_error(&self) -> bool {
		self.error.is_some()
	}

	pub fn is_required(&self) -> bool {
		self.required
	}

	/// The current value rendered as an HTML attribute string.
	///
	/// Strings are used verbatim, `null`/missing becomes the empty
	/// string, everything else is JSON-serialized.
	pub fn value_attr(&self) -> String {
		match &self.value {
			None | Some(Value::Null) => String::new(),
			Some(Value::String(s)) => s.clone(),
			Some(other) => other.to_string(),
		}
	}

	/// Default text-input markup for this field, with escaped
	/// attributes.
	pub fn input_html(&self) -> String {
		format!(
			"<input type=\"text\" name=\"{}\" value=\"{}\"{} />",
			html_escape::encode_double_quoted_attribute(&self.name),
			html_escape::encode_double_quoted_attribute(&self.value_attr()),
			if self.required { " required" } else { "" }
		)
	}

	/// Render this field through the given renderer.
	pub fn render(&self, renderer: &dyn FieldRenderer, label: Option<&str>) -> String {
		renderer.render(&FieldRenderProps {
			input: self.input_html(),
			label: label.map(|l| l.to_string()),
			error: self.error.clone(),
			required: self.required,
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::registry::FieldHandle;
	use crate::store::{FormErrors, FormValue};
	use serde_json::json;
	use std::collections::HashMap;

	fn bound(value: Value, error: Option<&str>, required: bool) -> BoundField {
		let field = RegisteredField {
			name: "name".to_string(),
			handle: FieldHandle::new(()),
			required,
			validator: None,
		};
		let mut values: FormValue = HashMap::new();
		values.insert("name".to_string(), value);
		let mut errors: FormErrors = HashMap::new();
		errors.insert("name".to_string(), error.map(|e| e.to_string()));
		let state = FormState {
			value: values,
			errors,
			dirty: false,
		};
		BoundField::new(&field, &state)
	}

	#[test]
	fn test_bound_field_reads_its_slice() {
		let field = bound(json!("Ada"), Some("taken"), true);

		assert_eq!(field.name(), "name");
		assert_eq!(field.value(), Some(&json!("Ada")));
		assert_eq!(field.error(), Some("taken"));
		assert!(field.has_error());
		assert!(field.is_required());
	}

	#[test]
	fn test_empty_error_string_means_no_error() {
		let field = bound(json!("Ada"), Some(""), false);
		assert!(!field.has_error());
	}

	#[test]
	fn test_value_attr() {
		assert_eq!(bound(json!("Ada"), None, false).value_attr(), "Ada");
		assert_eq!(bound(json!(null), None, false).value_attr(), "");
		assert_eq!(bound(json!(42), None, false).value_attr(), "42");
	}

	#[test]
	fn test_input_html_escapes_attributes() {
		let field = bound(json!("\"><script>"), None, true);
		let html = field.input_html();

		assert!(html.contains("name=\"name\""));
		assert!(html.contains(" required"));
		assert!(!html.contains("\"><script>"));
	}

	#[test]
	fn test_default_renderer_layout() {
		let field = bound(json!("Ada"), Some("taken"), true);
		let html = field.render(&DefaultFieldRenderer, Some("Full name"));

		assert!(html.contains("field--required"));
		assert!(html.contains("field--error"));
		assert!(html.contains("Full name *"));
		assert!(html.contains("value=\"Ada\""));
		assert!(html.contains("<p class=\"field-error\">taken</p>"));
	}

	#[test]
	fn test_default_renderer_escapes_error_text() {
		let field = bound(json!("x"), Some("<b>bad</b>"), false);
		let html = field.render(&DefaultFieldRenderer, None);

		assert!(!html.contains("<b>bad</b>"));
		assert!(html.contains("&lt;b&gt;bad&lt;/b&gt;"));
	}

	#[test]
	fn test_renderer_without_label_or_error() {
		let field = bound(json!("x"), None, false);
		let html = field.render(&DefaultFieldRenderer, None);

		assert!(!html.contains("<label>"));
		assert!(!html.contains("field-error"));
		assert!(html.contains("<input"));
	}
}
