//! Form facade
//!
//! [`FormData`] ties the registry, the validation engine, and the state
//! store together behind the surface field components consume: field
//! registration on mount, change propagation, on-demand validation,
//! and the dirty/valid flags.

use std::fmt;

use std::rc::Rc;

use crate::engine;
use crate::error::FormResult;
use crate::registry::{FieldHandle, FieldRegistry, RegistrationGuard, Validator};
use crate::render::{BoundField, DefaultFieldRenderer, FieldRenderer};
use crate::store::{FormErrors, FormState, FormStore, FormValue, SubscriberId};

/// When per-field errors are recomputed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ValidationMode {
	/// Errors are recomputed only when [`FormData::validate`] is called
	/// (typically on submit).
	#[default]
	OnSubmit,
	/// Every change additionally re-runs the engine and commits the
	/// recomputed errors to the store.
	OnChange,
}

/// Top-level form handle.
///
/// Created once per form with the initial value mapping; field
/// components receive clones of the underlying store and registry and
/// interact with the form exclusively through them.
///
/// # Examples
///
/// ```
/// use std::collections::HashMap;
/// use formstate::{FieldHandle, FormData};
/// use serde_json::json;
///
/// let mut initial = HashMap::new();
/// initial.insert("name".to_string(), json!(""));
///
/// let form = FormData::new(initial);
/// let _guard = form.register_field("name".to_string(), FieldHandle::new(()), true, None);
///
/// assert!(!form.is_dirty());
/// assert!(!form.is_valid());
///
/// let mut value = HashMap::new();
/// value.insert("name".to_string(), json!("Ada"));
/// form.on_change(value, HashMap::new()).unwrap();
///
/// assert!(form.is_dirty());
/// assert!(form.is_valid());
/// ```
pub struct FormData {
	store: FormStore,
	registry: FieldRegistry,
	mode: ValidationMode,
	renderer: Rc<dyn FieldRenderer>,
}

impl FormData {
	/// Create a form from the initial value mapping, with every field
	/// starting error-free.
	pub fn new(initial: FormValue) -> Self {
		Self {
			store: FormStore::new(initial, None),
			registry: FieldRegistry::new(),
			mode: ValidationMode::default(),
			renderer: Rc::new(DefaultFieldRenderer),
		}
	}

	/// Create a form with caller-supplied initial errors (re-keyed to
	/// the value mapping's key set by the store).
	pub fn with_initial_errors(initial: FormValue, initial_errors: FormErrors) -> Self {
		Self {
			store: FormStore::new(initial, Some(initial_errors)),
			registry: FieldRegistry::new(),
			mode: ValidationMode::default(),
			renderer: Rc::new(DefaultFieldRenderer),
		}
	}

	/// Replace the renderer field components draw themselves with.
	pub fn with_field_renderer(mut self, renderer: impl FieldRenderer + 'static) -> Self {
		self.renderer = Rc::new(renderer);
		self
	}

	/// Select when errors are recomputed.
	///
	/// # Examples
	///
	/// ```
	/// use std::collections::HashMap;
	/// use formstate::{FormData, ValidationMode};
	///
	/// let form = FormData::new(HashMap::new()).with_validation_mode(ValidationMode::OnChange);
	/// assert_eq!(form.validation_mode(), ValidationMode::OnChange);
	/// ```
	pub fn with_validation_mode(mut self, mode: ValidationMode) -> Self {
		self.mode = mode;
		self
	}

	pub fn validation_mode(&self) -> ValidationMode {
		self.mode
	}

	/// Mount-time registration callback for field components.
	///
	/// The returned guard unregisters the field when dropped; the field
	/// component holds it for as long as it is mounted.
	pub fn register_field(
		&self,
		name: String,
		handle: FieldHandle,
		required: bool,
		validator: Option<Validator>,
	) -> RegistrationGuard {
		self.registry.register(name, handle, required, validator)
	}

	/// Change propagation callback for field components.
	///
	/// Replaces the value and errors mappings atomically and recomputes
	/// the dirty flag. In [`ValidationMode::OnChange`] the engine is
	/// re-run afterwards and its result committed to the store.
	pub fn on_change(&self, value: FormValue, errors: FormErrors) -> FormResult<()> {
		self.store.on_change(value, errors)?;
		if self.mode == ValidationMode::OnChange {
			let computed = engine::validate(&self.store.value(), &self.registry);
			self.store.replace_errors(computed);
		}
		Ok(())
	}

	/// Force a full re-validation of all registered fields.
	///
	/// Returns the computed errors mapping, covering exactly the
	/// registered fields. With `with_store_update` the result is also
	/// committed to the store's error slot.
	pub fn validate(&self, with_store_update: bool) -> FormErrors {
		let errors = engine::validate(&self.store.value(), &self.registry);
		tracing::debug!(
			fields = errors.len(),
			valid = engine::is_valid(&errors),
			with_store_update,
			"validated form"
		);
		if with_store_update {
			self.store.replace_errors(errors.clone());
		}
		errors
	}

	/// Whether the current value mapping differs from the initial one.
	pub fn is_dirty(&self) -> bool {
		self.store.is_dirty()
	}

	/// Whether the form currently has no errors.
	///
	/// Registered fields are re-validated on the fly; keys without a
	/// registration are judged by the stored errors, so a freshly
	/// created form reflects its initial errors until fields mount.
	pub fn is_valid(&self) -> bool {
		let computed = engine::validate(&self.store.value(), &self.registry);
		if !engine::is_valid(&computed) {
			return false;
		}
		self.store
			.errors()
			.iter()
			.filter(|(name, _)| !computed.contains_key(name.as_str()))
			.all(|(_, error)| error.as_deref().is_none_or(str::is_empty))
	}

	/// Snapshot of the current state.
	pub fn state(&self) -> FormState {
		self.store.state()
	}

	/// Handle to the shared store, for field components and subscribers.
	pub fn store(&self) -> FormStore {
		self.store.clone()
	}

	/// Handle to the shared field registry.
	pub fn registry(&self) -> FieldRegistry {
		self.registry.clone()
	}

	/// Attach a subscriber notified with a state snapshot after every
	/// change.
	pub fn subscribe(&self, subscriber: impl Fn(&FormState) + 'static) -> SubscriberId {
		self.store.subscribe(subscriber)
	}

	/// Detach a subscriber.
	pub fn unsubscribe(&self, id: SubscriberId) -> bool {
		self.store.unsubscribe(id)
	}

	/// The renderer field components draw themselves with.
	pub fn field_renderer(&self) -> Rc<dyn FieldRenderer> {
		Rc::clone(&self.renderer)
	}

	/// Bind a registered field to the current state for rendering.
	///
	/// Returns `None` when no field of that name is registered.
	pub fn bound_field(&self, name: &str) -> Option<BoundField> {
		let field = self.registry.get(name)?;
		Some(BoundField::new(&field, &self.store.state()))
	}

	/// Render a registered field through the configured renderer.
	///
	/// Returns `None` when no field of that name is registered.
	pub fn render_field(&self, name: &str, label: Option<&str>) -> Option<String> {
		let bound = self.bound_field(name)?;
		Some(bound.render(self.renderer.as_ref(), label))
	}
}

impl fmt::Debug for FormData {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("FormData")
			.field("store", &self.store)
			.field("registry", &self.registry)
			.field("mode", &self.mode)
			.finish()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::engine::REQUIRED_MESSAGE;
	use serde_json::json;
	use std::collections::HashMap;
	use std::rc::Rc;

	fn handle() -> FieldHandle {
		FieldHandle::new(())
	}

	fn initial() -> FormValue {
		let mut value = HashMap::new();
		value.insert("name".to_string(), json!(""));
		value.insert("email".to_string(), json!("a@b.example"));
		value
	}

	#[test]
	fn test_fresh_form_reflects_initial_errors() {
		let mut errors = HashMap::new();
		errors.insert("email".to_string(), Some("already taken".to_string()));

		let clean = FormData::new(initial());
		let tainted = FormData::with_initial_errors(initial(), errors);

		assert!(!clean.is_dirty());
		assert!(clean.is_valid());
		assert!(!tainted.is_dirty());
		assert!(!tainted.is_valid());
	}

	#[test]
	fn test_validate_is_idempotent() {
		let form = FormData::new(initial());
		let _name = form.register_field("name".to_string(), handle(), true, None);
		let _email = form.register_field("email".to_string(), handle(), true, None);

		let first = form.validate(false);
		let second = form.validate(false);

		assert_eq!(first, second);
		assert_eq!(first["name"].as_deref(), Some(REQUIRED_MESSAGE));
		assert_eq!(first["email"], None);
	}

	#[test]
	fn test_validate_with_store_update_commits_errors() {
		let form = FormData::new(initial());
		let _name = form.register_field("name".to_string(), handle(), true, None);

		assert!(form.state().errors.values().all(Option::is_none));
		let errors = form.validate(true);

		assert_eq!(errors["name"].as_deref(), Some(REQUIRED_MESSAGE));
		assert_eq!(
			form.state().errors["name"].as_deref(),
			Some(REQUIRED_MESSAGE)
		);
	}

	#[test]
	fn test_validate_without_store_update_leaves_store_untouched() {
		let form = FormData::new(initial());
		let _name = form.register_field("name".to_string(), handle(), true, None);

		let errors = form.validate(false);

		assert_eq!(errors["name"].as_deref(), Some(REQUIRED_MESSAGE));
		assert_eq!(form.state().errors["name"], None);
	}

	#[test]
	fn test_is_valid_scenario_two_fields() {
		// One field failing its required check, one valid
		let form = FormData::new(initial());
		let _name = form.register_field("name".to_string(), handle(), true, None);
		let _email = form.register_field("email".to_string(), handle(), true, None);
		assert!(!form.is_valid());

		// Fixing the failing field flips overall validity
		let mut value = initial();
		value.insert("name".to_string(), json!("Ada"));
		form.on_change(value, form.state().errors).unwrap();
		assert!(form.is_valid());
	}

	#[test]
	fn test_dirty_roundtrip() {
		let form = FormData::new(initial());

		let mut value = initial();
		value.insert("name".to_string(), json!("b"));
		form.on_change(value, HashMap::new()).unwrap();
		assert!(form.is_dirty());

		form.on_change(initial(), HashMap::new()).unwrap();
		assert!(!form.is_dirty());
	}

	#[test]
	fn test_on_change_mode_revalidates_eagerly() {
		let form = FormData::new(initial()).with_validation_mode(ValidationMode::OnChange);
		let _name = form.register_field("name".to_string(), handle(), true, None);

		// The change payload carries no errors; the engine fills them in
		form.on_change(initial(), HashMap::new()).unwrap();
		assert_eq!(
			form.state().errors["name"].as_deref(),
			Some(REQUIRED_MESSAGE)
		);

		let mut value = initial();
		value.insert("name".to_string(), json!("Ada"));
		form.on_change(value, HashMap::new()).unwrap();
		assert_eq!(form.state().errors["name"], None);
	}

	#[test]
	fn test_on_submit_mode_keeps_caller_errors() {
		let form = FormData::new(initial());
		let _name = form.register_field("name".to_string(), handle(), true, None);

		let mut errors = HashMap::new();
		errors.insert("name".to_string(), Some("checked elsewhere".to_string()));
		form.on_change(initial(), errors).unwrap();

		assert_eq!(
			form.state().errors["name"].as_deref(),
			Some("checked elsewhere")
		);
	}

	#[test]
	fn test_unmounted_field_is_not_validated() {
		let form = FormData::new(initial());
		let guard = form.register_field("name".to_string(), handle(), true, None);

		assert_eq!(form.validate(false).len(), 1);
		drop(guard);
		assert!(form.validate(false).is_empty());
		assert!(form.is_valid());
	}

	#[test]
	fn test_render_field_uses_configured_renderer() {
		struct Terse;
		impl crate::render::FieldRenderer for Terse {
			fn render(&self, props: &crate::render::FieldRenderProps) -> String {
				format!("[{}]", props.input)
			}
		}

		let form = FormData::new(initial()).with_field_renderer(Terse);
		let _name = form.register_field("name".to_string(), handle(), false, None);

		let html = form.render_field("name", None).unwrap();
		assert!(html.starts_with('['));
		assert!(html.contains("<input"));
		assert!(form.render_field("missing", None).is_none());
	}

	#[test]
	fn test_custom_validator_through_facade() {
		let form = FormData::new(initial());
		let validator: Validator = Rc::new(|value, _| {
			let ok = value.as_str().is_some_and(|s| s.contains('@'));
			(!ok).then(|| "Enter a valid email".to_string())
		});
		let _email = form.register_field("email".to_string(), handle(), true, Some(validator));

		assert!(form.is_valid());

		let mut value = initial();
		value.insert("email".to_string(), json!("nope"));
		form.on_change(value, HashMap::new()).unwrap();
		assert_eq!(
			form.validate(false)["email"].as_deref(),
			Some("Enter a valid email")
		);
	}
}
