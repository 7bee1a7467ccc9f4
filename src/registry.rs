//! Field registry
//!
//! Field components register themselves here on mount so the validation
//! engine can find their metadata (required flag, custom validator).
//! Registration hands back a [`RegistrationGuard`] that removes the
//! entry again when the field unmounts, so the registry never
//! accumulates stale metadata for fields that no longer exist.

use std::any::Any;
use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use serde_json::Value;

/// A field validator: maps the current value and the field's metadata
/// to an optional error message. `None` (or an empty string) means the
/// value is valid.
pub type Validator = Rc<dyn Fn(&Value, &RegisteredField) -> Option<String>>;

/// Opaque reference to a field's runtime instance.
///
/// The registry never inspects the handle; it exists so host code can
/// recover its own component from a [`RegisteredField`], e.g. to focus
/// the first invalid input after a failed submit.
///
/// # Examples
///
/// ```
/// use formstate::FieldHandle;
///
/// let handle = FieldHandle::new("input#email");
/// assert_eq!(handle.downcast::<&str>().as_deref(), Some(&"input#email"));
/// assert!(handle.downcast::<u32>().is_none());
/// ```
#[derive(Clone)]
pub struct FieldHandle(Rc<dyn Any>);

impl FieldHandle {
	pub fn new<T: 'static>(inner: T) -> Self {
		Self(Rc::new(inner))
	}

	/// Recover the concrete instance, if it has the expected type.
	pub fn downcast<T: 'static>(&self) -> Option<Rc<T>> {
		Rc::clone(&self.0).downcast::<T>().ok()
	}
}

impl fmt::Debug for FieldHandle {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_tuple("FieldHandle").finish()
	}
}

/// Metadata describing one mounted field.
#[derive(Clone)]
pub struct RegisteredField {
	/// Field name, unique within a form
	pub name: String,
	/// Opaque reference to the field's runtime instance
	pub handle: FieldHandle,
	/// Whether the built-in required check applies
	pub required: bool,
	/// Custom validator; when present it takes precedence over the
	/// required check
	pub validator: Option<Validator>,
}

impl fmt::Debug for RegisteredField {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("RegisteredField")
			.field("name", &self.name)
			.field("required", &self.required)
			.field("has_validator", &self.validator.is_some())
			.finish()
	}
}

struct Entry {
	field: RegisteredField,
	generation: u64,
}

#[derive(Default)]
struct RegistryInner {
	// Insertion order is kept only so error output is deterministic
	entries: Vec<Entry>,
	next_generation: u64,
}

/// Registry of mounted fields, shared between the form facade and its
/// field components.
///
/// Clones share the same underlying collection. All access is
/// single-threaded; the registry is not `Send`.
///
/// # Examples
///
/// ```
/// use formstate::{FieldHandle, FieldRegistry};
///
/// let registry = FieldRegistry::new();
/// let guard = registry.register("email".to_string(), FieldHandle::new(()), true, None);
///
/// assert!(registry.get("email").is_some());
/// drop(guard);
/// assert!(registry.get("email").is_none());
/// ```
#[derive(Clone, Default)]
pub struct FieldRegistry {
	inner: Rc<RefCell<RegistryInner>>,
}

impl FieldRegistry {
	pub fn new() -> Self {
		Self::default()
	}

	/// Insert or replace the metadata entry for `name`.
	///
	/// Replacing bumps the entry's generation, so a guard handed out by
	/// an earlier registration of the same name becomes inert: dropping
	/// it will not evict the newer entry.
	pub fn register(
		&self,
		name: String,
		handle: FieldHandle,
		required: bool,
		validator: Option<Validator>,
	) -> RegistrationGuard {
		let mut inner = self.inner.borrow_mut();
		let generation = inner.next_generation;
		inner.next_generation += 1;

		let field = RegisteredField {
			name: name.clone(),
			handle,
			required,
			validator,
		};

		tracing::debug!(field = %name, required, "registering field");

		match inner.entries.iter_mut().find(|e| e.field.name == name) {
			Some(entry) => {
				entry.field = field;
				entry.generation = generation;
			}
			None => inner.entries.push(Entry { field, generation }),
		}

		RegistrationGuard {
			registry: Rc::downgrade(&self.inner),
			name,
			generation,
		}
	}

	/// Remove the entry for `name`, regardless of generation.
	///
	/// Returns `true` if an entry was removed.
	pub fn unregister(&self, name: &str) -> bool {
		let mut inner = self.inner.borrow_mut();
		let pos = inner.entries.iter().position(|e| e.field.name == name);
		match pos {
			Some(pos) => {
				inner.entries.remove(pos);
				tracing::debug!(field = %name, "unregistered field");
				true
			}
			None => false,
		}
	}

	/// Look up the metadata for `name`.
	pub fn get(&self, name: &str) -> Option<RegisteredField> {
		self.inner
			.borrow()
			.entries
			.iter()
			.find(|e| e.field.name == name)
			.map(|e| e.field.clone())
	}

	pub fn contains(&self, name: &str) -> bool {
		self.inner
			.borrow()
			.entries
			.iter()
			.any(|e| e.field.name == name)
	}

	/// Snapshot of all registered fields, in insertion order.
	pub fn fields(&self) -> Vec<RegisteredField> {
		self.inner
			.borrow()
			.entries
			.iter()
			.map(|e| e.field.clone())
			.collect()
	}

	pub fn len(&self) -> usize {
		self.inner.borrow().entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.inner.borrow().entries.is_empty()
	}
}

impl fmt::Debug for FieldRegistry {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("FieldRegistry")
			.field("len", &self.len())
			.finish()
	}
}

/// Scoped registration handle.
///
/// Dropping the guard unregisters the field, provided the entry has not
/// been replaced by a newer registration in the meantime. Field
/// components hold the guard for exactly as long as they are mounted.
#[must_use = "dropping the guard unregisters the field"]
pub struct RegistrationGuard {
	registry: Weak<RefCell<RegistryInner>>,
	name: String,
	generation: u64,
}

impl RegistrationGuard {
	/// Name of the field this guard covers.
	pub fn name(&self) -> &str {
		&self.name
	}
}

impl Drop for RegistrationGuard {
	fn drop(&mut self) {
		let Some(inner) = self.registry.upgrade() else {
			return;
		};
		let mut inner = inner.borrow_mut();
		let pos = inner
			.entries
			.iter()
			.position(|e| e.field.name == self.name && e.generation == self.generation);
		if let Some(pos) = pos {
			inner.entries.remove(pos);
			tracing::debug!(field = %self.name, "unregistered field on guard drop");
		}
	}
}

impl fmt::Debug for RegistrationGuard {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("RegistrationGuard")
			.field("name", &self.name)
			.finish()
	}
}
