//! Form state store
//!
//! Holds the current value mapping, the current errors mapping, and the
//! dirty flag as one unit, and republishes the state to subscribers on
//! every change. Clones of a [`FormStore`] share the same state, the
//! same way the host framework would distribute a context value to
//! descendant field components; subscription replaces the ambient
//! channel with explicit notification.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use serde::Serialize;
use serde_json::Value;

use crate::error::{FormError, FormResult};

/// Current value mapping: field name to value. Keys are fixed at form
/// initialization.
pub type FormValue = HashMap<String, Value>;

/// Current errors mapping: field name to optional error message.
/// `None` means the field has no error.
pub type FormErrors = HashMap<String, Option<String>>;

/// One published unit of form state.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormState {
	pub value: FormValue,
	pub errors: FormErrors,
	pub dirty: bool,
}

/// Identifier returned by [`FormStore::subscribe`], used to detach the
/// subscriber again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriberId(u64);

type SubscriberFn = Rc<dyn Fn(&FormState)>;

struct StoreInner {
	initial: FormValue,
	state: FormState,
	subscribers: Vec<(SubscriberId, SubscriberFn)>,
	next_subscriber: u64,
}

/// Shared form state container.
///
/// All mutation goes through [`FormStore::on_change`] and
/// [`FormStore::replace_errors`]; both update the state atomically as
/// observed by any reader and then notify subscribers. Access is
/// single-threaded; the store is not `Send`.
///
/// # Examples
///
/// ```
/// use std::collections::HashMap;
/// use formstate::FormStore;
/// use serde_json::json;
///
/// let mut initial = HashMap::new();
/// initial.insert("name".to_string(), json!("a"));
///
/// let store = FormStore::new(initial, None);
/// assert!(!store.is_dirty());
///
/// let mut changed = HashMap::new();
/// changed.insert("name".to_string(), json!("b"));
/// store.on_change(changed, HashMap::new()).unwrap();
/// assert!(store.is_dirty());
/// ```
#[derive(Clone)]
pub struct FormStore {
	inner: Rc<RefCell<StoreInner>>,
}

impl FormStore {
	/// Create a store from the initial value mapping.
	///
	/// When `initial_errors` is omitted, every key starts with no
	/// error. When it is supplied, it is re-keyed to the value
	/// mapping's key set: entries for unknown keys are dropped and
	/// missing keys start with no error.
	pub fn new(initial: FormValue, initial_errors: Option<FormErrors>) -> Self {
		let errors: FormErrors = initial
			.keys()
			.map(|key| {
				let error = initial_errors
					.as_ref()
					.and_then(|errors| errors.get(key).cloned())
					.flatten();
				(key.clone(), error)
			})
			.collect();

		let state = FormState {
			value: initial.clone(),
			errors,
			dirty: false,
		};

		Self {
			inner: Rc::new(RefCell::new(StoreInner {
				initial,
				state,
				subscribers: Vec::new(),
				next_subscriber: 0,
			})),
		}
	}

	/// Snapshot of the current state.
	pub fn state(&self) -> FormState {
		self.inner.borrow().state.clone()
	}

	/// Snapshot of the current value mapping.
	pub fn value(&self) -> FormValue {
		self.inner.borrow().state.value.clone()
	}

	/// Snapshot of the current errors mapping.
	pub fn errors(&self) -> FormErrors {
		self.inner.borrow().state.errors.clone()
	}

	/// Snapshot of the initial value mapping the store was created with.
	pub fn initial(&self) -> FormValue {
		self.inner.borrow().initial.clone()
	}

	/// Whether the current value mapping differs structurally from the
	/// initial mapping.
	pub fn is_dirty(&self) -> bool {
		self.inner.borrow().state.dirty
	}

	/// Change handler: replace the value and errors mappings and
	/// recompute the dirty flag.
	///
	/// The value mapping must carry exactly the initial key set;
	/// anything else breaks the store invariant and is rejected. The
	/// errors mapping is re-keyed to the same key set (missing keys
	/// become "no error"). Subscribers are notified after the state has
	/// been swapped in.
	pub fn on_change(&self, value: FormValue, errors: FormErrors) -> FormResult<()> {
		{
			let mut inner = self.inner.borrow_mut();

			for key in value.keys() {
				if !inner.initial.contains_key(key) {
					return Err(FormError::UnexpectedField(key.clone()));
				}
			}
			for key in inner.initial.keys() {
				if !value.contains_key(key) {
					return Err(FormError::MissingField(key.clone()));
				}
			}

			let errors: FormErrors = inner
				.initial
				.keys()
				.map(|key| (key.clone(), errors.get(key).cloned().flatten()))
				.collect();

			// HashMap equality is key-order independent and recursive
			// through serde_json::Value, which is exactly the deep
			// equality the dirty flag needs.
			let dirty = value != inner.initial;
			tracing::trace!(dirty, "applying form change");

			inner.state = FormState {
				value,
				errors,
				dirty,
			};
		}
		self.notify();
		Ok(())
	}

	/// Replace the errors mapping wholesale with a validation result,
	/// re-keyed to the initial key set.
	///
	/// Used by the validation engine's store-update mode; the value
	/// mapping and dirty flag are untouched. Subscribers are notified.
	pub fn replace_errors(&self, errors: FormErrors) {
		{
			let mut inner = self.inner.borrow_mut();
			let errors: FormErrors = inner
				.initial
				.keys()
				.map(|key| (key.clone(), errors.get(key).cloned().flatten()))
				.collect();
			inner.state.errors = errors;
		}
		self.notify();
	}

	/// Attach a subscriber that is invoked with a state snapshot after
	/// every change.
	pub fn subscribe(&self, subscriber: impl Fn(&FormState) + 'static) -> SubscriberId {
		let mut inner = self.inner.borrow_mut();
		let id = SubscriberId(inner.next_subscriber);
		inner.next_subscriber += 1;
		inner.subscribers.push((id, Rc::new(subscriber)));
		id
	}

	/// Detach a subscriber. Returns `true` if it was attached.
	pub fn unsubscribe(&self, id: SubscriberId) -> bool {
		let mut inner = self.inner.borrow_mut();
		let before = inner.subscribers.len();
		inner.subscribers.retain(|(sid, _)| *sid != id);
		inner.subscribers.len() != before
	}

	// Subscribers run outside the borrow so they can read the store.
	fn notify(&self) {
		let (state, subscribers) = {
			let inner = self.inner.borrow();
			(inner.state.clone(), inner.subscribers.clone())
		};
		for (_, subscriber) in subscribers {
			subscriber(&state);
		}
	}
}

impl fmt::Debug for FormStore {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let inner = self.inner.borrow();
		f.debug_struct("FormStore")
			.field("state", &inner.state)
			.field("subscribers", &inner.subscribers.len())
			.finish()
	}
}
