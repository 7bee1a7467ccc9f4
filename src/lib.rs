//! Form state management for component-based UIs
//!
//! This crate tracks field values, validation errors, and dirty status
//! for a form, and exposes a field-rendering abstraction. It provides:
//! - A field registry populated by field components on mount, with
//!   scoped unregistration on unmount
//! - A validation engine running per-field validators (or the built-in
//!   required check) sequentially over the current values
//! - A shared form state store with atomic change handling,
//!   deep-equality dirty tracking, and subscriber notification
//! - A field-rendering capability composing label, input, and error
//!   display independently of the state store

pub mod engine;
pub mod error;
pub mod form;
pub mod registry;
pub mod render;
pub mod store;
pub mod validators;

pub use engine::{REQUIRED_MESSAGE, is_valid, validate};
pub use error::{FormError, FormResult};
pub use form::{FormData, ValidationMode};
pub use registry::{FieldHandle, FieldRegistry, RegisteredField, RegistrationGuard, Validator};
pub use render::{BoundField, DefaultFieldRenderer, FieldRenderProps, FieldRenderer};
pub use store::{FormErrors, FormState, FormStore, FormValue, SubscriberId};
pub use validators::{EmailValidator, MaxLengthValidator, MinLengthValidator, PatternValidator};
