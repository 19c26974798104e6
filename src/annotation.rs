//! Tagged annotation entries
//!
//! A compound annotation is an ordered sequence of [`Annotation`] values
//! attached to one attribute. The resolver pattern-matches the variant
//! kind; order is significant because converters and validators compose
//! left to right in declaration order. Entries meant for other tooling
//! travel as [`Annotation::Other`] and are tolerated and ignored.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::descriptor::FieldDescriptor;
use crate::error::{FieldError, FieldResult};
use crate::field::FieldSpec;
use crate::instance::Instance;

/// A single value-transformation callable.
pub type ConvertFn = Arc<dyn Fn(Value) -> FieldResult<Value> + Send + Sync>;

/// A single check callable, run against `(instance, field, value)`.
pub type ValidateFn =
	Arc<dyn Fn(&Instance, &FieldDescriptor, &Value) -> FieldResult<()> + Send + Sync>;

/// Wraps one value-transformation callable.
///
/// Zero or more converters may be attached to one attribute; they are
/// applied left to right in declaration order during construction and,
/// by default, on later assignment. A converter annotation is only valid
/// next to a [`FieldSpec`] annotation on the same attribute.
#[derive(Clone)]
pub struct ConverterSpec {
	func: ConvertFn,
}

impl ConverterSpec {
	/// Wrap a fallible converter.
	///
	/// # Examples
	///
	/// ```
	/// use annofield::{ConverterSpec, FieldError};
	/// use serde_json::json;
	///
	/// let conv = ConverterSpec::new(|v| {
	/// 	v.as_i64()
	/// 		.map(|n| json!(n + 1))
	/// 		.ok_or_else(|| FieldError::Conversion("expected an integer".to_string()))
	/// });
	/// assert_eq!(conv.apply(json!(1)).unwrap(), json!(2));
	/// assert!(conv.apply(json!("x")).is_err());
	/// ```
	pub fn new(func: impl Fn(Value) -> FieldResult<Value> + Send + Sync + 'static) -> Self {
		Self {
			func: Arc::new(func),
		}
	}

	/// Wrap an infallible converter.
	///
	/// # Examples
	///
	/// ```
	/// use annofield::ConverterSpec;
	/// use serde_json::json;
	///
	/// let negate = ConverterSpec::map(|v| json!(-v.as_i64().unwrap_or(0)));
	/// assert_eq!(negate.apply(json!(5)).unwrap(), json!(-5));
	/// ```
	pub fn map(func: impl Fn(Value) -> Value + Send + Sync + 'static) -> Self {
		Self {
			func: Arc::new(move |value| Ok(func(value))),
		}
	}

	/// Apply the wrapped converter to one value.
	pub fn apply(&self, value: Value) -> FieldResult<Value> {
		(self.func)(value)
	}

	pub(crate) fn func(&self) -> ConvertFn {
		Arc::clone(&self.func)
	}
}

impl fmt::Debug for ConverterSpec {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str("ConverterSpec(..)")
	}
}

/// Wraps one check callable.
///
/// Zero or more validators may be attached to one attribute; they all
/// run in declaration order after conversion, and the first rejection
/// aborts the remaining checks. A validator annotation is only valid
/// next to a [`FieldSpec`] annotation on the same attribute.
#[derive(Clone)]
pub struct ValidatorSpec {
	func: ValidateFn,
}

impl ValidatorSpec {
	/// Wrap a check callable.
	///
	/// The callable receives the instance under construction, the field
	/// descriptor, and the value after conversion, and rejects by
	/// returning an error.
	pub fn new(
		func: impl Fn(&Instance, &FieldDescriptor, &Value) -> FieldResult<()> + Send + Sync + 'static,
	) -> Self {
		Self {
			func: Arc::new(func),
		}
	}

	/// Wrap a check on the value alone.
	///
	/// # Examples
	///
	/// ```
	/// use annofield::ValidatorSpec;
	/// use serde_json::json;
	///
	/// let positive = ValidatorSpec::check(|v| {
	/// 	if v.as_i64().unwrap_or(0) > 0 {
	/// 		Ok(())
	/// 	} else {
	/// 		Err("must be positive".to_string())
	/// 	}
	/// });
	/// let _ = positive;
	/// ```
	pub fn check(func: impl Fn(&Value) -> Result<(), String> + Send + Sync + 'static) -> Self {
		Self {
			func: Arc::new(move |_, _, value| {
				func(value).map_err(FieldError::Validation)
			}),
		}
	}

	pub(crate) fn func(&self) -> ValidateFn {
		Arc::clone(&self.func)
	}
}

impl fmt::Debug for ValidatorSpec {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str("ValidatorSpec(..)")
	}
}

/// One entry of a compound annotation.
#[derive(Debug, Clone)]
pub enum Annotation {
	/// Field metadata; at most one per attribute.
	Field(FieldSpec),
	/// A value converter; requires a sibling `Field` entry.
	Converter(ConverterSpec),
	/// A value check; requires a sibling `Field` entry.
	Validator(ValidatorSpec),
	/// Metadata for other tooling; ignored by the resolver.
	Other(OtherAnnotation),
}

impl Annotation {
	/// Wrap an arbitrary value as a pass-through annotation.
	///
	/// # Examples
	///
	/// ```
	/// use annofield::Annotation;
	///
	/// let entry = Annotation::other("doc: retry count");
	/// assert!(matches!(entry, Annotation::Other(_)));
	/// ```
	pub fn other(value: impl Any + Send + Sync) -> Self {
		Self::Other(OtherAnnotation(Arc::new(value)))
	}
}

/// An opaque annotation entry owned by other tooling.
#[derive(Clone)]
pub struct OtherAnnotation(Arc<dyn Any + Send + Sync>);

impl OtherAnnotation {
	/// Downcast the carried value.
	pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
		self.0.downcast_ref()
	}
}

impl fmt::Debug for OtherAnnotation {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str("OtherAnnotation(..)")
	}
}
