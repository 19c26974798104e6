//! The `FieldSpec` metadata container
//!
//! A `FieldSpec` is the annotation-site bag of field options: default
//! factory, repr/eq/order/hash participation, init behavior, keyword-only
//! flag, setattr hook, and constructor alias. It is a pure data holder
//! with a fixed set of fields; every option defaults to "unset", which
//! means "inherit the builder default". No cross-field consistency is
//! checked here (for example `init=false` with no default) — that is the
//! class-builder's job once the whole field is assembled.

use std::fmt;
use std::sync::Arc;

use serde_json::{Map, Value};

use crate::descriptor::FieldDescriptor;
use crate::error::FieldResult;
use crate::instance::Instance;

/// Zero-argument producer of a default value.
pub type Factory = Arc<dyn Fn() -> Value + Send + Sync>;

/// Custom formatter for a field's part of the generated repr.
pub type ReprFormatter = Arc<dyn Fn(&Value) -> String + Send + Sync>;

/// Key extraction function for equality/ordering comparisons.
pub type KeyFn = Arc<dyn Fn(&Value) -> Value + Send + Sync>;

/// One stage of an `on_setattr` pipeline: receives the instance, the
/// field descriptor, and the incoming value, and yields the value to
/// store (or rejects the assignment).
pub type SetAttrHook =
	Arc<dyn Fn(&Instance, &FieldDescriptor, Value) -> FieldResult<Value> + Send + Sync>;

/// Participation of a field in the generated textual representation.
#[derive(Clone)]
pub enum ReprSpec {
	/// Shown with the default `name: value` rendering.
	Include,
	/// Left out of the repr entirely.
	Exclude,
	/// Shown, with the value rendered by a custom formatter.
	Custom(ReprFormatter),
}

impl fmt::Debug for ReprSpec {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Include => f.write_str("ReprSpec::Include"),
			Self::Exclude => f.write_str("ReprSpec::Exclude"),
			Self::Custom(_) => f.write_str("ReprSpec::Custom(..)"),
		}
	}
}

/// Participation of a field in equality or ordering comparisons.
#[derive(Clone)]
pub enum CmpSpec {
	/// Compared by value.
	On,
	/// Ignored by the comparison.
	Off,
	/// Compared by the result of a key function applied to the value.
	Key(KeyFn),
}

impl CmpSpec {
	/// Whether the field takes part in the comparison at all.
	pub fn participates(&self) -> bool {
		!matches!(self, Self::Off)
	}

	/// The comparison key for `value` under this spec.
	pub(crate) fn key_of(&self, value: &Value) -> Value {
		match self {
			Self::Key(key) => key(value),
			_ => value.clone(),
		}
	}
}

impl fmt::Debug for CmpSpec {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::On => f.write_str("CmpSpec::On"),
			Self::Off => f.write_str("CmpSpec::Off"),
			Self::Key(_) => f.write_str("CmpSpec::Key(..)"),
		}
	}
}

/// Tri-state participation of a field in the generated hash.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HashSpec {
	/// Always hashed.
	Always,
	/// Never hashed.
	Never,
	/// Hashed exactly when the field takes part in equality.
	FollowEq,
}

/// Behavior on later attribute assignment.
///
/// Unset on a [`FieldSpec`] means the builder default: run the field's
/// composed converter, then its composed validator, then store.
#[derive(Clone)]
pub enum SetAttrSpec {
	/// Store the value as-is, running nothing.
	NoOp,
	/// Run the given hooks left to right, storing the final value.
	Pipe(Vec<SetAttrHook>),
}

impl fmt::Debug for SetAttrSpec {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::NoOp => f.write_str("SetAttrSpec::NoOp"),
			Self::Pipe(hooks) => write!(f, "SetAttrSpec::Pipe(len={})", hooks.len()),
		}
	}
}

/// Annotation-site field metadata.
///
/// All options are optional; a fresh `FieldSpec` leaves every decision to
/// the class-builder's defaults. Options are set through consuming
/// builder methods, so partial specification is always legal.
///
/// # Examples
///
/// ```
/// use annofield::FieldSpec;
/// use serde_json::json;
///
/// let spec = FieldSpec::new().with_kw_only(true).with_factory(|| json!(42));
/// assert_eq!(spec.kw_only, Some(true));
/// assert!(spec.factory.is_some());
/// assert_eq!(spec.init, None);
/// ```
#[derive(Clone, Default)]
pub struct FieldSpec {
	pub factory: Option<Factory>,
	pub repr: Option<ReprSpec>,
	pub eq: Option<CmpSpec>,
	pub order: Option<CmpSpec>,
	pub hash: Option<HashSpec>,
	pub init: Option<bool>,
	pub metadata: Option<Map<String, Value>>,
	pub kw_only: Option<bool>,
	pub on_setattr: Option<SetAttrSpec>,
	pub alias: Option<String>,
}

impl fmt::Debug for FieldSpec {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("FieldSpec")
			.field("factory", &self.factory.as_ref().map(|_| "<factory>"))
			.field("repr", &self.repr)
			.field("eq", &self.eq)
			.field("order", &self.order)
			.field("hash", &self.hash)
			.field("init", &self.init)
			.field("metadata", &self.metadata)
			.field("kw_only", &self.kw_only)
			.field("on_setattr", &self.on_setattr)
			.field("alias", &self.alias)
			.finish()
	}
}

impl FieldSpec {
	/// Create a spec with every option unset.
	///
	/// # Examples
	///
	/// ```
	/// use annofield::FieldSpec;
	///
	/// let spec = FieldSpec::new();
	/// assert!(spec.factory.is_none());
	/// assert!(spec.alias.is_none());
	/// ```
	pub fn new() -> Self {
		Self::default()
	}

	/// Set a zero-argument default-value factory.
	///
	/// # Examples
	///
	/// ```
	/// use annofield::FieldSpec;
	/// use serde_json::json;
	///
	/// let spec = FieldSpec::new().with_factory(|| json!([]));
	/// assert_eq!(spec.factory.as_ref().map(|f| f()), Some(json!([])));
	/// ```
	pub fn with_factory(mut self, factory: impl Fn() -> Value + Send + Sync + 'static) -> Self {
		self.factory = Some(Arc::new(factory));
		self
	}

	/// Include or exclude the field from the generated repr.
	pub fn with_repr(mut self, repr: bool) -> Self {
		self.repr = Some(if repr { ReprSpec::Include } else { ReprSpec::Exclude });
		self
	}

	/// Render the field in the repr with a custom formatter.
	///
	/// # Examples
	///
	/// ```
	/// use annofield::{FieldSpec, ReprSpec};
	///
	/// let spec = FieldSpec::new().with_repr_formatter(|_| "***".to_string());
	/// assert!(matches!(spec.repr, Some(ReprSpec::Custom(_))));
	/// ```
	pub fn with_repr_formatter(
		mut self,
		formatter: impl Fn(&Value) -> String + Send + Sync + 'static,
	) -> Self {
		self.repr = Some(ReprSpec::Custom(Arc::new(formatter)));
		self
	}

	/// Include or exclude the field from equality comparisons.
	pub fn with_eq(mut self, eq: bool) -> Self {
		self.eq = Some(if eq { CmpSpec::On } else { CmpSpec::Off });
		self
	}

	/// Compare the field for equality by a key function.
	pub fn with_eq_key(mut self, key: impl Fn(&Value) -> Value + Send + Sync + 'static) -> Self {
		self.eq = Some(CmpSpec::Key(Arc::new(key)));
		self
	}

	/// Include or exclude the field from ordering comparisons.
	pub fn with_order(mut self, order: bool) -> Self {
		self.order = Some(if order { CmpSpec::On } else { CmpSpec::Off });
		self
	}

	/// Order the field by a key function.
	pub fn with_order_key(mut self, key: impl Fn(&Value) -> Value + Send + Sync + 'static) -> Self {
		self.order = Some(CmpSpec::Key(Arc::new(key)));
		self
	}

	/// Set hash participation explicitly.
	///
	/// # Examples
	///
	/// ```
	/// use annofield::{FieldSpec, HashSpec};
	///
	/// let spec = FieldSpec::new().with_hash(HashSpec::Never);
	/// assert_eq!(spec.hash, Some(HashSpec::Never));
	/// ```
	pub fn with_hash(mut self, hash: HashSpec) -> Self {
		self.hash = Some(hash);
		self
	}

	/// Include or exclude the field from the synthesized constructor.
	///
	/// A field with `init=false` must carry a default value or factory;
	/// the class-builder rejects it otherwise.
	pub fn with_init(mut self, init: bool) -> Self {
		self.init = Some(init);
		self
	}

	/// Attach an opaque metadata mapping for downstream tooling.
	///
	/// The resolver never interprets this mapping; ownership transfers
	/// to the finished field descriptor, where it is read-only.
	pub fn with_metadata(mut self, metadata: Map<String, Value>) -> Self {
		self.metadata = Some(metadata);
		self
	}

	/// Make the constructor parameter keyword-only.
	pub fn with_kw_only(mut self, kw_only: bool) -> Self {
		self.kw_only = Some(kw_only);
		self
	}

	/// Set the behavior on later attribute assignment.
	pub fn with_on_setattr(mut self, on_setattr: SetAttrSpec) -> Self {
		self.on_setattr = Some(on_setattr);
		self
	}

	/// Override the constructor parameter name.
	///
	/// The runtime attribute name is unchanged; only argument binding
	/// uses the alias.
	///
	/// # Examples
	///
	/// ```
	/// use annofield::FieldSpec;
	///
	/// let spec = FieldSpec::new().with_alias("colour");
	/// assert_eq!(spec.alias.as_deref(), Some("colour"));
	/// ```
	pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
		self.alias = Some(alias.into());
		self
	}

	/// Merge `overriding` on top of `self`, option by option.
	///
	/// An option explicitly set on `overriding` wins; an unset option
	/// falls back to `self`. The resolver calls this with the
	/// annotation-site spec as `self` and the assignment-site spec as
	/// `overriding`, which is what makes the assignment site win on
	/// conflicting explicit values.
	pub(crate) fn merged_with(self, overriding: &FieldSpec) -> FieldSpec {
		FieldSpec {
			factory: overriding.factory.clone().or(self.factory),
			repr: overriding.repr.clone().or(self.repr),
			eq: overriding.eq.clone().or(self.eq),
			order: overriding.order.clone().or(self.order),
			hash: overriding.hash.or(self.hash),
			init: overriding.init.or(self.init),
			metadata: overriding.metadata.clone().or(self.metadata),
			kw_only: overriding.kw_only.or(self.kw_only),
			on_setattr: overriding.on_setattr.clone().or(self.on_setattr),
			alias: overriding.alias.clone().or(self.alias),
		}
	}
}
