//! Finished class and field descriptors
//!
//! A [`ClassDescriptor`] is the immutable output of the second builder
//! phase: an ordered list of [`FieldDescriptor`]s plus alias and name
//! lookup tables. Once emitted it is never mutated; instances hold a
//! cheap handle to it.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde_json::{Map, Value};

use crate::annotation::{ConvertFn, ValidateFn};
use crate::error::FieldResult;
use crate::field::{CmpSpec, Factory, HashSpec, ReprSpec, SetAttrSpec};
use crate::instance::{Args, Instance};

/// Where a field's value comes from when the constructor receives no
/// argument for it.
#[derive(Clone)]
pub enum FieldDefault {
	/// No default; the constructor argument is mandatory.
	None,
	/// A literal value, cloned per instance.
	Literal(Value),
	/// A factory, called per instance.
	Factory(Factory),
}

impl FieldDefault {
	/// Produce the default value, if there is one.
	pub fn produce(&self) -> Option<Value> {
		match self {
			Self::None => None,
			Self::Literal(value) => Some(value.clone()),
			Self::Factory(factory) => Some(factory()),
		}
	}

	/// Whether any default exists.
	pub fn is_set(&self) -> bool {
		!matches!(self, Self::None)
	}
}

impl fmt::Debug for FieldDefault {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::None => f.write_str("FieldDefault::None"),
			Self::Literal(value) => write!(f, "FieldDefault::Literal({value})"),
			Self::Factory(_) => f.write_str("FieldDefault::Factory(..)"),
		}
	}
}

/// The finished, per-attribute record the class-builder emits.
///
/// All builder defaults are already applied here: repr defaults to
/// included, eq to on, order and hash follow eq, init to true, kw_only
/// to false, and the alias to the attribute name with leading
/// underscores stripped.
pub struct FieldDescriptor {
	pub(crate) name: String,
	pub(crate) alias: String,
	pub(crate) index: usize,
	pub(crate) default: FieldDefault,
	pub(crate) repr: ReprSpec,
	pub(crate) eq: CmpSpec,
	pub(crate) order: CmpSpec,
	pub(crate) hash: HashSpec,
	pub(crate) init: bool,
	pub(crate) kw_only: bool,
	pub(crate) metadata: Map<String, Value>,
	pub(crate) converter: Option<ConvertFn>,
	pub(crate) validator: Option<ValidateFn>,
	pub(crate) on_setattr: Option<SetAttrSpec>,
}

impl FieldDescriptor {
	/// The runtime attribute name.
	pub fn name(&self) -> &str {
		&self.name
	}

	/// The constructor parameter name.
	pub fn alias(&self) -> &str {
		&self.alias
	}

	/// Position of the field in declaration order.
	pub fn index(&self) -> usize {
		self.index
	}

	/// The field's default, if any.
	pub fn default(&self) -> &FieldDefault {
		&self.default
	}

	/// Whether the synthesized constructor accepts this field.
	pub fn init(&self) -> bool {
		self.init
	}

	/// Whether the constructor parameter is keyword-only.
	pub fn kw_only(&self) -> bool {
		self.kw_only
	}

	/// The opaque metadata mapping attached at definition time.
	pub fn metadata(&self) -> &Map<String, Value> {
		&self.metadata
	}

	/// Whether the field takes part in equality comparisons.
	pub fn participates_in_eq(&self) -> bool {
		self.eq.participates()
	}

	/// Whether the field takes part in ordering comparisons.
	pub fn participates_in_order(&self) -> bool {
		self.order.participates()
	}

	/// Whether the field takes part in the generated hash.
	pub fn participates_in_hash(&self) -> bool {
		match self.hash {
			HashSpec::Always => true,
			HashSpec::Never => false,
			HashSpec::FollowEq => self.participates_in_eq(),
		}
	}

	/// Render the field's part of the repr, or `None` when excluded.
	pub fn format_value(&self, value: &Value) -> Option<String> {
		match &self.repr {
			ReprSpec::Include => Some(value.to_string()),
			ReprSpec::Exclude => None,
			ReprSpec::Custom(formatter) => Some(formatter(value)),
		}
	}

	pub(crate) fn eq_key(&self, value: &Value) -> Value {
		self.eq.key_of(value)
	}

	pub(crate) fn order_key(&self, value: &Value) -> Value {
		self.order.key_of(value)
	}

	/// Run the composed converter, if any.
	pub(crate) fn convert(&self, value: Value) -> FieldResult<Value> {
		match &self.converter {
			Some(converter) => converter(value),
			None => Ok(value),
		}
	}

	/// Run the composed validator, if any.
	pub(crate) fn validate(&self, instance: &Instance, value: &Value) -> FieldResult<()> {
		match &self.validator {
			Some(validator) => validator(instance, self, value),
			None => Ok(()),
		}
	}
}

impl fmt::Debug for FieldDescriptor {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("FieldDescriptor")
			.field("name", &self.name)
			.field("alias", &self.alias)
			.field("default", &self.default)
			.field("init", &self.init)
			.field("kw_only", &self.kw_only)
			.field("repr", &self.repr)
			.field("eq", &self.eq)
			.field("order", &self.order)
			.field("hash", &self.hash)
			.finish_non_exhaustive()
	}
}

pub(crate) struct ClassInner {
	pub(crate) name: String,
	pub(crate) fields: Vec<FieldDescriptor>,
	pub(crate) by_name: HashMap<String, usize>,
	pub(crate) by_alias: HashMap<String, usize>,
}

/// An immutable, fully-resolved class: the output of
/// [`ClassBuilder::build`](crate::ClassBuilder::build).
///
/// Cloning is cheap; all clones share the same descriptor.
#[derive(Clone)]
pub struct ClassDescriptor {
	pub(crate) inner: Arc<ClassInner>,
}

impl ClassDescriptor {
	/// The class name.
	pub fn name(&self) -> &str {
		&self.inner.name
	}

	/// Fields in declaration order.
	pub fn fields(&self) -> &[FieldDescriptor] {
		&self.inner.fields
	}

	/// Look up a field by attribute name.
	pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
		self.inner
			.by_name
			.get(name)
			.map(|&index| &self.inner.fields[index])
	}

	/// Look up a field by constructor parameter name.
	pub fn field_by_alias(&self, alias: &str) -> Option<&FieldDescriptor> {
		self.inner
			.by_alias
			.get(alias)
			.map(|&index| &self.inner.fields[index])
	}

	/// Synthesized constructor: build an instance from arguments.
	///
	/// # Examples
	///
	/// ```
	/// use annofield::{Annotation, Args, AttrDecl, ClassBuilder, FieldSpec};
	/// use serde_json::json;
	///
	/// let class = ClassBuilder::new("Point")
	/// 	.attr(AttrDecl::new("x").annotate(Annotation::Field(FieldSpec::new())))
	/// 	.attr(AttrDecl::new("y").annotate(Annotation::Field(FieldSpec::new())))
	/// 	.build()
	/// 	.unwrap();
	/// let point = class
	/// 	.new_instance(Args::new().pos(json!(1)).kw("y", json!(2)))
	/// 	.unwrap();
	/// assert_eq!(point.get("x"), Some(&json!(1)));
	/// assert_eq!(point.get("y"), Some(&json!(2)));
	/// ```
	pub fn new_instance(&self, args: Args) -> FieldResult<Instance> {
		Instance::construct(self.clone(), args)
	}

	pub(crate) fn same_class(&self, other: &ClassDescriptor) -> bool {
		Arc::ptr_eq(&self.inner, &other.inner)
	}
}

impl fmt::Debug for ClassDescriptor {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("ClassDescriptor")
			.field("name", &self.inner.name)
			.field("fields", &self.inner.fields)
			.finish()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use serde_json::json;

	#[test]
	fn defaults_produce_values() {
		assert_eq!(FieldDefault::None.produce(), None);
		assert_eq!(FieldDefault::Literal(json!("z")).produce(), Some(json!("z")));
		let fresh = FieldDefault::Factory(Arc::new(|| json!(42)));
		assert_eq!(fresh.produce(), Some(json!(42)));
		assert!(fresh.is_set());
		assert!(!FieldDefault::None.is_set());
	}

	#[test]
	fn hash_follows_eq_by_default() {
		let field = FieldDescriptor {
			name: "x".to_string(),
			alias: "x".to_string(),
			index: 0,
			default: FieldDefault::None,
			repr: ReprSpec::Include,
			eq: CmpSpec::Off,
			order: CmpSpec::Off,
			hash: HashSpec::FollowEq,
			init: true,
			kw_only: false,
			metadata: Map::new(),
			converter: None,
			validator: None,
			on_setattr: None,
		};
		assert!(!field.participates_in_hash());
	}

	#[test]
	fn repr_modes_render_or_skip() {
		let mut field = FieldDescriptor {
			name: "x".to_string(),
			alias: "x".to_string(),
			index: 0,
			default: FieldDefault::None,
			repr: ReprSpec::Include,
			eq: CmpSpec::On,
			order: CmpSpec::On,
			hash: HashSpec::FollowEq,
			init: true,
			kw_only: false,
			metadata: Map::new(),
			converter: None,
			validator: None,
			on_setattr: None,
		};
		assert_eq!(field.format_value(&json!("z")), Some("\"z\"".to_string()));
		field.repr = ReprSpec::Exclude;
		assert_eq!(field.format_value(&json!("z")), None);
		field.repr = ReprSpec::Custom(Arc::new(|_| "***".to_string()));
		assert_eq!(field.format_value(&json!("z")), Some("***".to_string()));
	}
}
