//! Runtime instances and the synthesized constructor
//!
//! [`Args`] is the calling convention of the synthesized constructor:
//! positional values bind to non-keyword-only, init-visible fields in
//! declaration order, keywords bind by alias. Construction runs each
//! field's composed converter and then its composed validator, in
//! declaration order; later assignment through [`Instance::set`] runs
//! the field's setattr policy.

use std::cmp::Ordering;
use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{Hash, Hasher};

use serde_json::{Map, Value};

use crate::descriptor::ClassDescriptor;
use crate::error::{FieldError, FieldResult};
use crate::field::SetAttrSpec;

/// Arguments for the synthesized constructor.
///
/// # Examples
///
/// ```
/// use annofield::Args;
/// use serde_json::json;
///
/// let args = Args::new().pos(json!(1)).kw("y", json!(2));
/// assert_eq!(args.positional().len(), 1);
/// assert_eq!(args.keyword().len(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Args {
	positional: Vec<Value>,
	keyword: Vec<(String, Value)>,
}

impl Args {
	/// No arguments.
	pub fn new() -> Self {
		Self::default()
	}

	/// Append a positional argument.
	pub fn pos(mut self, value: Value) -> Self {
		self.positional.push(value);
		self
	}

	/// Append a keyword argument.
	pub fn kw(mut self, name: impl Into<String>, value: Value) -> Self {
		self.keyword.push((name.into(), value));
		self
	}

	/// The positional arguments, in order.
	pub fn positional(&self) -> &[Value] {
		&self.positional
	}

	/// The keyword arguments, in the order given.
	pub fn keyword(&self) -> &[(String, Value)] {
		&self.keyword
	}
}

/// A constructed instance of a [`ClassDescriptor`].
///
/// Values are stored in field declaration order; the descriptor handle
/// is shared, so cloning an instance is a per-field value clone only.
#[derive(Clone)]
pub struct Instance {
	class: ClassDescriptor,
	values: Vec<Value>,
}

impl Instance {
	/// Bind arguments, fill defaults, convert, validate, store.
	pub(crate) fn construct(class: ClassDescriptor, args: Args) -> FieldResult<Self> {
		let fields = class.fields();
		let mut bound: Vec<Option<Value>> = (0..fields.len()).map(|_| None).collect();

		// Positional binding: init-visible, non-kw-only fields in order.
		let slots: Vec<usize> = fields
			.iter()
			.filter(|field| field.init() && !field.kw_only())
			.map(|field| field.index())
			.collect();
		let (positional, keyword) = (args.positional, args.keyword);
		if positional.len() > slots.len() {
			return Err(FieldError::TooManyPositional {
				expected: slots.len(),
				given: positional.len(),
			});
		}
		for (value, &index) in positional.into_iter().zip(slots.iter()) {
			bound[index] = Some(value);
		}

		// Keyword binding, by alias. init=false fields are not
		// constructor parameters, so naming one is as unexpected as
		// naming a field that does not exist.
		for (name, value) in keyword {
			let index = match class.field_by_alias(&name) {
				Some(field) if field.init() => field.index(),
				_ => return Err(FieldError::UnexpectedKeyword(name)),
			};
			if bound[index].is_some() {
				return Err(FieldError::MultipleValues(name));
			}
			bound[index] = Some(value);
		}

		let mut instance = Self {
			values: vec![Value::Null; fields.len()],
			class: class.clone(),
		};
		for (index, field) in class.fields().iter().enumerate() {
			let raw = match bound[index].take() {
				Some(value) => value,
				None => field
					.default()
					.produce()
					.ok_or_else(|| FieldError::MissingArgument(field.alias().to_string()))?,
			};
			let value = field.convert(raw)?;
			field.validate(&instance, &value)?;
			instance.values[index] = value;
		}
		Ok(instance)
	}

	/// The class this instance belongs to.
	pub fn class(&self) -> &ClassDescriptor {
		&self.class
	}

	/// Current value of a field, by attribute name.
	pub fn get(&self, name: &str) -> Option<&Value> {
		self.class
			.field(name)
			.map(|field| &self.values[field.index()])
	}

	/// Assign a field, running its setattr policy first.
	///
	/// The default policy runs the composed converter and then the
	/// composed validator; [`SetAttrSpec::NoOp`] stores the value as-is;
	/// [`SetAttrSpec::Pipe`] threads the value through its hooks. On
	/// rejection nothing is stored and the instance is unchanged.
	pub fn set(&mut self, name: &str, value: Value) -> FieldResult<()> {
		let class = self.class.clone();
		let field = class
			.field(name)
			.ok_or_else(|| FieldError::NoSuchField(name.to_string()))?;
		let stored = match &field.on_setattr {
			None => {
				let converted = field.convert(value)?;
				field.validate(self, &converted)?;
				converted
			}
			Some(SetAttrSpec::NoOp) => value,
			Some(SetAttrSpec::Pipe(hooks)) => {
				let mut current = value;
				for hook in hooks {
					current = hook(self, field, current)?;
				}
				current
			}
		};
		self.values[field.index()] = stored;
		Ok(())
	}

	/// All fields as a mapping of attribute name to value.
	///
	/// # Examples
	///
	/// ```
	/// use annofield::{Annotation, Args, AttrDecl, ClassBuilder, FieldSpec};
	/// use serde_json::json;
	///
	/// let class = ClassBuilder::new("Obj")
	/// 	.attr(AttrDecl::new("x").annotate(Annotation::Field(FieldSpec::new())))
	/// 	.build()
	/// 	.unwrap();
	/// let obj = class.new_instance(Args::new().kw("x", json!(1))).unwrap();
	/// assert_eq!(serde_json::Value::Object(obj.to_map()), json!({"x": 1}));
	/// ```
	pub fn to_map(&self) -> Map<String, Value> {
		self.class
			.fields()
			.iter()
			.map(|field| (field.name().to_string(), self.values[field.index()].clone()))
			.collect()
	}

	/// The generated textual representation.
	///
	/// Only repr-participating fields appear; custom formatters are
	/// applied. A class whose every field is excluded renders as the
	/// bare class name.
	pub fn repr(&self) -> String {
		let parts: Vec<String> = self
			.class
			.fields()
			.iter()
			.filter_map(|field| {
				field
					.format_value(&self.values[field.index()])
					.map(|rendered| format!("{}: {}", field.name(), rendered))
			})
			.collect();
		if parts.is_empty() {
			self.class.name().to_string()
		} else {
			format!("{} {{ {} }}", self.class.name(), parts.join(", "))
		}
	}

	/// Hash over the hash-participating fields.
	///
	/// Fields marked [`HashSpec::FollowEq`](crate::HashSpec::FollowEq)
	/// participate exactly when they participate in equality.
	pub fn hash_value(&self) -> u64 {
		let mut hasher = DefaultHasher::new();
		self.class.name().hash(&mut hasher);
		for field in self.class.fields() {
			if field.participates_in_hash() {
				field.name().hash(&mut hasher);
				self.values[field.index()].to_string().hash(&mut hasher);
			}
		}
		hasher.finish()
	}
}

impl fmt::Debug for Instance {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.repr())
	}
}

impl fmt::Display for Instance {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.repr())
	}
}

impl PartialEq for Instance {
	fn eq(&self, other: &Self) -> bool {
		if !self.class.same_class(&other.class) {
			return false;
		}
		self.class.fields().iter().all(|field| {
			if !field.participates_in_eq() {
				return true;
			}
			let index = field.index();
			field.eq_key(&self.values[index]) == field.eq_key(&other.values[index])
		})
	}
}

impl PartialOrd for Instance {
	fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
		if !self.class.same_class(&other.class) {
			return None;
		}
		for field in self.class.fields() {
			if !field.participates_in_order() {
				continue;
			}
			let index = field.index();
			let ordering = value_cmp(
				&field.order_key(&self.values[index]),
				&field.order_key(&other.values[index]),
			)?;
			if ordering != Ordering::Equal {
				return Some(ordering);
			}
		}
		Some(Ordering::Equal)
	}
}

impl serde::Serialize for Instance {
	fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		self.to_map().serialize(serializer)
	}
}

/// Compare two JSON values of the same kind; values of different kinds
/// are incomparable.
fn value_cmp(a: &Value, b: &Value) -> Option<Ordering> {
	match (a, b) {
		(Value::Null, Value::Null) => Some(Ordering::Equal),
		(Value::Bool(x), Value::Bool(y)) => Some(x.cmp(y)),
		(Value::Number(x), Value::Number(y)) => x.as_f64().partial_cmp(&y.as_f64()),
		(Value::String(x), Value::String(y)) => Some(x.cmp(y)),
		(Value::Array(x), Value::Array(y)) => {
			for (left, right) in x.iter().zip(y.iter()) {
				match value_cmp(left, right)? {
					Ordering::Equal => continue,
					other => return Some(other),
				}
			}
			Some(x.len().cmp(&y.len()))
		}
		(Value::Object(_), Value::Object(_)) => Some(a.to_string().cmp(&b.to_string())),
		_ => None,
	}
}
