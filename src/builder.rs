//! Two-phase class builder
//!
//! Phase one ([`ClassBuilder`]) only accumulates attribute declarations,
//! in order, with no validation. Phase two ([`ClassBuilder::build`])
//! resolves every attribute's annotations, applies the builder defaults,
//! and emits an immutable [`ClassDescriptor`]. Any resolution error
//! aborts the whole class; there is no partial descriptor and no
//! process-wide registry.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;

use crate::annotation::Annotation;
use crate::descriptor::{ClassDescriptor, ClassInner, FieldDefault, FieldDescriptor};
use crate::error::{DefineError, DefineResult};
use crate::field::{CmpSpec, FieldSpec, HashSpec, ReprSpec};
use crate::resolve::resolve_annotations;

/// One attribute declaration: the compound annotation plus anything the
/// classic (assignment-site) declaration path supplied.
///
/// # Examples
///
/// ```
/// use annofield::{Annotation, AttrDecl, FieldSpec};
/// use serde_json::json;
///
/// let decl = AttrDecl::new("z")
/// 	.annotate(Annotation::Field(FieldSpec::new()))
/// 	.default(json!("z"));
/// assert_eq!(decl.name(), "z");
/// ```
#[derive(Debug, Clone)]
pub struct AttrDecl {
	name: String,
	annotations: Vec<Annotation>,
	assignment: Option<FieldSpec>,
	default: Option<Value>,
}

impl AttrDecl {
	/// Declare an attribute with the given name.
	pub fn new(name: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			annotations: Vec::new(),
			assignment: None,
			default: None,
		}
	}

	/// Append one annotation entry; order is significant.
	pub fn annotate(mut self, annotation: Annotation) -> Self {
		self.annotations.push(annotation);
		self
	}

	/// Append several annotation entries at once.
	pub fn annotations(mut self, annotations: Vec<Annotation>) -> Self {
		self.annotations.extend(annotations);
		self
	}

	/// Attach assignment-site field metadata (the classic declaration
	/// path). On options set at both sites, this side wins.
	pub fn assignment(mut self, spec: FieldSpec) -> Self {
		self.assignment = Some(spec);
		self
	}

	/// Attach an assignment-site literal default.
	///
	/// A literal default takes precedence over an annotation-site
	/// factory, matching the assignment-site-wins rule.
	pub fn default(mut self, value: Value) -> Self {
		self.default = Some(value);
		self
	}

	/// The attribute name.
	pub fn name(&self) -> &str {
		&self.name
	}
}

/// Phase-one collector for a class definition.
///
/// # Examples
///
/// ```
/// use annofield::{Annotation, Args, AttrDecl, ClassBuilder, FieldSpec};
/// use serde_json::json;
///
/// let class = ClassBuilder::new("Obj")
/// 	.attr(
/// 		AttrDecl::new("x")
/// 			.annotate(Annotation::Field(FieldSpec::new().with_factory(|| json!(42)))),
/// 	)
/// 	.build()
/// 	.unwrap();
/// let obj = class.new_instance(Args::new()).unwrap();
/// assert_eq!(obj.get("x"), Some(&json!(42)));
/// ```
#[derive(Debug, Default)]
pub struct ClassBuilder {
	name: String,
	attrs: Vec<AttrDecl>,
}

impl ClassBuilder {
	/// Start collecting a class with the given name.
	pub fn new(name: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			attrs: Vec::new(),
		}
	}

	/// Declare the next attribute, in class-body order.
	pub fn attr(mut self, decl: AttrDecl) -> Self {
		self.attrs.push(decl);
		self
	}

	/// Resolve all declarations and emit the finished class.
	///
	/// Runs the annotation resolver per attribute, applies builder
	/// defaults, and checks the assembled fields (`init=false` needs a
	/// default; mandatory positional parameters may not follow
	/// defaulted ones; constructor aliases must be unique). The first
	/// violation fails the whole class.
	pub fn build(self) -> DefineResult<ClassDescriptor> {
		let mut fields: Vec<FieldDescriptor> = Vec::with_capacity(self.attrs.len());
		let mut by_name: HashMap<String, usize> = HashMap::new();
		let mut by_alias: HashMap<String, usize> = HashMap::new();
		let mut seen_positional_default = false;

		for decl in self.attrs {
			let index = fields.len();
			if by_name.contains_key(&decl.name) {
				return Err(DefineError::DuplicateAttribute {
					attribute: decl.name,
				});
			}

			let resolved =
				resolve_annotations(&decl.name, &decl.annotations, decl.assignment.as_ref())?;
			let (spec, converter, validator) = match resolved {
				Some(resolved) => (resolved.spec, resolved.converter, resolved.validator),
				// No Field annotation: the classic path alone governs
				// the attribute, or it is a plain attribute with every
				// option left to the defaults.
				None => (decl.assignment.unwrap_or_default(), None, None),
			};

			let default = match decl.default {
				Some(value) => FieldDefault::Literal(value),
				None => match spec.factory {
					Some(factory) => FieldDefault::Factory(factory),
					None => FieldDefault::None,
				},
			};

			let eq = spec.eq.unwrap_or(CmpSpec::On);
			let order = spec.order.unwrap_or_else(|| eq.clone());
			let init = spec.init.unwrap_or(true);
			let kw_only = spec.kw_only.unwrap_or(false);
			let alias = spec
				.alias
				.unwrap_or_else(|| decl.name.trim_start_matches('_').to_string());

			if !init && !default.is_set() {
				return Err(DefineError::UninitializableField {
					attribute: decl.name,
				});
			}
			if init && !kw_only {
				if default.is_set() {
					seen_positional_default = true;
				} else if seen_positional_default {
					return Err(DefineError::MandatoryAfterDefault {
						attribute: decl.name,
					});
				}
			}

			// Aliases share one keyword namespace; a clobbered entry
			// would leave the earlier field unreachable by keyword.
			if by_alias.contains_key(&alias) {
				return Err(DefineError::DuplicateAlias {
					attribute: decl.name,
					alias,
				});
			}

			by_name.insert(decl.name.clone(), index);
			by_alias.insert(alias.clone(), index);
			fields.push(FieldDescriptor {
				name: decl.name,
				alias,
				index,
				default,
				repr: spec.repr.unwrap_or(ReprSpec::Include),
				eq,
				order,
				hash: spec.hash.unwrap_or(HashSpec::FollowEq),
				init,
				kw_only,
				metadata: spec.metadata.unwrap_or_default(),
				converter,
				validator,
				on_setattr: spec.on_setattr,
			});
		}

		tracing::debug!(class = %self.name, fields = fields.len(), "class descriptor built");
		Ok(ClassDescriptor {
			inner: Arc::new(ClassInner {
				name: self.name,
				fields,
				by_name,
				by_alias,
			}),
		})
	}
}
