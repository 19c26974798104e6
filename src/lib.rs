//! Annotation-driven field definition
//!
//! This crate builds runtime classes from attributes whose compound
//! annotations carry field metadata, converters, and validators:
//! - [`FieldSpec`] is the annotation-site bag of field options (default
//!   factory, repr/eq/order/hash participation, init behavior,
//!   keyword-only flag, setattr hooks, aliasing)
//! - [`ConverterSpec`] and [`ValidatorSpec`] wrap ordered value
//!   transformations and checks attached next to a `FieldSpec`
//! - [`resolve_annotations`] partitions an attribute's annotation
//!   entries, validates the partition, merges annotation-site and
//!   assignment-site metadata, and folds converters and validators into
//!   single composed callables
//! - [`ClassBuilder`] collects attribute declarations and emits an
//!   immutable [`ClassDescriptor`] with a synthesized constructor
//!
//! Malformed annotations (a second `Field` entry, or a converter or
//! validator with no `Field` sibling) fail the class definition as a
//! whole with a [`DefineError`] naming the attribute; nothing of the
//! failed class is observable afterwards.
//!
//! # Examples
//!
//! ```
//! use annofield::{Annotation, Args, AttrDecl, ClassBuilder, ConverterSpec, FieldSpec};
//! use serde_json::json;
//!
//! let class = ClassBuilder::new("Obj")
//! 	.attr(
//! 		AttrDecl::new("x")
//! 			.annotate(Annotation::Field(FieldSpec::new().with_factory(|| json!(42)))),
//! 	)
//! 	.attr(
//! 		AttrDecl::new("y")
//! 			.annotate(Annotation::Field(FieldSpec::new().with_kw_only(true)))
//! 			.annotate(Annotation::Converter(ConverterSpec::map(|v| {
//! 				json!(-v.as_i64().unwrap_or(0))
//! 			}))),
//! 	)
//! 	.build()
//! 	.unwrap();
//!
//! let obj = class.new_instance(Args::new().kw("y", json!(5))).unwrap();
//! assert_eq!(obj.get("x"), Some(&json!(42)));
//! assert_eq!(obj.get("y"), Some(&json!(-5)));
//! ```

pub mod annotation;
pub mod builder;
pub mod descriptor;
pub mod error;
pub mod field;
pub mod instance;
pub mod resolve;

pub use annotation::{
	Annotation, ConvertFn, ConverterSpec, OtherAnnotation, ValidateFn, ValidatorSpec,
};
pub use builder::{AttrDecl, ClassBuilder};
pub use descriptor::{ClassDescriptor, FieldDefault, FieldDescriptor};
pub use error::{DefineError, DefineResult, FieldError, FieldResult};
pub use field::{
	CmpSpec, Factory, FieldSpec, HashSpec, KeyFn, ReprFormatter, ReprSpec, SetAttrHook,
	SetAttrSpec,
};
pub use instance::{Args, Instance};
pub use resolve::{ResolvedField, resolve_annotations};
