//! Property-based tests for annotation resolution
//!
//! Verifies, over arbitrary inputs:
//! 1. Converter chains compose left to right: the effective
//!    transformation equals folding the declared callables in order.
//! 2. The assignment site wins over the annotation site on conflicting
//!    explicit metadata (the documented mechanism-interop contract).
//! 3. Keyword binding is by alias, never by attribute name, for any
//!    alias distinct from the name.

use annofield::{
	Annotation, Args, AttrDecl, ClassBuilder, ConverterSpec, FieldError, FieldSpec,
};
use proptest::prelude::*;
use serde_json::json;

#[derive(Debug, Clone, Copy)]
enum Op {
	Add(i64),
	Mul(i64),
	Neg,
}

impl Op {
	fn apply(self, value: i64) -> i64 {
		match self {
			Self::Add(n) => value + n,
			Self::Mul(n) => value * n,
			Self::Neg => -value,
		}
	}

	fn converter(self) -> ConverterSpec {
		ConverterSpec::map(move |v| json!(self.apply(v.as_i64().unwrap_or(0))))
	}
}

fn op_strategy() -> impl Strategy<Value = Op> {
	prop_oneof![
		(-5i64..=5).prop_map(Op::Add),
		(-4i64..=4).prop_map(Op::Mul),
		Just(Op::Neg),
	]
}

proptest! {
	#![proptest_config(ProptestConfig::with_cases(100))]

	/// Property: declared order is application order, for chains of any
	/// length (including the empty chain, which is the identity).
	#[test]
	fn converter_chains_fold_left_to_right(
		ops in proptest::collection::vec(op_strategy(), 0..6),
		input in -1000i64..1000,
	) {
		let mut decl = AttrDecl::new("x").annotate(Annotation::Field(FieldSpec::new()));
		for op in &ops {
			decl = decl.annotate(Annotation::Converter(op.converter()));
		}
		let class = ClassBuilder::new("Chained").attr(decl).build().unwrap();
		let obj = class.new_instance(Args::new().kw("x", json!(input))).unwrap();

		let expected = ops.iter().fold(input, |acc, op| op.apply(acc));
		prop_assert_eq!(obj.get("x"), Some(&json!(expected)));
	}

	/// Property: an assignment-site literal default differing from the
	/// annotation-site factory is the one honored.
	#[test]
	fn assignment_site_default_beats_annotation_factory(
		factory_value in any::<i64>(),
		literal_value in any::<i64>(),
	) {
		let class = ClassBuilder::new("Defaulted")
			.attr(
				AttrDecl::new("x")
					.annotate(Annotation::Field(
						FieldSpec::new().with_factory(move || json!(factory_value)),
					))
					.default(json!(literal_value)),
			)
			.build()
			.unwrap();
		let obj = class.new_instance(Args::new()).unwrap();
		prop_assert_eq!(obj.get("x"), Some(&json!(literal_value)));
	}

	/// Property: conflicting explicit options resolve to the assignment
	/// site, while options set at only one site always survive.
	#[test]
	fn assignment_site_wins_on_conflicting_options(
		annotation_kw in any::<bool>(),
		assignment_kw in any::<bool>(),
		annotation_repr in any::<bool>(),
	) {
		let class = ClassBuilder::new("Merged")
			.attr(
				AttrDecl::new("x")
					.annotate(Annotation::Field(
						FieldSpec::new()
							.with_kw_only(annotation_kw)
							.with_repr(annotation_repr),
					))
					.assignment(FieldSpec::new().with_kw_only(assignment_kw))
					.default(json!(0)),
			)
			.build()
			.unwrap();
		let field = class.field("x").unwrap();
		prop_assert_eq!(field.kw_only(), assignment_kw);
		// repr was set only at the annotation site, so it survives.
		let rendered = field.format_value(&json!(0)).is_some();
		prop_assert_eq!(rendered, annotation_repr);
	}

	/// Property: binding is by alias; the attribute name itself is not
	/// a constructor parameter once an alias exists.
	#[test]
	fn keyword_binding_uses_the_alias(
		suffix in "[a-z]{1,8}",
		value in any::<i64>(),
	) {
		let name = "attr_name";
		let alias = format!("param_{suffix}");
		let class = ClassBuilder::new("Aliased")
			.attr(
				AttrDecl::new(name)
					.annotate(Annotation::Field(FieldSpec::new().with_alias(alias.clone()))),
			)
			.build()
			.unwrap();

		let obj = class
			.new_instance(Args::new().kw(alias, json!(value)))
			.unwrap();
		prop_assert_eq!(obj.get(name), Some(&json!(value)));

		let err = class
			.new_instance(Args::new().kw(name, json!(value)))
			.unwrap_err();
		prop_assert!(matches!(err, FieldError::UnexpectedKeyword(_)));
	}
}
