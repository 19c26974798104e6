//! Validator pipeline tests
//!
//! Validators run after conversion, in declaration order, against the
//! (instance, field, value) triple; the first rejection propagates and
//! later checks never run.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use annofield::{
	Annotation, Args, AttrDecl, ClassBuilder, ClassDescriptor, ConverterSpec, FieldError,
	FieldSpec, ValidatorSpec,
};
use rstest::rstest;
use serde_json::json;

fn min_check(bound: i64) -> ValidatorSpec {
	ValidatorSpec::new(move |_, field, value| {
		if value.as_i64().unwrap_or(i64::MIN) > bound {
			Ok(())
		} else {
			Err(FieldError::Validation(format!(
				"'{}' must be > {bound}: {value}",
				field.name()
			)))
		}
	})
}

fn max_check(bound: i64) -> ValidatorSpec {
	ValidatorSpec::new(move |_, field, value| {
		if value.as_i64().unwrap_or(i64::MAX) < bound {
			Ok(())
		} else {
			Err(FieldError::Validation(format!(
				"'{}' must be < {bound}: {value}",
				field.name()
			)))
		}
	})
}

fn checked_class() -> ClassDescriptor {
	ClassBuilder::new("Checked")
		.attr(
			AttrDecl::new("x")
				.annotate(Annotation::Field(FieldSpec::new()))
				.annotate(Annotation::Validator(ValidatorSpec::check(|value| {
					if value.as_i64() == Some(41) {
						Err("the answer minus one is forbidden".to_string())
					} else {
						Ok(())
					}
				})))
				.annotate(Annotation::Validator(min_check(-1)))
				.annotate(Annotation::Validator(max_check(100))),
		)
		.build()
		.expect("Checked is well-formed")
}

#[rstest]
fn accepted_values_construct() {
	let obj = checked_class()
		.new_instance(Args::new().kw("x", json!(0)))
		.unwrap();
	assert_eq!(obj.get("x"), Some(&json!(0)));
}

#[rstest]
fn custom_rejection_message_propagates() {
	let err = checked_class()
		.new_instance(Args::new().kw("x", json!(41)))
		.unwrap_err();
	assert!(err.to_string().contains("forbidden"));
}

#[rstest]
#[case(json!(-2), &["x", "-2", "> -1"])]
#[case(json!(102), &["x", "102", "< 100"])]
fn bound_rejections_name_field_value_and_bound(
	#[case] value: serde_json::Value,
	#[case] fragments: &[&str],
) {
	let err = checked_class()
		.new_instance(Args::new().kw("x", value))
		.unwrap_err();
	let msg = err.to_string();
	for fragment in fragments {
		assert!(msg.contains(fragment), "missing {fragment:?} in {msg:?}");
	}
}

#[rstest]
fn first_rejection_short_circuits_later_checks() {
	let ran_after = Arc::new(AtomicUsize::new(0));
	let counter = Arc::clone(&ran_after);
	let class = ClassBuilder::new("ShortCircuit")
		.attr(
			AttrDecl::new("x")
				.annotate(Annotation::Field(FieldSpec::new()))
				.annotate(Annotation::Validator(ValidatorSpec::check(|_| {
					Err("always rejects".to_string())
				})))
				.annotate(Annotation::Validator(ValidatorSpec::new(
					move |_, _, _| {
						counter.fetch_add(1, Ordering::SeqCst);
						Ok(())
					},
				))),
		)
		.build()
		.unwrap();

	let err = class.new_instance(Args::new().kw("x", json!(1))).unwrap_err();
	assert!(err.to_string().contains("always rejects"));
	assert_eq!(ran_after.load(Ordering::SeqCst), 0);
}

#[rstest]
fn validators_run_after_conversion() {
	// The converter doubles before the max check sees the value, so 60
	// is rejected as 120.
	let class = ClassBuilder::new("Doubled")
		.attr(
			AttrDecl::new("x")
				.annotate(Annotation::Field(FieldSpec::new()))
				.annotate(Annotation::Converter(ConverterSpec::map(|v| {
					json!(v.as_i64().unwrap_or(0) * 2)
				})))
				.annotate(Annotation::Validator(max_check(100))),
		)
		.build()
		.unwrap();

	assert!(class.new_instance(Args::new().kw("x", json!(40))).is_ok());
	let err = class
		.new_instance(Args::new().kw("x", json!(60)))
		.unwrap_err();
	assert!(err.to_string().contains("120"));
}

#[rstest]
fn validators_see_earlier_fields_on_the_instance() {
	let class = ClassBuilder::new("Pair")
		.attr(AttrDecl::new("low").annotate(Annotation::Field(FieldSpec::new())))
		.attr(
			AttrDecl::new("high")
				.annotate(Annotation::Field(FieldSpec::new()))
				.annotate(Annotation::Validator(ValidatorSpec::new(
					|instance, field, value| {
						let low = instance
							.get("low")
							.and_then(|v| v.as_i64())
							.unwrap_or(i64::MIN);
						if value.as_i64().unwrap_or(i64::MAX) >= low {
							Ok(())
						} else {
							Err(FieldError::Validation(format!(
								"'{}' must not be below 'low'",
								field.name()
							)))
						}
					},
				))),
		)
		.build()
		.unwrap();

	assert!(
		class
			.new_instance(Args::new().kw("low", json!(1)).kw("high", json!(2)))
			.is_ok()
	);
	let err = class
		.new_instance(Args::new().kw("low", json!(5)).kw("high", json!(2)))
		.unwrap_err();
	assert!(err.to_string().contains("must not be below"));
}

#[rstest]
fn assignment_reruns_the_pipeline_by_default() {
	let mut obj = checked_class()
		.new_instance(Args::new().kw("x", json!(0)))
		.unwrap();
	assert!(obj.set("x", json!(50)).is_ok());
	assert_eq!(obj.get("x"), Some(&json!(50)));

	let err = obj.set("x", json!(102)).unwrap_err();
	assert!(err.to_string().contains("< 100"));
	// Rejected assignment leaves the previous value in place.
	assert_eq!(obj.get("x"), Some(&json!(50)));
}
