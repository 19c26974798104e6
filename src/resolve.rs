//! Annotation resolution
//!
//! One attribute at a time: partition the compound annotation's entries
//! by kind, validate the partition, merge the annotation-site field
//! metadata with any assignment-site metadata, and fold the ordered
//! converter and validator entries into single composed callables. The
//! resolver holds no state between attributes and aborts the whole class
//! definition on the first malformed partition.

use std::sync::Arc;

use crate::annotation::{Annotation, ConvertFn, ConverterSpec, ValidateFn, ValidatorSpec};
use crate::error::{DefineError, DefineResult};
use crate::field::FieldSpec;

/// The resolver's output for one attribute that carries field semantics.
pub struct ResolvedField {
	/// Effective field options: annotation site merged with assignment
	/// site, assignment site winning on conflicting explicit values.
	pub spec: FieldSpec,
	/// All converter entries folded left to right; `None` when the
	/// attribute declared no converters.
	pub converter: Option<ConvertFn>,
	/// All validator entries folded in declaration order; `None` when
	/// the attribute declared no validators.
	pub validator: Option<ValidateFn>,
}

impl std::fmt::Debug for ResolvedField {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("ResolvedField")
			.field("spec", &self.spec)
			.field("converter", &self.converter.as_ref().map(|_| "<composed>"))
			.field("validator", &self.validator.as_ref().map(|_| "<composed>"))
			.finish()
	}
}

/// Resolve one attribute's compound annotation.
///
/// Returns `Ok(None)` when the annotation carries no [`Annotation::Field`]
/// entry at all: the attribute has no field semantics under this
/// mechanism and the class-builder falls through to whatever governs
/// plain attributes.
///
/// `assignment_site` is metadata the builder collected for the same
/// attribute through the classic declaration path; on options set
/// explicitly at both sites, the assignment site wins.
///
/// # Examples
///
/// ```
/// use annofield::{resolve_annotations, Annotation, ConverterSpec, FieldSpec};
/// use serde_json::json;
///
/// let annotations = vec![
/// 	Annotation::Field(FieldSpec::new().with_kw_only(true)),
/// 	Annotation::Converter(ConverterSpec::map(|v| json!(-v.as_i64().unwrap_or(0)))),
/// ];
/// let resolved = resolve_annotations("y", &annotations, None)
/// 	.expect("well-formed annotation")
/// 	.expect("carries a Field entry");
/// assert_eq!(resolved.spec.kw_only, Some(true));
/// assert!(resolved.converter.is_some());
/// ```
pub fn resolve_annotations(
	attribute: &str,
	annotations: &[Annotation],
	assignment_site: Option<&FieldSpec>,
) -> DefineResult<Option<ResolvedField>> {
	let mut field: Option<FieldSpec> = None;
	let mut converters: Vec<ConverterSpec> = Vec::new();
	let mut validators: Vec<ValidatorSpec> = Vec::new();

	for entry in annotations {
		match entry {
			Annotation::Field(spec) => {
				if field.is_some() {
					return Err(DefineError::MultipleFieldAnnotations {
						attribute: attribute.to_string(),
					});
				}
				field = Some(spec.clone());
			}
			Annotation::Converter(spec) => converters.push(spec.clone()),
			Annotation::Validator(spec) => validators.push(spec.clone()),
			Annotation::Other(_) => {}
		}
	}

	let Some(spec) = field else {
		if !converters.is_empty() {
			return Err(DefineError::OrphanConverter {
				attribute: attribute.to_string(),
			});
		}
		if !validators.is_empty() {
			return Err(DefineError::OrphanValidator {
				attribute: attribute.to_string(),
			});
		}
		return Ok(None);
	};

	let spec = match assignment_site {
		Some(classic) => spec.merged_with(classic),
		None => spec,
	};

	tracing::trace!(
		attribute,
		converters = converters.len(),
		validators = validators.len(),
		"resolved field annotations"
	);

	Ok(Some(ResolvedField {
		spec,
		converter: compose_converters(&converters),
		validator: compose_validators(&validators),
	}))
}

/// Fold converters into one callable applying them left to right.
///
/// Zero converters means no conversion at all, not an empty pipeline.
pub(crate) fn compose_converters(converters: &[ConverterSpec]) -> Option<ConvertFn> {
	if converters.is_empty() {
		return None;
	}
	let funcs: Vec<ConvertFn> = converters.iter().map(ConverterSpec::func).collect();
	Some(Arc::new(move |mut value| {
		for func in &funcs {
			value = func(value)?;
		}
		Ok(value)
	}))
}

/// Fold validators into one callable running every check in declaration
/// order; the first rejection propagates and later checks never run.
pub(crate) fn compose_validators(validators: &[ValidatorSpec]) -> Option<ValidateFn> {
	if validators.is_empty() {
		return None;
	}
	let funcs: Vec<ValidateFn> = validators.iter().map(ValidatorSpec::func).collect();
	Some(Arc::new(move |instance, field, value| {
		for func in &funcs {
			func(instance, field, value)?;
		}
		Ok(())
	}))
}
