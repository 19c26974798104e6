//! Error types for class definition and instance construction

use thiserror::Error;

/// Error raised while a class is being defined.
///
/// Every variant is fatal to the class definition as a whole: the builder
/// never emits a partial descriptor, and nothing about the failed class
/// is observable afterwards.
#[derive(Debug, Error)]
pub enum DefineError {
	#[error("attribute '{attribute}': only one Field annotation may be specified")]
	MultipleFieldAnnotations { attribute: String },
	#[error("attribute '{attribute}': Converter annotations must be used along with Field")]
	OrphanConverter { attribute: String },
	#[error("attribute '{attribute}': Validator annotations must be used along with Field")]
	OrphanValidator { attribute: String },
	#[error("attribute '{attribute}': init=false requires a default value or factory")]
	UninitializableField { attribute: String },
	#[error("attribute '{attribute}' is declared more than once")]
	DuplicateAttribute { attribute: String },
	#[error("attribute '{attribute}': alias '{alias}' is already used by another attribute")]
	DuplicateAlias { attribute: String, alias: String },
	#[error(
		"attribute '{attribute}': no mandatory attributes allowed after an attribute with a default"
	)]
	MandatoryAfterDefault { attribute: String },
}

pub type DefineResult<T> = Result<T, DefineError>;

/// Error raised while constructing or mutating an instance.
///
/// `Conversion` and `Validation` carry messages produced by user-supplied
/// converter and validator callables; they propagate unchanged.
#[derive(Debug, Error)]
pub enum FieldError {
	#[error("conversion failed: {0}")]
	Conversion(String),
	#[error("{0}")]
	Validation(String),
	#[error("unexpected keyword argument '{0}'")]
	UnexpectedKeyword(String),
	#[error("missing required argument '{0}'")]
	MissingArgument(String),
	#[error("got multiple values for argument '{0}'")]
	MultipleValues(String),
	#[error("too many positional arguments: expected at most {expected}, got {given}")]
	TooManyPositional { expected: usize, given: usize },
	#[error("no field named '{0}'")]
	NoSuchField(String),
}

pub type FieldResult<T> = Result<T, FieldError>;
