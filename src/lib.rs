pub mod cache;
pub mod error;
pub mod loader;
pub mod model;
pub mod types;
pub mod validate;
pub mod validator;

pub use crate::error::{
    LoadError, ReferenceError, RequestValidationError, RequestValidationErrorKind, ResolveError,
    StructuralError,
};
pub use crate::loader::DocumentFormat;
pub use crate::model::OpenApi;
pub use crate::validate::Validate;
pub use crate::validator::{
    OpenApiRequestValidator, RequestCheck, RequiredParameterCheck, ResolvedOperation,
};
pub use crate::validator::builder::{OpenApiRequestValidatorBuilder, ValidatorBuilderError};

const REF_FIELD: &str = "$ref";
const PATH_SEPARATOR: &str = "/";
const TILDE: &str = "~";
const ENCODED_SLASH: &str = "~1";
const ENCODED_TILDE: &str = "~0";
