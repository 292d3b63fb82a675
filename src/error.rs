use http::StatusCode;
use std::borrow::Cow;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

/// A broken structural invariant somewhere in the document graph.
///
/// Composite entities wrap the error of a failing child in
/// [`StructuralError::Nested`], so the rendered message reads from the root
/// down to the offending field, e.g. `invalid Info: title is required`.
#[derive(Debug, Clone, PartialEq)]
pub enum StructuralError {
    /// A required field is absent or empty.
    FieldRequired(Cow<'static, str>),

    /// Both sides of a mutually exclusive pair are populated.
    MutuallyExclusive(Cow<'static, str>, Cow<'static, str>),

    /// A field holds a value outside of its allowed set.
    UnexpectedValue {
        field: Cow<'static, str>,
        found: String,
        allowed: &'static [&'static str],
    },

    /// A collection that must hold at least one entry is empty.
    EmptyCollection(Cow<'static, str>),

    /// A field is present but breaks a rule about its content.
    InvalidField(Cow<'static, str>, String),

    /// The `openapi` field names a version this crate does not model.
    UnsupportedVersion(String),

    /// The same operationId is declared by more than one operation.
    DuplicateOperationId(String),

    /// A child entity failed validation.
    Nested {
        context: String,
        source: Box<StructuralError>,
    },
}

impl StructuralError {
    pub(crate) fn field_required(field: impl Into<Cow<'static, str>>) -> Self {
        Self::FieldRequired(field.into())
    }

    pub(crate) fn mutually_exclusive(
        first: impl Into<Cow<'static, str>>,
        second: impl Into<Cow<'static, str>>,
    ) -> Self {
        Self::MutuallyExclusive(first.into(), second.into())
    }

    pub(crate) fn unexpected_value(
        field: impl Into<Cow<'static, str>>,
        found: impl ToString,
        allowed: &'static [&'static str],
    ) -> Self {
        Self::UnexpectedValue {
            field: field.into(),
            found: found.to_string(),
            allowed,
        }
    }

    pub(crate) fn empty_collection(field: impl Into<Cow<'static, str>>) -> Self {
        Self::EmptyCollection(field.into())
    }

    pub(crate) fn invalid_field(field: impl Into<Cow<'static, str>>, message: impl ToString) -> Self {
        Self::InvalidField(field.into(), message.to_string())
    }

    /// Wraps this error with the name of the field that produced it.
    pub fn within(self, context: impl Into<String>) -> Self {
        Self::Nested {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Returns the innermost error, skipping every [`StructuralError::Nested`] layer.
    pub fn root_cause(&self) -> &StructuralError {
        let mut current = self;
        while let StructuralError::Nested { source, .. } = current {
            current = source;
        }
        current
    }
}

fn write_allowed(f: &mut Formatter<'_>, allowed: &[&str]) -> std::fmt::Result {
    for (idx, value) in allowed.iter().enumerate() {
        match idx {
            0 => write!(f, "\"{}\"", value)?,
            _ if idx + 1 == allowed.len() => write!(f, " or \"{}\"", value)?,
            _ => write!(f, ", \"{}\"", value)?,
        }
    }
    Ok(())
}

impl Display for StructuralError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            StructuralError::FieldRequired(field) => write!(f, "{} is required", field),
            StructuralError::MutuallyExclusive(first, second) => {
                write!(f, "{} and {} are mutually exclusive", first, second)
            }
            StructuralError::UnexpectedValue {
                field,
                found,
                allowed,
            } => {
                write!(f, "possible values of {} are ", field)?;
                write_allowed(f, allowed)?;
                write!(f, " but \"{}\" was found", found)
            }
            StructuralError::EmptyCollection(field) => {
                write!(f, "non empty {} is required", field)
            }
            StructuralError::InvalidField(field, msg) => write!(f, "{}: {}", field, msg),
            StructuralError::UnsupportedVersion(version) => {
                write!(f, "unsupported openapi version \"{}\"", version)
            }
            StructuralError::DuplicateOperationId(id) => {
                write!(f, "operationId \"{}\" is not unique", id)
            }
            StructuralError::Nested { context, source } => {
                write!(f, "invalid {}: {}", context, source)
            }
        }
    }
}

impl std::error::Error for StructuralError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StructuralError::Nested { source, .. } => Some(source.as_ref()),
            _ => None,
        }
    }
}

/// Failure to follow a `$ref` to the entity it points at.
#[derive(Debug, Clone, PartialEq)]
pub enum ReferenceError {
    /// The `$ref` string is empty.
    Empty,

    /// The reference points outside of the current document.
    External(String),

    /// The reference does not have the `#/components/<section>/<name>` shape
    /// expected for the entity kind.
    Malformed {
        reference: String,
        expected_section: &'static str,
    },

    /// Nothing is registered under the referenced name.
    Unresolved(String),

    /// Following the reference chain revisits a reference.
    Cyclic(String),
}

impl ReferenceError {
    pub(crate) fn external(reference: impl Into<String>) -> Self {
        Self::External(reference.into())
    }

    pub(crate) fn unresolved(reference: impl Into<String>) -> Self {
        Self::Unresolved(reference.into())
    }

    pub(crate) fn cyclic(reference: impl Into<String>) -> Self {
        Self::Cyclic(reference.into())
    }
}

impl Display for ReferenceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ReferenceError::Empty => write!(f, "ref is required"),
            ReferenceError::External(reference) => {
                write!(f, "external references are not supported: {}", reference)
            }
            ReferenceError::Malformed {
                reference,
                expected_section,
            } => write!(
                f,
                "reference {} does not point into #/components/{}",
                reference, expected_section
            ),
            ReferenceError::Unresolved(reference) => {
                write!(f, "reference {} could not be resolved", reference)
            }
            ReferenceError::Cyclic(reference) => {
                write!(f, "reference {} is cyclic", reference)
            }
        }
    }
}

impl std::error::Error for ReferenceError {}

/// Failure to map a request path or method onto the document.
#[derive(Debug, Clone, PartialEq)]
pub enum ResolveError {
    /// No path template matches the request path.
    UndefinedPath(String),

    /// The method token is not one of the verbs a path item can hold.
    UnsupportedMethod(String),
}

impl ResolveError {
    pub(crate) fn undefined_path(path: impl Into<String>) -> Self {
        Self::UndefinedPath(path.into())
    }

    pub(crate) fn unsupported_method(method: impl Into<String>) -> Self {
        Self::UnsupportedMethod(method.into())
    }
}

impl Display for ResolveError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ResolveError::UndefinedPath(path) => write!(f, "undefined path: \"{}\"", path),
            ResolveError::UnsupportedMethod(method) => {
                write!(f, "unsupported method \"{}\"", method)
            }
        }
    }
}

impl std::error::Error for ResolveError {}

#[derive(Debug, Ord, PartialOrd, Eq, PartialEq, Clone, Copy)]
pub enum RequestValidationErrorKind {
    UndefinedPath,
    MethodNotAllowed,
    InvalidRequest,
    InvalidSpec,
}

/// Why an inbound request is not permitted by the document.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestValidationError {
    UndefinedPath(String),

    /// The method token could not be used to look up an operation.
    Operation { path: String, source: ResolveError },

    /// The method is a known verb but the path declares no operation for it.
    MethodNotAllowed { method: String, path: String },

    /// A `$ref` met while resolving the route could not be followed.
    Reference { path: String, source: ReferenceError },

    RequiredParameterMissing { name: String, location: String },

    /// A custom [`crate::validator::RequestCheck`] refused the request.
    Rejected { check: &'static str, message: String },
}

impl RequestValidationError {
    pub fn rejected(check: &'static str, message: impl ToString) -> Self {
        Self::Rejected {
            check,
            message: message.to_string(),
        }
    }

    pub fn kind(&self) -> RequestValidationErrorKind {
        match self {
            RequestValidationError::UndefinedPath(_) => RequestValidationErrorKind::UndefinedPath,
            RequestValidationError::Operation { .. }
            | RequestValidationError::MethodNotAllowed { .. } => {
                RequestValidationErrorKind::MethodNotAllowed
            }
            RequestValidationError::RequiredParameterMissing { .. }
            | RequestValidationError::Rejected { .. } => RequestValidationErrorKind::InvalidRequest,
            RequestValidationError::Reference { .. } => RequestValidationErrorKind::InvalidSpec,
        }
    }

    /// The HTTP status a gateway would answer with when enforcing this failure.
    pub fn status_code(&self) -> StatusCode {
        match self.kind() {
            RequestValidationErrorKind::UndefinedPath => StatusCode::NOT_FOUND,
            RequestValidationErrorKind::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            RequestValidationErrorKind::InvalidRequest => StatusCode::BAD_REQUEST,
            RequestValidationErrorKind::InvalidSpec => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl Display for RequestValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            RequestValidationError::UndefinedPath(path) => {
                write!(f, "undefined path \"{}\"", path)
            }
            RequestValidationError::Operation { path, source } => {
                write!(f, "get operation for path \"{}\": {}", path, source)
            }
            RequestValidationError::MethodNotAllowed { method, path } => {
                write!(f, "unsupported method \"{}\" for path \"{}\"", method, path)
            }
            RequestValidationError::Reference { path, source } => {
                write!(f, "resolve path item for \"{}\": {}", path, source)
            }
            RequestValidationError::RequiredParameterMissing { name, location } => {
                write!(f, "missing the required {} parameter \"{}\"", location, name)
            }
            RequestValidationError::Rejected { check, message } => {
                write!(f, "rejected by {}: {}", check, message)
            }
        }
    }
}

impl std::error::Error for RequestValidationError {}

/// Failure to read or parse a document.
#[derive(Debug)]
pub enum LoadError {
    Io(PathBuf, std::io::Error),
    Json(serde_json::Error),
    Yaml(serde_yaml::Error),
    UnsupportedExtension(String),
}

impl Display for LoadError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            LoadError::Io(path, err) => write!(f, "read {}: {}", path.display(), err),
            LoadError::Json(err) => write!(f, "decode json document: {}", err),
            LoadError::Yaml(err) => write!(f, "decode yaml document: {}", err),
            LoadError::UnsupportedExtension(ext) => {
                write!(f, "unsupported file extension \"{}\"", ext)
            }
        }
    }
}

impl std::error::Error for LoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LoadError::Io(_, err) => Some(err),
            LoadError::Json(err) => Some(err),
            LoadError::Yaml(err) => Some(err),
            LoadError::UnsupportedExtension(_) => None,
        }
    }
}

#[cfg(test)]
mod test {
    use crate::error::{RequestValidationError, ResolveError, StructuralError};
    use http::StatusCode;

    #[test]
    fn test_nested_error_message_chains_context() {
        let err = StructuralError::field_required("title").within("Info");
        assert_eq!(err.to_string(), "invalid Info: title is required");
        assert_eq!(err.root_cause(), &StructuralError::field_required("title"));
    }

    #[test]
    fn test_unexpected_value_names_allowed_set() {
        let err = StructuralError::unexpected_value("in", "body", &["query", "header", "path"]);
        assert_eq!(
            err.to_string(),
            "possible values of in are \"query\", \"header\" or \"path\" but \"body\" was found"
        );
    }

    #[test]
    fn test_status_code_mapping() {
        let undefined = RequestValidationError::UndefinedPath("/nope".to_string());
        assert_eq!(undefined.status_code(), StatusCode::NOT_FOUND);

        let not_allowed = RequestValidationError::MethodNotAllowed {
            method: "DELETE".to_string(),
            path: "/pets".to_string(),
        };
        assert_eq!(not_allowed.status_code(), StatusCode::METHOD_NOT_ALLOWED);

        let unknown_verb = RequestValidationError::Operation {
            path: "/pets".to_string(),
            source: ResolveError::unsupported_method("PURGE"),
        };
        assert_eq!(unknown_verb.status_code(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(
            unknown_verb.to_string(),
            "get operation for path \"/pets\": unsupported method \"PURGE\""
        );
    }
}
