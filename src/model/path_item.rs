use crate::error::{ReferenceError, ResolveError, StructuralError};
use crate::model::operation::check_unique_parameters;
use crate::model::{
    Component, Components, Extensions, ObjectOrReference, ObjectShape, Operation, Parameter,
    Server,
};
use crate::validate::{Context, Validate, validate_items};
use http::Method;
use serde::Deserialize;
use std::collections::BTreeMap;

/// The operations available on a single path.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct PathItem {
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub get: Option<Operation>,
    #[serde(default)]
    pub put: Option<Operation>,
    #[serde(default)]
    pub post: Option<Operation>,
    #[serde(default)]
    pub delete: Option<Operation>,
    #[serde(default)]
    pub options: Option<Operation>,
    #[serde(default)]
    pub head: Option<Operation>,
    #[serde(default)]
    pub patch: Option<Operation>,
    #[serde(default)]
    pub trace: Option<Operation>,
    #[serde(default)]
    pub servers: Vec<Server>,
    #[serde(default)]
    pub parameters: Vec<ObjectOrReference<Parameter>>,
    #[serde(flatten)]
    pub extensions: Extensions,
}

impl PathItem {
    /// Looks up the operation for a method token such as `"get"` or `"GET"`.
    ///
    /// Returns `Ok(None)` for a known verb without an operation and an error
    /// for a token that is not one of the eight verbs a path item can hold.
    ///
    /// ```
    /// use oasgraph::model::{Operation, PathItem};
    ///
    /// let item = PathItem {
    ///     get: Some(Operation::default()),
    ///     ..Default::default()
    /// };
    /// assert!(item.get_operation("get").unwrap().is_some());
    /// assert!(item.get_operation("POST").unwrap().is_none());
    /// assert!(item.get_operation("PURGE").is_err());
    /// ```
    pub fn get_operation(&self, method: &str) -> Result<Option<&Operation>, ResolveError> {
        self.operation(&Self::parse_method(method)?)
    }

    /// Parses a method token case-insensitively.
    pub fn parse_method(token: &str) -> Result<Method, ResolveError> {
        Method::from_bytes(token.to_ascii_uppercase().as_bytes())
            .map_err(|_| ResolveError::unsupported_method(token))
    }

    pub fn operation(&self, method: &Method) -> Result<Option<&Operation>, ResolveError> {
        let slot = match *method {
            Method::GET => &self.get,
            Method::PUT => &self.put,
            Method::POST => &self.post,
            Method::DELETE => &self.delete,
            Method::OPTIONS => &self.options,
            Method::HEAD => &self.head,
            Method::PATCH => &self.patch,
            Method::TRACE => &self.trace,
            _ => return Err(ResolveError::unsupported_method(method.as_str())),
        };
        Ok(slot.as_ref())
    }

    /// Every declared operation with its method, in a fixed verb order.
    pub fn operations(&self) -> impl Iterator<Item = (Method, &Operation)> {
        [
            (Method::GET, &self.get),
            (Method::PUT, &self.put),
            (Method::POST, &self.post),
            (Method::DELETE, &self.delete),
            (Method::OPTIONS, &self.options),
            (Method::HEAD, &self.head),
            (Method::PATCH, &self.patch),
            (Method::TRACE, &self.trace),
        ]
        .into_iter()
        .filter_map(|(method, operation)| operation.as_ref().map(|operation| (method, operation)))
    }

    /// The methods with an operation, e.g. for an `Allow` header.
    pub fn allowed_methods(&self) -> Vec<Method> {
        self.operations().map(|(method, _)| method).collect()
    }

    /// Path level parameters merged with the operation's own.
    ///
    /// An operation parameter replaces a path level parameter with the same name and location.
    pub fn effective_parameters<'a>(
        &'a self,
        operation: &'a Operation,
        components: Option<&'a Components>,
    ) -> Result<Vec<&'a Parameter>, ReferenceError> {
        let mut merged: Vec<&Parameter> = Vec::new();
        for parameter in &self.parameters {
            merged.push(parameter.resolve(components)?);
        }
        for parameter in &operation.parameters {
            let parameter = parameter.resolve(components)?;
            match merged.iter().position(|existing| {
                existing.name == parameter.name && existing.location == parameter.location
            }) {
                Some(idx) => merged[idx] = parameter,
                None => merged.push(parameter),
            }
        }
        Ok(merged)
    }
}

impl Validate for PathItem {
    fn validate(&self) -> Result<(), StructuralError> {
        validate_items("server", &self.servers)?;
        validate_items("parameter", &self.parameters)?;
        check_unique_parameters(&self.parameters)?;
        self.get.validate().context("Get")?;
        self.put.validate().context("Put")?;
        self.post.validate().context("Post")?;
        self.delete.validate().context("Delete")?;
        self.options.validate().context("Options")?;
        self.head.validate().context("Head")?;
        self.patch.validate().context("Patch")?;
        self.trace.validate().context("Trace")
    }
}

impl ObjectShape for PathItem {
    const KIND: &'static str = "pathItem";
    const OBJECT_FIELDS: &'static [&'static str] = &[
        "get",
        "put",
        "post",
        "delete",
        "options",
        "head",
        "patch",
        "trace",
        "parameters",
        "servers",
    ];
}

impl Component for PathItem {
    const SECTION: &'static str = "pathItems";

    fn registry(components: &Components) -> &BTreeMap<String, ObjectOrReference<Self>> {
        &components.path_items
    }
}
