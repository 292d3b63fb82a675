pub mod builder;
mod parameters;

pub use parameters::RequiredParameterCheck;

use crate::error::RequestValidationError;
use crate::model::{OpenApi, Operation, PathItem, PathMatch};
use crate::types::{HttpLike, RequestParts};
use crate::validator::builder::OpenApiRequestValidatorBuilder;
use dashmap::DashMap;
use http::Method;
use std::collections::HashMap;

/// A pluggable step run after the route has been resolved.
///
/// Checks run in registration order and the first failure stops the request.
pub trait RequestCheck: Send + Sync {
    /// Short name used in logs and in [`RequestValidationError::Rejected`].
    fn name(&self) -> &'static str;

    fn check(
        &self,
        document: &OpenApi,
        resolved: &ResolvedOperation<'_>,
        request: &RequestParts<'_>,
    ) -> Result<(), RequestValidationError>;
}

/// The outcome of a permitted request.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedOperation<'a> {
    /// The path template the request matched, e.g. `/pets/{petId}`.
    pub template: &'a str,
    pub path_item: &'a PathItem,
    pub operation: &'a Operation,
    pub method: Method,
    pub path_parameters: HashMap<String, String>,
}

impl ResolvedOperation<'_> {
    pub fn operation_id(&self) -> Option<&str> {
        self.operation.operation_id()
    }
}

#[derive(Debug, Clone)]
struct CachedRoute {
    template: String,
    parameters: HashMap<String, String>,
}

/// Decides whether requests are permitted by an OpenAPI document.
///
/// The document is owned and never mutated, so one validator can be shared
/// between threads behind an `Arc`.
pub struct OpenApiRequestValidator {
    document: OpenApi,
    base_path: Option<String>,
    route_cache: DashMap<String, CachedRoute>,
    route_cache_capacity: usize,
    checks: Vec<Box<dyn RequestCheck>>,
}

impl OpenApiRequestValidator {
    /// A validator that only resolves routes. Use [`Self::builder`] for anything else.
    pub fn new(document: OpenApi) -> Self {
        Self {
            document,
            base_path: None,
            route_cache: DashMap::new(),
            route_cache_capacity: 0,
            checks: Vec::new(),
        }
    }

    pub fn builder() -> OpenApiRequestValidatorBuilder {
        OpenApiRequestValidatorBuilder::new()
    }

    pub(crate) fn from_parts(
        document: OpenApi,
        base_path: Option<String>,
        route_cache_capacity: usize,
        checks: Vec<Box<dyn RequestCheck>>,
    ) -> Self {
        Self {
            document,
            base_path,
            route_cache: DashMap::new(),
            route_cache_capacity,
            checks,
        }
    }

    pub fn document(&self) -> &OpenApi {
        &self.document
    }

    pub fn base_path(&self) -> Option<&str> {
        self.base_path.as_deref()
    }

    /// Number of request paths currently held by the route cache.
    pub fn cached_routes(&self) -> usize {
        self.route_cache.len()
    }

    /// Drops the query string and the configured base path.
    fn strip_path<'p>(&self, target: &'p str) -> &'p str {
        let path = target.split_once('?').map_or(target, |(path, _)| path);
        let Some(base_path) = self.base_path.as_deref() else {
            return path;
        };
        match path.strip_prefix(base_path) {
            Some("") => "/",
            Some(rest) if rest.starts_with('/') => rest,
            _ => path,
        }
    }

    fn resolve_path(&self, path: &str) -> Result<PathMatch<'_>, RequestValidationError> {
        if let Some(cached) = self.route_cache.get(path) {
            if let Some((template, item)) = self.document.paths.0.get_key_value(&cached.template) {
                log::debug!("Route cache hit for {}", path);
                return Ok(PathMatch {
                    template,
                    item,
                    parameters: cached.parameters.clone(),
                });
            }
        }

        let found = self
            .document
            .paths
            .find(path)
            .map_err(|_| RequestValidationError::UndefinedPath(path.to_string()))?;

        if self.route_cache.len() < self.route_cache_capacity {
            self.route_cache.insert(
                path.to_string(),
                CachedRoute {
                    template: found.template.to_string(),
                    parameters: found.parameters.clone(),
                },
            );
        }
        Ok(found)
    }

    /// Resolves the path and the operation for a request without running any check.
    ///
    /// # Parameters
    /// - `method`: The HTTP method token, any case
    /// - `target`: The request path, optionally followed by a query string
    ///
    /// # Returns
    /// The resolved operation, or the first failure among: undefined path,
    /// unresolvable path item reference, unknown method token, and known method
    /// without an operation.
    pub fn find_operation(
        &self,
        method: &str,
        target: &str,
    ) -> Result<ResolvedOperation<'_>, RequestValidationError> {
        let path = self.strip_path(target);
        let found = self.resolve_path(path)?;

        let path_item = found
            .item
            .resolve(self.document.components())
            .map_err(|source| RequestValidationError::Reference {
                path: path.to_string(),
                source,
            })?;

        let operation_error = |source| RequestValidationError::Operation {
            path: path.to_string(),
            source,
        };
        let parsed_method = PathItem::parse_method(method).map_err(operation_error)?;
        let operation = path_item
            .operation(&parsed_method)
            .map_err(operation_error)?
            .ok_or_else(|| RequestValidationError::MethodNotAllowed {
                method: method.to_string(),
                path: path.to_string(),
            })?;

        log::debug!(
            "Resolved {} {} to {} {}",
            method,
            path,
            found.template,
            operation.operation_id().unwrap_or("<anonymous>")
        );
        Ok(ResolvedOperation {
            template: found.template,
            path_item,
            operation,
            method: parsed_method,
            path_parameters: found.parameters,
        })
    }

    /// Decides whether `method` on `target` is permitted.
    ///
    /// ```
    /// use oasgraph::{DocumentFormat, OpenApi, OpenApiRequestValidator};
    ///
    /// let document = OpenApi::from_str(
    ///     r#"{
    ///         "openapi": "3.1.0",
    ///         "info": { "title": "Petstore", "version": "1.0.0" },
    ///         "paths": { "/pets": { "get": { "operationId": "listPets" } } }
    ///     }"#,
    ///     DocumentFormat::Json,
    /// )
    /// .unwrap();
    /// let validator = OpenApiRequestValidator::new(document);
    /// let resolved = validator.validate("GET", "/pets?limit=10").unwrap();
    /// assert_eq!(resolved.operation_id(), Some("listPets"));
    /// assert!(validator.validate("DELETE", "/pets").is_err());
    /// ```
    pub fn validate(
        &self,
        method: &str,
        target: &str,
    ) -> Result<ResolvedOperation<'_>, RequestValidationError> {
        self.validate_parts(&RequestParts::from_target(method, target))
    }

    /// Validates any `http::Request`, headers included.
    pub fn validate_request<R: HttpLike>(
        &self,
        request: &R,
    ) -> Result<ResolvedOperation<'_>, RequestValidationError> {
        self.validate_parts(&RequestParts::from_request(request))
    }

    pub fn validate_parts(
        &self,
        request: &RequestParts<'_>,
    ) -> Result<ResolvedOperation<'_>, RequestValidationError> {
        let resolved = self.find_operation(request.method, request.path)?;
        for check in &self.checks {
            if let Err(err) = check.check(&self.document, &resolved, request) {
                log::debug!("Check {} rejected {} {}: {}", check.name(), request.method, request.path, err);
                return Err(err);
            }
            log::debug!("Check {} passed", check.name());
        }
        Ok(resolved)
    }
}
