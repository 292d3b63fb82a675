use crate::error::LoadError;
use crate::loader::DocumentFormat;
use crate::model::OpenApi;
use crate::validate::Validate;
use crate::validator::{OpenApiRequestValidator, RequestCheck, RequiredParameterCheck};
use http::Uri;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

const DEFAULT_ROUTE_CACHE_CAPACITY: usize = 1024;

#[derive(Debug)]
pub enum ValidatorBuilderError {
    InvalidOption(String),
    InvalidVersion(String),
    InvalidSpecification(String),
    LoadFailure(String),
}

impl ValidatorBuilderError {
    pub fn invalid_option(msg: impl Into<String>) -> Self {
        Self::InvalidOption(msg.into())
    }

    pub fn invalid_version(msg: impl Into<String>) -> Self {
        Self::InvalidVersion(msg.into())
    }

    pub fn invalid_specification(msg: impl Into<String>) -> Self {
        Self::InvalidSpecification(msg.into())
    }

    pub fn load_failure(msg: impl Into<String>) -> Self {
        Self::LoadFailure(msg.into())
    }
}

impl Display for ValidatorBuilderError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidatorBuilderError::InvalidOption(msg) => {
                write!(f, "Invalid Option: {}", msg)
            }
            ValidatorBuilderError::InvalidVersion(msg) => {
                write!(f, "Invalid Version: {}", msg)
            }
            ValidatorBuilderError::InvalidSpecification(msg) => {
                write!(f, "Invalid Specification: {}", msg)
            }
            ValidatorBuilderError::LoadFailure(msg) => {
                write!(f, "Load Failure: {}", msg)
            }
        }
    }
}

impl std::error::Error for ValidatorBuilderError {}

impl From<LoadError> for ValidatorBuilderError {
    fn from(err: LoadError) -> Self {
        match err {
            LoadError::Json(_) | LoadError::Yaml(_) => {
                ValidatorBuilderError::invalid_specification(err.to_string())
            }
            LoadError::Io(..) | LoadError::UnsupportedExtension(_) => {
                ValidatorBuilderError::load_failure(err.to_string())
            }
        }
    }
}

enum SpecificationLoader {
    None,
    Document(Box<OpenApi>),
    File(PathBuf),
    Raw(String, DocumentFormat),
}

enum BasePath {
    None,
    Explicit(String),
    FromServers,
}

/// Consuming builder for [`OpenApiRequestValidator`].
///
/// ```
/// use oasgraph::{DocumentFormat, OpenApiRequestValidator};
///
/// let validator = OpenApiRequestValidator::builder()
///     .raw(
///         r#"{
///             "openapi": "3.0.3",
///             "info": { "title": "Petstore", "version": "1.0.0" },
///             "servers": [{ "url": "https://petstore.example.com/v1" }],
///             "paths": { "/pets": { "get": { "operationId": "listPets" } } }
///         }"#,
///         DocumentFormat::Json,
///     )
///     .base_path_from_servers()
///     .build()
///     .unwrap();
/// assert_eq!(validator.base_path(), Some("/v1"));
/// assert!(validator.validate("GET", "/v1/pets").is_ok());
/// ```
pub struct OpenApiRequestValidatorBuilder {
    specification_loader: SpecificationLoader,
    structural_validation: bool,
    unique_operation_ids: bool,
    base_path: BasePath,
    route_cache_capacity: usize,
    checks: Vec<Box<dyn RequestCheck>>,
}

impl Default for OpenApiRequestValidatorBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl OpenApiRequestValidatorBuilder {
    pub fn new() -> Self {
        Self {
            specification_loader: SpecificationLoader::None,
            structural_validation: true,
            unique_operation_ids: true,
            base_path: BasePath::None,
            route_cache_capacity: DEFAULT_ROUTE_CACHE_CAPACITY,
            checks: Vec::new(),
        }
    }

    /// Uses an already decoded document.
    pub fn document(mut self, document: OpenApi) -> Self {
        self.specification_loader = SpecificationLoader::Document(Box::new(document));
        self
    }

    /// Reads the document from a `.json`, `.yaml` or `.yml` file at build time.
    pub fn file(mut self, path: impl Into<PathBuf>) -> Self {
        self.specification_loader = SpecificationLoader::File(path.into());
        self
    }

    pub fn raw(mut self, content: impl Into<String>, format: DocumentFormat) -> Self {
        self.specification_loader = SpecificationLoader::Raw(content.into(), format);
        self
    }

    pub fn structural_validation(mut self, enabled: bool) -> Self {
        self.structural_validation = enabled;
        self
    }

    pub fn unique_operation_ids(mut self, enabled: bool) -> Self {
        self.unique_operation_ids = enabled;
        self
    }

    /// Prefix removed from request paths before matching, e.g. `/v1`.
    pub fn base_path(mut self, base_path: impl Into<String>) -> Self {
        self.base_path = BasePath::Explicit(base_path.into());
        self
    }

    /// Takes the base path from the url of the document's first server.
    pub fn base_path_from_servers(mut self) -> Self {
        self.base_path = BasePath::FromServers;
        self
    }

    /// Maximum number of request paths remembered by the route cache. Zero disables it.
    pub fn route_cache_capacity(mut self, capacity: usize) -> Self {
        self.route_cache_capacity = capacity;
        self
    }

    pub fn with_check(mut self, check: impl RequestCheck + 'static) -> Self {
        self.checks.push(Box::new(check));
        self
    }

    /// Registers [`RequiredParameterCheck`].
    pub fn require_parameters(self) -> Self {
        self.with_check(RequiredParameterCheck)
    }

    fn load(loader: SpecificationLoader) -> Result<OpenApi, ValidatorBuilderError> {
        match loader {
            SpecificationLoader::None => Err(ValidatorBuilderError::invalid_option(
                "No specification loader provided.",
            )),
            SpecificationLoader::Document(document) => Ok(*document),
            SpecificationLoader::File(path) => Ok(OpenApi::from_file(path)?),
            SpecificationLoader::Raw(content, format) => Ok(OpenApi::from_str(&content, format)?),
        }
    }

    fn normalize_base_path(base_path: &str) -> Result<Option<String>, ValidatorBuilderError> {
        if !base_path.starts_with('/') {
            return Err(ValidatorBuilderError::invalid_option(format!(
                "base path \"{}\" must begin with a slash",
                base_path
            )));
        }
        let trimmed = base_path.trim_end_matches('/');
        match trimmed {
            "" => Ok(None),
            _ => Ok(Some(trimmed.to_string())),
        }
    }

    fn server_base_path(document: &OpenApi) -> Result<Option<String>, ValidatorBuilderError> {
        let Some(server) = document.servers.first() else {
            log::debug!("No servers declared, base path left empty");
            return Ok(None);
        };
        let url = server.resolved_url();
        let uri: Uri = url.parse().map_err(|err| {
            ValidatorBuilderError::invalid_option(format!("server url \"{}\": {}", url, err))
        })?;
        match uri.path() {
            "" => Ok(None),
            path => Self::normalize_base_path(path),
        }
    }

    pub fn build(self) -> Result<OpenApiRequestValidator, ValidatorBuilderError> {
        let document = Self::load(self.specification_loader)?;

        let version = document
            .version()
            .map_err(|err| ValidatorBuilderError::invalid_version(err.to_string()))?;
        log::debug!("Building validator for {} ({})", document.info.title, version);

        if self.structural_validation {
            document
                .validate()
                .map_err(|err| ValidatorBuilderError::invalid_specification(err.to_string()))?;
        }
        if self.unique_operation_ids {
            document
                .validate_operation_ids()
                .map_err(|err| ValidatorBuilderError::invalid_specification(err.to_string()))?;
        }

        let base_path = match &self.base_path {
            BasePath::None => None,
            BasePath::Explicit(base_path) => Self::normalize_base_path(base_path)?,
            BasePath::FromServers => Self::server_base_path(&document)?,
        };

        Ok(OpenApiRequestValidator::from_parts(
            document,
            base_path,
            self.route_cache_capacity,
            self.checks,
        ))
    }
}
