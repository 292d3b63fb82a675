pub mod body;
pub mod extensions;
pub mod info;
pub mod media;
pub mod operation;
pub mod parameter;
pub mod path_item;
pub mod paths;
pub mod reference;
mod scalar;
pub mod schema;
pub mod security;
pub mod server;
pub mod tag;

pub use body::{Link, RequestBody, Response, Responses};
pub use extensions::Extensions;
pub use info::{Contact, Info, License};
pub use media::{Encoding, Example, MediaType};
pub use operation::{Callback, Operation, SecurityRequirement};
pub use parameter::{Header, Parameter, ParameterLocation, ParameterStyle};
pub use path_item::PathItem;
pub use paths::{PathMatch, Paths};
pub use reference::{Component, ObjectOrReference, ObjectShape, Reference};
pub use schema::{
    ArraySchema, CompositionSchema, Discriminator, ObjectSchema, PrimitiveSchema, Schema,
    SchemaKind, SchemaMetadata, Xml,
};
pub use security::{ApiKeyLocation, OAuthFlow, OAuthFlows, SecurityScheme};
pub use server::{Server, ServerVariable};
pub use tag::{ExternalDocumentation, Tag};

use crate::error::StructuralError;
use crate::model::parameter::named_headers;
use crate::model::scalar::scalar_string;
use crate::types::version::{OpenApiVersion, VersionError};
use crate::validate::{Context, Validate, require, validate_entries, validate_items};
use serde::Deserialize;
use std::collections::{BTreeMap, HashSet};

/// The root of an OpenAPI document.
///
/// Built once by the loader and read-only afterwards.
///
/// ```
/// use oasgraph::model::OpenApi;
/// use oasgraph::validate::Validate;
/// use serde_json::json;
///
/// let document: OpenApi = serde_json::from_value(json!({
///     "openapi": "3.1.0",
///     "info": { "title": "Sample Pet Store App", "version": "1.0.1" }
/// }))
/// .unwrap();
/// assert!(document.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenApi {
    #[serde(default, deserialize_with = "scalar_string")]
    pub openapi: String,
    #[serde(default)]
    pub info: Info,
    #[serde(default)]
    pub json_schema_dialect: Option<String>,
    #[serde(default)]
    pub servers: Vec<Server>,
    #[serde(default)]
    pub paths: Paths,
    #[serde(default)]
    pub webhooks: BTreeMap<String, ObjectOrReference<PathItem>>,
    #[serde(default)]
    pub components: Option<Components>,
    #[serde(default)]
    pub security: Vec<SecurityRequirement>,
    #[serde(default)]
    pub tags: Vec<Tag>,
    #[serde(default)]
    pub external_docs: Option<ExternalDocumentation>,
    #[serde(flatten)]
    pub extensions: Extensions,
}

impl OpenApi {
    pub fn version(&self) -> Result<OpenApiVersion, VersionError> {
        self.openapi.parse()
    }

    pub fn components(&self) -> Option<&Components> {
        self.components.as_ref()
    }

    /// Checks that no two operations share an operationId.
    ///
    /// Covers operations under paths, webhooks, callbacks and the `pathItems`
    /// and `callbacks` components. Referenced path items are visited where they
    /// are defined, not where they are referenced.
    pub fn validate_operation_ids(&self) -> Result<(), StructuralError> {
        let mut seen = HashSet::new();
        let path_items = self
            .paths
            .iter()
            .map(|(_, item)| item)
            .chain(self.webhooks.values());
        for item in path_items.filter_map(ObjectOrReference::as_object) {
            collect_operation_ids(item, &mut seen)?;
        }

        if let Some(components) = &self.components {
            for item in components
                .path_items
                .values()
                .filter_map(ObjectOrReference::as_object)
            {
                collect_operation_ids(item, &mut seen)?;
            }
            for callback in components
                .callbacks
                .values()
                .filter_map(ObjectOrReference::as_object)
            {
                collect_callback_operation_ids(callback, &mut seen)?;
            }
        }
        Ok(())
    }
}

fn collect_operation_ids<'a>(
    item: &'a PathItem,
    seen: &mut HashSet<&'a str>,
) -> Result<(), StructuralError> {
    for (_, operation) in item.operations() {
        if let Some(id) = operation.operation_id() {
            if !seen.insert(id) {
                return Err(StructuralError::DuplicateOperationId(id.to_string()));
            }
        }
        for callback in operation
            .callbacks
            .values()
            .filter_map(ObjectOrReference::as_object)
        {
            collect_callback_operation_ids(callback, seen)?;
        }
    }
    Ok(())
}

fn collect_callback_operation_ids<'a>(
    callback: &'a Callback,
    seen: &mut HashSet<&'a str>,
) -> Result<(), StructuralError> {
    for item in callback
        .0
        .values()
        .filter_map(ObjectOrReference::as_object)
    {
        collect_operation_ids(item, seen)?;
    }
    Ok(())
}

impl Validate for OpenApi {
    fn validate(&self) -> Result<(), StructuralError> {
        require("openapi", &self.openapi)?;
        if self.version().is_err() {
            return Err(StructuralError::UnsupportedVersion(self.openapi.clone()));
        }
        self.info.validate().context("Info")?;
        validate_items("server", &self.servers)?;
        self.paths.validate().context("paths")?;
        validate_entries("webhook", &self.webhooks)?;
        self.components.validate().context("components")?;
        validate_items("tag", &self.tags)?;
        let mut tag_names = HashSet::new();
        for tag in &self.tags {
            if !tag_names.insert(tag.name.as_str()) {
                return Err(StructuralError::invalid_field(
                    "tags",
                    format!("duplicate tag \"{}\"", tag.name),
                ));
            }
        }
        self.external_docs.validate().context("externalDocs")
    }
}

/// Reusable objects addressed by `#/components/<section>/<name>` references.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Components {
    #[serde(default)]
    pub schemas: BTreeMap<String, Schema>,
    #[serde(default)]
    pub responses: BTreeMap<String, ObjectOrReference<Response>>,
    #[serde(default)]
    pub parameters: BTreeMap<String, ObjectOrReference<Parameter>>,
    #[serde(default)]
    pub examples: BTreeMap<String, ObjectOrReference<Example>>,
    #[serde(default)]
    pub request_bodies: BTreeMap<String, ObjectOrReference<RequestBody>>,
    #[serde(default, deserialize_with = "named_headers")]
    pub headers: BTreeMap<String, ObjectOrReference<Header>>,
    #[serde(default)]
    pub security_schemes: BTreeMap<String, ObjectOrReference<SecurityScheme>>,
    #[serde(default)]
    pub links: BTreeMap<String, ObjectOrReference<Link>>,
    #[serde(default)]
    pub callbacks: BTreeMap<String, ObjectOrReference<Callback>>,
    #[serde(default)]
    pub path_items: BTreeMap<String, ObjectOrReference<PathItem>>,
    #[serde(flatten)]
    pub extensions: Extensions,
}

/// Component keys must match `^[a-zA-Z0-9.\-_]+$`.
fn is_component_key(key: &str) -> bool {
    !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_'))
}

fn validate_section<'a, V, I>(section: &'static str, entries: I) -> Result<(), StructuralError>
where
    V: Validate + 'a,
    I: IntoIterator<Item = (&'a String, &'a V)>,
{
    for (key, value) in entries {
        if !is_component_key(key) {
            return Err(StructuralError::invalid_field(
                section,
                format!("key \"{}\" must match ^[a-zA-Z0-9.\\-_]+$", key),
            ));
        }
        value
            .validate()
            .context(format!("{} \"{}\"", section, key))?;
    }
    Ok(())
}

impl Validate for Components {
    fn validate(&self) -> Result<(), StructuralError> {
        validate_section("schemas", &self.schemas)?;
        validate_section("responses", &self.responses)?;
        validate_section("parameters", &self.parameters)?;
        validate_section("examples", &self.examples)?;
        validate_section("requestBodies", &self.request_bodies)?;
        validate_section("headers", &self.headers)?;
        validate_section("securitySchemes", &self.security_schemes)?;
        validate_section("links", &self.links)?;
        validate_section("callbacks", &self.callbacks)?;
        validate_section("pathItems", &self.path_items)
    }
}
