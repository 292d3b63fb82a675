use crate::error::StructuralError;
use crate::model::parameter::named_headers;
use crate::model::{Component, Components, Header, MediaType, ObjectOrReference, ObjectShape, Server};
use crate::validate::{Context, Validate, exclusive, validate_entries};
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;

const DEFAULT_RESPONSE: &str = "default";

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct RequestBody {
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub content: BTreeMap<String, MediaType>,
    #[serde(default)]
    pub required: Option<bool>,
}

impl RequestBody {
    pub fn is_required(&self) -> bool {
        self.required.unwrap_or(false)
    }
}

impl Validate for RequestBody {
    fn validate(&self) -> Result<(), StructuralError> {
        if self.content.is_empty() {
            return Err(StructuralError::field_required("content"));
        }
        validate_entries("mediaType", &self.content)
    }
}

impl ObjectShape for RequestBody {
    const KIND: &'static str = "requestBody";
    const OBJECT_FIELDS: &'static [&'static str] = &["content"];
}

impl Component for RequestBody {
    const SECTION: &'static str = "requestBodies";

    fn registry(components: &Components) -> &BTreeMap<String, ObjectOrReference<Self>> {
        &components.request_bodies
    }
}

/// A single response. `description` has no default and must be present in the document.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Response {
    pub description: String,
    #[serde(default, deserialize_with = "named_headers")]
    pub headers: BTreeMap<String, ObjectOrReference<Header>>,
    #[serde(default)]
    pub content: BTreeMap<String, MediaType>,
    #[serde(default)]
    pub links: BTreeMap<String, ObjectOrReference<Link>>,
}

impl Validate for Response {
    fn validate(&self) -> Result<(), StructuralError> {
        validate_entries("header", &self.headers)?;
        validate_entries("mediaType", &self.content)?;
        validate_entries("link", &self.links)
    }
}

impl ObjectShape for Response {
    const KIND: &'static str = "response";
    const OBJECT_FIELDS: &'static [&'static str] = &["content", "headers", "links"];
}

impl Component for Response {
    const SECTION: &'static str = "responses";

    fn registry(components: &Components) -> &BTreeMap<String, ObjectOrReference<Self>> {
        &components.responses
    }
}

/// Expected responses of an operation keyed by status code, code range or `default`.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct Responses(pub BTreeMap<String, ObjectOrReference<Response>>);

impl Responses {
    pub fn get(&self, status: &str) -> Option<&ObjectOrReference<Response>> {
        self.0.get(status)
    }

    pub fn default_response(&self) -> Option<&ObjectOrReference<Response>> {
        self.0.get(DEFAULT_RESPONSE)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &ObjectOrReference<Response>)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// `default`, a three digit code such as `200`, or a range such as `4XX`.
fn is_status_key(key: &str) -> bool {
    if key == DEFAULT_RESPONSE {
        return true;
    }
    let bytes = key.as_bytes();
    if bytes.len() != 3 || !(b'1'..=b'5').contains(&bytes[0]) {
        return false;
    }
    bytes[1..].iter().all(u8::is_ascii_digit) || &bytes[1..] == b"XX"
}

impl Validate for Responses {
    fn validate(&self) -> Result<(), StructuralError> {
        for (status, response) in &self.0 {
            if !is_status_key(status) {
                return Err(StructuralError::invalid_field(
                    "responses",
                    format!("\"{}\" is not a status code, range or default", status),
                ));
            }
            response
                .validate()
                .context(format!("response \"{}\"", status))?;
        }
        Ok(())
    }
}

/// A design-time link from a response to another operation.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Link {
    #[serde(default)]
    pub operation_ref: Option<String>,
    #[serde(default)]
    pub operation_id: Option<String>,
    #[serde(default)]
    pub parameters: BTreeMap<String, Value>,
    #[serde(default)]
    pub request_body: Option<Value>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub server: Option<Server>,
}

impl Validate for Link {
    fn validate(&self) -> Result<(), StructuralError> {
        exclusive(
            "operationRef",
            self.operation_ref.is_some(),
            "operationId",
            self.operation_id.is_some(),
        )?;
        self.server.validate().context("server")
    }
}

impl ObjectShape for Link {
    const KIND: &'static str = "link";
    const OBJECT_FIELDS: &'static [&'static str] = &["operationRef", "operationId"];
}

impl Component for Link {
    const SECTION: &'static str = "links";

    fn registry(components: &Components) -> &BTreeMap<String, ObjectOrReference<Self>> {
        &components.links
    }
}
