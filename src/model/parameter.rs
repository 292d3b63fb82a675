use crate::error::StructuralError;
use crate::model::{Component, Components, Example, Extensions, MediaType, ObjectOrReference, ObjectShape, Schema};
use crate::validate::{Context, Validate, exclusive, require, validate_entries};
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Where a parameter is carried in the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
#[serde(try_from = "String")]
pub enum ParameterLocation {
    Query,
    Header,
    Path,
    Cookie,
}

impl ParameterLocation {
    pub const ALLOWED: &'static [&'static str] = &["query", "header", "path", "cookie"];

    pub fn as_str(&self) -> &'static str {
        match self {
            ParameterLocation::Query => "query",
            ParameterLocation::Header => "header",
            ParameterLocation::Path => "path",
            ParameterLocation::Cookie => "cookie",
        }
    }
}

impl Display for ParameterLocation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ParameterLocation {
    type Err = StructuralError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "query" => Ok(ParameterLocation::Query),
            "header" => Ok(ParameterLocation::Header),
            "path" => Ok(ParameterLocation::Path),
            "cookie" => Ok(ParameterLocation::Cookie),
            _ => Err(StructuralError::unexpected_value("in", s, Self::ALLOWED)),
        }
    }
}

impl TryFrom<String> for ParameterLocation {
    type Error = StructuralError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Serialization style of a parameter value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ParameterStyle {
    Matrix,
    Label,
    Form,
    Simple,
    SpaceDelimited,
    PipeDelimited,
    DeepObject,
}

/// A single operation parameter.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Parameter {
    #[serde(default)]
    pub name: String,
    #[serde(rename = "in")]
    pub location: ParameterLocation,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub required: Option<bool>,
    #[serde(default)]
    pub deprecated: Option<bool>,
    #[serde(default)]
    pub allow_empty_value: Option<bool>,
    #[serde(default)]
    pub style: Option<ParameterStyle>,
    #[serde(default)]
    pub explode: Option<bool>,
    #[serde(default)]
    pub allow_reserved: Option<bool>,
    #[serde(default)]
    pub schema: Option<Schema>,
    #[serde(default)]
    pub example: Option<Value>,
    #[serde(default)]
    pub examples: BTreeMap<String, ObjectOrReference<Example>>,
    #[serde(default)]
    pub content: BTreeMap<String, MediaType>,
    #[serde(flatten)]
    pub extensions: Extensions,
}

impl Parameter {
    pub fn new(name: impl Into<String>, location: ParameterLocation) -> Self {
        Self {
            name: name.into(),
            location,
            description: None,
            required: None,
            deprecated: None,
            allow_empty_value: None,
            style: None,
            explode: None,
            allow_reserved: None,
            schema: None,
            example: None,
            examples: BTreeMap::new(),
            content: BTreeMap::new(),
            extensions: Extensions::default(),
        }
    }

    pub fn is_required(&self) -> bool {
        self.required.unwrap_or(false)
    }

    pub fn is_deprecated(&self) -> bool {
        self.deprecated.unwrap_or(false)
    }

    pub fn effective_style(&self) -> ParameterStyle {
        self.style.unwrap_or(match self.location {
            ParameterLocation::Query | ParameterLocation::Cookie => ParameterStyle::Form,
            ParameterLocation::Path | ParameterLocation::Header => ParameterStyle::Simple,
        })
    }

    pub fn effective_explode(&self) -> bool {
        self.explode
            .unwrap_or(self.effective_style() == ParameterStyle::Form)
    }
}

/// Rules shared by parameters and headers.
fn validate_serialization(
    schema: &Option<Schema>,
    content: &BTreeMap<String, MediaType>,
    example: &Option<Value>,
    examples: &BTreeMap<String, ObjectOrReference<Example>>,
) -> Result<(), StructuralError> {
    exclusive("schema", schema.is_some(), "content", !content.is_empty())?;
    if content.len() > 1 {
        return Err(StructuralError::invalid_field(
            "content",
            "must contain at most one media type",
        ));
    }
    exclusive("example", example.is_some(), "examples", !examples.is_empty())?;
    schema.validate().context("schema")?;
    validate_entries("example", examples)?;
    validate_entries("mediaType", content)
}

impl Validate for Parameter {
    fn validate(&self) -> Result<(), StructuralError> {
        require("name", &self.name)?;
        if self.location == ParameterLocation::Path && !self.is_required() {
            return Err(StructuralError::invalid_field(
                "required",
                "must be true for path parameters",
            ));
        }
        validate_serialization(&self.schema, &self.content, &self.example, &self.examples)
    }
}

impl ObjectShape for Parameter {
    const KIND: &'static str = "parameter";
    const OBJECT_FIELDS: &'static [&'static str] =
        &["name", "in", "required", "deprecated", "allowEmptyValue"];
    const SHAPE_REQUIRED: bool = true;
}

impl Component for Parameter {
    const SECTION: &'static str = "parameters";

    fn registry(components: &Components) -> &BTreeMap<String, ObjectOrReference<Self>> {
        &components.parameters
    }
}

/// A header parameter. The name comes from the key of the enclosing map.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Header {
    #[serde(skip)]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub required: Option<bool>,
    #[serde(default)]
    pub deprecated: Option<bool>,
    #[serde(default)]
    pub style: Option<ParameterStyle>,
    #[serde(default)]
    pub explode: Option<bool>,
    #[serde(default)]
    pub schema: Option<Schema>,
    #[serde(default)]
    pub example: Option<Value>,
    #[serde(default)]
    pub examples: BTreeMap<String, ObjectOrReference<Example>>,
    #[serde(default)]
    pub content: BTreeMap<String, MediaType>,
}

impl Header {
    pub fn is_required(&self) -> bool {
        self.required.unwrap_or(false)
    }
}

impl Validate for Header {
    fn validate(&self) -> Result<(), StructuralError> {
        require("name", &self.name)?;
        validate_serialization(&self.schema, &self.content, &self.example, &self.examples)
    }
}

impl ObjectShape for Header {
    const KIND: &'static str = "header";
    const OBJECT_FIELDS: &'static [&'static str] = &["schema", "content"];
}

impl Component for Header {
    const SECTION: &'static str = "headers";

    fn registry(components: &Components) -> &BTreeMap<String, ObjectOrReference<Self>> {
        &components.headers
    }
}

/// Deserializes a header map and copies every key into the inline header's `name`.
pub(crate) fn named_headers<'de, D>(
    deserializer: D,
) -> Result<BTreeMap<String, ObjectOrReference<Header>>, D::Error>
where
    D: Deserializer<'de>,
{
    let mut headers = BTreeMap::<String, ObjectOrReference<Header>>::deserialize(deserializer)?;
    for (name, header) in headers.iter_mut() {
        if let ObjectOrReference::Object(header) = header {
            header.name = name.clone();
        }
    }
    Ok(headers)
}
