use crate::error::StructuralError;
use crate::model::parameter::named_headers;
use crate::model::{Component, Components, Header, ObjectOrReference, ObjectShape, ParameterStyle, Schema};
use crate::validate::{Context, Validate, exclusive, validate_entries};
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;

/// Schema and examples for one media type, keyed by the media type string.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct MediaType {
    #[serde(default)]
    pub schema: Option<Schema>,
    #[serde(default)]
    pub example: Option<Value>,
    #[serde(default)]
    pub examples: BTreeMap<String, ObjectOrReference<Example>>,
    #[serde(default)]
    pub encoding: BTreeMap<String, Encoding>,
}

impl Validate for MediaType {
    fn validate(&self) -> Result<(), StructuralError> {
        exclusive(
            "example",
            self.example.is_some(),
            "examples",
            !self.examples.is_empty(),
        )?;
        self.schema.validate().context("schema")?;
        validate_entries("example", &self.examples)?;
        validate_entries("encoding", &self.encoding)
    }
}

/// How a single property of a multipart or form body is serialized.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Encoding {
    #[serde(default)]
    pub content_type: Option<String>,
    #[serde(default, deserialize_with = "named_headers")]
    pub headers: BTreeMap<String, ObjectOrReference<Header>>,
    #[serde(default)]
    pub style: Option<ParameterStyle>,
    #[serde(default)]
    pub explode: Option<bool>,
    #[serde(default)]
    pub allow_reserved: Option<bool>,
}

impl Validate for Encoding {
    fn validate(&self) -> Result<(), StructuralError> {
        validate_entries("header", &self.headers)
    }
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Example {
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub value: Option<Value>,
    #[serde(default)]
    pub external_value: Option<String>,
}

impl Validate for Example {
    fn validate(&self) -> Result<(), StructuralError> {
        if self.value.is_none() && self.external_value.is_none() {
            return Err(StructuralError::invalid_field(
                "example",
                "must be an example object or reference",
            ));
        }
        exclusive(
            "value",
            self.value.is_some(),
            "externalValue",
            self.external_value.is_some(),
        )
    }
}

impl ObjectShape for Example {
    const KIND: &'static str = "example";
    const OBJECT_FIELDS: &'static [&'static str] = &["value", "externalValue"];
    const SHAPE_REQUIRED: bool = true;
}

impl Component for Example {
    const SECTION: &'static str = "examples";

    fn registry(components: &Components) -> &BTreeMap<String, ObjectOrReference<Self>> {
        &components.examples
    }
}

#[cfg(test)]
mod test {
    use crate::model::{Example, MediaType, ObjectOrReference};
    use crate::validate::Validate;
    use serde_json::json;

    #[test]
    fn test_example_value_and_external_value_are_exclusive() {
        let both = Example {
            value: Some(json!({ "id": 1 })),
            external_value: Some("https://example.com/pet.json".to_string()),
            ..Default::default()
        };
        assert_eq!(
            both.validate().unwrap_err().to_string(),
            "value and externalValue are mutually exclusive"
        );

        let external = serde_json::from_value::<ObjectOrReference<Example>>(json!({
            "externalValue": "https://example.com/pet.json"
        }))
        .unwrap();
        assert!(external.validate().is_ok());
    }

    #[test]
    fn test_example_without_value_is_rejected() {
        let empty = ObjectOrReference::Object(Example {
            summary: Some("A cat".to_string()),
            ..Default::default()
        });
        assert_eq!(
            empty.validate().unwrap_err().to_string(),
            "example: must be an example object or reference"
        );
        assert!(ObjectOrReference::Object(Example::default()).validate().is_err());

        let media = MediaType {
            examples: [("cat".to_string(), empty)].into_iter().collect(),
            ..Default::default()
        };
        assert!(media.validate().is_err());
    }

    #[test]
    fn test_media_type_example_and_examples_are_exclusive() {
        let media: MediaType = serde_json::from_value(json!({
            "schema": { "type": "string" },
            "example": "cat",
            "examples": { "dog": { "value": "dog" } }
        }))
        .unwrap();
        assert_eq!(
            media.validate().unwrap_err().to_string(),
            "example and examples are mutually exclusive"
        );
    }

    #[test]
    fn test_media_type_validates_encoding_headers() {
        let media: MediaType = serde_json::from_value(json!({
            "schema": { "type": "object" },
            "encoding": {
                "profileImage": {
                    "contentType": "image/png",
                    "headers": {
                        "X-Rate-Limit-Limit": {
                            "schema": { "type": "integer" },
                            "content": { "text/plain": {} }
                        }
                    }
                }
            }
        }))
        .unwrap();
        let header = media.encoding["profileImage"].headers["X-Rate-Limit-Limit"]
            .as_object()
            .unwrap();
        assert_eq!(header.name, "X-Rate-Limit-Limit");
        assert_eq!(
            media.validate().unwrap_err().to_string(),
            "invalid encoding \"profileImage\": invalid header \"X-Rate-Limit-Limit\": schema and content are mutually exclusive"
        );
    }
}
