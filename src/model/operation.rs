use crate::error::StructuralError;
use crate::model::{
    Component, Components, Extensions, ExternalDocumentation, ObjectOrReference, ObjectShape,
    Parameter, ParameterLocation, PathItem, RequestBody, Responses, Server,
};
use crate::validate::{Context, Validate, validate_entries, validate_items};
use serde::Deserialize;
use std::collections::{BTreeMap, HashSet};

/// Scheme name to the scopes required from it. An empty map means anonymous access.
pub type SecurityRequirement = BTreeMap<String, Vec<String>>;

/// A single API operation on a path.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Operation {
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub external_docs: Option<ExternalDocumentation>,
    #[serde(default)]
    pub operation_id: Option<String>,
    #[serde(default)]
    pub parameters: Vec<ObjectOrReference<Parameter>>,
    #[serde(default)]
    pub request_body: Option<ObjectOrReference<RequestBody>>,
    #[serde(default)]
    pub responses: Option<Responses>,
    #[serde(default)]
    pub callbacks: BTreeMap<String, ObjectOrReference<Callback>>,
    #[serde(default)]
    pub deprecated: Option<bool>,
    #[serde(default)]
    pub security: Option<Vec<SecurityRequirement>>,
    #[serde(default)]
    pub servers: Vec<Server>,
    #[serde(flatten)]
    pub extensions: Extensions,
}

impl Operation {
    pub fn is_deprecated(&self) -> bool {
        self.deprecated.unwrap_or(false)
    }

    pub fn operation_id(&self) -> Option<&str> {
        self.operation_id.as_deref()
    }
}

/// Inline parameters must not repeat a (name, in) pair. References are not followed.
pub(crate) fn check_unique_parameters(
    parameters: &[ObjectOrReference<Parameter>],
) -> Result<(), StructuralError> {
    let mut seen: HashSet<(&str, ParameterLocation)> = HashSet::new();
    for parameter in parameters.iter().filter_map(ObjectOrReference::as_object) {
        if !seen.insert((parameter.name.as_str(), parameter.location)) {
            return Err(StructuralError::invalid_field(
                "parameters",
                format!(
                    "duplicate {} parameter \"{}\"",
                    parameter.location, parameter.name
                ),
            ));
        }
    }
    Ok(())
}

impl Validate for Operation {
    fn validate(&self) -> Result<(), StructuralError> {
        self.external_docs.validate().context("externalDocs")?;
        validate_items("parameter", &self.parameters)?;
        check_unique_parameters(&self.parameters)?;
        self.request_body.validate().context("requestBody")?;
        self.responses.validate().context("responses")?;
        validate_entries("callback", &self.callbacks)?;
        validate_items("server", &self.servers)
    }
}

/// Runtime expression to the path item describing the out-of-band request.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct Callback(pub BTreeMap<String, ObjectOrReference<PathItem>>);

impl Callback {
    pub fn iter(&self) -> impl Iterator<Item = (&String, &ObjectOrReference<PathItem>)> {
        self.0.iter()
    }
}

impl Validate for Callback {
    fn validate(&self) -> Result<(), StructuralError> {
        validate_entries("expression", &self.0)
    }
}

impl ObjectShape for Callback {
    const KIND: &'static str = "callback";
}

impl Component for Callback {
    const SECTION: &'static str = "callbacks";

    fn registry(components: &Components) -> &BTreeMap<String, ObjectOrReference<Self>> {
        &components.callbacks
    }
}

#[cfg(test)]
mod test {
    use crate::model::{Operation, ParameterLocation};
    use crate::validate::Validate;
    use serde_json::json;

    fn operation(value: serde_json::Value) -> Operation {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_operation_deserialize() {
        let parsed = operation(json!({
            "tags": ["pets"],
            "summary": "List all pets",
            "operationId": "listPets",
            "parameters": [
                { "name": "limit", "in": "query", "schema": { "type": "integer", "maximum": 100 } },
                { "$ref": "#/components/parameters/trace" }
            ],
            "responses": {
                "200": { "description": "A paged array of pets" }
            },
            "security": [{ "petstore_auth": ["read:pets"] }],
            "x-rate-limit": 10
        }));
        assert_eq!(parsed.operation_id(), Some("listPets"));
        assert_eq!(parsed.parameters.len(), 2);
        let limit = parsed.parameters[0].as_object().unwrap();
        assert_eq!(limit.location, ParameterLocation::Query);
        assert!(parsed.parameters[1].as_reference().is_some());
        assert_eq!(parsed.security.as_ref().unwrap()[0]["petstore_auth"], vec!["read:pets"]);
        assert!(!parsed.is_deprecated());
        assert!(parsed.extensions.get("x-rate-limit").is_some());
        assert!(parsed.validate().is_ok());
    }

    #[test]
    fn test_duplicate_parameters_are_rejected() {
        let parsed = operation(json!({
            "parameters": [
                { "name": "limit", "in": "query" },
                { "name": "limit", "in": "header" },
                { "name": "limit", "in": "query" }
            ]
        }));
        assert_eq!(
            parsed.validate().unwrap_err().to_string(),
            "parameters: duplicate query parameter \"limit\""
        );
    }

    #[test]
    fn test_validate_wraps_nested_errors() {
        let parsed = operation(json!({ "requestBody": { "content": {} } }));
        assert_eq!(
            parsed.validate().unwrap_err().to_string(),
            "invalid requestBody: content is required"
        );

        let parsed = operation(json!({ "parameters": [{ "name": "", "in": "query" }] }));
        assert_eq!(
            parsed.validate().unwrap_err().to_string(),
            "invalid parameter: name is required"
        );
    }

    #[test]
    fn test_callbacks_validate_path_items() {
        let parsed = operation(json!({
            "callbacks": {
                "onData": {
                    "{$request.query.callbackUrl}/data": {
                        "post": {
                            "requestBody": { "content": {} }
                        }
                    }
                }
            }
        }));
        assert_eq!(
            parsed.validate().unwrap_err().to_string(),
            "invalid callback \"onData\": invalid expression \"{$request.query.callbackUrl}/data\": invalid Post: invalid requestBody: content is required"
        );
    }
}
