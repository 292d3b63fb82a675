use crate::error::StructuralError;
use crate::model::scalar::{scalar_string, scalar_strings};
use crate::validate::{Validate, require, validate_entries};
use serde::Deserialize;
use std::collections::BTreeMap;

/// A server hosting the API. The url may contain `{variable}` placeholders.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct Server {
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub variables: BTreeMap<String, ServerVariable>,
}

impl Server {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    /// The url with every declared variable replaced by its default value.
    pub fn resolved_url(&self) -> String {
        self.variables
            .iter()
            .fold(self.url.clone(), |url, (name, variable)| {
                url.replace(&format!("{{{}}}", name), &variable.default)
            })
    }
}

impl Validate for Server {
    fn validate(&self) -> Result<(), StructuralError> {
        require("url", &self.url)?;
        validate_entries("server variable", &self.variables)
    }
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct ServerVariable {
    #[serde(default, rename = "enum", deserialize_with = "scalar_strings")]
    pub enumeration: Option<Vec<String>>,
    #[serde(default, deserialize_with = "scalar_string")]
    pub default: String,
    #[serde(default)]
    pub description: Option<String>,
}

impl Validate for ServerVariable {
    fn validate(&self) -> Result<(), StructuralError> {
        require("default", &self.default)?;
        if let Some(values) = &self.enumeration {
            if values.is_empty() {
                return Err(StructuralError::empty_collection("enum"));
            }
            if !values.contains(&self.default) {
                return Err(StructuralError::invalid_field(
                    "default",
                    format!("\"{}\" is not one of the enum values", self.default),
                ));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use crate::model::{Server, ServerVariable};
    use crate::validate::Validate;
    use serde_json::json;

    fn variable(default: &str, enumeration: Option<Vec<&str>>) -> ServerVariable {
        ServerVariable {
            enumeration: enumeration.map(|values| values.into_iter().map(str::to_string).collect()),
            default: default.to_string(),
            description: None,
        }
    }

    #[test]
    fn test_server_variable_rules() {
        assert!(variable("demo", None).validate().is_ok());
        assert!(variable("8443", Some(vec!["8443", "443"])).validate().is_ok());
        assert_eq!(
            variable("", None).validate().unwrap_err().to_string(),
            "default is required"
        );
        assert_eq!(
            variable("demo", Some(vec![])).validate().unwrap_err().to_string(),
            "non empty enum is required"
        );
        assert!(variable("80", Some(vec!["8443", "443"])).validate().is_err());
    }

    #[test]
    fn test_server_wraps_variable_error() {
        let server: Server = serde_json::from_value(json!({
            "url": "https://{username}.gigantic-server.com:{port}/{basePath}",
            "variables": {
                "username": { "default": "" },
                "port": { "enum": ["8443", "443"], "default": "8443" }
            }
        }))
        .unwrap();
        assert_eq!(
            server.validate().unwrap_err().to_string(),
            "invalid server variable \"username\": default is required"
        );
    }

    #[test]
    fn test_server_requires_url() {
        assert_eq!(
            Server::default().validate().unwrap_err().to_string(),
            "url is required"
        );
    }

    #[test]
    fn test_resolved_url() {
        let server: Server = serde_json::from_value(json!({
            "url": "https://{username}.gigantic-server.com:{port}/{basePath}",
            "variables": {
                "username": { "default": "demo" },
                "port": { "enum": ["8443", "443"], "default": "8443" },
                "basePath": { "default": "v2" }
            }
        }))
        .unwrap();
        assert!(server.validate().is_ok());
        assert_eq!(
            server.resolved_url(),
            "https://demo.gigantic-server.com:8443/v2"
        );
    }
}
