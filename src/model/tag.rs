use crate::error::StructuralError;
use crate::model::scalar::scalar_string;
use crate::validate::{Context, Validate, require};
use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tag {
    #[serde(default, deserialize_with = "scalar_string")]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub external_docs: Option<ExternalDocumentation>,
}

impl Validate for Tag {
    fn validate(&self) -> Result<(), StructuralError> {
        require("name", &self.name)?;
        self.external_docs.validate().context("externalDocs")
    }
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct ExternalDocumentation {
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub url: String,
}

impl Validate for ExternalDocumentation {
    fn validate(&self) -> Result<(), StructuralError> {
        require("url", &self.url)
    }
}
