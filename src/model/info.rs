use crate::error::StructuralError;
use crate::model::Extensions;
use crate::model::scalar::scalar_string;
use crate::validate::{Context, Validate, exclusive, require};
use serde::Deserialize;

/// Metadata about the API.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Info {
    #[serde(default, deserialize_with = "scalar_string")]
    pub title: String,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub terms_of_service: Option<String>,
    #[serde(default)]
    pub contact: Option<Contact>,
    #[serde(default)]
    pub license: Option<License>,
    #[serde(default, deserialize_with = "scalar_string")]
    pub version: String,
    #[serde(flatten)]
    pub extensions: Extensions,
}

impl Info {
    pub fn new(title: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            version: version.into(),
            ..Default::default()
        }
    }
}

impl Validate for Info {
    fn validate(&self) -> Result<(), StructuralError> {
        require("title", &self.title)?;
        require("version", &self.version)?;
        self.license.validate().context("License")
    }
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct Contact {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct License {
    #[serde(default)]
    pub name: String,
    /// An SPDX license expression.
    #[serde(default)]
    pub identifier: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

impl Validate for License {
    fn validate(&self) -> Result<(), StructuralError> {
        require("name", &self.name)?;
        exclusive(
            "identifier",
            self.identifier.as_deref().is_some_and(|id| !id.is_empty()),
            "url",
            self.url.as_deref().is_some_and(|url| !url.is_empty()),
        )
    }
}
