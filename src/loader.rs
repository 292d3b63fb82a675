use crate::error::LoadError;
use crate::model::OpenApi;
use serde::de::Error as DeError;
use serde_json::Value;
use std::io::Read;
use std::path::Path;

/// Serialization format of a document source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Json,
    Yaml,
}

impl DocumentFormat {
    /// Picks the format from the file extension (`json`, `yaml` or `yml`, any case).
    pub fn from_path(path: &Path) -> Result<Self, LoadError> {
        let extension = path
            .extension()
            .and_then(|extension| extension.to_str())
            .unwrap_or_default();
        match extension.to_ascii_lowercase().as_str() {
            "json" => Ok(DocumentFormat::Json),
            "yaml" | "yml" => Ok(DocumentFormat::Yaml),
            _ => Err(LoadError::UnsupportedExtension(extension.to_string())),
        }
    }
}

impl OpenApi {
    /// Reads and decodes a document, choosing the format from the file extension.
    ///
    /// The document is not validated; call [`crate::Validate::validate`] on the result.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        let path = path.as_ref();
        let format = DocumentFormat::from_path(path)?;
        let content = std::fs::read_to_string(path)
            .map_err(|err| LoadError::Io(path.to_path_buf(), err))?;
        log::debug!("Loaded {} as {:?}", path.display(), format);
        Self::from_str(&content, format)
    }

    /// ```
    /// use oasgraph::{DocumentFormat, OpenApi};
    ///
    /// let document = OpenApi::from_str(
    ///     "openapi: 3.0.3\ninfo:\n  title: Petstore\n  version: 1.0.0\npaths: {}\n",
    ///     DocumentFormat::Yaml,
    /// )
    /// .unwrap();
    /// assert_eq!(document.info.title, "Petstore");
    /// ```
    pub fn from_str(content: &str, format: DocumentFormat) -> Result<Self, LoadError> {
        match format {
            DocumentFormat::Json => serde_json::from_str(content).map_err(LoadError::Json),
            DocumentFormat::Yaml => {
                Self::from_yaml_value(serde_yaml::from_str(content).map_err(LoadError::Yaml)?)
            }
        }
    }

    pub fn from_reader<R: Read>(reader: R, format: DocumentFormat) -> Result<Self, LoadError> {
        match format {
            DocumentFormat::Json => serde_json::from_reader(reader).map_err(LoadError::Json),
            DocumentFormat::Yaml => {
                Self::from_yaml_value(serde_yaml::from_reader(reader).map_err(LoadError::Yaml)?)
            }
        }
    }

    /// YAML goes through a JSON value first so plain scalar keys such as `200` become strings.
    fn from_yaml_value(value: Value) -> Result<Self, LoadError> {
        serde_json::from_value(value).map_err(|err| LoadError::Yaml(serde_yaml::Error::custom(err)))
    }
}
