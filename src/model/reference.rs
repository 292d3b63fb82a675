use crate::REF_FIELD;
use crate::error::{ReferenceError, StructuralError};
use crate::model::Components;
use crate::types::json_path::JsonPath;
use crate::validate::Validate;
use serde::de::{DeserializeOwned, Error as DeError};
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::collections::{BTreeMap, HashSet};

const COMPONENTS_SEGMENT: &str = "components";

/// A pointer to another part of the document.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct Reference {
    #[serde(rename = "$ref", default)]
    pub reference: String,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

impl Reference {
    pub fn new(reference: impl Into<String>) -> Self {
        Self {
            reference: reference.into(),
            ..Default::default()
        }
    }

    /// Whether the reference points outside of the current document.
    pub fn is_external(&self) -> bool {
        !self.reference.starts_with('#')
    }

    /// Extracts `<name>` from `#/components/<section>/<name>`.
    pub fn component_name(&self, section: &'static str) -> Result<String, ReferenceError> {
        if self.reference.is_empty() {
            return Err(ReferenceError::Empty);
        }
        if self.is_external() {
            return Err(ReferenceError::external(&self.reference));
        }
        let malformed = || ReferenceError::Malformed {
            reference: self.reference.clone(),
            expected_section: section,
        };
        let pointer = JsonPath::from_pointer(&self.reference[1..]).ok_or_else(malformed)?;
        if pointer.len() != 3
            || pointer.segment(0).as_deref() != Some(COMPONENTS_SEGMENT)
            || pointer.segment(1).as_deref() != Some(section)
        {
            return Err(malformed());
        }
        match pointer.segment(2) {
            Some(name) if !name.is_empty() => Ok(name.into_owned()),
            _ => Err(malformed()),
        }
    }
}

impl Validate for Reference {
    fn validate(&self) -> Result<(), StructuralError> {
        if self.reference.is_empty() {
            return Err(StructuralError::field_required("ref"));
        }
        Ok(())
    }
}

/// Describes how an entity is told apart from a Reference Object in the raw document.
pub trait ObjectShape {
    /// Entity name used in load errors, e.g. `parameter`.
    const KIND: &'static str;

    /// Keys whose presence marks an inline object. A document entry holding
    /// one of these next to `$ref` is rejected.
    const OBJECT_FIELDS: &'static [&'static str] = &[];

    /// Reject entries that carry neither `$ref` nor any object field.
    const SHAPE_REQUIRED: bool = false;
}

/// An entity that can be registered under `#/components/<SECTION>`.
pub trait Component: ObjectShape + Sized {
    const SECTION: &'static str;

    fn registry(components: &Components) -> &BTreeMap<String, ObjectOrReference<Self>>;
}

/// An inline entity or a Reference Object standing in for one.
#[derive(Debug, Clone, PartialEq)]
pub enum ObjectOrReference<T> {
    Object(T),
    Reference(Reference),
}

impl<T> ObjectOrReference<T> {
    pub fn as_object(&self) -> Option<&T> {
        match self {
            ObjectOrReference::Object(object) => Some(object),
            ObjectOrReference::Reference(_) => None,
        }
    }

    pub fn as_reference(&self) -> Option<&Reference> {
        match self {
            ObjectOrReference::Object(_) => None,
            ObjectOrReference::Reference(reference) => Some(reference),
        }
    }
}

impl<T: Component> ObjectOrReference<T> {
    /// Follows references through `components` until an inline object is found.
    pub fn resolve<'a>(&'a self, components: Option<&'a Components>) -> Result<&'a T, ReferenceError> {
        let mut current = self;
        let mut seen_references = HashSet::new();
        loop {
            match current {
                ObjectOrReference::Object(object) => return Ok(object),
                ObjectOrReference::Reference(reference) => {
                    if !seen_references.insert(reference.reference.as_str()) {
                        return Err(ReferenceError::cyclic(&reference.reference));
                    }
                    let name = reference.component_name(T::SECTION)?;
                    current = components
                        .and_then(|components| T::registry(components).get(&name))
                        .ok_or_else(|| ReferenceError::unresolved(&reference.reference))?;
                }
            }
        }
    }
}

impl<T> From<T> for ObjectOrReference<T> {
    fn from(object: T) -> Self {
        ObjectOrReference::Object(object)
    }
}

impl<T: Validate> Validate for ObjectOrReference<T> {
    fn validate(&self) -> Result<(), StructuralError> {
        match self {
            ObjectOrReference::Object(object) => object.validate(),
            ObjectOrReference::Reference(reference) => reference.validate(),
        }
    }
}

impl<'de, T> Deserialize<'de> for ObjectOrReference<T>
where
    T: ObjectShape + DeserializeOwned,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        let is_reference = value.get(REF_FIELD).is_some();
        let is_object = T::OBJECT_FIELDS
            .iter()
            .any(|field| value.get(*field).is_some());

        if is_reference && is_object {
            return Err(D::Error::custom(format!(
                "{} ref and object are mutually exclusive",
                T::KIND
            )));
        }

        if is_reference {
            return serde_json::from_value(value)
                .map(ObjectOrReference::Reference)
                .map_err(D::Error::custom);
        }

        if T::SHAPE_REQUIRED && !is_object {
            return Err(D::Error::custom(format!(
                "{} must be an object or reference",
                T::KIND
            )));
        }

        serde_json::from_value(value)
            .map(ObjectOrReference::Object)
            .map_err(D::Error::custom)
    }
}

#[cfg(test)]
mod test {
    use crate::error::ReferenceError;
    use crate::model::reference::{ObjectOrReference, Reference};
    use crate::model::{Components, Example};
    use crate::validate::Validate;
    use serde_json::json;

    #[test]
    fn test_component_name() {
        let reference = Reference::new("#/components/parameters/limit");
        assert_eq!(reference.component_name("parameters").unwrap(), "limit");

        let escaped = Reference::new("#/components/schemas/a~1b");
        assert_eq!(escaped.component_name("schemas").unwrap(), "a/b");
    }

    #[test]
    fn test_component_name_wrong_section() {
        let reference = Reference::new("#/components/schemas/Pet");
        let err = reference.component_name("parameters").unwrap_err();
        assert!(matches!(err, ReferenceError::Malformed { .. }));
    }

    #[test]
    fn test_component_name_external() {
        let reference = Reference::new("other.yaml#/components/schemas/Pet");
        assert!(reference.is_external());
        assert_eq!(
            reference.component_name("schemas").unwrap_err(),
            ReferenceError::External("other.yaml#/components/schemas/Pet".to_string())
        );
    }

    #[test]
    fn test_reference_requires_ref() {
        assert!(Reference::new("#/components/examples/a").validate().is_ok());
        assert_eq!(
            Reference::default().validate().unwrap_err().to_string(),
            "ref is required"
        );
    }

    #[test]
    fn test_resolve_follows_chain() {
        let components: Components = serde_json::from_value(json!({
            "examples": {
                "alias": { "$ref": "#/components/examples/target" },
                "target": { "value": 42 }
            }
        }))
        .unwrap();
        let example: ObjectOrReference<Example> =
            ObjectOrReference::Reference(Reference::new("#/components/examples/alias"));
        let resolved = example.resolve(Some(&components)).unwrap();
        assert_eq!(resolved.value, Some(json!(42)));
    }

    #[test]
    fn test_resolve_detects_cycle() {
        let components: Components = serde_json::from_value(json!({
            "examples": {
                "a": { "$ref": "#/components/examples/b" },
                "b": { "$ref": "#/components/examples/a" }
            }
        }))
        .unwrap();
        let example: ObjectOrReference<Example> =
            ObjectOrReference::Reference(Reference::new("#/components/examples/a"));
        assert_eq!(
            example.resolve(Some(&components)).unwrap_err(),
            ReferenceError::Cyclic("#/components/examples/a".to_string())
        );
    }

    #[test]
    fn test_resolve_unresolved() {
        let example: ObjectOrReference<Example> =
            ObjectOrReference::Reference(Reference::new("#/components/examples/missing"));
        assert_eq!(
            example.resolve(None).unwrap_err(),
            ReferenceError::Unresolved("#/components/examples/missing".to_string())
        );
    }

    #[test]
    fn test_deserialize_rejects_both_shapes() {
        let result = serde_json::from_value::<ObjectOrReference<Example>>(json!({
            "$ref": "#/components/examples/a",
            "value": 1
        }));
        let err = result.unwrap_err().to_string();
        assert!(err.contains("example ref and object are mutually exclusive"));
    }

    #[test]
    fn test_deserialize_rejects_neither_shape() {
        let result = serde_json::from_value::<ObjectOrReference<Example>>(json!({
            "summary": "nothing else"
        }));
        let err = result.unwrap_err().to_string();
        assert!(err.contains("example must be an object or reference"));
    }

    #[test]
    fn test_deserialize_either_shape() {
        let object = serde_json::from_value::<ObjectOrReference<Example>>(json!({
            "value": { "id": 1 }
        }))
        .unwrap();
        assert!(object.as_object().is_some());

        let reference = serde_json::from_value::<ObjectOrReference<Example>>(json!({
            "$ref": "#/components/examples/a",
            "summary": "override"
        }))
        .unwrap();
        let reference = reference.as_reference().unwrap();
        assert_eq!(reference.reference, "#/components/examples/a");
        assert_eq!(reference.summary.as_deref(), Some("override"));
    }
}
