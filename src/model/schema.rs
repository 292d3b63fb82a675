use crate::error::{ReferenceError, StructuralError};
use crate::model::{Components, ExternalDocumentation, Reference};
use crate::types::primitive::SchemaType;
use crate::validate::{Context, Validate, require, validate_entries, validate_items};
use serde::Deserialize;
use serde_json::Value;
use std::collections::{BTreeMap, HashSet};
use std::str::FromStr;

const SCHEMAS_SECTION: &str = "schemas";

/// A JSON Schema as used by OpenAPI, reduced to the shapes the document graph cares about.
///
/// The keywords shared by every shape live in [`SchemaMetadata`], the shape
/// itself in [`SchemaKind`].
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(try_from = "RawSchema")]
pub struct Schema {
    pub kind: SchemaKind,
    pub meta: SchemaMetadata,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct SchemaMetadata {
    pub title: Option<String>,
    pub description: Option<String>,
    pub default: Option<Value>,
    /// Deprecated in favour of `examples`, still common in 3.0 documents.
    pub example: Option<Value>,
    pub examples: Vec<Value>,
    pub nullable: bool,
    pub deprecated: Option<bool>,
    pub read_only: Option<bool>,
    pub write_only: Option<bool>,
    pub discriminator: Option<Discriminator>,
    pub xml: Option<Xml>,
    pub external_docs: Option<ExternalDocumentation>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum SchemaKind {
    /// No type constraint at all (`{}`).
    #[default]
    Any,
    /// `true` accepts everything, `false` nothing.
    Boolean(bool),
    Reference(Reference),
    Primitive(PrimitiveSchema),
    /// More than one non-null type, e.g. `type: [string, integer]`.
    Types(Vec<SchemaType>),
    Array(ArraySchema),
    Object(ObjectSchema),
    Composition(CompositionSchema),
}

#[derive(Debug, Clone, PartialEq)]
pub struct PrimitiveSchema {
    pub schema_type: SchemaType,
    pub format: Option<String>,
    pub enumeration: Vec<Value>,
    pub minimum: Option<f64>,
    pub maximum: Option<f64>,
    pub min_length: Option<u64>,
    pub max_length: Option<u64>,
    pub pattern: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ArraySchema {
    pub items: Option<Box<Schema>>,
    pub min_items: Option<u64>,
    pub max_items: Option<u64>,
    pub unique_items: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ObjectSchema {
    pub properties: BTreeMap<String, Schema>,
    pub required: Vec<String>,
    pub additional_properties: Option<Box<Schema>>,
    pub min_properties: Option<u64>,
    pub max_properties: Option<u64>,
}

/// `allOf` / `oneOf` / `anyOf` / `not`, plus whatever shape the remaining
/// keywords describe.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CompositionSchema {
    pub all_of: Vec<Schema>,
    pub one_of: Vec<Schema>,
    pub any_of: Vec<Schema>,
    pub not: Option<Box<Schema>>,
    pub base: Option<Box<Schema>>,
}

impl Schema {
    pub fn reference(reference: impl Into<String>) -> Self {
        Self {
            kind: SchemaKind::Reference(Reference::new(reference)),
            meta: SchemaMetadata::default(),
        }
    }

    pub fn is_nullable(&self) -> bool {
        self.meta.nullable
    }

    /// The single declared type, if the shape has one.
    pub fn schema_type(&self) -> Option<SchemaType> {
        match &self.kind {
            SchemaKind::Primitive(primitive) => Some(primitive.schema_type),
            SchemaKind::Array(_) => Some(SchemaType::Array),
            SchemaKind::Object(_) => Some(SchemaType::Object),
            _ => None,
        }
    }

    /// Follows `#/components/schemas/...` references until a non-reference schema is found.
    pub fn resolve<'a>(&'a self, components: Option<&'a Components>) -> Result<&'a Schema, ReferenceError> {
        let mut current = self;
        let mut seen_references = HashSet::new();
        while let SchemaKind::Reference(reference) = &current.kind {
            if !seen_references.insert(reference.reference.as_str()) {
                return Err(ReferenceError::cyclic(&reference.reference));
            }
            let name = reference.component_name(SCHEMAS_SECTION)?;
            current = components
                .and_then(|components| components.schemas.get(&name))
                .ok_or_else(|| ReferenceError::unresolved(&reference.reference))?;
        }
        Ok(current)
    }
}

fn check_bounds<T: PartialOrd>(
    lower_name: &'static str,
    lower: Option<T>,
    upper_name: &'static str,
    upper: Option<T>,
) -> Result<(), StructuralError> {
    if let (Some(lower), Some(upper)) = (lower, upper) {
        if lower > upper {
            return Err(StructuralError::invalid_field(
                lower_name,
                format!("must not exceed {}", upper_name),
            ));
        }
    }
    Ok(())
}

impl Validate for Schema {
    fn validate(&self) -> Result<(), StructuralError> {
        self.meta.discriminator.validate().context("discriminator")?;
        self.meta.external_docs.validate().context("externalDocs")?;

        match &self.kind {
            SchemaKind::Any | SchemaKind::Boolean(_) | SchemaKind::Types(_) => Ok(()),
            SchemaKind::Reference(reference) => reference.validate(),
            SchemaKind::Primitive(primitive) => {
                check_bounds("minimum", primitive.minimum, "maximum", primitive.maximum)?;
                check_bounds(
                    "minLength",
                    primitive.min_length,
                    "maxLength",
                    primitive.max_length,
                )
            }
            SchemaKind::Array(array) => {
                check_bounds("minItems", array.min_items, "maxItems", array.max_items)?;
                array.items.validate().context("items")
            }
            SchemaKind::Object(object) => {
                check_bounds(
                    "minProperties",
                    object.min_properties,
                    "maxProperties",
                    object.max_properties,
                )?;
                validate_entries("property", &object.properties)?;
                object
                    .additional_properties
                    .validate()
                    .context("additionalProperties")
            }
            SchemaKind::Composition(composition) => {
                validate_items("allOf", &composition.all_of)?;
                validate_items("oneOf", &composition.one_of)?;
                validate_items("anyOf", &composition.any_of)?;
                composition.not.validate().context("not")?;
                composition.base.validate()
            }
        }
    }
}

/// Selects a schema among `oneOf`/`anyOf` alternatives by a property value.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Discriminator {
    #[serde(default)]
    pub property_name: String,
    #[serde(default)]
    pub mapping: BTreeMap<String, String>,
}

impl Validate for Discriminator {
    fn validate(&self) -> Result<(), StructuralError> {
        require("propertyName", &self.property_name)
    }
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct Xml {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub namespace: Option<String>,
    #[serde(default)]
    pub prefix: Option<String>,
    #[serde(default)]
    pub attribute: Option<bool>,
    #[serde(default)]
    pub wrapped: Option<bool>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawSchema {
    Boolean(bool),
    Object(Box<RawSchemaObject>),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawType {
    Single(String),
    Multiple(Vec<String>),
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
struct RawSchemaObject {
    #[serde(rename = "$ref")]
    reference: Option<String>,
    #[serde(rename = "type")]
    schema_type: Option<RawType>,
    format: Option<String>,
    title: Option<String>,
    description: Option<String>,
    default: Option<Value>,
    example: Option<Value>,
    examples: Option<Vec<Value>>,
    nullable: Option<bool>,
    deprecated: Option<bool>,
    read_only: Option<bool>,
    write_only: Option<bool>,
    discriminator: Option<Discriminator>,
    xml: Option<Xml>,
    external_docs: Option<ExternalDocumentation>,
    #[serde(rename = "enum")]
    enumeration: Option<Vec<Value>>,
    #[serde(rename = "const")]
    constant: Option<Value>,
    minimum: Option<f64>,
    maximum: Option<f64>,
    min_length: Option<u64>,
    max_length: Option<u64>,
    pattern: Option<String>,
    items: Option<Box<RawSchema>>,
    min_items: Option<u64>,
    max_items: Option<u64>,
    unique_items: Option<bool>,
    properties: Option<BTreeMap<String, RawSchema>>,
    required: Option<Vec<String>>,
    additional_properties: Option<Box<RawSchema>>,
    min_properties: Option<u64>,
    max_properties: Option<u64>,
    all_of: Option<Vec<RawSchema>>,
    one_of: Option<Vec<RawSchema>>,
    any_of: Option<Vec<RawSchema>>,
    not: Option<Box<RawSchema>>,
}

impl TryFrom<RawSchema> for Schema {
    type Error = String;

    fn try_from(raw: RawSchema) -> Result<Self, Self::Error> {
        match raw {
            RawSchema::Boolean(accept) => Ok(Schema {
                kind: SchemaKind::Boolean(accept),
                meta: SchemaMetadata::default(),
            }),
            RawSchema::Object(object) => convert_object(*object),
        }
    }
}

fn convert_boxed(raw: Option<Box<RawSchema>>) -> Result<Option<Box<Schema>>, String> {
    raw.map(|raw| Schema::try_from(*raw).map(Box::new))
        .transpose()
}

fn convert_list(keyword: &str, raw: Option<Vec<RawSchema>>) -> Result<Vec<Schema>, String> {
    match raw {
        None => Ok(Vec::new()),
        Some(list) if list.is_empty() => Err(format!("{} must be a non empty array", keyword)),
        Some(list) => list.into_iter().map(Schema::try_from).collect(),
    }
}

fn convert_object(mut raw: RawSchemaObject) -> Result<Schema, String> {
    let mut meta = SchemaMetadata {
        title: raw.title.take(),
        description: raw.description.take(),
        default: raw.default.take(),
        example: raw.example.take(),
        examples: raw.examples.take().unwrap_or_default(),
        nullable: raw.nullable.take().unwrap_or(false),
        deprecated: raw.deprecated.take(),
        read_only: raw.read_only.take(),
        write_only: raw.write_only.take(),
        discriminator: raw.discriminator.take(),
        xml: raw.xml.take(),
        external_docs: raw.external_docs.take(),
    };

    let all_of = raw.all_of.take();
    let one_of = raw.one_of.take();
    let any_of = raw.any_of.take();
    let not = raw.not.take();

    if all_of.is_none() && one_of.is_none() && any_of.is_none() && not.is_none() {
        let kind = convert_kind(raw, &mut meta)?;
        return Ok(Schema { kind, meta });
    }

    let base = match convert_kind(raw, &mut meta)? {
        SchemaKind::Any => None,
        kind => Some(Box::new(Schema {
            kind,
            meta: SchemaMetadata::default(),
        })),
    };
    let composition = CompositionSchema {
        all_of: convert_list("allOf", all_of)?,
        one_of: convert_list("oneOf", one_of)?,
        any_of: convert_list("anyOf", any_of)?,
        not: convert_boxed(not)?,
        base,
    };
    Ok(Schema {
        kind: SchemaKind::Composition(composition),
        meta,
    })
}

fn convert_kind(raw: RawSchemaObject, meta: &mut SchemaMetadata) -> Result<SchemaKind, String> {
    if let Some(reference) = raw.reference {
        return Ok(SchemaKind::Reference(Reference::new(reference)));
    }

    let mut types = match raw.schema_type {
        None => Vec::new(),
        Some(RawType::Single(name)) => vec![SchemaType::from_str(&name)?],
        Some(RawType::Multiple(names)) => names
            .iter()
            .map(|name| SchemaType::from_str(name))
            .collect::<Result<Vec<_>, _>>()?,
    };
    if types.len() > 1 && types.contains(&SchemaType::Null) {
        meta.nullable = true;
        types.retain(|schema_type| *schema_type != SchemaType::Null);
    }

    let looks_like_object =
        raw.properties.is_some() || raw.additional_properties.is_some() || raw.required.is_some();
    let schema_type = match types.as_slice() {
        [] if looks_like_object => SchemaType::Object,
        [] if raw.items.is_some() => SchemaType::Array,
        [] => return Ok(SchemaKind::Any),
        [single] => *single,
        _ => return Ok(SchemaKind::Types(types)),
    };

    let kind = match schema_type {
        SchemaType::Array => SchemaKind::Array(ArraySchema {
            items: convert_boxed(raw.items)?,
            min_items: raw.min_items,
            max_items: raw.max_items,
            unique_items: raw.unique_items,
        }),
        SchemaType::Object => SchemaKind::Object(ObjectSchema {
            properties: raw
                .properties
                .unwrap_or_default()
                .into_iter()
                .map(|(name, raw)| Schema::try_from(raw).map(|schema| (name, schema)))
                .collect::<Result<_, _>>()?,
            required: raw.required.unwrap_or_default(),
            additional_properties: convert_boxed(raw.additional_properties)?,
            min_properties: raw.min_properties,
            max_properties: raw.max_properties,
        }),
        primitive => {
            let mut enumeration = raw.enumeration.unwrap_or_default();
            enumeration.extend(raw.constant);
            SchemaKind::Primitive(PrimitiveSchema {
                schema_type: primitive,
                format: raw.format,
                enumeration,
                minimum: raw.minimum,
                maximum: raw.maximum,
                min_length: raw.min_length,
                max_length: raw.max_length,
                pattern: raw.pattern,
            })
        }
    };
    Ok(kind)
}
