use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// The JSON Schema `type` keyword values.
#[derive(PartialEq, Eq, Debug, Clone, Copy, PartialOrd, Ord)]
pub enum SchemaType {
    Null,
    Boolean,
    Integer,
    Number,
    String,
    Array,
    Object,
}

impl SchemaType {
    pub const ALLOWED: &'static [&'static str] = &[
        "null", "boolean", "integer", "number", "string", "array", "object",
    ];
}

impl Display for SchemaType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            SchemaType::Null => write!(f, "null"),
            SchemaType::Boolean => write!(f, "boolean"),
            SchemaType::Integer => write!(f, "integer"),
            SchemaType::Number => write!(f, "number"),
            SchemaType::String => write!(f, "string"),
            SchemaType::Array => write!(f, "array"),
            SchemaType::Object => write!(f, "object"),
        }
    }
}

impl FromStr for SchemaType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "null" => Ok(SchemaType::Null),
            "boolean" => Ok(SchemaType::Boolean),
            "integer" => Ok(SchemaType::Integer),
            "number" => Ok(SchemaType::Number),
            "string" => Ok(SchemaType::String),
            "array" => Ok(SchemaType::Array),
            "object" => Ok(SchemaType::Object),
            other => Err(format!(
                "unknown schema type \"{}\", expected one of {}",
                other,
                SchemaType::ALLOWED.join(", ")
            )),
        }
    }
}

#[cfg(test)]
mod test {
    use crate::types::primitive::SchemaType;
    use std::str::FromStr;

    #[test]
    fn test_parse_known_types() {
        for name in SchemaType::ALLOWED {
            let parsed = SchemaType::from_str(name).unwrap();
            assert_eq!(parsed.to_string(), *name);
        }
    }

    #[test]
    fn test_parse_unknown_type() {
        let err = SchemaType::from_str("bool").unwrap_err();
        assert!(err.contains("unknown schema type \"bool\""));
    }
}
