use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

fn scalar_to_string(value: Value) -> Result<String, String> {
    match value {
        Value::String(text) => Ok(text),
        Value::Number(number) => Ok(number.to_string()),
        Value::Bool(flag) => Ok(flag.to_string()),
        Value::Null => Ok(String::new()),
        Value::Array(_) => Err("invalid type: sequence, expected a string".to_string()),
        Value::Object(_) => Err("invalid type: map, expected a string".to_string()),
    }
}

/// A string field that YAML may have written as a plain scalar, e.g. `version: 1.0`.
pub(crate) fn scalar_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    scalar_to_string(Value::deserialize(deserializer)?).map_err(D::Error::custom)
}

pub(crate) fn scalar_strings<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<Vec<Value>>::deserialize(deserializer)?
        .map(|values| values.into_iter().map(scalar_to_string).collect())
        .transpose()
        .map_err(D::Error::custom)
}

#[cfg(test)]
mod test {
    use crate::model::scalar::{scalar_string, scalar_strings};
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Deserialize)]
    struct Versioned {
        #[serde(default, deserialize_with = "scalar_string")]
        version: String,
        #[serde(default, deserialize_with = "scalar_strings")]
        values: Option<Vec<String>>,
    }

    #[test]
    fn test_plain_scalars_become_strings() {
        let parsed: Versioned = serde_json::from_value(json!({
            "version": 1.0,
            "values": [8080, true, "https"]
        }))
        .unwrap();
        assert_eq!(parsed.version, "1.0");
        assert_eq!(
            parsed.values,
            Some(vec!["8080".to_string(), "true".to_string(), "https".to_string()])
        );

        let parsed: Versioned = serde_json::from_value(json!({ "version": 2 })).unwrap();
        assert_eq!(parsed.version, "2");
        assert_eq!(parsed.values, None);
    }

    #[test]
    fn test_structured_values_are_rejected() {
        let result = serde_json::from_value::<Versioned>(json!({ "version": { "major": 1 } }));
        assert!(
            result
                .err()
                .is_some_and(|err| err.to_string().contains("expected a string"))
        );
    }
}
