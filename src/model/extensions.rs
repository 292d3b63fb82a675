use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::collections::BTreeMap;

const EXTENSION_PREFIX: &str = "x-";

/// Specification extensions (`x-*` keys) attached to an object.
///
/// Used with `#[serde(flatten)]`; every other unknown key is dropped.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Extensions(BTreeMap<String, Value>);

impl Extensions {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }
}

impl<'de> Deserialize<'de> for Extensions {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let mut map = BTreeMap::<String, Value>::deserialize(deserializer)?;
        map.retain(|key, _| key.starts_with(EXTENSION_PREFIX));
        Ok(Extensions(map))
    }
}
