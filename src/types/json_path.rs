use crate::{ENCODED_SLASH, ENCODED_TILDE, PATH_SEPARATOR, TILDE};
use std::borrow::Cow;

/// A JSON pointer held as a list of escaped reference tokens.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct JsonPath(pub Vec<String>);

impl JsonPath {
    pub fn new() -> Self {
        JsonPath(Vec::new())
    }

    /// Parses the pointer part of a reference (`/components/schemas/Pet`).
    ///
    /// Returns `None` when the pointer is not absolute.
    pub fn from_pointer(pointer: &str) -> Option<Self> {
        if pointer.is_empty() {
            return Some(JsonPath::new());
        }
        let rest = pointer.strip_prefix(PATH_SEPARATOR)?;
        Some(JsonPath(
            rest.split(PATH_SEPARATOR).map(str::to_owned).collect(),
        ))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The unescaped token at `idx`.
    pub fn segment(&self, idx: usize) -> Option<Cow<'_, str>> {
        let raw = self.0.get(idx)?;
        if raw.contains(TILDE) {
            Some(Cow::Owned(
                raw.replace(ENCODED_SLASH, PATH_SEPARATOR)
                    .replace(ENCODED_TILDE, TILDE),
            ))
        } else {
            Some(Cow::Borrowed(raw))
        }
    }
}

#[cfg(test)]
mod test {
    use crate::types::json_path::JsonPath;

    #[test]
    fn test_new_json_path() {
        let path = JsonPath::new();
        assert!(path.is_empty());
        assert_eq!(path.len(), 0);
        assert!(path.segment(0).is_none());
    }

    #[test]
    fn test_from_pointer_decodes_segments() {
        let path = JsonPath::from_pointer("/paths/~1pets~1{petId}/get").unwrap();
        assert_eq!(path.len(), 3);
        assert_eq!(path.segment(0).unwrap(), "paths");
        assert_eq!(path.segment(1).unwrap(), "/pets/{petId}");
        assert_eq!(path.segment(2).unwrap(), "get");
        assert!(path.segment(3).is_none());
    }

    #[test]
    fn test_from_pointer_decodes_escaped_tilde_last() {
        // "~01" is a literal "~1", not a slash.
        let path = JsonPath::from_pointer("/a~01b").unwrap();
        assert_eq!(path.segment(0).unwrap(), "a~1b");
    }

    #[test]
    fn test_from_pointer_requires_leading_slash() {
        assert!(JsonPath::from_pointer("components/schemas").is_none());
        assert!(JsonPath::from_pointer("").unwrap().is_empty());
    }
}
