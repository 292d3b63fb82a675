use crate::error::StructuralError;
use std::fmt::Display;

/// Structural invariant check implemented by every entity of the document graph.
///
/// Validation takes no outside context. It reports the first violation found and
/// wraps errors bubbling up from child entities with the child's field name.
pub trait Validate {
    fn validate(&self) -> Result<(), StructuralError>;
}

impl<T: Validate> Validate for Option<T> {
    fn validate(&self) -> Result<(), StructuralError> {
        match self {
            None => Ok(()),
            Some(inner) => inner.validate(),
        }
    }
}

impl<T: Validate + ?Sized> Validate for Box<T> {
    fn validate(&self) -> Result<(), StructuralError> {
        self.as_ref().validate()
    }
}

pub(crate) trait Context {
    fn context(self, context: impl Into<String>) -> Self;
}

impl Context for Result<(), StructuralError> {
    fn context(self, context: impl Into<String>) -> Self {
        self.map_err(|e| e.within(context))
    }
}

/// Fails when `value` is empty.
pub(crate) fn require(field: &'static str, value: &str) -> Result<(), StructuralError> {
    if value.is_empty() {
        return Err(StructuralError::field_required(field));
    }
    Ok(())
}

/// Fails when both sides of a pair are present.
pub(crate) fn exclusive(
    first: &'static str,
    first_present: bool,
    second: &'static str,
    second_present: bool,
) -> Result<(), StructuralError> {
    if first_present && second_present {
        return Err(StructuralError::mutually_exclusive(first, second));
    }
    Ok(())
}

/// Validates every keyed entry, naming the failing one as `<label> "<key>"`.
pub(crate) fn validate_entries<'a, K, V, I>(label: &str, entries: I) -> Result<(), StructuralError>
where
    K: Display + 'a,
    V: Validate + 'a,
    I: IntoIterator<Item = (&'a K, &'a V)>,
{
    for (key, value) in entries {
        value
            .validate()
            .context(format!("{} \"{}\"", label, key))?;
    }
    Ok(())
}

/// Validates every list item, naming the failing one as `<label>`.
pub(crate) fn validate_items<'a, V, I>(label: &str, items: I) -> Result<(), StructuralError>
where
    V: Validate + 'a,
    I: IntoIterator<Item = &'a V>,
{
    for item in items {
        item.validate().context(label)?;
    }
    Ok(())
}

#[cfg(test)]
mod test {
    use crate::error::StructuralError;
    use crate::validate::{Context, exclusive, require, validate_entries};
    use crate::validate::Validate;
    use std::collections::BTreeMap;

    struct Named(&'static str);

    impl Validate for Named {
        fn validate(&self) -> Result<(), StructuralError> {
            require("name", self.0)
        }
    }

    #[test]
    fn test_require_rejects_empty() {
        assert!(require("name", "pet").is_ok());
        assert_eq!(
            require("name", "").unwrap_err().to_string(),
            "name is required"
        );
    }

    #[test]
    fn test_exclusive_allows_one_side() {
        assert!(exclusive("identifier", true, "url", false).is_ok());
        assert!(exclusive("identifier", false, "url", true).is_ok());
        assert!(exclusive("identifier", false, "url", false).is_ok());
        assert_eq!(
            exclusive("identifier", true, "url", true)
                .unwrap_err()
                .to_string(),
            "identifier and url are mutually exclusive"
        );
    }

    #[test]
    fn test_validate_entries_names_failing_key() {
        let mut entries = BTreeMap::new();
        entries.insert("a", Named("ok"));
        entries.insert("b", Named(""));
        let err = validate_entries("variable", &entries).unwrap_err();
        assert_eq!(err.to_string(), "invalid variable \"b\": name is required");
    }

    #[test]
    fn test_context_wraps_error() {
        let result: Result<(), StructuralError> =
            Err(StructuralError::field_required("url")).context("externalDocs");
        assert_eq!(
            result.unwrap_err().to_string(),
            "invalid externalDocs: url is required"
        );
        assert!(Ok::<(), StructuralError>(()).context("unused").is_ok());
    }

    #[test]
    fn test_option_validate() {
        let absent: Option<Named> = None;
        assert!(absent.validate().is_ok());
        assert!(Some(Named("")).validate().is_err());
    }
}
