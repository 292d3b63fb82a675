use crate::model::OpenApi;
use crate::validator::OpenApiRequestValidator;
use crate::validator::builder::{OpenApiRequestValidatorBuilder, ValidatorBuilderError};
use dashmap::{DashMap, Entry};
use std::fmt::{Debug, Display, Formatter};
use std::hash::Hash;
use std::path::Path;
use std::sync::{Arc, OnceLock};

static GLOBAL_CACHE: OnceLock<ValidatorCollection<String>> = OnceLock::new();

/// A process wide collection keyed by API name.
pub fn global_validator_cache() -> &'static ValidatorCollection<String> {
    GLOBAL_CACHE.get_or_init(ValidatorCollection::new)
}

/// Error types for cache operations
#[derive(Debug)]
pub enum CacheError {
    /// The validator with the specified ID was not found in the cache
    ValidatorNotFound,
    /// The validator with the specified ID already exists in the cache
    ValidatorAlreadyExists,
    /// Attempted to create a new validator but failed.
    FailedToCreateValidator(ValidatorBuilderError),
}

impl Display for CacheError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            CacheError::ValidatorNotFound => write!(f, "Validator not found in cache"),
            CacheError::ValidatorAlreadyExists => write!(f, "Validator already exists in cache"),
            CacheError::FailedToCreateValidator(err) => {
                write!(f, "Failed to create new validator: {}", err)
            }
        }
    }
}

impl std::error::Error for CacheError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CacheError::FailedToCreateValidator(err) => Some(err),
            _ => None,
        }
    }
}

/// Built validators shared between request handlers.
pub struct ValidatorCollection<K> {
    cache: DashMap<K, Arc<OpenApiRequestValidator>>,
}

impl<K> Default for ValidatorCollection<K>
where
    K: Hash + Eq + Debug,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K> ValidatorCollection<K>
where
    K: Hash + Eq + Debug,
{
    pub fn new() -> Self {
        ValidatorCollection {
            cache: DashMap::new(),
        }
    }

    /// Loads, validates and stores the document at `file_path` with default options.
    pub fn insert_from_file_path<P>(
        &self,
        id: K,
        file_path: P,
    ) -> Result<Arc<OpenApiRequestValidator>, CacheError>
    where
        P: AsRef<Path>,
    {
        let builder = OpenApiRequestValidator::builder().file(file_path.as_ref());
        self.insert_with(id, builder)
    }

    pub fn insert(&self, id: K, document: OpenApi) -> Result<Arc<OpenApiRequestValidator>, CacheError> {
        self.insert_with(id, OpenApiRequestValidator::builder().document(document))
    }

    /// Builds the validator only when `id` is not taken yet.
    ///
    /// The build runs outside the shard lock. When two callers race on the
    /// same id the first insert wins and the other build is discarded.
    pub fn insert_with(
        &self,
        id: K,
        builder: OpenApiRequestValidatorBuilder,
    ) -> Result<Arc<OpenApiRequestValidator>, CacheError> {
        if self.cache.contains_key(&id) {
            log::debug!("Validator {:?} already cached", id);
            return Err(CacheError::ValidatorAlreadyExists);
        }
        let validator = Arc::new(builder.build().map_err(CacheError::FailedToCreateValidator)?);
        match self.cache.entry(id) {
            Entry::Occupied(entry) => {
                log::debug!("Validator {:?} cached while building, discarding", entry.key());
                Err(CacheError::ValidatorAlreadyExists)
            }
            Entry::Vacant(entry) => {
                log::debug!("Cached validator {:?}", entry.key());
                entry.insert(Arc::clone(&validator));
                Ok(validator)
            }
        }
    }

    pub fn get(&self, id: &K) -> Result<Arc<OpenApiRequestValidator>, CacheError> {
        match self.cache.get(id) {
            Some(validator) => Ok(Arc::clone(validator.value())),
            None => Err(CacheError::ValidatorNotFound),
        }
    }

    pub fn remove(&self, id: &K) -> Result<(), CacheError> {
        if self.cache.remove(id).is_none() {
            return Err(CacheError::ValidatorNotFound);
        }
        log::debug!("Removed validator {:?}", id);
        Ok(())
    }

    pub fn contains(&self, id: &K) -> bool {
        self.cache.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    pub fn clear(&self) {
        self.cache.clear();
        log::debug!("Cleared validator cache");
    }
}

#[cfg(test)]
mod tests {
    use crate::cache::{CacheError, ValidatorCollection, global_validator_cache};
    use crate::model::OpenApi;
    use crate::validator::OpenApiRequestValidator;
    use crate::validator::builder::ValidatorBuilderError;
    use serde_json::json;
    use std::sync::Arc;

    const PETSTORE_YAML: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/testdata/petstore.yaml");

    fn minimal() -> OpenApi {
        serde_json::from_value(json!({
            "openapi": "3.1.0",
            "info": { "title": "Petstore", "version": "1.0.0" }
        }))
        .unwrap()
    }

    #[test]
    fn test_cache_get_insert() {
        let cache = ValidatorCollection::new();
        assert!(matches!(cache.get(&"test"), Err(CacheError::ValidatorNotFound)));
        let validator = cache.insert("test", minimal()).unwrap();
        assert!(!cache.is_empty());
        assert_eq!(cache.len(), 1);
        let cached = cache.get(&"test").unwrap();
        assert!(Arc::ptr_eq(&validator, &cached));
    }

    #[test]
    fn test_cache_rejects_duplicate_id() {
        let cache = ValidatorCollection::new();
        cache.insert("test", minimal()).unwrap();
        let result = cache.insert("test", minimal());
        if let Err(err @ CacheError::ValidatorAlreadyExists) = result {
            assert_eq!(err.to_string(), "Validator already exists in cache");
        } else {
            panic!("Expected CacheError::ValidatorAlreadyExists");
        }
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_cache_insert_from_file_path() {
        let cache = ValidatorCollection::new();
        let validator = cache.insert_from_file_path("petstore", PETSTORE_YAML).unwrap();
        assert_eq!(
            validator.validate("GET", "/pets").unwrap().operation_id(),
            Some("listPets")
        );

        let result = cache.insert_from_file_path("missing", "testdata/missing.yaml");
        if let Err(CacheError::FailedToCreateValidator(ValidatorBuilderError::LoadFailure(_))) =
            result
        {
            assert!(!cache.contains(&"missing"));
        } else {
            panic!("Expected CacheError::FailedToCreateValidator");
        }
    }

    #[test]
    fn test_cache_duplicate_id_skips_build() {
        let cache = ValidatorCollection::new();
        cache.insert("petstore", minimal()).unwrap();
        let builder = OpenApiRequestValidator::builder().file("testdata/missing.yaml");
        let result = cache.insert_with("petstore", builder);
        assert!(matches!(result, Err(CacheError::ValidatorAlreadyExists)));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_cache_concurrent_inserts_keep_one_validator() {
        let cache = Arc::new(ValidatorCollection::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let cache = Arc::clone(&cache);
                std::thread::spawn(move || cache.insert("shared", minimal()))
            })
            .collect();
        let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
        assert!(
            results
                .iter()
                .filter_map(|r| r.as_ref().err())
                .all(|err| matches!(err, CacheError::ValidatorAlreadyExists))
        );
        let winner = results.into_iter().find_map(Result::ok).unwrap();
        assert!(Arc::ptr_eq(&winner, &cache.get(&"shared").unwrap()));
    }

    #[test]
    fn test_cache_insert_with_builder() {
        let cache = ValidatorCollection::new();
        let builder = OpenApiRequestValidator::builder()
            .file(PETSTORE_YAML)
            .base_path("/v1");
        let validator = cache.insert_with(1u32, builder).unwrap();
        assert_eq!(validator.base_path(), Some("/v1"));
        assert!(cache.contains(&1));
    }

    #[test]
    fn test_cache_remove_and_clear() {
        let cache = ValidatorCollection::new();
        cache.insert("test1".to_string(), minimal()).unwrap();
        cache.insert("test2".to_string(), minimal()).unwrap();
        cache.insert("test3".to_string(), minimal()).unwrap();
        assert_eq!(cache.len(), 3);

        assert!(cache.remove(&"test1".to_string()).is_ok());
        assert!(matches!(
            cache.remove(&"test1".to_string()),
            Err(CacheError::ValidatorNotFound)
        ));
        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn test_global_cache() {
        let cache = global_validator_cache();
        cache.insert("global_test".to_string(), minimal()).unwrap();
        let same_cache = global_validator_cache();
        assert!(same_cache.get(&"global_test".to_string()).is_ok());
        assert!(cache.remove(&"global_test".to_string()).is_ok());
    }
}
