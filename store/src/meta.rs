//! Metadata storage trait.

use crate::StoreError;

/// Schema version written by this build.
pub const CURRENT_SCHEMA_VERSION: u32 = 1;

const SCHEMA_VERSION_KEY: &str = "schema_version";

/// Key-value store for internal bookkeeping (schema version, last start).
pub trait MetaStore {
    /// Store a metadata value, replacing any previous one.
    fn put_meta(&self, key: &str, value: &[u8]) -> Result<(), StoreError>;

    /// Retrieve a metadata value, `None` when absent.
    fn get_meta(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError>;

    /// Delete a metadata entry. Deleting a missing key is not an error.
    fn delete_meta(&self, key: &str) -> Result<(), StoreError>;

    /// Current schema version; `0` for a fresh database.
    fn schema_version(&self) -> Result<u32, StoreError> {
        match self.get_meta(SCHEMA_VERSION_KEY)? {
            None => Ok(0),
            Some(bytes) => {
                let arr: [u8; 4] = bytes.as_slice().try_into().map_err(|_| {
                    StoreError::Serialization("schema_version has unexpected byte length".into())
                })?;
                Ok(u32::from_le_bytes(arr))
            }
        }
    }

    fn set_schema_version(&self, version: u32) -> Result<(), StoreError> {
        self.put_meta(SCHEMA_VERSION_KEY, &version.to_le_bytes())
    }

    /// Stamp a fresh database with [`CURRENT_SCHEMA_VERSION`] and refuse one
    /// written by a newer build.
    fn ensure_schema(&self) -> Result<u32, StoreError> {
        let found = self.schema_version()?;
        if found == 0 {
            self.set_schema_version(CURRENT_SCHEMA_VERSION)?;
            return Ok(CURRENT_SCHEMA_VERSION);
        }
        if found > CURRENT_SCHEMA_VERSION {
            return Err(StoreError::UnsupportedSchema {
                found,
                supported: CURRENT_SCHEMA_VERSION,
            });
        }
        Ok(found)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::HashMap;

    #[derive(Default)]
    struct MemMeta(RefCell<HashMap<String, Vec<u8>>>);

    impl MetaStore for MemMeta {
        fn put_meta(&self, key: &str, value: &[u8]) -> Result<(), StoreError> {
            self.0.borrow_mut().insert(key.to_string(), value.to_vec());
            Ok(())
        }

        fn get_meta(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
            Ok(self.0.borrow().get(key).cloned())
        }

        fn delete_meta(&self, key: &str) -> Result<(), StoreError> {
            self.0.borrow_mut().remove(key);
            Ok(())
        }
    }

    #[test]
    fn fresh_store_is_stamped_with_current_schema() {
        let store = MemMeta::default();
        assert_eq!(store.schema_version().unwrap(), 0);
        assert_eq!(store.ensure_schema().unwrap(), CURRENT_SCHEMA_VERSION);
        assert_eq!(store.schema_version().unwrap(), CURRENT_SCHEMA_VERSION);
    }

    #[test]
    fn newer_schema_is_refused() {
        let store = MemMeta::default();
        store.set_schema_version(CURRENT_SCHEMA_VERSION + 1).unwrap();
        assert!(matches!(
            store.ensure_schema(),
            Err(StoreError::UnsupportedSchema { .. })
        ));
    }

    #[test]
    fn malformed_schema_value_is_a_serialization_error() {
        let store = MemMeta::default();
        store.put_meta(SCHEMA_VERSION_KEY, &[1, 2]).unwrap();
        assert!(matches!(
            store.schema_version(),
            Err(StoreError::Serialization(_))
        ));
    }
}
