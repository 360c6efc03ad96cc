//! Key-value storage injected into the planner services
//!
//! Services never touch global state: each one is constructed with a store
//! and keeps its JSON records under fixed keys.

mod memory;
mod file;

pub use memory::MemoryStore;
pub use file::{FileStore, DEFAULT_STORE_DIR};

use rand::Rng;
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("store i/o failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("stored record is not valid json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid store key: {0:?}")]
    InvalidKey(String),
}

/// String-keyed, string-valued storage
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&mut self, key: &str, value: String) -> Result<(), StoreError>;
    fn remove(&mut self, key: &str) -> Result<(), StoreError>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for Box<S> {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), StoreError> {
        (**self).set(key, value)
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        (**self).remove(key)
    }
}

const ID_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Length of generated record identifiers
pub const ID_LEN: usize = 9;

/// Random lowercase base-36 identifier for a stored record
pub fn generate_id() -> String {
    let mut rng = rand::thread_rng();
    (0..ID_LEN)
        .map(|_| ID_ALPHABET[rng.gen_range(0..ID_ALPHABET.len())] as char)
        .collect()
}

/// Read and decode a JSON record, `None` when the key is absent
pub fn read_json<T, S>(store: &S, key: &str) -> Result<Option<T>, StoreError>
where
    T: DeserializeOwned,
    S: KeyValueStore + ?Sized,
{
    match store.get(key)? {
        Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
        None => Ok(None),
    }
}

/// Encode and write a JSON record
pub fn write_json<T, S>(store: &mut S, key: &str, value: &T) -> Result<(), StoreError>
where
    T: Serialize + ?Sized,
    S: KeyValueStore + ?Sized,
{
    let raw = serde_json::to_string(value)?;
    store.set(key, raw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inputs::Levers;

    #[test]
    fn test_json_helpers_round_trip_through_boxed_store() {
        let mut store: Box<dyn KeyValueStore> = Box::new(MemoryStore::new());
        let levers = Levers { add_hires: 2, ..Default::default() };

        write_json(&mut store, "levers", &levers).unwrap();
        let loaded: Option<Levers> = read_json(&store, "levers").unwrap();
        assert_eq!(loaded, Some(levers));

        let missing: Option<Levers> = read_json(&store, "nothing").unwrap();
        assert!(missing.is_none());
    }

    #[test]
    fn test_generate_id_shape() {
        let id = generate_id();
        assert_eq!(id.len(), ID_LEN);
        assert!(id.chars().all(|c| c.is_ascii_digit() || c.is_ascii_lowercase()));
        assert_ne!(generate_id(), generate_id());
    }

    #[test]
    fn test_corrupt_record_is_an_error() {
        let mut store = MemoryStore::new();
        store.set("levers", "{not json".to_string()).unwrap();
        let result: Result<Option<Levers>, _> = read_json(&store, "levers");
        assert!(matches!(result, Err(StoreError::Json(_))));
    }
}
