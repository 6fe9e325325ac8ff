use std::{collections::HashMap, hash::Hash, path::PathBuf, sync::Arc};
use tokio::{fs, sync::RwLock};

use crate::errors::ServiceError;

/// Generic JSON file-backed key-value map.
///
/// Persists a `HashMap<K, V>` to a single JSON file. Every write rewrites the
/// whole file while holding the write lock, so concurrent inserts never race
/// each other on disk.
pub struct JsonMapStore<K, V> {
    inner: RwLock<HashMap<K, V>>,
    file_path: PathBuf,
}

impl<K, V> JsonMapStore<K, V>
where
    K: Eq + Hash + serde::Serialize + serde::de::DeserializeOwned + Clone,
    V: serde::Serialize + serde::de::DeserializeOwned + Clone,
{
    /// Initialize the store from a path. Creates the file with an empty map if missing.
    pub async fn new<P: Into<PathBuf>>(path: P) -> Result<Arc<Self>, ServiceError> {
        let file_path = path.into();
        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent).await.ok();
        }

        let map: HashMap<K, V> = match fs::read(&file_path).await {
            Ok(bytes) => serde_json::from_slice(&bytes).map_err(|e| {
                ServiceError::store(format!("corrupt store file {}", file_path.display()), e)
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let empty: HashMap<K, V> = HashMap::new();
                let data = serde_json::to_vec(&empty).map_err(|e| ServiceError::store("encode store file", e))?;
                fs::write(&file_path, data)
                    .await
                    .map_err(|e| ServiceError::store(format!("create {}", file_path.display()), e))?;
                empty
            }
            Err(e) => return Err(ServiceError::store(format!("read {}", file_path.display()), e)),
        };

        Ok(Arc::new(Self { inner: RwLock::new(map), file_path }))
    }

    async fn save(&self, map: &HashMap<K, V>) -> Result<(), ServiceError> {
        let data = serde_json::to_vec(map).map_err(|e| ServiceError::store("encode store file", e))?;
        fs::write(&self.file_path, data)
            .await
            .map_err(|e| ServiceError::store(format!("write {}", self.file_path.display()), e))?;
        Ok(())
    }

    /// All values, in map iteration order.
    pub async fn values(&self) -> Vec<V> {
        let map = self.inner.read().await;
        map.values().cloned().collect()
    }

    /// Insert or overwrite a value and persist.
    ///
    /// If persisting fails the in-memory map is restored to its previous state.
    pub async fn insert(&self, key: K, value: V) -> Result<(), ServiceError> {
        let mut map = self.inner.write().await;
        let previous = map.insert(key.clone(), value);
        if let Err(e) = self.save(&map).await {
            match previous {
                Some(old) => { map.insert(key, old); }
                None => { map.remove(&key); }
            }
            return Err(e);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn json_map_store_insert_persists() -> Result<(), anyhow::Error> {
        let tmp = std::env::temp_dir().join(format!("json_map_store_{}.json", uuid::Uuid::new_v4()));
        let store = JsonMapStore::<String, String>::new(&tmp).await?;

        // initially empty
        assert_eq!(store.values().await.len(), 0);

        store.insert("a".into(), "1".into()).await?;
        store.insert("b".into(), "2".into()).await?;
        let mut values = store.values().await;
        values.sort();
        assert_eq!(values, vec!["1".to_string(), "2".to_string()]);

        // overwrite is unconditional
        store.insert("a".into(), "10".into()).await?;

        let reloaded = JsonMapStore::<String, String>::new(&tmp).await?;
        let mut values = reloaded.values().await;
        values.sort();
        assert_eq!(values, vec!["10".to_string(), "2".to_string()]);

        let _ = tokio::fs::remove_file(&tmp).await;
        Ok(())
    }

    #[tokio::test]
    async fn corrupt_file_is_a_store_error() -> Result<(), anyhow::Error> {
        let tmp = std::env::temp_dir().join(format!("json_map_store_bad_{}.json", uuid::Uuid::new_v4()));
        tokio::fs::write(&tmp, b"{not json").await?;

        let err = JsonMapStore::<String, String>::new(&tmp).await.err().expect("corrupt file must fail");
        assert_eq!(err.kind(), "StoreError");

        let _ = tokio::fs::remove_file(&tmp).await;
        Ok(())
    }
}
