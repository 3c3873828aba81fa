//! In-memory storage implementation.

use super::{BlobStore, BoxFuture, DocumentStore, StorageError, StorageResult};
use crate::notebook::Notebook;
use std::collections::HashMap;
use std::sync::RwLock;
use uuid::Uuid;

/// In-memory storage for testing and ephemeral use.
///
/// Notebooks are kept as serialized JSON so a load behaves like a load
/// from any other backend (fresh history, clean flag).
#[derive(Default)]
pub struct MemoryStorage {
    documents: RwLock<HashMap<String, String>>,
    blobs: RwLock<HashMap<String, Vec<u8>>>,
}

fn lock_error(e: impl std::fmt::Display) -> StorageError {
    StorageError::Other(format!("Lock error: {e}"))
}

impl MemoryStorage {
    /// Create a new empty memory storage.
    pub fn new() -> Self {
        Self::default()
    }

    /// Bytes previously uploaded under `path`.
    pub fn blob(&self, path: &str) -> Option<Vec<u8>> {
        self.blobs.read().ok()?.get(path).cloned()
    }

    fn write_document(&self, key: String, notebook: &Notebook) -> StorageResult<()> {
        let json = notebook
            .to_json()
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
        self.documents.write().map_err(lock_error)?.insert(key, json);
        Ok(())
    }
}

impl DocumentStore for MemoryStorage {
    fn load(&self, key: &str) -> BoxFuture<'_, StorageResult<Notebook>> {
        let key = key.to_string();
        Box::pin(async move {
            let json = {
                let docs = self.documents.read().map_err(lock_error)?;
                docs.get(&key).cloned().ok_or_else(|| StorageError::NotFound(key.clone()))?
            };
            let mut notebook =
                Notebook::from_json(&json).map_err(|e| StorageError::Serialization(e.to_string()))?;
            notebook.id = Some(key);
            Ok(notebook)
        })
    }

    fn insert(&self, notebook: &Notebook) -> BoxFuture<'_, StorageResult<String>> {
        let key = Uuid::new_v4().to_string();
        let mut notebook = notebook.clone();
        notebook.id = Some(key.clone());
        Box::pin(async move {
            self.write_document(key.clone(), &notebook)?;
            Ok(key)
        })
    }

    fn update(&self, key: &str, notebook: &Notebook) -> BoxFuture<'_, StorageResult<()>> {
        let key = key.to_string();
        let result = self.write_document(key, notebook);
        Box::pin(async move { result })
    }

    fn delete(&self, key: &str) -> BoxFuture<'_, StorageResult<()>> {
        let key = key.to_string();
        Box::pin(async move {
            self.documents.write().map_err(lock_error)?.remove(&key);
            Ok(())
        })
    }

    fn list(&self) -> BoxFuture<'_, StorageResult<Vec<String>>> {
        Box::pin(async move {
            let docs = self.documents.read().map_err(lock_error)?;
            Ok(docs.keys().cloned().collect())
        })
    }
}

impl BlobStore for MemoryStorage {
    fn upload(&self, path: &str, bytes: &[u8]) -> BoxFuture<'_, StorageResult<String>> {
        let path = path.to_string();
        let bytes = bytes.to_vec();
        Box::pin(async move {
            self.blobs.write().map_err(lock_error)?.insert(path.clone(), bytes);
            Ok(format!("memory://{path}"))
        })
    }
}
