//! Storage abstraction for notebook persistence and image uploads.

mod autosave;
mod file;
mod memory;

pub use autosave::{AutoSave, DEFAULT_AUTOSAVE_DELAY_SECS};
pub use file::FileStorage;
pub use memory::MemoryStorage;

use crate::notebook::Notebook;
use std::future::Future;
use std::pin::Pin;
use thiserror::Error;

/// Storage errors.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Document not found: {0}")]
    NotFound(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("IO error: {0}")]
    Io(String),
    #[error("Storage error: {0}")]
    Other(String),
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Boxed future for async collaborator calls.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a>>;

/// Whole-notebook document store.
///
/// The notebook is an opaque blob to the store; conflicts between sessions
/// resolve as last-writer-wins.
pub trait DocumentStore: Send + Sync {
    /// Load a notebook by key.
    fn load(&self, key: &str) -> BoxFuture<'_, StorageResult<Notebook>>;

    /// Store a notebook that has never been saved. Returns the new key.
    fn insert(&self, notebook: &Notebook) -> BoxFuture<'_, StorageResult<String>>;

    /// Overwrite the notebook stored under `key`.
    fn update(&self, key: &str, notebook: &Notebook) -> BoxFuture<'_, StorageResult<()>>;

    /// Delete a notebook. Deleting a missing key is not an error.
    fn delete(&self, key: &str) -> BoxFuture<'_, StorageResult<()>>;

    /// List all notebook keys.
    fn list(&self) -> BoxFuture<'_, StorageResult<Vec<String>>>;
}

/// Store for embedded image bytes.
pub trait BlobStore: Send + Sync {
    /// Store `bytes` under `path` and return a stable URL for them.
    fn upload(&self, path: &str, bytes: &[u8]) -> BoxFuture<'_, StorageResult<String>>;
}

/// Persist `notebook`: insert on first save (recording the new key),
/// update afterwards. Marks the notebook clean on success and leaves it
/// untouched on failure.
pub async fn save_notebook(store: &dyn DocumentStore, notebook: &mut Notebook) -> StorageResult<String> {
    let key = match notebook.id.clone() {
        Some(key) => {
            store.update(&key, notebook).await?;
            key
        }
        None => {
            let key = store.insert(notebook).await?;
            notebook.id = Some(key.clone());
            key
        }
    };
    notebook.mark_clean();
    log::info!("Saved notebook '{}' as {key}", notebook.name);
    Ok(key)
}

/// Keep only characters that are safe in a file name.
pub(crate) fn sanitize_key(key: &str) -> String {
    key.chars()
        .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' || c == '.' { c } else { '_' })
        .collect()
}
