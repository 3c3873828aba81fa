//! File-based storage implementation.

use super::{BlobStore, BoxFuture, DocumentStore, StorageError, StorageResult, sanitize_key};
use crate::notebook::Notebook;
use std::fs;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// File-based storage.
///
/// Notebooks are JSON files under `<base>/notebooks/`; uploaded images are
/// written under `<base>/blobs/` and addressed with `file://` URLs.
pub struct FileStorage {
    base_path: PathBuf,
}

fn io_error(action: &str, path: &Path, e: std::io::Error) -> StorageError {
    StorageError::Io(format!("Failed to {action} {}: {e}", path.display()))
}

impl FileStorage {
    /// Create a new file storage with the given base directory.
    ///
    /// Creates the directory if it doesn't exist.
    pub fn new(base_path: PathBuf) -> StorageResult<Self> {
        for dir in [base_path.join("notebooks"), base_path.join("blobs")] {
            fs::create_dir_all(&dir).map_err(|e| io_error("create", &dir, e))?;
        }
        Ok(Self { base_path })
    }

    /// Create file storage in the platform data directory
    /// (e.g. `~/.local/share/moleskine/`).
    pub fn default_location() -> StorageResult<Self> {
        let base = dirs::data_local_dir()
            .or_else(dirs::home_dir)
            .ok_or_else(|| StorageError::Io("Could not determine home directory".to_string()))?;
        Self::new(base.join("moleskine"))
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    fn notebook_path(&self, key: &str) -> PathBuf {
        self.base_path
            .join("notebooks")
            .join(format!("{}.json", sanitize_key(key)))
    }

    fn blob_path(&self, path: &str) -> PathBuf {
        let mut out = self.base_path.join("blobs");
        for part in path.split('/').filter(|p| !p.is_empty() && *p != "." && *p != "..") {
            out.push(sanitize_key(part));
        }
        out
    }

    fn write_notebook(&self, key: &str, notebook: &Notebook) -> StorageResult<()> {
        let path = self.notebook_path(key);
        let mut notebook = notebook.clone();
        notebook.id = Some(key.to_string());
        let json = notebook
            .to_json()
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
        fs::write(&path, json).map_err(|e| io_error("write", &path, e))
    }
}

impl DocumentStore for FileStorage {
    fn load(&self, key: &str) -> BoxFuture<'_, StorageResult<Notebook>> {
        let path = self.notebook_path(key);
        let key = key.to_string();
        Box::pin(async move {
            if !path.exists() {
                return Err(StorageError::NotFound(key));
            }
            let json = fs::read_to_string(&path).map_err(|e| io_error("read", &path, e))?;
            let mut notebook = Notebook::from_json(&json)
                .map_err(|e| StorageError::Serialization(format!("Failed to parse {}: {e}", path.display())))?;
            notebook.id = Some(key);
            Ok(notebook)
        })
    }

    fn insert(&self, notebook: &Notebook) -> BoxFuture<'_, StorageResult<String>> {
        let key = Uuid::new_v4().to_string();
        let result = self.write_notebook(&key, notebook).map(|()| key);
        Box::pin(async move { result })
    }

    fn update(&self, key: &str, notebook: &Notebook) -> BoxFuture<'_, StorageResult<()>> {
        let result = self.write_notebook(key, notebook);
        Box::pin(async move { result })
    }

    fn delete(&self, key: &str) -> BoxFuture<'_, StorageResult<()>> {
        let path = self.notebook_path(key);
        Box::pin(async move {
            if path.exists() {
                fs::remove_file(&path).map_err(|e| io_error("delete", &path, e))?;
            }
            Ok(())
        })
    }

    fn list(&self) -> BoxFuture<'_, StorageResult<Vec<String>>> {
        let dir = self.base_path.join("notebooks");
        Box::pin(async move {
            let entries = fs::read_dir(&dir).map_err(|e| io_error("read", &dir, e))?;
            let mut keys = Vec::new();
            for entry in entries.flatten() {
                let path = entry.path();
                if path.extension().is_some_and(|ext| ext == "json") {
                    if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                        keys.push(stem.to_string());
                    }
                }
            }
            keys.sort();
            Ok(keys)
        })
    }
}

impl BlobStore for FileStorage {
    fn upload(&self, path: &str, bytes: &[u8]) -> BoxFuture<'_, StorageResult<String>> {
        let target = self.blob_path(path);
        let bytes = bytes.to_vec();
        Box::pin(async move {
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent).map_err(|e| io_error("create", parent, e))?;
            }
            fs::write(&target, bytes).map_err(|e| io_error("write", &target, e))?;
            Ok(format!("file://{}", target.display()))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elements::{Element, SerializableColor, ShapeElement};
    use pollster::block_on;
    use tempfile::tempdir;

    #[test]
    fn test_file_storage_insert_load() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(dir.path().to_path_buf()).unwrap();

        let mut nb = Notebook::new("Field notes");
        nb.edit_current(|page| {
            page.push(Element::Line(ShapeElement::new(SerializableColor::black(), 2.0, 0.0, 0.0, 40.0, 40.0)));
            true
        });

        let key = block_on(storage.insert(&nb)).unwrap();
        let loaded = block_on(storage.load(&key)).unwrap();
        assert_eq!(loaded.name, "Field notes");
        assert_eq!(loaded.id.as_deref(), Some(key.as_str()));
        assert_eq!(loaded.current_page().elements(), nb.current_page().elements());
    }

    #[test]
    fn test_file_storage_not_found() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(dir.path().to_path_buf()).unwrap();
        let result = block_on(storage.load("nonexistent"));
        assert!(matches!(result, Err(StorageError::NotFound(_))));
    }

    #[test]
    fn test_file_storage_list_and_delete() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(dir.path().to_path_buf()).unwrap();
        let nb = Notebook::new("x");
        block_on(storage.update("doc1", &nb)).unwrap();
        block_on(storage.update("doc2", &nb)).unwrap();
        assert_eq!(block_on(storage.list()).unwrap(), vec!["doc1".to_string(), "doc2".to_string()]);

        block_on(storage.delete("doc1")).unwrap();
        assert_eq!(block_on(storage.list()).unwrap(), vec!["doc2".to_string()]);
    }

    #[test]
    fn test_file_storage_sanitizes_key() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(dir.path().to_path_buf()).unwrap();
        let nb = Notebook::new("x");
        block_on(storage.update("a/b:c*d", &nb)).unwrap();
        let loaded = block_on(storage.load("a/b:c*d")).unwrap();
        assert_eq!(loaded.name, "x");
    }

    #[test]
    fn test_upload_writes_blob() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(dir.path().to_path_buf()).unwrap();
        let url = block_on(storage.upload("nb1/../photo.png", b"png-bytes")).unwrap();
        assert!(url.starts_with("file://"));
        let written = dir.path().join("blobs").join("nb1").join("photo.png");
        assert_eq!(fs::read(written).unwrap(), b"png-bytes");
    }
}
