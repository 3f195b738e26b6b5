use async_trait::async_trait;
use std::fmt::Write;
use std::io::ErrorKind;
use std::path::{ Path, PathBuf };
use tokio::fs;

use super::{ KeyValueStore, StorageError };

/// One JSON file per key under a root directory. Writes land in a sibling
/// temp file first and are renamed into place, so a reader never sees a
/// half-written value.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn new(root: impl AsRef<Path>) -> Result<Self, StorageError> {
        let root = root.as_ref().to_path_buf();
        std::fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    /// Every byte outside `[A-Za-z0-9.-]` is written as `_XX` hex, `_` itself
    /// included, so distinct keys never share a file.
    fn path_for(&self, key: &str) -> PathBuf {
        let mut file_name = String::with_capacity(key.len());
        for byte in key.bytes() {
            if byte.is_ascii_alphanumeric() || byte == b'-' || byte == b'.' {
                file_name.push(byte as char);
            } else {
                let _ = write!(file_name, "_{:02X}", byte);
            }
        }
        self.root.join(format!("{}.json", file_name))
    }
}

#[async_trait]
impl KeyValueStore for FileStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        match fs::read_to_string(self.path_for(key)).await {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value).await?;
        fs::rename(&tmp, &path).await?;
        Ok(())
    }

    async fn multi_remove(&self, keys: &[String]) -> Result<(), StorageError> {
        for key in keys {
            match fs::remove_file(self.path_for(key)).await {
                Ok(()) => {}
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => {
                    return Err(e.into());
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn values_round_trip_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path()).unwrap();
        assert!(store.get("user:1:conversation").await.unwrap().is_none());

        store.set("user:1:conversation", "[1,2]").await.unwrap();
        store.set("user:1:conversation", "[1,2,3]").await.unwrap();
        assert_eq!(store.get("user:1:conversation").await.unwrap().as_deref(), Some("[1,2,3]"));

        store.multi_remove(&["user:1:conversation".to_string(), "user:1:context".to_string()]).await.unwrap();
        assert!(store.get("user:1:conversation").await.unwrap().is_none());
    }

    #[test]
    fn keys_are_sanitized_into_file_names() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path()).unwrap();
        let path = store.path_for("health_assistant:alice/../x");
        assert_eq!(path.file_name().unwrap(), "health_5Fassistant_3Aalice_2F.._2Fx.json");
        assert_eq!(path.parent().unwrap(), dir.path());
    }

    #[test]
    fn distinct_keys_never_share_a_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path()).unwrap();
        assert_ne!(store.path_for("p:a:b:x"), store.path_for("p:a_b:x"));
        assert_ne!(store.path_for("p:bob@x.com:x"), store.path_for("p:bob_x.com:x"));
        assert_ne!(store.path_for("p:a_3Ab:x"), store.path_for("p:a:b:x"));
    }

    #[tokio::test]
    async fn lookalike_keys_hold_separate_values() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path()).unwrap();
        store.set("p:a:b:conversation", "private").await.unwrap();
        assert!(store.get("p:a_b:conversation").await.unwrap().is_none());
    }
}
