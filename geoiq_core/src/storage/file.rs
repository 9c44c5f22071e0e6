use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use super::{KeyValueStore, StorageError};
use crate::logging::{Logger, LoggerRegistry};

/// Bytes kept as-is in file names; everything else, `%` included, is escaped.
const FILE_NAME_ESCAPES: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-').remove(b'_');

/// Stores each key as `<dir>/<escaped key>.json`.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
    logger: Logger,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|e| StorageError::Write {
            key: dir.display().to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self {
            dir,
            logger: LoggerRegistry::default().logger("file-store"),
        })
    }

    pub fn with_logger(self, logger: Logger) -> Self {
        Self { logger, ..self }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir
            .join(format!("{}.json", utf8_percent_encode(key, FILE_NAME_ESCAPES)))
    }
}

fn key_from_file_stem(stem: &str) -> Option<String> {
    percent_decode_str(stem)
        .decode_utf8()
        .ok()
        .map(|key| key.into_owned())
}

impl KeyValueStore for FileStore {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::Read {
                key: key.to_string(),
                reason: e.to_string(),
            }),
        }
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");

        fs::write(&tmp, value)
            .and_then(|_| fs::rename(&tmp, &path))
            .map_err(|e| StorageError::Write {
                key: key.to_string(),
                reason: e.to_string(),
            })?;

        self.logger.debug_with(
            "Persisted value",
            &serde_json::json!({ "key": key, "bytes": value.len() }),
        );
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::Delete {
                key: key.to_string(),
                reason: e.to_string(),
            }),
        }
    }

    fn keys(&self) -> Result<Vec<String>, StorageError> {
        let entries = fs::read_dir(&self.dir).map_err(|e| StorageError::Read {
            key: self.dir.display().to_string(),
            reason: e.to_string(),
        })?;

        let mut keys: Vec<String> = entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.extension().and_then(|ext| ext.to_str()) == Some("json"))
            .filter_map(|path| path.file_stem().and_then(|s| s.to_str()).and_then(key_from_file_stem))
            .collect();
        keys.sort();
        Ok(keys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{KeyValueStoreExt, BRANDS_KEY, PROMPTS_KEY};

    #[test]
    fn test_file_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path()).unwrap();

        assert_eq!(store.get_item(BRANDS_KEY).unwrap(), None);
        store.write_json(BRANDS_KEY, &vec!["a", "b"]).unwrap();
        store.set_item(PROMPTS_KEY, "[]").unwrap();

        let brands: Vec<String> = store.read_json(BRANDS_KEY).unwrap().unwrap();
        assert_eq!(brands, vec!["a".to_string(), "b".to_string()]);
        assert_eq!(
            store.keys().unwrap(),
            vec![PROMPTS_KEY.to_string(), BRANDS_KEY.to_string()]
        );
    }

    #[test]
    fn test_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        FileStore::new(dir.path())
            .unwrap()
            .set_item("geoiq_company", "{}")
            .unwrap();

        let reopened = FileStore::new(dir.path()).unwrap();
        assert_eq!(reopened.get_item("geoiq_company").unwrap().as_deref(), Some("{}"));
    }

    #[test]
    fn test_remove_missing_is_ok() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path()).unwrap();
        store.remove_item("nothing").unwrap();
        store.set_item("k", "v").unwrap();
        store.remove_item("k").unwrap();
        assert_eq!(store.get_item("k").unwrap(), None);
    }

    #[test]
    fn test_keys_differing_only_in_punctuation_stay_apart() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path()).unwrap();

        store.set_item("brand.v1", "first").unwrap();
        store.set_item("brand_v1", "second").unwrap();
        store.set_item("brand%2Ev1", "third").unwrap();

        assert_eq!(store.get_item("brand.v1").unwrap().as_deref(), Some("first"));
        assert_eq!(store.get_item("brand_v1").unwrap().as_deref(), Some("second"));
        assert_eq!(store.get_item("brand%2Ev1").unwrap().as_deref(), Some("third"));
        assert_eq!(
            store.keys().unwrap(),
            vec![
                "brand%2Ev1".to_string(),
                "brand.v1".to_string(),
                "brand_v1".to_string()
            ]
        );
    }

    #[test]
    fn test_keys_with_path_separators_stay_inside_dir() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path()).unwrap();

        store.set_item("../escape", "x").unwrap();
        store.set_item("visibility:latest", "y").unwrap();

        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 2);
        assert_eq!(
            store.keys().unwrap(),
            vec!["../escape".to_string(), "visibility:latest".to_string()]
        );
    }
}
