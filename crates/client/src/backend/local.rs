//! Local filesystem reads.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::{ClientError, Result};

/// Reads keys as file paths below a root directory.
#[derive(Debug)]
pub(crate) struct LocalReader {
    root: PathBuf,
}

impl LocalReader {
    /// Use `root`, or the current working directory when unset.
    pub(crate) fn open(root: Option<&Path>) -> Result<Self> {
        let root = match root {
            Some(root) => root.to_path_buf(),
            None => std::env::current_dir()?,
        };
        Ok(Self { root })
    }

    pub(crate) async fn read(&self, key: &str) -> Result<Vec<u8>> {
        let path = self.resolve(key);
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(ClientError::MissingKey(key.to_string())),
            Err(e) => Err(ClientError::Io(e)),
        }
    }

    fn resolve(&self, key: &str) -> PathBuf {
        let path = Path::new(key);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relative_keys_resolve_against_root() {
        let reader = LocalReader::open(Some(Path::new("/srv/app"))).unwrap();
        assert_eq!(reader.resolve("certs/a.pem"), PathBuf::from("/srv/app/certs/a.pem"));
    }

    #[test]
    fn test_absolute_keys_are_kept() {
        let reader = LocalReader::open(Some(Path::new("/srv/app"))).unwrap();
        assert_eq!(reader.resolve("/etc/secret"), PathBuf::from("/etc/secret"));
    }

    #[tokio::test]
    async fn test_missing_file_is_missing_key() {
        let dir = tempfile::tempdir().unwrap();
        let reader = LocalReader::open(Some(dir.path())).unwrap();
        let err = reader.read("nope.txt").await.unwrap_err();
        assert!(err.is_missing_key());
    }
}
