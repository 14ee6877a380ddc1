//! On-disk snapshot persistence.
//!
//! The snapshot is stored as pretty-printed JSON. Writes go to a sibling
//! `.tmp` file that is renamed over the destination, so readers never see a
//! truncated file.

use std::path::{Path, PathBuf};

use reelgear_core::Error;

use crate::snapshot::Snapshot;

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Read and parse a persisted snapshot, rebuilding its derived indexes.
///
/// # Errors
///
/// `Error::Persist` if the file cannot be read (including when it is
/// missing), `Error::Serialization` if its contents do not parse.
pub async fn read_snapshot(path: &Path) -> Result<Snapshot, Error> {
    let bytes = tokio::fs::read(path).await?;
    let mut snapshot: Snapshot = serde_json::from_slice(&bytes)?;
    snapshot.reindex();
    Ok(snapshot)
}

/// Serialize `snapshot` to `path`, creating the parent directory if needed.
pub async fn write_snapshot(path: &Path, snapshot: &Snapshot) -> Result<(), Error> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(dir).await?;
    }

    let json = serde_json::to_vec_pretty(snapshot)?;
    let tmp = temp_path(path);
    tokio::fs::write(&tmp, &json).await?;
    tokio::fs::rename(&tmp, path).await?;

    tracing::debug!(path = %path.display(), bytes = json.len(), "persisted catalog snapshot");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use reelgear_core::Category;

    #[test]
    fn test_temp_path_is_sibling() {
        assert_eq!(temp_path(Path::new("/data/catalog_cache.json")), PathBuf::from("/data/catalog_cache.json.tmp"));
    }

    #[tokio::test]
    async fn test_write_creates_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/deeper/catalog_cache.json");
        let snapshot = Snapshot {
            categories: vec![Category { id: "c1".into(), name: "Cameras".into(), slug: "camera".into() }],
            last_update: Some(Utc::now()),
            ..Default::default()
        };

        write_snapshot(&path, &snapshot).await.unwrap();

        assert!(path.exists());
        assert!(!temp_path(&path).exists());
        assert_eq!(read_snapshot(&path).await.unwrap(), snapshot);
    }

    #[tokio::test]
    async fn test_read_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = read_snapshot(&dir.path().join("absent.json")).await;
        assert!(matches!(result, Err(Error::Persist(_))));
    }

    #[tokio::test]
    async fn test_read_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog_cache.json");
        tokio::fs::write(&path, b"{ not json").await.unwrap();
        assert!(matches!(read_snapshot(&path).await, Err(Error::Serialization(_))));
    }
}
