//! Upload intake: sanitise client filenames and stage raw bytes.
//!
//! Client-supplied names end up on disk (when an upload directory is
//! configured) and inside persisted records, so they are reduced to a single
//! path component made of `[A-Za-z0-9._-]` before anything else happens.
//! The bytes themselves stay in memory for the rest of the pipeline; the
//! staged copy is only an archive of what was received.

use crate::error::{CatalogError, ItemError};
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Used when sanitising leaves nothing usable.
pub const FALLBACK_FILENAME: &str = "upload";

/// One file received in an upload batch.
#[derive(Debug, Clone)]
pub struct Upload {
    /// Name as the client sent it.
    pub filename: String,
    pub bytes: Vec<u8>,
}

impl Upload {
    pub fn new(filename: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            filename: filename.into(),
            bytes: bytes.into(),
        }
    }
}

static RE_UNSAFE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^A-Za-z0-9_.-]").unwrap());

/// Reduce a client filename to a safe single path component.
///
/// Path separators become word breaks, whitespace runs become `_`, anything
/// outside `[A-Za-z0-9._-]` is dropped and leading/trailing `.`/`_` are
/// stripped, so `../../etc/passwd` becomes `etc_passwd`.
pub fn sanitize_filename(name: &str) -> String {
    let spaced: String = name
        .chars()
        .filter(char::is_ascii)
        .map(|c| if c == '/' || c == '\\' { ' ' } else { c })
        .collect();
    let joined = spaced.split_whitespace().collect::<Vec<_>>().join("_");
    let cleaned = RE_UNSAFE.replace_all(&joined, "");
    let trimmed = cleaned.trim_matches(|c| c == '.' || c == '_');

    if trimmed.is_empty() {
        FALLBACK_FILENAME.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Create the upload directory if it does not exist yet.
pub async fn prepare_upload_dir(dir: &Path) -> Result<(), CatalogError> {
    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|e| CatalogError::UploadDir {
            path: dir.to_path_buf(),
            source: e,
        })
}

/// Write an upload's bytes into `dir` under its sanitised name.
pub async fn stage_upload(
    dir: &Path,
    safe_name: &str,
    bytes: &[u8],
) -> Result<PathBuf, ItemError> {
    let path = dir.join(safe_name);
    tokio::fs::write(&path, bytes)
        .await
        .map_err(|e| ItemError::StagingFailed {
            filename: safe_name.to_string(),
            detail: e.to_string(),
        })?;
    debug!("Staged {} bytes → {}", bytes.len(), path.display());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_name_unchanged() {
        assert_eq!(sanitize_filename("phone.jpg"), "phone.jpg");
        assert_eq!(sanitize_filename("my-photo_2.PNG"), "my-photo_2.PNG");
    }

    #[test]
    fn test_traversal_removed() {
        assert_eq!(sanitize_filename("../../etc/passwd"), "etc_passwd");
        assert_eq!(sanitize_filename("..\\..\\boot.ini"), "boot.ini");
        assert_eq!(sanitize_filename("/var/tmp/x.png"), "var_tmp_x.png");
    }

    #[test]
    fn test_spaces_and_symbols() {
        assert_eq!(sanitize_filename("my cool  shoe (1).jpg"), "my_cool_shoe_1.jpg");
        assert_eq!(sanitize_filename("café.png"), "caf.png");
    }

    #[test]
    fn test_empty_falls_back() {
        assert_eq!(sanitize_filename(""), FALLBACK_FILENAME);
        assert_eq!(sanitize_filename("../.."), FALLBACK_FILENAME);
        assert_eq!(sanitize_filename("***"), FALLBACK_FILENAME);
    }

    #[tokio::test]
    async fn test_stage_upload_writes_bytes() {
        let dir = tempfile::tempdir().unwrap();
        prepare_upload_dir(&dir.path().join("uploads")).await.unwrap();
        let path = stage_upload(&dir.path().join("uploads"), "a.png", b"abc")
            .await
            .unwrap();
        assert_eq!(std::fs::read(path).unwrap(), b"abc");
    }

    #[tokio::test]
    async fn test_stage_upload_missing_dir_is_item_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = stage_upload(&dir.path().join("nope"), "a.png", b"abc")
            .await
            .unwrap_err();
        assert!(matches!(err, ItemError::StagingFailed { .. }));
    }
}
