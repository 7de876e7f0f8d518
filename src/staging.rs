//! Request-scoped upload staging.
//!
//! Each upload lands in the spool directory under a per-request uuid key, so
//! concurrent uploads with the same original filename can never collide. The
//! staged file is an RAII guard — dropping it removes the file, so nothing
//! outlives the request.

use std::path::Path;

use tempfile::NamedTempFile;
use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
pub enum StagingError {
    #[error("Failed to stage upload: {0}")]
    Io(#[from] std::io::Error),
}

/// A staged upload on disk. The file is deleted when this is dropped.
pub struct StagedUpload {
    file: NamedTempFile,
}

impl StagedUpload {
    pub fn path(&self) -> &Path {
        self.file.path()
    }
}

/// Write uploaded bytes to the spool directory under a uuid-keyed name.
///
/// The original filename survives (sanitized) as a suffix for log
/// readability; the uuid prefix is what guarantees uniqueness.
pub fn stage_upload(
    bytes: &[u8],
    original_name: &str,
    spool_dir: &Path,
) -> Result<StagedUpload, StagingError> {
    std::fs::create_dir_all(spool_dir)?;

    let key = Uuid::new_v4();
    let file = tempfile::Builder::new()
        .prefix(&format!("{key}_"))
        .suffix(&format!("_{}", sanitize_filename(original_name)))
        .tempfile_in(spool_dir)?;

    std::fs::write(file.path(), bytes)?;

    tracing::debug!(path = %file.path().display(), bytes = bytes.len(), "upload staged");

    Ok(StagedUpload { file })
}

/// Collapse path traversal and filesystem-hostile characters.
///
/// Keeps alphanumerics, `.`, `-` and `_`; everything else becomes `_`.
/// Leading dots are stripped so the result can never be a dotfile or a
/// traversal component.
pub fn sanitize_filename(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);

    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();

    let cleaned = cleaned.trim_start_matches('.').to_string();
    if cleaned.is_empty() {
        "upload".to_string()
    } else {
        cleaned
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_strips_path_components() {
        assert_eq!(sanitize_filename("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_filename("..\\..\\boot.ini"), "boot.ini");
        assert_eq!(sanitize_filename("dir/sub/ecg.png"), "ecg.png");
    }

    #[test]
    fn sanitize_replaces_hostile_characters() {
        assert_eq!(sanitize_filename("my ecg (1).png"), "my_ecg__1_.png");
        assert_eq!(sanitize_filename("a\0b.png"), "a_b.png");
    }

    #[test]
    fn sanitize_never_returns_empty_or_dotfile() {
        assert_eq!(sanitize_filename(""), "upload");
        assert_eq!(sanitize_filename("..."), "upload");
        assert_eq!(sanitize_filename(".hidden"), "hidden");
    }

    #[test]
    fn staged_upload_writes_bytes_and_cleans_up() {
        let spool = tempfile::tempdir().unwrap();
        let path = {
            let staged = stage_upload(b"waveform", "ecg.png", spool.path()).unwrap();
            assert_eq!(std::fs::read(staged.path()).unwrap(), b"waveform");
            staged.path().to_path_buf()
        };
        // Guard dropped — file gone.
        assert!(!path.exists());
    }

    #[test]
    fn identical_filenames_stage_to_distinct_paths() {
        let spool = tempfile::tempdir().unwrap();
        let a = stage_upload(b"one", "sample.png", spool.path()).unwrap();
        let b = stage_upload(b"two", "sample.png", spool.path()).unwrap();
        assert_ne!(a.path(), b.path());
        assert_eq!(std::fs::read(a.path()).unwrap(), b"one");
        assert_eq!(std::fs::read(b.path()).unwrap(), b"two");
    }

    #[test]
    fn spool_dir_is_created_on_demand() {
        let root = tempfile::tempdir().unwrap();
        let spool = root.path().join("nested").join("spool");
        let staged = stage_upload(b"x", "a.png", &spool).unwrap();
        assert!(staged.path().starts_with(&spool));
    }
}
