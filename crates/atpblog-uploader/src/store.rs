//! Payload persistence.

use std::ffi::OsStr;
use std::future::Future;
use std::path::{Path, PathBuf};

use smol_str::SmolStr;

use atpblog_composer::{IncomingFile, UploadJob};

use crate::error::UploadError;

/// Persists one payload and yields the URL the draft should reference.
///
/// The queue drives implementations strictly serially, so `&self` receivers
/// are enough and no internal synchronization is required.
pub trait UploadPipeline {
    fn upload(&self, job: &UploadJob)
    -> impl Future<Output = Result<SmolStr, UploadError>> + Send;
}

/// Content-addressed blob directory.
///
/// Payloads land at `<root>/<blake3 prefix>.<ext>`, so re-uploading the same
/// bytes is idempotent. The returned URL is the file path as given, which
/// works as a relative markdown link when `root` is relative.
#[derive(Debug, Clone)]
pub struct LocalBlobStore {
    root: PathBuf,
}

impl LocalBlobStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn blob_name(file: &IncomingFile) -> String {
        let digest = blake3::hash(&file.data);
        let hex = digest.to_hex();
        format!("{}.{}", &hex.as_str()[..16], extension_for(file))
    }
}

impl UploadPipeline for LocalBlobStore {
    async fn upload(&self, job: &UploadJob) -> Result<SmolStr, UploadError> {
        tokio::fs::create_dir_all(&self.root).await?;
        let path = self.root.join(Self::blob_name(&job.file));
        tokio::fs::write(&path, &job.file.data).await?;
        Ok(SmolStr::new(path.display().to_string()))
    }
}

/// Picks a file extension from the declared content type, falling back to
/// the original file name.
fn extension_for(file: &IncomingFile) -> &str {
    match file.content_type.as_str() {
        "image/png" => "png",
        "image/jpeg" => "jpg",
        "image/gif" => "gif",
        "image/webp" => "webp",
        _ => Path::new(file.name.as_str())
            .extension()
            .and_then(OsStr::to_str)
            .unwrap_or("bin"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use atpblog_composer::UploadId;

    fn job(name: &str, content_type: &str, data: &[u8]) -> UploadJob {
        UploadJob {
            id: UploadId(0),
            file: IncomingFile::new(name, content_type, data.to_vec()),
        }
    }

    #[tokio::test]
    async fn stores_blobs_under_their_digest() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalBlobStore::new(dir.path());

        let url = store
            .upload(&job("shot.png", "image/png", b"payload"))
            .await
            .unwrap();
        assert!(url.ends_with(".png"));
        assert_eq!(std::fs::read(url.as_str()).unwrap(), b"payload");

        // Same bytes land on the same path.
        let again = store
            .upload(&job("renamed.png", "image/png", b"payload"))
            .await
            .unwrap();
        assert_eq!(url, again);
    }

    #[tokio::test]
    async fn extension_falls_back_to_the_file_name() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalBlobStore::new(dir.path());

        let url = store
            .upload(&job("notes.tar", "application/x-tar", b"x"))
            .await
            .unwrap();
        assert!(url.ends_with(".tar"));

        let url = store
            .upload(&job("mystery", "application/octet-stream", b"y"))
            .await
            .unwrap();
        assert!(url.ends_with(".bin"));
    }
}
