//! Filesystem image store

use async_trait::async_trait;
use std::io;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::{AsyncRead, AsyncWriteExt};
use uuid::Uuid;
use veggie_lens_domain::{ImageStore, ImageStoreError, ImageUpload, StoredImage};

/// Writes uploads as `{uuid}.{ext}` under a directory
#[derive(Debug, Clone)]
pub struct FsImageStore {
    dir: PathBuf,
}

impl FsImageStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

#[async_trait]
impl ImageStore for FsImageStore {
    async fn store(&self, image: &ImageUpload) -> Result<StoredImage, ImageStoreError> {
        if !self.dir.as_os_str().is_empty() {
            fs::create_dir_all(&self.dir).await?;
        }

        let filename = format!("{}.{}", Uuid::new_v4(), image.extension());
        let path = self.dir.join(&filename);

        write_new_file(&path, image.bytes.as_slice()).await?;

        tracing::debug!(path = %path.display(), bytes = image.bytes.len(), "Stored upload");

        Ok(StoredImage {
            filename,
            path: path.display().to_string(),
        })
    }
}

/// Write `source` to a file that must not exist yet; a failed write leaves nothing behind
async fn write_new_file<R: AsyncRead + Unpin>(path: &Path, mut source: R) -> io::Result<u64> {
    let mut file = fs::OpenOptions::new()
        .create_new(true)
        .write(true)
        .open(path)
        .await?;

    let written = async {
        let n = tokio::io::copy(&mut source, &mut file).await?;
        file.flush().await?;
        Ok::<_, io::Error>(n)
    }
    .await;

    if written.is_err() {
        drop(file);
        if let Err(e) = fs::remove_file(path).await {
            tracing::warn!(path = %path.display(), error = %e, "Failed to remove partial upload");
        }
    }

    written
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::pin::Pin;
    use std::task::{Context, Poll};
    use tokio::io::{AsyncReadExt, ReadBuf};

    struct BrokenReader;

    impl AsyncRead for BrokenReader {
        fn poll_read(
            self: Pin<&mut Self>,
            _cx: &mut Context<'_>,
            _buf: &mut ReadBuf<'_>,
        ) -> Poll<io::Result<()>> {
            Poll::Ready(Err(io::Error::other("disk went away")))
        }
    }

    #[tokio::test]
    async fn test_store_writes_uuid_named_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsImageStore::new(dir.path().join("uploads"));
        let upload = ImageUpload::new("tomat.png", "image/png", vec![0x89, b'P', b'N', b'G']);

        let stored = store.store(&upload).await.unwrap();

        assert!(stored.filename.ends_with(".png"));
        let stem = stored.filename.trim_end_matches(".png");
        assert!(Uuid::parse_str(stem).is_ok());

        let written = tokio::fs::read(&stored.path).await.unwrap();
        assert_eq!(written, upload.bytes);
    }

    #[tokio::test]
    async fn test_store_names_are_unique() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsImageStore::new(dir.path());
        let upload = ImageUpload::new("a.jpg", "image/jpeg", vec![1]);

        let a = store.store(&upload).await.unwrap();
        let b = store.store(&upload).await.unwrap();

        assert_ne!(a.filename, b.filename);
        assert!(a.filename.ends_with(".jpg"));
    }

    #[tokio::test]
    async fn test_failed_write_removes_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("partial.jpg");
        let source = (&b"\xFF\xD8\xFF"[..]).chain(BrokenReader);

        let result = write_new_file(&path, source).await;

        assert!(result.is_err());
        assert!(!path.exists());
    }
}
