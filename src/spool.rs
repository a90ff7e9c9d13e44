//! Ephemeral audio artifacts
//!
//! Synthesized replies are written to a spool directory, streamed to the
//! client, and removed when the response body is dropped. Names carry a
//! millisecond timestamp plus a random suffix so concurrent requests never
//! collide.

use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::{SystemTime, UNIX_EPOCH};

use axum::body::Body;
use tokio::fs::File;
use tokio::io::{AsyncRead, ReadBuf};
use tokio_util::io::ReaderStream;

use crate::Result;

/// Shared namespace for ephemeral audio files
#[derive(Debug, Clone)]
pub struct SpoolDir {
    root: PathBuf,
}

impl SpoolDir {
    /// Open the spool directory, creating it if needed
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        std::fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.root
    }

    /// Write `bytes` to a fresh uniquely named file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub async fn write(&self, prefix: &str, extension: &str, bytes: &[u8]) -> Result<SpoolFile> {
        let path = self.root.join(unique_name(prefix, extension));
        tokio::fs::write(&path, bytes).await?;
        tracing::debug!(path = %path.display(), bytes = bytes.len(), "spooled audio artifact");
        Ok(SpoolFile { path })
    }
}

/// Millisecond timestamp plus a random suffix; the clock alone can collide
/// under concurrent requests
fn unique_name(prefix: &str, extension: &str) -> String {
    let millis = SystemTime::now().duration_since(UNIX_EPOCH).map_or(0, |d| d.as_millis());
    let suffix = uuid::Uuid::new_v4().simple();
    format!("{prefix}_{millis}_{suffix}.{extension}")
}

/// A spooled file, removed from disk when dropped
#[derive(Debug)]
pub struct SpoolFile {
    path: PathBuf,
}

impl SpoolFile {
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Turn the file into a streaming response body.
    ///
    /// The file is deleted when the body is dropped, whether it was fully
    /// sent, errored, or abandoned by a disconnecting client.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened for reading.
    pub async fn into_body(self) -> Result<Body> {
        let file = File::open(&self.path).await?;
        Ok(Body::from_stream(ReaderStream::new(SpoolReader { file, _guard: self })))
    }
}

impl Drop for SpoolFile {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_file(&self.path) {
            if e.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!(path = %self.path.display(), error = %e, "failed to remove spool file");
            }
        }
    }
}

/// File reader that keeps the delete-on-drop guard alive for the lifetime
/// of the response body
struct SpoolReader {
    file: File,
    _guard: SpoolFile,
}

impl AsyncRead for SpoolReader {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<std::io::Result<()>> {
        Pin::new(&mut self.get_mut().file).poll_read(cx, buf)
    }
}
