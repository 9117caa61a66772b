//! Binary sources the verifier can probe.
//!
//! A [`Blob`] is anything that can hand back a byte range asynchronously.
//! Reads are range-sliced like a browser `Blob.slice()`: asking for bytes
//! past the end returns whatever is available (possibly nothing), never an
//! error.  Deciding whether a short read is acceptable is the prober's job.
//!
//! Implementations must not mutate the underlying data; reading the same
//! range twice yields the same bytes while the source is unchanged.

use std::future::Future;
use std::io::{self, SeekFrom};
use std::path::{Path, PathBuf};

use tokio::io::{AsyncReadExt, AsyncSeekExt};

pub trait Blob {
    /// Read up to `len` bytes starting at `start`.
    fn read_range(&self, start: u64, len: usize) -> impl Future<Output = io::Result<Vec<u8>>> + Send;
}

// ── In-memory buffers ────────────────────────────────────────────────────────

fn slice_clamped(data: &[u8], start: u64, len: usize) -> Vec<u8> {
    let start = usize::try_from(start).unwrap_or(usize::MAX).min(data.len());
    let end = start.saturating_add(len).min(data.len());
    data[start..end].to_vec()
}

impl Blob for [u8] {
    fn read_range(&self, start: u64, len: usize) -> impl Future<Output = io::Result<Vec<u8>>> + Send {
        let out: io::Result<Vec<u8>> = Ok(slice_clamped(self, start, len));
        async move { out }
    }
}

impl Blob for Vec<u8> {
    fn read_range(&self, start: u64, len: usize) -> impl Future<Output = io::Result<Vec<u8>>> + Send {
        self.as_slice().read_range(start, len)
    }
}

// ── Files on disk ────────────────────────────────────────────────────────────

/// A file read lazily through `tokio::fs`.  Only the requested range is
/// read; the file is reopened on every call so no handle state leaks
/// between probes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileBlob {
    path: PathBuf,
}

impl FileBlob {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path { &self.path }
}

impl Blob for FileBlob {
    fn read_range(&self, start: u64, len: usize) -> impl Future<Output = io::Result<Vec<u8>>> + Send {
        async move {
            let mut file = tokio::fs::File::open(&self.path).await?;
            if start > 0 {
                file.seek(SeekFrom::Start(start)).await?;
            }
            // `len` is caller-controlled and may far exceed the file.
            let mut buf = Vec::with_capacity(len.min(64));
            file.take(len as u64).read_to_end(&mut buf).await?;
            Ok::<_, io::Error>(buf)
        }
    }
}
