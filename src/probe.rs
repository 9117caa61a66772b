//! Reading the leading bytes of a blob.
//!
//! A probe is all-or-nothing: it resolves once, either to exactly the
//! requested number of raw bytes or to a [`ReadError`].  A blob that holds
//! fewer bytes than requested is a failure, not a short success.

use std::fmt;
use std::io;
use std::time::Duration;

use thiserror::Error;

use crate::blob::Blob;

#[derive(Error, Debug)]
pub enum ReadError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("Blob too short: needed {expected} leading bytes, got {actual}")]
    Truncated { expected: usize, actual: usize },
    #[error("Probe timed out after {0:?}")]
    TimedOut(Duration),
}

/// Raw leading bytes of a blob.  Never decoded as text.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Probe {
    bytes: Vec<u8>,
}

impl Probe {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self { bytes: bytes.into() }
    }

    pub fn as_bytes(&self) -> &[u8] { &self.bytes }

    pub fn len(&self) -> usize { self.bytes.len() }

    pub fn is_empty(&self) -> bool { self.bytes.is_empty() }

    pub fn to_hex(&self) -> String { hex::encode(&self.bytes) }

    pub fn into_bytes(self) -> Vec<u8> { self.bytes }
}

impl AsRef<[u8]> for Probe {
    fn as_ref(&self) -> &[u8] { &self.bytes }
}

impl fmt::Display for Probe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Read the first `len` bytes of `blob`.
///
/// Fails with [`ReadError::Truncated`] when the blob ends early and with
/// [`ReadError::Io`] when the underlying read fails.  Extra bytes returned by
/// a generous blob implementation are discarded.
pub async fn probe_signature<B: Blob + ?Sized>(blob: &B, len: usize) -> Result<Probe, ReadError> {
    let mut bytes = blob.read_range(0, len).await?;
    if bytes.len() < len {
        return Err(ReadError::Truncated { expected: len, actual: bytes.len() });
    }
    bytes.truncate(len);
    Ok(Probe { bytes })
}
