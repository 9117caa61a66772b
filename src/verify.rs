//! Content-type verification: probe a blob, compare against a table.
//!
//! Two outcomes are kept apart:
//! - `Ok(false)` — the blob was read and matches no accepted signature.
//! - `Err(ReadError)` — the blob could not be read far enough to decide.
//!
//! Only byte content decides the verdict.  File names, extensions and
//! declared MIME types never enter these functions.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use crate::blob::Blob;
use crate::probe::{probe_signature, Probe, ReadError};
use crate::signature::{SignatureMatch, SignatureTable};

/// First table entry matching `probe`, if any.
pub fn identify<'t>(probe: &Probe, table: &'t SignatureTable) -> Option<SignatureMatch<'t>> {
    table.find(probe.as_bytes())
}

/// True if at least one entry in `table` prefixes `probe`.
pub fn matches_any_accepted(probe: &Probe, table: &SignatureTable) -> bool {
    identify(probe, table).is_some()
}

/// Probe `blob` with the table's longest signature length and match.
pub async fn is_accepted_media_type<B: Blob + ?Sized>(
    blob:  &B,
    table: &SignatureTable,
) -> Result<bool, ReadError> {
    let probe = probe_signature(blob, table.max_len()).await?;
    Ok(matches_any_accepted(&probe, table))
}

// ── Verifier ─────────────────────────────────────────────────────────────────

/// Tunables for [`Verifier`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VerifyOptions {
    /// Bytes to read per probe.  Raised to the table's longest signature
    /// when smaller; `None` uses exactly that length.
    pub probe_len: Option<usize>,
    /// Deadline for a single probe.  Expiry is reported as
    /// [`ReadError::TimedOut`].
    pub timeout:   Option<Duration>,
}

/// Outcome of [`Verifier::identify`]: the probe that was read and the label
/// of the first accepting entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict {
    pub probe:      Probe,
    pub media_type: Option<String>,
}

impl Verdict {
    pub fn is_accepted(&self) -> bool { self.media_type.is_some() }
}

/// A signature table plus probe settings, shareable across tasks.
#[derive(Debug, Clone)]
pub struct Verifier {
    table:   Arc<SignatureTable>,
    options: VerifyOptions,
}

impl Verifier {
    pub fn new(table: impl Into<Arc<SignatureTable>>) -> Self {
        Self::with_options(table, VerifyOptions::default())
    }

    pub fn with_options(table: impl Into<Arc<SignatureTable>>, options: VerifyOptions) -> Self {
        Self { table: table.into(), options }
    }

    pub fn table(&self) -> &SignatureTable { &self.table }

    pub fn options(&self) -> &VerifyOptions { &self.options }

    /// Effective probe length: never shorter than the longest signature.
    pub fn probe_len(&self) -> usize {
        let needed = self.table.max_len();
        self.options.probe_len.map_or(needed, |n| n.max(needed))
    }

    /// Read the leading bytes of `blob`, honouring the configured timeout.
    pub async fn probe<B: Blob + ?Sized>(&self, blob: &B) -> Result<Probe, ReadError> {
        let len = self.probe_len();
        let result = match self.options.timeout {
            Some(limit) => match tokio::time::timeout(limit, probe_signature(blob, len)).await {
                Ok(r)  => r,
                Err(_) => Err(ReadError::TimedOut(limit)),
            },
            None => probe_signature(blob, len).await,
        };
        if let Err(e) = &result {
            warn!(len, error = %e, "signature probe failed");
        }
        result
    }

    /// Probe and report which entry, if any, accepted the blob.
    pub async fn identify<B: Blob + ?Sized>(&self, blob: &B) -> Result<Verdict, ReadError> {
        let probe = self.probe(blob).await?;
        let media_type = identify(&probe, &self.table).map(|m| m.media_type().to_string());
        match &media_type {
            Some(mt) => debug!(probe = %probe, media_type = %mt, "signature accepted"),
            None     => debug!(probe = %probe, "no accepted signature matched"),
        }
        Ok(Verdict { probe, media_type })
    }

    pub async fn is_accepted<B: Blob + ?Sized>(&self, blob: &B) -> Result<bool, ReadError> {
        Ok(self.identify(blob).await?.is_accepted())
    }
}
