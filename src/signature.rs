//! Signature table: media-type labels bound to leading-byte patterns.
//!
//! # Matching rules
//! An entry matches a probe when the probe's first `entry.len()` bytes are
//! byte-for-byte equal to the entry's pattern.  Entries are compared over
//! their own length only, so a 2-byte entry and a 4-byte entry can both be
//! checked against the same 4-byte probe.
//!
//! Lookup is a linear scan in table order and stops at the first match.
//! When one configured pattern is a prefix of another, the earlier entry
//! wins.  Acceptance means "matches at least one", not "matches exactly one".
//!
//! # Immutability
//! A table is built once and never mutated afterwards.  Narrowing a table
//! (`filter_media_types`) returns a new table.

use thiserror::Error;

/// Probe length used when a table is empty or no better length is known.
/// Four bytes covers the common audio/image magic numbers.
pub const DEFAULT_PROBE_LEN: usize = 4;

// ── Well-known signatures ────────────────────────────────────────────────────

/// MP3 with an ID3v2 tag: `"ID3"`.
pub const SIG_MP3_ID3:   &[u8] = &[0x49, 0x44, 0x33];
/// Bare MPEG-1 Layer III frame sync (no tag).
pub const SIG_MP3_FRAME: &[u8] = &[0xFF, 0xFB];
/// RIFF container (WAVE audio).
pub const SIG_WAV:       &[u8] = &[0x52, 0x49, 0x46, 0x46];
/// Ogg page header: `"OggS"`.
pub const SIG_OGG:       &[u8] = &[0x4F, 0x67, 0x67, 0x53];
/// FLAC stream marker: `"fLaC"`.
pub const SIG_FLAC:      &[u8] = &[0x66, 0x4C, 0x61, 0x43];
/// PNG: `\x89PNG`.
pub const SIG_PNG:       &[u8] = &[0x89, 0x50, 0x4E, 0x47];
/// JPEG SOI marker followed by a segment marker.
pub const SIG_JPEG:      &[u8] = &[0xFF, 0xD8, 0xFF];
/// GIF87a / GIF89a share `"GIF8"`.
pub const SIG_GIF:       &[u8] = &[0x47, 0x49, 0x46, 0x38];
/// PDF: `"%PDF"`.
pub const SIG_PDF:       &[u8] = &[0x25, 0x50, 0x44, 0x46];
/// ZIP local file header: `"PK\x03\x04"`.
pub const SIG_ZIP:       &[u8] = &[0x50, 0x4B, 0x03, 0x04];

// ── Error type ───────────────────────────────────────────────────────────────

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SignatureError {
    /// A zero-length pattern would accept every blob.
    #[error("Signature for '{media_type}' has no bytes")]
    EmptySignature { media_type: String },
    #[error("Signature entry has an empty media type label")]
    EmptyMediaType,
}

// ── SignatureEntry ───────────────────────────────────────────────────────────

/// One accepted format: a media-type label and its expected leading bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureEntry {
    media_type: String,
    bytes:      Vec<u8>,
}

impl SignatureEntry {
    pub fn new(media_type: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Result<Self, SignatureError> {
        let media_type = media_type.into();
        let bytes = bytes.into();
        if media_type.trim().is_empty() {
            return Err(SignatureError::EmptyMediaType);
        }
        if bytes.is_empty() {
            return Err(SignatureError::EmptySignature { media_type });
        }
        Ok(Self { media_type, bytes })
    }

    pub fn media_type(&self) -> &str { &self.media_type }

    pub fn bytes(&self) -> &[u8] { &self.bytes }

    #[inline]
    pub fn len(&self) -> usize { self.bytes.len() }

    /// Always false; empty entries are rejected by [`SignatureEntry::new`].
    #[inline]
    pub fn is_empty(&self) -> bool { self.bytes.is_empty() }

    /// Pattern as lowercase hex (diagnostics only).
    pub fn to_hex(&self) -> String { hex::encode(&self.bytes) }

    /// True if `probe` starts with this entry's pattern.
    /// A probe shorter than the pattern never matches.
    #[inline]
    pub fn matches(&self, probe: &[u8]) -> bool {
        probe.len() >= self.bytes.len() && probe[..self.bytes.len()] == self.bytes[..]
    }
}

// ── SignatureTable ───────────────────────────────────────────────────────────

/// Ordered, read-only list of accepted signatures.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SignatureTable {
    entries: Vec<SignatureEntry>,
}

/// The entry that accepted a probe, and its position in the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignatureMatch<'a> {
    pub index: usize,
    pub entry: &'a SignatureEntry,
}

impl SignatureMatch<'_> {
    pub fn media_type(&self) -> &str { self.entry.media_type() }
}

impl SignatureTable {
    pub fn new(entries: Vec<SignatureEntry>) -> Self {
        Self { entries }
    }

    /// Build a table from `(label, bytes)` pairs, validating every entry.
    pub fn from_pairs<'a, I>(pairs: I) -> Result<Self, SignatureError>
    where
        I: IntoIterator<Item = (&'a str, &'a [u8])>,
    {
        let entries = pairs
            .into_iter()
            .map(|(label, bytes)| SignatureEntry::new(label, bytes))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { entries })
    }

    pub fn entries(&self) -> &[SignatureEntry] { &self.entries }

    pub fn len(&self) -> usize { self.entries.len() }

    pub fn is_empty(&self) -> bool { self.entries.is_empty() }

    /// Length of the longest pattern; the number of bytes a probe must read
    /// so that every entry is matchable.  Zero for an empty table.
    pub fn max_len(&self) -> usize {
        self.entries.iter().map(SignatureEntry::len).max().unwrap_or(0)
    }

    /// Length of the shortest pattern.  Zero for an empty table.
    pub fn min_len(&self) -> usize {
        self.entries.iter().map(SignatureEntry::len).min().unwrap_or(0)
    }

    /// First entry whose pattern prefixes `probe`, in table order.
    pub fn find(&self, probe: &[u8]) -> Option<SignatureMatch<'_>> {
        self.entries
            .iter()
            .enumerate()
            .find(|(_, e)| e.matches(probe))
            .map(|(index, entry)| SignatureMatch { index, entry })
    }

    /// Distinct media-type labels, in first-seen order.
    pub fn media_types(&self) -> Vec<&str> {
        let mut out: Vec<&str> = Vec::new();
        for e in &self.entries {
            if !out.contains(&e.media_type()) {
                out.push(e.media_type());
            }
        }
        out
    }

    /// Keep only entries whose label is accepted by one of `patterns`.
    ///
    /// A pattern is either an exact label (`"audio/mpeg"`, compared
    /// case-insensitively) or a top-level wildcard (`"audio/*"`).
    pub fn filter_media_types<S: AsRef<str>>(&self, patterns: &[S]) -> Self {
        let entries = self
            .entries
            .iter()
            .filter(|e| patterns.iter().any(|p| media_type_matches(p.as_ref(), e.media_type())))
            .cloned()
            .collect();
        Self { entries }
    }
}

fn media_type_matches(pattern: &str, media_type: &str) -> bool {
    let pattern = pattern.trim();
    if pattern == "*" || pattern == "*/*" {
        return true;
    }
    match pattern.strip_suffix("/*") {
        Some(top) => media_type
            .split_once('/')
            .is_some_and(|(t, _)| t.eq_ignore_ascii_case(top)),
        None => pattern.eq_ignore_ascii_case(media_type),
    }
}

/// Catalogue of well-known formats.  The ID3 entry precedes the bare MPEG
/// frame sync, so tagged MP3s report the tag pattern.
pub fn builtin() -> SignatureTable {
    const PAIRS: &[(&str, &[u8])] = &[
        ("audio/mpeg",      SIG_MP3_ID3),
        ("audio/mpeg",      SIG_MP3_FRAME),
        ("audio/wav",       SIG_WAV),
        ("audio/ogg",       SIG_OGG),
        ("audio/flac",      SIG_FLAC),
        ("image/png",       SIG_PNG),
        ("image/jpeg",      SIG_JPEG),
        ("image/gif",       SIG_GIF),
        ("application/pdf", SIG_PDF),
        ("application/zip", SIG_ZIP),
    ];
    let entries = PAIRS
        .iter()
        .map(|&(media_type, bytes)| SignatureEntry {
            media_type: media_type.to_string(),
            bytes:      bytes.to_vec(),
        })
        .collect();
    SignatureTable { entries }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id3_table() -> SignatureTable {
        SignatureTable::from_pairs([("audio/mpeg", SIG_MP3_ID3)]).unwrap()
    }

    #[test]
    fn entry_rejects_empty_pattern_and_label() {
        assert_eq!(
            SignatureEntry::new("audio/mpeg", Vec::new()),
            Err(SignatureError::EmptySignature { media_type: "audio/mpeg".into() }),
        );
        assert_eq!(SignatureEntry::new("  ", vec![0x49]), Err(SignatureError::EmptyMediaType));
    }

    #[test]
    fn entry_compares_over_its_own_length() {
        let e = SignatureEntry::new("audio/mpeg", SIG_MP3_ID3).unwrap();
        assert!(e.matches(b"ID3\x04\x00"));
        assert!(e.matches(b"ID3"));
        assert!(!e.matches(b"ID"));
        assert!(!e.matches(b""));
        assert!(!e.matches(b"<html>"));
    }

    #[test]
    fn first_match_wins_on_prefix_overlap() {
        let table = SignatureTable::from_pairs([
            ("application/x-short", &[0xFF, 0xD8][..]),
            ("image/jpeg",          SIG_JPEG),
        ]).unwrap();
        let m = table.find(&[0xFF, 0xD8, 0xFF, 0xE0]).unwrap();
        assert_eq!(m.index, 0);
        assert_eq!(m.media_type(), "application/x-short");
    }

    #[test]
    fn lengths_of_table() {
        assert_eq!(SignatureTable::default().max_len(), 0);
        assert_eq!(SignatureTable::default().min_len(), 0);
        let t = builtin();
        assert_eq!(t.max_len(), 4);
        assert_eq!(t.min_len(), 2);
        assert_eq!(id3_table().max_len(), 3);
    }

    #[test]
    fn empty_table_matches_nothing() {
        assert!(SignatureTable::default().find(b"ID3").is_none());
    }

    #[test]
    fn filter_by_exact_and_wildcard() {
        let t = builtin();
        let audio = t.filter_media_types(&["audio/*"]);
        assert!(audio.entries().iter().all(|e| e.media_type().starts_with("audio/")));
        assert_eq!(audio.media_types(), vec!["audio/mpeg", "audio/wav", "audio/ogg", "audio/flac"]);

        let png = t.filter_media_types(&["IMAGE/PNG"]);
        assert_eq!(png.len(), 1);
        assert_eq!(png.entries()[0].bytes(), SIG_PNG);

        assert_eq!(t.filter_media_types(&["*/*"]).len(), t.len());
        assert!(t.filter_media_types(&["video/*"]).is_empty());
    }

    #[test]
    fn builtin_entries_are_valid() {
        for e in builtin().entries() {
            assert!(!e.is_empty());
            assert!(SignatureEntry::new(e.media_type(), e.bytes()).is_ok());
        }
    }

    #[test]
    fn hex_rendering() {
        let e = SignatureEntry::new("image/png", SIG_PNG).unwrap();
        assert_eq!(e.to_hex(), "89504e47");
    }
}
