//! JSON signature-table files.
//!
//! ```json
//! [
//!   { "media_type": "audio/mpeg", "signature": "49 44 33" },
//!   { "media_type": "image/png",  "signature": [137, 80, 78, 71] }
//! ]
//! ```
//!
//! `signature` is a hex string (case-insensitive, whitespace ignored) or an
//! array of byte values.  Entry order is preserved; it is the match order.

use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::signature::{SignatureEntry, SignatureError, SignatureTable};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("Malformed signature table: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid hex signature for '{media_type}': {source}")]
    InvalidHex { media_type: String, source: hex::FromHexError },
    #[error(transparent)]
    Signature(#[from] SignatureError),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SignatureBytes {
    Hex(String),
    Bytes(Vec<u8>),
}

/// One record of a table file, before validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignatureRecord {
    pub media_type: String,
    pub signature:  SignatureBytes,
}

impl SignatureRecord {
    pub fn into_entry(self) -> Result<SignatureEntry, ConfigError> {
        let bytes = match self.signature {
            SignatureBytes::Bytes(b) => b,
            SignatureBytes::Hex(s) => {
                let compact: String = s.chars().filter(|c| !c.is_whitespace()).collect();
                hex::decode(compact).map_err(|source| ConfigError::InvalidHex {
                    media_type: self.media_type.clone(),
                    source,
                })?
            }
        };
        Ok(SignatureEntry::new(self.media_type, bytes)?)
    }
}

impl From<&SignatureEntry> for SignatureRecord {
    fn from(e: &SignatureEntry) -> Self {
        SignatureRecord {
            media_type: e.media_type().to_string(),
            signature:  SignatureBytes::Hex(e.to_hex()),
        }
    }
}

/// Parse a table from JSON text.
pub fn parse_table(json: &str) -> Result<SignatureTable, ConfigError> {
    let records: Vec<SignatureRecord> = serde_json::from_str(json)?;
    let entries = records
        .into_iter()
        .map(SignatureRecord::into_entry)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(SignatureTable::new(entries))
}

/// Read and parse a table file.
pub fn load_table(path: impl AsRef<Path>) -> Result<SignatureTable, ConfigError> {
    let text = std::fs::read_to_string(path)?;
    parse_table(&text)
}

/// Serialise a table in the file format, signatures as hex.
pub fn to_json(table: &SignatureTable) -> Result<String, serde_json::Error> {
    let records: Vec<SignatureRecord> = table.entries().iter().map(SignatureRecord::from).collect();
    serde_json::to_string_pretty(&records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signature::{builtin, SIG_MP3_ID3, SIG_PNG};

    #[test]
    fn hex_and_array_forms() {
        let table = parse_table(r#"[
            { "media_type": "audio/mpeg", "signature": "49 44 33" },
            { "media_type": "image/png",  "signature": [137, 80, 78, 71] },
            { "media_type": "image/jpeg", "signature": "FFd8ff" }
        ]"#).unwrap();
        assert_eq!(table.len(), 3);
        assert_eq!(table.entries()[0].bytes(), SIG_MP3_ID3);
        assert_eq!(table.entries()[1].bytes(), SIG_PNG);
        assert_eq!(table.entries()[2].bytes(), &[0xFF, 0xD8, 0xFF]);
    }

    #[test]
    fn bad_hex_names_the_entry() {
        let err = parse_table(r#"[{ "media_type": "audio/mpeg", "signature": "4944G3" }]"#).unwrap_err();
        match err {
            ConfigError::InvalidHex { media_type, .. } => assert_eq!(media_type, "audio/mpeg"),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn empty_signature_is_rejected() {
        let err = parse_table(r#"[{ "media_type": "audio/mpeg", "signature": "" }]"#).unwrap_err();
        assert!(matches!(err, ConfigError::Signature(SignatureError::EmptySignature { .. })));
        let err = parse_table(r#"[{ "media_type": "audio/mpeg", "signature": [] }]"#).unwrap_err();
        assert!(matches!(err, ConfigError::Signature(SignatureError::EmptySignature { .. })));
    }

    #[test]
    fn out_of_range_byte_is_json_error() {
        let err = parse_table(r#"[{ "media_type": "audio/mpeg", "signature": [73, 300] }]"#).unwrap_err();
        assert!(matches!(err, ConfigError::Json(_)));
    }

    #[test]
    fn empty_file_gives_empty_table() {
        assert!(parse_table("[]").unwrap().is_empty());
    }

    #[test]
    fn builtin_survives_json() {
        let json = to_json(&builtin()).unwrap();
        assert_eq!(parse_table(&json).unwrap(), builtin());
    }

    #[test]
    fn load_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("accepted.json");
        std::fs::write(&path, r#"[{ "media_type": "audio/mpeg", "signature": "494433" }]"#).unwrap();
        let table = load_table(&path).unwrap();
        assert_eq!(table.media_types(), vec!["audio/mpeg"]);

        assert!(matches!(load_table(dir.path().join("missing.json")), Err(ConfigError::Io(_))));
    }
}
