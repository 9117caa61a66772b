pub mod signature;
pub mod blob;
pub mod probe;
pub mod verify;
pub mod config;

pub use signature::{SignatureEntry, SignatureTable, SignatureMatch, SignatureError, builtin};
pub use blob::{Blob, FileBlob};
pub use probe::{Probe, ReadError, probe_signature};
pub use verify::{Verifier, VerifyOptions, Verdict, identify, matches_any_accepted, is_accepted_media_type};
pub use config::{ConfigError, load_table, parse_table};
