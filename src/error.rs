use std::path::PathBuf;

use thiserror::Error;

/// Fatal per-record (or per-header) decode failures. A failed line never
/// aborts the rest of its file; `decode_file` reports these per line.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DecodeError {
    #[error("malformed record: expected {expected} top-level fields, found {found}")]
    MalformedRecord { expected: usize, found: usize },

    #[error(
        "truncated weapon section: bitmask {bitmask:#x} requires {needed} values, found {found}"
    )]
    TruncatedWeaponSection {
        bitmask: u64,
        needed: usize,
        found: usize,
    },

    #[error("truncated extended section: found {found} fields, minimum is {minimum}")]
    TruncatedExtendedSection { found: usize, minimum: usize },

    #[error("malformed header: {0}")]
    MalformedHeader(String),

    #[error("invalid number '{value}' in {section}")]
    InvalidNumber {
        section: &'static str,
        value: String,
    },

    #[error("invalid side value '{0}'")]
    InvalidSide(String),

    #[error("duplicate GUID '{0}' superseded by a later line")]
    DuplicateGuid(String),

    #[error("unrecognized stats file name '{0}'")]
    UnrecognizedFileName(String),
}

/// Non-fatal decoder diagnostics attached to an otherwise-valid record.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordWarning {
    #[error("missing trailing extended field (older server builds emit 37)")]
    MissingTrailingField,

    #[error("{0} unconsumed values after the weapon section")]
    ExtraWeaponValues(usize),

    #[error("{0} extended fields past the known layout were ignored")]
    ExtraExtendedFields(usize),
}

/// Recoverable issues surfaced while differencing a round-2 record against
/// its round-1 baseline.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ReconstructWarning {
    #[error("negative delta for {field}: round-2 value {raw} < round-1 value {baseline}")]
    NegativeDelta {
        field: &'static str,
        raw: f64,
        baseline: f64,
    },

    #[error("negative delta for weapon {weapon} {stat}")]
    NegativeWeaponDelta {
        weapon: &'static str,
        stat: &'static str,
    },

    #[error("no round-1 baseline for player; round-2 values left cumulative")]
    NoBaselineAvailable,
}

/// Audit flags attached to an assembled match. None of these invalidate the
/// match; the caller decides how much to trust a flagged result.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MatchWarning {
    #[error("only round {0} present")]
    UnpairedRound(u8),

    #[error("ambiguous pairing: {candidates} round-2 candidates at the same gap")]
    AmbiguousPairing { candidates: usize },

    #[error("header declares round {header} but file name declares round {file_name}")]
    RoundMismatch { header: u8, file_name: u8 },
}

/// Batch-loading failures. With a multi-file glob the loader logs and skips;
/// with a single explicit path it returns the error.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("invalid glob pattern '{pattern}': {source}")]
    Pattern {
        pattern: String,
        source: glob::PatternError,
    },

    #[error("failed to read '{path}': {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("{path}: {source}")]
    Decode {
        path: PathBuf,
        source: DecodeError,
    },
}
