//! Stderr diagnostics for batch-processing events that have no result
//! struct to carry them: files dropped from a glob batch, pairing choices
//! the assembler made unilaterally. Everything else travels as typed
//! warnings on the decoded values.
//!
//! Verbosity comes from the `ROUNDSTATS_LOG` env var: `off`, `error`
//! (default) or `warn`.

use std::env;
use std::fmt::Display;
use std::sync::LazyLock;

use crate::error::LoadError;
use crate::types::StatsFileName;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
enum Level {
    Off,
    Error,
    Warn,
}

impl Level {
    fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "off" | "none" => Self::Off,
            "warn" | "warning" => Self::Warn,
            _ => Self::Error,
        }
    }
}

static LEVEL: LazyLock<Level> = LazyLock::new(|| {
    env::var("ROUNDSTATS_LOG")
        .map(|s| Level::from_str(&s))
        .unwrap_or(Level::Error)
});

fn emit(level: Level, prefix: &str, msg: impl Display) {
    if *LEVEL >= level {
        eprintln!("{prefix}: {msg}");
    }
}

/// A file dropped from a multi-file batch; the rest of the batch proceeds.
pub fn skipped_file(err: &LoadError) {
    emit(Level::Warn, "WARN", err);
}

/// A glob entry that could not even be enumerated (unreadable directory).
pub fn unreadable_glob_entry(err: &glob::GlobError) {
    emit(Level::Error, "ERROR", err);
}

/// Header and file name disagree about the round number; the file name wins.
pub fn round_mismatch(file: &StatsFileName, header_round: u8) {
    emit(
        Level::Warn,
        "WARN",
        format_args!(
            "{}: header declares round {header_round}, file name declares round {}",
            file.raw, file.round
        ),
    );
}

/// Several round-2 candidates sat at the same gap; one was kept anyway.
pub fn ambiguous_pairing(r1: &StatsFileName, kept: &StatsFileName, candidates: usize) {
    emit(
        Level::Warn,
        "WARN",
        format_args!(
            "{}: {candidates} round-2 candidates at the same gap, kept {}",
            r1.raw, kept.raw
        ),
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_parsing() {
        assert_eq!(Level::from_str("warn"), Level::Warn);
        assert_eq!(Level::from_str("WARNING"), Level::Warn);
        assert_eq!(Level::from_str("off"), Level::Off);
        assert_eq!(Level::from_str("none"), Level::Off);
        assert_eq!(Level::from_str("error"), Level::Error);
        // Unrecognized values fall back to the default, not to silence.
        assert_eq!(Level::from_str("garbage"), Level::Error);
    }

    #[test]
    fn test_level_ordering_gates_warn_behind_error() {
        assert!(Level::Warn > Level::Error);
        assert!(Level::Error > Level::Off);
    }
}
