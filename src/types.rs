use std::collections::BTreeMap;

use chrono::{NaiveDate, NaiveDateTime};
use smallvec::SmallVec;

use crate::error::{DecodeError, MatchWarning, RecordWarning};
use crate::fields::{FIELD_COUNT, Field};
use crate::weapons::WeaponTally;

pub type RecordWarnings = SmallVec<[RecordWarning; 2]>;

/// In-round faction label. Flips between rounds in stopwatch play, so it is
/// never a team identity on its own.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Side {
    Axis,
    Allies,
}

impl Side {
    pub fn from_raw(value: u32) -> Option<Side> {
        match value {
            1 => Some(Side::Axis),
            2 => Some(Side::Allies),
            _ => None,
        }
    }

    pub fn number(self) -> u32 {
        match self {
            Side::Axis => 1,
            Side::Allies => 2,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Side::Axis => "axis",
            Side::Allies => "allies",
        }
    }
}

/// A header time value: either an `MM:SS` duration or the explicit
/// not-completed sentinel (`-1`).
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RoundTime {
    Completed { minutes: u32, seconds: u32 },
    NotCompleted,
}

impl RoundTime {
    pub fn as_seconds(self) -> Option<u32> {
        match self {
            RoundTime::Completed { minutes, seconds } => Some(minutes * 60 + seconds),
            RoundTime::NotCompleted => None,
        }
    }
}

/// Parsed first line of a stats file.
///
/// Header round/defender/winner have been observed absent or zero on some
/// server builds; the file name stays authoritative and these are kept as
/// cross-checks only.
#[derive(Clone, Debug, PartialEq)]
pub struct MatchHeader {
    pub server_tag: String,
    pub map: String,
    pub mode: String,
    pub round: Option<u8>,
    pub defender: Option<Side>,
    pub winner: Option<Side>,
    pub time_limit: RoundTime,
    pub actual_time: RoundTime,
}

/// One player's statistics for one round of one file.
///
/// Created by the decoder; only the differential reconstructor mutates it
/// (replacing round-2 cumulative values with deltas).
#[derive(Clone, Debug, PartialEq)]
pub struct PlayerRoundRecord {
    pub guid: String,
    /// Display name exactly as the server wrote it, color markup included.
    pub raw_name: String,
    /// Display name with `^X` color markup stripped.
    pub name: String,
    pub rounds_participated: u32,
    pub side: Side,
    /// Line position within the file; tie-breaker for duplicate GUIDs.
    pub ordinal: usize,
    /// Sparse weapon-id map; only weapons with a set bitmask bit appear.
    pub weapons: BTreeMap<u8, WeaponTally>,
    pub extended: [f64; FIELD_COUNT],
    /// 37 or 38 depending on server build.
    pub present_fields: usize,
    pub warnings: RecordWarnings,
}

impl PlayerRoundRecord {
    pub fn field(&self, field: Field) -> f64 {
        self.extended[field.index()]
    }

    pub fn set_field(&mut self, field: Field, value: f64) {
        self.extended[field.index()] = value;
    }

    /// Kill total aggregated from the weapon section.
    pub fn total_kills(&self) -> i64 {
        self.weapons.values().map(|t| t.kills).sum()
    }

    /// Death total aggregated from the weapon section.
    pub fn total_deaths(&self) -> i64 {
        self.weapons.values().map(|t| t.deaths).sum()
    }
}

/// Authoritative identity of a stats file, derived from its name
/// (`YYYY-MM-DD-HHMMSS-<map>-round-<1|2>.txt`), never from its contents.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct StatsFileName {
    pub raw: String,
    pub timestamp: NaiveDateTime,
    pub map: String,
    pub round: u8,
}

/// A record-level decode failure inside an otherwise-usable file.
#[derive(Clone, Debug, PartialEq)]
pub struct SkippedLine {
    /// 1-based line number within the file.
    pub line: usize,
    pub error: DecodeError,
}

/// One fully decoded stats file: header, surviving records and the per-line
/// report of records that did not decode.
#[derive(Clone, Debug, PartialEq)]
pub struct FileRecords {
    pub file: StatsFileName,
    pub header: MatchHeader,
    pub records: Vec<PlayerRoundRecord>,
    pub skipped: Vec<SkippedLine>,
}

/// One play-through of one map: a round-1 file and, when pairing succeeded,
/// its round-2 partner.
#[derive(Clone, Debug, PartialEq)]
pub struct Match {
    /// Assigned per calendar day in first-seen order, starting at 1.
    pub id: u32,
    /// The round-1 file's calendar date; a midnight-spanning round 2 keeps
    /// its partner's date for grouping.
    pub day: NaiveDate,
    pub map: String,
    pub round1: Option<FileRecords>,
    pub round2: Option<FileRecords>,
    pub warnings: Vec<MatchWarning>,
}

impl Match {
    /// Timestamp of the earliest constituent file.
    pub fn started_at(&self) -> NaiveDateTime {
        match (&self.round1, &self.round2) {
            (Some(r1), _) => r1.file.timestamp,
            (None, Some(r2)) => r2.file.timestamp,
            (None, None) => unreachable!("a match owns at least one file"),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct RosterMember {
    pub guid: String,
    /// Mean same-side ratio of this player's kept teammate edges, in (0.5, 1].
    pub confidence: f64,
}

/// Two stable rosters recovered from noisy per-round sides, plus the players
/// the clustering could not place.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TeamRoster {
    pub roster_a: Vec<RosterMember>,
    pub roster_b: Vec<RosterMember>,
    pub unassigned: Vec<String>,
}
