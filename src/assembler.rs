//! Grouping of per-round files into logical matches.
//!
//! The file name, not the header, is the authoritative source of timestamp,
//! map and round number; headers have been observed with absent or zero
//! round fields. Pairing decisions need the whole calendar-day batch, so
//! callers must not split a day across calls.

use std::collections::HashMap;
use std::sync::LazyLock;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use regex::Regex;

use crate::error::{DecodeError, MatchWarning};
use crate::log;
use crate::types::{FileRecords, Match, StatsFileName};

/// A round-2 file on the next calendar day still pairs with a late-evening
/// round 1 when the gap stays within this bound.
const CROSS_MIDNIGHT_MAX_GAP_SECS: i64 = 30 * 60;

static STATS_FILE_NAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{4}-\d{2}-\d{2})-(\d{6})-(.+)-round-([12])\.txt$")
        .expect("valid stats file name regex")
});

impl StatsFileName {
    /// Parses `YYYY-MM-DD-HHMMSS-<map>-round-<1|2>.txt` (base name only).
    pub fn parse(raw: &str) -> Result<StatsFileName, DecodeError> {
        let caps = STATS_FILE_NAME_RE
            .captures(raw)
            .ok_or_else(|| DecodeError::UnrecognizedFileName(raw.to_string()))?;

        let date = NaiveDate::parse_from_str(&caps[1], "%Y-%m-%d")
            .map_err(|_| DecodeError::UnrecognizedFileName(raw.to_string()))?;
        let time = NaiveTime::parse_from_str(&caps[2], "%H%M%S")
            .map_err(|_| DecodeError::UnrecognizedFileName(raw.to_string()))?;

        Ok(StatsFileName {
            raw: raw.to_string(),
            timestamp: NaiveDateTime::new(date, time),
            map: caps[3].to_string(),
            round: caps[4].parse().expect("regex restricts round to 1 or 2"),
        })
    }
}

fn push_round_mismatch(file: &FileRecords, warnings: &mut Vec<MatchWarning>) {
    if let Some(header_round) = file.header.round
        && header_round != file.file.round
    {
        log::round_mismatch(&file.file, header_round);
        warnings.push(MatchWarning::RoundMismatch {
            header: header_round,
            file_name: file.file.round,
        });
    }
}

/// Groups a batch of decoded files into matches.
///
/// Each round-1 file, in ascending timestamp order, takes the unconsumed
/// round-2 file of the same map with the smallest positive gap; a round-2
/// candidate on the next calendar day is eligible only within the
/// cross-midnight bound, and the resulting match keeps the round-1 date.
/// Leftover files become unpaired matches. Ids restart at 1 per calendar day
/// in first-seen order.
pub fn assemble_matches(files: Vec<FileRecords>) -> Vec<Match> {
    let mut sorted = files;
    sorted.sort_by(|a, b| {
        a.file
            .timestamp
            .cmp(&b.file.timestamp)
            .then_with(|| a.file.raw.cmp(&b.file.raw))
    });

    let mut round1s = Vec::new();
    let mut round2s: Vec<Option<FileRecords>> = Vec::new();
    for file in sorted {
        if file.file.round == 1 {
            round1s.push(file);
        } else {
            round2s.push(Some(file));
        }
    }

    let mut matches = Vec::new();
    for r1 in round1s {
        let mut best: Option<(usize, i64)> = None;
        let mut ties_at_best = 0;

        for (idx, slot) in round2s.iter().enumerate() {
            let Some(r2) = slot else { continue };
            if r2.file.map != r1.file.map || r2.file.timestamp <= r1.file.timestamp {
                continue;
            }
            let gap = (r2.file.timestamp - r1.file.timestamp).num_seconds();
            let crosses_midnight = r2.file.timestamp.date() != r1.file.timestamp.date();
            if crosses_midnight && gap > CROSS_MIDNIGHT_MAX_GAP_SECS {
                continue;
            }

            match best {
                None => {
                    best = Some((idx, gap));
                    ties_at_best = 1;
                }
                Some((_, best_gap)) if gap < best_gap => {
                    best = Some((idx, gap));
                    ties_at_best = 1;
                }
                // Equal gap: the earlier-sorted candidate is kept.
                Some((_, best_gap)) if gap == best_gap => ties_at_best += 1,
                Some(_) => {}
            }
        }

        let mut warnings = Vec::new();
        push_round_mismatch(&r1, &mut warnings);

        let round2 = best.map(|(idx, _)| round2s[idx].take().expect("candidate unconsumed"));
        match &round2 {
            Some(r2) => {
                push_round_mismatch(r2, &mut warnings);
                if ties_at_best > 1 {
                    log::ambiguous_pairing(&r1.file, &r2.file, ties_at_best);
                    warnings.push(MatchWarning::AmbiguousPairing {
                        candidates: ties_at_best,
                    });
                }
            }
            None => warnings.push(MatchWarning::UnpairedRound(1)),
        }

        matches.push(Match {
            id: 0,
            day: r1.file.timestamp.date(),
            map: r1.file.map.clone(),
            round1: Some(r1),
            round2,
            warnings,
        });
    }

    for slot in round2s {
        let Some(r2) = slot else { continue };
        let mut warnings = Vec::new();
        push_round_mismatch(&r2, &mut warnings);
        warnings.push(MatchWarning::UnpairedRound(2));
        matches.push(Match {
            id: 0,
            day: r2.file.timestamp.date(),
            map: r2.file.map.clone(),
            round1: None,
            round2: Some(r2),
            warnings,
        });
    }

    matches.sort_by_key(|m| (m.day, m.started_at()));
    let mut next_id: HashMap<NaiveDate, u32> = HashMap::new();
    for m in matches.iter_mut() {
        let id = next_id.entry(m.day).or_insert(0);
        *id += 1;
        m.id = *id;
    }

    matches
}
