//! Decoding of raw stats-file text: the backslash-delimited header line and
//! the per-player record lines with their bitmask-driven weapon section.
//!
//! Decode failures are scoped to the line that caused them; `decode_file`
//! keeps every surviving record and reports failed lines individually.

use std::collections::{BTreeMap, HashMap};
use std::sync::LazyLock;

use regex::Regex;

use crate::error::{DecodeError, RecordWarning};
use crate::fields::{FIELD_COUNT, Field, MIN_FIELD_COUNT};
use crate::types::{
    FileRecords, MatchHeader, PlayerRoundRecord, RecordWarnings, RoundTime, Side, SkippedLine,
    StatsFileName,
};
use crate::weapons::WeaponTally;

const RECORD_SEPARATOR: char = '\\';
const RECORD_FIELD_COUNT: usize = 5;
const HEADER_FIELD_COUNT: usize = 8;
const WEAPON_TUPLE_LEN: usize = 5;
const NOT_COMPLETED_SENTINEL: &str = "-1";

static COLOR_CODE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\^[0-9A-Za-z]").expect("valid color code regex"));

static ROUND_TIME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{1,3}):([0-5]\d)$").expect("valid round time regex"));

/// Strips in-band `^X` color markup from a display name.
pub fn strip_color_codes(name: &str) -> String {
    COLOR_CODE_RE.replace_all(name, "").into_owned()
}

fn parse_u32(raw: &str, section: &'static str) -> Result<u32, DecodeError> {
    raw.trim().parse().map_err(|_| DecodeError::InvalidNumber {
        section,
        value: raw.trim().to_string(),
    })
}

fn parse_i64(raw: &str, section: &'static str) -> Result<i64, DecodeError> {
    raw.trim().parse().map_err(|_| DecodeError::InvalidNumber {
        section,
        value: raw.trim().to_string(),
    })
}

fn parse_round_time(raw: &str) -> Result<RoundTime, DecodeError> {
    let s = raw.trim();
    if s == NOT_COMPLETED_SENTINEL {
        return Ok(RoundTime::NotCompleted);
    }

    let caps = ROUND_TIME_RE
        .captures(s)
        .ok_or_else(|| DecodeError::MalformedHeader(format!("unparsable time value '{s}'")))?;

    // Captures are all-digit by construction.
    let minutes = caps[1].parse().expect("digits");
    let seconds = caps[2].parse().expect("digits");
    Ok(RoundTime::Completed { minutes, seconds })
}

fn parse_header_round(raw: &str) -> Result<Option<u8>, DecodeError> {
    match raw.trim() {
        "" | "0" => Ok(None),
        "1" => Ok(Some(1)),
        "2" => Ok(Some(2)),
        other => Err(DecodeError::MalformedHeader(format!(
            "round value '{other}' outside 1..=2"
        ))),
    }
}

fn parse_header_side(raw: &str, label: &str) -> Result<Option<Side>, DecodeError> {
    let s = raw.trim();
    if s.is_empty() || s == "0" {
        return Ok(None);
    }

    let value: u32 = s
        .parse()
        .map_err(|_| DecodeError::MalformedHeader(format!("unparsable {label} side '{s}'")))?;
    Side::from_raw(value)
        .map(Some)
        .ok_or_else(|| DecodeError::MalformedHeader(format!("{label} side '{s}' outside 1..=2")))
}

/// Decodes a file's first line into a `MatchHeader`.
///
/// Layout: `server\map\mode\round\defender\winner\timelimit\actualtime`.
/// A leading separator (empty first field) is tolerated.
pub fn decode_header(line: &str) -> Result<MatchHeader, DecodeError> {
    let mut parts: Vec<&str> = line.trim_end().split(RECORD_SEPARATOR).collect();
    if parts.len() == HEADER_FIELD_COUNT + 1 && parts[0].is_empty() {
        parts.remove(0);
    }
    if parts.len() != HEADER_FIELD_COUNT {
        return Err(DecodeError::MalformedHeader(format!(
            "expected {HEADER_FIELD_COUNT} fields, found {}",
            parts.len()
        )));
    }

    Ok(MatchHeader {
        server_tag: parts[0].to_string(),
        map: parts[1].trim().to_string(),
        mode: parts[2].trim().to_string(),
        round: parse_header_round(parts[3])?,
        defender: parse_header_side(parts[4], "defender")?,
        winner: parse_header_side(parts[5], "winner")?,
        time_limit: parse_round_time(parts[6])?,
        actual_time: parse_round_time(parts[7])?,
    })
}

/// Decodes one non-header line into a `PlayerRoundRecord`.
///
/// `ordinal` is the line's position among record lines; it breaks ties when
/// the same GUID appears twice in one file.
pub fn decode_record(line: &str, ordinal: usize) -> Result<PlayerRoundRecord, DecodeError> {
    let parts: Vec<&str> = line
        .trim_end_matches(['\r', '\n'])
        .splitn(RECORD_FIELD_COUNT, RECORD_SEPARATOR)
        .collect();
    if parts.len() < RECORD_FIELD_COUNT {
        return Err(DecodeError::MalformedRecord {
            expected: RECORD_FIELD_COUNT,
            found: parts.len(),
        });
    }

    let guid = parts[0].trim().to_string();
    let raw_name = parts[1].to_string();
    let rounds_participated = parse_u32(parts[2], "rounds_participated")?;
    let side_value = parse_u32(parts[3], "side")?;
    let side =
        Side::from_raw(side_value).ok_or_else(|| DecodeError::InvalidSide(side_value.to_string()))?;

    let mut warnings = RecordWarnings::new();
    let (weapons, extended_payload) = decode_weapon_section(parts[4], &mut warnings)?;
    let (extended, present_fields) = decode_extended_section(extended_payload, &mut warnings)?;

    Ok(PlayerRoundRecord {
        name: strip_color_codes(&raw_name),
        guid,
        raw_name,
        rounds_participated,
        side,
        ordinal,
        weapons,
        extended,
        present_fields,
        warnings,
    })
}

/// Consumes the leading bitmask and `5 * popcount` integers of the payload.
///
/// The map is sparse on purpose: only declared bits are read, so a record
/// can never over-read into the extended section.
fn decode_weapon_section<'a>(
    payload: &'a str,
    warnings: &mut RecordWarnings,
) -> Result<(BTreeMap<u8, WeaponTally>, Option<&'a str>), DecodeError> {
    let (weapon_part, extended_part) = match payload.split_once('\t') {
        Some((weapons, extended)) => (weapons, Some(extended)),
        None => (payload, None),
    };

    let mut tokens = weapon_part.split(' ').filter(|t| !t.is_empty());
    let mask_token = tokens.next().ok_or(DecodeError::InvalidNumber {
        section: "weapon bitmask",
        value: String::new(),
    })?;
    let bitmask: u64 = mask_token
        .parse()
        .map_err(|_| DecodeError::InvalidNumber {
            section: "weapon bitmask",
            value: mask_token.to_string(),
        })?;

    let values: Vec<i64> = tokens
        .map(|t| parse_i64(t, "weapon section"))
        .collect::<Result<_, _>>()?;

    let needed = bitmask.count_ones() as usize * WEAPON_TUPLE_LEN;
    if values.len() < needed {
        return Err(DecodeError::TruncatedWeaponSection {
            bitmask,
            needed,
            found: values.len(),
        });
    }
    if values.len() > needed {
        warnings.push(RecordWarning::ExtraWeaponValues(values.len() - needed));
    }

    let mut weapons = BTreeMap::new();
    let mut cursor = 0;
    for bit in 0..u64::BITS as u8 {
        if bitmask & (1u64 << bit) == 0 {
            continue;
        }
        weapons.insert(
            bit,
            WeaponTally::from_values(&values[cursor..cursor + WEAPON_TUPLE_LEN]),
        );
        cursor += WEAPON_TUPLE_LEN;
    }

    Ok((weapons, extended_part))
}

fn decode_extended_section(
    payload: Option<&str>,
    warnings: &mut RecordWarnings,
) -> Result<([f64; FIELD_COUNT], usize), DecodeError> {
    let tokens: Vec<&str> = payload
        .map(|p| p.split('\t').map(str::trim).collect())
        .unwrap_or_default();

    if tokens.len() < MIN_FIELD_COUNT {
        return Err(DecodeError::TruncatedExtendedSection {
            found: tokens.len(),
            minimum: MIN_FIELD_COUNT,
        });
    }
    if tokens.len() > FIELD_COUNT {
        warnings.push(RecordWarning::ExtraExtendedFields(
            tokens.len() - FIELD_COUNT,
        ));
    }

    let present_fields = tokens.len().min(FIELD_COUNT);
    if present_fields < FIELD_COUNT {
        warnings.push(RecordWarning::MissingTrailingField);
    }

    let mut extended = [0.0; FIELD_COUNT];
    for (idx, token) in tokens.iter().take(FIELD_COUNT).enumerate() {
        let section = Field::from_index(idx).map(Field::name).unwrap_or("extended");
        extended[idx] = token.parse().map_err(|_| DecodeError::InvalidNumber {
            section,
            value: token.to_string(),
        })?;
    }

    Ok((extended, present_fields))
}

/// Decodes a whole file: header line first, then one record per non-empty
/// line. Record failures land in `skipped`, never abort the file. When a GUID
/// repeats, the later line wins and the superseded one is reported.
pub fn decode_file(file: StatsFileName, contents: &str) -> Result<FileRecords, DecodeError> {
    let mut lines = contents.lines().enumerate();

    let header = loop {
        match lines.next() {
            Some((_, line)) if line.trim().is_empty() => continue,
            Some((_, line)) => break decode_header(line)?,
            None => return Err(DecodeError::MalformedHeader("empty file".to_string())),
        }
    };

    let mut records: Vec<PlayerRoundRecord> = Vec::new();
    let mut record_lines: Vec<usize> = Vec::new();
    let mut by_guid: HashMap<String, usize> = HashMap::new();
    let mut skipped = Vec::new();
    let mut ordinal = 0;

    for (idx, line) in lines {
        if line.trim().is_empty() {
            continue;
        }
        let line_number = idx + 1;

        match decode_record(line, ordinal) {
            Ok(record) => match by_guid.get(&record.guid) {
                Some(&slot) => {
                    skipped.push(SkippedLine {
                        line: record_lines[slot],
                        error: DecodeError::DuplicateGuid(record.guid.clone()),
                    });
                    records[slot] = record;
                    record_lines[slot] = line_number;
                }
                None => {
                    by_guid.insert(record.guid.clone(), records.len());
                    records.push(record);
                    record_lines.push(line_number);
                }
            },
            Err(error) => skipped.push(SkippedLine {
                line: line_number,
                error,
            }),
        }
        ordinal += 1;
    }

    Ok(FileRecords {
        file,
        header,
        records,
        skipped,
    })
}
