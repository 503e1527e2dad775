//! Differencing of round-2 records against their round-1 baseline.
//!
//! A round-2 file reports cumulative values for some fields and round-local
//! values for others; the policy per field comes from the static semantics
//! table in `fields`. Weapon tallies behave like cumulative fields and are
//! differenced the same way.

use std::collections::HashMap;

use crate::error::ReconstructWarning;
use crate::fields::{Field, Semantics};
use crate::types::{Match, PlayerRoundRecord};
use crate::weapons::weapon_name;

/// A reconstructed round-2 record plus everything worth auditing about it.
#[derive(Clone, Debug, PartialEq)]
pub struct ReconstructResult {
    pub record: PlayerRoundRecord,
    pub warnings: Vec<ReconstructWarning>,
}

/// Per-player outcome of reconstructing a whole match.
#[derive(Clone, Debug, PartialEq)]
pub struct ReconstructReport {
    pub guid: String,
    pub warnings: Vec<ReconstructWarning>,
}

/// Recovers the true round-2-only record from a raw round-2 record.
///
/// Cumulative fields become `r2 - r1`, clamped to zero and flagged
/// `NegativeDelta` when the raw value is below the baseline (an out-of-order
/// or corrupted pair; never clamped silently). Round-local fields pass
/// through. Derived fields are recomputed from the differenced values.
/// Without a baseline (late join, unpaired file) the raw record comes back
/// unchanged, flagged `NoBaselineAvailable`.
pub fn reconstruct_round2(
    r1: Option<&PlayerRoundRecord>,
    r2_raw: &PlayerRoundRecord,
) -> ReconstructResult {
    let Some(r1) = r1 else {
        return ReconstructResult {
            record: r2_raw.clone(),
            warnings: vec![ReconstructWarning::NoBaselineAvailable],
        };
    };

    let mut record = r2_raw.clone();
    let mut warnings = Vec::new();

    for field in Field::ALL {
        match field.semantics() {
            Semantics::Cumulative => {
                let raw = r2_raw.field(field);
                let baseline = r1.field(field);
                if raw < baseline {
                    warnings.push(ReconstructWarning::NegativeDelta {
                        field: field.name(),
                        raw,
                        baseline,
                    });
                    record.set_field(field, 0.0);
                } else {
                    record.set_field(field, raw - baseline);
                }
            }
            Semantics::RoundLocal => {}
            Semantics::Derived => {} // recomputed below, after differencing
        }
    }

    for (&id, tally) in record.weapons.iter_mut() {
        let Some(baseline) = r1.weapons.get(&id) else {
            continue; // weapon first used in round 2
        };
        for (stat, value, base) in [
            ("hits", &mut tally.hits, baseline.hits),
            ("shots", &mut tally.shots, baseline.shots),
            ("kills", &mut tally.kills, baseline.kills),
            ("deaths", &mut tally.deaths, baseline.deaths),
            ("headshots", &mut tally.headshots, baseline.headshots),
        ] {
            if *value < base {
                warnings.push(ReconstructWarning::NegativeWeaponDelta {
                    weapon: weapon_name(id),
                    stat,
                });
                *value = 0;
            } else {
                *value -= base;
            }
        }
    }

    recompute_derived(&mut record);

    ReconstructResult { record, warnings }
}

fn recompute_derived(record: &mut PlayerRoundRecord) {
    let minutes = record.field(Field::TimePlayedMinutes);
    let dpm = if minutes > 0.0 {
        record.field(Field::DamageGiven) / minutes
    } else {
        0.0
    };
    record.set_field(Field::DamagePerMinute, dpm);

    let kills = record.total_kills() as f64;
    let deaths = record.total_deaths() as f64;
    let kdr = if deaths > 0.0 { kills / deaths } else { kills };
    record.set_field(Field::KillDeathRatio, kdr);
}

/// Applies the reconstructor to every round-2 record of a match, pairing
/// players by GUID against the round-1 records. Returns one report per
/// player that produced warnings.
pub fn reconstruct_match(m: &mut Match) -> Vec<ReconstructReport> {
    let Some(round2) = m.round2.as_mut() else {
        return Vec::new();
    };

    let baselines: HashMap<&str, &PlayerRoundRecord> = m
        .round1
        .as_ref()
        .map(|r1| {
            r1.records
                .iter()
                .map(|record| (record.guid.as_str(), record))
                .collect()
        })
        .unwrap_or_default();

    let mut reports = Vec::new();
    for record in round2.records.iter_mut() {
        let result = reconstruct_round2(baselines.get(record.guid.as_str()).copied(), record);
        if !result.warnings.is_empty() {
            reports.push(ReconstructReport {
                guid: record.guid.clone(),
                warnings: result.warnings,
            });
        }
        *record = result.record;
    }

    reports
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::FIELD_COUNT;
    use crate::types::{RecordWarnings, Side};
    use crate::weapons::WeaponTally;
    use std::collections::BTreeMap;

    fn base_record(guid: &str) -> PlayerRoundRecord {
        PlayerRoundRecord {
            guid: guid.to_string(),
            raw_name: guid.to_string(),
            name: guid.to_string(),
            rounds_participated: 2,
            side: Side::Axis,
            ordinal: 0,
            weapons: BTreeMap::new(),
            extended: [0.0; FIELD_COUNT],
            present_fields: FIELD_COUNT,
            warnings: RecordWarnings::new(),
        }
    }

    fn tally(hits: i64, shots: i64, kills: i64, deaths: i64, headshots: i64) -> WeaponTally {
        WeaponTally {
            hits,
            shots,
            kills,
            deaths,
            headshots,
        }
    }

    #[test]
    fn test_cumulative_fields_are_differenced() {
        let mut r1 = base_record("A");
        r1.set_field(Field::DamageGiven, 1500.0);
        r1.set_field(Field::Xp, 80.0);
        r1.set_field(Field::TimePlayedMinutes, 12.0);

        let mut r2 = base_record("A");
        r2.set_field(Field::DamageGiven, 2600.0);
        r2.set_field(Field::Xp, 145.0);
        r2.set_field(Field::TimePlayedMinutes, 23.0);

        let result = reconstruct_round2(Some(&r1), &r2);
        assert!(result.warnings.is_empty());
        assert_eq!(result.record.field(Field::DamageGiven), 1100.0);
        assert_eq!(result.record.field(Field::Xp), 65.0);
        assert_eq!(result.record.field(Field::TimePlayedMinutes), 11.0);
    }

    #[test]
    fn test_round_local_fields_pass_through() {
        let mut r1 = base_record("A");
        r1.set_field(Field::TimeDeadRatio, 0.4);
        r1.set_field(Field::UsefulKills, 9.0);

        let mut r2 = base_record("A");
        r2.set_field(Field::TimeDeadRatio, 0.25);
        r2.set_field(Field::UsefulKills, 6.0);

        let result = reconstruct_round2(Some(&r1), &r2);
        assert_eq!(result.record.field(Field::TimeDeadRatio), 0.25);
        assert_eq!(result.record.field(Field::UsefulKills), 6.0);
    }

    #[test]
    fn test_negative_delta_clamps_and_warns() {
        let mut r1 = base_record("A");
        r1.set_field(Field::Xp, 100.0);

        let mut r2 = base_record("A");
        r2.set_field(Field::Xp, 60.0);

        let result = reconstruct_round2(Some(&r1), &r2);
        assert_eq!(result.record.field(Field::Xp), 0.0);
        assert_eq!(
            result.warnings,
            vec![ReconstructWarning::NegativeDelta {
                field: "xp",
                raw: 60.0,
                baseline: 100.0,
            }]
        );
    }

    #[test]
    fn test_no_baseline_returns_raw_record_flagged() {
        let mut r2 = base_record("A");
        r2.set_field(Field::DamageGiven, 900.0);
        r2.set_field(Field::DamagePerMinute, 123.0);

        let result = reconstruct_round2(None, &r2);
        assert_eq!(result.record, r2);
        assert_eq!(
            result.warnings,
            vec![ReconstructWarning::NoBaselineAvailable]
        );
    }

    #[test]
    fn test_derived_fields_recomputed_from_deltas() {
        let mut r1 = base_record("A");
        r1.set_field(Field::DamageGiven, 1000.0);
        r1.set_field(Field::TimePlayedMinutes, 10.0);
        r1.weapons.insert(3, tally(10, 30, 4, 6, 1));

        let mut r2 = base_record("A");
        r2.set_field(Field::DamageGiven, 2200.0);
        r2.set_field(Field::TimePlayedMinutes, 18.0);
        // Stale derived values that must be ignored.
        r2.set_field(Field::DamagePerMinute, 9999.0);
        r2.set_field(Field::KillDeathRatio, 9999.0);
        r2.weapons.insert(3, tally(25, 70, 10, 9, 3));

        let result = reconstruct_round2(Some(&r1), &r2);
        assert_eq!(result.record.field(Field::DamagePerMinute), 150.0);
        // 6 kills / 3 deaths after differencing.
        assert_eq!(result.record.field(Field::KillDeathRatio), 2.0);
    }

    #[test]
    fn test_derived_guards_zero_time_and_zero_deaths() {
        let r1 = base_record("A");
        let mut r2 = base_record("A");
        r2.weapons.insert(0, tally(1, 1, 3, 0, 0));

        let result = reconstruct_round2(Some(&r1), &r2);
        assert_eq!(result.record.field(Field::DamagePerMinute), 0.0);
        assert_eq!(result.record.field(Field::KillDeathRatio), 3.0);
    }

    #[test]
    fn test_weapon_tallies_are_differenced() {
        let mut r1 = base_record("A");
        r1.weapons.insert(3, tally(20, 60, 5, 2, 3));

        let mut r2 = base_record("A");
        r2.weapons.insert(3, tally(35, 100, 9, 4, 5));
        r2.weapons.insert(7, tally(0, 2, 1, 0, 0));

        let result = reconstruct_round2(Some(&r1), &r2);
        assert!(result.warnings.is_empty());
        assert_eq!(
            result.record.weapons.get(&3),
            Some(&tally(15, 40, 4, 2, 2))
        );
        // Weapon first used in round 2 is already a round-2 value.
        assert_eq!(result.record.weapons.get(&7), Some(&tally(0, 2, 1, 0, 0)));
    }

    #[test]
    fn test_negative_weapon_delta_clamps_and_warns() {
        let mut r1 = base_record("A");
        r1.weapons.insert(3, tally(20, 60, 5, 2, 3));

        let mut r2 = base_record("A");
        r2.weapons.insert(3, tally(10, 70, 6, 2, 3));

        let result = reconstruct_round2(Some(&r1), &r2);
        assert_eq!(
            result.record.weapons.get(&3),
            Some(&tally(0, 10, 1, 0, 0))
        );
        assert_eq!(
            result.warnings,
            vec![ReconstructWarning::NegativeWeaponDelta {
                weapon: "mp40",
                stat: "hits",
            }]
        );
    }

    #[test]
    fn test_reconstruct_without_cumulative_contribution_is_noop() {
        // Round-1 baseline contributed nothing cumulative; differencing must
        // not change the record (derived values included, since they are
        // consistent with the weapon section and time played).
        let r1 = base_record("A");

        let mut r2 = base_record("A");
        r2.set_field(Field::DamageGiven, 500.0);
        r2.set_field(Field::TimePlayedMinutes, 10.0);
        r2.set_field(Field::DamagePerMinute, 50.0);
        r2.weapons.insert(3, tally(10, 30, 4, 2, 1));
        r2.set_field(Field::KillDeathRatio, 2.0);

        let result = reconstruct_round2(Some(&r1), &r2);
        assert!(result.warnings.is_empty());
        assert_eq!(result.record, r2);
    }

    #[test]
    fn test_reconstruct_match_pairs_by_guid() {
        use crate::decoder::decode_header;
        use crate::types::{FileRecords, Match, StatsFileName};
        use chrono::NaiveDate;

        let header = decode_header("srv\\supply\\stopwatch\\1\\1\\2\\15:00\\12:34").unwrap();
        let ts = NaiveDate::from_ymd_opt(2025, 1, 1)
            .unwrap()
            .and_hms_opt(20, 0, 0)
            .unwrap();
        let file = |round: u8| StatsFileName {
            raw: format!("2025-01-01-200000-supply-round-{round}.txt"),
            timestamp: ts,
            map: "supply".to_string(),
            round,
        };

        let mut r1_rec = base_record("A");
        r1_rec.set_field(Field::Xp, 50.0);
        let mut r2_rec = base_record("A");
        r2_rec.set_field(Field::Xp, 80.0);
        let late_join = base_record("B");

        let mut m = Match {
            id: 1,
            day: ts.date(),
            map: "supply".to_string(),
            round1: Some(FileRecords {
                file: file(1),
                header: header.clone(),
                records: vec![r1_rec],
                skipped: vec![],
            }),
            round2: Some(FileRecords {
                file: file(2),
                header,
                records: vec![r2_rec, late_join],
                skipped: vec![],
            }),
            warnings: vec![],
        };

        let reports = reconstruct_match(&mut m);
        let round2 = m.round2.as_ref().unwrap();
        assert_eq!(round2.records[0].field(Field::Xp), 30.0);
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].guid, "B");
        assert_eq!(
            reports[0].warnings,
            vec![ReconstructWarning::NoBaselineAvailable]
        );
    }
}
