//! JSON rendering of assembled matches and rosters for the consuming bot /
//! persistence layer. Output is a plain string; the caller owns transport.

use serde_json::{Value, json};

use crate::fields::Field;
use crate::types::{FileRecords, Match, PlayerRoundRecord, RoundTime, TeamRoster};
use crate::weapons::weapon_name;

fn round_time_to_json(time: RoundTime) -> Value {
    match time.as_seconds() {
        Some(seconds) => json!(seconds),
        None => Value::Null,
    }
}

fn player_to_json(record: &PlayerRoundRecord) -> Value {
    let weapons: Vec<Value> = record
        .weapons
        .iter()
        .map(|(&id, tally)| {
            json!({
                "weapon": weapon_name(id),
                "hits": tally.hits,
                "shots": tally.shots,
                "kills": tally.kills,
                "deaths": tally.deaths,
                "headshots": tally.headshots,
            })
        })
        .collect();

    json!({
        "guid": record.guid,
        "name": record.name,
        "side": record.side.name(),
        "kills": record.total_kills(),
        "deaths": record.total_deaths(),
        "damage_given": record.field(Field::DamageGiven),
        "damage_received": record.field(Field::DamageReceived),
        "xp": record.field(Field::Xp),
        "damage_per_minute": record.field(Field::DamagePerMinute),
        "kill_death_ratio": record.field(Field::KillDeathRatio),
        "revives_given": record.field(Field::RevivesGiven),
        "weapons": weapons,
        "warnings": record.warnings.iter().map(|w| w.to_string()).collect::<Vec<_>>(),
    })
}

fn file_to_json(file: &FileRecords) -> Value {
    json!({
        "file": file.file.raw,
        "timestamp": file.file.timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
        "map": file.header.map,
        "mode": file.header.mode,
        "defender": file.header.defender.map(|s| s.name()),
        "winner": file.header.winner.map(|s| s.name()),
        "time_limit_seconds": round_time_to_json(file.header.time_limit),
        "actual_time_seconds": round_time_to_json(file.header.actual_time),
        "players": file.records.iter().map(player_to_json).collect::<Vec<_>>(),
        "skipped": file.skipped.iter().map(|s| {
            json!({ "line": s.line, "error": s.error.to_string() })
        }).collect::<Vec<_>>(),
    })
}

pub fn match_to_json(m: &Match) -> String {
    json!({
        "id": m.id,
        "day": m.day.format("%Y-%m-%d").to_string(),
        "map": m.map,
        "round1": m.round1.as_ref().map(file_to_json),
        "round2": m.round2.as_ref().map(file_to_json),
        "warnings": m.warnings.iter().map(|w| w.to_string()).collect::<Vec<_>>(),
    })
    .to_string()
}

pub fn roster_to_json(roster: &TeamRoster) -> String {
    let members = |list: &[crate::types::RosterMember]| -> Vec<Value> {
        list.iter()
            .map(|m| json!({ "guid": m.guid, "confidence": m.confidence }))
            .collect()
    };

    json!({
        "roster_a": members(&roster.roster_a),
        "roster_b": members(&roster.roster_b),
        "unassigned": roster.unassigned,
    })
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MatchWarning;
    use crate::types::RosterMember;
    use chrono::NaiveDate;

    #[test]
    fn test_match_to_json_round2_null_when_unpaired() {
        let file = crate::types::StatsFileName::parse("2025-01-01-200000-supply-round-1.txt")
            .unwrap();
        let header =
            crate::decoder::decode_header("srv\\supply\\stopwatch\\1\\1\\2\\15:00\\-1").unwrap();
        let m = Match {
            id: 3,
            day: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            map: "supply".to_string(),
            round1: Some(FileRecords {
                file,
                header,
                records: vec![],
                skipped: vec![],
            }),
            round2: None,
            warnings: vec![MatchWarning::UnpairedRound(1)],
        };

        let parsed: Value = serde_json::from_str(&match_to_json(&m)).unwrap();
        assert_eq!(parsed["id"], 3);
        assert_eq!(parsed["day"], "2025-01-01");
        assert!(parsed["round2"].is_null());
        assert_eq!(parsed["round1"]["actual_time_seconds"], Value::Null);
        assert_eq!(parsed["round1"]["time_limit_seconds"], 900);
        assert_eq!(parsed["warnings"][0], "only round 1 present");
    }

    #[test]
    fn test_roster_to_json_shape() {
        let roster = TeamRoster {
            roster_a: vec![RosterMember {
                guid: "A".to_string(),
                confidence: 1.0,
            }],
            roster_b: vec![],
            unassigned: vec!["Z".to_string()],
        };

        let parsed: Value = serde_json::from_str(&roster_to_json(&roster)).unwrap();
        assert_eq!(parsed["roster_a"][0]["guid"], "A");
        assert_eq!(parsed["roster_a"][0]["confidence"], 1.0);
        assert_eq!(parsed["roster_b"].as_array().unwrap().len(), 0);
        assert_eq!(parsed["unassigned"][0], "Z");
    }
}
