//! Reconstruction of per-round player and team statistics from the
//! telemetry files a game-server mod writes after every round.
//!
//! The pipeline: decode each file's header and player records, pair
//! round-1/round-2 files into matches, difference the cumulative round-2
//! values against their round-1 baselines, and cluster noisy per-round side
//! assignments into stable team rosters. Everything is a pure in-memory
//! transform; persistence, transport and presentation belong to the caller.

mod assembler;
mod decoder;
mod error;
mod fields;
mod json;
mod loader;
mod log;
mod reconstruct;
mod teams;
mod types;
mod weapons;

pub use assembler::assemble_matches;
pub use decoder::{decode_file, decode_header, decode_record, strip_color_codes};
pub use error::{DecodeError, LoadError, MatchWarning, ReconstructWarning, RecordWarning};
pub use fields::{FIELD_COUNT, Field, MIN_FIELD_COUNT, Semantics};
pub use json::{match_to_json, roster_to_json};
pub use loader::load_files;
pub use reconstruct::{ReconstructReport, ReconstructResult, reconstruct_match, reconstruct_round2};
pub use teams::{resolve_rounds, resolve_teams};
pub use types::{
    FileRecords, Match, MatchHeader, PlayerRoundRecord, RecordWarnings, RosterMember, RoundTime,
    Side, SkippedLine, StatsFileName, TeamRoster,
};
pub use weapons::{WEAPON_COUNT, WeaponTally, weapon_name};

#[cfg(test)]
mod tests {
    use super::*;

    fn extended(values: &[(Field, f64)]) -> String {
        let mut fields = [0.0f64; FIELD_COUNT];
        for &(field, value) in values {
            fields[field.index()] = value;
        }
        fields
            .iter()
            .map(|v| v.to_string())
            .collect::<Vec<_>>()
            .join("\t")
    }

    fn stats_file(name: &str, lines: &[String]) -> FileRecords {
        let file = StatsFileName::parse(name).unwrap();
        let contents = format!(
            "srv\\{}\\stopwatch\\{}\\1\\2\\15:00\\12:34\n{}",
            file.map,
            file.round,
            lines.join("\n")
        );
        decode_file(file, &contents).unwrap()
    }

    fn player_line(guid: &str, side: u32, xp: f64, weapon_block: &str) -> String {
        format!(
            "{guid}\\{guid}\\2\\{side}\\{weapon_block}\t{}",
            extended(&[
                (Field::Xp, xp),
                (Field::DamageGiven, xp * 10.0),
                (Field::TimePlayedMinutes, 10.0),
            ])
        )
    }

    // End-to-end: decode, assemble, reconstruct, resolve.
    #[test]
    fn test_full_pipeline_over_one_stopwatch_match() {
        let r1 = stats_file(
            "2025-01-01-200000-supply-round-1.txt",
            &[
                player_line("AAA", 1, 40.0, "1 10 30 4 2 1"),
                player_line("BBB", 1, 30.0, "0"),
                player_line("CCC", 2, 25.0, "0"),
                player_line("DDD", 2, 35.0, "0"),
            ],
        );
        // Sides swapped, cumulative values grown.
        let r2 = stats_file(
            "2025-01-01-201500-supply-round-2.txt",
            &[
                player_line("AAA", 2, 90.0, "1 25 70 9 5 2"),
                player_line("BBB", 2, 55.0, "0"),
                player_line("CCC", 1, 60.0, "0"),
                player_line("DDD", 1, 70.0, "0"),
            ],
        );

        let session = vec![r1.clone(), r2.clone()];
        let mut matches = assemble_matches(vec![r1, r2]);
        assert_eq!(matches.len(), 1);
        let m = &mut matches[0];
        assert!(m.warnings.is_empty());

        let reports = reconstruct_match(m);
        assert!(reports.is_empty());

        let round2 = m.round2.as_ref().unwrap();
        let aaa = round2.records.iter().find(|r| r.guid == "AAA").unwrap();
        assert_eq!(aaa.field(Field::Xp), 50.0);
        assert_eq!(aaa.weapons.get(&0).unwrap().kills, 5);
        assert_eq!(aaa.weapons.get(&0).unwrap().deaths, 3);

        let roster = resolve_teams(&session);
        let side_a: Vec<&str> = roster.roster_a.iter().map(|m| m.guid.as_str()).collect();
        let side_b: Vec<&str> = roster.roster_b.iter().map(|m| m.guid.as_str()).collect();
        assert_eq!(side_a, vec!["AAA", "BBB"]);
        assert_eq!(side_b, vec!["CCC", "DDD"]);
        assert!(roster.unassigned.is_empty());

        let rendered = match_to_json(m);
        assert!(rendered.contains("\"map\":\"supply\""));
    }
}
