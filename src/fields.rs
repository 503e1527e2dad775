//! Extended-field layout and per-field round semantics.
//!
//! Round-2 files report some statistics summed across both rounds and others
//! for round 2 alone; the server never documents which is which. The
//! classification lives in one const table so a misclassified field is a
//! one-line fix.

/// Number of tab-separated extended fields in a current-build record.
pub const FIELD_COUNT: usize = 38;

/// Older server builds drop the trailing field; 37 is still decodable.
pub const MIN_FIELD_COUNT: usize = 37;

/// How a field behaves in a round-2 file.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Semantics {
    /// Round-2 value already includes round 1; recover round 2 by differencing.
    Cumulative,
    /// Correct as-is for whichever round the file represents.
    RoundLocal,
    /// Computed from other fields; recomputed after differencing, never copied.
    Derived,
}

/// One extended field, in on-disk order.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Field {
    DamageGiven = 0,
    DamageReceived = 1,
    TeamDamageGiven = 2,
    TeamDamageReceived = 3,
    Gibs = 4,
    SelfKills = 5,
    TeamKills = 6,
    TeamGibs = 7,
    TimePlayedPercent = 8,
    Xp = 9,
    KillingSpree = 10,
    DeathSpree = 11,
    KillAssists = 12,
    KillSteals = 13,
    HeadshotKills = 14,
    ObjectivesStolen = 15,
    ObjectivesReturned = 16,
    DynamitesPlanted = 17,
    DynamitesDefused = 18,
    TimesRevived = 19,
    BulletsFired = 20,
    DamagePerMinute = 21,
    TimePlayedMinutes = 22,
    TankMeatshieldScore = 23,
    TimeDeadRatio = 24,
    TimeDeadMinutes = 25,
    KillDeathRatio = 26,
    // TODO: confirm the 27..=29 ordering (useful_kills vs. the multikill
    // boundary) against a live server sample; two field-order corrections
    // circulate and they disagree exactly here.
    UsefulKills = 27,
    DeniedPlaytime = 28,
    Multikill2x = 29,
    Multikill3x = 30,
    Multikill4x = 31,
    Multikill5x = 32,
    Multikill6x = 33,
    UselessKills = 34,
    FullSelfKills = 35,
    Repairs = 36,
    RevivesGiven = 37,
}

struct FieldDef {
    name: &'static str,
    semantics: Semantics,
}

const FIELDS: [FieldDef; FIELD_COUNT] = [
    FieldDef {
        name: "damage_given",
        semantics: Semantics::Cumulative,
    },
    FieldDef {
        name: "damage_received",
        semantics: Semantics::Cumulative,
    },
    FieldDef {
        name: "team_damage_given",
        semantics: Semantics::Cumulative,
    },
    FieldDef {
        name: "team_damage_received",
        semantics: Semantics::Cumulative,
    },
    FieldDef {
        name: "gibs",
        semantics: Semantics::Cumulative,
    },
    FieldDef {
        name: "self_kills",
        semantics: Semantics::Cumulative,
    },
    FieldDef {
        name: "team_kills",
        semantics: Semantics::Cumulative,
    },
    FieldDef {
        name: "team_gibs",
        semantics: Semantics::Cumulative,
    },
    FieldDef {
        name: "time_played_pct",
        semantics: Semantics::RoundLocal,
    },
    FieldDef {
        name: "xp",
        semantics: Semantics::Cumulative,
    },
    FieldDef {
        name: "killing_spree",
        semantics: Semantics::RoundLocal,
    },
    FieldDef {
        name: "death_spree",
        semantics: Semantics::RoundLocal,
    },
    FieldDef {
        name: "kill_assists",
        semantics: Semantics::Cumulative,
    },
    FieldDef {
        name: "kill_steals",
        semantics: Semantics::Cumulative,
    },
    FieldDef {
        name: "headshot_kills",
        semantics: Semantics::Cumulative,
    },
    FieldDef {
        name: "objectives_stolen",
        semantics: Semantics::Cumulative,
    },
    FieldDef {
        name: "objectives_returned",
        semantics: Semantics::Cumulative,
    },
    FieldDef {
        name: "dynamites_planted",
        semantics: Semantics::Cumulative,
    },
    FieldDef {
        name: "dynamites_defused",
        semantics: Semantics::Cumulative,
    },
    FieldDef {
        name: "times_revived",
        semantics: Semantics::Cumulative,
    },
    FieldDef {
        name: "bullets_fired",
        semantics: Semantics::Cumulative,
    },
    FieldDef {
        name: "damage_per_minute",
        semantics: Semantics::Derived,
    },
    FieldDef {
        name: "time_played_minutes",
        semantics: Semantics::Cumulative,
    },
    FieldDef {
        name: "tank_meatshield_score",
        semantics: Semantics::RoundLocal,
    },
    FieldDef {
        name: "time_dead_ratio",
        semantics: Semantics::RoundLocal,
    },
    FieldDef {
        name: "time_dead_minutes",
        semantics: Semantics::Cumulative,
    },
    FieldDef {
        name: "kill_death_ratio",
        semantics: Semantics::Derived,
    },
    FieldDef {
        name: "useful_kills",
        semantics: Semantics::RoundLocal,
    },
    FieldDef {
        name: "denied_playtime",
        semantics: Semantics::RoundLocal,
    },
    FieldDef {
        name: "multikill_2x",
        semantics: Semantics::Cumulative,
    },
    FieldDef {
        name: "multikill_3x",
        semantics: Semantics::Cumulative,
    },
    FieldDef {
        name: "multikill_4x",
        semantics: Semantics::Cumulative,
    },
    FieldDef {
        name: "multikill_5x",
        semantics: Semantics::Cumulative,
    },
    FieldDef {
        name: "multikill_6x",
        semantics: Semantics::Cumulative,
    },
    FieldDef {
        name: "useless_kills",
        semantics: Semantics::RoundLocal,
    },
    FieldDef {
        name: "full_self_kills",
        semantics: Semantics::Cumulative,
    },
    FieldDef {
        name: "repairs_constructions",
        semantics: Semantics::Cumulative,
    },
    FieldDef {
        name: "revives_given",
        semantics: Semantics::Cumulative,
    },
];

impl Field {
    pub const ALL: [Field; FIELD_COUNT] = [
        Field::DamageGiven,
        Field::DamageReceived,
        Field::TeamDamageGiven,
        Field::TeamDamageReceived,
        Field::Gibs,
        Field::SelfKills,
        Field::TeamKills,
        Field::TeamGibs,
        Field::TimePlayedPercent,
        Field::Xp,
        Field::KillingSpree,
        Field::DeathSpree,
        Field::KillAssists,
        Field::KillSteals,
        Field::HeadshotKills,
        Field::ObjectivesStolen,
        Field::ObjectivesReturned,
        Field::DynamitesPlanted,
        Field::DynamitesDefused,
        Field::TimesRevived,
        Field::BulletsFired,
        Field::DamagePerMinute,
        Field::TimePlayedMinutes,
        Field::TankMeatshieldScore,
        Field::TimeDeadRatio,
        Field::TimeDeadMinutes,
        Field::KillDeathRatio,
        Field::UsefulKills,
        Field::DeniedPlaytime,
        Field::Multikill2x,
        Field::Multikill3x,
        Field::Multikill4x,
        Field::Multikill5x,
        Field::Multikill6x,
        Field::UselessKills,
        Field::FullSelfKills,
        Field::Repairs,
        Field::RevivesGiven,
    ];

    pub const fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        FIELDS[self.index()].name
    }

    pub fn semantics(self) -> Semantics {
        FIELDS[self.index()].semantics
    }

    pub fn from_index(index: usize) -> Option<Field> {
        Self::ALL.get(index).copied()
    }
}
