//! Fixed weapon-id table. Bit *b* of a record's weapon bitmask refers to
//! entry *b* here; ids past the table decode fine but render as "unknown".

pub const WEAPON_COUNT: usize = 22;

const WEAPON_NAMES: [&str; WEAPON_COUNT] = [
    "knife",
    "luger",
    "colt",
    "mp40",
    "thompson",
    "sten",
    "fg42",
    "panzerfaust",
    "flamethrower",
    "grenade",
    "mortar",
    "dynamite",
    "airstrike",
    "artillery",
    "syringe",
    "smoke",
    "landmine",
    "satchel",
    "grenade_launcher",
    "mg42",
    "garand",
    "k43",
];

pub fn weapon_name(id: u8) -> &'static str {
    WEAPON_NAMES.get(id as usize).copied().unwrap_or("unknown")
}

/// Per-weapon tallies for one player in one round. In round-2 files these
/// are cumulative across both rounds, same as the cumulative extended fields.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct WeaponTally {
    pub hits: i64,
    pub shots: i64,
    pub kills: i64,
    pub deaths: i64,
    pub headshots: i64,
}

impl WeaponTally {
    pub fn from_values(values: &[i64]) -> Self {
        Self {
            hits: values[0],
            shots: values[1],
            kills: values[2],
            deaths: values[3],
            headshots: values[4],
        }
    }

    pub fn accuracy(&self) -> f64 {
        if self.shots > 0 {
            self.hits as f64 / self.shots as f64
        } else {
            0.0
        }
    }
}
