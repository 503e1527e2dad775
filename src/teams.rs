//! Recovery of stable two-team rosters from noisy per-round sides.
//!
//! Stopwatch play swaps which human team holds which side between rounds, so
//! the raw side value is useless as an identity. Players are clustered by
//! co-occurrence instead: pairs that keep landing on the same side get a
//! teammate edge, and union-find components of those edges become rosters.
//! Messy public-server data degrades to unassigned players instead of
//! being forced into two teams.

use std::collections::{BTreeMap, HashMap};

use crate::types::{FileRecords, RosterMember, Side, TeamRoster};

/// Edges survive only when the pair shared a side in more than half of the
/// rounds they played together.
const TEAMMATE_RATIO_THRESHOLD: f64 = 0.5;

struct DisjointSet {
    parent: Vec<usize>,
    size: Vec<usize>,
}

impl DisjointSet {
    fn new(len: usize) -> Self {
        Self {
            parent: (0..len).collect(),
            size: vec![1; len],
        }
    }

    fn find(&mut self, mut x: usize) -> usize {
        while self.parent[x] != x {
            self.parent[x] = self.parent[self.parent[x]]; // path halving
            x = self.parent[x];
        }
        x
    }

    fn union(&mut self, a: usize, b: usize) {
        let (mut ra, mut rb) = (self.find(a), self.find(b));
        if ra == rb {
            return;
        }
        if self.size[ra] < self.size[rb] {
            (ra, rb) = (rb, ra);
        }
        self.parent[rb] = ra;
        self.size[ra] += self.size[rb];
    }
}

/// Resolves rosters for a session given one `(guid, side)` lineup per round.
pub fn resolve_rounds(rounds: &[Vec<(&str, Side)>]) -> TeamRoster {
    // BTreeMap keeps player indices (and thus all tie-breaking) deterministic.
    let mut index_of: BTreeMap<&str, usize> = BTreeMap::new();
    for round in rounds {
        for &(guid, _) in round {
            let next = index_of.len();
            index_of.entry(guid).or_insert(next);
        }
    }
    let guids: Vec<&str> = {
        let mut v = vec![""; index_of.len()];
        for (guid, &idx) in &index_of {
            v[idx] = guid;
        }
        v
    };

    // (together, same_side) per unordered player pair.
    let mut edges: HashMap<(usize, usize), (u32, u32)> = HashMap::new();
    for round in rounds {
        let mut lineup: Vec<(usize, Side)> = Vec::with_capacity(round.len());
        for &(guid, side) in round {
            let idx = index_of[guid];
            // A duplicated guid within one round contributes once.
            if !lineup.iter().any(|&(existing, _)| existing == idx) {
                lineup.push((idx, side));
            }
        }

        for i in 0..lineup.len() {
            for j in i + 1..lineup.len() {
                let (a, side_a) = lineup[i];
                let (b, side_b) = lineup[j];
                let key = if a < b { (a, b) } else { (b, a) };
                let entry = edges.entry(key).or_insert((0, 0));
                entry.0 += 1;
                if side_a == side_b {
                    entry.1 += 1;
                }
            }
        }
    }

    let mut set = DisjointSet::new(guids.len());
    let mut ratio_sum = vec![0.0f64; guids.len()];
    let mut edge_count = vec![0u32; guids.len()];
    for (&(a, b), &(together, same_side)) in &edges {
        let ratio = same_side as f64 / together as f64;
        if ratio > TEAMMATE_RATIO_THRESHOLD {
            set.union(a, b);
            ratio_sum[a] += ratio;
            ratio_sum[b] += ratio;
            edge_count[a] += 1;
            edge_count[b] += 1;
        }
    }

    let mut components: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
    for idx in 0..guids.len() {
        // Players with no surviving teammate edge are unassignable even if
        // union-find left them as their own root.
        if edge_count[idx] == 0 {
            continue;
        }
        components.entry(set.find(idx)).or_default().push(idx);
    }

    let mut ranked: Vec<Vec<usize>> = components.into_values().collect();
    ranked.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a[0].cmp(&b[0])));

    let mut roster = TeamRoster::default();
    let member = |idx: usize| RosterMember {
        guid: guids[idx].to_string(),
        confidence: ratio_sum[idx] / edge_count[idx] as f64,
    };

    for (rank, component) in ranked.into_iter().enumerate() {
        match rank {
            0 => roster.roster_a = component.into_iter().map(member).collect(),
            1 => roster.roster_b = component.into_iter().map(member).collect(),
            // More than two components means mixed data, not a two-team
            // match; the remainder is reported, never forced into a roster.
            _ => roster
                .unassigned
                .extend(component.into_iter().map(|idx| guids[idx].to_string())),
        }
    }

    for idx in 0..guids.len() {
        if edge_count[idx] == 0 {
            roster.unassigned.push(guids[idx].to_string());
        }
    }
    roster.unassigned.sort();

    roster
}

/// Resolves rosters across one continuous play session; each decoded file is
/// one round's lineup.
pub fn resolve_teams(session: &[FileRecords]) -> TeamRoster {
    let rounds: Vec<Vec<(&str, Side)>> = session
        .iter()
        .map(|file| {
            file.records
                .iter()
                .map(|record| (record.guid.as_str(), record.side))
                .collect()
        })
        .collect();

    resolve_rounds(&rounds)
}
