//! Declarative placement rules. Rules are plain data, independent of any
//! particular level's geometry; the same rule set works across seeds.

use serde::{Deserialize, Serialize};

/// Names a room or a room class. Resolution happens against the generated
/// level, so a selector written once keeps working for every seed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoomSelector {
    ControlRoom,
    BossRoom,
    MiniBossRoom,
    /// The non-boss room whose center is closest to the boss room.
    NearestToBoss,
    /// Every normal room.
    Normal,
    /// One room by tag, e.g. `"normal-3"`.
    Tagged(String),
}

/// Inclusive per-room count bounds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountRange {
    pub min: usize,
    pub max: usize,
}

/// One placement directive. Rules run in declaration order; every handler is
/// best-effort and never blocks the rules after it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PlacementRule {
    /// The player spawn, always on the level's start tile.
    Hero,
    /// Patients across normal rooms, each with a best-effort pill and bell
    /// nearby sharing the patient's id.
    Patients { count: usize, per_room: CountRange },
    Npcs { count: usize },
    Enemies { count: usize },
    Carts { count: usize },
    /// Mirrors the doorway cells the corridor carver opened in the grid.
    Doors,
    /// Named room-to-room connections; each satisfied link yields a pair of
    /// records sharing a pair id.
    Elevators { links: Vec<(RoomSelector, RoomSelector)>, forbidden: Vec<RoomSelector> },
    Phone { at: RoomSelector, unique: bool },
    /// Per-room lights; `broken_fraction` of all light records (across every
    /// lights rule) is flagged broken in a global final pass.
    Lights { per_room: usize, broken_fraction: f64 },
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RuleSet {
    pub rules: Vec<PlacementRule>,
}

impl RuleSet {
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }
}

impl Default for RuleSet {
    fn default() -> Self {
        Self {
            rules: vec![
                PlacementRule::Hero,
                PlacementRule::Patients { count: 5, per_room: CountRange { min: 0, max: 2 } },
                PlacementRule::Npcs { count: 3 },
                PlacementRule::Enemies { count: 4 },
                PlacementRule::Carts { count: 3 },
                PlacementRule::Doors,
                PlacementRule::Elevators {
                    links: vec![(RoomSelector::ControlRoom, RoomSelector::NearestToBoss)],
                    forbidden: vec![RoomSelector::BossRoom],
                },
                PlacementRule::Phone { at: RoomSelector::ControlRoom, unique: true },
                PlacementRule::Lights { per_room: 2, broken_fraction: 0.2 },
            ],
        }
    }
}
