//! Placement output records, the engine's only product. Consumers translate
//! tile coordinates to pixels themselves.

use serde::{Deserialize, Serialize};

use crate::types::Pos;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    Hero,
    Patient,
    Pill,
    Bell,
    Npc,
    Enemy,
    Cart,
    Door,
    BossDoor,
    Elevator,
    Phone,
    Light,
}

/// Per-kind payload. `Linked` ties a pill or bell back to its patient.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordMeta {
    None,
    Patient { id: u32, name: String },
    Linked { id: u32 },
    Elevator { pair_id: u32 },
    Light { broken: bool },
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlacementRecord {
    #[serde(rename = "type")]
    pub kind: RecordKind,
    pub tile_x: i32,
    pub tile_y: i32,
    #[serde(rename = "metadata")]
    pub meta: RecordMeta,
}

impl PlacementRecord {
    pub fn at(kind: RecordKind, tile: Pos) -> Self {
        Self { kind, tile_x: tile.x, tile_y: tile.y, meta: RecordMeta::None }
    }

    pub fn tile(&self) -> Pos {
        Pos { y: self.tile_y, x: self.tile_x }
    }
}
