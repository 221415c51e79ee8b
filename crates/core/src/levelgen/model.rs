//! Public data model for level parameters and finished levels.

use xxhash_rust::xxh3::xxh3_64;

use crate::types::{Pos, RoomKind};

use super::graph::RoomGraph;
use super::grid::Grid;
use super::rooms::Room;

/// Inputs for one deterministic generation. The same parameters always
/// reproduce the same level, so persisting the seed is enough to persist the
/// level.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LevelParams {
    pub width: usize,
    pub height: usize,
    pub target_room_count: usize,
    pub corridor_width: usize,
    /// Soft walkable-tile ratio the density filler works toward.
    pub occupancy_ratio_target: f64,
    pub seed: u64,
}

impl Default for LevelParams {
    fn default() -> Self {
        Self {
            width: 60,
            height: 40,
            target_room_count: 8,
            corridor_width: 2,
            occupancy_ratio_target: 0.5,
            seed: 42,
        }
    }
}

/// A finished, validated level. Never exposed in a partial state: every value
/// of this type has a sealed border, fully reachable rooms, and a holding
/// gate property.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GeneratedLevel {
    pub grid: Grid,
    pub rooms: Vec<Room>,
    pub graph: RoomGraph,
    pub control_room: usize,
    pub boss_room: usize,
    pub miniboss_room: usize,
    /// Walkable tile at the control room's open center; spawn point and the
    /// origin for all reachability queries.
    pub start_tile: Pos,
}

impl GeneratedLevel {
    pub fn room(&self, index: usize) -> &Room {
        &self.rooms[index]
    }

    pub fn rooms_of_kind(&self, kind: RoomKind) -> impl Iterator<Item = (usize, &Room)> {
        self.rooms.iter().enumerate().filter(move |(_, room)| room.kind == kind)
    }

    /// Stable byte encoding of everything that defines the layout. Two levels
    /// are identical exactly when their canonical bytes are.
    pub fn canonical_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::new();
        bytes.extend((self.grid.width() as u32).to_le_bytes());
        bytes.extend((self.grid.height() as u32).to_le_bytes());
        for cell in self.grid.cells() {
            bytes.push(cell.code());
        }

        bytes.extend((self.rooms.len() as u32).to_le_bytes());
        for room in &self.rooms {
            bytes.extend((room.x as u32).to_le_bytes());
            bytes.extend((room.y as u32).to_le_bytes());
            bytes.extend((room.width as u32).to_le_bytes());
            bytes.extend((room.height as u32).to_le_bytes());
            bytes.push(match room.kind {
                RoomKind::Control => 0,
                RoomKind::Boss => 1,
                RoomKind::MiniBoss => 2,
                RoomKind::Normal => 3,
            });
        }

        bytes.extend((self.control_room as u32).to_le_bytes());
        bytes.extend((self.boss_room as u32).to_le_bytes());
        bytes.extend((self.miniboss_room as u32).to_le_bytes());
        bytes.extend(self.start_tile.y.to_le_bytes());
        bytes.extend(self.start_tile.x.to_le_bytes());

        for room in 0..self.graph.room_count() {
            for neighbor in self.graph.neighbors(room) {
                if neighbor > room {
                    bytes.extend((room as u32).to_le_bytes());
                    bytes.extend((neighbor as u32).to_le_bytes());
                }
            }
        }
        bytes
    }

    pub fn fingerprint(&self) -> u64 {
        xxh3_64(&self.canonical_bytes())
    }
}
