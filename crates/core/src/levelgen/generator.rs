//! Generation orchestration: plan, connect, repair, gate, validate, seal,
//! densify. Each attempt either yields a fully validated level or a typed
//! failure; the retry loop re-jitters parameters and tries again.

use std::collections::BTreeSet;

use crate::types::{Pos, RoomKind};

use super::connectivity::{flood_fill, reached_at, repair_reachability, verify_gate};
use super::corridors::{carve_corridor, carve_corridor_with_axis, spanning_pairs};
use super::density::densify;
use super::graph::RoomGraph;
use super::grid::Grid;
use super::model::{GeneratedLevel, LevelParams};
use super::rng::RandomStream;
use super::rooms::{carve_room, plan_rooms};

pub const MAX_GENERATION_ATTEMPTS: u32 = 40;

const MIN_MAP_WIDTH: usize = 24;
const MIN_MAP_HEIGHT: usize = 20;
const MAX_CORRIDOR_WIDTH: usize = 3;
/// Bounds for the per-attempt walkable-occupancy jitter.
const FILL_RATIO_MIN: f64 = 0.35;
const FILL_RATIO_MAX: f64 = 0.8;
const FILL_RATIO_JITTER: f64 = 0.06;
/// Rooms claim only this share of the walkable budget; corridors and the
/// density filler supply the rest.
const ROOM_AREA_SHARE: f64 = 0.65;
/// Each retry shrinks the planner budget a little more, so rejection sampling
/// always finds a packable layout within the attempt cap.
const ROOM_FILL_DECAY_PER_ATTEMPT: f64 = 0.015;
const ROOM_FILL_MIN: f64 = 0.18;
const ROOM_FILL_MAX: f64 = 0.38;

/// Why a single attempt was abandoned. Recoverable: the orchestrator retries.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AttemptFailure {
    /// Room rejection sampling or miniboss promotion ran out of attempts.
    RoomPlanning,
    /// Connectivity repair exceeded its carve budget.
    RepairBudget,
    /// A room center stayed unreachable after repair and gate carving.
    UnreachableRoom,
    /// No gate-corridor orientation produced a sole path to the boss room.
    GateViolation,
    /// Density filling opened a bypass around the gate room.
    GateViolationAfterDensify,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GenerationError {
    InvalidParams { reason: &'static str },
    /// Every attempt failed; the parameter combination is unsatisfiable.
    AttemptsExhausted { attempts: u32, last_failure: AttemptFailure },
}

pub struct LevelGenerator {
    params: LevelParams,
}

impl LevelGenerator {
    pub fn new(params: LevelParams) -> Self {
        Self { params }
    }

    pub fn generate(&self) -> Result<GeneratedLevel, GenerationError> {
        self.validate_params()?;

        let mut last_failure = AttemptFailure::RoomPlanning;
        for attempt in 0..MAX_GENERATION_ATTEMPTS {
            let mut rng = RandomStream::for_attempt(self.params.seed, attempt);
            match self.attempt(attempt, &mut rng) {
                Ok(level) => return Ok(level),
                Err(failure) => last_failure = failure,
            }
        }
        Err(GenerationError::AttemptsExhausted {
            attempts: MAX_GENERATION_ATTEMPTS,
            last_failure,
        })
    }

    fn validate_params(&self) -> Result<(), GenerationError> {
        let params = &self.params;
        if params.width < MIN_MAP_WIDTH || params.height < MIN_MAP_HEIGHT {
            return Err(GenerationError::InvalidParams { reason: "map too small" });
        }
        if params.target_room_count < 4 {
            return Err(GenerationError::InvalidParams {
                reason: "need control, boss, miniboss and at least one normal room",
            });
        }
        if params.corridor_width == 0 || params.corridor_width > MAX_CORRIDOR_WIDTH {
            return Err(GenerationError::InvalidParams { reason: "corridor width out of range" });
        }
        if !(0.0..1.0).contains(&params.occupancy_ratio_target) {
            return Err(GenerationError::InvalidParams {
                reason: "occupancy target must be in [0, 1)",
            });
        }
        Ok(())
    }

    fn attempt(
        &self,
        attempt: u32,
        rng: &mut RandomStream,
    ) -> Result<GeneratedLevel, AttemptFailure> {
        let params = &self.params;
        let occupancy = rng
            .jitter(params.occupancy_ratio_target, FILL_RATIO_JITTER)
            .clamp(FILL_RATIO_MIN, FILL_RATIO_MAX);
        // The occupancy target counts rooms plus corridors plus fillers, so
        // the planner only packs a share of it; later attempts relax it
        // further.
        let relax = 1.0 - ROOM_FILL_DECAY_PER_ATTEMPT * f64::from(attempt);
        let room_fill =
            (occupancy * ROOM_AREA_SHARE * relax).clamp(ROOM_FILL_MIN, ROOM_FILL_MAX);

        // Planning.
        let rooms =
            plan_rooms(params.width, params.height, params.target_room_count, room_fill, rng)
                .ok_or(AttemptFailure::RoomPlanning)?;
        let mut grid = Grid::filled(params.width, params.height, crate::types::CellKind::Wall);
        for room in &rooms {
            carve_room(&mut grid, room);
        }

        let boss_index = rooms
            .iter()
            .position(|room| room.kind == RoomKind::Boss)
            .expect("planner always tags a boss room");
        let miniboss_index = rooms
            .iter()
            .position(|room| room.kind == RoomKind::MiniBoss)
            .expect("planner always promotes a miniboss room");
        let start_tile = grid.nearest_walkable(rooms[0].center());

        // Connecting: spanning corridors over everything except the boss room,
        // which stays sealed until the gate corridor opens it.
        let mut graph = RoomGraph::new(rooms.len());
        let included: Vec<usize> = (0..rooms.len()).filter(|&index| index != boss_index).collect();
        for (from_index, to_index) in spanning_pairs(&rooms, &included) {
            carve_corridor(&mut grid, &rooms, from_index, to_index, params.corridor_width, rng);
            graph.add_edge(from_index, to_index);
        }

        // Repairing.
        repair_reachability(&mut grid, &rooms, &mut graph, start_tile, params.corridor_width, rng)
            .map_err(|()| AttemptFailure::RepairBudget)?;

        // Gate carving: the only corridor into the boss room. Both L
        // orientations are tried; whichever preserves the gate property wins.
        let first_axis = rng.chance(0.5);
        let mut gate_tiles: Option<Vec<Pos>> = None;
        for horizontal_first in [first_axis, !first_axis] {
            let mut trial = grid.clone();
            let tiles = carve_corridor_with_axis(
                &mut trial,
                &rooms,
                miniboss_index,
                boss_index,
                params.corridor_width,
                horizontal_first,
            );
            if verify_gate(&trial, start_tile, &rooms[miniboss_index], &rooms[boss_index]) {
                grid = trial;
                gate_tiles = Some(tiles);
                break;
            }
        }
        let gate_tiles: BTreeSet<Pos> =
            gate_tiles.ok_or(AttemptFailure::GateViolation)?.into_iter().collect();
        graph.add_edge(miniboss_index, boss_index);

        // Validating.
        let mask = flood_fill(&grid, start_tile, None);
        for room in &rooms {
            if !reached_at(&mask, &grid, room.center()) {
                return Err(AttemptFailure::UnreachableRoom);
            }
        }

        // Sealing.
        grid.seal_border();

        // Densifying, then re-verifying the gate: filler corridors must never
        // have opened a second way into the boss room.
        densify(
            &mut grid,
            &rooms,
            params.occupancy_ratio_target,
            params.corridor_width,
            &gate_tiles,
            rng,
        );
        if !verify_gate(&grid, start_tile, &rooms[miniboss_index], &rooms[boss_index]) {
            return Err(AttemptFailure::GateViolationAfterDensify);
        }

        Ok(GeneratedLevel {
            grid,
            rooms,
            graph,
            control_room: 0,
            boss_room: boss_index,
            miniboss_room: miniboss_index,
            start_tile,
        })
    }
}
