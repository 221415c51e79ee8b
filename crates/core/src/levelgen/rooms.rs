//! Room geometry and the rejection-sampling room planner.

use crate::types::{CellKind, Pos, RoomKind};

use super::grid::Grid;
use super::rng::RandomStream;

/// Interior margin between any room and the map border.
pub(super) const MAP_MARGIN: usize = 2;
/// Smallest allowed room side.
pub(super) const MIN_ROOM_SIDE: usize = 6;

const PLACEMENT_ATTEMPTS: usize = 90;
const BOSS_CANDIDATE_SAMPLES: usize = 24;

const CONTROL_AREA_WEIGHT: f64 = 1.15;
const BOSS_AREA_WEIGHT: f64 = 1.4;
const MINIBOSS_AREA_WEIGHT: f64 = 1.2;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Room {
    pub x: usize,
    pub y: usize,
    pub width: usize,
    pub height: usize,
    pub kind: RoomKind,
}

impl Room {
    pub fn right(&self) -> usize {
        self.x + self.width - 1
    }

    pub fn bottom(&self) -> usize {
        self.y + self.height - 1
    }

    pub fn center(&self) -> Pos {
        Pos { y: (self.y + self.height / 2) as i32, x: (self.x + self.width / 2) as i32 }
    }

    pub fn expanded(&self, margin: usize) -> Room {
        let expanded_x = self.x.saturating_sub(margin);
        let expanded_y = self.y.saturating_sub(margin);
        Room {
            x: expanded_x,
            y: expanded_y,
            width: self.right() + margin - expanded_x + 1,
            height: self.bottom() + margin - expanded_y + 1,
            kind: self.kind,
        }
    }

    pub fn intersects(&self, other: &Room) -> bool {
        self.x <= other.right()
            && self.right() >= other.x
            && self.y <= other.bottom()
            && self.bottom() >= other.y
    }

    pub fn contains(&self, pos: Pos) -> bool {
        if pos.x < 0 || pos.y < 0 {
            return false;
        }
        let px = pos.x as usize;
        let py = pos.y as usize;
        px >= self.x && px <= self.right() && py >= self.y && py <= self.bottom()
    }

    pub fn floor_kind(&self) -> CellKind {
        match self.kind {
            RoomKind::Control => CellKind::ControlFloor,
            RoomKind::Boss => CellKind::BossFloor,
            RoomKind::MiniBoss => CellKind::MiniBossFloor,
            RoomKind::Normal => CellKind::Floor,
        }
    }
}

/// Plans non-overlapping rooms from an area budget. Returns `None` when
/// rejection sampling or miniboss promotion is exhausted; the caller retries
/// the whole attempt with re-jittered parameters.
///
/// Slot order is fixed: control, boss, then normals. The miniboss is promoted
/// from the normal pool afterwards, so one normal slot carries an enlarged
/// area share up front.
pub(super) fn plan_rooms(
    width: usize,
    height: usize,
    room_count: usize,
    fill_ratio: f64,
    rng: &mut RandomStream,
) -> Option<Vec<Room>> {
    if room_count < 4 {
        return None;
    }

    let mut weights = vec![1.0_f64; room_count];
    weights[0] = CONTROL_AREA_WEIGHT;
    weights[1] = BOSS_AREA_WEIGHT;
    weights[2] = MINIBOSS_AREA_WEIGHT;
    let weight_sum: f64 = weights.iter().sum();
    let total_area = (width * height) as f64 * fill_ratio;

    let mut rooms: Vec<Room> = Vec::with_capacity(room_count);
    for (slot, weight) in weights.iter().enumerate() {
        let target_area = total_area * weight / weight_sum;
        let (room_width, room_height) = room_dimensions(target_area, width, height, rng);
        let kind = match slot {
            0 => RoomKind::Control,
            1 => RoomKind::Boss,
            _ => RoomKind::Normal,
        };

        let placed = match kind {
            RoomKind::Control => {
                place_biased(width, height, room_width, room_height, &rooms, rng)
            }
            RoomKind::Boss => {
                place_farthest(width, height, room_width, room_height, &rooms, rooms[0].center(), rng)
            }
            _ => place_anywhere(width, height, room_width, room_height, &rooms, rng),
        };

        let mut room = placed?;
        room.kind = kind;
        rooms.push(room);
    }

    promote_miniboss(&mut rooms)?;
    Some(rooms)
}

/// Converts a target area to a (width, height) pair with a jittered aspect
/// ratio, clamped to the usable interior.
fn room_dimensions(
    target_area: f64,
    map_width: usize,
    map_height: usize,
    rng: &mut RandomStream,
) -> (usize, usize) {
    let max_width = map_width - 2 * MAP_MARGIN;
    let max_height = map_height - 2 * MAP_MARGIN;

    let ratio = rng.jitter(1.0, 0.3).clamp(0.7, 1.3);
    let width = ((target_area * ratio).sqrt().round() as usize).clamp(MIN_ROOM_SIDE, max_width);
    let height =
        ((target_area / width as f64).round() as usize).clamp(MIN_ROOM_SIDE, max_height);
    (width, height)
}

fn place_anywhere(
    map_width: usize,
    map_height: usize,
    room_width: usize,
    room_height: usize,
    existing: &[Room],
    rng: &mut RandomStream,
) -> Option<Room> {
    let max_x = map_width - MAP_MARGIN - room_width;
    let max_y = map_height - MAP_MARGIN - room_height;
    if max_x < MAP_MARGIN || max_y < MAP_MARGIN {
        return None;
    }

    for _ in 0..PLACEMENT_ATTEMPTS {
        let candidate = Room {
            x: rng.range_usize(MAP_MARGIN, max_x),
            y: rng.range_usize(MAP_MARGIN, max_y),
            width: room_width,
            height: room_height,
            kind: RoomKind::Normal,
        };
        if fits(&candidate, existing) {
            return Some(candidate);
        }
    }
    None
}

/// Control room sampling biased toward the left/lower portion of the map.
fn place_biased(
    map_width: usize,
    map_height: usize,
    room_width: usize,
    room_height: usize,
    existing: &[Room],
    rng: &mut RandomStream,
) -> Option<Room> {
    let max_x = map_width - MAP_MARGIN - room_width;
    let max_y = map_height - MAP_MARGIN - room_height;
    if max_x < MAP_MARGIN || max_y < MAP_MARGIN {
        return None;
    }

    let biased_max_x = (map_width / 2).clamp(MAP_MARGIN, max_x);
    let biased_min_y = (map_height / 2).clamp(MAP_MARGIN, max_y);

    for attempt in 0..PLACEMENT_ATTEMPTS {
        // Fall back to unbiased sampling once the preferred region is clearly
        // too crowded.
        let candidate = if attempt < PLACEMENT_ATTEMPTS / 2 {
            Room {
                x: rng.range_usize(MAP_MARGIN, biased_max_x),
                y: rng.range_usize(biased_min_y, max_y),
                width: room_width,
                height: room_height,
                kind: RoomKind::Normal,
            }
        } else {
            Room {
                x: rng.range_usize(MAP_MARGIN, max_x),
                y: rng.range_usize(MAP_MARGIN, max_y),
                width: room_width,
                height: room_height,
                kind: RoomKind::Normal,
            }
        };
        if fits(&candidate, existing) {
            return Some(candidate);
        }
    }
    None
}

/// Best-of-N placement maximizing squared distance from `anchor`. Bounded
/// sampling, not exhaustive, to keep cost flat on large maps.
fn place_farthest(
    map_width: usize,
    map_height: usize,
    room_width: usize,
    room_height: usize,
    existing: &[Room],
    anchor: Pos,
    rng: &mut RandomStream,
) -> Option<Room> {
    let max_x = map_width - MAP_MARGIN - room_width;
    let max_y = map_height - MAP_MARGIN - room_height;
    if max_x < MAP_MARGIN || max_y < MAP_MARGIN {
        return None;
    }

    let mut best: Option<(u64, Room)> = None;
    let mut valid_samples = 0_usize;
    for _ in 0..PLACEMENT_ATTEMPTS {
        if valid_samples >= BOSS_CANDIDATE_SAMPLES {
            break;
        }
        let candidate = Room {
            x: rng.range_usize(MAP_MARGIN, max_x),
            y: rng.range_usize(MAP_MARGIN, max_y),
            width: room_width,
            height: room_height,
            kind: RoomKind::Normal,
        };
        if !fits(&candidate, existing) {
            continue;
        }
        valid_samples += 1;
        let distance = candidate.center().squared_distance(anchor);
        let replace = match best {
            None => true,
            Some((best_distance, _)) => distance > best_distance,
        };
        if replace {
            best = Some((distance, candidate));
        }
    }
    best.map(|(_, room)| room)
}

fn fits(candidate: &Room, existing: &[Room]) -> bool {
    let padded = candidate.expanded(1);
    existing.iter().all(|room| !room.expanded(1).intersects(&padded))
}

/// Retags the normal room farthest from the control room as the miniboss.
fn promote_miniboss(rooms: &mut [Room]) -> Option<()> {
    let control_center = rooms[0].center();
    let mut best: Option<(u64, usize)> = None;
    for (index, room) in rooms.iter().enumerate() {
        if room.kind != RoomKind::Normal {
            continue;
        }
        let distance = room.center().squared_distance(control_center);
        let replace = match best {
            None => true,
            Some((best_distance, _)) => distance > best_distance,
        };
        if replace {
            best = Some((distance, index));
        }
    }
    let (_, index) = best?;
    rooms[index].kind = RoomKind::MiniBoss;
    Some(())
}

pub(super) fn carve_room(grid: &mut Grid, room: &Room) {
    let kind = room.floor_kind();
    for y in room.y..=room.bottom() {
        for x in room.x..=room.right() {
            grid.set(Pos { y: y as i32, x: x as i32 }, kind);
        }
    }
}
