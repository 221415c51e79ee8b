//! L-shaped corridor carving, door opening, and spanning connection order.

use std::collections::BTreeSet;

use crate::types::{CellKind, Pos, RoomKind};

use super::grid::Grid;
use super::rng::RandomStream;
use super::rooms::Room;

/// Carves an L-corridor between two rooms and opens one doorway on each
/// room's perimeter. Returns the corridor tiles committed outside any room.
pub(super) fn carve_corridor(
    grid: &mut Grid,
    rooms: &[Room],
    from_index: usize,
    to_index: usize,
    corridor_width: usize,
    rng: &mut RandomStream,
) -> Vec<Pos> {
    let horizontal_first = rng.chance(0.5);
    carve_corridor_with_axis(grid, rooms, from_index, to_index, corridor_width, horizontal_first)
}

/// Axis-explicit variant for callers that must control (or retry) the L
/// orientation, e.g. the gate corridor.
pub(super) fn carve_corridor_with_axis(
    grid: &mut Grid,
    rooms: &[Room],
    from_index: usize,
    to_index: usize,
    corridor_width: usize,
    horizontal_first: bool,
) -> Vec<Pos> {
    let from_center = rooms[from_index].center();
    let to_center = rooms[to_index].center();

    let tiles = link_tiles(rooms, from_center, to_center, corridor_width, horizontal_first);
    commit_tiles(grid, &tiles);

    open_door(grid, &rooms[from_index], to_center);
    open_door(grid, &rooms[to_index], from_center);
    tiles
}

/// Tiles of a width-`corridor_width` L-stripe from `from` to `to`, excluding
/// every tile that falls inside any room's rectangle. Room interiors are
/// already floor; skipping them protects their cell kinds.
pub(super) fn link_tiles(
    rooms: &[Room],
    from: Pos,
    to: Pos,
    corridor_width: usize,
    horizontal_first: bool,
) -> Vec<Pos> {
    let mut tiles = BTreeSet::new();
    let corner = if horizontal_first {
        Pos { y: from.y, x: to.x }
    } else {
        Pos { y: to.y, x: from.x }
    };

    stripe_segment(&mut tiles, from, corner, corridor_width);
    stripe_segment(&mut tiles, corner, to, corridor_width);

    tiles
        .into_iter()
        .filter(|pos| !rooms.iter().any(|room| room.contains(*pos)))
        .collect()
}

fn stripe_segment(tiles: &mut BTreeSet<Pos>, from: Pos, to: Pos, corridor_width: usize) {
    let half = (corridor_width / 2) as i32;
    let offsets = -half..(corridor_width as i32 - half);

    if from.y == to.y {
        let (min_x, max_x) = (from.x.min(to.x), from.x.max(to.x));
        for offset in offsets {
            for x in min_x..=max_x {
                tiles.insert(Pos { y: from.y + offset, x });
            }
        }
    } else {
        let (min_y, max_y) = (from.y.min(to.y), from.y.max(to.y));
        for offset in offsets {
            for y in min_y..=max_y {
                tiles.insert(Pos { y, x: from.x + offset });
            }
        }
    }
}

/// Writes stripe tiles as floor, never touching the outer border row/column.
pub(super) fn commit_tiles(grid: &mut Grid, tiles: &[Pos]) {
    let max_y = grid.height() as i32 - 2;
    let max_x = grid.width() as i32 - 2;
    for &pos in tiles {
        if pos.y < 1 || pos.x < 1 || pos.y > max_y || pos.x > max_x {
            continue;
        }
        grid.set(pos, CellKind::Floor);
    }
}

/// Marks the doorway cell on the room edge nearest the straight line toward
/// `target`, snapped onto the edge the dominant axis points at. Boss rooms
/// get the distinct boss-door kind so consumers can gate them.
fn open_door(grid: &mut Grid, room: &Room, target: Pos) {
    let center = room.center();
    let dx = target.x - center.x;
    let dy = target.y - center.y;

    let door = if dx.abs() >= dy.abs() {
        let edge_x = if dx > 0 { room.right() as i32 } else { room.x as i32 };
        let y = if dx == 0 {
            center.y
        } else {
            let t = (edge_x - center.x) as f64 / dx as f64;
            (center.y as f64 + t * dy as f64).round() as i32
        };
        Pos { y: y.clamp(room.y as i32, room.bottom() as i32), x: edge_x }
    } else {
        let edge_y = if dy > 0 { room.bottom() as i32 } else { room.y as i32 };
        let x = if dy == 0 {
            center.x
        } else {
            let t = (edge_y - center.y) as f64 / dy as f64;
            (center.x as f64 + t * dx as f64).round() as i32
        };
        Pos { y: edge_y, x: x.clamp(room.x as i32, room.right() as i32) }
    };

    let kind =
        if room.kind == RoomKind::Boss { CellKind::BossDoor } else { CellKind::Door };
    grid.set(door, kind);
}

/// Greedy minimum-spanning connection order over room-center distances:
/// always attach the globally closest pending room to the connected set.
/// Ties break on the lower index pair to keep the order deterministic.
pub(super) fn spanning_pairs(rooms: &[Room], included: &[usize]) -> Vec<(usize, usize)> {
    if included.len() < 2 {
        return Vec::new();
    }

    let mut connected = vec![included[0]];
    let mut pending: Vec<usize> = included[1..].to_vec();
    let mut pairs = Vec::with_capacity(pending.len());

    while !pending.is_empty() {
        let mut best: Option<(u64, usize, usize)> = None;
        for &connected_index in &connected {
            let connected_center = rooms[connected_index].center();
            for &pending_index in &pending {
                let distance =
                    connected_center.squared_distance(rooms[pending_index].center());
                let candidate = (distance, connected_index, pending_index);
                let replace = match best {
                    None => true,
                    Some(current) => candidate < current,
                };
                if replace {
                    best = Some(candidate);
                }
            }
        }

        let (_, connected_index, pending_index) =
            best.expect("pending list is non-empty");
        pairs.push((connected_index, pending_index));
        connected.push(pending_index);
        pending.retain(|&index| index != pending_index);
    }

    pairs
}
