//! Walkable-density filler: carves small linked side rooms until the target
//! ratio is met or the attempt budget runs out. Density is a soft target.

use std::collections::BTreeSet;

use crate::types::{CellKind, Pos, RoomKind};

use super::corridors::{commit_tiles, link_tiles};
use super::grid::Grid;
use super::rng::RandomStream;
use super::rooms::{MAP_MARGIN, Room};

const FILL_ATTEMPTS: usize = 28;
const FILLER_MIN_WIDTH: usize = 6;
const FILLER_MAX_WIDTH: usize = 12;
const FILLER_MIN_HEIGHT: usize = 5;
const FILLER_MAX_HEIGHT: usize = 10;
/// Buffer kept clear around the boss room so fillers can never graze it.
const BOSS_BUFFER: usize = 3;

/// Raises the walkable ratio toward `target_ratio`. `protected` holds the
/// gate-corridor tiles; fillers and their links keep one tile of clearance
/// from them so the gate property survives densification.
pub(super) fn densify(
    grid: &mut Grid,
    rooms: &[Room],
    target_ratio: f64,
    corridor_width: usize,
    protected: &BTreeSet<Pos>,
    rng: &mut RandomStream,
) {
    for _ in 0..FILL_ATTEMPTS {
        if grid.walkable_ratio() >= target_ratio {
            return;
        }

        let filler_width = rng.range_usize(FILLER_MIN_WIDTH, FILLER_MAX_WIDTH);
        let filler_height = rng.range_usize(FILLER_MIN_HEIGHT, FILLER_MAX_HEIGHT);
        let max_x = grid.width().saturating_sub(MAP_MARGIN + filler_width);
        let max_y = grid.height().saturating_sub(MAP_MARGIN + filler_height);
        if max_x < MAP_MARGIN || max_y < MAP_MARGIN {
            continue;
        }

        let filler = Room {
            x: rng.range_usize(MAP_MARGIN, max_x),
            y: rng.range_usize(MAP_MARGIN, max_y),
            width: filler_width,
            height: filler_height,
            kind: RoomKind::Normal,
        };
        if collides(&filler, rooms, protected) {
            continue;
        }

        let Some(link_target) = nearest_link_target(grid, rooms, protected, &filler) else {
            continue;
        };
        let link = link_tiles(rooms, filler.center(), link_target, corridor_width, rng.chance(0.5));
        if link_conflicts(&link, rooms, protected) {
            continue;
        }

        for y in filler.y..=filler.bottom() {
            for x in filler.x..=filler.right() {
                grid.set(Pos { y: y as i32, x: x as i32 }, CellKind::Floor);
            }
        }
        commit_tiles(grid, &link);
    }
}

fn collides(filler: &Room, rooms: &[Room], protected: &BTreeSet<Pos>) -> bool {
    let padded = filler.expanded(1);
    for room in rooms {
        let margin = if room.kind == RoomKind::Boss { BOSS_BUFFER } else { 1 };
        if room.expanded(margin).intersects(&padded) {
            return true;
        }
    }
    protected.iter().any(|pos| padded.contains(*pos))
}

/// Nearest already-walkable tile the filler may link to. Boss floor and the
/// gate corridor are never valid link targets.
fn nearest_link_target(
    grid: &Grid,
    rooms: &[Room],
    protected: &BTreeSet<Pos>,
    filler: &Room,
) -> Option<Pos> {
    let boss = rooms.iter().find(|room| room.kind == RoomKind::Boss);
    let center = filler.center();

    let mut best: Option<(u32, Pos)> = None;
    for y in 1..(grid.height() as i32 - 1) {
        for x in 1..(grid.width() as i32 - 1) {
            let pos = Pos { y, x };
            if !grid.is_walkable(pos) || filler.contains(pos) {
                continue;
            }
            if boss.is_some_and(|room| room.expanded(1).contains(pos)) {
                continue;
            }
            if protected.contains(&pos) {
                continue;
            }
            let distance = crate::types::manhattan(pos, center);
            let candidate = (distance, pos);
            let replace = match best {
                None => true,
                Some(current) => candidate < current,
            };
            if replace {
                best = Some(candidate);
            }
        }
    }
    best.map(|(_, pos)| pos)
}

fn link_conflicts(link: &[Pos], rooms: &[Room], protected: &BTreeSet<Pos>) -> bool {
    let boss = rooms.iter().find(|room| room.kind == RoomKind::Boss);
    link.iter().any(|pos| {
        if boss.is_some_and(|room| room.expanded(1).contains(*pos)) {
            return true;
        }
        if protected.contains(pos) {
            return true;
        }
        pos.orthogonal_neighbors().iter().any(|neighbor| protected.contains(neighbor))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::levelgen::connectivity::flood_fill;
    use crate::levelgen::rooms::carve_room;

    #[test]
    fn densify_is_a_no_op_when_the_target_is_already_met() {
        let mut grid = Grid::filled(20, 16, CellKind::Floor);
        grid.seal_border();
        let before = grid.clone();
        let mut rng = RandomStream::from_seed(1);
        densify(&mut grid, &[], 0.5, 1, &BTreeSet::new(), &mut rng);
        assert_eq!(grid, before);
    }

    #[test]
    fn densify_raises_the_walkable_ratio_and_keeps_fillers_connected() {
        let room = Room { x: 2, y: 2, width: 8, height: 6, kind: RoomKind::Control };
        let mut grid = Grid::filled(48, 36, CellKind::Wall);
        carve_room(&mut grid, &room);
        let before = grid.walkable_ratio();

        let mut rng = RandomStream::from_seed(77);
        densify(&mut grid, &[room], 0.45, 1, &BTreeSet::new(), &mut rng);

        assert!(grid.walkable_ratio() > before, "filler pass should add walkable area");

        // Every walkable tile must connect back to the seed room.
        let mask = flood_fill(&grid, room.center(), None);
        for y in 0..grid.height() as i32 {
            for x in 0..grid.width() as i32 {
                let pos = Pos { y, x };
                if grid.is_walkable(pos) {
                    assert!(
                        mask[(y as usize) * grid.width() + x as usize],
                        "walkable tile {pos:?} must be connected"
                    );
                }
            }
        }
    }

    #[test]
    fn densify_never_touches_the_boss_buffer() {
        let control = Room { x: 2, y: 2, width: 8, height: 6, kind: RoomKind::Control };
        let boss = Room { x: 30, y: 24, width: 8, height: 8, kind: RoomKind::Boss };
        let mut grid = Grid::filled(48, 40, CellKind::Wall);
        carve_room(&mut grid, &control);
        carve_room(&mut grid, &boss);

        let mut rng = RandomStream::from_seed(13);
        densify(&mut grid, &[control, boss], 0.6, 1, &BTreeSet::new(), &mut rng);

        // The boss perimeter ring stays wall: only the gate corridor may open it.
        let ring = boss.expanded(1);
        for y in ring.y..=ring.bottom() {
            for x in ring.x..=ring.right() {
                let pos = Pos { y: y as i32, x: x as i32 };
                if boss.contains(pos) {
                    continue;
                }
                assert_eq!(grid.get(pos), CellKind::Wall, "boss ring breached at {pos:?}");
            }
        }
    }
}
