//! Reachability flood fill, bounded connectivity repair, and the
//! gate-room verification.

use std::collections::VecDeque;

use crate::types::{Pos, RoomKind};

use super::corridors::carve_corridor;
use super::graph::RoomGraph;
use super::grid::Grid;
use super::rng::RandomStream;
use super::rooms::Room;

/// Breadth-first reachability mask from `start` over walkable cells,
/// 4-directional. `blocked` overlays a rectangular no-entry mask.
pub(crate) fn flood_fill(grid: &Grid, start: Pos, blocked: Option<&Room>) -> Vec<bool> {
    let width = grid.width();
    let mut reached = vec![false; width * grid.height()];
    if !grid.is_walkable(start) || blocked.is_some_and(|room| room.contains(start)) {
        return reached;
    }

    reached[(start.y as usize) * width + start.x as usize] = true;
    let mut open = VecDeque::from([start]);
    while let Some(pos) = open.pop_front() {
        for next in pos.orthogonal_neighbors() {
            if !grid.is_walkable(next) {
                continue;
            }
            if blocked.is_some_and(|room| room.contains(next)) {
                continue;
            }
            let index = (next.y as usize) * width + next.x as usize;
            if reached[index] {
                continue;
            }
            reached[index] = true;
            open.push_back(next);
        }
    }
    reached
}

pub(super) fn reached_at(mask: &[bool], grid: &Grid, pos: Pos) -> bool {
    grid.in_bounds(pos) && mask[(pos.y as usize) * grid.width() + pos.x as usize]
}

/// Carves corridors until every non-boss room center is reachable from
/// `start`. Each iteration joins the closest reached/unreached room pair.
/// Gives up after `2 * room count` carves; pathological layouts fail the
/// attempt instead of looping.
pub(super) fn repair_reachability(
    grid: &mut Grid,
    rooms: &[Room],
    graph: &mut RoomGraph,
    start: Pos,
    corridor_width: usize,
    rng: &mut RandomStream,
) -> Result<(), ()> {
    let budget = 2 * rooms.len();
    for _ in 0..=budget {
        let mask = flood_fill(grid, start, None);
        let mut reached_rooms = Vec::new();
        let mut unreached_rooms = Vec::new();
        for (index, room) in rooms.iter().enumerate() {
            if room.kind == RoomKind::Boss {
                continue;
            }
            if reached_at(&mask, grid, room.center()) {
                reached_rooms.push(index);
            } else {
                unreached_rooms.push(index);
            }
        }

        if unreached_rooms.is_empty() {
            return Ok(());
        }
        if reached_rooms.is_empty() {
            return Err(());
        }

        let mut best: Option<(u64, usize, usize)> = None;
        for &reached_index in &reached_rooms {
            let reached_center = rooms[reached_index].center();
            for &unreached_index in &unreached_rooms {
                let distance =
                    reached_center.squared_distance(rooms[unreached_index].center());
                let candidate = (distance, reached_index, unreached_index);
                let replace = match best {
                    None => true,
                    Some(current) => candidate < current,
                };
                if replace {
                    best = Some(candidate);
                }
            }
        }

        let (_, from_index, to_index) = best.expect("unreached list is non-empty");
        carve_corridor(grid, rooms, from_index, to_index, corridor_width, rng);
        graph.add_edge(from_index, to_index);
    }
    Err(())
}

/// The gate property: the goal room must be reachable normally and must
/// become unreachable once the gate room's rectangle is masked off. This is
/// the formal definition of "the gate is the sole path to the goal".
pub(super) fn verify_gate(grid: &Grid, start: Pos, gate: &Room, goal: &Room) -> bool {
    let open_mask = flood_fill(grid, start, None);
    if !reached_at(&open_mask, grid, goal.center()) {
        return false;
    }
    let gated_mask = flood_fill(grid, start, Some(gate));
    !reached_at(&gated_mask, grid, goal.center())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::levelgen::rooms::carve_room;
    use crate::types::CellKind;

    fn carved(rooms: &[Room], width: usize, height: usize) -> Grid {
        let mut grid = Grid::filled(width, height, CellKind::Wall);
        for room in rooms {
            carve_room(&mut grid, room);
        }
        grid
    }

    #[test]
    fn flood_fill_does_not_cross_walls() {
        let rooms = [
            Room { x: 2, y: 2, width: 6, height: 6, kind: RoomKind::Normal },
            Room { x: 12, y: 2, width: 6, height: 6, kind: RoomKind::Normal },
        ];
        let grid = carved(&rooms, 24, 12);
        let mask = flood_fill(&grid, rooms[0].center(), None);
        assert!(reached_at(&mask, &grid, rooms[0].center()));
        assert!(!reached_at(&mask, &grid, rooms[1].center()));
    }

    #[test]
    fn repair_connects_every_isolated_room() {
        let rooms = [
            Room { x: 2, y: 2, width: 6, height: 6, kind: RoomKind::Control },
            Room { x: 14, y: 2, width: 6, height: 6, kind: RoomKind::Normal },
            Room { x: 2, y: 14, width: 6, height: 6, kind: RoomKind::Normal },
        ];
        let mut grid = carved(&rooms, 26, 24);
        let mut graph = RoomGraph::new(rooms.len());
        let mut rng = RandomStream::from_seed(21);
        let start = rooms[0].center();

        repair_reachability(&mut grid, &rooms, &mut graph, start, 1, &mut rng)
            .expect("repair should connect three rooms");

        let mask = flood_fill(&grid, start, None);
        for room in &rooms {
            assert!(reached_at(&mask, &grid, room.center()));
        }
        assert!(graph.edge_count() >= 2);
    }

    #[test]
    fn repair_leaves_the_boss_room_alone() {
        let rooms = [
            Room { x: 2, y: 2, width: 6, height: 6, kind: RoomKind::Control },
            Room { x: 14, y: 14, width: 6, height: 6, kind: RoomKind::Boss },
        ];
        let mut grid = carved(&rooms, 26, 24);
        let mut graph = RoomGraph::new(rooms.len());
        let mut rng = RandomStream::from_seed(4);

        repair_reachability(&mut grid, &rooms, &mut graph, rooms[0].center(), 1, &mut rng)
            .expect("nothing to repair");

        let mask = flood_fill(&grid, rooms[0].center(), None);
        assert!(!reached_at(&mask, &grid, rooms[1].center()));
        assert_eq!(graph.edge_count(), 0);
    }

    #[test]
    fn gate_holds_when_the_gate_room_is_the_only_route() {
        // control -- gate -- goal in a straight carved line.
        let control = Room { x: 2, y: 4, width: 6, height: 6, kind: RoomKind::Control };
        let gate = Room { x: 12, y: 4, width: 6, height: 6, kind: RoomKind::MiniBoss };
        let goal = Room { x: 22, y: 4, width: 6, height: 6, kind: RoomKind::Boss };
        let rooms = [control, gate, goal];
        let mut grid = carved(&rooms, 32, 16);
        for x in 2..28 {
            grid.set(Pos { y: 7, x }, CellKind::Floor);
        }
        // Keep the room kinds where the line crossed rooms.
        for room in &rooms {
            carve_room(&mut grid, room);
        }

        assert!(verify_gate(&grid, control.center(), &gate, &goal));
    }

    #[test]
    fn gate_fails_when_a_bypass_exists() {
        let control = Room { x: 2, y: 4, width: 6, height: 6, kind: RoomKind::Control };
        let gate = Room { x: 12, y: 4, width: 6, height: 6, kind: RoomKind::MiniBoss };
        let goal = Room { x: 22, y: 4, width: 6, height: 6, kind: RoomKind::Boss };
        let rooms = [control, gate, goal];
        let mut grid = carved(&rooms, 32, 20);
        for x in 2..28 {
            grid.set(Pos { y: 7, x }, CellKind::Floor);
        }
        for room in &rooms {
            carve_room(&mut grid, room);
        }
        // Bypass running south of the gate room.
        for x in 4..=24 {
            grid.set(Pos { y: 14, x }, CellKind::Floor);
        }
        for y in 9..=14 {
            grid.set(Pos { y, x: 4 }, CellKind::Floor);
            grid.set(Pos { y, x: 24 }, CellKind::Floor);
        }

        assert!(!verify_gate(&grid, control.center(), &gate, &goal));
    }
}
