use core::{CellKind, GeneratedLevel, LevelParams, Pos, RoomKind, generate_level};

fn generate(seed: u64) -> GeneratedLevel {
    let params = LevelParams { seed, ..LevelParams::default() };
    generate_level(&params).expect("default-sized params must generate within the attempt cap")
}

fn reachable_mask(level: &GeneratedLevel, blocked: Option<usize>) -> Vec<bool> {
    let grid = &level.grid;
    let blocked_room = blocked.map(|index| &level.rooms[index]);
    let mut reached = vec![false; grid.width() * grid.height()];
    let start = level.start_tile;
    reached[(start.y as usize) * grid.width() + start.x as usize] = true;
    let mut open = vec![start];
    while let Some(pos) = open.pop() {
        for next in pos.orthogonal_neighbors() {
            if !grid.is_walkable(next) {
                continue;
            }
            if blocked_room.is_some_and(|room| room.contains(next)) {
                continue;
            }
            let index = (next.y as usize) * grid.width() + next.x as usize;
            if !reached[index] {
                reached[index] = true;
                open.push(next);
            }
        }
    }
    reached
}

fn is_reached(level: &GeneratedLevel, mask: &[bool], pos: Pos) -> bool {
    mask[(pos.y as usize) * level.grid.width() + pos.x as usize]
}

#[test]
fn test_border_is_fully_sealed() {
    let level = generate(12_345);
    let (width, height) = (level.grid.width() as i32, level.grid.height() as i32);
    for x in 0..width {
        assert_eq!(level.grid.get(Pos { y: 0, x }), CellKind::Wall);
        assert_eq!(level.grid.get(Pos { y: height - 1, x }), CellKind::Wall);
    }
    for y in 0..height {
        assert_eq!(level.grid.get(Pos { y, x: 0 }), CellKind::Wall);
        assert_eq!(level.grid.get(Pos { y, x: width - 1 }), CellKind::Wall);
    }
}

#[test]
fn test_rooms_never_overlap_even_with_padding() {
    let level = generate(12_345);
    for left in 0..level.rooms.len() {
        for right in (left + 1)..level.rooms.len() {
            assert!(
                !level.rooms[left].expanded(1).intersects(&level.rooms[right].expanded(1)),
                "rooms {left} and {right} overlap"
            );
        }
    }
}

#[test]
fn test_every_room_is_reachable_from_the_start_tile() {
    for seed in [1, 2, 3, 12_345, 999_999] {
        let level = generate(seed);
        let mask = reachable_mask(&level, None);
        for (index, room) in level.rooms.iter().enumerate() {
            assert!(
                is_reached(&level, &mask, room.center()),
                "seed {seed}: room {index} is unreachable"
            );
        }
    }
}

#[test]
fn test_gate_room_is_the_sole_path_to_the_boss() {
    for seed in [1, 2, 3, 12_345, 999_999] {
        let level = generate(seed);
        let boss_center = level.rooms[level.boss_room].center();

        let open = reachable_mask(&level, None);
        assert!(is_reached(&level, &open, boss_center), "seed {seed}: boss unreachable");

        let gated = reachable_mask(&level, Some(level.miniboss_room));
        assert!(
            !is_reached(&level, &gated, boss_center),
            "seed {seed}: boss reachable around the gate room"
        );
    }
}

#[test]
fn test_identical_seeds_produce_identical_levels() {
    let first = generate(12_345);
    let second = generate(12_345);
    assert_eq!(first.canonical_bytes(), second.canonical_bytes());
    assert_eq!(first.fingerprint(), second.fingerprint());
    assert_eq!(first.grid, second.grid);
    assert_eq!(first.rooms, second.rooms);
}

#[test]
fn test_example_scenario_shape() {
    // width=60, height=40, eight rooms, seed 12345.
    let level = generate(12_345);
    assert_eq!(level.rooms.len(), 8);

    let bosses = level.rooms.iter().filter(|room| room.kind == RoomKind::Boss).count();
    let minibosses =
        level.rooms.iter().filter(|room| room.kind == RoomKind::MiniBoss).count();
    let controls = level.rooms.iter().filter(|room| room.kind == RoomKind::Control).count();
    assert_eq!(bosses, 1);
    assert_eq!(minibosses, 1);
    assert_eq!(controls, 1);

    assert_eq!(level.rooms[level.boss_room].kind, RoomKind::Boss);
    assert_eq!(level.rooms[level.miniboss_room].kind, RoomKind::MiniBoss);
    assert_eq!(level.rooms[level.control_room].kind, RoomKind::Control);
    assert!(level.rooms[level.control_room].contains(level.start_tile));
}

#[test]
fn test_room_floors_carry_their_kind() {
    let level = generate(7);
    for room in &level.rooms {
        let expected = match room.kind {
            RoomKind::Control => CellKind::ControlFloor,
            RoomKind::Boss => CellKind::BossFloor,
            RoomKind::MiniBoss => CellKind::MiniBossFloor,
            RoomKind::Normal => CellKind::Floor,
        };
        let center = room.center();
        assert_eq!(level.grid.get(center), expected, "room at {center:?}");
    }
}
