//! Seed sweep harness: generates many levels, runs placement, and asserts the
//! structural invariants hold on every one.

use std::collections::BTreeSet;

use anyhow::Result;
use clap::Parser;
use game_core::{
    CellKind, GeneratedLevel, LevelParams, Pos, RecordKind, RoomKind, RuleSet, generate_level,
    place_entities,
};
use rand_chacha::{
    ChaCha8Rng,
    rand_core::{Rng, SeedableRng},
};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(short, long, default_value_t = 42)]
    seed: u64,
    #[arg(short, long, default_value_t = 200)]
    count: u32,
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

fn check_level(run: u32, level: &GeneratedLevel) -> Result<()> {
    let bosses = level.rooms.iter().filter(|r| r.kind == RoomKind::Boss).count();
    let minibosses = level.rooms.iter().filter(|r| r.kind == RoomKind::MiniBoss).count();
    anyhow::ensure!(bosses == 1, "run {run}: expected one boss room, found {bosses}");
    anyhow::ensure!(minibosses == 1, "run {run}: expected one gate room");
    anyhow::ensure!(
        level.grid.is_walkable(level.start_tile),
        "run {run}: start tile not walkable"
    );

    let (width, height) = (level.grid.width() as i32, level.grid.height() as i32);
    for x in 0..width {
        anyhow::ensure!(
            level.grid.get(Pos { y: 0, x }) == CellKind::Wall
                && level.grid.get(Pos { y: height - 1, x }) == CellKind::Wall,
            "run {run}: border breached in column {x}"
        );
    }
    for y in 0..height {
        anyhow::ensure!(
            level.grid.get(Pos { y, x: 0 }) == CellKind::Wall
                && level.grid.get(Pos { y, x: width - 1 }) == CellKind::Wall,
            "run {run}: border breached in row {y}"
        );
    }

    for left in 0..level.rooms.len() {
        for right in (left + 1)..level.rooms.len() {
            anyhow::ensure!(
                !level.rooms[left].expanded(1).intersects(&level.rooms[right].expanded(1)),
                "run {run}: rooms {left} and {right} overlap"
            );
        }
    }

    let open = reachable_mask(level, None);
    for (index, room) in level.rooms.iter().enumerate() {
        anyhow::ensure!(
            is_reached(level, &open, room.center()),
            "run {run}: room {index} unreachable"
        );
    }
    let gated = reachable_mask(level, Some(level.miniboss_room));
    anyhow::ensure!(
        !is_reached(level, &gated, level.rooms[level.boss_room].center()),
        "run {run}: boss reachable around the gate room"
    );

    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    println!("Sweeping {} generations from seed {}...", args.count, args.seed);

    let rules = RuleSet::default();
    let mut rng = ChaCha8Rng::seed_from_u64(args.seed);
    for run in 0..args.count {
        let run_seed = rng.next_u64();
        let params = LevelParams { seed: run_seed, ..LevelParams::default() };
        let level = generate_level(&params)
            .map_err(|e| anyhow::anyhow!("run {run} seed {run_seed}: {e:?}"))?;
        check_level(run, &level)?;

        let records = place_entities(&level, &rules, run_seed);
        let tiles: BTreeSet<Pos> = records.iter().map(|record| record.tile()).collect();
        anyhow::ensure!(tiles.len() == records.len(), "run {run}: record tile collision");
        anyhow::ensure!(
            records.iter().filter(|record| record.kind == RecordKind::Hero).count() == 1,
            "run {run}: hero missing"
        );
        anyhow::ensure!(
            records.iter().all(|record| level.grid.is_walkable(record.tile())),
            "run {run}: record placed inside a wall"
        );
    }

    println!("OK: {} generations upheld all invariants", args.count);
    Ok(())
}
