use std::fs;

use anyhow::{Context, Result};
use clap::Parser;
use game_core::{
    CellKind, GeneratedLevel, LevelParams, PlacementRecord, Pos, RecordKind, RuleSet,
    generate_level, place_entities,
};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(short, long, default_value_t = 42)]
    seed: u64,
    #[arg(long, default_value_t = 60)]
    width: usize,
    #[arg(long, default_value_t = 40)]
    height: usize,
    #[arg(short, long, default_value_t = 8)]
    rooms: usize,
    #[arg(long, default_value_t = 2)]
    corridor_width: usize,
    #[arg(long, default_value_t = 0.5)]
    occupancy: f64,
    /// Path to a placement rule set in JSON; defaults to the built-in rules
    #[arg(long)]
    rules: Option<String>,
    /// Emit the placement records as JSON instead of the ASCII preview
    #[arg(long, default_value_t = false)]
    json: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let rules = match &args.rules {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("Failed to read rules file: {path}"))?;
            RuleSet::from_json(&text).with_context(|| "Failed to parse placement rules JSON")?
        }
        None => RuleSet::default(),
    };

    let params = LevelParams {
        width: args.width,
        height: args.height,
        target_room_count: args.rooms,
        corridor_width: args.corridor_width,
        occupancy_ratio_target: args.occupancy,
        seed: args.seed,
    };
    let level = generate_level(&params)
        .map_err(|e| anyhow::anyhow!("Generation failed: {:?}", e))?;
    let records = place_entities(&level, &rules, args.seed);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&records)?);
        return Ok(());
    }

    println!("{}", render(&level, &records));
    println!("Seed: {}", args.seed);
    println!("Fingerprint: {:016x}", level.fingerprint());
    println!("Rooms: {}", level.rooms.len());
    println!("Records: {}", records.len());
    for kind in [
        RecordKind::Hero,
        RecordKind::Patient,
        RecordKind::Pill,
        RecordKind::Bell,
        RecordKind::Npc,
        RecordKind::Enemy,
        RecordKind::Cart,
        RecordKind::Door,
        RecordKind::BossDoor,
        RecordKind::Elevator,
        RecordKind::Phone,
        RecordKind::Light,
    ] {
        let count = records.iter().filter(|record| record.kind == kind).count();
        if count > 0 {
            println!("  {kind:?}: {count}");
        }
    }

    Ok(())
}

fn render(level: &GeneratedLevel, records: &[PlacementRecord]) -> String {
    let grid = &level.grid;
    let mut rows: Vec<Vec<char>> = (0..grid.height() as i32)
        .map(|y| {
            (0..grid.width() as i32)
                .map(|x| match grid.get(Pos { y, x }) {
                    CellKind::Wall => '#',
                    CellKind::Floor => '.',
                    CellKind::ControlFloor => ',',
                    CellKind::BossFloor => ':',
                    CellKind::MiniBossFloor => ';',
                    CellKind::Door => '+',
                    CellKind::BossDoor => '=',
                })
                .collect()
        })
        .collect();

    for record in records {
        let glyph = match record.kind {
            RecordKind::Hero => '@',
            RecordKind::Patient => 'P',
            RecordKind::Pill => 'p',
            RecordKind::Bell => 'b',
            RecordKind::Npc => 'N',
            RecordKind::Enemy => 'E',
            RecordKind::Cart => 'C',
            RecordKind::Door => '+',
            RecordKind::BossDoor => '=',
            RecordKind::Elevator => 'V',
            RecordKind::Phone => 'T',
            RecordKind::Light => '*',
        };
        rows[record.tile_y as usize][record.tile_x as usize] = glyph;
    }

    rows.into_iter().map(|row| row.into_iter().collect::<String>() + "\n").collect()
}
