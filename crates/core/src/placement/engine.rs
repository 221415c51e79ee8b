//! The placement pass: resolves rules against a generated level and emits
//! ordered placement records over a shared occupancy set.

use std::collections::{BTreeMap, BTreeSet};

use crate::levelgen::{GeneratedLevel, RandomStream, Room, derive_stream_seed};
use crate::types::{CellKind, Pos, RoomKind};

use super::distribute::distribute_counts;
use super::records::{PlacementRecord, RecordKind, RecordMeta};
use super::rules::{CountRange, PlacementRule, RoomSelector, RuleSet};

const TILE_ATTEMPTS: usize = 40;
const NEARBY_ATTEMPTS: usize = 12;
const NEARBY_RADIUS: i32 = 2;
/// Placement draws from its own derived stream so layout draws and population
/// draws never interleave.
const PLACEMENT_STREAM: u64 = 0x504C_4143;

const PATIENT_NAMES: [&str; 12] = [
    "Ada", "Bruno", "Clara", "Dmitri", "Edith", "Felix", "Greta", "Henrik", "Ingrid", "Jonas",
    "Klara", "Lars",
];

pub struct PlacementEngine<'a> {
    level: &'a GeneratedLevel,
    rules: &'a RuleSet,
}

impl<'a> PlacementEngine<'a> {
    pub fn new(level: &'a GeneratedLevel, rules: &'a RuleSet) -> Self {
        Self { level, rules }
    }

    /// Runs every rule in declaration order. Handlers are best-effort: a rule
    /// that runs out of rooms or tiles emits fewer records than requested and
    /// the next rule still runs. Callers detect shortfall by counting records.
    pub fn place(&self, seed: u64) -> Vec<PlacementRecord> {
        let mut context = PlacementContext::new(self.level, seed);
        for rule in &self.rules.rules {
            match rule {
                PlacementRule::Hero => context.place_hero(),
                PlacementRule::Patients { count, per_room } => {
                    context.place_patients(*count, *per_room);
                }
                PlacementRule::Npcs { count } => context.place_uniform(
                    RecordKind::Npc,
                    *count,
                    &[RoomKind::Normal, RoomKind::Control],
                ),
                PlacementRule::Enemies { count } => context.place_uniform(
                    RecordKind::Enemy,
                    *count,
                    &[RoomKind::Normal, RoomKind::MiniBoss],
                ),
                PlacementRule::Carts { count } => {
                    context.place_uniform(RecordKind::Cart, *count, &[RoomKind::Normal]);
                }
                PlacementRule::Doors => context.place_doors(),
                PlacementRule::Elevators { links, forbidden } => {
                    context.place_elevators(links, forbidden);
                }
                PlacementRule::Phone { at, unique } => context.place_phone(at, *unique),
                PlacementRule::Lights { per_room, broken_fraction } => {
                    context.place_lights(*per_room, *broken_fraction);
                }
            }
        }
        context.finish()
    }
}

/// One-pass convenience over [`PlacementEngine`].
pub fn place_entities(
    level: &GeneratedLevel,
    rules: &RuleSet,
    seed: u64,
) -> Vec<PlacementRecord> {
    PlacementEngine::new(level, rules).place(seed)
}

/// Mutable working state for a single placement pass. Built fresh per pass
/// and consumed by [`PlacementContext::finish`]; nothing leaks between runs.
struct PlacementContext<'a> {
    level: &'a GeneratedLevel,
    rng: RandomStream,
    occupied: BTreeSet<Pos>,
    tags: BTreeMap<String, usize>,
    next_patient_id: u32,
    next_pair_id: u32,
    broken_light_fraction: Option<f64>,
    records: Vec<PlacementRecord>,
}

/// A patient with its best-effort companions. The bundle is valid even when
/// the pill or bell found no free tile nearby.
struct PatientBundle {
    id: u32,
    name: &'static str,
    patient: Pos,
    pill: Option<Pos>,
    bell: Option<Pos>,
}

impl<'a> PlacementContext<'a> {
    fn new(level: &'a GeneratedLevel, seed: u64) -> Self {
        let mut tags = BTreeMap::new();
        tags.insert("control".to_owned(), level.control_room);
        tags.insert("boss".to_owned(), level.boss_room);
        tags.insert("miniboss".to_owned(), level.miniboss_room);
        let mut normal_ordinal = 0;
        for (index, room) in level.rooms.iter().enumerate() {
            if room.kind == RoomKind::Normal {
                normal_ordinal += 1;
                tags.insert(format!("normal-{normal_ordinal}"), index);
            }
        }

        Self {
            level,
            rng: RandomStream::from_seed(derive_stream_seed(seed, PLACEMENT_STREAM)),
            occupied: BTreeSet::new(),
            tags,
            next_patient_id: 0,
            next_pair_id: 0,
            broken_light_fraction: None,
            records: Vec::new(),
        }
    }

    fn finish(mut self) -> Vec<PlacementRecord> {
        if let Some(fraction) = self.broken_light_fraction {
            let mut light_indices: Vec<usize> = self
                .records
                .iter()
                .enumerate()
                .filter(|(_, record)| record.kind == RecordKind::Light)
                .map(|(index, _)| index)
                .collect();
            self.rng.shuffle(&mut light_indices);
            let broken_count = (fraction * light_indices.len() as f64).round() as usize;
            for &index in light_indices.iter().take(broken_count) {
                self.records[index].meta = RecordMeta::Light { broken: true };
            }
        }
        self.records
    }

    fn resolve(&self, selector: &RoomSelector) -> Vec<usize> {
        match selector {
            RoomSelector::ControlRoom => vec![self.level.control_room],
            RoomSelector::BossRoom => vec![self.level.boss_room],
            RoomSelector::MiniBossRoom => vec![self.level.miniboss_room],
            RoomSelector::NearestToBoss => {
                let boss_center = self.level.rooms[self.level.boss_room].center();
                self.level
                    .rooms
                    .iter()
                    .enumerate()
                    .filter(|(index, _)| *index != self.level.boss_room)
                    .map(|(index, room)| {
                        (room.center().squared_distance(boss_center), index)
                    })
                    .min()
                    .map(|(_, index)| vec![index])
                    .unwrap_or_default()
            }
            RoomSelector::Normal => self.rooms_of(&[RoomKind::Normal]),
            RoomSelector::Tagged(tag) => self.tags.get(tag).copied().into_iter().collect(),
        }
    }

    fn rooms_of(&self, kinds: &[RoomKind]) -> Vec<usize> {
        self.level
            .rooms
            .iter()
            .enumerate()
            .filter(|(_, room)| kinds.contains(&room.kind))
            .map(|(index, _)| index)
            .collect()
    }

    fn claim(&mut self, pos: Pos) -> bool {
        if !self.level.grid.is_walkable(pos) || self.occupied.contains(&pos) {
            return false;
        }
        self.occupied.insert(pos);
        true
    }

    /// Like [`PlacementContext::claim`], but keeps doorway cells clear. Only
    /// the doors rule may occupy those.
    fn claim_open_floor(&mut self, pos: Pos) -> bool {
        if matches!(self.level.grid.get(pos), CellKind::Door | CellKind::BossDoor) {
            return false;
        }
        self.claim(pos)
    }

    /// Bounded resampling inside the room, then a last try on the room's
    /// exact center. `None` means the room is effectively full.
    fn select_tile(&mut self, room_index: usize) -> Option<Pos> {
        let room: Room = self.level.rooms[room_index];
        for _ in 0..TILE_ATTEMPTS {
            let pos = Pos {
                y: self.rng.range_usize(room.y, room.bottom()) as i32,
                x: self.rng.range_usize(room.x, room.right()) as i32,
            };
            if self.claim_open_floor(pos) {
                return Some(pos);
            }
        }
        let center = room.center();
        if self.claim_open_floor(center) { Some(center) } else { None }
    }

    /// Free tile within a small radius of `anchor`, kept inside the room.
    fn free_tile_near(&mut self, room_index: usize, anchor: Pos) -> Option<Pos> {
        let room: Room = self.level.rooms[room_index];
        for _ in 0..NEARBY_ATTEMPTS {
            let pos = Pos {
                y: anchor.y + self.rng.range_i32(-NEARBY_RADIUS, NEARBY_RADIUS),
                x: anchor.x + self.rng.range_i32(-NEARBY_RADIUS, NEARBY_RADIUS),
            };
            if pos == anchor || !room.contains(pos) {
                continue;
            }
            if self.claim_open_floor(pos) {
                return Some(pos);
            }
        }
        None
    }

    fn place_hero(&mut self) {
        let tile = self.level.start_tile;
        if self.claim(tile) {
            self.records.push(PlacementRecord::at(RecordKind::Hero, tile));
        }
    }

    fn place_patients(&mut self, count: usize, per_room: CountRange) {
        let rooms = self.rooms_of(&[RoomKind::Normal]);
        let shares = distribute_counts(count, &rooms, per_room.min, per_room.max, &mut self.rng);
        let mut placed_in = vec![0_usize; shares.len()];
        let mut placed_total = 0;
        for (slot, &(room_index, share)) in shares.iter().enumerate() {
            for _ in 0..share {
                if self.place_one_patient(room_index) {
                    placed_in[slot] += 1;
                    placed_total += 1;
                }
            }
        }

        // A room that ran out of tiles hands its share back; rooms with
        // capacity left absorb it so the rule still reaches its count.
        let mut made_progress = true;
        while placed_total < count && made_progress {
            made_progress = false;
            for (slot, &(room_index, _)) in shares.iter().enumerate() {
                if placed_total == count {
                    break;
                }
                if placed_in[slot] >= per_room.max {
                    continue;
                }
                if self.place_one_patient(room_index) {
                    placed_in[slot] += 1;
                    placed_total += 1;
                    made_progress = true;
                }
            }
        }
    }

    fn place_one_patient(&mut self, room_index: usize) -> bool {
        let Some(tile) = self.select_tile(room_index) else {
            return false;
        };
        let bundle = self.patient_bundle(room_index, tile);
        self.emit_bundle(bundle);
        true
    }

    fn patient_bundle(&mut self, room_index: usize, tile: Pos) -> PatientBundle {
        self.next_patient_id += 1;
        let id = self.next_patient_id;
        let name = PATIENT_NAMES[(id as usize - 1) % PATIENT_NAMES.len()];
        let pill = self.free_tile_near(room_index, tile);
        let bell = self.free_tile_near(room_index, tile);
        PatientBundle { id, name, patient: tile, pill, bell }
    }

    fn emit_bundle(&mut self, bundle: PatientBundle) {
        self.records.push(PlacementRecord {
            kind: RecordKind::Patient,
            tile_x: bundle.patient.x,
            tile_y: bundle.patient.y,
            meta: RecordMeta::Patient { id: bundle.id, name: bundle.name.to_owned() },
        });
        if let Some(tile) = bundle.pill {
            self.records.push(PlacementRecord {
                kind: RecordKind::Pill,
                tile_x: tile.x,
                tile_y: tile.y,
                meta: RecordMeta::Linked { id: bundle.id },
            });
        }
        if let Some(tile) = bundle.bell {
            self.records.push(PlacementRecord {
                kind: RecordKind::Bell,
                tile_x: tile.x,
                tile_y: tile.y,
                meta: RecordMeta::Linked { id: bundle.id },
            });
        }
    }

    fn place_uniform(&mut self, kind: RecordKind, count: usize, room_kinds: &[RoomKind]) {
        let rooms = self.rooms_of(room_kinds);
        let shares = distribute_counts(count, &rooms, 0, count, &mut self.rng);
        for (room_index, share) in shares {
            for _ in 0..share {
                if let Some(tile) = self.select_tile(room_index) {
                    self.records.push(PlacementRecord::at(kind, tile));
                }
            }
        }
    }

    /// Mirrors the doorway cells the carver opened in the grid, one record per
    /// cell, in row-major order.
    fn place_doors(&mut self) {
        for y in 0..self.level.grid.height() as i32 {
            for x in 0..self.level.grid.width() as i32 {
                let pos = Pos { y, x };
                let kind = match self.level.grid.get(pos) {
                    CellKind::Door => RecordKind::Door,
                    CellKind::BossDoor => RecordKind::BossDoor,
                    _ => continue,
                };
                if self.claim(pos) {
                    self.records.push(PlacementRecord::at(kind, pos));
                }
            }
        }
    }

    fn place_elevators(
        &mut self,
        links: &[(RoomSelector, RoomSelector)],
        forbidden: &[RoomSelector],
    ) {
        let forbidden: BTreeSet<usize> =
            forbidden.iter().flat_map(|selector| self.resolve(selector)).collect();
        for (from_selector, to_selector) in links {
            let from_rooms = self.resolve(from_selector);
            let to_rooms = self.resolve(to_selector);
            let (Some(&from), Some(&to)) = (from_rooms.first(), to_rooms.first()) else {
                continue;
            };
            if from == to || forbidden.contains(&from) || forbidden.contains(&to) {
                continue;
            }

            let Some(from_tile) = self.select_tile(from) else {
                continue;
            };
            let Some(to_tile) = self.select_tile(to) else {
                // The link failed as a whole; release the half-claimed tile.
                self.occupied.remove(&from_tile);
                continue;
            };

            self.next_pair_id += 1;
            let pair_id = self.next_pair_id;
            for tile in [from_tile, to_tile] {
                self.records.push(PlacementRecord {
                    kind: RecordKind::Elevator,
                    tile_x: tile.x,
                    tile_y: tile.y,
                    meta: RecordMeta::Elevator { pair_id },
                });
            }
        }
    }

    fn place_phone(&mut self, at: &RoomSelector, unique: bool) {
        if unique && self.records.iter().any(|record| record.kind == RecordKind::Phone) {
            return;
        }
        for room_index in self.resolve(at) {
            if let Some(tile) = self.select_tile(room_index) {
                self.records.push(PlacementRecord::at(RecordKind::Phone, tile));
                if unique {
                    return;
                }
            }
        }
    }

    fn place_lights(&mut self, per_room: usize, broken_fraction: f64) {
        self.broken_light_fraction = Some(broken_fraction);
        for room_index in 0..self.level.rooms.len() {
            for _ in 0..per_room {
                if let Some(tile) = self.select_tile(room_index) {
                    self.records.push(PlacementRecord {
                        kind: RecordKind::Light,
                        tile_x: tile.x,
                        tile_y: tile.y,
                        meta: RecordMeta::Light { broken: false },
                    });
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::levelgen::{LevelParams, generate_level};

    fn placed_default() -> (GeneratedLevel, Vec<PlacementRecord>) {
        let level = generate_level(&LevelParams::default()).expect("default params generate");
        let records = place_entities(&level, &RuleSet::default(), 42);
        (level, records)
    }

    fn count_kind(records: &[PlacementRecord], kind: RecordKind) -> usize {
        records.iter().filter(|record| record.kind == kind).count()
    }

    #[test]
    fn hero_lands_on_the_start_tile() {
        let (level, records) = placed_default();
        let hero = records
            .iter()
            .find(|record| record.kind == RecordKind::Hero)
            .expect("hero rule emits a record");
        assert_eq!(hero.tile(), level.start_tile);
    }

    #[test]
    fn no_two_records_share_a_tile() {
        let (_, records) = placed_default();
        let tiles: BTreeSet<Pos> = records.iter().map(|record| record.tile()).collect();
        assert_eq!(tiles.len(), records.len());
    }

    #[test]
    fn same_seed_reproduces_the_same_record_sequence() {
        let level = generate_level(&LevelParams::default()).expect("default params generate");
        let rules = RuleSet::default();
        let a = place_entities(&level, &rules, 7);
        let b = place_entities(&level, &rules, 7);
        assert_eq!(a, b);
    }

    #[test]
    fn patient_rule_emits_the_requested_count_with_linked_companions() {
        let (_, records) = placed_default();
        assert_eq!(count_kind(&records, RecordKind::Patient), 5);

        let patient_ids: BTreeSet<u32> = records
            .iter()
            .filter_map(|record| match &record.meta {
                RecordMeta::Patient { id, .. } => Some(*id),
                _ => None,
            })
            .collect();
        assert_eq!(patient_ids.len(), 5);

        // Every pill and bell links back to a placed patient.
        for record in &records {
            if matches!(record.kind, RecordKind::Pill | RecordKind::Bell) {
                let RecordMeta::Linked { id } = record.meta else {
                    panic!("companion records carry a link id");
                };
                assert!(patient_ids.contains(&id));
            }
        }
        assert!(count_kind(&records, RecordKind::Pill) <= 5);
        assert!(count_kind(&records, RecordKind::Bell) <= 5);
    }

    #[test]
    fn patients_respect_the_per_room_cap() {
        let (level, records) = placed_default();
        for room in &level.rooms {
            let in_room = records
                .iter()
                .filter(|record| record.kind == RecordKind::Patient)
                .filter(|record| room.contains(record.tile()))
                .count();
            assert!(in_room <= 2, "room holds {in_room} patients, cap is 2");
        }
    }

    #[test]
    fn door_records_mirror_the_carved_doorway_cells() {
        let (level, records) = placed_default();
        let door_cells = level
            .grid
            .cells()
            .iter()
            .filter(|cell| matches!(cell, CellKind::Door | CellKind::BossDoor))
            .count();
        let door_records = count_kind(&records, RecordKind::Door)
            + count_kind(&records, RecordKind::BossDoor);
        assert_eq!(door_records, door_cells);
        assert!(count_kind(&records, RecordKind::BossDoor) >= 1);
    }

    #[test]
    fn elevator_records_come_in_pairs_sharing_an_id() {
        let (_, records) = placed_default();
        let mut by_pair: BTreeMap<u32, usize> = BTreeMap::new();
        for record in &records {
            if record.kind == RecordKind::Elevator {
                let RecordMeta::Elevator { pair_id } = record.meta else {
                    panic!("elevator records carry a pair id");
                };
                *by_pair.entry(pair_id).or_insert(0) += 1;
            }
        }
        for (pair_id, members) in by_pair {
            assert_eq!(members, 2, "pair {pair_id} has {members} members");
        }
    }

    #[test]
    fn broken_lights_match_the_configured_fraction() {
        let (_, records) = placed_default();
        let lights = count_kind(&records, RecordKind::Light);
        assert!(lights > 0);
        let broken = records
            .iter()
            .filter(|record| record.meta == RecordMeta::Light { broken: true })
            .count();
        assert_eq!(broken, (0.2 * lights as f64).round() as usize);
    }

    // A layout with a one-tile normal room: its patient share cannot fit and
    // must flow to the roomy one.
    fn cramped_level() -> GeneratedLevel {
        use crate::levelgen::{Grid, RoomGraph};

        let mut grid = Grid::filled(34, 22, CellKind::Wall);
        let rooms = vec![
            Room { x: 2, y: 2, width: 6, height: 6, kind: RoomKind::Control },
            Room { x: 24, y: 14, width: 6, height: 6, kind: RoomKind::Boss },
            Room { x: 24, y: 2, width: 6, height: 6, kind: RoomKind::MiniBoss },
            Room { x: 12, y: 12, width: 1, height: 1, kind: RoomKind::Normal },
            Room { x: 12, y: 2, width: 8, height: 8, kind: RoomKind::Normal },
        ];
        for room in &rooms {
            for y in room.y..=room.bottom() {
                for x in room.x..=room.right() {
                    grid.set(Pos { y: y as i32, x: x as i32 }, CellKind::Floor);
                }
            }
        }
        GeneratedLevel {
            grid,
            rooms,
            graph: RoomGraph::new(5),
            control_room: 0,
            boss_room: 1,
            miniboss_room: 2,
            start_tile: Pos { y: 5, x: 5 },
        }
    }

    #[test]
    fn patient_shortfall_is_reoffered_to_rooms_with_space() {
        let level = cramped_level();
        let rules = RuleSet {
            rules: vec![PlacementRule::Patients {
                count: 4,
                per_room: CountRange { min: 0, max: 4 },
            }],
        };
        let records = place_entities(&level, &rules, 9);
        assert_eq!(count_kind(&records, RecordKind::Patient), 4);

        let tiny = &level.rooms[3];
        let in_tiny = records
            .iter()
            .filter(|record| record.kind == RecordKind::Patient)
            .filter(|record| tiny.contains(record.tile()))
            .count();
        assert!(in_tiny <= 1, "the one-tile room holds at most one patient");
    }

    #[test]
    fn shortfall_degrades_gracefully_instead_of_aborting() {
        let level = generate_level(&LevelParams::default()).expect("default params generate");
        // Far more carts than the normal rooms can hold alongside everything
        // else; the rule must emit what fits and leave later rules intact.
        let rules = RuleSet {
            rules: vec![
                PlacementRule::Carts { count: 10_000 },
                PlacementRule::Phone { at: RoomSelector::ControlRoom, unique: true },
            ],
        };
        let records = place_entities(&level, &rules, 3);
        assert!(count_kind(&records, RecordKind::Cart) < 10_000);
        assert_eq!(count_kind(&records, RecordKind::Phone), 1);
    }

    #[test]
    fn tagged_selectors_resolve_to_stable_rooms() {
        let level = generate_level(&LevelParams::default()).expect("default params generate");
        let rules = RuleSet {
            rules: vec![PlacementRule::Phone {
                at: RoomSelector::Tagged("normal-1".to_owned()),
                unique: true,
            }],
        };
        let records = place_entities(&level, &rules, 11);
        assert_eq!(count_kind(&records, RecordKind::Phone), 1);

        let first_normal = level
            .rooms
            .iter()
            .find(|room| room.kind == RoomKind::Normal)
            .expect("default layout has normal rooms");
        assert!(first_normal.contains(records[0].tile()));
    }
}
