//! Deterministic level layout generation and rule-driven entity placement.
//!
//! The crate has two halves. [`levelgen`] turns `(parameters, seed)` into a
//! validated grid of rooms and corridors with a guaranteed gate room in front
//! of the boss room. [`placement`] consumes that level plus a declarative
//! rule set and emits ordered entity placement records. Both halves are pure
//! computations: no I/O, no globals, and identical inputs always reproduce
//! identical outputs.

pub mod levelgen;
pub mod placement;
pub mod types;

pub use levelgen::{
    GeneratedLevel, GenerationError, Grid, LevelGenerator, LevelParams, RandomStream, Room,
    RoomGraph, generate_level,
};
pub use placement::{
    CountRange, PlacementEngine, PlacementRecord, PlacementRule, RecordKind, RecordMeta,
    RoomSelector, RuleSet, place_entities,
};
pub use types::{CellKind, Pos, RoomKind};
