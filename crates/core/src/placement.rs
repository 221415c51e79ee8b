//! Rule-driven entity placement over a generated level.
//!
//! A [`RuleSet`] is plain declarative data; [`place_entities`] resolves it
//! against a [`crate::levelgen::GeneratedLevel`] into an ordered list of
//! [`PlacementRecord`]s, tracking tile occupancy so no two records collide.
//! Handlers are best-effort: shortfall shows up as fewer records, never as a
//! failed pass.

mod distribute;
mod engine;
mod records;
mod rules;

pub use engine::{PlacementEngine, place_entities};
pub use records::{PlacementRecord, RecordKind, RecordMeta};
pub use rules::{CountRange, PlacementRule, RoomSelector, RuleSet};
