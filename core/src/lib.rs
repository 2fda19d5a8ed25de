#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Labpyrinthe map pipeline.
//!
//! This crate defines the message surface that connects the rule engine, the
//! publication pipeline, and the partie container. The engine describes the
//! map as [`Case`] values and ships them either as a full [`MapPayload`] or as
//! an incremental [`ChangeLog`]. The pipeline routes each case to its
//! [`LayerName`] and reports back through [`ContainerEvent`] values.

mod case;
mod layer;
mod message;

pub use case::{
    AnimationScenario, Behavior, Case, CaseKind, CellCoord, DangerType, GrenadeId, HexColor,
    RobotCase, RobotId, RobotStats, TypeCase, POWER_LEVELS,
};
pub use layer::{LayerKind, LayerName};
pub use message::{
    ChangeLog, ContainerEvent, GambleInfo, GameMessage, MapPayload, PartieState, PlayerPower,
    RobotListing,
};

/// Default upper bound on the pixel side of a single cell.
pub const DEFAULT_MAX_CELL_SIZE: u32 = 40;
