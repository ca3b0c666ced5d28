//! # Plan Module
//!
//! QGroundControl `.plan` missions, the input side of the conversion.
//!
//! This module handles:
//! - Parsing the JSON mission tree
//! - Plain items and survey groups (`TransectStyleComplexItem`)
//! - The planned home position

pub mod types;
pub mod loader;

pub use types::{Mission, MissionItem, PlannedHome, SimpleItem, TransectGroup};
