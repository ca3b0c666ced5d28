//! # Converter Module
//!
//! Mission to flight plan conversion.
//!
//! This module handles:
//! - Resolving the home location and its flying altitude
//! - Synthesizing the setup and teardown commands around the mission
//! - Per-command post-processing (image capture, waypoints, return to launch)
//! - Optional heading tracking between waypoints

pub mod builder;
pub mod heading;
pub mod home;

pub use builder::Converter;
pub use home::{HomeLocation, HomeOverride};
