//! # Plan To WPL Library
//!
//! Convert QGroundControl `.plan` missions into QGC WPL 120 flight plans for
//! the Parrot Anafi.
//!
//! This library provides the conversion core: parsing the mission tree,
//! resolving home, synthesizing the takeoff and landing commands the Anafi
//! needs, and writing the tab-separated flight plan text.

pub mod config;
pub mod error;
pub mod plan;
pub mod wpl;
pub mod converter;
