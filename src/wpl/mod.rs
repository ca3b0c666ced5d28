//! # WPL Flight Plan Module
//!
//! The QGC WPL 120 text format consumed by the Parrot Anafi.
//!
//! This module handles:
//! - MAVLink command codes and their parameter layout
//! - The fixed 12-field command record
//! - Serialization of records into CRLF-terminated, tab-separated lines

pub mod protocol;
pub mod encoder;
