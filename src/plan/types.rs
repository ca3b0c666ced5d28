//! # Mission Types
//!
//! Typed view of a QGroundControl `.plan` mission.

use serde::Deserialize;

use crate::wpl::protocol::{params, MavCommand, WPL_PARAM_COUNT};

/// A single MAVLink command from the mission
///
/// `params` holds the 7 positional values; QGroundControl writes `null` for
/// unused slots.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct SimpleItem {
    pub command: u16,

    #[serde(rename = "autoContinue")]
    pub auto_continue: bool,

    pub params: [Option<f64>; WPL_PARAM_COUNT],
}

impl SimpleItem {
    /// Command kind of this item
    pub fn command(&self) -> MavCommand {
        MavCommand::from(self.command)
    }

    /// Parameters with `null` entries replaced by 0.0
    pub fn resolved_params(&self) -> [f64; WPL_PARAM_COUNT] {
        self.params.map(|value| value.unwrap_or(0.0))
    }

    /// Altitude parameter, 0.0 when unset
    pub fn altitude(&self) -> f64 {
        self.params[params::ALTITUDE].unwrap_or(0.0)
    }
}

/// A survey-style group of items sharing a transect geometry
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct TransectGroup {
    #[serde(rename = "Items")]
    pub items: Vec<SimpleItem>,
}

/// One entry of the mission item list
#[derive(Debug, Clone, PartialEq)]
pub enum MissionItem {
    /// A plain command
    Simple(SimpleItem),

    /// A grouped item expanded in order
    Complex {
        /// `complexItemType` as written by QGroundControl, e.g. "survey"
        kind: Option<String>,
        group: TransectGroup,
    },
}

impl MissionItem {
    /// Plain items in output order, expanding groups
    pub fn simple_items(&self) -> &[SimpleItem] {
        match self {
            MissionItem::Simple(item) => std::slice::from_ref(item),
            MissionItem::Complex { group, .. } => &group.items,
        }
    }
}

/// Planned home position as stored in the plan: `[lat, lon, alt?]`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlannedHome {
    pub latitude: f64,
    pub longitude: f64,
    pub altitude: Option<f64>,
}

/// Mission section of a plan
#[derive(Debug, Clone, PartialEq)]
pub struct Mission {
    pub items: Vec<MissionItem>,
    pub planned_home: Option<PlannedHome>,
}

impl Mission {
    /// All plain items in output order, expanding groups
    pub fn flatten(&self) -> impl Iterator<Item = &SimpleItem> {
        self.items.iter().flat_map(MissionItem::simple_items)
    }

    /// First navigation waypoint, searching inside groups
    pub fn first_waypoint(&self) -> Option<&SimpleItem> {
        self.flatten()
            .find(|item| item.command() == MavCommand::NavWaypoint)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(command: u16, altitude: Option<f64>) -> SimpleItem {
        SimpleItem {
            command,
            auto_continue: true,
            params: [Some(0.0), None, None, None, Some(47.0), Some(8.0), altitude],
        }
    }

    #[test]
    fn test_resolved_params_replaces_null() {
        let params = item(16, Some(30.0)).resolved_params();
        assert_eq!(params, [0.0, 0.0, 0.0, 0.0, 47.0, 8.0, 30.0]);
    }

    #[test]
    fn test_altitude_null_is_zero() {
        assert_eq!(item(16, None).altitude(), 0.0);
        assert_eq!(item(16, Some(12.5)).altitude(), 12.5);
    }

    #[test]
    fn test_flatten_expands_groups_in_order() {
        let mission = Mission {
            items: vec![
                MissionItem::Simple(item(22, Some(1.0))),
                MissionItem::Complex {
                    kind: Some("survey".to_string()),
                    group: TransectGroup {
                        items: vec![item(16, Some(2.0)), item(2000, Some(3.0))],
                    },
                },
                MissionItem::Simple(item(20, Some(4.0))),
            ],
            planned_home: None,
        };

        let altitudes: Vec<f64> = mission.flatten().map(SimpleItem::altitude).collect();
        assert_eq!(altitudes, vec![1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn test_first_waypoint_inside_group() {
        let mission = Mission {
            items: vec![
                MissionItem::Simple(item(22, Some(1.0))),
                MissionItem::Complex {
                    kind: None,
                    group: TransectGroup {
                        items: vec![item(2000, Some(2.0)), item(16, Some(40.0))],
                    },
                },
                MissionItem::Simple(item(16, Some(60.0))),
            ],
            planned_home: None,
        };

        let first = mission.first_waypoint().unwrap();
        assert_eq!(first.altitude(), 40.0);
    }

    #[test]
    fn test_first_waypoint_none() {
        let mission = Mission {
            items: vec![MissionItem::Simple(item(2000, None))],
            planned_home: None,
        };
        assert!(mission.first_waypoint().is_none());
    }
}
