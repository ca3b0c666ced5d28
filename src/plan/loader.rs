//! # Plan Loader
//!
//! Reads QGroundControl `.plan` JSON into a [`Mission`].
//!
//! Only the fields the conversion needs are read; everything else in the
//! plan (geofence, rally points, survey geometry) is ignored.

use serde::Deserialize;
use serde_json::error::Category;
use serde_json::{Map, Value};
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

use super::types::{Mission, MissionItem, PlannedHome, SimpleItem, TransectGroup};
use crate::error::{PlanToWplError, Result};

/// Key marking a grouped (survey, corridor scan) item
const TRANSECT_KEY: &str = "TransectStyleComplexItem";

/// Key present on every plain item
const PARAMS_KEY: &str = "params";

#[derive(Debug, Deserialize)]
struct RawPlan {
    mission: RawMission,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawMission {
    items: Vec<Value>,

    #[serde(default)]
    planned_home_position: Option<Vec<Option<f64>>>,
}

impl Mission {
    /// Load a mission from a `.plan` file
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - File cannot be read
    /// - File is not JSON
    /// - Required mission structure is missing
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use plan_to_wpl::plan::Mission;
    ///
    /// let mission = Mission::load("survey.plan")?;
    /// println!("{} items", mission.items.len());
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    /// Parse a mission from `.plan` JSON text
    ///
    /// # Errors
    ///
    /// - `Json` if the text is not valid JSON
    /// - `MalformedMission` if `mission.items` is absent or an item lacks
    ///   `command`, `autoContinue` or a 7-entry `params` list
    pub fn from_json(text: &str) -> Result<Self> {
        let raw: RawPlan = serde_json::from_str(text).map_err(|e| match e.classify() {
            Category::Data => PlanToWplError::MalformedMission(e.to_string()),
            _ => PlanToWplError::Json(e),
        })?;

        let planned_home = raw
            .mission
            .planned_home_position
            .map(|position| parse_planned_home(&position))
            .transpose()?;

        let mut items = Vec::with_capacity(raw.mission.items.len());
        for (index, value) in raw.mission.items.iter().enumerate() {
            if let Some(item) = parse_item(index, value)? {
                items.push(item);
            }
        }

        debug!("Parsed {} mission items", items.len());
        Ok(Self { items, planned_home })
    }
}

/// Planned home is stored as `[lat, lon, alt]`, altitude optional
fn parse_planned_home(position: &[Option<f64>]) -> Result<PlannedHome> {
    match position {
        [Some(latitude), Some(longitude), rest @ ..] if rest.len() <= 1 => Ok(PlannedHome {
            latitude: *latitude,
            longitude: *longitude,
            altitude: rest.first().copied().flatten(),
        }),
        _ => Err(PlanToWplError::MalformedMission(format!(
            "plannedHomePosition must be [lat, lon, alt], got {:?}",
            position
        ))),
    }
}

/// Classify one entry of `mission.items`
///
/// Returns `None` for items that are neither plain nor grouped.
fn parse_item(index: usize, value: &Value) -> Result<Option<MissionItem>> {
    let object = value.as_object().ok_or_else(|| {
        PlanToWplError::MalformedMission(format!("item {} is not a JSON object", index))
    })?;

    if let Some(group) = object.get(TRANSECT_KEY) {
        let group = TransectGroup::deserialize(group)
            .map_err(|e| malformed_item(index, TRANSECT_KEY, e))?;
        return Ok(Some(MissionItem::Complex {
            kind: complex_kind(object),
            group,
        }));
    }

    if object.contains_key(PARAMS_KEY) {
        let item = SimpleItem::deserialize(value)
            .map_err(|e| malformed_item(index, "simple item", e))?;
        return Ok(Some(MissionItem::Simple(item)));
    }

    warn!(
        "Skipping mission item {} ({}): no \"{}\" or \"{}\" to convert",
        index,
        complex_kind(object).as_deref().unwrap_or("unknown type"),
        PARAMS_KEY,
        TRANSECT_KEY
    );
    Ok(None)
}

fn complex_kind(object: &Map<String, Value>) -> Option<String> {
    object
        .get("complexItemType")
        .and_then(Value::as_str)
        .map(str::to_owned)
}

fn malformed_item(index: usize, what: &str, error: serde_json::Error) -> PlanToWplError {
    PlanToWplError::MalformedMission(format!("item {} ({}): {}", index, what, error))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn waypoint(lat: f64, lon: f64, alt: f64) -> Value {
        json!({
            "type": "SimpleItem",
            "command": 16,
            "autoContinue": true,
            "frame": 3,
            "doJumpId": 1,
            "params": [0, 0, 0, null, lat, lon, alt]
        })
    }

    fn plan(items: Vec<Value>) -> String {
        json!({
            "fileType": "Plan",
            "version": 1,
            "groundStation": "QGroundControl",
            "mission": {
                "version": 2,
                "firmwareType": 12,
                "items": items,
                "plannedHomePosition": [47.39, 8.54, 488.0]
            }
        })
        .to_string()
    }

    #[test]
    fn test_parse_simple_items() {
        let mission = Mission::from_json(&plan(vec![
            waypoint(47.0, 8.0, 50.0),
            waypoint(47.1, 8.1, 55.0),
        ]))
        .unwrap();

        assert_eq!(mission.items.len(), 2);
        match &mission.items[0] {
            MissionItem::Simple(item) => {
                assert_eq!(item.command, 16);
                assert!(item.auto_continue);
                assert_eq!(item.params[3], None);
                assert_eq!(item.params[6], Some(50.0));
            }
            other => panic!("expected simple item, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_planned_home() {
        let mission = Mission::from_json(&plan(vec![])).unwrap();
        let home = mission.planned_home.unwrap();
        assert_eq!(home.latitude, 47.39);
        assert_eq!(home.longitude, 8.54);
        assert_eq!(home.altitude, Some(488.0));
    }

    #[test]
    fn test_parse_planned_home_without_altitude() {
        let text = json!({
            "mission": { "items": [], "plannedHomePosition": [47.39, 8.54] }
        })
        .to_string();
        let home = Mission::from_json(&text).unwrap().planned_home.unwrap();
        assert_eq!(home.altitude, None);
    }

    #[test]
    fn test_missing_planned_home() {
        let text = json!({ "mission": { "items": [] } }).to_string();
        let mission = Mission::from_json(&text).unwrap();
        assert!(mission.planned_home.is_none());
    }

    #[test]
    fn test_invalid_planned_home() {
        let text = json!({
            "mission": { "items": [], "plannedHomePosition": [47.39] }
        })
        .to_string();
        let result = Mission::from_json(&text);
        assert!(matches!(result, Err(PlanToWplError::MalformedMission(_))));
    }

    #[test]
    fn test_parse_transect_group() {
        let survey = json!({
            "type": "ComplexItem",
            "complexItemType": "survey",
            "TransectStyleComplexItem": {
                "Items": [waypoint(47.0, 8.0, 40.0), waypoint(47.0, 8.1, 40.0)],
                "CameraTriggerInTurnAround": true
            }
        });
        let mission = Mission::from_json(&plan(vec![survey])).unwrap();

        match &mission.items[0] {
            MissionItem::Complex { kind, group } => {
                assert_eq!(kind.as_deref(), Some("survey"));
                assert_eq!(group.items.len(), 2);
            }
            other => panic!("expected complex item, got {:?}", other),
        }
    }

    #[test]
    fn test_unsupported_item_is_skipped() {
        let structure_scan = json!({
            "type": "ComplexItem",
            "complexItemType": "StructureScan",
            "Altitude": 20
        });
        let mission =
            Mission::from_json(&plan(vec![structure_scan, waypoint(47.0, 8.0, 50.0)])).unwrap();
        assert_eq!(mission.items.len(), 1);
    }

    #[test]
    fn test_invalid_json() {
        let result = Mission::from_json("{ \"mission\": ");
        assert!(matches!(result, Err(PlanToWplError::Json(_))));
    }

    #[test]
    fn test_missing_mission() {
        let result = Mission::from_json("{\"fileType\": \"Plan\"}");
        assert!(matches!(result, Err(PlanToWplError::MalformedMission(_))));
    }

    #[test]
    fn test_missing_items() {
        let result = Mission::from_json("{\"mission\": {\"version\": 2}}");
        assert!(matches!(result, Err(PlanToWplError::MalformedMission(_))));
    }

    #[test]
    fn test_item_missing_command() {
        let item = json!({ "autoContinue": true, "params": [0, 0, 0, 0, 0, 0, 0] });
        let result = Mission::from_json(&plan(vec![item]));
        match result {
            Err(PlanToWplError::MalformedMission(message)) => {
                assert!(message.contains("item 0"), "got: {}", message);
            }
            other => panic!("expected MalformedMission, got {:?}", other),
        }
    }

    #[test]
    fn test_item_short_params() {
        let item = json!({ "command": 16, "autoContinue": true, "params": [0, 0, 0] });
        let result = Mission::from_json(&plan(vec![item]));
        assert!(matches!(result, Err(PlanToWplError::MalformedMission(_))));
    }

    #[test]
    fn test_group_missing_items() {
        let survey = json!({ "TransectStyleComplexItem": { "VisualTransectPoints": [] } });
        let result = Mission::from_json(&plan(vec![survey]));
        assert!(matches!(result, Err(PlanToWplError::MalformedMission(_))));
    }

    #[test]
    fn test_item_not_object() {
        let result = Mission::from_json(&plan(vec![json!(42)]));
        assert!(matches!(result, Err(PlanToWplError::MalformedMission(_))));
    }

    #[test]
    fn test_load_from_file() {
        use std::io::Write;
        use tempfile::NamedTempFile;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(plan(vec![waypoint(47.0, 8.0, 50.0)]).as_bytes())
            .unwrap();
        temp_file.flush().unwrap();

        let mission = Mission::load(temp_file.path()).unwrap();
        assert_eq!(mission.items.len(), 1);
    }

    #[test]
    fn test_load_missing_file() {
        let result = Mission::load("/nonexistent/mission.plan");
        assert!(matches!(result, Err(PlanToWplError::Io(_))));
    }
}
