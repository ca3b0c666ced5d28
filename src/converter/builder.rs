//! # Flight Plan Builder
//!
//! Turns a [`Mission`] into the ordered WPL command records.
//!
//! ## Record Layout
//!
//! | Section | Records |
//! |---------|---------|
//! | Prologue | takeoff speed, initial delay (if > 0), GPS still capture mode, gimbal tilt, takeoff, home waypoint, flying speed (if it differs) |
//! | Mission | one record per plain item, survey groups expanded in order |
//! | Epilogue | home waypoint, landing speed (if it differs), land |
//!
//! Every record passes through the same post-processing as it is emitted,
//! synthesized ones included:
//!
//! - image capture: one image per trigger, configured image format
//! - waypoint: configured hold time and acceptance radius, heading when
//!   yaw tracking is enabled
//! - return to launch: dropped, the epilogue already flies home
//!
//! Sequence indices are assigned only when a record is actually kept, so
//! they stay contiguous from 0.

use std::io::Write;
use tracing::{debug, info, warn};

use super::heading::bearing_deg;
use super::home::{resolve_home, HomeLocation, HomeOverride};
use crate::config::Config;
use crate::error::Result;
use crate::plan::{Mission, SimpleItem};
use crate::wpl::encoder::encode_flight_plan;
use crate::wpl::protocol::*;

/// Converts missions with a fixed, validated configuration
///
/// The converter keeps no state between conversions; each call builds its
/// records in a fresh context, so one instance can convert any number of
/// missions.
///
/// # Examples
///
/// ```
/// use plan_to_wpl::config::Config;
/// use plan_to_wpl::converter::Converter;
/// use plan_to_wpl::plan::Mission;
///
/// let plan = r#"{
///     "mission": {
///         "items": [
///             { "command": 16, "autoContinue": true, "params": [0, 0, 0, null, 47.4, 8.5, 50] }
///         ],
///         "plannedHomePosition": [47.39, 8.54, 488]
///     }
/// }"#;
///
/// let converter = Converter::new(Config::default())?;
/// let mission = Mission::from_json(plan)?;
///
/// let mut output = Vec::new();
/// let count = converter.convert(&mission, &mut output, None)?;
/// assert_eq!(count, 10);
/// assert!(output.starts_with(b"QGC WPL 120\r\n"));
/// # Ok::<(), plan_to_wpl::error::PlanToWplError>(())
/// ```
#[derive(Debug, Clone)]
pub struct Converter {
    config: Config,
}

impl Converter {
    /// Create a converter
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfiguration` if any value is out of range
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Configuration in use
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Build the ordered records for a mission
    ///
    /// # Arguments
    ///
    /// * `mission` - Parsed mission
    /// * `home_override` - Optional home replacing the planned home position
    ///
    /// # Errors
    ///
    /// - `MissingHome` if no home is available
    /// - `NoWaypoint` if the home altitude cannot be backfilled
    pub fn build(
        &self,
        mission: &Mission,
        home_override: Option<&HomeOverride>,
    ) -> Result<Vec<CommandRecord>> {
        let home = resolve_home(mission, home_override)?;
        let mut context = BuildContext::new(&self.config, home);

        context.emit_prologue();
        for item in mission.flatten() {
            context.emit_item(item);
        }
        context.emit_epilogue();

        Ok(context.finish())
    }

    /// Convert a mission and write the flight plan to `output`
    ///
    /// The complete body is built before anything is written, so a failed
    /// conversion writes nothing.
    ///
    /// # Returns
    ///
    /// * `Result<usize>` - Number of records written
    pub fn convert<W: Write>(
        &self,
        mission: &Mission,
        output: &mut W,
        home_override: Option<&HomeOverride>,
    ) -> Result<usize> {
        let records = self.build(mission, home_override)?;
        let body = encode_flight_plan(&records);

        output.write_all(body.as_bytes())?;
        output.flush()?;

        info!("Wrote flight plan with {} commands", records.len());
        Ok(records.len())
    }
}

/// Running state of a single conversion
struct BuildContext<'a> {
    config: &'a Config,
    home: HomeLocation,
    /// Position `(lon, lat)` of the last waypoint emitted
    last_waypoint: Option<(f64, f64)>,
    records: Vec<CommandRecord>,
}

impl<'a> BuildContext<'a> {
    fn new(config: &'a Config, home: HomeLocation) -> Self {
        Self {
            config,
            home,
            last_waypoint: None,
            records: Vec::new(),
        }
    }

    fn emit_prologue(&mut self) {
        let config = self.config;

        self.emit_speed(config.speed.takeoff);

        if config.takeoff.initial_wait > 0.0 {
            self.emit(command(MavCommand::NavDelay, [config.takeoff.initial_wait, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0]));
        }

        self.emit(command(
            MavCommand::SetStillCaptureMode,
            [STILL_CAPTURE_MODE_GPS_POSITION, config.waypoint.radius, 0.0, 0.0, 0.0, 0.0, 0.0],
        ));

        self.emit(command(
            MavCommand::DoMountControl,
            [config.camera.gimbal_angle, 0.0, 0.0, 0.0, 0.0, 0.0, MOUNT_MODE_MAVLINK_TARGETING],
        ));

        self.emit(command(MavCommand::NavTakeoff, [0.0; WPL_PARAM_COUNT]));
        self.emit_home_waypoint();

        if config.speed.flying != config.speed.takeoff {
            self.emit_speed(config.speed.flying);
        }
    }

    fn emit_epilogue(&mut self) {
        let config = self.config;

        self.emit_home_waypoint();

        if config.speed.landing != config.speed.flying {
            self.emit_speed(config.speed.landing);
        }

        self.emit(command(MavCommand::NavLand, [0.0; WPL_PARAM_COUNT]));
    }

    fn emit_item(&mut self, item: &SimpleItem) {
        self.emit(CommandRecord::new(
            item.command(),
            item.resolved_params(),
            item.auto_continue,
        ));
    }

    fn emit_speed(&mut self, speed: f64) {
        self.emit(command(
            MavCommand::DoChangeSpeed,
            [SPEED_TYPE_GROUND, speed, 0.0, 0.0, 0.0, 0.0, 0.0],
        ));
    }

    fn emit_home_waypoint(&mut self) {
        let home = self.home;
        self.emit(command(
            MavCommand::NavWaypoint,
            [0.0, 0.0, 0.0, 0.0, home.latitude, home.longitude, home.altitude],
        ));
    }

    /// Post-process a record and append it under the next sequence index
    fn emit(&mut self, mut record: CommandRecord) {
        match record.command {
            MavCommand::ImageStartCapture => {
                record.params[params::CAPTURE_COUNT] = 1.0;
                record.params[params::CAPTURE_FORMAT] = self.config.camera.image_mode.capture_format();
            }
            MavCommand::NavWaypoint => {
                record.params[params::WAYPOINT_HOLD] = self.config.waypoint.pause_time;
                record.params[params::WAYPOINT_RADIUS] = self.config.waypoint.radius;

                let position = record.position();
                if self.config.waypoint.track_yaw {
                    record.params[params::WAYPOINT_YAW] = self
                        .last_waypoint
                        .map_or(0.0, |last| bearing_deg(last, position));
                }
                self.last_waypoint = Some(position);
            }
            MavCommand::NavReturnToLaunch => {
                // The epilogue already returns home and the Anafi rejects this command
                warn!("Dropping return-to-launch command, the flight plan ends at home anyway");
                return;
            }
            _ => {}
        }

        record.seq = self.records.len() as u32;
        debug!(
            "#{} {:?} params={:?} autocontinue={}",
            record.seq, record.command, record.params, record.auto_continue
        );
        self.records.push(record);
    }

    fn finish(self) -> Vec<CommandRecord> {
        self.records
    }
}

/// Synthesized command, always auto-continuing
fn command(command: MavCommand, params: [f64; WPL_PARAM_COUNT]) -> CommandRecord {
    CommandRecord::new(command, params, true)
}
