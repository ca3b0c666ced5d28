//! # WPL Protocol Constants and Types
//!
//! Command codes and record layout of the QGC WPL 120 flight plan format as
//! interpreted by the Parrot Anafi.
//!
//! References:
//! - <https://mavlink.io/en/file_formats/>
//! - <https://developer.parrot.com/docs/mavlink-flightplan/messages.html>

/// Version marker on the first line of every flight plan
pub const WPL_HEADER: &str = "QGC WPL 120";

/// Field separator inside a record line
pub const WPL_FIELD_SEPARATOR: &str = "\t";

/// Record line terminator
pub const WPL_LINE_TERMINATOR: &str = "\r\n";

/// Number of fields in every record line
pub const WPL_FIELD_COUNT: usize = 12;

/// Number of command parameters per record
pub const WPL_PARAM_COUNT: usize = 7;

/// "Current waypoint" field, the Anafi ignores it so it is always 0
pub const WPL_CURRENT: u8 = 0;

/// Coordinate frame field (MAV_FRAME_GLOBAL_RELATIVE_ALT), always 3
pub const WPL_FRAME: u8 = 3;

/// Parameter indices (0-based into `CommandRecord::params`)
pub mod params {
    /// Waypoint hold time (s)
    pub const WAYPOINT_HOLD: usize = 0;
    /// Waypoint acceptance radius (m)
    pub const WAYPOINT_RADIUS: usize = 1;
    /// Waypoint yaw (deg)
    pub const WAYPOINT_YAW: usize = 3;
    /// Latitude (deg)
    pub const LATITUDE: usize = 4;
    /// Longitude (deg)
    pub const LONGITUDE: usize = 5;
    /// Altitude (m)
    pub const ALTITUDE: usize = 6;
    /// Number of images to capture
    pub const CAPTURE_COUNT: usize = 1;
    /// Image capture format
    pub const CAPTURE_FORMAT: usize = 2;
}

/// `MAV_CMD_DO_CHANGE_SPEED` speed type: ground speed
pub const SPEED_TYPE_GROUND: f64 = 1.0;

/// `MAV_STILL_CAPTURE_MODE_TYPE`: interval measured in distance travelled
pub const STILL_CAPTURE_MODE_GPS_POSITION: f64 = 1.0;

/// `MAV_MOUNT_MODE_MAVLINK_TARGETING`, written into param7 of mount control
pub const MOUNT_MODE_MAVLINK_TARGETING: f64 = 2.0;

/// MAVLink commands understood by the Anafi flight plan interpreter
///
/// Not every command is synthesized or post-processed, unknown codes travel
/// through as `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MavCommand {
    NavWaypoint,
    NavReturnToLaunch,
    NavLand,
    NavTakeoff,
    SetViewMode,
    NavDelay,
    ConditionDelay,
    DoChangeSpeed,
    DoSetRoi,
    DoMountControl,
    ImageStartCapture,
    ImageStopCapture,
    VideoStartCapture,
    VideoStopCapture,
    PanoramaCreate,
    SetStillCaptureMode,
    Other(u16),
}

impl MavCommand {
    /// Numeric MAVLink command code
    pub fn code(self) -> u16 {
        match self {
            MavCommand::NavWaypoint => 16,
            MavCommand::NavReturnToLaunch => 20,
            MavCommand::NavLand => 21,
            MavCommand::NavTakeoff => 22,
            MavCommand::NavDelay => 93,
            MavCommand::ConditionDelay => 112,
            MavCommand::DoChangeSpeed => 178,
            MavCommand::DoSetRoi => 201,
            MavCommand::DoMountControl => 205,
            MavCommand::ImageStartCapture => 2000,
            MavCommand::ImageStopCapture => 2001,
            MavCommand::VideoStartCapture => 2500,
            MavCommand::VideoStopCapture => 2501,
            MavCommand::PanoramaCreate => 2800,
            MavCommand::SetViewMode => 50000,
            MavCommand::SetStillCaptureMode => 50001,
            MavCommand::Other(code) => code,
        }
    }
}

impl From<u16> for MavCommand {
    fn from(code: u16) -> Self {
        match code {
            16 => MavCommand::NavWaypoint,
            20 => MavCommand::NavReturnToLaunch,
            21 => MavCommand::NavLand,
            22 => MavCommand::NavTakeoff,
            93 => MavCommand::NavDelay,
            112 => MavCommand::ConditionDelay,
            178 => MavCommand::DoChangeSpeed,
            201 => MavCommand::DoSetRoi,
            205 => MavCommand::DoMountControl,
            2000 => MavCommand::ImageStartCapture,
            2001 => MavCommand::ImageStopCapture,
            2500 => MavCommand::VideoStartCapture,
            2501 => MavCommand::VideoStopCapture,
            2800 => MavCommand::PanoramaCreate,
            50000 => MavCommand::SetViewMode,
            50001 => MavCommand::SetStillCaptureMode,
            other => MavCommand::Other(other),
        }
    }
}

/// One line of a WPL flight plan
///
/// The current and frame fields are constant and supplied by the encoder.
#[derive(Debug, Clone, PartialEq)]
pub struct CommandRecord {
    /// Sequence index, 0-based and contiguous
    pub seq: u32,

    /// MAVLink command
    pub command: MavCommand,

    /// param1..param7
    pub params: [f64; WPL_PARAM_COUNT],

    /// Continue to the next command once this one completes
    pub auto_continue: bool,
}

impl CommandRecord {
    /// Create a record; the sequence index is assigned when it is emitted
    pub fn new(command: MavCommand, params: [f64; WPL_PARAM_COUNT], auto_continue: bool) -> Self {
        Self {
            seq: 0,
            command,
            params,
            auto_continue,
        }
    }

    /// Latitude/longitude of a navigation command as `(lon, lat)`
    pub fn position(&self) -> (f64, f64) {
        (self.params[params::LONGITUDE], self.params[params::LATITUDE])
    }
}
