//! # Configuration Module
//!
//! Handles loading and validating conversion parameters from TOML files.
//!
//! Every section and field is optional; missing values fall back to the
//! defaults the Anafi flight plans were tuned with.
//!
//! ```toml
//! [speed]
//! takeoff = 3.0
//! flying = 5.0
//! landing = 2.0
//!
//! [camera]
//! image_mode = "jpeg"
//! gimbal_angle = -90.0
//!
//! [takeoff]
//! initial_wait = 20.0
//!
//! [waypoint]
//! radius = 2.0
//! pause_time = 1.0
//! track_yaw = false
//! ```

use serde::Deserialize;
use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use crate::error::{PlanToWplError, Result};

/// Allowed range for takeoff, flying and landing speeds (m/s)
pub const SPEED_RANGE: (f64, f64) = (1.0, 10.0);

/// Allowed range for the gimbal tilt angle (degrees, negative is down)
pub const GIMBAL_ANGLE_RANGE: (f64, f64) = (-90.0, 90.0);

/// Main configuration structure
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub speed: SpeedConfig,
    #[serde(default)]
    pub camera: CameraConfig,
    #[serde(default)]
    pub takeoff: TakeoffConfig,
    #[serde(default)]
    pub waypoint: WaypointConfig,
}

/// Speed configuration (m/s)
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct SpeedConfig {
    #[serde(default = "default_speed_takeoff")]
    pub takeoff: f64,

    #[serde(default = "default_speed_flying")]
    pub flying: f64,

    #[serde(default = "default_speed_landing")]
    pub landing: f64,
}

/// Camera and gimbal configuration
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct CameraConfig {
    #[serde(default = "default_image_mode")]
    pub image_mode: ImageMode,

    #[serde(default = "default_gimbal_angle")]
    pub gimbal_angle: f64,
}

/// Pre-takeoff configuration
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct TakeoffConfig {
    /// Seconds to wait before takeoff, leaves time to connect FreeFlight
    #[serde(default = "default_initial_wait")]
    pub initial_wait: f64,
}

/// Per-waypoint configuration
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct WaypointConfig {
    /// Acceptance radius (m)
    #[serde(default = "default_waypoint_radius")]
    pub radius: f64,

    /// Hold time after arriving (s)
    #[serde(default = "default_waypoint_pause_time")]
    pub pause_time: f64,

    /// Point the heading at each next waypoint instead of north
    #[serde(default)]
    pub track_yaw: bool,
}

/// Image format used by `MAV_CMD_IMAGE_START_CAPTURE`
///
/// NOTE: `Raw` (DNG) is accepted by the autopilot but does not capture reliably.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ImageMode {
    Snapshot,
    Jpeg,
    JpegFisheye,
    Raw,
}

impl ImageMode {
    /// All supported modes
    pub const ALL: [ImageMode; 4] = [
        ImageMode::Snapshot,
        ImageMode::Jpeg,
        ImageMode::JpegFisheye,
        ImageMode::Raw,
    ];

    /// Capture format code written into the image capture command
    pub fn capture_format(self) -> f64 {
        match self {
            ImageMode::Snapshot => 0.0,
            ImageMode::Jpeg => 12.0,
            ImageMode::JpegFisheye => 13.0,
            ImageMode::Raw => 14.0,
        }
    }

    /// Look up a mode by its capture format code
    pub fn from_capture_format(code: f64) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|mode| mode.capture_format() == code)
    }

    fn name(self) -> &'static str {
        match self {
            ImageMode::Snapshot => "snapshot",
            ImageMode::Jpeg => "jpeg",
            ImageMode::JpegFisheye => "jpeg_fisheye",
            ImageMode::Raw => "raw",
        }
    }
}

impl fmt::Display for ImageMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({:.1})", self.name(), self.capture_format())
    }
}

impl FromStr for ImageMode {
    type Err = PlanToWplError;

    /// Accepts either the mode name (`jpeg_fisheye`) or its code (`13`, `13.0`)
    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        let by_name = Self::ALL
            .into_iter()
            .find(|mode| mode.name().eq_ignore_ascii_case(s));
        let by_code = || s.parse::<f64>().ok().and_then(Self::from_capture_format);

        by_name.or_else(by_code).ok_or_else(|| {
            PlanToWplError::InvalidConfiguration(format!(
                "image_mode must be one of: snapshot (0.0), jpeg (12.0), jpeg_fisheye (13.0), raw (14.0), got '{}'",
                s
            ))
        })
    }
}

// Default value functions
fn default_speed_takeoff() -> f64 { 3.0 }
fn default_speed_flying() -> f64 { 3.0 }
fn default_speed_landing() -> f64 { 2.0 }

fn default_image_mode() -> ImageMode { ImageMode::Jpeg }
fn default_gimbal_angle() -> f64 { -90.0 }

fn default_initial_wait() -> f64 { 20.0 }

fn default_waypoint_radius() -> f64 { 2.0 }
fn default_waypoint_pause_time() -> f64 { 1.0 }

impl Default for SpeedConfig {
    fn default() -> Self {
        Self {
            takeoff: default_speed_takeoff(),
            flying: default_speed_flying(),
            landing: default_speed_landing(),
        }
    }
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            image_mode: default_image_mode(),
            gimbal_angle: default_gimbal_angle(),
        }
    }
}

impl Default for TakeoffConfig {
    fn default() -> Self {
        Self {
            initial_wait: default_initial_wait(),
        }
    }
}

impl Default for WaypointConfig {
    fn default() -> Self {
        Self {
            radius: default_waypoint_radius(),
            pause_time: default_waypoint_pause_time(),
            track_yaw: false,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            speed: SpeedConfig::default(),
            camera: CameraConfig::default(),
            takeoff: TakeoffConfig::default(),
            waypoint: WaypointConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the configuration file
    ///
    /// # Returns
    ///
    /// * `Result<Config>` - Loaded and validated configuration
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - File cannot be read
    /// - TOML parsing fails
    /// - Validation fails
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use plan_to_wpl::config::Config;
    ///
    /// let config = Config::load("config/default.toml")?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfiguration` naming the first value out of range
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("speed.takeoff", self.speed.takeoff),
            ("speed.flying", self.speed.flying),
            ("speed.landing", self.speed.landing),
        ] {
            check_range(name, value, SPEED_RANGE)?;
        }

        check_range("camera.gimbal_angle", self.camera.gimbal_angle, GIMBAL_ANGLE_RANGE)?;

        for (name, value) in [
            ("takeoff.initial_wait", self.takeoff.initial_wait),
            ("waypoint.radius", self.waypoint.radius),
            ("waypoint.pause_time", self.waypoint.pause_time),
        ] {
            check_range(name, value, (0.0, f64::INFINITY))?;
        }

        Ok(())
    }
}

fn check_range(name: &str, value: f64, (min, max): (f64, f64)) -> Result<()> {
    // NaN fails both comparisons, so test for containment rather than exclusion
    if value.is_finite() && value >= min && value <= max {
        return Ok(());
    }

    let message = if max.is_infinite() {
        format!("{} must be a finite value >= {:.1}, got {}", name, min, value)
    } else {
        format!("{} must be between {:.1} and {:.1}, got {}", name, min, max, value)
    };
    Err(PlanToWplError::InvalidConfiguration(message))
}
