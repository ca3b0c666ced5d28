//! # Plan To WPL
//!
//! Convert a QGroundControl `.plan` mission into a QGC WPL 120 flight plan
//! that the Parrot Anafi can fly.
//!
//! # Examples
//!
//! ```bash
//! plan-to-wpl survey.plan --home "8.5417,47.3769" --speed-flying 5
//! ```
//!
//! Expected output:
//! ```text
//! INFO plan_to_wpl: Plan To WPL v0.1.0 starting...
//! INFO plan_to_wpl::converter::builder: Wrote flight plan with 42 commands
//! INFO plan_to_wpl: Saved flight plan to survey.txt
//! ```

use anyhow::{bail, Context, Result};
use clap::Parser;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use plan_to_wpl::config::{Config, ImageMode};
use plan_to_wpl::converter::{Converter, HomeOverride};
use plan_to_wpl::plan::Mission;

/// Required extension of input missions
const PLAN_EXTENSION: &str = "plan";

/// Extension of generated flight plans
const OUTPUT_EXTENSION: &str = "txt";

/// Convert a QGroundControl .plan file into a QGC WPL 120 flight plan for the Parrot Anafi
#[derive(Parser, Debug)]
#[command(name = "plan-to-wpl", version)]
struct Args {
    /// Path to the .plan file to convert
    plan_path: PathBuf,

    /// Output path (default: the .plan path with a .txt extension)
    #[arg(long = "out", visible_alias = "out-path")]
    out: Option<PathBuf>,

    /// Override the planned home as "lon,lat" or "lon,lat,alt".
    /// Without an altitude the first waypoint's altitude is used.
    #[arg(long = "home", visible_alias = "force-home", allow_hyphen_values = true)]
    home: Option<String>,

    /// TOML configuration file, flags below take precedence
    #[arg(long)]
    config: Option<PathBuf>,

    /// Takeoff speed in m/s [1.0-10.0, default 3.0]
    #[arg(long)]
    speed_takeoff: Option<f64>,

    /// Speed between waypoints in m/s [1.0-10.0, default 3.0]
    #[arg(long)]
    speed_flying: Option<f64>,

    /// Landing speed in m/s [1.0-10.0, default 2.0]
    #[arg(long)]
    speed_landing: Option<f64>,

    /// Acceptance radius for each waypoint in m [default 2.0]
    #[arg(long)]
    waypoint_radius: Option<f64>,

    /// Time to hold at each waypoint in s [default 1.0]
    #[arg(long)]
    waypoint_time: Option<f64>,

    /// Image format: snapshot (0), jpeg (12), jpeg_fisheye (13), raw (14) [default jpeg]
    #[arg(long)]
    image_mode: Option<ImageMode>,

    /// Gimbal tilt in degrees, negative is down [-90.0-90.0, default -90.0]
    #[arg(long, allow_negative_numbers = true)]
    gimbal_angle: Option<f64>,

    /// Seconds to wait before takeoff to connect FreeFlight [default 20.0]
    #[arg(long)]
    initial_wait: Option<f64>,

    /// Turn towards each next waypoint instead of always facing north
    #[arg(long)]
    track_yaw: bool,
}

impl Args {
    /// Configuration file (or defaults) with command line overrides applied
    fn resolve_config(&self) -> Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::load(path)
                .with_context(|| format!("Failed to load config {}", path.display()))?,
            None => Config::default(),
        };

        let overrides = [
            (self.speed_takeoff, &mut config.speed.takeoff),
            (self.speed_flying, &mut config.speed.flying),
            (self.speed_landing, &mut config.speed.landing),
            (self.waypoint_radius, &mut config.waypoint.radius),
            (self.waypoint_time, &mut config.waypoint.pause_time),
            (self.gimbal_angle, &mut config.camera.gimbal_angle),
            (self.initial_wait, &mut config.takeoff.initial_wait),
        ];
        for (value, field) in overrides {
            if let Some(value) = value {
                *field = value;
            }
        }

        if let Some(image_mode) = self.image_mode {
            config.camera.image_mode = image_mode;
        }
        if self.track_yaw {
            config.waypoint.track_yaw = true;
        }

        Ok(config)
    }

    fn home_override(&self) -> Result<Option<HomeOverride>> {
        Ok(self.home.as_deref().map(str::parse::<HomeOverride>).transpose()?)
    }

    fn output_path(&self) -> PathBuf {
        self.out
            .clone()
            .unwrap_or_else(|| default_output_path(&self.plan_path))
    }
}

fn default_output_path(plan_path: &Path) -> PathBuf {
    plan_path.with_extension(OUTPUT_EXTENSION)
}

fn is_plan_file(path: &Path) -> bool {
    path.extension().and_then(|ext| ext.to_str()) == Some(PLAN_EXTENSION)
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into())
        )
        .init();

    info!("Plan To WPL v{} starting...", env!("CARGO_PKG_VERSION"));

    let args = Args::parse();
    run(&args)
}

fn run(args: &Args) -> Result<()> {
    if !is_plan_file(&args.plan_path) {
        bail!("Expected a .plan file, got {}", args.plan_path.display());
    }

    let converter = Converter::new(args.resolve_config()?)?;
    let home_override = args.home_override()?;

    let mission = Mission::load(&args.plan_path)
        .with_context(|| format!("Failed to read mission {}", args.plan_path.display()))?;

    let mut body = Vec::new();
    converter.convert(&mission, &mut body, home_override.as_ref())?;

    let out_path = args.output_path();
    fs::write(&out_path, body)
        .with_context(|| format!("Failed to write flight plan {}", out_path.display()))?;

    info!("Saved flight plan to {}", out_path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("plan-to-wpl").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_default_output_path() {
        let args = parse(&["missions/survey.plan"]);
        assert_eq!(args.output_path(), PathBuf::from("missions/survey.txt"));
    }

    #[test]
    fn test_explicit_output_path() {
        let args = parse(&["survey.plan", "--out", "anafi.txt"]);
        assert_eq!(args.output_path(), PathBuf::from("anafi.txt"));

        let args = parse(&["survey.plan", "--out-path", "other.txt"]);
        assert_eq!(args.output_path(), PathBuf::from("other.txt"));
    }

    #[test]
    fn test_plan_extension_required() {
        assert!(is_plan_file(Path::new("survey.plan")));
        assert!(!is_plan_file(Path::new("survey.json")));
        assert!(!is_plan_file(Path::new("survey")));
    }

    #[test]
    fn test_defaults_without_flags() {
        let args = parse(&["survey.plan"]);
        assert_eq!(args.resolve_config().unwrap(), Config::default());
        assert!(args.home_override().unwrap().is_none());
    }

    #[test]
    fn test_flag_overrides() {
        let args = parse(&[
            "survey.plan",
            "--speed-flying", "5.0",
            "--waypoint-time", "0.5",
            "--gimbal-angle", "-45",
            "--image-mode", "13",
            "--track-yaw",
        ]);
        let config = args.resolve_config().unwrap();

        assert_eq!(config.speed.flying, 5.0);
        assert_eq!(config.waypoint.pause_time, 0.5);
        assert_eq!(config.camera.gimbal_angle, -45.0);
        assert_eq!(config.camera.image_mode, ImageMode::JpegFisheye);
        assert!(config.waypoint.track_yaw);
        assert_eq!(config.speed.takeoff, 3.0);
    }

    #[test]
    fn test_flags_override_config_file() {
        use std::io::Write;
        use tempfile::NamedTempFile;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(b"[speed]\nflying = 6.0\nlanding = 4.0\n")
            .unwrap();
        temp_file.flush().unwrap();
        let config_path = temp_file.path().to_str().unwrap().to_string();

        let args = parse(&["survey.plan", "--config", &config_path, "--speed-landing", "1.5"]);
        let config = args.resolve_config().unwrap();
        assert_eq!(config.speed.flying, 6.0);
        assert_eq!(config.speed.landing, 1.5);
    }

    #[test]
    fn test_home_override_negative_longitude() {
        let args = parse(&["survey.plan", "--home", "-122.4194,37.7749,30"]);
        let home = args.home_override().unwrap().unwrap();
        assert_eq!(home.longitude, -122.4194);
        assert_eq!(home.latitude, 37.7749);
        assert_eq!(home.altitude, Some(30.0));
    }

    #[test]
    fn test_invalid_home_override() {
        let args = parse(&["survey.plan", "--force-home", "10.0"]);
        assert!(args.home_override().is_err());
    }

    #[test]
    fn test_invalid_image_mode_rejected() {
        let result = Args::try_parse_from(["plan-to-wpl", "survey.plan", "--image-mode", "11"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_run_end_to_end() {
        use std::io::Write;
        use tempfile::TempDir;

        let dir = TempDir::new().unwrap();
        let plan_path = dir.path().join("square.plan");
        let plan = r#"{
            "fileType": "Plan",
            "mission": {
                "items": [
                    {"type": "SimpleItem", "command": 22, "autoContinue": true, "params": [0, 0, 0, null, 47.3977, 8.5456, 30]},
                    {"type": "SimpleItem", "command": 16, "autoContinue": true, "params": [0, 0, 0, null, 47.3980, 8.5456, 30]},
                    {"type": "SimpleItem", "command": 20, "autoContinue": true, "params": [0, 0, 0, 0, 0, 0, 0]}
                ],
                "plannedHomePosition": [47.3977, 8.5456, 488]
            }
        }"#;
        fs::File::create(&plan_path)
            .unwrap()
            .write_all(plan.as_bytes())
            .unwrap();

        let args = parse(&[plan_path.to_str().unwrap()]);
        run(&args).unwrap();

        let output = fs::read_to_string(dir.path().join("square.txt")).unwrap();
        assert!(output.starts_with("QGC WPL 120\r\n"));
        assert!(output.ends_with("\t21\t0.0\t0.0\t0.0\t0.0\t0.0\t0.0\t0.0\t1\r\n"));
        // 6 prologue + takeoff and waypoint from the plan + 3 epilogue, RTL dropped
        assert_eq!(output.lines().count(), 1 + 11);
    }

    #[test]
    fn test_run_rejects_non_plan_file() {
        let args = parse(&["mission.json"]);
        assert!(run(&args).is_err());
    }
}
