use std::{
    env::{self, VarError},
    path::PathBuf,
    time::Duration,
};

use logger::{Level, Logger};

use crate::{errors::MapError, geolocation::DevicePosition, surface::MapStyle, types::Coordinate};

pub const ACCESS_TOKEN_VAR: &str = "STATION_MAP_ACCESS_TOKEN";
pub const STYLE_VAR: &str = "STATION_MAP_STYLE";
pub const STATIONS_VAR: &str = "STATION_MAP_STATIONS";
pub const LOG_DIR_VAR: &str = "STATION_MAP_LOG_DIR";
pub const LOG_LEVEL_VAR: &str = "STATION_MAP_LOG_LEVEL";
pub const DEVICE_POSITION_VAR: &str = "STATION_MAP_DEVICE_POSITION";
pub const FIX_DELAY_VAR: &str = "STATION_MAP_FIX_DELAY_MS";

/// Stations shipped with the crate.
pub const DEFAULT_STATIONS_PATH: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/data/stations.csv");
const DEFAULT_FIX_DELAY: Duration = Duration::from_millis(800);

/// Everything the desktop map needs from its environment.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub style: MapStyle,
    pub stations_path: PathBuf,
    pub log_dir: Option<PathBuf>,
    pub log_level: Level,
    pub device_position: DevicePosition,
    pub fix_delay: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            style: MapStyle::default(),
            stations_path: PathBuf::from(DEFAULT_STATIONS_PATH),
            log_dir: None,
            log_level: Level::Info,
            device_position: DevicePosition::Unavailable,
            fix_delay: DEFAULT_FIX_DELAY,
        }
    }
}

impl Config {
    /// Reads the configuration from the process environment.
    ///
    /// # Errors
    /// `MapError::InvalidConfig` if a variable is set to something unusable.
    pub fn from_env() -> Result<Self, MapError> {
        Self::from_lookup(|name| match env::var(name) {
            Ok(value) => Ok(Some(value)),
            Err(VarError::NotPresent) => Ok(None),
            Err(VarError::NotUnicode(_)) => Err(MapError::InvalidConfig(format!(
                "{} value is not valid unicode",
                name
            ))),
        })
    }

    /// Same as [`Config::from_env`], with `lookup` standing in for the
    /// environment. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, MapError>
    where
        F: Fn(&str) -> Result<Option<String>, MapError>,
    {
        let var = |name: &str| -> Result<Option<String>, MapError> {
            Ok(lookup(name)?
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty()))
        };

        let mut config = Config::default();

        let style_ref = var(STYLE_VAR)?.unwrap_or_else(|| MapStyle::DEFAULT_STYLE_REF.to_string());
        config.style = MapStyle::new(&style_ref, var(ACCESS_TOKEN_VAR)?);

        if let Some(path) = var(STATIONS_VAR)? {
            config.stations_path = PathBuf::from(path);
        }
        config.log_dir = var(LOG_DIR_VAR)?.map(PathBuf::from);

        if let Some(level) = var(LOG_LEVEL_VAR)? {
            config.log_level = level
                .parse()
                .map_err(|e| MapError::InvalidConfig(format!("{}: {}", LOG_LEVEL_VAR, e)))?;
        }
        if let Some(position) = var(DEVICE_POSITION_VAR)? {
            config.device_position = parse_device_position(&position)?;
        }
        if let Some(delay) = var(FIX_DELAY_VAR)? {
            let millis: u64 = delay.parse().map_err(|_| {
                MapError::InvalidConfig(format!(
                    "{} must be milliseconds, got '{}'",
                    FIX_DELAY_VAR, delay
                ))
            })?;
            config.fix_delay = Duration::from_millis(millis);
        }

        Ok(config)
    }

    /// Builds the logger described by `log_dir` and `log_level`.
    ///
    /// # Errors
    /// `MapError::InvalidConfig` if the log directory cannot be used.
    pub fn logger(&self, name: &str) -> Result<Logger, MapError> {
        let logger = match &self.log_dir {
            Some(dir) => Logger::new(dir, name)
                .map_err(|e| MapError::InvalidConfig(format!("{}: {}", LOG_DIR_VAR, e)))?,
            None => Logger::console(),
        };
        Ok(logger.with_min_level(self.log_level))
    }
}

/// `lat,lon`, `denied` or `unavailable`.
fn parse_device_position(value: &str) -> Result<DevicePosition, MapError> {
    match value.to_ascii_lowercase().as_str() {
        "denied" => return Ok(DevicePosition::Denied),
        "unavailable" => return Ok(DevicePosition::Unavailable),
        _ => {}
    }

    let invalid = || {
        MapError::InvalidConfig(format!(
            "{} must be 'lat,lon', 'denied' or 'unavailable', got '{}'",
            DEVICE_POSITION_VAR, value
        ))
    };
    let (lat, lon) = value.split_once(',').ok_or_else(invalid)?;
    let lat: f64 = lat.trim().parse().map_err(|_| invalid())?;
    let lon: f64 = lon.trim().parse().map_err(|_| invalid())?;
    Ok(DevicePosition::Fixed(Coordinate::new(lat, lon)?))
}
