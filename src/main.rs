use std::env;

use logger::Color;
use station_map::config::Config;

/// Opens the bike-share station map.
///
/// # Usage
///
/// ```sh
/// cargo run -- [station_id]
/// ```
///
/// With a station id the map opens centered on that station; without one it
/// follows the user position, or the city center when that is unknown.
/// Everything else comes from the `STATION_MAP_*` environment variables.
///
/// # Errors
///
/// The program returns an error if:
/// - More than one argument is given.
/// - An environment variable holds an invalid value.
/// - The window cannot be created.
fn main() -> Result<(), String> {
    let args: Vec<String> = env::args().collect();
    if args.len() > 2 {
        return Err("Usage: program [station_id]".to_string());
    }
    let station_id = args.get(1).cloned();

    let config = Config::from_env().map_err(|e| e.to_string())?;
    let logger = config.logger("desktop").map_err(|e| e.to_string())?;

    let _ = logger.info(
        &format!(
            "Starting station map with style {}",
            config.style.style_ref
        ),
        Color::Green,
    );

    station_map::run(config, station_id, logger).map_err(|e| format!("Window error: {}", e))
}
