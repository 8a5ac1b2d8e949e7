pub mod config;
pub mod controller;
pub mod errors;
pub mod geolocation;
pub mod provider;
pub mod renderer;
pub mod resolver;
pub mod surface;
pub mod types;
pub mod view;
pub mod widgets;

mod app;
mod plugins;
mod state;
mod tiles;
mod windows;

use app::StationMapApp;
use config::Config;
use logger::Logger;

/// Opens the station map window and blocks until it is closed.
///
/// `station_id`, when given, is the station the map opens centered on.
pub fn run(config: Config, station_id: Option<String>, logger: Logger) -> Result<(), eframe::Error> {
    eframe::run_native(
        "Bike Station Map",
        Default::default(),
        Box::new(move |cc| {
            Ok(Box::new(StationMapApp::new(
                cc.egui_ctx.clone(),
                config,
                station_id,
                logger,
            )))
        }),
    )
}
