use std::time::Duration;

use egui::{Context, RichText};
use egui_extras::install_image_loaders;
use logger::{Color, Logger};

use crate::{
    config::Config,
    controller::MapViewController,
    errors::MapError,
    geolocation::{DeviceGeolocation, GeolocationOptions},
    provider::{StationDirectory, StationFeed},
    renderer::WalkersRenderer,
    resolver::LocationResolver,
    view::StationView,
    widgets::RideActions,
};

const MAP_CONTAINER: &str = "station-map";
const REPAINT_TICK_MS: u64 = 250;

type DesktopView = StationView<WalkersRenderer, DeviceGeolocation, StationDirectory>;

/// The desktop window: the station map plus the ride panel.
pub struct StationMapApp {
    view: DesktopView,
    ride_actions: RideActions,
    failure: Option<MapError>,
    logger: Logger,
}

impl StationMapApp {
    /// Builds the view from `config` and mounts it, centered on `station_id`
    /// when one is given.
    pub fn new(egui_ctx: Context, config: Config, station_id: Option<String>, logger: Logger) -> Self {
        install_image_loaders(&egui_ctx);

        let controller = MapViewController::new(
            WalkersRenderer::new(egui_ctx, logger.clone()),
            MAP_CONTAINER,
            config.style.clone(),
            logger.clone(),
        );
        let resolver = LocationResolver::new(
            DeviceGeolocation::new(config.device_position, config.fix_delay),
            GeolocationOptions::default(),
            logger.clone(),
        );
        let feed = StationFeed::new(
            StationDirectory::open(&config.stations_path),
            logger.clone(),
        );
        let mut view = StationView::new(controller, resolver, feed, logger.clone());

        let ride_logger = logger.clone();
        let report_logger = logger.clone();
        let ride_actions = RideActions::new(
            move || {
                let _ = ride_logger.info("Return bike requested", Color::Yellow);
            },
            move || {
                let _ = report_logger.info("Bike report requested", Color::Yellow);
            },
        );

        let mut failure = None;
        if let Some(id) = station_id {
            if let Err(error) = view.select_station(&id) {
                let _ = logger.warn(&format!("{}, showing the default center", error));
            }
        }
        if let Err(error) = view.mount() {
            failure = Some(error);
        }

        Self {
            view,
            ride_actions,
            failure,
            logger,
        }
    }
}

impl eframe::App for StationMapApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if self.failure.is_none() {
            if let Err(error) = self.view.tick() {
                let _ = self.logger.error(&format!("Map view stopped: {}", error));
                self.view.unmount();
                self.failure = Some(error);
            }
        }

        ctx.request_repaint_after(Duration::from_millis(REPAINT_TICK_MS));

        let rimless = egui::Frame {
            fill: ctx.style().visuals.panel_fill,
            ..Default::default()
        };

        egui::CentralPanel::default()
            .frame(rimless)
            .show(ctx, |ui| match &self.failure {
                None => self.view.show(ui),
                Some(error) => {
                    ui.centered_and_justified(|ui| {
                        ui.label(RichText::new("Map could not be displayed").size(20.0).strong());
                    });
                    ui.label(error.to_string());
                }
            });

        self.ride_actions.show(ctx);
    }
}
