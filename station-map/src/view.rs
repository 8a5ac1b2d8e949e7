use logger::{Color, Logger};

use crate::{
    controller::MapViewController,
    errors::MapError,
    geolocation::Geolocation,
    provider::{FeedStatus, StationFeed, StationProvider},
    renderer::WalkersRenderer,
    resolver::{AcquireOutcome, Acquisition, LocationResolver},
    surface::MapRenderer,
    types::Coordinate,
};

/// The station map screen: ties the station feed, the user position and the
/// map surface together.
///
/// The owner calls [`StationView::tick`] once per frame. Geolocation results
/// only take effect there, on the owner's thread.
pub struct StationView<R: MapRenderer, G: Geolocation, P: StationProvider> {
    controller: MapViewController<R>,
    resolver: LocationResolver<G>,
    feed: StationFeed<P>,
    explicit: Option<Coordinate>,
    logger: Logger,
}

impl<R: MapRenderer, G: Geolocation, P: StationProvider> StationView<R, G, P> {
    pub fn new(
        controller: MapViewController<R>,
        resolver: LocationResolver<G>,
        feed: StationFeed<P>,
        logger: Logger,
    ) -> Self {
        Self {
            controller,
            resolver,
            feed,
            explicit: None,
            logger,
        }
    }

    /// Centers the view on the station with `id`.
    ///
    /// # Errors
    /// `MapError::StationNotFound` if the feed has no such station. The
    /// current center is kept in that case.
    pub fn select_station(&mut self, id: &str) -> Result<(), MapError> {
        if self.feed.status() == &FeedStatus::Idle {
            self.feed.refresh_all();
        }
        let station = self
            .feed
            .find(id)
            .ok_or_else(|| MapError::StationNotFound(id.to_string()))?;

        let _ = self.logger.info(
            &format!("Viewing station {} ({})", station.id, station.name),
            Color::Yellow,
        );
        self.explicit = Some(station.location);
        Ok(())
    }

    pub fn set_explicit(&mut self, explicit: Option<Coordinate>) {
        self.explicit = explicit;
    }

    /// Shows the map: loads the stations if they were never loaded, mounts
    /// the surface at the resolved center and asks for the user position
    /// unless a station coordinate is known.
    ///
    /// # Errors
    /// Whatever `MapViewController::mount` reports. The view stays unmounted
    /// and no position is requested.
    pub fn mount(&mut self) -> Result<(), MapError> {
        if self.feed.status() == &FeedStatus::Idle {
            self.feed.refresh_all();
        }

        self.resolver.begin();
        let center = self.resolver.center(self.explicit);
        if let Err(error) = self.controller.mount(center, self.feed.stations()) {
            self.resolver.cancel();
            return Err(error);
        }

        if self.resolver.acquire_user_location(self.explicit) == AcquireOutcome::SkippedExplicit {
            let _ = self
                .logger
                .debug("Station coordinate known, user position not requested");
        }
        Ok(())
    }

    /// Applies whatever changed since the last tick: a delivered user
    /// position, a new explicit coordinate or a new station list.
    ///
    /// Geolocation failures are absorbed here. Does nothing while unmounted.
    pub fn tick(&mut self) -> Result<(), MapError> {
        if !self.controller.is_mounted() {
            return Ok(());
        }

        // Clearing the explicit coordinate opens the way for a request.
        self.resolver.acquire_user_location(self.explicit);

        match self.resolver.poll() {
            Some(Acquisition::Acquired(position)) => {
                self.feed.refresh_near(position);
                if let Err(error) = self.controller.set_user_marker(Some(position)) {
                    let _ = self
                        .logger
                        .warn(&format!("User marker not shown: {}", error));
                }
                if self.explicit.is_none() {
                    self.controller.recenter(position, true)?;
                }
            }
            Some(Acquisition::Failed(error)) => {
                let _ = self.logger.warn(&format!(
                    "Showing the map without the user position: {}",
                    MapError::from(error)
                ));
            }
            None => {}
        }

        let center = self.resolver.center(self.explicit);
        self.controller.update(center, self.feed.stations())
    }

    /// Tears the map down and forgets the user position. A position still
    /// being acquired is dropped when it arrives.
    pub fn unmount(&mut self) {
        self.resolver.cancel();
        self.controller.unmount();
        self.controller.forget_user_position();
    }

    pub fn controller(&self) -> &MapViewController<R> {
        &self.controller
    }

    pub fn resolver(&self) -> &LocationResolver<G> {
        &self.resolver
    }

    pub fn feed(&self) -> &StationFeed<P> {
        &self.feed
    }

    pub fn explicit(&self) -> Option<Coordinate> {
        self.explicit
    }

    /// Center the map should be at right now.
    pub fn center(&self) -> Coordinate {
        self.resolver.center(self.explicit)
    }
}

impl<G: Geolocation, P: StationProvider> StationView<WalkersRenderer, G, P> {
    pub fn show(&mut self, ui: &mut egui::Ui) {
        if let Some(surface) = self.controller.surface_handle() {
            self.controller.renderer_mut().show(ui, surface);
        }
    }
}

impl<R: MapRenderer, G: Geolocation, P: StationProvider> Drop for StationView<R, G, P> {
    fn drop(&mut self) {
        self.unmount();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        errors::GeolocationError,
        geolocation::{GeolocationOptions, PositionCallback, PositionResult},
        provider::StationDirectory,
        renderer::HeadlessRenderer,
        resolver::FALLBACK_CENTER,
        surface::MapStyle,
        types::Station,
    };
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct ManualGeolocation {
        pending: Arc<Mutex<Vec<PositionCallback>>>,
    }

    impl ManualGeolocation {
        fn requests(&self) -> usize {
            self.pending.lock().unwrap().len()
        }

        fn answer(&self, result: PositionResult) {
            let callback = self.pending.lock().unwrap().remove(0);
            callback(result);
        }
    }

    impl Geolocation for ManualGeolocation {
        fn get_current_position(&self, _options: &GeolocationOptions, callback: PositionCallback) {
            self.pending.lock().unwrap().push(callback);
        }
    }

    fn station(id: &str, lat: f64, lon: f64) -> Station {
        Station::new(
            id.to_string(),
            format!("Station {}", id),
            format!("{} Nguyen Hue", id),
            Coordinate::new(lat, lon).unwrap(),
        )
    }

    fn coord(lat: f64, lon: f64) -> Coordinate {
        Coordinate::new(lat, lon).unwrap()
    }

    type TestView = StationView<HeadlessRenderer, ManualGeolocation, StationDirectory>;

    fn view(stations: Vec<Station>) -> (TestView, HeadlessRenderer, ManualGeolocation) {
        let renderer = HeadlessRenderer::new();
        let geolocation = ManualGeolocation::default();
        let controller = MapViewController::new(
            renderer.clone(),
            "station-map",
            MapStyle::default(),
            Logger::silent(),
        );
        let resolver = LocationResolver::new(
            geolocation.clone(),
            GeolocationOptions::default(),
            Logger::silent(),
        );
        let feed = StationFeed::new(StationDirectory::from_stations(stations), Logger::silent());
        let view = StationView::new(controller, resolver, feed, Logger::silent());
        (view, renderer, geolocation)
    }

    fn two_stations() -> Vec<Station> {
        vec![station("a", 10.772, 106.698), station("b", 10.7766, 106.7031)]
    }

    #[test]
    fn selected_station_centers_the_map_without_geolocation() {
        let (mut view, renderer, geolocation) = view(two_stations());
        view.select_station("b").unwrap();
        view.mount().unwrap();
        view.tick().unwrap();

        assert_eq!(view.controller().center(), Some(coord(10.7766, 106.7031)));
        assert_eq!(geolocation.requests(), 0);
        assert_eq!(renderer.marker_count(), 2);
        assert!(!view.controller().has_user_marker());
    }

    #[test]
    fn unknown_station_is_reported() {
        let (mut view, _, _) = view(two_stations());
        assert_eq!(
            view.select_station("zz"),
            Err(MapError::StationNotFound("zz".to_string()))
        );
        assert_eq!(view.explicit(), None);
    }

    #[test]
    fn user_fix_flies_to_the_user_and_sorts_stations() {
        let (mut view, renderer, geolocation) = view(two_stations());
        view.mount().unwrap();
        assert_eq!(view.controller().center(), Some(FALLBACK_CENTER));

        let user = coord(10.79, 106.69);
        geolocation.answer(Ok(user));
        view.tick().unwrap();

        assert_eq!(view.center(), user);
        assert_eq!(view.controller().center(), Some(user));
        assert!(view.controller().has_user_marker());
        // Flown to, not rebuilt.
        assert_eq!(renderer.surface_count(), 1);
        assert_eq!(renderer.destroyed(), 0);
        let surface = renderer.only_surface().unwrap();
        assert_eq!(surface.flights, vec![(user, 14.0)]);
        assert_eq!(view.feed().stations()[0].id, "b");
    }

    #[test]
    fn denied_geolocation_keeps_the_fallback() {
        let (mut view, renderer, geolocation) = view(two_stations());
        view.mount().unwrap();

        geolocation.answer(Err(GeolocationError::PermissionDenied));
        view.tick().unwrap();

        assert_eq!(view.controller().center(), Some(FALLBACK_CENTER));
        assert!(!view.controller().has_user_marker());
        assert_eq!(renderer.marker_count(), 2);
    }

    #[test]
    fn changing_the_selected_station_rebuilds_around_it() {
        let (mut view, renderer, _) = view(two_stations());
        view.select_station("a").unwrap();
        view.mount().unwrap();

        view.select_station("b").unwrap();
        view.tick().unwrap();

        assert_eq!(view.controller().center(), Some(coord(10.7766, 106.7031)));
        assert_eq!(renderer.destroyed(), 1);
        assert_eq!(renderer.surface_count(), 1);
        assert_eq!(renderer.marker_count(), 2);
    }

    #[test]
    fn fix_after_unmount_is_ignored() {
        let (mut view, renderer, geolocation) = view(two_stations());
        view.mount().unwrap();
        view.unmount();

        geolocation.answer(Ok(coord(10.79, 106.69)));
        view.tick().unwrap();

        assert_eq!(view.resolver().state().coordinate, None);
        assert_eq!(renderer.surface_count(), 0);
        assert_eq!(renderer.marker_count(), 0);
    }

    #[test]
    fn failed_mount_does_not_request_a_position() {
        let (mut view, renderer, geolocation) = view(two_stations());
        renderer.fail_next_create();

        assert!(matches!(
            view.mount(),
            Err(MapError::MapSurfaceInitFailure(_))
        ));
        assert_eq!(geolocation.requests(), 0);
        assert!(!view.controller().is_mounted());
    }

    #[test]
    fn remount_does_not_bring_back_the_old_user_marker() {
        let (mut view, renderer, geolocation) = view(two_stations());
        view.mount().unwrap();
        geolocation.answer(Ok(coord(10.79, 106.69)));
        view.tick().unwrap();
        assert!(view.controller().has_user_marker());
        view.unmount();

        // Remounted on a station: no request, no user marker.
        view.select_station("a").unwrap();
        view.mount().unwrap();
        view.tick().unwrap();
        assert_eq!(geolocation.requests(), 0);
        assert_eq!(view.resolver().state().coordinate, None);
        assert!(!view.controller().has_user_marker());
        assert_eq!(renderer.marker_count(), 2);
        view.unmount();

        // Remounted without a station and the user denies the request.
        view.set_explicit(None);
        view.mount().unwrap();
        geolocation.answer(Err(GeolocationError::PermissionDenied));
        view.tick().unwrap();
        assert_eq!(view.controller().center(), Some(FALLBACK_CENTER));
        assert!(!view.controller().has_user_marker());
    }

    #[test]
    fn rejected_user_marker_still_flies_to_the_user() {
        let (mut view, renderer, geolocation) = view(two_stations());
        renderer.reject_markers_after(2);
        view.mount().unwrap();

        let user = coord(10.79, 106.69);
        geolocation.answer(Ok(user));

        assert_eq!(view.tick(), Ok(()));
        assert!(view.controller().is_mounted());
        assert!(!view.controller().has_user_marker());
        assert_eq!(view.controller().center(), Some(user));
        assert_eq!(renderer.only_surface().unwrap().flights, vec![(user, 14.0)]);
    }

    #[test]
    fn dropping_the_view_releases_the_surface() {
        let (mut view, renderer, _) = view(two_stations());
        view.mount().unwrap();
        drop(view);

        assert_eq!(renderer.surface_count(), 0);
        assert_eq!(renderer.marker_count(), 0);
    }
}
