use logger::Logger;
use station_map::controller::{Lifecycle, MapViewController};
use station_map::errors::{GeolocationError, MapError};
use station_map::geolocation::{
    DeviceGeolocation, DevicePosition, Geolocation, GeolocationOptions, PositionCallback,
    PositionResult,
};
use station_map::provider::{StationDirectory, StationFeed};
use station_map::renderer::HeadlessRenderer;
use station_map::resolver::{LocationResolver, FALLBACK_CENTER};
use station_map::surface::{MapStyle, MarkerColor, MarkerIcon, USER_MARKER_LABEL};
use station_map::types::{Coordinate, Station};
use station_map::view::StationView;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

// Geolocation capability answered by hand from the test body
#[derive(Clone, Default)]
struct ManualGeolocation {
    pending: Arc<Mutex<Vec<PositionCallback>>>,
    requests: Arc<Mutex<usize>>,
}

impl ManualGeolocation {
    fn requests(&self) -> usize {
        *self.requests.lock().unwrap()
    }

    fn answer(&self, result: PositionResult) {
        let callback = self.pending.lock().unwrap().remove(0);
        callback(result);
    }
}

impl Geolocation for ManualGeolocation {
    fn get_current_position(&self, _options: &GeolocationOptions, callback: PositionCallback) {
        *self.requests.lock().unwrap() += 1;
        self.pending.lock().unwrap().push(callback);
    }
}

fn coord(lat: f64, lon: f64) -> Coordinate {
    Coordinate::new(lat, lon).unwrap()
}

fn station(id: &str, lat: f64, lon: f64) -> Station {
    Station::new(
        id.to_string(),
        format!("Station {}", id),
        format!("{} Le Loi, District 1", id),
        coord(lat, lon),
    )
}

fn station_a() -> Station {
    station("A", 10.772, 106.698)
}

fn station_b() -> Station {
    station("B", 10.7766, 106.7031)
}

fn station_c() -> Station {
    station("C", 10.7884, 106.6907)
}

// Build a view over a headless renderer, returning clones to observe it
fn build_view<G: Geolocation>(
    geolocation: G,
    stations: Vec<Station>,
) -> (StationView<HeadlessRenderer, G, StationDirectory>, HeadlessRenderer) {
    let renderer = HeadlessRenderer::new();
    let controller = MapViewController::new(
        renderer.clone(),
        "station-map",
        MapStyle::default(),
        Logger::silent(),
    );
    let resolver = LocationResolver::new(geolocation, GeolocationOptions::default(), Logger::silent());
    let feed = StationFeed::new(StationDirectory::from_stations(stations), Logger::silent());
    (
        StationView::new(controller, resolver, feed, Logger::silent()),
        renderer,
    )
}

fn controller(renderer: &HeadlessRenderer) -> MapViewController<HeadlessRenderer> {
    MapViewController::new(
        renderer.clone(),
        "station-map",
        MapStyle::default(),
        Logger::silent(),
    )
}

#[test]
fn test_explicit_station_centers_without_geolocation() {
    let geolocation = ManualGeolocation::default();
    let (mut view, renderer) = build_view(geolocation.clone(), vec![station_a(), station_b()]);

    view.set_explicit(Some(coord(10.8, 106.7)));
    view.mount().unwrap();
    view.tick().unwrap();

    let surface = renderer.only_surface().unwrap();
    assert_eq!(surface.center, coord(10.8, 106.7));
    assert_eq!(surface.zoom, 14.0);
    assert_eq!(surface.station_markers().count(), 2);
    assert_eq!(surface.user_markers().count(), 0);
    assert_eq!(geolocation.requests(), 0);
}

#[test]
fn test_geolocation_fix_flies_to_user() {
    let geolocation = ManualGeolocation::default();
    let (mut view, renderer) = build_view(geolocation.clone(), vec![station_a(), station_b()]);

    view.mount().unwrap();
    assert_eq!(geolocation.requests(), 1);

    let user = coord(10.79, 106.69);
    geolocation.answer(Ok(user));
    view.tick().unwrap();

    let surface = renderer.only_surface().unwrap();
    assert_eq!(surface.center, user);
    assert_eq!(surface.flights, vec![(user, 14.0)]);
    assert_eq!(renderer.destroyed(), 0);

    let user_markers: Vec<_> = surface.user_markers().collect();
    assert_eq!(user_markers.len(), 1);
    assert_eq!(user_markers[0].icon, MarkerIcon::Pin(MarkerColor::Blue));
    assert_eq!(user_markers[0].popup.title, USER_MARKER_LABEL);
    assert_eq!(user_markers[0].coordinate, user);

    // A later tick neither rebuilds nor asks again.
    view.tick().unwrap();
    assert_eq!(renderer.destroyed(), 0);
    assert_eq!(geolocation.requests(), 1);
}

#[test]
fn test_denied_geolocation_keeps_fallback_center() {
    let geolocation = ManualGeolocation::default();
    let (mut view, renderer) = build_view(geolocation.clone(), vec![station_a(), station_b()]);

    view.mount().unwrap();
    geolocation.answer(Err(GeolocationError::PermissionDenied));
    view.tick().unwrap();
    view.tick().unwrap();

    let surface = renderer.only_surface().unwrap();
    assert_eq!(surface.center, FALLBACK_CENTER);
    assert_eq!(surface.user_markers().count(), 0);
    assert_eq!(surface.station_markers().count(), 2);
    assert_eq!(geolocation.requests(), 1);
}

#[test]
fn test_station_list_change_swaps_only_changed_markers() {
    let renderer = HeadlessRenderer::new();
    let mut controller = controller(&renderer);
    controller
        .mount(FALLBACK_CENTER, &[station_a(), station_b()])
        .unwrap();
    let marker_a = renderer.marker_for("Station A").unwrap();

    let diff = controller.sync_stations(&[station_a(), station_c()]).unwrap();

    assert_eq!((diff.added, diff.removed), (1, 1));
    assert_eq!(renderer.marker_for("Station A"), Some(marker_a));
    assert!(renderer.marker_for("Station B").is_none());
    assert!(renderer.marker_for("Station C").is_some());
    assert_eq!(renderer.marker_count(), 2);
}

#[test]
fn test_mount_unmount_mount_does_not_accumulate_markers() {
    let renderer = HeadlessRenderer::new();
    let mut controller = controller(&renderer);
    let stations = [station_a(), station_b(), station_c()];

    controller.mount(FALLBACK_CENTER, &stations).unwrap();
    assert_eq!(renderer.marker_count(), 3);

    controller.unmount();
    controller.unmount();
    assert_eq!(controller.lifecycle(), Lifecycle::Unmounted);
    assert_eq!(renderer.surface_count(), 0);

    controller.mount(FALLBACK_CENTER, &stations).unwrap();
    assert_eq!(renderer.surface_count(), 1);
    assert_eq!(renderer.marker_count(), 3);
}

#[test]
fn test_duplicate_ids_yield_one_marker_each() {
    let renderer = HeadlessRenderer::new();
    let mut controller = controller(&renderer);

    controller
        .mount(FALLBACK_CENTER, &[station_a(), station_b(), station_a()])
        .unwrap();

    assert_eq!(controller.station_marker_count(), 2);
    assert_eq!(renderer.marker_count(), 2);
}

#[test]
fn test_second_mount_is_rejected() {
    let renderer = HeadlessRenderer::new();
    let mut controller = controller(&renderer);
    controller.mount(FALLBACK_CENTER, &[station_a()]).unwrap();

    assert_eq!(
        controller.mount(FALLBACK_CENTER, &[station_a()]),
        Err(MapError::AlreadyMounted)
    );
    assert_eq!(renderer.surface_count(), 1);
}

#[test]
fn test_rejected_marker_leaves_nothing_behind() {
    let renderer = HeadlessRenderer::new();
    let mut controller = controller(&renderer);
    renderer.reject_markers_after(1);

    let result = controller.mount(FALLBACK_CENTER, &[station_a(), station_b()]);

    assert!(matches!(result, Err(MapError::MapSurfaceInitFailure(_))));
    assert_eq!(controller.lifecycle(), Lifecycle::Unmounted);
    assert_eq!(renderer.surface_count(), 0);
    assert_eq!(renderer.marker_count(), 0);
}

#[test]
fn test_fix_arriving_after_unmount_has_no_effect() {
    let geolocation = ManualGeolocation::default();
    let (mut view, renderer) = build_view(geolocation.clone(), vec![station_a()]);

    view.mount().unwrap();
    view.unmount();
    geolocation.answer(Ok(coord(10.79, 106.69)));

    // Remounting starts a new lifetime; the old answer must not leak into it.
    view.mount().unwrap();
    view.tick().unwrap();

    let surface = renderer.only_surface().unwrap();
    assert_eq!(surface.center, FALLBACK_CENTER);
    assert_eq!(surface.user_markers().count(), 0);
    assert!(view.resolver().is_in_flight());
    assert_eq!(geolocation.requests(), 2);
}

#[test]
fn test_device_geolocation_drives_the_view() {
    let user = coord(10.79, 106.69);
    let geolocation = DeviceGeolocation::new(DevicePosition::Fixed(user), Duration::from_millis(10));
    let (mut view, renderer) = build_view(geolocation, vec![station_a(), station_b()]);

    view.mount().unwrap();

    let deadline = Instant::now() + Duration::from_secs(5);
    while !view.controller().has_user_marker() && Instant::now() < deadline {
        view.tick().unwrap();
        thread::sleep(Duration::from_millis(5));
    }

    let surface = renderer.only_surface().unwrap();
    assert_eq!(surface.center, user);
    assert_eq!(surface.user_markers().count(), 1);
}

#[test]
fn test_dropping_the_view_tears_down_the_map() {
    let geolocation = ManualGeolocation::default();
    let (mut view, renderer) = build_view(geolocation.clone(), vec![station_a(), station_b()]);
    view.mount().unwrap();

    drop(view);
    geolocation.answer(Ok(coord(10.79, 106.69)));

    assert_eq!(renderer.surface_count(), 0);
    assert_eq!(renderer.marker_count(), 0);
    assert_eq!(renderer.destroyed(), 1);
}
