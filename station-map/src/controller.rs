use std::collections::{HashMap, HashSet};

use logger::{Color, Logger};

use crate::{
    errors::MapError,
    surface::{MapRenderer, MapStyle, MarkerHandle, MarkerSpec, SurfaceHandle},
    types::{Coordinate, Station},
};

/// Zoom level every surface is created with.
pub const DEFAULT_ZOOM: f64 = 14.0;

/// Lifecycle of the view's map surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    Unmounted,
    Mounting,
    Mounted,
    Unmounting,
}

/// Markers touched by a station list sync.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MarkerDiff {
    pub added: usize,
    pub removed: usize,
}

impl MarkerDiff {
    pub fn is_empty(&self) -> bool {
        self.added == 0 && self.removed == 0
    }
}

/// The live surface and the markers the controller attached to it.
struct MapSurface {
    handle: SurfaceHandle,
    center: Coordinate,
    station_markers: HashMap<String, (Station, MarkerHandle)>,
    user_marker: Option<MarkerHandle>,
}

impl MapSurface {
    fn new(handle: SurfaceHandle, center: Coordinate) -> Self {
        Self {
            handle,
            center,
            station_markers: HashMap::new(),
            user_marker: None,
        }
    }
}

/// Owns the single map surface of a view and keeps its markers in line with
/// the station list and the user position.
///
/// A changed center always rebuilds the surface from scratch; a changed
/// station list alone is applied as a diff. The surface is torn down when the
/// controller is dropped.
pub struct MapViewController<R: MapRenderer> {
    renderer: R,
    container: String,
    style: MapStyle,
    zoom: f64,
    lifecycle: Lifecycle,
    surface: Option<MapSurface>,
    stations: Vec<Station>,
    user_position: Option<Coordinate>,
    logger: Logger,
}

impl<R: MapRenderer> MapViewController<R> {
    pub fn new(renderer: R, container: &str, style: MapStyle, logger: Logger) -> Self {
        Self {
            renderer,
            container: container.to_string(),
            style,
            zoom: DEFAULT_ZOOM,
            lifecycle: Lifecycle::Unmounted,
            surface: None,
            stations: Vec::new(),
            user_position: None,
            logger,
        }
    }

    /// Creates the surface at `center` with one marker per station id, plus
    /// the user marker if a user position was set.
    ///
    /// # Errors
    /// - `MapError::AlreadyMounted` unless the view is unmounted.
    /// - `MapError::MapSurfaceInitFailure` if the surface or any of its
    ///   markers could not be created. Nothing is left attached in that case.
    pub fn mount(&mut self, center: Coordinate, stations: &[Station]) -> Result<(), MapError> {
        if self.lifecycle != Lifecycle::Unmounted {
            return Err(MapError::AlreadyMounted);
        }

        self.lifecycle = Lifecycle::Mounting;
        match self.build_surface(center, stations) {
            Ok(surface) => {
                let _ = self.logger.info(
                    &format!(
                        "Mounted map at ({}, {}) with {} station markers",
                        center.latitude(),
                        center.longitude(),
                        surface.station_markers.len()
                    ),
                    Color::Green,
                );
                self.stations = stations.to_vec();
                self.surface = Some(surface);
                self.lifecycle = Lifecycle::Mounted;
                Ok(())
            }
            Err(error) => {
                self.lifecycle = Lifecycle::Unmounted;
                let _ = self.logger.error(&format!("Mount failed: {}", error));
                Err(error)
            }
        }
    }

    fn build_surface(
        &mut self,
        center: Coordinate,
        stations: &[Station],
    ) -> Result<MapSurface, MapError> {
        let handle = self
            .renderer
            .create_map(&self.container, &self.style, center, self.zoom)
            .map_err(as_init_failure)?;
        let mut surface = MapSurface::new(handle, center);

        for station in stations {
            if surface.station_markers.contains_key(&station.id) {
                continue;
            }
            match self.renderer.add_marker(handle, MarkerSpec::station(station)) {
                Ok(marker) => {
                    surface
                        .station_markers
                        .insert(station.id.clone(), (station.clone(), marker));
                }
                Err(error) => {
                    self.release(surface);
                    return Err(as_init_failure(error));
                }
            }
        }

        if let Some(position) = self.user_position {
            match self.renderer.add_marker(handle, MarkerSpec::user(position)) {
                Ok(marker) => surface.user_marker = Some(marker),
                Err(error) => {
                    self.release(surface);
                    return Err(as_init_failure(error));
                }
            }
        }

        Ok(surface)
    }

    fn release(&mut self, surface: MapSurface) {
        for (_, (_, marker)) in surface.station_markers {
            self.renderer.remove_marker(surface.handle, marker);
        }
        if let Some(marker) = surface.user_marker {
            self.renderer.remove_marker(surface.handle, marker);
        }
        self.renderer.destroy_map(surface.handle);
    }

    /// Releases every marker and destroys the surface. Calling it on an
    /// unmounted view does nothing.
    pub fn unmount(&mut self) {
        let Some(surface) = self.surface.take() else {
            self.lifecycle = Lifecycle::Unmounted;
            return;
        };

        self.lifecycle = Lifecycle::Unmounting;
        let markers = surface.station_markers.len() + usize::from(surface.user_marker.is_some());
        self.release(surface);
        self.lifecycle = Lifecycle::Unmounted;
        let _ = self.logger.info(
            &format!("Unmounted map, released {} markers", markers),
            Color::Magenta,
        );
    }

    /// Places, moves or removes the user marker. There is never more than one.
    ///
    /// The position is remembered, so a later mount or rebuild attaches it as
    /// well.
    pub fn set_user_marker(&mut self, position: Option<Coordinate>) -> Result<(), MapError> {
        self.user_position = position;
        let Some(surface) = self.surface.as_mut() else {
            return Ok(());
        };

        if let Some(marker) = surface.user_marker.take() {
            self.renderer.remove_marker(surface.handle, marker);
        }
        if let Some(position) = position {
            let marker = self
                .renderer
                .add_marker(surface.handle, MarkerSpec::user(position))?;
            surface.user_marker = Some(marker);
        }
        Ok(())
    }

    /// Drops the remembered user position. The next mount starts without a
    /// user marker.
    pub fn forget_user_position(&mut self) {
        self.user_position = None;
    }

    /// Moves the map to `center`. Animated moves keep the surface; otherwise
    /// the surface is rebuilt around the new center.
    pub fn recenter(&mut self, center: Coordinate, animate: bool) -> Result<(), MapError> {
        let Some(surface) = self.surface.as_mut() else {
            return Err(MapError::NotMounted);
        };

        if animate {
            self.renderer.fly_to(surface.handle, center, self.zoom);
            surface.center = center;
            let _ = self.logger.debug(&format!(
                "Flying to ({}, {})",
                center.latitude(),
                center.longitude()
            ));
            Ok(())
        } else {
            let stations = std::mem::take(&mut self.stations);
            self.rebuild(center, &stations)
        }
    }

    fn rebuild(&mut self, center: Coordinate, stations: &[Station]) -> Result<(), MapError> {
        self.unmount();
        self.mount(center, stations)
    }

    /// Brings the station markers in line with `stations` without touching
    /// markers whose station is unchanged.
    pub fn sync_stations(&mut self, stations: &[Station]) -> Result<MarkerDiff, MapError> {
        let Some(surface) = self.surface.as_mut() else {
            return Err(MapError::NotMounted);
        };

        let mut wanted: HashMap<&str, &Station> = HashMap::new();
        for station in stations {
            wanted.entry(station.id.as_str()).or_insert(station);
        }

        let mut diff = MarkerDiff::default();
        let stale: Vec<String> = surface
            .station_markers
            .iter()
            .filter(|(id, (current, _))| wanted.get(id.as_str()) != Some(&current))
            .map(|(id, _)| id.clone())
            .collect();
        for id in stale {
            if let Some((_, marker)) = surface.station_markers.remove(&id) {
                self.renderer.remove_marker(surface.handle, marker);
                diff.removed += 1;
            }
        }

        let mut seen = HashSet::new();
        for station in stations {
            if !seen.insert(station.id.as_str()) || surface.station_markers.contains_key(&station.id)
            {
                continue;
            }
            let marker = self
                .renderer
                .add_marker(surface.handle, MarkerSpec::station(station))?;
            surface
                .station_markers
                .insert(station.id.clone(), (station.clone(), marker));
            diff.added += 1;
        }

        self.stations = stations.to_vec();
        if !diff.is_empty() {
            let _ = self.logger.debug(&format!(
                "Station markers synced: +{} -{}",
                diff.added, diff.removed
            ));
        }
        Ok(diff)
    }

    /// Applies the current inputs: rebuilds when the center moved, otherwise
    /// syncs the station markers.
    pub fn update(&mut self, center: Coordinate, stations: &[Station]) -> Result<(), MapError> {
        let Some(surface) = self.surface.as_ref() else {
            return Err(MapError::NotMounted);
        };

        if surface.center != center {
            self.rebuild(center, stations)
        } else {
            self.sync_stations(stations).map(|_| ())
        }
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    pub fn is_mounted(&self) -> bool {
        self.lifecycle == Lifecycle::Mounted
    }

    pub fn center(&self) -> Option<Coordinate> {
        self.surface.as_ref().map(|surface| surface.center)
    }

    pub fn station_marker_count(&self) -> usize {
        self.surface
            .as_ref()
            .map_or(0, |surface| surface.station_markers.len())
    }

    pub fn has_user_marker(&self) -> bool {
        self.surface
            .as_ref()
            .is_some_and(|surface| surface.user_marker.is_some())
    }

    pub(crate) fn surface_handle(&self) -> Option<SurfaceHandle> {
        self.surface.as_ref().map(|surface| surface.handle)
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub(crate) fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }
}

impl<R: MapRenderer> Drop for MapViewController<R> {
    fn drop(&mut self) {
        self.unmount();
    }
}

fn as_init_failure(error: MapError) -> MapError {
    match error {
        MapError::MapSurfaceInitFailure(_) => error,
        other => MapError::MapSurfaceInitFailure(other.to_string()),
    }
}
