use std::{cell::RefCell, collections::BTreeMap, rc::Rc};

use crate::{
    errors::MapError,
    surface::{MapRenderer, MapStyle, MarkerHandle, MarkerIcon, MarkerSpec, SurfaceHandle},
    types::Coordinate,
};

use super::validate_surface_request;

/// What a headless surface currently holds.
#[derive(Debug, Clone, PartialEq)]
pub struct HeadlessSurface {
    pub container: String,
    pub style: MapStyle,
    pub center: Coordinate,
    pub zoom: f64,
    pub markers: BTreeMap<MarkerHandle, MarkerSpec>,
    /// Every `fly_to` received, oldest first.
    pub flights: Vec<(Coordinate, f64)>,
}

impl HeadlessSurface {
    pub fn station_markers(&self) -> impl Iterator<Item = &MarkerSpec> {
        self.markers
            .values()
            .filter(|marker| marker.icon == MarkerIcon::Station)
    }

    pub fn user_markers(&self) -> impl Iterator<Item = &MarkerSpec> {
        self.markers
            .values()
            .filter(|marker| marker.icon != MarkerIcon::Station)
    }
}

#[derive(Debug, Default)]
struct HeadlessState {
    next_id: u64,
    surfaces: BTreeMap<SurfaceHandle, HeadlessSurface>,
    destroyed: usize,
    fail_next_create: bool,
    marker_budget: Option<usize>,
}

impl HeadlessState {
    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }
}

/// A renderer that keeps surfaces in memory and draws nothing.
///
/// Clones share their state, so a clone kept aside can inspect what a map
/// view did to the renderer it owns.
#[derive(Debug, Clone, Default)]
pub struct HeadlessRenderer {
    state: Rc<RefCell<HeadlessState>>,
}

impl HeadlessRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// The next `create_map` call fails.
    pub fn fail_next_create(&self) {
        self.state.borrow_mut().fail_next_create = true;
    }

    /// Accepts `count` more markers, then rejects every further one.
    pub fn reject_markers_after(&self, count: usize) {
        self.state.borrow_mut().marker_budget = Some(count);
    }

    /// Number of live surfaces.
    pub fn surface_count(&self) -> usize {
        self.state.borrow().surfaces.len()
    }

    /// Number of markers attached across all live surfaces.
    pub fn marker_count(&self) -> usize {
        self.state
            .borrow()
            .surfaces
            .values()
            .map(|surface| surface.markers.len())
            .sum()
    }

    /// Number of surfaces destroyed so far.
    pub fn destroyed(&self) -> usize {
        self.state.borrow().destroyed
    }

    /// The live surface, when there is exactly one.
    pub fn only_surface(&self) -> Option<HeadlessSurface> {
        let state = self.state.borrow();
        if state.surfaces.len() != 1 {
            return None;
        }
        state.surfaces.values().next().cloned()
    }

    /// Handle of the marker whose popup title is `title`.
    pub fn marker_for(&self, title: &str) -> Option<MarkerHandle> {
        self.state.borrow().surfaces.values().find_map(|surface| {
            surface
                .markers
                .iter()
                .find(|(_, marker)| marker.popup.title == title)
                .map(|(handle, _)| *handle)
        })
    }
}

impl MapRenderer for HeadlessRenderer {
    fn create_map(
        &mut self,
        container: &str,
        style: &MapStyle,
        center: Coordinate,
        zoom: f64,
    ) -> Result<SurfaceHandle, MapError> {
        let mut state = self.state.borrow_mut();
        if state.fail_next_create {
            state.fail_next_create = false;
            return Err(MapError::MapSurfaceInitFailure(
                "surface creation refused".to_string(),
            ));
        }
        validate_surface_request(container, zoom)?;
        if state
            .surfaces
            .values()
            .any(|surface| surface.container == container)
        {
            return Err(MapError::MapSurfaceInitFailure(format!(
                "container '{}' already holds a map",
                container
            )));
        }

        let handle = SurfaceHandle(state.next_id());
        state.surfaces.insert(
            handle,
            HeadlessSurface {
                container: container.to_string(),
                style: style.clone(),
                center,
                zoom,
                markers: BTreeMap::new(),
                flights: Vec::new(),
            },
        );
        Ok(handle)
    }

    fn add_marker(
        &mut self,
        surface: SurfaceHandle,
        marker: MarkerSpec,
    ) -> Result<MarkerHandle, MapError> {
        let mut state = self.state.borrow_mut();
        if let Some(budget) = state.marker_budget.as_mut() {
            if *budget == 0 {
                return Err(MapError::MarkerRejected(format!(
                    "marker '{}' rejected",
                    marker.popup.title
                )));
            }
            *budget -= 1;
        }

        let handle = MarkerHandle(state.next_id());
        let live = state
            .surfaces
            .get_mut(&surface)
            .ok_or_else(|| MapError::MarkerRejected(format!("no surface {:?}", surface)))?;
        live.markers.insert(handle, marker);
        Ok(handle)
    }

    fn remove_marker(&mut self, surface: SurfaceHandle, marker: MarkerHandle) {
        if let Some(live) = self.state.borrow_mut().surfaces.get_mut(&surface) {
            live.markers.remove(&marker);
        }
    }

    fn fly_to(&mut self, surface: SurfaceHandle, center: Coordinate, zoom: f64) {
        if let Some(live) = self.state.borrow_mut().surfaces.get_mut(&surface) {
            live.center = center;
            live.zoom = zoom;
            live.flights.push((center, zoom));
        }
    }

    fn destroy_map(&mut self, surface: SurfaceHandle) {
        let mut state = self.state.borrow_mut();
        if state.surfaces.remove(&surface).is_some() {
            state.destroyed += 1;
        }
    }
}
