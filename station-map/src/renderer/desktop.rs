use std::{
    cell::RefCell,
    collections::{BTreeMap, HashMap},
    rc::Rc,
    time::{Duration, Instant},
};

use egui::Context;
use logger::{Color, Logger};
use walkers::{Map, MapMemory, Position, Tiles};

use crate::{
    errors::MapError,
    plugins,
    state::SelectionState,
    surface::{MapRenderer, MapStyle, MarkerHandle, MarkerSpec, SurfaceHandle},
    tiles::TileProvider,
    types::Coordinate,
    widgets::WidgetPopup,
    windows,
};

use super::validate_surface_request;

const FLIGHT_DURATION: Duration = Duration::from_millis(1200);

/// An animated move of the viewport.
struct Flight {
    from: Position,
    to: Position,
    started: Instant,
}

impl Flight {
    /// Eased position at `now`, or `None` once the flight has landed.
    fn position_at(&self, now: Instant) -> Option<Position> {
        let t = now.duration_since(self.started).as_secs_f64() / FLIGHT_DURATION.as_secs_f64();
        if t >= 1.0 {
            return None;
        }
        let eased = t * t * (3.0 - 2.0 * t);
        Some(Position::from_lat_lon(
            self.from.lat() + (self.to.lat() - self.from.lat()) * eased,
            self.from.lon() + (self.to.lon() - self.from.lon()) * eased,
        ))
    }
}

struct LiveSurface {
    container: String,
    tiles: Box<dyn Tiles>,
    memory: MapMemory,
    center: Position,
    flight: Option<Flight>,
    markers: BTreeMap<MarkerHandle, MarkerSpec>,
    selection: Rc<RefCell<SelectionState>>,
    popup: Option<WidgetPopup>,
}

impl LiveSurface {
    fn current_center(&mut self) -> Position {
        if let Some(flight) = &self.flight {
            match flight.position_at(Instant::now()) {
                Some(position) => return position,
                None => {
                    self.center = flight.to;
                    self.flight = None;
                }
            }
        }
        self.center
    }
}

/// Draws map surfaces with `walkers` inside an egui frame.
pub struct WalkersRenderer {
    egui_ctx: Context,
    next_id: u64,
    surfaces: HashMap<SurfaceHandle, LiveSurface>,
    logger: Logger,
}

impl WalkersRenderer {
    pub fn new(egui_ctx: Context, logger: Logger) -> Self {
        Self {
            egui_ctx,
            next_id: 0,
            surfaces: HashMap::new(),
            logger,
        }
    }

    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    /// Paints `surface` into `ui`: tiles, markers, the open popup and the
    /// zoom controls.
    pub fn show(&mut self, ui: &mut egui::Ui, surface: SurfaceHandle) {
        let Some(live) = self.surfaces.get_mut(&surface) else {
            return;
        };

        let center = live.current_center();
        if live.flight.is_some() {
            ui.ctx().request_repaint();
        }

        let markers_plugin = plugins::Markers::new(&live.markers, live.selection.clone());
        let map = Map::new(Some(live.tiles.as_mut()), &mut live.memory, center)
            .with_plugin(markers_plugin);
        ui.add(map);

        windows::zoom(ui, &mut live.memory);

        let selected = live.selection.borrow().marker;
        match selected.and_then(|marker| live.markers.get(&marker)) {
            Some(spec) => {
                if live.popup.as_ref().map(|popup| &popup.popup) != Some(&spec.popup) {
                    live.popup = Some(WidgetPopup::new(spec.popup.clone()));
                }
                let open = live
                    .popup
                    .as_mut()
                    .is_some_and(|popup| popup.show(ui.ctx()));
                if !open {
                    live.selection.borrow_mut().marker = None;
                    live.popup = None;
                }
            }
            None => live.popup = None,
        }
    }
}

impl MapRenderer for WalkersRenderer {
    fn create_map(
        &mut self,
        container: &str,
        style: &MapStyle,
        center: Coordinate,
        zoom: f64,
    ) -> Result<SurfaceHandle, MapError> {
        validate_surface_request(container, zoom)?;
        if self
            .surfaces
            .values()
            .any(|surface| surface.container == container)
        {
            return Err(MapError::MapSurfaceInitFailure(format!(
                "container '{}' already holds a map",
                container
            )));
        }

        let provider = TileProvider::for_style(style)?;
        if provider == TileProvider::OpenStreetMap && style.style_ref != TileProvider::OSM_STYLE_REF
        {
            let _ = self.logger.warn(&format!(
                "No access token for '{}', using OpenStreetMap tiles",
                style.style_ref
            ));
        }

        let mut memory = MapMemory::default();
        memory.set_zoom(zoom).map_err(|_| {
            MapError::MapSurfaceInitFailure(format!("zoom {} rejected by the map", zoom))
        })?;

        let handle = SurfaceHandle(self.next_id());
        self.surfaces.insert(
            handle,
            LiveSurface {
                container: container.to_string(),
                tiles: provider.http_tiles(self.egui_ctx.clone()),
                memory,
                center: center.into(),
                flight: None,
                markers: BTreeMap::new(),
                selection: Rc::new(RefCell::new(SelectionState::new())),
                popup: None,
            },
        );
        let _ = self.logger.debug(&format!(
            "Created surface {:?} in '{}'",
            handle, container
        ));
        Ok(handle)
    }

    fn add_marker(
        &mut self,
        surface: SurfaceHandle,
        marker: MarkerSpec,
    ) -> Result<MarkerHandle, MapError> {
        let handle = MarkerHandle(self.next_id());
        let live = self
            .surfaces
            .get_mut(&surface)
            .ok_or_else(|| MapError::MarkerRejected(format!("no surface {:?}", surface)))?;
        live.markers.insert(handle, marker);
        self.egui_ctx.request_repaint();
        Ok(handle)
    }

    fn remove_marker(&mut self, surface: SurfaceHandle, marker: MarkerHandle) {
        if let Some(live) = self.surfaces.get_mut(&surface) {
            live.markers.remove(&marker);
            let mut selection = live.selection.borrow_mut();
            if selection.marker == Some(marker) {
                selection.marker = None;
            }
        }
        self.egui_ctx.request_repaint();
    }

    fn fly_to(&mut self, surface: SurfaceHandle, center: Coordinate, zoom: f64) {
        let Some(live) = self.surfaces.get_mut(&surface) else {
            return;
        };

        let from = live.memory.detached().unwrap_or_else(|| live.current_center());
        live.memory.follow_my_position();
        if live.memory.set_zoom(zoom).is_err() {
            let _ = self.logger.warn(&format!("Ignored invalid zoom {}", zoom));
        }
        live.flight = Some(Flight {
            from,
            to: center.into(),
            started: Instant::now(),
        });
        let _ = self.logger.info(
            &format!(
                "Flying surface {:?} to ({}, {})",
                surface,
                center.latitude(),
                center.longitude()
            ),
            Color::Blue,
        );
        self.egui_ctx.request_repaint();
    }

    fn destroy_map(&mut self, surface: SurfaceHandle) {
        if let Some(live) = self.surfaces.remove(&surface) {
            let _ = self.logger.debug(&format!(
                "Destroyed surface {:?} in '{}' ({} markers)",
                surface,
                live.container,
                live.markers.len()
            ));
        }
    }
}
