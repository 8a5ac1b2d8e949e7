use std::{cell::RefCell, collections::BTreeMap, rc::Rc};

use egui::{include_image, Color32, Image, Rect, Response, Stroke, Vec2};
use walkers::{Plugin, Position, Projector};

use crate::{
    state::SelectionState,
    surface::{MarkerColor, MarkerHandle, MarkerIcon, MarkerSpec},
};

const STATION_ICON_SIZE: f32 = 35.0;
const PIN_RADIUS: f32 = 9.0;

/// Draws every marker of a surface and turns clicks into selections.
pub struct Markers<'a> {
    markers: &'a BTreeMap<MarkerHandle, MarkerSpec>,
    selection_state: Rc<RefCell<SelectionState>>,
}

impl<'a> Markers<'a> {
    pub fn new(
        markers: &'a BTreeMap<MarkerHandle, MarkerSpec>,
        selection_state: Rc<RefCell<SelectionState>>,
    ) -> Self {
        Self {
            markers,
            selection_state,
        }
    }
}

impl Plugin for Markers<'_> {
    fn run(self: Box<Self>, ui: &mut egui::Ui, _response: &Response, projector: &Projector) {
        // Pins go last so the user marker is never hidden under a station.
        let (stations, pins): (Vec<_>, Vec<_>) = self
            .markers
            .iter()
            .partition(|(_, marker)| marker.icon == MarkerIcon::Station);

        let mut selection = self.selection_state.borrow_mut();
        for (handle, marker) in stations.into_iter().chain(pins) {
            draw(ui, projector, *handle, marker, &mut selection);
        }
    }
}

fn draw(
    ui: &mut egui::Ui,
    projector: &Projector,
    handle: MarkerHandle,
    marker: &MarkerSpec,
    selection_state: &mut SelectionState,
) {
    let screen_position = projector
        .project(Position::from(marker.coordinate))
        .to_pos2();

    let response = match marker.icon {
        MarkerIcon::Station => {
            let symbol_size = Vec2::splat(STATION_ICON_SIZE);
            // The tip of the pin sits on the station.
            let rect = Rect::from_min_size(
                screen_position - Vec2::new(symbol_size.x / 2.0, symbol_size.y),
                symbol_size,
            );
            let response = ui.allocate_rect(rect, egui::Sense::click());

            let image = if response.hovered() || selection_state.marker == Some(handle) {
                Image::new(include_image!("../../assets/station-pin-selected.svg"))
            } else {
                Image::new(include_image!("../../assets/station-pin.svg"))
            }
            .fit_to_exact_size(symbol_size);
            ui.put(rect, image);
            response
        }
        MarkerIcon::Pin(color) => {
            let rect = Rect::from_center_size(screen_position, Vec2::splat(PIN_RADIUS * 2.0));
            let response = ui.allocate_rect(rect, egui::Sense::click());
            let radius = if response.hovered() {
                PIN_RADIUS + 2.0
            } else {
                PIN_RADIUS
            };
            ui.painter().circle(
                screen_position,
                radius,
                pin_color(color),
                Stroke::new(3.0, Color32::WHITE),
            );
            response
        }
    };

    if response.clicked() {
        selection_state.toggle_marker(handle);
    }
}

fn pin_color(color: MarkerColor) -> Color32 {
    match color {
        MarkerColor::Blue => Color32::from_rgb(0x1d, 0x6f, 0xf2),
        MarkerColor::Red => Color32::from_rgb(0xe0, 0x3a, 0x3a),
    }
}
