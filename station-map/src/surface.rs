use crate::{
    errors::MapError,
    types::{Coordinate, Station},
};

/// Opaque id of a map surface created by a [`MapRenderer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SurfaceHandle(pub u64);

/// Opaque id of a marker attached to a surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MarkerHandle(pub u64);

/// Tile style plus the credential needed to fetch it.
///
/// Handed to the map view at construction instead of living in global state.
#[derive(Debug, Clone, PartialEq)]
pub struct MapStyle {
    pub style_ref: String,
    pub access_token: Option<String>,
}

impl MapStyle {
    pub const DEFAULT_STYLE_REF: &'static str = "mapbox://styles/mapbox/streets-v12";

    pub fn new(style_ref: &str, access_token: Option<String>) -> Self {
        Self {
            style_ref: style_ref.to_string(),
            access_token,
        }
    }
}

impl Default for MapStyle {
    fn default() -> Self {
        Self::new(Self::DEFAULT_STYLE_REF, None)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerColor {
    Blue,
    Red,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerIcon {
    /// The bike-station pin image.
    Station,
    /// A plain colored pin.
    Pin(MarkerColor),
}

/// Text shown when a marker is clicked.
#[derive(Debug, Clone, PartialEq)]
pub struct Popup {
    pub title: String,
    pub body: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MarkerSpec {
    pub coordinate: Coordinate,
    pub icon: MarkerIcon,
    pub popup: Popup,
}

pub const USER_MARKER_LABEL: &str = "Your location";

impl MarkerSpec {
    pub fn station(station: &Station) -> Self {
        Self {
            coordinate: station.location,
            icon: MarkerIcon::Station,
            popup: Popup {
                title: station.name.clone(),
                body: Some(station.address.clone()),
            },
        }
    }

    pub fn user(coordinate: Coordinate) -> Self {
        Self {
            coordinate,
            icon: MarkerIcon::Pin(MarkerColor::Blue),
            popup: Popup {
                title: USER_MARKER_LABEL.to_string(),
                body: None,
            },
        }
    }
}

/// The map rendering capability the view is built on.
///
/// Implementations own the actual drawing resources; callers only ever see
/// handles. A handle is invalid once `destroy_map` (for surfaces) or
/// `remove_marker` (for markers) was called with it.
pub trait MapRenderer {
    fn create_map(
        &mut self,
        container: &str,
        style: &MapStyle,
        center: Coordinate,
        zoom: f64,
    ) -> Result<SurfaceHandle, MapError>;

    fn add_marker(
        &mut self,
        surface: SurfaceHandle,
        marker: MarkerSpec,
    ) -> Result<MarkerHandle, MapError>;

    fn remove_marker(&mut self, surface: SurfaceHandle, marker: MarkerHandle);

    /// Smoothly moves the viewport of `surface` to `center` at `zoom`.
    fn fly_to(&mut self, surface: SurfaceHandle, center: Coordinate, zoom: f64);

    /// Tears the surface down, dropping anything still attached to it.
    fn destroy_map(&mut self, surface: SurfaceHandle);
}
