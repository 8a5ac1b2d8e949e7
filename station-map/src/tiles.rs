use egui::Context;
use walkers::{
    sources::{Attribution, OpenStreetMap, TileSource},
    HttpOptions, HttpTiles, TileId, Tiles,
};

use crate::{errors::MapError, surface::MapStyle};

const MAPBOX_STYLE_PREFIX: &str = "mapbox://styles/";

/// Raster tiles rendered by Mapbox from a style such as `mapbox/streets-v12`.
#[derive(Debug, Clone, PartialEq)]
pub struct MapboxTiles {
    style_path: String,
    access_token: String,
}

impl TileSource for MapboxTiles {
    fn tile_url(&self, tile_id: TileId) -> String {
        format!(
            "https://api.mapbox.com/styles/v1/{}/tiles/256/{}/{}/{}?access_token={}",
            self.style_path, tile_id.zoom, tile_id.x, tile_id.y, self.access_token
        )
    }

    fn attribution(&self) -> Attribution {
        Attribution {
            text: "© Mapbox © OpenStreetMap",
            url: "https://www.mapbox.com/about/maps/",
            logo_light: None,
            logo_dark: None,
        }
    }
}

/// Where the tiles of a surface come from.
#[derive(Debug, Clone, PartialEq)]
pub enum TileProvider {
    Mapbox(MapboxTiles),
    OpenStreetMap,
}

impl TileProvider {
    pub const OSM_STYLE_REF: &'static str = "osm";

    /// Picks the provider for `style`. Mapbox styles without an access token
    /// fall back to OpenStreetMap.
    ///
    /// # Errors
    /// `MapError::MapSurfaceInitFailure` for a style reference that is neither
    /// `osm` nor `mapbox://styles/<owner>/<style>`.
    pub fn for_style(style: &MapStyle) -> Result<Self, MapError> {
        let style_ref = style.style_ref.trim();
        if style_ref == Self::OSM_STYLE_REF {
            return Ok(TileProvider::OpenStreetMap);
        }

        let style_path = style_ref
            .strip_prefix(MAPBOX_STYLE_PREFIX)
            .filter(|path| {
                let parts: Vec<&str> = path.split('/').collect();
                parts.len() == 2 && parts.iter().all(|part| !part.is_empty())
            })
            .ok_or_else(|| {
                MapError::MapSurfaceInitFailure(format!("unsupported map style '{}'", style_ref))
            })?;

        match style.access_token.as_deref().map(str::trim) {
            Some(token) if !token.is_empty() => Ok(TileProvider::Mapbox(MapboxTiles {
                style_path: style_path.to_string(),
                access_token: token.to_string(),
            })),
            _ => Ok(TileProvider::OpenStreetMap),
        }
    }

    pub fn http_tiles(self, egui_ctx: Context) -> Box<dyn Tiles> {
        match self {
            TileProvider::Mapbox(source) => Box::new(HttpTiles::with_options(
                source,
                HttpOptions::default(),
                egui_ctx,
            )),
            TileProvider::OpenStreetMap => Box::new(HttpTiles::with_options(
                OpenStreetMap,
                HttpOptions::default(),
                egui_ctx,
            )),
        }
    }
}
