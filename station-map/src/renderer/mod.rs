mod desktop;
pub use desktop::WalkersRenderer;

mod headless;
pub use headless::{HeadlessRenderer, HeadlessSurface};

use crate::errors::MapError;

pub const MIN_ZOOM: f64 = 0.0;
pub const MAX_ZOOM: f64 = 22.0;

/// Checks shared by every renderer before a surface is created.
fn validate_surface_request(container: &str, zoom: f64) -> Result<(), MapError> {
    if container.trim().is_empty() {
        return Err(MapError::MapSurfaceInitFailure(
            "no container to draw the map in".to_string(),
        ));
    }
    if !(MIN_ZOOM..=MAX_ZOOM).contains(&zoom) {
        return Err(MapError::MapSurfaceInitFailure(format!(
            "zoom {} outside [{}, {}]",
            zoom, MIN_ZOOM, MAX_ZOOM
        )));
    }
    Ok(())
}
