use std::fmt::{self, Display};

/// Why a geolocation acquisition attempt ended without a position.
///
/// Every variant is terminal for the attempt that produced it: nothing in the
/// crate retries on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeolocationError {
    PermissionDenied,
    Timeout,
    PositionUnavailable,
}

impl Display for GeolocationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GeolocationError::PermissionDenied => write!(f, "permission denied"),
            GeolocationError::Timeout => write!(f, "timed out"),
            GeolocationError::PositionUnavailable => write!(f, "position unavailable"),
        }
    }
}

impl std::error::Error for GeolocationError {}

/// Errors produced by the map view, its location resolution and its
/// collaborators.
///
/// - `GeolocationDenied`, `GeolocationTimeout`, `GeolocationUnavailable`: the
///   user position could not be obtained. Absorbed by the view, which falls
///   back to the static center.
/// - `StationListUnavailable`: the station collaborator failed. The map keeps
///   rendering with the previous (possibly empty) list.
/// - `MapSurfaceInitFailure`: the map surface could not be built. Fatal for
///   the view instance.
/// - `MarkerRejected`: the renderer refused a single marker after mount.
/// - `AlreadyMounted` / `NotMounted`: an operation was issued in the wrong
///   lifecycle state.
#[derive(Debug, Clone, PartialEq)]
pub enum MapError {
    GeolocationDenied,
    GeolocationTimeout,
    GeolocationUnavailable,
    StationListUnavailable(String),
    StationNotFound(String),
    MapSurfaceInitFailure(String),
    MarkerRejected(String),
    InvalidCoordinate(String),
    InvalidConfig(String),
    AlreadyMounted,
    NotMounted,
}

impl Display for MapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MapError::GeolocationDenied => {
                write!(f, "[GeolocationDenied]: Location permission was denied")
            }
            MapError::GeolocationTimeout => {
                write!(f, "[GeolocationTimeout]: The location request timed out")
            }
            MapError::GeolocationUnavailable => {
                write!(f, "[GeolocationUnavailable]: The device position is unavailable")
            }
            MapError::StationListUnavailable(msg) => {
                write!(f, "[StationListUnavailable]: {}", msg)
            }
            MapError::StationNotFound(id) => write!(f, "[StationNotFound]: No station '{}'", id),
            MapError::MapSurfaceInitFailure(msg) => {
                write!(f, "[MapSurfaceInitFailure]: Map could not be displayed: {}", msg)
            }
            MapError::MarkerRejected(msg) => write!(f, "[MarkerRejected]: {}", msg),
            MapError::InvalidCoordinate(msg) => write!(f, "[InvalidCoordinate]: {}", msg),
            MapError::InvalidConfig(msg) => write!(f, "[InvalidConfig]: {}", msg),
            MapError::AlreadyMounted => write!(f, "[AlreadyMounted]: The map view is mounted"),
            MapError::NotMounted => write!(f, "[NotMounted]: The map view is not mounted"),
        }
    }
}

impl std::error::Error for MapError {}

impl From<GeolocationError> for MapError {
    fn from(error: GeolocationError) -> Self {
        match error {
            GeolocationError::PermissionDenied => MapError::GeolocationDenied,
            GeolocationError::Timeout => MapError::GeolocationTimeout,
            GeolocationError::PositionUnavailable => MapError::GeolocationUnavailable,
        }
    }
}

impl From<csv::Error> for MapError {
    fn from(error: csv::Error) -> Self {
        MapError::StationListUnavailable(error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn geolocation_errors_map_to_their_kinds() {
        assert_eq!(
            MapError::from(GeolocationError::PermissionDenied),
            MapError::GeolocationDenied
        );
        assert_eq!(
            MapError::from(GeolocationError::Timeout),
            MapError::GeolocationTimeout
        );
        assert_eq!(
            MapError::from(GeolocationError::PositionUnavailable),
            MapError::GeolocationUnavailable
        );
    }

    #[test]
    fn surface_failure_reads_as_map_not_displayed() {
        let error = MapError::MapSurfaceInitFailure("zoom out of range".to_string());
        assert!(error.to_string().contains("Map could not be displayed"));
    }
}
