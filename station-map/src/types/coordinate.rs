use walkers::Position;

use crate::errors::MapError;

const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

/// A point on the globe in decimal degrees.
///
/// Always within `[-90, 90]` latitude and `[-180, 180]` longitude. Fields are
/// private, so a `Coordinate` cannot change once built.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinate {
    latitude: f64,
    longitude: f64,
}

impl Coordinate {
    /// Builds a coordinate, rejecting out of range or non finite values.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, MapError> {
        if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
            return Err(MapError::InvalidCoordinate(format!(
                "latitude {} outside [-90, 90]",
                latitude
            )));
        }
        if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
            return Err(MapError::InvalidCoordinate(format!(
                "longitude {} outside [-180, 180]",
                longitude
            )));
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }

    /// For compile time constants whose range is known to be valid.
    pub(crate) const fn new_unchecked(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    /// Great circle distance in metres (haversine).
    pub fn distance_to(&self, other: &Coordinate) -> f64 {
        let lat1 = self.latitude.to_radians();
        let lat2 = other.latitude.to_radians();
        let d_lat = lat2 - lat1;
        let d_lon = (other.longitude - self.longitude).to_radians();

        let a = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);
        2.0 * EARTH_RADIUS_METERS * a.sqrt().asin()
    }
}

impl From<Coordinate> for Position {
    fn from(coordinate: Coordinate) -> Self {
        Position::from_lat_lon(coordinate.latitude, coordinate.longitude)
    }
}
