use serde::Deserialize;

use crate::errors::MapError;

use super::Coordinate;

/// A bike-share station as listed by the station collaborator.
#[derive(Debug, Clone, PartialEq)]
pub struct Station {
    pub id: String,
    pub name: String,
    pub address: String,
    pub location: Coordinate,
}

impl Station {
    pub fn new(id: String, name: String, address: String, location: Coordinate) -> Self {
        Self {
            id,
            name,
            address,
            location,
        }
    }
}

/// One line of a stations CSV file: `id,name,address,latitude,longitude`.
#[derive(Debug, Deserialize)]
pub(crate) struct StationRecord {
    id: String,
    name: String,
    address: String,
    latitude: f64,
    longitude: f64,
}

impl TryFrom<StationRecord> for Station {
    type Error = MapError;

    fn try_from(record: StationRecord) -> Result<Self, Self::Error> {
        if record.id.trim().is_empty() {
            return Err(MapError::StationListUnavailable(format!(
                "station '{}' has an empty id",
                record.name
            )));
        }
        let location = Coordinate::new(record.latitude, record.longitude)?;
        Ok(Station::new(record.id, record.name, record.address, location))
    }
}
