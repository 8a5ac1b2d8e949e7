use std::{
    fs::File,
    io::Read,
    path::{Path, PathBuf},
};

use logger::{Color, Logger};

use crate::{
    errors::MapError,
    types::{Coordinate, Station, StationRecord},
};

/// A trait that defines the required methods for a collaborator that lists
/// bike-share stations. The map view never writes back through it.
pub trait StationProvider {
    fn fetch_all_stations(&mut self) -> Result<Vec<Station>, MapError>;

    /// Every station, nearest to `origin` first.
    fn fetch_stations_sorted_by_proximity(
        &mut self,
        origin: Coordinate,
    ) -> Result<Vec<Station>, MapError>;
}

/// A static station list, read from a CSV file the first time it is needed.
///
/// The file has a header row and the columns `id,name,address,latitude,longitude`.
pub struct StationDirectory {
    source: Option<PathBuf>,
    stations: Option<Vec<Station>>,
}

impl StationDirectory {
    /// A directory backed by the CSV file at `path`. The file is not touched
    /// until the first fetch.
    pub fn open(path: &Path) -> Self {
        Self {
            source: Some(path.to_path_buf()),
            stations: None,
        }
    }

    pub fn from_stations(stations: Vec<Station>) -> Self {
        Self {
            source: None,
            stations: Some(stations),
        }
    }

    /// Parses a whole CSV document.
    pub fn parse<R: Read>(reader: R) -> Result<Vec<Station>, MapError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut stations = Vec::new();
        for record in csv_reader.deserialize::<StationRecord>() {
            stations.push(Station::try_from(record?)?);
        }
        Ok(stations)
    }

    fn load(&mut self) -> Result<&[Station], MapError> {
        if self.stations.is_none() {
            let path = self.source.as_ref().ok_or_else(|| {
                MapError::StationListUnavailable("no station source configured".to_string())
            })?;
            let file = File::open(path).map_err(|e| {
                MapError::StationListUnavailable(format!("{}: {}", path.display(), e))
            })?;
            self.stations = Some(Self::parse(file)?);
        }
        Ok(self.stations.as_deref().unwrap_or_default())
    }
}

impl StationProvider for StationDirectory {
    fn fetch_all_stations(&mut self) -> Result<Vec<Station>, MapError> {
        Ok(self.load()?.to_vec())
    }

    fn fetch_stations_sorted_by_proximity(
        &mut self,
        origin: Coordinate,
    ) -> Result<Vec<Station>, MapError> {
        let mut stations = self.load()?.to_vec();
        stations.sort_by(|a, b| {
            origin
                .distance_to(&a.location)
                .total_cmp(&origin.distance_to(&b.location))
        });
        Ok(stations)
    }
}

/// Status of the last station fetch, kept beside the list.
#[derive(Debug, Clone, PartialEq)]
pub enum FeedStatus {
    Idle,
    Ready,
    Failed(MapError),
}

/// Holds the station list shown on the map.
///
/// A failed fetch keeps the previous list and only flips the status.
pub struct StationFeed<P: StationProvider> {
    provider: P,
    stations: Vec<Station>,
    status: FeedStatus,
    logger: Logger,
}

impl<P: StationProvider> StationFeed<P> {
    pub fn new(provider: P, logger: Logger) -> Self {
        Self {
            provider,
            stations: Vec::new(),
            status: FeedStatus::Idle,
            logger,
        }
    }

    pub fn refresh_all(&mut self) {
        let result = self.provider.fetch_all_stations();
        self.apply(result, "all stations");
    }

    pub fn refresh_near(&mut self, origin: Coordinate) {
        let result = self.provider.fetch_stations_sorted_by_proximity(origin);
        self.apply(result, "stations near the user");
    }

    fn apply(&mut self, result: Result<Vec<Station>, MapError>, what: &str) {
        match result {
            Ok(stations) => {
                let _ = self.logger.info(
                    &format!("Loaded {} ({})", what, stations.len()),
                    Color::Cyan,
                );
                self.stations = stations;
                self.status = FeedStatus::Ready;
            }
            Err(error) => {
                let _ = self.logger.warn(&format!(
                    "Could not load {}, keeping {} stations: {}",
                    what,
                    self.stations.len(),
                    error
                ));
                self.status = FeedStatus::Failed(error);
            }
        }
    }

    pub fn stations(&self) -> &[Station] {
        &self.stations
    }

    pub fn status(&self) -> &FeedStatus {
        &self.status
    }

    pub fn find(&self, id: &str) -> Option<&Station> {
        self.stations.iter().find(|station| station.id == id)
    }
}
