mod coordinate;
pub use coordinate::Coordinate;

mod station;
pub(crate) use station::StationRecord;
pub use station::Station;
