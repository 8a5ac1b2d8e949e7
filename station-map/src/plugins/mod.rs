mod markers;
pub use markers::Markers;
