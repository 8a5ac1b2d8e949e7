use std::{
    sync::{Arc, Mutex},
    thread,
    time::{Duration, Instant},
};

use crate::{errors::GeolocationError, types::Coordinate};

pub const GEOLOCATION_TIMEOUT: Duration = Duration::from_secs(10);
pub const GEOLOCATION_MAXIMUM_AGE: Duration = Duration::from_secs(5);

/// Options handed to the capability with every request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeolocationOptions {
    pub high_accuracy: bool,
    /// How long the capability may take before answering `Timeout`.
    pub timeout: Duration,
    /// A previous fix younger than this may be returned without a new lookup.
    pub maximum_age: Duration,
}

impl Default for GeolocationOptions {
    fn default() -> Self {
        Self {
            high_accuracy: true,
            timeout: GEOLOCATION_TIMEOUT,
            maximum_age: GEOLOCATION_MAXIMUM_AGE,
        }
    }
}

pub type PositionResult = Result<Coordinate, GeolocationError>;

/// Invoked exactly once with the outcome of a request, possibly from another
/// thread.
pub type PositionCallback = Box<dyn FnOnce(PositionResult) + Send + 'static>;

/// Source of the user's live position.
///
/// `get_current_position` must not block: the answer arrives later through
/// `callback`.
pub trait Geolocation {
    fn get_current_position(&self, options: &GeolocationOptions, callback: PositionCallback);
}

/// What the device reports when asked for its position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DevicePosition {
    Fixed(Coordinate),
    Denied,
    Unavailable,
}

/// Desktop stand-in for a platform location service.
///
/// Answers from a configured [`DevicePosition`] after `fix_delay`, on a
/// worker thread, honouring the request timeout and the fix cache age.
pub struct DeviceGeolocation {
    position: DevicePosition,
    fix_delay: Duration,
    last_fix: Arc<Mutex<Option<(Instant, Coordinate)>>>,
}

impl DeviceGeolocation {
    pub fn new(position: DevicePosition, fix_delay: Duration) -> Self {
        Self {
            position,
            fix_delay,
            last_fix: Arc::new(Mutex::new(None)),
        }
    }

    fn cached_fix(&self, maximum_age: Duration) -> Option<Coordinate> {
        let guard = self.last_fix.lock().ok()?;
        match *guard {
            Some((taken_at, coordinate)) if taken_at.elapsed() <= maximum_age => Some(coordinate),
            _ => None,
        }
    }
}

impl Geolocation for DeviceGeolocation {
    fn get_current_position(&self, options: &GeolocationOptions, callback: PositionCallback) {
        if let Some(coordinate) = self.cached_fix(options.maximum_age) {
            callback(Ok(coordinate));
            return;
        }

        // The slot lets the caller still answer if the worker never starts.
        let slot = Arc::new(Mutex::new(Some(callback)));
        let worker_slot = Arc::clone(&slot);
        let position = self.position;
        let fix_delay = self.fix_delay;
        let timeout = options.timeout;
        let last_fix = Arc::clone(&self.last_fix);

        let spawned = thread::Builder::new()
            .name("geolocation".to_string())
            .spawn(move || {
                let result = if fix_delay > timeout {
                    thread::sleep(timeout);
                    Err(GeolocationError::Timeout)
                } else {
                    thread::sleep(fix_delay);
                    match position {
                        DevicePosition::Fixed(coordinate) => Ok(coordinate),
                        DevicePosition::Denied => Err(GeolocationError::PermissionDenied),
                        DevicePosition::Unavailable => Err(GeolocationError::PositionUnavailable),
                    }
                };

                if let Ok(coordinate) = result {
                    if let Ok(mut fix) = last_fix.lock() {
                        *fix = Some((Instant::now(), coordinate));
                    }
                }

                let callback = worker_slot.lock().ok().and_then(|mut slot| slot.take());
                if let Some(callback) = callback {
                    callback(result);
                }
            });

        if spawned.is_err() {
            let callback = slot.lock().ok().and_then(|mut slot| slot.take());
            if let Some(callback) = callback {
                callback(Err(GeolocationError::PositionUnavailable));
            }
        }
    }
}
