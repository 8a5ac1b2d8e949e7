use std::sync::mpsc::{self, Receiver, Sender};

use logger::{Color, Logger};

use crate::{
    errors::GeolocationError,
    geolocation::{Geolocation, GeolocationOptions, PositionResult},
    types::Coordinate,
};

/// Ho Chi Minh City center, used when nothing better is known.
pub const FALLBACK_CENTER: Coordinate = Coordinate::new_unchecked(10.776889, 106.700987);

/// Picks the map center: an explicit station coordinate wins over the last
/// known user position, which wins over [`FALLBACK_CENTER`].
pub fn resolve_center(explicit: Option<Coordinate>, last_user: Option<Coordinate>) -> Coordinate {
    explicit.or(last_user).unwrap_or(FALLBACK_CENTER)
}

/// The user position as far as the current view lifetime knows it.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct UserLocationState {
    pub coordinate: Option<Coordinate>,
    pub acquired: bool,
}

/// What `acquire_user_location` decided to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcquireOutcome {
    /// The capability was invoked.
    Started,
    /// A station coordinate is known, so the capability was not spent.
    SkippedExplicit,
    /// A request of this lifetime is still outstanding.
    InFlight,
    /// This lifetime already made its one attempt.
    AlreadyAttempted,
}

/// A result delivered during the current view lifetime.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Acquisition {
    Acquired(Coordinate),
    Failed(GeolocationError),
}

/// Resolves the map center and runs the one-shot user position acquisition.
///
/// Results are delivered through a queue drained by [`LocationResolver::poll`]
/// on the owner's thread. Each delivery is tagged with the lifetime it was
/// requested in; deliveries from an ended lifetime are dropped unseen.
pub struct LocationResolver<G: Geolocation> {
    geolocation: G,
    options: GeolocationOptions,
    state: UserLocationState,
    lifetime: u64,
    in_flight: bool,
    attempted: bool,
    sender: Sender<(u64, PositionResult)>,
    receiver: Receiver<(u64, PositionResult)>,
    logger: Logger,
}

impl<G: Geolocation> LocationResolver<G> {
    pub fn new(geolocation: G, options: GeolocationOptions, logger: Logger) -> Self {
        let (sender, receiver) = mpsc::channel();
        Self {
            geolocation,
            options,
            state: UserLocationState::default(),
            lifetime: 0,
            in_flight: false,
            attempted: false,
            sender,
            receiver,
            logger,
        }
    }

    /// Starts a new view lifetime with a blank user location.
    pub fn begin(&mut self) {
        self.lifetime += 1;
        self.state = UserLocationState::default();
        self.in_flight = false;
        self.attempted = false;
    }

    /// Ends the current lifetime. Anything the capability delivers afterwards
    /// is discarded.
    pub fn cancel(&mut self) {
        if self.in_flight {
            let _ = self.logger.debug(&format!(
                "Geolocation request of lifetime {} abandoned",
                self.lifetime
            ));
        }
        self.lifetime += 1;
        self.in_flight = false;
    }

    /// Asks the capability for the user position, at most once per lifetime
    /// and never when `explicit` is known.
    pub fn acquire_user_location(&mut self, explicit: Option<Coordinate>) -> AcquireOutcome {
        if explicit.is_some() {
            return AcquireOutcome::SkippedExplicit;
        }
        if self.in_flight {
            return AcquireOutcome::InFlight;
        }
        if self.attempted {
            return AcquireOutcome::AlreadyAttempted;
        }

        self.attempted = true;
        self.in_flight = true;

        let lifetime = self.lifetime;
        let sender = self.sender.clone();
        self.geolocation.get_current_position(
            &self.options,
            Box::new(move |result| {
                // The receiver may be gone together with its view.
                let _ = sender.send((lifetime, result));
            }),
        );

        let _ = self.logger.info(
            &format!("Requested user position (lifetime {})", lifetime),
            Color::Cyan,
        );
        AcquireOutcome::Started
    }

    /// Applies the delivery for the current lifetime, if one has arrived.
    pub fn poll(&mut self) -> Option<Acquisition> {
        while let Ok((lifetime, result)) = self.receiver.try_recv() {
            if lifetime != self.lifetime || !self.in_flight {
                let _ = self.logger.debug(&format!(
                    "Dropped stale geolocation result from lifetime {}",
                    lifetime
                ));
                continue;
            }

            self.in_flight = false;
            return Some(match result {
                Ok(coordinate) => {
                    self.state = UserLocationState {
                        coordinate: Some(coordinate),
                        acquired: true,
                    };
                    let _ = self.logger.info(
                        &format!(
                            "User position acquired at ({}, {})",
                            coordinate.latitude(),
                            coordinate.longitude()
                        ),
                        Color::Green,
                    );
                    Acquisition::Acquired(coordinate)
                }
                Err(error) => {
                    let _ = self
                        .logger
                        .warn(&format!("User position unavailable: {}", error));
                    Acquisition::Failed(error)
                }
            });
        }
        None
    }

    pub fn center(&self, explicit: Option<Coordinate>) -> Coordinate {
        resolve_center(explicit, self.state.coordinate)
    }

    pub fn state(&self) -> UserLocationState {
        self.state
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight
    }
}
