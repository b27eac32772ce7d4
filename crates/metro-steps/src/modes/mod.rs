//! Preferencias por modo de transporte.

mod car_driver;
mod files;
mod public_transit;

pub use car_driver::{CarDriverDistancesStep, CarDriverPreferencesStep};
pub use files::{
    CAR_DRIVER_DISTANCES, CAR_DRIVER_ODS, CAR_DRIVER_PREFERENCES, PUBLIC_TRANSIT_PREFERENCES,
    PUBLIC_TRANSIT_TRAVEL_TIMES,
};
pub use public_transit::{PublicTransitPreferencesStep, PublicTransitTravelTimesStep};
