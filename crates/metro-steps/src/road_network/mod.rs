//! Red vial: síntesis, capacidades y ruteo.

mod capacities;
mod circular;
mod files;
mod grid;
mod routing;

pub use capacities::ExogenousCapacitiesStep;
pub use circular::CircularNetworkStep;
pub use files::{ALL_DISTANCES, ALL_FREE_FLOW_TRAVEL_TIMES, EDGES_CAPACITIES, RAW_EDGES};
pub use grid::GridNetworkStep;
pub use routing::{AllDistancesStep, AllFreeFlowTravelTimesStep};
