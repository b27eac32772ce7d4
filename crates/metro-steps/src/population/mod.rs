//! Población sintética: viajes, personas, hogares y draws uniformes.

mod draws;
mod files;
mod generic;

pub use draws::UniformDrawsStep;
pub use files::{HOUSEHOLDS, PERSONS, TRIPS, UNIFORM_DRAWS};
pub use generic::GenericPopulationStep;
