//! Generación de matrices origen-destino para conductores.

mod common;
mod each;
mod gravity;

pub use common::generate_trips_from_od_matrix;
pub use each::ODMatrixEachStep;
pub use gravity::GravityODMatrixStep;
