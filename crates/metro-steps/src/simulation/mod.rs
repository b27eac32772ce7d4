//! Conversión de insumos, parámetros y ejecución del simulador externo.

mod common;
mod demand;
mod exec;
mod files;
mod parameters;
mod supply;

pub use common::{has_mode, has_mode_choice, modes_parameter, trip_modes};
pub use demand::{WriteMetroAgentsStep, WriteMetroAlternativesStep, WriteMetroTripsStep};
pub use exec::RunSimulationStep;
pub use files::{
    METRO_AGENTS, METRO_AGENT_RESULTS, METRO_ALTERNATIVES, METRO_EDGES, METRO_PARAMETERS,
    METRO_TRIPS, METRO_TRIP_RESULTS, METRO_VEHICLE_TYPES,
};
pub use parameters::WriteMetroParametersStep;
pub use supply::{WriteMetroEdgesStep, WriteMetroVehicleTypesStep};
