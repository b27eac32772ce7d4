//! Registro ordenado de las clases de step del pipeline.
//!
//! El orden es el de declaración (red, demanda, simulación, resultados); el
//! orden de ejecución real lo decide el planner a partir del grafo de
//! artifacts.

use metro_core::PipelineStep;

use crate::departure_time::{HomogeneousTstarStep, LinearScheduleStep};
use crate::modes::{
    CarDriverDistancesStep, CarDriverPreferencesStep, PublicTransitPreferencesStep,
    PublicTransitTravelTimesStep,
};
use crate::od_matrix::{GravityODMatrixStep, ODMatrixEachStep};
use crate::population::{GenericPopulationStep, UniformDrawsStep};
use crate::results::AggregateTripResultsStep;
use crate::road_network::{
    AllDistancesStep, AllFreeFlowTravelTimesStep, CircularNetworkStep, ExogenousCapacitiesStep,
    GridNetworkStep,
};
use crate::simulation::{
    RunSimulationStep, WriteMetroAgentsStep, WriteMetroAlternativesStep, WriteMetroEdgesStep,
    WriteMetroParametersStep, WriteMetroTripsStep, WriteMetroVehicleTypesStep,
};

pub fn all_steps() -> Vec<Box<dyn PipelineStep>> {
    vec![
        Box::new(GridNetworkStep),
        Box::new(CircularNetworkStep),
        Box::new(ExogenousCapacitiesStep),
        Box::new(AllFreeFlowTravelTimesStep),
        Box::new(AllDistancesStep),
        Box::new(GravityODMatrixStep),
        Box::new(ODMatrixEachStep),
        Box::new(GenericPopulationStep),
        Box::new(UniformDrawsStep),
        Box::new(CarDriverPreferencesStep),
        Box::new(CarDriverDistancesStep),
        Box::new(PublicTransitPreferencesStep),
        Box::new(PublicTransitTravelTimesStep),
        Box::new(HomogeneousTstarStep),
        Box::new(LinearScheduleStep),
        Box::new(WriteMetroParametersStep),
        Box::new(WriteMetroEdgesStep),
        Box::new(WriteMetroVehicleTypesStep),
        Box::new(WriteMetroAgentsStep),
        Box::new(WriteMetroAlternativesStep),
        Box::new(WriteMetroTripsStep),
        Box::new(RunSimulationStep),
        Box::new(AggregateTripResultsStep),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_names_are_unique() {
        let steps = all_steps();
        let mut names: Vec<&str> = steps.iter().map(|s| s.name()).collect();
        names.sort_unstable();
        let before = names.len();
        names.dedup();
        assert_eq!(names.len(), before);
    }

    #[test]
    fn documentation_covers_every_step() {
        let steps = all_steps();
        let doc = metro_core::doc::pipeline_markdown(&steps);
        for step in &steps {
            assert!(doc.contains(step.name()), "missing doc for {}", step.name());
        }
        assert!(doc.contains("## Trips"));
        assert!(doc.contains("## RawEdges"));
    }
}
