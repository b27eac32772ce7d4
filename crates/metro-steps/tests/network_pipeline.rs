//! Los steps de red encadenados a mano sobre un directorio temporal:
//! grilla → capacidades → ruteo → aristas del simulador.

use std::path::{Path, PathBuf};

use metro_core::{Config, PipelineStep, StepContext};
use metro_steps::road_network::{
    AllFreeFlowTravelTimesStep, ExogenousCapacitiesStep, GridNetworkStep,
};
use metro_steps::simulation::WriteMetroEdgesStep;
use polars::prelude::*;

fn config(dir: &Path, raw: &str) -> Config {
    Config::from_table(raw.parse().unwrap(), PathBuf::from(dir))
}

fn run(step: &dyn PipelineStep, config: &Config) {
    let ctx = StepContext::bind(step, config).unwrap();
    assert!(step.is_defined(&ctx), "step {} is not defined", step.name());
    step.run(&ctx).unwrap();
    ctx.save_update_record().unwrap();
}

const RAW: &str = r#"
[grid_network]
nb_rows = 1
nb_columns = 3
length = 100.0
right_to_left = false

[road_network.capacities]
LeftToRight = 1800.0
"#;

#[test]
fn network_steps_chain_into_simulator_edges() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = config(dir.path(), RAW);

    run(&GridNetworkStep, &cfg);
    run(&ExogenousCapacitiesStep, &cfg);
    run(&AllFreeFlowTravelTimesStep, &cfg);
    run(&WriteMetroEdgesStep, &cfg);

    // 1×3 con un solo sentido: dos aristas.
    let edges = metro_steps::road_network::RAW_EDGES.bind(dir.path()).read_dataframe().unwrap();
    assert_eq!(edges.height(), 2);

    let capacities =
        metro_steps::road_network::EDGES_CAPACITIES.bind(dir.path()).read_dataframe().unwrap();
    let values: Vec<Option<f64>> =
        capacities.column("capacity").unwrap().f64().unwrap().into_iter().collect();
    assert_eq!(values, vec![Some(1800.0), Some(1800.0)]);

    // 100 m a 50 km/h: 7.2 segundos por arista.
    let tts = metro_steps::road_network::ALL_FREE_FLOW_TRAVEL_TIMES
        .bind(dir.path())
        .read_dataframe()
        .unwrap();
    let seconds: Vec<f64> = tts
        .column("free_flow_travel_time")
        .unwrap()
        .cast(&DataType::Int64)
        .unwrap()
        .i64()
        .unwrap()
        .into_iter()
        .map(|ms| ms.unwrap_or_default() as f64 / 1e3)
        .collect();
    assert!(seconds.iter().any(|s| (*s - 14.4).abs() < 1e-9), "missing 2-edge path: {:?}", seconds);

    // Las aristas del simulador llevan la capacidad en PCE/s.
    let metro_edges =
        metro_steps::simulation::METRO_EDGES.bind(dir.path()).read_dataframe().unwrap();
    let flows: Vec<Option<f64>> =
        metro_edges.column("bottleneck_flow").unwrap().f64().unwrap().into_iter().collect();
    assert_eq!(flows, vec![Some(0.5), Some(0.5)]);
}
