//! Ejecución del binario del simulador.

use std::process::Command;

use indexmap::IndexMap;
use metro_core::{
    FileSpec, InputSpec, MetroError, Parameter, PipelineStep, Result, StepContext, Validator,
};

use super::files::{
    METRO_AGENTS, METRO_AGENT_RESULTS, METRO_ALTERNATIVES, METRO_EDGES, METRO_PARAMETERS,
    METRO_TRIPS, METRO_TRIP_RESULTS, METRO_VEHICLE_TYPES,
};

/// Ejecuta la simulación invocando el binario externo con el archivo de
/// parámetros como único argumento. Puede tardar horas o días en
/// simulaciones de gran escala. Un código de salida distinto de cero es
/// fatal, y cada output declarado debe existir cuando el proceso termina.
pub struct RunSimulationStep;

impl PipelineStep for RunSimulationStep {
    fn name(&self) -> &'static str {
        "RunSimulationStep"
    }

    fn parameters(&self) -> Vec<Parameter> {
        vec![Parameter::new(
            "exec_path",
            "metropolis_core.exec_path",
            Validator::Path {
                check_file_exists: true,
                check_dir_exists: false,
                extensions: None,
            },
        )
        .with_description("Path to the simulator executable.")]
    }

    fn input_files(&self) -> IndexMap<&'static str, InputSpec> {
        IndexMap::from([
            ("metro_parameters", InputSpec::required(&*METRO_PARAMETERS)),
            ("metro_agents", InputSpec::required(&*METRO_AGENTS)),
            ("metro_alternatives", InputSpec::required(&*METRO_ALTERNATIVES)),
            ("metro_edges", InputSpec::required(&*METRO_EDGES)),
            ("metro_vehicle_types", InputSpec::required(&*METRO_VEHICLE_TYPES)),
            // Una simulación puede correr sin ningún viaje.
            ("metro_trips", InputSpec::optional(&*METRO_TRIPS)),
        ])
    }

    fn output_files(&self) -> IndexMap<&'static str, &'static FileSpec> {
        IndexMap::from([
            ("metro_agent_results", &*METRO_AGENT_RESULTS),
            ("metro_trip_results", &*METRO_TRIP_RESULTS),
        ])
    }

    fn is_defined(&self, ctx: &StepContext) -> bool {
        ctx.has_param("exec_path")
    }

    fn run(&self, ctx: &StepContext) -> Result<()> {
        let exec_path = ctx.require("exec_path")?.as_path().cloned().ok_or_else(|| {
            MetroError::Runtime("`exec_path` is not a path parameter".to_string())
        })?;
        let params_path = ctx.input("metro_parameters").path().to_path_buf();
        let status = Command::new(&exec_path).arg(&params_path).status()?;
        if !status.success() {
            return Err(MetroError::Runtime(format!(
                "simulation failed (`{}` exited with {})",
                exec_path.display(),
                status.code().map(|c| c.to_string()).unwrap_or_else(|| "signal".to_string()),
            )));
        }
        for name in ["metro_trip_results", "metro_agent_results"] {
            let output = ctx.output(name);
            if !output.exists() {
                return Err(MetroError::Runtime(format!(
                    "output file not written: `{}`",
                    output.path().display()
                )));
            }
        }
        Ok(())
    }
}
