//! Archivo de parámetros del simulador.

use indexmap::IndexMap;
use metro_core::{
    sampling::time_to_seconds, types::duration_seconds, FileSpec, ParamValue, Parameter,
    PipelineStep, Result, StepContext, Validator,
};
use serde_json::json;

use super::files::METRO_PARAMETERS;

/// Genera el archivo JSON de parámetros que consume el binario del
/// simulador.
pub struct WriteMetroParametersStep;

impl PipelineStep for WriteMetroParametersStep {
    fn name(&self) -> &'static str {
        "WriteMetroParametersStep"
    }

    fn parameters(&self) -> Vec<Parameter> {
        vec![
            Parameter::new(
                "period",
                "simulation_parameters.period",
                Validator::List {
                    inner: Box::new(Validator::Time),
                    length: Some(2),
                    min_length: None,
                    max_length: None,
                },
            )
            .with_description("Time window to be simulated.")
            .with_example("`[06:00:00, 12:00:00]`"),
            Parameter::duration("recording_interval", "simulation_parameters.recording_interval")
                .with_description(
                    "Time interval between two breakpoints for the travel-time functions.",
                ),
            Parameter::bool("spillback", "simulation_parameters.spillback")
                .with_default(ParamValue::Bool(false))
                .with_description(
                    "Whether the number of vehicles on a road should be limited by the total \
                     road length.",
                ),
            Parameter::duration("max_pending_duration", "simulation_parameters.max_pending_duration")
                .with_description(
                    "Maximum amount of time that a vehicle can spend waiting to enter the next \
                     road, in case of spillback.",
                ),
            Parameter::float("learning_factor", "simulation_parameters.learning_factor")
                .with_default(ParamValue::Float(0.0))
                .with_description("Value of the smoothing factor for the exponential learning model.")
                .with_note("Value must be between 0 and 1. Smaller values lead to slower but steadier convergences."),
            Parameter::new(
                "routing_algorithm",
                "simulation_parameters.routing_algorithm",
                Validator::enumeration(&["Best", "Intersect", "TCH"]),
            )
            .with_default(ParamValue::String("Best".to_string()))
            .with_description(
                "Algorithm type to use when computing the origin-destination travel-time \
                 functions.",
            ),
            Parameter::int("nb_iterations", "simulation_parameters.nb_iterations")
                .with_default(ParamValue::Int(1))
                .with_description("Number of iterations to be simulated."),
        ]
    }

    fn output_files(&self) -> IndexMap<&'static str, &'static FileSpec> {
        IndexMap::from([("metro_parameters", &*METRO_PARAMETERS)])
    }

    fn is_defined(&self, ctx: &StepContext) -> bool {
        ctx.has_param("period")
            && ctx.has_param("recording_interval")
            && (ctx.bool_param("spillback") != Some(true) || ctx.has_param("max_pending_duration"))
    }

    fn run(&self, ctx: &StepContext) -> Result<()> {
        let period: Vec<f64> = ctx
            .require("period")?
            .as_list()
            .map(|items| {
                items.iter().filter_map(|item| item.as_time()).map(time_to_seconds).collect()
            })
            .unwrap_or_default();
        let recording_interval =
            ctx.duration_param("recording_interval").map(duration_seconds).unwrap_or(0.0);
        let spillback = ctx.bool_param("spillback").unwrap_or(false);
        let learning_factor = ctx.float_param("learning_factor").unwrap_or(0.0);
        let routing_algorithm = ctx.str_param("routing_algorithm").unwrap_or("Best");
        let nb_iterations = ctx.int_param("nb_iterations").unwrap_or(1);

        let mut road_network = json!({
            "recording_interval": recording_interval,
            "spillback": spillback,
            "algorithm_type": routing_algorithm,
        });
        if let Some(max_pending) = ctx.duration_param("max_pending_duration") {
            road_network["max_pending_duration"] = json!(duration_seconds(max_pending));
        }
        let params = json!({
            "input_files": {
                "agents": "input/agents.parquet",
                "alternatives": "input/alts.parquet",
                "trips": "input/trips.parquet",
                "edges": "input/edges.parquet",
                "vehicle_types": "input/vehicle_types.parquet",
            },
            "output_directory": "output",
            "period": period,
            "learning_model": {
                "type": "Exponential",
                "value": learning_factor,
            },
            "max_iterations": nb_iterations,
            "saving_format": "Parquet",
            "road_network": road_network,
        });
        let text = serde_json::to_string_pretty(&params)?;
        ctx.output("metro_parameters").write_text(&text)
    }
}
