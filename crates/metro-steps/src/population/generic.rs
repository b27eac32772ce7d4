//! Población genérica a partir de los pares origen-destino.

use indexmap::IndexMap;
use metro_core::{FileSpec, InputSpec, PipelineStep, Result, StepContext};
use polars::prelude::*;

use super::files::{HOUSEHOLDS, PERSONS, TRIPS};
use crate::frame::str_column;
use crate::modes::CAR_DRIVER_ODS;

/// Genera una población (hogares, personas y viajes) desde la lista de pares
/// origen-destino de conductores. Cada hogar tiene una única persona con un
/// único viaje, y cada viaje forma su propio tour.
pub struct GenericPopulationStep;

impl PipelineStep for GenericPopulationStep {
    fn name(&self) -> &'static str {
        "GenericPopulationStep"
    }

    fn input_files(&self) -> IndexMap<&'static str, InputSpec> {
        IndexMap::from([("car_driver_ods", InputSpec::required(&*CAR_DRIVER_ODS))])
    }

    fn output_files(&self) -> IndexMap<&'static str, &'static FileSpec> {
        IndexMap::from([
            ("trips", &*TRIPS),
            ("persons", &*PERSONS),
            ("households", &*HOUSEHOLDS),
        ])
    }

    fn run(&self, ctx: &StepContext) -> Result<()> {
        let ods = ctx.input("car_driver_ods").read_dataframe()?;
        let trip_ids = str_column(&ods, "trip_id")?;
        let n = trip_ids.len();
        let ids = |name: &str| {
            Series::new(name, trip_ids.iter().map(String::as_str).collect::<Vec<_>>())
        };

        let trips = DataFrame::new(vec![
            ids("trip_id"),
            ids("person_id"),
            ids("household_id"),
            Series::new("trip_index", vec![1u32; n]),
            ids("tour_id"),
        ])?;
        ctx.output("trips").write_dataframe(trips)?;

        let persons = DataFrame::new(vec![
            ids("person_id"),
            ids("household_id"),
            Series::new("has_driving_license", vec![true; n]),
            Series::new("has_pt_subscription", vec![true; n]),
        ])?;
        ctx.output("persons").write_dataframe(persons)?;

        let households = DataFrame::new(vec![
            ids("household_id"),
            Series::new("number_of_persons", vec![1u32; n]),
            Series::new("number_of_vehicles", vec![1u32; n]),
            Series::new("income", vec![None::<f64>; n]),
        ])?;
        ctx.output("households").write_dataframe(households)
    }
}
