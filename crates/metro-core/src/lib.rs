//! metro-core: motor declarativo de pipeline con re-ejecución incremental.
//!
//! Propósito:
//! - Proveer los contratos neutrales (sin semántica de transporte) para
//!   declarar steps tipados sobre artifacts en disco, y la orquestación que
//!   decide qué steps corren, en qué orden, y cuáles se saltean por estar al
//!   día.
//!
//! Componentes principales:
//! - `config`: árbol TOML inmutable direccionable por claves punteadas.
//! - `types`: validadores (sum type cerrado) y valores tipados de parámetros,
//!   incluyendo parámetros distribuidos.
//! - `parameters`: descriptores de parámetros de los steps.
//! - `file`: clases de artifact (tabular, geo-tabular, texto, plot, opaco)
//!   con esquemas de columnas y lectura/escritura validada.
//! - `step`: contrato `PipelineStep` + `StepContext` (estado resuelto).
//! - `plan`: planner (grafo de artifacts, factibilidad, orden topológico,
//!   conjunto to-run).
//! - `update`: fingerprints por step en sidecars JSON.
//! - `sampling`: muestreo determinista de parámetros distribuidos.
//! - `run`: driver secuencial + dry-run.
//! - `doc`: generación de documentación Markdown.
//! - `hashing`: canonicalización JSON y SHA-256.
//! - `errors`: errores semánticos del motor.

pub mod config;
pub mod doc;
pub mod errors;
pub mod file;
pub mod hashing;
pub mod parameters;
pub mod plan;
pub mod run;
pub mod sampling;
pub mod step;
pub mod types;
mod update;

// Re-exports públicos principales
pub use config::Config;
pub use errors::{MetroError, Result};
pub use file::{Column, FileKind, FileSpec, MetroDataType, MetroFile, GEOMETRY_COLUMN};
pub use parameters::Parameter;
pub use plan::{build_plan, Plan, PlannedStep};
pub use run::run_pipeline;
pub use step::{random_seed_parameter, InputSpec, PipelineStep, StepContext};
pub use types::{DistributionKind, DistributionValue, ParamValue, Validator};
