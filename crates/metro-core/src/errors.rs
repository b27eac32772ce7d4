//! Errores del motor de pipeline.
//!
//! Taxonomía:
//! - `Config`: valor inválido o clave faltante en la configuración TOML. Se
//!   reporta siempre con la clave punteada ofensora.
//! - `Schema`: un artifact tabular no cumple su esquema de columnas.
//! - `Plan`: error de planificación (productor duplicado, ciclo, etc.).
//! - `Step`: fallo en el `run` de un step; envuelve el error original con el
//!   nombre del step.
//! - `Io` / `DataFrame`: fallos de filesystem o del backend tabular.
//! - `Aborted`: el usuario rechazó la limpieza de huérfanos.
//!
//! Ningún error se recupera silenciosamente: los de configuración, esquema y
//! planificación abortan antes de ejecutar cualquier step; los de ejecución
//! abortan el driver inmediatamente.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum MetroError {
    #[error("invalid value for key `{key}`: {message}")]
    Config { key: String, message: String },
    #[error("invalid data for `{file}`: {message}")]
    Schema { file: String, message: String },
    #[error("planning error: {0}")]
    Plan(String),
    #[error("failed to execute step `{step}`: {source}")]
    Step {
        step: String,
        #[source]
        source: Box<MetroError>,
    },
    #[error("{0}")]
    Runtime(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("dataframe error: {0}")]
    DataFrame(#[from] polars::error::PolarsError),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("aborted by user")]
    Aborted,
}

impl MetroError {
    /// Código de salida del proceso asociado a cada clase de error.
    /// 1 = configuración/esquema/planificación, 2 = fallo de un step,
    /// 130 = el usuario abortó en el prompt de huérfanos.
    pub fn exit_code(&self) -> i32 {
        match self {
            MetroError::Step { .. } => 2,
            MetroError::Aborted => 130,
            _ => 1,
        }
    }
}

pub type Result<T, E = MetroError> = std::result::Result<T, E>;
