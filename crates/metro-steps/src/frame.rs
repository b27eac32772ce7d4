//! Helpers de acceso a columnas compartidos por los steps.
//!
//! Los steps leen columnas a vectores Rust, calculan en Rust plano y arman el
//! DataFrame de salida al final; el backend tabular queda confinado a IO y
//! validación de esquemas.

use chrono::Timelike;
use metro_core::Result;
use polars::prelude::*;

/// Columna como strings (los IDs enteros se convierten a su forma decimal).
pub fn str_column(df: &DataFrame, name: &str) -> Result<Vec<String>> {
    let series = df.column(name)?.cast(&DataType::Utf8)?;
    Ok(series
        .utf8()?
        .into_iter()
        .map(|value| value.unwrap_or_default().to_string())
        .collect())
}

pub fn i64_column(df: &DataFrame, name: &str) -> Result<Vec<i64>> {
    let series = df.column(name)?.cast(&DataType::Int64)?;
    Ok(series.i64()?.into_iter().map(|value| value.unwrap_or_default()).collect())
}

pub fn f64_column(df: &DataFrame, name: &str) -> Result<Vec<f64>> {
    let series = df.column(name)?.cast(&DataType::Float64)?;
    Ok(series.f64()?.into_iter().map(|value| value.unwrap_or_default()).collect())
}

pub fn opt_f64_column(df: &DataFrame, name: &str) -> Result<Vec<Option<f64>>> {
    let series = df.column(name)?.cast(&DataType::Float64)?;
    Ok(series.f64()?.into_iter().collect())
}

/// Columna de duraciones, en segundos (el dtype físico almacena
/// milisegundos).
pub fn duration_seconds_column(df: &DataFrame, name: &str) -> Result<Vec<f64>> {
    let series = df.column(name)?.cast(&DataType::Int64)?;
    Ok(series
        .i64()?
        .into_iter()
        .map(|value| value.unwrap_or_default() as f64 / 1e3)
        .collect())
}

/// Columna de horas del día, en segundos desde medianoche (el dtype físico
/// almacena nanosegundos).
pub fn time_seconds_column(df: &DataFrame, name: &str) -> Result<Vec<f64>> {
    let series = df.column(name)?.cast(&DataType::Int64)?;
    Ok(series
        .i64()?
        .into_iter()
        .map(|value| value.unwrap_or_default() as f64 / 1e9)
        .collect())
}

/// Serie de horas del día a partir de valores `NaiveTime`.
pub fn time_series(name: &str, values: &[chrono::NaiveTime]) -> Result<Series> {
    let nanos: Vec<i64> = values
        .iter()
        .map(|t| t.num_seconds_from_midnight() as i64 * 1_000_000_000 + t.nanosecond() as i64)
        .collect();
    Ok(Series::new(name, nanos).cast(&DataType::Time)?)
}

/// Serie de duraciones a partir de valores `chrono::Duration`.
pub fn duration_series(name: &str, values: &[chrono::Duration]) -> Result<Series> {
    let millis: Vec<i64> = values.iter().map(|d| d.num_milliseconds()).collect();
    Ok(Series::new(name, millis).cast(&DataType::Duration(TimeUnit::Milliseconds))?)
}

/// Serie de duraciones a partir de segundos.
pub fn duration_series_from_seconds(name: &str, seconds: &[f64]) -> Result<Series> {
    let millis: Vec<i64> = seconds.iter().map(|s| (s * 1e3).round() as i64).collect();
    Ok(Series::new(name, millis).cast(&DataType::Duration(TimeUnit::Milliseconds))?)
}
