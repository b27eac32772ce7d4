//! Muestreo de parámetros distribuidos.
//!
//! Dado un parámetro de distribución resuelto y un largo objetivo, produce la
//! secuencia de valores muestreados. Reglas:
//! - constante → se repite N veces;
//! - `Uniform(mean, std)` → `U(mean − std, mean + std)`;
//! - `Normal`/`Gaussian(mean, std)` → `𝒩(mean, std²)`;
//! - `Lognormal(mean, std)` → `Lognormal(μ = mean, σ = std)`;
//! - objetivo entero → se muestrea como float y se redondea;
//! - objetivo hora/duración → conversión a segundos (desde medianoche para
//!   horas), muestreo como float, conversión de vuelta.
//!
//! Con una semilla fija el muestreo es completamente determinista (ChaCha12).

use chrono::{Duration, NaiveTime, Timelike};
use rand::distributions::{Distribution as RandDistribution, Uniform};
use rand::Rng;
use rand_distr::{LogNormal, Normal};

use crate::errors::{MetroError, Result};
use crate::types::{duration_seconds, DistributionKind, DistributionValue, ParamValue};

fn invalid(message: String) -> MetroError {
    MetroError::Runtime(format!("failed to generate values from the given distribution: {}", message))
}

fn numeric_constant(value: &ParamValue) -> Result<f64> {
    value
        .as_float()
        .ok_or_else(|| invalid(format!("not a numeric constant: {:?}", value)))
}

fn sample(kind: DistributionKind, mean: f64, std: f64, n: usize, rng: &mut impl Rng) -> Result<Vec<f64>> {
    match kind {
        DistributionKind::Uniform => {
            if std < 0.0 {
                return Err(invalid(format!("negative standard deviation: {}", std)));
            }
            let dist = Uniform::new_inclusive(mean - std, mean + std);
            Ok((0..n).map(|_| dist.sample(rng)).collect())
        }
        DistributionKind::Normal | DistributionKind::Gaussian => {
            let dist = Normal::new(mean, std).map_err(|e| invalid(e.to_string()))?;
            Ok((0..n).map(|_| dist.sample(rng)).collect())
        }
        DistributionKind::Lognormal => {
            let dist = LogNormal::new(mean, std).map_err(|e| invalid(e.to_string()))?;
            Ok((0..n).map(|_| dist.sample(rng)).collect())
        }
    }
}

/// Secuencia de N floats a partir de un parámetro de distribución numérico.
pub fn generate_values(
    param: &DistributionValue,
    n: usize,
    rng: &mut impl Rng,
) -> Result<Vec<f64>> {
    match param {
        DistributionValue::Constant(value) => {
            let constant = numeric_constant(value)?;
            Ok(vec![constant; n])
        }
        DistributionValue::Random { mean, std, kind } => {
            sample(*kind, numeric_constant(mean)?, numeric_constant(std)?, n, rng)
        }
    }
}

/// Variante entera: muestrea como float y redondea al entero más cercano.
pub fn generate_int_values(
    param: &DistributionValue,
    n: usize,
    rng: &mut impl Rng,
) -> Result<Vec<i64>> {
    let values = generate_values(param, n, rng)?;
    Ok(values.into_iter().map(|v| v.round() as i64).collect())
}

/// Segundos desde medianoche, con fracción.
pub fn time_to_seconds(t: NaiveTime) -> f64 {
    t.num_seconds_from_midnight() as f64 + t.nanosecond() as f64 / 1e9
}

/// Inversa de `time_to_seconds`. El comportamiento fuera de [0, 24h) no está
/// especificado por el motor; se pliega al día.
pub fn seconds_to_time(seconds: f64) -> NaiveTime {
    let wrapped = seconds.rem_euclid(86_400.0);
    let whole = wrapped.floor();
    let nanos = ((wrapped - whole) * 1e9).round() as u32;
    NaiveTime::from_num_seconds_from_midnight_opt(whole as u32, nanos)
        .unwrap_or(NaiveTime::MIN)
}

pub fn seconds_to_duration(seconds: f64) -> Duration {
    Duration::microseconds((seconds * 1e6).round() as i64)
}

/// Variante hora del día: media en segundos desde medianoche, desviación en
/// segundos.
pub fn generate_time_values(
    param: &DistributionValue,
    n: usize,
    rng: &mut impl Rng,
) -> Result<Vec<NaiveTime>> {
    match param {
        DistributionValue::Constant(value) => {
            let t = value
                .as_time()
                .ok_or_else(|| invalid(format!("not a time constant: {:?}", value)))?;
            Ok(vec![t; n])
        }
        DistributionValue::Random { mean, std, kind } => {
            let mean = mean
                .as_time()
                .map(time_to_seconds)
                .ok_or_else(|| invalid(format!("not a time mean: {:?}", mean)))?;
            let std = std
                .as_duration()
                .map(duration_seconds)
                .ok_or_else(|| invalid(format!("not a duration std: {:?}", std)))?;
            let values = sample(*kind, mean, std, n, rng)?;
            Ok(values.into_iter().map(seconds_to_time).collect())
        }
    }
}

/// Variante duración: media y desviación en segundos.
pub fn generate_duration_values(
    param: &DistributionValue,
    n: usize,
    rng: &mut impl Rng,
) -> Result<Vec<Duration>> {
    match param {
        DistributionValue::Constant(value) => {
            let d = value
                .as_duration()
                .ok_or_else(|| invalid(format!("not a duration constant: {:?}", value)))?;
            Ok(vec![d; n])
        }
        DistributionValue::Random { mean, std, kind } => {
            let mean = mean
                .as_duration()
                .map(duration_seconds)
                .ok_or_else(|| invalid(format!("not a duration mean: {:?}", mean)))?;
            let std = std
                .as_duration()
                .map(duration_seconds)
                .ok_or_else(|| invalid(format!("not a duration std: {:?}", std)))?;
            let values = sample(*kind, mean, std, n, rng)?;
            Ok(values.into_iter().map(seconds_to_duration).collect())
        }
    }
}
