//! Tipos de valores de configuración y sus validadores.
//!
//! Cada validador toma un valor TOML dinámico y devuelve un `ParamValue`
//! tipado o un mensaje de error; la clave punteada la agrega quien llama
//! (`Parameter::resolve`). El conjunto es un sum type cerrado para que el
//! planner y el generador de documentación puedan introspectar los tipos
//! esperados sin dynamic dispatch.
//!
//! El validador `Distribution` acepta una constante o una tabla
//! `{mean, std, distribution}`; `Normal` y `Gaussian` son sinónimos al
//! muestrear.

use std::path::PathBuf;

use chrono::{Duration, NaiveTime, Timelike};
use toml::Value;

/// Valor ya validado de un parámetro de configuración.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    Time(NaiveTime),
    Duration(Duration),
    Path(PathBuf),
    List(Vec<ParamValue>),
    Distribution(DistributionValue),
}

/// Distribución resuelta: o una constante o una familia paramétrica.
#[derive(Debug, Clone, PartialEq)]
pub enum DistributionValue {
    Constant(Box<ParamValue>),
    Random {
        mean: Box<ParamValue>,
        std: Box<ParamValue>,
        kind: DistributionKind,
    },
}

/// Familias de distribución soportadas. La comparación con el valor de
/// configuración ignora mayúsculas/minúsculas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DistributionKind {
    Uniform,
    Normal,
    Gaussian,
    Lognormal,
}

pub const DISTRIBUTION_NAMES: [&str; 4] = ["Uniform", "Normal", "Gaussian", "Lognormal"];

impl DistributionKind {
    pub fn parse(name: &str) -> Option<DistributionKind> {
        match name.to_ascii_lowercase().as_str() {
            "uniform" => Some(DistributionKind::Uniform),
            "normal" => Some(DistributionKind::Normal),
            "gaussian" => Some(DistributionKind::Gaussian),
            "lognormal" => Some(DistributionKind::Lognormal),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DistributionKind::Uniform => "Uniform",
            DistributionKind::Normal => "Normal",
            DistributionKind::Gaussian => "Gaussian",
            DistributionKind::Lognormal => "Lognormal",
        }
    }
}

impl ParamValue {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ParamValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            ParamValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Un entero también se lee como float (`Float` normaliza al validar,
    /// pero los defaults pueden declararse como `Int`).
    pub fn as_float(&self) -> Option<f64> {
        match self {
            ParamValue::Float(f) => Some(*f),
            ParamValue::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ParamValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_time(&self) -> Option<NaiveTime> {
        match self {
            ParamValue::Time(t) => Some(*t),
            _ => None,
        }
    }

    pub fn as_duration(&self) -> Option<Duration> {
        match self {
            ParamValue::Duration(d) => Some(*d),
            _ => None,
        }
    }

    pub fn as_path(&self) -> Option<&PathBuf> {
        match self {
            ParamValue::Path(p) => Some(p),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[ParamValue]> {
        match self {
            ParamValue::List(l) => Some(l),
            _ => None,
        }
    }

    pub fn as_distribution(&self) -> Option<&DistributionValue> {
        match self {
            ParamValue::Distribution(d) => Some(d),
            _ => None,
        }
    }

    /// Representación canónica para el `config_hash`: los tipos sin forma
    /// JSON nativa se fuerzan a string o número de manera estable.
    pub fn to_canonical(&self) -> serde_json::Value {
        use serde_json::json;
        match self {
            ParamValue::Bool(b) => json!(b),
            ParamValue::Int(i) => json!(i),
            ParamValue::Float(f) => json!(f),
            ParamValue::String(s) => json!(s),
            ParamValue::Time(t) => json!(format_time(*t)),
            ParamValue::Duration(d) => json!(duration_seconds(*d)),
            ParamValue::Path(p) => json!(p.to_string_lossy()),
            ParamValue::List(l) => {
                serde_json::Value::Array(l.iter().map(ParamValue::to_canonical).collect())
            }
            ParamValue::Distribution(DistributionValue::Constant(v)) => v.to_canonical(),
            ParamValue::Distribution(DistributionValue::Random { mean, std, kind }) => json!({
                "mean": mean.to_canonical(),
                "std": std.to_canonical(),
                "distribution": kind.as_str(),
            }),
        }
    }
}

/// `HH:MM:SS`, con fracción de segundo sólo cuando es distinta de cero.
pub fn format_time(t: NaiveTime) -> String {
    if t.nanosecond() == 0 {
        t.format("%H:%M:%S").to_string()
    } else {
        t.format("%H:%M:%S%.6f").to_string()
    }
}

/// Segundos totales de una duración, como float.
pub fn duration_seconds(d: Duration) -> f64 {
    d.num_microseconds().map(|us| us as f64 / 1e6).unwrap_or(d.num_seconds() as f64)
}

/// Validador de valores de configuración. Sum type cerrado; ver doc del
/// módulo.
#[derive(Debug, Clone)]
pub enum Validator {
    Bool,
    Int,
    Float,
    String,
    Time,
    Duration,
    Path {
        check_file_exists: bool,
        check_dir_exists: bool,
        extensions: Option<Vec<String>>,
    },
    Enum {
        values: Vec<String>,
    },
    List {
        inner: Box<Validator>,
        length: Option<usize>,
        min_length: Option<usize>,
        max_length: Option<usize>,
    },
    Custom {
        description: String,
        validate: fn(&Value) -> Result<ParamValue, String>,
    },
    Distribution {
        inner: Box<Validator>,
        inner_mean: Box<Validator>,
        inner_std: Box<Validator>,
    },
}

impl Validator {
    /// Path sin chequeo de existencia ni filtro de extensión.
    pub fn path() -> Validator {
        Validator::Path { check_file_exists: false, check_dir_exists: false, extensions: None }
    }

    pub fn enumeration(values: &[&str]) -> Validator {
        Validator::Enum { values: values.iter().map(|v| v.to_string()).collect() }
    }

    pub fn list(inner: Validator) -> Validator {
        Validator::List { inner: Box::new(inner), length: None, min_length: None, max_length: None }
    }

    /// Distribución donde constante, media y desviación comparten el tipo
    /// interno.
    pub fn distribution(inner: Validator) -> Validator {
        Validator::Distribution {
            inner_mean: Box::new(inner.clone()),
            inner_std: Box::new(inner.clone()),
            inner: Box::new(inner),
        }
    }

    pub fn distribution_with(inner: Validator, inner_mean: Validator, inner_std: Validator) -> Validator {
        Validator::Distribution {
            inner: Box::new(inner),
            inner_mean: Box::new(inner_mean),
            inner_std: Box::new(inner_std),
        }
    }

    /// Valida un valor TOML dinámico. El mensaje de error no incluye la clave
    /// punteada; la agrega `Parameter::resolve`.
    pub fn validate(&self, value: &Value) -> Result<ParamValue, String> {
        match self {
            Validator::Bool => match value {
                Value::Boolean(b) => Ok(ParamValue::Bool(*b)),
                other => Err(format!("invalid boolean: {}", other)),
            },
            Validator::Int => match value {
                Value::Integer(i) => Ok(ParamValue::Int(*i)),
                // Un float sin parte fraccionaria cuenta como entero.
                Value::Float(f) if f.fract() == 0.0 && f.is_finite() => Ok(ParamValue::Int(*f as i64)),
                other => Err(format!("invalid integer: {}", other)),
            },
            Validator::Float => match value {
                Value::Float(f) => Ok(ParamValue::Float(*f)),
                Value::Integer(i) => Ok(ParamValue::Float(*i as f64)),
                other => Err(format!("invalid float: {}", other)),
            },
            Validator::String => match value {
                Value::String(s) => Ok(ParamValue::String(s.clone())),
                other => Err(format!("invalid string: {}", other)),
            },
            Validator::Time => validate_time(value),
            Validator::Duration => validate_duration(value),
            Validator::Path { check_file_exists, check_dir_exists, extensions } => {
                let path = match value {
                    Value::String(s) => PathBuf::from(s),
                    other => return Err(format!("invalid path: {}", other)),
                };
                if let Some(allowed) = extensions {
                    // Sólo el sufijo, sensible a mayúsculas.
                    let suffix = path
                        .extension()
                        .map(|e| format!(".{}", e.to_string_lossy()))
                        .unwrap_or_default();
                    if !allowed.iter().any(|a| a == &suffix) {
                        return Err(format!(
                            "invalid path (allowed extensions: {}): {}",
                            allowed.join(", "),
                            path.display()
                        ));
                    }
                }
                if *check_file_exists && !path.is_file() {
                    return Err(format!("invalid path (not a file): {}", path.display()));
                }
                if *check_dir_exists && !path.is_dir() {
                    return Err(format!("invalid path (not a directory): {}", path.display()));
                }
                Ok(ParamValue::Path(path))
            }
            Validator::Enum { values } => match value {
                Value::String(s) if values.contains(s) => Ok(ParamValue::String(s.clone())),
                other => Err(format!(
                    "invalid value: {} [expected one of: {}]",
                    other,
                    values.join(", ")
                )),
            },
            Validator::List { inner, length, min_length, max_length } => {
                let items = match value {
                    Value::Array(items) => items,
                    other => return Err(format!("invalid list: {}", other)),
                };
                if let Some(n) = length {
                    if items.len() != *n {
                        return Err(format!(
                            "list has invalid number of elements (found: {}, expected: {})",
                            items.len(),
                            n
                        ));
                    }
                }
                if let Some(n) = min_length {
                    if items.len() < *n {
                        return Err(format!(
                            "list has not enough elements (found: {}, expected: {}+)",
                            items.len(),
                            n
                        ));
                    }
                }
                if let Some(n) = max_length {
                    if items.len() > *n {
                        return Err(format!(
                            "list has too many elements (found: {}, expected: {}-)",
                            items.len(),
                            n
                        ));
                    }
                }
                let mut out = Vec::with_capacity(items.len());
                for item in items {
                    out.push(inner.validate(item)?);
                }
                Ok(ParamValue::List(out))
            }
            Validator::Custom { validate, .. } => validate(value),
            Validator::Distribution { inner, inner_mean, inner_std } => {
                if let Value::Table(table) = value {
                    for key in ["mean", "std", "distribution"] {
                        if !table.contains_key(key) {
                            return Err(format!("not a valid distribution: missing key `{}`", key));
                        }
                    }
                    if let Some(extra) = table.keys().find(|k| {
                        k.as_str() != "mean" && k.as_str() != "std" && k.as_str() != "distribution"
                    }) {
                        return Err(format!("not a valid distribution: unexpected key `{}`", extra));
                    }
                    let mean = inner_mean.validate(&table["mean"])?;
                    let std = inner_std.validate(&table["std"])?;
                    let kind = match &table["distribution"] {
                        Value::String(s) => DistributionKind::parse(s)
                            .ok_or_else(|| format!("not a supported distribution: `{}`", s))?,
                        other => return Err(format!("not a supported distribution: {}", other)),
                    };
                    Ok(ParamValue::Distribution(DistributionValue::Random {
                        mean: Box::new(mean),
                        std: Box::new(std),
                        kind,
                    }))
                } else {
                    // Constante: el valor mismo debe pasar el validador interno.
                    let constant = inner.validate(value)?;
                    Ok(ParamValue::Distribution(DistributionValue::Constant(Box::new(constant))))
                }
            }
        }
    }

    /// Descripción legible del tipo esperado, usada en la documentación
    /// generada y en mensajes de error.
    pub fn describe(&self) -> String {
        match self {
            Validator::Bool => "boolean".to_string(),
            Validator::Int => "integer".to_string(),
            Validator::Float => "float".to_string(),
            Validator::String => "string".to_string(),
            Validator::Time => "time (`HH:MM:SS`)".to_string(),
            Validator::Duration => "duration (number of seconds or ISO 8601 string)".to_string(),
            Validator::Path { extensions, .. } => match extensions {
                Some(exts) => format!("path (allowed extensions: {})", exts.join(", ")),
                None => "path".to_string(),
            },
            Validator::Enum { values } => {
                let quoted: Vec<String> = values.iter().map(|v| format!("`{}`", v)).collect();
                format!("one of: {}", quoted.join(", "))
            }
            Validator::List { inner, length, min_length, max_length } => {
                let mut desc = format!("list of {}", inner.describe());
                if let Some(n) = length {
                    desc.push_str(&format!(" (exactly {} elements)", n));
                } else if min_length.is_some() || max_length.is_some() {
                    desc.push_str(&format!(
                        " ({} to {} elements)",
                        min_length.map(|n| n.to_string()).unwrap_or_else(|| "0".to_string()),
                        max_length.map(|n| n.to_string()).unwrap_or_else(|| "∞".to_string()),
                    ));
                }
                desc
            }
            Validator::Custom { description, .. } => description.clone(),
            Validator::Distribution { inner, inner_mean, inner_std } => {
                let names: Vec<String> =
                    DISTRIBUTION_NAMES.iter().map(|n| format!("`\"{}\"`", n)).collect();
                format!(
                    "{} or a table with keys `mean` ({}), `std` ({}), and `distribution` (one of {})",
                    inner.describe(),
                    inner_mean.describe(),
                    inner_std.describe(),
                    names.join(", ")
                )
            }
        }
    }
}

fn validate_time(value: &Value) -> Result<ParamValue, String> {
    match value {
        // Hora local TOML nativa (`08:30:00`).
        Value::Datetime(dt) if dt.date.is_none() && dt.offset.is_none() => match dt.time {
            Some(t) => NaiveTime::from_hms_nano_opt(
                t.hour as u32,
                t.minute as u32,
                t.second as u32,
                t.nanosecond,
            )
            .map(ParamValue::Time)
            .ok_or_else(|| format!("invalid time: {}", dt)),
            None => Err(format!("invalid time: {}", dt)),
        },
        Value::String(s) => NaiveTime::parse_from_str(s, "%H:%M:%S%.f")
            .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M"))
            .map(ParamValue::Time)
            .map_err(|_| format!("invalid time: {}", s)),
        other => Err(format!("invalid time: {}", other)),
    }
}

fn validate_duration(value: &Value) -> Result<ParamValue, String> {
    match value {
        Value::Integer(i) if *i >= 0 => Ok(ParamValue::Duration(Duration::seconds(*i))),
        Value::Float(f) if *f >= 0.0 && f.is_finite() => {
            Ok(ParamValue::Duration(Duration::microseconds((f * 1e6).round() as i64)))
        }
        Value::String(s) => parse_iso8601_duration(s)
            .map(ParamValue::Duration)
            .ok_or_else(|| format!("invalid duration: {}", s)),
        other => Err(format!("invalid duration: {}", other)),
    }
}

/// Subconjunto de duraciones ISO 8601: `P[nW][nD][T[nH][nM][nS]]`, con
/// segundos fraccionarios. Años y meses se rechazan (longitud ambigua).
fn parse_iso8601_duration(s: &str) -> Option<Duration> {
    let rest = s.strip_prefix('P')?;
    let (date_part, time_part) = match rest.split_once('T') {
        Some((d, t)) => (d, Some(t)),
        None => (rest, None),
    };
    if date_part.is_empty() && time_part.map(str::is_empty).unwrap_or(true) {
        return None;
    }
    let mut total_us: f64 = 0.0;
    for (part, units) in [
        (date_part, [('W', 604_800.0), ('D', 86_400.0)].as_slice()),
        (time_part.unwrap_or(""), [('H', 3_600.0), ('M', 60.0), ('S', 1.0)].as_slice()),
    ] {
        let mut number = String::new();
        for c in part.chars() {
            if c.is_ascii_digit() || c == '.' {
                number.push(c);
            } else {
                let n: f64 = number.parse().ok()?;
                let (_, factor) = units.iter().find(|(u, _)| *u == c)?;
                total_us += n * factor * 1e6;
                number.clear();
            }
        }
        if !number.is_empty() {
            // Dígitos sin unidad al final.
            return None;
        }
    }
    Some(Duration::microseconds(total_us.round() as i64))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toml_value(raw: &str) -> Value {
        let table: toml::Table = format!("v = {}", raw).parse().unwrap();
        table["v"].clone()
    }

    #[test]
    fn int_rejects_fractional_floats() {
        assert_eq!(Validator::Int.validate(&toml_value("3")).unwrap(), ParamValue::Int(3));
        assert_eq!(Validator::Int.validate(&toml_value("3.0")).unwrap(), ParamValue::Int(3));
        assert!(Validator::Int.validate(&toml_value("3.5")).is_err());
        assert!(Validator::Int.validate(&toml_value("true")).is_err());
    }

    #[test]
    fn bool_rejects_integers() {
        assert!(Validator::Bool.validate(&toml_value("1")).is_err());
        assert_eq!(Validator::Bool.validate(&toml_value("true")).unwrap(), ParamValue::Bool(true));
    }

    #[test]
    fn float_normalizes_integers() {
        assert_eq!(Validator::Float.validate(&toml_value("2")).unwrap(), ParamValue::Float(2.0));
    }

    #[test]
    fn time_accepts_native_and_iso_strings() {
        let expected = ParamValue::Time(NaiveTime::from_hms_opt(8, 30, 0).unwrap());
        assert_eq!(Validator::Time.validate(&toml_value("08:30:00")).unwrap(), expected);
        assert_eq!(Validator::Time.validate(&toml_value("\"08:30:00\"")).unwrap(), expected);
        assert!(Validator::Time.validate(&toml_value("\"25:00:00\"")).is_err());
    }

    #[test]
    fn duration_accepts_seconds_and_iso_strings() {
        assert_eq!(
            Validator::Duration.validate(&toml_value("90")).unwrap(),
            ParamValue::Duration(Duration::seconds(90))
        );
        assert_eq!(
            Validator::Duration.validate(&toml_value("\"PT1H30M\"")).unwrap(),
            ParamValue::Duration(Duration::seconds(5400))
        );
        assert_eq!(
            Validator::Duration.validate(&toml_value("\"P1DT0.5S\"")).unwrap(),
            ParamValue::Duration(Duration::milliseconds(86_400_500))
        );
        assert!(Validator::Duration.validate(&toml_value("-3")).is_err());
        assert!(Validator::Duration.validate(&toml_value("\"P\"")).is_err());
    }

    #[test]
    fn enum_error_lists_allowed_values() {
        let v = Validator::enumeration(&["Best", "Intersect", "TCH"]);
        let err = v.validate(&toml_value("\"Worst\"")).unwrap_err();
        assert!(err.contains("Best") && err.contains("Intersect") && err.contains("TCH"));
    }

    #[test]
    fn list_length_bounds_are_inclusive() {
        let v = Validator::List {
            inner: Box::new(Validator::Int),
            length: None,
            min_length: Some(2),
            max_length: Some(3),
        };
        assert!(v.validate(&toml_value("[1, 2]")).is_ok());
        assert!(v.validate(&toml_value("[1, 2, 3]")).is_ok());
        assert!(v.validate(&toml_value("[1]")).is_err());
        assert!(v.validate(&toml_value("[1, 2, 3, 4]")).is_err());
    }

    #[test]
    fn distribution_accepts_constant_or_table() {
        let v = Validator::distribution(Validator::Float);
        assert_eq!(
            v.validate(&toml_value("1.5")).unwrap(),
            ParamValue::Distribution(DistributionValue::Constant(Box::new(ParamValue::Float(1.5))))
        );
        let parsed = v
            .validate(&toml_value("{ mean = 1.0, std = 0.5, distribution = \"lognormal\" }"))
            .unwrap();
        match parsed {
            ParamValue::Distribution(DistributionValue::Random { kind, .. }) => {
                assert_eq!(kind, DistributionKind::Lognormal)
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn distribution_requires_exactly_the_three_keys() {
        let v = Validator::distribution(Validator::Float);
        assert!(v.validate(&toml_value("{ mean = 1.0, std = 0.5 }")).is_err());
        let err = v
            .validate(&toml_value(
                "{ mean = 1.0, std = 0.5, distribution = \"Normal\", extra = 1 }",
            ))
            .unwrap_err();
        assert!(err.contains("extra"));
        assert!(v
            .validate(&toml_value("{ mean = 1.0, std = 0.5, distribution = \"Triangular\" }"))
            .is_err());
    }

    #[test]
    fn path_extension_filter_is_case_sensitive() {
        let v = Validator::Path {
            check_file_exists: false,
            check_dir_exists: false,
            extensions: Some(vec![".csv".to_string()]),
        };
        assert!(v.validate(&toml_value("\"data/input.csv\"")).is_ok());
        assert!(v.validate(&toml_value("\"data/input.CSV\"")).is_err());
        assert!(v.validate(&toml_value("\"data/input\"")).is_err());
    }

    #[test]
    fn canonical_form_coerces_times_and_durations() {
        let t = ParamValue::Time(NaiveTime::from_hms_opt(7, 5, 0).unwrap());
        assert_eq!(t.to_canonical(), serde_json::json!("07:05:00"));
        let d = ParamValue::Duration(Duration::milliseconds(1500));
        assert_eq!(d.to_canonical(), serde_json::json!(1.5));
    }
}
