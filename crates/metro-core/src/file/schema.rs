//! Esquemas de columnas para artifacts tabulares.
//!
//! Cada columna declara un tipo semántico (`MetroDataType`), si es opcional,
//! si admite nulls y si sus valores deben ser únicos. La validación se aplica
//! al escribir el artifact, nunca al leerlo.

use std::fmt;

use polars::prelude::{DataFrame, DataType};

/// Tipo semántico de una columna. Es más laxo que el dtype físico: un `Id`
/// admite enteros o strings, un `Int` admite cualquier ancho entero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetroDataType {
    Id,
    Bool,
    Int,
    UInt,
    Float,
    String,
    Time,
    Duration,
    ListOfIds,
    ListOfFloats,
    ListOfTimes,
}

fn is_integer(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
    )
}

fn is_unsigned(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::UInt8 | DataType::UInt16 | DataType::UInt32 | DataType::UInt64
    )
}

fn is_float(dtype: &DataType) -> bool {
    matches!(dtype, DataType::Float32 | DataType::Float64)
}

impl MetroDataType {
    /// Si el dtype físico de la columna es aceptable para este tipo semántico.
    pub fn matches(&self, dtype: &DataType) -> bool {
        match self {
            MetroDataType::Id => is_integer(dtype) || matches!(dtype, DataType::Utf8),
            MetroDataType::Bool => matches!(dtype, DataType::Boolean),
            MetroDataType::Int => is_integer(dtype),
            MetroDataType::UInt => is_unsigned(dtype),
            MetroDataType::Float => is_float(dtype),
            MetroDataType::String => matches!(dtype, DataType::Utf8),
            MetroDataType::Time => matches!(dtype, DataType::Time),
            MetroDataType::Duration => matches!(dtype, DataType::Duration(_)),
            MetroDataType::ListOfIds => match dtype {
                DataType::List(inner) => {
                    is_integer(inner) || matches!(inner.as_ref(), DataType::Utf8)
                }
                _ => false,
            },
            MetroDataType::ListOfFloats => match dtype {
                DataType::List(inner) => is_float(inner),
                _ => false,
            },
            MetroDataType::ListOfTimes => match dtype {
                DataType::List(inner) => matches!(inner.as_ref(), DataType::Time),
                _ => false,
            },
        }
    }

    /// Variante para frames geoespaciales: tiempos, duraciones y listas no
    /// están permitidos.
    pub fn matches_geo(&self, dtype: &DataType) -> bool {
        match self {
            MetroDataType::Id
            | MetroDataType::Bool
            | MetroDataType::Int
            | MetroDataType::UInt
            | MetroDataType::Float
            | MetroDataType::String => self.matches(dtype),
            _ => false,
        }
    }
}

impl fmt::Display for MetroDataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MetroDataType::Id => "string or integer",
            MetroDataType::Bool => "boolean",
            MetroDataType::Int => "integer",
            MetroDataType::UInt => "unsigned integer",
            MetroDataType::Float => "float",
            MetroDataType::String => "string",
            MetroDataType::Time => "time",
            MetroDataType::Duration => "duration",
            MetroDataType::ListOfIds => "list of strings or integers",
            MetroDataType::ListOfFloats => "list of floats",
            MetroDataType::ListOfTimes => "list of times",
        };
        write!(f, "{}", name)
    }
}

/// Declaración de una columna de un artifact tabular.
#[derive(Debug, Clone)]
pub struct Column {
    pub name: &'static str,
    pub dtype: MetroDataType,
    pub optional: bool,
    pub nullable: bool,
    pub unique: bool,
    pub description: &'static str,
}

impl Column {
    /// Columna requerida, nullable y sin restricción de unicidad.
    pub fn new(name: &'static str, dtype: MetroDataType) -> Column {
        Column { name, dtype, optional: false, nullable: true, unique: false, description: "" }
    }

    pub fn optional(mut self) -> Column {
        self.optional = true;
        self
    }

    pub fn non_nullable(mut self) -> Column {
        self.nullable = false;
        self
    }

    pub fn unique(mut self) -> Column {
        self.unique = true;
        self
    }

    pub fn with_description(mut self, description: &'static str) -> Column {
        self.description = description;
        self
    }

    /// Chequea esta columna contra el DataFrame. Devuelve un mensaje de error
    /// en la primera violación.
    pub fn check(&self, df: &DataFrame, geo: bool) -> Result<(), String> {
        let series = match df.column(self.name) {
            Ok(series) => series,
            Err(_) => {
                if self.optional {
                    return Ok(());
                }
                return Err(format!("missing required column `{}`", self.name));
            }
        };
        let ok = if geo {
            self.dtype.matches_geo(series.dtype())
        } else {
            self.dtype.matches(series.dtype())
        };
        if !ok {
            return Err(format!(
                "invalid dtype for column `{}`: {} (expected: {})",
                self.name,
                series.dtype(),
                self.dtype
            ));
        }
        if !self.nullable && series.null_count() > 0 {
            return Err(format!("column `{}` has null values", self.name));
        }
        if self.unique {
            let n = series.n_unique().map_err(|e| e.to_string())?;
            if n != df.height() {
                return Err(format!("column `{}` has duplicate values", self.name));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::*;

    #[test]
    fn id_accepts_integers_and_strings() {
        assert!(MetroDataType::Id.matches(&DataType::Int64));
        assert!(MetroDataType::Id.matches(&DataType::UInt32));
        assert!(MetroDataType::Id.matches(&DataType::Utf8));
        assert!(!MetroDataType::Id.matches(&DataType::Float64));
    }

    #[test]
    fn uint_requires_unsigned_width() {
        assert!(MetroDataType::UInt.matches(&DataType::UInt32));
        assert!(!MetroDataType::UInt.matches(&DataType::Int32));
        assert!(MetroDataType::Int.matches(&DataType::UInt32));
    }

    #[test]
    fn geo_forbids_time_and_duration() {
        assert!(MetroDataType::Time.matches(&DataType::Time));
        assert!(!MetroDataType::Time.matches_geo(&DataType::Time));
        assert!(!MetroDataType::Duration.matches_geo(&DataType::Duration(TimeUnit::Milliseconds)));
    }

    #[test]
    fn column_checks_presence_nulls_and_uniqueness() {
        let df = DataFrame::new(vec![
            Series::new("trip_id", vec![1i64, 2, 2]),
            Series::new("size", vec![Some(1.0f64), None, Some(3.0)]),
        ])
        .unwrap();
        assert!(Column::new("trip_id", MetroDataType::Id).check(&df, false).is_ok());
        assert!(Column::new("trip_id", MetroDataType::Id).unique().check(&df, false).is_err());
        assert!(Column::new("size", MetroDataType::Float).check(&df, false).is_ok());
        assert!(Column::new("size", MetroDataType::Float).non_nullable().check(&df, false).is_err());
        assert!(Column::new("missing", MetroDataType::Float).check(&df, false).is_err());
        assert!(Column::new("missing", MetroDataType::Float).optional().check(&df, false).is_ok());
    }
}
