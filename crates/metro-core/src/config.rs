//! Configuración inmutable del pipeline.
//!
//! Se carga una sola vez por invocación desde un documento TOML y se consulta
//! por claves punteadas (`road_network.capacities.default`). El árbol nunca se
//! muta: los steps sólo ven valores ya validados vía `Parameter::resolve`.
//!
//! Claves reservadas de nivel superior:
//! - `main_directory`: directorio raíz de todos los artifacts. Un valor
//!   relativo se resuelve contra el directorio del archivo de configuración.
//! - `random_seed`: semilla entera usada por los steps con RNG.

use std::path::{Path, PathBuf};

use toml::{Table, Value};

use crate::errors::{MetroError, Result};

#[derive(Debug, Clone)]
pub struct Config {
    values: Table,
    main_directory: PathBuf,
}

impl Config {
    /// Lee y parsea el archivo TOML en `path`.
    pub fn from_path(path: &Path) -> Result<Config> {
        let raw = std::fs::read_to_string(path)?;
        let values: Table = raw.parse().map_err(|e: toml::de::Error| MetroError::Config {
            key: path.display().to_string(),
            message: e.message().to_string(),
        })?;
        let base = path.parent().map(Path::to_path_buf).unwrap_or_default();
        let main_directory = match values.get("main_directory") {
            Some(Value::String(s)) => {
                let p = PathBuf::from(s);
                if p.is_absolute() {
                    p
                } else {
                    base.join(p)
                }
            }
            Some(other) => {
                return Err(MetroError::Config {
                    key: "main_directory".to_string(),
                    message: format!("expected a path string, found: {}", other),
                })
            }
            None => base,
        };
        Ok(Config { values, main_directory })
    }

    /// Construye una configuración desde una tabla ya parseada (tests y
    /// embebido).
    pub fn from_table(values: Table, main_directory: PathBuf) -> Config {
        Config { values, main_directory }
    }

    pub fn main_directory(&self) -> &Path {
        &self.main_directory
    }

    /// Busca el valor de una clave punteada, recorriendo las tablas anidadas.
    /// Devuelve `None` si cualquier segmento intermedio no existe.
    pub fn get(&self, dotted_key: &str) -> Option<&Value> {
        let mut segments = dotted_key.split('.');
        let first = segments.next()?;
        let mut current = self.values.get(first)?;
        for segment in segments {
            current = current.as_table()?.get(segment)?;
        }
        Some(current)
    }

    pub fn has_key(&self, dotted_key: &str) -> bool {
        self.get(dotted_key).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(raw: &str) -> Config {
        Config::from_table(raw.parse().unwrap(), PathBuf::from("/tmp/metro"))
    }

    #[test]
    fn dotted_key_lookup_walks_nested_tables() {
        let c = config("[grid_network]\nnb_rows = 3\n[road_network.capacities]\ndefault = 1000.0\n");
        assert_eq!(c.get("grid_network.nb_rows").and_then(Value::as_integer), Some(3));
        assert_eq!(
            c.get("road_network.capacities.default").and_then(Value::as_float),
            Some(1000.0)
        );
        assert!(c.get("grid_network.nb_columns").is_none());
        assert!(c.get("missing.nb_rows").is_none());
    }

    #[test]
    fn intermediate_non_table_segment_is_missing() {
        let c = config("x = 3\n");
        assert!(c.get("x.y").is_none());
        assert!(c.has_key("x"));
    }
}
