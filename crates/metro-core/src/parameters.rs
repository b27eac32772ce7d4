//! Descriptores de parámetros de los steps.
//!
//! Un `Parameter` es un slot con nombre declarado por la clase del step: liga
//! una clave punteada de la configuración, un validador, un default opcional y
//! metadata legible (descripción, nota, ejemplo) para la documentación
//! generada. La resolución contra la `Config` produce el valor tipado que el
//! step verá en su `StepContext`, o `None` si la clave no existe y no hay
//! default.

use crate::config::Config;
use crate::errors::{MetroError, Result};
use crate::types::{ParamValue, Validator};

#[derive(Debug, Clone)]
pub struct Parameter {
    /// Nombre del slot en el step; es la clave usada en el fingerprint
    /// (`data_file_<name>_mtime`) y en el mapa de parámetros resueltos.
    pub name: &'static str,
    /// Clave punteada en la configuración TOML.
    pub key: &'static str,
    pub validator: Validator,
    /// Default ya tipado; al ser un `ParamValue` queda validado por
    /// construcción.
    pub default: Option<ParamValue>,
    pub description: &'static str,
    pub note: &'static str,
    pub example: &'static str,
}

impl Parameter {
    pub fn new(name: &'static str, key: &'static str, validator: Validator) -> Parameter {
        Parameter { name, key, validator, default: None, description: "", note: "", example: "" }
    }

    pub fn bool(name: &'static str, key: &'static str) -> Parameter {
        Parameter::new(name, key, Validator::Bool)
    }

    pub fn int(name: &'static str, key: &'static str) -> Parameter {
        Parameter::new(name, key, Validator::Int)
    }

    pub fn float(name: &'static str, key: &'static str) -> Parameter {
        Parameter::new(name, key, Validator::Float)
    }

    pub fn string(name: &'static str, key: &'static str) -> Parameter {
        Parameter::new(name, key, Validator::String)
    }

    pub fn time(name: &'static str, key: &'static str) -> Parameter {
        Parameter::new(name, key, Validator::Time)
    }

    pub fn duration(name: &'static str, key: &'static str) -> Parameter {
        Parameter::new(name, key, Validator::Duration)
    }

    pub fn with_default(mut self, default: ParamValue) -> Parameter {
        self.default = Some(default);
        self
    }

    pub fn with_description(mut self, description: &'static str) -> Parameter {
        self.description = description;
        self
    }

    pub fn with_note(mut self, note: &'static str) -> Parameter {
        self.note = note;
        self
    }

    pub fn with_example(mut self, example: &'static str) -> Parameter {
        self.example = example;
        self
    }

    /// Resuelve el parámetro contra la configuración:
    /// - la clave existe → se valida y devuelve el valor tipado;
    /// - la clave no existe → default (o `None` sin default);
    /// - el validador falla → error fatal reportado contra la clave punteada.
    pub fn resolve(&self, config: &Config) -> Result<Option<ParamValue>> {
        match config.get(self.key) {
            Some(raw) => match self.validator.validate(raw) {
                Ok(value) => Ok(Some(value)),
                Err(message) => Err(MetroError::Config { key: self.key.to_string(), message }),
            },
            None => Ok(self.default.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn config(raw: &str) -> Config {
        Config::from_table(raw.parse().unwrap(), PathBuf::from("/tmp/metro"))
    }

    #[test]
    fn resolves_value_default_and_unset() {
        let c = config("[grid_network]\nnb_rows = 4\n");
        let set = Parameter::int("nb_rows", "grid_network.nb_rows");
        assert_eq!(set.resolve(&c).unwrap(), Some(ParamValue::Int(4)));

        let defaulted = Parameter::bool("left_to_right", "grid_network.left_to_right")
            .with_default(ParamValue::Bool(true));
        assert_eq!(defaulted.resolve(&c).unwrap(), Some(ParamValue::Bool(true)));

        let unset = Parameter::float("length", "grid_network.length");
        assert_eq!(unset.resolve(&c).unwrap(), None);
    }

    #[test]
    fn validator_failure_names_the_dotted_key() {
        let c = config("[grid_network]\nnb_rows = \"four\"\n");
        let p = Parameter::int("nb_rows", "grid_network.nb_rows");
        match p.resolve(&c) {
            Err(MetroError::Config { key, .. }) => assert_eq!(key, "grid_network.nb_rows"),
            other => panic!("unexpected: {:?}", other),
        }
    }
}
