//! Contrato de un Step del pipeline.
//!
//! Un step declara cuatro cosas: sus descriptores de parámetros tipados, un
//! mapa de archivos de entrada (`InputSpec`: clase de artifact + flags
//! `optional`/`when`), un mapa de archivos de salida y un cuerpo `run`. El
//! motor lo instancia ligando los parámetros contra la configuración activa;
//! el estado resuelto vive en un `StepContext` inmutable.
//!
//! Reglas clave:
//! - `run` sólo debe leer sus inputs declarados y escribir sus outputs
//!   declarados; el motor no puede detectar efectos fuera de ese contrato.
//! - `is_defined` decide con los parámetros resueltos si el step participa
//!   del plan (default: siempre).
//! - Los steps con muestreo usan `StepContext::rng`: misma semilla ⇒ mismos
//!   streams en todas las plataformas.

use std::collections::BTreeMap;
use std::path::PathBuf;

use indexmap::IndexMap;
use rand::SeedableRng;
use rand_chacha::ChaCha12Rng;

use crate::config::Config;
use crate::errors::{MetroError, Result};
use crate::file::{FileSpec, MetroFile};
use crate::parameters::Parameter;
use crate::types::{DistributionValue, ParamValue};

/// Descriptor de una arista de entrada de un step.
#[derive(Debug, Clone)]
pub struct InputSpec {
    pub file: &'static FileSpec,
    /// Una entrada opcional puede no existir sin volver el step infeasible.
    pub optional: bool,
    /// Poda dinámica: la arista existe sólo cuando el predicado vale sobre el
    /// step instanciado. Combinado con `optional` distingue "no provisto" de
    /// "no requerido en esta configuración".
    pub when: Option<fn(&StepContext) -> bool>,
}

impl InputSpec {
    pub fn required(file: &'static FileSpec) -> InputSpec {
        InputSpec { file, optional: false, when: None }
    }

    pub fn optional(file: &'static FileSpec) -> InputSpec {
        InputSpec { file, optional: true, when: None }
    }

    pub fn when(mut self, predicate: fn(&StepContext) -> bool) -> InputSpec {
        self.when = Some(predicate);
        self
    }
}

/// Contrato estático de un step. Las implementaciones son unit structs; todo
/// el estado por invocación vive en el `StepContext`.
pub trait PipelineStep {
    /// Nombre de la clase del step; nombra el sidecar de fingerprint y las
    /// líneas de log.
    fn name(&self) -> &'static str;

    fn parameters(&self) -> Vec<Parameter> {
        Vec::new()
    }

    fn input_files(&self) -> IndexMap<&'static str, InputSpec> {
        IndexMap::new()
    }

    fn output_files(&self) -> IndexMap<&'static str, &'static FileSpec>;

    /// Si el step está definido por la configuración activa. Los steps cuyos
    /// outputs sólo tienen sentido con ciertos parámetros presentes lo
    /// sobreescriben para plegarse fuera del plan.
    fn is_defined(&self, _ctx: &StepContext) -> bool {
        true
    }

    fn run(&self, ctx: &StepContext) -> Result<()>;
}

/// Descriptor compartido del parámetro `random_seed` que declaran los steps
/// con RNG.
pub fn random_seed_parameter() -> Parameter {
    Parameter::int("random_seed", "random_seed")
        .with_description("Random seed used to initialize the random number generator.")
        .with_note(
            "If the random seed is not defined, some operations are not deterministic, i.e., \
             they can produce different results if re-run.",
        )
}

/// Estado resuelto de un step: registro inmutable de parámetros validados más
/// los artifacts ligados bajo el directorio principal.
#[derive(Debug)]
pub struct StepContext {
    name: &'static str,
    /// BTreeMap para que la serialización del fingerprint sea estable bajo el
    /// orden de inserción.
    params: BTreeMap<&'static str, Option<ParamValue>>,
    inputs: IndexMap<String, MetroFile>,
    outputs: IndexMap<String, MetroFile>,
    update_path: PathBuf,
}

impl StepContext {
    /// Instancia el step contra la configuración: resuelve cada parámetro y
    /// liga inputs y outputs. Un fallo de validación es fatal y se reporta
    /// contra la clave punteada.
    pub fn bind(step: &dyn PipelineStep, config: &Config) -> Result<StepContext> {
        let mut params = BTreeMap::new();
        for parameter in step.parameters() {
            let resolved = parameter.resolve(config)?;
            params.insert(parameter.name, resolved);
        }
        let main = config.main_directory();
        let inputs = step
            .input_files()
            .into_iter()
            .map(|(name, spec)| (name.to_string(), spec.file.bind(main)))
            .collect();
        let outputs = step
            .output_files()
            .into_iter()
            .map(|(name, spec)| (name.to_string(), spec.bind(main)))
            .collect();
        let update_path = main.join("update_files").join(format!("{}.json", step.name()));
        Ok(StepContext { name: step.name(), params, inputs, outputs, update_path })
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn update_path(&self) -> &PathBuf {
        &self.update_path
    }

    /// Valor resuelto de un parámetro, o `None` si quedó sin definir.
    pub fn param(&self, name: &str) -> Option<&ParamValue> {
        self.params.get(name).and_then(|v| v.as_ref())
    }

    pub fn has_param(&self, name: &str) -> bool {
        self.param(name).is_some()
    }

    /// Iterador sobre el registro completo (incluye los no definidos, que
    /// participan del fingerprint como null).
    pub fn params(&self) -> impl Iterator<Item = (&'static str, Option<&ParamValue>)> + '_ {
        self.params.iter().map(|(name, value)| (*name, value.as_ref()))
    }

    pub fn bool_param(&self, name: &str) -> Option<bool> {
        self.param(name).and_then(ParamValue::as_bool)
    }

    pub fn int_param(&self, name: &str) -> Option<i64> {
        self.param(name).and_then(ParamValue::as_int)
    }

    pub fn float_param(&self, name: &str) -> Option<f64> {
        self.param(name).and_then(ParamValue::as_float)
    }

    pub fn str_param(&self, name: &str) -> Option<&str> {
        self.param(name).and_then(ParamValue::as_str)
    }

    pub fn time_param(&self, name: &str) -> Option<chrono::NaiveTime> {
        self.param(name).and_then(ParamValue::as_time)
    }

    pub fn duration_param(&self, name: &str) -> Option<chrono::Duration> {
        self.param(name).and_then(ParamValue::as_duration)
    }

    pub fn path_param(&self, name: &str) -> Option<&PathBuf> {
        self.param(name).and_then(ParamValue::as_path)
    }

    pub fn list_param(&self, name: &str) -> Option<&[ParamValue]> {
        self.param(name).and_then(ParamValue::as_list)
    }

    pub fn distribution_param(&self, name: &str) -> Option<&DistributionValue> {
        self.param(name).and_then(ParamValue::as_distribution)
    }

    /// Variante estricta para cuerpos `run` que ya pasaron `is_defined`: un
    /// parámetro ausente a esta altura es un error de configuración.
    pub fn require(&self, name: &str) -> Result<&ParamValue> {
        self.param(name).ok_or_else(|| MetroError::Config {
            key: name.to_string(),
            message: format!("parameter `{}` is required by step `{}`", name, self.name),
        })
    }

    /// Input ligado por nombre. Un nombre no declarado es un bug del step.
    pub fn input(&self, name: &str) -> &MetroFile {
        &self.inputs[name]
    }

    pub fn output(&self, name: &str) -> &MetroFile {
        &self.outputs[name]
    }

    pub fn inputs(&self) -> impl Iterator<Item = (&str, &MetroFile)> + '_ {
        self.inputs.iter().map(|(name, file)| (name.as_str(), file))
    }

    pub fn outputs(&self) -> impl Iterator<Item = (&str, &MetroFile)> + '_ {
        self.outputs.iter().map(|(name, file)| (name.as_str(), file))
    }

    /// RNG determinista a partir del parámetro `random_seed`; sin semilla el
    /// stream sale de entropía y el step no es reproducible.
    pub fn rng(&self) -> ChaCha12Rng {
        match self.int_param("random_seed") {
            Some(seed) => ChaCha12Rng::seed_from_u64(seed as u64),
            None => ChaCha12Rng::from_entropy(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use once_cell::sync::Lazy;
    use rand::RngCore;

    static OUT: Lazy<FileSpec> = Lazy::new(|| FileSpec::dataframe("CtxOut", "out.parquet"));

    struct Probe;

    impl PipelineStep for Probe {
        fn name(&self) -> &'static str {
            "Probe"
        }
        fn parameters(&self) -> Vec<Parameter> {
            vec![
                random_seed_parameter(),
                Parameter::float("length", "probe.length"),
                Parameter::bool("flag", "probe.flag").with_default(ParamValue::Bool(false)),
            ]
        }
        fn output_files(&self) -> IndexMap<&'static str, &'static FileSpec> {
            IndexMap::from([("out", &*OUT)])
        }
        fn run(&self, _ctx: &StepContext) -> Result<()> {
            Ok(())
        }
    }

    fn config(raw: &str) -> Config {
        Config::from_table(raw.parse().unwrap(), PathBuf::from("/tmp/metro"))
    }

    #[test]
    fn binding_resolves_params_and_paths() {
        let ctx = StepContext::bind(&Probe, &config("random_seed = 42\n[probe]\nlength = 2.5\n"))
            .unwrap();
        assert_eq!(ctx.int_param("random_seed"), Some(42));
        assert_eq!(ctx.float_param("length"), Some(2.5));
        assert_eq!(ctx.bool_param("flag"), Some(false));
        assert!(ctx.output("out").path().ends_with("out.parquet"));
        assert!(ctx.update_path().ends_with("update_files/Probe.json"));
    }

    #[test]
    fn same_seed_same_stream() {
        let ctx = StepContext::bind(&Probe, &config("random_seed = 42\n")).unwrap();
        let mut a = ctx.rng();
        let mut b = ctx.rng();
        assert_eq!(a.next_u64(), b.next_u64());
    }
}
