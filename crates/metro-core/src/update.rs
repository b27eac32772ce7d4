//! Registro de fingerprint de cada step (sidecar JSON).
//!
//! Por step, el archivo `${main}/update_files/<StepName>.json` guarda tres
//! secciones en un único objeto plano:
//! - `data_file_<param>_mtime`: mtime de cada parámetro de tipo path cuyo
//!   destino existía al momento de la última ejecución exitosa.
//! - `metro_file_<name>_mtime`: mtime de cada input/output ligado que existía
//!   al momento de la última ejecución exitosa.
//! - `config_hash`: SHA-256 de la serialización canónica (claves ordenadas,
//!   tipos forzados a formas estables) del mapa de parámetros resueltos.
//!
//! El driver escribe el registro únicamente después de un `run` sin error:
//! la existencia del sidecar sin una ejecución exitosa es imposible.

use serde_json::{Map, Value};

use crate::errors::Result;
use crate::hashing::{sha256_hex, to_canonical_json};
use crate::step::StepContext;
use crate::types::ParamValue;

impl StepContext {
    /// Hash de la configuración relevante para el step. Estable bajo el orden
    /// de inserción de claves.
    pub fn config_hash(&self) -> String {
        let mut object = Map::new();
        for (name, value) in self.params() {
            let canonical = match value {
                Some(v) => v.to_canonical(),
                None => Value::Null,
            };
            object.insert(name.to_string(), canonical);
        }
        sha256_hex(&to_canonical_json(&Value::Object(object)))
    }

    /// Contenido actual del sidecar, o `None` si el step nunca corrió (o el
    /// archivo fue borrado o es ilegible).
    pub fn update_record(&self) -> Option<Map<String, Value>> {
        let raw = std::fs::read_to_string(self.update_path()).ok()?;
        serde_json::from_str(&raw).ok()
    }

    /// Decide si el step debe volver a ejecutarse. Primera condición que
    /// aplica gana:
    /// - no hay sidecar;
    /// - un path referido por un parámetro apareció, desapareció o cambió de
    ///   mtime;
    /// - un input/output ligado apareció, desapareció o cambió de mtime
    ///   (incluye el caso de un output previamente producido y luego borrado);
    /// - el `config_hash` actual difiere del registrado.
    pub fn update_required(&self) -> bool {
        let record = match self.update_record() {
            Some(record) => record,
            None => return true,
        };
        for (name, value) in self.params() {
            let path = match value.and_then(ParamValue::as_path) {
                Some(path) => path,
                None => continue,
            };
            let key = format!("data_file_{}_mtime", name);
            let recorded = record.get(&key).and_then(Value::as_f64);
            let current = std::fs::metadata(path)
                .ok()
                .and_then(|m| m.modified().ok())
                .and_then(|t| t.duration_since(std::time::UNIX_EPOCH).ok())
                .map(|d| d.as_secs_f64());
            if current != recorded {
                return true;
            }
        }
        for (name, file) in self.inputs().chain(self.outputs()) {
            let key = format!("metro_file_{}_mtime", name);
            let recorded = record.get(&key).and_then(Value::as_f64);
            if file.last_modified() != recorded {
                return true;
            }
        }
        record.get("config_hash").and_then(Value::as_str) != Some(self.config_hash().as_str())
    }

    /// Reescribe el sidecar con los mtimes actuales y el hash de parámetros.
    /// Sólo la llama el driver tras una ejecución exitosa.
    pub fn save_update_record(&self) -> Result<()> {
        let mut record = Map::new();
        for (name, value) in self.params() {
            let path = match value.and_then(ParamValue::as_path) {
                Some(path) => path,
                None => continue,
            };
            let mtime = std::fs::metadata(path)
                .ok()
                .and_then(|m| m.modified().ok())
                .and_then(|t| t.duration_since(std::time::UNIX_EPOCH).ok())
                .map(|d| d.as_secs_f64());
            if let Some(mtime) = mtime {
                record.insert(format!("data_file_{}_mtime", name), mtime.into());
            }
        }
        for (name, file) in self.inputs().chain(self.outputs()) {
            if let Some(mtime) = file.last_modified() {
                record.insert(format!("metro_file_{}_mtime", name), mtime.into());
            }
        }
        record.insert("config_hash".to_string(), self.config_hash().into());
        if let Some(parent) = self.update_path().parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(self.update_path(), serde_json::to_string(&record)?)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::file::{FileSpec, MetroFile};
    use crate::parameters::Parameter;
    use crate::step::{InputSpec, PipelineStep};
    use indexmap::IndexMap;
    use once_cell::sync::Lazy;
    use std::path::PathBuf;

    static IN: Lazy<FileSpec> = Lazy::new(|| FileSpec::text("UpdIn", "in.txt"));
    static OUT: Lazy<FileSpec> = Lazy::new(|| FileSpec::text("UpdOut", "out.txt"));

    struct Upd;

    impl PipelineStep for Upd {
        fn name(&self) -> &'static str {
            "Upd"
        }
        fn parameters(&self) -> Vec<Parameter> {
            vec![
                Parameter::int("count", "upd.count"),
                Parameter::new("data", "upd.data", crate::types::Validator::path()),
            ]
        }
        fn input_files(&self) -> IndexMap<&'static str, InputSpec> {
            IndexMap::from([("in", InputSpec::required(&*IN))])
        }
        fn output_files(&self) -> IndexMap<&'static str, &'static FileSpec> {
            IndexMap::from([("out", &*OUT)])
        }
        fn run(&self, ctx: &StepContext) -> crate::errors::Result<()> {
            ctx.output("out").write_text("done")
        }
    }

    fn bind(dir: &std::path::Path, raw: &str) -> StepContext {
        let config = Config::from_table(raw.parse().unwrap(), PathBuf::from(dir));
        StepContext::bind(&Upd, &config).unwrap()
    }

    fn touch(file: &MetroFile) {
        // Asegura un mtime distinto del anterior.
        std::thread::sleep(std::time::Duration::from_millis(20));
        std::fs::write(file.path(), "touched").unwrap();
    }

    #[test]
    fn fresh_step_is_outdated_then_up_to_date_after_save() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = bind(dir.path(), "[upd]\ncount = 1\n");
        assert!(ctx.update_required());
        ctx.input("in").write_text("input").unwrap();
        Upd.run(&ctx).unwrap();
        ctx.save_update_record().unwrap();
        assert!(!ctx.update_required());
    }

    #[test]
    fn touching_an_input_invalidates() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = bind(dir.path(), "[upd]\ncount = 1\n");
        ctx.input("in").write_text("input").unwrap();
        Upd.run(&ctx).unwrap();
        ctx.save_update_record().unwrap();
        touch(ctx.input("in"));
        assert!(ctx.update_required());
    }

    #[test]
    fn deleting_an_output_invalidates() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = bind(dir.path(), "[upd]\ncount = 1\n");
        ctx.input("in").write_text("input").unwrap();
        Upd.run(&ctx).unwrap();
        ctx.save_update_record().unwrap();
        ctx.output("out").remove().unwrap();
        assert!(ctx.update_required());
    }

    #[test]
    fn config_change_invalidates_through_the_hash() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = bind(dir.path(), "[upd]\ncount = 1\n");
        ctx.input("in").write_text("input").unwrap();
        Upd.run(&ctx).unwrap();
        ctx.save_update_record().unwrap();
        let changed = bind(dir.path(), "[upd]\ncount = 2\n");
        assert!(changed.update_required());
        let same = bind(dir.path(), "[upd]\ncount = 1\n");
        assert!(!same.update_required());
    }

    #[test]
    fn data_file_parameter_mtime_is_tracked() {
        let dir = tempfile::tempdir().unwrap();
        let data = dir.path().join("exogenous.csv");
        std::fs::write(&data, "a,b\n").unwrap();
        let raw = format!("[upd]\ncount = 1\ndata = \"{}\"\n", data.display());
        let ctx = bind(dir.path(), &raw);
        ctx.input("in").write_text("input").unwrap();
        Upd.run(&ctx).unwrap();
        ctx.save_update_record().unwrap();
        assert!(!ctx.update_required());
        std::thread::sleep(std::time::Duration::from_millis(20));
        std::fs::write(&data, "a,b\n1,2\n").unwrap();
        assert!(ctx.update_required());
    }

    #[test]
    fn record_roundtrip_is_byte_identical() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = bind(dir.path(), "[upd]\ncount = 1\n");
        ctx.input("in").write_text("input").unwrap();
        Upd.run(&ctx).unwrap();
        ctx.save_update_record().unwrap();
        let raw = std::fs::read_to_string(ctx.update_path()).unwrap();
        let parsed: serde_json::Map<String, serde_json::Value> =
            serde_json::from_str(&raw).unwrap();
        assert_eq!(serde_json::to_string(&parsed).unwrap(), raw);
        let hash = parsed.get("config_hash").and_then(serde_json::Value::as_str).unwrap();
        assert_eq!(hash.len(), 64);
    }
}
