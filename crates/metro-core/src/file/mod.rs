//! Capa de artifacts tipados en disco.
//!
//! Un `FileSpec` es la descripción estática de una clase de artifact: ruta
//! relativa bajo el directorio principal, kind (tabular, geo-tabular, texto,
//! plot, opaco) y, para los kinds tabulares, un esquema de columnas. Un
//! `MetroFile` es la instancia ligada a una ruta absoluta; expone existencia,
//! mtime, lectura, escritura (con validación de esquema) y borrado.
//!
//! Los artifacts tabulares se persisten como Parquet; texto como UTF-8;
//! plots y opacos a nivel de bytes. Los directorios padre se crean de forma
//! perezosa en la primera escritura.

mod schema;

pub use schema::{Column, MetroDataType};

use std::fs::File;
use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;

use polars::prelude::*;
use tracing::warn;

use crate::errors::{MetroError, Result};

/// Kind del artifact; decide el formato en disco y la validación aplicada.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    /// DataFrame con esquema de columnas, persistido como Parquet.
    DataFrame,
    /// Como `DataFrame` pero con una columna `geometry` siempre presente y
    /// preservada; tiempos y duraciones no están permitidos.
    GeoDataFrame,
    /// Texto UTF-8.
    Text,
    /// Imagen (PNG o PDF según la clase); bytes sin interpretar.
    Plot,
    /// Bytes sin interpretar.
    Opaque,
}

/// Nombre de la columna de geometría de los artifacts geo-tabulares. El motor
/// la trata como texto WKT opaco.
pub const GEOMETRY_COLUMN: &str = "geometry";

/// Descripción estática de una clase de artifact.
#[derive(Debug, Clone)]
pub struct FileSpec {
    /// Nombre único de la clase; identifica el nodo en el grafo del planner.
    pub name: &'static str,
    /// Ruta relativa bajo el directorio principal.
    pub path: &'static str,
    pub kind: FileKind,
    pub description: &'static str,
    /// Esquema de columnas; vacío = sin validación de columnas.
    pub schema: Vec<Column>,
    /// Cota superior de filas, si aplica.
    pub max_rows: Option<usize>,
}

impl FileSpec {
    pub fn new(name: &'static str, path: &'static str, kind: FileKind) -> FileSpec {
        FileSpec { name, path, kind, description: "", schema: Vec::new(), max_rows: None }
    }

    pub fn dataframe(name: &'static str, path: &'static str) -> FileSpec {
        FileSpec::new(name, path, FileKind::DataFrame)
    }

    pub fn geodataframe(name: &'static str, path: &'static str) -> FileSpec {
        FileSpec::new(name, path, FileKind::GeoDataFrame)
    }

    pub fn text(name: &'static str, path: &'static str) -> FileSpec {
        FileSpec::new(name, path, FileKind::Text)
    }

    pub fn plot(name: &'static str, path: &'static str) -> FileSpec {
        FileSpec::new(name, path, FileKind::Plot)
    }

    pub fn opaque(name: &'static str, path: &'static str) -> FileSpec {
        FileSpec::new(name, path, FileKind::Opaque)
    }

    pub fn with_description(mut self, description: &'static str) -> FileSpec {
        self.description = description;
        self
    }

    pub fn with_schema(mut self, schema: Vec<Column>) -> FileSpec {
        self.schema = schema;
        self
    }

    pub fn with_max_rows(mut self, max_rows: usize) -> FileSpec {
        self.max_rows = Some(max_rows);
        self
    }

    /// Liga la clase bajo un directorio principal concreto.
    pub fn bind(&'static self, main_directory: &Path) -> MetroFile {
        MetroFile { spec: self, path: main_directory.join(self.path) }
    }

    fn is_tabular(&self) -> bool {
        matches!(self.kind, FileKind::DataFrame | FileKind::GeoDataFrame)
    }
}

/// Artifact ligado a una ruta absoluta. Un artifact ⇄ una ruta.
#[derive(Debug, Clone)]
pub struct MetroFile {
    spec: &'static FileSpec,
    path: PathBuf,
}

impl MetroFile {
    pub fn spec(&self) -> &'static FileSpec {
        self.spec
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Mtime del archivo en segundos desde epoch; `None` si no existe (el
    /// artifact se considera de estado desconocido).
    pub fn last_modified(&self) -> Option<f64> {
        let metadata = std::fs::metadata(&self.path).ok()?;
        let modified = metadata.modified().ok()?;
        modified.duration_since(UNIX_EPOCH).ok().map(|d| d.as_secs_f64())
    }

    pub fn remove(&self) -> Result<()> {
        std::fs::remove_file(&self.path)?;
        Ok(())
    }

    fn create_parent_dirs(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        Ok(())
    }

    fn schema_error(&self, message: impl Into<String>) -> MetroError {
        MetroError::Schema { file: self.spec.name.to_string(), message: message.into() }
    }

    /// Valida el DataFrame contra el esquema declarado y descarta (con
    /// warning) las columnas extra. La validación corre completa antes de
    /// tocar el archivo, de modo que una violación deja el artifact intacto.
    fn validate(&self, mut df: DataFrame) -> Result<DataFrame> {
        let geo = self.spec.kind == FileKind::GeoDataFrame;
        if let Some(max_rows) = self.spec.max_rows {
            if df.height() > max_rows {
                return Err(self.schema_error(format!(
                    "too many rows: {} (maximum: {})",
                    df.height(),
                    max_rows
                )));
            }
        }
        if geo && df.column(GEOMETRY_COLUMN).is_err() {
            return Err(self.schema_error(format!("missing `{}` column", GEOMETRY_COLUMN)));
        }
        if self.spec.schema.is_empty() {
            return Ok(df);
        }
        for column in &self.spec.schema {
            column.check(&df, geo).map_err(|message| self.schema_error(message))?;
        }
        let declared: Vec<&str> = self.spec.schema.iter().map(|c| c.name).collect();
        let extra: Vec<String> = df
            .get_column_names()
            .into_iter()
            .filter(|name| !declared.contains(name) && !(geo && *name == GEOMETRY_COLUMN))
            .map(|name| name.to_string())
            .collect();
        for name in extra {
            warn!(file = self.spec.name, column = %name, "discarding extra column");
            df = df.drop(&name)?;
        }
        Ok(df)
    }

    pub fn write_dataframe(&self, df: DataFrame) -> Result<()> {
        if !self.spec.is_tabular() {
            return Err(self.schema_error("not a tabular artifact"));
        }
        let mut df = self.validate(df)?;
        self.create_parent_dirs()?;
        let file = File::create(&self.path)?;
        ParquetWriter::new(file).finish(&mut df)?;
        Ok(())
    }

    pub fn read_dataframe(&self) -> Result<DataFrame> {
        let file = File::open(&self.path)?;
        Ok(ParquetReader::new(file).finish()?)
    }

    pub fn write_text(&self, text: &str) -> Result<()> {
        self.create_parent_dirs()?;
        std::fs::write(&self.path, text)?;
        Ok(())
    }

    pub fn read_text(&self) -> Result<String> {
        Ok(std::fs::read_to_string(&self.path)?)
    }

    pub fn write_bytes(&self, bytes: &[u8]) -> Result<()> {
        self.create_parent_dirs()?;
        std::fs::write(&self.path, bytes)?;
        Ok(())
    }

    pub fn read_bytes(&self) -> Result<Vec<u8>> {
        Ok(std::fs::read(&self.path)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use once_cell::sync::Lazy;

    static TRIPS: Lazy<FileSpec> = Lazy::new(|| {
        FileSpec::dataframe("TestTrips", "demand/trips.parquet").with_schema(vec![
            Column::new("trip_id", MetroDataType::Id).unique().non_nullable(),
            Column::new("size", MetroDataType::Float),
        ])
    });

    static EDGES: Lazy<FileSpec> = Lazy::new(|| {
        FileSpec::geodataframe("TestEdges", "network/edges.geo.parquet").with_schema(vec![
            Column::new("edge_id", MetroDataType::Id).unique().non_nullable(),
        ])
    });

    fn frame(ids: &[i64], sizes: &[f64]) -> DataFrame {
        DataFrame::new(vec![
            Series::new("trip_id", ids.to_vec()),
            Series::new("size", sizes.to_vec()),
        ])
        .unwrap()
    }

    #[test]
    fn write_read_roundtrip_preserves_rows() {
        let dir = tempfile::tempdir().unwrap();
        let file = TRIPS.bind(dir.path());
        assert!(!file.exists());
        file.write_dataframe(frame(&[1, 2, 3], &[0.5, 1.5, 2.5])).unwrap();
        assert!(file.exists());
        assert!(file.last_modified().is_some());
        let df = file.read_dataframe().unwrap();
        assert_eq!(df.height(), 3);
        assert_eq!(df.get_column_names(), vec!["trip_id", "size"]);
    }

    #[test]
    fn uniqueness_violation_leaves_file_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let file = TRIPS.bind(dir.path());
        file.write_dataframe(frame(&[1, 2], &[0.5, 1.5])).unwrap();
        let before = file.last_modified();
        let err = file.write_dataframe(frame(&[7, 7], &[0.0, 0.0])).unwrap_err();
        assert!(matches!(err, MetroError::Schema { .. }));
        assert_eq!(file.last_modified(), before);
        assert_eq!(file.read_dataframe().unwrap().height(), 2);
    }

    #[test]
    fn extra_columns_are_dropped_with_a_warning() {
        let dir = tempfile::tempdir().unwrap();
        let file = TRIPS.bind(dir.path());
        let df = DataFrame::new(vec![
            Series::new("trip_id", vec![1i64]),
            Series::new("size", vec![1.0f64]),
            Series::new("junk", vec!["x"]),
        ])
        .unwrap();
        file.write_dataframe(df).unwrap();
        let back = file.read_dataframe().unwrap();
        assert!(back.column("junk").is_err());
    }

    #[test]
    fn geo_requires_and_preserves_the_geometry_column() {
        let dir = tempfile::tempdir().unwrap();
        let file = EDGES.bind(dir.path());
        let missing = DataFrame::new(vec![Series::new("edge_id", vec!["e1"])]).unwrap();
        assert!(file.write_dataframe(missing).is_err());
        let df = DataFrame::new(vec![
            Series::new("edge_id", vec!["e1"]),
            Series::new(GEOMETRY_COLUMN, vec!["LINESTRING(0 0, 1 0)"]),
        ])
        .unwrap();
        file.write_dataframe(df).unwrap();
        let back = file.read_dataframe().unwrap();
        assert!(back.column(GEOMETRY_COLUMN).is_ok());
    }

    #[test]
    fn max_rows_is_enforced() {
        static SMALL: Lazy<FileSpec> =
            Lazy::new(|| FileSpec::dataframe("TestSmall", "small.parquet").with_max_rows(1));
        let dir = tempfile::tempdir().unwrap();
        let file = SMALL.bind(dir.path());
        let df = DataFrame::new(vec![Series::new("x", vec![1i64, 2])]).unwrap();
        assert!(file.write_dataframe(df).is_err());
    }
}
