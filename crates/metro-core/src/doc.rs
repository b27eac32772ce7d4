//! Generación de documentación Markdown de artifacts y steps.
//!
//! Recorre las declaraciones estáticas (esquemas de columnas, descriptores de
//! parámetros con sus `describe()`) y produce las tablas que se publican en la
//! documentación del proyecto.

use crate::file::{FileKind, FileSpec};
use crate::step::PipelineStep;

pub fn file_markdown(spec: &FileSpec) -> String {
    let mut doc = format!("## {}\n\n", spec.name);
    if !spec.description.is_empty() {
        doc.push_str(&format!("{}\n\n", spec.description));
    }
    doc.push_str(&format!("- **Path:** `{}`\n", spec.path));
    let kind = match spec.kind {
        FileKind::DataFrame => "DataFrame",
        FileKind::GeoDataFrame => "GeoDataFrame",
        FileKind::Text => "Text",
        FileKind::Plot => "Plot",
        FileKind::Opaque => "Opaque",
    };
    doc.push_str(&format!("- **Type:** {}\n", kind));
    if let Some(max_rows) = spec.max_rows {
        doc.push_str(&format!("- **Max rows:** {}\n", max_rows));
    }
    if !spec.schema.is_empty() {
        doc.push_str("- **Columns:**\n\n");
        doc.push_str("| Column | Data type | Optional? | Nullable? | Unique? | Description |\n");
        doc.push_str("| ------ | --------- | --------- | --------- | ------- | ----------- |\n");
        for column in &spec.schema {
            let marks: String = [column.optional, column.nullable, column.unique]
                .iter()
                .map(|b| if *b { "✓ | " } else { "✕ | " })
                .collect();
            doc.push_str(&format!(
                "| `{}` | {} | {}{} |\n",
                column.name, column.dtype, marks, column.description
            ));
        }
    }
    doc
}

pub fn step_markdown(step: &dyn PipelineStep) -> String {
    let mut doc = format!("## {}\n\n", step.name());
    let parameters = step.parameters();
    if !parameters.is_empty() {
        doc.push_str("### Parameters\n\n");
        for parameter in parameters {
            doc.push_str(&format!(
                "- `{}`: {}.",
                parameter.key,
                parameter.validator.describe()
            ));
            if !parameter.description.is_empty() {
                doc.push_str(&format!(" {}", parameter.description));
            }
            if !parameter.note.is_empty() {
                doc.push_str(&format!(" _Note: {}_", parameter.note));
            }
            if !parameter.example.is_empty() {
                doc.push_str(&format!(" Example: {}", parameter.example));
            }
            doc.push('\n');
        }
        doc.push('\n');
    }
    let inputs = step.input_files();
    if !inputs.is_empty() {
        doc.push_str("### Inputs\n\n");
        for (name, input) in inputs {
            let mut flags = Vec::new();
            if input.optional {
                flags.push("optional");
            }
            if input.when.is_some() {
                flags.push("conditional");
            }
            if flags.is_empty() {
                doc.push_str(&format!("- `{}`: {}\n", name, input.file.name));
            } else {
                doc.push_str(&format!(
                    "- `{}`: {} ({})\n",
                    name,
                    input.file.name,
                    flags.join(", ")
                ));
            }
        }
        doc.push('\n');
    }
    doc.push_str("### Outputs\n\n");
    for (name, spec) in step.output_files() {
        doc.push_str(&format!("- `{}`: {}\n", name, spec.name));
    }
    doc
}

/// Documento completo: todos los steps en el orden declarado, luego todos los
/// artifacts que referencian.
pub fn pipeline_markdown(steps: &[Box<dyn PipelineStep>]) -> String {
    let mut doc = String::from("# Steps\n\n");
    for step in steps {
        doc.push_str(&step_markdown(step.as_ref()));
        doc.push('\n');
    }
    doc.push_str("# Files\n\n");
    let mut seen = std::collections::HashSet::new();
    let mut specs: Vec<&FileSpec> = Vec::new();
    for step in steps {
        for (_, input) in step.input_files() {
            if seen.insert(input.file.name) {
                specs.push(input.file);
            }
        }
        for (_, spec) in step.output_files() {
            if seen.insert(spec.name) {
                specs.push(spec);
            }
        }
    }
    specs.sort_by_key(|spec| spec.name);
    for spec in specs {
        doc.push_str(&file_markdown(spec));
        doc.push('\n');
    }
    doc
}
