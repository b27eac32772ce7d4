//! Síntesis de una red vial de juguete en grilla.

use indexmap::IndexMap;
use metro_core::{
    FileSpec, MetroError, ParamValue, Parameter, PipelineStep, Result, StepContext,
    GEOMETRY_COLUMN,
};
use polars::prelude::*;

use super::files::RAW_EDGES;

struct GridEdge {
    edge_id: String,
    source: String,
    target: String,
    road_type: &'static str,
    geometry: String,
}

fn line(x1: usize, y1: usize, x2: usize, y2: usize) -> String {
    format!("LINESTRING ({} {}, {} {})", x1, y1, x2, y2)
}

/// Genera las aristas de la grilla. El primer nodo queda abajo a la
/// izquierda, en (0, 0); el nodo de la columna i y fila j, en (i, j). Los ids
/// de nodo son `Node_{x}_{y}`; los de arista, `Row_{y}:{x1}to{x2}` y
/// `Col_{x}:{y1}to{y2}`; los road types, la dirección de la arista.
fn generate_grid_edges(
    nb_rows: usize,
    nb_columns: usize,
    left_to_right: bool,
    right_to_left: bool,
    bottom_to_top: bool,
    top_to_bottom: bool,
) -> Result<Vec<GridEdge>> {
    if nb_rows == 0 {
        return Err(MetroError::Runtime("grid network must have at least 1 row".to_string()));
    }
    if nb_columns == 0 {
        return Err(MetroError::Runtime("grid network must have at least 1 column".to_string()));
    }
    if nb_columns == 1 && nb_rows == 1 {
        return Err(MetroError::Runtime(
            "grid network cannot have only 1 row and 1 column".to_string(),
        ));
    }
    if nb_columns > 1 && !left_to_right && !right_to_left {
        return Err(MetroError::Runtime(
            "at least one of `left_to_right` and `right_to_left` must be `true`".to_string(),
        ));
    }
    if nb_rows > 1 && !bottom_to_top && !top_to_bottom {
        return Err(MetroError::Runtime(
            "at least one of `bottom_to_top` and `top_to_bottom` must be `true`".to_string(),
        ));
    }
    let mut edges = Vec::new();
    // Aristas horizontales.
    for y in 0..nb_rows {
        for x in 0..nb_columns.saturating_sub(1) {
            let source = format!("Node_{}_{}", x, y);
            let target = format!("Node_{}_{}", x + 1, y);
            if left_to_right {
                edges.push(GridEdge {
                    edge_id: format!("Row_{}:{}to{}", y, x, x + 1),
                    source: source.clone(),
                    target: target.clone(),
                    road_type: "LeftToRight",
                    geometry: line(x, y, x + 1, y),
                });
            }
            if right_to_left {
                edges.push(GridEdge {
                    edge_id: format!("Row_{}:{}to{}", y, x + 1, x),
                    source: target,
                    target: source,
                    road_type: "RightToLeft",
                    geometry: line(x + 1, y, x, y),
                });
            }
        }
    }
    // Aristas verticales.
    for x in 0..nb_columns {
        for y in 0..nb_rows.saturating_sub(1) {
            let source = format!("Node_{}_{}", x, y);
            let target = format!("Node_{}_{}", x, y + 1);
            if bottom_to_top {
                edges.push(GridEdge {
                    edge_id: format!("Col_{}:{}to{}", x, y, y + 1),
                    source: source.clone(),
                    target: target.clone(),
                    road_type: "BottomToTop",
                    geometry: line(x, y, x, y + 1),
                });
            }
            if top_to_bottom {
                edges.push(GridEdge {
                    edge_id: format!("Col_{}:{}to{}", x, y + 1, y),
                    source: target,
                    target: source,
                    road_type: "TopToBottom",
                    geometry: line(x, y + 1, x, y),
                });
            }
        }
    }
    Ok(edges)
}

/// Genera una red vial de juguete a partir de una grilla de
/// `nb_rows × nb_columns` nodos. Por defecto las aristas son bidireccionales
/// entre nodos adyacentes; los cuatro flags de dirección permiten apagar cada
/// sentido. Todas las aristas miden `length` metros y llevan el límite de
/// velocidad `speed_limit`.
pub struct GridNetworkStep;

impl PipelineStep for GridNetworkStep {
    fn name(&self) -> &'static str {
        "GridNetworkStep"
    }

    fn parameters(&self) -> Vec<Parameter> {
        vec![
            Parameter::int("nb_rows", "grid_network.nb_rows")
                .with_description("Number of rows (i.e., number of nodes on each column)."),
            Parameter::int("nb_columns", "grid_network.nb_columns")
                .with_description("Number of columns (i.e., number of nodes on each row)."),
            Parameter::float("length", "grid_network.length")
                .with_description("Length of an edge, in meters."),
            Parameter::float("speed_limit", "grid_network.speed_limit")
                .with_default(ParamValue::Float(50.0))
                .with_description("Speed limit on the edges, in km/h."),
            Parameter::bool("left_to_right", "grid_network.left_to_right")
                .with_default(ParamValue::Bool(true))
                .with_description("Whether edges going from left to right should be generated."),
            Parameter::bool("right_to_left", "grid_network.right_to_left")
                .with_default(ParamValue::Bool(true))
                .with_description("Whether edges going from right to left should be generated."),
            Parameter::bool("bottom_to_top", "grid_network.bottom_to_top")
                .with_default(ParamValue::Bool(true))
                .with_description("Whether edges going from bottom to top should be generated."),
            Parameter::bool("top_to_bottom", "grid_network.top_to_bottom")
                .with_default(ParamValue::Bool(true))
                .with_description("Whether edges going from top to bottom should be generated."),
        ]
    }

    fn output_files(&self) -> IndexMap<&'static str, &'static FileSpec> {
        IndexMap::from([("raw_edges", &*RAW_EDGES)])
    }

    fn is_defined(&self, ctx: &StepContext) -> bool {
        ctx.has_param("nb_rows") && ctx.has_param("nb_columns") && ctx.has_param("length")
    }

    fn run(&self, ctx: &StepContext) -> Result<()> {
        let nb_rows = ctx.require("nb_rows")?.as_int().unwrap_or(0).max(0) as usize;
        let nb_columns = ctx.require("nb_columns")?.as_int().unwrap_or(0).max(0) as usize;
        let length = ctx.require("length")?.as_float().unwrap_or(0.0);
        let speed_limit = ctx.float_param("speed_limit").unwrap_or(50.0);
        let edges = generate_grid_edges(
            nb_rows,
            nb_columns,
            ctx.bool_param("left_to_right").unwrap_or(true),
            ctx.bool_param("right_to_left").unwrap_or(true),
            ctx.bool_param("bottom_to_top").unwrap_or(true),
            ctx.bool_param("top_to_bottom").unwrap_or(true),
        )?;
        let n = edges.len();
        let df = DataFrame::new(vec![
            Series::new("edge_id", edges.iter().map(|e| e.edge_id.as_str()).collect::<Vec<_>>()),
            Series::new("source", edges.iter().map(|e| e.source.as_str()).collect::<Vec<_>>()),
            Series::new("target", edges.iter().map(|e| e.target.as_str()).collect::<Vec<_>>()),
            Series::new("road_type", edges.iter().map(|e| e.road_type).collect::<Vec<_>>()),
            Series::new("length", vec![length; n]),
            Series::new("speed_limit", vec![speed_limit; n]),
            Series::new(
                GEOMETRY_COLUMN,
                edges.iter().map(|e| e.geometry.as_str()).collect::<Vec<_>>(),
            ),
        ])?;
        ctx.output("raw_edges").write_dataframe(df)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bidirectional_grid_has_the_expected_edge_count() {
        // 2 * nb_columns * (nb_rows - 1) + 2 * nb_rows * (nb_columns - 1)
        let edges = generate_grid_edges(3, 4, true, true, true, true).unwrap();
        assert_eq!(edges.len(), 2 * 4 * 2 + 2 * 3 * 3);
    }

    #[test]
    fn single_row_one_way_is_a_line_of_roads() {
        let edges = generate_grid_edges(1, 4, true, false, true, true).unwrap();
        assert_eq!(edges.len(), 3);
        assert_eq!(edges[0].edge_id, "Row_0:0to1");
        assert_eq!(edges[0].source, "Node_0_0");
        assert_eq!(edges[0].target, "Node_1_0");
        assert_eq!(edges[0].geometry, "LINESTRING (0 0, 1 0)");
    }

    #[test]
    fn degenerate_grids_are_rejected() {
        assert!(generate_grid_edges(1, 1, true, true, true, true).is_err());
        assert!(generate_grid_edges(2, 2, false, false, true, true).is_err());
        assert!(generate_grid_edges(0, 4, true, true, true, true).is_err());
    }
}
