//! Ruteo todos-contra-todos sobre la red vial (Dijkstra).

use std::collections::HashMap;

use indexmap::IndexMap;
use metro_core::{FileSpec, InputSpec, PipelineStep, Result, StepContext};
use petgraph::graph::{DiGraph, NodeIndex};
use polars::prelude::*;

use super::files::{ALL_DISTANCES, ALL_FREE_FLOW_TRAVEL_TIMES, RAW_EDGES};
use crate::frame::{duration_series_from_seconds, f64_column, opt_f64_column, str_column};

/// Límite de velocidad asumido cuando la red no declara la columna
/// `speed_limit`, en km/h.
const DEFAULT_SPEED_LIMIT: f64 = 50.0;

/// Distancias de camino mínimo desde cada nodo hacia todos los demás.
/// Devuelve filas `(origen, destino, peso)` ordenadas por origen y destino.
fn all_pairs_dijkstra(
    sources: &[String],
    targets: &[String],
    weights: &[f64],
) -> Vec<(String, String, f64)> {
    let mut graph: DiGraph<String, f64> = DiGraph::new();
    let mut index_of: HashMap<&str, NodeIndex> = HashMap::new();
    for node in sources.iter().chain(targets.iter()) {
        if !index_of.contains_key(node.as_str()) {
            let index = graph.add_node(node.clone());
            index_of.insert(node.as_str(), index);
        }
    }
    for ((source, target), weight) in sources.iter().zip(targets.iter()).zip(weights.iter()) {
        graph.add_edge(index_of[source.as_str()], index_of[target.as_str()], *weight);
    }
    let mut node_indices: Vec<NodeIndex> = graph.node_indices().collect();
    node_indices.sort_by(|a, b| graph[*a].cmp(&graph[*b]));
    let mut rows = Vec::new();
    for origin in &node_indices {
        let shortest = petgraph::algo::dijkstra(&graph, *origin, None, |edge| *edge.weight());
        let mut reached: Vec<(&String, f64)> =
            shortest.iter().map(|(index, weight)| (&graph[*index], *weight)).collect();
        reached.sort_by(|a, b| a.0.cmp(b.0));
        for (destination, weight) in reached {
            rows.push((graph[*origin].clone(), destination.clone(), weight));
        }
    }
    rows
}

fn edge_travel_times(edges: &DataFrame) -> Result<Vec<f64>> {
    let lengths = f64_column(edges, "length")?;
    let speeds: Vec<f64> = match edges.column("speed_limit") {
        Ok(_) => opt_f64_column(edges, "speed_limit")?
            .into_iter()
            .map(|speed| speed.unwrap_or(DEFAULT_SPEED_LIMIT))
            .collect(),
        Err(_) => vec![DEFAULT_SPEED_LIMIT; lengths.len()],
    };
    // length en metros, speed en km/h: tiempo en segundos.
    Ok(lengths.iter().zip(speeds.iter()).map(|(length, speed)| length / speed * 3.6).collect())
}

/// Tiempo de viaje a flujo libre para cada par de nodos.
pub struct AllFreeFlowTravelTimesStep;

impl PipelineStep for AllFreeFlowTravelTimesStep {
    fn name(&self) -> &'static str {
        "AllFreeFlowTravelTimesStep"
    }

    fn input_files(&self) -> IndexMap<&'static str, InputSpec> {
        IndexMap::from([("raw_edges", InputSpec::required(&*RAW_EDGES))])
    }

    fn output_files(&self) -> IndexMap<&'static str, &'static FileSpec> {
        IndexMap::from([("all_free_flow_travel_times", &*ALL_FREE_FLOW_TRAVEL_TIMES)])
    }

    fn run(&self, ctx: &StepContext) -> Result<()> {
        let edges = ctx.input("raw_edges").read_dataframe()?;
        let sources = str_column(&edges, "source")?;
        let targets = str_column(&edges, "target")?;
        let travel_times = edge_travel_times(&edges)?;
        let rows = all_pairs_dijkstra(&sources, &targets, &travel_times);
        let df = DataFrame::new(vec![
            Series::new("origin_id", rows.iter().map(|r| r.0.as_str()).collect::<Vec<_>>()),
            Series::new("destination_id", rows.iter().map(|r| r.1.as_str()).collect::<Vec<_>>()),
            duration_series_from_seconds(
                "free_flow_travel_time",
                &rows.iter().map(|r| r.2).collect::<Vec<_>>(),
            )?,
        ])?;
        ctx.output("all_free_flow_travel_times").write_dataframe(df)
    }
}

/// Distancia de camino mínimo para cada par de nodos.
pub struct AllDistancesStep;

impl PipelineStep for AllDistancesStep {
    fn name(&self) -> &'static str {
        "AllDistancesStep"
    }

    fn input_files(&self) -> IndexMap<&'static str, InputSpec> {
        IndexMap::from([("raw_edges", InputSpec::required(&*RAW_EDGES))])
    }

    fn output_files(&self) -> IndexMap<&'static str, &'static FileSpec> {
        IndexMap::from([("all_distances", &*ALL_DISTANCES)])
    }

    fn run(&self, ctx: &StepContext) -> Result<()> {
        let edges = ctx.input("raw_edges").read_dataframe()?;
        let sources = str_column(&edges, "source")?;
        let targets = str_column(&edges, "target")?;
        let lengths = f64_column(&edges, "length")?;
        let rows = all_pairs_dijkstra(&sources, &targets, &lengths);
        let df = DataFrame::new(vec![
            Series::new("origin_id", rows.iter().map(|r| r.0.as_str()).collect::<Vec<_>>()),
            Series::new("destination_id", rows.iter().map(|r| r.1.as_str()).collect::<Vec<_>>()),
            Series::new("distance", rows.iter().map(|r| r.2).collect::<Vec<_>>()),
        ])?;
        ctx.output("all_distances").write_dataframe(df)
    }
}
