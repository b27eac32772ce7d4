//! Planner: del conjunto de steps declarados y la configuración activa a un
//! orden de ejecución factible.
//!
//! El grafo es bipartito en espíritu (artifacts ↔ steps) pero se materializa
//! sobre nodos artifact: cada arista `input → output` lleva como etiqueta el
//! step productor y el flag `optional`. Un nodo centinela `Nothing` representa
//! la ausencia de prerequisitos: los steps sin inputs requeridos cuelgan sus
//! outputs de él.
//!
//! Etapas (deterministas, single-thread):
//! 1. instanciar cada clase de step y quedarse con las definidas;
//! 2. chequear colisiones de productor (un artifact, a lo sumo un productor);
//! 3. construir el grafo;
//! 4. factibilidad: un artifact es factible si todo ancestro por aristas
//!    requeridas remonta a `Nothing` (o a un archivo externo ya existente);
//!    los steps con outputs infactibles se descartan en silencio;
//! 5. detectar huérfanos (outputs de steps ya no definidos que siguen en
//!    disco);
//! 6. orden topológico lexicográfico por nombre de artifact, y de ahí el
//!    orden de steps;
//! 7. consultar el fingerprint de cada step (outdated);
//! 8. clausura transitiva hacia abajo: todo step aguas abajo de un outdated
//!    se marca to-run.

use std::collections::{BTreeSet, HashMap, HashSet};

use petgraph::graphmap::DiGraphMap;
use petgraph::Direction;

use crate::config::Config;
use crate::errors::{MetroError, Result};
use crate::file::{FileSpec, MetroFile};
use crate::step::{PipelineStep, StepContext};

/// Nodo centinela sin prerequisitos.
const NOTHING: &str = "Nothing";

#[derive(Debug, Clone, Copy)]
struct EdgeMeta {
    step: usize,
    optional: bool,
}

/// Step planificado, en orden de ejecución.
pub struct PlannedStep<'a> {
    pub step: &'a dyn PipelineStep,
    pub ctx: StepContext,
    /// Su fingerprint difiere del sidecar (debe correr por sí mismo).
    pub outdated: bool,
    /// Debe correr, sea por estar outdated o por estar aguas abajo de uno.
    pub to_run: bool,
}

/// Resultado del planner: orden de steps, subconjunto to-run y huérfanos.
pub struct Plan<'a> {
    pub steps: Vec<PlannedStep<'a>>,
    pub orphans: Vec<MetroFile>,
    dot: String,
}

impl<'a> Plan<'a> {
    /// Cantidad de steps que efectivamente van a correr.
    pub fn to_run_count(&self) -> usize {
        self.steps.iter().filter(|s| s.to_run).count()
    }

    /// Render DOT del subgrafo factible (artifacts y centinela).
    pub fn graph_dot(&self) -> &str {
        &self.dot
    }
}

pub fn build_plan<'a>(
    steps: &'a [Box<dyn PipelineStep>],
    config: &Config,
) -> Result<Plan<'a>> {
    // 1. Instanciar todas las clases; separar las definidas.
    let mut contexts: Vec<Option<StepContext>> = Vec::with_capacity(steps.len());
    let mut defined: Vec<usize> = Vec::new();
    for (index, step) in steps.iter().enumerate() {
        let ctx = StepContext::bind(step.as_ref(), config)?;
        if step.is_defined(&ctx) {
            defined.push(index);
        }
        contexts.push(Some(ctx));
    }

    // Todas las clases de artifact referenciadas como output por cualquier
    // step (definido o no): universo del detector de huérfanos.
    let mut all_outputs: HashMap<&'static str, &'static FileSpec> = HashMap::new();
    for step in steps {
        for (_, spec) in step.output_files() {
            all_outputs.insert(spec.name, spec);
        }
    }

    // 2. Colisiones de productor.
    let mut producer_of: HashMap<&'static str, usize> = HashMap::new();
    for &index in &defined {
        for (_, spec) in steps[index].output_files() {
            if let Some(&other) = producer_of.get(spec.name) {
                return Err(MetroError::Plan(format!(
                    "artifact `{}` is produced by two defined steps: `{}` and `{}`",
                    spec.name,
                    steps[other].name(),
                    steps[index].name(),
                )));
            }
            producer_of.insert(spec.name, index);
        }
    }

    // 3. Grafo artifact → artifact etiquetado por step productor.
    let mut graph: DiGraphMap<&'static str, EdgeMeta> = DiGraphMap::new();
    let mut specs: HashMap<&'static str, &'static FileSpec> = all_outputs.clone();
    graph.add_node(NOTHING);
    for &index in &defined {
        let ctx = match contexts[index].as_ref() {
            Some(ctx) => ctx,
            None => continue,
        };
        let inputs = steps[index].input_files();
        let mut required: Vec<&'static str> = Vec::new();
        let mut optional: Vec<&'static str> = Vec::new();
        for (_, input) in &inputs {
            // La arista existe sólo cuando el predicado `when` vale.
            let present = input.when.map(|predicate| predicate(ctx)).unwrap_or(true);
            if !present {
                continue;
            }
            specs.insert(input.file.name, input.file);
            if input.optional {
                optional.push(input.file.name);
            } else {
                required.push(input.file.name);
            }
        }
        for (_, output) in steps[index].output_files() {
            if required.is_empty() {
                graph.add_edge(NOTHING, output.name, EdgeMeta { step: index, optional: false });
            } else {
                for &input in &required {
                    graph.add_edge(input, output.name, EdgeMeta { step: index, optional: false });
                }
            }
            for &input in &optional {
                graph.add_edge(input, output.name, EdgeMeta { step: index, optional: true });
            }
        }
    }

    // 5. Huérfanos: en disco pero ya sin productor definido.
    let defined_outputs: HashSet<&'static str> = producer_of.keys().copied().collect();
    let mut orphans: Vec<MetroFile> = Vec::new();
    let mut orphan_names: Vec<&'static str> = all_outputs
        .keys()
        .filter(|name| !defined_outputs.contains(*name))
        .copied()
        .collect();
    orphan_names.sort_unstable();
    for name in orphan_names {
        let file = all_outputs[name].bind(config.main_directory());
        if file.exists() {
            orphans.push(file);
        }
    }

    // 4. Factibilidad sobre el subgrafo de aristas requeridas.
    let degree_zero: HashSet<&'static str> = graph
        .nodes()
        .filter(|&n| graph.neighbors_directed(n, Direction::Incoming).next().is_none())
        .collect();
    let feasible_root = |node: &'static str| -> bool {
        node == NOTHING
            || specs
                .get(node)
                .map(|spec| spec.bind(config.main_directory()).exists())
                .unwrap_or(false)
    };
    let mut feasible: HashSet<&'static str> = HashSet::new();
    feasible.insert(NOTHING);
    for node in graph.nodes() {
        if node == NOTHING {
            continue;
        }
        // Ancestros por aristas requeridas (BFS inverso).
        let mut seen: HashSet<&'static str> = HashSet::new();
        let mut stack = vec![node];
        while let Some(current) = stack.pop() {
            for predecessor in graph.neighbors_directed(current, Direction::Incoming) {
                let meta = graph
                    .edge_weight(predecessor, current)
                    .copied()
                    .unwrap_or(EdgeMeta { step: usize::MAX, optional: true });
                if meta.optional {
                    continue;
                }
                if seen.insert(predecessor) {
                    stack.push(predecessor);
                }
            }
        }
        let roots: Vec<&'static str> = if seen.is_empty() {
            vec![node]
        } else {
            seen.intersection(&degree_zero).copied().collect()
        };
        if !roots.is_empty() && roots.iter().all(|&root| feasible_root(root)) {
            feasible.insert(node);
        }
    }

    // Un step con algún output infactible se descarta entero (y en silencio).
    let feasible_step_set: HashSet<usize> = defined
        .iter()
        .copied()
        .filter(|&index| {
            steps[index].output_files().iter().all(|(_, spec)| feasible.contains(spec.name))
        })
        .collect();

    // 6. Orden topológico lexicográfico del subgrafo factible.
    let file_order = lexicographic_topo_order(&graph, &feasible)?;
    let mut step_order: Vec<usize> = Vec::new();
    let mut ordered: HashSet<usize> = HashSet::new();
    for &file in &file_order {
        for predecessor in graph.neighbors_directed(file, Direction::Incoming) {
            if !feasible.contains(predecessor) {
                continue;
            }
            if let Some(meta) = graph.edge_weight(predecessor, file) {
                if feasible_step_set.contains(&meta.step) && ordered.insert(meta.step) {
                    step_order.push(meta.step);
                }
            }
        }
    }

    // Render DOT antes de mover los contexts.
    let dot = render_dot(&graph, &feasible);

    // 7–8. Outdated directo y clausura hacia abajo.
    let mut planned: Vec<PlannedStep<'a>> = Vec::new();
    let mut to_run_set: HashSet<usize> = HashSet::new();
    for &index in &step_order {
        let ctx = match contexts[index].take() {
            Some(ctx) => ctx,
            None => continue,
        };
        let outdated = ctx.update_required();
        // Predecesores: productores de los inputs presentes en el subgrafo.
        let mut upstream_to_run = false;
        'edges: for (u, v, meta) in graph.all_edges() {
            if meta.step != index {
                continue;
            }
            if !feasible.contains(u) || !feasible.contains(v) {
                continue;
            }
            for pred_edge in graph.edges_directed(u, Direction::Incoming) {
                let producer = pred_edge.2.step;
                if to_run_set.contains(&producer) {
                    upstream_to_run = true;
                    break 'edges;
                }
            }
        }
        let to_run = outdated || upstream_to_run;
        if to_run {
            to_run_set.insert(index);
        }
        planned.push(PlannedStep { step: steps[index].as_ref(), ctx, outdated, to_run });
    }

    Ok(Plan { steps: planned, orphans, dot })
}

/// Kahn con desempate lexicográfico por nombre de artifact, restringido al
/// conjunto factible. Un ciclo es un error de planificación.
fn lexicographic_topo_order<'g>(
    graph: &DiGraphMap<&'g str, EdgeMeta>,
    feasible: &HashSet<&'g str>,
) -> Result<Vec<&'g str>> {
    let mut in_degree: HashMap<&str, usize> = HashMap::new();
    for node in graph.nodes().filter(|n| feasible.contains(n)) {
        let degree = graph
            .neighbors_directed(node, Direction::Incoming)
            .filter(|p| feasible.contains(p))
            .count();
        in_degree.insert(node, degree);
    }
    // BTreeSet como cola de prioridad lexicográfica.
    let mut ready: BTreeSet<&str> = in_degree
        .iter()
        .filter(|(_, &degree)| degree == 0)
        .map(|(&node, _)| node)
        .collect();
    let mut order: Vec<&str> = Vec::new();
    while let Some(&node) = ready.iter().next() {
        ready.remove(node);
        order.push(node);
        for successor in graph.neighbors_directed(node, Direction::Outgoing) {
            if let Some(degree) = in_degree.get_mut(successor) {
                *degree -= 1;
                if *degree == 0 {
                    ready.insert(successor);
                }
            }
        }
    }
    if order.len() != in_degree.len() {
        return Err(MetroError::Plan("dependency cycle between artifacts".to_string()));
    }
    Ok(order)
}

fn render_dot(graph: &DiGraphMap<&str, EdgeMeta>, feasible: &HashSet<&str>) -> String {
    let mut out = String::from("digraph plan {\n");
    let mut nodes: Vec<&str> = graph.nodes().filter(|n| feasible.contains(n)).collect();
    nodes.sort_unstable();
    for node in &nodes {
        out.push_str(&format!("    \"{}\";\n", node));
    }
    let mut edges: Vec<(&str, &str, bool)> = graph
        .all_edges()
        .filter(|(u, v, _)| feasible.contains(u) && feasible.contains(v))
        .map(|(u, v, meta)| (u, v, meta.optional))
        .collect();
    edges.sort_unstable();
    for (u, v, optional) in edges {
        if optional {
            out.push_str(&format!("    \"{}\" -> \"{}\" [style=dashed];\n", u, v));
        } else {
            out.push_str(&format!("    \"{}\" -> \"{}\";\n", u, v));
        }
    }
    out.push_str("}\n");
    out
}
