//! Síntesis de una red vial circular: radiales más anillos alrededor de un
//! centro (CBD).

use std::f64::consts::PI;

use indexmap::IndexMap;
use metro_core::{
    FileSpec, MetroError, ParamValue, Parameter, PipelineStep, Result, StepContext, Validator,
    GEOMETRY_COLUMN,
};
use polars::prelude::*;

use super::files::RAW_EDGES;

struct CircularEdge {
    edge_id: String,
    source: String,
    target: String,
    length: f64,
    road_type: String,
    geometry: String,
}

/// El radio es un número (anillos equiespaciados) o una lista con el radio de
/// cada anillo, en metros.
fn radius_validator(value: &toml::Value) -> std::result::Result<ParamValue, String> {
    match value {
        toml::Value::Integer(i) => Ok(ParamValue::Float(*i as f64)),
        toml::Value::Float(f) => Ok(ParamValue::Float(*f)),
        toml::Value::Array(items) => {
            let mut radii = Vec::with_capacity(items.len());
            for item in items {
                match item {
                    toml::Value::Integer(i) => radii.push(ParamValue::Float(*i as f64)),
                    toml::Value::Float(f) => radii.push(ParamValue::Float(*f)),
                    other => return Err(format!("invalid radius: {}", other)),
                }
            }
            Ok(ParamValue::List(radii))
        }
        other => Err(format!("invalid radius (number or list expected): {}", other)),
    }
}

fn direction_names(nb_radials: usize) -> Result<Vec<String>> {
    let names: Vec<String> = match nb_radials {
        0 | 1 => {
            return Err(MetroError::Runtime("the radial number must be at least 2".to_string()))
        }
        2 => vec!["E".to_string(), "W".to_string()],
        4 => ["E", "N", "W", "S"].iter().map(|d| d.to_string()).collect(),
        8 => ["E", "NE", "N", "NW", "W", "SW", "S", "SE"].iter().map(|d| d.to_string()).collect(),
        n => (1..=n).map(|i| format!("D{}", i)).collect(),
    };
    Ok(names)
}

fn wkt_linestring(points: &[(f64, f64)]) -> String {
    let coords: Vec<String> =
        points.iter().map(|(x, y)| format!("{} {}", x, y)).collect();
    format!("LINESTRING ({})", coords.join(", "))
}

/// Genera las aristas de la red circular: `nb_radials` corredores radiales
/// (ida y vuelta) y `nb_rings` anillos bidireccionales. `center_dist[i]` es la
/// distancia del anillo `i` al centro; las coordenadas se expresan en km.
fn generate_circular_edges(
    nb_radials: usize,
    center_dist: &[f64],
    resolution: usize,
) -> Result<Vec<CircularEdge>> {
    let nb_rings = center_dist.len() - 1;
    let directions = direction_names(nb_radials)?;
    let mut edges = Vec::new();

    // Aristas radiales.
    for ring in 1..=nb_rings {
        for (i, dir) in directions.iter().enumerate() {
            let outer = format!("{}-{}", dir, ring);
            let inner = if ring == 1 {
                "CBD".to_string()
            } else {
                format!("{}-{}", dir, ring - 1)
            };
            let start = center_dist[ring - 1];
            let end = center_dist[ring];
            let length = end - start;
            if length <= 0.0 {
                return Err(MetroError::Runtime(
                    "ring radii must be strictly increasing".to_string(),
                ));
            }
            let angle = 2.0 * PI * i as f64 / nb_radials as f64;
            let p1 = (start * angle.cos() / 1000.0, start * angle.sin() / 1000.0);
            let p2 = (end * angle.cos() / 1000.0, end * angle.sin() / 1000.0);
            edges.push(CircularEdge {
                edge_id: format!("In{}-{}", ring, dir),
                source: outer.clone(),
                target: inner.clone(),
                length,
                road_type: format!("Radial {}", ring),
                geometry: wkt_linestring(&[p2, p1]),
            });
            edges.push(CircularEdge {
                edge_id: format!("Out{}-{}", ring, dir),
                source: inner,
                target: outer,
                length,
                road_type: format!("Radial {}", ring),
                geometry: wkt_linestring(&[p1, p2]),
            });
        }
    }

    // Aristas de anillo, entre direcciones consecutivas.
    for ring in 1..=nb_rings {
        let radius = center_dist[ring];
        for i in 0..nb_radials {
            let j = (i + 1) % nb_radials;
            let right = format!("{}-{}", directions[i], ring);
            let left = format!("{}-{}", directions[j], ring);
            let start_angle = 2.0 * PI * i as f64 / nb_radials as f64;
            let end_angle = 2.0 * PI * (i + 1) as f64 / nb_radials as f64;
            let length = 2.0 * PI * radius / nb_radials as f64;
            let points: Vec<(f64, f64)> = (0..resolution)
                .map(|k| {
                    let t = k as f64 / (resolution - 1) as f64;
                    let angle = start_angle + t * (end_angle - start_angle);
                    (radius * angle.cos() / 1000.0, radius * angle.sin() / 1000.0)
                })
                .collect();
            let reversed: Vec<(f64, f64)> = points.iter().rev().copied().collect();
            edges.push(CircularEdge {
                edge_id: format!("{}-{}-{}", directions[i], directions[j], ring),
                source: right.clone(),
                target: left.clone(),
                length,
                road_type: format!("Ring {}", ring),
                geometry: wkt_linestring(&points),
            });
            edges.push(CircularEdge {
                edge_id: format!("{}-{}-{}", directions[j], directions[i], ring),
                source: left,
                target: right,
                length,
                road_type: format!("Ring {}", ring),
                geometry: wkt_linestring(&reversed),
            });
        }
    }
    Ok(edges)
}

/// Genera una red vial de juguete circular: un centro (CBD), `nb_radials`
/// corredores radiales y `nb_rings` anillos concéntricos. El radio puede ser
/// un escalar (anillos equiespaciados) o una lista por anillo.
pub struct CircularNetworkStep;

impl PipelineStep for CircularNetworkStep {
    fn name(&self) -> &'static str {
        "CircularNetworkStep"
    }

    fn parameters(&self) -> Vec<Parameter> {
        vec![
            Parameter::int("nb_radials", "circular_network.nb_radials")
                .with_description("Number of radial corridors."),
            Parameter::int("nb_rings", "circular_network.nb_rings")
                .with_description("Number of concentric ring roads."),
            Parameter::new(
                "radius",
                "circular_network.radius",
                Validator::Custom {
                    description: "number or list of numbers (one per ring)".to_string(),
                    validate: radius_validator,
                },
            )
            .with_description("Distance between two consecutive rings, in meters.")
            .with_note("A list gives the distance of each ring to the center."),
            Parameter::int("resolution", "circular_network.resolution")
                .with_default(ParamValue::Int(20))
                .with_description("Number of points used to draw each ring segment."),
            Parameter::float("speed_limit", "circular_network.speed_limit")
                .with_default(ParamValue::Float(50.0))
                .with_description("Speed limit on the edges, in km/h."),
        ]
    }

    fn output_files(&self) -> IndexMap<&'static str, &'static FileSpec> {
        IndexMap::from([("raw_edges", &*RAW_EDGES)])
    }

    fn is_defined(&self, ctx: &StepContext) -> bool {
        ctx.has_param("nb_radials") && ctx.has_param("nb_rings") && ctx.has_param("radius")
    }

    fn run(&self, ctx: &StepContext) -> Result<()> {
        let nb_radials = ctx.require("nb_radials")?.as_int().unwrap_or(0).max(0) as usize;
        let nb_rings = ctx.require("nb_rings")?.as_int().unwrap_or(0).max(0) as usize;
        let resolution = ctx.int_param("resolution").unwrap_or(20).max(2) as usize;
        let speed_limit = ctx.float_param("speed_limit").unwrap_or(50.0);
        let center_dist: Vec<f64> = match ctx.require("radius")? {
            ParamValue::Float(radius) => (0..=nb_rings).map(|i| i as f64 * radius).collect(),
            ParamValue::List(radii) => {
                if radii.len() != nb_rings {
                    return Err(MetroError::Runtime(
                        "the number of `radius` values must be equal to the number of rings"
                            .to_string(),
                    ));
                }
                let mut dist = vec![0.0];
                dist.extend(radii.iter().filter_map(ParamValue::as_float));
                dist
            }
            other => {
                return Err(MetroError::Runtime(format!("unexpected radius value: {:?}", other)))
            }
        };
        let edges = generate_circular_edges(nb_radials, &center_dist, resolution)?;
        let n = edges.len();
        let df = DataFrame::new(vec![
            Series::new("edge_id", edges.iter().map(|e| e.edge_id.as_str()).collect::<Vec<_>>()),
            Series::new("source", edges.iter().map(|e| e.source.as_str()).collect::<Vec<_>>()),
            Series::new("target", edges.iter().map(|e| e.target.as_str()).collect::<Vec<_>>()),
            Series::new(
                "road_type",
                edges.iter().map(|e| e.road_type.as_str()).collect::<Vec<_>>(),
            ),
            Series::new("length", edges.iter().map(|e| e.length).collect::<Vec<_>>()),
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
    fn radials_and_rings_both_ways() {
        // 2 aristas radiales y 2 de anillo por dirección y anillo.
        let edges = generate_circular_edges(4, &[0.0, 1000.0, 2000.0], 5).unwrap();
        assert_eq!(edges.len(), 4 * 4 * 2);
        assert!(edges.iter().any(|e| e.edge_id == "In1-E" && e.target == "CBD"));
        assert!(edges.iter().any(|e| e.edge_id == "Out2-N" && e.source == "N-1"));
        assert!(edges.iter().any(|e| e.edge_id == "E-N-1"));
    }

    #[test]
    fn ring_length_is_the_arc_length() {
        let edges = generate_circular_edges(4, &[0.0, 1000.0], 5).unwrap();
        let ring = edges.iter().find(|e| e.edge_id == "E-N-1").unwrap();
        assert!((ring.length - 2.0 * PI * 1000.0 / 4.0).abs() < 1e-9);
    }

    #[test]
    fn invalid_shapes_are_rejected() {
        assert!(generate_circular_edges(1, &[0.0, 1000.0], 5).is_err());
        assert!(generate_circular_edges(4, &[0.0, 1000.0, 500.0], 5).is_err());
    }
}
