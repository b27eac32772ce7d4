//! metro-steps: los steps de dominio del pipeline de simulación de
//! transporte, construidos sobre los contratos neutrales de `metro-core`.
//!
//! Módulos:
//! - `road_network`: síntesis de la red vial de juguete, capacidades y
//!   ruteo todos-contra-todos.
//! - `od_matrix`: generación de pares origen-destino (gravitacional y por
//!   par de nodos).
//! - `population`: síntesis de población y draws uniformes.
//! - `modes`: preferencias por modo (auto, transporte público).
//! - `departure_time`: preferencias de horario (tstar, schedule lineal).
//! - `simulation`: conversión de insumos, parámetros y ejecución del
//!   simulador externo.
//! - `results`: post-procesamiento de resultados.
//! - `registry`: la lista ordenada de clases de step que consume el CLI.

pub mod departure_time;
mod frame;
pub mod modes;
pub mod od_matrix;
pub mod population;
pub mod registry;
pub mod results;
pub mod road_network;
pub mod simulation;

pub use registry::all_steps;
