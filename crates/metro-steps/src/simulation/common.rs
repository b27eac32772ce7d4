//! Helpers compartidos por los steps que dependen de los modos simulados.

use metro_core::{Parameter, StepContext, Validator};

pub const MODES: [&str; 2] = ["car_driver", "public_transit"];

/// Descriptor compartido del parámetro `modes`: la lista de modos simulados.
pub fn modes_parameter() -> Parameter {
    Parameter::new(
        "modes",
        "modes.simulated",
        Validator::List {
            inner: Box::new(Validator::enumeration(&MODES)),
            length: None,
            min_length: Some(1),
            max_length: None,
        },
    )
    .with_description("List of the modes to simulate.")
    .with_example("`[\"car_driver\", \"public_transit\"]`")
}

/// Modos resueltos del step, si el parámetro `modes` está definido.
pub fn trip_modes(ctx: &StepContext) -> Option<Vec<String>> {
    let values = ctx.list_param("modes")?;
    Some(values.iter().filter_map(|v| v.as_str().map(str::to_string)).collect())
}

pub fn has_mode(ctx: &StepContext, mode: &str) -> bool {
    trip_modes(ctx).map(|modes| modes.iter().any(|m| m == mode)).unwrap_or(false)
}

/// Hay elección de modo cuando se simulan al menos dos modos.
pub fn has_mode_choice(ctx: &StepContext) -> bool {
    trip_modes(ctx).map(|modes| modes.len() >= 2).unwrap_or(false)
}
