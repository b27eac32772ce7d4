//! Driver de ejecución del pipeline.
//!
//! Recorre el orden que produjo el planner y ejecuta secuencialmente los
//! steps del subconjunto to-run. Garantías:
//! - si A produce X y B lo requiere, B arranca estrictamente después de que
//!   A terminó bien y su fingerprint quedó persistido;
//! - un fallo dentro de un `run` aborta el driver, decorado con el nombre del
//!   step; el fingerprint de un step fallido nunca se escribe;
//! - ningún step se reintenta automáticamente.
//!
//! En modo dry-run se imprime el plan coloreado por estado (verde = al día,
//! amarillo = corre por un upstream outdated, rojo en negrita = outdated
//! directo) y se vuelca el grafo del planner en DOT; no se escribe ningún
//! artifact ni sidecar.

use std::io::BufRead;

use colored::Colorize;
use tracing::{info, warn};

use crate::config::Config;
use crate::errors::{MetroError, Result};
use crate::plan::{build_plan, Plan};
use crate::step::PipelineStep;

/// Punto de entrada del motor: planifica y, según el modo, imprime o ejecuta.
pub fn run_pipeline(
    steps: &[Box<dyn PipelineStep>],
    config: &Config,
    dry_run: bool,
) -> Result<()> {
    let mut plan = build_plan(steps, config)?;
    if !plan.orphans.is_empty() {
        let mut message =
            String::from("The following file(s) are not used anymore and will be removed:");
        for orphan in &plan.orphans {
            message.push_str(&format!("\n- {}", orphan.path().display()));
        }
        warn!("{}", message);
        if !confirm("Continue? [y/N] ") {
            return Err(MetroError::Aborted);
        }
        for orphan in &plan.orphans {
            orphan.remove()?;
        }
        // El borrado cambia factibilidad y fingerprints: replanificar.
        plan = build_plan(steps, config)?;
    }
    if dry_run {
        print!("{}", render_dry_run(&plan));
        let dot_path = config.main_directory().join("plan.dot");
        if let Some(parent) = dot_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&dot_path, plan.graph_dot())?;
        info!("plan graph written to `{}`", dot_path.display());
        return Ok(());
    }
    execute(&plan)
}

fn execute(plan: &Plan<'_>) -> Result<()> {
    let total = plan.to_run_count();
    let mut current = 0;
    for planned in &plan.steps {
        if !planned.to_run {
            continue;
        }
        current += 1;
        info!("Step {}/{}: {}", current, total, planned.ctx.name());
        planned
            .step
            .run(&planned.ctx)
            .and_then(|()| planned.ctx.save_update_record())
            .map_err(|source| MetroError::Step {
                step: planned.ctx.name().to_string(),
                source: Box::new(source),
            })?;
    }
    Ok(())
}

/// Plan coloreado, una línea por step en orden de ejecución.
pub fn render_dry_run(plan: &Plan<'_>) -> String {
    let mut out = String::new();
    for (position, planned) in plan.steps.iter().enumerate() {
        let line = format!("{}. {}", position + 1, planned.ctx.name());
        let colored_line = if planned.outdated {
            line.red().bold()
        } else if planned.to_run {
            line.yellow()
        } else {
            line.green().strikethrough()
        };
        out.push_str(&format!("{}\n", colored_line));
    }
    out
}

fn confirm(prompt: &str) -> bool {
    eprint!("{}", prompt);
    let mut answer = String::new();
    if std::io::stdin().lock().read_line(&mut answer).is_err() {
        return false;
    }
    matches!(answer.trim(), "y" | "Y" | "yes" | "Yes")
}
