//! Escenarios end-to-end del binario `metropolis` sobre una simulación de
//! juguete: grilla 2×2, matriz OD gravitacional, dos modos y parámetros del
//! simulador.

use std::fs::File;
use std::path::Path;

use assert_cmd::Command;
use polars::prelude::*;

const BASE_CONFIG: &str = r#"
random_seed = 42
main_directory = "output"

[grid_network]
nb_rows = 2
nb_columns = 2
length = 100.0

[gravity_od_matrix]
exponential_decay = 0.1
trips_per_node = 5

[modes]
simulated = ["car_driver", "public_transit"]

[modes.car_driver]
constant = 1.5
alpha = { mean = 12.0, std = 3.0, distribution = "Lognormal" }

[modes.public_transit]
travel_time = { mean = 1800, std = 300, distribution = "Normal" }

[departure_time.linear_schedule]
tstar = { mean = 08:00:00, std = 1800, distribution = "Normal" }
beta = 6.0
gamma = 15.0

[simulation_parameters]
period = [06:00:00, 12:00:00]
recording_interval = 300
"#;

fn write_config(dir: &Path, contents: &str) -> std::path::PathBuf {
    let path = dir.join("config.toml");
    std::fs::write(&path, contents).unwrap();
    path
}

fn metropolis() -> Command {
    Command::cargo_bin("metropolis").unwrap()
}

fn read_parquet(path: &Path) -> DataFrame {
    ParquetReader::new(File::open(path).unwrap()).finish().unwrap()
}

#[test]
fn full_run_produces_the_simulation_inputs() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(dir.path(), BASE_CONFIG);

    let assert = metropolis().arg(&config).assert().success();
    let stderr = String::from_utf8_lossy(&assert.get_output().stderr).to_string();
    assert!(stderr.contains("Step 1/"), "no progress lines in: {}", stderr);

    let out = dir.path().join("output");
    for relative in [
        "network/road_network/edges_raw.geo.parquet",
        "network/road_network/all_free_flow_travel_times.parquet",
        "demand/population/car_driver_origins_destinations.parquet",
        "demand/population/trips.parquet",
        "demand/population/uniform_draws.parquet",
        "demand/population/tstars.parquet",
        "run/input/edges.parquet",
        "run/input/agents.parquet",
        "run/input/alts.parquet",
        "run/input/trips.parquet",
        "run/parameters.json",
        "update_files/GridNetworkStep.json",
        "update_files/WriteMetroTripsStep.json",
    ] {
        assert!(out.join(relative).exists(), "missing {}", relative);
    }

    // El archivo de parámetros es JSON válido con el período en segundos.
    let params: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(out.join("run/parameters.json")).unwrap())
            .unwrap();
    assert_eq!(params["period"], serde_json::json!([21600.0, 43200.0]));
    assert_eq!(params["road_network"]["algorithm_type"], serde_json::json!("Best"));

    // Los viajes del simulador tienen una fila por viaje y modo.
    let metro_trips = read_parquet(&out.join("run/input/trips.parquet"));
    let population_trips = read_parquet(&out.join("demand/population/trips.parquet"));
    assert_eq!(metro_trips.height(), 2 * population_trips.height());

    // Segunda invocación sin cambios: ningún step corre.
    let assert = metropolis().arg(&config).assert().success();
    let stderr = String::from_utf8_lossy(&assert.get_output().stderr).to_string();
    assert!(!stderr.contains("Step 1/"), "unexpected rerun: {}", stderr);
}

#[test]
fn dry_run_prints_the_plan_and_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(dir.path(), BASE_CONFIG);

    let assert = metropolis().arg(&config).arg("--dry-run").assert().success();
    let stdout = String::from_utf8_lossy(&assert.get_output().stdout).to_string();
    assert!(stdout.contains("GridNetworkStep"));
    assert!(stdout.contains("WriteMetroTripsStep"));
    // Los steps sin simulador configurado no aparecen.
    assert!(!stdout.contains("RunSimulationStep"));

    let out = dir.path().join("output");
    assert!(out.join("plan.dot").exists());
    assert!(!out.join("network/road_network/edges_raw.geo.parquet").exists());
    assert!(!out.join("update_files").exists());
}

#[test]
fn fixed_seed_reproduces_the_draws_and_a_new_seed_changes_them() {
    let dir_a = tempfile::tempdir().unwrap();
    let dir_b = tempfile::tempdir().unwrap();
    let dir_c = tempfile::tempdir().unwrap();
    for dir in [&dir_a, &dir_b] {
        let config = write_config(dir.path(), BASE_CONFIG);
        metropolis().arg(&config).assert().success();
    }
    let config_c =
        write_config(dir_c.path(), &BASE_CONFIG.replace("random_seed = 42", "random_seed = 43"));
    metropolis().arg(&config_c).assert().success();

    let draws = |dir: &tempfile::TempDir| {
        read_parquet(&dir.path().join("output/demand/population/uniform_draws.parquet"))
    };
    assert!(draws(&dir_a).frame_equal(&draws(&dir_b)));
    assert!(!draws(&dir_a).frame_equal(&draws(&dir_c)));
}

#[test]
fn changing_the_seed_marks_the_random_steps_outdated() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(dir.path(), BASE_CONFIG);
    metropolis().arg(&config).assert().success();

    let config = write_config(
        dir.path(),
        &BASE_CONFIG.replace("random_seed = 42", "random_seed = 43"),
    );
    let assert = metropolis().arg(&config).assert().success();
    let stderr = String::from_utf8_lossy(&assert.get_output().stderr).to_string();
    assert!(stderr.contains("UniformDrawsStep"), "draws not rerun: {}", stderr);
}

#[test]
fn orphan_refusal_aborts_with_130_and_keeps_the_file() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(dir.path(), BASE_CONFIG);
    metropolis().arg(&config).assert().success();

    // Sin la grilla, las aristas crudas quedan huérfanas.
    let without_grid: String = BASE_CONFIG
        .lines()
        .filter(|line| {
            !line.starts_with("[grid_network]")
                && !line.starts_with("nb_rows")
                && !line.starts_with("nb_columns")
                && !line.starts_with("length")
        })
        .collect::<Vec<_>>()
        .join("\n");
    let config = write_config(dir.path(), &without_grid);
    metropolis().arg(&config).write_stdin("n\n").assert().code(130);
    assert!(dir
        .path()
        .join("output/network/road_network/edges_raw.geo.parquet")
        .exists());
}

#[test]
fn orphan_acceptance_removes_exactly_that_file() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(dir.path(), BASE_CONFIG);
    metropolis().arg(&config).assert().success();

    // Sin tstar, el step de horarios deseados deja de estar definido y su
    // output pasa a ser huérfano.
    let without_tstar = BASE_CONFIG.replace(
        "tstar = { mean = 08:00:00, std = 1800, distribution = \"Normal\" }\n",
        "",
    );
    let config = write_config(dir.path(), &without_tstar);
    metropolis().arg(&config).write_stdin("y\n").assert().success();
    assert!(!dir.path().join("output/demand/population/tstars.parquet").exists());
    // El resto de los artifacts sigue en su lugar.
    assert!(dir.path().join("output/demand/population/trips.parquet").exists());
}

#[cfg(unix)]
#[test]
fn failing_simulator_aborts_with_2_and_writes_no_sidecar() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempfile::tempdir().unwrap();
    let fake = dir.path().join("metropolis_cli.sh");
    std::fs::write(&fake, "#!/bin/sh\nexit 1\n").unwrap();
    std::fs::set_permissions(&fake, std::fs::Permissions::from_mode(0o755)).unwrap();

    let config_with_exec = format!(
        "{}\n[metropolis_core]\nexec_path = \"{}\"\n",
        BASE_CONFIG,
        fake.display()
    );
    let config = write_config(dir.path(), &config_with_exec);
    metropolis().arg(&config).assert().code(2);
    assert!(!dir.path().join("output/update_files/RunSimulationStep.json").exists());

    // La siguiente invocación vuelve a seleccionar el step.
    let assert = metropolis().arg(&config).assert().code(2);
    let stderr = String::from_utf8_lossy(&assert.get_output().stderr).to_string();
    assert!(stderr.contains("RunSimulationStep"));
}

#[test]
fn configuration_errors_exit_with_1_and_name_the_key() {
    let dir = tempfile::tempdir().unwrap();
    let broken = BASE_CONFIG.replace("nb_rows = 2", "nb_rows = \"two\"");
    let config = write_config(dir.path(), &broken);
    let assert = metropolis().arg(&config).assert().code(1);
    let stderr = String::from_utf8_lossy(&assert.get_output().stderr).to_string();
    assert!(stderr.contains("grid_network.nb_rows"), "key missing in: {}", stderr);
}
