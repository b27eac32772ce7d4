//! Escenarios de planner + driver sobre un pipeline de juguete: cadena
//! lineal A → B → C de archivos de texto, una rama opcional y huérfanos.

use std::path::Path;

use indexmap::IndexMap;
use once_cell::sync::Lazy;

use metro_core::{
    build_plan, run_pipeline, Column, Config, FileSpec, InputSpec, MetroDataType, MetroError,
    Parameter, ParamValue, PipelineStep, StepContext,
};

static X: Lazy<FileSpec> = Lazy::new(|| FileSpec::text("XFile", "chain/x.txt"));
static Y: Lazy<FileSpec> = Lazy::new(|| FileSpec::text("YFile", "chain/y.txt"));
static Z: Lazy<FileSpec> = Lazy::new(|| FileSpec::text("ZFile", "chain/z.txt"));
// `BranchInput` ordena antes que `BranchOutput`: QStep corre primero y PStep
// registra el mtime de q en su primer sidecar.
static Q: Lazy<FileSpec> = Lazy::new(|| FileSpec::text("BranchInput", "branch/q.txt"));
static P_OUT: Lazy<FileSpec> = Lazy::new(|| FileSpec::text("BranchOutput", "branch/p.txt"));
static W: Lazy<FileSpec> = Lazy::new(|| FileSpec::text("WFile", "external/w.txt"));
static D_OUT: Lazy<FileSpec> = Lazy::new(|| FileSpec::text("DOutFile", "external/d.txt"));

struct AStep;
struct BStep;
struct CStep;

impl PipelineStep for AStep {
    fn name(&self) -> &'static str {
        "AStep"
    }
    fn parameters(&self) -> Vec<Parameter> {
        vec![Parameter::string("seed_text", "chain.seed_text")]
    }
    fn output_files(&self) -> IndexMap<&'static str, &'static FileSpec> {
        IndexMap::from([("x", &*X)])
    }
    fn is_defined(&self, ctx: &StepContext) -> bool {
        ctx.has_param("seed_text")
    }
    fn run(&self, ctx: &StepContext) -> metro_core::Result<()> {
        ctx.output("x").write_text(ctx.str_param("seed_text").unwrap_or("x"))
    }
}

impl PipelineStep for BStep {
    fn name(&self) -> &'static str {
        "BStep"
    }
    fn input_files(&self) -> IndexMap<&'static str, InputSpec> {
        IndexMap::from([("x", InputSpec::required(&*X))])
    }
    fn output_files(&self) -> IndexMap<&'static str, &'static FileSpec> {
        IndexMap::from([("y", &*Y)])
    }
    fn run(&self, ctx: &StepContext) -> metro_core::Result<()> {
        let x = ctx.input("x").read_text()?;
        ctx.output("y").write_text(&format!("{}+y", x))
    }
}

impl PipelineStep for CStep {
    fn name(&self) -> &'static str {
        "CStep"
    }
    fn input_files(&self) -> IndexMap<&'static str, InputSpec> {
        IndexMap::from([("y", InputSpec::required(&*Y))])
    }
    fn output_files(&self) -> IndexMap<&'static str, &'static FileSpec> {
        IndexMap::from([("z", &*Z)])
    }
    fn run(&self, ctx: &StepContext) -> metro_core::Result<()> {
        let y = ctx.input("y").read_text()?;
        ctx.output("z").write_text(&format!("{}+z", y))
    }
}

fn chain() -> Vec<Box<dyn PipelineStep>> {
    vec![Box::new(AStep), Box::new(BStep), Box::new(CStep)]
}

fn config(dir: &Path, raw: &str) -> Config {
    Config::from_table(raw.parse().unwrap(), dir.to_path_buf())
}

#[test]
fn empty_plan_when_no_step_is_defined() {
    let dir = tempfile::tempdir().unwrap();
    let plan = build_plan(&chain(), &config(dir.path(), "")).unwrap();
    assert!(plan.steps.is_empty());
    assert!(plan.orphans.is_empty());
    // Una segunda pasada es idéntica.
    let again = build_plan(&chain(), &config(dir.path(), "")).unwrap();
    assert!(again.steps.is_empty());
}

#[test]
fn linear_chain_runs_once_then_is_up_to_date() {
    let dir = tempfile::tempdir().unwrap();
    let steps = chain();
    let cfg = config(dir.path(), "[chain]\nseed_text = \"x\"\n");

    let plan = build_plan(&steps, &cfg).unwrap();
    let names: Vec<&str> = plan.steps.iter().map(|s| s.ctx.name()).collect();
    assert_eq!(names, vec!["AStep", "BStep", "CStep"]);
    assert_eq!(plan.to_run_count(), 3);

    run_pipeline(&steps, &cfg, false).unwrap();
    assert_eq!(Z.bind(dir.path()).read_text().unwrap(), "x+y+z");

    // Segunda invocación sin cambios: nada que correr.
    let plan = build_plan(&steps, &cfg).unwrap();
    assert_eq!(plan.to_run_count(), 0);
}

#[test]
fn touching_an_intermediate_artifact_propagates_downstream() {
    let dir = tempfile::tempdir().unwrap();
    let steps = chain();
    let cfg = config(dir.path(), "[chain]\nseed_text = \"x\"\n");
    run_pipeline(&steps, &cfg, false).unwrap();

    std::thread::sleep(std::time::Duration::from_millis(20));
    X.bind(dir.path()).write_text("x-touched").unwrap();

    let plan = build_plan(&steps, &cfg).unwrap();
    let by_name: std::collections::HashMap<&str, (bool, bool)> = plan
        .steps
        .iter()
        .map(|s| (s.ctx.name(), (s.outdated, s.to_run)))
        .collect();
    // A registró el mtime de su output x; B el de su input x: ambos outdated
    // directos. C sólo corre por la clausura transitiva.
    assert_eq!(by_name["AStep"], (true, true));
    assert_eq!(by_name["BStep"], (true, true));
    assert_eq!(by_name["CStep"], (false, true));
}

#[test]
fn failed_step_leaves_no_sidecar_and_reruns() {
    struct FailingStep;
    static F_OUT: Lazy<FileSpec> = Lazy::new(|| FileSpec::text("FOutFile", "fail/f.txt"));
    impl PipelineStep for FailingStep {
        fn name(&self) -> &'static str {
            "FailingStep"
        }
        fn output_files(&self) -> IndexMap<&'static str, &'static FileSpec> {
            IndexMap::from([("f", &*F_OUT)])
        }
        fn run(&self, _ctx: &StepContext) -> metro_core::Result<()> {
            Err(MetroError::Runtime("boom".to_string()))
        }
    }

    let dir = tempfile::tempdir().unwrap();
    let steps: Vec<Box<dyn PipelineStep>> = vec![Box::new(FailingStep)];
    let cfg = config(dir.path(), "");
    let err = run_pipeline(&steps, &cfg, false).unwrap_err();
    assert!(matches!(err, MetroError::Step { .. }));
    assert_eq!(err.exit_code(), 2);
    assert!(!dir.path().join("update_files/FailingStep.json").exists());

    // Sin sidecar, la siguiente invocación lo vuelve a seleccionar.
    let plan = build_plan(&steps, &cfg).unwrap();
    assert_eq!(plan.to_run_count(), 1);
}

// --- Rama opcional: la arista existe sólo cuando el flag está prendido ---

struct QStep;
struct PStep;

impl PipelineStep for QStep {
    fn name(&self) -> &'static str {
        "QStep"
    }
    fn output_files(&self) -> IndexMap<&'static str, &'static FileSpec> {
        IndexMap::from([("q", &*Q)])
    }
    fn run(&self, ctx: &StepContext) -> metro_core::Result<()> {
        ctx.output("q").write_text("q")
    }
}

fn with_enrichment(ctx: &StepContext) -> bool {
    ctx.bool_param("use_enrichment") == Some(true)
}

impl PipelineStep for PStep {
    fn name(&self) -> &'static str {
        "PStep"
    }
    fn parameters(&self) -> Vec<Parameter> {
        vec![Parameter::bool("use_enrichment", "branch.use_enrichment")
            .with_default(ParamValue::Bool(false))]
    }
    fn input_files(&self) -> IndexMap<&'static str, InputSpec> {
        IndexMap::from([("q", InputSpec::optional(&*Q).when(with_enrichment))])
    }
    fn output_files(&self) -> IndexMap<&'static str, &'static FileSpec> {
        IndexMap::from([("p", &*P_OUT)])
    }
    fn run(&self, ctx: &StepContext) -> metro_core::Result<()> {
        let enriched = with_enrichment(ctx) && ctx.input("q").exists();
        ctx.output("p").write_text(if enriched { "p-enriched" } else { "p" })
    }
}

#[test]
fn toggling_the_when_flag_changes_the_edge_and_reruns_once() {
    let dir = tempfile::tempdir().unwrap();
    let steps: Vec<Box<dyn PipelineStep>> = vec![Box::new(QStep), Box::new(PStep)];

    let off = config(dir.path(), "[branch]\nuse_enrichment = false\n");
    let plan = build_plan(&steps, &off).unwrap();
    assert!(!plan.graph_dot().contains("\"BranchInput\" -> \"BranchOutput\""));
    run_pipeline(&steps, &off, false).unwrap();
    assert_eq!(build_plan(&steps, &off).unwrap().to_run_count(), 0);

    // Prender el flag agrega la arista y cambia el config_hash de P.
    let on = config(dir.path(), "[branch]\nuse_enrichment = true\n");
    let plan = build_plan(&steps, &on).unwrap();
    assert!(plan.graph_dot().contains("\"BranchInput\" -> \"BranchOutput\""));
    let p = plan.steps.iter().find(|s| s.ctx.name() == "PStep").unwrap();
    assert!(p.outdated && p.to_run);
    run_pipeline(&steps, &on, false).unwrap();
    assert_eq!(P_OUT.bind(dir.path()).read_text().unwrap(), "p-enriched");

    // Exactamente una re-ejecución: la tercera pasada ya está al día.
    assert_eq!(build_plan(&steps, &on).unwrap().to_run_count(), 0);
}

// --- Factibilidad con inputs externos ---

struct DStep;

impl PipelineStep for DStep {
    fn name(&self) -> &'static str {
        "DStep"
    }
    fn input_files(&self) -> IndexMap<&'static str, InputSpec> {
        IndexMap::from([("w", InputSpec::required(&*W))])
    }
    fn output_files(&self) -> IndexMap<&'static str, &'static FileSpec> {
        IndexMap::from([("d", &*D_OUT)])
    }
    fn run(&self, ctx: &StepContext) -> metro_core::Result<()> {
        let w = ctx.input("w").read_text()?;
        ctx.output("d").write_text(&format!("{}+d", w))
    }
}

#[test]
fn step_with_missing_external_input_is_dropped_silently() {
    let dir = tempfile::tempdir().unwrap();
    let steps: Vec<Box<dyn PipelineStep>> = vec![Box::new(DStep)];
    let plan = build_plan(&steps, &config(dir.path(), "")).unwrap();
    assert!(plan.steps.is_empty());

    // Con el archivo externo presente, el step vuelve a ser factible.
    W.bind(dir.path()).write_text("w").unwrap();
    let plan = build_plan(&steps, &config(dir.path(), "")).unwrap();
    assert_eq!(plan.steps.len(), 1);
    assert!(plan.steps[0].to_run);
}

#[test]
fn duplicate_producers_abort_planning() {
    struct First;
    struct Second;
    static DUP: Lazy<FileSpec> = Lazy::new(|| FileSpec::text("DupFile", "dup.txt"));
    impl PipelineStep for First {
        fn name(&self) -> &'static str {
            "First"
        }
        fn output_files(&self) -> IndexMap<&'static str, &'static FileSpec> {
            IndexMap::from([("out", &*DUP)])
        }
        fn run(&self, _ctx: &StepContext) -> metro_core::Result<()> {
            Ok(())
        }
    }
    impl PipelineStep for Second {
        fn name(&self) -> &'static str {
            "Second"
        }
        fn output_files(&self) -> IndexMap<&'static str, &'static FileSpec> {
            IndexMap::from([("out", &*DUP)])
        }
        fn run(&self, _ctx: &StepContext) -> metro_core::Result<()> {
            Ok(())
        }
    }

    let dir = tempfile::tempdir().unwrap();
    let steps: Vec<Box<dyn PipelineStep>> = vec![Box::new(First), Box::new(Second)];
    let err = build_plan(&steps, &config(dir.path(), "")).unwrap_err();
    match err {
        MetroError::Plan(message) => {
            assert!(message.contains("First") && message.contains("Second"));
        }
        other => panic!("unexpected: {:?}", other),
    }
}

#[test]
fn removed_step_leaves_an_orphan_behind() {
    let dir = tempfile::tempdir().unwrap();
    let steps = chain();
    let cfg = config(dir.path(), "[chain]\nseed_text = \"x\"\n");
    run_pipeline(&steps, &cfg, false).unwrap();

    // Sin `seed_text`, A deja de estar definido: x queda huérfano y B y C se
    // vuelven infactibles... salvo que x siga en disco como input externo.
    let plan = build_plan(&steps, &config(dir.path(), "")).unwrap();
    let orphan_names: Vec<&str> =
        plan.orphans.iter().map(|orphan| orphan.spec().name).collect();
    assert_eq!(orphan_names, vec!["XFile"]);
}

#[test]
fn dataframe_schema_is_documented() {
    static DOCUMENTED: Lazy<FileSpec> = Lazy::new(|| {
        FileSpec::dataframe("DocFile", "doc.parquet")
            .with_description("A documented artifact.")
            .with_schema(vec![Column::new("id", MetroDataType::Id).unique().non_nullable()])
    });
    let doc = metro_core::doc::file_markdown(&DOCUMENTED);
    assert!(doc.contains("## DocFile"));
    assert!(doc.contains("`doc.parquet`"));
    assert!(doc.contains("| `id` |"));
}
