use clap::{Parser, Subcommand, ValueEnum};
use duet_cp::CpModel;
use duet_expr::VarId;
use duet_lp::{LinearBackend, LinearModel};
use duet_solver::{SolverConfig, Status};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::{File, create_dir_all};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::{Instant, SystemTime, UNIX_EPOCH};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

const SCHEMA_VERSION: u32 = 1;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Duet scenario runner for the discrete and linear engines"
)]
struct Cli {
    /// Log filter for diagnostics on stderr (for example, `debug` or `duet_cp=trace`)
    #[arg(long, global = true, default_value = "off")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Solve generated scenarios and print the results
    Run(RunArgs),
    /// Render a saved JSONL artifact
    Report(ReportArgs),
    /// List linear backends and whether they are compiled in
    Backends(BackendsArgs),
}

#[derive(Parser, Debug)]
struct RunArgs {
    /// Scenarios to execute
    #[arg(
        long = "scenario",
        value_enum,
        value_delimiter = ',',
        default_value = "queens,knapsack,transport"
    )]
    scenarios: Vec<Scenario>,

    /// Problem size (board width, item count, or sources per side)
    #[arg(long, default_value_t = 8)]
    size: usize,

    /// Wall-clock limit per solve in seconds; zero means unlimited
    #[arg(long, default_value_t = 10.0)]
    time_limit: f64,

    /// Number of repetitions per scenario and engine
    #[arg(long, default_value_t = 1)]
    repetitions: u32,

    /// Optional JSONL output artifact path
    #[arg(long)]
    output: Option<PathBuf>,

    /// Output format for stdout
    #[arg(long, value_enum, default_value = "table")]
    format: OutputFormat,
}

#[derive(Parser, Debug)]
struct ReportArgs {
    /// Input JSONL artifact
    #[arg(long)]
    input: PathBuf,

    /// Output format for stdout
    #[arg(long, value_enum, default_value = "table")]
    format: OutputFormat,
}

#[derive(Parser, Debug)]
struct BackendsArgs {
    /// Output format for stdout
    #[arg(long, value_enum, default_value = "table")]
    format: OutputFormat,
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
    Ndjson,
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, ValueEnum)]
enum Scenario {
    Queens,
    Knapsack,
    Transport,
}

impl Scenario {
    fn as_str(self) -> &'static str {
        match self {
            Scenario::Queens => "queens",
            Scenario::Knapsack => "knapsack",
            Scenario::Transport => "transport",
        }
    }

    fn engines(self) -> Vec<Engine> {
        match self {
            Scenario::Queens => vec![Engine::Discrete],
            Scenario::Knapsack => {
                let mut engines = vec![Engine::Discrete];
                engines.extend(available_linear(&LinearBackend::ALL));
                engines
            }
            Scenario::Transport => {
                available_linear(&[LinearBackend::ContinuousA, LinearBackend::ContinuousB])
            }
        }
    }
}

fn available_linear(backends: &[LinearBackend]) -> Vec<Engine> {
    backends
        .iter()
        .copied()
        .filter(|backend| backend.is_available())
        .map(Engine::Linear)
        .collect()
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
enum Engine {
    Discrete,
    Linear(LinearBackend),
}

impl Engine {
    fn as_str(self) -> &'static str {
        match self {
            Engine::Discrete => "discrete",
            Engine::Linear(backend) => backend.as_str(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Execution {
    status: Status,
    objective: f64,
    variables: usize,
    constraints: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ScenarioRecord {
    schema_version: u32,
    run_id: String,
    scenario: String,
    engine: String,
    size: usize,
    repetition: u32,
    variables: usize,
    constraints: usize,
    status: Status,
    objective: f64,
    duration_ms: f64,
}

#[derive(Debug, Clone, Eq, Ord, PartialEq, PartialOrd)]
struct SummaryKey {
    scenario: String,
    engine: String,
    size: usize,
}

#[derive(Debug, Clone, Serialize)]
struct SummaryRow {
    scenario: String,
    engine: String,
    size: usize,
    samples: usize,
    status: String,
    objective: f64,
    mean_duration_ms: f64,
    max_duration_ms: f64,
}

#[derive(Debug, Clone, Serialize)]
struct BackendRow {
    code: i32,
    backend: &'static str,
    engine: &'static str,
    mixed_integer: bool,
    available: bool,
}

fn main() {
    if let Err(err) = run() {
        eprintln!("{err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level)?;
    match cli.command {
        Command::Run(args) => run_command(args),
        Command::Report(args) => report_command(args),
        Command::Backends(args) => backends_command(args),
    }
}

fn init_tracing(level: &str) -> Result<(), Box<dyn std::error::Error>> {
    if level.eq_ignore_ascii_case("off") {
        return Ok(());
    }
    let filter = EnvFilter::try_new(level)?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|err| boxed_input_error(&format!("failed to initialize logging: {err}")))
}

fn run_command(args: RunArgs) -> Result<(), Box<dyn std::error::Error>> {
    if args.size == 0 {
        return Err(boxed_input_error("size must be greater than zero"));
    }
    if args.repetitions == 0 {
        return Err(boxed_input_error("repetitions must be greater than zero"));
    }

    let run_id = build_run_id()?;
    let mut records = Vec::new();
    for scenario in &args.scenarios {
        for engine in scenario.engines() {
            for repetition in 1..=args.repetitions {
                let started = Instant::now();
                let execution = execute(*scenario, engine, args.size, args.time_limit);
                let duration_ms = started.elapsed().as_secs_f64() * 1_000.0;
                info!(
                    component = "bench",
                    operation = "run",
                    status = "success",
                    scenario = scenario.as_str(),
                    engine = engine.as_str(),
                    solve_status = %execution.status,
                    duration_ms,
                    "Scenario finished"
                );
                records.push(ScenarioRecord {
                    schema_version: SCHEMA_VERSION,
                    run_id: run_id.clone(),
                    scenario: scenario.as_str().to_string(),
                    engine: engine.as_str().to_string(),
                    size: args.size,
                    repetition,
                    variables: execution.variables,
                    constraints: execution.constraints,
                    status: execution.status,
                    objective: execution.objective,
                    duration_ms,
                });
            }
        }
    }

    if let Some(path) = args.output.as_ref() {
        write_records_jsonl(path, &records)?;
    }
    render_output(args.format, &records)?;
    if let Some(path) = args.output.as_ref() {
        println!("artifact: {}", path.display());
    }
    Ok(())
}

fn report_command(args: ReportArgs) -> Result<(), Box<dyn std::error::Error>> {
    let records = load_records_jsonl(&args.input)?;
    render_output(args.format, &records)
}

fn backends_command(args: BackendsArgs) -> Result<(), Box<dyn std::error::Error>> {
    let rows: Vec<BackendRow> = LinearBackend::ALL
        .iter()
        .map(|backend| BackendRow {
            code: backend.code(),
            backend: backend.as_str(),
            engine: backend.engine(),
            mixed_integer: backend.is_mixed_integer(),
            available: backend.is_available(),
        })
        .collect();
    match args.format {
        OutputFormat::Table => {
            println!(
                "{:>4} {:<16} {:<8} {:<13} {:<9}",
                "code", "backend", "engine", "mixed_integer", "available"
            );
            for row in &rows {
                println!(
                    "{:>4} {:<16} {:<8} {:<13} {:<9}",
                    row.code, row.backend, row.engine, row.mixed_integer, row.available
                );
            }
        }
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&rows)?),
        OutputFormat::Ndjson => {
            for row in &rows {
                println!("{}", serde_json::to_string(row)?);
            }
        }
    }
    Ok(())
}

fn execute(scenario: Scenario, engine: Engine, size: usize, time_limit: f64) -> Execution {
    debug!(
        component = "bench",
        operation = "execute",
        status = "start",
        scenario = scenario.as_str(),
        engine = engine.as_str(),
        size,
        "Building scenario"
    );
    match (scenario, engine) {
        (Scenario::Queens, _) => queens(size, time_limit),
        (Scenario::Knapsack, Engine::Discrete) => knapsack_discrete(size, time_limit),
        (Scenario::Knapsack, Engine::Linear(backend)) => knapsack_linear(size, backend, time_limit),
        (Scenario::Transport, Engine::Linear(backend)) => transport(size, backend, time_limit),
        (Scenario::Transport, Engine::Discrete) => Execution {
            status: Status::ModelInvalid,
            objective: 0.0,
            variables: 0,
            constraints: 0,
        },
    }
}

fn item_weight(index: usize) -> i64 {
    3 + (7 * index as i64) % 11
}

fn item_value(index: usize) -> i64 {
    5 + (13 * index as i64) % 17
}

fn knapsack_capacity(size: usize) -> i64 {
    (0..size).map(item_weight).sum::<i64>() / 2
}

/// `size` queens on a `size`-wide board, one per column.
///
/// Diagonals are modeled as shifted copies of the row variables so that
/// all-different applies to them directly.
fn queens(size: usize, time_limit: f64) -> Execution {
    let mut model = CpModel::new();
    let n = size as i64;
    let mut rows = Vec::with_capacity(size);
    let mut ups = Vec::with_capacity(size);
    let mut downs = Vec::with_capacity(size);
    for column in 0..n {
        let row = expect_built(model.new_int_var(0, n - 1, None));
        let up = expect_built(model.new_int_var(column, column + n - 1, None));
        let down = expect_built(model.new_int_var(-column, n - 1 - column, None));
        expect_built(model.add_linear_eq(&[up, row], &[1, -1], column));
        expect_built(model.add_linear_eq(&[down, row], &[1, -1], -column));
        rows.push(row);
        ups.push(up);
        downs.push(down);
    }
    expect_built(model.add_all_different(&rows));
    expect_built(model.add_all_different(&ups));
    expect_built(model.add_all_different(&downs));

    let solution = model.solve(time_limit);
    Execution {
        status: solution.status(),
        objective: solution.objective_value() as f64,
        variables: model.num_variables(),
        constraints: model.num_constraints(),
    }
}

fn knapsack_discrete(size: usize, time_limit: f64) -> Execution {
    let mut model = CpModel::new();
    let items: Vec<VarId> = (0..size).map(|_| model.new_bool_var(None)).collect();
    let weights: Vec<i64> = (0..size).map(item_weight).collect();
    let values: Vec<i64> = (0..size).map(item_value).collect();
    expect_built(model.add_linear_le(&items, &weights, knapsack_capacity(size)));
    expect_built(model.maximize(&items, &values));

    let solution = model.solve(time_limit);
    Execution {
        status: solution.status(),
        objective: solution.objective_value() as f64,
        variables: model.num_variables(),
        constraints: model.num_constraints(),
    }
}

fn knapsack_linear(size: usize, backend: LinearBackend, time_limit: f64) -> Execution {
    let mut model = LinearModel::with_backend("knapsack", backend);
    model.set_config(SolverConfig::new().with_time_limit(time_limit));
    let capacity = expect_built(model.add_constraint(
        f64::NEG_INFINITY,
        knapsack_capacity(size) as f64,
        Some("capacity"),
    ));
    for index in 0..size {
        let item = model.bool_var(None);
        expect_built(model.set_constraint_coeff(capacity, item, item_weight(index) as f64));
        expect_built(model.set_objective_coeff(item, item_value(index) as f64));
    }
    model.maximize();
    solve_linear(&mut model)
}

/// Balanced transportation problem with `size` sources and `size` sinks.
fn transport(size: usize, backend: LinearBackend, time_limit: f64) -> Execution {
    const UNITS: f64 = 20.0;
    let mut model = LinearModel::with_backend("transport", backend);
    model.set_config(SolverConfig::new().with_time_limit(time_limit));
    let supply: Vec<_> = (0..size)
        .map(|_| expect_built(model.add_constraint(f64::NEG_INFINITY, UNITS, None)))
        .collect();
    let demand: Vec<_> = (0..size)
        .map(|_| expect_built(model.add_constraint(UNITS, f64::INFINITY, None)))
        .collect();
    for (i, source) in supply.iter().enumerate() {
        for (j, sink) in demand.iter().enumerate() {
            let flow = expect_built(model.num_var(0.0, f64::INFINITY, None));
            expect_built(model.set_constraint_coeff(*source, flow, 1.0));
            expect_built(model.set_constraint_coeff(*sink, flow, 1.0));
            expect_built(model.set_objective_coeff(flow, (1 + (3 * i + 5 * j) % 9) as f64));
        }
    }
    model.minimize();
    solve_linear(&mut model)
}

fn solve_linear(model: &mut LinearModel) -> Execution {
    let status = model.solve();
    Execution {
        status,
        objective: model.objective_value().unwrap_or(0.0),
        variables: model.num_variables(),
        constraints: model.num_constraints(),
    }
}

/// Generated scenarios only reference handles they created.
fn expect_built<T>(result: Result<T, duet_solver::ModelError>) -> T {
    match result {
        Ok(value) => value,
        Err(err) => panic!("generated scenario rejected: {err}"),
    }
}

fn render_output(
    format: OutputFormat,
    records: &[ScenarioRecord],
) -> Result<(), Box<dyn std::error::Error>> {
    match format {
        OutputFormat::Table => {
            let rows = summarize_records(records);
            print_summary_table(&rows);
            Ok(())
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(records)?);
            Ok(())
        }
        OutputFormat::Ndjson => {
            for record in records {
                println!("{}", serde_json::to_string(record)?);
            }
            Ok(())
        }
    }
}

fn summarize_records(records: &[ScenarioRecord]) -> Vec<SummaryRow> {
    #[derive(Default)]
    struct Acc {
        samples: usize,
        duration_sum: f64,
        duration_max: f64,
        last_status: Option<Status>,
        last_objective: f64,
    }

    let mut groups: BTreeMap<SummaryKey, Acc> = BTreeMap::new();
    for record in records {
        let key = SummaryKey {
            scenario: record.scenario.clone(),
            engine: record.engine.clone(),
            size: record.size,
        };
        let entry = groups.entry(key).or_default();
        entry.samples += 1;
        entry.duration_sum += record.duration_ms;
        if record.duration_ms > entry.duration_max {
            entry.duration_max = record.duration_ms;
        }
        entry.last_status = Some(record.status);
        entry.last_objective = record.objective;
    }

    groups
        .into_iter()
        .map(|(key, acc)| SummaryRow {
            scenario: key.scenario,
            engine: key.engine,
            size: key.size,
            samples: acc.samples,
            status: acc.last_status.unwrap_or_default().as_str().to_string(),
            objective: acc.last_objective,
            mean_duration_ms: if acc.samples == 0 {
                0.0
            } else {
                acc.duration_sum / acc.samples as f64
            },
            max_duration_ms: acc.duration_max,
        })
        .collect()
}

fn print_summary_table(rows: &[SummaryRow]) {
    println!(
        "{:<10} {:<16} {:>5} {:>7} {:<14} {:>14} {:>12} {:>12}",
        "scenario", "engine", "size", "samples", "status", "objective", "mean_ms", "max_ms"
    );
    for row in rows {
        println!(
            "{:<10} {:<16} {:>5} {:>7} {:<14} {:>14.4} {:>12.3} {:>12.3}",
            row.scenario,
            row.engine,
            row.size,
            row.samples,
            row.status,
            row.objective,
            row.mean_duration_ms,
            row.max_duration_ms,
        );
    }
}

fn write_records_jsonl(
    path: &Path,
    records: &[ScenarioRecord],
) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(parent) = path.parent() {
        create_dir_all(parent)?;
    }
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    for record in records {
        serde_json::to_writer(&mut writer, record)?;
        writer.write_all(b"\n")?;
    }
    writer.flush()?;
    Ok(())
}

fn load_records_jsonl(path: &Path) -> Result<Vec<ScenarioRecord>, Box<dyn std::error::Error>> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);
    let mut records = Vec::new();
    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        records.push(serde_json::from_str::<ScenarioRecord>(&line)?);
    }
    Ok(records)
}

fn build_run_id() -> Result<String, Box<dyn std::error::Error>> {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|err| std::io::Error::other(err.to_string()))?
        .as_millis();
    Ok(format!("run_{}", millis))
}

fn boxed_input_error(message: &str) -> Box<dyn std::error::Error> {
    Box::new(std::io::Error::new(
        std::io::ErrorKind::InvalidInput,
        message.to_string(),
    ))
}
