mod common;
mod logic;

use anyhow::{Context, Result, bail};
use chrono::Utc;
use clap::Parser;
use colored::Colorize;
use std::fs::File;
use std::io::{BufWriter, Write, stdout};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use common::{build_plan, split_csv};
use logic::reports::{generate_console_report, generate_json_report, generate_markdown_report};
use logic::{
    GameplayStrategy, SimulationReport, expand_iterations, resolve_seed_inputs, run_matrix,
    summarize,
};
use okozukai_game::{
    Catalog, DataLoader, DirDataLoader, GameConfig, GameEngine, MemoryStorage, StaticDataLoader,
};

#[derive(Debug, Parser)]
#[command(name = "okozukai-tester", version = "0.1.0")]
#[command(about = "Batch simulation of allowance-savings campaigns under scripted player strategies")]
struct Args {
    /// Goal id to save for
    #[arg(long, default_value = "board-game")]
    goal: String,

    /// Recurring purchase item ids (comma-separated)
    #[arg(long, default_value = "")]
    recurring: String,

    /// Strategies to run (comma-separated, or "all")
    #[arg(long, default_value = "all")]
    strategies: String,

    /// Seeds to run (comma-separated; ranges as start..end)
    #[arg(long, default_value = "1337")]
    seeds: String,

    /// Consecutive seeds to run from each listed seed
    #[arg(long, default_value_t = 10)]
    iterations: usize,

    /// Output report format
    #[arg(long, default_value = "console")]
    #[arg(value_parser = ["json", "markdown", "console"])]
    report: String,

    /// Optional path to write the report output instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,

    /// Directory holding items.json, goals.json, and happenings.json
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// List goals and items and exit
    #[arg(long)]
    list_catalog: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let (config, catalog) = load_game_data(args.data_dir.as_deref())?;

    if maybe_list_catalog(&args, &catalog)? {
        return Ok(());
    }

    if args.report == "console" {
        announce_banner();
    }

    let start_time = Instant::now();
    let report = run_simulations(&args, &config, &catalog)?;
    write_reports(&args, &report, start_time)?;
    Ok(())
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();
}

fn boot<L: DataLoader>(loader: L) -> Result<(GameConfig, Arc<Catalog>)> {
    let engine = GameEngine::boot(loader, MemoryStorage::new())?;
    Ok((engine.config().clone(), Arc::new(engine.catalog().clone())))
}

fn load_game_data(data_dir: Option<&Path>) -> Result<(GameConfig, Arc<Catalog>)> {
    match data_dir {
        Some(dir) => boot(DirDataLoader::new(dir))
            .with_context(|| format!("loading game data from {}", dir.display())),
        None => boot(StaticDataLoader),
    }
}

fn maybe_list_catalog(args: &Args, catalog: &Catalog) -> Result<bool> {
    if !args.list_catalog {
        return Ok(false);
    }
    let mut output_target = OutputTarget::new(args.output.clone())?;
    let out = output_target.writer();
    writeln!(out, "Available goals:")?;
    for goal in &catalog.goals {
        writeln!(out, "  {:15} {:>6}  {}", goal.id, goal.price, goal.name)?;
    }
    writeln!(out, "Available items:")?;
    for item in &catalog.items {
        writeln!(out, "  {:15} {:>6}  {}", item.id, item.price, item.name)?;
    }
    output_target.flush_inner()?;
    Ok(true)
}

fn announce_banner() {
    println!("{}", "💰 Okozukai Savings Tester".bright_cyan().bold());
    println!("{}", "================================".cyan());
}

fn run_simulations(
    args: &Args,
    config: &GameConfig,
    catalog: &Arc<Catalog>,
) -> Result<SimulationReport> {
    let recurring = split_csv(&args.recurring);
    let plan = build_plan(catalog, &args.goal, &recurring)?;
    let summary = plan.summary(config).context("plan has no goal selected")?;
    let Some(planned_months) = summary.required_months.months() else {
        bail!(
            "plan for '{}' cannot start: monthly savings {} are not positive",
            args.goal,
            summary.monthly_savings
        );
    };

    let strategies = GameplayStrategy::parse_list(&split_csv(&args.strategies))?;
    let seeds = expand_iterations(&resolve_seed_inputs(&split_csv(&args.seeds))?, args.iterations);
    log::info!(
        "running {} strategies x {} seeds for goal {}",
        strategies.len(),
        seeds.len(),
        args.goal
    );

    let runs = run_matrix(config, catalog, &plan, &strategies, &seeds)?;
    let goal_price = plan.selected_goal.as_ref().map_or(0, |g| g.price);

    Ok(SimulationReport {
        generated_at: Utc::now(),
        goal_id: args.goal.clone(),
        goal_price,
        recurring,
        planned_months,
        seeds,
        strategies: strategies
            .iter()
            .map(|&strategy| summarize(strategy, &runs))
            .collect(),
    })
}

fn write_reports(args: &Args, report: &SimulationReport, start_time: Instant) -> Result<()> {
    let mut output_target = OutputTarget::new(args.output.clone())?;
    let out = output_target.writer();
    match args.report.as_str() {
        "json" => generate_json_report(out, report)?,
        "markdown" => generate_markdown_report(out, report)?,
        _ => generate_console_report(out, report, start_time.elapsed())?,
    }
    output_target.flush_inner()?;
    Ok(())
}

enum OutputTarget {
    Stdout(BufWriter<std::io::Stdout>),
    File(BufWriter<File>),
}

impl OutputTarget {
    fn new(path: Option<PathBuf>) -> Result<Self> {
        if let Some(path) = path {
            let file = File::create(&path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            Ok(Self::File(BufWriter::new(file)))
        } else {
            Ok(Self::Stdout(BufWriter::new(stdout())))
        }
    }

    fn writer(&mut self) -> &mut dyn Write {
        match self {
            Self::Stdout(w) => w,
            Self::File(w) => w,
        }
    }

    fn flush_inner(&mut self) -> std::io::Result<()> {
        match self {
            Self::Stdout(w) => w.flush(),
            Self::File(w) => w.flush(),
        }
    }
}
