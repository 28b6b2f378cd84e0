use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand, ValueEnum};
use tracing::Level;

use crate::config::{RunConfig, BIND_ENV, CONFIG_ENV, DEFAULT_BIND_ADDR};
use crate::data::archive::{build_archive, ARCHIVE_NAME};
use crate::data::export::write_dir;
use crate::data::synthetic::{generate, ScenarioSpec};
use crate::pipeline;
use crate::planner::RunReport;
use crate::server;
use crate::telemetry::init_tracing;

#[derive(Debug, Parser)]
#[command(name = "tribunal")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Form evaluation committees and allocate cases to them", long_about = None)]
pub struct Cli {
    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Plan committees from an availability workbook and a case workbook
    Run {
        availability: PathBuf,
        cases: PathBuf,

        /// Directory receiving the result CSVs and JSON files
        #[arg(short, long, default_value = "results")]
        output: PathBuf,

        /// YAML run configuration
        #[arg(short, long, env = CONFIG_ENV)]
        config: Option<PathBuf>,

        #[arg(long)]
        seed: Option<u64>,

        /// Number of slot columns to read
        #[arg(long)]
        slots: Option<usize>,

        /// Also write the results as a single zip archive
        #[arg(long)]
        archive: bool,
    },

    /// Serve the HTTP API
    Serve {
        #[arg(long, env = BIND_ENV, default_value = DEFAULT_BIND_ADDR)]
        bind: String,

        #[arg(short, long, env = CONFIG_ENV)]
        config: Option<PathBuf>,
    },

    /// Plan a generated scenario and print its statistics
    Demo {
        #[arg(long, default_value_t = 42)]
        seed: u64,

        #[arg(long, value_enum, default_value_t = ScenarioSize::Default)]
        size: ScenarioSize,

        /// Write the result files here as well
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print the default configuration as YAML
    Config,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ScenarioSize {
    Small,
    Default,
    Large,
}

impl ScenarioSize {
    fn spec(self) -> ScenarioSpec {
        match self {
            Self::Small => ScenarioSpec::small(),
            Self::Default => ScenarioSpec::default(),
            Self::Large => ScenarioSpec::large(),
        }
    }
}

pub fn run_with_args(args: &[String]) -> i32 {
    let cli = match Cli::try_parse_from(args) {
        Ok(cli) => cli,
        Err(err) => {
            let code = if err.use_stderr() { 2 } else { 0 };
            let _ = err.print();
            return code;
        }
    };

    let level = match (&cli.command, cli.verbose) {
        (_, true) => Level::DEBUG,
        (Command::Serve { .. }, false) => Level::INFO,
        _ => Level::WARN,
    };
    init_tracing(cli.log_json, level);

    match cli.command {
        Command::Run {
            availability,
            cases,
            output,
            config,
            seed,
            slots,
            archive,
        } => handle_run(&availability, &cases, &output, config.as_deref(), seed, slots, archive),
        Command::Serve { bind, config } => handle_serve(&bind, config.as_deref()),
        Command::Demo { seed, size, output } => handle_demo(seed, size, output.as_deref()),
        Command::Config => handle_config(),
    }
}

fn handle_run(
    availability: &Path,
    cases: &Path,
    output: &Path,
    config_path: Option<&Path>,
    seed: Option<u64>,
    slots: Option<usize>,
    archive: bool,
) -> i32 {
    let mut config = match RunConfig::load_or_default(config_path) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{err}");
            return 1;
        }
    };
    if let Some(seed) = seed {
        config.engine.seed = seed;
    }
    if let Some(slots) = slots {
        config.engine.slot_count = slots;
    }

    let report = match pipeline::run_paths(availability, cases, &config) {
        Ok(report) => report,
        Err(err) => {
            eprintln!("run failed: {err}");
            return 1;
        }
    };

    if let Err(err) = write_dir(output, &report) {
        eprintln!("failed to write results: {err}");
        return 1;
    }
    if archive {
        let path = output.join(ARCHIVE_NAME);
        let written = build_archive(&report).and_then(|bytes| fs::write(&path, bytes).map_err(Into::into));
        if let Err(err) = written {
            eprintln!("failed to write {}: {err}", path.display());
            return 1;
        }
    }

    print_summary(&report)
}

fn handle_serve(bind: &str, config_path: Option<&Path>) -> i32 {
    let config = match RunConfig::load_or_default(config_path) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{err}");
            return 1;
        }
    };
    match server::run_server(bind, config) {
        Ok(()) => 0,
        Err(err) => {
            eprintln!("server error: {err}");
            1
        }
    }
}

fn handle_demo(seed: u64, size: ScenarioSize, output: Option<&Path>) -> i32 {
    let mut config = RunConfig::default();
    config.engine.seed = seed;
    let input = generate(&size.spec(), seed);
    let report = pipeline::run_plan(input, &config.engine);

    if let Some(output) = output {
        if let Err(err) = write_dir(output, &report) {
            eprintln!("failed to write results: {err}");
            return 1;
        }
    }
    print_summary(&report)
}

fn handle_config() -> i32 {
    match RunConfig::default().to_yaml() {
        Ok(yaml) => {
            print!("{yaml}");
            0
        }
        Err(err) => {
            eprintln!("failed to serialize config: {err}");
            1
        }
    }
}

fn print_summary(report: &RunReport) -> i32 {
    let summary = serde_json::json!({
        "run_id": report.run_id,
        "seed": report.seed,
        "stats": report.stats,
        "warnings": report.warnings.len(),
        "unrouted": report.unrouted.len(),
        "elapsed_ms": report.elapsed_ms,
    });
    match serde_json::to_string_pretty(&summary) {
        Ok(payload) => {
            println!("{payload}");
            0
        }
        Err(err) => {
            eprintln!("failed to serialize run summary: {err}");
            1
        }
    }
}
