use clap::{Parser, Subcommand};
use std::ffi::OsString;
use std::io::{self, BufWriter};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

mod model;
mod pipeline;
mod record;
mod render;
mod routing;
mod stage;

pub type Result<T> = anyhow::Result<T>;

#[derive(Parser)]
#[command(name = "txpipe", version)]
#[command(about = "Fan a transaction stream into per-entity and per-region summaries", long_about = None)]
#[command(args_conflicts_with_subcommands = true)]
struct Cli {
    #[command(subcommand)]
    cmd: Option<Commands>,

    /// Routing tokens: entity_performance, region_performance, entity_rating
    /// or region_rating, each followed by `:stdout` or `:stderr`.
    #[arg(value_name = "FUNCTIONALITY:DESTINATION")]
    routes: Vec<String>,

    /// Stage I program; its stdout and stderr are the two record sub-streams.
    #[arg(long, env = "TXPIPE_SOURCE", default_value = "./transformer1")]
    source: OsString,

    /// Argument passed to the Stage I program (repeatable).
    #[arg(long = "source-arg", value_name = "ARG", allow_hyphen_values = true)]
    source_args: Vec<OsString>,

    /// Reject unparseable numeric fields instead of counting them as zero.
    #[arg(long, env = "TXPIPE_STRICT")]
    strict: bool,

    /// Write a JSON run report to this file.
    #[arg(long, value_name = "FILE")]
    report: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one downstream aggregation stage over stdin.
    #[command(hide = true)]
    Stage {
        #[arg(value_enum)]
        kind: stage::StageKind,

        #[arg(long)]
        strict: bool,
    },
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let _ = err.print();
            // Help and version are not failures; every usage error is.
            return if err.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    match cli.cmd {
        Some(Commands::Stage { kind, strict }) => run_stage(kind, strict),
        None => run_pipeline(cli),
    }
}

/// Downstream stage process. Both output streams are data channels, so no
/// subscriber is installed and failures are reported by exit code only.
fn run_stage(kind: stage::StageKind, strict: bool) -> ExitCode {
    let mode = if strict {
        record::NumericMode::Strict
    } else {
        record::NumericMode::Lenient
    };

    let mut primary = BufWriter::new(io::stdout().lock());
    let mut secondary = BufWriter::new(io::stderr().lock());
    match stage::run_stage(kind, mode, io::stdin().lock(), &mut primary, &mut secondary) {
        Ok(_) => ExitCode::SUCCESS,
        Err(_) => ExitCode::FAILURE,
    }
}

fn run_pipeline(cli: Cli) -> ExitCode {
    if cli.routes.is_empty() {
        println!("No output requested, have a nice day!");
        return ExitCode::FAILURE;
    }

    init_logging();

    let routes = match routing::RoutingTable::from_tokens(&cli.routes) {
        Ok(routes) => routes,
        Err(err) => {
            eprintln!("Error: {}", err);
            return ExitCode::FAILURE;
        }
    };

    let source = pipeline::StageCommand::new("source", cli.source).args(cli.source_args);
    let plan = match pipeline::PipelinePlan::with_current_exe(source, cli.strict) {
        Ok(plan) => plan,
        Err(err) => {
            eprintln!("Error: {:#}", err);
            return ExitCode::FAILURE;
        }
    };

    // Unlocked handles: reader threads may log while buffers are routed.
    let report = match pipeline::run(&plan, &routes, &mut io::stdout(), &mut io::stderr()) {
        Ok(report) => report,
        Err(err) => {
            eprintln!("Error: {:#}", err);
            return ExitCode::FAILURE;
        }
    };

    if let Some(path) = &cli.report {
        match report.write_json(path) {
            Ok(()) => tracing::info!("Wrote {}", path.display()),
            Err(err) => {
                eprintln!("Error: {:#}", err);
                return ExitCode::FAILURE;
            }
        }
    }

    if report.all_succeeded() {
        ExitCode::SUCCESS
    } else {
        tracing::error!(
            failed = report.failed_stages().count(),
            "pipeline finished with failed stages"
        );
        ExitCode::FAILURE
    }
}

/// Routed buffers may share stderr with log output, so only warnings and
/// errors are shown unless RUST_LOG asks for more.
fn init_logging() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}
