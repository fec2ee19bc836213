use std::sync::Once;

static TRACE_INIT: Once = Once::new();
const DEFAULT_TRACE_FILTER: &str = "vsum=info,vsum::executor=warn";

use anyhow::Context;
use clap::{Parser, ValueEnum};
use tracing::info;
use tracing_subscriber::EnvFilter;
use vsum_core::{
    Executor,
    perf::scenarios::{Scenario, find_scenario, scenarios},
};

mod report;

use report::{ReportRow, RunReport, add_table_row, results_table};

#[derive(Debug, Parser)]
#[command(
    name = "vsum",
    author,
    version,
    about = "Benchmark parallel strategies for summing many byte vectors",
    long_about = None,
    after_help = "Set VSUM_TRACE=<filter> (or RUST_LOG) to tune diagnostics; VSUM_TRACE=0 silences them."
)]
struct CliArgs {
    /// Worker threads (default: available parallelism)
    #[arg(long, value_name = "N", value_parser = clap::value_parser!(u16).range(1..))]
    threads: Option<u16>,

    /// Shrink dataset dimensions by this factor, in (0, 1]
    #[arg(long, default_value_t = 1.0, value_parser = parse_scale)]
    scale: f64,

    /// Run only the given scenario (can repeat)
    #[arg(long = "scenario", value_name = "KEY")]
    scenarios: Vec<String>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    format: OutputFormat,

    /// List scenarios and exit
    #[arg(long)]
    list: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
}

fn parse_scale(raw: &str) -> Result<f64, String> {
    let value: f64 = raw.trim().parse().map_err(|e| format!("invalid scale '{}': {}", raw, e))?;
    if value > 0.0 && value <= 1.0 {
        Ok(value)
    } else {
        Err(format!("scale must be in (0, 1], got {}", value))
    }
}

fn env_toggle_enabled(raw: &str) -> bool {
    let trimmed = raw.trim();
    !(trimmed.eq_ignore_ascii_case("0") || trimmed.eq_ignore_ascii_case("false") || trimmed.eq_ignore_ascii_case("off"))
}

/// Filter expression carried by the toggle itself. Bare "on" values defer to
/// `RUST_LOG` and then to the default filter.
fn filter_expr_from(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    let bare_on = ["", "1", "true", "on"].iter().any(|word| trimmed.eq_ignore_ascii_case(word));
    (!bare_on).then(|| trimmed.to_string())
}

fn trace_filter(raw: &str) -> EnvFilter {
    filter_expr_from(raw)
        .or_else(|| std::env::var("RUST_LOG").ok())
        .and_then(|expr| EnvFilter::try_new(expr).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_TRACE_FILTER))
}

fn init_tracing() {
    let raw = std::env::var("VSUM_TRACE").unwrap_or_default();
    if !env_toggle_enabled(&raw) {
        return;
    }

    TRACE_INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_env_filter(trace_filter(&raw))
            .try_init();
    });
}

fn select_scenarios(keys: &[String]) -> anyhow::Result<Vec<&'static Scenario>> {
    if keys.is_empty() {
        return Ok(scenarios().iter().collect());
    }
    keys.iter().map(|key| find_scenario(key)).collect()
}

fn print_scenarios() {
    for spec in scenarios() {
        println!("{:<14} {}", spec.key(), spec.title());
    }
}

fn main() -> anyhow::Result<()> {
    init_tracing();

    let args = CliArgs::parse();
    if args.list {
        print_scenarios();
        return Ok(());
    }

    let selected = select_scenarios(&args.scenarios)?;
    let executor = match args.threads {
        Some(threads) => Executor::with_threads(usize::from(threads))?,
        None => Executor::default(),
    };
    info!(target: "vsum::driver", threads = executor.threads(), scale = args.scale, "starting benchmark run");

    let mut table = results_table();
    let mut rows = Vec::new();

    for spec in selected {
        info!(target: "vsum::driver", scenario = spec.key(), "preparing dataset");
        let prepared = spec
            .prepare(args.scale)
            .with_context(|| format!("prepare scenario '{}'", spec.key()))?;
        let results = prepared.run(&executor);
        info!(
            target: "vsum::driver",
            scenario = spec.key(),
            valid = results.validity().iter().filter(|v| **v).count(),
            "scenario finished"
        );

        match args.format {
            OutputFormat::Table => add_table_row(&mut table, prepared.title(), &results),
            OutputFormat::Json => rows.push(ReportRow::new(
                prepared.key(),
                prepared.title(),
                prepared.data().len(),
                prepared.element_count(),
                &results,
            )),
        }
        // dataset is dropped here, before the next one is allocated
    }

    match args.format {
        OutputFormat::Table => print!("{}", table),
        OutputFormat::Json => {
            let report = RunReport {
                generated_at: chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
                threads: executor.threads(),
                scale: args.scale,
                rows,
            };
            let json = serde_json::to_string_pretty(&report).context("serialize run report")?;
            println!("{}", json);
        }
    }

    Ok(())
}
