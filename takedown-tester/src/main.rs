mod logic;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use colored::Colorize;
use log::info;
use std::fs::File;
use std::io::{BufWriter, Write, stdout};
use std::path::{Path, PathBuf};
use std::time::Instant;
use takedown_game::CalibrationTable;

use logic::seeds::split_csv;
use logic::{
    CheckResult, resolve_seed_inputs, run_bracket_sweep, run_calibration, run_replay_checks,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TestMode {
    /// Monte Carlo underdog win-rate bands
    Calibration,
    /// Bracket sweeps in instant and interactive modes
    Brackets,
    /// Pause/resume and snapshot replay checks
    Replay,
    /// Everything above
    All,
}

impl TestMode {
    const fn runs_calibration(self) -> bool {
        matches!(self, Self::Calibration | Self::All)
    }

    const fn runs_brackets(self) -> bool {
        matches!(self, Self::Brackets | Self::All)
    }

    const fn runs_replay(self) -> bool {
        matches!(self, Self::Replay | Self::All)
    }
}

#[derive(Debug, Parser)]
#[command(name = "takedown-tester", version)]
#[command(
    about = "Automated QA for the Takedown simulation core: calibration bands, bracket sweeps and replay checks"
)]
struct Args {
    /// Which suites to run
    #[arg(long, value_enum, default_value_t = TestMode::All)]
    mode: TestMode,

    /// Seeds to run (comma-separated, `all` for the standard set)
    #[arg(long, default_value = "1337")]
    seeds: String,

    /// Matches simulated per calibration band and seed
    #[arg(long, default_value_t = 10_000)]
    trials: usize,

    /// Brackets played per size, mode and seed
    #[arg(long, default_value_t = 200)]
    bracket_trials: usize,

    /// Output report format
    #[arg(long, default_value = "console")]
    #[arg(value_parser = ["json", "markdown", "console", "csv"])]
    report: String,

    /// Calibration table JSON to test instead of the built-in defaults
    #[arg(long)]
    calibration: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Optional path to write the report output instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    if args.output.is_some() || args.report == "console" {
        announce_banner();
    }

    let start_time = Instant::now();
    let table = load_calibration(args.calibration.as_deref())?;
    let seeds = resolve_seed_inputs(&split_csv(&args.seeds))?;
    info!("running {:?} checks for {} seed(s)", args.mode, seeds.len());

    let results = run_checks(&args, &table, &seeds);
    write_reports(&args, &results, start_time)?;

    if results.iter().any(|r| !r.passed) {
        std::process::exit(1);
    }

    Ok(())
}

fn announce_banner() {
    println!("{}", "🤼 Takedown Automated Tester".bright_cyan().bold());
    println!("{}", "================================".cyan());
}

fn load_calibration(path: Option<&Path>) -> Result<CalibrationTable> {
    let Some(path) = path else {
        return Ok(CalibrationTable::default());
    };
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    CalibrationTable::from_json(&json)
        .with_context(|| format!("invalid calibration table in {}", path.display()))
}

fn run_checks(args: &Args, table: &CalibrationTable, seeds: &[String]) -> Vec<CheckResult> {
    let mut results = Vec::new();
    if args.mode.runs_calibration() {
        results.extend(run_calibration(table, seeds, args.trials, args.verbose));
    }
    if args.mode.runs_brackets() {
        results.extend(run_bracket_sweep(
            table,
            seeds,
            args.bracket_trials,
            args.verbose,
        ));
    }
    if args.mode.runs_replay() {
        results.extend(run_replay_checks(table, seeds, args.verbose));
    }
    results
}

fn write_reports(args: &Args, results: &[CheckResult], start_time: Instant) -> Result<()> {
    let mut output_target = OutputTarget::open(args.output.as_deref())?;
    let generated_at = chrono::Utc::now();

    match args.report.as_str() {
        "json" => logic::reports::generate_json_report(&mut output_target, results, generated_at)?,
        "markdown" => {
            logic::reports::generate_markdown_report(&mut output_target, results, generated_at)?;
        }
        "csv" => logic::reports::generate_csv_report(&mut output_target, results)?,
        _ => {
            if results.is_empty() {
                writeln!(&mut output_target, "No checks executed.")?;
            } else {
                logic::reports::generate_console_report(
                    &mut output_target,
                    results,
                    start_time.elapsed(),
                )?;
            }
        }
    }

    output_target.flush_inner()?;
    Ok(())
}

/// Where reports go: stdout unless `--output` names a file.
enum OutputTarget {
    Stdout(BufWriter<std::io::Stdout>),
    File(BufWriter<File>),
}

impl OutputTarget {
    fn open(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::Stdout(BufWriter::new(stdout())));
        };
        let file =
            File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
        Ok(Self::File(BufWriter::new(file)))
    }

    fn writer(&mut self) -> &mut dyn Write {
        match self {
            Self::Stdout(w) => w,
            Self::File(w) => w,
        }
    }

    fn flush_inner(&mut self) -> std::io::Result<()> {
        self.writer().flush()
    }
}

impl Write for OutputTarget {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.writer().write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.flush_inner()
    }
}
