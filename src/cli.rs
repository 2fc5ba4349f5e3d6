//! Command-line argument parsing.

use std::env;
use std::path::PathBuf;

use crate::forecast::ForecastMethod;
use crate::observation::UtilityCategory;

/// Where billing history comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HistorySource {
    /// CSV file with recorded bills.
    Csv(PathBuf),
    /// Seeded synthetic household.
    Demo,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliOptions {
    pub source: HistorySource,
    /// Restrict output to one category; all categories otherwise.
    pub category: Option<UtilityCategory>,
    /// Overrides the configured method.
    pub method: Option<ForecastMethod>,
    pub config: Option<PathBuf>,
    pub preset: Option<String>,
    pub seed: Option<u64>,
    pub months: Option<usize>,
    pub report_out: Option<PathBuf>,
    pub json: bool,
    pub verbose: bool,
    pub help: bool,
}

pub fn parse_args() -> Result<CliOptions, String> {
    let args: Vec<String> = env::args().skip(1).collect();
    parse_args_from(&args)
}

pub fn parse_args_from(args: &[String]) -> Result<CliOptions, String> {
    let mut i = 0usize;
    let mut history = None;
    let mut demo = false;
    let mut category = None;
    let mut method = None;
    let mut config = None;
    let mut preset = None;
    let mut seed = None;
    let mut months = None;
    let mut report_out = None;
    let mut json = false;
    let mut verbose = false;
    let mut help = false;

    while i < args.len() {
        match args[i].as_str() {
            "--history" => {
                i += 1;
                let path = args.next_or_err(i, "missing value for --history (expected a CSV path)")?;
                if history.replace(PathBuf::from(path)).is_some() {
                    return Err("--history provided more than once".to_string());
                }
            }
            "--demo" => demo = true,
            "--category" => {
                i += 1;
                let raw = args.next_or_err(
                    i,
                    "missing value for --category (expected electricity or water)",
                )?;
                category = Some(raw.parse::<UtilityCategory>()?);
            }
            "--method" => {
                i += 1;
                let raw = args.next_or_err(i, "missing value for --method")?;
                method = Some(raw.parse::<ForecastMethod>()?);
            }
            "--config" => {
                i += 1;
                let path = args.next_or_err(i, "missing value for --config (expected a TOML path)")?;
                if config.replace(PathBuf::from(path)).is_some() {
                    return Err("--config provided more than once".to_string());
                }
            }
            "--preset" => {
                i += 1;
                let name = args.next_or_err(i, "missing value for --preset (expected a preset name)")?;
                if preset.replace(name.to_string()).is_some() {
                    return Err("--preset provided more than once".to_string());
                }
            }
            "--seed" => {
                i += 1;
                let raw = args.next_or_err(i, "missing value for --seed (expected a u64)")?;
                seed = Some(
                    raw.parse::<u64>()
                        .map_err(|_| format!("--seed value \"{raw}\" is not a valid u64"))?,
                );
            }
            "--months" => {
                i += 1;
                let raw = args.next_or_err(i, "missing value for --months (expected a count)")?;
                let n = raw
                    .parse::<usize>()
                    .map_err(|_| format!("--months value \"{raw}\" is not a valid count"))?;
                if n == 0 {
                    return Err("--months must be > 0".to_string());
                }
                months = Some(n);
            }
            "--report-out" => {
                i += 1;
                let path = args.next_or_err(i, "missing value for --report-out (expected a file path)")?;
                if report_out.replace(PathBuf::from(path)).is_some() {
                    return Err("--report-out provided more than once".to_string());
                }
            }
            "--json" => json = true,
            "--verbose" | "-v" => verbose = true,
            "--help" | "-h" => help = true,
            other => return Err(format!("unknown argument: {other}")),
        }
        i += 1;
    }

    if history.is_some() && demo {
        return Err(
            "arguments `--history` and `--demo` are mutually exclusive; choose one source"
                .to_string(),
        );
    }
    if config.is_some() && preset.is_some() {
        return Err(
            "arguments `--config` and `--preset` are mutually exclusive; choose one".to_string(),
        );
    }

    let source = match history {
        Some(path) => HistorySource::Csv(path),
        None => HistorySource::Demo,
    };

    Ok(CliOptions {
        source,
        category,
        method,
        config,
        preset,
        seed,
        months,
        report_out,
        json,
        verbose,
        help,
    })
}

trait SliceArgExt {
    fn next_or_err(&self, index: usize, err: &str) -> Result<&str, String>;
}

impl SliceArgExt for [String] {
    fn next_or_err(&self, index: usize, err: &str) -> Result<&str, String> {
        self.get(index)
            .map(String::as_str)
            .ok_or_else(|| err.to_string())
    }
}

pub fn print_usage() {
    eprintln!("utility-forecast: household utility bill forecasting");
    eprintln!();
    eprintln!("Usage: utility-forecast [OPTIONS]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --history <path>      Load billing history from CSV");
    eprintln!("                        (columns: period,category,units_consumed,billed_amount)");
    eprintln!("  --demo                Use a generated sample household (default)");
    eprintln!("  --category <name>     Only forecast electricity or water");
    eprintln!("  --method <name>       average | weighted_average | linear_trend");
    eprintln!("  --config <path>       Load settings from a TOML file");
    eprintln!("  --preset <name>       Use a built-in settings preset (default, cautious, trend)");
    eprintln!("  --seed <u64>          Override the demo random seed");
    eprintln!("  --months <n>          Override the number of demo months");
    eprintln!("  --report-out <path>   Export history and forecast to CSV");
    eprintln!("  --json                Print forecasts as JSON");
    eprintln!("  --verbose, -v         Enable debug logging");
    eprintln!("  --help, -h            Show this help message");
}
