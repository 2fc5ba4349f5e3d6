//! utility-forecast entry point: CLI wiring, config loading and report output.

use std::process;

use tracing::{Level, info, warn};

use utility_forecast::cli::{self, CliOptions, HistorySource};
use utility_forecast::config::AppConfig;
use utility_forecast::history::BillingHistory;
use utility_forecast::io::{export_report_csv, import_csv};
use utility_forecast::observation::UtilityCategory;
use utility_forecast::report::CategoryReport;
use utility_forecast::sample::SampleGenerator;

fn init_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Loads config: `--config` takes priority, then `--preset`, then defaults.
fn load_config(opts: &CliOptions) -> AppConfig {
    let loaded = if let Some(ref path) = opts.config {
        AppConfig::from_toml_file(path)
    } else if let Some(ref name) = opts.preset {
        AppConfig::from_preset(name)
    } else {
        Ok(AppConfig::default())
    };

    let mut config = match loaded {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("{e}");
            process::exit(1);
        }
    };

    if let Some(seed) = opts.seed {
        config.sample.seed = seed;
    }
    if let Some(months) = opts.months {
        config.sample.months = months;
    }

    let errors = config.validate();
    if !errors.is_empty() {
        for e in &errors {
            eprintln!("{e}");
        }
        process::exit(1);
    }

    config
}

fn load_history(opts: &CliOptions, config: &AppConfig) -> BillingHistory {
    match opts.source {
        HistorySource::Csv(ref path) => match import_csv(path, &config.tariffs) {
            Ok(history) => history,
            Err(e) => {
                eprintln!("error: failed to load \"{}\": {e}", path.display());
                process::exit(1);
            }
        },
        HistorySource::Demo => {
            let s = &config.sample;
            info!(
                seed = s.seed,
                months = s.months,
                start = %s.start,
                "generating sample household history"
            );
            SampleGenerator::new(s.seed).household(s.start, s.months, &config.tariffs)
        }
    }
}

fn main() {
    let opts = match cli::parse_args() {
        Ok(opts) => opts,
        Err(e) => {
            eprintln!("error: {e}");
            cli::print_usage();
            process::exit(1);
        }
    };

    if opts.help {
        cli::print_usage();
        process::exit(0);
    }

    init_logging(opts.verbose);

    let config = load_config(&opts);
    let history = load_history(&opts, &config);
    if history.is_empty() {
        warn!("billing history is empty; forecasts will report insufficient data");
    }

    let categories = match opts.category {
        Some(category) => vec![category],
        None if history.is_empty() => UtilityCategory::ALL.to_vec(),
        None => history.categories(),
    };
    let method = opts.method.unwrap_or(config.forecast.method);
    let forecaster = config.forecast.forecaster();

    let reports = CategoryReport::build_all(&history, &categories, method, &forecaster);

    if opts.json {
        match serde_json::to_string_pretty(&reports) {
            Ok(json) => println!("{json}"),
            Err(e) => {
                eprintln!("error: failed to serialize forecast: {e}");
                process::exit(1);
            }
        }
    } else {
        for (i, report) in reports.iter().enumerate() {
            if i > 0 {
                println!();
            }
            println!("{report}");
        }
    }

    if let Some(ref path) = opts.report_out {
        if let Err(e) = export_report_csv(&reports, path) {
            eprintln!("error: failed to write CSV: {e}");
            process::exit(1);
        }
        info!(path = %path.display(), "report written");
    }
}
