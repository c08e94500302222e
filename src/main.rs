//! Command-line driver of the jetfrag analysis
//!
//! Usage: `jetfrag [CONFIG_FILE]`, where the configuration file defaults to
//! `jetfrag.cfg` in the working directory. Log verbosity is controlled by the
//! `JETFRAG_LOG` environment variable.

use eyre::WrapErr;
use jetfrag::{
    config::{Configuration, DEFAULT_CONFIG_FILE},
    output, Analysis, CancelToken, GeneralisedKt, ToyGenerator,
};
use log::info;

use std::{env, time::Instant};

/// We'll use eyre's type-erased result type throughout the application
type Result<T> = eyre::Result<T>;

/// Environment variable holding the log filter
const LOG_ENV_VAR: &str = "JETFRAG_LOG";

/// This will act as our main function, with suitable error handling
fn main() -> Result<()> {
    env_logger::init_from_env(env_logger::Env::default().filter_or(LOG_ENV_VAR, "info"));

    // ### CONFIGURATION READOUT ###

    let config_file = env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_CONFIG_FILE.to_owned());
    let cfg = Configuration::load(&config_file)
        .wrap_err_with(|| format!("Failed to load the configuration from {config_file}"))?;
    info!("Configuration:\n{}", cfg);

    // The record tables are opened before any event is processed, so that an
    // unwritable output directory is reported right away
    let mut sink = cfg.open_sink().wrap_err("Failed to open the record tables")?;

    // ### ANALYSIS INITIALIZATION ###

    // The clock starts after configuration I/O
    let saved_time = Instant::now();
    let source = ToyGenerator::new(cfg.seed, cfg.pt_hat_min);
    let analysis = Analysis::new(&cfg, GeneralisedKt);

    // ### ANALYSIS EXECUTION ###

    let report = analysis
        .run(&source, cfg.num_events, &CancelToken::default(), &mut sink)
        .wrap_err("Failed to run the analysis")?;
    let elapsed_time = saved_time.elapsed();

    // ### RESULTS DISPLAY AND STORAGE ###

    // Statistics are stored even if the event source gave up early
    output::dump_results(&cfg, &report.summary, elapsed_time)
        .wrap_err("Failed to output the results")?;
    report.into_result().wrap_err("The run ended early")?;

    // ...and we're done
    Ok(())
}
