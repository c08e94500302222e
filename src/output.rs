//! This module is in charge of outputting the final run statistics to the
//! standard output and to the output directory

use crate::{
    config::Configuration,
    error::SinkError,
    numeric::Float,
    summary::RunSummary,
};

use std::{
    fs::File,
    io::{self, Write},
    path::Path,
    time::Duration,
};

use csv::Writer;
use time::{format_description::well_known::Rfc3339, OffsetDateTime};

/// Name of the run summary file
pub const SUMMARY_FILE: &str = "run_summary.txt";

/// Name of the hard-process pt histogram file
pub const PT_HAT_FILE: &str = "pt_hat.csv";

/// Output the run statistics to the console and to disk
pub fn dump_results(
    cfg: &Configuration,
    summary: &RunSummary,
    elapsed_time: Duration,
) -> Result<(), SinkError> {
    // Print out the statistics on stdout
    println!();
    print!("{summary}");

    // Compute a timestamp of when the run ended
    let timestamp = OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .unwrap_or_else(|_| String::from("unknown time"));

    // Write the configuration, statistics and timings to a file
    {
        let mut sum_file = File::create(cfg.output_dir.join(SUMMARY_FILE))?;
        write_summary(&mut sum_file, cfg, summary, elapsed_time, &timestamp)?;
    }

    // Write the hard-process pt distribution
    write_histogram(&cfg.output_dir.join(PT_HAT_FILE), summary)?;

    // ...and we're done
    Ok(())
}

/// Write the plain-text run summary
fn write_summary(
    out: &mut impl Write,
    cfg: &Configuration,
    summary: &RunSummary,
    elapsed_time: Duration,
    timestamp: &str,
) -> io::Result<()> {
    writeln!(out, "{timestamp}")?;
    writeln!(out, "---------------------------------------------")?;
    writeln!(out, "{cfg}")?;
    writeln!(out, "---------------------------------------------")?;
    write!(out, "{summary}")?;
    writeln!(out, "pt_hat below histogram range   : {}", summary.pt_hat.underflow())?;
    writeln!(out, "pt_hat above histogram range   : {}", summary.pt_hat.overflow())?;
    writeln!(out, "---------------------------------------------")?;
    let elapsed_secs = elapsed_time.as_secs_f64() as Float;
    writeln!(out, "Elapsed time (s)               : {elapsed_secs}")?;
    if summary.events > 0 {
        let secs_per_ev = elapsed_secs / summary.events as Float;
        writeln!(out, "Elapsed time per event (s)     : {secs_per_ev}")?;
    }
    Ok(())
}

/// Write the pt_hat histogram, one row per bin
fn write_histogram(path: &Path, summary: &RunSummary) -> Result<(), SinkError> {
    let mut writer = Writer::from_path(path)?;
    for bin in summary.pt_hat.bins() {
        writer.serialize(bin)?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn results_land_in_the_output_directory() {
        let dir = tempfile::tempdir().unwrap();
        let mut cfg = Configuration::parse("10\n17\n0.5\nkt\nout\n1\n").unwrap();
        cfg.output_dir = dir.path().to_owned();
        let mut summary = RunSummary::default();
        summary.events = 10;
        summary.pt_hat.fill(18.);
        summary.pt_hat.fill(250.);

        dump_results(&cfg, &summary, Duration::from_millis(250)).unwrap();

        let text = std::fs::read_to_string(dir.path().join(SUMMARY_FILE)).unwrap();
        assert!(text.contains("Events processed               : 10"));
        assert!(text.contains("ALGORITHM   : kt"));
        assert!(text.contains("Elapsed time per event (s)     : 0.025"));
        assert!(text.contains("pt_hat above histogram range   : 1"));
        assert!(text.contains("pt_hat below histogram range   : 0"));

        let mut rdr = csv::Reader::from_path(dir.path().join(PT_HAT_FILE)).unwrap();
        let headers: Vec<_> = rdr.headers().unwrap().iter().map(str::to_owned).collect();
        assert_eq!(headers, ["low", "high", "count"]);
        let rows: Vec<_> = rdr.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 100);
        assert_eq!(&rows[18][2], "1");
    }
}
