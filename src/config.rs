//! Mechanism for loading and sharing the run configuration

use crate::{
    cluster::{JetAlgorithm, JetDefinition},
    error::ConfigError,
    evgen::DEFAULT_E_CM,
    numeric::Float,
    sink::CsvSink,
};

use std::{
    fmt::{self, Display},
    fs,
    path::{Path, PathBuf},
    str::FromStr,
};

/// Configuration file read when none is given on the command line
pub const DEFAULT_CONFIG_FILE: &str = "jetfrag.cfg";

/// Run configuration
#[derive(Clone, Debug, PartialEq)]
pub struct Configuration {
    /// Number of events to be processed
    pub num_events: usize,

    /// Minimal transverse momentum of the hard process (GeV/c). Sets both the
    /// generator cutoff and the jet selection threshold.
    pub pt_hat_min: Float,

    /// Jet algorithm and radius
    pub jet_def: JetDefinition,

    /// Directory receiving the record tables and run summary
    pub output_dir: PathBuf,

    /// Seed of the event source
    pub seed: u64,
}
//
impl Configuration {
    /// Load the configuration from a file and check it
    ///
    /// Configuration items are the first non-whitespace chunk of text on each
    /// line, in a fixed order; the rest of the line is free-form commentary.
    /// Blank lines are ignored.
    ///
    pub fn load(file_name: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = file_name.as_ref();
        let config_str = fs::read_to_string(path).map_err(|source| ConfigError::Unreadable {
            path: path.to_owned(),
            source,
        })?;
        let config = Self::parse(&config_str)?;
        config.validate()?;
        Ok(config)
    }

    /// Decode the configuration items, without checking them
    pub fn parse(config_str: &str) -> Result<Self, ConfigError> {
        let mut config_iter = config_str
            .lines()
            .filter_map(|line| line.split_whitespace().next());

        // This closure fetches the next configuration item, tagging it with
        // the name of the configuration field which it is supposed to fill to
        // ease error reporting, and handling unexpected end-of-file too.
        let mut next_item = |name: &'static str| -> Result<ConfigItem, ConfigError> {
            config_iter
                .next()
                .map(|data| ConfigItem::new(name, data))
                .ok_or(ConfigError::Missing(name))
        };

        Ok(Configuration {
            num_events: next_item("num_events")?.parse::<usize>()?,
            pt_hat_min: next_item("pt_hat_min")?.parse::<Float>()?,
            jet_def: JetDefinition {
                radius: next_item("radius")?.parse::<Float>()?,
                algorithm: next_item("algorithm")?.parse::<JetAlgorithm>()?,
            },
            output_dir: next_item("output_dir")?.parse::<PathBuf>()?,
            seed: next_item("seed")?.parse::<u64>()?,
        })
    }

    /// Check that the configuration describes a sensible run
    pub fn validate(&self) -> Result<(), ConfigError> {
        // A sensible run must process at least one event
        if self.num_events == 0 {
            return Err(ConfigError::InvalidEventCount);
        }

        // A NaN radius must fail too, hence the negated comparison
        let radius = self.jet_def.radius;
        if !(radius > 0.) || !radius.is_finite() {
            return Err(ConfigError::InvalidRadius(radius));
        }

        if !(self.pt_hat_min >= 0.) || !self.pt_hat_min.is_finite() {
            return Err(ConfigError::InvalidPtHatMin(self.pt_hat_min));
        }

        // No hard scattering can be harder than one beam
        let e_beam = DEFAULT_E_CM / 2.;
        if self.pt_hat_min >= e_beam {
            return Err(ConfigError::PtHatAboveBeam {
                pt_hat_min: self.pt_hat_min,
                e_beam,
            });
        }
        Ok(())
    }

    /// Open the record tables in the output directory, before any event is
    /// processed
    pub fn open_sink(&self) -> Result<CsvSink, ConfigError> {
        CsvSink::create(&self.output_dir).map_err(|source| ConfigError::UnwritableOutput {
            path: self.output_dir.clone(),
            source,
        })
    }
}

impl Display for Configuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "NEVENTS     : {}", self.num_events)?;
        writeln!(f, "PTHATMIN    : {}", self.pt_hat_min)?;
        writeln!(f, "RADIUS      : {}", self.jet_def.radius)?;
        writeln!(f, "ALGORITHM   : {}", self.jet_def.algorithm)?;
        writeln!(f, "OUTPUT      : {}", self.output_dir.display())?;
        write!(f, "SEED        : {}", self.seed)
    }
}

/// A value from the configuration file, tagged with the struct field which it
/// is supposed to map for error reporting purposes.
struct ConfigItem<'data> {
    name: &'static str,
    data: &'data str,
}
//
impl<'data> ConfigItem<'data> {
    /// Build a config item from a struct field tag and raw iterator data
    fn new(name: &'static str, data: &'data str) -> Self {
        Self { name, data }
    }

    /// Parse this data using Rust's standard parsing logic
    fn parse<T: FromStr>(self) -> Result<T, ConfigError>
    where
        <T as FromStr>::Err: std::error::Error + Send + Sync + 'static,
    {
        self.data.parse::<T>().map_err(|e| ConfigError::Parse {
            name: self.name,
            data: self.data.to_owned(),
            source: Box::new(e),
        })
    }
}
