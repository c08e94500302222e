//! Error types of the analysis pipeline

use crate::numeric::Float;

use std::path::PathBuf;

use thiserror::Error;

/// Problems with the run configuration. These are fatal and are reported
/// before any event is processed.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read
    #[error("could not read configuration file {path:?}: {source}")]
    Unreadable {
        /// File that was looked up
        path: PathBuf,
        /// Underlying I/O failure
        source: std::io::Error,
    },

    /// The file ended before this item
    #[error("missing configuration of {0}")]
    Missing(&'static str),

    /// An item could not be decoded
    #[error("could not parse configuration of {name} from {data:?}: {source}")]
    Parse {
        /// Name of the configuration item
        name: &'static str,
        /// Raw text of the item
        data: String,
        /// Parser error
        source: Box<dyn std::error::Error + Send + Sync + 'static>,
    },

    /// Zero events were requested
    #[error("please process at least one event")]
    InvalidEventCount,

    /// Non-positive or non-finite jet radius
    #[error("jet radius must be positive, got {0}")]
    InvalidRadius(Float),

    /// Negative or non-finite hard-process pt cutoff
    #[error("minimum hard-process pT must be finite and non-negative, got {0}")]
    InvalidPtHatMin(Float),

    /// Hard-process pt cutoff that the beams cannot reach
    #[error("minimum hard-process pT {pt_hat_min} GeV is not below the beam energy {e_beam} GeV")]
    PtHatAboveBeam {
        /// Configured cutoff
        pt_hat_min: Float,
        /// Energy of one beam, the largest reachable pT
        e_beam: Float,
    },

    /// The record tables could not be created
    #[error("output directory {path:?} is not writable: {source}")]
    UnwritableOutput {
        /// Configured output directory
        path: PathBuf,
        /// Failure to create the tables
        source: SinkError,
    },
}

/// Failures of an event source
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SourceError {
    /// A finite source ran out of events
    #[error("event source exhausted after {produced} events")]
    Exhausted {
        /// Number of events the source could produce
        produced: usize,
    },

    /// Any other generator failure
    #[error("event generation failed: {0}")]
    Failed(String),
}

/// A selected jet whose 3-momentum is too small for z and jT to be defined
#[derive(Debug, Error, Clone, Copy, PartialEq)]
#[error("jet momentum magnitude {magnitude} GeV is below {tolerance} GeV")]
pub struct DegenerateJet {
    /// Magnitude of the jet 3-momentum
    pub magnitude: Float,

    /// Smallest magnitude that the deriver accepts
    pub tolerance: Float,
}

/// Violations of the jet clustering output contract
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ClusterError {
    /// A particle was assigned to two jets
    #[error("particle {index} was assigned to more than one jet")]
    SharedConstituent {
        /// Eligible index of the particle
        index: usize,
    },

    /// A jet constituent was not one of the inputs
    #[error("jet constituent {index} is not one of the {count} clustered particles")]
    UnknownConstituent {
        /// Index carried by the constituent
        index: usize,
        /// Number of particles handed to the clusterer
        count: usize,
    },
}

/// Errors that can occur when writing records
#[derive(Debug, Error)]
pub enum SinkError {
    /// Filesystem failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV serialization failure
    #[error("CSV write error: {0}")]
    Csv(#[from] csv::Error),

    /// Records were appended after finish()
    #[error("sink was already finished")]
    Finished,
}

/// Errors which abort an analysis run
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Invalid configuration
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The event source failed
    #[error("event {event_num} could not be generated: {source}")]
    Generator {
        /// Event which could not be produced
        event_num: usize,
        /// Source failure
        source: SourceError,
    },

    /// Records could not be written
    #[error("failed to write records: {0}")]
    Sink(#[from] SinkError),
}
