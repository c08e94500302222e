//! jetfrag: jet fragmentation observables from simulated collisions
//!
//!
//! # Introduction (for the physicist)
//!
//! This program studies how the momentum of a hadronic jet is shared among
//! the particles that make it up. For each generated proton-proton collision,
//! the final-state visible particles are clustered into jets, the jets that
//! come from the hard process are kept, and for each of their constituents we
//! record
//!
//! * the longitudinal momentum fraction z along the jet axis,
//! * the momentum jT transverse to the jet axis,
//! * the (η, φ) distance R to the jet axis.
//!
//!
//! # Introduction (for the computer guy)
//!
//! The program is a straight pipeline:
//!
//! * read in parameters and open the output tables
//! * loop over events, in batches which may run in parallel
//!     * filter the particles of the event
//!     * cluster them into jets, sort and select the jets
//!     * derive the constituent observables
//! * write the records of each batch in event order
//! * then display / store the run statistics.
//!
//! Every event is generated from its own random state, seeded by the run seed
//! and the event number, so the output does not depend on the scheduling.

#![warn(missing_docs)]

pub mod analysis;
pub mod cluster;
pub mod config;
pub mod error;
pub mod evgen;
pub mod filter;
pub mod jet;
pub mod kinematics;
pub mod momentum;
pub mod numeric;
pub mod output;
pub mod particle;
pub mod random;
pub mod record;
pub mod scheduling;
pub mod sink;
pub mod summary;


pub use crate::{
    analysis::Analysis,
    cluster::{GeneralisedKt, JetAlgorithm, JetClusterer, JetDefinition},
    config::Configuration,
    evgen::{EventSource, ToyGenerator},
    filter::ParticleFilter,
    jet::{Jet, JetSelector},
    kinematics::KinematicDeriver,
    record::{ConstituentRecord, JetRecord, RecordBatch},
    scheduling::{CancelToken, RunReport, Termination},
    sink::{CsvSink, MemorySink, RecordSink},
    summary::RunSummary,
};
