//! Per-event analysis: particle filtering, jet clustering, jet selection and
//! derivation of the jet and constituent records

use crate::{
    cluster::{self, JetClusterer, JetDefinition},
    config::Configuration,
    error::{PipelineError, SourceError},
    evgen::EventSource,
    filter::ParticleFilter,
    jet::{self, JetSelector},
    kinematics::KinematicDeriver,
    particle::Event,
    record::RecordBatch,
    scheduling::{self, CancelToken, RunReport},
    sink::RecordSink,
    summary::RunSummary,
};

use std::ops::Range;

use log::{trace, warn};

/// Why a batch of events stopped before its end
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BatchStop {
    /// Cancellation was requested between two events
    Cancelled,

    /// The event source could not produce an event
    SourceFailed {
        /// Event which could not be produced
        event_num: usize,
        /// Source failure
        source: SourceError,
    },
}

/// Output of the analysis of a contiguous range of events
#[derive(Clone, Debug, PartialEq)]
pub struct BatchOutput {
    /// Records of the events that were fully processed, in event order
    pub records: RecordBatch,

    /// Statistics of the events that were fully processed
    pub summary: RunSummary,

    /// Set if the batch did not reach the end of its range
    pub stop: Option<BatchStop>,
}

/// The analysis chain applied to each event
pub struct Analysis<C: JetClusterer> {
    /// Selection of the particles that enter clustering
    pub filter: ParticleFilter,

    /// Jet clustering back-end
    pub clusterer: C,

    /// Jet algorithm and radius handed to the clusterer
    pub jet_def: JetDefinition,

    /// Selection of the jets that get recorded
    pub selector: JetSelector,

    /// Computation of the recorded observables
    pub deriver: KinematicDeriver,
}
//
impl<C: JetClusterer> Analysis<C> {
    /// Set up the analysis chain from the run configuration
    pub fn new(cfg: &Configuration, clusterer: C) -> Self {
        Self {
            filter: ParticleFilter::default(),
            clusterer,
            jet_def: cfg.jet_def,
            selector: JetSelector::from_pt_hat_min(cfg.pt_hat_min),
            deriver: KinematicDeriver::default(),
        }
    }

    /// Analyse one event, returning its jet and constituent records
    pub fn process_event(
        &self,
        event_num: usize,
        event: &Event,
        summary: &mut RunSummary,
    ) -> RecordBatch {
        let mut records = RecordBatch::default();
        summary.events += 1;
        summary.particles += event.particles.len();
        if let Some(pt_hat) = event.pt_hat {
            summary.pt_hat.fill(pt_hat);
        }

        // Keep the particles which may enter clustering
        let eligible = self
            .filter
            .eligible(event, |rejection| summary.record_rejection(rejection));
        let num_eligible = eligible.len();
        summary.eligible_particles += num_eligible;

        // Cluster them, and make sure that no particle was used twice
        let mut jets = self.clusterer.cluster(eligible, &self.jet_def);
        if let Err(e) = cluster::check_exclusive(&jets, num_eligible) {
            warn!("Event {}: rejecting clustering output: {}", event_num, e);
            summary.rejected_events += 1;
            return records;
        }
        summary.clustered_jets += jets.len();

        // Only keep hard enough jets, hardest first
        jet::sort_by_pt(&mut jets);
        let jets = self.selector.select(jets);
        summary.selected_jets += jets.len();

        // Derive the records of the selected jets
        for (jet_idx, jet) in jets.iter().enumerate() {
            match self.deriver.derive(event_num, jet) {
                Ok(observables) => {
                    trace!(
                        "Event {}: jet {} with pt {} and {} constituents",
                        event_num,
                        jet_idx,
                        observables.jet.pt,
                        observables.jet.n_constituents
                    );
                    summary.constituents += observables.constituents.len();
                    records.jets.push(observables.jet);
                    records.constituents.extend(observables.constituents);
                }
                Err(e) => {
                    warn!("Event {}: skipping jet {}: {}", event_num, jet_idx, e);
                    summary.degenerate_jets += 1;
                }
            }
        }
        records
    }

    /// Generate and analyse a range of events
    ///
    /// Cancellation is only checked between events, so that the output never
    /// contains a partial event. A source failure ends the batch; the events
    /// before it are kept.
    ///
    pub fn process_events(
        &self,
        source: &mut impl EventSource,
        events: Range<usize>,
        cancel: &CancelToken,
    ) -> BatchOutput {
        let mut output = BatchOutput {
            records: RecordBatch::default(),
            summary: RunSummary::default(),
            stop: None,
        };
        for event_num in events {
            if cancel.is_cancelled() {
                output.stop = Some(BatchStop::Cancelled);
                break;
            }
            let event = match source.generate(event_num) {
                Ok(event) => event,
                Err(source) => {
                    output.stop = Some(BatchStop::SourceFailed { event_num, source });
                    break;
                }
            };
            let records = self.process_event(event_num, &event, &mut output.summary);
            output.records.append(records);
        }
        output
    }

    /// Analyse `num_events` events from `source`, writing records to `sink`
    ///
    /// Each batch of events works on its own clone of the source. The sink
    /// is finished when this returns, whatever the outcome.
    ///
    pub fn run<S: EventSource + Sync>(
        &self,
        source: &S,
        num_events: usize,
        cancel: &CancelToken,
        sink: &mut impl RecordSink,
    ) -> Result<RunReport, PipelineError> {
        scheduling::run_analysis(
            num_events,
            cancel,
            |events| self.process_events(&mut source.clone(), events, cancel),
            sink,
        )
    }
}
