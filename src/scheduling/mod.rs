//! This module takes care of scheduling the analysis work, encapsulating use
//! of multiple threads and the delivery of records to the sink

#[cfg(not(feature = "multi-threading"))]
mod sequential;
#[cfg(feature = "multi-threading")]
mod multi_threading;

use crate::{
    analysis::{BatchOutput, BatchStop},
    error::{ConfigError, PipelineError, SourceError},
    sink::RecordSink,
    summary::RunSummary,
};

use std::{
    ops::{ControlFlow, Range},
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
};

use log::{info, warn};

/// Size of the analysed event batches
///
/// Events are grouped in batches in order to amortize the cost of handing
/// records over to the sink and, in multi-threaded mode, of task scheduling.
/// Batches are always integrated in order, which makes the output identical
/// between sequential and parallel runs.
///
pub const EVENT_BATCH_SIZE: usize = 1_000;

/// Cooperative cancellation flag, checked between events
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);
//
impl CancelToken {
    /// Request that processing stops before the next event
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    /// Truth that cancellation was requested
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// How an analysis run ended
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Termination {
    /// All requested events were processed
    Completed,

    /// Cancellation was requested
    Cancelled,

    /// The event source failed; records of earlier events were kept
    SourceFailed {
        /// Event which could not be produced
        event_num: usize,
        /// Source failure
        source: SourceError,
    },
}

/// Outcome of an analysis run
#[derive(Clone, Debug, PartialEq)]
pub struct RunReport {
    /// Statistics of the processed events
    pub summary: RunSummary,

    /// How the run ended
    pub termination: Termination,
}
//
impl RunReport {
    /// Turn a source failure into an error
    pub fn into_result(self) -> Result<RunSummary, PipelineError> {
        match self.termination {
            Termination::SourceFailed { event_num, source } => {
                Err(PipelineError::Generator { event_num, source })
            }
            Termination::Completed | Termination::Cancelled => Ok(self.summary),
        }
    }
}

/// Run the analysis in the manner that was configured at build time.
///
/// Takes as parameters the total number of events to be processed, a kernel
/// that analyses a range of events, and the sink that receives the records.
/// The sink is finished on every exit path, including errors.
///
pub fn run_analysis(
    num_events: usize,
    cancel: &CancelToken,
    process_events: impl Send + Sync + Fn(Range<usize>) -> BatchOutput,
    sink: &mut impl RecordSink,
) -> Result<RunReport, PipelineError> {
    // Configuration checks this too, but library users may bypass it
    if num_events == 0 {
        sink.finish()?;
        return Err(ConfigError::InvalidEventCount.into());
    }

    // Integrate the batch outputs...
    let mut integrator = Integrator::new(sink);
    let outcome = {
        // ...in sequential mode
        #[cfg(not(feature = "multi-threading"))]
        {
            sequential::run_analysis_impl(num_events, cancel, process_events, &mut integrator)
        }

        // ...in multi-threaded mode
        #[cfg(feature = "multi-threading")]
        {
            multi_threading::run_analysis_impl(num_events, cancel, process_events, &mut integrator)
        }
    };
    let (summary, termination) = integrator.into_parts();

    // Finalize the records whatever happened
    let finished = sink.finish();
    outcome?;
    finished?;

    match &termination {
        Termination::Completed => info!("Processed {} events", summary.events),
        Termination::Cancelled => warn!("Cancelled after {} events", summary.events),
        Termination::SourceFailed { event_num, source } => {
            warn!("Event source failed at event {}: {}", event_num, source)
        }
    }
    Ok(RunReport {
        summary,
        termination,
    })
}

/// Split [0, num_events) into consecutive batches
fn batches(num_events: usize) -> impl Iterator<Item = Range<usize>> {
    (0..num_events)
        .step_by(EVENT_BATCH_SIZE)
        .map(move |start| start..(start + EVENT_BATCH_SIZE).min(num_events))
}

/// Hands batch outputs over to the sink, in batch order
struct Integrator<'sink, S: RecordSink> {
    sink: &'sink mut S,
    summary: RunSummary,
    termination: Termination,
}
//
impl<'sink, S: RecordSink> Integrator<'sink, S> {
    fn new(sink: &'sink mut S) -> Self {
        Self {
            sink,
            summary: RunSummary::default(),
            termination: Termination::Completed,
        }
    }

    /// Integrate the output of the next batch, telling whether to go on
    fn integrate(&mut self, output: BatchOutput) -> Result<ControlFlow<()>, PipelineError> {
        self.sink.append(&output.records)?;
        self.summary.merge(&output.summary);
        match output.stop {
            None => Ok(ControlFlow::Continue(())),
            Some(BatchStop::Cancelled) => {
                self.cancel();
                Ok(ControlFlow::Break(()))
            }
            Some(BatchStop::SourceFailed { event_num, source }) => {
                self.termination = Termination::SourceFailed { event_num, source };
                Ok(ControlFlow::Break(()))
            }
        }
    }

    /// Record that the run was cancelled between two batches
    fn cancel(&mut self) {
        self.summary.cancelled = true;
        self.termination = Termination::Cancelled;
    }

    fn into_parts(self) -> (RunSummary, Termination) {
        (self.summary, self.termination)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::MemorySink;

    #[test]
    fn batches_cover_the_range() {
        let ranges: Vec<_> = batches(2 * EVENT_BATCH_SIZE + 3).collect();
        assert_eq!(
            ranges,
            [
                0..EVENT_BATCH_SIZE,
                EVENT_BATCH_SIZE..2 * EVENT_BATCH_SIZE,
                2 * EVENT_BATCH_SIZE..2 * EVENT_BATCH_SIZE + 3
            ]
        );
        assert_eq!(batches(5).collect::<Vec<_>>(), [0..5]);
    }

    #[test]
    fn empty_runs_are_refused() {
        let mut sink = MemorySink::default();
        let result = run_analysis(0, &CancelToken::default(), |_| unreachable!(), &mut sink);
        assert!(matches!(
            result,
            Err(PipelineError::Config(ConfigError::InvalidEventCount))
        ));
        assert!(sink.is_finished());
    }

    #[test]
    fn cancel_tokens_are_shared() {
        let token = CancelToken::default();
        let clone = token.clone();
        assert!(!clone.is_cancelled());
        token.cancel();
        assert!(clone.is_cancelled());
    }
}
