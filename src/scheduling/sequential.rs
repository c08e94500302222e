//! Sequential back-end of the analysis

use crate::{
    analysis::BatchOutput,
    error::PipelineError,
    scheduling::{batches, CancelToken, Integrator},
    sink::RecordSink,
};

use std::ops::Range;

/// Analyse events in sequential mode
///
/// We use batched logic even in sequential mode, in order to hand records
/// over to the sink in the same chunks as multi-threaded runs do.
///
pub(super) fn run_analysis_impl<S: RecordSink>(
    num_events: usize,
    cancel: &CancelToken,
    process_events: impl Fn(Range<usize>) -> BatchOutput,
    integrator: &mut Integrator<'_, S>,
) -> Result<(), PipelineError> {
    // Some double-checking cannot hurt...
    assert!(num_events > 0, "Must process at least one event");

    for batch in batches(num_events) {
        if cancel.is_cancelled() {
            integrator.cancel();
            break;
        }
        if integrator.integrate(process_events(batch))?.is_break() {
            break;
        }
    }
    Ok(())
}
