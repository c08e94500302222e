//! Multi-threaded back-end of the analysis

use crate::{
    analysis::BatchOutput,
    error::PipelineError,
    scheduling::{batches, CancelToken, Integrator},
    sink::RecordSink,
};

use std::{
    ops::Range,
    sync::Mutex,
};

/// Number of batches in flight per worker thread
const BATCHES_PER_THREAD: usize = 2;

/// Analyse events in multi-threaded mode
///
/// Batches are analysed in waves of a few batches per thread. Within a wave,
/// batches run in parallel, but their outputs are integrated in batch order
/// once the wave is over, so that the records are identical to those of a
/// sequential run. Memory usage is bounded by the size of one wave.
///
pub(super) fn run_analysis_impl<S: RecordSink>(
    num_events: usize,
    cancel: &CancelToken,
    process_events: impl Send + Sync + Fn(Range<usize>) -> BatchOutput,
    integrator: &mut Integrator<'_, S>,
) -> Result<(), PipelineError> {
    // Some double-checking cannot hurt...
    assert!(num_events > 0, "Must process at least one event");

    let wave_size = rayon::current_num_threads().max(1) * BATCHES_PER_THREAD;
    let all_batches: Vec<Range<usize>> = batches(num_events).collect();
    for wave in all_batches.chunks(wave_size) {
        if cancel.is_cancelled() {
            integrator.cancel();
            break;
        }

        // Analyse the batches of this wave in parallel
        let outputs = OrderedOutputs::new(wave.len());
        rayon::scope(|scope| {
            for (task_id, batch) in wave.iter().cloned().enumerate() {
                let outputs_ref = &outputs;
                let process_events_ref = &process_events;
                scope.spawn(move |_| {
                    outputs_ref.set_task_output(task_id, process_events_ref(batch));
                });
            }
        });

        // Integrate them in order, stopping at the first interrupted batch
        for output in outputs.into_ordered() {
            if integrator.integrate(output)?.is_break() {
                return Ok(());
            }
        }
    }
    Ok(())
}

/// Storage for the outputs of parallel tasks, retrieved in task order
struct OrderedOutputs {
    outputs: Box<[Mutex<Option<BatchOutput>>]>,
}
//
impl OrderedOutputs {
    /// Set up output storage for N parallel tasks
    fn new(num_tasks: usize) -> Self {
        assert!(num_tasks > 0, "There should be at least one task");
        Self {
            outputs: (0..num_tasks)
                .map(|_| Mutex::new(None))
                .collect::<Vec<_>>()
                .into_boxed_slice(),
        }
    }

    /// Store the output of the n-th task
    fn set_task_output(&self, task_id: usize, output: BatchOutput) {
        let mut lock = self.outputs[task_id]
            .lock()
            .expect("Mutex data should be valid");
        assert!(lock.is_none(), "Tasks should not report outputs twice");
        *lock = Some(output);
    }

    /// Retrieve the task outputs in task order
    fn into_ordered(self) -> impl Iterator<Item = BatchOutput> {
        self.outputs.into_vec().into_iter().map(|entry| {
            entry
                .into_inner()
                .expect("Mutex data should be valid")
                .expect("Output should be ready")
        })
    }
}
