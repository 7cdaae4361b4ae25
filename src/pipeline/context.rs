use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;
use tracing::warn;

use crate::cipher::ByteTransform;
use crate::error::PipelineError;
use crate::ring::RingBuffer;
use crate::sequencer::{DrainBarrier, Gate, Turnstile};
use crate::tally::Tally;

use super::collab::CountReporter;

/// Everything the five stages and the reset coordinator share.
///
/// Each field has a single designated writer (see the stage functions);
/// reset mutates buffers, tallies and the transform only while it holds
/// `admission` and the drain barrier reports every stage quiescent.
pub(crate) struct PipelineContext {
    pub(crate) pre: RingBuffer,
    pub(crate) post: RingBuffer,
    pub(crate) pre_tally: Tally,
    pub(crate) post_tally: Tally,
    pub(crate) pre_gate: Gate,
    pub(crate) post_gate: Gate,
    pub(crate) drain: DrainBarrier,
    pub(crate) turnstile: Turnstile,
    /// Held by the source for one admission at a time, and by reset.
    pub(crate) admission: Mutex<()>,
    pub(crate) transform: Mutex<Box<dyn ByteTransform>>,
    pub(crate) reporter: Mutex<Box<dyn CountReporter>>,
    /// Bytes admitted since the pipeline was built. Never reset.
    pub(crate) admitted: AtomicU64,
    /// Bytes the sink handed to its output.
    pub(crate) emitted: AtomicU64,
    /// Windows closed so far.
    pub(crate) epoch: AtomicU64,
    failure: Mutex<Option<PipelineError>>,
}

impl PipelineContext {
    pub(crate) fn new(
        pre: RingBuffer,
        post: RingBuffer,
        transform: Box<dyn ByteTransform>,
        reporter: Box<dyn CountReporter>,
    ) -> Self {
        Self {
            pre,
            post,
            pre_tally: Tally::new(),
            post_tally: Tally::new(),
            pre_gate: Gate::new(),
            post_gate: Gate::new(),
            drain: DrainBarrier::new(),
            turnstile: Turnstile::new(),
            admission: Mutex::new(()),
            transform: Mutex::new(transform),
            reporter: Mutex::new(reporter),
            admitted: AtomicU64::new(0),
            emitted: AtomicU64::new(0),
            epoch: AtomicU64::new(0),
            failure: Mutex::new(None),
        }
    }

    /// Record a collaborator failure. The first one wins; later ones are
    /// only logged.
    pub(crate) fn fail(&self, err: PipelineError) {
        let mut slot = self.failure.lock();
        if slot.is_none() {
            *slot = Some(err);
        } else {
            warn!(error = %err, "additional pipeline failure");
        }
    }

    pub(crate) fn take_failure(&self) -> Option<PipelineError> {
        self.failure.lock().take()
    }

    pub(crate) fn epoch(&self) -> u64 {
        self.epoch.load(Ordering::Relaxed)
    }
}
