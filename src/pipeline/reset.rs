use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::cipher::ByteTransform;
use crate::error::{PipelineError, Result};
use crate::tally::CountReport;

use super::context::PipelineContext;

/// Out-of-band access to a pipeline's reset coordinator.
///
/// Cheap to clone and usable from any thread, before, during or after
/// [`Pipeline::run`](super::Pipeline::run). Concurrent resets are served
/// one at a time.
#[derive(Clone)]
pub struct ResetHandle {
    ctx: Arc<PipelineContext>,
}

impl ResetHandle {
    pub(crate) fn new(ctx: Arc<PipelineContext>) -> Self {
        Self { ctx }
    }

    /// Freeze the source, drain every in-flight byte, zero cursors and
    /// tallies, and report the window that just closed.
    ///
    /// If the reporter fails the reset still takes effect; the closed window
    /// comes back inside [`PipelineError::Report`].
    pub fn reset(&self) -> Result<CountReport> {
        self.coordinate(None, None)
    }

    /// Reset and install `transform` for every byte admitted afterwards.
    pub fn rekey(&self, transform: impl ByteTransform + 'static) -> Result<CountReport> {
        self.coordinate(Some(Box::new(transform)), None)
    }

    /// Reset, giving up with [`PipelineError::ResetTimedOut`] if the source
    /// cannot be frozen and drained within `timeout`. A timed-out reset
    /// changes nothing.
    pub fn reset_timeout(&self, timeout: Duration) -> Result<CountReport> {
        self.coordinate(None, Some(timeout))
    }

    /// Windows closed so far: every completed reset, plus the final window
    /// once [`run`](super::Pipeline::run) has finished.
    pub fn epoch(&self) -> u64 {
        self.ctx.epoch()
    }

    /// Resets currently waiting for (or holding) the source.
    pub fn pending(&self) -> usize {
        self.ctx.turnstile.pending()
    }

    /// Bytes admitted since the pipeline was built.
    pub fn admitted(&self) -> u64 {
        self.ctx.admitted.load(Ordering::Relaxed)
    }

    fn coordinate(
        &self,
        rekey: Option<Box<dyn ByteTransform>>,
        timeout: Option<Duration>,
    ) -> Result<CountReport> {
        let ctx = &*self.ctx;
        let deadline = timeout.map(|t| Instant::now() + t);
        let timed_out = || PipelineError::ResetTimedOut(timeout.unwrap_or_default());

        let _request = ctx.turnstile.request();
        let admission = match deadline {
            Some(deadline) => ctx.admission.try_lock_until(deadline).ok_or_else(timed_out)?,
            None => ctx.admission.lock(),
        };

        // Stable while we hold the admission lock.
        let target = ctx.admitted.load(Ordering::Relaxed);
        debug!(target, "reset: source frozen, draining");
        match deadline {
            Some(deadline) => {
                if !ctx.drain.wait_for_until(target, deadline) {
                    warn!(target, "reset: drain did not complete in time");
                    return Err(timed_out());
                }
            }
            None => ctx.drain.wait_for(target),
        }

        ctx.pre.rewind();
        ctx.post.rewind();
        let report = CountReport {
            epoch: ctx.epoch(),
            pre: ctx.pre_tally.take(),
            post: ctx.post_tally.take(),
        };
        let rekeyed = rekey.is_some();
        if let Some(transform) = rekey {
            *ctx.transform.lock() = transform;
        }
        ctx.epoch.fetch_add(1, Ordering::Relaxed);
        info!(
            epoch = report.epoch,
            input = report.pre.total(),
            output = report.post.total(),
            rekeyed,
            "reset"
        );

        let reported = ctx.reporter.lock().report(&report);
        drop(admission);
        match reported {
            Ok(()) => Ok(report),
            Err(source) => Err(PipelineError::Report {
                report: Box::new(report),
                source,
            }),
        }
    }
}
