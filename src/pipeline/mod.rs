//! The five-stage encryption pipeline.
//!
//! ```text
//!                ┌─▶ pre-count
//! source ─▶ pre ─┤
//!                └─▶ transform ─▶ post ─┬─▶ post-count
//!                                       └─▶ sink ─▶ output
//! ```
//!
//! Each buffer holds at most one unconsumed item: a producer announces an
//! item on its [`Gate`](crate::sequencer::Gate) and blocks until both
//! consumers acknowledged it. A [`ResetHandle`] can interleave resets at any
//! time; a reset waits for in-flight bytes to finish before it zeroes and
//! reports the tallies.

mod collab;
mod context;
mod reset;
mod stages;


use std::io;
use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::thread;
use std::time::{Duration, Instant};

use tracing::info;

use crate::cipher::{ByteTransform, OffsetCipher};
use crate::error::{PipelineError, Result};
use crate::ring::RingBuffer;
use crate::tally::CountReport;

pub use self::collab::{
    ByteSink, ByteSource, CountReporter, FileSource, LogReporter, MemoryReporter, ReaderSource,
    Streams, WriterSink,
};
pub use self::reset::ResetHandle;

use self::context::PipelineContext;

/// Outcome of a completed [`Pipeline::run`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    /// Bytes the source admitted.
    pub admitted: u64,
    /// Bytes the sink handed to its output.
    pub emitted: u64,
    /// Resets completed before the final window closed.
    pub resets: u64,
    /// The window reported at shutdown (everything since the last reset).
    pub last: CountReport,
    pub elapsed: Duration,
}

/// Configures and allocates a [`Pipeline`].
pub struct PipelineBuilder {
    input_capacity: usize,
    output_capacity: usize,
    transform: Box<dyn ByteTransform>,
    reporter: Box<dyn CountReporter>,
}

impl Default for PipelineBuilder {
    fn default() -> Self {
        Self {
            input_capacity: 1,
            output_capacity: 1,
            transform: Box::new(OffsetCipher(0)),
            reporter: Box::new(LogReporter::new(io::sink())),
        }
    }
}

impl PipelineBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Slots in the buffer between the source and the transform.
    pub fn input_capacity(mut self, n: usize) -> Self {
        self.input_capacity = n;
        self
    }

    /// Slots in the buffer between the transform and the sink.
    pub fn output_capacity(mut self, m: usize) -> Self {
        self.output_capacity = m;
        self
    }

    pub fn transform(mut self, transform: impl ByteTransform + 'static) -> Self {
        self.transform = Box::new(transform);
        self
    }

    pub fn reporter(mut self, reporter: impl CountReporter + 'static) -> Self {
        self.reporter = Box::new(reporter);
        self
    }

    /// Validate the capacities and allocate both buffers.
    pub fn build(self) -> Result<Pipeline> {
        let pre = RingBuffer::with_capacity(self.input_capacity)?;
        let post = RingBuffer::with_capacity(self.output_capacity)?;
        let ctx = PipelineContext::new(pre, post, self.transform, self.reporter);
        Ok(Pipeline { ctx: Arc::new(ctx) })
    }
}

/// A ready-to-run pipeline. Consumed by [`run`](Pipeline::run).
pub struct Pipeline {
    ctx: Arc<PipelineContext>,
}

impl Pipeline {
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::new()
    }

    pub fn reset_handle(&self) -> ResetHandle {
        ResetHandle::new(Arc::clone(&self.ctx))
    }

    pub fn input_capacity(&self) -> usize {
        self.ctx.pre.capacity()
    }

    pub fn output_capacity(&self) -> usize {
        self.ctx.post.capacity()
    }

    /// Run all five stages until the source is exhausted, then report the
    /// final window.
    ///
    /// Stages run on scoped threads and are all joined before this returns.
    /// The first collaborator failure (read, write, or the final report) is
    /// returned after the stream has fully drained.
    pub fn run<S, K>(self, source: &mut S, sink: &mut K) -> Result<RunSummary>
    where
        S: ByteSource,
        K: ByteSink,
    {
        let ctx = &*self.ctx;
        let started = Instant::now();
        info!(
            input_capacity = ctx.pre.capacity(),
            output_capacity = ctx.post.capacity(),
            "pipeline starting"
        );

        let panicked = thread::scope(|scope| {
            let handles = [
                ("source", scope.spawn(move || stages::source(ctx, source))),
                ("pre-count", scope.spawn(move || stages::pre_count(ctx))),
                ("transform", scope.spawn(move || stages::transform(ctx))),
                ("post-count", scope.spawn(move || stages::post_count(ctx))),
                ("sink", scope.spawn(move || stages::sink(ctx, sink))),
            ];
            let mut panicked = None;
            for (name, handle) in handles {
                if handle.join().is_err() && panicked.is_none() {
                    panicked = Some(name);
                }
            }
            panicked
        });
        if let Some(name) = panicked {
            return Err(PipelineError::StagePanicked(name));
        }

        // Exclude any reset still in progress while the last window closes.
        // The final window takes an epoch of its own, like a reset does.
        let admission = ctx.admission.lock();
        let last = CountReport {
            epoch: ctx.epoch.fetch_add(1, Ordering::Relaxed),
            pre: ctx.pre_tally.take(),
            post: ctx.post_tally.take(),
        };
        let reported = ctx.reporter.lock().report(&last);
        drop(admission);

        if let Some(err) = ctx.take_failure() {
            return Err(err);
        }
        if let Err(source) = reported {
            return Err(PipelineError::Report {
                report: Box::new(last),
                source,
            });
        }

        let summary = RunSummary {
            admitted: ctx.admitted.load(Ordering::Relaxed),
            emitted: ctx.emitted.load(Ordering::Relaxed),
            resets: last.epoch,
            last,
            elapsed: started.elapsed(),
        };
        info!(
            admitted = summary.admitted,
            emitted = summary.emitted,
            resets = summary.resets,
            elapsed_ms = summary.elapsed.as_millis() as u64,
            "pipeline finished"
        );
        Ok(summary)
    }
}
