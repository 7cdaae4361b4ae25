//! The five stage loops. Each runs on its own thread for the lifetime of
//! the stream and returns after it has seen the end-of-stream item.

use std::sync::atomic::Ordering;

use tracing::{debug, error, trace, warn};

use crate::error::PipelineError;
use crate::ring::Item;
use crate::sequencer::{Consumer, Stage};

use super::collab::{ByteSink, ByteSource};
use super::context::PipelineContext;

/// Admit input one item at a time into the pre buffer.
///
/// Each admission happens under the admission lock and is not complete
/// until both pre consumers acknowledged it. A read failure ends the input.
pub(crate) fn source(ctx: &PipelineContext, input: &mut dyn ByteSource) {
    debug!("source started");
    loop {
        ctx.turnstile.pass();
        let admission = ctx.admission.lock();

        let item = match input.next_byte() {
            Ok(Some(b)) => Item::Byte(b),
            Ok(None) => Item::End,
            Err(e) => {
                error!(error = %e, "input failed; ending stream");
                ctx.fail(PipelineError::Read(e));
                Item::End
            }
        };

        ctx.pre.push(item);
        match item {
            Item::Byte(b) => {
                let n = ctx.admitted.fetch_add(1, Ordering::Relaxed) + 1;
                trace!(byte = b, admitted = n, "admitted");
                ctx.pre_gate.announce();
            }
            Item::End => ctx.pre_gate.close(),
        }
        ctx.pre_gate.await_acks();
        drop(admission);

        if item.is_end() {
            break;
        }
    }
    debug!("source finished");
}

/// Tally every admitted byte.
pub(crate) fn pre_count(ctx: &PipelineContext) {
    debug!("pre-count started");
    loop {
        ctx.pre_gate.await_ready(Consumer::Counter);
        let item = ctx.pre.pop(Consumer::Counter);
        if let Item::Byte(b) = item {
            ctx.pre_tally.record(b);
        }
        ctx.pre_gate.ack(Consumer::Counter);
        if item.is_end() {
            break;
        }
        ctx.drain.mark(Stage::PreCount);
    }
    debug!("pre-count finished");
}

/// Encrypt every admitted byte into the post buffer.
///
/// The source is released as soon as the byte has been read, so it can
/// fetch its next input while this stage hands the result downstream.
pub(crate) fn transform(ctx: &PipelineContext) {
    debug!("transform started");
    loop {
        ctx.pre_gate.await_ready(Consumer::Forward);
        let item = ctx.pre.pop(Consumer::Forward);
        ctx.pre_gate.ack(Consumer::Forward);

        match item {
            Item::Byte(b) => {
                let out = ctx.transform.lock().apply(b);
                ctx.post.push(Item::Byte(out));
                ctx.post_gate.announce();
                ctx.drain.mark(Stage::Transform);
                ctx.post_gate.await_acks();
            }
            Item::End => {
                // Post consumers drain on their own; nobody waits on them.
                ctx.post.push(Item::End);
                ctx.post_gate.close();
                break;
            }
        }
    }
    debug!("transform finished");
}

/// Tally every transformed byte.
pub(crate) fn post_count(ctx: &PipelineContext) {
    debug!("post-count started");
    loop {
        ctx.post_gate.await_ready(Consumer::Counter);
        let item = ctx.post.pop(Consumer::Counter);
        if let Item::Byte(b) = item {
            ctx.post_tally.record(b);
        }
        ctx.post_gate.ack(Consumer::Counter);
        if item.is_end() {
            break;
        }
        ctx.drain.mark(Stage::PostCount);
    }
    debug!("post-count finished");
}

/// Hand every transformed byte to the output.
///
/// After a write failure the sink keeps consuming (and discarding) so the
/// other stages can still run to the end of the stream.
pub(crate) fn sink(ctx: &PipelineContext, output: &mut dyn ByteSink) {
    debug!("sink started");
    let mut healthy = true;
    loop {
        ctx.post_gate.await_ready(Consumer::Forward);
        let item = ctx.post.pop(Consumer::Forward);
        match item {
            Item::Byte(b) if healthy => match output.emit(b) {
                Ok(()) => {
                    ctx.emitted.fetch_add(1, Ordering::Relaxed);
                }
                Err(e) => {
                    error!(error = %e, "output failed; discarding the rest of the stream");
                    ctx.fail(PipelineError::Write(e));
                    healthy = false;
                }
            },
            Item::Byte(_) => {}
            Item::End => {
                if healthy && let Err(e) = output.flush() {
                    warn!(error = %e, "output flush failed");
                    ctx.fail(PipelineError::Write(e));
                }
            }
        }
        ctx.post_gate.ack(Consumer::Forward);
        if item.is_end() {
            break;
        }
        ctx.drain.mark(Stage::Sink);
    }
    debug!("sink finished");
}
