use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use parking_lot::{Condvar, Mutex};

/// A latched binary signal.
///
/// `raise` sets the signal and wakes a waiter; `wait` blocks until the signal
/// is set, then clears it. A raise that happens before anyone waits is kept
/// for the next `wait`. Raising an already-raised signal is a no-op, so the
/// signal never counts past one.
#[derive(Debug, Default)]
pub struct Signal {
    raised: Mutex<bool>,
    cond: Condvar,
}

impl Signal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn raise(&self) {
        let mut raised = self.raised.lock();
        *raised = true;
        self.cond.notify_one();
    }

    pub fn wait(&self) {
        let mut raised = self.raised.lock();
        while !*raised {
            self.cond.wait(&mut raised);
        }
        *raised = false;
    }

    /// Like [`wait`](Self::wait) but gives up at `deadline`.
    /// Returns `true` if the signal was consumed.
    pub fn wait_until(&self, deadline: Instant) -> bool {
        let mut raised = self.raised.lock();
        while !*raised {
            if self.cond.wait_until(&mut raised, deadline).timed_out() {
                break;
            }
        }
        std::mem::replace(&mut *raised, false)
    }

    pub fn is_raised(&self) -> bool {
        *self.raised.lock()
    }
}

/// The two consumers every buffer has: one that only tallies, and one that
/// moves the byte further down the line (transform for the pre buffer, sink
/// for the post buffer).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Consumer {
    Counter,
    Forward,
}

impl Consumer {
    pub const ALL: [Consumer; 2] = [Consumer::Counter, Consumer::Forward];

    #[inline]
    pub(crate) fn index(self) -> usize {
        match self {
            Consumer::Counter => 0,
            Consumer::Forward => 1,
        }
    }
}

/// Two-phase hand-off between one producer and the two consumers of a buffer.
///
/// The producer writes a slot, calls [`announce`](Gate::announce), then
/// [`await_acks`](Gate::await_acks). Each consumer calls
/// [`await_ready`](Gate::await_ready), reads the slot, then
/// [`ack`](Gate::ack). Because the producer does not return from
/// `await_acks` until both consumers acked, at most one item is pending per
/// gate regardless of the buffer's capacity.
///
/// End of stream is announced exactly once with [`close`](Gate::close). The
/// ready signals latch, so a consumer that is not yet waiting still observes
/// it.
#[derive(Debug, Default)]
pub struct Gate {
    ready: [Signal; 2],
    done: [Signal; 2],
    closed: AtomicBool,
}

impl Gate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tell both consumers an item is available.
    pub fn announce(&self) {
        debug_assert!(!self.is_closed(), "item announced after end of stream");
        for ready in &self.ready {
            ready.raise();
        }
    }

    /// Announce the end-of-stream item. No item may follow.
    pub fn close(&self) {
        let was_closed = self.closed.swap(true, Ordering::AcqRel);
        debug_assert!(!was_closed, "end of stream announced twice");
        for ready in &self.ready {
            ready.raise();
        }
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Block until both consumers acknowledged the last announced item.
    pub fn await_acks(&self) {
        for done in &self.done {
            done.wait();
        }
    }

    pub fn await_ready(&self, consumer: Consumer) {
        self.ready[consumer.index()].wait();
    }

    pub fn ack(&self, consumer: Consumer) {
        self.done[consumer.index()].raise();
    }
}
