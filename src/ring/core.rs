use std::sync::atomic::{AtomicU16, AtomicUsize, Ordering};

use crate::error::{PipelineError, Result};
use crate::sequencer::Consumer;

/// Slot value of the end-of-stream marker. Every real byte is `<= 0xFF`.
const END_MARK: u16 = 0x100;

/// One logical item travelling through a buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Item {
    Byte(u8),
    End,
}

impl Item {
    #[inline]
    pub fn is_end(self) -> bool {
        matches!(self, Item::End)
    }

    #[inline]
    fn encode(self) -> u16 {
        match self {
            Item::Byte(b) => b as u16,
            Item::End => END_MARK,
        }
    }

    #[inline]
    fn decode(raw: u16) -> Item {
        if raw & END_MARK != 0 {
            Item::End
        } else {
            Item::Byte(raw as u8)
        }
    }
}

/// Snapshot of a buffer's cursors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Cursors {
    pub write: usize,
    pub counter: usize,
    pub forward: usize,
}

/// Fixed-capacity circular slots between one producer and two consumers.
///
/// Each cursor has a single writer: the producer owns `write`, and each
/// [`Consumer`] owns its own read cursor, so the counting consumer never
/// reads through a cursor the forwarding consumer already advanced.
/// Slots and cursors are relaxed atomics; ordering between writer and readers
/// comes from the [`Gate`](crate::sequencer::Gate) hand-off around each
/// access.
#[derive(Debug)]
pub struct RingBuffer {
    slots: Box<[AtomicU16]>,
    write: AtomicUsize,
    reads: [AtomicUsize; 2],
}

impl RingBuffer {
    /// Allocate a buffer with `capacity` slots.
    ///
    /// Zero is rejected; an allocation failure is reported instead of
    /// aborting the process.
    pub fn with_capacity(capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(PipelineError::InvalidCapacity(capacity));
        }
        let mut slots = Vec::new();
        slots
            .try_reserve_exact(capacity)
            .map_err(|_| PipelineError::Allocation { capacity })?;
        slots.extend((0..capacity).map(|_| AtomicU16::new(0)));
        Ok(Self {
            slots: slots.into_boxed_slice(),
            write: AtomicUsize::new(0),
            reads: [AtomicUsize::new(0), AtomicUsize::new(0)],
        })
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Store `item` at the write cursor and advance it. Producer only.
    pub fn push(&self, item: Item) {
        let at = self.write.load(Ordering::Relaxed);
        self.slots[at].store(item.encode(), Ordering::Relaxed);
        self.write.store(self.advance(at), Ordering::Relaxed);
    }

    /// Read the item at `consumer`'s cursor and advance that cursor.
    pub fn pop(&self, consumer: Consumer) -> Item {
        let cursor = &self.reads[consumer.index()];
        let at = cursor.load(Ordering::Relaxed);
        let item = Item::decode(self.slots[at].load(Ordering::Relaxed));
        cursor.store(self.advance(at), Ordering::Relaxed);
        item
    }

    /// Zero every cursor. Only valid while producer and consumers are quiescent.
    pub fn rewind(&self) {
        self.write.store(0, Ordering::Relaxed);
        for cursor in &self.reads {
            cursor.store(0, Ordering::Relaxed);
        }
    }

    pub fn cursors(&self) -> Cursors {
        Cursors {
            write: self.write.load(Ordering::Relaxed),
            counter: self.reads[Consumer::Counter.index()].load(Ordering::Relaxed),
            forward: self.reads[Consumer::Forward.index()].load(Ordering::Relaxed),
        }
    }

    #[inline]
    fn advance(&self, at: usize) -> usize {
        (at + 1) % self.slots.len()
    }
}
