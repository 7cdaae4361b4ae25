use std::time::Instant;

use parking_lot::{Condvar, Mutex};

/// The four stages that consume from a buffer and so must be drained
/// before a reset may touch shared state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    PreCount,
    Transform,
    PostCount,
    Sink,
}

impl Stage {
    pub const CONSUMERS: [Stage; 4] = [
        Stage::PreCount,
        Stage::Transform,
        Stage::PostCount,
        Stage::Sink,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Stage::PreCount => "pre-count",
            Stage::Transform => "transform",
            Stage::PostCount => "post-count",
            Stage::Sink => "sink",
        }
    }

    #[inline]
    fn index(self) -> usize {
        self as usize
    }
}

/// Per-stage progress watermarks.
///
/// Each consumer stage calls [`mark`](DrainBarrier::mark) once it has
/// completely finished a byte (tally updated, cursor advanced, output
/// handed on). Watermarks only grow. Every admitted byte passes through all
/// four stages, so once the source is frozen at `n` admitted bytes the
/// pipeline is quiescent exactly when every watermark has reached `n`.
#[derive(Debug, Default)]
pub struct DrainBarrier {
    marks: Mutex<[u64; 4]>,
    progressed: Condvar,
}

impl DrainBarrier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mark(&self, stage: Stage) {
        let mut marks = self.marks.lock();
        marks[stage.index()] += 1;
        self.progressed.notify_all();
    }

    pub fn watermark(&self, stage: Stage) -> u64 {
        self.marks.lock()[stage.index()]
    }

    /// Block until every consumer stage has finished `target` bytes.
    pub fn wait_for(&self, target: u64) {
        let mut marks = self.marks.lock();
        while !reached(&marks, target) {
            self.progressed.wait(&mut marks);
        }
    }

    /// Like [`wait_for`](Self::wait_for) but gives up at `deadline`.
    /// Returns `true` if every stage reached `target`.
    pub fn wait_for_until(&self, target: u64, deadline: Instant) -> bool {
        let mut marks = self.marks.lock();
        while !reached(&marks, target) {
            if self.progressed.wait_until(&mut marks, deadline).timed_out() {
                return reached(&marks, target);
            }
        }
        true
    }
}

#[inline]
fn reached(marks: &[u64; 4], target: u64) -> bool {
    marks.iter().all(|&m| m >= target)
}
