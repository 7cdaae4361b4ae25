use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Live per-byte occurrence counters.
///
/// Written by exactly one counting stage; read and zeroed by the reset
/// coordinator only while that stage is quiescent.
pub struct Tally {
    counts: [AtomicU64; 256],
}

impl Default for Tally {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Tally {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Tally").field(&self.snapshot()).finish()
    }
}

impl Tally {
    pub fn new() -> Self {
        Self {
            counts: std::array::from_fn(|_| AtomicU64::new(0)),
        }
    }

    #[inline]
    pub fn record(&self, b: u8) {
        self.counts[b as usize].fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> Histogram {
        Histogram(std::array::from_fn(|i| self.counts[i].load(Ordering::Relaxed)))
    }

    /// Read every counter and zero it in the same pass.
    pub fn take(&self) -> Histogram {
        Histogram(std::array::from_fn(|i| self.counts[i].swap(0, Ordering::Relaxed)))
    }
}

/// Frozen frequency histogram over byte values.
#[derive(Clone, PartialEq, Eq)]
pub struct Histogram([u64; 256]);

impl Default for Histogram {
    fn default() -> Self {
        Histogram([0; 256])
    }
}

impl Histogram {
    pub fn from_bytes(data: &[u8]) -> Self {
        let mut counts = [0u64; 256];
        for &b in data {
            counts[b as usize] += 1;
        }
        Histogram(counts)
    }

    #[inline]
    pub fn get(&self, b: u8) -> u64 {
        self.0[b as usize]
    }

    pub fn total(&self) -> u64 {
        self.0.iter().sum()
    }

    pub fn is_empty(&self) -> bool {
        self.0.iter().all(|&c| c == 0)
    }

    /// `(byte, count)` for every byte seen at least once, in byte order.
    pub fn nonzero(&self) -> impl Iterator<Item = (u8, u64)> + '_ {
        self.0
            .iter()
            .enumerate()
            .filter(|&(_, &c)| c != 0)
            .map(|(b, &c)| (b as u8, c))
    }

    /// Add another window's counts into this one.
    pub fn merge(&mut self, other: &Histogram) {
        for (mine, theirs) in self.0.iter_mut().zip(other.0.iter()) {
            *mine += theirs;
        }
    }
}

impl fmt::Debug for Histogram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.nonzero().map(|(b, c)| (format!("{:#04x}", b), c)))
            .finish()
    }
}

/// What a reset (or the final shutdown) hands to the reporter: the tallies
/// accumulated since the previous reset.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CountReport {
    /// Number of resets completed before this window opened.
    pub epoch: u64,
    pub pre: Histogram,
    pub post: Histogram,
}
