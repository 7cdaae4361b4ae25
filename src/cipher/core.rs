/// The per-byte transform applied by the transform stage.
///
/// Deterministic for a given key and history. The pipeline only ever calls
/// it from the transform stage, and replaces it wholesale at a reset.
pub trait ByteTransform: Send {
    fn apply(&mut self, b: u8) -> u8;
}

impl<F> ByteTransform for F
where
    F: FnMut(u8) -> u8 + Send,
{
    #[inline]
    fn apply(&mut self, b: u8) -> u8 {
        self(b)
    }
}

const ALPHABET: u8 = 26;

/// Keyed letter cipher with alternating direction.
///
/// Letters are rotated by `key` positions within their own case. The first
/// letter is rotated forward, the next backward, and so on. Anything that is
/// not an ASCII letter passes through untouched and does not flip the
/// direction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShiftCipher {
    key: u8,
    forward: bool,
}

impl ShiftCipher {
    pub fn new(key: u32) -> Self {
        Self {
            key: (key % ALPHABET as u32) as u8,
            forward: true,
        }
    }

    pub fn key(&self) -> u8 {
        self.key
    }

    /// Key schedule used for periodic re-keying.
    pub fn next_key(key: u8) -> u8 {
        ((key as u32 * 7 + 3) % ALPHABET as u32) as u8
    }
}

impl ByteTransform for ShiftCipher {
    fn apply(&mut self, b: u8) -> u8 {
        let base = match b {
            b'a'..=b'z' => b'a',
            b'A'..=b'Z' => b'A',
            _ => return b,
        };
        let offset = b - base;
        let rotated = if self.forward {
            (offset + self.key) % ALPHABET
        } else {
            (offset + ALPHABET - self.key) % ALPHABET
        };
        self.forward = !self.forward;
        base + rotated
    }
}

/// Adds a constant to every byte, wrapping at 256.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OffsetCipher(pub u8);

impl ByteTransform for OffsetCipher {
    #[inline]
    fn apply(&mut self, b: u8) -> u8 {
        b.wrapping_add(self.0)
    }
}
