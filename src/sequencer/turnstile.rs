use parking_lot::{Condvar, Mutex};

/// Gives pending resets priority over the source's next admission.
///
/// A reset holds a [`Request`] for as long as it runs. The source calls
/// [`pass`](Turnstile::pass) before taking the admission lock each round and
/// blocks while any request is outstanding, so a requested reset is served
/// at the very next admission boundary.
#[derive(Debug, Default)]
pub struct Turnstile {
    pending: Mutex<usize>,
    cleared: Condvar,
}

impl Turnstile {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request(&self) -> Request<'_> {
        *self.pending.lock() += 1;
        Request { turnstile: self }
    }

    pub fn pass(&self) {
        let mut pending = self.pending.lock();
        while *pending > 0 {
            self.cleared.wait(&mut pending);
        }
    }

    pub fn pending(&self) -> usize {
        *self.pending.lock()
    }
}

/// An outstanding reset request; withdrawn on drop.
#[derive(Debug)]
pub struct Request<'a> {
    turnstile: &'a Turnstile,
}

impl Drop for Request<'_> {
    fn drop(&mut self) {
        let mut pending = self.turnstile.pending.lock();
        *pending -= 1;
        if *pending == 0 {
            self.turnstile.cleared.notify_all();
        }
    }
}
