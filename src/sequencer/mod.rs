//! Hand-off primitives the pipeline stages synchronize through.
//!
//! A [`Signal`] is a latched binary semaphore. A [`Gate`] pairs a data-ready
//! and a done signal for each consumer of one buffer. The [`DrainBarrier`]
//! tracks how far every consumer stage has progressed so a reset can wait
//! for in-flight bytes to finish, and the [`Turnstile`] lets a requested
//! reset in ahead of the source's next admission.

mod core;
mod drain;
mod turnstile;


pub use self::core::{Consumer, Gate, Signal};
pub use self::drain::{DrainBarrier, Stage};
pub use self::turnstile::{Request, Turnstile};
