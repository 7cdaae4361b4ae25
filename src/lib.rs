#![allow(
    clippy::collapsible_if,
    clippy::len_without_is_empty,
    clippy::doc_lazy_continuation,
    clippy::new_without_default
)]

/// Use mimalloc as the global allocator for all binaries.
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

pub mod cipher;
pub mod common;
pub mod error;
pub mod pipeline;
pub mod report;
pub mod ring;
pub mod sequencer;
pub mod tally;

pub use error::{PipelineError, Result};
pub use pipeline::{Pipeline, PipelineBuilder, ResetHandle, RunSummary};
