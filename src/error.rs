use std::io;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::tally::CountReport;

/// Errors surfaced by the pipeline and its shipped collaborators.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// One of the input/output/log paths could not be opened.
    #[error("{}: {}", .path.display(), crate::common::io_error_msg(.source))]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A buffer capacity of zero was requested.
    #[error("invalid buffer capacity {0}: must be greater than 0")]
    InvalidCapacity(usize),

    /// The slot storage for a buffer could not be allocated.
    #[error("memory allocation failed for a {capacity}-slot buffer")]
    Allocation { capacity: usize },

    #[error("read error: {}", crate::common::io_error_msg(.0))]
    Read(#[source] io::Error),

    #[error("write error: {}", crate::common::io_error_msg(.0))]
    Write(#[source] io::Error),

    /// The reporter rejected a window. The window is closed regardless, so
    /// its tallies travel with the error.
    #[error("log error: {}", crate::common::io_error_msg(.source))]
    Report {
        report: Box<CountReport>,
        #[source]
        source: io::Error,
    },

    /// A bounded reset could not freeze and drain the pipeline in time.
    #[error("reset timed out after {0:?}")]
    ResetTimedOut(Duration),

    #[error("{0} stage panicked")]
    StagePanicked(&'static str),
}

pub type Result<T> = std::result::Result<T, PipelineError>;
