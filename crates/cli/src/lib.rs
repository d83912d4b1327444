//! Tally command-line front end
//!
//! Library half of the `tally` binary, split out so integration tests can
//! drive the pipeline with fake collaborators.

pub mod args;
pub mod logging;
pub mod output;
pub mod pipeline;

pub use output::{Output, Sink};
pub use pipeline::Pipeline;
