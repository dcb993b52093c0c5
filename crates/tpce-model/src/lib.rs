//! Plain data types shared by the TPC-E benchmark orchestration crates.
//!
//! Nothing in here performs I/O: the types describe what a benchmark run looks like
//! (options, cluster shape, topology, tuning, commands, outcomes) and are consumed by
//! `tpce-core` and `tpce-bench`.

mod domain;
pub use domain::*;

mod error;
pub use error::ModelError;
