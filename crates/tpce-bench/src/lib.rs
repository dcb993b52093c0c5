//! TPC-E benchmark definitions: the configuration matrix, workload command builder,
//! tuning set, output validation and the single- and dual-cluster pipelines.

mod config;
pub use config::{BenchConfig, MultiClusterOrder, WorkloadConfig};

pub mod matrix;
pub use matrix::{multi_tpce_tests, register_tpce, tpce_tests};

mod tuning;
pub use tuning::{bulk_load_directives, bulk_load_tuner};

mod validator;
pub use validator::{TPCE_MARKER, TPCE_VALIDATOR};

pub mod workload;
pub use workload::WorkloadDriver;

pub mod pipeline;
pub use pipeline::{Pipeline, run_multi_tpce, run_tpce};
