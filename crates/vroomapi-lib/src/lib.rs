//! vroomapi library entry points.
//!
//! This crate turns routing queries (a vehicle start, an optional end, and a
//! list of locations to visit) into VROOM optimizer runs. It parses the
//! coordinates, builds VROOM's vehicle/job document, spawns the optimizer
//! binary, and interprets what it prints. HTTP consumers should only depend on
//! the items exported here instead of reimplementing behavior.

pub mod coordinate;
pub mod error;
pub mod invoker;
pub mod mediator;
pub mod optimizer;
pub mod request;

pub use coordinate::{parse_coordinate, parse_locations, Coordinate, CoordinateRole};
pub use error::{Error, ErrorKind, Result};
pub use invoker::{
    execute, FileStrategy, InlineStrategy, InvocationMode, InvocationOptions, InvocationStrategy,
    OptimizerBinary, PreparedInvocation, ProcessOutput,
};
pub use mediator::OutputPolicy;
pub use optimizer::{
    next_run_id, Optimizer, OptimizerConfig, RouteQuery, Solution, ValidatedRoute,
};
pub use request::{ComputeRequest, Job, Vehicle};
