//! End-to-end pipeline for one routing query.
//!
//! [`Optimizer::solve`] validates the query, builds the [`ComputeRequest`],
//! runs the configured [`InvocationStrategy`], and applies its output policy.
//! Validation failures never reach the process layer.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use tokio::sync::Semaphore;
use tracing::{debug, info, warn};

use crate::coordinate::{parse_coordinate, parse_locations, Coordinate, CoordinateRole};
use crate::error::{Error, Result};
use crate::invoker::{
    available_threads, execute, InvocationMode, InvocationOptions, InvocationStrategy,
    OptimizerBinary,
};
use crate::request::ComputeRequest;

/// Correlates log lines of a single run. Has no bearing on results.
static RUN_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Next run identifier; unique within the process, not necessarily contiguous.
pub fn next_run_id() -> u64 {
    RUN_COUNTER.fetch_add(1, Ordering::Relaxed)
}

/// Raw routing query as received from a caller.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RouteQuery {
    /// `"lon,lat"` strings, one job each, in order.
    pub locations: Vec<String>,
    /// Vehicle start, `"lon,lat"`.
    pub start: String,
    /// Optional vehicle end, `"lon,lat"`.
    pub end: Option<String>,
    pub include_geometry: bool,
}

/// A query whose coordinates have all been parsed.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedRoute {
    pub start: Coordinate,
    pub end: Option<Coordinate>,
    pub locations: Vec<Coordinate>,
    pub options: InvocationOptions,
}

impl RouteQuery {
    /// Parse every coordinate. Locations are checked first, then start, then end.
    pub fn validate(&self) -> Result<ValidatedRoute> {
        let locations = parse_locations(self.locations.as_slice())?;
        let start = parse_coordinate(&self.start, CoordinateRole::Start)?;
        let end = self
            .end
            .as_deref()
            .map(|end| parse_coordinate(end, CoordinateRole::End))
            .transpose()?;

        Ok(ValidatedRoute {
            start,
            end,
            locations,
            options: InvocationOptions {
                include_geometry: self.include_geometry,
            },
        })
    }
}

impl ValidatedRoute {
    pub fn compute_request(&self) -> ComputeRequest {
        ComputeRequest::build(self.start, self.end, &self.locations)
    }
}

/// Optimizer settings, typically loaded once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptimizerConfig {
    pub binary: PathBuf,
    pub mode: InvocationMode,
    pub use_routing_lib: bool,
    pub threads: usize,
    /// Kill the optimizer after this long. `None` waits indefinitely.
    pub timeout: Option<Duration>,
    /// Maximum simultaneously running optimizer processes. `None` is unbounded.
    pub max_concurrent: Option<usize>,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            binary: PathBuf::from("/usr/local/bin/vroom"),
            mode: InvocationMode::File,
            use_routing_lib: true,
            threads: available_threads(),
            timeout: None,
            max_concurrent: None,
        }
    }
}

impl OptimizerConfig {
    pub fn new(binary: impl Into<PathBuf>, mode: InvocationMode) -> Self {
        Self {
            binary: binary.into(),
            mode,
            ..Self::default()
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_max_concurrent(mut self, limit: usize) -> Self {
        self.max_concurrent = Some(limit);
        self
    }

    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads;
        self
    }

    pub fn with_routing_lib(mut self, enabled: bool) -> Self {
        self.use_routing_lib = enabled;
        self
    }
}

/// Successful optimizer run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Solution {
    pub run_id: u64,
    /// JSON document produced by the optimizer.
    pub body: String,
    pub elapsed: Duration,
}

/// Runs routing queries through the external optimizer.
///
/// Shareable across requests; each call spawns its own process.
#[derive(Debug)]
pub struct Optimizer {
    binary: OptimizerBinary,
    strategy: Box<dyn InvocationStrategy>,
    timeout: Option<Duration>,
    limiter: Option<Semaphore>,
}

impl Optimizer {
    pub fn new(config: OptimizerConfig) -> Self {
        Self::with_strategy(config.clone(), config.mode.strategy())
    }

    /// Use a custom strategy instead of the one implied by `config.mode`.
    pub fn with_strategy(config: OptimizerConfig, strategy: Box<dyn InvocationStrategy>) -> Self {
        let binary = OptimizerBinary {
            path: config.binary,
            use_routing_lib: config.use_routing_lib,
            threads: config.threads.max(1),
        };

        Self {
            binary,
            strategy,
            timeout: config.timeout,
            limiter: config
                .max_concurrent
                .filter(|limit| *limit > 0)
                .map(Semaphore::new),
        }
    }

    pub fn mode(&self) -> InvocationMode {
        self.strategy.mode()
    }

    pub fn binary_path(&self) -> &Path {
        &self.binary.path
    }

    /// Check that the binary exists and is executable.
    pub fn check_binary(&self) -> Result<()> {
        self.binary.check()
    }

    /// Validate, build, invoke and mediate one query.
    pub async fn solve(&self, query: &RouteQuery) -> Result<Solution> {
        let route = query.validate()?;
        let request = route.compute_request();
        self.run(&request, &route.options).await
    }

    /// Invoke the optimizer on an already built request.
    pub async fn run(
        &self,
        request: &ComputeRequest,
        options: &InvocationOptions,
    ) -> Result<Solution> {
        let run_id = next_run_id();
        debug!(run_id, mode = %self.mode(), "executing request");

        let _permit = match &self.limiter {
            Some(limiter) => Some(limiter.acquire().await.map_err(|_| {
                Error::ProcessInvocation {
                    message: "optimizer admission limiter closed".to_string(),
                }
            })?),
            None => None,
        };

        let invocation = self.strategy.prepare(&self.binary, request, options)?;
        debug!(run_id, command = %invocation.command_line(), "run");

        let started = Instant::now();
        let output = execute(&invocation, self.timeout).await.inspect_err(|e| {
            warn!(run_id, error = %e, "optimizer invocation failed");
        })?;
        drop(invocation);

        let body = self.strategy.output_policy().apply(&output, run_id)?;
        let elapsed = started.elapsed();

        info!(
            run_id,
            jobs = request.jobs.len(),
            elapsed_ms = elapsed.as_millis() as u64,
            "optimizer run completed"
        );

        Ok(Solution {
            run_id,
            body,
            elapsed,
        })
    }
}
