//! Command-line construction and process execution for the VROOM binary.
//!
//! Two strategies hand a [`ComputeRequest`] to the optimizer:
//!
//! - [`FileStrategy`] writes the request to a temporary file and passes
//!   `-i <file>`. The binary must exist and be executable before anything is
//!   spawned.
//! - [`InlineStrategy`] passes the request JSON as the final argument and runs
//!   the binary from its own directory.
//!
//! Both produce a [`PreparedInvocation`], which [`execute`] runs to
//! completion with stdout and stderr captured separately.

use std::ffi::OsString;
use std::fmt;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::str::FromStr;
use std::time::Duration;

use tempfile::TempPath;
use tokio::process::Command;

use crate::error::{Error, Result};
use crate::mediator::OutputPolicy;
use crate::request::ComputeRequest;

/// Prefix of the per-request input files written in file mode.
pub const INPUT_FILE_PREFIX: &str = "vroom_";

/// How the compute request reaches the optimizer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum InvocationMode {
    /// Request written to a temporary file passed with `-i`.
    #[default]
    File,
    /// Request passed as a literal JSON argument.
    Inline,
}

impl InvocationMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            InvocationMode::File => "file",
            InvocationMode::Inline => "inline",
        }
    }

    /// The strategy implementing this mode.
    pub fn strategy(&self) -> Box<dyn InvocationStrategy> {
        match self {
            InvocationMode::File => Box::new(FileStrategy),
            InvocationMode::Inline => Box::new(InlineStrategy),
        }
    }
}

impl fmt::Display for InvocationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InvocationMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "file" => Ok(InvocationMode::File),
            "inline" | "direct" => Ok(InvocationMode::Inline),
            _ => Err(Error::InvalidParameter {
                name: "mode".to_string(),
                value: s.to_string(),
            }),
        }
    }
}

/// Location of the optimizer binary and the flags shared by every run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptimizerBinary {
    pub path: PathBuf,
    /// Pass `-l` so VROOM routes through the linked libosrm.
    pub use_routing_lib: bool,
    /// Value passed to `-t`.
    pub threads: usize,
}

impl OptimizerBinary {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            use_routing_lib: true,
            threads: available_threads(),
        }
    }

    /// Fail unless the binary exists and carries an execute permission.
    pub fn check(&self) -> Result<()> {
        let metadata = std::fs::metadata(&self.path).map_err(|_| Error::BinaryUnavailable {
            path: self.path.clone(),
        })?;

        if !metadata.is_file() || !is_executable(&metadata) {
            return Err(Error::BinaryNotExecutable {
                path: self.path.clone(),
            });
        }

        Ok(())
    }

    /// The configured path made absolute against the current directory.
    pub fn absolute_path(&self) -> PathBuf {
        std::path::absolute(&self.path).unwrap_or_else(|_| self.path.clone())
    }

    fn common_args(&self, options: &InvocationOptions) -> Vec<OsString> {
        let mut args: Vec<OsString> = Vec::new();
        if self.use_routing_lib {
            args.push("-l".into());
        }
        args.push("-t".into());
        args.push(self.threads.to_string().into());
        if options.include_geometry {
            args.push("-g".into());
        }
        args
    }
}

/// Number of processing units, falling back to one.
pub fn available_threads() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

#[cfg(unix)]
fn is_executable(metadata: &std::fs::Metadata) -> bool {
    use std::os::unix::fs::PermissionsExt;
    metadata.permissions().mode() & 0o111 != 0
}

#[cfg(not(unix))]
fn is_executable(_metadata: &std::fs::Metadata) -> bool {
    true
}

/// Per-request switches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InvocationOptions {
    /// Ask VROOM for route geometry (`-g`).
    pub include_geometry: bool,
}

/// A fully built command line, plus any resources that must live until the
/// process exits.
///
/// In file mode this owns the temporary input file, which is removed when the
/// invocation is dropped, whichever way the run ended.
#[derive(Debug)]
pub struct PreparedInvocation {
    program: PathBuf,
    args: Vec<OsString>,
    current_dir: Option<PathBuf>,
    input_file: Option<TempPath>,
}

impl PreparedInvocation {
    pub fn program(&self) -> &Path {
        &self.program
    }

    pub fn args(&self) -> &[OsString] {
        &self.args
    }

    pub fn current_dir(&self) -> Option<&Path> {
        self.current_dir.as_deref()
    }

    /// Path of the temporary input file, in file mode.
    pub fn input_file(&self) -> Option<&Path> {
        self.input_file.as_deref()
    }

    /// Space-joined command line for logging.
    pub fn command_line(&self) -> String {
        std::iter::once(self.program.as_os_str())
            .chain(self.args.iter().map(OsString::as_os_str))
            .map(|part| part.to_string_lossy())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// A way of handing the compute request to the optimizer binary.
pub trait InvocationStrategy: Send + Sync + fmt::Debug {
    fn mode(&self) -> InvocationMode;

    /// How the process output is turned into a result.
    fn output_policy(&self) -> OutputPolicy;

    /// Build the command line for one run.
    fn prepare(
        &self,
        binary: &OptimizerBinary,
        request: &ComputeRequest,
        options: &InvocationOptions,
    ) -> Result<PreparedInvocation>;
}

/// Temporary input file, read with the first-line output policy.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileStrategy;

impl InvocationStrategy for FileStrategy {
    fn mode(&self) -> InvocationMode {
        InvocationMode::File
    }

    fn output_policy(&self) -> OutputPolicy {
        OutputPolicy::FirstLine
    }

    fn prepare(
        &self,
        binary: &OptimizerBinary,
        request: &ComputeRequest,
        options: &InvocationOptions,
    ) -> Result<PreparedInvocation> {
        binary.check()?;

        let json = request.to_json()?;
        let mut file = tempfile::Builder::new()
            .prefix(INPUT_FILE_PREFIX)
            .suffix(".json")
            .tempfile()?;
        writeln!(file, "{}", json)?;
        file.flush()?;
        let input_file = file.into_temp_path();

        let mut args = binary.common_args(options);
        args.push("-i".into());
        args.push(input_file.as_os_str().to_os_string());

        Ok(PreparedInvocation {
            program: binary.absolute_path(),
            args,
            current_dir: None,
            input_file: Some(input_file),
        })
    }
}

/// Request JSON as the trailing argument, read with the accumulate policy.
#[derive(Debug, Clone, Copy, Default)]
pub struct InlineStrategy;

impl InvocationStrategy for InlineStrategy {
    fn mode(&self) -> InvocationMode {
        InvocationMode::Inline
    }

    fn output_policy(&self) -> OutputPolicy {
        OutputPolicy::Accumulate
    }

    fn prepare(
        &self,
        binary: &OptimizerBinary,
        request: &ComputeRequest,
        options: &InvocationOptions,
    ) -> Result<PreparedInvocation> {
        let program = binary.absolute_path();
        let current_dir = program
            .parent()
            .filter(|dir| !dir.as_os_str().is_empty())
            .map(Path::to_path_buf);

        let mut args = binary.common_args(options);
        args.push(request.to_json()?.into());

        Ok(PreparedInvocation {
            program,
            args,
            current_dir,
            input_file: None,
        })
    }
}

/// Captured result of one optimizer run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessOutput {
    /// Exit code, `None` if the process was terminated by a signal.
    pub exit_code: Option<i32>,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

/// Spawn the prepared command and wait for it to exit.
///
/// The child is killed if `timeout` elapses or if the returned future is
/// dropped before completion.
pub async fn execute(
    invocation: &PreparedInvocation,
    timeout: Option<Duration>,
) -> Result<ProcessOutput> {
    let mut command = Command::new(&invocation.program);
    command
        .args(&invocation.args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);
    if let Some(dir) = &invocation.current_dir {
        command.current_dir(dir);
    }

    let child = command.spawn().map_err(|e| Error::ProcessInvocation {
        message: format!("could not start {}: {}", invocation.program.display(), e),
    })?;

    let wait = child.wait_with_output();
    let output = match timeout {
        Some(limit) => tokio::time::timeout(limit, wait)
            .await
            .map_err(|_| Error::Timeout { timeout: limit })?,
        None => wait.await,
    }
    .map_err(|e| Error::ProcessInvocation {
        message: format!("could not read process output: {}", e),
    })?;

    Ok(ProcessOutput {
        exit_code: output.status.code(),
        stdout: output.stdout,
        stderr: output.stderr,
    })
}
