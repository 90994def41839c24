//! Shared helpers for process-level integration tests.
//!
//! Tests stand in for the VROOM binary with small `/bin/sh` scripts written
//! into a temporary directory.

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::PathBuf;

use tempfile::TempDir;
use vroomapi_lib::{ComputeRequest, Coordinate, InvocationMode, Optimizer, OptimizerConfig};

/// A fake optimizer script living in its own temporary directory.
pub struct FakeBinary {
    /// Kept alive so the script is not removed mid-test.
    pub dir: TempDir,
    pub path: PathBuf,
}

#[allow(dead_code)]
impl FakeBinary {
    /// Write `body` as an executable shell script named `vroom`.
    pub fn new(body: &str) -> Self {
        let dir = TempDir::new().expect("create temp dir");
        let path = dir.path().join("vroom");
        fs::write(&path, format!("#!/bin/sh\n{}\n", body)).expect("write fake binary");
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).expect("chmod fake binary");
        Self { dir, path }
    }

    /// Optimizer using this script with fixed settings.
    pub fn optimizer(&self, mode: InvocationMode) -> Optimizer {
        Optimizer::new(self.config(mode))
    }

    pub fn config(&self, mode: InvocationMode) -> OptimizerConfig {
        OptimizerConfig::new(&self.path, mode).with_threads(2)
    }

    /// Read a file the script wrote next to itself.
    pub fn side_file(&self, name: &str) -> String {
        fs::read_to_string(self.dir.path().join(name)).expect("read side file")
    }
}

/// Script body that echoes the file passed with `-i` and records its path.
#[allow(dead_code)]
pub const ECHO_INPUT_FILE: &str = r#"
here=$(dirname "$0")
echo "$@" > "$here/args"
while [ $# -gt 0 ]; do
  if [ "$1" = "-i" ]; then
    shift
    echo "$1" > "$here/input_path"
    printf '{"input":"%s","request":%s}\n' "$1" "$(tr -d '\n' < "$1")"
    exit 0
  fi
  shift
done
echo "missing -i" >&2
exit 1
"#;

/// Script body that prints its last argument and working directory.
#[allow(dead_code)]
pub const ECHO_LAST_ARG: &str = r#"
here=$(dirname "$0")
pwd > "$here/cwd"
for last; do :; done
printf '%s\n' "$last"
"#;

#[allow(dead_code)]
pub fn sample_request(seed: f64) -> ComputeRequest {
    ComputeRequest::build(
        Coordinate::new(seed, seed),
        None,
        &[Coordinate::new(1.0, 2.0), Coordinate::new(3.0, 4.0)],
    )
}
