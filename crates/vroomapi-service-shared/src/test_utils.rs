//! Fake optimizer binaries for handler tests.
//!
//! Each [`FakeOptimizer`] is a `/bin/sh` script in its own temporary
//! directory. Every run touches an `invoked` marker next to the script, so
//! tests can assert that validation failures never reach the binary.

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use tempfile::TempDir;
use vroomapi_lib::{InvocationMode, OptimizerConfig};

use crate::state::AppState;

/// A small but well-formed VROOM solution document.
pub const SOLUTION_BODY: &str =
    r#"{"code":0,"summary":{"cost":42,"routes":1,"unassigned":0},"unassigned":[],"routes":[]}"#;

const INVOKED_MARKER: &str = "invoked";

pub struct FakeOptimizer {
    dir: TempDir,
    path: PathBuf,
}

impl FakeOptimizer {
    /// Install `body` as an executable script named `vroom`.
    ///
    /// # Panics
    ///
    /// Panics if the temporary directory or script cannot be written.
    pub fn new(body: &str) -> Self {
        let dir = TempDir::new().unwrap_or_else(|e| panic!("failed to create temp dir: {e}"));
        let path = dir.path().join("vroom");
        let script = format!(
            "#!/bin/sh\ntouch \"$(dirname \"$0\")/{INVOKED_MARKER}\"\n{body}\n"
        );
        fs::write(&path, script).unwrap_or_else(|e| panic!("failed to write {path:?}: {e}"));
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755))
            .unwrap_or_else(|e| panic!("failed to chmod {path:?}: {e}"));
        Self { dir, path }
    }

    /// Script that prints `body` on stdout and exits 0.
    pub fn printing(body: &str) -> Self {
        Self::new(&format!("cat <<'VROOM_EOF'\n{body}\nVROOM_EOF"))
    }

    /// Script that prints `message` on stderr and exits 1.
    pub fn failing(message: &str) -> Self {
        Self::new(&format!("echo '{message}' >&2\nexit 1"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn dir(&self) -> &Path {
        self.dir.path()
    }

    pub fn config(&self, mode: InvocationMode) -> OptimizerConfig {
        OptimizerConfig::new(&self.path, mode).with_threads(1)
    }

    pub fn state(&self, mode: InvocationMode) -> AppState {
        AppState::new(self.config(mode))
    }

    /// Whether the script has run at least once.
    pub fn was_invoked(&self) -> bool {
        self.dir.path().join(INVOKED_MARKER).exists()
    }

    /// Contents of a file the script wrote next to itself.
    pub fn side_file(&self, name: &str) -> Option<String> {
        fs::read_to_string(self.dir.path().join(name)).ok()
    }
}

/// State pointing at a binary that does not exist.
pub fn missing_binary_state(mode: InvocationMode) -> AppState {
    AppState::new(OptimizerConfig::new("/nonexistent/vroom", mode))
}

/// Unique request id for tests.
pub fn test_request_id() -> String {
    static COUNTER: AtomicU64 = AtomicU64::new(0);
    format!("test-{}", COUNTER.fetch_add(1, Ordering::Relaxed))
}
