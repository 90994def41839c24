//! Interpretation of captured optimizer output.

use tracing::{debug, error};

use crate::error::{Error, Result};
use crate::invoker::ProcessOutput;

/// How a finished run's output streams become a JSON payload or an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputPolicy {
    /// The first stdout line is the payload, returned verbatim. Otherwise the
    /// first stderr line is the optimizer's error message.
    FirstLine,
    /// All stdout lines are concatenated and must parse as JSON. Stderr is
    /// only consulted to explain a failure.
    Accumulate,
}

impl OutputPolicy {
    /// Apply the policy to one run; `run_id` is only used for log correlation.
    pub fn apply(&self, output: &ProcessOutput, run_id: u64) -> Result<String> {
        let result = match self {
            OutputPolicy::FirstLine => first_line(output),
            OutputPolicy::Accumulate => accumulate(output),
        };

        match &result {
            Ok(body) => debug!(run_id, output = %body, "success output"),
            Err(e) => error!(
                run_id,
                exit_code = ?output.exit_code,
                stderr = %String::from_utf8_lossy(&output.stderr),
                error = %e,
                "error output"
            ),
        }

        result
    }
}

fn first_line(output: &ProcessOutput) -> Result<String> {
    if let Some(line) = first_non_empty_line(&output.stdout) {
        return Ok(line);
    }

    match first_non_empty_line(&output.stderr) {
        Some(message) => Err(Error::OptimizerReported { message }),
        None => Err(no_output(output)),
    }
}

fn accumulate(output: &ProcessOutput) -> Result<String> {
    let stdout = concat_lines(&output.stdout);
    let stderr = concat_lines(&output.stderr);

    if !stdout.trim().is_empty() {
        // Only checked, never rebuilt: key order and number text stay as VROOM wrote them.
        match serde_json::from_str::<serde::de::IgnoredAny>(&stdout) {
            Ok(_) => return Ok(stdout.trim().to_string()),
            Err(e) if stderr.trim().is_empty() => {
                return Err(Error::MalformedOutput {
                    message: format!("{} (output: {})", e, truncate(&stdout, 200)),
                })
            }
            Err(_) => {}
        }
    }

    if stderr.trim().is_empty() {
        return Err(no_output(output));
    }

    Err(Error::OptimizerReported {
        message: stderr.trim().to_string(),
    })
}

fn no_output(output: &ProcessOutput) -> Error {
    let status = match output.exit_code {
        Some(code) => format!("exit code {}", code),
        None => "terminated by signal".to_string(),
    };
    Error::ProcessInvocation {
        message: format!("VROOM binary produced no output ({})", status),
    }
}

fn first_non_empty_line(bytes: &[u8]) -> Option<String> {
    String::from_utf8_lossy(bytes)
        .lines()
        .map(str::trim_end)
        .find(|line| !line.trim().is_empty())
        .map(str::to_string)
}

fn concat_lines(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).lines().collect()
}

fn truncate(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((index, _)) => format!("{}...", &text[..index]),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn output(stdout: &str, stderr: &str) -> ProcessOutput {
        ProcessOutput {
            exit_code: Some(0),
            stdout: stdout.as_bytes().to_vec(),
            stderr: stderr.as_bytes().to_vec(),
        }
    }

    #[test]
    fn first_line_returns_stdout_verbatim() {
        let out = output("{\"code\":0,\"routes\":[]}\nignored\n", "");
        assert_eq!(
            OutputPolicy::FirstLine.apply(&out, 1).unwrap(),
            "{\"code\":0,\"routes\":[]}"
        );
    }

    #[test]
    fn first_line_does_not_reparse_payload() {
        let out = output("not json but first\n", "");
        assert_eq!(
            OutputPolicy::FirstLine.apply(&out, 1).unwrap(),
            "not json but first"
        );
    }

    #[test]
    fn first_line_falls_back_to_stderr() {
        let out = output("", "no solution found\nsecond line\n");
        let err = OutputPolicy::FirstLine.apply(&out, 2).unwrap_err();
        match err {
            Error::OptimizerReported { message } => assert_eq!(message, "no solution found"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn first_line_with_no_output_is_invocation_failure() {
        let mut out = output("", "");
        out.exit_code = Some(3);
        let err = OutputPolicy::FirstLine.apply(&out, 3).unwrap_err();
        assert!(matches!(err, Error::ProcessInvocation { .. }));
        assert!(err.to_string().contains("exit code 3"));
    }

    #[test]
    fn accumulate_joins_lines_before_parsing() {
        let out = output("{\"code\":0,\n\"routes\":\n[]}\n", "");
        let body = OutputPolicy::Accumulate.apply(&out, 4).unwrap();
        let value: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(value, serde_json::json!({"code": 0, "routes": []}));
    }

    #[test]
    fn accumulate_keeps_key_order_and_large_integers() {
        let body = r#"{"routes":[],"code":0,"summary":{"cost":123456789012345678901234}}"#;
        let out = output(&format!("{body}\n"), "");
        assert_eq!(OutputPolicy::Accumulate.apply(&out, 10).unwrap(), body);
    }

    #[test]
    fn accumulate_reports_stderr_separately() {
        let out = output("", "[Error] Invalid profile: car.\n");
        let err = OutputPolicy::Accumulate.apply(&out, 5).unwrap_err();
        match err {
            Error::OptimizerReported { message } => {
                assert_eq!(message, "[Error] Invalid profile: car.")
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn accumulate_prefers_stderr_over_unparseable_stdout() {
        let out = output("partial {", "segfault in solver\n");
        let err = OutputPolicy::Accumulate.apply(&out, 6).unwrap_err();
        assert!(matches!(err, Error::OptimizerReported { .. }));
    }

    #[test]
    fn accumulate_flags_malformed_stdout() {
        let out = output("this is not json\n", "");
        let err = OutputPolicy::Accumulate.apply(&out, 7).unwrap_err();
        assert!(matches!(err, Error::MalformedOutput { .. }));
        assert!(err.to_string().contains("this is not json"));
    }

    #[test]
    fn accumulate_ignores_stderr_noise_on_success() {
        let out = output("{\"code\":0}", "warning: slow\n");
        assert_eq!(OutputPolicy::Accumulate.apply(&out, 8).unwrap(), "{\"code\":0}");
    }

    #[test]
    fn accumulate_with_no_output_is_invocation_failure() {
        let mut out = output("", "");
        out.exit_code = None;
        let err = OutputPolicy::Accumulate.apply(&out, 9).unwrap_err();
        assert!(err.to_string().contains("terminated by signal"));
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        assert_eq!(truncate("héllo", 2), "hé...");
        assert_eq!(truncate("abc", 10), "abc");
    }
}
