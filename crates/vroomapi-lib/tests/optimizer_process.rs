#![cfg(unix)]

mod common;

use std::collections::HashSet;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use serde_json::Value;
use vroomapi_lib::{Error, InvocationMode, InvocationOptions, Optimizer, RouteQuery};

use common::{sample_request, FakeBinary, ECHO_INPUT_FILE, ECHO_LAST_ARG};

fn query(locations: &[&str], start: &str) -> RouteQuery {
    RouteQuery {
        locations: locations.iter().map(|s| s.to_string()).collect(),
        start: start.to_string(),
        end: None,
        include_geometry: false,
    }
}

#[tokio::test]
async fn file_mode_returns_first_stdout_line_verbatim() {
    let fake = FakeBinary::new(r#"echo '{"code":0,"routes":[]}'; echo 'trailing noise'"#);
    let optimizer = fake.optimizer(InvocationMode::File);

    let solution = optimizer.solve(&query(&["1,2"], "0,0")).await.unwrap();
    assert_eq!(solution.body, r#"{"code":0,"routes":[]}"#);
}

#[tokio::test]
async fn file_mode_surfaces_first_stderr_line() {
    let fake = FakeBinary::new("echo 'no solution found' >&2; echo 'details' >&2; exit 1");
    let optimizer = fake.optimizer(InvocationMode::File);

    let err = optimizer.solve(&query(&["1,2"], "0,0")).await.unwrap_err();
    match err {
        Error::OptimizerReported { ref message } => assert_eq!(message, "no solution found"),
        ref other => panic!("unexpected error: {other:?}"),
    }
    assert!(err.to_string().contains("no solution found"));
}

#[tokio::test]
async fn file_mode_passes_flags_and_removes_input_file() {
    let fake = FakeBinary::new(ECHO_INPUT_FILE);
    let optimizer = fake.optimizer(InvocationMode::File);
    let request = sample_request(7.0);

    let solution = optimizer
        .run(
            &request,
            &InvocationOptions {
                include_geometry: true,
            },
        )
        .await
        .unwrap();

    let body: Value = serde_json::from_str(&solution.body).unwrap();
    let echoed: Value = body["request"].clone();
    assert_eq!(echoed, serde_json::to_value(&request).unwrap());

    let input = PathBuf::from(fake.side_file("input_path").trim());
    assert!(
        input
            .file_name()
            .unwrap()
            .to_string_lossy()
            .starts_with("vroom_"),
        "unexpected input file name {input:?}"
    );
    assert!(!input.exists(), "input file should be removed after the run");

    let args = fake.side_file("args");
    assert!(args.starts_with("-l -t 2 -g -i "), "unexpected args: {args}");
}

#[tokio::test]
async fn file_mode_removes_input_file_when_optimizer_fails() {
    let fake = FakeBinary::new(
        r#"
here=$(dirname "$0")
while [ $# -gt 0 ]; do
  [ "$1" = "-i" ] && { shift; echo "$1" > "$here/input_path"; }
  shift
done
echo 'boom' >&2
exit 2
"#,
    );
    let optimizer = fake.optimizer(InvocationMode::File);

    let err = optimizer.solve(&query(&["1,2"], "0,0")).await.unwrap_err();
    assert!(matches!(err, Error::OptimizerReported { .. }));

    let input = PathBuf::from(fake.side_file("input_path").trim());
    assert!(!input.exists());
}

#[tokio::test]
async fn inline_mode_passes_json_argument_from_binary_dir() {
    let fake = FakeBinary::new(ECHO_LAST_ARG);
    let optimizer = fake.optimizer(InvocationMode::Inline);
    let request = sample_request(3.0);

    let solution = optimizer
        .run(&request, &InvocationOptions::default())
        .await
        .unwrap();

    let body: Value = serde_json::from_str(&solution.body).unwrap();
    assert_eq!(body, serde_json::to_value(&request).unwrap());

    let cwd = PathBuf::from(fake.side_file("cwd").trim());
    assert_eq!(
        cwd.canonicalize().unwrap(),
        fake.dir.path().canonicalize().unwrap()
    );
}

#[tokio::test]
async fn inline_mode_distinguishes_malformed_stdout() {
    let fake = FakeBinary::new("echo 'Segmentation fault'");
    let optimizer = fake.optimizer(InvocationMode::Inline);

    let err = optimizer.solve(&query(&[], "0,0")).await.unwrap_err();
    assert!(matches!(err, Error::MalformedOutput { .. }));
}

#[tokio::test]
async fn inline_mode_reports_stderr_message() {
    let fake = FakeBinary::new("echo '[Error] Invalid coordinates' >&2; exit 1");
    let optimizer = fake.optimizer(InvocationMode::Inline);

    let err = optimizer.solve(&query(&["1,2"], "0,0")).await.unwrap_err();
    match err {
        Error::OptimizerReported { message } => {
            assert_eq!(message, "[Error] Invalid coordinates")
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn timeout_kills_hung_optimizer() {
    let fake = FakeBinary::new("sleep 5; echo '{}'");
    let optimizer = Optimizer::new(
        fake.config(InvocationMode::File)
            .with_timeout(Duration::from_millis(200)),
    );

    let started = Instant::now();
    let err = optimizer.solve(&query(&["1,2"], "0,0")).await.unwrap_err();

    assert!(matches!(err, Error::Timeout { .. }));
    assert!(started.elapsed() < Duration::from_secs(4));
}

#[tokio::test]
async fn concurrent_runs_stay_independent() {
    let fake = FakeBinary::new(ECHO_INPUT_FILE);
    let optimizer = fake.optimizer(InvocationMode::File);

    let options = InvocationOptions::default();
    let requests: Vec<_> = (0..12).map(|i| sample_request(i as f64)).collect();
    let runs = requests
        .iter()
        .map(|request| optimizer.run(request, &options));
    let results = futures::future::join_all(runs).await;

    let mut inputs = HashSet::new();
    let mut run_ids = HashSet::new();
    for (request, result) in requests.iter().zip(results) {
        let solution = result.unwrap();
        let body: Value = serde_json::from_str(&solution.body).unwrap();

        assert_eq!(body["request"], serde_json::to_value(request).unwrap());

        let input = PathBuf::from(body["input"].as_str().unwrap());
        assert!(!input.exists(), "leaked input file {input:?}");
        assert!(inputs.insert(input), "input file shared between runs");
        assert!(run_ids.insert(solution.run_id), "run id reused");
    }
}

#[tokio::test]
async fn admission_limit_serializes_runs() {
    let fake = FakeBinary::new("sleep 0.2; echo '{}'");
    let optimizer = Optimizer::new(fake.config(InvocationMode::File).with_max_concurrent(1));

    let queries: Vec<_> = (0..3).map(|_| query(&["1,2"], "0,0")).collect();
    let started = Instant::now();
    let runs = queries.iter().map(|q| optimizer.solve(q));
    for result in futures::future::join_all(runs).await {
        assert_eq!(result.unwrap().body, "{}");
    }

    assert!(started.elapsed() >= Duration::from_millis(550));
}
