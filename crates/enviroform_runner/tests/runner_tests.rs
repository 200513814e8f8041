//! Integration tests for the execution layer.
//!
//! Process tests spawn POSIX shell utilities and are limited to unix hosts;
//! the mock tests run everywhere.

use std::sync::Arc;

use enviroform_runner::{
    CommandRunner, CommandSpec, MockResponse, MockRunner, ProcessRunner, ProcessRunnerOptions,
    RunConfig, RunnerError,
};

fn runner() -> ProcessRunner {
    ProcessRunner::new(ProcessRunnerOptions::new().tolerate_interrupts(false))
}

/// Runners are used behind a trait object by the plan executor.
#[tokio::test]
async fn test_runner_as_trait_object() {
    let mock = MockRunner::new().add_response(MockResponse::exit_code(2));
    let runner: Arc<dyn CommandRunner> = Arc::new(mock.clone());

    let spec = CommandSpec::new("terraform").args(["plan", "-detailed-exitcode"]);
    let result = runner.run(&spec, &RunConfig::default()).await.unwrap();

    assert_eq!(result.exit_code, 2);
    assert_eq!(mock.call_count(), 1);
    assert_eq!(mock.get_calls()[0].args, vec!["plan", "-detailed-exitcode"]);
}

#[tokio::test]
async fn test_simulated_failure_is_execution_error() {
    let runner = MockRunner::new().simulate_failure("boom");
    let result = runner
        .run(&CommandSpec::new("terraform"), &RunConfig::default())
        .await;

    match result {
        Err(RunnerError::ExecutionFailed(msg)) => assert_eq!(msg, "boom"),
        other => panic!("expected execution failure, got {:?}", other),
    }
}

#[test]
fn test_execution_result_serializes() {
    let result = enviroform_runner::ExecutionResult {
        command: "terraform apply".to_string(),
        exit_code: 0,
        started_at: chrono::Utc::now(),
        finished_at: chrono::Utc::now(),
        duration_ms: 12,
    };

    let json = serde_json::to_value(&result).unwrap();
    assert_eq!(json["command"], "terraform apply");
    assert_eq!(json["exit_code"], 0);
    assert_eq!(json["duration_ms"], 12);
}

#[cfg(unix)]
#[tokio::test]
async fn test_successful_process() {
    let result = runner()
        .run(&CommandSpec::new("true"), &RunConfig::default().quiet())
        .await
        .unwrap();

    assert!(result.success());
    assert!(result.finished_at >= result.started_at);
}

#[cfg(unix)]
#[tokio::test]
async fn test_environment_is_inherited() {
    let dir = tempfile::tempdir().unwrap();
    let spec = CommandSpec::new("sh")
        .args(["-c", "test -n \"$PATH\""])
        .working_dir(dir.path());

    let result = runner()
        .run(&spec, &RunConfig::default().quiet())
        .await
        .unwrap();

    assert_eq!(result.exit_code, 0);
}

#[cfg(unix)]
#[tokio::test]
async fn test_timeout_kills_child() {
    let dir = tempfile::tempdir().unwrap();
    let marker = dir.path().join("finished");
    let script = format!("sleep 3 && touch {}", marker.display());
    let spec = CommandSpec::new("sh").args(["-c", script.as_str()]);

    let result = runner()
        .run(&spec, &RunConfig::default().timeout(1).quiet())
        .await;

    assert!(matches!(result, Err(RunnerError::Timeout { seconds: 1, .. })));

    tokio::time::sleep(std::time::Duration::from_secs(3)).await;
    assert!(!marker.exists(), "timed-out child kept running");
}

/// Ctrl-C during a run lets the child finish, then fails the run.
#[cfg(unix)]
#[tokio::test]
async fn test_interrupt_during_run_fails_after_child_exits() {
    let dir = tempfile::tempdir().unwrap();
    let marker = dir.path().join("finished");
    // $PPID is this test process
    let script = format!("kill -INT $PPID; sleep 1; touch {}", marker.display());
    let runner = ProcessRunner::new(ProcessRunnerOptions::new());
    let spec = CommandSpec::new("sh").args(["-c", script.as_str()]);

    let result = runner.run(&spec, &RunConfig::default().quiet()).await;

    assert!(matches!(result, Err(RunnerError::Interrupted(_))));
    assert!(marker.exists(), "child was not allowed to finish");
    assert!(runner.interrupted());

    let next = runner
        .run(&CommandSpec::new("true"), &RunConfig::default().quiet())
        .await;
    assert!(matches!(next, Err(RunnerError::Interrupted(_))));
}
