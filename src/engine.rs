use crate::error::CaseError;
use crate::process::Launcher;
use crate::runner::Runner;
use crate::stub::StubServer;
use crate::types::{CaseResult, Mode, Summary, TestCase};
use std::time::Instant;
use tracing::{debug, info};

/// Run every test of the runner in order. A failing test never stops the
/// ones after it.
pub async fn run_tests<L: Launcher>(runner: &Runner, launcher: &L) -> Summary {
    let mut results = Vec::with_capacity(runner.tests.len());
    for case in &runner.tests {
        let result = run_case(runner, launcher, case).await;
        info!(name = %result.name, passed = result.passed, "test finished");
        results.push(result);
    }
    Summary::from_results(results)
}

async fn run_case<L: Launcher>(runner: &Runner, launcher: &L, case: &TestCase) -> CaseResult {
    let started = Instant::now();
    let mut command = case.command_args.clone();

    let outcome = match runner.mode {
        _ if command.is_empty() => Err(CaseError::NotRendered),
        Mode::Integration => {
            let body = case.request_body.clone().unwrap_or_default();
            match StubServer::start(body).await {
                Ok(stub) => {
                    command.push(runner.url_flag.clone());
                    command.push(stub.url().to_string());
                    let outcome = execute(launcher, &command, &case.expected_output).await;
                    debug!(name = %case.name, hits = stub.hits(), "stub served requests");
                    stub.shutdown().await;
                    outcome
                }
                Err(e) => Err(CaseError::Stub(e)),
            }
        }
        Mode::EndToEnd => execute(launcher, &command, &case.expected_output).await,
    };

    let expected = case.expected_output.trim().to_string();
    let duration = started.elapsed();
    match outcome {
        Ok(actual) => CaseResult {
            name: case.name.clone(),
            command,
            expected,
            actual,
            error: None,
            passed: true,
            duration,
        },
        Err(CaseError::OutputMismatch { actual, .. }) => CaseResult {
            name: case.name.clone(),
            command,
            expected,
            actual,
            error: None,
            passed: false,
            duration,
        },
        Err(e) => {
            let actual = match &e {
                CaseError::NonZeroExit { output, .. } => output.trim().to_string(),
                _ => String::new(),
            };
            CaseResult {
                name: case.name.clone(),
                command,
                expected,
                actual,
                error: Some(e.to_string()),
                passed: false,
                duration,
            }
        }
    }
}

/// Launch the command and compare its output with the expected text,
/// ignoring surrounding whitespace on both sides.
async fn execute<L: Launcher>(
    launcher: &L,
    command: &[String],
    expected: &str,
) -> Result<String, CaseError> {
    let output = launcher.launch(command).await?;
    let actual = String::from_utf8_lossy(&output).trim().to_string();
    let expected = expected.trim();
    if actual != expected {
        return Err(CaseError::OutputMismatch {
            expected: expected.to_string(),
            actual,
        });
    }
    Ok(actual)
}
