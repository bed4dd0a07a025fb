use serde::Deserialize;
use std::time::Duration;

/// Whether the binary under test talks to a local stub or a real endpoint.
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    #[default]
    Integration,
    #[serde(alias = "e2e", alias = "end-to-end")]
    EndToEnd,
}

impl Mode {
    /// Parse the value of the `TESTMODE` environment variable.
    /// Anything that is not exactly an end-to-end token selects integration mode.
    pub fn from_env_value(value: Option<&str>) -> Self {
        match value {
            Some("e2e" | "end-to-end" | "end_to_end") => Mode::EndToEnd,
            _ => Mode::Integration,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Integration => "integration",
            Mode::EndToEnd => "end_to_end",
        }
    }
}

/// One fixture group: command template, optional API response body and the
/// expected output of the command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TestCase {
    pub name: String,
    pub command_template: String,
    pub command_args: Vec<String>,
    pub request_body: Option<Vec<u8>>,
    pub expected_output: String,
}

#[derive(Debug, Clone)]
pub struct CaseResult {
    pub name: String,
    pub command: Vec<String>,
    pub expected: String,
    pub actual: String,
    pub error: Option<String>,
    pub passed: bool,
    pub duration: Duration,
}

#[derive(Debug, Clone, Default)]
pub struct Summary {
    pub total: usize,  // Total number of test cases
    pub passed: usize, // Number of passed test cases
    pub failed: usize, // Number of failed test cases
    pub cases: Vec<CaseResult>,
}

impl Summary {
    pub fn from_results(cases: Vec<CaseResult>) -> Self {
        let passed = cases.iter().filter(|c| c.passed).count();
        Summary {
            total: cases.len(),
            passed,
            failed: cases.len() - passed,
            cases,
        }
    }
}
