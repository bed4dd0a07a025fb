use crate::engine::run_tests;
use crate::error::{FixtureError, RunnerError};
use crate::fixture::load_fixtures;
use crate::process::Launcher;
use crate::template::render_args;
use crate::types::{Mode, Summary, TestCase};
use std::path::Path;
use tracing::info;

/// Flag that points the binary under test at the stub server.
pub const DEFAULT_URL_FLAG: &str = "-u";

/// A test suite: the binary to call, how to call it and the tests to run.
#[derive(Debug, Clone)]
pub struct Runner {
    /// Binary substituted for `{{.Bin}}`.
    pub bin: String,
    pub mode: Mode,
    pub url_flag: String,
    pub tests: Vec<TestCase>,
}

impl Runner {
    pub fn new(bin: impl Into<String>, mode: Mode) -> Self {
        Self {
            bin: bin.into(),
            mode,
            url_flag: DEFAULT_URL_FLAG.to_string(),
            tests: Vec::new(),
        }
    }

    pub fn with_url_flag(mut self, flag: impl Into<String>) -> Self {
        self.url_flag = flag.into();
        self
    }

    /// Append the tests found under `dir`.
    pub fn generate_tests_from_path(&mut self, dir: &Path) -> Result<(), FixtureError> {
        let tests = load_fixtures(dir)?;
        info!(count = tests.len(), dir = %dir.display(), "loaded tests");
        self.tests.extend(tests);
        Ok(())
    }

    /// Render the command of every test. Either all tests get their
    /// arguments or none do.
    pub fn transform_to_executable(&mut self) -> Result<(), RunnerError> {
        let vars = [("Bin", self.bin.as_str())];
        let rendered = self
            .tests
            .iter()
            .map(|test| {
                render_args(&test.command_template, &vars).map_err(|source| RunnerError::Template {
                    name: test.name.clone(),
                    source,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        for (test, args) in self.tests.iter_mut().zip(rendered) {
            test.command_args = args;
        }
        Ok(())
    }

    /// Keep only the tests picked by `selector`: a 1-based number, an exact
    /// test name, or a directory prefix. Returns false if nothing matched,
    /// in which case the test list is left untouched.
    pub fn select(&mut self, selector: &str) -> bool {
        let selector = selector.trim();
        if let Ok(n) = selector.parse::<usize>() {
            if n == 0 || n > self.tests.len() {
                return false;
            }
            let picked = self.tests.swap_remove(n - 1);
            self.tests = vec![picked];
            return true;
        }
        let prefix = format!("{}/", selector.trim_end_matches('/'));
        let matches =
            |test: &TestCase| test.name == selector || test.name.starts_with(&prefix);
        if !self.tests.iter().any(matches) {
            return false;
        }
        self.tests.retain(matches);
        true
    }

    pub async fn run<L: Launcher>(&self, launcher: &L) -> Summary {
        run_tests(self, launcher).await
    }
}
