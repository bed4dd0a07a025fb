use std::path::PathBuf;
use std::process::ExitStatus;
use std::time::Duration;
use thiserror::Error;

/// Errors raised while reading the fixture directory. All of them abort loading.
#[derive(Debug, Error)]
pub enum FixtureError {
    #[error(
        "fixture files may only end in \".json\", \".sh\" or \".txt\", but found \"{ext}\" at {}",
        path.display()
    )]
    UnsupportedFixtureFile { ext: String, path: PathBuf },

    #[error("failed to read fixture {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to walk fixture directory")]
    Walk(#[from] walkdir::Error),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TemplateError {
    #[error("template parse error at byte {offset}: {reason}")]
    Parse { offset: usize, reason: String },

    #[error("command requires at least one argument")]
    EmptyCommand,
}

/// Structural errors of the suite itself. These halt the run before any
/// command is executed.
#[derive(Debug, Error)]
pub enum RunnerError {
    #[error(transparent)]
    Fixture(#[from] FixtureError),

    #[error("failed to render command for test '{name}'")]
    Template {
        name: String,
        #[source]
        source: TemplateError,
    },
}

/// Failure of a single test case. Recorded in its result, never propagated.
#[derive(Debug, Error)]
pub enum CaseError {
    #[error("test has no rendered command")]
    NotRendered,

    #[error("failed to start '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to capture output of '{program}': {source}")]
    Capture {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("'{program}' exited with {status}")]
    NonZeroExit {
        program: String,
        status: ExitStatus,
        output: String,
    },

    #[error("'{program}' timed out after {} s", timeout.as_secs())]
    Timeout { program: String, timeout: Duration },

    #[error("failed to start stub server: {0}")]
    Stub(#[source] std::io::Error),

    #[error("expected {expected} but got {actual}")]
    OutputMismatch { expected: String, actual: String },
}
