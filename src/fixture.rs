use crate::error::FixtureError;
use crate::types::TestCase;
use std::fs;
use std::path::Path;
use tracing::debug;
use walkdir::WalkDir;

/// Role of a file inside the fixture directory, decided by its extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FixtureKind {
    RequestBody,
    Command,
    Expected,
    Helper,
}

impl FixtureKind {
    fn from_extension(ext: &str) -> Option<Self> {
        match ext {
            "json" => Some(FixtureKind::RequestBody),
            "sh" => Some(FixtureKind::Command),
            "txt" => Some(FixtureKind::Expected),
            "rs" => Some(FixtureKind::Helper),
            _ => None,
        }
    }
}

fn read_bytes(path: &Path) -> Result<Vec<u8>, FixtureError> {
    fs::read(path).map_err(|source| FixtureError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn read_text(path: &Path) -> Result<String, FixtureError> {
    fs::read_to_string(path).map_err(|source| FixtureError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Walk `root` in lexical order and group `<name>.json`, `<name>.sh` and
/// `<name>.txt` into test cases. The `.txt` file closes the current group.
pub fn load_fixtures(root: &Path) -> Result<Vec<TestCase>, FixtureError> {
    let mut tests = Vec::new();
    let mut current = TestCase::default();

    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry?;
        if entry.file_type().is_dir() {
            continue;
        }
        let path = entry.path();
        let rel = path.strip_prefix(root).unwrap_or(path);
        let ext = rel
            .extension()
            .map(|e| e.to_string_lossy().into_owned())
            .unwrap_or_default();

        let kind = FixtureKind::from_extension(&ext).ok_or_else(|| {
            FixtureError::UnsupportedFixtureFile {
                ext: if ext.is_empty() { String::new() } else { format!(".{ext}") },
                path: path.to_path_buf(),
            }
        })?;

        match kind {
            FixtureKind::RequestBody => current.request_body = Some(read_bytes(path)?),
            FixtureKind::Command => current.command_template = read_text(path)?.trim().to_string(),
            FixtureKind::Expected => {
                current.expected_output = read_text(path)?;
                current.name = rel
                    .with_extension("")
                    .to_string_lossy()
                    .replace('\\', "/");
                debug!(name = %current.name, "loaded fixture");
                tests.push(std::mem::take(&mut current));
            }
            FixtureKind::Helper => {}
        }
    }

    Ok(tests)
}
