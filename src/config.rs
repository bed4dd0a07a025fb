//! Suite configuration.
//!
//! Values come from, in increasing priority: built-in defaults, an optional
//! YAML file, the `TESTMODE` environment variable (mode only), and CLI flags.

use crate::process::DEFAULT_TIMEOUT;
use crate::runner::DEFAULT_URL_FLAG;
use crate::types::Mode;
use crate::{t, t_args};
use anyhow::{Context, Result, anyhow};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Binary used when neither the config file nor the CLI names one.
pub const DEFAULT_BIN: &str = "doctl";

/// Environment variable selecting the test mode.
pub const MODE_ENV: &str = "TESTMODE";

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct FileConfig {
    pub bin: Option<String>,
    pub fixtures: Option<PathBuf>,
    pub mode: Option<Mode>,
    /// Seconds
    pub timeout: Option<u64>,
    pub url_flag: Option<String>,
}

/// Values given on the command line or through the environment.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub bin: Option<String>,
    pub fixtures: Option<PathBuf>,
    pub mode: Option<Mode>,
    pub env_mode: Option<String>,
    pub timeout: Option<u64>,
    pub url_flag: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub bin: String,
    pub fixtures: PathBuf,
    pub mode: Mode,
    pub timeout: Duration,
    pub url_flag: String,
}

fn resolve_path_relative_to_config(path: &Path, config_path: &Path) -> PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }
    match config_path.parent() {
        Some(dir) => dir.join(path),
        None => path.to_path_buf(),
    }
}

/// Read a YAML config file. Relative paths in it are resolved against the
/// file's own directory; a bare `Bin` name is left for `PATH` lookup.
pub fn load_config(path: &Path) -> Result<FileConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| t_args!("config-failed-to-read", "file" => path.display()))?;
    let mut cfg: FileConfig = serde_yaml::from_str(&content)
        .with_context(|| t_args!("config-yaml-error", "file" => path.display()))?;

    cfg.fixtures = cfg
        .fixtures
        .map(|f| resolve_path_relative_to_config(&f, path));
    cfg.bin = cfg.bin.map(|bin| {
        let bin = bin.trim();
        if bin.contains(std::path::MAIN_SEPARATOR) || bin.contains('/') {
            resolve_path_relative_to_config(Path::new(bin), path)
                .to_string_lossy()
                .into_owned()
        } else {
            bin.to_string()
        }
    });
    Ok(cfg)
}

/// Merge the config file with command line and environment overrides.
pub fn resolve(file: Option<FileConfig>, overrides: Overrides) -> Result<Settings> {
    let file = file.unwrap_or_default();

    let env_mode = overrides
        .env_mode
        .as_deref()
        .filter(|v| !v.is_empty())
        .map(|v| Mode::from_env_value(Some(v)));

    let fixtures = overrides
        .fixtures
        .or(file.fixtures)
        .ok_or_else(|| anyhow!(t!("config-missing-fixtures")))?;

    let timeout = overrides.timeout.or(file.timeout);
    if timeout == Some(0) {
        return Err(anyhow!(t!("config-zero-timeout")));
    }

    Ok(Settings {
        bin: overrides
            .bin
            .or(file.bin)
            .unwrap_or_else(|| DEFAULT_BIN.to_string()),
        fixtures,
        mode: overrides.mode.or(env_mode).or(file.mode).unwrap_or_default(),
        timeout: timeout.map(Duration::from_secs).unwrap_or(DEFAULT_TIMEOUT),
        url_flag: overrides
            .url_flag
            .or(file.url_flag)
            .unwrap_or_else(|| DEFAULT_URL_FLAG.to_string()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn defaults_apply_without_file() {
        let settings = resolve(
            None,
            Overrides {
                fixtures: Some("fixtures".into()),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(settings.bin, "doctl");
        assert_eq!(settings.mode, Mode::Integration);
        assert_eq!(settings.timeout, DEFAULT_TIMEOUT);
        assert_eq!(settings.url_flag, "-u");
    }

    #[test]
    fn fixtures_are_required() {
        assert!(resolve(None, Overrides::default()).is_err());
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let overrides = Overrides {
            fixtures: Some("f".into()),
            timeout: Some(0),
            ..Default::default()
        };
        assert!(resolve(None, overrides).is_err());
    }

    #[test]
    fn file_values_are_read_and_resolved() -> Result<()> {
        let dir = tempdir()?;
        let file = dir.path().join("suite.yaml");
        fs::write(
            &file,
            "Bin: ./bin/doctl\nFixtures: e2e\nMode: e2e\nTimeout: 5\nUrlFlag: --api-url\n",
        )?;
        let cfg = load_config(&file)?;
        assert_eq!(cfg.fixtures, Some(dir.path().join("e2e")));
        assert_eq!(cfg.bin, Some(dir.path().join("./bin/doctl").to_string_lossy().into_owned()));
        assert_eq!(cfg.mode, Some(Mode::EndToEnd));

        let settings = resolve(Some(cfg), Overrides::default())?;
        assert_eq!(settings.timeout, Duration::from_secs(5));
        assert_eq!(settings.url_flag, "--api-url");
        Ok(())
    }

    #[test]
    fn bare_binary_name_is_not_resolved() -> Result<()> {
        let dir = tempdir()?;
        let file = dir.path().join("suite.yaml");
        fs::write(&file, "Bin: doctl\n")?;
        assert_eq!(load_config(&file)?.bin.as_deref(), Some("doctl"));
        Ok(())
    }

    #[test]
    fn cli_beats_env_beats_file() {
        let file = FileConfig {
            fixtures: Some("from-file".into()),
            mode: Some(Mode::Integration),
            bin: Some("file-bin".into()),
            ..Default::default()
        };

        let env_only = Overrides {
            env_mode: Some("end-to-end".into()),
            ..Default::default()
        };
        let settings = resolve(Some(file.clone()), env_only).unwrap();
        assert_eq!(settings.mode, Mode::EndToEnd);
        assert_eq!(settings.bin, "file-bin");
        assert_eq!(settings.fixtures, PathBuf::from("from-file"));

        let cli = Overrides {
            env_mode: Some("e2e".into()),
            mode: Some(Mode::Integration),
            bin: Some("cli-bin".into()),
            ..Default::default()
        };
        let settings = resolve(Some(file), cli).unwrap();
        assert_eq!(settings.mode, Mode::Integration);
        assert_eq!(settings.bin, "cli-bin");
    }

    #[test]
    fn empty_env_mode_is_ignored() {
        let file = FileConfig {
            fixtures: Some("f".into()),
            mode: Some(Mode::EndToEnd),
            ..Default::default()
        };
        let overrides = Overrides {
            env_mode: Some(String::new()),
            ..Default::default()
        };
        assert_eq!(resolve(Some(file), overrides).unwrap().mode, Mode::EndToEnd);
    }

    #[test]
    fn env_mode_is_matched_exactly() {
        let file = FileConfig {
            fixtures: Some("f".into()),
            mode: Some(Mode::EndToEnd),
            ..Default::default()
        };
        let overrides = Overrides {
            env_mode: Some("E2E".into()),
            ..Default::default()
        };
        assert_eq!(resolve(Some(file), overrides).unwrap().mode, Mode::Integration);
    }

    #[test]
    fn unknown_keys_are_rejected() -> Result<()> {
        let dir = tempdir()?;
        let file = dir.path().join("suite.yaml");
        fs::write(&file, "Fixtures: e2e\nToken: secret\n")?;
        assert!(load_config(&file).is_err());
        Ok(())
    }
}
