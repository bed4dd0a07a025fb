use anyhow::Result;
use clap::{Parser, ValueEnum};
use cli_e2e::config::{MODE_ENV, Overrides, load_config, resolve};
use cli_e2e::i18n;
use cli_e2e::process::ProcessLauncher;
use cli_e2e::report::{OutputKind, ReportOptions, print_human};
use cli_e2e::runner::Runner;
use cli_e2e::types::Mode;
use cli_e2e::{t, t_args};
use colored::control::set_override as set_color_override;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum ModeOpt {
    Integration,
    #[value(alias = "end-to-end", alias = "end_to_end")]
    E2e,
}

impl From<ModeOpt> for Mode {
    fn from(v: ModeOpt) -> Self {
        match v {
            ModeOpt::Integration => Mode::Integration,
            ModeOpt::E2e => Mode::EndToEnd,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum OutputFormat {
    Normal,
    Compact,
    Terse,
}

impl From<OutputFormat> for OutputKind {
    fn from(v: OutputFormat) -> Self {
        match v {
            OutputFormat::Normal => OutputKind::Normal,
            OutputFormat::Compact => OutputKind::Compact,
            OutputFormat::Terse => OutputKind::Terse,
        }
    }
}

#[derive(Parser, Debug, Clone)]
#[command(version, about = t!("cli-about"))]
struct Cli {
    // FIXTURES: directory with <name>.sh / <name>.json / <name>.txt files
    #[arg(value_name = "FIXTURES", help = t!("cli-fixtures"))]
    fixtures: Option<PathBuf>,

    #[arg(short = 'b', long, value_name = "PATH", help = t!("cli-bin"))]
    bin: Option<String>,

    // Falls back to TESTMODE, then the config file
    #[arg(short = 'm', long, value_enum, help = t!("cli-mode"))]
    mode: Option<ModeOpt>,

    #[arg(long, value_name = "SECS", help = t!("cli-timeout"))]
    timeout: Option<u64>,

    #[arg(
        long = "url-flag",
        value_name = "FLAG",
        allow_hyphen_values = true,
        help = t!("cli-url-flag")
    )]
    url_flag: Option<String>,

    #[arg(short = 'c', long, value_name = "FILE", help = t!("cli-config"))]
    config: Option<PathBuf>,

    // -t/--test: number (1..N), test name or directory. 0 / list lists all tests and exits.
    #[arg(short = 't', long = "test", value_name = "TEST", help = t!("cli-test"))]
    test: Option<String>,

    #[arg(
        short = 'f',
        long = "hide-fails",
        conflicts_with = "hide_passes",
        help = t!("cli-hide-fails")
    )]
    hide_fails: bool,

    #[arg(
        short = 'p',
        long = "hide-passes",
        conflicts_with = "hide_fails",
        help = t!("cli-hide-passes")
    )]
    hide_passes: bool,

    #[arg(
        short = 'o',
        long = "output",
        value_enum,
        default_value = "normal",
        help = t!("cli-output")
    )]
    output: OutputFormat,

    #[arg(short = 'q', long = "silent", help = t!("cli-silent"))]
    silent: bool,

    #[arg(short = 'v', long = "verbose", help = t!("cli-verbose"))]
    verbose: bool,

    #[arg(long = "no-color", help = t!("cli-no-color"))]
    no_color: bool,
}

fn display_path(path: &Path) -> String {
    match std::fs::canonicalize(path) {
        Ok(p) => p.to_string_lossy().into_owned(),
        Err(_) => path.to_string_lossy().into_owned(),
    }
}

fn resolve_bin_path(bin: &str) -> String {
    if bin.contains(std::path::MAIN_SEPARATOR) || bin.starts_with("./") {
        return display_path(Path::new(bin));
    }
    match which::which(bin) {
        Ok(p) => p.to_string_lossy().into_owned(),
        Err(_) => bin.to_string(),
    }
}

fn is_list_request(selector: &str) -> bool {
    let trimmed = selector.trim();
    trimmed == "0" || trimmed.eq_ignore_ascii_case("list") || trimmed.eq_ignore_ascii_case("null")
}

fn test_list(runner: &Runner) -> Vec<String> {
    runner
        .tests
        .iter()
        .enumerate()
        .map(|(idx, test)| {
            t_args!("test-list-item",
                "index" => (idx + 1),
                "name" => &test.name
            )
        })
        .collect()
}

/// Structural problems with the suite abort before any test runs.
fn abort(key: &str, err: anyhow::Error) -> ! {
    error!("{}", t_args!(key, "error" => format!("{err:#}")));
    std::process::exit(2);
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize localization first
    i18n::init();

    let cli = Cli::parse();

    let filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "cli_e2e=info".to_string()
        } else {
            "cli_e2e=warn".to_string()
        }
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    if cli.no_color {
        set_color_override(false);
    }

    let file_cfg = match cli.config.as_deref().map(load_config).transpose() {
        Ok(cfg) => cfg,
        Err(err) => abort("error-config-failed", err),
    };
    let overrides = Overrides {
        bin: cli.bin.clone(),
        fixtures: cli.fixtures.clone(),
        mode: cli.mode.map(Into::into),
        env_mode: std::env::var(MODE_ENV).ok(),
        timeout: cli.timeout,
        url_flag: cli.url_flag.clone(),
    };
    let settings = match resolve(file_cfg, overrides) {
        Ok(settings) => settings,
        Err(err) => abort("error-config-failed", err),
    };

    if cli.verbose && !cli.silent {
        info!(
            "{}",
            t_args!("info-version",
                "name" => env!("CARGO_PKG_NAME"),
                "version" => env!("CARGO_PKG_VERSION")
            )
        );
        info!("{}", t_args!("info-binary", "path" => resolve_bin_path(&settings.bin)));
        info!("{}", t_args!("info-fixtures", "path" => display_path(&settings.fixtures)));
        info!("{}", t_args!("info-mode", "mode" => settings.mode.as_str()));
    }

    let mut runner = Runner::new(settings.bin, settings.mode).with_url_flag(settings.url_flag);

    if let Err(err) = runner.generate_tests_from_path(&settings.fixtures) {
        abort("error-load-failed", err.into());
    }
    if runner.tests.is_empty() {
        warn!("{}", t_args!("warn-no-tests", "path" => settings.fixtures.display()));
    }

    if let Some(sel) = cli.test.as_deref().filter(|s| is_list_request(s)) {
        println!("{}", t!("available-tests"));
        for line in test_list(&runner) {
            println!("{line}");
        }
        info!(selector = sel, "listed tests");
        return Ok(());
    }

    // Render every command before anything runs
    if let Err(err) = runner.transform_to_executable() {
        abort("error-render-failed", err.into());
    }

    if let Some(sel) = &cli.test {
        let available = test_list(&runner);
        if !runner.select(sel) {
            error!("{}", t_args!("error-test-not-found", "test" => sel.trim()));
            eprintln!("{}", t!("available-tests"));
            for line in available {
                eprintln!("{line}");
            }
            std::process::exit(2);
        }
    }

    if cli.verbose && !cli.silent {
        info!(
            "{}",
            t_args!("info-starting-tests",
                "count" => runner.tests.len(),
                "mode" => runner.mode.as_str()
            )
        );
    }

    let launcher = ProcessLauncher::new(settings.timeout);
    let summary = runner.run(&launcher).await;

    if !cli.silent {
        print_human(
            &summary,
            ReportOptions {
                kind: cli.output.into(),
                hide_passes: cli.hide_passes,
                hide_fails: cli.hide_fails,
                verbose: cli.verbose,
            },
        );
    }

    if cli.verbose && !cli.silent {
        info!(
            "{}",
            t_args!("info-all-finished",
                "total" => summary.total,
                "passed" => summary.passed,
                "failed" => summary.failed
            )
        );
    }

    if summary.failed > 0 {
        std::process::exit(1);
    }

    Ok(())
}
