//! Extension Telemetry Core
//!
//! The main entry point for et-core, handling:
//! - Username anonymization of exception logs
//! - Telemetry key status
//! - Exception report assembly
//! - Effective settings inspection

use clap::{Args, Parser, Subcommand};
use et_config::{
    load_settings, telemetry_key_id, Environment, FsReader, KeyEncoding, LoadedSettings,
    StaticEnvironment, SystemEnvironment,
};
use et_core::exit_codes::ExitCode;
use et_core::logging::{init_logging, redact_usernames, LogConfig, LogFormat, LogLevel};
use et_core::{prepare_exception_report, CoreError, Result};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, error, info};

/// Extension Telemetry - anonymize exception logs and prepare telemetry reports
#[derive(Parser)]
#[command(name = "et-core")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[command(flatten)]
    global: GlobalOpts,
}

/// Global options available to all commands
#[derive(Args, Debug)]
struct GlobalOpts {
    /// Extension install directory (defaults to ET_EXTENSION_DIR, then the executable's directory)
    #[arg(long, global = true)]
    extension_dir: Option<PathBuf>,

    /// Settings file
    #[arg(long, global = true)]
    settings: Option<PathBuf>,

    /// Increase verbosity (-v, -vv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Log format on stderr (human, jsonl)
    #[arg(long, global = true)]
    log_format: Option<LogFormat>,

    /// Omit timestamps from human log lines
    #[arg(long, global = true)]
    no_timestamps: bool,

    /// Key file encoding (plain, base64), overriding the settings file
    #[arg(long, global = true)]
    key_encoding: Option<KeyEncoding>,
}

#[derive(Subcommand)]
enum Commands {
    /// Remove the account name from an exception log
    Anonymize(InputArgs),

    /// Show where the telemetry key is read from and whether it is valid
    Key(KeyArgs),

    /// Build an exception report (anonymized log + instrumentation key) as JSON
    Report(InputArgs),

    /// Show effective settings and where they came from
    Config,
}

#[derive(Args, Debug)]
struct InputArgs {
    /// Log file to read (stdin if omitted)
    #[arg(long, short)]
    input: Option<PathBuf>,

    /// Account name to remove (detected if omitted)
    #[arg(long)]
    username: Option<String>,
}

impl Commands {
    /// Account name given on the command line, if any.
    fn username(&self) -> Option<&str> {
        match self {
            Commands::Anonymize(args) | Commands::Report(args) => args.username.as_deref(),
            Commands::Key(_) | Commands::Config => None,
        }
    }
}

#[derive(Args, Debug)]
struct KeyArgs {
    /// Include the key value in the output
    #[arg(long)]
    show: bool,
}

fn main() {
    let cli = Cli::parse();

    let cli_level = if cli.global.quiet {
        Some(LogLevel::Error)
    } else {
        match cli.global.verbose {
            0 => None,
            1 => Some(LogLevel::Debug),
            _ => Some(LogLevel::Trace),
        }
    };
    let log_config = LogConfig::from_env(cli_level, cli.global.log_format)
        .with_timestamps(!cli.global.no_timestamps);

    let env = match &cli.global.extension_dir {
        Some(dir) => SystemEnvironment::with_extension_dir(dir),
        None => SystemEnvironment::new(),
    };
    // Paths and error messages on stderr may embed either name.
    let account = env.username();
    let usernames = [account.as_str(), cli.command.username().unwrap_or_default()];
    init_logging(&log_config, &usernames);

    let exit_code = match run(&cli, &env) {
        Ok(()) => ExitCode::Clean,
        Err(e) => {
            error!(error = %e, "command failed");
            eprintln!("et-core: {}", redact_usernames(&e.to_string(), &usernames));
            e.exit_code()
        }
    };

    std::process::exit(exit_code.as_i32());
}

fn run(cli: &Cli, env: &SystemEnvironment) -> Result<()> {
    let mut loaded = load_settings(cli.global.settings.as_deref())?;
    if let Some(encoding) = cli.global.key_encoding {
        debug!(%encoding, "key encoding overridden on the command line");
        loaded.settings.key_encoding = encoding;
    }

    match &cli.command {
        Commands::Anonymize(args) => run_anonymize(env, &loaded, args),
        Commands::Key(args) => run_key(env, &loaded, args),
        Commands::Report(args) => run_report(env, &loaded, args),
        Commands::Config => run_config(&loaded),
    }
}

fn run_anonymize(env: &SystemEnvironment, loaded: &LoadedSettings, args: &InputArgs) -> Result<()> {
    let content = read_input(args.input.as_deref())?;
    let username = args.username.clone().unwrap_or_else(|| env.username());

    let result = loaded
        .settings
        .anonymizer()
        .anonymize_detailed(&content, &username);
    info!(
        occurrences = result.occurrences,
        modified = result.was_modified,
        "anonymized exception log"
    );

    write_stdout(&result.output)
}

fn run_key(env: &SystemEnvironment, loaded: &LoadedSettings, args: &KeyArgs) -> Result<()> {
    let path = loaded.settings.key_file_path(&env.extension_path());
    let key = telemetry_key_id(env, &FsReader, &loaded.settings);

    let mut payload = serde_json::json!({
        "path": path.display().to_string(),
        "encoding": loaded.settings.key_encoding.to_string(),
        "valid": key.is_valid(),
    });
    if args.show {
        payload["key"] = serde_json::Value::String(key.into_string());
    }

    write_json(&payload)
}

fn run_report(env: &SystemEnvironment, loaded: &LoadedSettings, args: &InputArgs) -> Result<()> {
    let content = read_input(args.input.as_deref())?;

    let report = match &args.username {
        Some(name) => {
            let pinned = StaticEnvironment::new(env.extension_path(), name.clone());
            prepare_exception_report(&pinned, &FsReader, &loaded.settings, &content)
        }
        None => prepare_exception_report(env, &FsReader, &loaded.settings, &content),
    };

    write_json(&report)
}

fn run_config(loaded: &LoadedSettings) -> Result<()> {
    let payload = serde_json::json!({
        "source": loaded.source.to_string(),
        "path": loaded.path.as_ref().map(|p| p.display().to_string()),
        "settings": &loaded.settings,
    });
    write_json(&payload)
}

/// Read the exception log. Invalid UTF-8 is replaced, never rejected.
fn read_input(path: Option<&Path>) -> Result<String> {
    let bytes = match path {
        Some(path) => {
            debug!(path = %path.display(), "reading exception log");
            std::fs::read(path).map_err(|source| CoreError::Input {
                name: path.display().to_string(),
                source,
            })?
        }
        None => {
            let mut bytes = Vec::new();
            std::io::stdin()
                .read_to_end(&mut bytes)
                .map_err(|source| CoreError::Input {
                    name: "<stdin>".to_string(),
                    source,
                })?;
            bytes
        }
    };
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

fn write_json<T: serde::Serialize>(value: &T) -> Result<()> {
    let mut out = serde_json::to_string_pretty(value)?;
    out.push('\n');
    write_stdout(&out)
}

fn write_stdout(text: &str) -> Result<()> {
    let mut stdout = std::io::stdout().lock();
    stdout
        .write_all(text.as_bytes())
        .and_then(|()| stdout.flush())
        .map_err(CoreError::Output)
}
