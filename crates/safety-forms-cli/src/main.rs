// crates/safety-forms-cli/src/main.rs
// ============================================================================
// Module: Safety Forms CLI Entry Point
// Description: Command dispatcher for the forms server and store seeding.
// Purpose: Start the HTTP API, validate configuration, and create users.
// Dependencies: clap, safety-forms-{config, core, server}, tokio, tracing.
// ============================================================================

//! ## Overview
//! The `safety-forms` binary loads configuration, initializes logging at the
//! configured level, and dispatches to one of three commands: `serve`,
//! `config validate`, and `user add`. Failures print a single line to stderr
//! and exit non-zero.

// ============================================================================
// SECTION: Modules
// ============================================================================

#[cfg(test)]
mod main_tests;

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Args;
use clap::Parser;
use clap::Subcommand;
use safety_forms_config::LogLevel;
use safety_forms_config::SafetyFormsConfig;
use safety_forms_core::FormService;
use safety_forms_server::FormsServer;
use safety_forms_server::build_form_store;
use thiserror::Error;
use tracing::Level;

// ============================================================================
// SECTION: CLI Types
// ============================================================================

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(name = "safety-forms", version, about = "Workplace safety forms server")]
struct Cli {
    /// Selected subcommand to execute.
    #[command(subcommand)]
    command: Commands,
}

/// Supported CLI subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the HTTP API server.
    Serve(ServeCommand),
    /// Configuration utilities.
    Config {
        /// Selected config subcommand.
        #[command(subcommand)]
        command: ConfigCommand,
    },
    /// User administration.
    User {
        /// Selected user subcommand.
        #[command(subcommand)]
        command: UserCommand,
    },
}

/// Configuration for the `serve` command.
#[derive(Args, Debug)]
struct ServeCommand {
    /// Optional config file path (defaults to safety-forms.toml or env override).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Override the configured bind address.
    #[arg(long, value_name = "ADDR")]
    bind: Option<String>,
}

/// Config subcommands.
#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Validate a configuration file.
    Validate(ConfigValidateCommand),
}

/// Arguments for `config validate`.
#[derive(Args, Debug)]
struct ConfigValidateCommand {
    /// Optional config file path.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

/// User subcommands.
#[derive(Subcommand, Debug)]
enum UserCommand {
    /// Create a login user in the configured store.
    Add(UserAddCommand),
}

/// Arguments for `user add`.
#[derive(Args, Debug)]
struct UserAddCommand {
    /// Login name.
    #[arg(long)]
    nombre: String,
    /// Login password.
    #[arg(long)]
    password: String,
    /// Role label returned on login.
    #[arg(long)]
    rol: String,
    /// Optional config file path.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// CLI error wrapper for user-facing messages.
#[derive(Debug, Error)]
#[error("{message}")]
struct CliError {
    /// Human-readable error message.
    message: String,
}

impl CliError {
    /// Constructs a new [`CliError`].
    const fn new(message: String) -> Self {
        Self {
            message,
        }
    }
}

/// CLI result alias for fallible operations.
type CliResult<T> = Result<T, CliError>;

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// CLI entry point returning an exit code.
#[tokio::main(flavor = "multi_thread")]
async fn main() -> ExitCode {
    match run(Cli::parse()).await {
        Ok(code) => code,
        Err(err) => emit_error(&err.to_string()),
    }
}

/// Executes the CLI command dispatcher.
async fn run(cli: Cli) -> CliResult<ExitCode> {
    match cli.command {
        Commands::Serve(command) => command_serve(command).await,
        Commands::Config {
            command: ConfigCommand::Validate(command),
        } => command_config_validate(&command),
        Commands::User {
            command: UserCommand::Add(command),
        } => command_user_add(&command),
    }
}

// ============================================================================
// SECTION: Commands
// ============================================================================

/// Runs the HTTP server until Ctrl-C.
async fn command_serve(command: ServeCommand) -> CliResult<ExitCode> {
    let mut config = load_config(command.config.as_deref())?;
    if let Some(bind) = command.bind {
        config.server.bind = bind;
    }
    init_logging(config.logging.level);
    let server = FormsServer::from_config(config)
        .map_err(|err| CliError::new(format!("failed to start server: {err}")))?;
    server.serve().await.map_err(|err| CliError::new(format!("server failed: {err}")))?;
    Ok(ExitCode::SUCCESS)
}

/// Loads and validates configuration, reporting success on stdout.
fn command_config_validate(command: &ConfigValidateCommand) -> CliResult<ExitCode> {
    let config = load_config(command.config.as_deref())?;
    let source = config
        .source_path
        .as_ref()
        .map_or_else(|| "built-in defaults".to_string(), |path| path.display().to_string());
    write_stdout_line(&format!("config ok ({source})"))
        .map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(ExitCode::SUCCESS)
}

/// Inserts a login user into the configured store.
fn command_user_add(command: &UserAddCommand) -> CliResult<ExitCode> {
    let config = load_config(command.config.as_deref())?;
    init_logging(config.logging.level);
    let store = build_form_store(&config.store)
        .map_err(|err| CliError::new(format!("failed to open store: {err}")))?;
    let user = FormService::new(store)
        .add_user(&command.nombre, &command.password, &command.rol)
        .map_err(|err| CliError::new(format!("failed to add user: {err}")))?;
    write_stdout_line(&format!("user {} created with id {}", user.nombre, user.id))
        .map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Loads configuration from an explicit path, the env override, or defaults.
fn load_config(path: Option<&std::path::Path>) -> CliResult<SafetyFormsConfig> {
    SafetyFormsConfig::load(path).map_err(|err| CliError::new(format!("config load failed: {err}")))
}

/// Maps the configured log level to a `tracing` level.
const fn tracing_level(level: LogLevel) -> Level {
    match level {
        LogLevel::Trace => Level::TRACE,
        LogLevel::Debug => Level::DEBUG,
        LogLevel::Info => Level::INFO,
        LogLevel::Warn => Level::WARN,
        LogLevel::Error => Level::ERROR,
    }
}

/// Installs the global fmt subscriber writing to stderr.
fn init_logging(level: LogLevel) {
    // A subscriber may already be installed when commands run in-process.
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing_level(level))
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Writes a single line to stdout.
fn write_stdout_line(message: &str) -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    writeln!(&mut stdout, "{message}")
}

/// Writes a single line to stderr.
fn write_stderr_line(message: &str) -> std::io::Result<()> {
    let mut stderr = std::io::stderr();
    writeln!(&mut stderr, "{message}")
}

/// Formats an output failure message.
fn output_error(stream: &str, error: &std::io::Error) -> String {
    format!("failed to write to {stream}: {error}")
}

/// Emits an error message to stderr and returns a failure exit code.
fn emit_error(message: &str) -> ExitCode {
    let _ = write_stderr_line(message);
    ExitCode::FAILURE
}
