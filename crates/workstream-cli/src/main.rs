// workstream-cli/src/main.rs
// ============================================================================
// Module: Workstream CLI Entry Point
// Description: Command dispatcher for the companies API server and client config.
// Purpose: Provide a safe, localized CLI for serving and configuration checks.
// Dependencies: clap, workstream-api, workstream-config, serde_json, thiserror, tokio.
// ============================================================================

//! ## Overview
//! The Workstream CLI launches the companies API server, validates server
//! configuration files, and prints the front-end client configuration for a
//! deployment environment. All user-facing strings are routed through the
//! i18n catalog.

// ============================================================================
// SECTION: Modules
// ============================================================================


// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::ArgAction;
use clap::Args;
use clap::CommandFactory;
use clap::Parser;
use clap::Subcommand;
use thiserror::Error;
use tokio::net::TcpListener;
use workstream_api::ApiServer;
use workstream_cli::serve_policy::BindOutcome;
use workstream_cli::serve_policy::enforce_local_only;
use workstream_cli::serve_policy::resolve_allow_non_loopback;
use workstream_cli::t;
use workstream_config::ClientConfig;
use workstream_config::ClientEnvironment;
use workstream_config::ServerAuthMode;
use workstream_config::WorkstreamConfig;

// ============================================================================
// SECTION: CLI Types
// ============================================================================

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(name = "workstream", disable_help_subcommand = true, disable_version_flag = true)]
struct Cli {
    /// Print version information and exit.
    #[arg(long = "version", action = ArgAction::SetTrue, global = true)]
    show_version: bool,
    /// Selected subcommand to execute.
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Supported CLI subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the companies API server.
    Serve(ServeCommand),
    /// Configuration utilities.
    Config {
        /// Selected config subcommand.
        #[command(subcommand)]
        command: ConfigCommand,
    },
    /// Print the front-end client configuration.
    ClientConfig(ClientConfigCommand),
}

/// Configuration for the `serve` command.
#[derive(Args, Debug)]
struct ServeCommand {
    /// Optional config file path (defaults to workstream.toml or env override).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Allow binding to non-loopback addresses (requires bearer token auth).
    #[arg(long, action = ArgAction::SetTrue)]
    allow_non_loopback: bool,
}

/// Config subcommands.
#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Validate a Workstream configuration file.
    Validate(ConfigValidateCommand),
}

/// Configuration for `config validate`.
#[derive(Args, Debug)]
struct ConfigValidateCommand {
    /// Optional config file path (defaults to workstream.toml or env override).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

/// Configuration for `client-config`.
#[derive(Args, Debug)]
struct ClientConfigCommand {
    /// Deployment environment name (overrides `WORKSTREAM_ENV`).
    #[arg(long = "env", value_name = "ENV")]
    environment: Option<String>,
    /// Emit the configuration as a JSON object.
    #[arg(long, action = ArgAction::SetTrue)]
    json: bool,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// CLI error wrapper for localized error messages.
#[derive(Debug, Error)]
#[error("{message}")]
struct CliError {
    /// Human-readable error message.
    message: String,
}

impl CliError {
    /// Constructs a new [`CliError`] from a localized message.
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
    match run().await {
        Ok(code) => code,
        Err(err) => emit_error(&err.to_string()),
    }
}

/// Executes the CLI command dispatcher.
async fn run() -> CliResult<ExitCode> {
    let cli = Cli::parse();

    if cli.show_version {
        let version = env!("CARGO_PKG_VERSION");
        write_stdout_line(&t!("main.version", version = version))
            .map_err(|err| CliError::new(output_error("stdout", &err)))?;
        return Ok(ExitCode::SUCCESS);
    }

    let Some(command) = cli.command else {
        show_help()?;
        return Ok(ExitCode::SUCCESS);
    };

    match command {
        Commands::Serve(command) => command_serve(command).await,
        Commands::Config {
            command,
        } => command_config(command),
        Commands::ClientConfig(command) => command_client_config(&command),
    }
}

/// Prints top-level help text.
fn show_help() -> CliResult<()> {
    let help = Cli::command().render_help().to_string();
    write_stdout_line(help.trim_end()).map_err(|err| CliError::new(output_error("stdout", &err)))
}

// ============================================================================
// SECTION: Serve Command
// ============================================================================

/// Executes the `serve` command.
async fn command_serve(command: ServeCommand) -> CliResult<ExitCode> {
    let config = WorkstreamConfig::load(command.config.as_deref())
        .map_err(|err| CliError::new(t!("serve.config.load_failed", error = err)))?;
    let allow_non_loopback = resolve_allow_non_loopback(command.allow_non_loopback)
        .map_err(|err| CliError::new(err.to_string()))?;
    let bind_outcome = enforce_local_only(&config, allow_non_loopback)
        .map_err(|err| CliError::new(err.to_string()))?;
    if bind_outcome.auth_mode == ServerAuthMode::LocalOnly {
        write_stderr_line(&t!("serve.warn.local_only_auth"))
            .map_err(|err| CliError::new(output_error("stderr", &err)))?;
    }
    if bind_outcome.network_exposed {
        warn_network_exposure(&bind_outcome)?;
    }

    let server = tokio::task::spawn_blocking(move || ApiServer::from_config(config))
        .await
        .map_err(|err| {
            CliError::new(t!("serve.init_failed", error = format!("init join failed: {err}")))
        })?
        .map_err(|err| CliError::new(t!("serve.init_failed", error = err)))?;
    let listener = TcpListener::bind(bind_outcome.bind_addr).await.map_err(|err| {
        CliError::new(t!("serve.bind_failed", bind = bind_outcome.bind_addr, error = err))
    })?;
    let local_addr = listener.local_addr().unwrap_or(bind_outcome.bind_addr);
    write_stderr_line(&t!("serve.listening", addr = local_addr))
        .map_err(|err| CliError::new(output_error("stderr", &err)))?;
    server.serve_on(listener).await.map_err(|err| CliError::new(t!("serve.failed", error = err)))?;

    Ok(ExitCode::SUCCESS)
}

/// Emits the network exposure warning.
fn warn_network_exposure(outcome: &BindOutcome) -> CliResult<()> {
    let auth = match outcome.auth_mode {
        ServerAuthMode::LocalOnly => "local_only",
        ServerAuthMode::BearerToken => "bearer_token",
    };
    let audit = if outcome.audit_enabled { "on" } else { "off" };
    write_stderr_line(&t!(
        "serve.warn.network_exposure",
        bind = outcome.bind_addr,
        auth = auth,
        audit = audit
    ))
    .map_err(|err| CliError::new(output_error("stderr", &err)))
}

// ============================================================================
// SECTION: Config Commands
// ============================================================================

/// Dispatches config subcommands.
fn command_config(command: ConfigCommand) -> CliResult<ExitCode> {
    match command {
        ConfigCommand::Validate(command) => command_config_validate(&command),
    }
}

/// Executes the config validation command.
fn command_config_validate(command: &ConfigValidateCommand) -> CliResult<ExitCode> {
    let _config = WorkstreamConfig::load(command.config.as_deref())
        .map_err(|err| CliError::new(t!("config.load_failed", error = err)))?;
    write_stdout_line(&t!("config.validate.ok"))
        .map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Client Config Command
// ============================================================================

/// Executes the `client-config` command.
fn command_client_config(command: &ClientConfigCommand) -> CliResult<ExitCode> {
    let environment = resolve_client_environment(command.environment.as_deref());
    let output = render_client_config(&ClientConfig::for_environment(environment), command.json)?;
    write_stdout_line(&output).map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(ExitCode::SUCCESS)
}

/// Resolves the client environment from the flag or `WORKSTREAM_ENV`.
fn resolve_client_environment(flag: Option<&str>) -> ClientEnvironment {
    flag.map_or_else(ClientEnvironment::from_env, ClientEnvironment::from_name)
}

/// Renders the client configuration as a bare URI or a JSON object.
fn render_client_config(config: &ClientConfig, json: bool) -> CliResult<String> {
    if !json {
        return Ok(config.api_server_uri.clone());
    }
    serde_json::to_string(config)
        .map_err(|err| CliError::new(t!("client_config.serialize_failed", error = err)))
}

// ============================================================================
// SECTION: Output Helpers
// ============================================================================

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

/// Formats a localized output error message.
fn output_error(stream: &str, error: &std::io::Error) -> String {
    let stream_label = match stream {
        "stdout" => t!("output.stream.stdout"),
        "stderr" => t!("output.stream.stderr"),
        _ => t!("output.stream.unknown"),
    };
    t!("output.write_failed", stream = stream_label, error = error)
}

/// Emits an error message to stderr and returns a failure exit code.
fn emit_error(message: &str) -> ExitCode {
    let _ = write_stderr_line(message);
    ExitCode::FAILURE
}
