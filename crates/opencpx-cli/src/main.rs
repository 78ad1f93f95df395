// crates/opencpx-cli/src/main.rs
// ============================================================================
// Module: OpenCPX CLI Entry Point
// Description: Command dispatcher for the opencpx binary.
// Purpose: Check, aggregate, convert, and serve posture documents.
// Dependencies: clap, opencpx-cli, opencpx-config, opencpx-core, opencpx-http, tokio
// ============================================================================

//! ## Overview
//! `opencpx` works on posture documents stored as JSON files. `check` and
//! `aggregate` report on a document, `convert` re-encodes it, and `serve`
//! publishes it over HTTP using the `[server]`, `[audit]`, and `[document]`
//! sections of `opencpx.toml`.
//!
//! Security posture: document and config files are untrusted input; every
//! command fails closed on decode or validation errors.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Args;
use clap::Parser;
use clap::Subcommand;
use clap::ValueEnum;
use opencpx_cli::FilePostureProvider;
use opencpx_cli::PostureSummary;
use opencpx_cli::read_document;
use opencpx_config::CpxConfig;
use opencpx_core::Timestamp;
use opencpx_http::ResponseFormat;
use opencpx_http::render;
use thiserror::Error;

// ============================================================================
// SECTION: CLI Types
// ============================================================================

/// Top-level CLI arguments.
#[derive(Parser, Debug)]
#[command(name = "opencpx", version, about = "OpenCPX compliance posture tooling")]
struct Cli {
    /// Selected subcommand to execute.
    #[command(subcommand)]
    command: Commands,
}

/// Supported CLI subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Serve a posture document over HTTP.
    Serve(ServeCommand),
    /// Decode a document and print a summary.
    Check(CheckCommand),
    /// Recompute the overall posture from the document's frameworks.
    Aggregate(AggregateCommand),
    /// Re-encode a document as JSON or YAML.
    Convert(ConvertCommand),
}

/// Arguments for `serve`.
#[derive(Args, Debug)]
struct ServeCommand {
    /// Optional config file path (defaults to opencpx.toml or env override).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Document to serve, overriding `document.source`.
    #[arg(long, value_name = "FILE")]
    document: Option<PathBuf>,
}

/// Arguments for `check`.
#[derive(Args, Debug)]
struct CheckCommand {
    /// Posture document path.
    #[arg(value_name = "FILE")]
    file: PathBuf,
}

/// Arguments for `aggregate`.
#[derive(Args, Debug)]
struct AggregateCommand {
    /// Posture document path.
    #[arg(value_name = "FILE")]
    file: PathBuf,
    /// Exit non-zero when the declared posture disagrees with the aggregate.
    #[arg(long)]
    strict: bool,
}

/// Arguments for `convert`.
#[derive(Args, Debug)]
struct ConvertCommand {
    /// Posture document path.
    #[arg(value_name = "FILE")]
    file: PathBuf,
    /// Output format.
    #[arg(long, value_enum, default_value_t = ConvertFormat::Json)]
    format: ConvertFormat,
    /// Emit compact JSON instead of indented output.
    #[arg(long)]
    compact: bool,
}

/// Output formats for `convert`.
#[derive(ValueEnum, Copy, Clone, Debug)]
enum ConvertFormat {
    /// Canonical JSON.
    Json,
    /// YAML rendering of the same tree.
    Yaml,
}

impl From<ConvertFormat> for ResponseFormat {
    fn from(value: ConvertFormat) -> Self {
        match value {
            ConvertFormat::Json => Self::Json,
            ConvertFormat::Yaml => Self::Yaml,
        }
    }
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
    match run().await {
        Ok(code) => code,
        Err(err) => emit_error(&err.to_string()),
    }
}

/// Executes the CLI command dispatcher.
async fn run() -> CliResult<ExitCode> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Serve(command) => command_serve(command).await,
        Commands::Check(command) => command_check(&command),
        Commands::Aggregate(command) => command_aggregate(&command),
        Commands::Convert(command) => command_convert(&command),
    }
}

// ============================================================================
// SECTION: Commands
// ============================================================================

/// Serves the configured document until the server stops.
async fn command_serve(command: ServeCommand) -> CliResult<ExitCode> {
    let config = CpxConfig::load(command.config.as_deref())
        .map_err(|err| CliError::new(format!("failed to load config: {err}")))?;
    let document = command
        .document
        .or_else(|| config.document.source.as_deref().map(|source| PathBuf::from(source.trim())))
        .ok_or_else(|| {
            CliError::new("no document to serve: set document.source or pass --document".into())
        })?;
    // Fail before binding when the document is already unreadable.
    read_document(&document).map_err(|err| CliError::new(err.to_string()))?;

    write_stderr_line(&format!(
        "opencpx serving {} at http://{}{}",
        document.display(),
        config.server.bind,
        config.server.path
    ))
    .map_err(|err| CliError::new(output_error("stderr", &err)))?;

    let provider = Arc::new(FilePostureProvider::new(document));
    opencpx_http::serve(config, provider)
        .await
        .map_err(|err| CliError::new(format!("server failed: {err}")))?;
    Ok(ExitCode::SUCCESS)
}

/// Decodes a document and prints its summary.
fn command_check(command: &CheckCommand) -> CliResult<ExitCode> {
    let posture = read_document(&command.file).map_err(|err| CliError::new(err.to_string()))?;
    let summary = PostureSummary::new(&posture, Timestamp::now());
    write_stdout_line(&summary.to_string())
        .map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(ExitCode::SUCCESS)
}

/// Prints the aggregation result next to the declared posture.
fn command_aggregate(command: &AggregateCommand) -> CliResult<ExitCode> {
    let posture = read_document(&command.file).map_err(|err| CliError::new(err.to_string()))?;
    let summary = PostureSummary::new(&posture, Timestamp::now());
    let declared = summary.declared.map_or("(derived)", |declared| declared.as_str());
    let lines = [
        format!("aggregated: {}", summary.aggregated),
        format!("declared: {declared}"),
        format!("matches: {}", summary.declared_matches()),
    ];
    for line in &lines {
        write_stdout_line(line).map_err(|err| CliError::new(output_error("stdout", &err)))?;
    }
    if command.strict && !summary.declared_matches() {
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}

/// Re-encodes a document to stdout.
fn command_convert(command: &ConvertCommand) -> CliResult<ExitCode> {
    let posture = read_document(&command.file).map_err(|err| CliError::new(err.to_string()))?;
    let mut encoded = render(&posture, command.format.into(), !command.compact)
        .map_err(|err| CliError::new(format!("failed to encode document: {err}")))?;
    if encoded.bytes.last() != Some(&b'\n') {
        encoded.bytes.push(b'\n');
    }
    write_stdout_bytes(&encoded.bytes)
        .map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Output
// ============================================================================

/// Writes a line to stdout.
fn write_stdout_line(message: &str) -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    writeln!(&mut stdout, "{message}")
}

/// Writes raw bytes to stdout without adding a newline.
fn write_stdout_bytes(bytes: &[u8]) -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    stdout.write_all(bytes)
}

/// Writes a line to stderr.
fn write_stderr_line(message: &str) -> std::io::Result<()> {
    let mut stderr = std::io::stderr();
    writeln!(&mut stderr, "{message}")
}

/// Formats an output stream failure.
fn output_error(stream: &str, error: &std::io::Error) -> String {
    format!("failed to write to {stream}: {error}")
}

/// Emits an error message to stderr and returns a failure exit code.
fn emit_error(message: &str) -> ExitCode {
    let _ = write_stderr_line(message);
    ExitCode::FAILURE
}
