mod artifact;
mod commands;
mod context;
mod session;

use anyhow::{Context, Result};
use clap::error::{ContextKind, ContextValue, ErrorKind};
use clap::{ArgAction, Args, CommandFactory, Parser, Subcommand};
use std::io::IsTerminal;
use std::process::ExitCode;
use tracing_subscriber::{EnvFilter, fmt};
use vcn_registry_client::RegistryError;

use crate::commands::{TerminalConfirm, WriteOptions, WriteVerb};
use crate::context::AppContext;

#[derive(Parser)]
#[command(name = "vcn")]
#[command(version, about = "code signing in 1 simple step", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Verify digital artifacts against the registry
    #[command(visible_alias = "v")]
    Verify(VerifyArgs),

    /// Sign a digital artifact's hash as trusted
    #[command(visible_alias = "s")]
    Sign(WriteArgs),

    /// Untrust a digital artifact
    #[command(visible_alias = "ut")]
    Untrust(WriteArgs),

    /// Unsupport a digital artifact
    Unsupport(WriteArgs),

    /// List your signed artifacts
    #[command(visible_alias = "l")]
    List,

    /// Sign in by storing a session token
    Login(LoginArgs),

    /// Open the dashboard in a browser
    #[command(visible_alias = "d")]
    Dashboard,
}

#[derive(Args)]
struct VerifyArgs {
    /// Files to verify (or content hashes with --hash)
    #[arg(value_name = "ASSET")]
    assets: Vec<String>,

    /// Treat the arguments as content hashes instead of files
    #[arg(long)]
    hash: bool,
}

#[derive(Args)]
struct WriteArgs {
    /// File path or type:reference of the artifact
    #[arg(value_name = "ARTIFACT")]
    artifact: Option<String>,

    /// Make the attestation publicly visible
    #[arg(short, long)]
    public: bool,

    /// Proceed without waiting for confirmation
    #[arg(
        short,
        long,
        default_value_t = true,
        action = ArgAction::Set,
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "true",
        value_name = "BOOL"
    )]
    quit: bool,

    /// Acknowledge the submission up front
    #[arg(short = 'y', long)]
    yes: bool,
}

impl WriteArgs {
    fn options(&self) -> WriteOptions {
        WriteOptions {
            public: self.public,
            quit: self.quit,
            acknowledge: self.yes,
        }
    }
}

#[derive(Args)]
struct LoginArgs {
    /// Session token (read from stdin when omitted)
    #[arg(long, value_name = "TOKEN")]
    token: Option<String>,
}

fn main() -> ExitCode {
    let _ = dotenvy::dotenv();
    init_tracing();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) if err.kind() == ErrorKind::InvalidSubcommand => {
            return command_not_found(&err);
        }
        Err(err) => err.exit(),
    };

    match run(cli) {
        Ok(code) => code,
        Err(err) => exit_policy(&err),
    }
}

fn run(cli: Cli) -> Result<ExitCode> {
    let ctx = AppContext::from_env()?;
    tracing::trace!(
        version = env!("CARGO_PKG_VERSION"),
        stage = ctx.config.stage.name(),
        "vcn"
    );

    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to initialize async runtime")?;

    rt.block_on(async {
        match cli.command {
            Commands::Verify(args) => commands::verify(&ctx, &args.assets, args.hash).await,
            Commands::Sign(args) => write(&ctx, WriteVerb::Sign, &args).await,
            Commands::Untrust(args) => write(&ctx, WriteVerb::Untrust, &args).await,
            Commands::Unsupport(args) => write(&ctx, WriteVerb::Unsupport, &args).await,
            Commands::List => commands::list(&ctx).await,
            Commands::Login(args) => commands::login(&ctx, args.token),
            Commands::Dashboard => commands::dashboard(&ctx),
        }
    })
}

async fn write(ctx: &AppContext, verb: WriteVerb, args: &WriteArgs) -> Result<ExitCode> {
    commands::write(
        &ctx.client,
        verb,
        args.artifact.as_deref(),
        &args.options(),
        &TerminalConfirm,
    )
    .await
}

fn command_not_found(err: &clap::Error) -> ExitCode {
    let name = match err.get(ContextKind::InvalidSubcommand) {
        Some(ContextValue::String(name)) => name.as_str(),
        _ => "",
    };
    println!("No such command: {name}");
    if let Err(e) = Cli::command().print_help() {
        tracing::warn!("failed to print help: {e}");
    }
    ExitCode::SUCCESS
}

/// The one place that turns an error into a process exit.
fn exit_policy(err: &anyhow::Error) -> ExitCode {
    let auth_missing = err
        .chain()
        .filter_map(|e| e.downcast_ref::<RegistryError>())
        .any(RegistryError::is_auth_missing);

    if auth_missing {
        eprintln!("You need to be logged in.");
        eprintln!("Proceed by authenticating yourself using `vcn login`.");
        tracing::debug!("{err:#}");
        return ExitCode::FAILURE;
    }

    tracing::error!("{err:#}");
    eprintln!("error: {err:#}");
    ExitCode::FAILURE
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .compact()
        .init();
}
