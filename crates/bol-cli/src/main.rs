// Copyright 2026 bol-cli Contributors
// SPDX-License-Identifier: MIT

use std::process::ExitCode;
use std::time::Duration;

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;

use bol_cli::bootstrap::{Bootstrap, FAREWELL};
use bol_cli::cli::LineEditor;
use bol_cli::config::{resolve_color, Config, DEFAULT_MAX_TRANSPORT_FAILURES};
use bol_cli::render::{RenderSink, Style, TerminalSink};
use bol_cli::transport::{Backend, BrowserTransport, HttpTransport};

#[derive(Parser)]
#[command(
    name = "bol",
    about = "Binus Online command line interface.",
    version,
    after_help = "Example: bol -u budi@binus.ac.id -p"
)]
struct Cli {
    /// Your BOL email
    #[arg(short = 'u', long = "email", env = "BOL_EMAIL", value_name = "EMAIL")]
    email: Option<String>,

    /// Your password; prompted for without echo when given without a value
    #[arg(short = 'p', long = "password", value_name = "PASSWORD")]
    password: Option<Option<String>>,

    /// How to talk to the portal
    #[arg(long, value_enum, default_value_t = Backend::Http)]
    backend: Backend,

    /// Stop at the first error instead of returning to the menu
    #[arg(long)]
    strict: bool,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = 30, value_name = "SECS")]
    timeout: u64,

    /// Consecutive failed thread fetches before giving up
    #[arg(long, default_value_t = DEFAULT_MAX_TRANSPORT_FAILURES, value_name = "N")]
    max_transport_failures: u32,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    /// Enable verbose/debug logging
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate shell completion scripts
    Completions {
        /// Shell type (bash, zsh, fish, powershell, elvish)
        shell: Shell,
    },
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "bol_cli=debug" } else { "bol_cli=warn" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    if let Some(Commands::Completions { shell }) = cli.command {
        let mut cmd = Cli::command();
        clap_complete::generate(shell, &mut cmd, "bol", &mut std::io::stdout());
        return Ok(ExitCode::SUCCESS);
    }

    init_tracing(cli.verbose);

    let config = Config {
        backend: cli.backend,
        color: resolve_color(cli.no_color),
        strict: cli.strict,
        timeout: Duration::from_secs(cli.timeout.max(1)),
        max_transport_failures: cli.max_transport_failures,
        ..Config::default()
    };
    let mut sink = TerminalSink::stdout(config.color);

    let password = match cli.password {
        Some(Some(p)) => Some(p),
        Some(None) if cli.email.is_some() => match LineEditor::read_password("Password: ")? {
            Some(p) => Some(p),
            None => {
                sink.render(FAREWELL, Style::Normal);
                return Ok(ExitCode::SUCCESS);
            }
        },
        _ => None,
    };

    let mut input = LineEditor::new(config.color)?;
    let interrupt = async {
        let _ = tokio::signal::ctrl_c().await;
    };

    let endpoints = config.endpoints.clone();
    let timeout = config.timeout;
    let bootstrap = Bootstrap::new(&config, &mut input, &mut sink);
    let outcome = match config.backend {
        Backend::Http => {
            bootstrap
                .run(
                    cli.email,
                    password,
                    move || async move { HttpTransport::new(endpoints, timeout) },
                    interrupt,
                )
                .await
        }
        Backend::Browser => {
            bootstrap
                .run(
                    cli.email,
                    password,
                    move || BrowserTransport::launch(endpoints, timeout),
                    interrupt,
                )
                .await
        }
    };

    Ok(ExitCode::from(outcome.exit_code()))
}
