//! Application lifecycle: tracing init and dispatch to the interactive form
//! or to a one-shot subcommand.

use std::fs::File;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Mutex;

use tracing::info;

use crate::config::{Command, Config, ConfigFile};
use crate::form::FormController;
use crate::net::LookupClient;
use crate::notify::ConsoleSink;
use crate::{render, tui, validate, DEFAULT_CONFIG};

/// Run the selected command after config has been parsed.
pub async fn run(config: Config) -> anyhow::Result<ExitCode> {
    let command = config.command.clone().unwrap_or(Command::Form);
    init_tracing(&config, command == Command::Form)?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        command = ?command,
        lookup_url = %config.lookup_url,
        "ipform starting"
    );

    let mut out = io::stdout();
    match command {
        Command::Form => {
            let client = LookupClient::new(&config)?;
            tui::run(&config, client).await?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Validate { address } => run_validate(&address, &mut out),
        Command::Whoami => {
            let client = LookupClient::new(&config)?;
            run_whoami(&client, &mut out).await
        }
        Command::Lookup { address, json } => {
            let client = LookupClient::new(&config)?;
            run_lookup(&client, address, json, &mut out).await
        }
        Command::InitConfig { path } => {
            let path = path.unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG));
            ConfigFile::from_config(&config).save(&path)?;
            writeln!(out, "wrote {}", path.display())?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn run_validate(address: &str, out: &mut dyn Write) -> anyhow::Result<ExitCode> {
    match validate::check(address) {
        Ok(()) => {
            writeln!(out, "valid")?;
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            writeln!(out, "invalid")?;
            eprintln!("{}", e);
            Ok(ExitCode::FAILURE)
        }
    }
}

async fn run_whoami(client: &LookupClient, out: &mut dyn Write) -> anyhow::Result<ExitCode> {
    let mut form = FormController::new();
    let mut sink = ConsoleSink;
    form.resolve_self(client, &mut sink).await;

    // the form starts empty, so an empty address means the fetch failed
    if form.address().is_empty() {
        return Ok(ExitCode::FAILURE);
    }
    writeln!(out, "{}", form.address())?;
    if let Some(message) = form.inline_error() {
        eprintln!("{}", message);
    }
    Ok(ExitCode::SUCCESS)
}

async fn run_lookup(
    client: &LookupClient,
    address: Option<String>,
    json: bool,
    out: &mut dyn Write,
) -> anyhow::Result<ExitCode> {
    let mut form = FormController::new();
    let mut sink = ConsoleSink;

    match address {
        Some(address) => {
            form.edit(address);
            form.confirm();
        }
        None => {
            form.resolve_self(client, &mut sink).await;
            if form.address().is_empty() {
                return Ok(ExitCode::FAILURE);
            }
        }
    }
    if let Some(message) = form.inline_error() {
        eprintln!("{}", message);
    }

    let Some(record) = form.lookup_info(client, &mut sink).await else {
        return Ok(ExitCode::FAILURE);
    };

    if json {
        writeln!(out, "{}", serde_json::to_string_pretty(record)?)?;
    } else {
        writeln!(out, "{}", render::describe(record).join("\n\n"))?;
    }
    Ok(ExitCode::SUCCESS)
}

/// Subcommands log to stderr. The interactive form owns the terminal, so it
/// only logs when a log file is configured.
fn init_tracing(config: &Config, interactive: bool) -> anyhow::Result<()> {
    use tracing_subscriber::fmt::writer::BoxMakeWriter;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_new(&config.log_level).unwrap_or_else(|_| EnvFilter::new("warn"));

    let writer = match &config.log_file {
        Some(path) => {
            let file = File::options().create(true).append(true).open(path)?;
            BoxMakeWriter::new(Mutex::new(file))
        }
        None if interactive => return Ok(()),
        None => BoxMakeWriter::new(io::stderr),
    };
    let ansi = config.log_file.is_none();

    if config.log_json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json().with_writer(writer))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_ansi(ansi)
                    .with_writer(writer),
            )
            .init();
    }
    Ok(())
}
