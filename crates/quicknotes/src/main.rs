//! `quicknotesd` - server and admin CLI for quicknotes
//!
//! `quicknotesd serve` runs the HTTP API; the remaining commands work on the
//! note store directly.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use std::path::PathBuf;

use anyhow::Context;
use chrono::Local;
use clap::Parser;
use tokio::net::TcpListener;

use quicknotes::cli::{Cli, Command, ConfigCommand, ServeCommand};
use quicknotes::{http, init_logging, Config, NoteService, Storage};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbosity());

    let config_path = cli.config.clone();
    match cli.command {
        Command::Serve(serve_cmd) => handle_serve(config_path, &serve_cmd),
        Command::List(list_cmd) => handle_list(&open_service(config_path)?, list_cmd.json),
        Command::Add(add_cmd) => {
            let id = open_service(config_path)?.create(&add_cmd.text)?;
            println!("{id}");
            Ok(())
        }
        Command::Delete(delete_cmd) => {
            open_service(config_path)?.delete(delete_cmd.id)?;
            println!("Deleted note {}", delete_cmd.id);
            Ok(())
        }
        Command::Config(config_cmd) => handle_config(config_path, config_cmd),
    }
}

fn open_service(config_path: Option<PathBuf>) -> anyhow::Result<NoteService> {
    let config = Config::load_from(config_path)?;
    let storage = Storage::open(config.database_path())?;
    Ok(NoteService::new(storage))
}

fn handle_serve(config_path: Option<PathBuf>, cmd: &ServeCommand) -> anyhow::Result<()> {
    let mut config = Config::load_from(config_path)?;
    cmd.apply(&mut config);
    config.validate()?;

    let storage = Storage::open(config.database_path())?;
    let app = http::router(NoteService::new(storage), &config.server)?;
    let addr = config.bind_address()?;

    let runtime = tokio::runtime::Runtime::new().context("failed to start async runtime")?;
    runtime.block_on(async move {
        let listener = TcpListener::bind(addr)
            .await
            .with_context(|| format!("failed to bind {addr}"))?;
        http::serve(listener, app).await?;
        Ok::<_, anyhow::Error>(())
    })
}

fn handle_list(service: &NoteService, json: bool) -> anyhow::Result<()> {
    let notes = service.list()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&notes)?);
        return Ok(());
    }

    if notes.is_empty() {
        println!("No notes.");
        return Ok(());
    }

    for note in &notes {
        println!(
            "{:>6}  {}  {}",
            note.id,
            note.created_utc
                .with_timezone(&Local)
                .format("%Y-%m-%d %H:%M:%S"),
            note.text
        );
    }
    Ok(())
}

fn handle_config(config_path: Option<PathBuf>, cmd: ConfigCommand) -> anyhow::Result<()> {
    match cmd {
        ConfigCommand::Show { json } => {
            let config = Config::load_from(config_path)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&config)?);
            } else {
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[Server]");
                println!("  Bind address:       {}:{}", config.server.host, config.server.port);
                println!(
                    "  Allowed origins:    {}",
                    config.server.allowed_origins.join(", ")
                );
                match &config.server.frontend_dir {
                    Some(dir) => println!("  Frontend dir:       {}", dir.display()),
                    None => println!("  Frontend dir:       (not served)"),
                }
                println!();
                println!("[Storage]");
                println!("  Database path:      {}", config.database_path().display());
            }
        }
        ConfigCommand::Path => {
            let path = config_path.unwrap_or_else(Config::default_config_path);
            println!("{}", path.display());
        }
        ConfigCommand::Validate { file } => {
            let path = file
                .or(config_path)
                .unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", path.display());
            match Config::load_from(Some(path)) {
                Ok(_) => println!("Configuration is valid."),
                Err(e) => anyhow::bail!("Configuration error: {e}"),
            }
        }
    }
    Ok(())
}
