use crate::cli::{Cli, Commands};
use anyhow::Context;
use log::info;
use rusqlite::Connection;
use saferoute_core::api::{self, ApiError, ApiResponse, SubmitReportRequest};
use saferoute_core::db::open_db;
use saferoute_core::{import_shelters, init_logging, CoreConfig, Shelter};
use serde::Serialize;
use std::path::Path;

const BUNDLED_SHELTERS: &str = include_str!("../data/shelters.json");

/// Runs one command and returns the process exit code.
pub fn run(cli: Cli) -> anyhow::Result<u8> {
    let config = resolve_config(&cli)?;
    if let Some(log_dir) = &config.log_dir {
        let log_dir = log_dir
            .to_str()
            .context("log directory must be valid UTF-8")?;
        init_logging(&config.log_level, log_dir)?;
    }

    match cli.command {
        Commands::Health => {
            print_json(&api::health())?;
            Ok(0)
        }
        Commands::Submit {
            lat,
            lng,
            category,
            description,
        } => {
            let conn = open_store(&config)?;
            let request = SubmitReportRequest {
                latitude: lat,
                longitude: lng,
                category,
                description,
            };
            respond(api::submit_report(&conn, request))
        }
        Commands::Reports { limit } => {
            let conn = open_store(&config)?;
            respond(api::list_reports(
                &conn,
                Some(limit.unwrap_or(config.report_list_limit)),
            ))
        }
        Commands::Shelters { near_lat, near_lng } => {
            let conn = open_store(&config)?;
            respond(api::list_shelters(&conn, near_lat.zip(near_lng)))
        }
        Commands::ImportShelters { path } => {
            let shelters = read_shelters(&path)?;
            import_into_store(&config, &shelters, "shelters_import")
        }
        Commands::SeedShelters => {
            let shelters: Vec<Shelter> = serde_json::from_str(BUNDLED_SHELTERS)
                .context("bundled shelter list is malformed")?;
            import_into_store(&config, &shelters, "shelters_seed")
        }
    }
}

fn open_store(config: &CoreConfig) -> anyhow::Result<Connection> {
    open_db(&config.db_path)
        .with_context(|| format!("failed to open database `{}`", config.db_path.display()))
}

fn import_into_store(
    config: &CoreConfig,
    shelters: &[Shelter],
    event: &str,
) -> anyhow::Result<u8> {
    let mut conn = open_store(config)?;
    let written = import_shelters(&mut conn, shelters)?;
    info!("event={event} module=cli status=ok count={written}");
    print_json(&serde_json::json!({ "imported": written }))?;
    Ok(0)
}

fn resolve_config(cli: &Cli) -> anyhow::Result<CoreConfig> {
    let mut config = CoreConfig::from_env()?;
    if let Some(db) = &cli.db {
        config.db_path = db.clone();
    }
    if let Some(level) = &cli.log_level {
        config.log_level = level.clone();
    }
    if let Some(log_dir) = &cli.log_dir {
        config.log_dir = Some(log_dir.clone());
    }
    Ok(config)
}

fn read_shelters(path: &Path) -> anyhow::Result<Vec<Shelter>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read `{}`", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("`{}` is not a shelter list", path.display()))
}

fn respond<T: Serialize>(result: Result<ApiResponse<T>, ApiError>) -> anyhow::Result<u8> {
    match result {
        Ok(response) => {
            print_json(&response.body)?;
            Ok(0)
        }
        Err(err) => {
            print_json(&err)?;
            Ok(1)
        }
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
