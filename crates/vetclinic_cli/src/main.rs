//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `vetclinic_core` linkage and
//!   database bootstrap.
//! - Keep output deterministic for quick local sanity checks.
//!
//! Usage: `vetclinic_cli [DB_PATH]`. Without a path an in-memory database
//! is used.

use log::error;
use std::process::ExitCode;
use vetclinic_core::{
    init_logging, DbPool, LogConfig, PoolConfig, Repository, SqliteMedicalRecordRepository,
    SqliteOwnerRepository, SqlitePetRepository,
};

fn main() -> ExitCode {
    if let Err(err) = init_logging(&LogConfig::stderr("warn")) {
        eprintln!("logging disabled: {err}");
    }

    let config = match std::env::args().nth(1) {
        Some(path) => PoolConfig::file(path),
        None => PoolConfig::in_memory(),
    };

    match run(config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("event=cli_run module=cli status=error error={err}");
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(config: PoolConfig) -> Result<(), Box<dyn std::error::Error>> {
    let pool = DbPool::open(config)?;
    println!("vetclinic_core version={}", vetclinic_core::core_version());
    println!("owners={}", SqliteOwnerRepository::new(&pool).count()?);
    println!("pets={}", SqlitePetRepository::new(&pool).count()?);
    println!(
        "medical_records={}",
        SqliteMedicalRecordRepository::new(&pool).count()?
    );
    Ok(())
}
