//! JSON rendering of collected articles and search results.

use crate::utils::ensure_writable_dir;
use chrono::NaiveDate;
use serde::Serialize;
use std::error::Error;
use std::path::PathBuf;
use tokio::fs;
use tracing::{error, info, instrument};

/// Path of the file written for `name` on `date` under `output_dir`.
pub fn output_path(output_dir: &str, date: NaiveDate, name: &str) -> PathBuf {
    PathBuf::from(output_dir)
        .join(date.to_string())
        .join(format!("{name}.json"))
}

/// Write `value` as pretty JSON to `{output_dir}/{date}/{name}.json`.
///
/// The dated directory is created and checked for writability first.
#[instrument(level = "info", skip_all, fields(output_dir = %output_dir, %date, name = %name))]
pub async fn write_json<T: Serialize>(
    value: &T,
    output_dir: &str,
    date: NaiveDate,
    name: &str,
) -> Result<PathBuf, Box<dyn Error>> {
    let json = serde_json::to_string_pretty(value)?;
    let path = output_path(output_dir, date, name);
    let dir = PathBuf::from(output_dir).join(date.to_string());

    if let Err(e) = ensure_writable_dir(&dir).await {
        error!(dir = %dir.display(), error = %e, "Output directory is not usable");
        return Err(e.into());
    }

    fs::write(&path, json).await?;
    info!(path = %path.display(), "Wrote JSON");
    Ok(path)
}

/// Print `value` as pretty JSON on stdout.
pub fn print_json<T: Serialize>(value: &T) -> Result<(), serde_json::Error> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Write under `output_dir` when given, otherwise print.
pub async fn emit<T: Serialize>(
    value: &T,
    output_dir: Option<&str>,
    date: NaiveDate,
    name: &str,
) -> Result<(), Box<dyn Error>> {
    match output_dir {
        Some(dir) => {
            let path = write_json(value, dir, date, name).await?;
            eprintln!("Wrote {}", path.display());
        }
        None => print_json(value)?,
    }
    Ok(())
}
