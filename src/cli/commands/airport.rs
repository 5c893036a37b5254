//! Airport command implementation
//!
//! Direct record management: list, get, import and delete.

use super::search::print_airports;
use super::shared::{Services, build_services, print_json};
use crate::app::models::{Airport, page_window};
use crate::app::services::airport_service::AirportService;
use crate::cli::args::{AirportArgs, AirportCommand, CommonArgs, OutputFormat, PageArgs};
use crate::config::Config;
use crate::{Error, Result};
use colored::*;
use serde::Serialize;
use serde_json::json;
use std::path::Path;
use tracing::{info, warn};

/// Airport command runner
pub async fn run_airport(args: AirportArgs, common: &CommonArgs, config: Config) -> Result<()> {
    let Services { airports, .. } = build_services(&config).await?;

    match args.command {
        AirportCommand::List(page) => list(&airports, &page, common).await,
        AirportCommand::Get { icao } => {
            let airport = airports.get_airport(icao.trim()).await?;
            match common.output_format {
                OutputFormat::Json => print_json(&airport),
                OutputFormat::Human => {
                    print_airport_detail(&airport);
                    Ok(())
                }
            }
        }
        AirportCommand::Import { file } => {
            let report = import_file(&airports, &file).await?;
            match common.output_format {
                OutputFormat::Json => print_json(&report)?,
                OutputFormat::Human => print_import_report(&report),
            }
            if report.imported == 0 && !report.rejected.is_empty() {
                return Err(Error::validation("No airport in the import file was accepted"));
            }
            Ok(())
        }
        AirportCommand::Delete { icao } => {
            let icao = icao.trim();
            airports.delete_airport(icao).await?;
            match common.output_format {
                OutputFormat::Json => print_json(&json!({ "deleted": icao })),
                OutputFormat::Human => {
                    println!("Deleted airport {}", icao.bold());
                    Ok(())
                }
            }
        }
    }
}

async fn list(airports: &AirportService, page: &PageArgs, common: &CommonArgs) -> Result<()> {
    let (limit, offset) = page_window(page.page, page.page_size);
    let records = airports.get_all_airports(limit, offset).await?;

    match common.output_format {
        OutputFormat::Json => print_json(&records),
        OutputFormat::Human => {
            print_airports(&records);
            Ok(())
        }
    }
}

/// Import outcome: how many records were stored and why the others were not
#[derive(Debug, Default, Serialize)]
pub struct ImportReport {
    pub imported: usize,
    pub pending: usize,
    pub rejected: Vec<RejectedAirport>,
}

#[derive(Debug, Serialize)]
pub struct RejectedAirport {
    pub icao: String,
    pub reason: String,
}

/// Validate and insert every airport of a JSON array file
///
/// Each record is created independently; one rejection does not stop the
/// rest of the import.
pub async fn import_file(airports: &AirportService, path: &Path) -> Result<ImportReport> {
    let contents = tokio::fs::read_to_string(path).await.map_err(|e| {
        Error::io(format!("Failed to read import file {}", path.display()), e)
    })?;
    let records: Vec<Airport> = serde_json::from_str(&contents).map_err(|e| {
        Error::validation(format!("Invalid import file {}: {}", path.display(), e))
    })?;

    info!("Importing {} airport(s) from {}", records.len(), path.display());

    let mut report = ImportReport::default();
    for record in records {
        let icao = record.icao.trim().to_string();
        match airports.create_airport(record).await {
            Ok(created) => {
                report.imported += 1;
                if created.status == crate::SyncStatus::Pending {
                    report.pending += 1;
                }
            }
            Err(e) => {
                warn!("Rejected airport '{}': {}", icao, e);
                report.rejected.push(RejectedAirport {
                    icao,
                    reason: e.to_string(),
                });
            }
        }
    }

    Ok(report)
}

fn print_import_report(report: &ImportReport) {
    println!(
        "Imported {} airport(s), {} pending synchronization",
        report.imported.to_string().green(),
        report.pending
    );
    for rejected in &report.rejected {
        let icao = if rejected.icao.is_empty() {
            "<missing icao>"
        } else {
            rejected.icao.as_str()
        };
        println!("   {} {}: {}", "✗".red(), icao, rejected.reason);
    }
}

fn print_airport_detail(airport: &Airport) {
    println!("{} ({})", airport.icao.bold(), airport.status);
    for (name, value) in airport.attributes() {
        println!("   {:<14} {}", name, value.unwrap_or("-"));
    }
}
