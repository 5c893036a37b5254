//! Lookup commands: airport search, weather and airport weather
//!
//! All three go through the cache-aside read path; results are printed as a
//! compact table or as JSON.

use super::shared::{Services, build_services, print_json};
use crate::app::models::{Airport, AirportQuery, AirportWeather, Weather};
use crate::app::services::weather_service::WeatherService;
use crate::cli::args::{CommonArgs, OutputFormat, SearchArgs, WeatherArgs};
use crate::config::Config;
use crate::{Error, Result};
use colored::*;
use futures::{StreamExt, stream};
use serde::Serialize;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::warn;

/// Search command runner
pub async fn run_search(
    args: SearchArgs,
    common: &CommonArgs,
    config: Config,
    cancel: CancellationToken,
) -> Result<()> {
    let Services { airports, .. } = build_services(&config).await?;
    let query = query_from_args(&args);

    let results = airports.search_airport(&query, &cancel).await?;

    match common.output_format {
        OutputFormat::Json => print_json(&results),
        OutputFormat::Human => {
            print_airports(&results);
            Ok(())
        }
    }
}

/// Airport weather command runner
pub async fn run_airport_weather(
    args: SearchArgs,
    common: &CommonArgs,
    config: Config,
    cancel: CancellationToken,
) -> Result<()> {
    let Services {
        airport_weather, ..
    } = build_services(&config).await?;
    let query = query_from_args(&args);

    let results = airport_weather
        .search_airport_weather(&query, &cancel)
        .await?;

    match common.output_format {
        OutputFormat::Json => print_json(&results),
        OutputFormat::Human => {
            print_airport_weather(&results);
            Ok(())
        }
    }
}

/// One city's lookup result for the weather command
#[derive(Debug, Serialize)]
pub struct CityWeather {
    pub city: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weather: Option<Weather>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Weather command runner
///
/// Fails only when no city could be resolved.
pub async fn run_weather(
    args: WeatherArgs,
    common: &CommonArgs,
    config: Config,
    cancel: CancellationToken,
) -> Result<()> {
    let Services { weather, .. } = build_services(&config).await?;
    let results = lookup_cities(weather, args.cities, config.join.max_workers, &cancel).await;

    match common.output_format {
        OutputFormat::Json => print_json(&results)?,
        OutputFormat::Human => print_city_weather(&results),
    }

    if !results.is_empty() && results.iter().all(|r| r.weather.is_none()) {
        return Err(Error::external_source(
            "Weather lookup failed for every requested city",
        ));
    }
    Ok(())
}

/// Resolve several cities concurrently, preserving the requested order
pub async fn lookup_cities(
    weather: Arc<WeatherService>,
    cities: Vec<String>,
    concurrency: usize,
    cancel: &CancellationToken,
) -> Vec<CityWeather> {
    let mut results: Vec<(usize, CityWeather)> = stream::iter(cities.into_iter().enumerate())
        .map(|(index, city)| {
            let weather = weather.clone();
            async move {
                let result = match weather.get_weather(&city, cancel).await {
                    Ok(report) => CityWeather {
                        city,
                        weather: Some(report.current),
                        error: None,
                    },
                    Err(e) => {
                        warn!("Weather lookup for {} failed: {}", city, e);
                        CityWeather {
                            city,
                            weather: None,
                            error: Some(e.to_string()),
                        }
                    }
                };
                (index, result)
            }
        })
        .buffer_unordered(concurrency.max(1))
        .collect()
        .await;

    results.sort_by_key(|(index, _)| *index);
    results.into_iter().map(|(_, result)| result).collect()
}

fn query_from_args(args: &SearchArgs) -> AirportQuery {
    AirportQuery::paged(
        args.icao.clone().unwrap_or_default(),
        args.name.clone().unwrap_or_default(),
        args.page.page,
        args.page.page_size,
    )
}

pub(crate) fn print_airports(airports: &[Airport]) {
    if airports.is_empty() {
        println!("{}", "No airports found".yellow());
        return;
    }

    println!(
        "{:<6} {:<40} {:<24} {:<20} {}",
        "ICAO".bold(),
        "Facility".bold(),
        "City".bold(),
        "State".bold(),
        "Status".bold()
    );
    for airport in airports {
        println!(
            "{:<6} {:<40} {:<24} {:<20} {}",
            airport.icao,
            airport.facility_name.as_deref().unwrap_or("-"),
            airport.city.as_deref().unwrap_or("-"),
            airport.state.as_deref().unwrap_or("-"),
            airport.status
        );
    }
    println!("\n{} airport(s)", airports.len());
}

fn print_airport_weather(results: &[AirportWeather]) {
    if results.is_empty() {
        println!("{}", "No airports found".yellow());
        return;
    }

    for result in results {
        let airport = &result.airport;
        println!(
            "{} {}",
            airport.icao.bold(),
            airport.facility_name.as_deref().unwrap_or("-")
        );
        match &result.weather {
            Some(weather) => println!("   {}", format_weather(airport.city.as_deref().unwrap_or("-"), weather)),
            None => println!("   {}", "No weather available".dimmed()),
        }
    }
}

fn print_city_weather(results: &[CityWeather]) {
    for result in results {
        match (&result.weather, &result.error) {
            (Some(weather), _) => println!("{}", format_weather(&result.city, weather)),
            (None, Some(error)) => println!("{}: {}", result.city.bold(), error.red()),
            (None, None) => println!("{}: {}", result.city.bold(), "no data".dimmed()),
        }
    }
}

fn format_weather(city: &str, weather: &Weather) -> String {
    format!(
        "{}: {:.1}°C, {}, wind {:.0} kph {}, humidity {}% (updated {})",
        city.bold(),
        weather.temp_c,
        weather.condition.text,
        weather.wind_kph,
        weather.wind_dir,
        weather.humidity,
        weather.last_updated
    )
}
