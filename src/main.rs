use tracing_subscriber::EnvFilter;

use skycast::config::LoggingConfig;
use skycast::focus::FocusService;
use skycast::{Coordinate, GeoClient, SkycastConfig, WeatherClient, gazetteer, web};

fn init_tracing(config: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    if config.format == "json" {
        tracing_subscriber::fmt().with_env_filter(filter).json().init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = SkycastConfig::load()?;
    init_tracing(&config.logging);

    let args: Vec<String> = std::env::args().skip(1).collect();
    match args.split_first() {
        None => {
            eprintln!("Usage: skycast <place name | lat,lon>");
            eprintln!("       skycast serve [port]");
            Ok(())
        }
        Some((command, rest)) if command == "serve" => {
            let port = rest
                .first()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080);
            web::run(port).await;
            Ok(())
        }
        Some(_) => {
            let input = args.join(" ");
            lookup(&config, &input).await
        }
    }
}

async fn lookup(config: &SkycastConfig, input: &str) -> anyhow::Result<()> {
    let weather = WeatherClient::new(&config.weather)?;
    let geocode = GeoClient::new(&config.geocoding)?;
    let mut service = FocusService::new(weather, geocode, gazetteer::default_gazetteer());

    match parse_coordinate(input) {
        Some(coordinate) => service.focus_coordinate(coordinate).await?,
        None => service.focus_search(input).await?,
    };
    service.settle_pending_names().await;

    let Some(focus) = service.session().focus() else {
        anyhow::bail!("No focus resolved for '{input}'");
    };

    println!("{}", focus.current.format_place());
    println!(
        "  {} · {} ({})",
        focus.current.format_temperature(),
        focus.current.condition.description,
        focus.coordinate.format()
    );
    println!(
        "  humidity {:.0}% · wind {:.1} km/h · pressure {:.0} hPa · visibility {:.0} km",
        focus.current.humidity,
        focus.current.wind_speed,
        focus.current.pressure,
        focus.current.visibility_km
    );

    if !focus.forecast.is_empty() {
        println!("\nForecast:");
        for day in &focus.forecast {
            println!(
                "  {}  {}  {}",
                day.date,
                day.format_range(),
                day.condition.description
            );
        }
    }

    let focus_coordinate = focus.coordinate;
    let nearby = service.nearby(Some(focus_coordinate)).await;
    if !nearby.is_empty() {
        println!("\nNearby:");
        for candidate in &nearby {
            let temperature = candidate
                .snapshot
                .as_ref()
                .map(|s| s.format_temperature())
                .unwrap_or_default();
            match candidate.distance_km {
                Some(distance) => println!(
                    "  {} ({:.0} km away)  {}",
                    candidate.entry.name, distance, temperature
                ),
                None => println!("  {}  {}", candidate.entry.name, temperature),
            }
        }
    }

    Ok(())
}

/// Classify input as coordinates when it splits into two in-range numbers
///
/// Accepts "14.5995,120.9842" and "14.5995 120.9842"; anything else is
/// treated as a place name.
fn parse_coordinate(input: &str) -> Option<Coordinate> {
    let parts: Vec<&str> = input
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|s| !s.is_empty())
        .collect();

    if parts.len() != 2 {
        return None;
    }

    let latitude: f64 = parts[0].parse().ok()?;
    let longitude: f64 = parts[1].parse().ok()?;

    if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
        return None;
    }

    Some(Coordinate::new(latitude, longitude))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_coordinate_formats() {
        let parsed = parse_coordinate("14.5995,120.9842").unwrap();
        assert!((parsed.latitude - 14.5995).abs() < 1e-9);
        assert!((parsed.longitude - 120.9842).abs() < 1e-9);

        assert!(parse_coordinate("14.5995 120.9842").is_some());
        assert!(parse_coordinate("-14.5, -120.9").is_some());
    }

    #[test]
    fn test_parse_coordinate_rejects_out_of_range() {
        assert!(parse_coordinate("91.0,120.0").is_none());
        assert!(parse_coordinate("14.0,181.0").is_none());
    }

    #[test]
    fn test_parse_coordinate_rejects_place_names() {
        assert!(parse_coordinate("Manila").is_none());
        assert!(parse_coordinate("Quezon City").is_none());
        assert!(parse_coordinate("14.0,120.0,3.0").is_none());
    }
}
