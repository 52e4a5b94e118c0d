use chrono::{NaiveDateTime, Utc};
use chrono_tz::Tz;
use clap::{Parser, Subcommand};
use hospital_finder::catalog::Catalog;
use hospital_finder::detail::HospitalDetail;
use hospital_finder::geo::{format_coords, GeoPoint};
use hospital_finder::hours;
use hospital_finder::nearby::{find_nearby, NearbyQuery, DEFAULT_LIMIT, DEFAULT_RADIUS_KM};
use hospital_finder::server::{self, AppState};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Hospital Finder: nearby hospitals and opening hours
///
/// Examples:
///   hospital-finder nearby --lat 35.6762 --lon 139.6503
///   hospital-finder nearby --lat 35.6762 --lon 139.6503 --radius 3 --specialty surgery
///   hospital-finder search clinic
///   hospital-finder show tokyo-general --at "2026-10-18 10:00"
///   hospital-finder --catalog hospitals.json serve --port 8080
#[derive(Parser)]
#[command(name = "hospital-finder", version, about, long_about = None)]
struct Cli {
    /// JSON catalog file. Defaults to ~/.hospital-finder/hospitals.json,
    /// then the built-in sample hospitals.
    #[arg(long, global = true)]
    catalog: Option<PathBuf>,

    /// IANA timezone the hospitals' hours are expressed in.
    #[arg(long, global = true, default_value = "Asia/Tokyo")]
    tz: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Hospitals near a point, nearest first.
    Nearby {
        /// Latitude (-90 to 90).
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,

        /// Longitude (-180 to 180).
        #[arg(long, allow_hyphen_values = true)]
        lon: f64,

        /// Search radius in kilometers.
        #[arg(long, default_value_t = DEFAULT_RADIUS_KM)]
        radius: f64,

        /// Only hospitals offering this specialty (substring, case-insensitive).
        #[arg(long)]
        specialty: Option<String>,

        /// Only hospitals with emergency services.
        #[arg(long)]
        emergency_only: bool,

        #[arg(long, default_value_t = DEFAULT_LIMIT, allow_hyphen_values = true)]
        limit: i64,
    },
    /// Search hospitals by name.
    Search {
        /// Name fragment. Empty lists everything.
        #[arg(index = 1, default_value = "")]
        query: String,

        #[arg(long)]
        specialty: Option<String>,

        #[arg(long, default_value_t = DEFAULT_LIMIT)]
        limit: i64,
    },
    /// Opening status of one hospital.
    Show {
        id: String,

        /// Local time to evaluate ("YYYY-MM-DD HH:MM"). Defaults to now.
        #[arg(long)]
        at: Option<String>,
    },
    /// Run the HTTP API.
    Serve {
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        #[arg(long, default_value_t = 8080)]
        port: u16,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let tz: Tz = cli.tz.parse().unwrap_or_else(|_| {
        eprintln!("Error: Unknown timezone '{}'. Use IANA format (e.g. Asia/Tokyo).", cli.tz);
        std::process::exit(1);
    });

    let catalog = Catalog::load(cli.catalog.as_deref()).unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    });

    match cli.command {
        Command::Nearby { lat, lon, radius, specialty, emergency_only, limit } => {
            let origin = GeoPoint::new(lat, lon);
            if !origin.is_valid() {
                eprintln!("Error: Invalid coordinates. Lat: -90..90, Lon: -180..180");
                std::process::exit(1);
            }
            let now = hours::localize(Utc::now(), tz);
            let mut query = NearbyQuery::new(origin)
                .within_km(radius)
                .emergency_only(emergency_only)
                .limit(limit);
            query.specialty = specialty;

            let results = find_nearby(catalog.hospitals(), &query);

            eprintln!("  {} hospital(s) within {} km of {}", results.len(), radius, format_coords(origin));
            for r in &results {
                let status = if hours::is_open(&r.hospital.schedule, now) { "open" } else { "closed" };
                eprintln!("    {:>6.2} km  {}  [{}]", r.distance_km, r.hospital.name, status);
            }
            print_json(&results);
        }
        Command::Search { query, specialty, limit } => {
            let results = catalog.search(&query, specialty.as_deref(), limit);
            eprintln!("  {} match(es) for '{}'", results.len(), query);
            print_json(&results);
        }
        Command::Show { id, at } => {
            let hospital = catalog.get(&id).unwrap_or_else(|| {
                eprintln!("Error: Hospital '{}' not found", id);
                std::process::exit(1);
            });
            let now = match at {
                Some(s) => NaiveDateTime::parse_from_str(&s, "%Y-%m-%d %H:%M").unwrap_or_else(|e| {
                    eprintln!("Error: Invalid time '{}': {}", s, e);
                    std::process::exit(1);
                }),
                None => hours::localize(Utc::now(), tz),
            };

            let detail = HospitalDetail::at(hospital, now);
            eprintln!("  {}", detail.hospital.name);
            eprintln!("  {}", if detail.is_open_now { "Open now" } else { "Closed now" });
            match &detail.today_hours {
                Some(h) => eprintln!("  Today: {}", h),
                None => eprintln!("  Today: no hours on record"),
            }
            if let Some(next) = &detail.next_open {
                eprintln!("  Opens: {}", next);
            }
            print_json(&detail);
        }
        Command::Serve { host, port } => {
            let runtime = tokio::runtime::Runtime::new().unwrap_or_else(|e| {
                eprintln!("Error: Cannot start runtime: {}", e);
                std::process::exit(1);
            });
            let state = AppState { catalog, tz };
            if let Err(e) = runtime.block_on(server::start(&host, port, state)) {
                eprintln!("Server error: {}", e);
                std::process::exit(1);
            }
        }
    }
}

fn print_json<T: serde::Serialize + ?Sized>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            eprintln!("Error: Cannot encode output: {}", e);
            std::process::exit(1);
        }
    }
}
