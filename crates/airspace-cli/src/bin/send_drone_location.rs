//! CLI tool to post drone positions to the telemetry relay.
//!
//! Sends a single fix, or follows a simulated path at a fixed rate.

use airspace_cli::sim::{CircularPath, Climb, FixedPoint, FlightPath, LinearPath};
use airspace_client::TelemetryClient;
use airspace_core::LatLng;
use clap::{Parser, Subcommand};
use std::time::Duration;
use tokio::time;

/// Post drone positions to the drone self-report endpoint
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Telemetry relay URL
    #[arg(long, default_value = "http://localhost:4000")]
    url: String,

    /// Request timeout in milliseconds
    #[arg(long, default_value_t = 2500)]
    timeout_ms: u64,

    #[command(subcommand)]
    mode: Mode,
}

#[derive(Subcommand, Debug)]
enum Mode {
    /// Send one position and exit
    Fix {
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,
        #[arg(long, allow_hyphen_values = true)]
        lon: f64,
        /// Meters
        #[arg(long, default_value_t = 120.0)]
        altitude: f64,
    },
    /// Hover at one position, optionally climbing or descending
    Hover {
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,
        #[arg(long, allow_hyphen_values = true)]
        lon: f64,
        #[command(flatten)]
        flight: FlightArgs,
    },
    /// Fly a circle around a center point
    Circle {
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,
        #[arg(long, allow_hyphen_values = true)]
        lon: f64,
        /// Circle radius in meters
        #[arg(long, default_value_t = 300.0)]
        radius: f64,
        #[arg(long)]
        clockwise: bool,
        #[command(flatten)]
        flight: FlightArgs,
    },
    /// Fly a straight line between two points
    Line {
        #[arg(long, allow_hyphen_values = true)]
        from_lat: f64,
        #[arg(long, allow_hyphen_values = true)]
        from_lon: f64,
        #[arg(long, allow_hyphen_values = true)]
        to_lat: f64,
        #[arg(long, allow_hyphen_values = true)]
        to_lon: f64,
        #[command(flatten)]
        flight: FlightArgs,
    },
}

#[derive(clap::Args, Debug)]
struct FlightArgs {
    /// Starting altitude in meters
    #[arg(long, default_value_t = 120.0)]
    altitude: f64,

    /// Vertical rate in m/s (negative descends)
    #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
    climb_rate: f64,

    /// Ground speed in m/s
    #[arg(long, default_value_t = 15.0)]
    speed: f64,

    /// Duration in seconds
    #[arg(long, default_value_t = 60)]
    duration: u64,

    /// Update rate in Hz
    #[arg(long, default_value_t = 1.0)]
    rate: f64,
}

impl FlightArgs {
    fn climb(&self) -> Climb {
        Climb {
            base_m: self.altitude,
            rate_mps: self.climb_rate,
        }
    }
}

async fn fly(client: &TelemetryClient, path: &dyn FlightPath, flight: &FlightArgs) -> anyhow::Result<()> {
    anyhow::ensure!(flight.rate > 0.0, "--rate must be positive");

    let limit = match path.duration() {
        Some(path_s) => path_s.min(flight.duration as f64),
        None => flight.duration as f64,
    };
    println!("  Duration: {:.0}s, Update rate: {}Hz", limit, flight.rate);
    println!();

    let start = time::Instant::now();
    let mut sent = 0u32;
    let mut interval = time::interval(Duration::from_secs_f64(1.0 / flight.rate));

    loop {
        interval.tick().await;

        let elapsed = start.elapsed().as_secs_f64();
        if elapsed > limit {
            break;
        }

        let (lat, lon, alt) = path.position(elapsed);
        match client.send_drone_location(lat, lon, alt).await {
            Ok(()) => {
                sent += 1;
                println!(
                    "[{:3}] Sent position ({:.6}, {:.6}) at {:.0} m -> OK",
                    sent, lat, lon, alt
                );
            }
            Err(e) => {
                eprintln!("Error sending drone location: {}", e);
            }
        }
    }

    println!("\nSimulation complete. Sent {} position updates.", sent);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    println!("Connecting to telemetry relay at {}...", args.url);
    let client = TelemetryClient::new(&args.url, Duration::from_millis(args.timeout_ms))?;

    match args.mode {
        Mode::Fix { lat, lon, altitude } => {
            client.send_drone_location(lat, lon, altitude).await?;
            println!("Sent position ({:.6}, {:.6}) at {:.0} m", lat, lon, altitude);
        }
        Mode::Hover { lat, lon, flight } => {
            let path = FixedPoint {
                position: LatLng::new(lat, lon),
                climb: flight.climb(),
            };
            println!("Hovering at ({}, {}), climb rate {} m/s", lat, lon, flight.climb_rate);
            fly(&client, &path, &flight).await?;
        }
        Mode::Circle {
            lat,
            lon,
            radius,
            clockwise,
            flight,
        } => {
            let path = CircularPath::new(
                LatLng::new(lat, lon),
                radius,
                flight.speed,
                flight.climb(),
                clockwise,
            );
            println!("Starting circular flight simulation");
            println!("  Center: ({}, {})", lat, lon);
            println!("  Radius: {}m, Altitude: {}m", radius, flight.altitude);
            fly(&client, &path, &flight).await?;
        }
        Mode::Line {
            from_lat,
            from_lon,
            to_lat,
            to_lon,
            flight,
        } => {
            let path = LinearPath::new(
                LatLng::new(from_lat, from_lon),
                LatLng::new(to_lat, to_lon),
                flight.speed,
                flight.climb(),
            );
            println!("Starting linear flight simulation");
            println!(
                "  From ({}, {}) to ({}, {}), {:.0}m",
                from_lat, from_lon, to_lat, to_lon, path.distance_m
            );
            fly(&client, &path, &flight).await?;
        }
    }

    Ok(())
}
