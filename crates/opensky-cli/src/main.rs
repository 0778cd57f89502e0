//! `opensky`: query the OpenSky Network from the command line.

mod output;

use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use opensky_models::{BoundingBox, Icao24};
use opensky_sdk::{Credentials, OpenSky, StatesQuery, credit_cost};
use tracing::info;

/// OpenSky Network command-line client.
#[derive(Parser, Debug)]
#[command(name = "opensky")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Base URL of the REST API.
    #[arg(long, default_value = opensky_sdk::endpoints::DEFAULT_API_URL)]
    api_url: String,

    /// Account name for basic authentication.
    #[arg(long, requires = "password")]
    username: Option<String>,

    /// Account password for basic authentication.
    #[arg(long, requires = "username")]
    password: Option<String>,

    /// The account contributes a receiver (larger credit budget).
    #[arg(long, requires = "username")]
    contributing: bool,

    /// Per-request timeout in seconds.
    #[arg(long, default_value_t = 10)]
    timeout_secs: u64,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch current state vectors.
    States(StatesArgs),
    /// Fetch state vectors seen by your own receivers (needs an account).
    OwnStates {
        /// Snapshot time (seconds since epoch).
        #[arg(long)]
        time: Option<i64>,

        /// Print the raw JSON response.
        #[arg(long)]
        json: bool,
    },
    /// Compute the bounding box around a point, without any request.
    Bbox {
        /// Latitude of the centre, in degrees.
        #[arg(allow_negative_numbers = true)]
        latitude: f64,
        /// Longitude of the centre, in degrees.
        #[arg(allow_negative_numbers = true)]
        longitude: f64,
        /// Half side of the box, in meters.
        radius: f64,
    },
}

#[derive(Args, Debug)]
struct StatesArgs {
    /// Area as LAMIN,LAMAX,LOMIN,LOMAX.
    #[arg(long, value_parser = parse_bbox, allow_hyphen_values = true, conflicts_with = "around")]
    bbox: Option<BoundingBox>,

    /// Area as LAT,LON,RADIUS_M around a point.
    #[arg(long, value_parser = parse_around, allow_hyphen_values = true)]
    around: Option<BoundingBox>,

    /// Restrict to a transponder address (repeatable).
    #[arg(long)]
    icao24: Vec<Icao24>,

    /// Snapshot time (seconds since epoch).
    #[arg(long)]
    time: Option<i64>,

    /// Also fetch the aircraft category.
    #[arg(long)]
    extended: bool,

    /// Print the raw JSON response.
    #[arg(long)]
    json: bool,
}

impl StatesArgs {
    fn query(&self) -> StatesQuery {
        let mut query = StatesQuery::new().extended(self.extended);
        if let Some(time) = self.time {
            query = query.at(time);
        }
        for icao24 in &self.icao24 {
            query = query.icao24(icao24.clone());
        }
        if let Some(bbox) = self.bbox.or(self.around) {
            query = query.bounding_box(bbox);
        }
        query
    }
}

fn parse_numbers<const N: usize>(s: &str) -> Result<[f64; N], String> {
    let values = s
        .split(',')
        .map(|part| part.trim().parse::<f64>().map_err(|e| format!("`{part}`: {e}")))
        .collect::<Result<Vec<_>, _>>()?;
    <[f64; N]>::try_from(values)
        .map_err(|v| format!("expected {N} comma-separated numbers, got {}", v.len()))
}

fn parse_bbox(s: &str) -> Result<BoundingBox, String> {
    let [min_lat, max_lat, min_lon, max_lon] = parse_numbers::<4>(s)?;
    let bbox = BoundingBox::new(min_lat, max_lat, min_lon, max_lon);
    bbox.validate().map_err(|e| e.to_string())?;
    Ok(bbox)
}

fn parse_around(s: &str) -> Result<BoundingBox, String> {
    let [lat, lon, radius] = parse_numbers::<3>(s)?;
    Ok(BoundingBox::around(lat, lon, radius))
}

fn build_client(cli: &Cli) -> Result<OpenSky> {
    let mut builder = OpenSky::builder()
        .api_url(cli.api_url.as_str())
        .request_timeout(Duration::from_secs(cli.timeout_secs))
        .contributing_user(cli.contributing);
    if let (Some(username), Some(password)) = (&cli.username, &cli.password) {
        builder = builder.credentials(Credentials::new(username.as_str(), password.as_str()));
    }
    builder.build().context("invalid client configuration")
}

fn print_states(states: &opensky_models::StatesResponse, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(states)?);
        return Ok(());
    }
    println!("{}", output::summary(states));
    println!("{}", output::HEADER);
    for state in states {
        println!("{}", output::state_line(state));
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Structured logging (controlled via RUST_LOG env var).
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match &cli.command {
        Command::Bbox {
            latitude,
            longitude,
            radius,
        } => {
            let bbox = BoundingBox::around(*latitude, *longitude, *radius);
            println!(
                "lamin={:.4} lamax={:.4} lomin={:.4} lomax={:.4} (cost: {} credits)",
                bbox.min_latitude,
                bbox.max_latitude,
                bbox.min_longitude,
                bbox.max_longitude,
                credit_cost(Some(&bbox)),
            );
        }
        Command::States(args) => {
            let mut client = build_client(&cli)?;
            let sky = client.scoped()?;
            let states = sky
                .get_states(&args.query())
                .await
                .context("fetching states")?;
            print_states(&states, args.json)?;
            info!(remaining = sky.remaining_credits(), "estimated credits left");
        }
        Command::OwnStates { time, json } => {
            if cli.username.is_none() {
                bail!("own-states needs --username and --password");
            }
            let mut client = build_client(&cli)?;
            let sky = client.scoped()?;
            let states = sky
                .get_own_states(*time)
                .await
                .context("fetching own states")?;
            print_states(&states, *json)?;
        }
    }

    Ok(())
}
