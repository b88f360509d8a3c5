//! Build a route from waypoints and print the simulated activity.
//!
//! Usage:
//!   cargo run -p routeforge-cli --bin routeforge-sim -- \
//!     -w 48.8584,2.2945 -w 48.8606,2.3376 --activity run --pace 5:30

use anyhow::{anyhow, Result};
use chrono::Local;
use clap::Parser;
use routeforge_cli::{parse_waypoint, plan_route, render_buckets, render_summary};
use routeforge_core::{
    activity_title, ActivityProfile, DistanceUnit, NoElevation, Position, ProfileUpdate,
    StraightLineResolver,
};
use routeforge_oracles::{
    ElevationCache, NominatimClient, OpenElevationClient, OsrmResolver, DEFAULT_ELEVATION_URL,
    DEFAULT_GEOCODING_URL, DEFAULT_ROUTING_URL,
};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Simulate a run or ride over a route built from waypoints
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Waypoint as lat,lon (repeat for each waypoint, at least two)
    #[arg(short, long = "waypoint", value_parser = parse_waypoint, required = true)]
    waypoints: Vec<Position>,

    /// Activity type: run or bike
    #[arg(long, default_value = "run")]
    activity: String,

    /// Target pace for runs (m:ss per km)
    #[arg(long)]
    pace: Option<String>,

    /// Target speed for rides (km/h)
    #[arg(long)]
    speed: Option<String>,

    /// Pace variation intensity in percent
    #[arg(long)]
    variation: Option<String>,

    /// Average heart rate; enables heart rate simulation
    #[arg(long)]
    heart_rate: Option<String>,

    /// Heart rate variability in bpm
    #[arg(long)]
    hr_variability: Option<String>,

    /// Seed for the simulation noise
    #[arg(long)]
    seed: Option<u64>,

    /// Skip the oracles and connect waypoints with straight lines
    #[arg(long, default_value_t = false)]
    straight: bool,

    /// Report in miles instead of kilometers
    #[arg(long, default_value_t = false)]
    miles: bool,

    /// Print the full plan as JSON
    #[arg(long, default_value_t = false)]
    json: bool,

    /// OSRM base URL
    #[arg(long, env = "ROUTEFORGE_ROUTING_URL", default_value = DEFAULT_ROUTING_URL)]
    routing_url: String,

    /// OSRM routing profile
    #[arg(long, env = "ROUTEFORGE_ROUTING_PROFILE", default_value = "foot")]
    routing_profile: String,

    /// Open-Elevation base URL
    #[arg(long, env = "ROUTEFORGE_ELEVATION_URL", default_value = DEFAULT_ELEVATION_URL)]
    elevation_url: String,

    /// Nominatim base URL, used to name the activity
    #[arg(long, env = "ROUTEFORGE_GEOCODING_URL", default_value = DEFAULT_GEOCODING_URL)]
    geocoding_url: String,

    /// Per-request timeout in seconds
    #[arg(long, env = "ROUTEFORGE_REQUEST_TIMEOUT_S", default_value_t = 10)]
    timeout: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(tracing_subscriber::EnvFilter::from_default_env()
            .add_directive("routeforge_cli=info".parse()?))
        .init();

    let args = Args::parse();
    if args.waypoints.len() < 2 {
        return Err(anyhow!("at least two waypoints are required"));
    }
    let profile = build_profile(&args)?;
    let timeout = Duration::from_secs(args.timeout);

    let plan = if args.straight {
        plan_route(&StraightLineResolver, &NoElevation, args.waypoints.clone(), &profile, args.seed)
            .await?
    } else {
        let resolver = OsrmResolver::new(&args.routing_url, &args.routing_profile, timeout);
        let elevation = OpenElevationClient::new(
            &args.elevation_url,
            timeout,
            Arc::new(ElevationCache::default()),
        );
        tracing::info!(
            waypoints = args.waypoints.len(),
            routing = %args.routing_url,
            "Resolving route"
        );
        plan_route(&resolver, &elevation, args.waypoints.clone(), &profile, args.seed).await?
    };

    let title = if args.straight {
        activity_title(profile.activity, &Local::now(), None)
    } else {
        let geocoder = NominatimClient::new(&args.geocoding_url, timeout);
        let location = match plan.path.first() {
            Some(start) => geocoder.reverse(*start).await.ok(),
            None => None,
        };
        activity_title(profile.activity, &Local::now(), location.as_deref())
    };

    if args.json {
        let output = serde_json::json!({ "title": title, "plan": plan });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    let unit = if args.miles {
        DistanceUnit::Miles
    } else {
        DistanceUnit::Kilometers
    };
    println!("{}", title);
    println!(
        "  {} waypoints, {} path points, {} straight segments",
        plan.waypoints.len(),
        plan.path.len(),
        plan.straight_segments
    );
    println!();
    print!("{}", render_buckets(&plan.buckets, profile.activity, unit));
    println!();
    print!("{}", render_summary(&plan.summary, profile.activity, unit));
    Ok(())
}

fn build_profile(args: &Args) -> Result<ActivityProfile> {
    let update = ProfileUpdate {
        activity: Some(args.activity.clone()),
        pace: args.pace.clone(),
        speed_kmh: args.speed.clone(),
        variation_percent: args.variation.clone(),
        heart_rate_enabled: args.heart_rate.as_ref().map(|_| true),
        avg_heart_rate: args.heart_rate.clone(),
        heart_rate_variability: args.hr_variability.clone(),
    };
    let mut profile = ActivityProfile::default();
    profile.apply(&update)?;
    Ok(profile)
}
