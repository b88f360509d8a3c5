//! routeforge CLI - build and simulate a route without the server.
//!
//! The `routeforge-sim` binary resolves a list of waypoints through OSRM (or
//! straight lines), looks up elevation and prints the per-kilometer table.

pub mod plan;
pub mod report;

pub use plan::{parse_waypoint, plan_route, RoutePlan};
pub use report::{render_buckets, render_summary};
