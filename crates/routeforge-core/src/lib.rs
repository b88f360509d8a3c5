//! Route editing and activity simulation, independent of any transport.

pub mod elevation;
pub mod import;
pub mod models;
pub mod naming;
pub mod oracle;
pub mod profile;
pub mod route_builder;
pub mod rules;
pub mod simulator;
pub mod spatial;
pub mod units;
pub mod waypoints;

pub use elevation::{
    bucket_elevation_deltas, elevation_gain, interpolate_elevation, sample_path,
    DEFAULT_MAX_SAMPLES,
};
pub use import::resample_waypoints;
pub use models::{
    ActivityType, KmBucket, Position, RouteSummary, Segment, Waypoint, WaypointRole,
};
pub use naming::{activity_title, AddressParts};
pub use oracle::{ElevationSource, NoElevation, SegmentResolver, StraightLineResolver};
pub use profile::{ActivityProfile, HeartRateTarget, ProfileError, ProfileUpdate};
pub use route_builder::{stitch, PendingSegment, RouteLayout, SegmentSlot};
pub use rules::{InputLimits, SimulationBounds};
pub use simulator::{simulate, summarize, ActivitySimulator, SimulationInput};
pub use spatial::{haversine_distance, path_distance_km, JUNCTION_TOLERANCE_DEG};
pub use units::DistanceUnit;
pub use waypoints::{StoreError, WaypointStore};
