// Domain layer - Tracking records and fetch state
pub mod fetch_state;
pub mod page;
pub mod query;
pub mod telemetry;
