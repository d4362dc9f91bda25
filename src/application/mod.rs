// Application layer - Use cases over the tracking API
pub mod api_probe;
pub mod sync_controller;
pub mod telemetry_repository;
