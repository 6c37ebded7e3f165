pub mod app;
pub mod config;
pub mod error;
pub mod gate;
pub mod identity;
pub mod lookup;
pub mod routes;
pub mod state;
pub mod telemetry;
