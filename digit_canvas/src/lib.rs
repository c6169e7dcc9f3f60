mod error;
mod guard;
mod routes;
mod session;
mod telemetry;

pub mod api_client;
pub mod app;
pub mod config;
pub mod feedback;
pub mod interpreter;
pub mod pixel_grid;
pub mod prediction;
pub mod server;

pub use app::start_app;
