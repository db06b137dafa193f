pub mod client;
pub mod config;

pub use client::RoutineClient;
pub use config::RoutineConfig;
