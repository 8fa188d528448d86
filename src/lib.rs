pub mod app;
pub mod auth;
pub mod client;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod extract;
pub mod goals;
pub mod local_time;
pub mod meals;
pub mod memory;
pub mod nutrition;
pub mod state;
