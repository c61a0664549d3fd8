pub mod app;
pub mod auth;
pub mod config;
pub mod error;
pub mod profile;
pub mod state;
pub mod users;
