pub mod analysis;
pub mod config;
pub mod server;
pub mod spotify;
