#[allow(clippy::module_inception)]
mod server;
pub mod state;

pub use server::{make_app, run_server};
