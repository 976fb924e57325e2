pub mod app;
pub mod cli;
pub mod config;
pub mod debts;
pub mod error;
pub mod filter;
pub mod handlers;
pub mod models;
pub mod state;
pub mod store;

pub use app::app;
pub use state::AppState;
