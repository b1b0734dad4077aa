pub mod analytics;
pub mod app;
pub mod auth;
pub mod capture;
pub mod config;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod notify;
pub mod quotes;
pub mod state;
pub mod storage;
pub mod therapists;
pub mod ui;

pub use app::router;
pub use config::Config;
pub use state::AppState;
