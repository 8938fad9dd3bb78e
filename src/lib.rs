pub mod app;
pub mod config;
pub mod errors;
pub mod garmin;
pub mod handlers;
pub mod hrv;
pub mod models;
pub mod session;
pub mod sleep;
pub mod state;
pub mod vendor;

pub use app::router;
pub use config::Config;
pub use state::AppState;
