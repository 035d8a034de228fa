pub mod advisor;
pub mod app;
pub mod calendar;
pub mod clock;
pub mod config;
pub mod cues;
pub mod errors;
pub mod faq;
pub mod handlers;
pub mod log_view;
pub mod logs;
pub mod milestone;
pub mod models;
pub mod state;
pub mod stats;
pub mod storage;
pub mod study;
pub mod ticker;
pub mod timer;
pub mod ui;

pub use app::router;
pub use config::AppConfig;
pub use state::AppState;
pub use storage::{LocalStore, resolve_data_path};
