use crate::storage::resolve_data_path;
use std::{env, path::PathBuf, time::Duration};

pub const TICK_INTERVAL: Duration = Duration::from_millis(100);
pub const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(5);
pub const AUTOSAVE_INTERVAL: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    pub data_path: PathBuf,
    pub tick_interval: Duration,
    pub heartbeat_interval: Duration,
    pub autosave_interval: Duration,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, std::io::Error> {
        let port = env::var("PORT")
            .ok()
            .and_then(|value| value.parse::<u16>().ok())
            .unwrap_or(8080);

        Ok(Self {
            port,
            data_path: resolve_data_path()?,
            ..Self::with_data_path(PathBuf::new())
        })
    }

    pub fn with_data_path(data_path: PathBuf) -> Self {
        Self {
            port: 8080,
            data_path,
            tick_interval: TICK_INTERVAL,
            heartbeat_interval: HEARTBEAT_INTERVAL,
            autosave_interval: AUTOSAVE_INTERVAL,
        }
    }
}
