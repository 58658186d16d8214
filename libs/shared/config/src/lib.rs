use std::env;
use std::path::PathBuf;

use tracing::warn;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub data_dir: PathBuf,
    pub bind_address: String,
    pub port: u16,
    /// Daily booking window, whole hours. Slot generation runs inside this.
    pub office_open_hour: u32,
    pub office_close_hour: u32,
    /// How often the notification sweep wakes up, in seconds.
    pub notification_sweep_secs: u64,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let config = Self {
            data_dir: env::var("DENTAL_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| {
                    warn!("DENTAL_DATA_DIR not set, using ./data");
                    PathBuf::from("data")
                }),
            bind_address: env::var("DENTAL_BIND_ADDRESS")
                .unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("DENTAL_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            office_open_hour: env::var("DENTAL_OFFICE_OPEN_HOUR")
                .ok()
                .and_then(|h| h.parse().ok())
                .unwrap_or(9),
            office_close_hour: env::var("DENTAL_OFFICE_CLOSE_HOUR")
                .ok()
                .and_then(|h| h.parse().ok())
                .unwrap_or(17),
            notification_sweep_secs: env::var("DENTAL_NOTIFICATION_SWEEP_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(60),
        };

        if config.office_open_hour >= config.office_close_hour {
            warn!(
                "Office window {}..{} is empty, slot generation will return nothing",
                config.office_open_hour, config.office_close_hour
            );
        }

        config
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            bind_address: "0.0.0.0".to_string(),
            port: 3000,
            office_open_hour: 9,
            office_close_hour: 17,
            notification_sweep_secs: 60,
        }
    }
}
