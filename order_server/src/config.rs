use std::env;

use chrono::Duration;
use log::*;
use mos_common::parse_boolean_flag;

const DEFAULT_MOS_HOST: &str = "127.0.0.1";
const DEFAULT_MOS_PORT: u16 = 8360;
const DEFAULT_DATABASE_URL: &str = "sqlite://data/mos_store.db";
const DEFAULT_APPROVAL_WINDOW: Duration = Duration::hours(72);
const DEFAULT_SWEEP_INTERVAL: Duration = Duration::seconds(3600);

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    /// How long a buyer has to approve a delivery before the sweeper completes the order.
    pub approval_window: Duration,
    /// How often the in-process sweep worker runs. The `/orders/lifecycle-sweep` endpoint can be
    /// cron-driven instead; running both is safe.
    pub sweep_interval: Duration,
    /// Disable to rely solely on an external scheduler hitting the sweep endpoint.
    pub enable_sweep_worker: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_MOS_HOST.to_string(),
            port: DEFAULT_MOS_PORT,
            database_url: DEFAULT_DATABASE_URL.to_string(),
            approval_window: DEFAULT_APPROVAL_WINDOW,
            sweep_interval: DEFAULT_SWEEP_INTERVAL,
            enable_sweep_worker: true,
        }
    }
}

impl ServerConfig {
    pub fn new(host: &str, port: u16) -> Self {
        Self { host: host.to_string(), port, ..Default::default() }
    }

    pub fn from_env_or_default() -> Self {
        let host = env::var("MOS_HOST").ok().unwrap_or_else(|| DEFAULT_MOS_HOST.into());
        let port = env::var("MOS_PORT")
            .map(|s| {
                s.parse::<u16>().unwrap_or_else(|e| {
                    error!(
                        "🪛️ {s} is not a valid port for MOS_PORT. {e} Using the default, {DEFAULT_MOS_PORT}, instead."
                    );
                    DEFAULT_MOS_PORT
                })
            })
            .ok()
            .unwrap_or(DEFAULT_MOS_PORT);
        let database_url = env::var("MOS_DATABASE_URL").ok().unwrap_or_else(|| {
            info!("🪛️ MOS_DATABASE_URL is not set. Using the default.");
            DEFAULT_DATABASE_URL.into()
        });
        let approval_window = duration_from_env("MOS_APPROVAL_WINDOW_HOURS", Duration::hours, DEFAULT_APPROVAL_WINDOW);
        let sweep_interval = duration_from_env("MOS_SWEEP_INTERVAL_SECS", Duration::seconds, DEFAULT_SWEEP_INTERVAL);
        let enable_sweep_worker = parse_boolean_flag(env::var("MOS_ENABLE_SWEEP_WORKER").ok(), true);
        Self { host, port, database_url, approval_window, sweep_interval, enable_sweep_worker }
    }
}

fn duration_from_env(var: &str, unit: fn(i64) -> Duration, default: Duration) -> Duration {
    match env::var(var) {
        Ok(s) => match s.parse::<i64>() {
            Ok(v) if v > 0 => unit(v),
            Ok(v) => {
                error!("🪛️ {var} must be positive, got {v}. Using the default instead.");
                default
            },
            Err(e) => {
                error!("🪛️ {s} is not a valid value for {var}. {e} Using the default instead.");
                default
            },
        },
        Err(_) => default,
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let config = ServerConfig::default();
        assert_eq!(config.port, 8360);
        assert_eq!(config.approval_window, Duration::hours(72));
        assert_eq!(config.sweep_interval, Duration::seconds(3600));
        assert!(config.enable_sweep_worker);
    }
}
