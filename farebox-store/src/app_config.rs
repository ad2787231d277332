use serde::Deserialize;
use std::env;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub business_rules: BusinessRules,
}

#[derive(Debug, Deserialize, Clone)]
pub struct BusinessRules {
    /// Soft-hold lifetime before an unconfirmed seat selection lapses.
    #[serde(default = "default_seat_hold_seconds")]
    pub seat_hold_seconds: u64,
    /// Per-holder seat quota for a single trip.
    #[serde(default = "default_max_seats_per_user")]
    pub max_seats_per_user: u32,
    /// Cabin layout used when rendering seat labels (A1, B3, ...).
    #[serde(default = "default_seats_per_row")]
    pub seats_per_row: u32,
}

fn default_seat_hold_seconds() -> u64 {
    300
}

fn default_max_seats_per_user() -> u32 {
    4
}

fn default_seats_per_row() -> u32 {
    4
}

impl Default for BusinessRules {
    fn default() -> Self {
        Self {
            seat_hold_seconds: default_seat_hold_seconds(),
            max_seats_per_user: default_max_seats_per_user(),
            seats_per_row: default_seats_per_row(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = config::Config::builder()
            // Start off by merging in the "default" configuration file
            .add_source(config::File::with_name("config/default").required(false))
            // Add in the current environment file (optional)
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            // Add in a local configuration file, not checked in to git
            .add_source(config::File::with_name("config/local").required(false))
            // Add in settings from the environment (with a prefix of FAREBOX)
            // Eg.. `FAREBOX__BUSINESS_RULES__SEAT_HOLD_SECONDS=120`
            .add_source(config::Environment::with_prefix("FAREBOX").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}
