//! Common test utilities for youtube-data integration tests

#[allow(dead_code)]
pub mod fixtures;

#[allow(unused_imports)]
pub use fixtures::*;

use std::collections::HashMap;
use youtube_data::Config;

/// Build a configuration from explicit key/value pairs, as `Config::from_env` would
#[allow(dead_code)]
pub fn config_from(vars: &[(&str, &str)]) -> youtube_data::Result<Config> {
    let vars: HashMap<String, String> = vars
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    Config::from_lookup(|key| vars.get(key).cloned())
}

/// Whether `.env` or the environment carries a YouTube API key
#[allow(dead_code)]
pub fn has_live_credentials() -> bool {
    dotenvy::dotenv().ok();
    std::env::var("YOUTUBE_API_KEY")
        .or_else(|_| std::env::var("APIKEY"))
        .is_ok_and(|key| !key.trim().is_empty())
}
