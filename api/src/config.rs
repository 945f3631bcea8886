use crate::database::DEFAULT_DATABASE_URL;
use std::env;

pub const DEFAULT_PAGE_SIZE: u32 = 20;
pub const MAX_PAGE_SIZE: u32 = 100;

/// Runtime settings read from the environment (and `.env` when present)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub database_url: String,
    pub default_page_size: u32,
    pub max_page_size: u32,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let database_url =
            lookup("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string());
        let max_page_size = parse_size(&lookup, "MAX_PAGE_SIZE", MAX_PAGE_SIZE);
        let default_page_size =
            parse_size(&lookup, "DEFAULT_PAGE_SIZE", DEFAULT_PAGE_SIZE).min(max_page_size);
        Self {
            database_url,
            default_page_size,
            max_page_size,
        }
    }
}

fn parse_size(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: u32) -> u32 {
    match lookup(key) {
        None => default,
        Some(raw) => match raw.trim().parse::<u32>() {
            Ok(size) if size > 0 => size,
            _ => {
                tracing::warn!("Ignoring invalid {}={:?}, using {}", key, raw, default);
                default
            }
        },
    }
}
