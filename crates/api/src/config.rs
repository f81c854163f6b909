//! Process configuration, read from the environment.
//!
//! | variable       | default   |
//! |----------------|-----------|
//! | `CATALOG_HOST` | `0.0.0.0` |
//! | `PORT`         | `8000`    |
//!
//! Log filtering (`RUST_LOG`) and format (`LOG_FORMAT`) are handled by
//! `marketplace-observability`.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use anyhow::Context;
use thiserror::Error;

pub const DEFAULT_PORT: u16 = 8000;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid {var}: {value:?} ({reason})")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    pub host: IpAddr,
    pub port: u16,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: DEFAULT_PORT,
        }
    }
}

impl ApiConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::load(|var| std::env::var(var).ok())
    }

    fn load(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        Self::from_lookup(lookup).context("invalid api configuration")
    }

    /// Build from an arbitrary variable source. Unset or blank variables keep
    /// their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(value) = non_blank(lookup("CATALOG_HOST")) {
            config.host = value
                .trim()
                .parse()
                .map_err(|e: std::net::AddrParseError| invalid("CATALOG_HOST", &value, e))?;
        }

        if let Some(value) = non_blank(lookup("PORT")) {
            config.port = value
                .trim()
                .parse()
                .map_err(|e: std::num::ParseIntError| invalid("PORT", &value, e))?;
        }

        Ok(config)
    }

    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

fn invalid(var: &'static str, value: &str, reason: impl ToString) -> ConfigError {
    ConfigError::Invalid {
        var,
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
