//! Server bind settings
//!
//! Values come from an optional `config/<service>.toml` file and are
//! overridden by `<SERVICE>_HOST` / `<SERVICE>_PORT` environment variables.

use anyhow::Result;
use config::{Config, Environment, File};
use serde::Deserialize;
use std::net::SocketAddr;

/// Where a service listens
#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

impl ServerSettings {
    /// Load the settings for `service`, falling back to `0.0.0.0:<default_port>`
    pub fn load(service: &str, default_port: u16) -> Result<Self> {
        let settings = Config::builder()
            .set_default("host", "0.0.0.0")?
            .set_default("port", i64::from(default_port))?
            .add_source(File::with_name(&format!("config/{service}")).required(false))
            .add_source(Environment::with_prefix(&service.to_uppercase()))
            .build()?
            .try_deserialize::<ServerSettings>()?;

        Ok(settings)
    }

    /// Socket address to bind
    pub fn addr(&self) -> Result<SocketAddr> {
        let addr = format!("{}:{}", self.host, self.port).parse()?;
        Ok(addr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_defaults_apply_without_sources() {
        unsafe {
            std::env::remove_var("INKWELLTEST_HOST");
            std::env::remove_var("INKWELLTEST_PORT");
        }

        let settings = ServerSettings::load("inkwelltest", 4100).unwrap();
        assert_eq!(settings.host, "0.0.0.0");
        assert_eq!(settings.port, 4100);
        assert_eq!(settings.addr().unwrap().port(), 4100);
    }

    #[test]
    #[serial]
    fn test_environment_overrides_port() {
        unsafe {
            std::env::set_var("INKWELLTEST_PORT", "4200");
        }

        let settings = ServerSettings::load("inkwelltest", 4100).unwrap();
        assert_eq!(settings.port, 4200);

        unsafe {
            std::env::remove_var("INKWELLTEST_PORT");
        }
    }
}
