use serde::Deserialize;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

pub const ENV_SELECTOR: &str = "FINSTREAM_ENV";
const ENV_PREFIX: &str = "FINSTREAM";
const CONFIG_FILE: &str = "config/finstream";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Deployment {
    #[default]
    Development,
    Staging,
    Production,
}

impl Deployment {
    pub fn as_str(self) -> &'static str {
        match self {
            Deployment::Development => "development",
            Deployment::Staging => "staging",
            Deployment::Production => "production",
        }
    }

    /// Built-in API endpoint for this deployment.
    pub fn endpoint_defaults(self) -> EndpointConfig {
        let (base_url, timeout_ms) = match self {
            Deployment::Development => ("http://localhost:5013", 10_000),
            Deployment::Staging => ("https://fb457da07468.ngrok-free.app/", 15_000),
            Deployment::Production => ("https://api.lavatudo.com", 20_000),
        };
        EndpointConfig {
            base_url: base_url.to_string(),
            timeout_ms,
        }
    }
}

impl fmt::Display for Deployment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Deployment {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "" | "dev" | "development" => Ok(Deployment::Development),
            "staging" => Ok(Deployment::Staging),
            "prod" | "production" => Ok(Deployment::Production),
            other => anyhow::bail!("unknown deployment environment '{}'", other),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EndpointConfig {
    pub base_url: String,
    pub timeout_ms: u64,
}

impl EndpointConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackedResource {
    #[default]
    LatestPositions,
    Page,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SyncSettings {
    /// Fixed polling interval. Unset disables polling.
    #[serde(default)]
    pub poll_interval_ms: Option<u64>,
    #[serde(default)]
    pub resource: TrackedResource,
    #[serde(default = "default_page_num")]
    pub page_num: u32,
    #[serde(default = "default_items_per_page")]
    pub items_per_page: u32,
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            poll_interval_ms: None,
            resource: TrackedResource::default(),
            page_num: default_page_num(),
            items_per_page: default_items_per_page(),
        }
    }
}

impl SyncSettings {
    pub fn poll_interval(&self) -> Option<Duration> {
        self.poll_interval_ms
            .filter(|ms| *ms > 0)
            .map(Duration::from_millis)
    }
}

fn default_page_num() -> u32 {
    1
}

fn default_items_per_page() -> u32 {
    50
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

fn default_bind() -> String {
    "0.0.0.0:8080".to_string()
}

/// Process-wide settings, resolved once at startup.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AppSettings {
    pub deployment: Deployment,
    pub api: EndpointConfig,
    #[serde(default)]
    pub sync: SyncSettings,
    #[serde(default)]
    pub server: ServerSettings,
}

pub fn load_settings() -> anyhow::Result<AppSettings> {
    let deployment: Deployment = std::env::var(ENV_SELECTOR)
        .unwrap_or_default()
        .parse()?;

    let builder = config::Config::builder()
        .add_source(config::File::with_name(CONFIG_FILE).required(false))
        .add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .try_parsing(true),
        );

    settings_for(deployment, builder)
}

/// Layers `builder`'s sources over the built-in defaults of `deployment`.
pub fn settings_for(
    deployment: Deployment,
    builder: config::ConfigBuilder<config::builder::DefaultState>,
) -> anyhow::Result<AppSettings> {
    let defaults = deployment.endpoint_defaults();
    let settings = builder
        .set_default("deployment", deployment.as_str())?
        .set_default("api.base_url", defaults.base_url)?
        .set_default("api.timeout_ms", defaults.timeout_ms)?
        .build()?;

    Ok(settings.try_deserialize()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::{File, FileFormat};

    fn from_toml(deployment: Deployment, toml: &str) -> AppSettings {
        let builder = config::Config::builder().add_source(File::from_str(toml, FileFormat::Toml));
        settings_for(deployment, builder).unwrap()
    }

    #[test]
    fn test_deployment_defaults() {
        let settings = from_toml(Deployment::Production, "");
        assert_eq!(settings.deployment, Deployment::Production);
        assert_eq!(settings.api.base_url, "https://api.lavatudo.com");
        assert_eq!(settings.api.timeout(), Duration::from_secs(20));
        assert_eq!(settings.sync, SyncSettings::default());
        assert_eq!(settings.server.bind, "0.0.0.0:8080");

        let dev = from_toml(Deployment::Development, "");
        assert_eq!(dev.api.base_url, "http://localhost:5013");
        assert_eq!(dev.api.timeout_ms, 10_000);
    }

    #[test]
    fn test_file_overrides_defaults() {
        let settings = from_toml(
            Deployment::Staging,
            r#"
            [api]
            timeout_ms = 2500

            [sync]
            poll_interval_ms = 30000
            resource = "page"
            items_per_page = 10
            "#,
        );
        assert_eq!(settings.api.base_url, "https://fb457da07468.ngrok-free.app/");
        assert_eq!(settings.api.timeout_ms, 2500);
        assert_eq!(settings.sync.poll_interval(), Some(Duration::from_secs(30)));
        assert_eq!(settings.sync.resource, TrackedResource::Page);
        assert_eq!(settings.sync.page_num, 1);
        assert_eq!(settings.sync.items_per_page, 10);
    }

    #[test]
    fn test_zero_interval_disables_polling() {
        let sync = SyncSettings {
            poll_interval_ms: Some(0),
            ..Default::default()
        };
        assert_eq!(sync.poll_interval(), None);
    }

    #[test]
    fn test_parse_deployment() {
        assert_eq!("".parse::<Deployment>().unwrap(), Deployment::Development);
        assert_eq!("PROD".parse::<Deployment>().unwrap(), Deployment::Production);
        assert_eq!("staging".parse::<Deployment>().unwrap(), Deployment::Staging);
        assert!("qa".parse::<Deployment>().is_err());
    }
}
