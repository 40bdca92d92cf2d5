use anyhow::Result;
use serde::Deserialize;
use std::time::Duration;

use crate::host::ResolverConfig;

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub service: ServiceConfig,
    pub widget: WidgetConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub name: String,
    pub http: HttpConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub bind: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WidgetConfig {
    /// Which recognition engine the service wires into new widgets
    pub engine: String,

    /// Expected answer-field caption for the label-based search
    pub marker_phrase: String,

    /// Independent marker that must also appear near the field
    pub required_marker: String,

    /// Fixed delays between field-resolution attempts
    pub retry_delays_ms: Vec<u64>,

    /// Pause before dispatching blur after a field write
    pub blur_delay_ms: u64,

    /// Default logging sink; per-widget init parameters may override
    pub webhook_url: Option<String>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            name: "voiceform".to_string(),
            http: HttpConfig::default(),
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1".to_string(),
            port: 8090,
        }
    }
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self {
            engine: "scripted".to_string(),
            marker_phrase: "voice response".to_string(),
            required_marker: "required".to_string(),
            retry_delays_ms: vec![200, 500, 1000],
            blur_delay_ms: 150,
            webhook_url: None,
        }
    }
}

impl WidgetConfig {
    pub fn resolver_config(&self) -> ResolverConfig {
        ResolverConfig {
            marker_phrase: self.marker_phrase.clone(),
            required_marker: self.required_marker.clone(),
            retry_delays: self
                .retry_delays_ms
                .iter()
                .map(|ms| Duration::from_millis(*ms))
                .collect(),
            blur_delay: Duration::from_millis(self.blur_delay_ms),
        }
    }
}

impl Config {
    /// Load configuration from an optional file, falling back to defaults
    pub fn load(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path).required(false))
            .build()?;

        Ok(settings.try_deserialize()?)
    }
}
