use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::Path;

use crate::error::{OperatorError, Result};
use crate::models::{MachineConstants, ProductionTelemetry, UnitCosts};
use crate::transport::GEMINI_API_BASE;

/// Main configuration structure for the digital operator
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub gemini: GeminiConfig,
    #[serde(default)]
    pub session: SessionDefaults,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeminiConfig {
    pub api_key: String,
    pub model: String,
    pub temperature: f32,
    pub base_url: String,
    /// Replaces the built-in operator instruction when set
    pub system_instruction: Option<String>,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: "gemini-3-pro-preview".to_string(),
            temperature: 0.2,
            base_url: GEMINI_API_BASE.to_string(),
            system_instruction: None,
        }
    }
}

/// Initial form values for a new session
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionDefaults {
    #[serde(default)]
    pub telemetry: ProductionTelemetry,
    #[serde(default)]
    pub costs: UnitCosts,
    #[serde(default)]
    pub machine: MachineConstants,
}

impl Config {
    /// Load configuration from file with environment variable overrides
    /// ALWAYS returns a config - a missing API key is checked separately by `require_api_key`
    pub fn load() -> Self {
        let env_paths = ["../.env", ".env"];

        let mut env_loaded = false;
        for path in &env_paths {
            if dotenvy::from_path(path).is_ok() {
                tracing::info!("Loaded .env from: {}", path);
                env_loaded = true;
                break;
            }
        }

        if !env_loaded {
            tracing::debug!("No .env file found - continuing with env vars only");
        }

        let config_path =
            env::var("VARAKA_CONFIG_PATH").unwrap_or_else(|_| "config.yaml".to_string());

        let mut config = if Path::new(&config_path).exists() {
            match Self::from_file(&config_path) {
                Ok(config) => {
                    tracing::info!("Loaded configuration from {}", config_path);
                    config
                }
                Err(e) => {
                    tracing::error!(
                        "Failed to load config file {}: {} - using defaults",
                        config_path,
                        e
                    );
                    Self::default()
                }
            }
        } else {
            tracing::debug!("Config file not found at {} - using defaults", config_path);
            Self::default()
        };

        config.apply_env_overrides(|key| env::var(key).ok());

        if let Err(e) = config.validate() {
            tracing::warn!("Config validation warnings: {} - continuing anyway", e);
        }

        config
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let contents = fs::read_to_string(path.as_ref()).map_err(|e| {
            OperatorError::Config(format!("cannot read {}: {e}", path.as_ref().display()))
        })?;
        Self::from_yaml(&contents)
    }

    pub fn from_yaml(contents: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(contents)?)
    }

    /// Apply environment variable overrides read through `lookup`
    fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        // GEMINI_API_KEY wins over the generic API_KEY
        if let Some(api_key) = lookup("GEMINI_API_KEY").or_else(|| lookup("API_KEY")) {
            self.gemini.api_key = api_key;
        }
        if let Some(model) = lookup("GEMINI_MODEL") {
            self.gemini.model = model;
        }
        if let Some(temperature) = lookup("GEMINI_TEMPERATURE") {
            match temperature.parse() {
                Ok(t) => self.gemini.temperature = t,
                Err(_) => tracing::warn!("Ignoring non-numeric GEMINI_TEMPERATURE={}", temperature),
            }
        }
        if let Some(base_url) = lookup("GEMINI_BASE_URL") {
            self.gemini.base_url = base_url;
        }
    }

    fn validate(&self) -> std::result::Result<(), String> {
        if !(0.0..=2.0).contains(&self.gemini.temperature) {
            return Err("gemini.temperature must be between 0.0 and 2.0".to_string());
        }
        if self.gemini.model.trim().is_empty() {
            return Err("gemini.model cannot be empty".to_string());
        }
        if self.gemini.api_key.trim().is_empty() {
            return Err("GEMINI_API_KEY (or API_KEY) environment variable must be set".to_string());
        }
        Ok(())
    }

    /// Startup gate: the operator cannot run without an API key
    pub fn require_api_key(&self) -> Result<&str> {
        let key = self.gemini.api_key.trim();
        if key.is_empty() {
            return Err(OperatorError::Config("API Key not found".to_string()));
        }
        Ok(key)
    }
}
