//! Configuration: remote API settings from env, wizard defaults from an
//! optional TOML file.
//!
//! Env variables:
//!   API_BASE_URL       : default "http://127.0.0.1:8000"
//!   API_TOKEN          : optional bearer token for the REST API
//!   API_TIMEOUT_SECS   : default 30
//!   WIZARD_CONFIG_PATH : path to TOML overrides for wizard defaults

use serde::Deserialize;
use tracing::{error, info};

/// Settings for the remote REST API client.
#[derive(Clone, Debug)]
pub struct ApiConfig {
  pub base_url: String,
  pub token: Option<String>,
  pub timeout_secs: u64,
}

impl Default for ApiConfig {
  fn default() -> Self {
    Self {
      base_url: "http://127.0.0.1:8000".into(),
      token: None,
      timeout_secs: 30,
    }
  }
}

impl ApiConfig {
  pub fn from_env() -> Self {
    let defaults = Self::default();
    Self {
      base_url: std::env::var("API_BASE_URL").unwrap_or(defaults.base_url),
      token: std::env::var("API_TOKEN").ok().filter(|t| !t.is_empty()),
      timeout_secs: std::env::var("API_TIMEOUT_SECS")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(defaults.timeout_secs),
    }
  }
}

/// Tunable defaults for the rubric editor. Overridable per deployment via
/// TOML; the built-in values match the institutional rubric conventions.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct WizardDefaults {
  /// Weight a freshly added criterion starts with (fraction of 1.0).
  pub default_weight: f64,
  /// Name of the starter level on a freshly added criterion.
  pub default_level_name: String,
  /// Starter level min and max score.
  pub default_level_score: f64,
  /// Suggested level vocabulary, best to worst.
  pub level_names: Vec<String>,
}

impl Default for WizardDefaults {
  fn default() -> Self {
    Self {
      default_weight: 0.10,
      default_level_name: "Excelente".into(),
      default_level_score: 3.0,
      level_names: vec![
        "Excelente".into(),
        "Bueno".into(),
        "Regular".into(),
        "Insuficiente".into(),
      ],
    }
  }
}

/// Attempt to load `WizardDefaults` from WIZARD_CONFIG_PATH. On any IO or
/// parsing error, returns None and the caller falls back to the defaults.
pub fn load_wizard_defaults_from_env() -> Option<WizardDefaults> {
  let path = std::env::var("WIZARD_CONFIG_PATH").ok()?;
  match std::fs::read_to_string(&path) {
    Ok(s) => match toml::from_str::<WizardDefaults>(&s) {
      Ok(cfg) => {
        info!(target: "analitica_config", %path, "Loaded wizard defaults (TOML)");
        Some(cfg)
      }
      Err(e) => {
        error!(target: "analitica_config", %path, error = %e, "Failed to parse TOML config");
        None
      }
    },
    Err(e) => {
      error!(target: "analitica_config", %path, error = %e, "Failed to read TOML config file");
      None
    }
  }
}
