//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/orgchart/orgchart.toml`
//! 3. Local config: `--config <file>`, else `./.orgchart.toml` if present
//! 4. Environment variables: `ORGCHART__*` prefix

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::application::ApplicationError;
use crate::domain::costing::{DEFAULT_RATE, FALLBACK_TITLE};
use crate::domain::{OrphanPolicy, RateTable, ScenarioPolicy, ValidationRules};

/// File name of the project-local config.
pub const LOCAL_CONFIG_FILE: &str = ".orgchart.toml";

/// Rate fallbacks for titles missing from the rate table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CostingConfig {
    /// Title whose rate applies to unknown titles
    pub fallback_title: String,
    /// Rate used when even the fallback title is unknown
    pub default_rate: f64,
}

impl Default for CostingConfig {
    fn default() -> Self {
        Self {
            fallback_title: FALLBACK_TITLE.to_string(),
            default_rate: DEFAULT_RATE,
        }
    }
}

/// SVG rendering configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct RenderConfig {
    pub svg_width: u32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self { svg_width: 1200 }
    }
}

/// Raw sections for intermediate parsing (Option to detect "not specified").
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawCostingConfig {
    pub fallback_title: Option<String>,
    pub default_rate: Option<f64>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawValidationRules {
    pub max_depth: Option<usize>,
    pub max_fte: Option<f64>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawScenarioPolicy {
    pub moderate_min_span: Option<usize>,
    pub aggressive_min_span: Option<usize>,
    pub orphans: Option<OrphanPolicy>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawRenderConfig {
    pub svg_width: Option<u32>,
}

/// Raw settings for intermediate parsing.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub rates: Option<BTreeMap<String, f64>>,
    pub costing: RawCostingConfig,
    pub validation: RawValidationRules,
    pub scenarios: RawScenarioPolicy,
    pub render: RawRenderConfig,
}

/// Unified configuration for orgchart.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    /// Title → annual rate, layered over the built-in rate table
    pub rates: BTreeMap<String, f64>,
    pub costing: CostingConfig,
    pub validation: ValidationRules,
    pub scenarios: ScenarioPolicy,
    pub render: RenderConfig,
}

/// Get the XDG config directory for orgchart.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "orgchart").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("orgchart.toml"))
}

/// Get the path to the local config file in a directory.
pub fn local_config_path(dir: &Path) -> PathBuf {
    dir.join(LOCAL_CONFIG_FILE)
}

/// Expand `~`, `$VAR`, and `${VAR}` in a user supplied path.
pub fn expand_path(path: &Path) -> PathBuf {
    let raw = path.to_string_lossy();
    shellexpand::full(raw.as_ref())
        .map(|s| PathBuf::from(s.into_owned()))
        .unwrap_or_else(|_| path.to_path_buf())
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> Result<RawSettings, ApplicationError> {
    let content = std::fs::read_to_string(path).map_err(|e| ApplicationError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    toml::from_str(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

impl Settings {
    /// Rate table with the configured fallbacks and rates applied.
    pub fn rate_table(&self) -> RateTable {
        RateTable::default()
            .with_fallback(self.costing.fallback_title.clone(), self.costing.default_rate)
            .with_overrides(&self.rates)
    }

    /// Merge overlay config onto self (base).
    ///
    /// - Scalar options: overlay wins if Some, otherwise keep base
    /// - Rates: key-wise merge, overlay wins per title
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        let mut rates = self.rates.clone();
        if let Some(extra) = &overlay.rates {
            rates.extend(extra.iter().map(|(k, v)| (k.clone(), *v)));
        }

        Self {
            rates,
            costing: CostingConfig {
                fallback_title: overlay
                    .costing
                    .fallback_title
                    .clone()
                    .unwrap_or_else(|| self.costing.fallback_title.clone()),
                default_rate: overlay
                    .costing
                    .default_rate
                    .unwrap_or(self.costing.default_rate),
            },
            validation: ValidationRules {
                max_depth: overlay
                    .validation
                    .max_depth
                    .unwrap_or(self.validation.max_depth),
                max_fte: overlay.validation.max_fte.unwrap_or(self.validation.max_fte),
            },
            scenarios: ScenarioPolicy {
                moderate_min_span: overlay
                    .scenarios
                    .moderate_min_span
                    .unwrap_or(self.scenarios.moderate_min_span),
                aggressive_min_span: overlay
                    .scenarios
                    .aggressive_min_span
                    .unwrap_or(self.scenarios.aggressive_min_span),
                orphans: overlay.scenarios.orphans.unwrap_or(self.scenarios.orphans),
            },
            render: RenderConfig {
                svg_width: overlay.render.svg_width.unwrap_or(self.render.svg_width),
            },
        }
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `local_config` - Explicit config file; must exist when given.
    ///   Without it, `./.orgchart.toml` is used if present.
    pub fn load(local_config: Option<&Path>) -> Result<Self, ApplicationError> {
        // 1. Start with defaults
        let mut current = Self::default();

        // 2. Global config
        if let Some(global_path) = global_config_path() {
            if global_path.exists() {
                debug!("loading global config: {}", global_path.display());
                current = current.merge_with(&load_raw_settings(&global_path)?);
            }
        }

        // 3. Local config
        let local_path = match local_config {
            Some(path) => {
                let path = expand_path(path);
                if !path.exists() {
                    return Err(ApplicationError::Config {
                        message: format!("config file not found: {}", path.display()),
                    });
                }
                Some(path)
            }
            None => Some(local_config_path(Path::new("."))).filter(|p| p.exists()),
        };
        if let Some(path) = local_path {
            debug!("loading local config: {}", path.display());
            current = current.merge_with(&load_raw_settings(&path)?);
        }

        // 4. Apply environment variables (explicit override)
        Self::apply_env_overrides(current)
    }

    /// Apply ORGCHART__* environment variables as explicit overrides.
    ///
    /// Rates are not taken from the environment: variable names cannot
    /// carry role titles faithfully.
    fn apply_env_overrides(mut settings: Self) -> Result<Self, ApplicationError> {
        let config = Config::builder()
            .add_source(Environment::with_prefix("ORGCHART").separator("__"))
            .build()
            .map_err(config_err)?;

        if let Ok(val) = config.get_string("costing.fallback_title") {
            settings.costing.fallback_title = val;
        }
        if let Ok(val) = config.get_float("costing.default_rate") {
            settings.costing.default_rate = val;
        }
        if let Ok(val) = config.get_int("validation.max_depth") {
            settings.validation.max_depth = to_usize("validation.max_depth", val)?;
        }
        if let Ok(val) = config.get_float("validation.max_fte") {
            settings.validation.max_fte = val;
        }
        if let Ok(val) = config.get_int("scenarios.moderate_min_span") {
            settings.scenarios.moderate_min_span = to_usize("scenarios.moderate_min_span", val)?;
        }
        if let Ok(val) = config.get_int("scenarios.aggressive_min_span") {
            settings.scenarios.aggressive_min_span =
                to_usize("scenarios.aggressive_min_span", val)?;
        }
        if let Ok(val) = config.get_string("scenarios.orphans") {
            settings.scenarios.orphans = parse_orphan_policy(&val)?;
        }
        if let Ok(val) = config.get_int("render.svg_width") {
            settings.render.svg_width =
                u32::try_from(val).map_err(|_| ApplicationError::Config {
                    message: format!("render.svg_width out of range: {}", val),
                })?;
        }

        Ok(settings)
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize config: {e}"),
        })
    }

    /// Generate a template config file.
    pub fn template() -> String {
        r#"# orgchart configuration
#
# Locations (by precedence, lowest to highest):
#   Global: ~/.config/orgchart/orgchart.toml
#   Local:  ./.orgchart.toml or --config <file>
#   Env:    ORGCHART__<SECTION>__<KEY>, e.g. ORGCHART__SCENARIOS__ORPHANS=reattach

# Annual rates per role title, layered over the built-in table
[rates]
# "Data Scientist" = 125000
# "Manager" = 98000

[costing]
# Title whose rate applies to titles missing from the table
# fallback_title = "Analyst"
# Rate used when the fallback title is missing too
# default_rate = 65000.0

[validation]
# Deepest level below a root before EXCESSIVE_DEPTH is reported
# max_depth = 10
# FTE above this is reported as INVALID_FTE
# max_fte = 2.0

[scenarios]
# Managers with fewer reports are cut in the moderate scenario
# moderate_min_span = 3
# Managers with fewer reports are cut in the aggressive scenario
# aggressive_min_span = 10
# Reports of a cut position: "drop" them or "reattach" them to its parent
# orphans = "drop"

[render]
# svg_width = 1200
"#
        .to_string()
    }
}

fn parse_orphan_policy(value: &str) -> Result<OrphanPolicy, ApplicationError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "drop" => Ok(OrphanPolicy::Drop),
        "reattach" => Ok(OrphanPolicy::Reattach),
        other => Err(ApplicationError::Config {
            message: format!("scenarios.orphans must be drop or reattach, got {other:?}"),
        }),
    }
}

fn to_usize(key: &str, value: i64) -> Result<usize, ApplicationError> {
    usize::try_from(value).map_err(|_| ApplicationError::Config {
        message: format!("{key} must not be negative: {value}"),
    })
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}
