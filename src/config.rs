//! Configuration types for harvest definitions
//!
//! This module contains the structures loaded from a harvest YAML file:
//! where pages come from, how to fetch them, when to stop, which targets to
//! walk and where the output goes.

use crate::error::{Error, Result};
use crate::extract::{ExtractorConfig, DEFAULT_MIN_COLUMNS, DEFAULT_SOURCE};
use crate::http::{HttpClientConfig, RateLimiterConfig};
use crate::pagination::PaginationConfig;
use crate::template::validate_template;
use crate::types::{BackoffType, ContentFormat, OutputFormat, Target};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

// ============================================================================
// Top-Level Harvest Config
// ============================================================================

/// Complete harvest configuration loaded from YAML
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HarvestConfig {
    /// Page source definition
    pub source: SourceConfig,

    /// HTTP client configuration
    #[serde(default)]
    pub http: HttpConfig,

    /// Stop conditions
    #[serde(default)]
    pub pagination: PaginationConfig,

    /// Target groups to walk, in order
    #[serde(default)]
    pub targets: Vec<TargetGroup>,

    /// Output settings
    #[serde(default)]
    pub output: OutputConfig,

    /// Run behavior
    #[serde(default)]
    pub run: RunConfig,
}

impl HarvestConfig {
    /// Parse and validate a YAML string
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)
            .map_err(|e| Error::config(format!("Failed to parse harvest YAML: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a YAML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::FileNotFound {
                    path: path.display().to_string(),
                }
            } else {
                Error::config(format!(
                    "Failed to read config file '{}': {e}",
                    path.display()
                ))
            }
        })?;
        Self::from_yaml_str(&content)
    }

    /// Check the configuration for values that cannot work
    pub fn validate(&self) -> Result<()> {
        if self.source.url_template.trim().is_empty() {
            return Err(Error::missing_field("source.url_template"));
        }
        validate_template(&self.source.url_template)?;
        if self.source.delimiter == '"' {
            return Err(Error::invalid_value(
                "source.delimiter",
                "the quote character cannot be a delimiter",
            ));
        }
        self.next_page_regex()?;

        self.pagination.validate()?;

        if self.targets.is_empty() {
            return Err(Error::invalid_value("targets", "at least one target is required"));
        }
        for (idx, group) in self.targets.iter().enumerate() {
            if group.jurisdiction.trim().is_empty() {
                return Err(Error::invalid_value(
                    format!("targets[{idx}].jurisdiction"),
                    "cannot be empty",
                ));
            }
            if group.entities.is_empty() {
                return Err(Error::invalid_value(
                    format!("targets[{idx}].entities"),
                    "at least one entity is required",
                ));
            }
            if group.entities.iter().any(|e| e.trim().is_empty()) {
                return Err(Error::invalid_value(
                    format!("targets[{idx}].entities"),
                    "entity names cannot be empty",
                ));
            }
        }

        Ok(())
    }

    /// Expand target groups into individual targets, in file order
    pub fn targets(&self) -> Vec<Target> {
        self.targets
            .iter()
            .flat_map(|group| {
                group
                    .entities
                    .iter()
                    .map(|entity| Target::new(group.jurisdiction.trim(), group.year, entity.trim()))
            })
            .collect()
    }

    /// Compiled next-page marker, if configured
    pub fn next_page_regex(&self) -> Result<Option<Regex>> {
        self.source
            .next_page_pattern
            .as_deref()
            .map(Regex::new)
            .transpose()
            .map_err(Error::from)
    }

    /// Extractor settings for the source
    pub fn extractor_config(&self) -> ExtractorConfig {
        ExtractorConfig {
            source: self.source.name.clone(),
            format: self.source.format,
            delimiter: self.source.delimiter,
            min_columns: self.source.min_columns,
            record_path: self.source.record_path.clone(),
            header_path: self.source.header_path.clone(),
        }
    }

    /// HTTP client settings
    pub fn http_client_config(&self) -> HttpClientConfig {
        self.http.to_client_config()
    }

    /// Pause between targets
    pub fn target_delay(&self) -> Duration {
        Duration::from_millis(self.run.target_delay_ms)
    }
}

// ============================================================================
// Source Config
// ============================================================================

/// Where pages come from and how they are laid out
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Source identifier stamped on every record
    #[serde(default = "default_source_name")]
    pub name: String,

    /// Page URL with `{{ target.* }}`, `{{ page }}` and `{{ vars.* }}` variables
    pub url_template: String,

    /// Body layout
    #[serde(default)]
    pub format: ContentFormat,

    /// Field delimiter for delimited tables
    #[serde(default = "default_delimiter")]
    pub delimiter: char,

    /// Minimum cells for a data row
    #[serde(default = "default_min_columns")]
    pub min_columns: usize,

    /// Dot path to rows in a JSON body
    #[serde(default)]
    pub record_path: Option<String>,

    /// Dot path to the header array in a JSON body
    #[serde(default)]
    pub header_path: Option<String>,

    /// Regex a body must match for another page to be requested
    #[serde(default)]
    pub next_page_pattern: Option<String>,

    /// Extra template variables
    #[serde(default)]
    pub vars: serde_json::Value,
}

fn default_source_name() -> String {
    DEFAULT_SOURCE.to_string()
}

fn default_delimiter() -> char {
    ','
}

fn default_min_columns() -> usize {
    DEFAULT_MIN_COLUMNS
}

// ============================================================================
// HTTP Config
// ============================================================================

/// HTTP client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Maximum number of retries
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Retry backoff configuration
    #[serde(default)]
    pub backoff: BackoffConfig,

    /// Rate limiting configuration
    #[serde(default)]
    pub rate_limit: RateLimiterConfig,

    /// User agent override
    #[serde(default)]
    pub user_agent: Option<String>,

    /// Headers sent with every request
    #[serde(default)]
    pub headers: HashMap<String, String>,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout(),
            max_retries: default_max_retries(),
            backoff: BackoffConfig::default(),
            rate_limit: RateLimiterConfig::default(),
            user_agent: None,
            headers: HashMap::new(),
        }
    }
}

impl HttpConfig {
    /// Build the client configuration
    pub fn to_client_config(&self) -> HttpClientConfig {
        let mut builder = HttpClientConfig::builder()
            .timeout(Duration::from_secs(self.timeout_secs))
            .max_retries(self.max_retries)
            .backoff(
                self.backoff.backoff_type,
                Duration::from_millis(self.backoff.initial_ms),
                Duration::from_millis(self.backoff.max_ms),
            )
            .rate_limit(self.rate_limit.clone());

        if let Some(agent) = &self.user_agent {
            builder = builder.user_agent(agent.clone());
        }
        for (key, value) in &self.headers {
            builder = builder.header(key.clone(), value.clone());
        }

        builder.build()
    }
}

fn default_timeout() -> u64 {
    30
}

fn default_max_retries() -> u32 {
    3
}

/// Backoff configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackoffConfig {
    /// Type of backoff
    #[serde(rename = "type", default)]
    pub backoff_type: BackoffType,

    /// Initial delay in milliseconds
    #[serde(default = "default_initial_ms")]
    pub initial_ms: u64,

    /// Maximum delay in milliseconds
    #[serde(default = "default_max_ms")]
    pub max_ms: u64,
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self {
            backoff_type: BackoffType::Exponential,
            initial_ms: default_initial_ms(),
            max_ms: default_max_ms(),
        }
    }
}

fn default_initial_ms() -> u64 {
    100
}

fn default_max_ms() -> u64 {
    60000
}

// ============================================================================
// Targets
// ============================================================================

/// Entities sharing a jurisdiction and year
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetGroup {
    /// Jurisdiction name
    pub jurisdiction: String,

    /// Reporting year
    pub year: u16,

    /// Entity names
    #[serde(default)]
    pub entities: Vec<String>,
}

// ============================================================================
// Output And Run
// ============================================================================

/// Where and how results are written
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Output directory
    #[serde(default = "default_output_dir")]
    pub dir: PathBuf,

    /// File format
    #[serde(default)]
    pub format: OutputFormat,

    /// Remove repeated records across the whole run
    #[serde(default = "default_true")]
    pub dedup: bool,

    /// Add `Annual_Wages` and `Annual_Wages_Numeric`
    #[serde(default = "default_true")]
    pub normalize_wages: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
            format: OutputFormat::default(),
            dedup: true,
            normalize_wages: true,
        }
    }
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("output")
}

fn default_true() -> bool {
    true
}

/// Harvest run behavior
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    /// Stop at the first failed target
    #[serde(default)]
    pub fail_fast: bool,

    /// Pause between targets in milliseconds
    #[serde(default = "default_target_delay_ms")]
    pub target_delay_ms: u64,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            fail_fast: false,
            target_delay_ms: default_target_delay_ms(),
        }
    }
}

fn default_target_delay_ms() -> u64 {
    3000
}
