//! Configuration for blur synthesis and restoration
//!
//! Settings are read from a TOML file and merged with command-line
//! overrides. The merged [`Config`] is validated once and then passed by
//! reference to the code that needs it.
//!
//! # Example file
//!
//! ```toml
//! lambda = 0.05
//! normalize_kernel = true
//! noise_sigma = 0.01
//! seed = 7
//!
//! [angle_range]
//! min = 0.0
//! max = 180.0
//!
//! [length_range]
//! min = 5.0
//! max = 21.0
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::inverse::DEFAULT_LAMBDA;

// ============================================================
// Constants
// ============================================================

/// Local config file name
pub const CONFIG_FILE_NAME: &str = "motion-deblur.toml";

/// Application directory under the user config dir
const APP_DIR_NAME: &str = "motion-deblur";

/// Default minimum sampled motion length (pixels)
const DEFAULT_LENGTH_MIN: f64 = 3.0;

/// Default maximum sampled motion length (pixels)
const DEFAULT_LENGTH_MAX: f64 = 25.0;

// ============================================================
// Error Types
// ============================================================

/// Configuration error types
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

// ============================================================
// Types
// ============================================================

/// Closed interval `[min, max]`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParamRange {
    pub min: f64,
    pub max: f64,
}

impl ParamRange {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, value: f64) -> bool {
        (self.min..=self.max).contains(&value)
    }

    fn validate(&self, name: &str) -> Result<()> {
        if !self.min.is_finite() || !self.max.is_finite() {
            return Err(ConfigError::Invalid(format!("{} must be finite", name)));
        }
        if self.min > self.max {
            return Err(ConfigError::Invalid(format!(
                "{}: min {} exceeds max {}",
                name, self.min, self.max
            )));
        }
        Ok(())
    }
}

/// Blur and restoration settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Wiener regularization (noise-to-signal power ratio)
    pub lambda: f64,
    /// Fixed odd kernel grid size (derived from the length when unset)
    pub grid_size: Option<usize>,
    /// Scale kernels to unit sum before blurring
    pub normalize_kernel: bool,
    /// Standard deviation of added Gaussian noise
    pub noise_sigma: f64,
    /// Seed for parameter sampling and noise
    pub seed: u64,
    /// Range of sampled motion angles (degrees)
    pub angle_range: ParamRange,
    /// Range of sampled motion lengths (pixels)
    pub length_range: ParamRange,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            lambda: DEFAULT_LAMBDA,
            grid_size: None,
            normalize_kernel: true,
            noise_sigma: 0.0,
            seed: 0,
            angle_range: ParamRange::new(0.0, 180.0),
            length_range: ParamRange::new(DEFAULT_LENGTH_MIN, DEFAULT_LENGTH_MAX),
        }
    }
}

impl Config {
    /// Load from `./motion-deblur.toml`, then the user config directory,
    /// falling back to defaults when neither exists
    pub fn load() -> Result<Self> {
        let local = PathBuf::from(CONFIG_FILE_NAME);
        if local.exists() {
            return Self::load_from_path(&local);
        }

        if let Some(user) = Self::user_config_path() {
            if user.exists() {
                return Self::load_from_path(&user);
            }
        }

        Ok(Self::default())
    }

    /// Load and validate a TOML file
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&content)?;
        tracing::debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    /// Parse and validate TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// `<config_dir>/motion-deblur/config.toml`
    pub fn user_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(APP_DIR_NAME).join("config.toml"))
    }

    pub fn validate(&self) -> Result<()> {
        self.angle_range.validate("angle_range")?;
        self.length_range.validate("length_range")?;
        if self.length_range.min <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "length_range.min must be positive, got {}",
                self.length_range.min
            )));
        }
        if !self.lambda.is_finite() || self.lambda < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "lambda must be finite and non-negative, got {}",
                self.lambda
            )));
        }
        if !self.noise_sigma.is_finite() || self.noise_sigma < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "noise_sigma must be finite and non-negative, got {}",
                self.noise_sigma
            )));
        }
        if let Some(size) = self.grid_size {
            if size == 0 || size % 2 == 0 {
                return Err(ConfigError::Invalid(format!(
                    "grid_size must be odd and non-zero, got {}",
                    size
                )));
            }
        }
        Ok(())
    }

    /// Apply command-line overrides (CLI values take precedence)
    pub fn merge_with_cli(&self, overrides: &CliOverrides) -> Self {
        let mut merged = self.clone();
        if let Some(lambda) = overrides.lambda {
            merged.lambda = lambda;
        }
        if let Some(size) = overrides.grid_size {
            merged.grid_size = Some(size);
        }
        if let Some(normalize) = overrides.normalize_kernel {
            merged.normalize_kernel = normalize;
        }
        if let Some(sigma) = overrides.noise_sigma {
            merged.noise_sigma = sigma;
        }
        if let Some(seed) = overrides.seed {
            merged.seed = seed;
        }
        merged
    }
}

/// Values explicitly set on the command line
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CliOverrides {
    pub lambda: Option<f64>,
    pub grid_size: Option<usize>,
    pub normalize_kernel: Option<bool>,
    pub noise_sigma: Option<f64>,
    pub seed: Option<u64>,
}

impl CliOverrides {
    pub fn new() -> Self {
        Self::default()
    }
}
