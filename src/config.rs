use crate::defaults;
use crate::error::{Result, TalkifyError};
use crate::stabilizer::{EmissionPolicy, StabilizerConfig};
use serde::{Deserialize, Deserializer, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Config {
    pub sign: SignConfig,
    pub lip: LipConfig,
}

/// Fingerspelling session configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SignConfig {
    #[serde(deserialize_with = "sign_stabilizer")]
    pub stabilizer: StabilizerConfig,
    pub sequence_length: usize,
    /// Restrict the left hand to digits and the right hand to letters.
    pub role_masking: bool,
    pub role_mass_floor: f32,
    /// Treat an open palm with the thumb out as space.
    pub open_palm_override: bool,
    pub thumb_offset: f32,
    pub region_padding: u32,
}

/// Lip-reading session configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LipConfig {
    #[serde(deserialize_with = "lip_stabilizer")]
    pub stabilizer: StabilizerConfig,
    pub sequence_length: usize,
    pub region_padding: u32,
    /// Center and scale lip landmarks; disable for models trained on raw coordinates.
    pub normalize: bool,
}

/// A stabilizer table as written in the file; absent keys keep the section's defaults.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct StabilizerTable {
    window_capacity: Option<usize>,
    consensus_count: Option<usize>,
    admission_threshold: Option<f32>,
    cooldown_ms: Option<u64>,
    policy: Option<EmissionPolicy>,
}

impl StabilizerTable {
    fn over(self, base: StabilizerConfig) -> StabilizerConfig {
        StabilizerConfig {
            window_capacity: self.window_capacity.unwrap_or(base.window_capacity),
            consensus_count: self.consensus_count.unwrap_or(base.consensus_count),
            admission_threshold: self.admission_threshold.unwrap_or(base.admission_threshold),
            cooldown_ms: self.cooldown_ms.unwrap_or(base.cooldown_ms),
            policy: self.policy.unwrap_or(base.policy),
        }
    }
}

fn sign_stabilizer<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<StabilizerConfig, D::Error> {
    Ok(StabilizerTable::deserialize(deserializer)?.over(StabilizerConfig::sign()))
}

fn lip_stabilizer<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<StabilizerConfig, D::Error> {
    Ok(StabilizerTable::deserialize(deserializer)?.over(StabilizerConfig::lip()))
}

impl Default for SignConfig {
    fn default() -> Self {
        Self {
            stabilizer: StabilizerConfig::sign(),
            sequence_length: defaults::SIGN_SEQUENCE_LENGTH,
            role_masking: true,
            role_mass_floor: defaults::ROLE_MASS_FLOOR,
            open_palm_override: true,
            thumb_offset: defaults::THUMB_OFFSET,
            region_padding: defaults::REGION_PADDING,
        }
    }
}

impl Default for LipConfig {
    fn default() -> Self {
        Self {
            stabilizer: StabilizerConfig::lip(),
            sequence_length: defaults::LIP_SEQUENCE_LENGTH,
            region_padding: defaults::REGION_PADDING,
            normalize: true,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// Returns an error if the file is missing or contains invalid TOML.
    /// Missing fields will use default values.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                TalkifyError::ConfigFileNotFound {
                    path: path.display().to_string(),
                }
            } else {
                TalkifyError::Io(e)
            }
        })?;
        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Load configuration from a file or return defaults if file doesn't exist
    ///
    /// Only returns defaults if the file is missing.
    /// Returns errors for invalid TOML.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        match Self::load(path) {
            Err(TalkifyError::ConfigFileNotFound { .. }) => Ok(Self::default()),
            other => other,
        }
    }

    /// Apply environment variable overrides to both sessions
    ///
    /// Supported environment variables:
    /// - TALKIFY_COOLDOWN_MS → {sign,lip}.stabilizer.cooldown_ms
    /// - TALKIFY_WINDOW → {sign,lip}.stabilizer.window_capacity
    /// - TALKIFY_CONSENSUS → {sign,lip}.stabilizer.consensus_count
    ///
    /// Empty or unparsable values are ignored.
    pub fn with_env_overrides(mut self) -> Self {
        if let Some(cooldown) = env_number::<u64>("TALKIFY_COOLDOWN_MS") {
            self.sign.stabilizer.cooldown_ms = cooldown;
            self.lip.stabilizer.cooldown_ms = cooldown;
        }

        if let Some(window) = env_number::<usize>("TALKIFY_WINDOW") {
            self.sign.stabilizer.window_capacity = window;
            self.lip.stabilizer.window_capacity = window;
        }

        if let Some(consensus) = env_number::<usize>("TALKIFY_CONSENSUS") {
            self.sign.stabilizer.consensus_count = consensus;
            self.lip.stabilizer.consensus_count = consensus;
        }

        self
    }

    /// Check every section for out-of-range values.
    pub fn validate(&self) -> Result<()> {
        self.sign.stabilizer.validate("sign")?;
        self.lip.stabilizer.validate("lip")?;

        if self.sign.sequence_length == 0 {
            return Err(invalid("sign.sequence_length", "must be at least 1"));
        }
        if self.lip.sequence_length == 0 {
            return Err(invalid("lip.sequence_length", "must be at least 1"));
        }
        if !(0.0..=1.0).contains(&self.sign.role_mass_floor) {
            return Err(invalid("sign.role_mass_floor", "must be between 0.0 and 1.0"));
        }
        if self.sign.thumb_offset.is_nan() || self.sign.thumb_offset < 0.0 {
            return Err(invalid("sign.thumb_offset", "must not be negative"));
        }
        Ok(())
    }

    /// Get the default configuration file path
    ///
    /// Returns ~/.config/talkify/config.toml on Linux
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("talkify")
            .join("config.toml")
    }
}

fn env_number<T: std::str::FromStr>(key: &str) -> Option<T> {
    let value = std::env::var(key).ok()?;
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    match value.parse() {
        Ok(n) => Some(n),
        Err(_) => {
            tracing::warn!(key, value, "ignoring non-numeric environment override");
            None
        }
    }
}

fn invalid(key: &str, message: &str) -> TalkifyError {
    TalkifyError::ConfigInvalidValue {
        key: key.to_string(),
        message: message.to_string(),
    }
}
