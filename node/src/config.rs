//! Election configuration with TOML file support.

use serde::{Deserialize, Serialize};

use ballot_auth::RegistrationPolicy;
use ballot_work::WorkDifficulty;

use crate::logging::LogFormat;
use crate::NodeError;

/// Configuration for an election service.
///
/// Can be loaded from a TOML file via [`ElectionConfig::from_toml_file`] or
/// built programmatically (e.g. for tests).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElectionConfig {
    /// Candidate slate, in menu order.
    #[serde(default = "default_candidates")]
    pub candidates: Vec<String>,

    /// Leading zero hex characters required of every block digest.
    #[serde(default = "default_work_difficulty")]
    pub work_difficulty: u32,

    /// Account name that may read the full transaction list.
    #[serde(default = "default_admin_account")]
    pub admin_account: String,

    /// Admin password. Admin login is disabled when unset.
    #[serde(default)]
    pub admin_password: Option<String>,

    /// Behaviour when a voter id registers a second time.
    #[serde(default)]
    pub registration_policy: RegistrationPolicy,

    /// Log format: "human" or "json".
    #[serde(default)]
    pub log_format: LogFormat,

    /// Log level filter: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_candidates() -> Vec<String> {
    vec![
        "Candidate A".to_string(),
        "Candidate B".to_string(),
        "Candidate C".to_string(),
    ]
}

fn default_work_difficulty() -> u32 {
    WorkDifficulty::DEFAULT.leading_zeros()
}

fn default_admin_account() -> String {
    "admin".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

// ── Impl ───────────────────────────────────────────────────────────────

impl ElectionConfig {
    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: &str) -> Result<Self, NodeError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| NodeError::Config(e.to_string()))?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, NodeError> {
        toml::from_str(s).map_err(|e| NodeError::Config(e.to_string()))
    }

    /// Serialize the configuration to a TOML string.
    pub fn to_toml_string(&self) -> Result<String, NodeError> {
        toml::to_string_pretty(self).map_err(|e| NodeError::Config(e.to_string()))
    }

    /// The configured difficulty, range-checked.
    pub fn work_difficulty(&self) -> Result<WorkDifficulty, NodeError> {
        WorkDifficulty::new(self.work_difficulty).map_err(|e| NodeError::Config(e.to_string()))
    }
}

impl Default for ElectionConfig {
    fn default() -> Self {
        Self {
            candidates: default_candidates(),
            work_difficulty: default_work_difficulty(),
            admin_account: default_admin_account(),
            admin_password: None,
            registration_policy: RegistrationPolicy::default(),
            log_format: LogFormat::default(),
            log_level: default_log_level(),
        }
    }
}
