use serde::{Deserialize, Serialize};

/// Configuration for the skill_exchange module
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SkillExchangeConfig {
    /// HMAC key for session tokens. Empty means a per-process random key.
    #[serde(default)]
    pub session_secret: String,
    #[serde(default = "default_token_ttl_secs")]
    pub token_ttl_secs: u64,
    #[serde(default = "default_max_name_length")]
    pub max_name_length: usize,
    #[serde(default = "default_max_skill_length")]
    pub max_skill_length: usize,
    #[serde(default = "default_max_message_length")]
    pub max_message_length: usize,
    /// Only users with an accepted pairing may rate each other.
    #[serde(default)]
    pub require_pairing_for_rating: bool,
}

impl Default for SkillExchangeConfig {
    fn default() -> Self {
        Self {
            session_secret: String::new(),
            token_ttl_secs: default_token_ttl_secs(),
            max_name_length: default_max_name_length(),
            max_skill_length: default_max_skill_length(),
            max_message_length: default_max_message_length(),
            require_pairing_for_rating: false,
        }
    }
}

fn default_token_ttl_secs() -> u64 {
    7 * 24 * 60 * 60
}

fn default_max_name_length() -> usize {
    100
}

fn default_max_skill_length() -> usize {
    200
}

fn default_max_message_length() -> usize {
    4000
}
