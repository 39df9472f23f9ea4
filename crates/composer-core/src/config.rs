use serde::{Deserialize, Serialize};

use crate::core::EditorConfig;
use crate::session::ComposerError;

pub const DEFAULT_CHARACTER_LIMIT: usize = 300;
pub const DEFAULT_TRIGGER: char = '@';
pub const DEFAULT_MAX_CANDIDATES: usize = 10;
pub const DEFAULT_MAX_NORMALIZE_ITERATIONS: usize = 100;

/// Settings of one composer. Missing fields take their defaults, and zero
/// values are treated as missing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComposerConfig {
    pub character_limit: usize,
    pub trigger: char,
    pub max_candidates: usize,
    pub max_normalize_iterations: usize,
}

impl Default for ComposerConfig {
    fn default() -> Self {
        Self {
            character_limit: DEFAULT_CHARACTER_LIMIT,
            trigger: DEFAULT_TRIGGER,
            max_candidates: DEFAULT_MAX_CANDIDATES,
            max_normalize_iterations: DEFAULT_MAX_NORMALIZE_ITERATIONS,
        }
    }
}

impl ComposerConfig {
    pub fn with_defaults(mut self) -> Self {
        if self.character_limit == 0 {
            self.character_limit = DEFAULT_CHARACTER_LIMIT;
        }
        if self.trigger.is_whitespace() || self.trigger.is_control() {
            self.trigger = DEFAULT_TRIGGER;
        }
        if self.max_candidates == 0 {
            self.max_candidates = DEFAULT_MAX_CANDIDATES;
        }
        if self.max_normalize_iterations == 0 {
            self.max_normalize_iterations = DEFAULT_MAX_NORMALIZE_ITERATIONS;
        }
        self
    }

    pub fn with_character_limit(mut self, character_limit: usize) -> Self {
        self.character_limit = character_limit;
        self.with_defaults()
    }

    pub fn from_json_str(s: &str) -> Result<Self, ComposerError> {
        let config: Self = serde_json::from_str(s)?;
        Ok(config.with_defaults())
    }

    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub(crate) fn editor_config(&self) -> EditorConfig {
        EditorConfig {
            max_normalize_iterations: self.max_normalize_iterations,
        }
    }
}
