use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::time::Duration;

use crate::error::{PromptError, Result};
use crate::models::{TargetModel, MOTION_BUDGET, STILL_BUDGET};
use crate::strategy::Strategy;

/// Structured description of a requested generation
///
/// The intermediate representation between "what to depict" and "how to
/// phrase it for model X". Every field is optional on the wire so partial
/// model output still deserializes; `null` reads as empty.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct StructuredPromptInput {
    #[serde(deserialize_with = "null_as_default")]
    pub subject: String,
    #[serde(deserialize_with = "null_as_default")]
    pub setting: String,
    #[serde(deserialize_with = "null_as_default")]
    pub action: String,
    #[serde(deserialize_with = "null_as_default")]
    pub shot_type: String,
    pub camera_movement: Option<String>,
    /// May already carry photographic phrasing ("shot with a 35mm lens")
    pub style: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub lighting: String,
    pub audio: Option<String>,
    pub timeline: Option<Vec<Scene>>,
    pub constraints: Option<String>,
    pub composition: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub mood: Vec<String>,
    pub parameters: Option<Parameters>,
}

/// Timestamped fragment of a multi-scene timeline
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Scene {
    /// Seconds
    pub start: f64,
    /// Seconds
    pub end: f64,
    #[serde(default)]
    pub description: String,
}

impl Scene {
    pub fn new(start: f64, end: f64, description: impl Into<String>) -> Self {
        Self {
            start,
            end,
            description: description.into(),
        }
    }
}

/// Free-form technical parameters: a pre-formatted sentence or a keyed map
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum Parameters {
    Text(String),
    Map(Map<String, Value>),
}

impl From<String> for Parameters {
    fn from(s: String) -> Self {
        Parameters::Text(s)
    }
}

impl From<&str> for Parameters {
    fn from(s: &str) -> Self {
        Parameters::Text(s.to_string())
    }
}

impl From<Map<String, Value>> for Parameters {
    fn from(m: Map<String, Value>) -> Self {
        Parameters::Map(m)
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Token usage statistics
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Usage {
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub total_tokens: u64,
}

impl Usage {
    pub fn new(input: u64, output: u64) -> Self {
        Self {
            input_tokens: input,
            output_tokens: output,
            total_tokens: input + output,
        }
    }
}

/// Result of the full idea -> structure -> prompt pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratedPrompt {
    pub target_model: TargetModel,
    pub strategy: Strategy,
    pub structured: StructuredPromptInput,
    pub prompt: String,
    pub usage: Usage,
    #[serde(with = "humantime_serde")]
    pub execution_time: Duration,
}

/// Composition tuning
#[derive(Debug, Clone, PartialEq)]
pub struct ComposeConfig {
    /// Budget for motion (video) targets
    pub motion_budget: usize,
    /// Budget for still-image targets and the generic fallback
    pub still_budget: usize,
    /// Fraction of the budget a sentence cut must reach to be preferred
    /// over a hard cut
    pub sentence_cut_ratio: f64,
    /// Appended after a hard cut
    pub ellipsis: String,
}

impl Default for ComposeConfig {
    fn default() -> Self {
        Self {
            motion_budget: MOTION_BUDGET,
            still_budget: STILL_BUDGET,
            sentence_cut_ratio: 0.8,
            ellipsis: "...".to_string(),
        }
    }
}

impl ComposeConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_motion_budget(mut self, n: usize) -> Self {
        self.motion_budget = n;
        self
    }

    pub fn with_still_budget(mut self, n: usize) -> Self {
        self.still_budget = n;
        self
    }

    pub fn with_sentence_cut_ratio(mut self, ratio: f64) -> Self {
        self.sentence_cut_ratio = ratio;
        self
    }

    pub fn with_ellipsis(mut self, marker: impl Into<String>) -> Self {
        self.ellipsis = marker.into();
        self
    }

    /// Budget for a given target
    pub fn budget_for(&self, model: TargetModel) -> usize {
        if model.is_motion() {
            self.motion_budget
        } else {
            self.still_budget
        }
    }

    /// Reject settings the truncation policy cannot honor
    pub fn validate(&self) -> Result<()> {
        let marker_len = self.ellipsis.chars().count();
        for (name, budget) in [("motion_budget", self.motion_budget), ("still_budget", self.still_budget)] {
            if budget == 0 {
                return Err(PromptError::Config(format!("{name} must be positive")));
            }
            if budget <= marker_len {
                return Err(PromptError::Config(format!(
                    "{name} ({budget}) must exceed the ellipsis length ({marker_len})"
                )));
            }
        }
        if !(self.sentence_cut_ratio > 0.0 && self.sentence_cut_ratio <= 1.0) {
            return Err(PromptError::Config(format!(
                "sentence_cut_ratio must be in (0, 1], got {}",
                self.sentence_cut_ratio
            )));
        }
        Ok(())
    }
}

/// Configuration for the upstream structuring call
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    /// Chat model that turns an idea into structured fields
    pub model: String,
    pub compose: ComposeConfig,
    pub verbose: bool,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            model: "gpt-4o".to_string(),
            compose: ComposeConfig::default(),
            verbose: false,
        }
    }
}

impl GeneratorConfig {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            ..Default::default()
        }
    }

    pub fn with_compose(mut self, compose: ComposeConfig) -> Self {
        self.compose = compose;
        self
    }

    pub fn with_verbose(mut self, v: bool) -> Self {
        self.verbose = v;
        self
    }
}

/// humantime_serde module for Duration serialization
mod humantime_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&format!("{:?}", duration))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        // Debug output ends in "s", "ms", "µs" or "ns"
        let (value, per_sec) = if let Some(v) = s.strip_suffix("ms") {
            (v, 1e3)
        } else if let Some(v) = s.strip_suffix("µs") {
            (v, 1e6)
        } else if let Some(v) = s.strip_suffix("ns") {
            (v, 1e9)
        } else {
            (s.trim_end_matches('s'), 1.0)
        };
        let value: f64 = value.parse().map_err(serde::de::Error::custom)?;
        Ok(Duration::from_secs_f64(value / per_sec))
    }
}
