//! Target model identification
//!
//! The closed set of downstream generators this crate composes for. Lookup is
//! total: anything that does not fold onto a known family becomes
//! [`TargetModel::Generic`]. Callers that want to reject unknown identifiers
//! use the strict [`FromStr`] impl instead.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::PromptError;

/// Character budget for motion-capable (video) targets
pub const MOTION_BUDGET: usize = 1400;

/// Character budget for still-image targets and the generic fallback
pub const STILL_BUDGET: usize = 1000;

/// Downstream generative model a prompt is composed for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum TargetModel {
    /// OpenAI Sora - cinematic video narration
    Sora,
    /// Google Veo - video with first-class audio
    Veo,
    /// Gemini image ("nano-banana") - photographic narrative stills
    NanoBanana,
    /// ByteDance Seedream - precise, labeled edit instructions
    Seedream,
    /// Anything else
    #[default]
    Generic,
}

impl TargetModel {
    /// Models with a dedicated composer and strategy entry
    pub const SUPPORTED: [TargetModel; 4] = [
        TargetModel::Sora,
        TargetModel::Veo,
        TargetModel::NanoBanana,
        TargetModel::Seedream,
    ];

    /// Resolve an identifier, falling back to [`TargetModel::Generic`]
    pub fn from_identifier(id: &str) -> Self {
        match Self::lookup(id) {
            Some(model) => model,
            None => {
                tracing::debug!(target_model = id, "unknown target model, using generic composer");
                TargetModel::Generic
            }
        }
    }

    /// Fold an identifier onto a known family
    ///
    /// `None` when the identifier names none of the supported families.
    pub fn lookup(id: &str) -> Option<Self> {
        let id = normalize_identifier(id);
        let model = match id.as_str() {
            "nano-banana" | "nanobanana" | "gemini-image" | "gemini-flash-image"
            | "gemini-2.5-flash-image" | "gemini-2.5-flash-image-preview" => {
                TargetModel::NanoBanana
            }
            "seededit" => TargetModel::Seedream,
            "generic" | "default" => TargetModel::Generic,
            s if s.starts_with("sora") => TargetModel::Sora,
            s if s.starts_with("veo") => TargetModel::Veo,
            s if s.starts_with("nano-banana") => TargetModel::NanoBanana,
            s if s.starts_with("seedream") => TargetModel::Seedream,
            _ => return None,
        };
        Some(model)
    }

    /// Canonical identifier
    pub fn as_str(&self) -> &'static str {
        match self {
            TargetModel::Sora => "sora",
            TargetModel::Veo => "veo",
            TargetModel::NanoBanana => "nano-banana",
            TargetModel::Seedream => "seedream",
            TargetModel::Generic => "generic",
        }
    }

    /// Human-readable name
    pub fn display_name(&self) -> &'static str {
        match self {
            TargetModel::Sora => "Sora",
            TargetModel::Veo => "Veo",
            TargetModel::NanoBanana => "Nano Banana",
            TargetModel::Seedream => "Seedream",
            TargetModel::Generic => "Generic",
        }
    }

    /// Whether the target renders motion (video) rather than stills
    pub fn is_motion(&self) -> bool {
        matches!(self, TargetModel::Sora | TargetModel::Veo)
    }

    /// Default character budget for prompts aimed at this model
    pub fn budget(&self) -> usize {
        if self.is_motion() {
            MOTION_BUDGET
        } else {
            STILL_BUDGET
        }
    }
}

impl fmt::Display for TargetModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for TargetModel {
    type Err = PromptError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::lookup(s).ok_or_else(|| PromptError::UnsupportedModel(s.to_string()))
    }
}

/// Lower-case, trim, and fold `_` and whitespace runs to `-`
pub(crate) fn normalize_identifier(id: &str) -> String {
    id.trim()
        .to_lowercase()
        .split(|c: char| c == '_' || c.is_whitespace())
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}
