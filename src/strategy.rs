//! Strategy table
//!
//! Maps a target model and an optional style tag onto the tuning used by the
//! upstream call that produces structured data. Resolution is a pure lookup:
//! style entry, then the model's default entry, then the global default.

use serde::{Deserialize, Serialize};

use crate::models::{normalize_identifier, TargetModel};
use crate::prompts::build_system_prompt;

/// Selects the instruction text for the structuring call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SystemPromptTemplate {
    Cinematic,
    AudioVisual,
    Photographic,
    PrecisionEdit,
    Generic,
}

impl SystemPromptTemplate {
    pub const ALL: [SystemPromptTemplate; 5] = [
        SystemPromptTemplate::Cinematic,
        SystemPromptTemplate::AudioVisual,
        SystemPromptTemplate::Photographic,
        SystemPromptTemplate::PrecisionEdit,
        SystemPromptTemplate::Generic,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SystemPromptTemplate::Cinematic => "cinematic",
            SystemPromptTemplate::AudioVisual => "audio_visual",
            SystemPromptTemplate::Photographic => "photographic",
            SystemPromptTemplate::PrecisionEdit => "precision_edit",
            SystemPromptTemplate::Generic => "generic",
        }
    }
}

/// Generation tuning for the structuring call
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Strategy {
    pub template: SystemPromptTemplate,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl Strategy {
    const fn new(template: SystemPromptTemplate, temperature: f32, max_tokens: u32) -> Self {
        Self {
            template,
            temperature,
            max_tokens,
        }
    }

    /// Full instruction text of the selected template
    pub fn system_prompt(&self) -> String {
        build_system_prompt(self.template)
    }
}

/// Used for unknown target models
pub const GLOBAL_DEFAULT: Strategy = Strategy::new(SystemPromptTemplate::Generic, 0.7, 1000);

/// (style tag, strategy) overrides per model; the first row is the model default
type StyleTable = &'static [(&'static str, Strategy)];

const SORA: StyleTable = &[
    ("default", Strategy::new(SystemPromptTemplate::Cinematic, 0.7, 1200)),
    ("cinematic", Strategy::new(SystemPromptTemplate::Cinematic, 0.7, 1200)),
    ("anime", Strategy::new(SystemPromptTemplate::Cinematic, 0.85, 1200)),
    ("documentary", Strategy::new(SystemPromptTemplate::Cinematic, 0.5, 1000)),
    ("surreal", Strategy::new(SystemPromptTemplate::Cinematic, 0.9, 1200)),
];

const VEO: StyleTable = &[
    ("default", Strategy::new(SystemPromptTemplate::AudioVisual, 0.7, 1200)),
    ("cinematic", Strategy::new(SystemPromptTemplate::AudioVisual, 0.6, 1200)),
    ("music-video", Strategy::new(SystemPromptTemplate::AudioVisual, 0.85, 1200)),
    ("documentary", Strategy::new(SystemPromptTemplate::AudioVisual, 0.5, 1000)),
];

const NANO_BANANA: StyleTable = &[
    ("default", Strategy::new(SystemPromptTemplate::Photographic, 0.6, 900)),
    ("photorealistic", Strategy::new(SystemPromptTemplate::Photographic, 0.5, 900)),
    ("portrait", Strategy::new(SystemPromptTemplate::Photographic, 0.5, 800)),
    ("product", Strategy::new(SystemPromptTemplate::Photographic, 0.4, 800)),
    ("surreal", Strategy::new(SystemPromptTemplate::Photographic, 0.9, 900)),
];

const SEEDREAM: StyleTable = &[
    ("default", Strategy::new(SystemPromptTemplate::PrecisionEdit, 0.3, 700)),
    ("edit", Strategy::new(SystemPromptTemplate::PrecisionEdit, 0.2, 600)),
    ("creative", Strategy::new(SystemPromptTemplate::PrecisionEdit, 0.6, 800)),
];

const GENERIC: StyleTable = &[("default", GLOBAL_DEFAULT)];

fn style_table(model: TargetModel) -> StyleTable {
    match model {
        TargetModel::Sora => SORA,
        TargetModel::Veo => VEO,
        TargetModel::NanoBanana => NANO_BANANA,
        TargetModel::Seedream => SEEDREAM,
        TargetModel::Generic => GENERIC,
    }
}

/// Resolve tuning for a typed target model
pub fn strategy_for(model: TargetModel, style: &str) -> Strategy {
    let table = style_table(model);
    let style = normalize_identifier(style);

    if let Some((_, strategy)) = table.iter().find(|(tag, _)| *tag == style) {
        return *strategy;
    }
    if !style.is_empty() {
        tracing::debug!(%model, style = %style, "no style entry, using model default");
    }
    table.first().map(|(_, s)| *s).unwrap_or(GLOBAL_DEFAULT)
}

/// Resolve tuning for a raw target model identifier
///
/// Never fails: unknown models resolve to [`GLOBAL_DEFAULT`].
pub fn resolve_strategy(target_model: &str, style: &str) -> Strategy {
    strategy_for(TargetModel::from_identifier(target_model), style)
}

/// Style tags with a dedicated entry for `model` (excluding the default row)
pub fn known_styles(model: TargetModel) -> impl Iterator<Item = &'static str> {
    style_table(model).iter().skip(1).map(|(tag, _)| *tag)
}
