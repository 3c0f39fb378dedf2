//! Composition engine
//!
//! Renders a [`StructuredPromptInput`] into the final prompt string for one
//! target model. Each target has its own sentence order and joining rules;
//! timeline flattening, whitespace normalization and the length budget apply
//! to every target alike.
//!
//! Composition is total: unknown targets use the generic composer, empty
//! fields are skipped without leaving punctuation behind, and over-long output
//! is truncated rather than rejected.

use serde_json::Value;
use std::collections::HashSet;

use crate::error::Result;
use crate::models::TargetModel;
use crate::text::{as_sentence, enforce_constraints, normalize_whitespace, truncate_to_budget};
use crate::types::{ComposeConfig, Parameters, Scene, StructuredPromptInput};

/// Style phrases that already describe the camera; such a style stays out of
/// the photographic-details clause
const CAMERA_TERMS: [&str; 4] = ["shot with", "lens", "aperture", "captured with"];

/// Composes prompts with a fixed [`ComposeConfig`]
#[derive(Debug, Clone, Default)]
pub struct Composer {
    config: ComposeConfig,
}

impl Composer {
    pub fn new(config: ComposeConfig) -> Self {
        Self { config }
    }

    /// Like [`Composer::new`], rejecting configs that fail [`ComposeConfig::validate`]
    pub fn try_new(config: ComposeConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &ComposeConfig {
        &self.config
    }

    /// Compose for a raw target model identifier
    pub fn compose(&self, data: &StructuredPromptInput, target_model: &str) -> String {
        self.compose_for(data, TargetModel::from_identifier(target_model))
    }

    /// Compose for a resolved target model
    pub fn compose_for(&self, data: &StructuredPromptInput, model: TargetModel) -> String {
        self.fit(&assemble(data, model), model)
    }

    /// Compose, append a constraints clause, then apply the budget
    ///
    /// The clause follows [`enforce_constraints`]; a prompt that already
    /// mentions constraints is left as composed.
    pub fn compose_enforced(
        &self,
        data: &StructuredPromptInput,
        target_model: &str,
        constraints: Option<&str>,
    ) -> String {
        let model = TargetModel::from_identifier(target_model);
        let enforced = enforce_constraints(&assemble(data, model), constraints);
        self.fit(&enforced, model)
    }

    fn fit(&self, text: &str, model: TargetModel) -> String {
        truncate_to_budget(
            text,
            self.config.budget_for(model),
            self.config.sentence_cut_ratio,
            &self.config.ellipsis,
        )
    }
}

/// Base sentences plus timeline, whitespace-normalized, before the budget
fn assemble(data: &StructuredPromptInput, model: TargetModel) -> String {
    let base = match model {
        TargetModel::Sora => compose_sora(data),
        TargetModel::Veo => compose_veo(data),
        TargetModel::NanoBanana => compose_nano_banana(data),
        TargetModel::Seedream => compose_seedream(data),
        TargetModel::Generic => compose_generic(data),
    };

    let timeline = data.timeline.as_deref().unwrap_or_default();
    normalize_whitespace(&prepend_timeline(timeline, &base))
}

/// Compose `data` for `target_model` with the default configuration
pub fn compose(data: &StructuredPromptInput, target_model: &str) -> String {
    Composer::default().compose(data, target_model)
}

/// Ordered sentence fragments; empty fragments are dropped on push
#[derive(Default)]
struct Sentences(Vec<String>);

impl Sentences {
    fn push(&mut self, fragment: impl AsRef<str>) {
        let fragment = fragment.as_ref().trim();
        if !fragment.is_empty() {
            self.0.push(as_sentence(fragment));
        }
    }

    /// Push `"<label>: <value>"` when `value` is non-empty
    fn labeled(&mut self, label: &str, value: &str) {
        if !value.is_empty() {
            self.push(format!("{label}: {value}"));
        }
    }

    /// Push `"<prefix><moods><suffix>"` when any mood is present
    ///
    /// Repeated tags are rendered once, at their first position.
    fn moods(&mut self, mood: &[String], prefix: &str, suffix: &str) {
        let mut seen = HashSet::new();
        let unique = mood.iter().map(|m| m.trim()).filter(|m| seen.insert(*m));
        let moods = join_non_empty(unique, ", ");
        if !moods.is_empty() {
            self.push(format!("{prefix}{moods}{suffix}"));
        }
    }

    fn finish(self) -> String {
        self.0.join(" ")
    }
}

fn opt(value: &Option<String>) -> &str {
    value.as_deref().map(str::trim).unwrap_or_default()
}

fn join_non_empty<'a>(parts: impl IntoIterator<Item = &'a str>, sep: &str) -> String {
    parts
        .into_iter()
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join(sep)
}

/// "<subject> <action> in <setting>", degrading to whatever is present
fn narrative(subject: &str, action: &str, setting: &str) -> String {
    let head = join_non_empty([subject, action], " ");
    let setting = setting.trim();
    match (head.is_empty(), setting.is_empty()) {
        (_, true) => head,
        (true, false) => setting.to_string(),
        (false, false) => format!("{head} in {setting}"),
    }
}

/// "<lighting> lighting", unless the description already says so
fn lighting_phrase(lighting: &str) -> String {
    let lighting = lighting.trim();
    if lighting.is_empty() || lighting.to_lowercase().ends_with("lighting") {
        lighting.to_string()
    } else {
        format!("{lighting} lighting")
    }
}

fn mentions_camera(style: &str) -> bool {
    let style = style.to_lowercase();
    CAMERA_TERMS.iter().any(|term| style.contains(term))
}

fn compose_sora(data: &StructuredPromptInput) -> String {
    let mut s = Sentences::default();
    s.push(narrative(&data.subject, &data.action, &data.setting));
    s.push(join_non_empty([data.shot_type.as_str(), opt(&data.camera_movement)], " with "));
    s.push(join_non_empty([data.lighting.as_str(), opt(&data.style)], ", "));
    s.push(opt(&data.audio));
    s.moods(&data.mood, "", " atmosphere");
    s.push(opt(&data.constraints));
    s.push(format_parameters(data.parameters.as_ref()));
    s.finish()
}

fn compose_veo(data: &StructuredPromptInput) -> String {
    let mut s = Sentences::default();

    let shot = data.shot_type.trim();
    let lead = join_non_empty([data.subject.as_str(), data.action.as_str()], " ");
    if !shot.is_empty() && !lead.is_empty() {
        s.push(format!("{shot} of {lead}"));
    } else {
        s.push(shot);
        s.push(lead);
    }

    s.push(&data.setting);
    s.push(join_non_empty([opt(&data.style), data.lighting.as_str()], " with "));

    let movement = opt(&data.camera_movement);
    if !movement.is_empty() {
        s.push(format!("Camera {movement}"));
    }
    s.labeled("Audio", opt(&data.audio));
    s.moods(&data.mood, "Mood: ", "");
    s.push(opt(&data.constraints));
    s.finish()
}

fn compose_nano_banana(data: &StructuredPromptInput) -> String {
    let mut s = Sentences::default();

    let subject = data.subject.trim();
    let setting = data.setting.trim();
    let action = data.action.trim();
    if !subject.is_empty() {
        match (setting.is_empty(), action.is_empty()) {
            (false, false) => s.push(format!("{subject} in {setting}, {action}")),
            (false, true) => s.push(format!("{subject} in {setting}")),
            _ => s.push(subject),
        }
    }

    let style = opt(&data.style);
    let camera_style = mentions_camera(style);
    let merged_style = if camera_style { "" } else { style };
    let lighting = lighting_phrase(&data.lighting);
    s.push(join_non_empty(
        [data.shot_type.as_str(), lighting.as_str(), merged_style],
        ", ",
    ));
    if camera_style {
        s.push(style);
    }

    s.push(opt(&data.composition));
    s.moods(&data.mood, "", " atmosphere");
    s.push(format_parameters(data.parameters.as_ref()));
    s.finish()
}

fn compose_seedream(data: &StructuredPromptInput) -> String {
    let mut s = Sentences::default();
    s.push(&data.subject);
    s.push(&data.action);
    s.labeled("Setting", data.setting.trim());
    s.labeled("Style", opt(&data.style));
    s.labeled("Lighting", data.lighting.trim());
    s.labeled("Requirements", opt(&data.constraints));
    s.push(format_parameters(data.parameters.as_ref()));
    s.finish()
}

fn compose_generic(data: &StructuredPromptInput) -> String {
    let mut s = Sentences::default();
    s.push(narrative(&data.subject, &data.action, &data.setting));
    s.push(&data.shot_type);
    let lighting = lighting_phrase(&data.lighting);
    s.push(join_non_empty([opt(&data.style), lighting.as_str()], ", "));
    s.moods(&data.mood, "", " mood");
    s.push(opt(&data.composition));
    s.finish()
}

/// Prepend the timeline to the base prompt
///
/// A single scene contributes its description as a lead sentence; several
/// scenes are labeled with their 1-based index and time span, in input order.
fn prepend_timeline(timeline: &[Scene], base: &str) -> String {
    match timeline {
        [] => base.to_string(),
        [only] => {
            let description = only.description.trim();
            if description.is_empty() {
                base.to_string()
            } else {
                format!("{} {base}", as_sentence(description))
            }
        }
        scenes => {
            let block = scenes
                .iter()
                .enumerate()
                .map(|(i, scene)| {
                    let label = format!("Scene {} ({}-{}s)", i + 1, scene.start, scene.end);
                    match scene.description.trim() {
                        "" => as_sentence(&label),
                        description => as_sentence(&format!("{label}: {description}")),
                    }
                })
                .collect::<Vec<_>>()
                .join(" ");
            format!("{block} {base}")
        }
    }
}

/// Render technical parameters as one comma-joined fragment
///
/// Text passes through verbatim. A map yields `duration`, then
/// `<resolution> resolution`, then `<aspectRatio> aspect ratio`, then the
/// remaining values (keys dropped) in map order; falsy values are skipped.
pub fn format_parameters(params: Option<&Parameters>) -> String {
    let map = match params {
        None => return String::new(),
        Some(Parameters::Text(text)) => return text.trim().to_string(),
        Some(Parameters::Map(map)) => map,
    };

    let mut parts = Vec::new();
    if let Some(duration) = map.get("duration").and_then(param_value) {
        parts.push(duration);
    }
    if let Some(resolution) = map.get("resolution").and_then(param_value) {
        parts.push(format!("{resolution} resolution"));
    }
    if let Some(aspect) = map.get("aspectRatio").and_then(param_value) {
        parts.push(format!("{aspect} aspect ratio"));
    }
    for (key, value) in map {
        if matches!(key.as_str(), "duration" | "resolution" | "aspectRatio") {
            continue;
        }
        if let Some(value) = param_value(value) {
            parts.push(value);
        }
    }
    parts.join(", ")
}

/// Text for a parameter value; `None` for falsy values
fn param_value(value: &Value) -> Option<String> {
    match value {
        Value::Null | Value::Bool(false) => None,
        Value::Bool(true) => Some("true".to_string()),
        Value::Number(n) if n.as_f64() == Some(0.0) => None,
        Value::Number(n) => Some(n.to_string()),
        Value::String(s) => Some(s.trim().to_string()).filter(|s| !s.is_empty()),
        Value::Array(items) => {
            let items: Vec<String> = items.iter().filter_map(param_value).collect();
            Some(items.join(", ")).filter(|s| !s.is_empty())
        }
        Value::Object(obj) if obj.is_empty() => None,
        Value::Object(_) => Some(value.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fox() -> StructuredPromptInput {
        StructuredPromptInput {
            subject: "a fox".to_string(),
            action: "runs".to_string(),
            setting: "a snowy forest".to_string(),
            shot_type: "wide shot".to_string(),
            lighting: "golden hour".to_string(),
            mood: vec!["serene".to_string()],
            ..Default::default()
        }
    }

    fn full() -> StructuredPromptInput {
        StructuredPromptInput {
            camera_movement: Some("slow dolly in".to_string()),
            style: Some("cinematic".to_string()),
            audio: Some("wind through pines".to_string()),
            constraints: Some("no text overlays".to_string()),
            composition: Some("rule of thirds".to_string()),
            mood: vec!["serene".to_string(), "quiet".to_string()],
            parameters: Some(Parameters::from("24fps")),
            ..fox()
        }
    }

    fn params(value: Value) -> Option<Parameters> {
        Some(serde_json::from_value(value).unwrap())
    }

    #[test]
    fn test_sora_fox_example() {
        let out = compose(&fox(), "sora");
        assert_eq!(
            out,
            "a fox runs in a snowy forest. wide shot. golden hour. serene atmosphere."
        );
        assert!(out.chars().count() <= 1400);
    }

    #[test]
    fn test_sora_full_order() {
        let out = compose(&full(), "sora");
        assert_eq!(
            out,
            "a fox runs in a snowy forest. wide shot with slow dolly in. golden hour, cinematic. \
             wind through pines. serene, quiet atmosphere. no text overlays. 24fps."
        );
    }

    #[test]
    fn test_sora_degrades_partial_narrative() {
        let data = StructuredPromptInput {
            action: String::new(),
            ..fox()
        };
        assert!(compose(&data, "sora").starts_with("a fox in a snowy forest. "));

        let data = StructuredPromptInput {
            setting: String::new(),
            ..fox()
        };
        assert!(compose(&data, "sora").starts_with("a fox runs. "));
    }

    #[test]
    fn test_veo_labels_audio_and_mood() {
        let out = compose(&full(), "veo");
        assert_eq!(
            out,
            "wide shot of a fox runs. a snowy forest. cinematic with golden hour. \
             Camera slow dolly in. Audio: wind through pines. Mood: serene, quiet. no text overlays."
        );
    }

    #[test]
    fn test_veo_without_shot_type() {
        let data = StructuredPromptInput {
            shot_type: String::new(),
            ..fox()
        };
        assert!(compose(&data, "veo-3").starts_with("a fox runs. a snowy forest."));
    }

    #[test]
    fn test_nano_banana_merges_plain_style() {
        let out = compose(&full(), "nano-banana");
        assert_eq!(
            out,
            "a fox in a snowy forest, runs. wide shot, golden hour lighting, cinematic. \
             rule of thirds. serene, quiet atmosphere. 24fps."
        );
    }

    #[test]
    fn test_nano_banana_keeps_camera_style_separate() {
        let data = StructuredPromptInput {
            style: Some("Shot with a 35mm Lens at f/1.8".to_string()),
            ..fox()
        };
        let out = compose(&data, "nano_banana");
        assert!(out.contains("wide shot, golden hour lighting. Shot with a 35mm Lens at f/1.8."));
    }

    #[test]
    fn test_nano_banana_narrative_priority() {
        let data = StructuredPromptInput {
            setting: String::new(),
            ..fox()
        };
        assert!(compose(&data, "nano-banana").starts_with("a fox. wide shot"));

        let data = StructuredPromptInput {
            action: String::new(),
            ..fox()
        };
        assert!(compose(&data, "nano-banana").starts_with("a fox in a snowy forest. "));
    }

    #[test]
    fn test_lighting_suffix_not_doubled() {
        let data = StructuredPromptInput {
            lighting: "soft studio lighting".to_string(),
            ..fox()
        };
        assert!(compose(&data, "nano-banana").contains("wide shot, soft studio lighting."));
    }

    #[test]
    fn test_seedream_labeled_sentences() {
        let out = compose(&full(), "seedream");
        assert_eq!(
            out,
            "a fox. runs. Setting: a snowy forest. Style: cinematic. Lighting: golden hour. \
             Requirements: no text overlays. 24fps."
        );
    }

    #[test]
    fn test_generic_fallback() {
        let out = compose(&full(), "midjourney");
        assert_eq!(
            out,
            "a fox runs in a snowy forest. wide shot. cinematic, golden hour lighting. \
             serene, quiet mood. rule of thirds."
        );
    }

    #[test]
    fn test_synonyms_dispatch_identically() {
        let data = full();
        assert_eq!(compose(&data, "nano_banana"), compose(&data, "Nano-Banana"));
        assert_eq!(compose(&data, "SORA"), compose(&data, "sora"));
    }

    #[test]
    fn test_multi_scene_timeline_prefix() {
        let data = StructuredPromptInput {
            timeline: Some(vec![Scene::new(0.0, 5.0, "A"), Scene::new(5.0, 10.0, "B")]),
            ..fox()
        };
        let out = compose(&data, "sora");
        assert_eq!(
            out,
            "Scene 1 (0-5s): A. Scene 2 (5-10s): B. a fox runs in a snowy forest. wide shot. \
             golden hour. serene atmosphere."
        );
    }

    #[test]
    fn test_timeline_keeps_input_order() {
        let data = StructuredPromptInput {
            timeline: Some(vec![Scene::new(5.0, 10.0, "later"), Scene::new(0.0, 2.5, "earlier.")]),
            ..Default::default()
        };
        assert_eq!(
            compose(&data, "veo"),
            "Scene 1 (5-10s): later. Scene 2 (0-2.5s): earlier."
        );
    }

    #[test]
    fn test_scene_terminators_not_doubled() {
        let data = StructuredPromptInput {
            subject: "a door".to_string(),
            timeline: Some(vec![Scene::new(0.0, 5.0, "Who knocks?"), Scene::new(5.0, 9.0, "B")]),
            ..Default::default()
        };
        assert_eq!(
            compose(&data, "generic"),
            "Scene 1 (0-5s): Who knocks? Scene 2 (5-9s): B. a door."
        );

        let data = StructuredPromptInput {
            timeline: Some(vec![Scene::new(0.0, 4.0, "It opens!")]),
            ..data
        };
        assert_eq!(compose(&data, "generic"), "It opens! a door.");
    }

    #[test]
    fn test_repeated_moods_render_once() {
        let data = StructuredPromptInput {
            mood: vec!["serene".to_string(), "quiet".to_string(), " serene ".to_string()],
            ..fox()
        };
        assert!(compose(&data, "sora").ends_with("serene, quiet atmosphere."));
        assert!(compose(&data, "veo").ends_with("Mood: serene, quiet."));
    }

    #[test]
    fn test_single_scene_shortcut() {
        let data = StructuredPromptInput {
            timeline: Some(vec![Scene::new(2.0, 9.0, "Only scene")]),
            ..fox()
        };
        let out = compose(&data, "sora");
        assert!(out.starts_with("Only scene. a fox runs"));
        assert!(!out.contains("Scene 1"));
    }

    #[test]
    fn test_timeline_applies_to_every_model() {
        let data = StructuredPromptInput {
            timeline: Some(vec![Scene::new(2.0, 9.0, "Only scene")]),
            ..fox()
        };
        for model in ["sora", "veo", "nano-banana", "seedream", "unknown"] {
            assert!(compose(&data, model).starts_with("Only scene. "), "{model}");
        }
    }

    #[test]
    fn test_empty_input_composes_to_empty_string() {
        let data = StructuredPromptInput {
            timeline: Some(Vec::new()),
            mood: vec![String::new(), "  ".to_string()],
            parameters: params(json!({"duration": null, "fps": 0, "hdr": false})),
            ..Default::default()
        };
        for model in ["sora", "veo", "nano-banana", "seedream", "other"] {
            assert_eq!(compose(&StructuredPromptInput::default(), model), "");
            assert_eq!(compose(&data, model), "", "{model}");
        }
    }

    #[test]
    fn test_parameter_map_priority_and_order() {
        let data = StructuredPromptInput {
            subject: "a fox".to_string(),
            parameters: params(json!({
                "fps": 24,
                "aspectRatio": "16:9",
                "seed": "",
                "resolution": "4k",
                "grain": "light film grain",
                "duration": "8s",
                "loop": false
            })),
            ..Default::default()
        };
        assert_eq!(
            compose(&data, "sora"),
            "a fox. 8s, 4k resolution, 16:9 aspect ratio, 24, light film grain."
        );
    }

    #[test]
    fn test_parameter_text_is_verbatim() {
        let text = Parameters::from("  shot on 35mm, 24fps ");
        assert_eq!(format_parameters(Some(&text)), "shot on 35mm, 24fps");
        assert_eq!(format_parameters(None), "");
    }

    #[test]
    fn test_whitespace_is_normalized() {
        let data = StructuredPromptInput {
            subject: "  a \n fox ".to_string(),
            action: "runs\t\tfast".to_string(),
            ..Default::default()
        };
        assert_eq!(compose(&data, "generic"), "a fox runs fast.");
    }

    #[test]
    fn test_output_never_exceeds_budget() {
        let long = "word ".repeat(600);
        let data = StructuredPromptInput {
            subject: long.clone(),
            setting: long.clone(),
            action: long.clone(),
            lighting: long.clone(),
            audio: Some(long.clone()),
            timeline: Some(vec![Scene::new(0.0, 5.0, long.clone()), Scene::new(5.0, 9.0, long)]),
            ..fox()
        };
        for (model, budget) in [
            ("sora", 1400),
            ("veo", 1400),
            ("nano-banana", 1000),
            ("seedream", 1000),
            ("whatever", 1000),
        ] {
            let out = compose(&data, model);
            assert!(out.chars().count() <= budget, "{model}: {}", out.chars().count());
            assert!(out.ends_with("...") || out.ends_with('.'), "{model}");
        }
    }

    #[test]
    fn test_custom_config_budget() {
        let composer = Composer::new(ComposeConfig::new().with_motion_budget(40));
        let out = composer.compose(&fox(), "sora");
        assert!(out.chars().count() <= 40);
        assert_eq!(out, "a fox runs in a snowy forest. wide shot.");
    }

    #[test]
    fn test_tiny_budget_never_exceeded() {
        let data = StructuredPromptInput {
            subject: "a fox runs".to_string(),
            ..Default::default()
        };
        let composer = Composer::new(ComposeConfig::new().with_still_budget(2));
        let out = composer.compose(&data, "generic");
        assert!(out.chars().count() <= 2, "{out:?}");

        assert!(Composer::try_new(ComposeConfig::new().with_still_budget(2)).is_err());
        assert!(Composer::try_new(ComposeConfig::default()).is_ok());
    }

    #[test]
    fn test_compose_enforced_appends_clause_within_budget() {
        let composer = Composer::default();
        let out = composer.compose_enforced(&fox(), "sora", Some("no text overlays"));
        assert_eq!(
            out,
            "a fox runs in a snowy forest. wide shot. golden hour. serene atmosphere. \
             Constraints: no text overlays."
        );

        let long = StructuredPromptInput {
            subject: "word ".repeat(400),
            ..fox()
        };
        let out = composer.compose_enforced(&long, "seedream", None);
        assert!(out.chars().count() <= 1000);
    }

    #[test]
    fn test_input_is_not_mutated() {
        let data = full();
        let before = data.clone();
        let _ = compose(&data, "veo");
        assert_eq!(data, before);
    }

    #[test]
    fn test_parallel_composition_is_deterministic() {
        let data = full();
        let expected = compose(&data, "sora");
        std::thread::scope(|scope| {
            let handles: Vec<_> = (0..8)
                .map(|_| scope.spawn(|| compose(&data, "sora")))
                .collect();
            for handle in handles {
                assert_eq!(handle.join().unwrap(), expected);
            }
        });
    }
}
