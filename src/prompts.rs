use crate::strategy::SystemPromptTemplate;

/// Field contract shared by every structuring template
const FIELD_CONTRACT: &str = r#"Respond with a single JSON object and nothing else. Use exactly these keys:
- "subject": who or what the generation is about
- "setting": environment or location
- "action": what the subject is doing
- "shotType": camera framing, e.g. "close-up", "wide shot"
- "cameraMovement": camera motion, or null
- "style": visual style, or null
- "lighting": lighting description
- "audio": sound description, or null
- "timeline": array of {"start": seconds, "end": seconds, "description": text} in narrative order, or null
- "constraints": technical or physical constraints, or null
- "composition": compositional notes, or null
- "mood": array of short mood words
- "parameters": object with optional "duration", "resolution", "aspectRatio" and other technical values

Leave a field empty rather than inventing details the idea does not support."#;

/// Build the system prompt for the structuring call
pub fn build_system_prompt(template: SystemPromptTemplate) -> String {
    let guidance = match template {
        SystemPromptTemplate::Cinematic => {
            "You are a cinematographer breaking a video idea into shot elements for a text-to-video model that responds to cinematic narration. \
Describe subject, action and setting concretely. Give the shot a clear framing and, where it helps, a camera move. \
Describe lighting the way a director of photography would. Sound matters: describe ambient audio, effects and dialogue tone. \
For clips longer than one beat, split the action into a timeline of scenes with start and end times in seconds."
        }
        SystemPromptTemplate::AudioVisual => {
            "You are a director planning a short video for a model that generates picture and synchronized sound together. \
Lead with the framing, then subject and action. Treat audio as a first-class element: name dialogue, sound effects and ambience explicitly. \
Keep the camera movement to one simple, physically plausible move. Keep mood words short."
        }
        SystemPromptTemplate::Photographic => {
            "You are a photographer describing a single still image for an image model that follows photographic narrative prompts. \
Write the subject, setting and action as one scene. Give framing and lighting in photographic terms; a style may name camera body, lens or film stock. \
Add composition notes (rule of thirds, leading lines, negative space) when they strengthen the image. The image is a still: omit camera movement, audio and timeline."
        }
        SystemPromptTemplate::PrecisionEdit => {
            "You are preparing precise instructions for an image generation and editing model that favors short, literal statements. \
Keep each field to a brief phrase. State the subject and action plainly, then setting, style and lighting. \
Put every hard requirement (what must stay unchanged, text to render, exact colors) in constraints. Omit camera movement, audio and timeline."
        }
        SystemPromptTemplate::Generic => {
            "You are turning a creative idea into a structured description for an image or video generation model. \
Describe subject, action and setting clearly, then framing, style and lighting, then mood."
        }
    };

    format!("{guidance}\n\n{FIELD_CONTRACT}")
}

/// Build the user turn carrying the idea
pub fn build_user_prompt(idea: &str, style: &str) -> String {
    let style = style.trim();
    if style.is_empty() {
        format!("Idea: {}", idea.trim())
    } else {
        format!("Idea: {}\nRequested style: {}", idea.trim(), style)
    }
}
