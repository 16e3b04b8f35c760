//! Turns the studio's portrait choices into model prompts.

use crate::models::PortraitFields;

const SUBJECT: &str = "a highly photorealistic portrait";
const REALISM_HINTS: &str =
    "ultra-detailed skin texture, realistic lighting, natural tones, shallow depth of field, 4k";
const QUALITY_HINTS: &str = "95% photorealistic, cinematic quality";

pub const NEGATIVE_PROMPT: &str = "cartoon, illustration, cgi, plastic skin, over-saturated, low-res, blurry, deformed, extra fingers, bad anatomy, artifacts, watermark, text, logo";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuiltPrompt {
    pub positive: String,
    pub negative: String,
}

fn trimmed(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

pub fn build_prompt(fields: &PortraitFields) -> BuiltPrompt {
    let mut parts = Vec::new();

    let mut subject = SUBJECT.to_string();
    if let Some(gender) = trimmed(fields.gender.as_deref()) {
        subject.push_str(&format!(" of a {}", gender));
    }
    parts.push(subject);

    for (label, value) in fields.details() {
        if let Some(value) = trimmed(value) {
            parts.push(format!("{}: {}", label, value));
        }
    }

    // Kept subtle so the result stays a portrait.
    if let Some(animal) = trimmed(fields.animal.as_deref()) {
        parts.push(format!("subtle {} motif integrated tastefully", animal));
    }

    parts.push(REALISM_HINTS.to_string());
    parts.push(QUALITY_HINTS.to_string());

    BuiltPrompt {
        positive: parts.join(", "),
        negative: NEGATIVE_PROMPT.to_string(),
    }
}
