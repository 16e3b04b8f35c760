use super::form::{FilePart, FormState, FormValue};
use serde::{Deserialize, Serialize};

pub const REFERENCE_IMAGE_FIELD: &str = "reference_image";

/// The studio's portrait choices. Every field is optional free text.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PortraitFields {
    pub gender: Option<String>,
    pub animal: Option<String>,
    pub expression: Option<String>,
    pub pose: Option<String>,
    pub outfit: Option<String>,
    pub lighting: Option<String>,
    pub camera: Option<String>,
    pub mood: Option<String>,
    pub background: Option<String>,
    pub seed: Option<String>,
}

impl PortraitFields {
    /// Stores a named text field. Unknown names are ignored and reported with `false`.
    pub fn set(&mut self, name: &str, value: impl Into<String>) -> bool {
        let slot = match name {
            "gender" => &mut self.gender,
            "animal" => &mut self.animal,
            "expression" => &mut self.expression,
            "pose" => &mut self.pose,
            "outfit" => &mut self.outfit,
            "lighting" => &mut self.lighting,
            "camera" => &mut self.camera,
            "mood" => &mut self.mood,
            "background" => &mut self.background,
            "seed" => &mut self.seed,
            _ => return false,
        };
        *slot = Some(value.into());
        true
    }

    /// Optional detail segments in prompt order.
    pub fn details(&self) -> [(&'static str, Option<&str>); 7] {
        [
            ("expression", self.expression.as_deref()),
            ("pose", self.pose.as_deref()),
            ("outfit", self.outfit.as_deref()),
            ("lighting", self.lighting.as_deref()),
            ("camera", self.camera.as_deref()),
            ("mood", self.mood.as_deref()),
            ("background", self.background.as_deref()),
        ]
    }

    /// The seed as an integer; blank or unparsable seeds are dropped.
    pub fn seed_value(&self) -> Option<i64> {
        self.seed.as_deref().and_then(|s| s.trim().parse().ok())
    }
}

/// A parsed `/api/generate` submission.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PortraitRequest {
    pub fields: PortraitFields,
    pub reference_image: Option<FilePart>,
}

impl PortraitRequest {
    pub fn from_form(form: &FormState) -> Self {
        let mut request = Self::default();
        for (name, value) in form.fields() {
            match value {
                FormValue::Text(text) => {
                    request.fields.set(name, text.clone());
                }
                FormValue::File(file) if name == REFERENCE_IMAGE_FIELD => {
                    request.reference_image = Some(file.clone());
                }
                FormValue::File(_) => {}
            }
        }
        request
    }

    pub fn has_reference_image(&self) -> bool {
        self.reference_image
            .as_ref()
            .map_or(false, |file| !file.bytes.is_empty())
    }
}
