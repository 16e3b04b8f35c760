pub mod client;
pub mod output;

use crate::{
    config::ReplicateConfig,
    error::Result,
    models::{FilePart, PortraitRequest},
    prompt::BuiltPrompt,
};
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde_json::{json, Value};

pub use client::ReplicateClient;
pub use output::image_url;

/// Runs one model prediction and returns its raw output.
#[async_trait]
pub trait ImageGenerator: Send + Sync {
    async fn run(&self, model: &str, input: Value) -> Result<Value>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationMode {
    TextToImage,
    ImageToImage,
}

/// A model id plus the input object to send it.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationJob {
    pub mode: GenerationMode,
    pub model: String,
    pub input: Value,
}

impl GenerationJob {
    /// Image-to-image only when a reference image was uploaded and a model for it is
    /// configured; text-to-image otherwise.
    ///
    /// The negative prompt is not sent: models name it differently and unknown inputs
    /// get rejected.
    pub fn plan(request: &PortraitRequest, prompt: &BuiltPrompt, config: &ReplicateConfig) -> Self {
        let mut input = json!({ "prompt": prompt.positive });
        if let Some(seed) = request.fields.seed_value() {
            input["seed"] = json!(seed);
        }

        match (&request.reference_image, &config.image_to_image_model) {
            (Some(image), Some(model)) if request.has_reference_image() => {
                input["image"] = json!(data_uri(image));
                GenerationJob {
                    mode: GenerationMode::ImageToImage,
                    model: model.clone(),
                    input,
                }
            }
            _ => GenerationJob {
                mode: GenerationMode::TextToImage,
                model: config.model.clone(),
                input,
            },
        }
    }
}

/// Inline file input accepted by Replicate in place of an uploaded file URL.
pub fn data_uri(file: &FilePart) -> String {
    let mime = file.mime_type.as_deref().unwrap_or("application/octet-stream");
    format!("data:{};base64,{}", mime, STANDARD.encode(&file.bytes))
}
