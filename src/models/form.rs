use crate::error::{Result, StudioError};
use reqwest::multipart::{Form, Part};
use std::path::Path;

/// An uploaded file as the form holds it.
#[derive(Debug, Clone, PartialEq)]
pub struct FilePart {
    pub file_name: String,
    pub mime_type: Option<String>,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FormValue {
    Text(String),
    File(FilePart),
}

/// Snapshot of the studio form's fields, in declaration order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormState {
    fields: Vec<(String, FormValue)>,
}

impl FormState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_text(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.push((name.into(), FormValue::Text(value.into())));
        self
    }

    pub fn with_file(mut self, name: impl Into<String>, file: FilePart) -> Self {
        self.fields.push((name.into(), FormValue::File(file)));
        self
    }

    /// Reads `path` and appends it as a file field.
    pub async fn with_file_path(
        self,
        name: impl Into<String>,
        path: impl AsRef<Path>,
    ) -> Result<Self> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("upload")
            .to_string();
        let mime_type = mime_for_path(path).map(String::from);

        Ok(self.with_file(
            name,
            FilePart {
                file_name,
                mime_type,
                bytes,
            },
        ))
    }

    /// Parses a `name=value` pair as given on the command line.
    pub fn parse_pair(pair: &str) -> Result<(String, String)> {
        let (name, value) = pair
            .split_once('=')
            .ok_or_else(|| {
                StudioError::InvalidForm(format!("expected name=value, got '{}'", pair))
            })?;
        let name = name.trim();
        if name.is_empty() {
            return Err(StudioError::InvalidForm(format!("empty field name in '{}'", pair)));
        }
        Ok((name.to_string(), value.to_string()))
    }

    pub fn fields(&self) -> &[(String, FormValue)] {
        &self.fields
    }

    pub fn text(&self, name: &str) -> Option<&str> {
        self.fields.iter().find_map(|(n, v)| match v {
            FormValue::Text(t) if n == name => Some(t.as_str()),
            _ => None,
        })
    }

    pub fn file(&self, name: &str) -> Option<&FilePart> {
        self.fields.iter().find_map(|(n, v)| match v {
            FormValue::File(f) if n == name => Some(f),
            _ => None,
        })
    }

    /// Encodes a fresh multipart payload; file fields stay file parts.
    pub fn to_multipart(&self) -> Result<Form> {
        let mut form = Form::new();
        for (name, value) in &self.fields {
            form = match value {
                FormValue::Text(text) => form.text(name.clone(), text.clone()),
                FormValue::File(file) => {
                    let mut part =
                        Part::bytes(file.bytes.clone()).file_name(file.file_name.clone());
                    if let Some(mime) = &file.mime_type {
                        part = part
                            .mime_str(mime)
                            .map_err(|e| StudioError::InvalidForm(e.to_string()))?;
                    }
                    form.part(name.clone(), part)
                }
            };
        }
        Ok(form)
    }
}

pub fn mime_for_path(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "webp" => Some("image/webp"),
        "gif" => Some("image/gif"),
        _ => None,
    }
}
