use crate::{
    error::{Result, StudioError},
    models::FormState,
};
use async_trait::async_trait;
use reqwest::Client;

/// Status and undecoded body of a generate call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl RawResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Sends one form submission. Decoding the body is the caller's job.
#[async_trait]
pub trait GenerateTransport: Send + Sync {
    async fn post_form(&self, url: &str, form: &FormState) -> Result<RawResponse>;
}

#[derive(Clone, Default)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl GenerateTransport for HttpTransport {
    async fn post_form(&self, url: &str, form: &FormState) -> Result<RawResponse> {
        let payload = form.to_multipart()?;

        let response = self
            .client
            .post(url)
            .multipart(payload)
            .send()
            .await
            .map_err(|e| StudioError::Transport(e.to_string()))?;

        let status = response.status().as_u16();
        let body = response
            .bytes()
            .await
            .map_err(|e| StudioError::Transport(e.to_string()))?;

        log::debug!("POST {} -> {} ({} bytes)", url, status, body.len());

        Ok(RawResponse::new(status, body.to_vec()))
    }
}
