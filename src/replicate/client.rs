use crate::{
    config::{ReplicateConfig, MISSING_TOKEN_DETAIL},
    error::{Result, StudioError},
    models::{CreatePrediction, Prediction, PredictionStatus},
};
use async_trait::async_trait;
use reqwest::{Client, Response};
use serde_json::Value;
use std::time::Duration;

use super::ImageGenerator;

#[derive(Clone)]
pub struct ReplicateClient {
    client: Client,
    api_token: String,
    base_url: String,
    poll_interval: Duration,
}

/// Where to create a prediction for `model`, and the pinned version if the id carries one.
pub fn prediction_endpoint(base_url: &str, model: &str) -> (String, Option<String>) {
    let base = base_url.trim_end_matches('/');
    match model.split_once(':') {
        Some((_, version)) => (format!("{}/predictions", base), Some(version.to_string())),
        None => (format!("{}/models/{}/predictions", base, model), None),
    }
}

impl ReplicateClient {
    pub fn new(config: ReplicateConfig) -> Result<Self> {
        let api_token = config
            .api_token
            .ok_or_else(|| StudioError::Config(MISSING_TOKEN_DETAIL.into()))?;

        Ok(Self {
            client: Client::new(),
            api_token,
            base_url: config.base_url,
            poll_interval: config.poll_interval,
        })
    }

    async fn read_prediction(response: Response) -> Result<Prediction> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let detail = serde_json::from_str::<Value>(&body)
                .ok()
                .and_then(|v| v.get("detail").and_then(Value::as_str).map(String::from))
                .unwrap_or(body);
            return Err(StudioError::Upstream(format!("{}: {}", status, detail)));
        }

        response
            .json::<Prediction>()
            .await
            .map_err(|e| StudioError::Upstream(format!("unreadable prediction: {}", e)))
    }

    async fn create(&self, model: &str, input: Value) -> Result<Prediction> {
        let (url, version) = prediction_endpoint(&self.base_url, model);
        let body = CreatePrediction { version, input };

        log::debug!("Creating prediction at {}", url);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_token)
            .header("Prefer", "wait")
            .json(&body)
            .send()
            .await
            .map_err(|e| StudioError::Upstream(e.to_string()))?;

        Self::read_prediction(response).await
    }

    async fn wait(&self, mut prediction: Prediction) -> Result<Prediction> {
        while !prediction.status.is_terminal() {
            tokio::time::sleep(self.poll_interval).await;

            let url = match prediction.poll_url() {
                Some(url) => url.to_string(),
                None => format!(
                    "{}/predictions/{}",
                    self.base_url.trim_end_matches('/'),
                    prediction.id
                ),
            };
            log::debug!("Polling prediction {} ({:?})", prediction.id, prediction.status);

            let response = self
                .client
                .get(&url)
                .bearer_auth(&self.api_token)
                .send()
                .await
                .map_err(|e| StudioError::Upstream(e.to_string()))?;
            prediction = Self::read_prediction(response).await?;
        }
        Ok(prediction)
    }
}

#[async_trait]
impl ImageGenerator for ReplicateClient {
    async fn run(&self, model: &str, input: Value) -> Result<Value> {
        let _timer = crate::logger::timer(&format!("Replicate run {}", model));

        let prediction = self.create(model, input).await?;
        let prediction = self.wait(prediction).await?;

        match prediction.status {
            PredictionStatus::Succeeded => Ok(prediction.output.unwrap_or(Value::Null)),
            _ => Err(StudioError::Upstream(prediction.error_message())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{dev::ServerHandle, web, App, HttpRequest, HttpResponse, HttpServer};
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    /// Replies to create with `created`, then walks `polls` on each GET.
    struct FakeReplicate {
        created: (u16, Value),
        polls: Vec<Value>,
        poll_count: AtomicUsize,
        last_create: Mutex<Option<(Option<String>, Value)>>,
    }

    impl FakeReplicate {
        fn new(created: (u16, Value), polls: Vec<Value>) -> Arc<Self> {
            Arc::new(Self {
                created,
                polls,
                poll_count: AtomicUsize::new(0),
                last_create: Mutex::new(None),
            })
        }
    }

    async fn create_prediction(
        fake: web::Data<FakeReplicate>,
        req: HttpRequest,
        body: web::Json<Value>,
    ) -> HttpResponse {
        let auth = req
            .headers()
            .get("authorization")
            .and_then(|h| h.to_str().ok())
            .map(String::from);
        *fake.last_create.lock().unwrap() = Some((auth, body.into_inner()));

        let (status, body) = &fake.created;
        HttpResponse::build(actix_web::http::StatusCode::from_u16(*status).unwrap()).json(body)
    }

    async fn get_prediction(fake: web::Data<FakeReplicate>) -> HttpResponse {
        let n = fake.poll_count.fetch_add(1, Ordering::SeqCst);
        let reply = &fake.polls[n.min(fake.polls.len() - 1)];
        HttpResponse::Ok().json(reply)
    }

    async fn start(fake: Arc<FakeReplicate>) -> (ReplicateClient, ServerHandle) {
        let data = web::Data::from(fake);
        let server = HttpServer::new(move || {
            App::new()
                .app_data(data.clone())
                .route(
                    "/models/{owner}/{name}/predictions",
                    web::post().to(create_prediction),
                )
                .route("/predictions/{id}", web::get().to(get_prediction))
        })
        .workers(1)
        .bind(("127.0.0.1", 0))
        .unwrap();
        let addr = server.addrs()[0];
        let running = server.run();
        let handle = running.handle();
        actix_web::rt::spawn(running);

        let config = ReplicateConfig::new()
            .with_credentials("r8_test")
            .with_base_url(format!("http://{}", addr))
            .with_poll_interval(Duration::from_millis(5));
        (ReplicateClient::new(config).unwrap(), handle)
    }

    #[test]
    fn official_models_use_model_endpoint() {
        let (url, version) =
            prediction_endpoint("https://api.replicate.com/v1/", "black-forest-labs/flux-1.1-pro");
        assert_eq!(
            url,
            "https://api.replicate.com/v1/models/black-forest-labs/flux-1.1-pro/predictions"
        );
        assert_eq!(version, None);
    }

    #[test]
    fn versioned_models_pin_the_version() {
        let (url, version) =
            prediction_endpoint("https://api.replicate.com/v1", "owner/img2img:abc123");
        assert_eq!(url, "https://api.replicate.com/v1/predictions");
        assert_eq!(version.as_deref(), Some("abc123"));
    }

    #[test]
    fn client_requires_token() {
        assert!(matches!(
            ReplicateClient::new(ReplicateConfig::new()),
            Err(StudioError::Config(_))
        ));
        assert!(ReplicateClient::new(ReplicateConfig::new().with_credentials("r8_x")).is_ok());
    }

    #[actix_web::test]
    async fn run_polls_until_succeeded() {
        let fake = FakeReplicate::new(
            (201, json!({ "id": "p1", "status": "starting" })),
            vec![
                json!({ "id": "p1", "status": "processing" }),
                json!({ "id": "p1", "status": "succeeded", "output": ["https://r/out.png"] }),
            ],
        );
        let (client, handle) = start(fake.clone()).await;

        let output = client
            .run("owner/model", json!({ "prompt": "a portrait" }))
            .await
            .unwrap();
        assert_eq!(output, json!(["https://r/out.png"]));
        assert_eq!(fake.poll_count.load(Ordering::SeqCst), 2);

        let (auth, body) = fake.last_create.lock().unwrap().clone().unwrap();
        assert_eq!(auth.as_deref(), Some("Bearer r8_test"));
        assert_eq!(body, json!({ "input": { "prompt": "a portrait" } }));

        handle.stop(true).await;
    }

    #[actix_web::test]
    async fn failed_prediction_reports_its_error() {
        let fake = FakeReplicate::new(
            (201, json!({ "id": "p2", "status": "processing" })),
            vec![
                json!({ "id": "p2", "status": "processing" }),
                json!({ "id": "p2", "status": "failed", "error": "NSFW" }),
            ],
        );
        let (client, handle) = start(fake.clone()).await;

        let err = client.run("owner/model", json!({})).await.unwrap_err();
        assert!(matches!(err, StudioError::Upstream(ref reason) if reason == "NSFW"));
        assert_eq!(fake.poll_count.load(Ordering::SeqCst), 2);

        handle.stop(true).await;
    }

    #[actix_web::test]
    async fn rejected_create_surfaces_detail() {
        let fake = FakeReplicate::new(
            (422, json!({ "detail": "Invalid input: prompt is required" })),
            vec![],
        );
        let (client, handle) = start(fake.clone()).await;

        let err = client.run("owner/model", json!({})).await.unwrap_err();
        match err {
            StudioError::Upstream(reason) => {
                assert!(reason.starts_with("422"));
                assert!(reason.ends_with("Invalid input: prompt is required"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert_eq!(fake.poll_count.load(Ordering::SeqCst), 0);

        handle.stop(true).await;
    }
}
