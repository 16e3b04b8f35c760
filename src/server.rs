//! HTTP backend for the studio: `POST /api/generate` plus the static frontend.

use crate::{
    config::{Config, ReplicateConfig, MISSING_TOKEN_DETAIL},
    error::{Result, StudioError},
    models::{ErrorResponse, FilePart, FormState, GenerateResponse, PortraitRequest},
    prompt::build_prompt,
    replicate::{image_url, GenerationJob, ImageGenerator, ReplicateClient},
};
use actix_cors::Cors;
use actix_files::Files;
use actix_multipart::Multipart;
use actix_web::{
    body::MessageBody,
    dev::{ServiceFactory, ServiceRequest, ServiceResponse},
    http::StatusCode,
    middleware::Logger,
    web, App, HttpResponse, HttpServer,
};
use futures::StreamExt;
use std::path::Path;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    replicate: ReplicateConfig,
    generator: Option<Arc<dyn ImageGenerator>>,
}

impl AppState {
    /// Without an API token the state has no generator and every request is rejected.
    pub fn from_config(replicate: ReplicateConfig) -> Self {
        let generator = match ReplicateClient::new(replicate.clone()) {
            Ok(client) => Some(Arc::new(client) as Arc<dyn ImageGenerator>),
            Err(e) => {
                log::warn!("{}", e);
                None
            }
        };
        Self { replicate, generator }
    }

    pub fn with_generator(replicate: ReplicateConfig, generator: Arc<dyn ImageGenerator>) -> Self {
        Self {
            replicate,
            generator: Some(generator),
        }
    }
}

fn detail(status: StatusCode, message: impl Into<String>) -> HttpResponse {
    HttpResponse::build(status).json(ErrorResponse::new(message))
}

async fn read_form(mut payload: Multipart) -> Result<FormState> {
    let mut form = FormState::new();

    while let Some(field) = payload.next().await {
        let mut field = field.map_err(|e| StudioError::InvalidForm(e.to_string()))?;

        let disposition = field.content_disposition();
        let name = disposition.get_name().unwrap_or_default().to_string();
        let file_name = disposition.get_filename().map(String::from);
        let mime_type = field.content_type().map(|m| m.to_string());

        let mut bytes = Vec::new();
        while let Some(chunk) = field.next().await {
            let chunk = chunk.map_err(|e| StudioError::InvalidForm(e.to_string()))?;
            bytes.extend_from_slice(&chunk);
        }

        form = match file_name {
            Some(file_name) => form.with_file(
                name,
                FilePart {
                    file_name,
                    mime_type,
                    bytes,
                },
            ),
            None => form.with_text(name, String::from_utf8_lossy(&bytes)),
        };
    }

    Ok(form)
}

async fn generate(state: web::Data<AppState>, payload: Multipart) -> HttpResponse {
    let form = match read_form(payload).await {
        Ok(form) => form,
        Err(e) => {
            log::warn!("Rejecting generate request: {}", e);
            return detail(StatusCode::BAD_REQUEST, e.to_string());
        }
    };

    let request = PortraitRequest::from_form(&form);
    let prompt = build_prompt(&request.fields);
    log::debug!("Built prompt: {}", prompt.positive);

    let Some(generator) = state.generator.as_ref() else {
        return detail(StatusCode::BAD_REQUEST, MISSING_TOKEN_DETAIL);
    };

    let job = GenerationJob::plan(&request, &prompt, &state.replicate);
    log::info!("Running Replicate {:?}: {}", job.mode, job.model);

    let output = match generator.run(&job.model, job.input).await {
        Ok(output) => output,
        Err(e) => {
            log::error!("Replicate generation failed: {}", e);
            let reason = match e {
                StudioError::Upstream(reason) => reason,
                other => other.to_string(),
            };
            return detail(StatusCode::BAD_GATEWAY, format!("Generation failed: {}", reason));
        }
    };

    match image_url(&output) {
        Some(url) => HttpResponse::Ok().json(GenerateResponse::new(url, prompt.positive)),
        None => detail(
            StatusCode::INTERNAL_SERVER_ERROR,
            StudioError::NoImage.to_string(),
        ),
    }
}

/// API routes only; mount static files after these.
pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/api/generate", web::post().to(generate));
}

/// Full application: request logging, permissive CORS, the API routes, then the static
/// frontend at `/` when `static_dir` is given.
pub fn app(
    state: web::Data<AppState>,
    static_dir: Option<&str>,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<impl MessageBody>,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let app = App::new()
        .wrap(Logger::default())
        .wrap(Cors::permissive())
        .app_data(state)
        .configure(routes);

    match static_dir {
        Some(dir) => app.service(Files::new("/", dir).index_file("index.html")),
        None => app,
    }
}

pub async fn run(config: &Config) -> std::io::Result<()> {
    let state = web::Data::new(AppState::from_config(config.replicate.clone()));
    let static_dir = config.server.static_dir.clone();
    let static_dir = if Path::new(&static_dir).is_dir() {
        Some(static_dir)
    } else {
        log::warn!("Static dir '{}' not found, serving API only", static_dir);
        None
    };

    crate::logger::log_startup_info(
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION"),
        &config.server.host,
        config.server.port,
    );

    HttpServer::new(move || app(state.clone(), static_dir.as_deref()))
        .bind((config.server.host.as_str(), config.server.port))?
        .run()
        .await
}
