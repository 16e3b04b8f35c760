use super::{
    transport::GenerateTransport,
    view::{StudioView, BUSY_LABEL, PROMPT_PREFIX, SUBMIT_LABEL},
};
use crate::{
    error::{Result, StudioError},
    models::{ErrorResponse, FormState, GenerateResponse},
};
use serde_json::Value;
use std::sync::{
    atomic::{AtomicBool, AtomicU64, Ordering},
    Mutex,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionState {
    Idle,
    Submitting,
    Succeeded,
    Failed,
}

/// What one submission ended up rendering.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmissionOutcome {
    Succeeded(GenerateResponse),
    Failed { message: String },
}

impl SubmissionOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, SubmissionOutcome::Succeeded(_))
    }
}

/// Posts the studio form and renders the result into the bound elements.
///
/// Only one submission runs at a time. The submit control is disabled for the
/// duration and an in-flight flag rejects programmatic resubmits with
/// [`StudioError::Busy`].
pub struct FormSubmissionController<V, T> {
    view: Mutex<V>,
    transport: T,
    endpoint: String,
    in_flight: AtomicBool,
    state: Mutex<SubmissionState>,
    submissions: AtomicU64,
}

/// Releases the submit control and the in-flight flag however `submit` exits.
struct InFlight<'a, V: StudioView, T> {
    controller: &'a FormSubmissionController<V, T>,
}

impl<V: StudioView, T> Drop for InFlight<'_, V, T> {
    fn drop(&mut self) {
        self.controller.render(|v| v.set_submit(false, SUBMIT_LABEL));
        self.controller.set_state(SubmissionState::Idle);
        self.controller.in_flight.store(false, Ordering::Release);
    }
}

impl<V, T> FormSubmissionController<V, T> {
    pub fn new(view: V, transport: T, endpoint: impl Into<String>) -> Self {
        Self {
            view: Mutex::new(view),
            transport,
            endpoint: endpoint.into(),
            in_flight: AtomicBool::new(false),
            state: Mutex::new(SubmissionState::Idle),
            submissions: AtomicU64::new(0),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn state(&self) -> SubmissionState {
        *self.state.lock().unwrap_or_else(|p| p.into_inner())
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Runs `f` against the view. The lock is never held across an await.
    pub fn with_view<R>(&self, f: impl FnOnce(&V) -> R) -> R {
        let view = self.view.lock().unwrap_or_else(|p| p.into_inner());
        f(&view)
    }

    pub fn into_view(self) -> V {
        self.view.into_inner().unwrap_or_else(|p| p.into_inner())
    }

    fn render(&self, f: impl FnOnce(&mut V)) {
        let mut view = self.view.lock().unwrap_or_else(|p| p.into_inner());
        f(&mut view)
    }

    fn set_state(&self, next: SubmissionState) {
        let mut state = self.state.lock().unwrap_or_else(|p| p.into_inner());
        log::debug!("Submission state {:?} -> {:?}", *state, next);
        *state = next;
    }
}

impl<V, T> FormSubmissionController<V, T>
where
    V: StudioView,
    T: GenerateTransport,
{
    /// Submits a snapshot of the form. Every failure is rendered into the error
    /// label; `Err` is only returned when another submission is still running.
    pub async fn submit(&self, form: &FormState) -> Result<SubmissionOutcome> {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            log::warn!("Ignoring submit while a generation is in flight");
            return Err(StudioError::Busy);
        }
        let _in_flight = InFlight { controller: self };
        let number = self.submissions.fetch_add(1, Ordering::Relaxed) + 1;

        self.render(|v| {
            v.reveal_result();
            v.hide_error();
            v.clear_image();
            v.set_prompt_text("");
        });

        let snapshot = form.clone();

        self.set_state(SubmissionState::Submitting);
        self.render(|v| v.set_submit(true, BUSY_LABEL));
        log::info!("Submission #{} posting to {}", number, self.endpoint);

        let outcome = match self.exchange(&snapshot).await {
            Ok(response) => {
                self.render(|v| {
                    if let Some(url) = &response.image_url {
                        v.set_image_src(url);
                    }
                    if let Some(prompt) = &response.prompt {
                        v.set_prompt_text(&format!("{}{}", PROMPT_PREFIX, prompt));
                    }
                });
                self.set_state(SubmissionState::Succeeded);
                log::info!("Submission #{} succeeded", number);
                SubmissionOutcome::Succeeded(response)
            }
            Err(err) => {
                log::error!("Submission #{} failed: {:?}", number, err);
                let message = err.user_message();
                self.render(|v| v.show_error(&message));
                self.set_state(SubmissionState::Failed);
                SubmissionOutcome::Failed { message }
            }
        };

        Ok(outcome)
    }

    /// The body is parsed before the status is looked at, so an unreadable error
    /// page reports the decode failure rather than the status.
    async fn exchange(&self, form: &FormState) -> Result<GenerateResponse> {
        let raw = self.transport.post_form(&self.endpoint, form).await?;
        let data: Value = serde_json::from_slice(&raw.body)?;

        if !raw.is_success() {
            let detail = ErrorResponse::from_value(&data).detail;
            return Err(StudioError::protocol(raw.status, detail));
        }

        GenerateResponse::from_value(&data)
    }
}
