pub mod controller;
pub mod terminal;
pub mod transport;
pub mod view;

use crate::{config::StudioConfig, error::Result};

pub use controller::{FormSubmissionController, SubmissionOutcome, SubmissionState};
pub use terminal::TerminalView;
pub use transport::{GenerateTransport, HttpTransport, RawResponse};
pub use view::{Page, StudioElements, StudioView};

pub type HttpController<V> = FormSubmissionController<V, HttpTransport>;

/// Binds the page's elements and wires a controller posting to the configured endpoint.
pub fn connect<V, F>(config: &StudioConfig, page: &Page, make_view: F) -> Result<HttpController<V>>
where
    V: StudioView,
    F: FnOnce(StudioElements) -> V,
{
    let elements = StudioElements::bind(page)?;
    let endpoint = config.endpoint_url();
    log::debug!("Studio controller bound to {}", endpoint);

    Ok(FormSubmissionController::new(
        make_view(elements),
        HttpTransport::new(),
        endpoint,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StudioError;

    #[test]
    fn connect_targets_configured_endpoint() {
        let config = StudioConfig::new().with_base_url("http://studio.local:8000");
        let controller = connect(&config, &Page::studio(), |e| e).unwrap();
        assert_eq!(controller.endpoint(), "http://studio.local:8000/api/generate");
        assert_eq!(controller.state(), SubmissionState::Idle);
    }

    #[test]
    fn connect_fails_without_markup() {
        let result = connect(&StudioConfig::new(), &Page::new(), |e| e);
        assert!(matches!(result, Err(StudioError::MissingElement(_))));
    }
}
