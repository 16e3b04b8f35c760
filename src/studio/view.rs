use crate::error::{Result, StudioError};
use std::collections::BTreeSet;
use std::sync::{Arc, Mutex};

pub const FORM_ID: &str = "studio-form";
pub const SUBMIT_ID: &str = "submit";
pub const RESULT_ID: &str = "result";
pub const IMAGE_ID: &str = "image";
pub const PROMPT_ID: &str = "prompt";
pub const ERROR_ID: &str = "error";

pub const ELEMENT_IDS: [&str; 6] = [FORM_ID, SUBMIT_ID, RESULT_ID, IMAGE_ID, PROMPT_ID, ERROR_ID];

pub const SUBMIT_LABEL: &str = "Generate";
pub const BUSY_LABEL: &str = "Generating…";
pub const PROMPT_PREFIX: &str = "Prompt: ";

/// Element identifiers present in the host page markup.
#[derive(Debug, Clone, Default)]
pub struct Page {
    ids: BTreeSet<String>,
}

impl Page {
    pub fn new() -> Self {
        Self::default()
    }

    /// The page the studio ships with.
    pub fn studio() -> Self {
        ELEMENT_IDS
            .iter()
            .fold(Self::new(), |page, id| page.with_element(*id))
    }

    pub fn with_element(mut self, id: impl Into<String>) -> Self {
        self.ids.insert(id.into());
        self
    }

    pub fn without_element(mut self, id: &str) -> Self {
        self.ids.remove(id);
        self
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }
}

/// Everything the controller is allowed to change on screen.
pub trait StudioView: Send {
    fn reveal_result(&mut self);
    fn hide_error(&mut self);
    fn show_error(&mut self, message: &str);
    fn clear_image(&mut self);
    fn set_image_src(&mut self, src: &str);
    fn set_prompt_text(&mut self, text: &str);
    fn set_submit(&mut self, disabled: bool, label: &str);
}

/// Lets a caller keep reading a view while the controller owns it.
impl<V: StudioView> StudioView for Arc<Mutex<V>> {
    fn reveal_result(&mut self) {
        with_locked(self, |v| v.reveal_result())
    }
    fn hide_error(&mut self) {
        with_locked(self, |v| v.hide_error())
    }
    fn show_error(&mut self, message: &str) {
        with_locked(self, |v| v.show_error(message))
    }
    fn clear_image(&mut self) {
        with_locked(self, |v| v.clear_image())
    }
    fn set_image_src(&mut self, src: &str) {
        with_locked(self, |v| v.set_image_src(src))
    }
    fn set_prompt_text(&mut self, text: &str) {
        with_locked(self, |v| v.set_prompt_text(text))
    }
    fn set_submit(&mut self, disabled: bool, label: &str) {
        with_locked(self, |v| v.set_submit(disabled, label))
    }
}

fn with_locked<V>(shared: &Mutex<V>, f: impl FnOnce(&mut V)) {
    let mut guard = shared.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    f(&mut guard)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitButton {
    pub id: String,
    pub disabled: bool,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Panel {
    pub id: String,
    pub hidden: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageElement {
    pub id: String,
    pub src: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextLabel {
    pub id: String,
    pub text: String,
    pub hidden: bool,
}

/// Handles to the six studio elements, acquired once from the page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StudioElements {
    pub form_id: String,
    pub submit: SubmitButton,
    pub result: Panel,
    pub image: ImageElement,
    pub prompt: TextLabel,
    pub error: TextLabel,
}

impl StudioElements {
    /// Fails on the first identifier the page does not declare.
    pub fn bind(page: &Page) -> Result<Self> {
        if let Some(missing) = ELEMENT_IDS.iter().find(|id| !page.contains(id)) {
            return Err(StudioError::MissingElement(missing.to_string()));
        }

        Ok(Self {
            form_id: FORM_ID.to_string(),
            submit: SubmitButton {
                id: SUBMIT_ID.to_string(),
                disabled: false,
                label: SUBMIT_LABEL.to_string(),
            },
            result: Panel {
                id: RESULT_ID.to_string(),
                hidden: true,
            },
            image: ImageElement {
                id: IMAGE_ID.to_string(),
                src: None,
            },
            prompt: TextLabel {
                id: PROMPT_ID.to_string(),
                text: String::new(),
                hidden: false,
            },
            error: TextLabel {
                id: ERROR_ID.to_string(),
                text: String::new(),
                hidden: true,
            },
        })
    }
}

impl StudioView for StudioElements {
    fn reveal_result(&mut self) {
        self.result.hidden = false;
    }

    fn hide_error(&mut self) {
        self.error.hidden = true;
        self.error.text.clear();
    }

    fn show_error(&mut self, message: &str) {
        self.error.text = message.to_string();
        self.error.hidden = false;
    }

    fn clear_image(&mut self) {
        self.image.src = None;
    }

    fn set_image_src(&mut self, src: &str) {
        self.image.src = Some(src.to_string());
    }

    fn set_prompt_text(&mut self, text: &str) {
        self.prompt.text = text.to_string();
    }

    fn set_submit(&mut self, disabled: bool, label: &str) {
        self.submit.disabled = disabled;
        self.submit.label = label.to_string();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bind_acquires_all_handles() {
        let elements = StudioElements::bind(&Page::studio()).unwrap();
        assert_eq!(elements.form_id, FORM_ID);
        assert!(elements.result.hidden);
        assert!(elements.error.hidden);
        assert!(!elements.submit.disabled);
        assert_eq!(elements.submit.label, SUBMIT_LABEL);
    }

    #[test]
    fn bind_fails_on_missing_element() {
        let page = Page::studio().without_element(PROMPT_ID);
        match StudioElements::bind(&page) {
            Err(StudioError::MissingElement(id)) => assert_eq!(id, PROMPT_ID),
            other => panic!("expected missing element, got {:?}", other),
        }
    }

    #[test]
    fn hide_error_also_clears_text() {
        let mut elements = StudioElements::bind(&Page::studio()).unwrap();
        elements.show_error("boom");
        assert!(!elements.error.hidden);
        elements.hide_error();
        assert!(elements.error.hidden);
        assert!(elements.error.text.is_empty());
    }

    #[test]
    fn shared_view_writes_through() {
        let shared = Arc::new(Mutex::new(StudioElements::bind(&Page::studio()).unwrap()));
        let mut handle = Arc::clone(&shared);
        handle.set_image_src("http://x/y.png");
        assert_eq!(shared.lock().unwrap().image.src.as_deref(), Some("http://x/y.png"));
    }
}
