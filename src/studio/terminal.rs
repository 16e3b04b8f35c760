use super::view::{StudioElements, StudioView};
use colored::*;
use std::io::Write;

/// Renders view changes as lines on a writer (stdout by default) and keeps the
/// element state for inspection afterwards.
pub struct TerminalView<W: Write + Send> {
    elements: StudioElements,
    out: W,
    colors: bool,
}

impl TerminalView<std::io::Stdout> {
    pub fn stdout(elements: StudioElements) -> Self {
        Self::new(elements, std::io::stdout(), true)
    }
}

impl<W: Write + Send> TerminalView<W> {
    pub fn new(elements: StudioElements, out: W, colors: bool) -> Self {
        Self {
            elements,
            out,
            colors,
        }
    }

    pub fn elements(&self) -> &StudioElements {
        &self.elements
    }

    pub fn into_parts(self) -> (StudioElements, W) {
        (self.elements, self.out)
    }

    fn line(&mut self, tag: &str, text: &str, color: Color) {
        let tag = if self.colors {
            format!("[{}]", tag).color(color).bold().to_string()
        } else {
            format!("[{}]", tag)
        };
        let _ = writeln!(self.out, "{} {}", tag, text);
    }
}

impl<W: Write + Send> StudioView for TerminalView<W> {
    fn reveal_result(&mut self) {
        self.elements.reveal_result();
    }

    fn hide_error(&mut self) {
        self.elements.hide_error();
    }

    fn show_error(&mut self, message: &str) {
        self.elements.show_error(message);
        self.line("error", message, Color::Red);
    }

    fn clear_image(&mut self) {
        self.elements.clear_image();
    }

    fn set_image_src(&mut self, src: &str) {
        self.elements.set_image_src(src);
        self.line("image", src, Color::Green);
    }

    fn set_prompt_text(&mut self, text: &str) {
        self.elements.set_prompt_text(text);
        if !text.is_empty() {
            self.line("prompt", text, Color::Cyan);
        }
    }

    fn set_submit(&mut self, disabled: bool, label: &str) {
        let changed = self.elements.submit.label != label;
        self.elements.set_submit(disabled, label);
        if changed {
            self.line("submit", label, Color::BrightBlack);
        }
    }
}
