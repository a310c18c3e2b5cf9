//! Load status reporting.

use log::{info, warn};
use web_sys::Element;

/// Reports load progress to the log and, optionally, a page element.
pub struct StatusSink {
    element: Option<Element>,
}

impl StatusSink {
    pub fn new(element_id: Option<&str>) -> Self {
        let element = element_id.and_then(|id| {
            let found = web_sys::window()
                .and_then(|w| w.document())
                .and_then(|d| d.get_element_by_id(id));
            if found.is_none() {
                warn!("status element `{id}` not found");
            }
            found
        });
        Self { element }
    }

    pub fn set(&self, text: &str) {
        info!("status: {text}");
        if let Some(element) = &self.element {
            element.set_text_content(Some(text));
        }
    }
}
