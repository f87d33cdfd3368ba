/// DOM text sink: a message element with a text span and a cursor span
use typewriter_core::{SinkError, TextSink, CURSOR_GLYPH};
use wasm_bindgen::JsCast;
use web_sys::{Document, HtmlElement};

/// Class applied to the message element once the last line is done
pub const FINISHED_CLASS: &str = "move-up";
pub const CURSOR_CLASS: &str = "cursor";
pub const TEXT_CLASS: &str = "text";

pub struct DomSink {
    element: HtmlElement,
    text: HtmlElement,
    cursor: HtmlElement,
}

impl DomSink {
    /// Take over the element with id `message_id`, replacing its content
    /// with a text span and a cursor span.
    pub fn attach(document: &Document, message_id: &str) -> Result<Self, SinkError> {
        let element = find_element(document, message_id)?;
        let text = create_span(document, TEXT_CLASS)?;
        let cursor = create_span(document, CURSOR_CLASS)?;
        cursor.set_text_content(Some(&CURSOR_GLYPH.to_string()));

        element.set_inner_html("");
        element
            .append_child(&text)
            .and_then(|_| element.append_child(&cursor))
            .map_err(|e| SinkError::Unavailable(format!("{:?}", e)))?;

        Ok(Self {
            element,
            text,
            cursor,
        })
    }

    pub fn element(&self) -> &HtmlElement {
        &self.element
    }

    fn set_style(target: &HtmlElement, property: &str, value: &str) {
        if let Err(e) = target.style().set_property(property, value) {
            log::warn!("failed to set {}: {:?}", property, e);
        }
    }
}

impl TextSink for DomSink {
    fn ensure_ready(&self) -> Result<(), SinkError> {
        if !self.element.is_connected() {
            return Err(SinkError::MissingElement("message".to_string()));
        }
        if !self.cursor.is_connected() {
            return Err(SinkError::MissingElement(format!(".{}", CURSOR_CLASS)));
        }
        Ok(())
    }

    fn reset(&mut self) {
        self.text.set_text_content(None);
        Self::set_style(&self.cursor, "display", "inline");
        if let Err(e) = self.element.class_list().remove_1(FINISHED_CLASS) {
            log::warn!("failed to clear {}: {:?}", FINISHED_CLASS, e);
        }
    }

    fn render(&mut self, text: &str) {
        self.text.set_text_content(Some(text));
    }

    fn set_opacity(&mut self, opacity: f32) {
        Self::set_style(&self.element, "opacity", &opacity.to_string());
    }

    fn hide_cursor(&mut self) {
        Self::set_style(&self.cursor, "display", "none");
    }

    fn mark_finished(&mut self) {
        if let Err(e) = self.element.class_list().add_1(FINISHED_CLASS) {
            log::warn!("failed to apply {}: {:?}", FINISHED_CLASS, e);
        }
    }

    fn set_font(&mut self, font: &str) {
        Self::set_style(&self.element, "font-family", font);
    }
}

/// Look up an element by id, failing with the missing selector
pub fn find_element(document: &Document, id: &str) -> Result<HtmlElement, SinkError> {
    document
        .get_element_by_id(id)
        .and_then(|element| element.dyn_into::<HtmlElement>().ok())
        .ok_or_else(|| SinkError::MissingElement(format!("#{}", id)))
}

fn create_span(document: &Document, class: &str) -> Result<HtmlElement, SinkError> {
    let span = document
        .create_element("span")
        .map_err(|e| SinkError::Unavailable(format!("{:?}", e)))?
        .dyn_into::<HtmlElement>()
        .map_err(|_| SinkError::Unavailable("span is not an HTML element".to_string()))?;
    span.set_class_name(class);
    Ok(span)
}
