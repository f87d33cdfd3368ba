/// Output surface contract and a recording implementation
use thiserror::Error;

/// Glyph drawn after the typed text while the cursor is visible
pub const CURSOR_GLYPH: char = '|';

/// Reasons a sink cannot be used
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SinkError {
    #[error("required element '{0}' is missing")]
    MissingElement(String),

    #[error("output surface unavailable: {0}")]
    Unavailable(String),
}

/// A text surface the sequencer writes into.
///
/// The sequencer never reads content back; everything it needs to know
/// about the displayed text is kept in its own state.
pub trait TextSink {
    /// Check that every part the sequencer will touch is present.
    /// Called once when the sequencer is created.
    fn ensure_ready(&self) -> Result<(), SinkError> {
        Ok(())
    }

    /// Clear the text, show the cursor again and drop the finished state
    fn reset(&mut self);

    /// Show `text`, followed by [`CURSOR_GLYPH`] while the cursor is visible
    fn render(&mut self, text: &str);

    /// `0.0` fades the surface out, `1.0` fades it back in
    fn set_opacity(&mut self, opacity: f32);

    /// Remove the cursor for good
    fn hide_cursor(&mut self);

    /// Apply the terminal visual state once the last message is done
    fn mark_finished(&mut self);

    /// Font-family label of the chosen language
    fn set_font(&mut self, _font: &str) {}
}

impl<T: TextSink + ?Sized> TextSink for &mut T {
    fn ensure_ready(&self) -> Result<(), SinkError> {
        (**self).ensure_ready()
    }

    fn reset(&mut self) {
        (**self).reset();
    }

    fn render(&mut self, text: &str) {
        (**self).render(text);
    }

    fn set_opacity(&mut self, opacity: f32) {
        (**self).set_opacity(opacity);
    }

    fn hide_cursor(&mut self) {
        (**self).hide_cursor();
    }

    fn mark_finished(&mut self) {
        (**self).mark_finished();
    }

    fn set_font(&mut self, font: &str) {
        (**self).set_font(font);
    }
}

/// Something that happened on a [`RecordingSink`]
#[derive(Debug, Clone, PartialEq)]
pub enum SinkEvent {
    Reset,
    /// Full displayed content, cursor glyph included when visible
    Frame(String),
    Opacity(f32),
    CursorHidden,
    Finished,
    Font(String),
}

/// Sink that keeps every event, for tests and dry runs
#[derive(Debug, Clone)]
pub struct RecordingSink {
    events: Vec<SinkEvent>,
    cursor_visible: bool,
    text: String,
}

impl Default for RecordingSink {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordingSink {
    pub fn new() -> Self {
        Self {
            events: Vec::new(),
            cursor_visible: true,
            text: String::new(),
        }
    }

    pub fn events(&self) -> &[SinkEvent] {
        &self.events
    }

    pub fn take_events(&mut self) -> Vec<SinkEvent> {
        std::mem::take(&mut self.events)
    }

    /// Last rendered text, without the cursor glyph
    pub fn text(&self) -> &str {
        &self.text
    }

    /// What a viewer would currently see
    pub fn display(&self) -> String {
        compose(&self.text, self.cursor_visible)
    }

    /// Only the frames, in order
    pub fn frames(&self) -> Vec<&str> {
        self.events
            .iter()
            .filter_map(|event| match event {
                SinkEvent::Frame(frame) => Some(frame.as_str()),
                _ => None,
            })
            .collect()
    }
}

impl TextSink for RecordingSink {
    fn reset(&mut self) {
        self.text.clear();
        self.cursor_visible = true;
        self.events.push(SinkEvent::Reset);
    }

    fn render(&mut self, text: &str) {
        self.text.clear();
        self.text.push_str(text);
        self.events
            .push(SinkEvent::Frame(compose(text, self.cursor_visible)));
    }

    fn set_opacity(&mut self, opacity: f32) {
        self.events.push(SinkEvent::Opacity(opacity));
    }

    fn hide_cursor(&mut self) {
        self.cursor_visible = false;
        self.events.push(SinkEvent::CursorHidden);
        self.events.push(SinkEvent::Frame(self.text.clone()));
    }

    fn mark_finished(&mut self) {
        self.events.push(SinkEvent::Finished);
    }

    fn set_font(&mut self, font: &str) {
        self.events.push(SinkEvent::Font(font.to_string()));
    }
}

/// Text followed by the cursor glyph when it is visible
pub fn compose(text: &str, cursor_visible: bool) -> String {
    let mut out = String::with_capacity(text.len() + CURSOR_GLYPH.len_utf8());
    out.push_str(text);
    if cursor_visible {
        out.push(CURSOR_GLYPH);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frames_carry_cursor_until_hidden() {
        let mut sink = RecordingSink::new();
        sink.render("Hi");
        assert_eq!(sink.display(), "Hi|");

        sink.hide_cursor();
        assert_eq!(sink.display(), "Hi");
        assert_eq!(sink.frames(), vec!["Hi|", "Hi"]);
        assert_eq!(sink.text(), "Hi");
    }

    #[test]
    fn test_forwarding_through_mut_ref() {
        fn fade_and_finish<S: TextSink>(mut sink: S) {
            assert!(sink.ensure_ready().is_ok());
            sink.set_opacity(0.0);
            sink.mark_finished();
        }

        let mut sink = RecordingSink::new();
        fade_and_finish(&mut sink);
        assert_eq!(
            sink.take_events(),
            vec![SinkEvent::Opacity(0.0), SinkEvent::Finished]
        );
        assert!(sink.events().is_empty());
    }
}
