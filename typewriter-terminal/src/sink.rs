/// Crossterm text sink that centers the message on screen
use crossterm::{
    cursor, queue,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};
use std::io::{self, stdout, Stdout, Write};
use typewriter_core::sink::compose;
use typewriter_core::{SinkError, TextSink};
use unicode_width::UnicodeWidthStr;

/// Rows the message moves up by once the card is finished
const MOVE_UP_ROWS: u16 = 2;

/// Writes the sequencer's output to a terminal.
///
/// Write failures cannot travel through [`TextSink`], so the first one is
/// kept until the driver collects it with [`TerminalSink::take_error`].
pub struct TerminalSink<W: Write> {
    out: W,
    width: u16,
    height: u16,
    text: String,
    opacity: f32,
    cursor_visible: bool,
    finished: bool,
    error: Option<io::Error>,
}

impl TerminalSink<Stdout> {
    pub fn stdout() -> Result<Self, SinkError> {
        let (width, height) =
            terminal::size().map_err(|e| SinkError::Unavailable(e.to_string()))?;
        Ok(Self::new(stdout(), width, height))
    }
}

impl<W: Write> TerminalSink<W> {
    pub fn new(out: W, width: u16, height: u16) -> Self {
        Self {
            out,
            width,
            height,
            text: String::new(),
            opacity: 1.0,
            cursor_visible: true,
            finished: false,
            error: None,
        }
    }

    pub fn resize(&mut self, width: u16, height: u16) {
        self.width = width;
        self.height = height;
        let result = queue!(self.out, Clear(ClearType::All)).and_then(|_| self.draw());
        self.record(result);
    }

    /// Dim one-line hint on the bottom row
    pub fn status(&mut self, hint: &str) {
        let row = self.height.saturating_sub(1);
        let result = queue!(
            self.out,
            cursor::MoveTo(0, row),
            Clear(ClearType::CurrentLine),
            SetForegroundColor(Color::DarkGrey),
            Print(hint),
            ResetColor
        )
        .and_then(|_| self.out.flush());
        self.record(result);
    }

    pub fn take_error(&mut self) -> Option<io::Error> {
        self.error.take()
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn row(&self) -> u16 {
        let middle = self.height / 2;
        if self.finished {
            middle.saturating_sub(MOVE_UP_ROWS)
        } else {
            middle
        }
    }

    fn color(&self) -> Color {
        if self.opacity < 0.5 {
            Color::DarkGrey
        } else {
            Color::White
        }
    }

    fn draw(&mut self) -> io::Result<()> {
        let line = compose(&self.text, self.cursor_visible);
        let col = self.width.saturating_sub(display_width(&line)) / 2;
        let row = self.row();
        let color = self.color();

        queue!(
            self.out,
            cursor::MoveTo(0, row),
            Clear(ClearType::CurrentLine),
            cursor::MoveTo(col, row),
            SetForegroundColor(color),
            Print(line),
            ResetColor
        )?;
        self.out.flush()
    }

    fn clear_row(&mut self) -> io::Result<()> {
        let row = self.row();
        queue!(self.out, cursor::MoveTo(0, row), Clear(ClearType::CurrentLine))
    }

    fn record(&mut self, result: io::Result<()>) {
        if let Err(e) = result {
            if self.error.is_none() {
                self.error = Some(e);
            }
        }
    }
}

impl<W: Write> TextSink for TerminalSink<W> {
    fn ensure_ready(&self) -> Result<(), SinkError> {
        if self.width == 0 || self.height == 0 {
            return Err(SinkError::Unavailable(format!(
                "terminal reports a {}x{} screen",
                self.width, self.height
            )));
        }
        Ok(())
    }

    fn reset(&mut self) {
        let cleared = self.clear_row();
        self.record(cleared);
        self.text.clear();
        self.cursor_visible = true;
        self.finished = false;
        let result = self.draw();
        self.record(result);
    }

    fn render(&mut self, text: &str) {
        self.text.clear();
        self.text.push_str(text);
        let result = self.draw();
        self.record(result);
    }

    fn set_opacity(&mut self, opacity: f32) {
        self.opacity = opacity;
        let result = self.draw();
        self.record(result);
    }

    fn hide_cursor(&mut self) {
        self.cursor_visible = false;
        let result = self.draw();
        self.record(result);
    }

    fn mark_finished(&mut self) {
        let cleared = self.clear_row();
        self.record(cleared);
        self.finished = true;
        let result = self.draw();
        self.record(result);
    }

    fn set_font(&mut self, font: &str) {
        tracing::debug!(font, "terminal keeps its own font");
    }
}

/// Terminal columns a string occupies
pub fn display_width(text: &str) -> u16 {
    u16::try_from(text.width()).unwrap_or(u16::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn output(sink: TerminalSink<Vec<u8>>) -> String {
        String::from_utf8(sink.into_inner()).unwrap()
    }

    #[test]
    fn test_render_is_centered_with_cursor() {
        let mut sink = TerminalSink::new(Vec::new(), 20, 10);
        sink.render("Hi");
        let out = output(sink);

        // "Hi|" is three columns wide: column (20 - 3) / 2 = 8, row 10 / 2 = 5
        assert!(out.contains("\x1b[6;9H"));
        assert!(out.contains("Hi|"));
    }

    #[test]
    fn test_finish_moves_up_without_cursor() {
        let mut sink = TerminalSink::new(Vec::new(), 20, 10);
        sink.render("Bye");
        sink.hide_cursor();
        sink.mark_finished();
        let out = output(sink);

        let tail = &out[out.rfind("\x1b[4;").unwrap()..];
        assert!(tail.contains("Bye"));
        assert!(!tail.contains('|'));
    }

    #[test]
    fn test_zero_sized_terminal_is_not_ready() {
        let sink = TerminalSink::new(Vec::new(), 0, 24);
        assert!(matches!(sink.ensure_ready(), Err(SinkError::Unavailable(_))));
        assert!(TerminalSink::new(Vec::new(), 80, 24).ensure_ready().is_ok());
    }

    #[test]
    fn test_write_errors_are_kept() {
        struct Broken;

        impl Write for Broken {
            fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
                Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
            }
            fn flush(&mut self) -> io::Result<()> {
                Ok(())
            }
        }

        let mut sink = TerminalSink::new(Broken, 80, 24);
        sink.render("a");
        sink.render("ab");
        let err = sink.take_error().unwrap();
        assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
        assert!(sink.take_error().is_none());
    }

    #[test]
    fn test_wide_characters() {
        assert_eq!(display_width("Hi|"), 3);
        assert_eq!(display_width("嘿, Z|"), 6);
        assert_eq!(display_width("生日快乐"), 8);
        assert_eq!(display_width("🎂"), 2);
        assert_eq!(display_width("𠀀"), 2);
        assert_eq!(display_width("\u{fe0f}"), 0);
    }

    #[test]
    fn test_emoji_message_is_centered() {
        let mut sink = TerminalSink::new(Vec::new(), 20, 10);
        sink.render("🎂");
        let out = output(sink);

        // "🎂|" takes three columns, like "Hi|"
        assert!(out.contains("\x1b[6;9H"));
    }
}
