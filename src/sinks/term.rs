use super::{Direction, RenderMode, Sink};
use crate::options::ColorChoice;
use crossterm::tty::IsTty;
use std::io::Write;

const DEFAULT_COLUMNS: usize = 80;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Stream {
    Stdout,
    Stderr,
}

/// Process STDOUT or STDERR.
#[derive(Debug)]
pub struct TermSink {
    stream: Stream,
    mode: RenderMode,
    columns: usize,
}

impl TermSink {
    pub fn stdout(color: ColorChoice) -> Self {
        let is_tty = std::io::stdout().is_tty();
        Self::new(Stream::Stdout, color, is_tty)
    }

    pub fn stderr(color: ColorChoice) -> Self {
        let is_tty = std::io::stderr().is_tty();
        Self::new(Stream::Stderr, color, is_tty)
    }

    fn new(stream: Stream, color: ColorChoice, is_tty: bool) -> Self {
        let mode = match (color, is_tty) {
            (ColorChoice::Always, _) | (ColorChoice::Auto, true) => RenderMode::Ansi,
            _ => RenderMode::Plain,
        };
        Self {
            stream,
            mode,
            columns: terminal_columns(),
        }
    }
}

/// Current terminal width, 80 when it can't be detected.
pub fn terminal_columns() -> usize {
    term_size::dimensions()
        .map(|(w, _)| w)
        .unwrap_or(DEFAULT_COLUMNS)
}

impl Sink for TermSink {
    fn direction(&self) -> Direction {
        match self.stream {
            Stream::Stdout => Direction::Out,
            Stream::Stderr => Direction::Error,
        }
    }

    fn render_mode(&self) -> RenderMode {
        self.mode
    }

    fn columns(&self) -> usize {
        self.columns
    }

    fn set_columns(&mut self, columns: usize) {
        self.columns = columns;
    }

    fn write(&mut self, text: &str) -> std::io::Result<()> {
        match self.stream {
            Stream::Stdout => {
                let mut lock = std::io::stdout().lock();
                lock.write_all(text.as_bytes())?;
                lock.flush()
            }
            Stream::Stderr => {
                let mut lock = std::io::stderr().lock();
                lock.write_all(text.as_bytes())?;
                lock.flush()
            }
        }
    }
}
