use super::{Direction, RenderMode, Sink};
use std::io::Write;

/// Wraps any writer, e.g. a log file. Flushed on teardown.
pub struct WriterSink<W: Write + Send> {
    writer: W,
    direction: Direction,
    mode: RenderMode,
    columns: usize,
}

impl<W: Write + Send> WriterSink<W> {
    pub fn new(writer: W, direction: Direction, mode: RenderMode, columns: usize) -> Self {
        Self {
            writer,
            direction,
            mode,
            columns,
        }
    }
}

impl<W: Write + Send> Sink for WriterSink<W> {
    fn direction(&self) -> Direction {
        self.direction
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
        self.writer.write_all(text.as_bytes())
    }

    fn teardown(&mut self) {
        if let Err(e) = self.writer.flush() {
            tracing::warn!("failed to flush sink on teardown: {}", e);
        }
    }
}
