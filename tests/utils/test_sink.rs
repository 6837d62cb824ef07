use std::io::Write;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use termreport::sinks::Direction;
use termreport::{RenderMode, Sink};

/// Shared byte buffer to hand to a `WriterSink`.
#[derive(Clone, Default)]
pub struct SharedBuf {
    pub bytes: Arc<Mutex<Vec<u8>>>,
    pub flushes: Arc<AtomicUsize>,
}

impl SharedBuf {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.bytes.lock().expect("poisoned lock")).into_owned()
    }

    pub fn flush_count(&self) -> usize {
        self.flushes.load(Ordering::SeqCst)
    }
}

impl Write for SharedBuf {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.bytes.lock().expect("poisoned lock").extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.flushes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// A sink whose every write fails, e.g. a closed pipe.
#[derive(Clone, Default)]
pub struct BrokenSink {
    pub attempts: Arc<AtomicUsize>,
}

impl Sink for BrokenSink {
    fn direction(&self) -> Direction {
        Direction::Both
    }

    fn render_mode(&self) -> RenderMode {
        RenderMode::Plain
    }

    fn columns(&self) -> usize {
        80
    }

    fn set_columns(&mut self, _columns: usize) {}

    fn write(&mut self, _text: &str) -> std::io::Result<()> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Err(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "closed"))
    }
}
