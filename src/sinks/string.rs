use super::{Direction, RenderMode, Sink};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

// Collects everything written to it into a string it owns, which can later be
// inspected or dumped. Clones share the same buffer.
#[derive(Clone, Debug)]
pub struct StringSink {
    output: Arc<Mutex<String>>,
    teardowns: Arc<AtomicUsize>,
    direction: Direction,
    mode: RenderMode,
    columns: usize,
}

impl StringSink {
    pub fn new(direction: Direction, mode: RenderMode) -> Self {
        Self {
            output: Arc::new(Mutex::new(String::new())),
            teardowns: Arc::new(AtomicUsize::new(0)),
            direction,
            mode,
            columns: 80,
        }
    }

    pub fn with_columns(mut self, columns: usize) -> Self {
        self.columns = columns;
        self
    }

    pub fn take(&self) -> String {
        let mut lock = self.output.lock().expect("poisoned lock");
        std::mem::take(&mut lock)
    }

    /// How many times the reporter tore this sink down.
    pub fn teardown_count(&self) -> usize {
        self.teardowns.load(Ordering::SeqCst)
    }
}

impl Sink for StringSink {
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
        self.output.lock().expect("poisoned lock").push_str(text);
        Ok(())
    }

    fn teardown(&mut self) {
        self.teardowns.fetch_add(1, Ordering::SeqCst);
    }
}

impl std::fmt::Display for StringSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = self.output.lock().expect("poisoned lock");
        write!(f, "{}", &s)
    }
}
