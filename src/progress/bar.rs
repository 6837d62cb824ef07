use super::Progress;
use crate::ledger::ActiveElement;
use crate::markup::escape;
use crate::streams::StreamRegistry;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, Weak};
use std::time::Duration;

const PROGRESS_BAR_LEN: u64 = 30;

pub(crate) type EndCallback = Box<dyn FnOnce() + Send>;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ProgressState {
    pub current: u64,
    pub total: Option<u64>,
    pub approximate: bool,
    pub title: String,
    pub text: String,
    pub text_stack: Vec<String>,
    pub eta: Option<Duration>,
    pub paused: bool,
}

impl ProgressState {
    /// The pushed text wins over the plain one.
    pub fn visible_text(&self) -> &str {
        self.text_stack.last().unwrap_or(&self.text)
    }
}

/// A progress bar drawn as a status line on this reporter's error sinks.
pub struct ProgressBar {
    state: Mutex<ProgressState>,
    streams: Weak<Mutex<StreamRegistry>>,
    ended: AtomicBool,
    on_end: Mutex<Option<EndCallback>>,
}

impl ProgressBar {
    pub(crate) fn new(streams: Weak<Mutex<StreamRegistry>>, on_end: EndCallback) -> Self {
        Self {
            state: Mutex::new(ProgressState::default()),
            streams,
            ended: AtomicBool::new(false),
            on_end: Mutex::new(Some(on_end)),
        }
    }

    pub fn state(&self) -> ProgressState {
        self.state.lock().expect("poisoned lock").clone()
    }

    pub fn is_ended(&self) -> bool {
        self.ended.load(Ordering::SeqCst)
    }

    pub fn frame(&self) -> String {
        make_frame(&self.state.lock().expect("poisoned lock"))
    }

    fn update<F: FnOnce(&mut ProgressState)>(&self, f: F) {
        if self.is_ended() {
            tracing::trace!("ignoring update of an ended progress bar");
            return;
        }
        let paused = {
            let mut state = self.state.lock().expect("poisoned lock");
            f(&mut state);
            state.paused
        };
        if !paused {
            self.render();
        }
    }
}

impl ActiveElement for ProgressBar {
    fn render(&self) {
        if self.is_ended() {
            return;
        }
        let frame = self.frame();
        if let Some(streams) = self.streams.upgrade() {
            streams.lock().expect("poisoned lock").write_status(&frame);
        }
    }

    fn end(&self) {
        if self.ended.swap(true, Ordering::SeqCst) {
            return;
        }
        if let Some(streams) = self.streams.upgrade() {
            streams.lock().expect("poisoned lock").clear_status();
        }
        let on_end = self.on_end.lock().expect("poisoned lock").take();
        if let Some(on_end) = on_end {
            on_end();
        }
    }
}

impl Progress for ProgressBar {
    fn set_current(&self, value: u64) {
        self.update(|s| s.current = value);
    }

    fn set_total(&self, value: u64, approximate: bool) {
        self.update(|s| {
            s.total = Some(value);
            s.approximate = approximate;
        });
    }

    fn set_title(&self, text: &str) {
        self.update(|s| s.title = text.to_string());
    }

    fn set_text(&self, text: &str) {
        self.update(|s| s.text = text.to_string());
    }

    fn set_approximate_eta(&self, eta: Duration) {
        self.update(|s| s.eta = Some(eta));
    }

    fn push_text(&self, text: &str) {
        self.update(|s| s.text_stack.push(text.to_string()));
    }

    fn pop_text(&self, text: &str) {
        self.update(|s| {
            if let Some(pos) = s.text_stack.iter().rposition(|t| t == text) {
                s.text_stack.remove(pos);
            }
        });
    }

    fn tick(&self) {
        self.update(|s| {
            if !s.paused {
                s.current = s.current.saturating_add(1);
            }
        });
    }

    fn pause(&self) {
        self.update(|s| s.paused = true);
        // one last frame, so the marker shows while nothing redraws
        self.render();
    }

    fn resume(&self) {
        self.update(|s| s.paused = false);
    }
}

/*
   Frame layout, e.g.

     building [###############...............] 5/10 linking eta 12s
*/
fn make_frame(state: &ProgressState) -> String {
    let mut parts = vec![];

    if !state.title.is_empty() {
        parts.push(format!("<bold>{}</>", escape(&state.title)));
    }

    match state.total {
        Some(total) => {
            let pct_done = if total == 0 {
                100
            } else {
                std::cmp::min(state.current.saturating_mul(100) / total, 100)
            };
            let done_blocks_len = PROGRESS_BAR_LEN * pct_done / 100;
            let todo_blocks_len = PROGRESS_BAR_LEN - done_blocks_len;
            parts.push(format!(
                "[<green>{}</>{}] {}/{}{}",
                "#".repeat(done_blocks_len as usize),
                ".".repeat(todo_blocks_len as usize),
                state.current,
                if state.approximate { "~" } else { "" },
                total
            ));
        }
        None => parts.push(state.current.to_string()),
    }

    let text = state.visible_text();
    if !text.is_empty() {
        parts.push(format!("<dim>{}</>", escape(text)));
    }

    if let Some(eta) = state.eta {
        parts.push(format!("eta {}", format_eta(eta)));
    }

    if state.paused {
        parts.push("<yellow>(paused)</>".to_string());
    }

    parts.join(" ")
}

fn format_eta(d: Duration) -> String {
    let secs = d.as_secs();
    if secs >= 3600 {
        format!("{}h{:02}m", secs / 3600, (secs % 3600) / 60)
    } else if secs >= 60 {
        format!("{}m{:02}s", secs / 60, secs % 60)
    } else {
        format!("{}s", secs)
    }
}
