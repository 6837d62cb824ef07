//! The set of sinks a reporter writes to, partitioned by direction.

use crate::error::{ReporterError, Result};
use crate::gate::DispatchGate;
use crate::markup::{self, RenderMode, RenderOptions};
use crate::sinks::Sink;
use crate::uniq_id::UniqID;
use crossterm::{style, terminal};
use std::collections::{BTreeMap, BTreeSet};

pub type SinkId = UniqID;

lazy_static::lazy_static! {
    static ref CLEAR_LINE: String = {
        let mut buf: Vec<u8> = vec![];
        crossterm::queue!(
            buf,
            style::Print("\r"),
            terminal::Clear(terminal::ClearType::CurrentLine)
        )
        .ok();
        String::from_utf8_lossy(&buf).into_owned()
    };
}

struct SinkEntry {
    sink: Box<dyn Sink>,
    // A status frame was drawn and not followed by a newline yet.
    status_visible: bool,
}

impl SinkEntry {
    fn write(&mut self, id: SinkId, text: &str) {
        if let Err(e) = self.sink.write(text) {
            tracing::warn!("write to sink {} failed: {}", id, e);
        }
    }

    fn clear_status(&mut self, id: SinkId) {
        if self.status_visible {
            self.write(id, &CLEAR_LINE);
            self.status_visible = false;
        }
    }
}

pub struct StreamRegistry {
    sinks: BTreeMap<SinkId, SinkEntry>,
    out: BTreeSet<SinkId>,
    error: BTreeSet<SinkId>,
    gate: DispatchGate,
    silent: bool,
}

impl StreamRegistry {
    pub fn new(gate: DispatchGate, silent: bool) -> Self {
        Self {
            sinks: BTreeMap::new(),
            out: BTreeSet::new(),
            error: BTreeSet::new(),
            gate,
            silent,
        }
    }

    pub fn gate(&self) -> &DispatchGate {
        &self.gate
    }

    /// Takes ownership of the sink. Returns `None` (and drops the sink) when
    /// the registry is silent.
    pub fn add_sink(&mut self, sink: Box<dyn Sink>) -> Option<SinkId> {
        if self.silent {
            return None;
        }

        let id = UniqID::new();
        let direction = sink.direction();
        if direction.receives_out() {
            self.out.insert(id);
        }
        if direction.receives_error() {
            self.error.insert(id);
        }
        self.sinks.insert(
            id,
            SinkEntry {
                sink,
                status_visible: false,
            },
        );
        Some(id)
    }

    /// Tears the sink down and forgets it. Returns false if it wasn't a member.
    pub fn remove_sink(&mut self, id: SinkId) -> bool {
        self.out.remove(&id);
        self.error.remove(&id);
        match self.sinks.remove(&id) {
            Some(mut entry) => {
                entry.clear_status(id);
                entry.sink.teardown();
                true
            }
            None => false,
        }
    }

    fn targets(&self, want_error: bool) -> Option<&BTreeSet<SinkId>> {
        if !self.gate.is_open() {
            return None;
        }
        if want_error || self.gate.redirects_to_error() {
            Some(&self.error)
        } else {
            Some(&self.out)
        }
    }

    pub fn resolve_targets(&self, want_error: bool) -> BTreeSet<SinkId> {
        self.targets(want_error).cloned().unwrap_or_default()
    }

    pub fn is_enabled(&self, want_error: bool) -> bool {
        self.targets(want_error).map_or(false, |t| !t.is_empty())
    }

    /// Every id is checked before any sink is touched.
    pub fn set_columns(&mut self, sinks: &[SinkId], columns: usize) -> Result<()> {
        if let Some(foreign) = sinks.iter().find(|id| !self.sinks.contains_key(id)) {
            return Err(ReporterError::UnknownSink(*foreign));
        }
        for id in sinks {
            if let Some(entry) = self.sinks.get_mut(id) {
                entry.sink.set_columns(columns);
            }
        }
        Ok(())
    }

    pub fn columns(&self, id: SinkId) -> Option<usize> {
        self.sinks.get(&id).map(|entry| entry.sink.columns())
    }

    /// Renders `markup` for each target sink and writes it as a full line.
    pub fn write_line(&mut self, want_error: bool, markup: &str) {
        for id in self.resolve_targets(want_error) {
            if let Some(entry) = self.sinks.get_mut(&id) {
                entry.clear_status(id);
                let line = markup::render(markup, entry.sink.render_mode(), &RenderOptions::default());
                entry.write(id, &line);
                entry.write(id, "\n");
            }
        }
    }

    /// Draws an in-place status line on every ANSI error target, fitted to
    /// the sink's width. Other render modes never see intermediate frames.
    pub fn write_status(&mut self, frame: &str) {
        for id in self.resolve_targets(true) {
            if let Some(entry) = self.sinks.get_mut(&id) {
                if entry.sink.render_mode() != RenderMode::Ansi {
                    continue;
                }
                // leave the last column empty so the line never wraps
                let options = RenderOptions {
                    width: Some(entry.sink.columns().saturating_sub(1)),
                };
                let rendered = markup::render(frame, RenderMode::Ansi, &options);
                entry.write(id, &CLEAR_LINE);
                entry.write(id, &rendered);
                entry.status_visible = true;
            }
        }
    }

    pub fn clear_status(&mut self) {
        for (id, entry) in self.sinks.iter_mut() {
            entry.clear_status(*id);
        }
    }

    /// Removes every sink. Returns how many were torn down.
    pub fn teardown_all(&mut self) -> usize {
        let ids: Vec<SinkId> = self.sinks.keys().copied().collect();
        let count = ids.len();
        for id in ids {
            self.remove_sink(id);
        }
        count
    }

    pub fn contains(&self, id: SinkId) -> bool {
        self.sinks.contains_key(&id)
    }

    pub fn sink_ids(&self) -> BTreeSet<SinkId> {
        self.sinks.keys().copied().collect()
    }

    pub fn out_sinks(&self) -> &BTreeSet<SinkId> {
        &self.out
    }

    pub fn error_sinks(&self) -> &BTreeSet<SinkId> {
        &self.error
    }

    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }
}
