use super::Progress;
use crate::ledger::{ActiveElement, Ledger};
use crate::protocol::ClientMessage;
use crate::uniq_id::UniqID;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, Weak};
use std::time::Duration;
use tokio::sync::mpsc::UnboundedSender;

/// Initiator-side records: session id -> the proxy to close when the
/// renderer reports the session ended.
#[derive(Default)]
pub struct InitiatorSessions {
    sessions: HashMap<String, Arc<RemoteProgress>>,
}

impl InitiatorSessions {
    pub fn insert(&mut self, session: Arc<RemoteProgress>) {
        self.sessions.insert(session.id().to_string(), session);
    }

    pub fn remove(&mut self, id: &str) -> Option<Arc<RemoteProgress>> {
        self.sessions.remove(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.sessions.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

/// Stands in for a progress bar drawn by a remote renderer. Every call is
/// sent as a message; once the session is closed calls are dropped.
pub struct RemoteProgress {
    id: String,
    outbound: UnboundedSender<ClientMessage>,
    closed: AtomicBool,
    element: UniqID,
    ledger: Weak<Mutex<Ledger>>,
    sessions: Weak<Mutex<InitiatorSessions>>,
}

impl RemoteProgress {
    pub(crate) fn new(
        id: String,
        outbound: UnboundedSender<ClientMessage>,
        element: UniqID,
        ledger: Weak<Mutex<Ledger>>,
        sessions: Weak<Mutex<InitiatorSessions>>,
    ) -> Self {
        Self {
            id,
            outbound,
            closed: AtomicBool::new(false),
            element,
            ledger,
            sessions,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    pub(crate) fn send(&self, message: ClientMessage) {
        if self.is_closed() {
            tracing::trace!("session {} is closed, dropping {:?}", self.id, message);
            return;
        }
        if self.outbound.send(message).is_err() {
            tracing::debug!("renderer channel is gone, dropping message for {}", self.id);
        }
    }

    /// Marks the proxy closed and drops its ledger entry and initiator
    /// record. Returns false when it was already closed.
    pub(crate) fn close(&self) -> bool {
        if self.closed.swap(true, Ordering::SeqCst) {
            return false;
        }
        if let Some(ledger) = self.ledger.upgrade() {
            ledger.lock().expect("poisoned lock").unregister(self.element);
        }
        if let Some(sessions) = self.sessions.upgrade() {
            sessions.lock().expect("poisoned lock").remove(&self.id);
        }
        tracing::debug!("closed remote progress session {}", self.id);
        true
    }

    fn id_owned(&self) -> String {
        self.id.clone()
    }
}

impl ActiveElement for RemoteProgress {
    // the renderer owns the drawing
    fn render(&self) {}

    fn end(&self) {
        self.send(ClientMessage::End { id: self.id_owned() });
        self.close();
    }
}

impl Progress for RemoteProgress {
    fn set_current(&self, value: u64) {
        self.send(ClientMessage::SetCurrent {
            id: self.id_owned(),
            value,
        });
    }

    fn set_total(&self, value: u64, approximate: bool) {
        self.send(ClientMessage::SetTotal {
            id: self.id_owned(),
            value,
            approximate,
        });
    }

    fn set_title(&self, text: &str) {
        self.send(ClientMessage::SetTitle {
            id: self.id_owned(),
            text: text.to_string(),
        });
    }

    fn set_text(&self, text: &str) {
        self.send(ClientMessage::SetText {
            id: self.id_owned(),
            text: text.to_string(),
        });
    }

    fn set_approximate_eta(&self, eta: Duration) {
        self.send(ClientMessage::SetApproximateEta {
            id: self.id_owned(),
            eta,
        });
    }

    fn push_text(&self, text: &str) {
        self.send(ClientMessage::PushText {
            id: self.id_owned(),
            text: text.to_string(),
        });
    }

    fn pop_text(&self, text: &str) {
        self.send(ClientMessage::PopText {
            id: self.id_owned(),
            text: text.to_string(),
        });
    }

    fn tick(&self) {
        self.send(ClientMessage::Tick { id: self.id_owned() });
    }

    fn pause(&self) {
        self.send(ClientMessage::Pause { id: self.id_owned() });
    }

    fn resume(&self) {
        self.send(ClientMessage::Resume { id: self.id_owned() });
    }
}
