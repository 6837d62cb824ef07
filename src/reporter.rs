use crate::error::{ReporterError, Result};
use crate::gate::{DispatchGate, EnableScope};
use crate::ledger::{ActiveElement, Ledger};
use crate::options::{format_timestamp, ReporterOptions};
use crate::progress::bar::EndCallback;
use crate::progress::remote::InitiatorSessions;
use crate::progress::{ProgressBar, ProgressHandle, ProgressState, RemoteProgress};
use crate::protocol::{ClientMessage, ServerMessage};
use crate::renderer::RendererSessions;
use crate::sinks::Sink;
use crate::streams::{SinkId, StreamRegistry};
use crate::uniq_id::{SessionIds, UniqID, PROCESS_IDENTITY};
use std::collections::BTreeSet;
use std::sync::{Arc, Mutex};
use std::time::SystemTime;
use tokio::sync::mpsc::UnboundedSender;

/// Entry point: owns the sinks, the active elements and both sides of the
/// progress protocol. Clones share the same state.
#[derive(Clone)]
pub struct Reporter(Arc<ReporterInternal>);

struct ReporterInternal {
    options: ReporterOptions,
    gate: DispatchGate,
    streams: Arc<Mutex<StreamRegistry>>,
    ledger: Arc<Mutex<Ledger>>,
    session_ids: SessionIds,
    initiator: Arc<Mutex<InitiatorSessions>>,
    renderer: Arc<Mutex<RendererSessions>>,
    // initiator -> renderer
    outbound: Mutex<Option<UnboundedSender<ClientMessage>>>,
    // renderer -> initiator
    reply: Mutex<Option<UnboundedSender<ServerMessage>>>,
}

impl Default for Reporter {
    fn default() -> Self {
        Self::new(ReporterOptions::default())
    }
}

impl Reporter {
    pub fn new(options: ReporterOptions) -> Self {
        let gate = DispatchGate::new(options.enabled, options.redirect_to_error);
        let identity = options
            .process_identity
            .clone()
            .unwrap_or_else(|| PROCESS_IDENTITY.clone());

        Self(Arc::new(ReporterInternal {
            streams: Arc::new(Mutex::new(StreamRegistry::new(gate.clone(), options.silent))),
            gate,
            ledger: Arc::new(Mutex::new(Ledger::new())),
            session_ids: SessionIds::new(identity),
            initiator: Arc::new(Mutex::new(InitiatorSessions::default())),
            renderer: Arc::new(Mutex::new(RendererSessions::default())),
            outbound: Mutex::new(None),
            reply: Mutex::new(None),
            options,
        }))
    }

    pub fn options(&self) -> &ReporterOptions {
        &self.0.options
    }

    // Sinks

    pub fn add_sink<S: Sink + 'static>(&self, sink: S) -> Option<SinkId> {
        self.streams().add_sink(Box::new(sink))
    }

    pub fn remove_sink(&self, id: SinkId) -> bool {
        self.streams().remove_sink(id)
    }

    pub fn resolve_targets(&self, want_error: bool) -> BTreeSet<SinkId> {
        self.streams().resolve_targets(want_error)
    }

    pub fn sink_count(&self) -> usize {
        self.streams().len()
    }

    /// Changes the width of the given sinks, then redraws every active
    /// element once. Fails without touching anything if one of the sinks
    /// doesn't belong to this reporter.
    pub fn update_columns(&self, sinks: &[SinkId], columns: usize) -> Result<()> {
        self.streams().set_columns(sinks, columns)?;
        self.render_active();
        Ok(())
    }

    // Dispatch gate

    pub fn enable(&self) -> EnableScope {
        self.0.gate.enable()
    }

    pub fn is_enabled(&self, want_error: bool) -> bool {
        self.streams().is_enabled(want_error)
    }

    pub fn set_redirect_to_error(&self, redirect: bool) {
        self.0.gate.set_redirect_to_error(redirect);
    }

    // Writing

    /// Writes one line of markup to every sink the direction resolves to.
    /// Nothing happens when no sink resolves.
    pub fn write_line(&self, want_error: bool, markup: &str) {
        if !self.is_enabled(want_error) {
            return;
        }
        self.streams().write_line(want_error, markup);
        // the line went over any status line, draw the bars again below it
        self.render_active();
    }

    pub fn log(&self, markup: &str) {
        self.write_line(false, &self.decorate(None, markup));
    }

    pub fn heading(&self, title: &str) {
        let title = format!("<bold>{}</>", title);
        self.write_line(false, &self.decorate(None, &title));
    }

    pub fn info(&self, markup: &str) {
        self.write_line(false, &self.decorate(Some("<cyan>info</>"), markup));
    }

    pub fn success(&self, markup: &str) {
        self.write_line(false, &self.decorate(Some("<green>success</>"), markup));
    }

    pub fn warn(&self, markup: &str) {
        self.write_line(true, &self.decorate(Some("<yellow>warn</>"), markup));
    }

    pub fn error(&self, markup: &str) {
        self.write_line(true, &self.decorate(Some("<red>error</>"), markup));
    }

    fn decorate(&self, label: Option<&str>, markup: &str) -> String {
        let mut line = format_timestamp(self.0.options.timestamp_format, SystemTime::now());
        if let Some(label) = label {
            line.push_str(label);
            line.push(' ');
        }
        line.push_str(markup);
        line
    }

    // Active elements

    pub fn register_active_element(&self, element: Arc<dyn ActiveElement>) -> UniqID {
        let id = UniqID::new();
        self.ledger().register(id, element);
        id
    }

    pub fn unregister_active_element(&self, id: UniqID) -> bool {
        self.ledger().unregister(id)
    }

    pub fn active_element_count(&self) -> usize {
        self.ledger().len()
    }

    /// Runs `op` on every active element. The ledger is not locked while
    /// `op` runs, so elements may unregister themselves.
    pub fn for_each_active<F: FnMut(&dyn ActiveElement)>(&self, mut op: F) {
        let elements = self.ledger().snapshot();
        for element in elements {
            op(element.as_ref());
        }
    }

    pub fn render_active(&self) {
        self.for_each_active(|element| element.render());
    }

    // Progress

    /// A remote proxy when a renderer is connected, a local bar otherwise.
    /// The bar stays active until it is ended, see [`ProgressHandle`].
    pub fn create_progress_bar(&self) -> ProgressHandle {
        match self.create_remote_progress_bar() {
            Ok(handle) => handle,
            Err(_) => self.create_local_progress_bar(),
        }
    }

    pub fn create_local_progress_bar(&self) -> ProgressHandle {
        ProgressHandle::Local(self.spawn_local_bar(None))
    }

    /// Starts a session on the connected renderer and returns the proxy that
    /// drives it.
    pub fn create_remote_progress_bar(&self) -> Result<ProgressHandle> {
        let outbound = self
            .0
            .outbound
            .lock()
            .expect("poisoned lock")
            .clone()
            .ok_or(ReporterError::NoRemoteChannel)?;

        let id = self.0.session_ids.next_id();
        let element = UniqID::new();
        let session = Arc::new(RemoteProgress::new(
            id.clone(),
            outbound,
            element,
            Arc::downgrade(&self.0.ledger),
            Arc::downgrade(&self.0.initiator),
        ));

        session.send(ClientMessage::Create { id: id.clone() });
        self.initiator().insert(session.clone());
        self.ledger().register(element, session.clone());
        tracing::debug!("created remote progress session {}", id);

        Ok(ProgressHandle::Remote(session))
    }

    fn spawn_local_bar(&self, on_end: Option<EndCallback>) -> Arc<ProgressBar> {
        let element = UniqID::new();
        let ledger = Arc::downgrade(&self.0.ledger);
        let bar = Arc::new(ProgressBar::new(
            Arc::downgrade(&self.0.streams),
            Box::new(move || {
                if let Some(ledger) = ledger.upgrade() {
                    ledger.lock().expect("poisoned lock").unregister(element);
                }
                if let Some(on_end) = on_end {
                    on_end();
                }
            }),
        ));
        self.ledger().register(element, bar.clone());
        bar.render();
        bar
    }

    // Remote channel

    /// Initiator side: every progress bar created from now on is drawn by
    /// the renderer on the other end of `outbound`.
    pub fn connect_renderer(&self, outbound: UnboundedSender<ClientMessage>) {
        *self.0.outbound.lock().expect("poisoned lock") = Some(outbound);
    }

    pub fn disconnect_renderer(&self) {
        self.0.outbound.lock().expect("poisoned lock").take();
    }

    /// Renderer side: where `Ended` notifications are sent.
    pub fn serve_initiator(&self, reply: UnboundedSender<ServerMessage>) {
        *self.0.reply.lock().expect("poisoned lock") = Some(reply);
    }

    /// Renderer side of the protocol. An error is fatal to this message
    /// only; the channel and the other sessions are unaffected.
    pub fn receive_client_message(&self, message: ClientMessage) -> Result<()> {
        let id = message.id().to_string();

        if let ClientMessage::Create { .. } = message {
            if self.renderer().contains(&id) {
                return Err(ReporterError::DuplicateSession(id));
            }
            let bar = self.spawn_local_bar(Some(self.ended_notifier(id.clone())));
            self.renderer().insert(id.clone(), bar);
            tracing::debug!("renderer opened progress session {}", id);
            return Ok(());
        }

        let bar = self.renderer().get(&id);
        let bar = match bar {
            Some(bar) => bar,
            None => {
                if self.renderer().recently_ended(&id) {
                    tracing::debug!("session {} already ended, ignoring {:?}", id, message);
                    return Ok(());
                }
                return Err(ReporterError::UnknownSession(id));
            }
        };

        message.apply(bar.as_ref());

        if let ClientMessage::End { .. } = message {
            self.renderer().finish(&id);
        }
        Ok(())
    }

    // Runs when a renderer-side bar ends, whatever ended it.
    // The reply channel is looked up at end time, so a session created
    // before `serve_initiator` still gets its `Ended`.
    fn ended_notifier(&self, id: String) -> EndCallback {
        let internal = Arc::downgrade(&self.0);
        Box::new(move || {
            let internal = match internal.upgrade() {
                Some(internal) => internal,
                None => {
                    tracing::debug!("reporter is gone, dropping Ended for {}", id);
                    return;
                }
            };
            internal.renderer.lock().expect("poisoned lock").finish(&id);
            let reply = internal.reply.lock().expect("poisoned lock").clone();
            match reply {
                Some(reply) => {
                    if reply.send(ServerMessage::Ended { id: id.clone() }).is_err() {
                        tracing::debug!("initiator is gone, dropping Ended for {}", id);
                    }
                }
                None => tracing::warn!("no reply channel, dropping Ended for {}", id),
            }
        })
    }

    /// Initiator side of the protocol. A late `Ended` for a session that
    /// was already closed is a no-op.
    pub fn receive_server_message(&self, message: ServerMessage) {
        match message {
            ServerMessage::Ended { id } => {
                let session = self.initiator().remove(&id);
                match session {
                    Some(session) => {
                        session.close();
                    }
                    None => tracing::debug!("Ended for closed session {}", id),
                }
            }
        }
    }

    pub fn initiator_session_count(&self) -> usize {
        self.initiator().len()
    }

    pub fn has_initiator_session(&self, id: &str) -> bool {
        self.initiator().contains(id)
    }

    pub fn renderer_session_count(&self) -> usize {
        self.renderer().len()
    }

    pub fn has_renderer_session(&self, id: &str) -> bool {
        self.renderer().contains(id)
    }

    /// What the renderer-side bar of a live session currently shows.
    pub fn renderer_progress_state(&self, id: &str) -> Option<ProgressState> {
        let bar = self.renderer().get(id);
        bar.map(|bar| bar.state())
    }

    // Teardown

    /// Removes every sink, then ends every active element. Remote proxies
    /// end their sessions, renderer-side bars notify their initiators.
    pub fn teardown_all(&self) {
        let sinks = self.streams().teardown_all();
        let elements = self.ledger().drain();
        tracing::debug!(
            "teardown: {} sinks, {} active elements",
            sinks,
            elements.len()
        );
        for element in elements {
            element.end();
        }
    }

    fn streams(&self) -> std::sync::MutexGuard<'_, StreamRegistry> {
        self.0.streams.lock().expect("poisoned lock")
    }

    fn ledger(&self) -> std::sync::MutexGuard<'_, Ledger> {
        self.0.ledger.lock().expect("poisoned lock")
    }

    fn initiator(&self) -> std::sync::MutexGuard<'_, InitiatorSessions> {
        self.0.initiator.lock().expect("poisoned lock")
    }

    fn renderer(&self) -> std::sync::MutexGuard<'_, RendererSessions> {
        self.0.renderer.lock().expect("poisoned lock")
    }
}
