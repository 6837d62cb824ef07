use crate::ledger::ActiveElement;
use crate::options::ReporterOptions;
use crate::progress::Progress;
use crate::protocol::{ClientMessage, ServerMessage};
use crate::sinks::{Direction, RenderMode, StringSink};
use crate::{Reporter, ReporterError};
use k9::*;
use std::time::Duration;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver};

struct Loopback {
    initiator: Reporter,
    renderer: Reporter,
    to_renderer: UnboundedReceiver<ClientMessage>,
    to_initiator: UnboundedReceiver<ServerMessage>,
}

impl Loopback {
    fn new() -> Self {
        let initiator = Reporter::new(ReporterOptions::default().with_process_identity("42"));
        let renderer = Reporter::default();
        renderer.add_sink(StringSink::new(Direction::Error, RenderMode::Ansi));

        let (client_tx, to_renderer) = unbounded_channel();
        let (server_tx, to_initiator) = unbounded_channel();
        initiator.connect_renderer(client_tx);
        renderer.serve_initiator(server_tx);

        Self {
            initiator,
            renderer,
            to_renderer,
            to_initiator,
        }
    }

    // Delivers every pending client message, returns their kinds in order.
    fn relay(&mut self) -> Vec<String> {
        let mut kinds = vec![];
        while let Ok(message) = self.to_renderer.try_recv() {
            let json = serde_json::to_value(&message).unwrap();
            kinds.push(json["kind"].as_str().unwrap().to_string());
            self.renderer.receive_client_message(message).unwrap();
        }
        kinds
    }

    // Delivers every pending notification, returns the ended ids.
    fn relay_back(&mut self) -> Vec<String> {
        let mut ended = vec![];
        while let Ok(message) = self.to_initiator.try_recv() {
            let ServerMessage::Ended { id } = &message;
            ended.push(id.clone());
            self.initiator.receive_server_message(message);
        }
        ended
    }
}

#[test]
fn round_trip_scenario() {
    let mut lb = Loopback::new();

    let bar = lb.initiator.create_progress_bar();
    assert!(bar.is_remote());
    assert_eq!(bar.session_id(), Some("42:0"));
    assert!(lb.initiator.has_initiator_session("42:0"));

    bar.set_total(10, false);
    bar.set_current(5);
    bar.tick();

    let kinds = lb.relay();
    assert_equal!(
        kinds,
        vec![
            "create".to_string(),
            "set_total".into(),
            "set_current".into(),
            "tick".into()
        ]
    );
    assert_eq!(lb.renderer.renderer_session_count(), 1);
    let state = lb.renderer.renderer_progress_state("42:0").unwrap();
    assert_eq!(state.current, 6);
    assert_eq!(state.total, Some(10));

    bar.end();
    assert_eq!(lb.relay(), vec!["end".to_string()]);
    assert_eq!(lb.renderer.renderer_session_count(), 0);
    assert_eq!(lb.renderer.active_element_count(), 0);

    let ended = lb.relay_back();
    assert_equal!(ended, vec!["42:0".to_string()]);
    assert_eq!(lb.initiator.initiator_session_count(), 0);
    assert_eq!(lb.initiator.active_element_count(), 0);
}

#[test]
fn every_mutation_reaches_the_renderer() {
    let mut lb = Loopback::new();
    let bar = lb.initiator.create_remote_progress_bar().unwrap();
    let id = bar.session_id().unwrap().to_string();

    bar.set_title("download");
    bar.set_text("mirror 1");
    bar.push_text("retrying");
    bar.push_text("waiting");
    bar.pop_text("waiting");
    bar.set_total(100, true);
    bar.set_approximate_eta(Duration::from_secs(30));
    bar.pause();
    lb.relay();

    let state = lb.renderer.renderer_progress_state(&id).unwrap();
    assert_eq!(state.title, "download");
    assert_eq!(state.visible_text(), "retrying");
    assert!(state.approximate);
    assert_eq!(state.eta, Some(Duration::from_secs(30)));
    assert!(state.paused);

    bar.resume();
    lb.relay();
    assert!(!lb.renderer.renderer_progress_state(&id).unwrap().paused);
}

#[test]
fn renderer_side_end_closes_the_initiator() {
    let mut lb = Loopback::new();
    let bar = lb.initiator.create_progress_bar();
    lb.relay();

    lb.renderer.teardown_all();
    assert_eq!(lb.renderer.renderer_session_count(), 0);
    let ended = lb.relay_back();
    assert_equal!(ended, vec!["42:0".to_string()]);

    assert!(bar.is_finished());
    assert_eq!(lb.initiator.initiator_session_count(), 0);
    assert_eq!(lb.initiator.active_element_count(), 0);

    // fire and forget callers keep going, nothing is sent any more
    bar.set_current(3);
    bar.end();
    assert!(lb.relay().is_empty());
}

#[test]
fn unknown_sessions_are_rejected() {
    let lb = Loopback::new();
    let result = lb
        .renderer
        .receive_client_message(ClientMessage::Tick { id: "7:0".into() });
    assert!(matches!(result, Err(ReporterError::UnknownSession(id)) if id == "7:0"));

    let result = lb.renderer.receive_client_message(ClientMessage::End { id: "7:0".into() });
    assert!(result.is_err());
    assert_eq!(lb.renderer.renderer_session_count(), 0);
    assert!(!lb.renderer.has_renderer_session("7:0"));
}

#[test]
fn late_messages_for_ended_sessions_are_ignored() {
    let mut lb = Loopback::new();
    let bar = lb.initiator.create_progress_bar();
    lb.relay();
    lb.renderer.teardown_all();

    // sent before the Ended notification arrived
    bar.tick();
    lb.relay();
    let ended = lb.relay_back();
    assert_equal!(ended, vec!["42:0".to_string()]);
}

#[test]
fn duplicate_create_is_rejected() {
    let lb = Loopback::new();
    let create = ClientMessage::Create { id: "1:0".into() };
    lb.renderer.receive_client_message(create.clone()).unwrap();
    let result = lb.renderer.receive_client_message(create);
    assert!(matches!(result, Err(ReporterError::DuplicateSession(_))));
    assert_eq!(lb.renderer.renderer_session_count(), 1);
}

#[test]
fn late_ended_after_explicit_end_is_a_noop() {
    let mut lb = Loopback::new();
    let first = lb.initiator.create_progress_bar();
    let second = lb.initiator.create_progress_bar();
    assert_eq!(second.session_id(), Some("42:1"));
    lb.relay();

    first.end();
    assert_eq!(lb.initiator.initiator_session_count(), 1);
    lb.relay();
    lb.relay_back();
    lb.initiator
        .receive_server_message(ServerMessage::Ended { id: "42:0".into() });

    assert_eq!(lb.initiator.initiator_session_count(), 1);
    assert!(lb.initiator.has_initiator_session("42:1"));
    assert!(!second.is_finished());
}

#[test]
fn initiator_teardown_ends_remote_sessions() {
    let mut lb = Loopback::new();
    let bar = lb.initiator.create_progress_bar();
    lb.relay();

    lb.initiator.teardown_all();
    assert!(bar.is_finished());
    assert_eq!(lb.relay(), vec!["end".to_string()]);
    assert_eq!(lb.renderer.renderer_session_count(), 0);
    let ended = lb.relay_back();
    assert_equal!(ended, vec!["42:0".to_string()]);
}

#[test]
fn resize_does_not_touch_the_channel() {
    let mut lb = Loopback::new();
    let sink = lb
        .initiator
        .add_sink(StringSink::new(Direction::Error, RenderMode::Ansi))
        .unwrap();
    let bar = lb.initiator.create_progress_bar();
    lb.relay();

    lb.initiator.update_columns(&[sink], 60).unwrap();
    bar.render();
    assert!(lb.relay().is_empty());
}

#[test]
fn extreme_counter_values_do_not_break_the_renderer() {
    let mut lb = Loopback::new();
    let bar = lb.initiator.create_progress_bar();
    let id = bar.session_id().unwrap().to_string();

    bar.set_total(u64::MAX, false);
    bar.set_current(u64::MAX);
    bar.tick();
    bar.tick();
    lb.relay();

    let state = lb.renderer.renderer_progress_state(&id).unwrap();
    assert_eq!(state.current, u64::MAX);

    // the session keeps working afterwards
    bar.set_current(1);
    bar.end();
    lb.relay();
    assert_eq!(lb.renderer.renderer_session_count(), 0);
    let ended = lb.relay_back();
    assert_equal!(ended, vec![id]);
}

#[test]
fn eta_survives_the_wire_unchanged() {
    let mut lb = Loopback::new();
    let bar = lb.initiator.create_progress_bar();
    let id = bar.session_id().unwrap().to_string();

    for eta in [
        Duration::from_secs(u64::MAX),
        Duration::new(u64::MAX, 999_999_999),
        Duration::from_nanos(1),
        Duration::from_millis(1500),
    ] {
        bar.set_approximate_eta(eta);
        lb.relay();
        let state = lb.renderer.renderer_progress_state(&id).unwrap();
        assert_eq!(state.eta, Some(eta));
    }
}

#[test]
fn ended_uses_the_reply_channel_of_end_time() {
    let renderer = Reporter::default();
    renderer
        .receive_client_message(ClientMessage::Create { id: "5:0".into() })
        .unwrap();

    // wired only after the session was created
    let (reply_tx, mut reply_rx) = unbounded_channel();
    renderer.serve_initiator(reply_tx);

    renderer
        .receive_client_message(ClientMessage::End { id: "5:0".into() })
        .unwrap();
    assert_eq!(
        reply_rx.try_recv().unwrap(),
        ServerMessage::Ended { id: "5:0".into() }
    );
    assert!(reply_rx.try_recv().is_err());
    assert_eq!(renderer.renderer_session_count(), 0);
}
