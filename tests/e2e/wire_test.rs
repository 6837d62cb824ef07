use crate::utils::wait_until;
use anyhow::Result;
use k9::*;
use termreport::channel::{forward_lines, pump_client_lines, pump_server_lines};
use termreport::protocol::{encode_line, ClientMessage};
use termreport::sinks::{Direction, StringSink};
use termreport::{ActiveElement, Progress, RenderMode, Reporter, ReporterOptions};
use tokio::io::{AsyncWriteExt, BufReader};
use tokio::sync::mpsc::unbounded_channel;

struct Wire {
    initiator: Reporter,
    renderer: Reporter,
    terminal: StringSink,
}

/// Connects two reporters over JSON lines on in-memory pipes.
fn connect() -> Wire {
    let initiator = Reporter::new(ReporterOptions::default().with_process_identity("7"));
    let renderer = Reporter::new(ReporterOptions::default());
    let terminal = StringSink::new(Direction::Both, RenderMode::Ansi);
    renderer.add_sink(terminal.clone());

    let (client_tx, client_rx) = unbounded_channel();
    let (server_tx, server_rx) = unbounded_channel();
    let (to_renderer, from_initiator) = tokio::io::duplex(1024);
    let (to_initiator, from_renderer) = tokio::io::duplex(1024);
    initiator.connect_renderer(client_tx);
    renderer.serve_initiator(server_tx);

    tokio::spawn(forward_lines(client_rx, to_renderer));
    tokio::spawn(forward_lines(server_rx, to_initiator));
    tokio::spawn(pump_client_lines(renderer.clone(), BufReader::new(from_initiator)));
    tokio::spawn(pump_server_lines(initiator.clone(), BufReader::new(from_renderer)));

    Wire {
        initiator,
        renderer,
        terminal,
    }
}

#[tokio::test]
async fn progress_round_trip_over_pipes() -> Result<()> {
    let wire = connect();
    let bar = wire.initiator.create_progress_bar();
    assert!(bar.is_remote());
    assert_equal!(bar.session_id(), Some("7:0"));

    bar.set_title("downloading");
    bar.set_total(5, false);
    for _ in 0..3 {
        bar.tick();
    }

    let renderer = wire.renderer.clone();
    assert!(wait_until(|| renderer
        .renderer_progress_state("7:0")
        .map(|state| state.current == 3)
        .unwrap_or(false))
    .await);
    let state = wire.renderer.renderer_progress_state("7:0");
    assert_eq!(state.map(|s| (s.title, s.total)), Some(("downloading".to_string(), Some(5))));

    bar.end();
    assert!(bar.is_finished());
    assert_eq!(wire.initiator.initiator_session_count(), 0);

    let renderer = wire.renderer.clone();
    assert!(wait_until(|| renderer.renderer_session_count() == 0).await);
    assert!(wire.terminal.to_string().contains("downloading"));
    Ok(())
}

#[tokio::test]
async fn renderer_teardown_ends_initiator_sessions() -> Result<()> {
    let wire = connect();
    let first = wire.initiator.create_progress_bar();
    let second = wire.initiator.create_progress_bar();

    let renderer = wire.renderer.clone();
    assert!(wait_until(|| renderer.renderer_session_count() == 2).await);

    wire.renderer.teardown_all();

    let initiator = wire.initiator.clone();
    assert!(wait_until(|| initiator.initiator_session_count() == 0).await);
    assert!(first.is_finished());
    assert!(second.is_finished());
    assert_eq!(wire.initiator.active_element_count(), 0);
    Ok(())
}

#[tokio::test]
async fn malformed_lines_are_skipped() -> Result<()> {
    let renderer = Reporter::new(ReporterOptions::default());
    let (mut writer, reader) = tokio::io::duplex(1024);
    let pump = tokio::spawn(pump_client_lines(renderer.clone(), BufReader::new(reader)));

    writer.write_all(b"{\"kind\":\"explode\",\"id\":\"x:0\"}\n").await?;
    writer.write_all(b"not json at all\n\n").await?;
    let create = ClientMessage::Create { id: "x:0".to_string() };
    writer.write_all(encode_line(&create)?.as_bytes()).await?;
    let tick = ClientMessage::Tick { id: "x:0".to_string() };
    writer.write_all(encode_line(&tick)?.as_bytes()).await?;
    writer.shutdown().await?;
    drop(writer);

    pump.await??;
    assert!(renderer.has_renderer_session("x:0"));
    assert_eq!(renderer.renderer_progress_state("x:0").map(|s| s.current), Some(1));
    Ok(())
}
