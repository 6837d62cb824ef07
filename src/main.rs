use std::time::Duration;
use termreport::channel::{forward_lines, pump_client_lines, pump_server_lines};
use termreport::sinks::TermSink;
use termreport::{ActiveElement, ColorChoice, Progress, Reporter, ReporterOptions, TimestampFormat};
use tokio::io::BufReader;
use tokio::sync::mpsc::unbounded_channel;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    // The renderer owns the terminal.
    let renderer = Reporter::new(ReporterOptions::default());
    renderer.add_sink(TermSink::stdout(ColorChoice::Auto));
    renderer.add_sink(TermSink::stderr(ColorChoice::Auto));

    // The initiator only talks to the renderer, as if it were another
    // process on the far side of a pipe.
    let initiator = Reporter::new(
        ReporterOptions::default().with_timestamp_format(TimestampFormat::Local),
    );
    initiator.add_sink(TermSink::stdout(ColorChoice::Auto));

    let (client_tx, client_rx) = unbounded_channel();
    let (server_tx, server_rx) = unbounded_channel();
    let (to_renderer, from_initiator) = tokio::io::duplex(4096);
    let (to_initiator, from_renderer) = tokio::io::duplex(4096);

    initiator.connect_renderer(client_tx);
    renderer.serve_initiator(server_tx);

    tokio::spawn(forward_lines(client_rx, to_renderer));
    tokio::spawn(forward_lines(server_rx, to_initiator));
    tokio::spawn(pump_client_lines(renderer.clone(), BufReader::new(from_initiator)));
    tokio::spawn(pump_server_lines(initiator.clone(), BufReader::new(from_renderer)));

    initiator.heading("termreport demo");

    let local = renderer.create_local_progress_bar();
    local.set_title("indexing");
    local.set_total(20, true);

    let remote = initiator.create_progress_bar();
    remote.set_title("downloading");
    remote.set_total(40, false);

    for step in 0..40u64 {
        tokio::time::sleep(Duration::from_millis(50)).await;
        remote.tick();
        if step % 2 == 0 {
            local.tick();
        }
        if step == 10 {
            remote.push_text("slow mirror");
            initiator.info("switching mirrors");
        }
        if step == 20 {
            remote.pop_text("slow mirror");
            local.end();
        }
        remote.set_approximate_eta(Duration::from_millis(50 * (39 - step)));
    }
    remote.end();

    tokio::time::sleep(Duration::from_millis(100)).await;
    initiator.success("all done");

    initiator.teardown_all();
    renderer.teardown_all();
    Ok(())
}
