use crate::utils::test_sink::{BrokenSink, SharedBuf};
use anyhow::Result;
use k9::*;
use std::sync::atomic::Ordering;
use termreport::markup::strip_ansi;
use termreport::sinks::{Direction, StringSink, WriterSink};
use termreport::{RenderMode, Reporter, ReporterOptions, TimestampFormat};

fn setup() -> Reporter {
    Reporter::new(ReporterOptions::default().with_timestamp_format(TimestampFormat::Redacted))
}

#[test]
fn each_sink_gets_its_own_rendering() -> Result<()> {
    let reporter = setup();
    let ansi = StringSink::new(Direction::Both, RenderMode::Ansi);
    let plain = StringSink::new(Direction::Both, RenderMode::Plain);
    let structured = StringSink::new(Direction::Both, RenderMode::Structured);
    reporter.add_sink(ansi.clone());
    reporter.add_sink(plain.clone());
    reporter.add_sink(structured.clone());

    reporter.info("fetched <bold>3</> packages");
    reporter.error("checksum mismatch for <red>zlib</>");

    let plain = plain.to_string();
    assert_equal!(
        plain.as_str(),
        "[ ] info fetched 3 packages\n[ ] error checksum mismatch for zlib\n"
    );
    assert_eq!(strip_ansi(&ansi.to_string()), plain);
    assert_eq!(
        structured.to_string(),
        "[ ] <cyan>info</> fetched <bold>3</> packages\n[ ] <red>error</> checksum mismatch for <red>zlib</>\n"
    );
    Ok(())
}

#[test]
fn broken_sink_does_not_stop_the_broadcast() -> Result<()> {
    let reporter = setup();
    let broken = BrokenSink::default();
    let plain = StringSink::new(Direction::Out, RenderMode::Plain);
    reporter.add_sink(broken.clone());
    reporter.add_sink(plain.clone());

    reporter.log("first");
    reporter.log("second");

    assert!(broken.attempts.load(Ordering::SeqCst) >= 2);
    assert_eq!(plain.to_string(), "[ ] first\n[ ] second\n");
    Ok(())
}

#[test]
fn writer_sink_is_flushed_on_teardown() -> Result<()> {
    let reporter = setup();
    let buf = SharedBuf::default();
    reporter.add_sink(WriterSink::new(buf.clone(), Direction::Error, RenderMode::Plain, 100));

    reporter.warn("disk almost full");
    reporter.log("not for the error log");
    assert_eq!(buf.flush_count(), 0);

    reporter.teardown_all();
    assert_eq!(buf.flush_count(), 1);
    assert_eq!(buf.contents(), "[ ] warn disk almost full\n");

    reporter.warn("after teardown");
    assert_eq!(buf.contents(), "[ ] warn disk almost full\n");
    Ok(())
}

#[test]
fn options_from_config() -> Result<()> {
    let options: ReporterOptions = serde_json::from_str(
        r#"{ "redirect_to_error": true, "process_identity": "worker-3" }"#,
    )?;
    let reporter = Reporter::new(options);
    let out = StringSink::new(Direction::Out, RenderMode::Plain);
    let err = StringSink::new(Direction::Error, RenderMode::Plain);
    reporter.add_sink(out.clone());
    reporter.add_sink(err.clone());

    reporter.log("diagnostic");
    assert_eq!(out.to_string(), "");
    assert_eq!(err.to_string(), "diagnostic\n");

    let (tx, _rx) = tokio::sync::mpsc::unbounded_channel();
    reporter.connect_renderer(tx);
    let bar = reporter.create_progress_bar();
    assert_eq!(bar.session_id(), Some("worker-3:0"));
    Ok(())
}
